use bevy::prelude::*;

use crate::events::DockEvent;

pub struct MessagesPlugin;

impl Plugin for MessagesPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<DockEvent>();
    }
}
