//! アクターの状態コンポーネントと述語

use bevy::prelude::*;

/// ワールド座標（整数）
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position(pub IVec2);

/// 陣営。同じ値同士が同盟
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Team(pub u8);

/// 所有プレイヤー（`Credits` を持つエンティティ）
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Owner(pub Entity);

/// プレイヤーの所持金
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Credits(pub i64);

/// 死亡済み（除去待ち）
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// 輸送中などでワールドから見えない
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct OutOfWorld;

/// 売却処理中の建物
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Selling;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Health {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ammo {
    pub current: u32,
    pub max: u32,
}

impl Ammo {
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}

/// 採集ユニットの積荷
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cargo {
    pub amount: u32,
    pub capacity: u32,
}

impl Cargo {
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    pub fn is_full(&self) -> bool {
        self.amount >= self.capacity
    }
}

/// 存在し、死んでおらず、ワールド内にいる
pub fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get_entity(entity)
        .is_ok_and(|e| !e.contains::<Dead>() && !e.contains::<OutOfWorld>())
}

/// 同じ陣営か。陣営を持たない側がいれば同盟ではない
pub fn is_allied(world: &World, a: Entity, b: Entity) -> bool {
    match (world.get::<Team>(a), world.get::<Team>(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

pub fn position_of(world: &World, entity: Entity) -> Option<IVec2> {
    world.get::<Position>(entity).map(|p| p.0)
}

pub fn owner_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<Owner>(entity).map(|o| o.0)
}
