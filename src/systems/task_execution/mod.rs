//! 基本タスク
//!
//! ドックプロトコルが組み立てに使う小さなタスク群。
//! その他のユニット行動も同じ `Task` 契約で下流から追加される。

mod drag;
mod move_to;
mod wait;

pub use drag::Drag;
pub use move_to::{MoveTarget, MoveTo};
pub use wait::Wait;
