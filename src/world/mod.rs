//! シミュレーションのワールドモデル
//!
//! 位置・陣営・状態マーカーと、タスクが毎tick呼ぶ副作用のない述語。
//! 座標はすべて整数で、レプリカ間で同じ結果になる。

pub mod actor;
pub mod geometry;

pub use actor::*;
pub use geometry::*;
