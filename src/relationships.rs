//! ECS Relationships モジュール
//!
//! ドックの予約・ドック中の関係を Bevy 0.17 の Relationship 機能で管理します。
//! クライアント側のコンポーネントは1エンティティに1つしか付かないので、
//! 「クライアントが持つ予約は高々1つ」はデータ構造そのもので保証される。

use bevy::prelude::*;

// ============================================================
// クライアント ⇔ ホスト 予約関係
// ============================================================

/// クライアントがホストのドック枠を予約していることを示す Relationship
/// クライアント側に付与される（クライアント → ホストへの参照）
///
/// # 使用例
/// ```ignore
/// // 直接挿入せず、容量チェック付きの reserve を通す
/// dock::reserve(world, host, client)?;
///
/// // 予約を解除する
/// dock::unreserve(world, client);
/// ```
///
/// # 自動管理
/// - ホスト側には `DockReservations` が自動的に付与・維持される
/// - ホストが despawn されるとこのコンポーネントも自動で外れる
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
#[relationship(relationship_target = DockReservations)]
pub struct ReservedDock(pub Entity);

impl Default for ReservedDock {
    fn default() -> Self {
        Self(Entity::PLACEHOLDER)
    }
}

/// ホストの予約テーブル（予約した順）
/// ホスト側に自動的に付与・維持される RelationshipTarget
///
/// # 注意
/// このコンポーネントは Bevy の Relationship 機能により自動管理される。
/// 手動で追加・削除しないこと。
#[derive(Component, Debug, Default)]
#[relationship_target(relationship = ReservedDock)]
pub struct DockReservations(Vec<Entity>);

impl DockReservations {
    /// 予約中のクライアント一覧をイテレータで取得
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, client: Entity) -> bool {
        self.0.contains(&client)
    }
}

// ============================================================
// クライアント ⇔ ホスト ドック中関係
// ============================================================

/// クライアントが実際にドックしている（サービスを受けている）ことを示す Relationship
/// クライアント側に付与される。`ReservedDock` と同じホストを指すことが前提
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
#[relationship(relationship_target = DockedClients)]
pub struct DockedAt(pub Entity);

impl Default for DockedAt {
    fn default() -> Self {
        Self(Entity::PLACEHOLDER)
    }
}

/// ホストにドック中のクライアント一覧
#[derive(Component, Debug, Default)]
#[relationship_target(relationship = DockedAt)]
pub struct DockedClients(Vec<Entity>);

impl DockedClients {
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, client: Entity) -> bool {
        self.0.contains(&client)
    }
}
