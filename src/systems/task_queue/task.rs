//! タスクの共通インターフェース
//!
//! 移動・ドック・変形などユニットの振る舞いはすべて `Task` を実装し、
//! 毎tick `tick` が呼ばれて `Continue` / `Complete` を返す。
//! 中断（サスペンド）は「`Continue` を返して次tickにもう一度呼ばれる」ことだけで表現する。

use super::context::TaskContext;
use std::any::Any;

/// 1tick分の実行結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// まだ終わっていない。次のtickも同じ位置に残る
    Continue,
    /// 完了。チェーンから外れ、`next` が後を継ぐ
    Complete,
}

/// スケジューラが扱うタスク
///
/// 種類は下流のコンテンツが追加する。`Any` は `TaskChain::find_in_chain` の downcast 用
pub trait Task: Any + Send + Sync {
    /// ログ・デバッグ表示用の名前
    fn name(&self) -> &'static str;

    /// 外部からのキャンセル要求で次tickに終了してよいか。
    /// 毎tick問い合わせるので、フェーズに応じて変えてよい
    fn is_interruptible(&self) -> bool {
        true
    }

    /// `false` の場合、キャンセル要求が来たら子タスクが残っていても自分が先に終われる。
    /// キャンセルがなければ子が終わるまで自分の `tick` は呼ばれない
    fn child_has_priority(&self) -> bool {
        true
    }

    /// 最初のtickに一度だけ呼ばれる
    fn on_first_run(&mut self, _ctx: &mut TaskContext) {}

    fn tick(&mut self, ctx: &mut TaskContext) -> TaskStatus;

    /// 完了時、またはチェーン破棄時（開始済みのものだけ）に一度だけ呼ばれる
    fn on_last_run(&mut self, _ctx: &mut TaskContext) {}

    /// 同期チェックサムに混ぜる内部状態
    fn sync_state(&self) -> u64 {
        0
    }
}
