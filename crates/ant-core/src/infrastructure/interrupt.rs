use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Ctrl+C の受付状態。
///
/// 後始末が必要な資源 ([`super::fetched_tree::FetchedTree`]) が生きている間は
/// 割り込みを記録するだけにして、呼び出し側のエラー経路で資源を解放させる。
#[derive(Debug)]
pub struct InterruptState {
    requested: AtomicBool,
    guards: AtomicUsize,
}

/// プロセス全体で共有する状態。シグナルハンドラから参照する。
pub static INTERRUPT: InterruptState = InterruptState::new();

impl InterruptState {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            guards: AtomicUsize::new(0),
        }
    }

    /// 割り込みを記録する。後始末待ちの資源があれば `true` を返し、
    /// その場合呼び出し側はプロセスを終了してはならない。
    pub fn request(&self) -> bool {
        self.requested.store(true, Ordering::SeqCst);
        let pending = self.has_pending_cleanup();
        tracing::debug!(pending, "interrupt requested");
        pending
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn has_pending_cleanup(&self) -> bool {
        self.guards.load(Ordering::SeqCst) > 0
    }

    pub(crate) fn enter(&self) {
        self.guards.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn leave(&self) {
        self.guards.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for InterruptState {
    fn default() -> Self {
        Self::new()
    }
}
