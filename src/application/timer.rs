//! Cancellable Timers - 可取消的一次性定时器
//!
//! 每种定时器同一时间最多一个待触发实例：再次 schedule 会取消上一个。
//! 触发回调拿到 `TimerTicket`，需在持有调用方状态锁时 `claim`，
//! 只有仍是当前实例的票据才能生效，避免取消与触发之间的竞态。

use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// 定时器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// 播放中控制栏自动隐藏
    ControlsHide,
    /// 暂停后解除渲染端引用
    Detach,
    /// 提示信息自动清除
    NoticeClear,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ControlsHide => "controls_hide",
            Self::Detach => "detach",
            Self::NoticeClear => "notice_clear",
        }
    }
}

/// 触发票据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket {
    generation: u64,
}

#[derive(Default)]
struct SlotState {
    generation: u64,
    pending: Option<(u64, CancellationToken)>,
}

/// 单实例定时器槽
pub struct TimerSlot {
    kind: TimerKind,
    state: Mutex<SlotState>,
}

impl TimerSlot {
    pub fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            state: Mutex::new(SlotState::default()),
        }
    }

    /// 安排一次触发，取消之前待触发的实例
    pub fn schedule<F>(&self, delay: Duration, on_fire: F)
    where
        F: FnOnce(TimerTicket) + Send + 'static,
    {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(timer = self.kind.as_str(), "No async runtime, timer not scheduled");
                return;
            }
        };

        let token = CancellationToken::new();
        let ticket = {
            let mut state = self.state.lock();
            state.generation += 1;
            let generation = state.generation;
            if let Some((_, previous)) = state.pending.replace((generation, token.clone())) {
                previous.cancel();
            }
            TimerTicket { generation }
        };

        let kind = self.kind;
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::trace!(timer = kind.as_str(), "Timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    tracing::trace!(timer = kind.as_str(), "Timer fired");
                    on_fire(ticket);
                }
            }
        });
    }

    /// 取消待触发实例，返回是否确有实例被取消
    pub fn cancel(&self) -> bool {
        match self.state.lock().pending.take() {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// 认领触发；票据已过期（被取消或被新实例替换）时返回 false
    pub fn claim(&self, ticket: TimerTicket) -> bool {
        let mut state = self.state.lock();
        match &state.pending {
            Some((generation, _)) if *generation == ticket.generation => {
                state.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(slot: &Arc<TimerSlot>, fired: &Arc<AtomicUsize>) -> impl FnOnce(TimerTicket) + Send + 'static {
        let slot = slot.clone();
        let fired = fired.clone();
        move |ticket| {
            if slot.claim(ticket) {
                fired.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let slot = Arc::new(TimerSlot::new(TimerKind::ControlsHide));
        let fired = Arc::new(AtomicUsize::new(0));

        slot.schedule(Duration::from_millis(100), counting(&slot, &fired));
        assert!(slot.is_pending());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!slot.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_keeps_single_instance() {
        let slot = Arc::new(TimerSlot::new(TimerKind::Detach));
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            slot.schedule(Duration::from_millis(100), counting(&slot, &fired));
            tokio::time::sleep(Duration::from_millis(60)).await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let slot = Arc::new(TimerSlot::new(TimerKind::NoticeClear));
        let fired = Arc::new(AtomicUsize::new(0));

        slot.schedule(Duration::from_millis(100), counting(&slot, &fired));
        assert!(slot.cancel());
        assert!(!slot.cancel());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schedule_without_runtime_is_ignored() {
        let slot = TimerSlot::new(TimerKind::ControlsHide);
        slot.schedule(Duration::from_millis(10), |_| {});
        assert!(!slot.is_pending());
    }
}
