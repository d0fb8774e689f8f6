//! Event debounce pipeline.
//!
//! Each stream is an explicit timer task plus a latest-payload slot. A trigger
//! replaces the payload and restarts the timer; when the timer elapses the
//! payload is claimed under the slot lock and the action runs. A cancel that
//! arrives before the claim suppresses the action. Once claimed, the action is
//! never aborted.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use inline_menu_config::DebounceConfig;
use inline_menu_protocols::{MessageSender, TabId};

type Action<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

fn boxed_action<T, F, Fut>(action: F) -> Action<T>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |payload| action(payload).boxed())
}

struct Slot<T> {
    generation: u64,
    pending: Option<T>,
    timer: Option<JoinHandle<()>>,
}

/// Trailing-edge debounce: N triggers within the window run the action once,
/// with the latest payload.
pub struct Debouncer<T> {
    name: &'static str,
    window: Duration,
    action: Action<T>,
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(name: &'static str, window: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            window,
            action: boxed_action(action),
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                pending: None,
                timer: None,
            })),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Store `payload` and restart the window.
    pub fn trigger(&self, payload: T) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        let generation = slot.generation;
        slot.pending = Some(payload);
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }

        let shared = Arc::clone(&self.slot);
        let action = Arc::clone(&self.action);
        let window = self.window;
        let name = self.name;
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let payload = {
                let mut slot = shared.lock();
                if slot.generation != generation {
                    return;
                }
                slot.timer = None;
                slot.pending.take()
            };
            if let Some(payload) = payload {
                trace!(stream = name, "Debounce window elapsed");
                action(payload).await;
            }
        }));
    }

    /// Drop the pending payload. Returns whether anything was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        let cancelled = slot.pending.take().is_some();
        if cancelled {
            debug!(stream = self.name, "Debounced action cancelled");
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().pending.is_some()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.slot.lock().timer.take() {
            timer.abort();
        }
    }
}

/// Leading-edge throttle: the first trigger runs immediately, later triggers
/// inside the window are dropped.
pub struct Throttle<T> {
    name: &'static str,
    window: Duration,
    action: Action<T>,
    last_fired: Mutex<Option<Instant>>,
}

impl<T: Send + 'static> Throttle<T> {
    pub fn new<F, Fut>(name: &'static str, window: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            window,
            action: boxed_action(action),
            last_fired: Mutex::new(None),
        }
    }

    /// Run the action unless it already ran inside the window.
    /// Returns whether it was started.
    pub fn trigger(&self, payload: T) -> bool {
        let now = Instant::now();
        {
            let mut last_fired = self.last_fired.lock();
            if let Some(previous) = *last_fired {
                if now.duration_since(previous) < self.window {
                    trace!(stream = self.name, "Throttled trigger dropped");
                    return false;
                }
            }
            *last_fired = Some(now);
        }
        tokio::spawn((self.action)(payload));
        true
    }
}

/// Callbacks driven by the pipeline timers.
#[async_trait]
pub trait PipelineHandler: Send + Sync + 'static {
    /// Scroll/resize has settled.
    async fn reposition_settled(&self, sender: MessageSender);

    /// Re-resolve every cached sub-frame offset of the sender's tab.
    async fn rebuild_sub_frame_offsets(&self, sender: MessageSender);

    /// Push positions after a rebuild has settled.
    async fn position_update_settled(&self, sender: MessageSender);

    /// Reveal the surfaces of a tab.
    async fn fade_in(&self, tab: TabId);
}

/// The coalescing streams of the coordinator.
pub struct EventPipeline {
    pub reposition: Debouncer<MessageSender>,
    pub rebuild_sub_frames: Throttle<MessageSender>,
    pub position_update: Debouncer<MessageSender>,
    pub fade_in: Debouncer<TabId>,
}

impl EventPipeline {
    /// Build the streams. The handler is held weakly so the pipeline can live
    /// inside the value it drives.
    pub fn new<H: PipelineHandler>(config: &DebounceConfig, handler: Weak<H>) -> Self {
        let on_reposition = handler.clone();
        let on_rebuild = handler.clone();
        let on_position = handler.clone();
        let on_fade_in = handler;

        Self {
            reposition: Debouncer::new("reposition", config.reposition(), move |sender| {
                let handler = on_reposition.upgrade();
                async move {
                    if let Some(handler) = handler {
                        handler.reposition_settled(sender).await;
                    }
                }
            }),
            rebuild_sub_frames: Throttle::new(
                "rebuild_sub_frames",
                config.rebuild_sub_frame(),
                move |sender| {
                    let handler = on_rebuild.upgrade();
                    async move {
                        if let Some(handler) = handler {
                            handler.rebuild_sub_frame_offsets(sender).await;
                        }
                    }
                },
            ),
            position_update: Debouncer::new(
                "position_update",
                config.position_update(),
                move |sender| {
                    let handler = on_position.upgrade();
                    async move {
                        if let Some(handler) = handler {
                            handler.position_update_settled(sender).await;
                        }
                    }
                },
            ),
            fade_in: Debouncer::new("fade_in", config.fade_in(), move |tab| {
                let handler = on_fade_in.upgrade();
                async move {
                    if let Some(handler) = handler {
                        handler.fade_in(tab).await;
                    }
                }
            }),
        }
    }

    /// Cancel the position-update and fade-in settles.
    pub fn cancel_settles(&self) {
        self.position_update.cancel();
        self.fade_in.cancel();
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
