use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use super::*;
use inline_menu_protocols::FrameError;

#[derive(Clone)]
enum Answer {
    Offset(f64, f64),
    Null,
    Fail,
    Hang,
}

#[derive(Default)]
struct FakeFrames {
    tree: HashMap<FrameId, FrameDetails>,
    answers: HashMap<FrameId, Answer>,
    probes: AtomicUsize,
    notified: Mutex<Vec<(FrameId, &'static str)>>,
}

impl FakeFrames {
    fn frame(mut self, id: i64, parent: Option<i64>, answer: Answer) -> Self {
        self.tree.insert(
            FrameId(id),
            FrameDetails {
                frame_id: FrameId(id),
                parent_frame_id: parent.map(FrameId),
                url: format!("https://frame{}.test/", id),
            },
        );
        self.answers.insert(FrameId(id), answer);
        self
    }

    /// A chain 0 <- 1 <- 2 ... <- depth, each frame at (10, 5) inside its parent.
    fn chain(depth: i64) -> Self {
        let mut frames = Self::default().frame(0, None, Answer::Offset(10.0, 5.0));
        for id in 1..=depth {
            frames = frames.frame(id, Some(id - 1), Answer::Offset(10.0, 5.0));
        }
        frames
    }

    fn notified(&self) -> Vec<(FrameId, &'static str)> {
        self.notified.lock().clone()
    }
}

#[async_trait]
impl FrameMessenger for FakeFrames {
    async fn request(
        &self,
        _tab: TabId,
        frame: FrameId,
        request: FrameRequest,
    ) -> Result<Option<Value>, FrameError> {
        assert_eq!(request.command_name(), "getSubFrameOffsets");
        self.probes.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(&frame).cloned() {
            Some(Answer::Offset(top, left)) => Ok(Some(json!({ "top": top, "left": left }))),
            Some(Answer::Null) => Ok(None),
            Some(Answer::Hang) => std::future::pending().await,
            Some(Answer::Fail) | None => Err(FrameError::ChannelClosed),
        }
    }

    async fn notify(&self, _tab: TabId, frame: FrameId, request: FrameRequest) -> Result<(), FrameError> {
        self.notified.lock().push((frame, request.command_name()));
        Ok(())
    }

    async fn frame_details(&self, _tab: TabId, frame: FrameId) -> Option<FrameDetails> {
        self.tree.get(&frame).cloned()
    }
}

fn cache(max_depth: usize) -> GeometryCache {
    GeometryCache::new(&GeometryConfig {
        max_sub_frame_depth: max_depth,
        probe_timeout_ms: 100,
    })
}

const TAB: TabId = TabId(7);

#[tokio::test]
async fn test_top_frame_resolves_to_zero_without_probing() {
    let frames = FakeFrames::chain(0);
    let cache = cache(8);

    let entry = cache.resolve_offset(&frames, TAB, FrameId::TOP, false).await;
    let offsets = entry.resolved().unwrap();
    assert_eq!((offsets.top, offsets.left), (0.0, 0.0));
    assert_eq!(frames.probes.load(Ordering::SeqCst), 0);
    assert!(cache.cached(TAB, FrameId::TOP).is_none());
}

#[tokio::test]
async fn test_nested_frame_accumulates_offsets() {
    let frames = FakeFrames::chain(3);
    let cache = cache(8);

    let entry = cache.resolve_offset(&frames, TAB, FrameId(3), false).await;
    let offsets = entry.resolved().unwrap();
    assert_eq!(offsets.top, 30.0);
    assert_eq!(offsets.left, 15.0);
    assert_eq!(offsets.url, "https://frame3.test/");
    assert_eq!(offsets.parent_frame_ids, vec![FrameId(0), FrameId(1), FrameId(2)]);
    assert_eq!(frames.probes.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_cached_entry_short_circuits_unless_forced() {
    let frames = FakeFrames::chain(2);
    let cache = cache(8);

    cache.resolve_offset(&frames, TAB, FrameId(2), false).await;
    cache.resolve_offset(&frames, TAB, FrameId(2), false).await;
    assert_eq!(frames.probes.load(Ordering::SeqCst), 2);

    cache.resolve_offset(&frames, TAB, FrameId(2), true).await;
    assert_eq!(frames.probes.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_failed_probe_is_unresolved_and_tears_down() {
    let frames = FakeFrames::default()
        .frame(0, None, Answer::Fail)
        .frame(1, Some(0), Answer::Offset(1.0, 1.0));
    let cache = cache(8);

    let entry = cache.resolve_offset(&frames, TAB, FrameId(1), false).await;
    assert_eq!(entry, OffsetEntry::Unresolved);
    assert_eq!(cache.cached(TAB, FrameId(1)), Some(OffsetEntry::Unresolved));
    assert_eq!(
        frames.notified(),
        vec![(FrameId(1), "destroyAutofillInlineMenuListeners")]
    );
}

#[tokio::test]
async fn test_parent_without_answer_falls_back_to_window_message() {
    let frames = FakeFrames::default()
        .frame(0, None, Answer::Null)
        .frame(1, Some(0), Answer::Offset(1.0, 1.0));
    let cache = cache(8);

    let entry = cache.resolve_offset(&frames, TAB, FrameId(1), false).await;
    assert_eq!(entry, OffsetEntry::Unresolved);
    assert_eq!(
        frames.notified(),
        vec![(FrameId(1), "getSubFrameOffsetsFromWindowMessage")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_hanging_probe_times_out() {
    let frames = FakeFrames::default()
        .frame(0, None, Answer::Hang)
        .frame(1, Some(0), Answer::Offset(1.0, 1.0));
    let cache = cache(8);

    let entry = cache.resolve_offset(&frames, TAB, FrameId(1), false).await;
    assert_eq!(entry, OffsetEntry::Unresolved);
    assert_eq!(frames.notified().len(), 1);
}

#[tokio::test]
async fn test_unknown_frame_is_unresolved_silently() {
    let frames = FakeFrames::chain(0);
    let cache = cache(8);

    let entry = cache.resolve_offset(&frames, TAB, FrameId(42), false).await;
    assert_eq!(entry, OffsetEntry::Unresolved);
    assert!(frames.notified().is_empty());
}

#[tokio::test]
async fn test_depth_bound_tears_down_once_per_frame() {
    let frames = FakeFrames::chain(4);
    let cache = cache(3);

    for _ in 0..3 {
        let entry = cache.resolve_offset(&frames, TAB, FrameId(4), false).await;
        assert_eq!(entry, OffsetEntry::Unresolved);
    }
    assert_eq!(
        frames.notified(),
        vec![(FrameId(4), "destroyAutofillInlineMenuListeners")]
    );
    // Two hops were probed on each attempt before the bound was reached.
    assert_eq!(frames.probes.load(Ordering::SeqCst), 6);

    cache.remove_frame(TAB, FrameId(4));
    cache.resolve_offset(&frames, TAB, FrameId(4), false).await;
    assert_eq!(frames.notified().len(), 2);
}

#[tokio::test]
async fn test_frame_below_bound_resolves() {
    let frames = FakeFrames::chain(2);
    let cache = cache(3);

    let entry = cache.resolve_offset(&frames, TAB, FrameId(2), false).await;
    assert!(entry.is_resolved());
    assert!(frames.notified().is_empty());
}

#[tokio::test]
async fn test_unresolved_entry_is_retried() {
    let frames = FakeFrames::default()
        .frame(0, None, Answer::Null)
        .frame(1, Some(0), Answer::Offset(1.0, 1.0));
    let cache = cache(8);

    cache.resolve_offset(&frames, TAB, FrameId(1), false).await;
    cache.resolve_offset(&frames, TAB, FrameId(1), false).await;
    assert_eq!(frames.probes.load(Ordering::SeqCst), 2);
    assert_eq!(cache.cached(TAB, FrameId(1)), Some(OffsetEntry::Unresolved));
}

#[tokio::test]
async fn test_page_reported_offsets_are_cached() {
    let frames = FakeFrames::chain(1);
    let cache = cache(8);
    let offsets = SubFrameOffsets {
        url: "https://frame1.test/".to_string(),
        top: 12.0,
        left: 3.0,
        parent_frame_ids: vec![FrameId::TOP],
    };

    cache.update_from_page(TAB, FrameId(1), offsets.clone());
    let entry = cache.resolve_offset(&frames, TAB, FrameId(1), false).await;
    assert_eq!(entry, OffsetEntry::Resolved(offsets));
    assert_eq!(frames.probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rebuild_tab_forces_every_cached_frame() {
    let frames = FakeFrames::chain(2);
    let cache = cache(8);
    cache.resolve_offset(&frames, TAB, FrameId(1), false).await;
    cache.resolve_offset(&frames, TAB, FrameId(2), false).await;
    assert_eq!(frames.probes.load(Ordering::SeqCst), 3);

    let resolved = cache.rebuild_tab(&frames, TAB).await;
    assert_eq!(resolved, 2);
    assert_eq!(frames.probes.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_remove_tab_clears_entries() {
    let frames = FakeFrames::chain(1);
    let cache = cache(8);
    cache.resolve_offset(&frames, TAB, FrameId(1), false).await;
    cache.resolve_offset(&frames, TabId(8), FrameId(1), false).await;

    cache.remove_tab(TAB);
    assert!(cache.cached_frames(TAB).is_empty());
    assert_eq!(cache.cached_frames(TabId(8)), vec![FrameId(1)]);
}
