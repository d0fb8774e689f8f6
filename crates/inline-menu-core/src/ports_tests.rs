use std::sync::atomic::{AtomicBool, Ordering};

use super::*;
use inline_menu_protocols::{FrameId, MessageSender, SurfaceCommand, TabContext};

struct FakePort {
    id: PortId,
    kind: SurfaceKind,
    sender: MessageSender,
    disconnected: AtomicBool,
}

impl FakePort {
    fn new(id: u64, tab: i64, kind: SurfaceKind) -> Arc<Self> {
        Arc::new(Self {
            id: PortId(id),
            kind,
            sender: MessageSender::new(TabContext::new(TabId(tab)), FrameId::TOP),
            disconnected: AtomicBool::new(false),
        })
    }

    fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

impl SurfacePort for FakePort {
    fn id(&self) -> PortId {
        self.id
    }

    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn sender(&self) -> &MessageSender {
        &self.sender
    }

    fn post(&self, _command: SurfaceCommand) {}

    fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}

#[test]
fn test_signing_key_shape() {
    let key = generate_signing_key();
    assert_eq!(key.len(), 12);
    assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn test_register_generates_key_once_per_tab() {
    let registry = PortRegistry::new();
    let first = registry.register(FakePort::new(1, 7, SurfaceKind::Button));
    let second = registry.register(FakePort::new(2, 7, SurfaceKind::List));

    assert_eq!(first.signing_key, second.signing_key);
    assert_eq!(first.replaced, None);
    assert_eq!(registry.signing_key(TabId(7)), Some(first.signing_key));
}

#[test]
fn test_signing_keys_are_isolated_per_tab() {
    let registry = PortRegistry::new();
    let a = registry.register(FakePort::new(1, 1, SurfaceKind::Button));
    let b = registry.register(FakePort::new(2, 2, SurfaceKind::Button));

    assert_ne!(a.signing_key, b.signing_key);
    assert!(registry.verify(TabId(1), Some(&a.signing_key)));
    assert!(!registry.verify(TabId(1), Some(&b.signing_key)));
    assert!(!registry.verify(TabId(1), None));
    assert!(!registry.verify(TabId(3), Some(&a.signing_key)));
}

#[test]
fn test_replacement_keeps_one_live_and_one_expired() {
    let registry = PortRegistry::new();
    let old = FakePort::new(1, 7, SurfaceKind::List);
    let new = FakePort::new(2, 7, SurfaceKind::List);

    registry.register(old.clone());
    let registration = registry.register(new.clone());

    assert_eq!(registration.replaced, Some(PortId(1)));
    assert_eq!(registry.lookup(TabId(7), SurfaceKind::List).map(|p| p.id()), Some(PortId(2)));
    assert_eq!(registry.expired_count(TabId(7)), 1);
    assert!(!old.is_disconnected());
}

#[test]
fn test_retire_if_stale_drains_all_tabs() {
    let registry = PortRegistry::new();
    let old_a = FakePort::new(1, 1, SurfaceKind::Button);
    let old_b = FakePort::new(2, 2, SurfaceKind::List);
    registry.register(old_a.clone());
    registry.register(FakePort::new(3, 1, SurfaceKind::Button));
    registry.register(old_b.clone());
    registry.register(FakePort::new(4, 2, SurfaceKind::List));

    assert_eq!(registry.retire_if_stale(), 2);
    assert!(old_a.is_disconnected());
    assert!(old_b.is_disconnected());
    assert_eq!(registry.expired_count(TabId(1)), 0);
    assert_eq!(registry.retire_if_stale(), 0);
}

#[test]
fn test_close_live_disconnects() {
    let registry = PortRegistry::new();
    let button = FakePort::new(1, 7, SurfaceKind::Button);
    registry.register(button.clone());

    assert!(registry.close_live(TabId(7), SurfaceKind::Button));
    assert!(button.is_disconnected());
    assert!(registry.lookup(TabId(7), SurfaceKind::Button).is_none());
    assert!(!registry.close_live(TabId(7), SurfaceKind::Button));
}

#[test]
fn test_port_disconnected_live_and_expired() {
    let registry = PortRegistry::new();
    let old = FakePort::new(1, 7, SurfaceKind::Button);
    let live = FakePort::new(2, 7, SurfaceKind::Button);
    registry.register(old.clone());
    registry.register(live.clone());

    assert_eq!(
        registry.port_disconnected(PortId(1)),
        Some(Released::Expired { tab: TabId(7) })
    );
    assert_eq!(
        registry.port_disconnected(PortId(2)),
        Some(Released::Live {
            tab: TabId(7),
            kind: SurfaceKind::Button
        })
    );
    assert_eq!(registry.port_disconnected(PortId(2)), None);
    assert!(!old.is_disconnected());
    assert!(!live.is_disconnected());
}

#[test]
fn test_live_ports_button_first() {
    let registry = PortRegistry::new();
    registry.register(FakePort::new(1, 7, SurfaceKind::List));
    registry.register(FakePort::new(2, 7, SurfaceKind::Button));

    let kinds: Vec<SurfaceKind> = registry.live_ports(TabId(7)).iter().map(|p| p.kind()).collect();
    assert_eq!(kinds, vec![SurfaceKind::Button, SurfaceKind::List]);
    assert!(registry.live_ports(TabId(8)).is_empty());
}

#[test]
fn test_remove_tab_disconnects_everything() {
    let registry = PortRegistry::new();
    let old = FakePort::new(1, 7, SurfaceKind::List);
    let list = FakePort::new(2, 7, SurfaceKind::List);
    let button = FakePort::new(3, 7, SurfaceKind::Button);
    registry.register(old.clone());
    registry.register(list.clone());
    registry.register(button.clone());

    registry.remove_tab(TabId(7));
    assert!(old.is_disconnected() && list.is_disconnected() && button.is_disconnected());
    assert_eq!(registry.signing_key(TabId(7)), None);
}
