use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    Resize,
    PointerDrag,
    Wheel,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 3] = [
        ListenerKind::Resize,
        ListenerKind::PointerDrag,
        ListenerKind::Wheel,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// The surface the preview is mounted in. Size is read live on every resize.
pub trait Container {
    fn size(&self) -> (u32, u32);
    fn pixel_ratio(&self) -> f32;
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;
    fn remove_listener(&mut self, id: ListenerId) -> bool;
}

#[derive(Debug, Default)]
struct HeadlessState {
    size: (u32, u32),
    pixel_ratio: f32,
    next_id: u64,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    removals: usize,
}

/// In-memory container. Clones share state, so a host can keep one handle to
/// resize it while the runtime owns another.
#[derive(Debug, Clone)]
pub struct HeadlessContainer {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessContainer {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState {
                size: (width, height),
                pixel_ratio,
                ..HeadlessState::default()
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut HeadlessState) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    pub fn set_size(&self, width: u32, height: u32) {
        self.with_state(|state| state.size = (width, height));
    }

    pub fn listener_count(&self) -> usize {
        self.with_state(|state| state.listeners.len())
    }

    pub fn listeners_of(&self, kind: ListenerKind) -> usize {
        self.with_state(|state| state.listeners.values().filter(|k| **k == kind).count())
    }

    pub fn removals(&self) -> usize {
        self.with_state(|state| state.removals)
    }
}

impl Container for HeadlessContainer {
    fn size(&self) -> (u32, u32) {
        self.with_state(|state| state.size)
    }

    fn pixel_ratio(&self) -> f32 {
        self.with_state(|state| state.pixel_ratio)
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.with_state(|state| {
            state.next_id += 1;
            let id = ListenerId(state.next_id);
            state.listeners.insert(id, kind);
            id
        })
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.with_state(|state| {
            let removed = state.listeners.remove(&id).is_some();
            if removed {
                state.removals += 1;
            }
            removed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_listeners_and_size() {
        let host = HeadlessContainer::new(800, 600, 2.0);
        let mut mounted = host.clone();
        let id = mounted.add_listener(ListenerKind::Wheel);
        host.set_size(1024, 768);

        assert_eq!(mounted.size(), (1024, 768));
        assert_eq!(host.listeners_of(ListenerKind::Wheel), 1);
        assert!(mounted.remove_listener(id));
        assert!(!mounted.remove_listener(id));
        assert_eq!(host.removals(), 1);
    }
}
