//! Change notifications for presentation layers.
//!
//! The library owns no rendering logic. After each mutation it emits a
//! [`LibraryEvent`] so that a UI can re-read what it shows. Delivery is
//! synchronous and in-process: subscribers get an `mpsc::Receiver` and drain
//! it whenever convenient.
//!
//! ```rust
//! use nametagapp::events::{EventBus, LibraryEvent};
//!
//! let bus = EventBus::new();
//! let rx = bus.subscribe();
//! bus.emit(LibraryEvent::TagsChanged { tags: vec!["beach".into()] });
//! assert!(matches!(rx.try_recv(), Ok(LibraryEvent::TagsChanged { .. })));
//! ```

use crate::file::FileKey;
use serde::Serialize;
use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LibraryEvent {
    /// The tag table changed; carries the full, sorted tag list.
    TagsChanged { tags: Vec<String> },
    /// One file's name, tags or location changed; selections showing it
    /// should refresh.
    FileChanged { key: FileKey },
    /// A directory load replaced the working set.
    WorkingSetChanged { count: usize },
}

#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<Vec<Sender<LibraryEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every live subscriber.
    ///
    /// Returns how many received it. Subscribers whose receiver was dropped
    /// are forgotten.
    pub fn emit(&self, event: LibraryEvent) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    /// Subscribe to all future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<LibraryEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
