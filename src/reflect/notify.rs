//! Change notification: subjects announce, synchronously, which member changed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use super::ObjectRef;

/// Callback receiving the name of the member that changed.
pub type PropertyChangedHandler = Rc<dyn Fn(&str)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscribe/unsubscribe lifecycle for property-changed callbacks.
pub trait NotifyPropertyChanged {
    fn subscribe(&mut self, handler: PropertyChangedHandler) -> SubscriptionId;

    /// Returns whether a subscription was removed.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Property-changed event that objects embed and raise from their setters.
#[derive(Default)]
pub struct PropertyChanged {
    next_id: u64,
    handlers: Vec<(SubscriptionId, PropertyChangedHandler)>,
}

impl PropertyChanged {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invokes every subscriber with `property`.
    pub fn raise(&self, property: &str) {
        for (_, handler) in &self.handlers {
            handler(property);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl NotifyPropertyChanged for PropertyChanged {
    fn subscribe(&mut self, handler: PropertyChangedHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }
}

impl fmt::Debug for PropertyChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChanged")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

/// Records the most recent member a subject announced as changed.
///
/// Subscribes on [`ChangeWatcher::attach`] and unsubscribes on drop. Only the
/// single latest name is kept.
pub struct ChangeWatcher {
    subject: ObjectRef,
    subscription: SubscriptionId,
    last_changed: Rc<RefCell<Option<String>>>,
}

impl ChangeWatcher {
    /// `None` when the subject has no change-notification capability.
    pub fn attach(subject: &ObjectRef) -> Option<Self> {
        let last_changed = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&last_changed);
        let handler: PropertyChangedHandler = Rc::new(move |name: &str| {
            *sink.borrow_mut() = Some(name.to_string());
        });
        let subscription = subject.subscribe(handler)?;
        debug!("Watching property changes on {}", subject.type_handle());
        Some(Self { subject: subject.clone(), subscription, last_changed })
    }

    pub fn last_changed(&self) -> Option<String> {
        self.last_changed.borrow().clone()
    }

    /// Returns the last notified name and clears it.
    pub fn take(&self) -> Option<String> {
        self.last_changed.borrow_mut().take()
    }

    pub fn reset(&self) {
        self.last_changed.borrow_mut().take();
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        if !self.subject.unsubscribe(self.subscription) {
            debug!("Subscription on {} was already gone", self.subject.type_handle());
        }
    }
}

impl fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeWatcher")
            .field("subject", &self.subject)
            .field("last_changed", &self.last_changed.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_raise_reaches_every_subscriber() {
        let mut event = PropertyChanged::new();
        let calls = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let calls = Rc::clone(&calls);
            event.subscribe(Rc::new(move |_| calls.set(calls.get() + 1)));
        }
        event.raise("Name");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_handler() {
        let mut event = PropertyChanged::new();
        let first = event.subscribe(Rc::new(|_| {}));
        let _second = event.subscribe(Rc::new(|_| {}));
        assert!(event.unsubscribe(first));
        assert!(!event.unsubscribe(first));
        assert_eq!(event.subscriber_count(), 1);
    }
}
