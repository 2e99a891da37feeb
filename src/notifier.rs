//! Fan-out of sun state changes to registered subscribers.
//!
//! Subscribers are plain closures kept in registration order. Notification is
//! synchronous: `notify` returns once every subscriber has run, on the thread
//! that called it. Because `notify` borrows the notifier mutably, a subscriber
//! cannot add or remove subscriptions while a fan-out is in progress.

use std::fmt;

use crate::sun_state::SunState;

/// Handle returned by a subscription, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(SunState)>;

/// Ordered list of state-change subscribers.
#[derive(Default)]
pub struct EventNotifier {
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_id: u64,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked with the new state on every transition.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(SunState) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Register a callback invoked only when the sun comes up.
    pub fn on_up<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut() + 'static,
    {
        self.subscribe(move |state| {
            if state == SunState::Up {
                callback();
            }
        })
    }

    /// Register a callback invoked only when the sun goes down.
    pub fn on_down<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut() + 'static,
    {
        self.subscribe(move |state| {
            if state == SunState::Down {
                callback();
            }
        })
    }

    /// Remove a subscription. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Invoke every subscriber, in subscription order, with `state`.
    pub fn notify(&mut self, state: SunState) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(state);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNotifier")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_in_subscription_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = EventNotifier::new();

        for tag in ["first", "second", "third"] {
            let calls = Rc::clone(&calls);
            notifier.subscribe(move |state| calls.borrow_mut().push((tag, state)));
        }

        notifier.notify(SunState::Up);

        assert_eq!(
            *calls.borrow(),
            vec![
                ("first", SunState::Up),
                ("second", SunState::Up),
                ("third", SunState::Up)
            ]
        );
    }

    #[test]
    fn test_unsubscribe_removes_only_that_subscriber() {
        let count = Rc::new(RefCell::new(0));
        let mut notifier = EventNotifier::new();

        let c = Rc::clone(&count);
        let first = notifier.subscribe(move |_| *c.borrow_mut() += 1);
        let c = Rc::clone(&count);
        notifier.subscribe(move |_| *c.borrow_mut() += 10);

        assert!(notifier.unsubscribe(first));
        assert!(!notifier.unsubscribe(first));
        assert_eq!(notifier.len(), 1);

        notifier.notify(SunState::Down);
        assert_eq!(*count.borrow(), 10);
    }

    #[test]
    fn test_up_and_down_filters() {
        let ups = Rc::new(RefCell::new(0));
        let downs = Rc::new(RefCell::new(0));
        let mut notifier = EventNotifier::new();

        let u = Rc::clone(&ups);
        notifier.on_up(move || *u.borrow_mut() += 1);
        let d = Rc::clone(&downs);
        notifier.on_down(move || *d.borrow_mut() += 1);

        notifier.notify(SunState::Up);
        notifier.notify(SunState::Down);
        notifier.notify(SunState::Up);

        assert_eq!(*ups.borrow(), 2);
        assert_eq!(*downs.borrow(), 1);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut notifier = EventNotifier::new();
        let a = notifier.subscribe(|_| {});
        notifier.unsubscribe(a);
        let b = notifier.subscribe(|_| {});
        assert_ne!(a, b);
        assert!(!notifier.is_empty());
    }
}
