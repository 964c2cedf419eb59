//! Synchronous fan-out of world events to subscribed observers.

use std::fmt;

use tactics_core::Event;

/// Handle returned by [`Observers::subscribe`], used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&Event)>;

/// Registry of event observers notified in subscription order.
///
/// Observer panics propagate to the caller of [`Observers::publish`].
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to receive every published event.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription, reporting whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Delivers each event to every observer.
    pub fn publish(&mut self, events: &[Event]) {
        for event in events {
            for (_, callback) in &mut self.entries {
                callback(event);
            }
        }
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscriptions", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use tactics_core::Team;

    use super::*;

    #[test]
    fn observers_are_notified_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::new();
        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            let _ = observers.subscribe(move |event| {
                if let Event::TurnChanged { team } = event {
                    log.borrow_mut().push(format!("{name}:{team}"));
                }
            });
        }

        observers.publish(&[Event::TurnChanged { team: Team::Blue }]);
        assert_eq!(*log.borrow(), vec!["first:Blue", "second:Blue"]);
    }

    #[test]
    fn unsubscribed_observer_stops_receiving() {
        let count = Rc::new(RefCell::new(0));
        let mut observers = Observers::new();
        let id = {
            let count = Rc::clone(&count);
            observers.subscribe(move |_| *count.borrow_mut() += 1)
        };

        observers.publish(&[Event::SelectionCleared]);
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.publish(&[Event::SelectionCleared]);

        assert_eq!(*count.borrow(), 1);
        assert!(observers.is_empty());
    }
}
