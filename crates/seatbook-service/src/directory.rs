//! Registry of events known to the running engine.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::EventId;
use seatbook_entity::event::Event;

/// Events loaded at warm start plus any opened at runtime.
#[derive(Debug, Default)]
pub struct EventDirectory {
    events: DashMap<EventId, Event>,
}

impl EventDirectory {
    /// Build a directory from the store's event list.
    pub fn new(events: Vec<Event>) -> Self {
        let directory = Self::default();
        for event in events {
            directory.events.insert(event.id, event);
        }
        directory
    }

    /// Register an event. Returns `false` if the ID was already known.
    pub fn insert(&self, event: Event) -> bool {
        match self.events.entry(event.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(event);
                true
            }
        }
    }

    /// Look up an event by ID.
    pub fn get(&self, id: EventId) -> Option<Event> {
        self.events.get(&id).map(|e| e.value().clone())
    }

    /// Look up an event, failing with `invalid_event` when unknown.
    pub fn require(&self, id: EventId) -> AppResult<Event> {
        self.get(id).ok_or_else(|| invalid_event(id))
    }

    /// Look up an event visible to users. Closed events still qualify.
    pub fn require_public(&self, id: EventId) -> AppResult<Event> {
        self.get(id)
            .filter(|e| e.public)
            .ok_or_else(|| invalid_event(id))
    }

    /// Look up an event that is public and still selling.
    pub fn require_on_sale(&self, id: EventId) -> AppResult<Event> {
        self.get(id)
            .filter(Event::is_on_sale)
            .ok_or_else(|| invalid_event(id))
    }

    /// All events, ordered by ID.
    pub fn all(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.iter().map(|e| e.value().clone()).collect();
        events.sort_by_key(|e| e.id);
        events
    }

    /// All event IDs, ascending.
    pub fn ids(&self) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self.events.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    /// Number of registered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are registered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn invalid_event(id: EventId) -> AppError {
    AppError::not_found(format!("Event {id} is not available")).with_code("invalid_event")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, public: bool, closed: bool) -> Event {
        Event {
            id: EventId(id),
            title: format!("Event {id}"),
            public,
            closed,
            price: 1000,
        }
    }

    #[test]
    fn test_require_public_accepts_closed_events() {
        let directory = EventDirectory::new(vec![event(1, true, true), event(2, false, false)]);

        assert!(directory.require_public(EventId(1)).is_ok());
        for id in [2, 3] {
            let err = directory.require_public(EventId(id)).expect_err("hidden or unknown");
            assert_eq!(err.code(), "invalid_event");
        }
    }

    #[test]
    fn test_require_on_sale_rejects_hidden_and_closed() {
        let directory = EventDirectory::new(vec![
            event(1, true, false),
            event(2, false, false),
            event(3, true, true),
        ]);

        assert!(directory.require_on_sale(EventId(1)).is_ok());
        for id in [2, 3, 4] {
            let err = directory.require_on_sale(EventId(id)).expect_err("not on sale");
            assert_eq!(err.code(), "invalid_event");
        }
        assert!(directory.require(EventId(3)).is_ok());
    }

    #[test]
    fn test_insert_keeps_first_registration() {
        let directory = EventDirectory::new(vec![event(2, true, false)]);
        assert!(directory.insert(event(1, true, false)));
        assert!(!directory.insert(event(1, false, true)));

        assert_eq!(directory.ids(), vec![EventId(1), EventId(2)]);
        assert!(directory.get(EventId(1)).expect("registered").public);
        assert_eq!(directory.len(), 2);
    }
}
