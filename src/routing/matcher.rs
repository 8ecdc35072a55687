//! Event-name matching.
//!
//! # Responsibilities
//! - Turn an endpoint's configured allow-list into a compiled filter
//! - Decide whether an incoming event name is acceptable
//!
//! # Design Decisions
//! - `"*"` anywhere in the list accepts everything
//! - Absent list = always matches (wildcard)
//! - Exact, case-sensitive comparison; no globbing

use crate::config::AcceptedEvents;

/// Wildcard event name.
pub const WILDCARD: &str = "*";

/// Compiled event allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    /// Every event is accepted.
    Any,
    /// Only these event names are accepted.
    Only(Vec<String>),
}

impl EventFilter {
    pub fn from_config(configured: Option<&AcceptedEvents>) -> Self {
        match configured {
            None => EventFilter::Any,
            Some(AcceptedEvents::One(name)) if name == WILDCARD => EventFilter::Any,
            Some(AcceptedEvents::One(name)) => EventFilter::Only(vec![name.clone()]),
            Some(AcceptedEvents::Many(names)) if names.iter().any(|n| n == WILDCARD) => {
                EventFilter::Any
            }
            Some(AcceptedEvents::Many(names)) => EventFilter::Only(names.clone()),
        }
    }

    pub fn accepts(&self, event: &str) -> bool {
        match self {
            EventFilter::Any => true,
            EventFilter::Only(names) => names.iter().any(|n| n == event),
        }
    }
}

/// Returns true if `event` is allowed by the configured list.
pub fn accepts(configured: Option<&AcceptedEvents>, event: &str) -> bool {
    EventFilter::from_config(configured).accepts(event)
}
