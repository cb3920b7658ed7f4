use super::table::ParticleTable;
use std::collections::HashMap;

/// Identity of a simulated collision event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventInfo {
    pub run_number: u32,
    pub event_number: u64,
    /// Monte Carlo channel (process) number of the sample.
    pub channel_number: u32,
}

impl EventInfo {
    pub fn new(run_number: u32, event_number: u64, channel_number: u32) -> Self {
        Self {
            run_number,
            event_number,
            channel_number,
        }
    }
}

/// Per-event object store, keyed by name.
///
/// Holds at most one [`EventInfo`] record and any number of named particle
/// collections. Everything is immutable once the event has been read;
/// consumers borrow from the store for the duration of one processing call.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    info: Option<(String, EventInfo)>,
    collections: HashMap<String, ParticleTable>,
    collection_order: Vec<String>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(key: &str, info: EventInfo) -> Self {
        let mut store = Self::new();
        store.set_info(key, info);
        store
    }

    pub fn set_info(&mut self, key: &str, info: EventInfo) {
        self.info = Some((key.to_string(), info));
    }

    /// Adds a named collection, returning `false` if the name is already taken.
    pub fn insert_collection(&mut self, name: &str, table: ParticleTable) -> bool {
        if self.collections.contains_key(name) {
            return false;
        }
        self.collection_order.push(name.to_string());
        self.collections.insert(name.to_string(), table);
        true
    }

    /// Retrieves the event-identity record stored under `key`.
    pub fn event_info(&self, key: &str) -> Option<&EventInfo> {
        self.info
            .as_ref()
            .filter(|(stored_key, _)| stored_key == key)
            .map(|(_, info)| info)
    }

    /// Key and value of the identity record, whatever its key.
    pub fn info_entry(&self) -> Option<(&str, &EventInfo)> {
        self.info.as_ref().map(|(key, info)| (key.as_str(), info))
    }

    pub fn collection(&self, name: &str) -> Option<&ParticleTable> {
        self.collections.get(name)
    }

    /// Iterates named collections in the order they were inserted.
    pub fn collections(&self) -> impl Iterator<Item = (&str, &ParticleTable)> {
        self.collection_order
            .iter()
            .filter_map(move |name| self.collections.get(name).map(|t| (name.as_str(), t)))
    }
}
