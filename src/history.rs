//! Exchange history with a live filtered projection
//!
//! A [`HistoryStore`] holds exchanges in submission order. Entries are only
//! ever appended, except that a running exchange has its provisional payload
//! rewritten while output streams in and is finalized once. The filtered
//! projection is recomputed whenever the filter text or the entries change.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::{Exchange, ExchangeId, Payload, Termination};

/// Ordered exchange history plus its filtered view
#[derive(Debug, Default)]
pub struct HistoryStore {
    /// All exchanges, oldest first
    entries: Vec<Exchange>,
    /// Position of each exchange in `entries`
    index: HashMap<ExchangeId, usize>,
    /// Active filter text
    filter: String,
    /// Positions of the entries matching `filter`
    filtered: Vec<usize>,
}

impl HistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an exchange and return its identifier
    pub fn append(&mut self, exchange: Exchange) -> ExchangeId {
        let id = exchange.id;
        let position = self.entries.len();
        if self.matches_filter(&exchange) {
            self.filtered.push(position);
        }
        self.index.insert(id, position);
        self.entries.push(exchange);
        id
    }

    /// Look up an exchange
    pub fn get(&self, id: ExchangeId) -> Option<&Exchange> {
        self.index.get(&id).and_then(|&i| self.entries.get(i))
    }

    /// All exchanges, oldest first
    pub fn entries(&self) -> &[Exchange] {
        &self.entries
    }

    /// Exchanges matching the active filter, oldest first
    pub fn filtered(&self) -> impl Iterator<Item = &Exchange> + '_ {
        self.filtered.iter().filter_map(|&i| self.entries.get(i))
    }

    /// Number of exchanges matching the active filter
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Active filter text
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Replace the filter text and recompute the projection.
    ///
    /// Matching is a case-insensitive substring test on the command text;
    /// an empty filter matches everything.
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.recompute_filter();
    }

    /// Overwrite the provisional payload of a running exchange.
    ///
    /// Returns `Ok(false)` if the exchange has already completed.
    pub fn update_provisional(&mut self, id: ExchangeId, payload: Payload) -> Result<bool> {
        Ok(self.get_mut(id)?.update_provisional(payload))
    }

    /// Finalize a running exchange. `None` keeps the provisional payload.
    pub fn complete(
        &mut self,
        id: ExchangeId,
        payload: Option<Payload>,
        termination: Termination,
        duration: Duration,
    ) -> Result<()> {
        self.get_mut(id)?.complete(payload, termination, duration)
    }

    /// Number of exchanges
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard every exchange. The filter text is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.filtered.clear();
    }

    /// Command text of every exchange, oldest first
    pub fn command_lines(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.command.as_str()).collect()
    }

    /// Snapshot the unfiltered history as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    fn get_mut(&mut self, id: ExchangeId) -> Result<&mut Exchange> {
        self.index
            .get(&id)
            .copied()
            .and_then(|i| self.entries.get_mut(i))
            .ok_or_else(|| Error::ExchangeNotFound { id: id.to_string() })
    }

    fn matches_filter(&self, exchange: &Exchange) -> bool {
        self.filter.is_empty()
            || exchange
                .command
                .to_lowercase()
                .contains(&self.filter.to_lowercase())
    }

    fn recompute_filter(&mut self) {
        let filtered: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.matches_filter(e))
            .map(|(i, _)| i)
            .collect();
        self.filtered = filtered;
    }
}
