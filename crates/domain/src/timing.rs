//! Named operation timers.
//!
//! The registry stores one entry per operation name. Starting a name that
//! already exists replaces its marks in place, so summaries keep the order in
//! which each name was first started.

use crate::format::{format_millis, round_millis};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A single measurement keyed by operation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingEntry {
    operation_name: Box<str>,
    start_mark: Instant,
    finish: Option<TimingFinish>,
}

/// End mark and duration are recorded together or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimingFinish {
    end_mark: Instant,
    duration: Duration,
}

impl TimingEntry {
    fn started(operation_name: &str, start_mark: Instant) -> Self {
        Self {
            operation_name: operation_name.into(),
            start_mark,
            finish: None,
        }
    }

    /// Operation name this entry is keyed by.
    #[must_use]
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    /// Monotonic start mark.
    #[must_use]
    pub const fn start_mark(&self) -> Instant {
        self.start_mark
    }

    /// Monotonic end mark, once the timer completed.
    #[must_use]
    pub fn end_mark(&self) -> Option<Instant> {
        self.finish.map(|finish| finish.end_mark)
    }

    /// Full-precision duration (`end_mark - start_mark`), once the timer completed.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.finish.map(|finish| finish.duration)
    }

    /// Duration rounded to the nearest millisecond.
    #[must_use]
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration().map(round_millis)
    }

    /// True once `end_mark` and `duration` are recorded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.finish.is_some()
    }
}

/// Mapping from operation name to its latest [`TimingEntry`].
#[derive(Debug, Clone, Default)]
pub struct TimingRegistry {
    entries: Vec<TimingEntry>,
    positions: HashMap<Box<str>, usize>,
}

impl TimingRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a start mark for `operation_name`, replacing any previous entry.
    pub fn start(&mut self, operation_name: &str, now: Instant) {
        let entry = TimingEntry::started(operation_name, now);
        match self.positions.get(operation_name).copied() {
            Some(position) => {
                if let Some(slot) = self.entries.get_mut(position) {
                    *slot = entry;
                }
            },
            None => {
                self.positions
                    .insert(operation_name.into(), self.entries.len());
                self.entries.push(entry);
            },
        }
    }

    /// Seal the entry for `operation_name` with `now` as its end mark.
    ///
    /// Returns `None` (and creates nothing) when the name was never started.
    /// Finishing an already completed entry re-measures from the same start mark.
    pub fn finish(&mut self, operation_name: &str, now: Instant) -> Option<&TimingEntry> {
        let position = self.positions.get(operation_name).copied()?;
        let entry = self.entries.get_mut(position)?;
        entry.finish = Some(TimingFinish {
            end_mark: now,
            duration: now.saturating_duration_since(entry.start_mark),
        });
        Some(entry)
    }

    /// Read-only lookup.
    #[must_use]
    pub fn get(&self, operation_name: &str) -> Option<&TimingEntry> {
        let position = self.positions.get(operation_name).copied()?;
        self.entries.get(position)
    }

    /// Completed timers in first-start order, formatted as `"<n>ms"`.
    #[must_use]
    pub fn summary(&self) -> TimingSummary {
        let rows = self
            .entries
            .iter()
            .filter_map(|entry| {
                entry
                    .duration_ms()
                    .map(|ms| (entry.operation_name.clone(), format_millis(ms)))
            })
            .collect();
        TimingSummary(rows)
    }

    /// Iterate all entries, including in-flight timers, in first-start order.
    pub fn iter(&self) -> impl Iterator<Item = &TimingEntry> {
        self.entries.iter()
    }

    /// Number of distinct operation names tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no timer was ever started (or after [`Self::clear`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, completed or not.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }
}

/// Ordered operation-name → formatted-duration mapping.
///
/// Serializes as a JSON object preserving order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingSummary(Vec<(Box<str>, String)>);

impl TimingSummary {
    /// Formatted duration for `operation_name`, if it completed.
    #[must_use]
    pub fn get(&self, operation_name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name.as_ref() == operation_name)
            .map(|(_, formatted)| formatted.as_str())
    }

    /// Rows in first-start order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, formatted)| (name.as_ref(), formatted.as_str()))
    }

    /// Number of completed timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no timer completed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TimingSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, formatted) in &self.0 {
            map.serialize_entry(name.as_ref(), formatted)?;
        }
        map.end()
    }
}
