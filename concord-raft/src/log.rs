use std::collections::BTreeMap;

use concord_raft_types::LogEntry;

/// The replicated log: entries keyed by index rather than stored
/// contiguously, since `AppendEntries` may deliver entries out of order.
///
/// Maintains `lastLogIndex`/`lastLogTerm` incrementally so callers never
/// need to rescan the map.
#[derive(Debug, Default)]
pub struct Log {
    entries: BTreeMap<u64, LogEntry>,
    last_log_index: u64,
    last_log_term: u64,
}

impl Log {
    /// An empty log: `lastLogIndex = lastLogTerm = 0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// `lastLogIndex`.
    pub fn last_log_index(&self) -> u64 {
        self.last_log_index
    }

    /// `lastLogTerm`.
    pub fn last_log_term(&self) -> u64 {
        self.last_log_term
    }

    /// The entry at `index`, if present.
    pub fn get(&self, index: u64) -> Option<&LogEntry> {
        self.entries.get(&index)
    }

    /// The term of the entry at `index`, if present.
    pub fn term_at(&self, index: u64) -> Option<u64> {
        self.entries.get(&index).map(|e| e.term)
    }

    /// Appends an entry at `self.last_log_index() + 1` under `term`,
    /// returning the new entry's index. Used by the leader when accepting
    /// a freshly submitted client payload.
    pub fn append_new(&mut self, term: u64, payload: Vec<u8>) -> u64 {
        let index = self.last_log_index + 1;
        self.insert(LogEntry {
            index,
            term,
            payload,
        });
        index
    }

    /// Inserts `entry`, truncating any conflicting suffix first, per the
    /// Log Matching Property.
    ///
    /// If an entry already exists at `entry.index` with a *different*
    /// term, every entry at index `>= entry.index` is deleted before the
    /// new one is inserted. If the existing entry has the *same* term, it
    /// is left untouched (its payload is guaranteed identical by the Log
    /// Matching Property) and `entry` is simply not re-inserted.
    pub fn insert(&mut self, entry: LogEntry) {
        if let Some(existing) = self.entries.get(&entry.index) {
            if existing.term == entry.term {
                return;
            }
            let conflicting: Vec<u64> = self
                .entries
                .range(entry.index..)
                .map(|(&i, _)| i)
                .collect();
            for i in conflicting {
                self.entries.remove(&i);
            }
        }
        self.last_log_index = self.last_log_index.max(entry.index);
        if entry.index == self.last_log_index {
            self.last_log_term = entry.term;
        }
        self.entries.insert(entry.index, entry);
    }

    /// Whether `prevLogIndex`/`prevLogTerm` match this log, per the
    /// `AppendEntries` consistency check. `prevLogIndex == 0` always
    /// matches (there's no entry to check).
    pub fn matches(&self, prev_log_index: u64, prev_log_term: u64) -> bool {
        if prev_log_index == 0 {
            return true;
        }
        self.term_at(prev_log_index) == Some(prev_log_term)
    }

    /// Payload at `index`, for delivery to the client sink.
    pub fn payload_at(&self, index: u64) -> Option<&[u8]> {
        self.entries.get(&index).map(|e| e.payload.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_new_advances_last_log_index() {
        let mut log = Log::new();
        let i1 = log.append_new(1, b"a".to_vec());
        let i2 = log.append_new(1, b"b".to_vec());
        assert_eq!((i1, i2), (1, 2));
        assert_eq!(log.last_log_index(), 2);
        assert_eq!(log.last_log_term(), 1);
    }

    #[test]
    fn conflicting_term_truncates_suffix() {
        let mut log = Log::new();
        log.insert(LogEntry { index: 1, term: 1, payload: b"a".to_vec() });
        log.insert(LogEntry { index: 2, term: 1, payload: b"b".to_vec() });
        log.insert(LogEntry { index: 3, term: 1, payload: b"c".to_vec() });

        log.insert(LogEntry { index: 2, term: 2, payload: b"x".to_vec() });

        assert!(log.get(3).is_none());
        assert_eq!(log.get(2).unwrap().payload, b"x");
        assert_eq!(log.last_log_index(), 2);
        assert_eq!(log.last_log_term(), 2);
    }

    #[test]
    fn matching_term_leaves_entry_in_place() {
        let mut log = Log::new();
        log.insert(LogEntry { index: 1, term: 1, payload: b"a".to_vec() });
        log.insert(LogEntry { index: 2, term: 1, payload: b"b".to_vec() });
        log.insert(LogEntry { index: 1, term: 1, payload: b"different".to_vec() });
        assert_eq!(log.get(1).unwrap().payload, b"a");
        assert_eq!(log.last_log_index(), 2);
    }

    #[test]
    fn prev_log_index_zero_always_matches() {
        let log = Log::new();
        assert!(log.matches(0, 0));
    }
}
