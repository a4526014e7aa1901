//! Recency tracking that steers selection away from repeats.

use std::collections::VecDeque;

use crate::types::GroupKey;

/// Which recency list a filter call consults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryKind {
    /// Grammar-group keys chosen by recent full passes.
    GroupKeys,
    /// Comma-joined example-id sets produced by recent full passes.
    ExampleIds,
}

/// Bounded windows of recently used group keys and example-id sets.
///
/// Both windows share one limit and age out oldest-first. Filtering is
/// advisory: when every candidate is recent the caller falls back to the
/// full candidate list rather than failing.
#[derive(Clone, Debug)]
pub struct SelectionHistory {
    limit: usize,
    recent_groups: VecDeque<GroupKey>,
    recent_example_ids: VecDeque<String>,
}

impl SelectionHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            recent_groups: VecDeque::new(),
            recent_example_ids: VecDeque::new(),
        }
    }

    /// Candidates that are neither `current` nor in the recent window.
    ///
    /// Preserves candidate order. May return an empty vector; the caller
    /// decides whether that means "reuse the full list" or "give up".
    pub fn filter_fresh(
        &self,
        candidates: &[String],
        current: Option<&str>,
        kind: HistoryKind,
    ) -> Vec<String> {
        let recent = self.recent(kind);
        candidates
            .iter()
            .filter(|candidate| {
                current != Some(candidate.as_str()) && !recent.contains(candidate)
            })
            .cloned()
            .collect()
    }

    /// Record one full pass: the chosen group and its example-id set.
    pub fn record(&mut self, group: GroupKey, example_ids: String) {
        push_bounded(&mut self.recent_groups, group, self.limit);
        push_bounded(&mut self.recent_example_ids, example_ids, self.limit);
    }

    pub fn clear(&mut self) {
        self.recent_groups.clear();
        self.recent_example_ids.clear();
    }

    fn recent(&self, kind: HistoryKind) -> &VecDeque<String> {
        match kind {
            HistoryKind::GroupKeys => &self.recent_groups,
            HistoryKind::ExampleIds => &self.recent_example_ids,
        }
    }
}

fn push_bounded(window: &mut VecDeque<String>, entry: String, limit: usize) {
    window.push_back(entry);
    while window.len() > limit {
        window.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn fresh_filter_drops_current_and_recent() {
        let mut history = SelectionHistory::new(6);
        history.record("G1".to_string(), "e1,e2".to_string());
        history.record("G2".to_string(), "e3".to_string());

        let fresh = history.filter_fresh(
            &groups(&["G1", "G2", "G3", "G4"]),
            Some("G4"),
            HistoryKind::GroupKeys,
        );
        assert_eq!(fresh, groups(&["G3"]));
    }

    #[test]
    fn kinds_have_independent_windows() {
        let mut history = SelectionHistory::new(6);
        history.record("G1".to_string(), "e1,e2".to_string());

        let fresh_groups =
            history.filter_fresh(&groups(&["G1", "e1,e2"]), None, HistoryKind::GroupKeys);
        assert_eq!(fresh_groups, groups(&["e1,e2"]));

        let fresh_sets =
            history.filter_fresh(&groups(&["G1", "e1,e2"]), None, HistoryKind::ExampleIds);
        assert_eq!(fresh_sets, groups(&["G1"]));
    }

    #[test]
    fn windows_age_out_oldest_first() {
        let mut history = SelectionHistory::new(2);
        history.record("G1".to_string(), "a".to_string());
        history.record("G2".to_string(), "b".to_string());
        history.record("G3".to_string(), "c".to_string());

        let fresh = history.filter_fresh(
            &groups(&["G1", "G2", "G3"]),
            None,
            HistoryKind::GroupKeys,
        );
        assert_eq!(fresh, groups(&["G1"]));
    }

    #[test]
    fn exhausted_candidates_come_back_empty() {
        let mut history = SelectionHistory::new(6);
        history.record("G1".to_string(), "a".to_string());
        let fresh = history.filter_fresh(&groups(&["G1"]), None, HistoryKind::GroupKeys);
        assert!(fresh.is_empty());
    }

    #[test]
    fn clear_forgets_everything() {
        let mut history = SelectionHistory::new(6);
        history.record("G1".to_string(), "a".to_string());
        history.clear();
        let fresh = history.filter_fresh(&groups(&["G1"]), None, HistoryKind::GroupKeys);
        assert_eq!(fresh, groups(&["G1"]));
    }
}
