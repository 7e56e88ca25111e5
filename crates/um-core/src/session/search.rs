//! Schedule search session
//!
//! Search-as-you-type against the schedule store. Every issued request gets
//! a monotonically increasing epoch; a response is applied to visible state
//! only while its epoch is still the newest, so a slow response to an old
//! query can never overwrite the results of a newer one.

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::model::SearchHit;

struct SearchState {
    query: String,
    results: Vec<SearchHit>,
    epoch: u64,
    pending: bool,
    open: bool,
}

pub struct SearchSession {
    state: RwLock<SearchState>,
}

#[derive(Debug, Clone)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub pending: bool,
    /// Whether the result panel is visible.
    pub open: bool,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SearchState {
                query: String::new(),
                results: Vec::new(),
                epoch: 0,
                pending: false,
                open: false,
            }),
        }
    }

    /// Record a query edit.
    ///
    /// A query of at most one character counts as "no query": results are
    /// cleared, the panel hides, and nothing is issued. Otherwise returns
    /// the epoch the caller must pass back to [`SearchSession::apply_results`]
    /// once the fetch completes.
    pub fn on_query_change(&self, text: &str) -> Option<u64> {
        let mut s = self.state.write();
        s.query = text.to_string();
        if text.chars().count() <= 1 {
            s.results.clear();
            s.pending = false;
            s.open = false;
            return None;
        }
        s.epoch += 1;
        s.pending = true;
        s.open = true;
        Some(s.epoch)
    }

    /// Complete a fetch issued by [`SearchSession::on_query_change`].
    ///
    /// Returns false when the response was stale and discarded.
    pub fn apply_results(&self, epoch: u64, outcome: anyhow::Result<Vec<SearchHit>>) -> bool {
        let mut s = self.state.write();
        if epoch != s.epoch {
            debug!(epoch, current = s.epoch, "discarding stale search response");
            return false;
        }
        s.pending = false;
        match outcome {
            Ok(hits) => s.results = hits,
            Err(err) => {
                warn!(error = %err, "schedule search failed");
                s.results.clear();
            }
        }
        true
    }

    /// Pick a result: hides the panel and shows the course as the query
    /// text. The caller publishes the hit's room into the navigation
    /// session; selection never triggers route computation by itself.
    pub fn select(&self, index: usize) -> Option<SearchHit> {
        let mut s = self.state.write();
        let hit = s.results.get(index).cloned()?;
        s.query = hit.course.clone();
        s.open = false;
        s.pending = false;
        Some(hit)
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        let s = self.state.read();
        SearchSnapshot {
            query: s.query.clone(),
            results: s.results.clone(),
            pending: s.pending,
            open: s.open,
        }
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(course: &str, room: &str) -> SearchHit {
        SearchHit {
            course: course.to_string(),
            room: room.to_string(),
            instructor: None,
            day: "Monday".to_string(),
            start: "10:00".to_string(),
            end: "12:00".to_string(),
        }
    }

    #[test]
    fn short_queries_clear_and_issue_nothing() {
        let session = SearchSession::new();
        let epoch = session.on_query_change("al").unwrap();
        session
            .apply_results(epoch, Ok(vec![hit("Algorithms", "Room-204")]));
        assert_eq!(session.snapshot().results.len(), 1);

        assert!(session.on_query_change("a").is_none());
        let snap = session.snapshot();
        assert!(snap.results.is_empty());
        assert!(!snap.open);
        assert!(!snap.pending);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let session = SearchSession::new();
        let _a = session.on_query_change("al").unwrap();
        let ab = session.on_query_change("alg").unwrap();
        let abc = session.on_query_change("algo").unwrap();

        // Newest response lands first.
        assert!(session.apply_results(abc, Ok(vec![hit("Algorithms", "Room-204")])));
        // The superseded one arrives late and must be dropped silently.
        assert!(!session.apply_results(ab, Ok(vec![hit("Algebra", "Room-101")])));

        let snap = session.snapshot();
        assert_eq!(snap.results.len(), 1);
        assert_eq!(snap.results[0].course, "Algorithms");
        assert!(!snap.pending);
    }

    #[test]
    fn failed_current_fetch_clears_results() {
        let session = SearchSession::new();
        let epoch = session.on_query_change("data").unwrap();
        assert!(session.apply_results(epoch, Err(anyhow::anyhow!("timeout"))));
        let snap = session.snapshot();
        assert!(snap.results.is_empty());
        assert!(!snap.pending);
        assert!(snap.open, "panel stays visible for the empty state");
    }

    #[test]
    fn selecting_a_result_hides_the_panel_and_swaps_the_query_text() {
        let session = SearchSession::new();
        let epoch = session.on_query_change("alg").unwrap();
        session.apply_results(
            epoch,
            Ok(vec![hit("Algorithms", "Room-204"), hit("Algebra", "Room-101")]),
        );

        let selected = session.select(1).unwrap();
        assert_eq!(selected.room, "Room-101");

        let snap = session.snapshot();
        assert_eq!(snap.query, "Algebra");
        assert!(!snap.open);

        assert!(session.select(5).is_none());
    }
}
