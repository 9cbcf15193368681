//! Probe-in-order over candidate paths.

use hbdash_core::{normalize, Table};
use tracing::debug;

use crate::endpoints::CandidateList;
use crate::error::ClientError;
use crate::source::JsonSource;

/// Result of probing one resource.
#[derive(Debug, Clone, Default)]
pub struct ProbeOutcome {
    /// First non-empty table, or the empty table.
    pub table: Table,
    /// Candidate path that produced `table`.
    pub path: Option<String>,
    /// Last failure seen. Always `None` when a candidate produced rows.
    pub error: Option<ClientError>,
    /// Candidates requested.
    pub attempts: usize,
}

impl ProbeOutcome {
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// Try each candidate in order and stop at the first one with rows.
///
/// Failed requests and empty answers move on to the next candidate. After
/// exhaustion the empty table is returned along with the last error, which is
/// `None` if every candidate answered with no data.
pub async fn probe<S: JsonSource + ?Sized>(source: &S, candidates: &CandidateList) -> ProbeOutcome {
    let resource = candidates.resource();
    let mut last_error = None;
    let mut attempts = 0;

    for request in candidates.iter() {
        attempts += 1;
        match source.get_json(request).await {
            Ok(raw) => {
                let table = normalize(Some(&raw));
                if !table.is_empty() {
                    debug!(
                        resource,
                        path = %request.path,
                        rows = table.len(),
                        columns = table.columns().len(),
                        "Resource resolved"
                    );
                    return ProbeOutcome {
                        table,
                        path: Some(request.path.clone()),
                        error: None,
                        attempts,
                    };
                }
                debug!(resource, path = %request.path, "Candidate returned no rows");
            }
            Err(e) => {
                debug!(resource, path = %request.path, error = %e, "Candidate failed");
                last_error = Some(e);
            }
        }
    }

    debug!(
        resource,
        attempts,
        failed = last_error.is_some(),
        "No candidate produced rows"
    );

    ProbeOutcome {
        table: Table::empty(),
        path: None,
        error: last_error,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockJsonSource;
    use serde_json::json;

    fn transport_error(path: &str) -> ClientError {
        ClientError::Request {
            url: path.to_string(),
            reason: "connection refused".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_then_rows() {
        let source = MockJsonSource::new()
            .with_response("/a", json!([]))
            .with_response("/b", json!({"data": [{"id": 1}, {"id": 2}, {"id": 3}]}));
        let candidates = CandidateList::from_paths("test", ["/a", "/b"]);

        let outcome = probe(&source, &candidates).await;

        assert_eq!(outcome.table.len(), 3);
        assert_eq!(outcome.path.as_deref(), Some("/b"));
        assert!(outcome.error.is_none());
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test]
    async fn test_short_circuits_after_first_hit() {
        let source = MockJsonSource::new()
            .with_response("/a", json!([{"id": 1}]))
            .with_response("/b", json!([{"id": 2}]));
        let candidates = CandidateList::from_paths("test", ["/a", "/b", "/c"]);

        let outcome = probe(&source, &candidates).await;

        assert_eq!(outcome.path.as_deref(), Some("/a"));
        assert_eq!(source.call_paths(), vec!["/a"]);
    }

    #[tokio::test]
    async fn test_all_fail_reports_last_error() {
        let source = MockJsonSource::new()
            .with_error("/a", transport_error("/a"))
            .with_error("/b", transport_error("/b"));
        let candidates = CandidateList::from_paths("test", ["/a", "/b"]);

        let outcome = probe(&source, &candidates).await;

        assert!(outcome.is_empty());
        assert!(outcome.path.is_none());
        assert!(outcome.error_message().unwrap().contains("/b"));
    }

    #[tokio::test]
    async fn test_error_survives_later_empty_answer() {
        let source = MockJsonSource::new()
            .with_error("/a", transport_error("/a"))
            .with_response("/b", json!({"items": []}));
        let candidates = CandidateList::from_paths("test", ["/a", "/b"]);

        let outcome = probe(&source, &candidates).await;

        assert!(outcome.is_empty());
        assert!(outcome.error_message().unwrap().contains("/a"));
    }

    #[tokio::test]
    async fn test_all_empty_is_not_an_error() {
        let source = MockJsonSource::new()
            .with_response("/a", json!(null))
            .with_response("/b", json!({"data": []}));
        let candidates = CandidateList::from_paths("test", ["/a", "/b"]);

        let outcome = probe(&source, &candidates).await;

        assert!(outcome.is_empty());
        assert!(outcome.error.is_none());
        assert_eq!(outcome.attempts, 2);
    }

    #[test]
    fn test_error_before_hit_is_dropped() {
        let source = MockJsonSource::new()
            .with_response("/orders", json!([{"id": "o-1", "side": "buy"}]));
        let candidates = CandidateList::from_paths("orders", ["/orders/open", "/orders"]);

        let outcome = tokio_test::block_on(probe(&source, &candidates));

        assert_eq!(outcome.path.as_deref(), Some("/orders"));
        assert!(outcome.error.is_none());
    }
}
