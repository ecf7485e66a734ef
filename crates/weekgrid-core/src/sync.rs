use tracing::{debug, info, warn};

use crate::model::AssignmentInput;
use crate::store::AssignmentStore;

/// Why a commit did not land. Both variants are recoverable and local to
/// the triggering action; selection state survives so the user can retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    /// The request itself failed (connectivity, DNS, ...).
    Network(String),
    /// The backend answered non-2xx; message extracted from the body's
    /// `error` / `details` fields, or a generic fallback.
    Validation(String),
}

impl SyncFailure {
    pub fn message(&self) -> &str {
        match self {
            Self::Network(msg) | Self::Validation(msg) => msg,
        }
    }
}

impl std::fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Validation(msg) => write!(f, "bulk update rejected: {msg}"),
        }
    }
}

impl std::error::Error for SyncFailure {}

/// The one capability the engine needs from the surrounding application:
/// a function that performs the bulk POST and reports success or failure.
/// Base URL, auth headers and transport details live behind it.
pub trait BulkTransport {
    fn post_bulk(&self, assignments: &[AssignmentInput]) -> Result<(), SyncFailure>;
}

/// Sole writer of the assignment store. One transport call per user
/// action; the store is merged only after the call succeeds, and left
/// untouched on any failure.
///
/// There is no retry, timeout, or cancellation of superseded requests:
/// responses land in arrival order, so a slow answer for an old action can
/// still overwrite a newer one (last network answer wins).
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncEngine;

impl SyncEngine {
    #[tracing::instrument(skip(self, store, transport, assignments), fields(count = assignments.len()))]
    pub fn commit_bulk(
        &self,
        store: &mut AssignmentStore,
        transport: &dyn BulkTransport,
        assignments: Vec<AssignmentInput>,
    ) -> Result<(), SyncFailure> {
        if assignments.is_empty() {
            debug!("empty batch, nothing to commit");
            return Ok(());
        }

        match transport.post_bulk(&assignments) {
            Ok(()) => {
                store.apply_confirmed(&assignments);
                info!(count = assignments.len(), "bulk commit confirmed");
                Ok(())
            }
            Err(failure) => {
                warn!(failure = %failure, "bulk commit failed; store unchanged");
                Err(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::model::CellKey;

    struct Scripted {
        fail_with: Option<SyncFailure>,
        calls: RefCell<Vec<usize>>,
    }

    impl BulkTransport for Scripted {
        fn post_bulk(&self, assignments: &[AssignmentInput]) -> Result<(), SyncFailure> {
            self.calls.borrow_mut().push(assignments.len());
            match &self.fail_with {
                Some(failure) => Err(failure.clone()),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn success_merges_into_the_store() {
        let engine = SyncEngine;
        let mut store = AssignmentStore::new();
        let transport = Scripted {
            fail_with: None,
            calls: RefCell::new(vec![]),
        };

        let cell = CellKey::new("s1", "m1", 0);
        engine
            .commit_bulk(
                &mut store,
                &transport,
                vec![AssignmentInput::set(&cell, "CMH3", "#90EE90")],
            )
            .expect("commit succeeds");

        assert_eq!(store.get(&cell).expect("assignment").task_code, "CMH3");
        assert_eq!(*transport.calls.borrow(), vec![1]);
    }

    #[test]
    fn failure_leaves_the_store_untouched() {
        let engine = SyncEngine;
        let mut store = AssignmentStore::new();
        let cell = CellKey::new("s1", "m1", 0);
        store.apply_confirmed(&[AssignmentInput::set(&cell, "CMH3", "#90EE90")]);

        let transport = Scripted {
            fail_with: Some(SyncFailure::Validation("dayOfWeek out of range".to_string())),
            calls: RefCell::new(vec![]),
        };

        let err = engine
            .commit_bulk(
                &mut store,
                &transport,
                vec![AssignmentInput::set(&cell, "HOTMAIL", "#FFD700")],
            )
            .expect_err("commit fails");

        assert!(!err.message().is_empty());
        assert_eq!(store.get(&cell).expect("assignment").task_code, "CMH3");
    }

    #[test]
    fn empty_batch_skips_the_network() {
        let engine = SyncEngine;
        let mut store = AssignmentStore::new();
        let transport = Scripted {
            fail_with: Some(SyncFailure::Network("unreachable".to_string())),
            calls: RefCell::new(vec![]),
        };

        engine
            .commit_bulk(&mut store, &transport, vec![])
            .expect("empty commit is trivially ok");
        assert!(transport.calls.borrow().is_empty());
    }
}
