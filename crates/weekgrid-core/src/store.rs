use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{Assignment, AssignmentInput, CellKey, Schedule, fresh_local_id};

/// Local mirror of persisted assignments, keyed by cell. The mirror is
/// never written speculatively: only a confirmed bulk commit reaches
/// `apply_confirmed`, which is why it is crate-private.
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    by_cell: BTreeMap<CellKey, Assignment>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the mirror from fetched schedules. Later duplicates of a cell
    /// key win, matching the backend's unique constraint.
    #[tracing::instrument(skip(schedules))]
    pub fn from_schedules(schedules: &[Schedule]) -> Self {
        let mut store = Self::new();
        for schedule in schedules {
            for assignment in &schedule.assignments {
                store
                    .by_cell
                    .insert(assignment.cell_key(), assignment.clone());
            }
        }
        debug!(assignments = store.by_cell.len(), "seeded assignment store");
        store
    }

    pub fn get(&self, cell: &CellKey) -> Option<&Assignment> {
        self.by_cell.get(cell)
    }

    pub fn len(&self) -> usize {
        self.by_cell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cell.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &Assignment)> {
        self.by_cell.iter()
    }

    /// Merge a confirmed batch: empty task code removes the cell's
    /// assignment, anything else upserts (keeping the stored id when the
    /// cell already has one). Idempotent; within one batch the last input
    /// per cell key wins.
    #[tracing::instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub(crate) fn apply_confirmed(&mut self, inputs: &[AssignmentInput]) {
        for input in inputs {
            let cell = input.cell_key();
            if input.is_deletion() {
                if self.by_cell.remove(&cell).is_some() {
                    debug!(cell = %cell, "removed assignment");
                }
                continue;
            }

            let id = self
                .by_cell
                .get(&cell)
                .map(|existing| existing.id.clone())
                .unwrap_or_else(fresh_local_id);
            self.by_cell.insert(cell, input.clone().into_assignment(id));
        }
    }
}
