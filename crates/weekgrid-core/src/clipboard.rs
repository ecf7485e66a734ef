use tracing::debug;

use crate::model::CellKey;
use crate::store::AssignmentStore;

/// Payload of one copied cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedCell {
    pub task_code: String,
    pub task_color: Option<String>,
}

/// Holds at most one copied cell for the lifetime of the process. Survives
/// selection changes until overwritten by the next copy.
#[derive(Debug, Clone, Default)]
pub struct ClipboardBuffer {
    slot: Option<CopiedCell>,
}

impl ClipboardBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn get(&self) -> Option<&CopiedCell> {
        self.slot.as_ref()
    }

    /// Copy a cell's assignment into the buffer. Copying an empty or
    /// unassigned cell leaves the buffer as it was.
    #[tracing::instrument(skip(self, store), fields(cell = %cell))]
    pub fn copy(&mut self, store: &AssignmentStore, cell: &CellKey) {
        let Some(assignment) = store.get(cell) else {
            debug!("copy of empty cell ignored");
            return;
        };
        if assignment.task_code.is_empty() {
            debug!("copy of unassigned cell ignored");
            return;
        }

        self.slot = Some(CopiedCell {
            task_code: assignment.task_code.clone(),
            task_color: assignment.task_color.clone(),
        });
        debug!(task_code = %assignment.task_code, "copied cell");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssignmentInput;

    #[test]
    fn copy_of_empty_cell_is_a_no_op() {
        let store = AssignmentStore::new();
        let mut clipboard = ClipboardBuffer::new();

        clipboard.copy(&store, &CellKey::new("s1", "m1", 0));
        assert!(clipboard.is_empty());
    }

    #[test]
    fn copy_of_empty_cell_keeps_previous_payload() {
        let occupied = CellKey::new("s1", "m1", 0);
        let empty = CellKey::new("s1", "m1", 1);

        let mut store = AssignmentStore::new();
        store.apply_confirmed(&[AssignmentInput::set(&occupied, "CMH3", "#90EE90")]);

        let mut clipboard = ClipboardBuffer::new();
        clipboard.copy(&store, &occupied);
        clipboard.copy(&store, &empty);

        let copied = clipboard.get().expect("payload kept");
        assert_eq!(copied.task_code, "CMH3");
        assert_eq!(copied.task_color.as_deref(), Some("#90EE90"));
    }

    #[test]
    fn new_copy_overwrites_the_buffer() {
        let a = CellKey::new("s1", "m1", 0);
        let b = CellKey::new("s1", "m2", 3);

        let mut store = AssignmentStore::new();
        store.apply_confirmed(&[
            AssignmentInput::set(&a, "CMH3", "#90EE90"),
            AssignmentInput::set(&b, "HOTMAIL", "#FFD700"),
        ]);

        let mut clipboard = ClipboardBuffer::new();
        clipboard.copy(&store, &a);
        clipboard.copy(&store, &b);
        assert_eq!(clipboard.get().expect("payload").task_code, "HOTMAIL");
    }
}
