use tracing::debug;

use crate::colors::ColorTable;
use crate::model::{AssignmentInput, CellKey};
use crate::store::AssignmentStore;

/// Single-cell free-text editor. Only one cell can be editing at a time,
/// by construction: the whole editor is one enum value.
///
/// Closed → (double-click) → Editing → (Enter/blur) commit | (Escape) close.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InlineEditor {
    #[default]
    Closed,
    Editing {
        cell: CellKey,
        text: String,
    },
}

impl InlineEditor {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    pub fn editing_cell(&self) -> Option<&CellKey> {
        match self {
            Self::Editing { cell, .. } => Some(cell),
            Self::Closed => None,
        }
    }

    /// Double-click: open on a cell, seeded with its current task code (or
    /// empty for an unassigned cell). Replaces any edit already in flight.
    #[tracing::instrument(skip(self, store), fields(cell = %cell))]
    pub fn open(&mut self, store: &AssignmentStore, cell: CellKey) {
        let text = store
            .get(&cell)
            .map(|a| a.task_code.clone())
            .unwrap_or_default();
        debug!(initial = %text, "inline edit opened");
        *self = Self::Editing { cell, text };
    }

    /// Replace the edit buffer (keystrokes). Ignored while closed.
    pub fn set_text(&mut self, value: impl Into<String>) {
        if let Self::Editing { text, .. } = self {
            *text = value.into();
        }
    }

    /// Enter or blur: close the editor and produce the mutation to commit.
    /// The trimmed text resolves its color through the table; an empty
    /// trimmed value is a deletion request. Returns `None` when no edit
    /// was open.
    #[tracing::instrument(skip(self, colors))]
    pub fn commit(&mut self, colors: &ColorTable) -> Option<AssignmentInput> {
        let Self::Editing { cell, text } = std::mem::take(self) else {
            return None;
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!(cell = %cell, "inline edit committed as deletion");
            return Some(AssignmentInput::delete(&cell));
        }

        let color = colors.resolve(trimmed);
        debug!(cell = %cell, task_code = %trimmed, color = %color, "inline edit committed");
        Some(AssignmentInput::set(&cell, trimmed, color))
    }

    /// Escape: close with no network call and no store mutation.
    pub fn cancel(&mut self) {
        *self = Self::Closed;
    }
}
