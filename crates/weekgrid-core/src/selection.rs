use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::grid::GridIndex;
use crate::model::CellKey;

/// Keyboard modifiers active on pointer-down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
    };
    pub const SHIFT: Self = Self {
        ctrl: false,
        shift: true,
    };
}

/// Interaction phase. While `Selecting`, `extend_selection` is the only
/// permitted mutation; a global pointer-up returns the model to `Idle`
/// even when the pointer left the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Selecting { origin: CellKey },
}

/// The active set of selected cell keys. All members share one schedule id
/// by construction; a drag can never cross schedules.
#[derive(Debug, Clone)]
pub struct SelectionModel {
    cells: BTreeSet<CellKey>,
    anchor: Option<CellKey>,
    phase: Phase,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionModel {
    pub fn new() -> Self {
        Self {
            cells: BTreeSet::new(),
            anchor: None,
            phase: Phase::Idle,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, cell: &CellKey) -> bool {
        self.cells.contains(cell)
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellKey> {
        self.cells.iter()
    }

    pub fn to_vec(&self) -> Vec<CellKey> {
        self.cells.iter().cloned().collect()
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.phase, Phase::Selecting { .. })
    }

    /// Pointer-down on a cell. Ctrl toggles membership, shift extends a
    /// rectangle from the anchor (same schedule only), plain click replaces
    /// the set and re-anchors. Always enters the `Selecting` phase.
    #[tracing::instrument(skip(self, grid), fields(cell = %cell))]
    pub fn start_selection(&mut self, grid: &GridIndex, cell: CellKey, modifiers: Modifiers) {
        if modifiers.ctrl {
            if !self.cells.remove(&cell) {
                self.cells.insert(cell.clone());
            }
        } else if modifiers.shift
            && let Some(anchor) = self.anchor.clone()
            && anchor.schedule_id == cell.schedule_id
        {
            self.cells = grid.rectangle(&anchor, &cell).into_iter().collect();
        } else {
            self.cells.clear();
            self.cells.insert(cell.clone());
        }

        self.anchor = Some(cell.clone());
        self.phase = Phase::Selecting { origin: cell };
        debug!(selected = self.cells.len(), "selection started");
    }

    /// Pointer-enter while dragging: recompute the rectangle from the drag
    /// origin. A cell in another schedule is ignored; so is a call outside
    /// the `Selecting` phase.
    #[tracing::instrument(skip(self, grid), fields(cell = %cell))]
    pub fn extend_selection(&mut self, grid: &GridIndex, cell: CellKey) {
        let Phase::Selecting { origin } = &self.phase else {
            trace!("extend outside drag ignored");
            return;
        };
        if origin.schedule_id != cell.schedule_id {
            trace!("cross-schedule extend ignored");
            return;
        }

        let origin = origin.clone();
        self.cells = grid.rectangle(&origin, &cell).into_iter().collect();
        debug!(selected = self.cells.len(), "selection extended");
    }

    /// Global pointer-up: the drag ends wherever the pointer is.
    pub fn end_selection(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Empty the set (Escape, a confirmed bulk commit, or an unrelated
    /// editing action). The anchor is dropped too.
    #[tracing::instrument(skip(self))]
    pub fn clear(&mut self) {
        self.cells.clear();
        self.anchor = None;
        self.phase = Phase::Idle;
    }
}
