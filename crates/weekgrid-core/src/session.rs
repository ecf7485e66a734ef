use tracing::{debug, info};

use crate::clipboard::ClipboardBuffer;
use crate::colors::ColorTable;
use crate::editor::InlineEditor;
use crate::grid::GridIndex;
use crate::model::{AssignmentInput, CellKey, Preset, Schedule, Team};
use crate::preset::PresetApplier;
use crate::selection::{Modifiers, SelectionModel};
use crate::store::AssignmentStore;
use crate::sync::{BulkTransport, SyncEngine, SyncFailure};

/// The component a UI layer binds to: owns the grid order, the assignment
/// mirror, the selection/clipboard/editor state, and funnels every user
/// action through one commit path. On a confirmed commit the transient
/// state (selection, staged clear, editor) is reset; on failure everything
/// survives so the user can retry without re-selecting.
#[derive(Debug)]
pub struct PlanningSession {
    grid: GridIndex,
    schedules: Vec<Schedule>,
    store: AssignmentStore,
    selection: SelectionModel,
    clipboard: ClipboardBuffer,
    editor: InlineEditor,
    colors: ColorTable,
    applier: PresetApplier,
    engine: SyncEngine,
    active_preset: Option<Preset>,
    pending_clear: Option<Vec<CellKey>>,
}

impl PlanningSession {
    #[tracing::instrument(skip(teams, schedules, colors))]
    pub fn new(teams: &[Team], schedules: Vec<Schedule>, colors: ColorTable) -> Self {
        let grid = GridIndex::from_teams(teams);
        let store = AssignmentStore::from_schedules(&schedules);
        info!(
            rows = grid.row_count(),
            schedules = schedules.len(),
            assignments = store.len(),
            "planning session ready"
        );
        Self {
            grid,
            schedules,
            store,
            selection: SelectionModel::new(),
            clipboard: ClipboardBuffer::new(),
            editor: InlineEditor::default(),
            colors,
            applier: PresetApplier,
            engine: SyncEngine,
            active_preset: None,
            pending_clear: None,
        }
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn clipboard(&self) -> &ClipboardBuffer {
        &self.clipboard
    }

    pub fn editor(&self) -> &InlineEditor {
        &self.editor
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn current_schedule(&self) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.is_current)
    }

    pub fn next_schedule(&self) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.is_next)
    }

    // --- pointer / keyboard input -----------------------------------------

    pub fn pointer_down(&mut self, cell: CellKey, modifiers: Modifiers) {
        self.pending_clear = None;
        self.selection.start_selection(&self.grid, cell, modifiers);
    }

    pub fn pointer_enter(&mut self, cell: CellKey) {
        self.selection.extend_selection(&self.grid, cell);
    }

    /// Wired to a global pointer-up listener: ends the drag even when the
    /// pointer was released outside the grid.
    pub fn pointer_up(&mut self) {
        self.selection.end_selection();
    }

    /// Escape: close an open editor first, otherwise back out of a staged
    /// clear, otherwise drop the selection.
    #[tracing::instrument(skip(self))]
    pub fn escape(&mut self) {
        if self.editor.is_open() {
            self.editor.cancel();
        } else if self.pending_clear.is_some() {
            self.pending_clear = None;
        } else {
            self.selection.clear();
        }
    }

    // --- presets ----------------------------------------------------------

    /// Clicking a preset with nothing selected only arms it for a later
    /// click or drop; no mutation happens here.
    pub fn set_active_preset(&mut self, preset: Option<Preset>) {
        self.active_preset = preset;
    }

    pub fn active_preset(&self) -> Option<&Preset> {
        self.active_preset.as_ref()
    }

    /// "Selected preset + Enter": apply the armed preset to the current
    /// selection. Nothing armed or nothing selected is a silent no-op.
    #[tracing::instrument(skip(self, transport))]
    pub fn apply_active_preset(&mut self, transport: &dyn BulkTransport) -> Result<usize, SyncFailure> {
        let Some(preset) = self.active_preset.clone() else {
            return Ok(0);
        };
        if self.selection.is_empty() {
            return Ok(0);
        }
        let targets = self.selection.to_vec();
        self.apply_preset(&preset, &targets, transport)
    }

    /// Drag-and-drop of a preset onto a cell: fills the selection when the
    /// drop cell is part of it, else just the drop cell.
    #[tracing::instrument(skip(self, preset, transport), fields(preset = %preset.label, drop = %drop_cell))]
    pub fn drop_preset(
        &mut self,
        preset: &Preset,
        drop_cell: &CellKey,
        transport: &dyn BulkTransport,
    ) -> Result<usize, SyncFailure> {
        let targets = self.applier.drop_targets(&self.selection, drop_cell);
        self.apply_preset(preset, &targets, transport)
    }

    pub fn apply_preset(
        &mut self,
        preset: &Preset,
        targets: &[CellKey],
        transport: &dyn BulkTransport,
    ) -> Result<usize, SyncFailure> {
        let inputs = self.applier.inputs_for(preset, targets);
        self.commit(transport, inputs)
    }

    // --- copy / paste -----------------------------------------------------

    pub fn copy_cell(&mut self, cell: &CellKey) {
        self.clipboard.copy(&self.store, cell);
    }

    /// Paste the copied payload into one cell. An empty clipboard is a
    /// silent no-op (the affordance is absent in that state).
    #[tracing::instrument(skip(self, transport), fields(cell = %cell))]
    pub fn paste_to_cell(
        &mut self,
        cell: &CellKey,
        transport: &dyn BulkTransport,
    ) -> Result<usize, SyncFailure> {
        self.paste_to(&[cell.clone()], transport)
    }

    pub fn paste_to_selection(&mut self, transport: &dyn BulkTransport) -> Result<usize, SyncFailure> {
        let targets = self.selection.to_vec();
        self.paste_to(&targets, transport)
    }

    fn paste_to(
        &mut self,
        targets: &[CellKey],
        transport: &dyn BulkTransport,
    ) -> Result<usize, SyncFailure> {
        let Some(copied) = self.clipboard.get().cloned() else {
            debug!("paste with empty clipboard ignored");
            return Ok(0);
        };
        let color = copied
            .task_color
            .unwrap_or_else(|| self.colors.resolve(&copied.task_code).to_string());
        let inputs = targets
            .iter()
            .map(|cell| AssignmentInput::set(cell, copied.task_code.clone(), color.clone()))
            .collect();
        self.commit(transport, inputs)
    }

    // --- inline edit ------------------------------------------------------

    /// Double-click: start editing a cell. An unrelated selection is an
    /// editing distraction, so it is dropped here.
    pub fn open_editor(&mut self, cell: CellKey) {
        self.selection.clear();
        self.editor.open(&self.store, cell);
    }

    pub fn editor_input(&mut self, text: impl Into<String>) {
        self.editor.set_text(text);
    }

    /// Enter or blur on the editor: commit the trimmed text (empty text
    /// deletes the assignment). Without an open editor this is a no-op.
    #[tracing::instrument(skip(self, transport))]
    pub fn commit_editor(&mut self, transport: &dyn BulkTransport) -> Result<usize, SyncFailure> {
        let Some(input) = self.editor.commit(&self.colors) else {
            return Ok(0);
        };
        self.commit(transport, vec![input])
    }

    pub fn cancel_editor(&mut self) {
        self.editor.cancel();
    }

    // --- bulk update modal ------------------------------------------------

    /// "Apply": one mutation per selected cell with a single user-entered
    /// task code, color resolved through the table.
    #[tracing::instrument(skip(self, transport))]
    pub fn bulk_set(
        &mut self,
        task_code: &str,
        transport: &dyn BulkTransport,
    ) -> Result<usize, SyncFailure> {
        let code = task_code.trim();
        if code.is_empty() || self.selection.is_empty() {
            return Ok(0);
        }
        let color = self.colors.resolve(code).to_string();
        let inputs = self
            .selection
            .to_vec()
            .iter()
            .map(|cell| AssignmentInput::set(cell, code, color.clone()))
            .collect();
        self.commit(transport, inputs)
    }

    /// "Clear" stage one: remember the cells to be wiped and report how
    /// many, so the caller can ask the user to confirm. No network yet.
    #[tracing::instrument(skip(self))]
    pub fn request_clear(&mut self) -> usize {
        if self.selection.is_empty() {
            self.pending_clear = None;
            return 0;
        }
        let cells = self.selection.to_vec();
        let count = cells.len();
        self.pending_clear = Some(cells);
        count
    }

    pub fn has_pending_clear(&self) -> bool {
        self.pending_clear.is_some()
    }

    pub fn cancel_clear(&mut self) {
        self.pending_clear = None;
    }

    /// "Clear" stage two: send one deletion per staged cell. Without a
    /// staged request this is a no-op.
    #[tracing::instrument(skip(self, transport))]
    pub fn confirm_clear(&mut self, transport: &dyn BulkTransport) -> Result<usize, SyncFailure> {
        let Some(cells) = self.pending_clear.take() else {
            return Ok(0);
        };
        let inputs = cells.iter().map(AssignmentInput::delete).collect();
        self.commit(transport, inputs)
    }

    // --- the one commit path ----------------------------------------------

    /// Every mutation funnels through here: one network call per action,
    /// store merged only on success, and all transient state reset after a
    /// confirmed commit. Failures come back as one uniform value no matter
    /// which action triggered them.
    fn commit(
        &mut self,
        transport: &dyn BulkTransport,
        inputs: Vec<AssignmentInput>,
    ) -> Result<usize, SyncFailure> {
        if inputs.is_empty() {
            return Ok(0);
        }
        let count = inputs.len();
        self.engine.commit_bulk(&mut self.store, transport, inputs)?;
        self.selection.clear();
        self.pending_clear = None;
        self.editor.cancel();
        Ok(count)
    }
}
