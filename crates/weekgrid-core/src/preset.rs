use tracing::debug;

use crate::model::{AssignmentInput, CellKey, Preset};
use crate::selection::SelectionModel;

/// Built-in presets, seeded when the backend has none configured.
pub fn default_presets() -> Vec<Preset> {
    [
        ("CMH3-CMH9", &["CMH3", "CMH9"][..], "#90EE90"),
        ("CMH12-CMH5-CMH16", &["CMH12", "CMH5", "CMH16"], "#FFFFE0"),
        ("HOTMAIL-Gmail", &["HOTMAIL", "Gmail"], "#FFD700"),
        ("Desktop-Webautomat", &["Desktop", "Webautomat"], "#FFA500"),
        (
            "Night Desktop-Night tool it",
            &["Night Desktop", "Night tool it"],
            "#FFA500",
        ),
        ("congé", &["congé"], "#FFB6C1"),
    ]
    .into_iter()
    .map(|(label, codes, color)| Preset {
        id: None,
        label: label.to_string(),
        codes: codes.iter().map(|c| (*c).to_string()).collect(),
        color: color.to_string(),
        order: None,
    })
    .collect()
}

/// Maps a preset onto target cells, producing one mutation per cell with
/// the preset's joined code and color.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresetApplier;

impl PresetApplier {
    #[tracing::instrument(skip(self, preset, targets), fields(preset = %preset.label, targets = targets.len()))]
    pub fn inputs_for(&self, preset: &Preset, targets: &[CellKey]) -> Vec<AssignmentInput> {
        let task_code = preset.task_code();
        targets
            .iter()
            .map(|cell| AssignmentInput::set(cell, task_code.clone(), preset.color.clone()))
            .collect()
    }

    /// Drop-target rule: dropping onto a cell that belongs to the current
    /// selection fills the whole selection; dropping anywhere else fills
    /// just the drop cell.
    pub fn drop_targets(&self, selection: &SelectionModel, drop_cell: &CellKey) -> Vec<CellKey> {
        if selection.contains(drop_cell) {
            debug!(selected = selection.len(), "drop lands on selection");
            selection.to_vec()
        } else {
            vec![drop_cell.clone()]
        }
    }
}
