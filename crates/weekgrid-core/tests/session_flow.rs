use std::cell::RefCell;

use weekgrid_core::colors::ColorTable;
use weekgrid_core::model::{
    Assignment, AssignmentInput, CellKey, Preset, Resource, Schedule, Team,
};
use weekgrid_core::selection::Modifiers;
use weekgrid_core::session::PlanningSession;
use weekgrid_core::sync::{BulkTransport, SyncFailure};

/// Records every batch and answers from a script: `None` = success.
#[derive(Default)]
struct ScriptedTransport {
    fail_with: RefCell<Option<SyncFailure>>,
    batches: RefCell<Vec<Vec<AssignmentInput>>>,
}

impl ScriptedTransport {
    fn failing(failure: SyncFailure) -> Self {
        Self {
            fail_with: RefCell::new(Some(failure)),
            batches: RefCell::new(vec![]),
        }
    }

    fn batch_count(&self) -> usize {
        self.batches.borrow().len()
    }

    fn last_batch(&self) -> Vec<AssignmentInput> {
        self.batches.borrow().last().cloned().unwrap_or_default()
    }
}

impl BulkTransport for ScriptedTransport {
    fn post_bulk(&self, assignments: &[AssignmentInput]) -> Result<(), SyncFailure> {
        self.batches.borrow_mut().push(assignments.to_vec());
        match self.fail_with.borrow().clone() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

fn resource(id: &str, team_id: &str, order: i64) -> Resource {
    Resource {
        id: id.to_string(),
        name: id.to_uppercase(),
        team_id: team_id.to_string(),
        order,
        is_active: true,
    }
}

fn schedule(id: &str, current: bool) -> Schedule {
    Schedule {
        id: id.to_string(),
        week_start: "2026-08-24".parse().expect("date"),
        week_end: "2026-08-30".parse().expect("date"),
        week_number: 35,
        year: 2026,
        is_current: current,
        is_next: !current,
        assignments: vec![],
    }
}

fn session() -> PlanningSession {
    let teams = vec![Team {
        id: "t1".to_string(),
        name: "night".to_string(),
        display_name: "Night".to_string(),
        order: 1,
        color: None,
        resources: vec![
            resource("m1", "t1", 1),
            resource("m2", "t1", 2),
            resource("m3", "t1", 3),
        ],
    }];
    let schedules = vec![schedule("s1", true), schedule("s2", false)];
    PlanningSession::new(&teams, schedules, ColorTable::defaults())
}

fn session_with(cell: &CellKey, code: &str) -> PlanningSession {
    let mut s = session();
    let ok = ScriptedTransport::default();
    s.pointer_down(cell.clone(), Modifiers::NONE);
    s.pointer_up();
    s.bulk_set(code, &ok).expect("seed assignment");
    assert_eq!(s.store().get(cell).map(|a| a.task_code.as_str()), Some(code));
    s
}

fn preset() -> Preset {
    Preset {
        id: None,
        label: "CMH3-CMH9".to_string(),
        codes: vec!["CMH3".to_string(), "CMH9".to_string()],
        color: "#90EE90".to_string(),
        order: None,
    }
}

#[test]
fn preset_fan_out_sends_one_batch_of_six() {
    let mut s = session();
    let transport = ScriptedTransport::default();

    // Drag m1..m3 across days 0..1, then ctrl-add two more cells: 6 total.
    s.pointer_down(CellKey::new("s1", "m1", 0), Modifiers::NONE);
    s.pointer_enter(CellKey::new("s1", "m2", 1));
    s.pointer_up();
    s.pointer_down(CellKey::new("s1", "m3", 0), Modifiers::CTRL);
    s.pointer_up();
    s.pointer_down(CellKey::new("s1", "m3", 1), Modifiers::CTRL);
    s.pointer_up();
    assert_eq!(s.selection().len(), 6);

    s.set_active_preset(Some(preset()));
    let committed = s.apply_active_preset(&transport).expect("commit");

    assert_eq!(committed, 6);
    assert_eq!(transport.batch_count(), 1);
    let batch = transport.last_batch();
    assert_eq!(batch.len(), 6);
    for input in &batch {
        assert_eq!(input.task_code, "CMH3-CMH9");
        assert_eq!(input.task_color.as_deref(), Some("#90EE90"));
    }

    // Confirmed commit lands in the mirror and clears the selection.
    assert_eq!(s.store().len(), 6);
    assert!(s.selection().is_empty());
}

#[test]
fn failed_commit_leaves_store_and_selection_intact() {
    let cell = CellKey::new("s1", "m1", 0);
    let mut s = session_with(&cell, "CMH3");
    let before: Vec<Assignment> = s.store().iter().map(|(_, a)| a.clone()).collect();

    let transport = ScriptedTransport::failing(SyncFailure::Validation(
        "mailer not found; dayOfWeek out of range".to_string(),
    ));

    s.pointer_down(cell.clone(), Modifiers::NONE);
    s.pointer_enter(CellKey::new("s1", "m2", 2));
    s.pointer_up();
    let selected = s.selection().len();
    let targets = s.selection().to_vec();

    let err = s
        .apply_preset(&preset(), &targets, &transport)
        .expect_err("transport fails");

    assert!(!err.message().is_empty());
    let after: Vec<Assignment> = s.store().iter().map(|(_, a)| a.clone()).collect();
    assert_eq!(before, after, "store unchanged on failure");
    assert_eq!(
        s.selection().len(),
        selected,
        "selection survives a failed mutation for retry"
    );
}

#[test]
fn inline_edit_commit_and_cancel() {
    let mut s = session();
    let transport = ScriptedTransport::default();
    let cell = CellKey::new("s1", "m2", 3);

    s.open_editor(cell.clone());
    s.editor_input("HOTMAIL");
    let committed = s.commit_editor(&transport).expect("commit");

    assert_eq!(committed, 1);
    let assignment = s.store().get(&cell).expect("assignment");
    assert_eq!(assignment.task_code, "HOTMAIL");
    assert_eq!(assignment.task_color.as_deref(), Some("#FFD700"));

    // Same steps but Escape: no network call, no mirror change.
    let other = CellKey::new("s1", "m3", 4);
    s.open_editor(other.clone());
    s.editor_input("HOTMAIL");
    s.escape();
    assert_eq!(s.commit_editor(&transport).expect("noop"), 0);
    assert!(s.store().get(&other).is_none());
    assert_eq!(transport.batch_count(), 1, "only the Enter path hit the network");
}

#[test]
fn deletion_via_empty_edit_removes_the_assignment() {
    let cell = CellKey::new("s1", "m1", 0);
    let mut s = session_with(&cell, "CMH3");
    let transport = ScriptedTransport::default();

    s.open_editor(cell.clone());
    s.editor_input("   ");
    s.commit_editor(&transport).expect("commit deletion");

    assert!(s.store().get(&cell).is_none());
    let batch = transport.last_batch();
    assert_eq!(batch.len(), 1);
    assert!(batch[0].task_code.is_empty());
}

#[test]
fn copy_then_paste_to_selection() {
    let source = CellKey::new("s1", "m1", 0);
    let mut s = session_with(&source, "Gmail");
    let transport = ScriptedTransport::default();

    s.copy_cell(&source);
    s.pointer_down(CellKey::new("s1", "m2", 2), Modifiers::NONE);
    s.pointer_enter(CellKey::new("s1", "m3", 3));
    s.pointer_up();

    let committed = s.paste_to_selection(&transport).expect("paste");
    assert_eq!(committed, 4);
    for input in transport.last_batch() {
        assert_eq!(input.task_code, "Gmail");
    }

    // Clipboard persists across the cleared selection.
    assert!(!s.clipboard().is_empty());
}

#[test]
fn paste_with_empty_clipboard_is_a_silent_no_op() {
    let mut s = session();
    let transport = ScriptedTransport::default();

    s.pointer_down(CellKey::new("s1", "m1", 0), Modifiers::NONE);
    s.pointer_up();
    let committed = s.paste_to_selection(&transport).expect("noop");

    assert_eq!(committed, 0);
    assert_eq!(transport.batch_count(), 0);
    assert!(!s.selection().is_empty(), "no-op does not clear selection");
}

#[test]
fn bulk_clear_requires_explicit_confirmation() {
    let cell = CellKey::new("s1", "m1", 0);
    let mut s = session_with(&cell, "CMH3");
    let transport = ScriptedTransport::default();

    s.pointer_down(cell.clone(), Modifiers::NONE);
    s.pointer_up();
    assert_eq!(s.request_clear(), 1);
    assert!(s.has_pending_clear());
    assert_eq!(transport.batch_count(), 0, "staging sends nothing");

    s.confirm_clear(&transport).expect("clear");
    assert!(s.store().get(&cell).is_none());
    assert!(!s.has_pending_clear());

    // A second confirm with nothing staged is a no-op.
    assert_eq!(s.confirm_clear(&transport).expect("noop"), 0);
    assert_eq!(transport.batch_count(), 1);
}

#[test]
fn escape_backs_out_of_a_staged_clear_before_dropping_selection() {
    let cell = CellKey::new("s1", "m1", 0);
    let mut s = session_with(&cell, "CMH3");
    let transport = ScriptedTransport::default();

    s.pointer_down(cell.clone(), Modifiers::NONE);
    s.pointer_up();
    s.request_clear();

    s.escape();
    assert!(!s.has_pending_clear());
    assert!(!s.selection().is_empty(), "first escape only cancels the clear");

    s.escape();
    assert!(s.selection().is_empty());

    assert_eq!(s.confirm_clear(&transport).expect("noop"), 0);
    assert_eq!(s.store().get(&cell).expect("kept").task_code, "CMH3");
}

#[test]
fn drop_preset_outside_selection_fills_only_the_drop_cell() {
    let mut s = session();
    let transport = ScriptedTransport::default();

    s.pointer_down(CellKey::new("s1", "m1", 0), Modifiers::NONE);
    s.pointer_enter(CellKey::new("s1", "m1", 3));
    s.pointer_up();

    let drop = CellKey::new("s1", "m3", 6);
    let committed = s.drop_preset(&preset(), &drop, &transport).expect("drop");

    assert_eq!(committed, 1);
    assert_eq!(transport.last_batch().len(), 1);
    assert_eq!(transport.last_batch()[0].cell_key(), drop);
}

#[test]
fn current_and_next_week_lookup() {
    let s = session();
    assert_eq!(s.current_schedule().map(|w| w.id.as_str()), Some("s1"));
    assert_eq!(s.next_schedule().map(|w| w.id.as_str()), Some("s2"));
}
