use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monday-first day names; `day_of_week` indexes into this.
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Identifies at most one assignment: (schedule, resource, day).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub schedule_id: String,
    pub resource_id: String,
    pub day_of_week: u8,
}

impl CellKey {
    pub fn new(
        schedule_id: impl Into<String>,
        resource_id: impl Into<String>,
        day_of_week: u8,
    ) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            resource_id: resource_id.into(),
            day_of_week,
        }
    }
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.schedule_id, self.resource_id, self.day_of_week
        )
    }
}

/// A mailer: one grid row, owned by a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub team_id: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "mailers")]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub schedule_id: String,
    // Older backends call the resource a mailer on the wire.
    #[serde(alias = "mailerId")]
    pub resource_id: String,
    pub day_of_week: u8,
    pub task_code: String,
    #[serde(default)]
    pub task_color: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Assignment {
    pub fn cell_key(&self) -> CellKey {
        CellKey::new(
            self.schedule_id.clone(),
            self.resource_id.clone(),
            self.day_of_week,
        )
    }
}

/// One calendar week's container of assignments. The server guarantees at
/// most one schedule has `is_current` and one has `is_next`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub week_number: u32,
    pub year: i32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// A named, colored bundle of task codes applied to cells in one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    #[serde(default)]
    pub id: Option<String>,
    pub label: String,
    pub codes: Vec<String>,
    pub color: String,
    #[serde(default)]
    pub order: Option<i64>,
}

impl Preset {
    /// The task code a preset writes into a cell.
    pub fn task_code(&self) -> String {
        self.codes.join("-")
    }
}

/// One cell mutation in a bulk commit. An empty `task_code` deletes the
/// assignment at the cell key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub schedule_id: String,
    pub resource_id: String,
    pub day_of_week: u8,
    pub task_code: String,
    #[serde(default)]
    pub task_color: Option<String>,
}

impl AssignmentInput {
    pub fn set(cell: &CellKey, task_code: impl Into<String>, task_color: impl Into<String>) -> Self {
        Self {
            schedule_id: cell.schedule_id.clone(),
            resource_id: cell.resource_id.clone(),
            day_of_week: cell.day_of_week,
            task_code: task_code.into(),
            task_color: Some(task_color.into()),
        }
    }

    pub fn delete(cell: &CellKey) -> Self {
        Self {
            schedule_id: cell.schedule_id.clone(),
            resource_id: cell.resource_id.clone(),
            day_of_week: cell.day_of_week,
            task_code: String::new(),
            task_color: None,
        }
    }

    pub fn cell_key(&self) -> CellKey {
        CellKey::new(
            self.schedule_id.clone(),
            self.resource_id.clone(),
            self.day_of_week,
        )
    }

    pub fn is_deletion(&self) -> bool {
        self.task_code.is_empty()
    }

    pub fn into_assignment(self, id: String) -> Assignment {
        Assignment {
            id,
            schedule_id: self.schedule_id,
            resource_id: self.resource_id,
            day_of_week: self.day_of_week,
            task_code: self.task_code,
            task_color: self.task_color,
            notes: None,
        }
    }
}

pub fn fresh_local_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}
