//! Cleaning task rubric catalog
//!
//! Static mapping of task types to their display name and evaluation
//! criteria. The set of task types is closed; callers coerce anything
//! unrecognized or absent to [`TaskType::DeskSurface`] via
//! [`RequestedTask::parse`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel identifier for requests that let the model classify the image
pub const AUTO_DETECT: &str = "auto-detect";

/// Known cleaning task types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    TrashBin,
    Whiteboard,
    DeskSurface,
    Floor,
    Window,
}

impl TaskType {
    /// All task types in catalog order
    pub const ALL: [TaskType; 5] = [
        TaskType::TrashBin,
        TaskType::Whiteboard,
        TaskType::DeskSurface,
        TaskType::Floor,
        TaskType::Window,
    ];

    /// Wire identifier (e.g. `"trash-bin"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::TrashBin => "trash-bin",
            TaskType::Whiteboard => "whiteboard",
            TaskType::DeskSurface => "desk-surface",
            TaskType::Floor => "floor",
            TaskType::Window => "window",
        }
    }

    /// Look up a task type by its wire identifier
    pub fn from_key(key: &str) -> Option<TaskType> {
        TaskType::ALL.into_iter().find(|t| t.as_str() == key)
    }

    /// Rubric for this task type
    pub fn rubric(&self) -> &'static RubricEntry {
        get_rubric(*self)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task type as requested by a client, after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedTask {
    /// Let the model classify the area first
    AutoDetect,
    /// Grade directly against a known rubric
    Known(TaskType),
}

impl RequestedTask {
    /// Normalize a raw task type from a request
    ///
    /// - `"auto-detect"` → [`RequestedTask::AutoDetect`]
    /// - a catalog key → that task type
    /// - anything else, including absent or blank → desk surface
    pub fn parse(raw: Option<&str>) -> RequestedTask {
        match raw.map(str::trim) {
            Some(AUTO_DETECT) => RequestedTask::AutoDetect,
            Some(key) => RequestedTask::Known(TaskType::from_key(key).unwrap_or(TaskType::DeskSurface)),
            None => RequestedTask::Known(TaskType::DeskSurface),
        }
    }
}

/// Display name and evaluation criteria for one task type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricEntry {
    /// Human-readable task name
    pub name: &'static str,
    /// Ordered evaluation criteria
    pub criteria: &'static [&'static str],
}

static TRASH_BIN: RubricEntry = RubricEntry {
    name: "Trash Bin",
    criteria: &[
        "Bin should be completely empty",
        "No visible trash or debris",
        "Bin liner should be fresh and properly fitted",
        "No odors or stains visible",
    ],
};

static WHITEBOARD: RubricEntry = RubricEntry {
    name: "Whiteboard",
    criteria: &[
        "Surface should be completely clean",
        "No marker residues or stains",
        "Edges and corners should be clean",
        "Surface should be dry and streak-free",
    ],
};

static DESK_SURFACE: RubricEntry = RubricEntry {
    name: "Desk Surface",
    criteria: &[
        "Surface should be dust-free",
        "No visible stains or spills",
        "Items should be organized",
        "No crumbs or debris",
    ],
};

static FLOOR: RubricEntry = RubricEntry {
    name: "Floor",
    criteria: &[
        "No visible dirt or debris",
        "No stains or spills",
        "Edges and corners should be clean",
        "Surface should be dry",
    ],
};

static WINDOW: RubricEntry = RubricEntry {
    name: "Window",
    criteria: &[
        "Glass should be streak-free",
        "No smudges or fingerprints",
        "Window sill should be clean",
        "No visible dirt or spots",
    ],
};

/// Read-only rubric lookup
pub fn get_rubric(task_type: TaskType) -> &'static RubricEntry {
    match task_type {
        TaskType::TrashBin => &TRASH_BIN,
        TaskType::Whiteboard => &WHITEBOARD,
        TaskType::DeskSurface => &DESK_SURFACE,
        TaskType::Floor => &FLOOR,
        TaskType::Window => &WINDOW,
    }
}

/// Catalog display name for a raw task type key, if it is known
pub fn display_name(key: &str) -> Option<&'static str> {
    TaskType::from_key(key).map(|t| t.rubric().name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_task_type_has_four_criteria() {
        for task in TaskType::ALL {
            assert_eq!(task.rubric().criteria.len(), 4, "{task}");
        }
    }

    #[test]
    fn test_from_key_round_trips_wire_identifier() {
        for task in TaskType::ALL {
            assert_eq!(TaskType::from_key(task.as_str()), Some(task));
        }
        assert_eq!(TaskType::from_key("kitchen"), None);
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&TaskType::DeskSurface).unwrap();
        assert_eq!(json, "\"desk-surface\"");
        let parsed: TaskType = serde_json::from_str("\"trash-bin\"").unwrap();
        assert_eq!(parsed, TaskType::TrashBin);
    }

    #[test]
    fn test_requested_task_normalization() {
        assert_eq!(
            RequestedTask::parse(None),
            RequestedTask::Known(TaskType::DeskSurface)
        );
        assert_eq!(
            RequestedTask::parse(Some("")),
            RequestedTask::Known(TaskType::DeskSurface)
        );
        assert_eq!(RequestedTask::parse(Some("auto-detect")), RequestedTask::AutoDetect);
        assert_eq!(
            RequestedTask::parse(Some("floor")),
            RequestedTask::Known(TaskType::Floor)
        );
        assert_eq!(
            RequestedTask::parse(Some("garage")),
            RequestedTask::Known(TaskType::DeskSurface)
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("whiteboard"), Some("Whiteboard"));
        assert_eq!(display_name("spaceship"), None);
    }
}
