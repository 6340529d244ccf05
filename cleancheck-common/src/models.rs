//! Assessment and inspection models
//!
//! Wire format is camelCase JSON, matching what the browser UI consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Score at or above which an area is graded GOOD
pub const GOOD_THRESHOLD: u8 = 80;
/// Score at or above which an area is graded MEDIUM
pub const MEDIUM_THRESHOLD: u8 = 50;

/// Quality band of an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Quality {
    Good,
    Medium,
    Poor,
}

impl Quality {
    /// Band for a 0-100 score (≥80 GOOD, ≥50 MEDIUM, else POOR)
    pub fn from_score(score: u8) -> Quality {
        if score >= GOOD_THRESHOLD {
            Quality::Good
        } else if score >= MEDIUM_THRESHOLD {
            Quality::Medium
        } else {
            Quality::Poor
        }
    }

    /// Case-insensitive parse of a band label
    pub fn from_label(label: &str) -> Option<Quality> {
        match label.trim().to_ascii_uppercase().as_str() {
            "GOOD" => Some(Quality::Good),
            "MEDIUM" => Some(Quality::Medium),
            "POOR" => Some(Quality::Poor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Good => "GOOD",
            Quality::Medium => "MEDIUM",
            Quality::Poor => "POOR",
        }
    }
}

/// Outcome of one evaluated aspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FindingStatus {
    Pass,
    Fail,
}

/// One evaluated aspect of the area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub aspect: String,
    pub status: FindingStatus,
    pub description: String,
}

/// Kind of thing spotted in the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObservationKind {
    Object,
    Stain,
    Debris,
    Issue,
}

/// Impact of an observation on cleanliness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Something spotted in the image, located by percentage coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub item: String,
    #[serde(rename = "type")]
    pub kind: ObservationKind,
    /// Horizontal position, 0 (left) to 100 (right)
    pub x: f64,
    /// Vertical position, 0 (top) to 100 (bottom)
    pub y: f64,
    pub severity: Severity,
}

/// Structured grading returned by the vision model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub overall_score: u8,
    pub quality: Quality,
    pub summary: String,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<String>,
    pub confidence: u8,
    #[serde(default)]
    pub observations: Vec<Observation>,
    /// Task type the model classified the image as (auto-detect only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_task_type: Option<String>,
    /// Task name the model reported (auto-detect only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
}

impl Assessment {
    /// Set a new overall score and recompute the quality band from it
    pub fn rescore(&mut self, score: u8) {
        self.overall_score = score;
        self.quality = Quality::from_score(score);
    }
}

/// One recorded run of the analysis pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Resolved task type key
    pub task_type: String,
    pub task_name: String,
    /// Username of the author
    pub user_id: String,
    /// Display name of the author
    pub user_name: String,
    pub assessment: Assessment,
    /// Free-form client metadata
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    /// Parse a role name; only `"admin"` and `"staff"` are accepted
    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
