//! Rubric catalog endpoint

use axum::Json;
use cleancheck_common::rubric::{get_rubric, RubricEntry, TaskType};
use std::collections::BTreeMap;

/// GET /api/tasks
///
/// Full catalog keyed by task type identifier.
pub async fn list_tasks() -> Json<BTreeMap<&'static str, &'static RubricEntry>> {
    Json(
        TaskType::ALL
            .into_iter()
            .map(|task| (task.as_str(), get_rubric(task)))
            .collect(),
    )
}
