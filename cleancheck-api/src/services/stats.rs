//! Inspection statistics

use cleancheck_common::{Inspection, Quality};
use serde::Serialize;
use std::collections::BTreeMap;

/// Count of inspections per quality band
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct QualityDistribution {
    pub good: usize,
    pub medium: usize,
    pub poor: usize,
}

/// Aggregate over a visibility-filtered list of inspections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionStats {
    pub total_inspections: usize,
    /// Rounded mean of overall scores; 0 when there are no inspections
    pub average_score: u32,
    pub quality_distribution: QualityDistribution,
    /// Count per task display name
    pub task_distribution: BTreeMap<String, usize>,
}

pub fn compute(inspections: &[Inspection]) -> InspectionStats {
    if inspections.is_empty() {
        return InspectionStats::default();
    }

    let mut stats = InspectionStats {
        total_inspections: inspections.len(),
        ..InspectionStats::default()
    };

    let mut score_sum: u64 = 0;
    for inspection in inspections {
        score_sum += u64::from(inspection.assessment.overall_score);

        match inspection.assessment.quality {
            Quality::Good => stats.quality_distribution.good += 1,
            Quality::Medium => stats.quality_distribution.medium += 1,
            Quality::Poor => stats.quality_distribution.poor += 1,
        }

        *stats
            .task_distribution
            .entry(inspection.task_name.clone())
            .or_insert(0) += 1;
    }

    stats.average_score = (score_sum as f64 / inspections.len() as f64).round() as u32;
    stats
}
