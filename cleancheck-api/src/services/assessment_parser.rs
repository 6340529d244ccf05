//! Assessment extraction from free-form model replies
//!
//! Two-stage search for a JSON object: a ```json fenced block first, then
//! the widest `{ ... }` span. The parser is total: when nothing usable is
//! found the caller gets [`fallback_assessment`] instead of an error.

use cleancheck_common::models::{FindingStatus, ObservationKind, Severity};
use cleancheck_common::{Assessment, Finding, Observation, Quality};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Summary used when the reply could not be parsed
pub const FALLBACK_SUMMARY: &str = "Unable to parse detailed assessment";
const FALLBACK_RECOMMENDATION: &str = "Review image quality and try again";
const NEUTRAL_SCORE: u8 = 50;

/// Lenient mirror of the reply schema; normalized into [`Assessment`]
///
/// Fields stay as raw JSON so one mistyped entry is skipped instead of
/// failing the whole reply. Only `overallScore` is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    overall_score: Value,
    #[serde(default)]
    quality: Value,
    #[serde(default)]
    summary: Value,
    #[serde(default)]
    findings: Value,
    #[serde(default)]
    recommendations: Value,
    #[serde(default)]
    confidence: Value,
    #[serde(default)]
    observations: Value,
    #[serde(default)]
    detected_task_type: Value,
    #[serde(default)]
    task_name: Value,
}

#[derive(Debug, Deserialize)]
struct RawFinding {
    #[serde(default)]
    aspect: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(default)]
    item: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    x: Value,
    #[serde(default)]
    y: Value,
    #[serde(default)]
    severity: Option<String>,
}

/// Parse a model reply into an assessment. Never fails.
pub fn parse_assessment(reply: &str) -> Assessment {
    for candidate in json_candidates(reply) {
        match serde_json::from_str::<RawAssessment>(candidate) {
            Ok(raw) => match normalize(raw) {
                Some(assessment) => return assessment,
                None => debug!("Candidate JSON has no numeric overallScore"),
            },
            Err(e) => debug!(error = %e, "Candidate JSON rejected"),
        }
    }

    warn!("Failed to parse model reply, using fallback assessment");
    fallback_assessment(reply)
}

/// Degraded-but-valid assessment carrying the raw reply
pub fn fallback_assessment(reply: &str) -> Assessment {
    Assessment {
        overall_score: NEUTRAL_SCORE,
        quality: Quality::Medium,
        summary: FALLBACK_SUMMARY.to_string(),
        findings: vec![Finding {
            aspect: "Analysis".to_string(),
            status: FindingStatus::Fail,
            description: reply.to_string(),
        }],
        recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
        confidence: NEUTRAL_SCORE,
        observations: Vec::new(),
        detected_task_type: None,
        task_name: None,
    }
}

/// Candidate JSON substrings, most specific first
fn json_candidates(reply: &str) -> Vec<&str> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(fenced) = fenced_json_block(reply) {
        candidates.push(fenced);
    }
    if let Some(braced) = widest_brace_span(reply) {
        if candidates.first() != Some(&braced) {
            candidates.push(braced);
        }
    }
    candidates
}

/// Body of the first ```json fence (tag matched case-insensitively)
fn fenced_json_block(reply: &str) -> Option<&str> {
    const OPEN: &str = "```json";
    const CLOSE: &str = "```";

    // ASCII lowercasing keeps byte offsets aligned with `reply`
    let lowered = reply.to_ascii_lowercase();
    let open = lowered.find(OPEN)?;
    let body_start = open + OPEN.len();
    let body_len = reply[body_start..].find(CLOSE)?;
    Some(reply[body_start..body_start + body_len].trim())
}

/// First `{` through last `}`
fn widest_brace_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

fn normalize(raw: RawAssessment) -> Option<Assessment> {
    let overall_score = clamp_percent(number(&raw.overall_score)?);
    let quality = raw
        .quality
        .as_str()
        .and_then(Quality::from_label)
        .unwrap_or_else(|| Quality::from_score(overall_score));

    Some(Assessment {
        overall_score,
        quality,
        summary: text(&raw.summary).unwrap_or_default(),
        findings: entries::<RawFinding>(raw.findings)
            .map(|f| Finding {
                aspect: f.aspect.unwrap_or_default(),
                status: match f.status.as_deref().map(str::trim) {
                    Some(s) if s.eq_ignore_ascii_case("PASS") => FindingStatus::Pass,
                    _ => FindingStatus::Fail,
                },
                description: f.description.unwrap_or_default(),
            })
            .collect(),
        recommendations: match raw.recommendations {
            Value::Array(items) => items.iter().filter_map(text).collect(),
            _ => Vec::new(),
        },
        confidence: number(&raw.confidence)
            .map(clamp_percent)
            .unwrap_or(NEUTRAL_SCORE),
        observations: entries::<RawObservation>(raw.observations)
            .map(|o| Observation {
                item: o.item.unwrap_or_default(),
                kind: observation_kind(o.kind.as_deref()),
                x: coordinate(&o.x),
                y: coordinate(&o.y),
                severity: severity(o.severity.as_deref()),
            })
            .collect(),
        detected_task_type: text(&raw.detected_task_type),
        task_name: text(&raw.task_name),
    })
}

/// Array elements that deserialize as `T`; anything else is dropped
fn entries<T: DeserializeOwned>(value: Value) -> impl Iterator<Item = T> {
    let items = match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    };
    items.into_iter().filter_map(|item| {
        serde_json::from_value(item)
            .map_err(|e| debug!(error = %e, "Skipping malformed list entry"))
            .ok()
    })
}

/// A JSON number, or a string holding one
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Percent-of-image position; unusable values land at 0
fn coordinate(value: &Value) -> f64 {
    number(value).unwrap_or(0.0).clamp(0.0, 100.0)
}

fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

fn observation_kind(label: Option<&str>) -> ObservationKind {
    match label.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
        Some("OBJECT") => ObservationKind::Object,
        Some("STAIN") => ObservationKind::Stain,
        Some("DEBRIS") => ObservationKind::Debris,
        _ => ObservationKind::Issue,
    }
}

fn severity(label: Option<&str>) -> Severity {
    match label.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
        Some("LOW") => Severity::Low,
        Some("HIGH") => Severity::High,
        _ => Severity::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_JSON: &str = r#"{
  "overallScore": 72,
  "quality": "MEDIUM",
  "summary": "Desk mostly clean with a coffee stain.",
  "findings": [
    {"aspect": "Dust", "status": "PASS", "description": "No dust visible"},
    {"aspect": "Stains", "status": "FAIL", "description": "Coffee ring near keyboard"}
  ],
  "recommendations": ["Wipe the coffee ring"],
  "confidence": 88,
  "observations": [
    {"item": "coffee stain", "type": "STAIN", "x": 42, "y": 61.5, "severity": "MEDIUM"}
  ]
}"#;

    #[test]
    fn test_fenced_block_is_extracted_exactly() {
        let reply = format!("Here is my assessment:\n```json\n{FULL_JSON}\n```\nThanks!");
        let assessment = parse_assessment(&reply);

        assert_eq!(assessment.overall_score, 72);
        assert_eq!(assessment.quality, Quality::Medium);
        assert_eq!(assessment.summary, "Desk mostly clean with a coffee stain.");
        assert_eq!(assessment.findings.len(), 2);
        assert_eq!(assessment.findings[0].status, FindingStatus::Pass);
        assert_eq!(assessment.findings[1].description, "Coffee ring near keyboard");
        assert_eq!(assessment.recommendations, vec!["Wipe the coffee ring"]);
        assert_eq!(assessment.confidence, 88);
        assert_eq!(assessment.observations.len(), 1);
        assert_eq!(assessment.observations[0].kind, ObservationKind::Stain);
        assert_eq!(assessment.observations[0].x, 42.0);
        assert_eq!(assessment.observations[0].y, 61.5);
        assert!(assessment.detected_task_type.is_none());
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let reply = format!("```json\n{FULL_JSON}\n```");
        assert_eq!(parse_assessment(&reply), parse_assessment(&reply));
    }

    #[test]
    fn test_bare_object_with_surrounding_prose() {
        let reply = format!("Sure! {FULL_JSON} Let me know if you need more.");
        assert_eq!(parse_assessment(&reply).overall_score, 72);
    }

    #[test]
    fn test_fence_tag_is_case_insensitive() {
        let reply = format!("```JSON\n{FULL_JSON}```");
        assert_eq!(parse_assessment(&reply).confidence, 88);
    }

    #[test]
    fn test_fallback_on_plain_text() {
        let assessment = parse_assessment("hello world");

        assert_eq!(assessment.quality, Quality::Medium);
        assert_eq!(assessment.overall_score, 50);
        assert_eq!(assessment.confidence, 50);
        assert_eq!(assessment.summary, FALLBACK_SUMMARY);
        assert_eq!(assessment.findings[0].aspect, "Analysis");
        assert_eq!(assessment.findings[0].status, FindingStatus::Fail);
        assert_eq!(assessment.findings[0].description, "hello world");
        assert_eq!(assessment.recommendations, vec![FALLBACK_RECOMMENDATION]);
        assert!(assessment.observations.is_empty());
    }

    #[test]
    fn test_fallback_on_malformed_json() {
        let reply = "```json\n{\"overallScore\": 80, \"quality\": }\n```";
        let assessment = parse_assessment(reply);
        assert_eq!(assessment.summary, FALLBACK_SUMMARY);
        assert_eq!(assessment.findings[0].description, reply);
    }

    #[test]
    fn test_missing_score_falls_back() {
        let assessment = parse_assessment(r#"{"quality": "GOOD", "summary": "fine"}"#);
        assert_eq!(assessment.summary, FALLBACK_SUMMARY);
    }

    #[test]
    fn test_broken_fence_falls_through_to_brace_search() {
        // The fenced body is not an object but the prose contains one
        let reply = "```json\nnot json\n``` but here: {\"overallScore\": 91}";
        let assessment = parse_assessment(reply);
        assert_eq!(assessment.overall_score, 91);
        assert_eq!(assessment.quality, Quality::Good);
    }

    #[test]
    fn test_lenient_normalization() {
        let reply = r#"{
            "overallScore": 140.4,
            "quality": "excellent",
            "findings": [{"aspect": "Floor", "status": "pass"}, {"aspect": "Edges", "status": "unclear"}],
            "observations": [{"item": "cable", "type": "wire", "x": -5, "y": 250, "severity": "critical"}]
        }"#;
        let assessment = parse_assessment(reply);

        assert_eq!(assessment.overall_score, 100);
        assert_eq!(assessment.quality, Quality::Good);
        assert_eq!(assessment.summary, "");
        assert_eq!(assessment.confidence, 50);
        assert_eq!(assessment.findings[0].status, FindingStatus::Pass);
        assert_eq!(assessment.findings[1].status, FindingStatus::Fail);
        let observation = &assessment.observations[0];
        assert_eq!(observation.kind, ObservationKind::Issue);
        assert_eq!(observation.severity, Severity::Medium);
        assert_eq!(observation.x, 0.0);
        assert_eq!(observation.y, 100.0);
    }

    #[test]
    fn test_mistyped_entries_are_skipped() {
        let reply = r#"{
            "overallScore": "77",
            "summary": 12,
            "findings": ["loose text", {"aspect": "Dust", "status": "PASS"}, {"aspect": 3}],
            "recommendations": ["Vacuum corners", 4, null],
            "confidence": "high",
            "observations": [
                {"item": "crumbs", "type": "DEBRIS", "x": "42", "y": 18},
                7,
                {"item": "mug", "type": "OBJECT", "x": "left", "y": null}
            ],
            "taskName": ["Floor"]
        }"#;
        let assessment = parse_assessment(reply);

        assert_eq!(assessment.overall_score, 77);
        assert_eq!(assessment.quality, Quality::Medium);
        assert_eq!(assessment.summary, "");
        assert_eq!(assessment.findings.len(), 1);
        assert_eq!(assessment.findings[0].aspect, "Dust");
        assert_eq!(assessment.recommendations, vec!["Vacuum corners"]);
        assert_eq!(assessment.confidence, 50);
        assert_eq!(assessment.observations.len(), 2);
        assert_eq!(assessment.observations[0].kind, ObservationKind::Debris);
        assert_eq!(assessment.observations[0].x, 42.0);
        assert_eq!(assessment.observations[0].y, 18.0);
        assert_eq!(assessment.observations[1].x, 0.0);
        assert_eq!(assessment.observations[1].y, 0.0);
        assert!(assessment.task_name.is_none());
    }

    #[test]
    fn test_non_numeric_score_falls_back() {
        let assessment = parse_assessment(r#"{"overallScore": "great", "summary": "fine"}"#);
        assert_eq!(assessment.summary, FALLBACK_SUMMARY);
        assert_eq!(assessment.overall_score, 50);
    }

    #[test]
    fn test_detection_fields_are_kept() {
        let reply = r#"{"overallScore": 60, "detectedTaskType": "floor", "taskName": "Floor"}"#;
        let assessment = parse_assessment(reply);
        assert_eq!(assessment.detected_task_type.as_deref(), Some("floor"));
        assert_eq!(assessment.task_name.as_deref(), Some("Floor"));
    }
}
