//! Analysis pipeline
//!
//! Turns one image into one recorded [`Inspection`]:
//! normalize task type, build the prompt, query the vision model once,
//! parse the reply, resolve the stored task identity, insert into history.
//!
//! Only the vision call can fail. Everything after it degrades instead of
//! aborting, so a successful call always produces a recorded inspection.

use chrono::Utc;
use cleancheck_common::rubric::{display_name, AUTO_DETECT};
use cleancheck_common::{Assessment, Inspection, RequestedTask};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::access::AuthUser;
use super::assessment_parser::parse_assessment;
use super::prompt_builder::build_prompt;
use super::vision_client::{VisionClient, VisionError};
use crate::store::InspectionStore;

/// Task name stored when auto-detect was requested but nothing was detected
pub const AUTO_DETECT_NAME: &str = "Auto-detect";
/// Task name stored when the model reports a type outside the catalog
pub const UNKNOWN_TASK_NAME: &str = "Unknown";

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No image data provided")]
    MissingImage,

    #[error("Failed to analyze image: {0}")]
    ExternalCallFailed(#[from] VisionError),
}

/// One analysis request, as received from either analyze endpoint
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Data URI of the image
    pub image_data: Option<String>,
    pub task_type: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    vision: Arc<dyn VisionClient>,
    inspections: InspectionStore,
}

impl AnalysisPipeline {
    pub fn new(vision: Arc<dyn VisionClient>, inspections: InspectionStore) -> Self {
        Self {
            vision,
            inspections,
        }
    }

    /// Run the full pipeline for `user` and return the stored inspection
    pub async fn analyze(
        &self,
        request: AnalysisRequest,
        user: &AuthUser,
    ) -> Result<Inspection, PipelineError> {
        let image_data = request
            .image_data
            .filter(|data| !data.trim().is_empty())
            .ok_or(PipelineError::MissingImage)?;

        let requested = RequestedTask::parse(request.task_type.as_deref());
        info!(
            user = %user.username,
            task = ?requested,
            "Analyzing image"
        );

        let prompt = build_prompt(requested);
        let reply = self
            .vision
            .analyze(&image_data, &prompt)
            .await
            .map_err(|e| {
                warn!(error = %e, "Vision call failed");
                PipelineError::ExternalCallFailed(e)
            })?;

        let assessment = parse_assessment(&reply);
        let (task_type, task_name) = resolve_task(requested, &assessment);

        let inspection = Inspection {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            task_type,
            task_name,
            user_id: user.username.clone(),
            user_name: user.name.clone(),
            assessment,
            metadata: request.metadata.unwrap_or_default(),
            updated_at: None,
        };

        let evicted = self.inspections.insert(inspection.clone()).await;
        info!(
            id = %inspection.id,
            task = %inspection.task_type,
            score = inspection.assessment.overall_score,
            quality = %inspection.assessment.quality.as_str(),
            evicted,
            "Inspection recorded"
        );

        Ok(inspection)
    }
}

/// Stored task type and display name for a finished analysis
fn resolve_task(requested: RequestedTask, assessment: &Assessment) -> (String, String) {
    match requested {
        RequestedTask::Known(task) => (task.as_str().to_string(), task.rubric().name.to_string()),
        RequestedTask::AutoDetect => match assessment.detected_task_type.as_deref().map(str::trim) {
            Some(detected) if !detected.is_empty() => (
                detected.to_string(),
                display_name(detected)
                    .unwrap_or(UNKNOWN_TASK_NAME)
                    .to_string(),
            ),
            _ => (AUTO_DETECT.to_string(), AUTO_DETECT_NAME.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cleancheck_common::{Quality, Role};
    use std::sync::Mutex;

    struct ScriptedVision {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedVision {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VisionClient for ScriptedVision {
        async fn analyze(&self, _image_data: &str, prompt: &str) -> Result<String, VisionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(VisionError::Network)
        }
    }

    fn staff() -> AuthUser {
        AuthUser {
            username: "anna".to_string(),
            name: "Anna Staff".to_string(),
            role: Role::Staff,
            token: "token".to_string(),
        }
    }

    fn request(task_type: Option<&str>) -> AnalysisRequest {
        AnalysisRequest {
            image_data: Some("data:image/png;base64,AAAA".to_string()),
            task_type: task_type.map(str::to_string),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_missing_image_is_rejected_before_vision_call() {
        let vision = ScriptedVision::replying("{}");
        let pipeline = AnalysisPipeline::new(vision.clone(), InspectionStore::new());

        for image_data in [None, Some(String::new()), Some("   ".to_string())] {
            let result = pipeline
                .analyze(
                    AnalysisRequest {
                        image_data,
                        ..AnalysisRequest::default()
                    },
                    &staff(),
                )
                .await;
            assert!(matches!(result, Err(PipelineError::MissingImage)));
        }
        assert!(vision.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_task_types_resolve_to_desk_surface() {
        let store = InspectionStore::new();
        let pipeline =
            AnalysisPipeline::new(ScriptedVision::replying(r#"{"overallScore": 70}"#), store.clone());

        for task_type in [None, Some(""), Some("garage"), Some("FLOOR")] {
            let inspection = pipeline.analyze(request(task_type), &staff()).await.unwrap();
            assert_eq!(inspection.task_type, "desk-surface", "{task_type:?}");
            assert_eq!(inspection.task_name, "Desk Surface");
        }
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn test_known_task_type_is_kept() {
        let pipeline = AnalysisPipeline::new(
            ScriptedVision::replying(r#"{"overallScore": 90, "quality": "GOOD"}"#),
            InspectionStore::new(),
        );

        let inspection = pipeline.analyze(request(Some("window")), &staff()).await.unwrap();
        assert_eq!(inspection.task_type, "window");
        assert_eq!(inspection.task_name, "Window");
        assert_eq!(inspection.assessment.quality, Quality::Good);
        assert_eq!(inspection.user_id, "anna");
        assert_eq!(inspection.user_name, "Anna Staff");
        assert!(inspection.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_auto_detect_uses_detected_type() {
        let vision = ScriptedVision::replying(
            r#"```json
{"detectedTaskType": "whiteboard", "taskName": "Whiteboard", "overallScore": 45}
```"#,
        );
        let pipeline = AnalysisPipeline::new(vision.clone(), InspectionStore::new());

        let inspection = pipeline
            .analyze(request(Some("auto-detect")), &staff())
            .await
            .unwrap();
        assert_eq!(inspection.task_type, "whiteboard");
        assert_eq!(inspection.task_name, "Whiteboard");
        assert_eq!(inspection.assessment.quality, Quality::Poor);

        let prompts = vision.prompts.lock().unwrap();
        assert!(prompts[0].contains("detectedTaskType"));
    }

    #[tokio::test]
    async fn test_auto_detect_with_unknown_or_missing_detection() {
        let pipeline = AnalysisPipeline::new(
            ScriptedVision::replying(r#"{"detectedTaskType": "kitchen", "overallScore": 60}"#),
            InspectionStore::new(),
        );
        let inspection = pipeline
            .analyze(request(Some("auto-detect")), &staff())
            .await
            .unwrap();
        assert_eq!(inspection.task_type, "kitchen");
        assert_eq!(inspection.task_name, UNKNOWN_TASK_NAME);

        let pipeline =
            AnalysisPipeline::new(ScriptedVision::replying("no idea"), InspectionStore::new());
        let inspection = pipeline
            .analyze(request(Some("auto-detect")), &staff())
            .await
            .unwrap();
        assert_eq!(inspection.task_type, AUTO_DETECT);
        assert_eq!(inspection.task_name, AUTO_DETECT_NAME);
        assert_eq!(inspection.assessment.overall_score, 50);
    }

    #[tokio::test]
    async fn test_vision_failure_records_nothing() {
        let store = InspectionStore::new();
        let pipeline = AnalysisPipeline::new(ScriptedVision::failing("connection reset"), store.clone());

        let err = pipeline.analyze(request(Some("floor")), &staff()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ExternalCallFailed(_)));
        assert!(err.to_string().contains("connection reset"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_metadata_is_carried() {
        let pipeline = AnalysisPipeline::new(
            ScriptedVision::replying(r#"{"overallScore": 80}"#),
            InspectionStore::new(),
        );
        let mut metadata = Map::new();
        metadata.insert("room".to_string(), Value::from("B-204"));

        let inspection = pipeline
            .analyze(
                AnalysisRequest {
                    metadata: Some(metadata),
                    ..request(Some("floor"))
                },
                &staff(),
            )
            .await
            .unwrap();
        assert_eq!(inspection.metadata["room"], "B-204");
    }
}
