//! Business logic services

pub mod access;
pub mod analysis_pipeline;
pub mod assessment_parser;
pub mod prompt_builder;
pub mod stats;
pub mod vision_client;

pub use access::{authorize, visibility, AccessDenied, Action, AuthUser};
pub use analysis_pipeline::{AnalysisPipeline, AnalysisRequest, PipelineError};
pub use vision_client::{OpenAiVisionClient, VisionClient, VisionError};
