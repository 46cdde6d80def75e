//! Analysis service collaborators.
//!
//! The analyzer only depends on the [`AnalysisService`] trait; the HTTP
//! implementation lives in [`http`].

pub mod http;

pub use http::HttpAnalysisService;

use crate::error::ServiceError;
use crate::models::{AnalysisRequest, AnalysisResult};
use async_trait::async_trait;

/// Something that can classify one analysis request.
///
/// Each call corresponds to exactly one outbound request.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ServiceError>;
}
