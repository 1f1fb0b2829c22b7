//! 객체 검출 포트.
//!
//! 구현: `segcam-vision::chroma_key::ChromaKeyDetector`

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::detection::Detection;
use crate::models::frame::Frame;

/// 프레임 → 객체 검출 목록
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// 모델 로드. 실패 시 `CoreError::Initialization`.
    async fn initialize(&self) -> Result<(), CoreError>;

    /// 검출 실행 (검출 없음은 빈 목록)
    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, CoreError>;
}
