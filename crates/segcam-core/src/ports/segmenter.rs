//! 세그멘테이션 포트.
//!
//! 구현: `segcam-vision::chroma_key::ChromaKeySegmenter`

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::frame::{CategoryMask, Frame};

/// 프레임 → 픽셀별 카테고리 마스크
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// 모델 로드. 실패 시 `CoreError::Initialization`.
    async fn initialize(&self) -> Result<(), CoreError>;

    /// 비디오 모드 세그멘테이션.
    ///
    /// 반환 마스크 크기는 프레임 크기와 같아야 한다.
    /// 실패는 `CoreError::FrameInference`로 보고하며 해당 사이클만 버린다.
    async fn segment(&self, frame: &Frame, timestamp_ms: u64) -> Result<CategoryMask, CoreError>;
}
