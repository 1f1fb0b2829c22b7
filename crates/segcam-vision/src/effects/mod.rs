//! 렌더 효과.
//!
//! 하나의 파이프라인이 배포 시 정적으로 고른 효과 하나를 사용한다.
//! 효과는 비동기 추론(`infer`)과 동기 래스터화(`draw`) 두 단계로 나뉜다.

pub mod ascii;
pub mod bounding_box;
pub mod mask_fill;

pub use ascii::AsciiEffect;
pub use bounding_box::BoundingBoxEffect;
pub use mask_fill::MaskFillEffect;

use async_trait::async_trait;
use segcam_core::error::CoreError;
use segcam_core::models::frame::{CategoryMask, Frame};
use segcam_core::models::surface::DisplaySurface;

/// 렌더 효과: 프레임 파이프라인의 전략
#[async_trait]
pub trait RenderEffect: Send + Sync + 'static {
    /// 추론 결과 (마스크, 검출 목록 등)
    type Inference: Send;

    /// 로그용 효과 이름
    fn name(&self) -> &'static str;

    /// 모델 초기화. 실패 시 `CoreError::Initialization`.
    async fn initialize(&self) -> Result<(), CoreError>;

    /// 프레임 추론. 실패는 해당 사이클만 버린다.
    async fn infer(&self, frame: &Frame) -> Result<Self::Inference, CoreError>;

    /// 추론 결과를 서피스에 그린다.
    ///
    /// 서피스는 이미 프레임 크기로 맞춰지고 검은색으로 지워진 상태다.
    fn draw(&self, frame: &Frame, inference: &Self::Inference, surface: &mut DisplaySurface);
}

/// 마스크 크기가 프레임과 다르면 해당 사이클의 추론 실패로 처리
pub(crate) fn ensure_mask_matches(mask: &CategoryMask, frame: &Frame) -> Result<(), CoreError> {
    if mask.width() != frame.width() || mask.height() != frame.height() {
        return Err(CoreError::FrameInference(format!(
            "마스크 크기 불일치: 마스크 {}x{}, 프레임 {}x{}",
            mask.width(),
            mask.height(),
            frame.width(),
            frame.height()
        )));
    }
    Ok(())
}
