//! 실루엣 마스크 효과: 사람은 흰색, 배경은 검은색.

use std::sync::Arc;

use async_trait::async_trait;
use segcam_core::error::CoreError;
use segcam_core::models::frame::{CategoryMask, Frame};
use segcam_core::models::surface::{DisplaySurface, BLACK, WHITE};
use segcam_core::ports::segmenter::Segmenter;

use super::{ensure_mask_matches, RenderEffect};
use crate::classifier::MaskClassifier;

/// 이진 마스크 채우기 효과 (카메라 영상은 그리지 않음)
pub struct MaskFillEffect {
    segmenter: Arc<dyn Segmenter>,
    classifier: MaskClassifier,
}

impl MaskFillEffect {
    pub fn new(segmenter: Arc<dyn Segmenter>, classifier: MaskClassifier) -> Self {
        Self {
            segmenter,
            classifier,
        }
    }
}

#[async_trait]
impl RenderEffect for MaskFillEffect {
    type Inference = CategoryMask;

    fn name(&self) -> &'static str {
        "mask-fill"
    }

    async fn initialize(&self) -> Result<(), CoreError> {
        self.segmenter.initialize().await
    }

    async fn infer(&self, frame: &Frame) -> Result<CategoryMask, CoreError> {
        let mask = self.segmenter.segment(frame, frame.timestamp_ms).await?;
        ensure_mask_matches(&mask, frame)?;
        Ok(mask)
    }

    fn draw(&self, _frame: &Frame, mask: &CategoryMask, surface: &mut DisplaySurface) {
        let width = mask.width();
        for (index, label) in mask.labels().enumerate() {
            let x = index as u32 % width;
            let y = index as u32 / width;
            let color = if self.classifier.is_person(label) {
                WHITE
            } else {
                BLACK
            };
            surface.put_pixel(x, y, color);
        }
    }
}
