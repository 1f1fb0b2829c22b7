//! ASCII 그리드 효과.
//!
//! 검은 배경 위에 고정 간격 격자로 마스크를 샘플링하고,
//! 각 샘플의 라벨과 중심점 기준 정규화 거리로 글리프를 골라 셀 중앙에 그린다.
//! 사람이 없는 프레임은 검은 배경만 남는다.

use std::sync::Arc;

use async_trait::async_trait;
use image::Rgba;
use segcam_core::config::EffectConfig;
use segcam_core::error::CoreError;
use segcam_core::models::frame::{CategoryMask, Frame};
use segcam_core::models::surface::DisplaySurface;
use segcam_core::ports::segmenter::Segmenter;

use super::{ensure_mask_matches, RenderEffect};
use crate::classifier::MaskClassifier;
use crate::geometry;

/// 거리 기반 ASCII 효과
pub struct AsciiEffect {
    segmenter: Arc<dyn Segmenter>,
    classifier: MaskClassifier,
    grid_size: u32,
    color: Rgba<u8>,
}

impl AsciiEffect {
    pub fn new(segmenter: Arc<dyn Segmenter>, classifier: MaskClassifier, config: &EffectConfig) -> Self {
        Self {
            segmenter,
            classifier,
            grid_size: config.grid_size.max(1),
            color: Rgba(config.glyph_color),
        }
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// 마스크를 격자 글리프로 래스터화
    pub fn rasterize(&self, mask: &CategoryMask, surface: &mut DisplaySurface) {
        let Some(center) = geometry::find_person_center(mask, &self.classifier) else {
            return;
        };
        let (width, height) = (mask.width(), mask.height());
        let max_distance = geometry::max_edge_distance(center, width, height);
        let grid = self.grid_size;
        let half = grid / 2;

        for y in (0..height).step_by(grid as usize) {
            for x in (0..width).step_by(grid as usize) {
                let label = mask.label_at(x, y).unwrap_or_default();
                let distance = geometry::normalized_distance(x, y, center, max_distance);
                let glyph = self.classifier.glyph(label, distance);
                surface.draw_glyph(glyph, x + half, y + half, grid, self.color);
            }
        }
    }
}

#[async_trait]
impl RenderEffect for AsciiEffect {
    type Inference = CategoryMask;

    fn name(&self) -> &'static str {
        "ascii"
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
        self.rasterize(mask, surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::FixedSegmenter;
    use image::RgbaImage;
    use segcam_core::models::surface::BLACK;

    fn block_labels(size: u32, from: u32, to: u32) -> Vec<u8> {
        let mut labels = vec![0u8; (size * size) as usize];
        for y in from..to {
            for x in from..to {
                labels[(y * size + x) as usize] = 15;
            }
        }
        labels
    }

    fn effect(labels: Vec<u8>, size: u32) -> AsciiEffect {
        AsciiEffect::new(
            Arc::new(FixedSegmenter::new(size, size, labels)),
            MaskClassifier::default(),
            &EffectConfig::default(),
        )
    }

    #[tokio::test]
    async fn grid_glyphs_follow_mask() {
        let effect = effect(block_labels(18, 0, 9), 18);
        let frame = Frame::new(1, RgbaImage::new(18, 18));
        let mask = effect.infer(&frame).await.unwrap();

        let mut surface = DisplaySurface::new(18, 18);
        surface.clear(BLACK);
        effect.draw(&frame, &mask, &mut surface);

        let glyphs = surface.glyphs();
        assert_eq!(glyphs.len(), 4);
        assert_eq!((glyphs[0].glyph, glyphs[0].x, glyphs[0].y), (' ', 4, 4));
        assert_eq!((glyphs[1].glyph, glyphs[1].x, glyphs[1].y), ('🔥', 13, 4));
        assert_eq!(surface.to_text_lines(9), vec![" 🔥".to_string(), "🔥🔥".to_string()]);
        // 사람 셀 중앙은 검은색 유지
        assert_eq!(surface.pixel(4, 4), Some(BLACK));
        assert_ne!(surface.pixel(13, 13), Some(BLACK));
    }

    #[tokio::test]
    async fn no_person_draws_nothing() {
        let effect = effect(vec![0u8; 81], 9);
        let frame = Frame::new(1, RgbaImage::new(9, 9));
        let mask = effect.infer(&frame).await.unwrap();

        let mut surface = DisplaySurface::new(9, 9);
        surface.clear(BLACK);
        effect.draw(&frame, &mask, &mut surface);
        assert!(surface.glyphs().is_empty());
        assert!(surface.image().pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn zero_grid_is_clamped() {
        let mut config = EffectConfig::default();
        config.grid_size = 0;
        let effect = AsciiEffect::new(
            Arc::new(FixedSegmenter::new(1, 1, vec![0])),
            MaskClassifier::default(),
            &config,
        );
        assert_eq!(effect.grid_size(), 1);
    }
}
