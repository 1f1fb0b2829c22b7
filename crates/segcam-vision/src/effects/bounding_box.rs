//! 바운딩 박스 효과: 카메라 영상 위에 검출 박스 외곽선.
//!
//! 세그멘테이션 마스크가 아닌 별도의 객체 검출 경로를 사용한다.

use std::sync::Arc;

use async_trait::async_trait;
use image::Rgba;
use segcam_core::config::EffectConfig;
use segcam_core::error::CoreError;
use segcam_core::models::detection::Detection;
use segcam_core::models::frame::Frame;
use segcam_core::models::surface::DisplaySurface;
use segcam_core::ports::detector::ObjectDetector;
use tracing::trace;

use super::RenderEffect;

/// 검출 박스 오버레이 효과
pub struct BoundingBoxEffect {
    detector: Arc<dyn ObjectDetector>,
    class: String,
    color: Rgba<u8>,
    line_width: u32,
}

impl BoundingBoxEffect {
    pub fn new(detector: Arc<dyn ObjectDetector>, config: &EffectConfig) -> Self {
        Self {
            detector,
            class: config.detection_class.clone(),
            color: Rgba(config.box_color),
            line_width: config.box_line_width,
        }
    }
}

#[async_trait]
impl RenderEffect for BoundingBoxEffect {
    type Inference = Vec<Detection>;

    fn name(&self) -> &'static str {
        "bounding-box"
    }

    async fn initialize(&self) -> Result<(), CoreError> {
        self.detector.initialize().await
    }

    async fn infer(&self, frame: &Frame) -> Result<Vec<Detection>, CoreError> {
        let detections = self.detector.detect(frame).await?;
        let total = detections.len();
        let matched: Vec<Detection> = detections
            .into_iter()
            .filter(|d| d.is_class(&self.class))
            .collect();
        trace!("검출 {}건 중 '{}' {}건", total, self.class, matched.len());
        Ok(matched)
    }

    fn draw(&self, frame: &Frame, detections: &Vec<Detection>, surface: &mut DisplaySurface) {
        surface.blit(&frame.image, 0, 0);
        for detection in detections {
            let [x, y, w, h] = detection.bbox;
            surface.stroke_rect(
                x.round() as i64,
                y.round() as i64,
                w.round().max(0.0) as u32,
                h.round().max(0.0) as u32,
                self.line_width,
                self.color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::FixedDetector;
    use image::RgbaImage;

    const GRAY: Rgba<u8> = Rgba([90, 90, 90, 255]);

    fn effect(detections: Vec<Detection>) -> BoundingBoxEffect {
        let mut config = EffectConfig::default();
        config.box_line_width = 1;
        BoundingBoxEffect::new(Arc::new(FixedDetector(detections)), &config)
    }

    #[tokio::test]
    async fn only_configured_class_is_kept() {
        let effect = effect(vec![
            Detection::new("person", [1.0, 1.0, 4.0, 4.0], 0.9),
            Detection::new("dog", [0.0, 0.0, 2.0, 2.0], 0.8),
        ]);
        let frame = Frame::new(1, RgbaImage::from_pixel(8, 8, GRAY));
        let detections = effect.infer(&frame).await.unwrap();
        assert_eq!(detections.len(), 1);
        assert!(detections[0].is_class("person"));
    }

    #[tokio::test]
    async fn draws_frame_then_outline() {
        let effect = effect(vec![Detection::new("person", [2.0, 2.0, 4.0, 4.0], 0.9)]);
        let frame = Frame::new(1, RgbaImage::from_pixel(8, 8, GRAY));
        let detections = effect.infer(&frame).await.unwrap();

        let mut surface = DisplaySurface::new(8, 8);
        effect.draw(&frame, &detections, &mut surface);
        let green = Rgba(EffectConfig::default().box_color);
        assert_eq!(surface.pixel(0, 0), Some(GRAY));
        assert_eq!(surface.pixel(2, 2), Some(green));
        assert_eq!(surface.pixel(5, 5), Some(green));
        assert_eq!(surface.pixel(3, 3), Some(GRAY));
    }

    #[tokio::test]
    async fn no_detection_shows_plain_frame() {
        let effect = effect(Vec::new());
        let frame = Frame::new(1, RgbaImage::from_pixel(4, 4, GRAY));
        let detections = effect.infer(&frame).await.unwrap();
        let mut surface = DisplaySurface::new(4, 4);
        effect.draw(&frame, &detections, &mut surface);
        assert!(surface.image().pixels().all(|p| *p == GRAY));
    }
}
