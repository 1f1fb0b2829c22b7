//! 크로마키 세그멘터/검출기.
//!
//! 실제 인식 모델 대신 쓰는 로컬 구현. 키 색상에서 `tolerance` 이상 떨어진
//! 픽셀을 사람으로 본다. 출력 형식은 모델과 같다.
//! - 세그멘터: 사람 픽셀은 `person_value / 255`, 배경은 0인 카테고리 마스크
//! - 검출기: 전경 픽셀 바운딩 박스 하나를 "person" 검출로 보고

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use image::Rgba;
use segcam_core::config::{ChromaKeyConfig, Delegate, RunningMode, SegmentationConfig};
use segcam_core::error::CoreError;
use segcam_core::models::detection::Detection;
use segcam_core::models::frame::{BoundingBox, CategoryMask, Frame};
use segcam_core::ports::detector::ObjectDetector;
use segcam_core::ports::segmenter::Segmenter;
use tracing::{debug, info};

/// 키 색상 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaKey {
    key: [u8; 3],
    tolerance_sq: u32,
}

impl ChromaKey {
    pub fn new(key: [u8; 3], tolerance: u32) -> Self {
        Self {
            key,
            tolerance_sq: tolerance.saturating_mul(tolerance),
        }
    }

    pub fn from_config(config: &ChromaKeyConfig) -> Self {
        Self::new(config.key_color, config.tolerance)
    }

    /// 키 색상에서 충분히 먼 픽셀인지 (완전 투명 픽셀은 배경)
    #[inline]
    pub fn is_foreground(&self, pixel: &Rgba<u8>) -> bool {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            return false;
        }
        let dr = i32::from(r) - i32::from(self.key[0]);
        let dg = i32::from(g) - i32::from(self.key[1]);
        let db = i32::from(b) - i32::from(self.key[2]);
        (dr * dr + dg * dg + db * db) as u32 > self.tolerance_sq
    }
}

/// 크로마키 세그멘터: `Segmenter` 포트 구현
pub struct ChromaKeySegmenter {
    key: ChromaKey,
    person_value: u8,
    model_asset_path: String,
    delegate: Delegate,
    running_mode: RunningMode,
    ready: AtomicBool,
    /// 마지막 비디오 타임스탬프 (+1, 0은 없음)
    last_timestamp: AtomicU64,
}

impl ChromaKeySegmenter {
    pub fn new(config: &SegmentationConfig) -> Self {
        Self {
            key: ChromaKey::from_config(&config.chroma_key),
            person_value: config.person_class_value,
            model_asset_path: config.model_asset_path.clone(),
            delegate: config.delegate,
            running_mode: config.running_mode,
            ready: AtomicBool::new(false),
            last_timestamp: AtomicU64::new(0),
        }
    }

    /// 비디오 모드에서는 타임스탬프가 줄어들면 안 된다
    fn check_timestamp(&self, timestamp_ms: u64) -> Result<(), CoreError> {
        if self.running_mode != RunningMode::Video {
            return Ok(());
        }
        let prev = self.last_timestamp.fetch_max(timestamp_ms + 1, Ordering::SeqCst);
        if prev > timestamp_ms + 1 {
            return Err(CoreError::FrameInference(format!(
                "타임스탬프 역행: {} < {}",
                timestamp_ms,
                prev - 1
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Segmenter for ChromaKeySegmenter {
    async fn initialize(&self) -> Result<(), CoreError> {
        if !self.ready.swap(true, Ordering::SeqCst) {
            info!(
                "크로마키 세그멘터 준비: delegate={:?}, mode={:?}, person={}",
                self.delegate, self.running_mode, self.person_value
            );
            debug!("모델 에셋 대신 크로마키 사용: {}", self.model_asset_path);
        }
        Ok(())
    }

    async fn segment(&self, frame: &Frame, timestamp_ms: u64) -> Result<CategoryMask, CoreError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(CoreError::FrameInference("세그멘터 미초기화".to_string()));
        }
        self.check_timestamp(timestamp_ms)?;

        let person = f32::from(self.person_value) / 255.0;
        let values = frame
            .image
            .pixels()
            .map(|p| if self.key.is_foreground(p) { person } else { 0.0 })
            .collect();
        CategoryMask::new(frame.width(), frame.height(), values)
            .map_err(|e| CoreError::FrameInference(e.to_string()))
    }
}

/// 크로마키 검출기: `ObjectDetector` 포트 구현
pub struct ChromaKeyDetector {
    key: ChromaKey,
    ready: AtomicBool,
}

impl ChromaKeyDetector {
    pub fn new(config: &ChromaKeyConfig) -> Self {
        Self {
            key: ChromaKey::from_config(config),
            ready: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ObjectDetector for ChromaKeyDetector {
    async fn initialize(&self) -> Result<(), CoreError> {
        if !self.ready.swap(true, Ordering::SeqCst) {
            info!("크로마키 검출기 준비");
        }
        Ok(())
    }

    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, CoreError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(CoreError::FrameInference("검출기 미초기화".to_string()));
        }

        let mut bounds: Option<BoundingBox> = None;
        let mut count: u64 = 0;
        for (x, y, pixel) in frame.image.enumerate_pixels() {
            if !self.key.is_foreground(pixel) {
                continue;
            }
            count += 1;
            match bounds.as_mut() {
                Some(b) => b.include(x, y),
                None => bounds = Some(BoundingBox::point(x, y)),
            }
        }

        let Some(b) = bounds else {
            return Ok(Vec::new());
        };
        let area = u64::from(b.width()) * u64::from(b.height());
        let score = count as f32 / area as f32;
        Ok(vec![Detection::new(
            "person",
            [
                b.min_x as f32,
                b.min_y as f32,
                b.width() as f32,
                b.height() as f32,
            ],
            score,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    const KEY: Rgba<u8> = Rgba([0, 177, 64, 255]);
    const SKIN: Rgba<u8> = Rgba([205, 140, 110, 255]);

    fn frame_with_block(ts: u64) -> Frame {
        let mut image = RgbaImage::from_pixel(6, 4, KEY);
        for y in 1..3 {
            for x in 2..5 {
                image.put_pixel(x, y, SKIN);
            }
        }
        Frame::new(ts, image)
    }

    #[test]
    fn near_key_is_background() {
        let key = ChromaKey::new([0, 177, 64], 90);
        assert!(!key.is_foreground(&Rgba([10, 170, 70, 255])));
        assert!(key.is_foreground(&SKIN));
        assert!(!key.is_foreground(&Rgba([205, 140, 110, 0])));
    }

    #[tokio::test]
    async fn segment_requires_initialize() {
        let segmenter = ChromaKeySegmenter::new(&SegmentationConfig::default());
        let err = segmenter.segment(&frame_with_block(0), 0).await.unwrap_err();
        assert!(matches!(err, CoreError::FrameInference(_)));
    }

    #[tokio::test]
    async fn segment_marks_person_pixels() {
        let segmenter = ChromaKeySegmenter::new(&SegmentationConfig::default());
        segmenter.initialize().await.unwrap();
        let mask = segmenter.segment(&frame_with_block(10), 10).await.unwrap();
        assert_eq!((mask.width(), mask.height()), (6, 4));
        assert_eq!(mask.label_at(2, 1), Some(15));
        assert_eq!(mask.label_at(0, 0), Some(0));
        assert_eq!(mask.labels().filter(|&l| l == 15).count(), 6);
    }

    #[tokio::test]
    async fn video_mode_rejects_backwards_timestamp() {
        let segmenter = ChromaKeySegmenter::new(&SegmentationConfig::default());
        segmenter.initialize().await.unwrap();
        segmenter.segment(&frame_with_block(100), 100).await.unwrap();
        segmenter.segment(&frame_with_block(100), 100).await.unwrap();
        let err = segmenter.segment(&frame_with_block(50), 50).await.unwrap_err();
        assert!(matches!(err, CoreError::FrameInference(_)));
        segmenter.segment(&frame_with_block(150), 150).await.unwrap();
    }

    #[tokio::test]
    async fn image_mode_accepts_any_timestamp() {
        let mut config = SegmentationConfig::default();
        config.running_mode = RunningMode::Image;
        let segmenter = ChromaKeySegmenter::new(&config);
        segmenter.initialize().await.unwrap();
        segmenter.segment(&frame_with_block(100), 100).await.unwrap();
        assert!(segmenter.segment(&frame_with_block(5), 5).await.is_ok());
    }

    #[tokio::test]
    async fn detector_reports_bounding_box() {
        let detector = ChromaKeyDetector::new(&ChromaKeyConfig::default());
        detector.initialize().await.unwrap();
        let detections = detector.detect(&frame_with_block(0)).await.unwrap();
        assert_eq!(detections.len(), 1);
        assert!(detections[0].is_class("person"));
        assert_eq!(detections[0].bbox, [2.0, 1.0, 3.0, 2.0]);
        assert_eq!(detections[0].score, 1.0);
    }

    #[tokio::test]
    async fn detector_empty_frame() {
        let detector = ChromaKeyDetector::new(&ChromaKeyConfig::default());
        detector.initialize().await.unwrap();
        let frame = Frame::new(0, RgbaImage::from_pixel(4, 4, KEY));
        assert!(detector.detect(&frame).await.unwrap().is_empty());
    }
}
