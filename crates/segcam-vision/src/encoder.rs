//! WebP 인코더.
//!
//! 프레임 덤프용 서피스 인코딩. 누적 압축률을 기록한다.

use image::RgbaImage;
use segcam_core::error::CoreError;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// 압축률 통계
#[derive(Debug, Default)]
pub struct CompressionStats {
    /// 누적 압축률 (encoded_size / raw_size * 1000)
    cumulative_ratio_x1000: AtomicU64,
    /// 샘플 수
    sample_count: AtomicU64,
}

impl CompressionStats {
    pub const fn new() -> Self {
        Self {
            cumulative_ratio_x1000: AtomicU64::new(0),
            sample_count: AtomicU64::new(0),
        }
    }

    /// 압축률 기록
    pub fn record(&self, raw_size: usize, encoded_size: usize) {
        if raw_size == 0 {
            return;
        }
        let ratio_x1000 = (encoded_size * 1000 / raw_size) as u64;
        self.cumulative_ratio_x1000
            .fetch_add(ratio_x1000, Ordering::Relaxed);
        self.sample_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 평균 압축률 (0.0 ~ 1.0, 샘플이 없으면 None)
    pub fn average_ratio(&self) -> Option<f32> {
        let count = self.sample_count.load(Ordering::Relaxed);
        if count == 0 {
            return None;
        }
        let cumulative = self.cumulative_ratio_x1000.load(Ordering::Relaxed);
        Some((cumulative as f32 / count as f32) / 1000.0)
    }
}

/// WebP 인코딩 (quality 0-100)
pub fn encode_webp(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, CoreError> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(CoreError::Internal("빈 이미지는 인코딩할 수 없음".to_string()));
    }
    let raw_size = w as usize * h as usize * 4;

    let encoder = webp::Encoder::from_rgba(image.as_raw(), w, h);
    let encoded = encoder.encode(f32::from(quality.min(100))).to_vec();

    debug!(
        "WebP 인코딩: {}x{} → {} bytes (품질 {}, 압축률 {:.1}%)",
        w,
        h,
        encoded.len(),
        quality,
        (encoded.len() as f32 / raw_size as f32) * 100.0
    );

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn encode_webp_basic() {
        let img = RgbaImage::from_pixel(100, 100, Rgba([128, 64, 200, 255]));
        let bytes = encode_webp(&img, 75).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn empty_image_rejected() {
        assert!(encode_webp(&RgbaImage::new(0, 0), 75).is_err());
    }

    #[test]
    fn compression_stats_tracking() {
        let stats = CompressionStats::new();
        assert_eq!(stats.average_ratio(), None);
        stats.record(1000, 250);
        stats.record(1000, 150);
        stats.record(0, 10);
        assert_eq!(stats.average_ratio(), Some(0.2));
    }
}
