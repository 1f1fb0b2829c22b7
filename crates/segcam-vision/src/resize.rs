//! 프레임 리사이즈.
//!
//! fast_image_resize 기반. 소스 프레임을 카메라 ideal 해상도에 맞춘다.

use fast_image_resize::{images::Image as FirImage, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::RgbaImage;
use segcam_core::error::CoreError;
use tracing::trace;

/// 종횡비를 유지하며 `max_w x max_h` 안에 들어가는 크기
///
/// 장치가 ideal 해상도에 가장 가까운 크기를 고르는 것과 같은 역할.
pub fn fit_within(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }
    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// 정확한 크기로 리사이즈 (같은 크기면 복제)
pub fn resize_exact(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, CoreError> {
    let (src_w, src_h) = image.dimensions();

    if src_w == width && src_h == height {
        return Ok(image.clone());
    }
    if src_w == 0 || src_h == 0 {
        return Err(CoreError::Internal("소스 이미지 크기 0".to_string()));
    }
    if width == 0 || height == 0 {
        return Err(CoreError::Internal("목표 이미지 크기 0".to_string()));
    }

    let src_image = FirImage::from_vec_u8(src_w, src_h, image.as_raw().clone(), PixelType::U8x4)
        .map_err(|e| CoreError::Internal(format!("소스 이미지 생성 실패: {e}")))?;
    let mut dst_image = FirImage::new(width, height, PixelType::U8x4);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CoreError::Internal(format!("리사이즈 실패: {e}")))?;

    trace!("리사이즈: {}x{} → {}x{}", src_w, src_h, width, height);

    RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| CoreError::Internal("결과 이미지 생성 실패".to_string()))
}

/// ideal 해상도 안에 맞게 리사이즈
pub fn fit_to_ideal(image: &RgbaImage, ideal_w: u32, ideal_h: u32) -> Result<RgbaImage, CoreError> {
    let (w, h) = fit_within(image.width(), image.height(), ideal_w, ideal_h);
    resize_exact(image, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn make_test_image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([100, 100, 100, 255]))
    }

    #[test]
    fn resize_basic() {
        let resized = resize_exact(&make_test_image(1920, 1080), 480, 270).unwrap();
        assert_eq!(resized.dimensions(), (480, 270));
    }

    #[test]
    fn same_size_noop() {
        let resized = resize_exact(&make_test_image(64, 48), 64, 48).unwrap();
        assert_eq!(resized.dimensions(), (64, 48));
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        assert_eq!(fit_within(1920, 1080, 1280, 720), (1280, 720));
        assert_eq!(fit_within(640, 640, 1280, 720), (720, 720));
        assert_eq!(fit_within(4000, 1000, 1280, 720), (1280, 320));
        assert_eq!(fit_within(0, 10, 1280, 720), (0, 0));
    }

    #[test]
    fn fit_to_ideal_downscales() {
        let fitted = fit_to_ideal(&make_test_image(2560, 1440), 1280, 720).unwrap();
        assert_eq!(fitted.dimensions(), (1280, 720));
    }

    #[test]
    fn zero_size_errors() {
        assert!(resize_exact(&RgbaImage::new(0, 0), 10, 10).is_err());
        assert!(resize_exact(&make_test_image(10, 10), 0, 10).is_err());
    }
}
