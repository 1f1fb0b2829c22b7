//! 합성 카메라 소스.
//!
//! 크로마키 배경 위에서 좌우로 움직이는 인물 실루엣을 그린다.
//! 장치나 권한 없이 전체 파이프라인을 돌려볼 수 있다.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use segcam_core::error::CoreError;
use segcam_core::ports::camera::{CameraConstraints, CameraSource, CameraStream};
use tracing::info;

use super::{ClockedStream, FrameRenderer};

/// 인물 색상 (키 색상과 충분히 먼 색)
const FIGURE_COLOR: Rgba<u8> = Rgba([205, 140, 110, 255]);

/// 한 번 왕복하는 데 걸리는 프레임 수
const SWEEP_FRAMES: u64 = 120;

/// 합성 카메라 소스
#[derive(Debug, Clone)]
pub struct SyntheticCameraSource {
    backdrop: Rgba<u8>,
}

impl SyntheticCameraSource {
    /// 배경 키 색상으로 생성
    pub fn new(key_color: [u8; 3]) -> Self {
        let [r, g, b] = key_color;
        Self {
            backdrop: Rgba([r, g, b, 255]),
        }
    }
}

#[async_trait]
impl CameraSource for SyntheticCameraSource {
    async fn acquire(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Arc<dyn CameraStream>, CoreError> {
        if constraints.ideal_width == 0 || constraints.ideal_height == 0 {
            return Err(CoreError::CameraAcquisition(format!(
                "지원하지 않는 해상도: {}x{}",
                constraints.ideal_width, constraints.ideal_height
            )));
        }
        info!(
            "합성 카메라 획득: {}x{}, {:?}",
            constraints.ideal_width, constraints.ideal_height, constraints.facing_mode
        );
        let renderer = SyntheticRenderer {
            width: constraints.ideal_width,
            height: constraints.ideal_height,
            backdrop: self.backdrop,
        };
        Ok(Arc::new(ClockedStream::new(
            "합성",
            constraints.frame_interval.max(Duration::from_millis(1)),
            renderer,
        )))
    }
}

struct SyntheticRenderer {
    width: u32,
    height: u32,
    backdrop: Rgba<u8>,
}

impl SyntheticRenderer {
    /// 인물 중심 x (삼각파로 좌우 왕복)
    fn figure_x(&self, index: u64) -> u32 {
        let half = SWEEP_FRAMES / 2;
        let phase = index % SWEEP_FRAMES;
        let t = if phase < half { phase } else { SWEEP_FRAMES - phase };
        let margin = self.width / 4;
        let travel = u64::from(self.width.saturating_sub(margin * 2));
        margin + (travel * t / half) as u32
    }
}

impl FrameRenderer for SyntheticRenderer {
    fn render(&self, index: u64) -> Option<RgbaImage> {
        let mut image = RgbaImage::from_pixel(self.width, self.height, self.backdrop);

        let cx = i64::from(self.figure_x(index));
        let h = i64::from(self.height);
        let head_r = (h / 10).max(1);
        let head_cy = h / 4;
        let body_half_w = (h / 8).max(1);
        let body_top = head_cy + head_r;
        let body_bottom = h - h / 12;

        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let (x, y) = (i64::from(x), i64::from(y));
            let in_head = (x - cx).pow(2) + (y - head_cy).pow(2) <= head_r.pow(2);
            let in_body = (x - cx).abs() <= body_half_w && y >= body_top && y <= body_bottom;
            if in_head || in_body {
                *pixel = FIGURE_COLOR;
            }
        }
        Some(image)
    }
}
