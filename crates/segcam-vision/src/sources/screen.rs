//! 화면 캡처 소스.
//!
//! xcap으로 모니터를 캡처해 카메라 프레임처럼 흘려보낸다.
//! 프레임 간격마다 최대 한 번 캡처한다.

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use segcam_core::error::CoreError;
use segcam_core::ports::camera::{CameraConstraints, CameraSource, CameraStream};
use tracing::{debug, info, warn};
use xcap::Monitor;

use super::{ClockedStream, FailureStreak, FrameRenderer};
use crate::resize;

/// 모니터 캡처 카메라 소스
#[derive(Debug, Clone, Default)]
pub struct ScreenCameraSource {
    /// 캡처할 모니터 (None이면 주 모니터)
    monitor_index: Option<usize>,
}

impl ScreenCameraSource {
    /// 주 모니터 캡처
    pub fn new() -> Self {
        Self::default()
    }

    /// 특정 모니터 캡처
    pub fn with_monitor(index: usize) -> Self {
        Self {
            monitor_index: Some(index),
        }
    }
}

/// 모니터 한 장 캡처
fn capture(monitor_index: Option<usize>) -> Result<RgbaImage, CoreError> {
    let monitors = Monitor::all()
        .map_err(|e| CoreError::CameraAcquisition(format!("모니터 목록 조회 실패: {e}")))?;

    let monitor = match monitor_index {
        Some(index) => monitors.into_iter().nth(index),
        None => monitors
            .into_iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| Monitor::all().ok()?.into_iter().next()),
    }
    .ok_or_else(|| CoreError::CameraAcquisition("모니터를 찾을 수 없음".to_string()))?;

    let image = monitor
        .capture_image()
        .map_err(|e| CoreError::CameraAcquisition(format!("스크린 캡처 실패: {e}")))?;

    debug!("스크린 캡처 완료: {}x{}", image.width(), image.height());
    Ok(image)
}

#[async_trait]
impl CameraSource for ScreenCameraSource {
    async fn acquire(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Arc<dyn CameraStream>, CoreError> {
        // 첫 캡처로 권한과 장치를 확인
        let first = capture(self.monitor_index)?;
        info!("화면 캡처 획득: {}x{}", first.width(), first.height());

        Ok(Arc::new(ClockedStream::new(
            "화면",
            constraints.frame_interval,
            ScreenRenderer {
                monitor_index: self.monitor_index,
                ideal_width: constraints.ideal_width,
                ideal_height: constraints.ideal_height,
                failures: FailureStreak::default(),
            },
        )))
    }
}

struct ScreenRenderer {
    monitor_index: Option<usize>,
    ideal_width: u32,
    ideal_height: u32,
    failures: FailureStreak,
}

impl FrameRenderer for ScreenRenderer {
    fn render(&self, _index: u64) -> Option<RgbaImage> {
        let captured = capture(self.monitor_index)
            .and_then(|image| resize::fit_to_ideal(&image, self.ideal_width, self.ideal_height));
        match captured {
            Ok(image) => {
                if let Some(missed) = self.failures.record_success() {
                    info!("화면 캡처 복구 ({missed}프레임 실패 후)");
                }
                Some(image)
            }
            Err(e) => {
                if self.failures.record_failure() {
                    warn!("화면 프레임 캡처 실패: {e}");
                } else {
                    debug!("화면 프레임 캡처 실패 (계속): {e}");
                }
                None
            }
        }
    }
}
