//! 카메라 포트.
//!
//! 구현: `segcam-vision::sources` (합성 패턴, 이미지 디렉토리, xcap 화면 캡처)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{AppConfig, FacingMode};
use crate::error::CoreError;
use crate::models::frame::Frame;

/// 스트림 요청 조건 (ideal 값, 장치가 가까운 값으로 맞춤)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: FacingMode,
    /// 새 프레임이 나오는 간격
    pub frame_interval: Duration,
}

impl CameraConstraints {
    /// 앱 설정에서 조건 생성
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ideal_width: config.camera.ideal_width,
            ideal_height: config.camera.ideal_height,
            facing_mode: config.camera.facing_mode,
            frame_interval: config.frame_interval(),
        }
    }
}

/// 카메라 소스: 권한 요청 후 라이브 스트림 획득
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// 스트림 획득.
    ///
    /// 권한 거부나 장치 부재 시 `CoreError::CameraAcquisition`.
    async fn acquire(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Arc<dyn CameraStream>, CoreError>;
}

/// 획득된 라이브 스트림
pub trait CameraStream: Send + Sync {
    /// 현재 표시 중인 프레임 (아직 준비 안 됐거나 정지 후에는 `None`)
    fn current_frame(&self) -> Option<Frame>;

    /// 모든 트랙 정지 (여러 번 호출해도 한 번만 정지)
    fn stop(&self);

    /// 정지 여부
    fn is_stopped(&self) -> bool;
}
