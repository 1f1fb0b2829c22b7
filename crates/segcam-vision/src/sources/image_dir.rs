//! 이미지 디렉토리 소스.
//!
//! 디렉토리의 PNG/JPEG 파일을 이름순으로 읽어 ideal 해상도에 맞추고
//! 프레임 간격마다 한 장씩 반복 재생한다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use segcam_core::error::CoreError;
use segcam_core::ports::camera::{CameraConstraints, CameraSource, CameraStream};
use tracing::{debug, info};

use super::{ClockedStream, FrameRenderer};
use crate::resize;

/// 읽을 확장자
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// 이미지 시퀀스 카메라 소스
#[derive(Debug, Clone)]
pub struct ImageDirCameraSource {
    dir: PathBuf,
}

impl ImageDirCameraSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 이름순 이미지 경로
    fn list_images(&self) -> Result<Vec<PathBuf>, CoreError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            CoreError::CameraAcquisition(format!("디렉토리 읽기 실패: {}: {e}", self.dir.display()))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image(path))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl CameraSource for ImageDirCameraSource {
    async fn acquire(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Arc<dyn CameraStream>, CoreError> {
        let paths = self.list_images()?;
        if paths.is_empty() {
            return Err(CoreError::CameraAcquisition(format!(
                "이미지 없음: {}",
                self.dir.display()
            )));
        }

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            let decoded = image::open(path).map_err(|e| {
                CoreError::CameraAcquisition(format!("이미지 디코딩 실패: {}: {e}", path.display()))
            })?;
            let fitted = resize::fit_to_ideal(
                &decoded.to_rgba8(),
                constraints.ideal_width,
                constraints.ideal_height,
            )
            .map_err(|e| CoreError::CameraAcquisition(e.to_string()))?;
            debug!("프레임 로드: {} ({}x{})", path.display(), fitted.width(), fitted.height());
            frames.push(fitted);
        }

        info!("이미지 시퀀스 획득: {} ({}장)", self.dir.display(), frames.len());
        Ok(Arc::new(ClockedStream::new(
            "이미지 시퀀스",
            constraints.frame_interval,
            SequenceRenderer { frames },
        )))
    }
}

struct SequenceRenderer {
    frames: Vec<RgbaImage>,
}

impl FrameRenderer for SequenceRenderer {
    fn render(&self, index: u64) -> Option<RgbaImage> {
        if self.frames.is_empty() {
            return None;
        }
        let slot = (index % self.frames.len() as u64) as usize;
        self.frames.get(slot).cloned()
    }
}
