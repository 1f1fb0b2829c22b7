//! 출력 어댑터 (`SurfacePresenter` 구현).
//!
//! - `TerminalPresenter`: 서피스를 텍스트로 바꿔 터미널에 다시 그림
//! - `FrameDumpPresenter`: N 프레임마다 WebP 파일로 저장

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use segcam_core::error::CoreError;
use segcam_core::models::surface::DisplaySurface;
use segcam_core::ports::presenter::SurfacePresenter;
use tracing::{debug, info};

use crate::encoder::{self, CompressionStats};

/// 커서를 맨 위로 옮기고 화면 지우기
const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// 터미널 출력기
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    cell_size: u32,
}

impl TerminalPresenter {
    /// `cell_size` 픽셀당 한 글자 (글리프가 없을 때의 밝기 샘플 간격)
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(1),
        }
    }

    /// 한 화면 분량의 텍스트
    pub fn render_text(&self, surface: &DisplaySurface) -> String {
        surface.to_text_lines(self.cell_size).join("\n")
    }
}

impl SurfacePresenter for TerminalPresenter {
    fn present(&self, surface: &DisplaySurface) -> Result<(), CoreError> {
        let text = self.render_text(surface);
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{CLEAR_SCREEN}{text}")?;
        stdout.flush()?;
        Ok(())
    }
}

/// WebP 프레임 덤프 출력기
#[derive(Debug)]
pub struct FrameDumpPresenter {
    run_dir: PathBuf,
    every_n: u64,
    quality: u8,
    presented: AtomicU64,
    written: AtomicU64,
    stats: CompressionStats,
}

impl FrameDumpPresenter {
    /// `base_dir/<실행 시각>/` 디렉토리를 만들고 출력기 생성
    pub fn new(base_dir: &Path, every_n: u64, quality: u8) -> Result<Self, CoreError> {
        let run_dir = base_dir.join(Local::now().format("%Y%m%d-%H%M%S").to_string());
        std::fs::create_dir_all(&run_dir)?;
        info!("프레임 덤프 디렉토리: {}", run_dir.display());
        Ok(Self {
            run_dir,
            every_n: every_n.max(1),
            quality,
            presented: AtomicU64::new(0),
            written: AtomicU64::new(0),
            stats: CompressionStats::new(),
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// 저장한 파일 수
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// 평균 압축률
    pub fn average_ratio(&self) -> Option<f32> {
        self.stats.average_ratio()
    }
}

impl Drop for FrameDumpPresenter {
    fn drop(&mut self) {
        match self.average_ratio() {
            Some(ratio) => info!(
                "프레임 덤프 종료: {}장 저장 ({}), 평균 압축률 {:.1}%",
                self.written(),
                self.run_dir().display(),
                ratio * 100.0
            ),
            None => info!("프레임 덤프 종료: 저장한 프레임 없음"),
        }
    }
}

impl SurfacePresenter for FrameDumpPresenter {
    fn present(&self, surface: &DisplaySurface) -> Result<(), CoreError> {
        let index = self.presented.fetch_add(1, Ordering::Relaxed);
        if index % self.every_n != 0 {
            return Ok(());
        }

        let image = surface.image();
        let bytes = encoder::encode_webp(image, self.quality)?;
        self.stats
            .record(image.as_raw().len(), bytes.len());

        let path = self.run_dir.join(format!("frame_{index:06}.webp"));
        std::fs::write(&path, &bytes)?;
        self.written.fetch_add(1, Ordering::Relaxed);
        debug!("프레임 저장: {}", path.display());
        Ok(())
    }
}
