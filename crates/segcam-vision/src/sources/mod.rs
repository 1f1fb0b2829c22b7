//! 프레임 소스 어댑터 (`CameraSource` 구현).
//!
//! - [`synthetic`]: 크로마키 배경 위를 움직이는 합성 인물
//! - [`image_dir`]: 디렉토리의 이미지 시퀀스 반복 재생
//! - [`screen`]: xcap 주 모니터 캡처
//!
//! 모든 스트림은 프레임 간격으로 양자화된 타임스탬프를 사용하므로,
//! 프레임 레이트보다 빠르게 폴링하면 같은 타임스탬프가 반복된다.

pub mod image_dir;
pub mod screen;
pub mod synthetic;

pub use image_dir::ImageDirCameraSource;
pub use screen::ScreenCameraSource;
pub use synthetic::SyntheticCameraSource;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use image::RgbaImage;
use parking_lot::Mutex;
use segcam_core::models::frame::Frame;
use segcam_core::ports::camera::CameraStream;
use tracing::debug;

/// 프로세스 공통 기준 시각 (스트림을 다시 획득해도 타임스탬프가 줄지 않음)
fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// 양자화된 스트림 시계
#[derive(Debug)]
pub struct StreamClock {
    interval_ms: u64,
    started_at: Instant,
    stopped: AtomicBool,
}

impl StreamClock {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            interval_ms: (frame_interval.as_millis() as u64).max(1),
            started_at: Instant::now(),
            stopped: AtomicBool::new(false),
        }
    }

    /// 현재 프레임 타임스탬프 (밀리초, 프레임 간격의 배수)
    pub fn timestamp_ms(&self) -> u64 {
        let elapsed = epoch().elapsed().as_millis() as u64;
        elapsed / self.interval_ms * self.interval_ms
    }

    /// 스트림 시작 후 몇 번째 프레임인지
    pub fn frame_index(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64 / self.interval_ms
    }

    /// 정지: 실제로 정지시킨 호출에서만 true
    pub fn stop(&self) -> bool {
        !self.stopped.swap(true, Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// 프레임 번호 → 이미지
pub trait FrameRenderer: Send + Sync + 'static {
    fn render(&self, index: u64) -> Option<RgbaImage>;
}

/// 연속 실패 구간 추적 (구간당 경고 한 번)
#[derive(Debug, Default)]
pub struct FailureStreak {
    count: AtomicU64,
}

impl FailureStreak {
    /// 실패 기록. 새 실패 구간의 첫 실패이면 true
    pub fn record_failure(&self) -> bool {
        self.count.fetch_add(1, Ordering::Relaxed) == 0
    }

    /// 성공 기록. 실패 구간이 끝났으면 그 길이
    pub fn record_success(&self) -> Option<u64> {
        match self.count.swap(0, Ordering::Relaxed) {
            0 => None,
            n => Some(n),
        }
    }
}

/// 한 타임스탬프의 렌더 결과 (실패도 캐시)
struct CachedFrame {
    timestamp_ms: u64,
    frame: Option<Frame>,
}

/// 시계 기반 스트림: 같은 타임스탬프 동안은 같은 결과를 돌려준다
pub struct ClockedStream<R: FrameRenderer> {
    label: &'static str,
    clock: StreamClock,
    renderer: R,
    current: Mutex<Option<CachedFrame>>,
}

impl<R: FrameRenderer> ClockedStream<R> {
    pub fn new(label: &'static str, frame_interval: Duration, renderer: R) -> Self {
        Self {
            label,
            clock: StreamClock::new(frame_interval),
            renderer,
            current: Mutex::new(None),
        }
    }
}

impl<R: FrameRenderer> CameraStream for ClockedStream<R> {
    fn current_frame(&self) -> Option<Frame> {
        if self.clock.is_stopped() {
            return None;
        }
        let timestamp_ms = self.clock.timestamp_ms();

        let mut current = self.current.lock();
        if let Some(cached) = current.as_ref() {
            if cached.timestamp_ms == timestamp_ms {
                return cached.frame.clone();
            }
        }

        let frame = self
            .renderer
            .render(self.clock.frame_index())
            .map(|image| Frame::new(timestamp_ms, image));
        *current = Some(CachedFrame {
            timestamp_ms,
            frame: frame.clone(),
        });
        frame
    }

    fn stop(&self) {
        if self.clock.stop() {
            self.current.lock().take();
            debug!("{} 스트림 정지", self.label);
        }
    }

    fn is_stopped(&self) -> bool {
        self.clock.is_stopped()
    }
}
