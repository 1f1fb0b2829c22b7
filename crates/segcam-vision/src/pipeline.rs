//! 프레임 파이프라인 (세그멘테이션 루프의 한 사이클).
//!
//! 사이클 프로토콜:
//! 1. 현재 프레임 타임스탬프가 마지막 처리 타임스탬프와 같으면 스킵
//! 2. 서피스를 프레임 크기로 맞추고 검은색으로 지움
//! 3. 효과 추론을 기다린 뒤 결과를 그림 (실패 시 로그 후 그리기 생략)
//!
//! 재무장(다음 사이클 예약)은 세션 관리자가 담당한다.

use segcam_core::models::frame::Frame;
use segcam_core::models::surface::{DisplaySurface, BLACK};
use tracing::{trace, warn};

use crate::effects::RenderEffect;

/// 한 사이클의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 새 프레임 없음: 추론하지 않음
    Skipped,
    /// 추론 후 그리기 완료
    Rendered,
    /// 추론 실패: 그리기 생략, 루프는 계속
    InferenceFailed,
}

/// 누적 사이클 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub rendered: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl CycleStats {
    /// 추론을 시도한 사이클 수
    pub fn inferred(&self) -> u64 {
        self.rendered + self.failed
    }
}

/// 효과 하나로 매개변수화된 파이프라인: 서피스를 독점 소유
pub struct FramePipeline<E: RenderEffect> {
    effect: E,
    surface: DisplaySurface,
    last_timestamp: Option<u64>,
    stats: CycleStats,
}

impl<E: RenderEffect> FramePipeline<E> {
    pub fn new(effect: E) -> Self {
        Self {
            effect,
            surface: DisplaySurface::new(0, 0),
            last_timestamp: None,
            stats: CycleStats::default(),
        }
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// 현재 서피스 (마지막 사이클 결과)
    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// 마지막 처리 타임스탬프 초기화 (스트림 재획득 시)
    pub fn reset_timestamp(&mut self) {
        self.last_timestamp = None;
    }

    /// 한 사이클 실행
    pub async fn run_cycle(&mut self, frame: &Frame) -> CycleOutcome {
        if self.last_timestamp == Some(frame.timestamp_ms) {
            self.stats.skipped += 1;
            trace!("동일 타임스탬프 {}, 사이클 스킵", frame.timestamp_ms);
            return CycleOutcome::Skipped;
        }
        self.last_timestamp = Some(frame.timestamp_ms);

        self.surface.resize(frame.width(), frame.height(), BLACK);

        match self.effect.infer(frame).await {
            Ok(inference) => {
                self.effect.draw(frame, &inference, &mut self.surface);
                self.stats.rendered += 1;
                CycleOutcome::Rendered
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!(
                    "프레임 처리 중 오류 ({}, ts={}): {e}",
                    self.effect.name(),
                    frame.timestamp_ms
                );
                CycleOutcome::InferenceFailed
            }
        }
    }
}
