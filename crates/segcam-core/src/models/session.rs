//! 세션 상태 모델.
//!
//! 라이프사이클 관리자가 소유하고, 프레임 파이프라인은 읽기만 한다.

use serde::{Deserialize, Serialize};

/// 카메라/모델 세션 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// 아무것도 시작되지 않음
    #[default]
    Idle,
    /// 모델 초기화 중
    Initializing,
    /// 모델 준비 완료, 카메라 비활성
    Ready,
    /// 카메라 획득 대기 중
    AwaitingCamera,
    /// 프레임 사이클 실행 중
    Running,
    /// 사용자가 비활성화함 (모델은 유지)
    Stopped,
    /// 초기화/카메라 실패 (재시도 없음)
    Error,
}

impl SessionState {
    /// 종료 상태인지
    pub fn is_terminal(self) -> bool {
        self == SessionState::Error
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Initializing => "initializing",
            SessionState::Ready => "ready",
            SessionState::AwaitingCamera => "awaiting-camera",
            SessionState::Running => "running",
            SessionState::Stopped => "stopped",
            SessionState::Error => "error",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_terminal() {
        assert!(SessionState::Error.is_terminal());
        assert!(!SessionState::Stopped.is_terminal());
        assert_eq!(SessionState::default(), SessionState::Idle);
    }
}
