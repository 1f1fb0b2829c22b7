//! SEGCAM 핵심 에러 타입.
//!
//! 터미널 에러(모델 로드, 카메라 획득)와 프레임 단위 복구 가능 에러를 구분한다.

use thiserror::Error;

/// 모델 초기화 실패 시 사용자에게 보여줄 메시지
pub const MODEL_LOAD_FAILED_MESSAGE: &str = "인식 모델을 불러오는데 실패했습니다.";

/// 카메라 획득 실패 시 사용자에게 보여줄 메시지
pub const CAMERA_ACCESS_FAILED_MESSAGE: &str =
    "카메라 접근에 실패했습니다. 카메라 권한을 확인해주세요.";

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 세그멘테이션/검출 모델 초기화 실패 (세션 종료)
    #[error("모델 초기화 실패: {0}")]
    Initialization(String),

    /// 카메라 권한 거부 또는 장치 없음 (세션 종료)
    #[error("카메라 획득 실패: {0}")]
    CameraAcquisition(String),

    /// 프레임 단위 추론 실패 (해당 사이클만 스킵)
    #[error("프레임 추론 실패: {0}")]
    FrameInference(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 ({field}): {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 현재 세션 상태에서 허용되지 않는 요청
    #[error("잘못된 세션 상태: {0}")]
    InvalidState(String),

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 세션을 종료시키는 에러인지 (재시도 없음)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CoreError::Initialization(_) | CoreError::CameraAcquisition(_)
        )
    }

    /// 사용자 에러 슬롯에 표시할 메시지
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Initialization(_) => MODEL_LOAD_FAILED_MESSAGE.to_string(),
            CoreError::CameraAcquisition(_) => CAMERA_ACCESS_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_startup_failures_are_terminal() {
        assert!(CoreError::Initialization("x".into()).is_terminal());
        assert!(CoreError::CameraAcquisition("x".into()).is_terminal());
        assert!(!CoreError::FrameInference("x".into()).is_terminal());
        assert!(!CoreError::Internal("x".into()).is_terminal());
    }

    #[test]
    fn terminal_errors_have_distinct_user_messages() {
        let model = CoreError::Initialization("tflite 404".into()).user_message();
        let camera = CoreError::CameraAcquisition("NotAllowedError".into()).user_message();
        assert_eq!(model, MODEL_LOAD_FAILED_MESSAGE);
        assert_eq!(camera, CAMERA_ACCESS_FAILED_MESSAGE);
        assert_ne!(model, camera);
    }

    #[test]
    fn validation_display() {
        let err = CoreError::Validation {
            field: "mask".into(),
            message: "길이 불일치".into(),
        };
        assert!(err.to_string().contains("mask"));
    }
}
