//! 객체 검출 결과 모델.

use serde::{Deserialize, Serialize};

/// 범용 객체 검출기 결과 한 건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// 클래스 이름 (예: "person")
    pub class: String,
    /// `[x, y, w, h]` 픽셀 좌표
    pub bbox: [f32; 4],
    /// 신뢰도 (0.0 ~ 1.0)
    pub score: f32,
}

impl Detection {
    /// 새 검출 결과
    pub fn new(class: impl Into<String>, bbox: [f32; 4], score: f32) -> Self {
        Self {
            class: class.into(),
            bbox,
            score,
        }
    }

    /// 클래스 일치 여부
    pub fn is_class(&self, class: &str) -> bool {
        self.class == class
    }
}
