//! 프레임 및 세그멘테이션 결과 모델.
//!
//! `Frame`과 `CategoryMask`는 사이클마다 새로 만들어지고 다음 사이클에 대체된다.
//! `PersonCenter`는 해당 프레임의 마스크에서만 의미가 있다.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::CoreError;

/// 카메라 프레임: 캡처 타임스탬프로 식별되는 불변 스냅샷
#[derive(Debug, Clone)]
pub struct Frame {
    /// 캡처 타임스탬프 (밀리초, 단조 증가)
    pub timestamp_ms: u64,
    /// RGBA 픽셀 데이터
    pub image: Arc<RgbaImage>,
}

impl Frame {
    /// 새 프레임 생성
    pub fn new(timestamp_ms: u64, image: RgbaImage) -> Self {
        Self {
            timestamp_ms,
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// 세그멘테이션 서비스의 픽셀별 분류 점수 (row-major, `width * height`)
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMask {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl CategoryMask {
    /// 새 마스크 생성: `values.len() == width * height` 검증
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(CoreError::Validation {
                field: "category_mask".to_string(),
                message: format!(
                    "길이 불일치: {}x{} 마스크에 {}개 값 (기대 {expected})",
                    width,
                    height,
                    values.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// 정수 라벨로 채운 마스크 생성 (라벨 / 255 로 인코딩)
    pub fn from_labels(width: u32, height: u32, labels: &[u8]) -> Result<Self, CoreError> {
        let values = labels.iter().map(|&l| f32::from(l) / 255.0).collect();
        Self::new(width, height, values)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 원시 점수 슬라이스
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// (x, y) 위치의 정수 라벨: `round(raw * 255)`
    ///
    /// 범위를 벗어난 좌표는 `None`.
    pub fn label_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        Some(encode_label(self.values[index]))
    }

    /// row-major 순서의 정수 라벨 반복자
    pub fn labels(&self) -> impl Iterator<Item = u8> + '_ {
        self.values.iter().map(|&v| encode_label(v))
    }
}

/// 원시 점수 → 정수 라벨 (NaN은 0)
#[inline]
pub fn encode_label(raw: f32) -> u8 {
    (raw * 255.0).round().clamp(0.0, 255.0) as u8
}

/// 사람 픽셀 바운딩 박스의 중심점 (픽셀 좌표)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonCenter {
    pub x: u32,
    pub y: u32,
}

/// 포함(inclusive) 좌표 바운딩 박스
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    /// 한 점으로 이루어진 박스
    pub fn point(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// 점을 포함하도록 확장
    pub fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// 박스 중점: 평균의 floor
    pub fn center(&self) -> PersonCenter {
        PersonCenter {
            x: (self.min_x + self.max_x) / 2,
            y: (self.min_y + self.max_y) / 2,
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}
