//! 거리/기하 유틸리티.
//!
//! 카테고리 마스크 전체를 한 번 스캔해 사람 픽셀의 바운딩 박스와
//! 중심점을 구하고, ASCII 효과에서 쓰는 정규화 거리를 계산한다.

use segcam_core::models::frame::{encode_label, BoundingBox, CategoryMask, PersonCenter};

use crate::classifier::MaskClassifier;

/// 두 점 사이 유클리드 거리
#[inline]
pub fn euclidean_distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}

/// 사람 픽셀을 모두 포함하는 가장 작은 박스 (사람 픽셀이 없으면 `None`)
pub fn person_bounds(mask: &CategoryMask, classifier: &MaskClassifier) -> Option<BoundingBox> {
    let width = mask.width() as usize;
    if width == 0 {
        return None;
    }

    let mut bounds: Option<BoundingBox> = None;
    for (index, &raw) in mask.values().iter().enumerate() {
        if !classifier.is_person(encode_label(raw)) {
            continue;
        }
        let x = (index % width) as u32;
        let y = (index / width) as u32;
        match bounds.as_mut() {
            Some(b) => b.include(x, y),
            None => bounds = Some(BoundingBox::point(x, y)),
        }
    }
    bounds
}

/// 사람 중심점: 바운딩 박스 중점 (평균의 floor)
pub fn find_person_center(mask: &CategoryMask, classifier: &MaskClassifier) -> Option<PersonCenter> {
    person_bounds(mask, classifier).map(|b| b.center())
}

/// 중심점에서 프레임 가장자리까지의 최대 거리
///
/// `max(max(cx, W - cx), max(cy, H - cy))`
pub fn max_edge_distance(center: PersonCenter, width: u32, height: u32) -> f32 {
    let dx = center.x.max(width.saturating_sub(center.x));
    let dy = center.y.max(height.saturating_sub(center.y));
    dx.max(dy) as f32
}

/// 중심점 기준 정규화 거리 (`[0, 1]`로 제한, 최대 거리가 0이면 0)
pub fn normalized_distance(x: u32, y: u32, center: PersonCenter, max_distance: f32) -> f32 {
    if max_distance <= 0.0 {
        return 0.0;
    }
    let distance = euclidean_distance(x as f32, y as f32, center.x as f32, center.y as f32);
    (distance / max_distance).clamp(0.0, 1.0)
}
