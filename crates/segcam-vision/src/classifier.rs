//! 마스크 분류기.
//!
//! 마스크 라벨 값을 사람/배경으로 나누고, ASCII 효과용 글리프를 고른다.
//! 사람 라벨 값은 모델의 라벨 순서에 종속되므로 항상 설정에서 주입받는다.

use segcam_core::config::{EffectConfig, SegmentationConfig};

/// 픽셀 의미 클래스
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskClass {
    Person,
    Background,
}

/// 라벨 → 클래스/글리프 매핑 (순수 함수, 위치/호출 순서 무관)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskClassifier {
    person_value: u8,
    person_glyph: char,
    background_glyph: char,
}

impl MaskClassifier {
    /// 사람 라벨 값으로 분류기 생성 (글리프는 공백 / 불꽃)
    pub fn new(person_value: u8) -> Self {
        Self {
            person_value,
            person_glyph: ' ',
            background_glyph: '🔥',
        }
    }

    /// 글리프 지정
    pub fn with_glyphs(mut self, person: char, background: char) -> Self {
        self.person_glyph = person;
        self.background_glyph = background;
        self
    }

    /// 설정에서 생성
    pub fn from_config(segmentation: &SegmentationConfig, effect: &EffectConfig) -> Self {
        Self::new(segmentation.person_class_value)
            .with_glyphs(effect.person_glyph, effect.background_glyph)
    }

    /// 라벨 분류: 사람 값이 아닌 모든 값은 배경
    #[inline]
    pub fn classify(&self, label: u8) -> MaskClass {
        if label == self.person_value {
            MaskClass::Person
        } else {
            MaskClass::Background
        }
    }

    #[inline]
    pub fn is_person(&self, label: u8) -> bool {
        self.classify(label) == MaskClass::Person
    }

    /// ASCII 글리프 선택
    ///
    /// 정규화 거리는 전달되지만 현재 출력에 반영되지 않는다.
    /// 배경은 거리와 관계없이 모두 같은 글리프로 그려진다.
    pub fn glyph(&self, label: u8, _normalized_distance: f32) -> char {
        match self.classify(label) {
            MaskClass::Person => self.person_glyph,
            MaskClass::Background => self.background_glyph,
        }
    }
}

impl Default for MaskClassifier {
    fn default() -> Self {
        Self::new(15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sentinel_is_person() {
        let classifier = MaskClassifier::new(15);
        assert_eq!(classifier.classify(15), MaskClass::Person);
        for label in (0..=255u8).filter(|&l| l != 15) {
            assert_eq!(classifier.classify(label), MaskClass::Background);
        }
    }

    #[test]
    fn classify_is_pure() {
        let classifier = MaskClassifier::new(15);
        let first: Vec<_> = [3u8, 15, 0, 15, 255].iter().map(|&l| classifier.classify(l)).collect();
        let second: Vec<_> = [3u8, 15, 0, 15, 255].iter().map(|&l| classifier.classify(l)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn sentinel_is_swappable() {
        let classifier = MaskClassifier::new(1);
        assert!(classifier.is_person(1));
        assert!(!classifier.is_person(15));
    }

    #[test]
    fn background_glyph_ignores_distance() {
        let classifier = MaskClassifier::default();
        assert_eq!(classifier.glyph(0, 0.0), '🔥');
        assert_eq!(classifier.glyph(0, 0.5), '🔥');
        assert_eq!(classifier.glyph(7, 1.0), '🔥');
        assert_eq!(classifier.glyph(15, 0.3), ' ');
    }

    #[test]
    fn glyphs_from_config() {
        let mut effect = EffectConfig::default();
        effect.person_glyph = '@';
        effect.background_glyph = '.';
        let classifier = MaskClassifier::from_config(&SegmentationConfig::default(), &effect);
        assert_eq!(classifier.glyph(15, 0.0), '@');
        assert_eq!(classifier.glyph(2, 0.0), '.');
    }
}
