//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! `segcam-vision`의 어댑터와 테스트 목(mock)이 이 trait들을 구현하며,
//! `segcam-app`에서 `Arc<dyn T>`로 와이어링한다.
//!
//! async trait은 `async_trait` 매크로로 object safety를 유지한다.

pub mod camera;
pub mod detector;
pub mod presenter;
pub mod segmenter;
