//! # segcam-vision
//!
//! 세그멘테이션 → 픽셀 파이프라인 크레이트.
//! 카테고리 마스크에서 중심점/거리 필드를 계산하고, 선택된 렌더 효과로
//! 디스플레이 서피스를 다시 그리며, 카메라 스트림과 사이클 핸들의
//! 라이프사이클을 관리한다. 프레임 소스, 크로마키 모델, 출력 어댑터도 포함한다.

pub mod chroma_key;
pub mod classifier;
pub mod effects;
pub mod encoder;
pub mod geometry;
pub mod pipeline;
pub mod presenter;
pub mod resize;
pub mod session;
pub mod sources;
