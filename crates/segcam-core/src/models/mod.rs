//! SEGCAM 도메인 모델.
//!
//! 프레임 파이프라인이 사이클마다 생성/폐기하는 데이터(프레임, 마스크, 중심점)와
//! 사이클을 넘어 유지되는 데이터(디스플레이 서피스, 세션 상태)를 정의한다.

pub mod detection;
pub mod frame;
pub mod session;
pub mod surface;
