//! 출력 포트: 렌더링된 서피스를 화면/파일로 내보낸다.
//!
//! 구현: `segcam-vision::presenter`

use crate::error::CoreError;
use crate::models::surface::DisplaySurface;

/// 서피스 표시기
pub trait SurfacePresenter: Send + Sync {
    /// 한 사이클의 결과 표시
    fn present(&self, surface: &DisplaySurface) -> Result<(), CoreError>;
}
