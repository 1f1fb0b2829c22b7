//! 애플리케이션 설정 구조체.
//!
//! 카메라 제약, 세그멘테이션 모델, 렌더 효과, 파이프라인 주기, 출력 설정을 정의한다.
//! `ConfigManager`를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 카메라 획득 설정
    #[serde(default)]
    pub camera: CameraConfig,
    /// 세그멘테이션 모델 설정
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    /// 렌더 효과 설정
    #[serde(default)]
    pub effect: EffectConfig,
    /// 프레임 파이프라인 설정
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// 출력(프레젠터) 설정
    #[serde(default)]
    pub output: OutputConfig,
}

// ============================================================
// 카메라 설정
// ============================================================

/// 카메라 방향 선호
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// 전면(사용자 방향) 카메라
    #[default]
    User,
    /// 후면 카메라
    Environment,
}

/// 카메라 설정: 획득 시 제약 조건
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 선호 너비 (픽셀)
    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,
    /// 선호 높이 (픽셀)
    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,
    /// 카메라 방향
    #[serde(default)]
    pub facing_mode: FacingMode,
    /// 소스 프레임 레이트 (fps)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            ideal_width: default_ideal_width(),
            ideal_height: default_ideal_height(),
            facing_mode: FacingMode::User,
            frame_rate: default_frame_rate(),
        }
    }
}

fn default_ideal_width() -> u32 {
    1280
}

fn default_ideal_height() -> u32 {
    720
}

fn default_frame_rate() -> u32 {
    30
}

// ============================================================
// 세그멘테이션 설정
// ============================================================

/// 추론 가속 백엔드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delegate {
    #[default]
    Gpu,
    Cpu,
}

/// 모델 실행 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunningMode {
    /// 단일 이미지
    Image,
    /// 타임스탬프가 단조 증가하는 비디오 스트림
    #[default]
    Video,
}

/// 크로마키 대체 세그멘터/검출기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromaKeyConfig {
    /// 배경 키 색상 (RGB)
    #[serde(default = "default_key_color")]
    pub key_color: [u8; 3],
    /// 키 색상과의 최대 거리 (이 이하이면 배경)
    #[serde(default = "default_key_tolerance")]
    pub tolerance: u32,
}

impl Default for ChromaKeyConfig {
    fn default() -> Self {
        Self {
            key_color: default_key_color(),
            tolerance: default_key_tolerance(),
        }
    }
}

fn default_key_color() -> [u8; 3] {
    [0, 177, 64]
}

fn default_key_tolerance() -> u32 {
    90
}

/// 세그멘테이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// "사람" 클래스를 나타내는 마스크 값 (모델 라벨 순서에 종속)
    ///
    /// deeplab_v3 (PASCAL VOC) 기준 15. 백엔드 교체 시 반드시 함께 변경.
    #[serde(default = "default_person_class_value")]
    pub person_class_value: u8,
    /// 모델 에셋 경로
    #[serde(default = "default_model_asset_path")]
    pub model_asset_path: String,
    /// 추론 가속 백엔드
    #[serde(default)]
    pub delegate: Delegate,
    /// 실행 모드
    #[serde(default)]
    pub running_mode: RunningMode,
    /// 크로마키 대체 모델 설정
    #[serde(default)]
    pub chroma_key: ChromaKeyConfig,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            person_class_value: default_person_class_value(),
            model_asset_path: default_model_asset_path(),
            delegate: Delegate::Gpu,
            running_mode: RunningMode::Video,
            chroma_key: ChromaKeyConfig::default(),
        }
    }
}

fn default_person_class_value() -> u8 {
    15
}

fn default_model_asset_path() -> String {
    "https://storage.googleapis.com/mediapipe-models/image_segmenter/deeplab_v3/float32/1/deeplab_v3.tflite".to_string()
}

// ============================================================
// 렌더 효과 설정
// ============================================================

/// 렌더 효과 종류 (배포 시 정적으로 선택)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// 사람 흰색 / 배경 검은색 실루엣
    MaskFill,
    /// 카메라 영상 + 검출 바운딩 박스
    BoundingBox,
    /// 중심점 거리 기반 ASCII 그리드
    #[default]
    Ascii,
}

/// 렌더 효과 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectConfig {
    /// 효과 종류
    #[serde(default)]
    pub kind: EffectKind,
    /// ASCII 그리드 간격 (픽셀)
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    /// 사람 영역 글리프
    #[serde(default = "default_person_glyph")]
    pub person_glyph: char,
    /// 배경 영역 글리프
    #[serde(default = "default_background_glyph")]
    pub background_glyph: char,
    /// 글리프 색상 (RGBA)
    #[serde(default = "default_glyph_color")]
    pub glyph_color: [u8; 4],
    /// 바운딩 박스 색상 (RGBA)
    #[serde(default = "default_box_color")]
    pub box_color: [u8; 4],
    /// 바운딩 박스 선 두께 (픽셀)
    #[serde(default = "default_box_line_width")]
    pub box_line_width: u32,
    /// 바운딩 박스 효과에서 표시할 검출 클래스
    #[serde(default = "default_detection_class")]
    pub detection_class: String,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            kind: EffectKind::Ascii,
            grid_size: default_grid_size(),
            person_glyph: default_person_glyph(),
            background_glyph: default_background_glyph(),
            glyph_color: default_glyph_color(),
            box_color: default_box_color(),
            box_line_width: default_box_line_width(),
            detection_class: default_detection_class(),
        }
    }
}

fn default_grid_size() -> u32 {
    9
}

fn default_person_glyph() -> char {
    ' '
}

fn default_background_glyph() -> char {
    '🔥'
}

fn default_glyph_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

fn default_box_color() -> [u8; 4] {
    [0, 255, 0, 255]
}

fn default_box_line_width() -> u32 {
    2
}

fn default_detection_class() -> String {
    "person".to_string()
}

// ============================================================
// 파이프라인 설정
// ============================================================

/// 프레임 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 사이클 재무장 간격 (밀리초, 디스플레이 주사율 대응)
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cycle_interval_ms: default_cycle_interval_ms(),
        }
    }
}

fn default_cycle_interval_ms() -> u64 {
    16
}

// ============================================================
// 출력 설정
// ============================================================

/// 렌더 결과 출력 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenterKind {
    /// 터미널에 텍스트로 출력
    #[default]
    Terminal,
    /// WebP 파일로 저장
    FrameDump,
    /// 출력 없음
    None,
}

/// 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 프레젠터 종류
    #[serde(default)]
    pub presenter: PresenterKind,
    /// 프레임 덤프 디렉토리
    #[serde(default = "default_dump_dir")]
    pub dump_dir: PathBuf,
    /// N 프레임마다 1장 저장
    #[serde(default = "default_dump_every_n")]
    pub dump_every_n: u64,
    /// WebP 품질 (0-100)
    #[serde(default = "default_webp_quality")]
    pub webp_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            presenter: PresenterKind::Terminal,
            dump_dir: default_dump_dir(),
            dump_every_n: default_dump_every_n(),
            webp_quality: default_webp_quality(),
        }
    }
}

fn default_dump_dir() -> PathBuf {
    PathBuf::from("./segcam-frames")
}

fn default_dump_every_n() -> u64 {
    1
}

fn default_webp_quality() -> u8 {
    75
}

// ============================================================
// AppConfig 메서드
// ============================================================

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            camera: CameraConfig::default(),
            segmentation: SegmentationConfig::default(),
            effect: EffectConfig::default(),
            pipeline: PipelineConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// 사이클 간격 Duration
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.pipeline.cycle_interval_ms)
    }

    /// 소스 프레임 간격 Duration
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1_000 / u64::from(self.camera.frame_rate.max(1)))
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.camera.ideal_width == 0 || self.camera.ideal_height == 0 {
            return Err(invalid("camera.ideal_width/ideal_height", "0보다 커야 함"));
        }
        if self.camera.frame_rate == 0 {
            return Err(invalid("camera.frame_rate", "0보다 커야 함"));
        }
        if self.pipeline.cycle_interval_ms == 0 {
            return Err(invalid("pipeline.cycle_interval_ms", "0보다 커야 함"));
        }
        if self.segmentation.model_asset_path.trim().is_empty() {
            return Err(invalid("segmentation.model_asset_path", "비어 있으면 안 됨"));
        }
        if self.effect.grid_size == 0 {
            return Err(invalid("effect.grid_size", "0보다 커야 함"));
        }
        if self.effect.box_line_width == 0 {
            return Err(invalid("effect.box_line_width", "0보다 커야 함"));
        }
        if self.output.dump_every_n == 0 {
            return Err(invalid("output.dump_every_n", "0보다 커야 함"));
        }
        if self.output.webp_quality > 100 {
            return Err(invalid("output.webp_quality", "0-100 범위여야 함"));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn invalid(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
