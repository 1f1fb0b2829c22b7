//! # segcam-app
//!
//! SEGCAM 바이너리 진입점.
//! 설정 로드, 어댑터 와이어링(DI), 세션 라이프사이클과 사용자 제어 루프.

mod controls;
mod lifecycle;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use segcam_core::config::{AppConfig, EffectKind, PresenterKind};
use segcam_core::config_manager::ConfigManager;
use segcam_core::ports::camera::CameraSource;
use segcam_core::ports::presenter::SurfacePresenter;
use segcam_vision::chroma_key::{ChromaKeyDetector, ChromaKeySegmenter};
use segcam_vision::classifier::MaskClassifier;
use segcam_vision::effects::{AsciiEffect, BoundingBoxEffect, MaskFillEffect, RenderEffect};
use segcam_vision::presenter::{FrameDumpPresenter, TerminalPresenter};
use segcam_vision::session::SessionManager;
use segcam_vision::sources::{ImageDirCameraSource, ScreenCameraSource, SyntheticCameraSource};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::controls::Command;
use crate::lifecycle::LifecycleManager;

/// 프레임 소스
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    /// 크로마키 배경 위 합성 인물
    Synthetic,
    /// 이미지 디렉토리 반복 재생 (--frames-dir 필요)
    ImageDir,
    /// 주 모니터 화면 캡처
    Screen,
}

/// 렌더 효과
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EffectArg {
    MaskFill,
    BoundingBox,
    Ascii,
}

impl From<EffectArg> for EffectKind {
    fn from(arg: EffectArg) -> Self {
        match arg {
            EffectArg::MaskFill => EffectKind::MaskFill,
            EffectArg::BoundingBox => EffectKind::BoundingBox,
            EffectArg::Ascii => EffectKind::Ascii,
        }
    }
}

/// 출력 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputArg {
    Terminal,
    FrameDump,
    None,
}

impl From<OutputArg> for PresenterKind {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Terminal => PresenterKind::Terminal,
            OutputArg::FrameDump => PresenterKind::FrameDump,
            OutputArg::None => PresenterKind::None,
        }
    }
}

/// SEGCAM: 실시간 인물 세그멘테이션 효과
#[derive(Parser, Debug)]
#[command(name = "segcam")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 프레임 소스
    #[arg(long, short = 's', value_enum, default_value = "synthetic")]
    source: SourceArg,

    /// 이미지 디렉토리 (--source image-dir)
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// 캡처할 모니터 번호 (--source screen, 기본: 주 모니터)
    #[arg(long)]
    monitor: Option<usize>,

    /// 렌더 효과 (설정 파일 값 덮어쓰기)
    #[arg(long, short = 'e', value_enum)]
    effect: Option<EffectArg>,

    /// 출력 방식 (설정 파일 값 덮어쓰기)
    #[arg(long, short = 'o', value_enum)]
    output: Option<OutputArg>,

    /// 프레임 덤프 디렉토리 (설정 파일 값 덮어쓰기)
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 실행 시간 (초, 없으면 종료 명령까지)
    #[arg(long)]
    duration_secs: Option<u64>,

    /// CLI 덮어쓰기를 설정 파일에 저장
    #[arg(long)]
    save_config: bool,
}

/// 배너 출력
fn print_banner(effect: EffectKind) {
    println!();
    println!("╔══════════════════════════════════════════════╗");
    println!("║   ███████╗███████╗ ██████╗  ██████╗ █████╗   ║");
    println!("║   ██╔════╝██╔════╝██╔════╝ ██╔════╝██╔══██╗  ║");
    println!("║   ███████╗█████╗  ██║  ███╗██║     ███████║  ║");
    println!("║   ╚════██║██╔══╝  ██║   ██║██║     ██╔══██║  ║");
    println!("║   ███████║███████╗╚██████╔╝╚██████╗██║  ██║  ║");
    println!("║   ╚══════╝╚══════╝ ╚═════╝  ╚═════╝╚═╝  ╚═╝  ║");
    println!("║        실시간 인물 세그멘테이션 효과         ║");
    println!("╚══════════════════════════════════════════════╝");
    println!("  효과: {effect:?}  |  명령: toggle / enable / disable / status / quit");
    println!();
}

/// CLI 인자로 설정 덮어쓰기
fn apply_overrides(args: &Args, config: &mut AppConfig) {
    if let Some(effect) = args.effect {
        config.effect.kind = effect.into();
    }
    if let Some(output) = args.output {
        config.output.presenter = output.into();
    }
    if let Some(ref dump_dir) = args.dump_dir {
        config.output.dump_dir = dump_dir.clone();
    }
}

/// 설정 로드 (파일) 후 CLI 인자로 덮어쓰기
fn load_config(args: &Args) -> Result<AppConfig> {
    let manager = match &args.config {
        Some(path) => Some(
            ConfigManager::with_path(path.clone())
                .map_err(|e| anyhow!("설정 로드 실패: {e}"))?,
        ),
        None => match ConfigManager::new() {
            Ok(manager) => {
                info!("설정 파일: {}", manager.config_path().display());
                Some(manager)
            }
            Err(e) => {
                warn!("설정 파일 사용 불가, 기본 설정 사용: {e}");
                None
            }
        },
    };

    if let (Some(manager), true) = (&manager, args.save_config) {
        let saved = manager
            .update_with(|config| apply_overrides(args, config))
            .map_err(|e| anyhow!("설정 저장 실패: {e}"))?;
        info!("설정 저장: {}", manager.config_path().display());
        return Ok(saved);
    }
    if args.save_config {
        warn!("설정 파일이 없어 저장 생략");
    }

    let mut config = manager
        .as_ref()
        .map(ConfigManager::get)
        .unwrap_or_else(AppConfig::default_config);
    apply_overrides(args, &mut config);
    config
        .validate()
        .map_err(|e| anyhow!("설정 검증 실패: {e}"))?;
    Ok(config)
}

/// 프레임 소스 생성
fn build_camera(args: &Args, config: &AppConfig) -> Result<Arc<dyn CameraSource>> {
    let camera: Arc<dyn CameraSource> = match args.source {
        SourceArg::Synthetic => Arc::new(SyntheticCameraSource::new(
            config.segmentation.chroma_key.key_color,
        )),
        SourceArg::ImageDir => {
            let dir = args
                .frames_dir
                .clone()
                .ok_or_else(|| anyhow!("--source image-dir 에는 --frames-dir 가 필요함"))?;
            Arc::new(ImageDirCameraSource::new(dir))
        }
        SourceArg::Screen => match args.monitor {
            Some(index) => Arc::new(ScreenCameraSource::with_monitor(index)),
            None => Arc::new(ScreenCameraSource::new()),
        },
    };
    Ok(camera)
}

/// 출력기 생성
fn build_presenter(config: &AppConfig) -> Result<Option<Arc<dyn SurfacePresenter>>> {
    let presenter: Option<Arc<dyn SurfacePresenter>> = match config.output.presenter {
        PresenterKind::Terminal => Some(Arc::new(TerminalPresenter::new(config.effect.grid_size))),
        PresenterKind::FrameDump => Some(Arc::new(
            FrameDumpPresenter::new(
                &config.output.dump_dir,
                config.output.dump_every_n,
                config.output.webp_quality,
            )
            .map_err(|e| anyhow!("프레임 덤프 준비 실패: {e}"))?,
        )),
        PresenterKind::None => None,
    };
    Ok(presenter)
}

/// 세션 실행: 종료 신호, 실행 시간 만료, quit 명령 중 먼저 오는 것까지
async fn run_session<E: RenderEffect>(
    effect: E,
    camera: Arc<dyn CameraSource>,
    presenter: Option<Arc<dyn SurfacePresenter>>,
    config: &AppConfig,
    duration: Option<Duration>,
) -> Result<()> {
    info!("렌더 효과: {}", effect.name());
    let mut manager = SessionManager::new(effect, camera, config);
    if let Some(presenter) = presenter {
        manager = manager.with_presenter(presenter);
    }

    let started = match manager.initialize().await {
        Ok(()) => manager.enable().await,
        Err(e) => Err(e),
    };
    if let Err(e) = started {
        error!("{}", e.user_message());
        return Err(anyhow!("{}", e.user_message()));
    }

    let lifecycle = Arc::new(LifecycleManager::new());
    let mut shutdown_rx = lifecycle.subscribe();
    let signal_lifecycle = lifecycle.clone();
    tokio::spawn(async move {
        signal_lifecycle.wait_for_signal().await;
    });

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut commands = controls::spawn_stdin_reader();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                break;
            }
            _ = &mut deadline => {
                info!("실행 시간 만료");
                break;
            }
            command = commands.recv(), if stdin_open => {
                let Some(command) = command else {
                    stdin_open = false;
                    continue;
                };
                let result = match command {
                    Command::Toggle => manager.toggle().await,
                    Command::Enable => manager.enable().await,
                    Command::Disable => {
                        manager.disable().await;
                        Ok(())
                    }
                    Command::Status => {
                        let stats = manager.stats().await;
                        let surface = manager.snapshot().await;
                        info!(
                            "상태: {} (렌더 {}, 스킵 {}, 실패 {}, 서피스 {}x{}, 글리프 {})",
                            manager.state(),
                            stats.rendered,
                            stats.skipped,
                            stats.failed,
                            surface.width(),
                            surface.height(),
                            surface.glyphs().len()
                        );
                        Ok(())
                    }
                    Command::Quit => break,
                };
                if let Err(e) = result {
                    error!("{}", e.user_message());
                    if manager.state().is_terminal() {
                        break;
                    }
                }
            }
        }
    }

    manager.disable().await;
    lifecycle.shutdown();
    match manager.last_error() {
        Some(message) => Err(anyhow!("{message}")),
        None => Ok(()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // tracing 초기화 (stdout은 터미널 출력기가 사용)
    let log_filter = format!(
        "segcam={lvl},segcam_app={lvl},segcam_core={lvl},segcam_vision={lvl}",
        lvl = args.log_level
    );
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config = load_config(&args)?;
    print_banner(config.effect.kind);
    info!("SEGCAM 시작");

    let camera = build_camera(&args, &config)?;
    let presenter = build_presenter(&config)?;
    let duration = args.duration_secs.map(Duration::from_secs);

    // 효과는 배포 시 정적으로 선택
    match config.effect.kind {
        EffectKind::MaskFill => {
            let segmenter = Arc::new(ChromaKeySegmenter::new(&config.segmentation));
            let classifier = MaskClassifier::from_config(&config.segmentation, &config.effect);
            let effect = MaskFillEffect::new(segmenter, classifier);
            run_session(effect, camera, presenter, &config, duration).await?;
        }
        EffectKind::BoundingBox => {
            let detector = Arc::new(ChromaKeyDetector::new(&config.segmentation.chroma_key));
            let effect = BoundingBoxEffect::new(detector, &config.effect);
            run_session(effect, camera, presenter, &config, duration).await?;
        }
        EffectKind::Ascii => {
            let segmenter = Arc::new(ChromaKeySegmenter::new(&config.segmentation));
            let classifier = MaskClassifier::from_config(&config.segmentation, &config.effect);
            let effect = AsciiEffect::new(segmenter, classifier, &config.effect);
            run_session(effect, camera, presenter, &config, duration).await?;
        }
    }

    info!("SEGCAM 종료");
    Ok(())
}
