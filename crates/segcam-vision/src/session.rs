//! 카메라/리소스 라이프사이클 관리.
//!
//! 모델 세션과 카메라 스트림, 사이클 핸들을 소유한다.
//! `enable`/`disable`은 멱등이며, 활성 스트림과 사이클 핸들은 항상 최대 하나다.
//! 모델은 비활성화 시에도 유지되고 카메라 스트림과 사이클 루프만 정리된다.

use std::sync::Arc;
use std::time::Duration;

use segcam_core::config::AppConfig;
use segcam_core::error::CoreError;
use segcam_core::models::session::SessionState;
use segcam_core::models::surface::DisplaySurface;
use segcam_core::ports::camera::{CameraConstraints, CameraSource, CameraStream};
use segcam_core::ports::presenter::SurfacePresenter;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::effects::RenderEffect;
use crate::pipeline::{CycleOutcome, CycleStats, FramePipeline};

/// 비활성화 시 진행 중인 추론을 기다리는 최대 시간
pub const CYCLE_STOP_GRACE: Duration = Duration::from_millis(500);

/// 활성 세션: 카메라 스트림과 사이클 핸들을 함께 소유
///
/// 어떤 경로로 해제되든 (disable, 에러, 관리자 drop) 취소 신호를 보내고
/// 스트림을 정지한다. 진행 중인 추론은 끊지 않고 재무장만 막는다.
struct ActiveSession {
    stream: Arc<dyn CameraStream>,
    cancel_tx: watch::Sender<bool>,
    cycle: Option<JoinHandle<()>>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.cancel_tx.send_replace(true);
        self.stream.stop();
    }
}

/// 세션 관리자
pub struct SessionManager<E: RenderEffect> {
    pipeline: Arc<Mutex<FramePipeline<E>>>,
    camera: Arc<dyn CameraSource>,
    presenter: Option<Arc<dyn SurfacePresenter>>,
    constraints: CameraConstraints,
    cycle_interval: Duration,
    state_tx: watch::Sender<SessionState>,
    model_ready: bool,
    last_error: Option<String>,
    active: Option<ActiveSession>,
}

impl<E: RenderEffect> SessionManager<E> {
    /// 새 세션 관리자 (Idle 상태)
    pub fn new(effect: E, camera: Arc<dyn CameraSource>, config: &AppConfig) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            pipeline: Arc::new(Mutex::new(FramePipeline::new(effect))),
            camera,
            presenter: None,
            constraints: CameraConstraints::from_config(config),
            cycle_interval: config.cycle_interval(),
            state_tx,
            model_ready: false,
            last_error: None,
            active: None,
        }
    }

    /// 렌더 결과 출력기 설정
    pub fn with_presenter(mut self, presenter: Arc<dyn SurfacePresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// 현재 세션 상태
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// 상태 변경 구독
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// 사용자 에러 슬롯 (터미널 에러만 기록됨)
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// 카메라 스트림과 사이클 루프가 살아 있는지
    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_model_ready(&self) -> bool {
        self.model_ready
    }

    /// 현재 서피스 복제본
    pub async fn snapshot(&self) -> DisplaySurface {
        self.pipeline.lock().await.surface().clone()
    }

    /// 누적 사이클 통계
    pub async fn stats(&self) -> CycleStats {
        self.pipeline.lock().await.stats()
    }

    /// 모델 초기화 (수명 동안 한 번만 수행)
    pub async fn initialize(&mut self) -> Result<(), CoreError> {
        if self.model_ready {
            return Ok(());
        }
        self.ensure_not_failed()?;

        self.set_state(SessionState::Initializing);
        let result = {
            let pipeline = self.pipeline.lock().await;
            pipeline.effect().initialize().await
        };

        match result {
            Ok(()) => {
                self.model_ready = true;
                self.set_state(SessionState::Ready);
                Ok(())
            }
            Err(e) => {
                error!("세그멘터 초기화 실패: {e}");
                Err(self.fail(e))
            }
        }
    }

    /// 카메라 획득 후 사이클 루프 시작 (이미 활성이면 아무것도 하지 않음)
    pub async fn enable(&mut self) -> Result<(), CoreError> {
        if self.active.is_some() {
            debug!("이미 활성화됨, enable 무시");
            return Ok(());
        }
        self.ensure_not_failed()?;
        self.initialize().await?;

        self.set_state(SessionState::AwaitingCamera);
        let acquired = self.camera.acquire(&self.constraints).await;
        let stream = match acquired {
            Ok(stream) => stream,
            Err(e) => {
                error!("카메라 오류: {e}");
                return Err(self.fail(e));
            }
        };

        self.pipeline.lock().await.reset_timestamp();

        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.set_state(SessionState::Running);
        let cycle = tokio::spawn(run_cycles(
            self.pipeline.clone(),
            stream.clone(),
            self.presenter.clone(),
            self.cycle_interval,
            cancel_rx,
        ));

        self.active = Some(ActiveSession {
            stream,
            cancel_tx,
            cycle: Some(cycle),
        });
        Ok(())
    }

    /// 스트림 해제와 예약된 사이클 취소 (이미 비활성이면 아무것도 하지 않음)
    pub async fn disable(&mut self) {
        let Some(mut active) = self.active.take() else {
            debug!("이미 비활성화됨, disable 무시");
            return;
        };

        let cycle = active.cycle.take();
        drop(active);
        if !self.state().is_terminal() {
            self.set_state(SessionState::Stopped);
        }

        if let Some(mut handle) = cycle {
            match tokio::time::timeout(CYCLE_STOP_GRACE, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("사이클 태스크 종료 오류: {e}"),
                Err(_) => {
                    // 응답 없는 추론은 결과를 버리고 태스크를 정리
                    warn!(
                        "진행 중인 추론이 {}ms 안에 끝나지 않아 사이클 태스크 중단",
                        CYCLE_STOP_GRACE.as_millis()
                    );
                    handle.abort();
                    if let Err(e) = handle.await {
                        debug!("사이클 태스크 중단됨: {e}");
                    }
                }
            }
        }

        let stats = self.stats().await;
        info!(
            "세션 통계: 추론 {}회 (렌더 {}, 실패 {}), 스킵 {}회",
            stats.inferred(),
            stats.rendered,
            stats.failed,
            stats.skipped
        );
    }

    /// 활성 상태 반전
    pub async fn toggle(&mut self) -> Result<(), CoreError> {
        if self.is_enabled() {
            self.disable().await;
            Ok(())
        } else {
            self.enable().await
        }
    }

    fn ensure_not_failed(&self) -> Result<(), CoreError> {
        if self.state().is_terminal() {
            return Err(CoreError::InvalidState(format!(
                "세션이 에러 상태임: {}",
                self.last_error.as_deref().unwrap_or("-")
            )));
        }
        Ok(())
    }

    /// 터미널 에러 기록 후 Error 상태로 전환
    fn fail(&mut self, err: CoreError) -> CoreError {
        self.last_error = Some(err.user_message());
        self.set_state(SessionState::Error);
        err
    }

    fn set_state(&self, next: SessionState) {
        let prev = self.state_tx.send_replace(next);
        if prev != next {
            info!("세션 상태: {prev} → {next}");
        }
    }
}

/// 사이클 루프: 한 사이클의 추론이 끝난 뒤에만 다음 틱을 기다린다
async fn run_cycles<E: RenderEffect>(
    pipeline: Arc<Mutex<FramePipeline<E>>>,
    stream: Arc<dyn CameraStream>,
    presenter: Option<Arc<dyn SurfacePresenter>>,
    interval: Duration,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = cancel_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        if *cancel_rx.borrow() {
            break;
        }

        let Some(frame) = stream.current_frame() else {
            continue;
        };

        let mut pipeline = pipeline.lock().await;
        let outcome = pipeline.run_cycle(&frame).await;

        // 추론 중 비활성화되었으면 재무장하지 않음
        if *cancel_rx.borrow() {
            break;
        }
        if outcome == CycleOutcome::Rendered {
            if let Some(presenter) = &presenter {
                if let Err(e) = presenter.present(pipeline.surface()) {
                    warn!("출력 실패: {e}");
                }
            }
        }
    }
    debug!("사이클 루프 종료");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MaskClassifier;
    use crate::effects::test_support::FixedSegmenter;
    use crate::effects::MaskFillEffect;
    use async_trait::async_trait;
    use image::RgbaImage;
    use segcam_core::error::{CAMERA_ACCESS_FAILED_MESSAGE, MODEL_LOAD_FAILED_MESSAGE};
    use segcam_core::models::frame::{CategoryMask, Frame};
    use segcam_core::ports::segmenter::Segmenter;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct StillStream {
        stopped: AtomicBool,
    }

    impl CameraStream for StillStream {
        fn current_frame(&self) -> Option<Frame> {
            if self.is_stopped() {
                return None;
            }
            Some(Frame::new(1, RgbaImage::new(2, 2)))
        }

        fn stop(&self) {
            self.stopped.store(true, Ordering::SeqCst);
        }

        fn is_stopped(&self) -> bool {
            self.stopped.load(Ordering::SeqCst)
        }
    }

    struct StillCamera {
        deny: bool,
        acquired: AtomicUsize,
    }

    impl StillCamera {
        fn new(deny: bool) -> Arc<Self> {
            Arc::new(Self {
                deny,
                acquired: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CameraSource for StillCamera {
        async fn acquire(
            &self,
            _constraints: &CameraConstraints,
        ) -> Result<Arc<dyn CameraStream>, CoreError> {
            self.acquired.fetch_add(1, Ordering::SeqCst);
            if self.deny {
                return Err(CoreError::CameraAcquisition("NotAllowedError".into()));
            }
            Ok(Arc::new(StillStream {
                stopped: AtomicBool::new(false),
            }))
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl Segmenter for BrokenModel {
        async fn initialize(&self) -> Result<(), CoreError> {
            Err(CoreError::Initialization("404".into()))
        }

        async fn segment(&self, _frame: &Frame, _ts: u64) -> Result<CategoryMask, CoreError> {
            Err(CoreError::FrameInference("미초기화".into()))
        }
    }

    /// 응답하지 않는 모델 (추론이 끝나지 않음)
    struct HungModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Segmenter for HungModel {
        async fn initialize(&self) -> Result<(), CoreError> {
            Ok(())
        }

        async fn segment(&self, _frame: &Frame, _ts: u64) -> Result<CategoryMask, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(CoreError::FrameInference("도달하지 않음".into()))
        }
    }

    async fn wait_for_call(model: &HungModel) {
        for _ in 0..200 {
            if model.calls.load(Ordering::SeqCst) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("추론이 시작되지 않음");
    }

    fn manager(
        segmenter: Arc<dyn Segmenter>,
        camera: Arc<StillCamera>,
    ) -> SessionManager<MaskFillEffect> {
        let effect = MaskFillEffect::new(segmenter, MaskClassifier::default());
        SessionManager::new(effect, camera, &AppConfig::default_config())
    }

    #[tokio::test]
    async fn enable_disable_cycle() {
        let camera = StillCamera::new(false);
        let mut manager = manager(Arc::new(FixedSegmenter::new(2, 2, vec![0; 4])), camera.clone());
        assert_eq!(manager.state(), SessionState::Idle);

        manager.enable().await.unwrap();
        assert_eq!(manager.state(), SessionState::Running);
        assert!(manager.is_enabled());
        assert!(manager.is_model_ready());

        manager.disable().await;
        assert_eq!(manager.state(), SessionState::Stopped);
        assert!(!manager.is_enabled());

        manager.toggle().await.unwrap();
        assert!(manager.is_enabled());
        assert_eq!(camera.acquired.load(Ordering::SeqCst), 2);
        manager.disable().await;
    }

    #[tokio::test]
    async fn model_failure_is_terminal() {
        let camera = StillCamera::new(false);
        let mut manager = manager(Arc::new(BrokenModel), camera.clone());

        let err = manager.enable().await.unwrap_err();
        assert!(matches!(err, CoreError::Initialization(_)));
        assert_eq!(manager.state(), SessionState::Error);
        assert_eq!(manager.last_error(), Some(MODEL_LOAD_FAILED_MESSAGE));
        assert_eq!(camera.acquired.load(Ordering::SeqCst), 0);

        // 재시도 없음
        let err = manager.enable().await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
        assert_eq!(camera.acquired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn camera_failure_is_terminal() {
        let camera = StillCamera::new(true);
        let mut manager = manager(Arc::new(FixedSegmenter::new(2, 2, vec![0; 4])), camera.clone());

        let err = manager.enable().await.unwrap_err();
        assert!(err.is_terminal());
        assert_eq!(manager.state(), SessionState::Error);
        assert_eq!(manager.last_error(), Some(CAMERA_ACCESS_FAILED_MESSAGE));
        assert!(!manager.is_enabled());

        // 모델은 유지
        assert!(manager.is_model_ready());
    }

    #[tokio::test]
    async fn disable_returns_despite_hung_inference() {
        let model = Arc::new(HungModel {
            calls: AtomicUsize::new(0),
        });
        let camera = StillCamera::new(false);
        let mut manager = manager(model.clone(), camera.clone());

        manager.enable().await.unwrap();
        wait_for_call(&model).await;

        let bound = CYCLE_STOP_GRACE + Duration::from_secs(2);
        tokio::time::timeout(bound, manager.disable())
            .await
            .expect("disable가 제한 시간 안에 끝나야 함");
        assert_eq!(manager.state(), SessionState::Stopped);
        assert!(!manager.is_enabled());
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);

        // 파이프라인 잠금이 풀려 다시 활성화할 수 있음
        tokio::time::timeout(bound, manager.enable())
            .await
            .expect("재활성화가 막히면 안 됨")
            .unwrap();
        assert_eq!(camera.acquired.load(Ordering::SeqCst), 2);
        tokio::time::timeout(bound, manager.disable())
            .await
            .expect("disable가 제한 시간 안에 끝나야 함");
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let camera = StillCamera::new(false);
        let mut manager = manager(Arc::new(FixedSegmenter::new(2, 2, vec![0; 4])), camera);
        let rx = manager.subscribe();

        manager.initialize().await.unwrap();
        assert_eq!(*rx.borrow(), SessionState::Ready);
        manager.initialize().await.unwrap();
        assert_eq!(*rx.borrow(), SessionState::Ready);
    }
}
