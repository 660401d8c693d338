use crate::{FaceDetection, LandmarkProvider};
use camera::Frame;
use std::{fmt, future::Future, sync::Arc, time::Duration};

pub const DEFAULT_DETECTION_TIMEOUT: Duration = Duration::from_millis(2000);

/// What happened to one detection attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    Face(FaceDetection),
    NoFace,
    Timeout,
    Unavailable,
    Failed(String),
}

impl DetectionOutcome {
    pub fn into_detection(self) -> Option<FaceDetection> {
        match self {
            DetectionOutcome::Face(detection) => Some(detection),
            _ => None,
        }
    }

    pub fn is_face(&self) -> bool {
        matches!(self, DetectionOutcome::Face(_))
    }
}

/// Races one provider call against a fixed deadline.
///
/// The provider runs as its own task. Whichever of the task and the timer
/// settles first decides the outcome; a losing task is aborted and its result
/// can never reach a later capture. Provider errors and panics are reported
/// as [`DetectionOutcome::Failed`] and never escape the gate.
#[derive(Clone)]
pub struct DetectionGate {
    provider: Option<Arc<dyn LandmarkProvider>>,
    timeout: Duration,
}

impl fmt::Debug for DetectionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionGate")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DetectionGate {
    pub fn new(provider: Arc<dyn LandmarkProvider>) -> Self {
        Self {
            provider: Some(provider),
            timeout: DEFAULT_DETECTION_TIMEOUT,
        }
    }

    /// A gate whose detector never loaded: every attempt is `Unavailable`.
    pub fn unavailable() -> Self {
        Self {
            provider: None,
            timeout: DEFAULT_DETECTION_TIMEOUT,
        }
    }

    /// Runs the loader once. A failed load degrades to [`Self::unavailable`].
    pub async fn load<F, Fut, E>(loader: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn LandmarkProvider>, E>>,
        E: fmt::Display,
    {
        match loader().await {
            Ok(provider) => {
                log::info!("landmark provider `{}` loaded", provider.name());
                Self::new(provider)
            }
            Err(e) => {
                log::warn!("loading landmark provider failed, continuing without it: {e}");
                Self::unavailable()
            }
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn detect(&self, frame: &Frame) -> Option<FaceDetection> {
        self.detect_outcome(frame).await.into_detection()
    }

    pub async fn detect_outcome(&self, frame: &Frame) -> DetectionOutcome {
        let Some(provider) = self.provider.clone() else {
            return DetectionOutcome::Unavailable;
        };

        let (width, height) = frame.dimensions();
        let task_frame = frame.clone();
        let mut task = tokio::spawn(async move { provider.detect(task_frame).await });
        let _abort = AbortOnDrop(task.abort_handle());

        tokio::select! {
            biased;

            joined = &mut task => match joined {
                Ok(Ok(Some(detection))) => DetectionOutcome::Face(detection.clipped_to(width, height)),
                Ok(Ok(None)) => DetectionOutcome::NoFace,
                Ok(Err(e)) => {
                    log::warn!("landmark detection failed: {e}");
                    DetectionOutcome::Failed(e.to_string())
                }
                Err(e) => {
                    log::warn!("landmark detection task failed: {e}");
                    DetectionOutcome::Failed(e.to_string())
                }
            },
            _ = tokio::time::sleep(self.timeout) => {
                log::warn!("landmark detection timed out after {:?}", self.timeout);
                DetectionOutcome::Timeout
            }
        }
    }
}

/// Stops the provider task once its caller stops waiting, whether by timing
/// out or by being dropped.
struct AbortOnDrop(tokio::task::AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BoundingBox, FixedLandmarkProvider, LandmarkError, LandmarkGroup, LandmarkResult,
        LandmarkSet, Point,
    };
    use async_trait::async_trait;
    use image::RgbaImage;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::time::Instant;

    fn frame() -> Frame {
        Frame::new(RgbaImage::new(640, 480))
    }

    fn detection() -> FaceDetection {
        let jaw = vec![Point::new(200.0, 200.0), Point::new(400.0, 350.0)];
        FaceDetection::new(
            BoundingBox::new(200.0, 100.0, 600.0, 250.0),
            LandmarkSet::new().with_group(LandmarkGroup::JawOutline, jaw),
        )
        .unwrap()
    }

    struct DelayedProvider {
        delay: Duration,
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl LandmarkProvider for DelayedProvider {
        async fn detect(&self, _frame: Frame) -> LandmarkResult<Option<FaceDetection>> {
            tokio::time::sleep(self.delay).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(Some(detection()))
        }
    }

    struct PendingProvider;

    #[async_trait]
    impl LandmarkProvider for PendingProvider {
        async fn detect(&self, _frame: Frame) -> LandmarkResult<Option<FaceDetection>> {
            std::future::pending().await
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LandmarkProvider for FailingProvider {
        async fn detect(&self, _frame: Frame) -> LandmarkResult<Option<FaceDetection>> {
            Err(LandmarkError::DetectionFailed("model exploded".to_string()))
        }
    }

    struct PanickingProvider;

    #[async_trait]
    impl LandmarkProvider for PanickingProvider {
        async fn detect(&self, _frame: Frame) -> LandmarkResult<Option<FaceDetection>> {
            panic!("detector bug")
        }
    }

    fn delayed(delay: Duration) -> (DetectionGate, Arc<AtomicBool>) {
        let finished = Arc::new(AtomicBool::new(false));
        let provider = DelayedProvider {
            delay,
            finished: finished.clone(),
        };
        (DetectionGate::new(Arc::new(provider)), finished)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_provider_wins() {
        let (gate, finished) = delayed(Duration::from_millis(300));
        let outcome = gate.detect_outcome(&frame()).await;

        assert!(outcome.is_face());
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_face_before_deadline() {
        let gate = DetectionGate::new(Arc::new(FixedLandmarkProvider::new(None)));
        let started = Instant::now();

        let outcome = gate.detect_outcome(&frame()).await;
        assert_eq!(outcome, DetectionOutcome::NoFace);
        assert!(started.elapsed() < DEFAULT_DETECTION_TIMEOUT);
        assert!(gate.detect(&frame()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detection_box_is_clipped_to_frame() {
        let (gate, _) = delayed(Duration::from_millis(1));
        let detection = gate.detect(&frame()).await.unwrap();
        assert_eq!(detection.bounding_box().right(), 640.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_provider_times_out_at_deadline() {
        let gate = DetectionGate::new(Arc::new(PendingProvider));
        let started = Instant::now();

        let outcome = gate.detect_outcome(&frame()).await;
        let elapsed = started.elapsed();

        assert_eq!(outcome, DetectionOutcome::Timeout);
        assert!(elapsed >= DEFAULT_DETECTION_TIMEOUT);
        assert!(elapsed < DEFAULT_DETECTION_TIMEOUT + Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_is_discarded() {
        let (gate, finished) = delayed(Duration::from_secs(5));
        assert!(gate.detect(&frame()).await.is_none());

        // Long after the deadline the aborted task must not have run on.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeout() {
        let (gate, _) = delayed(Duration::from_millis(300));
        let gate = gate.with_timeout(Duration::from_millis(100));

        assert_eq!(gate.timeout(), Duration::from_millis(100));
        assert_eq!(gate.detect_outcome(&frame()).await, DetectionOutcome::Timeout);
    }

    #[tokio::test]
    async fn test_provider_error_is_contained() {
        let gate = DetectionGate::new(Arc::new(FailingProvider));
        let outcome = gate.detect_outcome(&frame()).await;

        assert!(matches!(outcome, DetectionOutcome::Failed(_)));
        assert!(outcome.into_detection().is_none());
    }

    #[tokio::test]
    async fn test_provider_panic_is_contained() {
        let gate = DetectionGate::new(Arc::new(PanickingProvider));
        assert!(matches!(
            gate.detect_outcome(&frame()).await,
            DetectionOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_unavailable_gate() {
        let gate = DetectionGate::unavailable();
        assert!(!gate.is_available());
        assert_eq!(
            gate.detect_outcome(&frame()).await,
            DetectionOutcome::Unavailable
        );
    }

    #[tokio::test]
    async fn test_failed_load_degrades_to_unavailable() {
        let gate = DetectionGate::load(|| async {
            Err::<Arc<dyn LandmarkProvider>, _>("weights missing")
        })
        .await;
        assert!(!gate.is_available());

        let gate = DetectionGate::load(|| async {
            Ok::<Arc<dyn LandmarkProvider>, String>(Arc::new(FailingProvider))
        })
        .await;
        assert!(gate.is_available());
    }
}
