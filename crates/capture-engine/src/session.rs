//! Session lifecycle: collect, finalize, clean up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use screenlog_common::error::{ScreenlogError, ScreenlogResult};
use screenlog_frame_store::FrameStore;
use screenlog_render_engine::{CompileReport, CompileSettings, Compiler, EncoderFactory};
use screenlog_session_model::config::CaptureConfig;
use serde::Serialize;
use tokio::sync::Notify;

use crate::backend::DisplayBackend;
use crate::engine::CaptureEngine;

/// State of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Created, nothing started.
    Idle,
    /// Capture loop running.
    Collecting,
    /// Collection stopped; compiling the report.
    Finalizing,
    /// Report done (or abandoned) and frames cleaned up.
    Terminated,
}

/// Cooperative stop signal shared with signal handlers.
///
/// The first request ends collection. Any request that arrives once the
/// session is finalizing cancels the artifact being compiled.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    inner: Arc<StopFlags>,
}

#[derive(Debug, Default)]
struct StopFlags {
    stop: AtomicBool,
    finalizing: AtomicBool,
    cancel: AtomicBool,
    notify: Notify,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        if self.inner.finalizing.load(Ordering::SeqCst) {
            if !self.inner.cancel.swap(true, Ordering::SeqCst) {
                tracing::warn!("Interrupted while finalizing, cancelling report");
            }
        } else if self.inner.stop.swap(true, Ordering::SeqCst) {
            // A second request before finalization began still means "hurry".
            self.inner.cancel.store(true, Ordering::SeqCst);
        }
        self.inner.notify.notify_one();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.inner.stop.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.load(Ordering::SeqCst)
    }

    fn enter_finalizing(&self) {
        self.inner.stop.store(true, Ordering::SeqCst);
        self.inner.finalizing.store(true, Ordering::SeqCst);
    }

    fn cancel_flag(&self) -> &AtomicBool {
        &self.inner.cancel
    }

    /// Resolves once a stop has been requested.
    async fn stopped(&self) {
        while !self.is_stop_requested() {
            self.inner.notify.notified().await;
        }
    }
}

/// What a finished session did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSummary {
    /// Capture ticks run, including ticks with no display.
    pub ticks: u32,
    /// Frames written during collection.
    pub frames_written: usize,
    /// Compilation outcome; `None` if compilation itself failed.
    pub compile: Option<CompileReport>,
    /// Frames removed by the final cleanup.
    pub purged: usize,
}

/// Drives one session through its lifecycle.
pub struct SessionController {
    config: CaptureConfig,
    state: SessionState,
    store: FrameStore,
    engine: Option<CaptureEngine>,
    compiler: Compiler,
    stop: StopHandle,
}

impl SessionController {
    /// Controller for a capture session.
    ///
    /// Fails only when the frames directory cannot be created.
    pub fn collector(
        config: CaptureConfig,
        backend: Box<dyn DisplayBackend>,
        encoders: Arc<dyn EncoderFactory>,
        stop: StopHandle,
    ) -> ScreenlogResult<Self> {
        let mut controller = Self::reporter(config, encoders, stop)?;
        controller.engine = Some(CaptureEngine::new(
            backend,
            controller.store.clone(),
            &controller.config,
        ));
        Ok(controller)
    }

    /// Like [`SessionController::collector`] but with a pre-built engine.
    pub fn with_engine(
        config: CaptureConfig,
        engine: CaptureEngine,
        encoders: Arc<dyn EncoderFactory>,
        stop: StopHandle,
    ) -> ScreenlogResult<Self> {
        let mut controller = Self::reporter(config, encoders, stop)?;
        controller.engine = Some(engine);
        Ok(controller)
    }

    /// Controller for the report-only path, which never captures.
    pub fn reporter(
        config: CaptureConfig,
        encoders: Arc<dyn EncoderFactory>,
        stop: StopHandle,
    ) -> ScreenlogResult<Self> {
        let store = FrameStore::open(&config.frames_dir)?;
        let compiler = Compiler::new(store.clone(), CompileSettings::from_config(&config), encoders);
        Ok(Self {
            config,
            state: SessionState::Idle,
            store,
            engine: None,
            compiler,
            stop,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Collect until stopped, then compile and clean up.
    pub async fn collect(&mut self) -> ScreenlogResult<SessionSummary> {
        if self.engine.is_none() {
            return Err(ScreenlogError::capture(
                "No capture engine configured for this session",
            ));
        }
        self.transition(SessionState::Idle, SessionState::Collecting)?;

        // Leftovers from an earlier run must not leak into this report.
        match self.store.purge() {
            Ok(0) => {}
            Ok(count) => tracing::info!(count, "Removed leftover screenshots"),
            Err(e) => tracing::warn!(error = %e, "Failed to clear leftover screenshots"),
        }

        let (ticks, frames_written) = self.run_capture_loop().await;

        tracing::info!("Stopping collection. Finalizing report...");
        self.transition(SessionState::Collecting, SessionState::Finalizing)?;
        self.stop.enter_finalizing();
        // The tick itself is synchronous; this covers any write still landing.
        if !self.config.grace.is_zero() {
            tokio::time::sleep(self.config.grace).await;
        }

        let (compile, purged) = self.finalize().await;
        Ok(SessionSummary {
            ticks,
            frames_written,
            compile,
            purged,
        })
    }

    /// Compile whatever is stored, then clean up.
    pub async fn report(&mut self) -> ScreenlogResult<SessionSummary> {
        self.transition(SessionState::Idle, SessionState::Finalizing)?;
        self.stop.enter_finalizing();
        tracing::info!("Compiling existing screenshots");

        let (compile, purged) = self.finalize().await;
        Ok(SessionSummary {
            compile,
            purged,
            ..SessionSummary::default()
        })
    }

    async fn run_capture_loop(&self) -> (u32, usize) {
        let Some(engine) = self.engine.as_ref() else {
            return (0, 0);
        };
        tracing::info!(
            backend = engine.backend_name(),
            merge_monitors = self.config.merge_monitors,
            interval_secs = self.config.interval.as_secs_f64(),
            dir = %self.store.dir().display(),
            "Starting screenshot collection"
        );

        let mut sequence = 0u32;
        let mut frames_written = 0usize;
        while !self.stop.is_stop_requested() {
            frames_written += engine.capture(sequence).frames_written();
            sequence = sequence.saturating_add(1);

            if self.stop.is_stop_requested() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = self.stop.stopped() => {}
            }
        }
        (sequence, frames_written)
    }

    async fn finalize(&mut self) -> (Option<CompileReport>, usize) {
        let compiler = self.compiler.clone();
        let stop = self.stop.clone();
        let joined =
            tokio::task::spawn_blocking(move || compiler.compile(stop.cancel_flag())).await;

        let compile = match joined {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Report compilation failed");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Report compilation task panicked");
                None
            }
        };

        // Cleanup runs on every path out of finalization.
        let purged = match self.store.purge() {
            Ok(count) => {
                tracing::info!(count, "Temporary screenshots cleaned up");
                count
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to clean up screenshots");
                0
            }
        };

        self.state = SessionState::Terminated;
        (compile, purged)
    }

    fn transition(&mut self, from: SessionState, to: SessionState) -> ScreenlogResult<()> {
        if self.state != from {
            return Err(ScreenlogError::capture(format!(
                "Cannot move session to {to:?} from {:?}",
                self.state
            )));
        }
        tracing::debug!(?from, ?to, "Session state change");
        self.state = to;
        Ok(())
    }
}
