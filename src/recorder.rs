//! Screen recorder
//!
//! Wraps a platform display-capture session in an `Idle → Recording →
//! Stopped` state machine. While recording, a background task owns the
//! capture stream and buffers its chunks; the stream's tracks are released
//! by a drop guard, so they are stopped whether the session finalizes
//! normally, the task is aborted, or the recorder is dropped mid-session.

use crate::{RecorderConfig, ToolError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub video: bool,
    pub audio: bool,
}

/// Platform entry point for display capture.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DisplayCapture: Send + Sync {
    /// Ask the platform for a capture stream. A refusal is reported as
    /// `CaptureDenied`.
    async fn open(&self, constraints: CaptureConstraints) -> Result<Box<dyn CaptureStream>, ToolError>;
}

/// A granted capture session.
#[async_trait]
pub trait CaptureStream: Send {
    /// Next encoded chunk, or `None` once the session has ended.
    async fn next_chunk(&mut self) -> Option<Vec<u8>>;

    /// Ask the session to flush and end. Chunks still in flight keep
    /// arriving through `next_chunk` until it returns `None`.
    fn finalize(&mut self);

    /// Release every underlying media track.
    fn stop_tracks(&mut self);
}

/// Owns the stream and stops its tracks when dropped.
struct TrackGuard {
    stream: Box<dyn CaptureStream>,
}

impl Drop for TrackGuard {
    fn drop(&mut self) {
        self.stream.stop_tracks();
        debug!("Capture tracks released");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Stopped,
}

/// Finished capture output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
}

impl Recording {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn extension(&self) -> &'static str {
        mime_guess::get_mime_extensions_str(&self.mime_type)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin")
    }

    pub fn file_name(&self) -> String {
        format!(
            "recording-{}.{}",
            self.started_at.format("%Y%m%d-%H%M%S"),
            self.extension()
        )
    }
}

struct ActiveSession {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Vec<Vec<u8>>>,
    started_at: DateTime<Utc>,
}

pub struct ScreenRecorder {
    capture: Arc<dyn DisplayCapture>,
    config: RecorderConfig,
    state: RecorderState,
    session: Option<ActiveSession>,
    recording: Option<Recording>,
}

impl ScreenRecorder {
    pub fn new(capture: Arc<dyn DisplayCapture>, config: RecorderConfig) -> Self {
        Self {
            capture,
            config,
            state: RecorderState::Idle,
            session: None,
            recording: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn include_audio(&self) -> bool {
        self.config.include_audio
    }

    /// Applies to the next `start`.
    pub fn set_audio(&mut self, enabled: bool) {
        self.config.include_audio = enabled;
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    /// Begin a capture session.
    ///
    /// Fails with `AlreadyRecording` while a session is active; on a platform
    /// refusal the recorder keeps its previous state and previous result.
    pub async fn start(&mut self) -> Result<(), ToolError> {
        if self.state == RecorderState::Recording {
            return Err(ToolError::AlreadyRecording);
        }

        let constraints = CaptureConstraints {
            video: true,
            audio: self.config.include_audio,
        };

        let stream = match self.capture.open(constraints).await {
            Ok(stream) => stream,
            Err(ToolError::CaptureDenied(reason)) => {
                warn!("Display capture denied: {}", reason);
                return Err(ToolError::CaptureDenied(reason));
            }
            Err(e) => {
                warn!("Display capture unavailable: {}", e);
                return Err(ToolError::CaptureDenied(e.to_string()));
            }
        };

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(buffer_chunks(TrackGuard { stream }, stop_rx));

        self.session = Some(ActiveSession {
            stop_tx: Some(stop_tx),
            task,
            started_at: Utc::now(),
        });
        self.recording = None;
        self.state = RecorderState::Recording;

        info!("Recording started (audio: {})", constraints.audio);
        Ok(())
    }

    /// Finalize the active session and assemble the recording.
    ///
    /// Returns `Ok(None)` when nothing is being recorded. The session stays
    /// attached until the buffering task has been joined, so a `stop` that is
    /// cancelled part way can be completed by calling `stop` again.
    pub async fn stop(&mut self) -> Result<Option<&Recording>, ToolError> {
        let Some(active) = self.session.as_mut() else {
            return Ok(None);
        };

        // The task may already have ended on its own if the platform closed the stream.
        if let Some(stop_tx) = active.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        let result = (&mut active.task).await;

        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        self.state = RecorderState::Stopped;

        let chunks = match result {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!("Recording task did not finish: {}", e);
                return Err(ToolError::CaptureFailed(e.to_string()));
            }
        };

        let recording = Recording {
            mime_type: self.config.mime_type.clone(),
            bytes: chunks.concat(),
            started_at: session.started_at,
            stopped_at: Utc::now(),
        };

        info!(
            "Recording stopped: {} chunks, {}",
            chunks.len(),
            crate::format_bytes(recording.bytes.len() as u64)
        );

        self.recording = Some(recording);
        Ok(self.recording.as_ref())
    }

    /// Write the finished recording into `dir`.
    ///
    /// Only meaningful once stopped with a non-empty result; otherwise
    /// nothing is written and `Ok(None)` is returned.
    pub async fn download(&self, dir: &Path) -> Result<Option<PathBuf>, ToolError> {
        if self.state != RecorderState::Stopped {
            return Ok(None);
        }

        let Some(recording) = self.recording.as_ref().filter(|r| !r.is_empty()) else {
            return Ok(None);
        };

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(recording.file_name());
        tokio::fs::write(&path, &recording.bytes).await?;

        info!("Recording saved to {}", path.display());
        Ok(Some(path))
    }
}

impl Drop for ScreenRecorder {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            // Aborting drops the guard, which stops the tracks.
            session.task.abort();
        }
    }
}

async fn buffer_chunks(mut guard: TrackGuard, mut stop_rx: oneshot::Receiver<()>) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();

    loop {
        tokio::select! {
            chunk = guard.stream.next_chunk() => match chunk {
                Some(chunk) if !chunk.is_empty() => chunks.push(chunk),
                Some(_) => {}
                None => {
                    debug!("Capture stream ended by platform");
                    break;
                }
            },
            _ = &mut stop_rx => {
                guard.stream.finalize();
                while let Some(chunk) = guard.stream.next_chunk().await {
                    if !chunk.is_empty() {
                        chunks.push(chunk);
                    }
                }
                break;
            }
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::mpsc;

    struct ScriptedStream {
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
        finalized: bool,
        tracks_stopped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl CaptureStream for ScriptedStream {
        async fn next_chunk(&mut self) -> Option<Vec<u8>> {
            if self.finalized {
                self.rx.try_recv().ok()
            } else {
                self.rx.recv().await
            }
        }

        fn finalize(&mut self) {
            self.finalized = true;
        }

        fn stop_tracks(&mut self) {
            self.tracks_stopped.store(true, Ordering::SeqCst);
        }
    }

    fn scripted_capture(
        chunks: &[&str],
    ) -> (MockDisplayCapture, Arc<AtomicBool>, mpsc::UnboundedSender<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        for chunk in chunks {
            tx.send(chunk.as_bytes().to_vec()).unwrap();
        }

        let tracks_stopped = Arc::new(AtomicBool::new(false));
        let stopped = tracks_stopped.clone();
        let rx = std::sync::Mutex::new(Some(rx));

        let mut capture = MockDisplayCapture::new();
        capture.expect_open().times(1).returning(move |_| {
            let rx = rx.lock().unwrap().take().unwrap();
            Ok(Box::new(ScriptedStream {
                rx,
                finalized: false,
                tracks_stopped: stopped.clone(),
            }) as Box<dyn CaptureStream>)
        });

        (capture, tracks_stopped, tx)
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_noop() {
        let capture = MockDisplayCapture::new();
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());

        assert!(recorder.stop().await.unwrap().is_none());
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert!(recorder.recording().is_none());
    }

    #[tokio::test]
    async fn test_record_and_stop_concatenates_chunks() {
        let (capture, tracks_stopped, _tx) = scripted_capture(&["ab", "", "cd"]);
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());

        recorder.start().await.unwrap();
        assert_eq!(recorder.state(), RecorderState::Recording);

        let recording = recorder.stop().await.unwrap().unwrap().clone();
        assert_eq!(recording.bytes, b"abcd");
        assert_eq!(recording.mime_type, "video/webm");
        assert_eq!(recorder.state(), RecorderState::Stopped);
        assert!(tracks_stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_start_while_recording_is_rejected() {
        let (capture, _stopped, _tx) = scripted_capture(&[]);
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());

        recorder.start().await.unwrap();
        assert!(matches!(recorder.start().await, Err(ToolError::AlreadyRecording)));
        assert_eq!(recorder.state(), RecorderState::Recording);
    }

    #[tokio::test]
    async fn test_denied_capture_stays_idle() {
        let mut capture = MockDisplayCapture::new();
        capture
            .expect_open()
            .returning(|_| Err(ToolError::CaptureDenied("Permission denied".to_string())));
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());

        assert!(matches!(recorder.start().await, Err(ToolError::CaptureDenied(_))));
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn test_audio_toggle_reaches_platform() {
        let mut capture = MockDisplayCapture::new();
        capture
            .expect_open()
            .withf(|c| c.video && !c.audio)
            .times(1)
            .returning(|_| Err(ToolError::CaptureDenied("no display".to_string())));
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());

        recorder.set_audio(false);
        let _ = recorder.start().await;
    }

    #[tokio::test]
    async fn test_platform_ending_stream_still_stops() {
        let (capture, tracks_stopped, tx) = scripted_capture(&["xyz"]);
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());

        recorder.start().await.unwrap();
        drop(tx);

        let recording = recorder.stop().await.unwrap().unwrap();
        assert_eq!(recording.bytes, b"xyz");
        assert!(tracks_stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropping_recorder_releases_tracks() {
        let (capture, tracks_stopped, _tx) = scripted_capture(&["ab"]);
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());

        recorder.start().await.unwrap();
        drop(recorder);

        for _ in 0..100 {
            if tracks_stopped.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(tracks_stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_download_gating() {
        let dir = tempfile::tempdir().unwrap();

        let (capture, _stopped, _tx) = scripted_capture(&["data"]);
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());
        assert!(recorder.download(dir.path()).await.unwrap().is_none());

        recorder.start().await.unwrap();
        assert!(recorder.download(dir.path()).await.unwrap().is_none());

        recorder.stop().await.unwrap();
        let path = recorder.download(dir.path()).await.unwrap().unwrap();
        assert_eq!(path.extension().unwrap(), "webm");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_empty_recording_is_not_downloadable() {
        let dir = tempfile::tempdir().unwrap();
        let (capture, _stopped, _tx) = scripted_capture(&[]);
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());

        recorder.start().await.unwrap();
        recorder.stop().await.unwrap();

        assert_eq!(recorder.state(), RecorderState::Stopped);
        assert!(recorder.download(dir.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_stop_can_be_completed() {
        use futures::FutureExt;

        let (capture, tracks_stopped, _tx) = scripted_capture(&["ab", "cd"]);
        let mut recorder = ScreenRecorder::new(Arc::new(capture), RecorderConfig::default());
        recorder.start().await.unwrap();

        // One poll, then the stop future is dropped before the join completes.
        assert!(recorder.stop().now_or_never().is_none());
        assert_eq!(recorder.state(), RecorderState::Recording);
        assert!(matches!(recorder.start().await, Err(ToolError::AlreadyRecording)));

        let recording = recorder.stop().await.unwrap().unwrap().clone();
        assert_eq!(recording.bytes, b"abcd");
        assert_eq!(recorder.state(), RecorderState::Stopped);
        assert!(tracks_stopped.load(Ordering::SeqCst));

        assert!(recorder.stop().await.unwrap().is_none());
    }
}
