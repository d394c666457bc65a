use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::storage::AUDIO_CONTENT_TYPE;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Could not access microphone. Please ensure you have granted microphone permissions.")]
    PermissionDenied,

    #[error("capture device unavailable: {0}")]
    Unavailable(String),
}

/// Source of microphone sessions.
pub trait MediaCapture: Send {
    type Stream: CaptureStream;

    fn open(&mut self) -> Result<Self::Stream, CaptureError>;
}

/// A live capture session. Dropping it releases the device.
pub trait CaptureStream: Send {
    /// Ends capture and returns every chunk recorded since `open`.
    fn finish(self) -> Vec<Bytes>;
}

/// One finished recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub bytes: Bytes,
    pub content_type: &'static str,
}

impl AudioBlob {
    pub fn webm(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: AUDIO_CONTENT_TYPE,
        }
    }

    fn from_chunks(chunks: Vec<Bytes>) -> Self {
        let mut buf = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
        for chunk in chunks.into_iter().filter(|c| !c.is_empty()) {
            buf.extend_from_slice(&chunk);
        }
        Self::webm(buf.freeze())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Ready,
    Recording,
    Recorded,
}

/// Microphone recorder for a single question.
///
/// Holds at most one capture stream and one tick task; both are released on
/// `stop`, `reset`, or drop. Must be used inside a Tokio runtime.
pub struct Recorder<C: MediaCapture> {
    capture: C,
    stream: Option<C::Stream>,
    ticker: Option<JoinHandle<()>>,
    elapsed: Arc<AtomicU64>,
    blob: Option<AudioBlob>,
}

impl<C: MediaCapture> Recorder<C> {
    pub fn new(capture: C) -> Self {
        Self {
            capture,
            stream: None,
            ticker: None,
            elapsed: Arc::new(AtomicU64::new(0)),
            blob: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        if self.stream.is_some() {
            RecorderState::Recording
        } else if self.blob.is_some() {
            RecorderState::Recorded
        } else {
            RecorderState::Ready
        }
    }

    pub fn blob(&self) -> Option<&AudioBlob> {
        self.blob.as_ref()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// Elapsed time as `m:ss`.
    pub fn elapsed_display(&self) -> String {
        format_time(self.elapsed_secs())
    }

    /// Opens the microphone and starts the elapsed-time tick. No-op while
    /// already recording.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = self.capture.open()?;
        self.blob = None;
        self.stream = Some(stream);
        self.elapsed.store(0, Ordering::Relaxed);
        self.ticker = Some(spawn_ticker(self.elapsed.clone()));
        debug!("Recording started");
        Ok(())
    }

    /// Finalizes the recording and releases the microphone.
    pub fn stop(&mut self) -> Option<&AudioBlob> {
        let stream = self.stream.take()?;
        self.stop_ticker();
        let blob = AudioBlob::from_chunks(stream.finish());
        debug!(
            "Recording stopped after {}s ({} bytes)",
            self.elapsed_secs(),
            blob.bytes.len()
        );
        self.blob = Some(blob);
        self.blob.as_ref()
    }

    /// Discards the current recording and immediately records again.
    pub fn rerecord(&mut self) -> Result<(), CaptureError> {
        self.reset();
        self.start()
    }

    /// Back to `Ready`: releases any live capture and drops the recording.
    pub fn reset(&mut self) {
        self.stop_ticker();
        self.stream = None;
        self.blob = None;
        self.elapsed.store(0, Ordering::Relaxed);
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl<C: MediaCapture> Drop for Recorder<C> {
    fn drop(&mut self) {
        self.stop_ticker();
        self.stream = None;
    }
}

fn spawn_ticker(elapsed: Arc<AtomicU64>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK);
        interval.tick().await; // the first tick fires immediately
        loop {
            interval.tick().await;
            elapsed.fetch_add(1, Ordering::Relaxed);
        }
    })
}

/// Formats seconds as `m:ss`.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
