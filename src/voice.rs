//! Voice-assisted search: microphone capture lifecycle.
//!
//! A capture is acquired from an `AudioSource`, buffers chunks while
//! recording, and is assembled into one clip on stop. The underlying
//! stream's tracks are stopped exactly once: on stop, on failure, or when
//! the capture is dropped.
//!
//! Over HTTP the browser owns the physical microphone and relays its
//! events (permission result, data chunks, stop); `RelayedMicrophone`
//! is the server-side stand-in for that stream.

use base64::Engine;

use crate::models::MicrophonePermission;

/// Upper bound on one recording's buffered audio. Synchronous recognition
/// rejects larger payloads anyway.
pub const MAX_CLIP_BYTES: usize = 10 * 1024 * 1024;

/// Resource failures while acquiring or running a capture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Microphone permission denied")]
    PermissionDenied,
    #[error("Audio device error: {0}")]
    Device(String),
}

/// Illegal voice transitions. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    #[error("A recording or transcription is already in progress")]
    Busy,
    #[error("Not recording")]
    NotRecording,
    #[error("Recording exceeds the {limit}-byte limit; stop to transcribe it")]
    ClipTooLarge { limit: usize },
}

/// A live audio stream whose tracks must be stopped when done.
pub trait CaptureStream: Send + Sync {
    fn stop_tracks(&mut self);
}

/// Something that can hand out a microphone stream.
pub trait AudioSource {
    fn open(&self) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

// ═══════════════════════════════════════════════════════════
// Relayed microphone (browser-held stream)
// ═══════════════════════════════════════════════════════════

/// Microphone whose permission prompt ran in the browser.
pub struct RelayedMicrophone {
    pub permission: MicrophonePermission,
}

struct RelayedStream;

impl CaptureStream for RelayedStream {
    fn stop_tracks(&mut self) {
        tracing::debug!("Relayed capture released");
    }
}

impl AudioSource for RelayedMicrophone {
    fn open(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        match self.permission {
            MicrophonePermission::Granted => Ok(Box::new(RelayedStream)),
            MicrophonePermission::Denied => Err(CaptureError::PermissionDenied),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// ActiveCapture: RAII handle over an open stream
// ═══════════════════════════════════════════════════════════

/// An open capture. Dropping it releases the stream.
pub struct ActiveCapture {
    stream: Box<dyn CaptureStream>,
    chunks: Vec<Vec<u8>>,
    buffered: usize,
    limit: usize,
    released: bool,
}

impl ActiveCapture {
    fn new(stream: Box<dyn CaptureStream>, limit: usize) -> Self {
        Self {
            stream,
            chunks: Vec::new(),
            buffered: 0,
            limit,
            released: false,
        }
    }

    /// Buffers a data-available chunk. Empty chunks are skipped; a chunk
    /// that would take the recording past its limit is rejected and the
    /// audio buffered so far is kept.
    pub fn push(&mut self, chunk: Vec<u8>) -> Result<(), VoiceError> {
        if chunk.is_empty() {
            return Ok(());
        }
        if self.buffered_bytes().saturating_add(chunk.len()) > self.limit {
            return Err(VoiceError::ClipTooLarge { limit: self.limit });
        }
        self.buffered += chunk.len();
        self.chunks.push(chunk);
        Ok(())
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffered
    }

    /// Stops the stream and assembles the buffered audio.
    pub fn finish(mut self) -> AudioClip {
        self.release();
        AudioClip {
            bytes: std::mem::take(&mut self.chunks).concat(),
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stream.stop_tracks();
        }
    }
}

impl Drop for ActiveCapture {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ActiveCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveCapture")
            .field("chunks", &self.chunks.len())
            .field("buffered", &self.buffered)
            .field("released", &self.released)
            .finish()
    }
}

/// One assembled recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    bytes: Vec<u8>,
}

impl AudioClip {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

// ═══════════════════════════════════════════════════════════
// VoiceSession: per-visitor voice state
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default)]
enum VoiceState {
    #[default]
    Idle,
    Recording(ActiveCapture),
    Transcribing,
}

/// Start/stop toggle plus the last transcript and error.
#[derive(Debug)]
pub struct VoiceSession {
    state: VoiceState,
    transcript: Option<String>,
    error: Option<String>,
    clip_limit: usize,
}

impl Default for VoiceSession {
    fn default() -> Self {
        Self::with_clip_limit(MAX_CLIP_BYTES)
    }
}

impl VoiceSession {
    pub fn with_clip_limit(clip_limit: usize) -> Self {
        Self {
            state: VoiceState::Idle,
            transcript: None,
            error: None,
            clip_limit,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, VoiceState::Recording(_))
    }

    pub fn is_transcribing(&self) -> bool {
        matches!(self.state, VoiceState::Transcribing)
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Opens a capture. Resource failures are recorded as the visible
    /// voice error (using `denied_message`) and leave the session idle.
    pub fn start(
        &mut self,
        source: &dyn AudioSource,
        denied_message: &str,
    ) -> Result<(), VoiceError> {
        if !matches!(self.state, VoiceState::Idle) {
            return Err(VoiceError::Busy);
        }
        self.error = None;
        self.transcript = None;

        match source.open() {
            Ok(stream) => {
                self.state = VoiceState::Recording(ActiveCapture::new(stream, self.clip_limit));
                tracing::debug!("Voice capture started");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Voice capture failed to start");
                self.error = Some(denied_message.to_string());
            }
        }
        Ok(())
    }

    pub fn push_chunk(&mut self, chunk: Vec<u8>) -> Result<(), VoiceError> {
        match &mut self.state {
            VoiceState::Recording(capture) => capture.push(chunk),
            _ => Err(VoiceError::NotRecording),
        }
    }

    /// Ends the capture. Returns the clip to transcribe, or `None` when
    /// nothing was recorded (the `empty_message` error is set instead).
    pub fn stop(&mut self, empty_message: &str) -> Result<Option<AudioClip>, VoiceError> {
        let capture = match std::mem::take(&mut self.state) {
            VoiceState::Recording(capture) => capture,
            other => {
                self.state = other;
                return Err(VoiceError::NotRecording);
            }
        };

        let clip = capture.finish();
        if clip.is_empty() {
            self.error = Some(empty_message.to_string());
            return Ok(None);
        }
        self.state = VoiceState::Transcribing;
        Ok(Some(clip))
    }

    /// Upstream recorder failure: release the capture and surface `message`.
    pub fn fail(&mut self, message: &str) {
        if let VoiceState::Recording(_) = self.state {
            self.state = VoiceState::Idle;
        }
        self.error = Some(message.to_string());
    }

    /// Applies a transcription outcome. Returns the transcript when one
    /// should be used as the new search query.
    pub fn complete_transcription(
        &mut self,
        outcome: Result<String, String>,
        no_speech_message: &str,
    ) -> Option<String> {
        if !self.is_transcribing() {
            return None;
        }
        self.state = VoiceState::Idle;

        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                self.transcript = Some(text.clone());
                Some(text)
            }
            Ok(_) => {
                self.error = Some(no_speech_message.to_string());
                None
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingStream(Arc<AtomicUsize>);

    impl CaptureStream for CountingStream {
        fn stop_tracks(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingSource(Arc<AtomicUsize>);

    impl AudioSource for CountingSource {
        fn open(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
            Ok(Box::new(CountingStream(self.0.clone())))
        }
    }

    fn counting() -> (CountingSource, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        (CountingSource(stops.clone()), stops)
    }

    #[test]
    fn stop_assembles_chunks_and_releases_once() {
        let (source, stops) = counting();
        let mut voice = VoiceSession::default();
        voice.start(&source, "denied").unwrap();
        voice.push_chunk(b"ab".to_vec()).unwrap();
        voice.push_chunk(Vec::new()).unwrap();
        voice.push_chunk(b"cd".to_vec()).unwrap();

        let clip = voice.stop("empty").unwrap().unwrap();
        assert_eq!(clip.to_base64(), "YWJjZA==");
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(voice.is_transcribing());
        assert!(!voice.is_recording());
    }

    #[test]
    fn chunks_past_the_clip_limit_are_rejected() {
        let (source, stops) = counting();
        let mut voice = VoiceSession::with_clip_limit(8);
        voice.start(&source, "denied").unwrap();
        voice.push_chunk(vec![1; 5]).unwrap();
        assert_eq!(
            voice.push_chunk(vec![2; 4]),
            Err(VoiceError::ClipTooLarge { limit: 8 })
        );
        voice.push_chunk(vec![3; 3]).unwrap();
        assert_eq!(
            voice.push_chunk(vec![4]),
            Err(VoiceError::ClipTooLarge { limit: 8 })
        );
        assert!(voice.is_recording());

        let clip = voice.stop("empty").unwrap().unwrap();
        assert_eq!(clip.len(), 8);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_clip_limit_bounds_buffered_audio() {
        let (source, _) = counting();
        let mut voice = VoiceSession::default();
        voice.start(&source, "denied").unwrap();
        let chunk = vec![0u8; 1024 * 1024];
        let mut accepted = 0;
        while voice.push_chunk(chunk.clone()).is_ok() {
            accepted += 1;
            assert!(accepted <= 64);
        }
        assert_eq!(accepted * chunk.len(), MAX_CLIP_BYTES);
    }

    #[test]
    fn dropping_a_capture_releases_tracks() {
        let (source, stops) = counting();
        {
            let mut voice = VoiceSession::default();
            voice.start(&source, "denied").unwrap();
        }
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn upstream_failure_releases_tracks_once() {
        let (source, stops) = counting();
        let mut voice = VoiceSession::default();
        voice.start(&source, "denied").unwrap();
        voice.fail("recorder crashed");
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(voice.error(), Some("recorder crashed"));
        assert!(!voice.is_recording());
        drop(voice);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn permission_denied_sets_error_and_stays_idle() {
        let mut voice = VoiceSession::default();
        let mic = RelayedMicrophone {
            permission: MicrophonePermission::Denied,
        };
        voice.start(&mic, "Please allow microphone access.").unwrap();
        assert!(!voice.is_recording());
        assert_eq!(voice.error(), Some("Please allow microphone access."));
        assert!(voice.transcript().is_none());
    }

    #[test]
    fn second_start_while_recording_is_rejected() {
        let (source, stops) = counting();
        let mut voice = VoiceSession::default();
        voice.start(&source, "denied").unwrap();
        assert_eq!(voice.start(&source, "denied"), Err(VoiceError::Busy));
        assert!(voice.is_recording());
        assert_eq!(stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_recording_reports_no_speech() {
        let (source, _) = counting();
        let mut voice = VoiceSession::default();
        voice.start(&source, "denied").unwrap();
        assert_eq!(voice.stop("nothing heard").unwrap(), None);
        assert_eq!(voice.error(), Some("nothing heard"));
        assert!(!voice.is_transcribing());
    }

    #[test]
    fn stop_without_recording_is_rejected() {
        let mut voice = VoiceSession::default();
        assert_eq!(voice.stop("empty"), Err(VoiceError::NotRecording));
        assert_eq!(voice.push_chunk(vec![1]), Err(VoiceError::NotRecording));
    }

    #[test]
    fn transcription_outcomes() {
        let (source, _) = counting();
        let mut voice = VoiceSession::default();

        voice.start(&source, "denied").unwrap();
        voice.push_chunk(vec![1, 2, 3]).unwrap();
        voice.stop("empty").unwrap();
        assert_eq!(
            voice.complete_transcription(Ok("fever".into()), "no speech"),
            Some("fever".to_string())
        );
        assert_eq!(voice.transcript(), Some("fever"));

        voice.start(&source, "denied").unwrap();
        voice.push_chunk(vec![1]).unwrap();
        voice.stop("empty").unwrap();
        assert_eq!(voice.complete_transcription(Ok("  ".into()), "no speech"), None);
        assert_eq!(voice.error(), Some("no speech"));

        voice.start(&source, "denied").unwrap();
        voice.push_chunk(vec![1]).unwrap();
        voice.stop("empty").unwrap();
        assert_eq!(
            voice.complete_transcription(Err("network down".into()), "no speech"),
            None
        );
        assert_eq!(voice.error(), Some("network down"));
        assert!(!voice.is_transcribing());

        voice.dismiss_error();
        assert!(voice.error().is_none());
    }

    #[test]
    fn late_transcription_is_ignored_when_idle() {
        let mut voice = VoiceSession::default();
        assert_eq!(voice.complete_transcription(Ok("fever".into()), "x"), None);
        assert!(voice.transcript().is_none());
    }
}
