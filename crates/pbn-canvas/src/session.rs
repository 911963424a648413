//! Image processing requests and the stale-result guard.
//!
//! Each request gets a [`RequestToken`]; only the most recent one is live.
//! A result is applied only if its token is still live when it arrives, so
//! a slow early request can never overwrite a newer painting.

use std::future::Future;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use pbn_engine::geom::DEFAULT_FLATTEN_TOLERANCE;
use thiserror::Error;
use tokio::sync::watch;

use crate::canvas::Canvas;
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};
use crate::image::PaintableImage;
use crate::wire;

/// Identifies one processing request. Later requests compare greater.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Observable state of the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProcessingState {
    /// Nothing requested yet, or the last request was cancelled.
    #[default]
    Idle,
    Pending(RequestToken),
    /// The last request succeeded and its painting is loaded.
    Ready,
    Failed(String),
}

/// What happened to a result handed to [`ProcessingSession::complete`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Completion {
    Applied,
    /// The token was superseded or cancelled; the result was dropped.
    StaleResultDiscarded,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("invalid result: {0}")]
    InvalidResult(String),
}

impl From<CanvasError> for ProcessingError {
    fn from(e: CanvasError) -> Self {
        ProcessingError::InvalidResult(e.to_string())
    }
}

/// Image handed to the processing service.
///
/// Either uploaded bytes or, for a catalog board, a remote URL the service
/// fetches itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/jpeg`.
    pub mime: String,
    pub remote_url: Option<String>,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self { bytes, mime: mime.into(), remote_url: None }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self { bytes: Vec::new(), mime: "image/jpeg".into(), remote_url: Some(url.into()) }
    }

    /// `data:<mime>;base64,<bytes>`
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Where the original image can be loaded from: the remote URL when
    /// there is one, the data URL otherwise.
    pub fn source_url(&self) -> String {
        self.remote_url.clone().unwrap_or_else(|| self.data_url())
    }
}

/// The image processing collaborator.
pub trait ImageProcessor: Send + Sync {
    /// Turns an uploaded image into a paintable image.
    fn process(
        &self,
        image: ImagePayload,
    ) -> impl Future<Output = std::result::Result<PaintableImage, ProcessingError>> + Send;

    /// Whether the service is reachable.
    fn health(&self) -> impl Future<Output = bool> + Send;
}

// ── session ───────────────────────────────────────────────────────────────

/// Owns the current canvas and the single live processing request.
pub struct ProcessingSession {
    next_token: u64,
    live: Option<RequestToken>,
    state: watch::Sender<ProcessingState>,
    canvas: Option<Canvas>,
    config: CanvasConfig,
}

impl ProcessingSession {
    pub fn new(config: CanvasConfig) -> Self {
        let (state, _) = watch::channel(ProcessingState::Idle);
        Self { next_token: 0, live: None, state, canvas: None, config }
    }

    /// Receives every state change.
    pub fn subscribe(&self) -> watch::Receiver<ProcessingState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ProcessingState {
        self.state.borrow().clone()
    }

    #[inline]
    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    #[inline]
    pub fn canvas_mut(&mut self) -> Option<&mut Canvas> {
        self.canvas.as_mut()
    }

    /// Issues a new token and makes it the only live one.
    pub fn begin(&mut self) -> RequestToken {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        if let Some(old) = self.live.replace(token) {
            log::debug!("request {} superseded by {}", old.0, token.0);
        }
        self.state.send_replace(ProcessingState::Pending(token));
        token
    }

    /// Kills the live token, e.g. when the user navigates away.
    pub fn cancel(&mut self) {
        if let Some(token) = self.live.take() {
            log::debug!("request {} cancelled", token.0);
            self.state.send_replace(ProcessingState::Idle);
        }
    }

    /// Applies `result` if `token` is still live.
    ///
    /// A failure of the live request is returned as `ProcessingFailed`; the
    /// current canvas stays as it was so the user can retry.
    pub fn complete(
        &mut self,
        token: RequestToken,
        result: std::result::Result<PaintableImage, ProcessingError>,
    ) -> Result<Completion> {
        if self.live != Some(token) {
            log::debug!("discarding stale result for request {}", token.0);
            return Ok(Completion::StaleResultDiscarded);
        }
        self.live = None;

        match result {
            Ok(image) => {
                match &mut self.canvas {
                    Some(canvas) => canvas.replace_image(image),
                    None => self.canvas = Some(Canvas::new(image, self.config.clone())),
                }
                self.state.send_replace(ProcessingState::Ready);
                Ok(Completion::Applied)
            }
            Err(e) => {
                log::warn!("processing request {} failed: {}", token.0, e);
                self.state.send_replace(ProcessingState::Failed(e.to_string()));
                Err(CanvasError::ProcessingFailed(e.to_string()))
            }
        }
    }

    /// Runs one request start to finish.
    pub async fn process<P: ImageProcessor>(&mut self, processor: &P, image: ImagePayload) -> Result<Completion> {
        let token = self.begin();
        log::info!("processing {} byte {} image (request {})", image.bytes.len(), image.mime, token.0);
        let result = processor.process(image).await;
        self.complete(token, result)
    }
}

// ── fixture processor ─────────────────────────────────────────────────────

/// Nine rounded blobs over six colors on an 800×600 canvas.
const FIXTURE_JSON: &str = r##"{
    "processedImageUrl": "https://images.pexels.com/photos/1109541/pexels-photo-1109541.jpeg?auto=compress&cs=tinysrgb&w=800&h=600",
    "regions": [
        { "id": 1, "colorNumber": 1, "path": "M80,80 Q130,60 180,80 Q200,130 180,180 Q130,200 80,180 Q60,130 80,80 Z" },
        { "id": 2, "colorNumber": 2, "path": "M220,90 Q270,70 320,90 Q340,140 320,190 Q270,210 220,190 Q200,140 220,90 Z" },
        { "id": 3, "colorNumber": 3, "path": "M380,100 Q430,80 480,100 Q500,150 480,200 Q430,220 380,200 Q360,150 380,100 Z" },
        { "id": 4, "colorNumber": 4, "path": "M100,240 Q150,220 200,240 Q220,290 200,340 Q150,360 100,340 Q80,290 100,240 Z" },
        { "id": 5, "colorNumber": 5, "path": "M260,250 Q310,230 360,250 Q380,300 360,350 Q310,370 260,350 Q240,300 260,250 Z" },
        { "id": 6, "colorNumber": 6, "path": "M420,260 Q470,240 520,260 Q540,310 520,360 Q470,380 420,360 Q400,310 420,260 Z" },
        { "id": 7, "colorNumber": 1, "path": "M60,400 Q110,380 160,400 Q180,450 160,500 Q110,520 60,500 Q40,450 60,400 Z" },
        { "id": 8, "colorNumber": 2, "path": "M200,410 Q250,390 300,410 Q320,460 300,510 Q250,530 200,510 Q180,460 200,410 Z" },
        { "id": 9, "colorNumber": 3, "path": "M340,420 Q390,400 440,420 Q460,470 440,520 Q390,540 340,520 Q320,470 340,420 Z" }
    ],
    "colors": [
        { "number": 1, "hex": "#FF6B6B", "name": "Coral Red" },
        { "number": 2, "hex": "#4ECDC4", "name": "Turquoise" },
        { "number": 3, "hex": "#45B7D1", "name": "Sky Blue" },
        { "number": 4, "hex": "#96CEB4", "name": "Mint Green" },
        { "number": 5, "hex": "#FFEAA7", "name": "Warm Yellow" },
        { "number": 6, "hex": "#DDA0DD", "name": "Plum" }
    ],
    "dimensions": { "width": 800, "height": 600 }
}"##;

/// The built-in demo painting.
pub fn fixture_image() -> Result<PaintableImage> {
    wire::from_json(FIXTURE_JSON, DEFAULT_FLATTEN_TOLERANCE)
}

/// Processor that ignores its input and returns the demo painting, after
/// an optional delay. Stands in for the real service in tests and demos.
#[derive(Debug, Clone, Default)]
pub struct FixtureProcessor {
    delay: Option<Duration>,
    fail_with: Option<String>,
}

impl FixtureProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every request fail with `reason`.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.fail_with = Some(reason.into());
        self
    }
}

impl ImageProcessor for FixtureProcessor {
    async fn process(&self, _image: ImagePayload) -> std::result::Result<PaintableImage, ProcessingError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.fail_with {
            return Err(ProcessingError::Failed(reason.clone()));
        }
        Ok(fixture_image()?)
    }

    async fn health(&self) -> bool {
        self.fail_with.is_none()
    }
}
