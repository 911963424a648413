use std::path::{Path, PathBuf};
use std::time::Duration;

use pbn_canvas::session::{ImagePayload, ImageProcessor, ProcessingError, RequestToken};
use pbn_canvas::wire::WireImage;
use pbn_canvas::{Completion, PaintableImage, ProcessingSession};
use pbn_engine::geom::DEFAULT_FLATTEN_TOLERANCE;

/// Processor that answers every request with a painting read from disk.
///
/// When the file carries no `processedImageUrl`, the source image
/// becomes the background: its data URL, or the board URL for catalog boards.
#[derive(Debug, Clone)]
pub struct JsonFileProcessor {
    path: PathBuf,
    tolerance: f32,
}

impl JsonFileProcessor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), tolerance: DEFAULT_FLATTEN_TOLERANCE }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl ImageProcessor for JsonFileProcessor {
    async fn process(&self, image: ImagePayload) -> Result<PaintableImage, ProcessingError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ProcessingError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        let mut wire: WireImage =
            serde_json::from_str(&text).map_err(|e| ProcessingError::InvalidResult(e.to_string()))?;
        if wire.processed_image_url.is_empty() {
            wire.processed_image_url = image.source_url();
        }
        Ok(wire.into_image(self.tolerance)?)
    }

    async fn health(&self) -> bool {
        tokio::fs::metadata(&self.path).await.is_ok()
    }
}

/// Runs one request through `session`, giving up after `timeout`.
///
/// Expiry is reported to the session as a processing failure.
pub async fn process_with_timeout<P: ImageProcessor>(
    session: &mut ProcessingSession,
    processor: &P,
    image: ImagePayload,
    timeout: Duration,
) -> pbn_canvas::Result<Completion> {
    let token: RequestToken = session.begin();
    log::info!("processing request {} ({} bytes, {})", token.get(), image.bytes.len(), image.mime);
    let result = match tokio::time::timeout(timeout, processor.process(image)).await {
        Ok(result) => result,
        Err(_) => Err(ProcessingError::TimedOut(timeout)),
    };
    session.complete(token, result)
}

/// MIME type from a file extension; `application/octet-stream` when unknown.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pbn_canvas::{CanvasConfig, CanvasError, FixtureProcessor, ProcessingState};

    use super::*;

    const PAINTING: &str = r##"{
        "regions": [{ "id": 1, "colorNumber": 1, "path": "M0,0 H10 V10 H0 Z" }],
        "colors": [{ "number": 1, "hex": "#112233", "name": "Navy" }],
        "dimensions": { "width": 10, "height": 10 }
    }"##;

    fn painting_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn payload() -> ImagePayload {
        ImagePayload::new(vec![0xff, 0xd8], "image/jpeg")
    }

    #[tokio::test]
    async fn answers_with_file_contents() {
        let file = painting_file(PAINTING);
        let processor = JsonFileProcessor::new(file.path());
        assert!(processor.health().await);

        let image = processor.process(payload()).await.unwrap();
        assert_eq!(image.regions().len(), 1);
        assert_eq!(image.background_url(), "data:image/jpeg;base64,/9g=");
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let processor = JsonFileProcessor::new(dir.path().join("nope.json"));
        assert!(!processor.health().await);
        assert!(matches!(processor.process(payload()).await, Err(ProcessingError::Unavailable(_))));
    }

    #[tokio::test]
    async fn invalid_painting_is_reported() {
        let file = painting_file(&PAINTING.replace("\"colorNumber\": 1", "\"colorNumber\": 4"));
        let result = JsonFileProcessor::new(file.path()).process(payload()).await;
        assert!(matches!(result, Err(ProcessingError::InvalidResult(_))));
    }

    #[tokio::test]
    async fn timeout_becomes_processing_failure() {
        let mut session = ProcessingSession::new(CanvasConfig::default());
        let slow = FixtureProcessor::new().with_delay(Duration::from_millis(200));
        let err = process_with_timeout(&mut session, &slow, payload(), Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, CanvasError::ProcessingFailed(_)));
        assert!(matches!(session.state(), ProcessingState::Failed(_)));
        assert!(session.canvas().is_none());
    }

    #[tokio::test]
    async fn within_timeout_loads_canvas() {
        let mut session = ProcessingSession::new(CanvasConfig::default());
        let done = process_with_timeout(&mut session, &FixtureProcessor::new(), payload(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(done, Completion::Applied);
        assert!(session.canvas().is_some());
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("b.png")), "image/png");
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }
}
