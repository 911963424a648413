use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use pbn_canvas::persist::{NewPainting, PaintingId, PaintingRecord, PaintingStore, ProgressUpdate, StoreError, UserId};
use pbn_canvas::session::{ImagePayload, ImageProcessor};
use pbn_canvas::{
    fixture_image, wire, BoardCatalog, BoardFilter, Canvas, CanvasConfig, Difficulty, FixtureProcessor,
    PaintableImage, ProcessingSession,
};
use pbn_engine::input::InputEvent;

use crate::cli::{Command, SaveArgs, ViewArgs};
use crate::export::{load_font, Exporter};
use crate::processor::{mime_for, process_with_timeout, JsonFileProcessor};
use crate::script;
use crate::store::FileStore;

const DEFAULT_TITLE: &str = "Untitled painting";

pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Render { painting, output, view } => render(painting.as_deref(), &output, &view).await,
        Command::Process { image, board, result, timeout_ms, output } => {
            let payload = payload_for(image.as_deref(), board.as_deref()).await?;
            process(payload, &result, Duration::from_millis(timeout_ms), &output).await
        }
        Command::Replay { painting, script, output, save, view } => {
            replay(painting.as_deref(), &script, output.as_deref(), &save, &view).await
        }
        Command::Boards { category, search, difficulty } => boards(category, search, difficulty),
        Command::List { store, user } => list(&store, user).await,
        Command::Demo { output, delay_ms, timeout_ms, view } => {
            demo(&output, Duration::from_millis(delay_ms), Duration::from_millis(timeout_ms), &view).await
        }
    }
}

async fn load_painting(path: Option<&Path>, config: &CanvasConfig) -> Result<PaintableImage> {
    match path {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            wire::from_json(&text, config.flatten_tolerance).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(fixture_image()?),
    }
}

fn exporter(view: &ViewArgs) -> Result<Exporter> {
    Ok(Exporter::new(&load_font(view.font.as_deref())?))
}

fn print_progress(canvas: &Canvas) {
    let regions = canvas.image().regions();
    println!(
        "  progress   {}/{} regions ({:.0}%)",
        regions.painted_count(),
        regions.len(),
        canvas.completion_ratio() * 100.0
    );
    for usage in canvas.color_usage() {
        println!("  {:>3}  {:<8} {:<14} {:>3}%", usage.index, usage.color.to_hex(), usage.label, usage.percent);
    }
}

// ── render ────────────────────────────────────────────────────────────────

async fn render(painting: Option<&Path>, output: &Path, view: &ViewArgs) -> Result<()> {
    let config = view.canvas_config();
    let canvas = Canvas::new(load_painting(painting, &config).await?, config);
    exporter(view)?.write_png(&canvas, output)?;
    print_progress(&canvas);
    Ok(())
}

// ── process ───────────────────────────────────────────────────────────────

/// Reads an upload, or resolves a catalog board to its image URL.
async fn payload_for(image: Option<&Path>, board: Option<&str>) -> Result<ImagePayload> {
    if let Some(id) = board {
        let catalog = BoardCatalog::builtin()?;
        let board = catalog.board(id).with_context(|| format!("no board with id {:?}", id))?;
        log::info!("starting from board {} ({})", board.id, board.title);
        return Ok(ImagePayload::remote(board.image_url.clone()));
    }
    let Some(image) = image else {
        bail!("either an image or a board is required");
    };
    let mime = mime_for(image);
    if !mime.starts_with("image/") {
        bail!("{} is not an image file", image.display());
    }
    let bytes = tokio::fs::read(image).await.with_context(|| format!("reading {}", image.display()))?;
    Ok(ImagePayload::new(bytes, mime))
}

async fn process(payload: ImagePayload, result: &Path, timeout: Duration, output: &Path) -> Result<()> {
    let config = CanvasConfig::default();
    let processor = JsonFileProcessor::new(result).with_tolerance(config.flatten_tolerance);
    if !processor.health().await {
        log::warn!("processor source {} is not reachable", result.display());
    }

    let mut session = ProcessingSession::new(config);
    process_with_timeout(&mut session, &processor, payload, timeout).await?;
    let canvas = session.canvas().context("processing finished without a painting")?;

    tokio::fs::write(output, wire::to_json(canvas.image())?)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    log::info!("wrote painting to {}", output.display());
    println!("  regions    {}", canvas.image().regions().len());
    println!("  colors     {}", canvas.palette().len());
    Ok(())
}

// ── replay ────────────────────────────────────────────────────────────────

async fn replay(
    painting: Option<&Path>,
    script_path: &Path,
    output: Option<&Path>,
    save: &SaveArgs,
    view: &ViewArgs,
) -> Result<()> {
    let config = view.canvas_config();
    let resumed = match (&save.store, &save.painting_id) {
        (Some(store_path), Some(id)) => Some(open_owned(store_path, save, id).await?),
        _ => None,
    };
    let image = match &resumed {
        Some((_, record)) => {
            if painting.is_some() {
                log::warn!("resuming painting {}; ignoring the painting file", record.id);
            }
            record.image(config.flatten_tolerance)?
        }
        None => load_painting(painting, &config).await?,
    };
    let mut canvas = Canvas::new(image, config);

    let text = tokio::fs::read_to_string(script_path)
        .await
        .with_context(|| format!("reading {}", script_path.display()))?;
    let steps = script::parse(&text)?;
    let report = script::replay(&mut canvas, &steps)?;
    println!(
        "  replayed   {} steps: {} painted, {} wrong color, {} brush dabs",
        steps.len(),
        report.painted,
        report.wrong_color,
        report.brushed
    );
    print_progress(&canvas);

    if let Some(output) = output {
        exporter(view)?.write_png(&canvas, output)?;
    }

    let record = match (resumed, &save.store) {
        (Some((store, current)), _) => {
            let mut update = ProgressUpdate::from_image(canvas.image())?;
            if let Some(title) = &save.title {
                update = update.with_title(title.clone());
            }
            store.update(current.id, update).await?
        }
        (None, Some(store_path)) => {
            let store = FileStore::open(store_path).await?;
            let user = save.user.clone().map(UserId::new);
            let title = save.title.as_deref().unwrap_or(DEFAULT_TITLE);
            let draft = NewPainting::from_image(title, canvas.image().background_url(), canvas.image())?;
            store.save(user.as_ref(), draft).await?
        }
        (None, None) => return Ok(()),
    };
    println!("  saved      {} ({}% complete)", record.id, record.completion_percentage);
    Ok(())
}

/// Opens the store and fetches `id`, which must belong to the signed-in user.
async fn open_owned(store_path: &Path, save: &SaveArgs, id: &str) -> Result<(FileStore, PaintingRecord)> {
    let id = PaintingId(id.parse().with_context(|| format!("{:?} is not a painting id", id))?);
    let user = save.user.clone().map(UserId::new).ok_or(StoreError::NotAuthenticated)?;
    let store = FileStore::open(store_path).await?;
    let record = store.get(id).await?;
    if record.user_id != user {
        bail!("painting {} does not belong to this user", id);
    }
    Ok((store, record))
}

// ── boards ────────────────────────────────────────────────────────────────

fn boards(category: Option<String>, search: Option<String>, difficulty: Option<Difficulty>) -> Result<()> {
    let catalog = BoardCatalog::builtin()?;
    if let Some(id) = &category {
        if catalog.category(id).is_none() {
            let known: Vec<_> = catalog.categories().iter().map(|c| c.id.as_str()).collect();
            bail!("no category {:?} (one of {})", id, known.join(", "));
        }
    }
    let found = catalog.search(&BoardFilter { category, search, difficulty });
    println!("  {} board{}", found.len(), if found.len() == 1 { "" } else { "s" });
    for b in found {
        println!("  {:<16} {:<28} {:<7} {:>7}  {:>2} colors", b.id, b.title, b.difficulty, b.estimated_time, b.colors);
    }
    Ok(())
}

// ── list ──────────────────────────────────────────────────────────────────

async fn list(store_path: &Path, user: Option<String>) -> Result<()> {
    let store = FileStore::open(store_path).await?;
    let user = user.map(UserId::new);
    let records = store.list_for_user(user.as_ref()).await?;
    if records.is_empty() {
        println!("  no saved paintings");
    }
    for r in records {
        let done = if r.is_completed { "done" } else { "" };
        println!("  {}  {:>3}%  {:<24} {}", r.id, r.completion_percentage, r.title, done);
    }
    Ok(())
}

// ── demo ──────────────────────────────────────────────────────────────────

async fn demo(output: &Path, delay: Duration, timeout: Duration, view: &ViewArgs) -> Result<()> {
    let mut session = ProcessingSession::new(view.canvas_config());
    let processor = FixtureProcessor::new().with_delay(delay);
    process_with_timeout(&mut session, &processor, ImagePayload::new(Vec::new(), "image/jpeg"), timeout).await?;
    let Some(canvas) = session.canvas_mut() else {
        bail!("processing finished without a painting");
    };

    // Paint every region that needs the first color, at its label anchor.
    let first = canvas.palette().entries().first().map(|e| e.index).context("demo palette is empty")?;
    canvas.select_color(first)?;
    let anchors: Vec<_> = canvas
        .image()
        .regions()
        .iter()
        .filter(|r| r.target_color_index == first)
        .map(pbn_canvas::render::label_anchor)
        .collect();
    for p in anchors {
        canvas.handle(&InputEvent::press(p.x, p.y));
        canvas.handle(&InputEvent::release(p.x, p.y));
    }

    exporter(view)?.write_png(canvas, output)?;
    print_progress(canvas);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewArgs {
        ViewArgs { no_numbers: false, brush_size: 10.0, font: None }
    }

    fn save_args(store: &Path, user: Option<&str>, id: Option<String>) -> SaveArgs {
        SaveArgs {
            store: Some(store.to_path_buf()),
            user: user.map(str::to_string),
            title: Some("Test".into()),
            painting_id: id,
        }
    }

    #[tokio::test]
    async fn demo_writes_frame() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("demo.png");
        demo(&out, Duration::ZERO, Duration::from_secs(5), &view()).await.unwrap();
        assert!(out.exists());
    }

    #[tokio::test]
    async fn demo_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("demo.png");
        let err = demo(&out, Duration::from_millis(200), Duration::from_millis(5), &view()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("processing failed"));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn replay_saves_then_updates() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        std::fs::write(&script_path, r#"[{"select": 1}, {"down": {"x": 130, "y": 130}}, "up"]"#).unwrap();
        let store_path = dir.path().join("store.json");

        replay(None, &script_path, None, &save_args(&store_path, Some("alice"), None), &view()).await.unwrap();

        let store = FileStore::open(&store_path).await.unwrap();
        let saved = store.list_for_user(Some(&UserId::new("alice"))).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].completion_percentage, 11);

        let id = saved[0].id.to_string();
        replay(None, &script_path, None, &save_args(&store_path, Some("alice"), Some(id.clone())), &view())
            .await
            .unwrap();
        let err = replay(None, &script_path, None, &save_args(&store_path, Some("bob"), Some(id)), &view())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not belong"));
    }

    #[tokio::test]
    async fn saving_requires_user() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        std::fs::write(&script_path, "[]").unwrap();
        let err = replay(None, &script_path, None, &save_args(&dir.path().join("s.json"), None, None), &view())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("not authenticated"));
    }

    #[tokio::test]
    async fn process_writes_painting() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("photo.jpg");
        std::fs::write(&photo, [0xff, 0xd8, 0xff]).unwrap();
        let result = dir.path().join("result.json");
        std::fs::write(
            &result,
            r##"{ "regions": [], "colors": [{ "number": 1, "hex": "#000000", "name": "Black" }],
                  "dimensions": { "width": 4, "height": 4 } }"##,
        )
        .unwrap();
        let out = dir.path().join("painting.json");

        let payload = payload_for(Some(photo.as_path()), None).await.unwrap();
        process(payload, &result, Duration::from_secs(5), &out).await.unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        let image = wire::from_json(&written, 0.25).unwrap();
        assert!(image.background_url().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn resumed_replay_accumulates_progress() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("store.json");
        let first = dir.path().join("first.json");
        std::fs::write(&first, r#"[{"select": 1}, {"down": {"x": 130, "y": 130}}, "up"]"#).unwrap();
        replay(None, &first, None, &save_args(&store_path, Some("alice"), None), &view()).await.unwrap();

        let store = FileStore::open(&store_path).await.unwrap();
        let id = store.list_for_user(Some(&UserId::new("alice"))).await.unwrap()[0].id;
        drop(store);

        let second = dir.path().join("second.json");
        std::fs::write(&second, r#"[{"select": 2}, {"down": {"x": 270, "y": 140}}, "up"]"#).unwrap();
        let mut args = save_args(&store_path, Some("alice"), Some(id.to_string()));
        args.title = None;
        replay(None, &second, None, &args, &view()).await.unwrap();

        let record = FileStore::open(&store_path).await.unwrap().get(id).await.unwrap();
        assert_eq!(record.completion_percentage, 22);
        assert_eq!(record.title, "Test");
        let image = record.image(0.25).unwrap();
        let painted: Vec<_> = image.regions().iter().filter(|r| r.is_painted()).map(|r| r.id).collect();
        assert_eq!(painted, vec![1, 2]);
    }

    #[tokio::test]
    async fn resuming_needs_a_user() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        std::fs::write(&script_path, "[]").unwrap();
        let id = PaintingId::new().to_string();
        let err = replay(None, &script_path, None, &save_args(&dir.path().join("s.json"), None, Some(id)), &view())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("not authenticated"));
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "hello").unwrap();
        let err = payload_for(Some(notes.as_path()), None).await.unwrap_err();
        assert!(err.to_string().contains("is not an image"));
    }

    #[tokio::test]
    async fn board_source_becomes_background() {
        let dir = tempfile::tempdir().unwrap();
        let result = dir.path().join("result.json");
        std::fs::write(
            &result,
            r##"{ "regions": [], "colors": [{ "number": 1, "hex": "#000000", "name": "Black" }],
                  "dimensions": { "width": 4, "height": 4 } }"##,
        )
        .unwrap();
        let out = dir.path().join("painting.json");

        let payload = payload_for(None, Some("cat-1")).await.unwrap();
        process(payload, &result, Duration::from_secs(5), &out).await.unwrap();
        let image = wire::from_json(&std::fs::read_to_string(&out).unwrap(), 0.25).unwrap();
        assert!(image.background_url().contains("kitty-cat-kitten"));

        let err = payload_for(None, Some("unicorn-9")).await.unwrap_err();
        assert!(err.to_string().contains("no board"));
    }

    #[test]
    fn boards_rejects_unknown_category() {
        assert!(boards(None, Some("cat".into()), None).is_ok());
        let err = boards(Some("dinosaurs".into()), None, None).unwrap_err();
        assert!(err.to_string().contains("no category"));
    }
}
