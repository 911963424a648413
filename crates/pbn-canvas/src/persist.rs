//! Saving and loading painting progress.
//!
//! The datastore is an outside collaborator; [`PaintingStore`] is its
//! contract and [`MemoryStore`] an in-process implementation. Completion is
//! always recomputed from the region model at save time.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::image::PaintableImage;
use crate::wire;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaintingId(pub Uuid);

impl PaintingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PaintingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaintingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque identity of the signed-in user.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("user not authenticated")]
    NotAuthenticated,

    #[error("painting {0} not found")]
    NotFound(PaintingId),

    #[error("backend error: {0}")]
    Backend(String),
}

/// `round(ratio * 100)`, clamped to `0..=100`.
pub fn completion_percentage(ratio: f32) -> u8 {
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// A painting about to be saved for the first time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPainting {
    pub title: String,
    pub original_image_url: String,
    pub processed_image_url: Option<String>,
    pub painting_data: serde_json::Value,
    pub completion_percentage: u8,
}

impl NewPainting {
    pub fn from_image(
        title: impl Into<String>,
        original_image_url: impl Into<String>,
        image: &PaintableImage,
    ) -> crate::Result<Self> {
        let processed = image.background_url();
        Ok(Self {
            title: title.into(),
            original_image_url: original_image_url.into(),
            processed_image_url: (!processed.is_empty()).then(|| processed.to_string()),
            painting_data: wire::to_value(image)?,
            completion_percentage: completion_percentage(image.regions().completion_ratio()),
        })
    }
}

/// New progress for an existing painting.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub painting_data: serde_json::Value,
    pub completion_percentage: u8,
    /// Replaces the title when set.
    pub title: Option<String>,
}

impl ProgressUpdate {
    pub fn from_image(image: &PaintableImage) -> crate::Result<Self> {
        Ok(Self {
            painting_data: wire::to_value(image)?,
            completion_percentage: completion_percentage(image.regions().completion_ratio()),
            title: None,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A stored painting. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintingRecord {
    pub id: PaintingId,
    pub user_id: UserId,
    pub title: String,
    pub original_image_url: String,
    pub processed_image_url: Option<String>,
    pub painting_data: serde_json::Value,
    pub completion_percentage: u8,
    pub is_completed: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl PaintingRecord {
    /// Rebuilds the painting, paint state included.
    pub fn image(&self, tolerance: f32) -> crate::Result<PaintableImage> {
        wire::from_value(self.painting_data.clone(), tolerance)
    }
}

/// Persistence contract for paintings.
pub trait PaintingStore: Send + Sync {
    /// Stores a new painting for `user`. Fails with `NotAuthenticated`
    /// without a user.
    fn save(
        &self,
        user: Option<&UserId>,
        painting: NewPainting,
    ) -> impl Future<Output = Result<PaintingRecord, StoreError>> + Send;

    fn update(
        &self,
        id: PaintingId,
        update: ProgressUpdate,
    ) -> impl Future<Output = Result<PaintingRecord, StoreError>> + Send;

    fn get(&self, id: PaintingId) -> impl Future<Output = Result<PaintingRecord, StoreError>> + Send;

    /// The user's paintings, most recently updated first.
    fn list_for_user(
        &self,
        user: Option<&UserId>,
    ) -> impl Future<Output = Result<Vec<PaintingRecord>, StoreError>> + Send;

    fn delete(&self, id: PaintingId) -> impl Future<Output = Result<(), StoreError>> + Send;
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Debug)]
struct Row {
    record: PaintingRecord,
    /// Write sequence; orders rows updated within the same second.
    revision: u64,
}

#[derive(Debug, Default)]
struct Table {
    rows: HashMap<PaintingId, Row>,
    next_revision: u64,
}

impl Table {
    fn bump(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }
}

/// In-process [`PaintingStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

impl PaintingStore for MemoryStore {
    async fn save(&self, user: Option<&UserId>, painting: NewPainting) -> Result<PaintingRecord, StoreError> {
        let user = user.ok_or(StoreError::NotAuthenticated)?;
        let now = unix_now();
        let record = PaintingRecord {
            id: PaintingId::new(),
            user_id: user.clone(),
            title: painting.title,
            original_image_url: painting.original_image_url,
            processed_image_url: painting.processed_image_url,
            painting_data: painting.painting_data,
            completion_percentage: painting.completion_percentage,
            is_completed: painting.completion_percentage == 100,
            created_at: now,
            updated_at: now,
        };

        let mut table = self.table.write().await;
        let revision = table.bump();
        table.rows.insert(record.id, Row { record: record.clone(), revision });
        log::info!("saved painting {} ({}% complete)", record.id, record.completion_percentage);
        Ok(record)
    }

    async fn update(&self, id: PaintingId, update: ProgressUpdate) -> Result<PaintingRecord, StoreError> {
        let mut table = self.table.write().await;
        let revision = table.bump();
        let row = table.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        let r = &mut row.record;
        r.painting_data = update.painting_data;
        r.completion_percentage = update.completion_percentage;
        r.is_completed = update.completion_percentage == 100;
        r.updated_at = unix_now();
        if let Some(title) = update.title {
            r.title = title;
        }
        row.revision = revision;
        log::info!("updated painting {} ({}% complete)", id, row.record.completion_percentage);
        Ok(row.record.clone())
    }

    async fn get(&self, id: PaintingId) -> Result<PaintingRecord, StoreError> {
        let table = self.table.read().await;
        table.rows.get(&id).map(|row| row.record.clone()).ok_or(StoreError::NotFound(id))
    }

    async fn list_for_user(&self, user: Option<&UserId>) -> Result<Vec<PaintingRecord>, StoreError> {
        let user = user.ok_or(StoreError::NotAuthenticated)?;
        let table = self.table.read().await;
        let mut rows: Vec<&Row> = table.rows.values().filter(|r| &r.record.user_id == user).collect();
        rows.sort_by(|a, b| {
            b.record
                .updated_at
                .cmp(&a.record.updated_at)
                .then(b.revision.cmp(&a.revision))
        });
        Ok(rows.into_iter().map(|r| r.record.clone()).collect())
    }

    async fn delete(&self, id: PaintingId) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table.rows.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))?;
        log::info!("deleted painting {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pbn_engine::geom::DEFAULT_FLATTEN_TOLERANCE;

    use super::*;

    fn image() -> PaintableImage {
        wire::from_json(
            r##"{
                "processedImageUrl": "processed.jpg",
                "regions": [
                    { "id": 1, "colorNumber": 1, "path": "M0,0 h10 v10 h-10 z" },
                    { "id": 2, "colorNumber": 1, "path": "M20,0 h10 v10 h-10 z" },
                    { "id": 3, "colorNumber": 1, "path": "M40,0 h10 v10 h-10 z" }
                ],
                "colors": [{ "number": 1, "hex": "#FF0000", "name": "Red" }],
                "dimensions": { "width": 50, "height": 10 }
            }"##,
            DEFAULT_FLATTEN_TOLERANCE,
        )
        .unwrap()
    }

    fn alice() -> UserId {
        UserId::new("alice")
    }

    // ── completion ────────────────────────────────────────────────────────

    #[test]
    fn percentage_rounds() {
        assert_eq!(completion_percentage(0.0), 0);
        assert_eq!(completion_percentage(1.0 / 3.0), 33);
        assert_eq!(completion_percentage(2.0 / 3.0), 67);
        assert_eq!(completion_percentage(1.0), 100);
    }

    #[test]
    fn draft_uses_live_progress() {
        let mut img = image();
        img.regions_mut().mark_painted(2);
        let draft = NewPainting::from_image("Sunset", "original.jpg", &img).unwrap();
        assert_eq!(draft.completion_percentage, 33);
        assert_eq!(draft.processed_image_url.as_deref(), Some("processed.jpg"));
    }

    // ── memory store ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn save_requires_user() {
        let store = MemoryStore::new();
        let draft = NewPainting::from_image("t", "o", &image()).unwrap();
        assert_eq!(store.save(None, draft).await, Err(StoreError::NotAuthenticated));
        assert_eq!(store.list_for_user(None).await, Err(StoreError::NotAuthenticated));
    }

    #[tokio::test]
    async fn save_get_and_restore() {
        let store = MemoryStore::new();
        let mut img = image();
        img.regions_mut().mark_painted(1);
        let draft = NewPainting::from_image("Sunset", "original.jpg", &img).unwrap();
        let saved = store.save(Some(&alice()), draft).await.unwrap();

        let fetched = store.get(saved.id).await.unwrap();
        assert_eq!(fetched, saved);
        assert!(!fetched.is_completed);

        let restored = fetched.image(DEFAULT_FLATTEN_TOLERANCE).unwrap();
        assert_eq!(restored.regions().painted_count(), 1);
    }

    #[tokio::test]
    async fn update_recomputes_completion() {
        let store = MemoryStore::new();
        let mut img = image();
        let saved = store
            .save(Some(&alice()), NewPainting::from_image("t", "o", &img).unwrap())
            .await
            .unwrap();

        for id in 1..=3 {
            img.regions_mut().mark_painted(id);
        }
        let update = ProgressUpdate::from_image(&img).unwrap().with_title("Done");
        let updated = store.update(saved.id, update).await.unwrap();
        assert_eq!(updated.completion_percentage, 100);
        assert!(updated.is_completed);
        assert_eq!(updated.title, "Done");
        assert_eq!(updated.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn list_is_most_recent_first_and_per_user() {
        let store = MemoryStore::new();
        let img = image();
        let draft = || NewPainting::from_image("t", "o", &img).unwrap();
        let first = store.save(Some(&alice()), draft()).await.unwrap();
        let second = store.save(Some(&alice()), draft()).await.unwrap();
        store.save(Some(&UserId::new("bob")), draft()).await.unwrap();

        let ids: Vec<PaintingId> = store.list_for_user(Some(&alice())).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        store.update(first.id, ProgressUpdate::from_image(&img).unwrap()).await.unwrap();
        let ids: Vec<PaintingId> = store.list_for_user(Some(&alice())).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn missing_rows() {
        let store = MemoryStore::new();
        let id = PaintingId::new();
        assert_eq!(store.get(id).await, Err(StoreError::NotFound(id)));
        assert_eq!(store.delete(id).await, Err(StoreError::NotFound(id)));
        let update = ProgressUpdate::from_image(&image()).unwrap();
        assert_eq!(store.update(id, update).await, Err(StoreError::NotFound(id)));
    }

    #[tokio::test]
    async fn delete_removes() {
        let store = MemoryStore::new();
        let saved = store
            .save(Some(&alice()), NewPainting::from_image("t", "o", &image()).unwrap())
            .await
            .unwrap();
        store.delete(saved.id).await.unwrap();
        assert_eq!(store.len().await, 0);
    }
}
