use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use pbn_canvas::persist::{NewPainting, PaintingId, PaintingRecord, PaintingStore, ProgressUpdate, StoreError, UserId};
use tokio::sync::Mutex;

/// [`PaintingStore`] backed by one JSON file.
///
/// Records are kept oldest-write first, so the last entry is always the most
/// recently saved or updated one. The whole file is rewritten on each change,
/// and memory only takes the change once that write has succeeded.
pub struct FileStore {
    path: PathBuf,
    records: Mutex<Vec<PaintingRecord>>,
}

impl FileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| StoreError::Backend(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::Backend(format!("{}: {}", path.display(), e))),
        };
        Ok(Self { path, records: Mutex::new(records) })
    }

    async fn flush(&self, records: &[PaintingRecord]) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(records).map_err(|e| StoreError::Backend(e.to_string()))?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| StoreError::Backend(format!("{}: {}", self.path.display(), e)))
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

impl PaintingStore for FileStore {
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

        let mut records = self.records.lock().await;
        let mut next = records.clone();
        next.push(record.clone());
        self.flush(&next).await?;
        *records = next;
        log::info!("saved painting {} to {}", record.id, self.path.display());
        Ok(record)
    }

    async fn update(&self, id: PaintingId, update: ProgressUpdate) -> Result<PaintingRecord, StoreError> {
        let mut records = self.records.lock().await;
        let pos = records.iter().position(|r| r.id == id).ok_or(StoreError::NotFound(id))?;
        let mut next = records.clone();
        let mut record = next.remove(pos);
        record.painting_data = update.painting_data;
        record.completion_percentage = update.completion_percentage;
        record.is_completed = update.completion_percentage == 100;
        record.updated_at = unix_now();
        if let Some(title) = update.title {
            record.title = title;
        }
        next.push(record.clone());
        self.flush(&next).await?;
        *records = next;
        log::info!("updated painting {} ({}% complete)", id, record.completion_percentage);
        Ok(record)
    }

    async fn get(&self, id: PaintingId) -> Result<PaintingRecord, StoreError> {
        let records = self.records.lock().await;
        records.iter().find(|r| r.id == id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn list_for_user(&self, user: Option<&UserId>) -> Result<Vec<PaintingRecord>, StoreError> {
        let user = user.ok_or(StoreError::NotAuthenticated)?;
        let records = self.records.lock().await;
        let mut mine: Vec<PaintingRecord> = records.iter().rev().filter(|r| &r.user_id == user).cloned().collect();
        // Stable sort keeps write order among equal timestamps.
        mine.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(mine)
    }

    async fn delete(&self, id: PaintingId) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let pos = records.iter().position(|r| r.id == id).ok_or(StoreError::NotFound(id))?;
        let mut next = records.clone();
        next.remove(pos);
        self.flush(&next).await?;
        *records = next;
        Ok(())
    }
}
