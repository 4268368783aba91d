//! Durable duel store: one JSON document per duel.

use super::traits::{DuelChange, DuelStore, CHANGE_FEED_CAPACITY};
use crate::duel::Duel;
use crate::error::StoreError;
use crate::protocol::DuelId;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Directory-backed duel store
///
/// Records are written to a temporary file and renamed into place, so a
/// reader sees either the old or the new snapshot, never a partial one.
#[derive(Clone)]
pub struct FileStore {
    dir: PathBuf,
    changes: broadcast::Sender<DuelChange>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::debug!("Opened duel store at {}", dir.display());

        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Ok(Self { dir, changes })
    }

    fn record_path(&self, id: &DuelId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

#[async_trait]
impl DuelStore for FileStore {
    async fn get(&self, id: &DuelId) -> Result<Option<Duel>, StoreError> {
        match fs::read(self.record_path(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, duel: &Duel) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(duel)?;
        let tmp = self
            .dir
            .join(format!("{}.{}.tmp", duel.id(), Uuid::new_v4().simple()));

        fs::write(&tmp, &bytes).await?;
        if let Err(e) = fs::rename(&tmp, self.record_path(&duel.id())).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        let _ = self.changes.send(DuelChange {
            duel_id: duel.id(),
            status: Some(duel.status()),
        });
        Ok(())
    }

    async fn delete(&self, id: &DuelId) -> Result<bool, StoreError> {
        match fs::remove_file(self.record_path(id)).await {
            Ok(()) => {
                let _ = self.changes.send(DuelChange {
                    duel_id: *id,
                    status: None,
                });
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<Duel>, StoreError> {
        let mut duels = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read(&path).await {
                Ok(bytes) => duels.push(serde_json::from_slice(&bytes)?),
                // Deleted between read_dir and read
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(duels)
    }

    fn subscribe(&self) -> broadcast::Receiver<DuelChange> {
        self.changes.subscribe()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let dir = fs::File::open(&self.dir).await?;
        dir.sync_all().await?;
        Ok(())
    }
}
