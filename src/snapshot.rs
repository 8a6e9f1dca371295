//! Migration snapshot collaborator.
//!
//! The fairness artifact is produced offline and never mutated here. It is
//! read fresh on every request so a redeployed artifact takes effect
//! without a restart.

use std::fmt;
use std::path::PathBuf;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::domain::MigrationSnapshot;
use crate::error::StakingError;

/// Source of the migration snapshot.
pub trait SnapshotStore: Send + Sync + fmt::Debug {
    /// Loads the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StakingError::SnapshotUnavailable`] if the artifact cannot
    /// be read or parsed.
    fn load(&self) -> BoxFuture<'_, Result<MigrationSnapshot, StakingError>>;
}

/// Reads the snapshot from a JSON file.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> BoxFuture<'_, Result<MigrationSnapshot, StakingError>> {
        async move {
            let json = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "snapshot read failed");
                StakingError::SnapshotUnavailable(format!("{}: {e}", self.path.display()))
            })?;
            MigrationSnapshot::from_json(&json)
        }
        .boxed()
    }
}

/// Holds a snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    snapshot: MigrationSnapshot,
}

impl InMemorySnapshotStore {
    /// Creates a store serving `snapshot`.
    #[must_use]
    pub fn new(snapshot: MigrationSnapshot) -> Self {
        Self {
            snapshot: snapshot.normalized(),
        }
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> BoxFuture<'_, Result<MigrationSnapshot, StakingError>> {
        let snapshot = self.snapshot.clone();
        async move { Ok(snapshot) }.boxed()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_reads_and_normalizes() {
        let path = std::env::temp_dir().join(format!(
            "migration-snapshot-{}.json",
            std::process::id()
        ));
        let json = r#"{"wallets":{"WalletA":{
            "fairRewardsTokens":1.0,"actualClaimedTokens":1.0,
            "differenceTokens":0.0,"status":"correctly-claimed"}}}"#;
        let Ok(()) = tokio::fs::write(&path, json).await else {
            panic!("write failed");
        };

        let result = FileSnapshotStore::new(&path).load().await;
        let _ = tokio::fs::remove_file(&path).await;

        let Ok(snapshot) = result else {
            panic!("load failed");
        };
        assert!(snapshot.wallets.contains_key("walleta"));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let store = FileSnapshotStore::new("/nonexistent/migration-snapshot.json");
        let Err(StakingError::SnapshotUnavailable(_)) = store.load().await else {
            panic!("expected SnapshotUnavailable");
        };
    }
}
