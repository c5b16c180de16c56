pub mod disk;
pub mod memory;

use crate::core::holding::{Holding, HoldingPatch};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence for holdings. Every operation is scoped to one owner.
#[async_trait]
pub trait HoldingStore: Send + Sync {
    /// The owner's holdings, newest first.
    async fn list(&self, owner: &str) -> Result<Vec<Holding>>;

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Holding>>;

    async fn create(&self, holding: Holding) -> Result<()>;

    /// Fails when `id` does not exist or belongs to someone else.
    async fn update(&self, owner: &str, id: Uuid, patch: &HoldingPatch) -> Result<Holding>;

    /// Returns `false` when there was nothing of this owner's to delete.
    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool>;
}
