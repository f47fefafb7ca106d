//! Storage backend trait definition.

use crate::error::StorageError;
use crate::value::SessionValues;
use async_trait::async_trait;

/// Durable key/value persistence for session values, keyed by session id.
///
/// Backends are shared by every concurrent request and must tolerate
/// concurrent calls on independent ids. Calls racing on the same id follow
/// last-writer-wins with whatever ordering the backend provides.
///
/// # Contract
///
/// - [`Storage::save`] overwrites unconditionally.
/// - [`Storage::load`] fails with [`StorageError::NotFound`] for unknown ids.
/// - [`Storage::delete`] succeeds for unknown ids.
///
/// # Examples
///
/// ```rust
/// use cookie_sessions_core::{MemoryStorage, SessionValues, Storage};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = MemoryStorage::new();
///
/// let mut values = SessionValues::new();
/// values.set("user_id", json!(42));
/// storage.save("session-1", &values).await?;
///
/// assert_eq!(storage.load("session-1").await?, values);
///
/// storage.delete("session-1").await?;
/// storage.delete("session-1").await?;
/// assert!(storage.load("session-1").await.unwrap_err().is_not_found());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Storage: Send + Sync {
	/// Store values under `id`, replacing any previous values
	async fn save(&self, id: &str, values: &SessionValues) -> Result<(), StorageError>;

	/// Load the values stored under `id`
	async fn load(&self, id: &str) -> Result<SessionValues, StorageError>;

	/// Remove the values stored under `id`, if any
	async fn delete(&self, id: &str) -> Result<(), StorageError>;
}
