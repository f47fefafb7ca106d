//! In-memory storage backend
//!
//! Values live in a process-local map and are lost when the process exits.

use crate::error::StorageError;
use crate::storage::Storage;
use crate::value::SessionValues;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory session storage for testing and development
///
/// Clones share the same underlying map.
///
/// # Examples
///
/// ```
/// use cookie_sessions_core::MemoryStorage;
///
/// #[tokio::main]
/// async fn main() {
///     let storage = MemoryStorage::new();
///     assert!(storage.is_empty().await);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
	sessions: Arc<RwLock<HashMap<String, SessionValues>>>,
}

impl MemoryStorage {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored sessions
	pub async fn len(&self) -> usize {
		self.sessions.read().await.len()
	}

	/// Whether no sessions are stored
	pub async fn is_empty(&self) -> bool {
		self.sessions.read().await.is_empty()
	}

	/// Whether values are stored under `id`
	pub async fn contains(&self, id: &str) -> bool {
		self.sessions.read().await.contains_key(id)
	}
}

#[async_trait]
impl Storage for MemoryStorage {
	async fn save(&self, id: &str, values: &SessionValues) -> Result<(), StorageError> {
		let mut sessions = self.sessions.write().await;
		sessions.insert(id.to_string(), values.clone());
		Ok(())
	}

	async fn load(&self, id: &str) -> Result<SessionValues, StorageError> {
		let sessions = self.sessions.read().await;
		sessions
			.get(id)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(id.to_string()))
	}

	async fn delete(&self, id: &str) -> Result<(), StorageError> {
		let mut sessions = self.sessions.write().await;
		sessions.remove(id);
		Ok(())
	}
}
