//! Session id generation

use crate::error::GenerateError;
use uuid::Uuid;

/// Produces new, unique, cookie-safe session ids
///
/// A successful result must never be empty; the orchestrator treats a blank
/// id as a generation failure. Any `Fn() -> Result<String, GenerateError>`
/// closure is a generator.
///
/// # Examples
///
/// ```
/// use cookie_sessions_core::{GenerateError, IdGenerator};
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// let counter = AtomicU64::new(1);
/// let generator = move || -> Result<String, GenerateError> {
///     Ok(format!("sess-{:08x}", counter.fetch_add(1, Ordering::Relaxed)))
/// };
/// assert_eq!(generator.generate().unwrap(), "sess-00000001");
/// ```
pub trait IdGenerator: Send + Sync {
	/// Generate a new id
	fn generate(&self) -> Result<String, GenerateError>;
}

impl<F> IdGenerator for F
where
	F: Fn() -> Result<String, GenerateError> + Send + Sync,
{
	fn generate(&self) -> Result<String, GenerateError> {
		self()
	}
}

/// Random UUID v4 ids in canonical hyphenated form
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
	fn generate(&self) -> Result<String, GenerateError> {
		Ok(Uuid::new_v4().to_string())
	}
}
