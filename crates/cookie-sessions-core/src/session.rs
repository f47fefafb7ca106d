//! Per-request session object

use crate::options::SessionOptions;
use crate::value::{SessionKey, SessionValue, SessionValues};

/// A client's session for the duration of one request
///
/// Sessions are created by [`SessionStore::new_session`](crate::SessionStore::new_session)
/// and persisted by [`SessionStore::save`](crate::SessionStore::save). The id
/// is empty until the first successful save and never changes afterwards.
///
/// # Examples
///
/// ```
/// use cookie_sessions_core::{Session, SessionOptions};
/// use serde_json::json;
///
/// let mut session = Session::new("sessionid", SessionOptions::default());
/// assert!(session.is_new());
/// assert!(session.id().is_empty());
///
/// session.set("cart", json!(["apple"]));
/// assert_eq!(session.get("cart"), Some(&json!(["apple"])));
/// ```
#[derive(Debug, Clone)]
pub struct Session {
	name: String,
	id: String,
	is_new: bool,
	/// Values loaded from, or to be written to, storage
	pub values: SessionValues,
	/// Options for the cookie carrying the id
	pub options: SessionOptions,
}

impl Session {
	/// Create a new, unsaved session
	pub fn new(name: impl Into<String>, options: SessionOptions) -> Self {
		Self {
			name: name.into(),
			id: String::new(),
			is_new: true,
			values: SessionValues::new(),
			options,
		}
	}

	/// Name of the cookie carrying this session
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Session id, empty until the session has been saved
	pub fn id(&self) -> &str {
		&self.id
	}

	/// True until values were loaded from storage or the session was saved
	pub fn is_new(&self) -> bool {
		self.is_new
	}

	/// Get a value
	pub fn get(&self, key: impl Into<SessionKey>) -> Option<&SessionValue> {
		self.values.get(key)
	}

	/// Set a value, returning the previous one
	pub fn set(
		&mut self,
		key: impl Into<SessionKey>,
		value: impl Into<SessionValue>,
	) -> Option<SessionValue> {
		self.values.set(key, value)
	}

	/// Remove a value
	pub fn remove(&mut self, key: impl Into<SessionKey>) -> Option<SessionValue> {
		self.values.remove(key)
	}

	/// Mark the session for deletion on the next save
	pub fn expire(&mut self) {
		self.options.max_age = -1;
	}

	pub(crate) fn loaded(&mut self, id: String, values: SessionValues) {
		self.id = id;
		self.values = values;
		self.is_new = false;
	}

	pub(crate) fn assign_id(&mut self, id: String) {
		debug_assert!(self.id.is_empty(), "session id is immutable once assigned");
		self.id = id;
	}

	pub(crate) fn mark_saved(&mut self) {
		self.is_new = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_new_session_is_blank() {
		let session = Session::new("sid", SessionOptions::default());
		assert_eq!(session.name(), "sid");
		assert!(session.id().is_empty());
		assert!(session.is_new());
		assert!(session.values.is_empty());
	}

	#[rstest]
	fn test_loaded_replaces_values() {
		let mut session = Session::new("sid", SessionOptions::default());
		session.set("stale", json!(1));

		let mut stored = SessionValues::new();
		stored.set("a", json!(1));
		session.loaded("abc".to_string(), stored.clone());

		assert_eq!(session.id(), "abc");
		assert!(!session.is_new());
		assert_eq!(session.values, stored);
	}

	#[rstest]
	fn test_expire_sets_negative_max_age() {
		let mut session = Session::new("sid", SessionOptions::default());
		session.expire();
		assert!(session.options.is_expired());
	}
}
