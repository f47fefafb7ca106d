//! Session value types
//!
//! Session values are a mapping from [`SessionKey`] to [`SessionValue`].
//! Keys are usually names, but stores that keep values in memory also accept
//! integer keys. Byte-oriented marshalers reject anything but names.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A dynamically typed session value
pub type SessionValue = Value;

/// Key into a session's values
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
	/// String key, supported by every marshaler
	Name(String),
	/// Integer key, only supported by stores that keep values in memory
	Index(i64),
}

impl SessionKey {
	/// The key as a string, if it is a name
	pub fn as_name(&self) -> Option<&str> {
		match self {
			SessionKey::Name(name) => Some(name),
			SessionKey::Index(_) => None,
		}
	}
}

impl fmt::Display for SessionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SessionKey::Name(name) => write!(f, "name {:?}", name),
			SessionKey::Index(index) => write!(f, "index {}", index),
		}
	}
}

impl From<&str> for SessionKey {
	fn from(name: &str) -> Self {
		SessionKey::Name(name.to_string())
	}
}

impl From<String> for SessionKey {
	fn from(name: String) -> Self {
		SessionKey::Name(name)
	}
}

impl From<i64> for SessionKey {
	fn from(index: i64) -> Self {
		SessionKey::Index(index)
	}
}

/// Values held by a session
///
/// # Examples
///
/// ```
/// use cookie_sessions_core::SessionValues;
/// use serde_json::json;
///
/// let mut values = SessionValues::new();
/// values.set("user_id", json!(42));
/// assert_eq!(values.get("user_id"), Some(&json!(42)));
/// assert_eq!(values.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionValues {
	entries: HashMap<SessionKey, SessionValue>,
}

impl SessionValues {
	/// Create an empty value set
	pub fn new() -> Self {
		Self::default()
	}

	/// Get a value
	pub fn get(&self, key: impl Into<SessionKey>) -> Option<&SessionValue> {
		self.entries.get(&key.into())
	}

	/// Set a value, returning the previous one
	pub fn set(
		&mut self,
		key: impl Into<SessionKey>,
		value: impl Into<SessionValue>,
	) -> Option<SessionValue> {
		self.entries.insert(key.into(), value.into())
	}

	/// Remove a value
	pub fn remove(&mut self, key: impl Into<SessionKey>) -> Option<SessionValue> {
		self.entries.remove(&key.into())
	}

	/// Check if a key exists
	pub fn contains_key(&self, key: impl Into<SessionKey>) -> bool {
		self.entries.contains_key(&key.into())
	}

	/// Number of stored values
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether no values are stored
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Remove every value
	pub fn clear(&mut self) {
		self.entries.clear();
	}

	/// Iterate over key/value pairs in arbitrary order
	pub fn iter(&self) -> impl Iterator<Item = (&SessionKey, &SessionValue)> {
		self.entries.iter()
	}
}

impl FromIterator<(SessionKey, SessionValue)> for SessionValues {
	fn from_iter<I: IntoIterator<Item = (SessionKey, SessionValue)>>(iter: I) -> Self {
		Self {
			entries: iter.into_iter().collect(),
		}
	}
}

impl IntoIterator for SessionValues {
	type Item = (SessionKey, SessionValue);
	type IntoIter = std::collections::hash_map::IntoIter<SessionKey, SessionValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}
