//! Cookie options carried by each session

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default cookie lifetime: 30 days
pub const DEFAULT_MAX_AGE: i64 = 86400 * 30;

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
	/// Emit no SameSite attribute
	#[default]
	Default,
	/// `SameSite=Lax`
	Lax,
	/// `SameSite=Strict`
	Strict,
	/// `SameSite=None`
	None,
}

impl SameSite {
	/// Attribute value, or `None` when the attribute is omitted
	pub fn as_attribute(&self) -> Option<&'static str> {
		match self {
			SameSite::Default => None,
			SameSite::Lax => Some("Lax"),
			SameSite::Strict => Some("Strict"),
			SameSite::None => Some("None"),
		}
	}
}

impl fmt::Display for SameSite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_attribute().unwrap_or("Default"))
	}
}

/// Options for the cookie that carries a session's id
///
/// A negative `max_age` marks the session for deletion. Zero produces a
/// browser-session cookie with no `Max-Age` attribute.
///
/// # Examples
///
/// ```
/// use cookie_sessions_core::{SameSite, SessionOptions};
///
/// let options = SessionOptions::default()
///     .with_path("/app")
///     .with_same_site(SameSite::Strict)
///     .with_secure(true);
/// assert_eq!(options.path, "/app");
/// assert!(!options.is_expired());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
	/// Cookie path
	pub path: String,
	/// Cookie domain
	pub domain: Option<String>,
	/// Lifetime in seconds; negative deletes the session
	pub max_age: i64,
	/// HTTPS-only cookie
	pub secure: bool,
	/// HttpOnly flag
	pub http_only: bool,
	/// SameSite attribute
	pub same_site: SameSite,
}

impl Default for SessionOptions {
	fn default() -> Self {
		Self {
			path: "/".to_string(),
			domain: None,
			max_age: DEFAULT_MAX_AGE,
			secure: false,
			http_only: true,
			same_site: SameSite::Default,
		}
	}
}

impl SessionOptions {
	/// Set path
	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();
		self
	}

	/// Set domain
	pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());
		self
	}

	/// Set max age in seconds
	pub fn with_max_age(mut self, max_age: i64) -> Self {
		self.max_age = max_age;
		self
	}

	/// Set the Secure flag
	pub fn with_secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}

	/// Set the HttpOnly flag
	pub fn with_http_only(mut self, http_only: bool) -> Self {
		self.http_only = http_only;
		self
	}

	/// Set SameSite attribute
	pub fn with_same_site(mut self, same_site: SameSite) -> Self {
		self.same_site = same_site;
		self
	}

	/// Whether the options mark the session for deletion
	pub fn is_expired(&self) -> bool {
		self.max_age < 0
	}
}
