//! Session configuration
//!
//! [`SessionSettings`] describes the cookie, the codec keys and the storage
//! backend. Settings are read from TOML and can be overridden from the
//! environment:
//!
//! ```toml
//! codec_max_age = 604800
//!
//! [cookie]
//! name = "sessionid"
//! max_age = 3600
//! secure = true
//! same_site = "lax"
//!
//! [[keys]]
//! hash_key = "<base64, at least 32 bytes>"
//! block_key = "<base64, exactly 32 bytes>"
//!
//! [backend]
//! type = "s3"
//! bucket = "my-sessions"
//! prefix = "sessions/"
//! ```

use crate::codec::{CookieKey, DEFAULT_CODEC_MAX_AGE, SecureCookieCodec};
use crate::options::SessionOptions;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default session cookie name
pub const DEFAULT_COOKIE_NAME: &str = "sessionid";

/// Settings errors
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SettingsError {
	/// The settings file could not be read
	#[error("failed to read {path}: {source}")]
	Io {
		/// File that failed to load
		path: PathBuf,
		/// Underlying I/O error
		#[source]
		source: std::io::Error,
	},

	/// The settings are not valid TOML for this schema
	#[error("invalid settings: {0}")]
	Toml(#[from] toml::de::Error),

	/// A configured key could not be decoded or is unusable
	#[error("invalid key #{index}: {message}")]
	InvalidKey {
		/// Position of the key in the list, newest first
		index: usize,
		/// Description of the failure
		message: String,
	},

	/// A value is missing or out of range
	#[error("{0}")]
	Invalid(String),
}

/// Cookie settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieSettings {
	/// Cookie name
	#[serde(default = "default_cookie_name")]
	pub name: String,
	/// Cookie attributes
	#[serde(flatten)]
	pub options: SessionOptions,
}

fn default_cookie_name() -> String {
	DEFAULT_COOKIE_NAME.to_string()
}

impl Default for CookieSettings {
	fn default() -> Self {
		Self {
			name: default_cookie_name(),
			options: SessionOptions::default(),
		}
	}
}

/// Base64-encoded codec key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySettings {
	/// Authentication key, at least 32 bytes once decoded
	pub hash_key: String,
	/// Optional encryption key, exactly 32 bytes once decoded
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub block_key: Option<String>,
}

impl KeySettings {
	fn to_key(&self, index: usize) -> Result<CookieKey, SettingsError> {
		let invalid = |message: String| SettingsError::InvalidKey { index, message };

		let hash_key = STANDARD
			.decode(self.hash_key.trim())
			.map_err(|e| invalid(format!("hash key is not base64: {}", e)))?;
		let key = match &self.block_key {
			Some(block_key) => {
				let block_key = STANDARD
					.decode(block_key.trim())
					.map_err(|e| invalid(format!("block key is not base64: {}", e)))?;
				CookieKey::with_block_key_slice(hash_key, &block_key)
			}
			None => CookieKey::new(hash_key, None),
		};
		key.map_err(|e| invalid(e.to_string()))
	}

	/// Parse `hash[:block]`
	fn parse(entry: &str) -> Self {
		match entry.split_once(':') {
			Some((hash_key, block_key)) => Self {
				hash_key: hash_key.to_string(),
				block_key: Some(block_key.to_string()),
			},
			None => Self {
				hash_key: entry.to_string(),
				block_key: None,
			},
		}
	}
}

/// Object storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Settings {
	/// Bucket name
	pub bucket: String,
	/// Prefix prepended to every object key
	#[serde(default)]
	pub prefix: String,
	/// Region; the SDK's default chain applies when unset
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
	/// Custom endpoint URL, e.g. for MinIO or LocalStack
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub endpoint: Option<String>,
	/// Use path-style addressing
	#[serde(default)]
	pub force_path_style: bool,
}

/// Storage backend selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendSettings {
	/// Process-local memory
	#[default]
	Memory,
	/// S3-compatible object storage
	S3(S3Settings),
}

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
	/// Lifetime in seconds of encoded cookie values
	pub codec_max_age: u64,
	/// Cookie settings
	pub cookie: CookieSettings,
	/// Codec keys, newest first; empty stores ids in cookies unaltered
	pub keys: Vec<KeySettings>,
	/// Storage backend
	pub backend: BackendSettings,
}

impl Default for SessionSettings {
	fn default() -> Self {
		Self {
			codec_max_age: DEFAULT_CODEC_MAX_AGE,
			cookie: CookieSettings::default(),
			keys: Vec::new(),
			backend: BackendSettings::default(),
		}
	}
}

impl SessionSettings {
	/// Parse settings from TOML text
	///
	/// # Examples
	///
	/// ```
	/// use cookie_sessions_core::settings::{BackendSettings, SessionSettings};
	///
	/// let settings = SessionSettings::from_toml_str(
	///     r#"
	///     [cookie]
	///     name = "app_session"
	///     secure = true
	///     "#,
	/// )
	/// .unwrap();
	/// assert_eq!(settings.cookie.name, "app_session");
	/// assert!(settings.cookie.options.secure);
	/// assert_eq!(settings.backend, BackendSettings::Memory);
	/// ```
	pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(text)?)
	}

	/// Read settings from a TOML file
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&text)
	}

	/// Defaults overridden by the process environment
	pub fn from_env() -> Result<Self, SettingsError> {
		let mut settings = Self::default();
		settings.apply_env()?;
		Ok(settings)
	}

	/// Override settings from the process environment
	///
	/// # Environment Variables
	///
	/// - `SESSION_COOKIE_NAME`: cookie name
	/// - `SESSION_COOKIE_SECURE`: `true` or `false`
	/// - `SESSION_MAX_AGE`: cookie lifetime in seconds
	/// - `SESSION_SECRET_KEYS`: comma-separated `hash[:block]` base64 keys,
	///   newest first
	/// - `SESSION_BACKEND`: `memory` or `s3`
	/// - `SESSION_S3_BUCKET`: bucket (required when switching to `s3`)
	/// - `SESSION_S3_PREFIX`, `SESSION_S3_REGION`, `SESSION_S3_ENDPOINT`
	pub fn apply_env(&mut self) -> Result<(), SettingsError> {
		self.apply_env_from(|name| env::var(name).ok())
	}

	/// Override settings from `lookup`, which maps variable names to values
	pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), SettingsError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(name) = lookup("SESSION_COOKIE_NAME") {
			self.cookie.name = name;
		}
		if let Some(secure) = lookup("SESSION_COOKIE_SECURE") {
			self.cookie.options.secure = parse_bool("SESSION_COOKIE_SECURE", &secure)?;
		}
		if let Some(max_age) = lookup("SESSION_MAX_AGE") {
			self.cookie.options.max_age = max_age.trim().parse().map_err(|_| {
				SettingsError::Invalid(format!("SESSION_MAX_AGE is not an integer: {}", max_age))
			})?;
		}
		if let Some(keys) = lookup("SESSION_SECRET_KEYS") {
			self.keys = keys
				.split(',')
				.map(str::trim)
				.filter(|entry| !entry.is_empty())
				.map(KeySettings::parse)
				.collect();
		}

		if let Some(backend) = lookup("SESSION_BACKEND") {
			match backend.trim().to_lowercase().as_str() {
				"memory" => self.backend = BackendSettings::Memory,
				"s3" => {
					if !matches!(self.backend, BackendSettings::S3(_)) {
						let bucket = lookup("SESSION_S3_BUCKET").ok_or_else(|| {
							SettingsError::Invalid(
								"SESSION_S3_BUCKET environment variable not set".to_string(),
							)
						})?;
						self.backend = BackendSettings::S3(S3Settings {
							bucket,
							prefix: String::new(),
							region: None,
							endpoint: None,
							force_path_style: false,
						});
					}
				}
				other => {
					return Err(SettingsError::Invalid(format!(
						"invalid backend type: {}",
						other
					)));
				}
			}
		}

		if let BackendSettings::S3(s3) = &mut self.backend {
			if let Some(bucket) = lookup("SESSION_S3_BUCKET") {
				s3.bucket = bucket;
			}
			if let Some(prefix) = lookup("SESSION_S3_PREFIX") {
				s3.prefix = prefix;
			}
			if let Some(region) = lookup("SESSION_S3_REGION") {
				s3.region = Some(region);
			}
			if let Some(endpoint) = lookup("SESSION_S3_ENDPOINT") {
				s3.endpoint = Some(endpoint);
			}
		}
		Ok(())
	}

	/// Template options for new sessions
	pub fn to_options(&self) -> SessionOptions {
		self.cookie.options.clone()
	}

	/// Build the cookie codec
	///
	/// Returns `None` when no keys are configured, in which case ids are
	/// stored in cookies unaltered.
	pub fn build_codec(&self) -> Result<Option<SecureCookieCodec>, SettingsError> {
		if self.keys.is_empty() {
			return Ok(None);
		}
		let keys = self
			.keys
			.iter()
			.enumerate()
			.map(|(index, key)| key.to_key(index))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Some(
			SecureCookieCodec::new(keys).with_max_age(self.codec_max_age),
		))
	}
}

fn parse_bool(name: &str, value: &str) -> Result<bool, SettingsError> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(SettingsError::Invalid(format!(
			"{} is not a boolean: {}",
			name, value
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::IdCodec;
	use crate::options::SameSite;
	use rstest::rstest;
	use serial_test::serial;
	use std::collections::HashMap;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn key_b64(byte: u8, len: usize) -> String {
		STANDARD.encode(vec![byte; len])
	}

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| vars.get(name).cloned()
	}

	#[rstest]
	fn test_defaults() {
		let settings = SessionSettings::default();
		assert_eq!(settings.cookie.name, "sessionid");
		assert_eq!(settings.to_options(), SessionOptions::default());
		assert!(settings.keys.is_empty());
		assert_eq!(settings.backend, BackendSettings::Memory);
		assert!(settings.build_codec().unwrap().is_none());
	}

	#[rstest]
	fn test_full_toml() {
		let text = format!(
			r#"
			codec_max_age = 600

			[cookie]
			name = "app"
			path = "/app"
			domain = "example.com"
			max_age = 3600
			secure = true
			same_site = "strict"

			[[keys]]
			hash_key = "{}"
			block_key = "{}"

			[[keys]]
			hash_key = "{}"

			[backend]
			type = "s3"
			bucket = "sessions"
			prefix = "web/"
			endpoint = "http://localhost:9000"
			force_path_style = true
			"#,
			key_b64(1, 64),
			key_b64(2, 32),
			key_b64(3, 32),
		);

		let settings = SessionSettings::from_toml_str(&text).unwrap();

		assert_eq!(settings.cookie.name, "app");
		let options = settings.to_options();
		assert_eq!(options.path, "/app");
		assert_eq!(options.domain.as_deref(), Some("example.com"));
		assert_eq!(options.max_age, 3600);
		assert!(options.secure);
		assert!(options.http_only);
		assert_eq!(options.same_site, SameSite::Strict);
		assert_eq!(settings.keys.len(), 2);
		match &settings.backend {
			BackendSettings::S3(s3) => {
				assert_eq!(s3.bucket, "sessions");
				assert_eq!(s3.prefix, "web/");
				assert!(s3.region.is_none());
				assert!(s3.force_path_style);
			}
			other => panic!("unexpected backend {:?}", other),
		}

		let codec = settings.build_codec().unwrap().unwrap();
		assert_eq!(codec.keys().len(), 2);
		assert!(codec.keys()[0].encrypts());
		let encoded = codec.encode("app", "abc").unwrap();
		assert_eq!(codec.decode("app", &encoded).unwrap(), "abc");
	}

	#[rstest]
	#[case("not base64!")]
	#[case("c2hvcnQ=")]
	fn test_invalid_hash_key(#[case] hash_key: &str) {
		let settings = SessionSettings {
			keys: vec![KeySettings {
				hash_key: hash_key.to_string(),
				block_key: None,
			}],
			..Default::default()
		};

		let err = settings.build_codec().unwrap_err();
		assert!(matches!(err, SettingsError::InvalidKey { index: 0, .. }));
	}

	#[rstest]
	fn test_invalid_block_key_reports_index() {
		let settings = SessionSettings {
			keys: vec![
				KeySettings {
					hash_key: key_b64(1, 32),
					block_key: None,
				},
				KeySettings {
					hash_key: key_b64(1, 32),
					block_key: Some(key_b64(2, 16)),
				},
			],
			..Default::default()
		};

		let err = settings.build_codec().unwrap_err();
		assert!(matches!(err, SettingsError::InvalidKey { index: 1, .. }));
	}

	#[rstest]
	fn test_unknown_backend_type_is_rejected() {
		let err = SessionSettings::from_toml_str("[backend]\ntype = \"redis\"\n").unwrap_err();
		assert!(matches!(err, SettingsError::Toml(_)));
	}

	#[rstest]
	fn test_from_file() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "[cookie]\nname = \"from_file\"\nhttp_only = false").unwrap();

		let settings = SessionSettings::from_file(file.path()).unwrap();

		assert_eq!(settings.cookie.name, "from_file");
		assert!(!settings.cookie.options.http_only);
	}

	#[rstest]
	fn test_missing_file() {
		let err = SessionSettings::from_file("/nonexistent/sessions.toml").unwrap_err();
		assert!(matches!(err, SettingsError::Io { .. }));
	}

	#[rstest]
	fn test_env_overrides() {
		let hash = key_b64(7, 32);
		let block = key_b64(8, 32);
		let keys = format!("{}:{}, {}", hash, block, hash);
		let mut settings = SessionSettings::default();

		settings
			.apply_env_from(lookup(&[
				("SESSION_COOKIE_NAME", "env_session"),
				("SESSION_COOKIE_SECURE", "true"),
				("SESSION_MAX_AGE", "-1"),
				("SESSION_SECRET_KEYS", keys.as_str()),
				("SESSION_BACKEND", "s3"),
				("SESSION_S3_BUCKET", "bucket"),
				("SESSION_S3_PREFIX", "p/"),
				("SESSION_S3_REGION", "eu-west-1"),
			]))
			.unwrap();

		assert_eq!(settings.cookie.name, "env_session");
		assert!(settings.cookie.options.secure);
		assert!(settings.to_options().is_expired());
		assert_eq!(settings.keys.len(), 2);
		assert_eq!(settings.keys[0].block_key.as_deref(), Some(block.as_str()));
		assert_eq!(
			settings.backend,
			BackendSettings::S3(S3Settings {
				bucket: "bucket".to_string(),
				prefix: "p/".to_string(),
				region: Some("eu-west-1".to_string()),
				endpoint: None,
				force_path_style: false,
			})
		);
		assert!(settings.build_codec().unwrap().is_some());
	}

	#[rstest]
	fn test_env_s3_without_bucket() {
		let mut settings = SessionSettings::default();
		let err = settings
			.apply_env_from(lookup(&[("SESSION_BACKEND", "s3")]))
			.unwrap_err();
		assert!(matches!(err, SettingsError::Invalid(_)));
	}

	#[rstest]
	#[case("SESSION_COOKIE_SECURE", "maybe")]
	#[case("SESSION_MAX_AGE", "forever")]
	#[case("SESSION_BACKEND", "redis")]
	fn test_env_invalid_values(#[case] name: &str, #[case] value: &str) {
		let mut settings = SessionSettings::default();
		let err = settings.apply_env_from(lookup(&[(name, value)])).unwrap_err();
		assert!(matches!(err, SettingsError::Invalid(_)));
	}

	#[rstest]
	#[serial]
	fn test_apply_env_reads_process_environment() {
		// SAFETY: #[serial] gives this test exclusive access to the environment.
		unsafe {
			env::set_var("SESSION_COOKIE_NAME", "process_env");
		}

		let settings = SessionSettings::from_env();

		// SAFETY: see above
		unsafe {
			env::remove_var("SESSION_COOKIE_NAME");
		}
		assert_eq!(settings.unwrap().cookie.name, "process_env");
	}
}
