//! Factory for assembling a session store from settings.

use cookie_sessions_core::settings::BackendSettings;
use cookie_sessions_core::{MemoryStorage, SessionSettings, SessionStore, SettingsError, Storage};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors from [`build_store`]
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BuildError {
	/// The settings are unusable
	#[error(transparent)]
	Settings(#[from] SettingsError),

	/// The configured backend was not compiled in
	#[error("backend not enabled: {0}")]
	BackendDisabled(&'static str),
}

/// Create a session store from settings.
///
/// The backend, cookie options and codec keys all come from `settings`.
/// With no keys configured, ids are written to cookies unaltered.
///
/// # Examples
///
/// ```rust,no_run
/// use cookie_sessions::{SessionSettings, build_store};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut settings = SessionSettings::from_file("sessions.toml")?;
///     settings.apply_env()?;
///     let store = build_store(&settings).await?;
///     Ok(())
/// }
/// ```
pub async fn build_store(settings: &SessionSettings) -> Result<SessionStore, BuildError> {
	let codec = settings.build_codec()?;

	let storage: Arc<dyn Storage> = match &settings.backend {
		BackendSettings::Memory => Arc::new(MemoryStorage::new()),
		#[cfg(feature = "s3")]
		BackendSettings::S3(s3) => {
			let config = cookie_sessions_s3::S3Config::from(s3.clone());
			Arc::new(cookie_sessions_s3::S3Storage::from_config(config).await)
		}
		#[cfg(not(feature = "s3"))]
		BackendSettings::S3(_) => return Err(BuildError::BackendDisabled("s3")),
	};

	let mut store = SessionStore::from_arc(storage).with_options(settings.to_options());
	let authenticated = codec.is_some();
	if let Some(codec) = codec {
		store = store.with_codec(codec);
	}

	debug!(
		cookie = %settings.cookie.name,
		authenticated,
		"session store configured"
	);
	Ok(store)
}

#[cfg(test)]
mod tests {
	use super::*;
	use cookie_sessions_core::settings::KeySettings;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_default_settings_build_memory_store() {
		let store = build_store(&SessionSettings::default()).await.unwrap();
		assert_eq!(store.options(), &SessionSettings::default().to_options());
	}

	#[rstest]
	#[tokio::test]
	async fn test_invalid_key_is_reported() {
		let settings = SessionSettings {
			keys: vec![KeySettings {
				hash_key: "too short".to_string(),
				block_key: None,
			}],
			..Default::default()
		};

		let err = build_store(&settings).await.unwrap_err();

		assert!(matches!(
			err,
			BuildError::Settings(SettingsError::InvalidKey { .. })
		));
	}
}
