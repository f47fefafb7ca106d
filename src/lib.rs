//! # Cookie Sessions
//!
//! Server-side HTTP sessions identified by a cookie.
//!
//! The client holds only an opaque, optionally authenticated and encrypted
//! session id; the values live in a storage backend shared by every request.
//!
//! ## Quick Start
//!
//! ```rust
//! use cookie_sessions::{MemoryStorage, SessionStore};
//! use http::HeaderMap;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SessionStore::new(MemoryStorage::new());
//!
//! // First request: no cookie yet
//! let mut session = store.new_session(&HeaderMap::new(), "sessionid").await?;
//! session.set("user_id", json!(42));
//! let mut response = HeaderMap::new();
//! store.save(&mut response, &mut session).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## From configuration
//!
//! ```rust
//! use cookie_sessions::{SessionSettings, build_store};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SessionSettings::from_toml_str("[cookie]\nname = \"app\"\n")?;
//! let store = build_store(&settings).await?;
//! assert_eq!(store.options(), &settings.to_options());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `s3` | enabled | S3-compatible object storage backend |
//! | `messagepack` | disabled | MessagePack marshaler |

pub mod factory;

pub use cookie_sessions_core::{
	CodecError, CookieError, CookieKey, DEFAULT_CODEC_MAX_AGE, DEFAULT_MAX_AGE, GenerateError,
	IdCodec, IdGenerator, JsonMarshaler, LoadError, MarshalError, Marshaler, MemoryStorage,
	PlainCodec, RequestCookies, ResponseCookies, SameSite, SecureCookieCodec, Session,
	SessionCookie, SessionError, SessionKey, SessionOptions, SessionRegistry, SessionSettings,
	SessionStore, SessionValue, SessionValues, SettingsError, Storage, StorageError,
	UuidGenerator,
};

#[cfg(feature = "messagepack")]
pub use cookie_sessions_core::MessagePackMarshaler;

pub use factory::{BuildError, build_store};

/// Configuration types
pub mod settings {
	pub use cookie_sessions_core::settings::*;
}

/// S3-compatible object storage backend
#[cfg(feature = "s3")]
pub mod s3 {
	pub use cookie_sessions_s3::*;
}
