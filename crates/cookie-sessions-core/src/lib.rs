//! # Cookie Sessions Core
//!
//! Cookie-identified server-side sessions.
//!
//! A client carries only an opaque session id in a cookie; the values live in
//! a pluggable [`Storage`] backend. [`SessionStore`] orchestrates the
//! lifecycle: it reads the id from the request, loads the values, and on
//! save persists them, generating an id for new sessions and writing the
//! cookie to the response.
//!
//! ## Capabilities
//!
//! - [`Storage`]: persistence, with [`MemoryStorage`] built in
//! - [`Marshaler`]: values to bytes for byte-oriented backends
//! - [`IdCodec`]: id to cookie value, with [`SecureCookieCodec`] for
//!   authenticated and optionally encrypted cookies
//! - [`IdGenerator`]: new ids, with [`UuidGenerator`] as the default
//!
//! ## Quick Start
//!
//! ```rust
//! use cookie_sessions_core::{CookieKey, MemoryStorage, SecureCookieCodec, SessionStore};
//! use http::HeaderMap;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SessionStore::new(MemoryStorage::new())
//!     .with_codec(SecureCookieCodec::new(vec![CookieKey::generate()]));
//!
//! let request = HeaderMap::new();
//! let mut session = store.new_session(&request, "sessionid").await?;
//! session.set("user_id", json!(42));
//!
//! let mut response = HeaderMap::new();
//! store.save(&mut response, &mut session).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `messagepack` | disabled | [`MessagePackMarshaler`] |

pub mod backends;
pub mod codec;
pub mod cookie;
pub mod error;
pub mod generator;
pub mod marshal;
pub mod options;
pub mod registry;
pub mod session;
pub mod settings;
pub mod storage;
pub mod store;
pub mod value;

pub use backends::MemoryStorage;
pub use codec::{CookieKey, DEFAULT_CODEC_MAX_AGE, IdCodec, PlainCodec, SecureCookieCodec};
pub use cookie::{RequestCookies, ResponseCookies, SessionCookie};
pub use error::{
	CodecError, CookieError, GenerateError, LoadError, MarshalError, SessionError, StorageError,
};
pub use generator::{IdGenerator, UuidGenerator};
#[cfg(feature = "messagepack")]
pub use marshal::MessagePackMarshaler;
pub use marshal::{JsonMarshaler, Marshaler};
pub use options::{DEFAULT_MAX_AGE, SameSite, SessionOptions};
pub use registry::SessionRegistry;
pub use session::Session;
pub use settings::{SessionSettings, SettingsError};
pub use storage::Storage;
pub use store::SessionStore;
pub use value::{SessionKey, SessionValue, SessionValues};
