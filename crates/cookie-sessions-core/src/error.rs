//! Error types for session handling.
//!
//! Each capability boundary has its own error enum so that backends and codecs
//! stay independent of the orchestrator. [`SessionError`] is what
//! [`SessionStore`](crate::SessionStore) surfaces to callers: it names the
//! failing lifecycle stage and wraps the backend-specific cause.

use crate::session::Session;
use crate::value::SessionKey;
use thiserror::Error;

/// Marshaler errors
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MarshalError {
	/// The marshaler only supports string keys
	#[error("only string keys are supported, got {0}")]
	NonStringKey(SessionKey),

	/// JSON encoding or decoding failed
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// MessagePack encoding failed
	#[cfg(feature = "messagepack")]
	#[error("MessagePack error: {0}")]
	MessagePackEncode(#[from] rmp_serde::encode::Error),

	/// MessagePack decoding failed
	#[cfg(feature = "messagepack")]
	#[error("MessagePack decode error: {0}")]
	MessagePackDecode(#[from] rmp_serde::decode::Error),

	/// Payload decoded but is not a key/value mapping
	#[error("invalid payload: {0}")]
	InvalidPayload(String),
}

/// Storage backend errors
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StorageError {
	/// No values are stored under the id
	#[error("no value found for id: {0}")]
	NotFound(String),

	/// Values could not be converted to or from bytes
	#[error("Marshaler: {0}")]
	Marshal(#[from] MarshalError),

	/// The backing service reported a failure
	#[error("{operation}: {message}")]
	Backend {
		/// Backend operation that failed, e.g. `s3.PutObject`
		operation: &'static str,
		/// Description of the failure
		message: String,
	},
}

impl StorageError {
	/// Wrap a backend failure with the operation that produced it.
	pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
		Self::Backend {
			operation,
			message: message.into(),
		}
	}

	/// Whether this error reports a missing entry.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_))
	}
}

/// Identifier codec errors
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
	/// The encoded value does not have the expected structure
	#[error("malformed value: {0}")]
	Malformed(&'static str),

	/// Authentication of the value failed
	#[error("the value is not valid")]
	InvalidMac,

	/// The value's timestamp is outside the accepted window
	#[error("the value has expired")]
	Expired,

	/// Encryption of the identifier failed
	#[error("encryption failed: {0}")]
	Encryption(String),

	/// Decryption of the identifier failed
	#[error("decryption failed: {0}")]
	Decryption(String),

	/// Key material is unusable
	#[error("invalid key: {0}")]
	InvalidKey(String),

	/// The codec has no keys configured
	#[error("no keys configured")]
	NoKeys,

	/// Every configured key rejected the value
	#[error("no configured key could decode the value: {0}")]
	NoValidKey(Box<CodecError>),
}

/// Identifier generator errors
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GenerateError {
	/// The underlying source of identifiers failed
	#[error("{0}")]
	Source(String),
}

/// Cookie transport errors
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CookieError {
	/// The rendered cookie cannot be carried in a header
	#[error("invalid Set-Cookie header for {name}: {message}")]
	InvalidHeader {
		/// Cookie name
		name: String,
		/// Description of the failure
		message: String,
	},
}

/// Errors returned by the session orchestrator.
///
/// Callers can match on the variant to learn which stage of the lifecycle
/// failed without inspecting backend-specific causes.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
	/// The cookie was present but could not be decoded into an id
	#[error("failed to read session id: IdCodec::decode: {0}")]
	Identifier(#[source] CodecError),

	/// The id decoded but its values could not be loaded
	#[error("failed to read session values: Storage::load: {0}")]
	Values(#[source] StorageError),

	/// The generator failed to produce a new id
	#[error("IdGenerator::generate: {0}")]
	IdentifierGeneration(#[source] GenerateError),

	/// The generator reported success with a blank id
	#[error("IdGenerator::generate returned a blank id")]
	BlankIdentifier,

	/// Storage rejected the values
	#[error("Storage::save: {0}")]
	StorageSave(#[source] StorageError),

	/// Storage failed to delete the session
	#[error("Storage::delete: {0}")]
	StorageDelete(#[source] StorageError),

	/// The stored id could not be encoded for the cookie
	#[error("IdCodec::encode: {0}")]
	IdentifierEncode(#[source] CodecError),

	/// The cookie transport refused the cookie
	#[error("ResponseCookies::set_cookie: {0}")]
	Cookie(#[source] CookieError),
}

impl SessionError {
	/// Whether the error came from id generation, including blank results.
	pub fn is_identifier_generation(&self) -> bool {
		matches!(self, Self::IdentifierGeneration(_) | Self::BlankIdentifier)
	}
}

/// A session could not be recovered, but a fresh session is available
///
/// Returned by [`SessionStore::new_session`](crate::SessionStore::new_session)
/// when the cookie could not be decoded or its values could not be loaded.
/// The carried session is blank and safe to use.
///
/// ```
/// # use cookie_sessions_core::{LoadError, Session, SessionError, CodecError, SessionOptions};
/// # let err = LoadError::new(
/// #     Session::new("sid", SessionOptions::default()),
/// #     SessionError::Identifier(CodecError::InvalidMac),
/// # );
/// let session = err.into_session();
/// assert!(session.is_new());
/// ```
#[derive(Debug, Error)]
#[error("{source}")]
pub struct LoadError {
	session: Box<Session>,
	source: SessionError,
}

impl LoadError {
	/// Pair a fresh session with the error that prevented loading
	pub fn new(session: Session, source: SessionError) -> Self {
		Self {
			session: Box::new(session),
			source,
		}
	}

	/// The fresh session
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// The error that prevented loading
	pub fn error(&self) -> &SessionError {
		&self.source
	}

	/// Discard the error and keep the fresh session
	pub fn into_session(self) -> Session {
		*self.session
	}

	/// Split into the fresh session and the error
	pub fn into_parts(self) -> (Session, SessionError) {
		(*self.session, self.source)
	}
}
