//! Session orchestrator
//!
//! [`SessionStore`] wires a [`Storage`] backend, an [`IdCodec`] and an
//! [`IdGenerator`] together and implements the load/save lifecycle on top of
//! the cookie seams in [`crate::cookie`].

use crate::codec::{IdCodec, PlainCodec};
use crate::cookie::{RequestCookies, ResponseCookies, SessionCookie};
use crate::error::{LoadError, SessionError};
use crate::generator::{IdGenerator, UuidGenerator};
use crate::options::SessionOptions;
use crate::session::Session;
use crate::storage::Storage;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Creates and persists cookie-identified sessions
///
/// The store is immutable after construction and can be shared between
/// concurrent requests.
///
/// # Examples
///
/// ```
/// use cookie_sessions_core::{MemoryStorage, SessionStore};
/// use http::HeaderMap;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() {
///     let store = SessionStore::new(MemoryStorage::new());
///
///     let request = HeaderMap::new();
///     let mut session = store.new_session(&request, "sessionid").await.unwrap();
///     session.set("user_id", json!(42));
///
///     let mut response = HeaderMap::new();
///     store.save(&mut response, &mut session).await.unwrap();
///     assert!(!session.id().is_empty());
///     assert!(response.contains_key(http::header::SET_COOKIE));
/// }
/// ```
#[derive(Clone)]
pub struct SessionStore {
	options: SessionOptions,
	storage: Arc<dyn Storage>,
	codec: Arc<dyn IdCodec>,
	generator: Arc<dyn IdGenerator>,
}

impl SessionStore {
	/// Create a store over `storage` with default options, the identity codec
	/// and UUID v4 ids
	pub fn new<S>(storage: S) -> Self
	where
		S: Storage + 'static,
	{
		Self::from_arc(Arc::new(storage))
	}

	/// Create a store over shared storage
	pub fn from_arc(storage: Arc<dyn Storage>) -> Self {
		Self {
			options: SessionOptions::default(),
			storage,
			codec: Arc::new(PlainCodec),
			generator: Arc::new(UuidGenerator),
		}
	}

	/// Set the template options copied into every new session
	pub fn with_options(mut self, options: SessionOptions) -> Self {
		self.options = options;
		self
	}

	/// Set the codec applied to ids written into cookies
	pub fn with_codec<C>(mut self, codec: C) -> Self
	where
		C: IdCodec + 'static,
	{
		self.codec = Arc::new(codec);
		self
	}

	/// Set the id generator
	pub fn with_generator<G>(mut self, generator: G) -> Self
	where
		G: IdGenerator + 'static,
	{
		self.generator = Arc::new(generator);
		self
	}

	/// Template options for new sessions
	pub fn options(&self) -> &SessionOptions {
		&self.options
	}

	/// The storage backend
	pub fn storage(&self) -> &Arc<dyn Storage> {
		&self.storage
	}

	/// Obtain the session named `name` for a request
	///
	/// Returns a fresh session when the request carries no cookie of that
	/// name, or when the cookie decodes to an empty id. When the cookie is
	/// present but cannot be decoded, or its values cannot be loaded, the
	/// returned [`LoadError`] still carries a fresh, usable session.
	pub async fn new_session<R>(&self, request: &R, name: &str) -> Result<Session, LoadError>
	where
		R: RequestCookies + Sync + ?Sized,
	{
		let mut session = Session::new(name, self.options.clone());

		let Some(value) = request.cookie(name) else {
			return Ok(session);
		};

		let id = match self.codec.decode(name, &value) {
			Ok(id) => id,
			Err(e) => {
				warn!(cookie = name, error = %e, "failed to decode session cookie");
				return Err(LoadError::new(session, SessionError::Identifier(e)));
			}
		};
		if id.is_empty() {
			return Ok(session);
		}

		match self.storage.load(&id).await {
			Ok(values) => {
				debug!(cookie = name, entries = values.len(), "loaded session");
				session.loaded(id, values);
				Ok(session)
			}
			Err(e) => {
				warn!(cookie = name, error = %e, "failed to load session values");
				Err(LoadError::new(session, SessionError::Values(e)))
			}
		}
	}

	/// Persist `session` and write its cookie to `response`
	///
	/// A session whose `max_age` is negative is deleted from storage and its
	/// cookie is cleared. Otherwise an id is generated if the session has
	/// none, the values are saved and the encoded id is written as a cookie.
	/// Generation failures leave both storage and the response untouched.
	pub async fn save<W>(&self, response: &mut W, session: &mut Session) -> Result<(), SessionError>
	where
		W: ResponseCookies + Send + ?Sized,
	{
		if session.options.is_expired() {
			return self.delete(response, session).await;
		}

		if session.id().is_empty() {
			let id = self
				.generator
				.generate()
				.map_err(SessionError::IdentifierGeneration)?;
			if id.trim().is_empty() {
				return Err(SessionError::BlankIdentifier);
			}
			session.assign_id(id);
		}

		self.storage
			.save(session.id(), &session.values)
			.await
			.map_err(SessionError::StorageSave)?;

		let encoded = self
			.codec
			.encode(session.name(), session.id())
			.map_err(SessionError::IdentifierEncode)?;
		let cookie = SessionCookie::new(session.name(), encoded, session.options.clone());
		response.set_cookie(&cookie).map_err(SessionError::Cookie)?;

		session.mark_saved();
		debug!(cookie = session.name(), entries = session.values.len(), "saved session");
		Ok(())
	}

	async fn delete<W>(&self, response: &mut W, session: &Session) -> Result<(), SessionError>
	where
		W: ResponseCookies + Send + ?Sized,
	{
		let deleted = if session.id().is_empty() {
			Ok(())
		} else {
			self.storage
				.delete(session.id())
				.await
				.map_err(SessionError::StorageDelete)
		};

		// The cookie is cleared even when storage refused the delete.
		let cookie = SessionCookie::new(session.name(), "", session.options.clone());
		let cleared = response.set_cookie(&cookie).map_err(SessionError::Cookie);

		match &deleted {
			Ok(()) => debug!(cookie = session.name(), "deleted session"),
			Err(e) => warn!(cookie = session.name(), error = %e, "failed to delete session"),
		}
		deleted?;
		cleared
	}
}

impl fmt::Debug for SessionStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionStore")
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}
