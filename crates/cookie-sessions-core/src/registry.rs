//! Per-request session cache

use crate::cookie::{RequestCookies, ResponseCookies};
use crate::error::SessionError;
use crate::session::Session;
use crate::store::SessionStore;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

struct Slot {
	session: Session,
	error: Option<SessionError>,
}

/// Caches the sessions obtained during one request
///
/// Handlers that ask for the same session name repeatedly get the same
/// [`Session`] instead of reloading it from storage.
///
/// # Examples
///
/// ```
/// use cookie_sessions_core::{MemoryStorage, SessionRegistry, SessionStore};
/// use http::HeaderMap;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() {
///     let store = SessionStore::new(MemoryStorage::new());
///     let request = HeaderMap::new();
///     let mut registry = SessionRegistry::new(&store, &request);
///
///     registry.get("cart").await.set("items", json!(2));
///     assert_eq!(registry.get("cart").await.get("items"), Some(&json!(2)));
///
///     let mut response = HeaderMap::new();
///     registry.save_all(&mut response).await.unwrap();
/// }
/// ```
pub struct SessionRegistry<'a, R: ?Sized> {
	store: &'a SessionStore,
	request: &'a R,
	sessions: HashMap<String, Slot>,
}

impl<'a, R> SessionRegistry<'a, R>
where
	R: RequestCookies + Sync + ?Sized,
{
	/// Create an empty registry for `request`
	pub fn new(store: &'a SessionStore, request: &'a R) -> Self {
		Self {
			store,
			request,
			sessions: HashMap::new(),
		}
	}

	/// Get the session named `name`, loading it on first use
	///
	/// A session that failed to load is replaced by a fresh one; the
	/// failure stays available through [`load_error`](Self::load_error).
	pub async fn get(&mut self, name: &str) -> &mut Session {
		let store = self.store;
		let request = self.request;
		match self.sessions.entry(name.to_string()) {
			Entry::Occupied(slot) => &mut slot.into_mut().session,
			Entry::Vacant(vacant) => {
				let slot = match store.new_session(request, name).await {
					Ok(session) => Slot {
						session,
						error: None,
					},
					Err(e) => {
						let (session, error) = e.into_parts();
						Slot {
							session,
							error: Some(error),
						}
					}
				};
				&mut vacant.insert(slot).session
			}
		}
	}

	/// The error recorded when `name` was first loaded, if any
	pub fn load_error(&self, name: &str) -> Option<&SessionError> {
		self.sessions.get(name).and_then(|slot| slot.error.as_ref())
	}

	/// Whether `name` has been loaded by this registry
	pub fn contains(&self, name: &str) -> bool {
		self.sessions.contains_key(name)
	}

	/// Save every loaded session, in name order
	///
	/// Stops at the first failure.
	pub async fn save_all<W>(&mut self, response: &mut W) -> Result<(), SessionError>
	where
		W: ResponseCookies + Send + ?Sized,
	{
		let mut names: Vec<String> = self.sessions.keys().cloned().collect();
		names.sort();

		for name in names {
			if let Some(slot) = self.sessions.get_mut(&name) {
				self.store.save(response, &mut slot.session).await?;
			}
		}
		Ok(())
	}
}
