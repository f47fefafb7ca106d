//! End-to-end session flows over `http` requests and responses.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cookie_sessions::{
	CookieKey, MemoryStorage, SecureCookieCodec, SessionError, SessionOptions, SessionRegistry,
	SessionSettings, SessionStore, StorageError, build_store,
};
use http::header::{COOKIE, SET_COOKIE};
use http::{Request, Response};
use rstest::*;
use serde_json::json;

/// Turns the Set-Cookie headers of a response into the next request
fn follow_up(response: &Response<()>) -> Request<()> {
	let pairs: Vec<String> = response
		.headers()
		.get_all(SET_COOKIE)
		.iter()
		.filter_map(|v| v.to_str().ok())
		.filter_map(|v| v.split(';').next())
		.map(str::to_string)
		.collect();
	let mut builder = Request::builder().uri("/");
	if !pairs.is_empty() {
		builder = builder.header(COOKIE, pairs.join("; "));
	}
	builder.body(()).unwrap()
}

fn empty_request() -> Request<()> {
	Request::builder().uri("/").body(()).unwrap()
}

fn set_cookie(response: &Response<()>) -> String {
	response
		.headers()
		.get(SET_COOKIE)
		.unwrap()
		.to_str()
		.unwrap()
		.to_string()
}

#[fixture]
fn storage() -> MemoryStorage {
	MemoryStorage::new()
}

#[rstest]
#[tokio::test]
async fn test_values_survive_across_requests(storage: MemoryStorage) {
	// Arrange
	let store = SessionStore::new(storage.clone())
		.with_codec(SecureCookieCodec::new(vec![CookieKey::generate()]))
		.with_options(SessionOptions::default().with_max_age(3600));

	// Act: first request creates the session
	let mut session = store.new_session(&empty_request(), "sid").await.unwrap();
	assert!(session.is_new());
	session.set("cart", json!(["apple"]));
	let mut response = Response::new(());
	store.save(&mut response, &mut session).await.unwrap();

	// Act: second request reads it back and modifies it
	let request = follow_up(&response);
	let mut again = store.new_session(&request, "sid").await.unwrap();
	again.set("cart", json!(["apple", "pear"]));
	let mut response = Response::new(());
	store.save(&mut response, &mut again).await.unwrap();

	// Assert
	let third = store
		.new_session(&follow_up(&response), "sid")
		.await
		.unwrap();
	assert!(!third.is_new());
	assert_eq!(third.id(), session.id());
	assert_eq!(third.get("cart"), Some(&json!(["apple", "pear"])));
	assert_eq!(storage.len().await, 1);
	assert!(set_cookie(&response).contains("Max-Age=3600"));
}

#[rstest]
#[tokio::test]
async fn test_logout_deletes_session(storage: MemoryStorage) {
	let store = SessionStore::new(storage.clone());
	let mut session = store.new_session(&empty_request(), "sid").await.unwrap();
	session.set("user", json!("alice"));
	let mut login = Response::new(());
	store.save(&mut login, &mut session).await.unwrap();
	let stale = follow_up(&login);

	let mut current = store.new_session(&stale, "sid").await.unwrap();
	current.expire();
	let mut logout = Response::new(());
	store.save(&mut logout, &mut current).await.unwrap();

	assert!(set_cookie(&logout).starts_with("sid=;"));
	assert!(set_cookie(&logout).contains("Max-Age=0"));
	assert!(storage.is_empty().await);

	// A replayed cookie no longer resolves
	let err = store.new_session(&stale, "sid").await.unwrap_err();
	assert!(matches!(
		err.error(),
		SessionError::Values(StorageError::NotFound(_))
	));
	assert!(err.session().is_new());
}

#[rstest]
#[tokio::test]
async fn test_key_rotation(storage: MemoryStorage) {
	let old_key = CookieKey::generate();
	let new_key = CookieKey::generate();
	let before = SessionStore::new(storage.clone())
		.with_codec(SecureCookieCodec::new(vec![old_key.clone()]));
	let mut session = before.new_session(&empty_request(), "sid").await.unwrap();
	session.set("n", json!(1));
	let mut response = Response::new(());
	before.save(&mut response, &mut session).await.unwrap();
	let request = follow_up(&response);

	// Rotated: the new key signs, the old key still verifies
	let rotated = SessionStore::new(storage.clone())
		.with_codec(SecureCookieCodec::new(vec![old_key]).with_key(new_key.clone()));
	let loaded = rotated.new_session(&request, "sid").await.unwrap();
	assert_eq!(loaded.get("n"), Some(&json!(1)));

	// Retired: the old key is gone
	let retired =
		SessionStore::new(storage).with_codec(SecureCookieCodec::new(vec![new_key]));
	let err = retired.new_session(&request, "sid").await.unwrap_err();
	assert!(matches!(err.error(), SessionError::Identifier(_)));
	assert!(err.into_session().is_new());
}

#[rstest]
#[tokio::test]
async fn test_registry_over_two_requests(storage: MemoryStorage) {
	let store = SessionStore::new(storage);
	let first = empty_request();
	let mut registry = SessionRegistry::new(&store, &first);
	registry.get("cart").await.set("items", json!(1));
	registry.get("prefs").await.set("theme", json!("dark"));
	let mut response = Response::new(());
	registry.save_all(&mut response).await.unwrap();

	let second = follow_up(&response);
	let mut registry = SessionRegistry::new(&store, &second);

	assert_eq!(registry.get("cart").await.get("items"), Some(&json!(1)));
	assert_eq!(registry.get("prefs").await.get("theme"), Some(&json!("dark")));
	assert!(registry.load_error("cart").is_none());
}

#[rstest]
#[tokio::test]
async fn test_store_from_settings() {
	let text = format!(
		r#"
		[cookie]
		name = "app"
		same_site = "lax"
		secure = true

		[[keys]]
		hash_key = "{}"
		block_key = "{}"
		"#,
		STANDARD.encode([9u8; 64]),
		STANDARD.encode([4u8; 32]),
	);
	let settings = SessionSettings::from_toml_str(&text).unwrap();
	let store = build_store(&settings).await.unwrap();
	let name = settings.cookie.name.as_str();

	let mut session = store.new_session(&empty_request(), name).await.unwrap();
	session.set("k", json!("v"));
	let mut response = Response::new(());
	store.save(&mut response, &mut session).await.unwrap();

	let cookie = set_cookie(&response);
	assert!(cookie.starts_with("app="));
	assert!(cookie.contains("Secure"));
	assert!(cookie.contains("SameSite=Lax"));
	assert!(!cookie.contains(session.id()));

	let loaded = store
		.new_session(&follow_up(&response), name)
		.await
		.unwrap();
	assert_eq!(loaded.get("k"), Some(&json!("v")));
}

#[rstest]
#[tokio::test]
async fn test_concurrent_requests_get_distinct_sessions(storage: MemoryStorage) {
	let store = SessionStore::new(storage.clone());

	let mut handles = Vec::new();
	for i in 0..50 {
		let store = store.clone();
		handles.push(tokio::spawn(async move {
			let request = empty_request();
			let mut session = store.new_session(&request, "sid").await.unwrap();
			session.set("i", json!(i));
			let mut response = Response::new(());
			store.save(&mut response, &mut session).await.unwrap();
			session.id().to_string()
		}));
	}

	let mut ids = std::collections::HashSet::new();
	for handle in handles {
		ids.insert(handle.await.unwrap());
	}
	assert_eq!(ids.len(), 50);
	assert_eq!(storage.len().await, 50);
}
