//! # Cookie Sessions S3
//!
//! Session storage on Amazon S3 or any S3-compatible service.
//!
//! Each session is one object whose key is the configured prefix followed
//! by the session id. Values are converted to bytes by a
//! [`Marshaler`], JSON unless configured otherwise.
//!
//! ```rust,no_run
//! use cookie_sessions_core::SessionStore;
//! use cookie_sessions_s3::{S3Config, S3Storage};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = S3Config::new("my-sessions").with_prefix("sessions/");
//! let storage = S3Storage::from_config(config).await;
//! let store = SessionStore::new(storage);
//! # }
//! ```

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use cookie_sessions_core::settings::S3Settings;
use cookie_sessions_core::{JsonMarshaler, Marshaler, SessionValues, Storage, StorageError};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Object operations needed by [`S3Storage`]
///
/// Implemented for [`aws_sdk_s3::Client`]; tests substitute an in-memory
/// implementation.
#[async_trait]
pub trait ObjectClient: Send + Sync {
	/// Write an object, replacing any existing one
	async fn put(
		&self,
		bucket: &str,
		key: &str,
		body: Vec<u8>,
		content_type: &str,
	) -> Result<(), StorageError>;

	/// Read an object, `None` if it does not exist
	async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

	/// Remove an object; removing a missing object succeeds
	async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl ObjectClient for Client {
	async fn put(
		&self,
		bucket: &str,
		key: &str,
		body: Vec<u8>,
		content_type: &str,
	) -> Result<(), StorageError> {
		let length = body.len() as i64;
		self.put_object()
			.bucket(bucket)
			.key(key)
			.content_length(length)
			.content_type(content_type)
			.body(ByteStream::from(body))
			.send()
			.await
			.map_err(|e| StorageError::backend("s3.PutObject", DisplayErrorContext(&e).to_string()))?;
		Ok(())
	}

	async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
		let output = match self.get_object().bucket(bucket).key(key).send().await {
			Ok(output) => output,
			Err(e) => {
				if e.as_service_error().is_some_and(|e| e.is_no_such_key()) {
					return Ok(None);
				}
				return Err(StorageError::backend(
					"s3.GetObject",
					DisplayErrorContext(&e).to_string(),
				));
			}
		};

		let body = output
			.body
			.collect()
			.await
			.map_err(|e| StorageError::backend("read body", e.to_string()))?;
		Ok(Some(body.into_bytes().to_vec()))
	}

	async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
		self.delete_object()
			.bucket(bucket)
			.key(key)
			.send()
			.await
			.map_err(|e| {
				StorageError::backend("s3.DeleteObject", DisplayErrorContext(&e).to_string())
			})?;
		Ok(())
	}
}

/// Configuration for [`S3Storage::from_config`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
	/// Bucket name
	pub bucket: String,
	/// Prefix prepended to every object key
	pub prefix: String,
	/// AWS region (e.g., "us-east-1"); the default provider chain applies when unset
	pub region: Option<String>,
	/// Custom endpoint URL (for LocalStack or MinIO)
	pub endpoint: Option<String>,
	/// Use path-style addressing, required by most S3-compatible services
	pub force_path_style: bool,
}

impl S3Config {
	/// Configuration for `bucket` with no prefix
	pub fn new(bucket: impl Into<String>) -> Self {
		Self {
			bucket: bucket.into(),
			prefix: String::new(),
			region: None,
			endpoint: None,
			force_path_style: false,
		}
	}

	/// Set the object key prefix
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	/// Set the region
	pub fn with_region(mut self, region: impl Into<String>) -> Self {
		self.region = Some(region.into());
		self
	}

	/// Set a custom endpoint and switch to path-style addressing
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = Some(endpoint.into());
		self.force_path_style = true;
		self
	}
}

impl From<S3Settings> for S3Config {
	fn from(settings: S3Settings) -> Self {
		Self {
			bucket: settings.bucket,
			prefix: settings.prefix,
			region: settings.region,
			endpoint: settings.endpoint,
			force_path_style: settings.force_path_style,
		}
	}
}

/// Session storage backed by S3 objects
#[derive(Clone)]
pub struct S3Storage {
	client: Arc<dyn ObjectClient>,
	bucket: String,
	prefix: String,
	marshaler: Arc<dyn Marshaler>,
}

impl S3Storage {
	/// Create storage over `client` for `bucket`, with no prefix and JSON
	/// values
	pub fn new<C>(client: C, bucket: impl Into<String>) -> Self
	where
		C: ObjectClient + 'static,
	{
		Self {
			client: Arc::new(client),
			bucket: bucket.into(),
			prefix: String::new(),
			marshaler: Arc::new(JsonMarshaler),
		}
	}

	/// Build an SDK client from `config` and the default credential chain
	pub async fn from_config(config: S3Config) -> Self {
		let mut loader = aws_config::defaults(BehaviorVersion::latest());
		if let Some(region) = &config.region {
			loader = loader.region(Region::new(region.clone()));
		}
		if let Some(endpoint) = &config.endpoint {
			loader = loader.endpoint_url(endpoint);
		}
		let shared = loader.load().await;

		let s3_config = aws_sdk_s3::config::Builder::from(&shared)
			.force_path_style(config.force_path_style)
			.build();
		let client = Client::from_conf(s3_config);

		Self::new(client, config.bucket).with_prefix(config.prefix)
	}

	/// Set the object key prefix
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	/// Set the marshaler
	pub fn with_marshaler<M>(mut self, marshaler: M) -> Self
	where
		M: Marshaler + 'static,
	{
		self.marshaler = Arc::new(marshaler);
		self
	}

	/// Bucket name
	pub fn bucket(&self) -> &str {
		&self.bucket
	}

	/// Object key prefix
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	fn object_key(&self, id: &str) -> String {
		format!("{}{}", self.prefix, id)
	}
}

impl fmt::Debug for S3Storage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("S3Storage")
			.field("bucket", &self.bucket)
			.field("prefix", &self.prefix)
			.field("content_type", &self.marshaler.content_type())
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl Storage for S3Storage {
	async fn save(&self, id: &str, values: &SessionValues) -> Result<(), StorageError> {
		let data = self.marshaler.marshal(values)?;
		debug!(bucket = %self.bucket, bytes = data.len(), "writing session object");
		self.client
			.put(
				&self.bucket,
				&self.object_key(id),
				data,
				self.marshaler.content_type(),
			)
			.await
	}

	async fn load(&self, id: &str) -> Result<SessionValues, StorageError> {
		let data = self
			.client
			.get(&self.bucket, &self.object_key(id))
			.await?
			.ok_or_else(|| StorageError::NotFound(id.to_string()))?;
		Ok(self.marshaler.unmarshal(&data)?)
	}

	async fn delete(&self, id: &str) -> Result<(), StorageError> {
		debug!(bucket = %self.bucket, "deleting session object");
		self.client.delete(&self.bucket, &self.object_key(id)).await
	}
}
