//! Session id codecs
//!
//! A codec transforms a session id into the string placed in the cookie and
//! back. [`PlainCodec`] passes ids through unchanged and is the default.
//! [`SecureCookieCodec`] authenticates (and optionally encrypts) ids with an
//! ordered list of keys to allow key rotation.

use crate::error::CodecError;
use aes_gcm::{
	Aes256Gcm, Nonce,
	aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;
const MIN_HASH_KEY_LEN: usize = 32;
const MAX_VALUE_LEN: usize = 4096;
/// Seconds a timestamp may lie in the future before it is rejected
const MAX_CLOCK_SKEW: i64 = 60;

/// Default lifetime of an encoded value: 30 days
pub const DEFAULT_CODEC_MAX_AGE: u64 = 86400 * 30;

/// Transforms a session id to and from its cookie representation
///
/// `decode(name, encode(name, id))` must return `id` for every valid id.
pub trait IdCodec: Send + Sync {
	/// Encode `id` for the cookie called `name`
	fn encode(&self, name: &str, id: &str) -> Result<String, CodecError>;

	/// Decode the value of the cookie called `name`
	fn decode(&self, name: &str, value: &str) -> Result<String, CodecError>;
}

/// Identity codec; ids are stored in cookies unaltered
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl IdCodec for PlainCodec {
	fn encode(&self, _name: &str, id: &str) -> Result<String, CodecError> {
		Ok(id.to_string())
	}

	fn decode(&self, _name: &str, value: &str) -> Result<String, CodecError> {
		Ok(value.to_string())
	}
}

/// Key material for [`SecureCookieCodec`]
///
/// The hash key authenticates values with HMAC-SHA256 and must be at least
/// 32 bytes. The optional block key encrypts ids with AES-256-GCM.
#[derive(Clone)]
pub struct CookieKey {
	hash_key: Vec<u8>,
	block_key: Option<[u8; 32]>,
}

impl CookieKey {
	/// Create a key from raw bytes
	pub fn new(hash_key: impl Into<Vec<u8>>, block_key: Option<[u8; 32]>) -> Result<Self, CodecError> {
		let hash_key = hash_key.into();
		if hash_key.len() < MIN_HASH_KEY_LEN {
			return Err(CodecError::InvalidKey(format!(
				"hash key must be at least {} bytes, got {}",
				MIN_HASH_KEY_LEN,
				hash_key.len()
			)));
		}
		Ok(Self {
			hash_key,
			block_key,
		})
	}

	/// Create a key from a block key given as a byte slice
	pub fn with_block_key_slice(
		hash_key: impl Into<Vec<u8>>,
		block_key: &[u8],
	) -> Result<Self, CodecError> {
		let block_key: [u8; 32] = block_key.try_into().map_err(|_| {
			CodecError::InvalidKey(format!(
				"block key must be exactly 32 bytes, got {}",
				block_key.len()
			))
		})?;
		Self::new(hash_key, Some(block_key))
	}

	/// Generate random hash and block keys
	pub fn generate() -> Self {
		let mut rng = rand::thread_rng();
		let mut hash_key = vec![0u8; 64];
		rng.fill_bytes(&mut hash_key);
		let mut block_key = [0u8; 32];
		rng.fill_bytes(&mut block_key);
		Self {
			hash_key,
			block_key: Some(block_key),
		}
	}

	/// Whether ids are encrypted as well as authenticated
	pub fn encrypts(&self) -> bool {
		self.block_key.is_some()
	}

	fn mac(&self, message: &[u8]) -> Result<HmacSha256, CodecError> {
		let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.hash_key)
			.map_err(|e| CodecError::InvalidKey(e.to_string()))?;
		mac.update(message);
		Ok(mac)
	}

	fn encrypt(&self, block_key: &[u8; 32], id: &str) -> Result<Vec<u8>, CodecError> {
		let cipher = Aes256Gcm::new_from_slice(block_key)
			.map_err(|e| CodecError::Encryption(e.to_string()))?;

		let mut nonce_bytes = [0u8; NONCE_LEN];
		rand::thread_rng().fill_bytes(&mut nonce_bytes);

		let ciphertext = cipher
			.encrypt(Nonce::from_slice(&nonce_bytes), id.as_bytes())
			.map_err(|e| CodecError::Encryption(e.to_string()))?;

		let mut result = nonce_bytes.to_vec();
		result.extend_from_slice(&ciphertext);
		Ok(result)
	}

	fn decrypt(&self, block_key: &[u8; 32], data: &[u8]) -> Result<Vec<u8>, CodecError> {
		if data.len() < NONCE_LEN {
			return Err(CodecError::Decryption("encrypted value too short".to_string()));
		}
		let cipher = Aes256Gcm::new_from_slice(block_key)
			.map_err(|e| CodecError::Decryption(e.to_string()))?;

		let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
		cipher
			.decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
			.map_err(|e| CodecError::Decryption(e.to_string()))
	}
}

impl fmt::Debug for CookieKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CookieKey")
			.field("hash_key", &"<redacted>")
			.field("encrypts", &self.encrypts())
			.finish()
	}
}

/// Authenticated, optionally encrypted, id codec with key rotation
///
/// Values are encoded with the first key. Decoding tries every key in order,
/// so values written under a superseded key stay readable while that key is
/// still configured.
///
/// The cookie value is `base64url(timestamp|payload|hex(hmac))` where the
/// HMAC covers `name|timestamp|payload`, binding the value to its cookie name.
///
/// # Examples
///
/// ```
/// use cookie_sessions_core::{CookieKey, IdCodec, SecureCookieCodec};
///
/// let old_key = CookieKey::generate();
/// let old_codec = SecureCookieCodec::new(vec![old_key.clone()]);
/// let value = old_codec.encode("sessionid", "abc").unwrap();
///
/// // Rotate: the new key signs, the old one still verifies.
/// let codec = SecureCookieCodec::new(vec![old_key]).with_key(CookieKey::generate());
/// assert_eq!(codec.decode("sessionid", &value).unwrap(), "abc");
/// ```
#[derive(Debug, Clone)]
pub struct SecureCookieCodec {
	keys: Vec<CookieKey>,
	max_age: u64,
}

impl SecureCookieCodec {
	/// Create a codec; the first key encodes, all keys decode
	pub fn new(keys: Vec<CookieKey>) -> Self {
		Self {
			keys,
			max_age: DEFAULT_CODEC_MAX_AGE,
		}
	}

	/// Make `key` the encoding key, keeping existing keys for decoding
	pub fn with_key(mut self, key: CookieKey) -> Self {
		self.keys.insert(0, key);
		self
	}

	/// Set the maximum age of accepted values in seconds; `0` disables the check
	pub fn with_max_age(mut self, max_age: u64) -> Self {
		self.max_age = max_age;
		self
	}

	/// Configured keys, encoding key first
	pub fn keys(&self) -> &[CookieKey] {
		&self.keys
	}

	fn encode_with(&self, key: &CookieKey, name: &str, id: &str) -> Result<String, CodecError> {
		let payload = match &key.block_key {
			Some(block_key) => URL_SAFE_NO_PAD.encode(key.encrypt(block_key, id)?),
			None => URL_SAFE_NO_PAD.encode(id.as_bytes()),
		};
		let timestamp = Utc::now().timestamp();

		let mac = key
			.mac(format!("{}|{}|{}", name, timestamp, payload).as_bytes())?
			.finalize()
			.into_bytes();
		let encoded = URL_SAFE_NO_PAD.encode(format!(
			"{}|{}|{}",
			timestamp,
			payload,
			hex::encode(mac)
		));

		if encoded.len() > MAX_VALUE_LEN {
			return Err(CodecError::Malformed("encoded value too long"));
		}
		Ok(encoded)
	}

	fn decode_with(&self, key: &CookieKey, name: &str, value: &str) -> Result<String, CodecError> {
		if value.len() > MAX_VALUE_LEN {
			return Err(CodecError::Malformed("value too long"));
		}
		let decoded = URL_SAFE_NO_PAD
			.decode(value)
			.map_err(|_| CodecError::Malformed("invalid base64"))?;
		let decoded =
			String::from_utf8(decoded).map_err(|_| CodecError::Malformed("invalid encoding"))?;

		let parts: Vec<&str> = decoded.splitn(3, '|').collect();
		let [timestamp, payload, mac_hex] = parts.as_slice() else {
			return Err(CodecError::Malformed("expected timestamp|payload|mac"));
		};

		let provided_mac =
			hex::decode(mac_hex).map_err(|_| CodecError::Malformed("invalid signature"))?;
		key.mac(format!("{}|{}|{}", name, timestamp, payload).as_bytes())?
			.verify_slice(&provided_mac)
			.map_err(|_| CodecError::InvalidMac)?;

		let timestamp: i64 = timestamp
			.parse()
			.map_err(|_| CodecError::Malformed("invalid timestamp"))?;
		let now = Utc::now().timestamp();
		if timestamp.saturating_sub(now) > MAX_CLOCK_SKEW {
			return Err(CodecError::Expired);
		}
		if self.max_age > 0 {
			let age = now.saturating_sub(timestamp);
			if age > 0 && age.unsigned_abs() > self.max_age {
				return Err(CodecError::Expired);
			}
		}

		let payload = URL_SAFE_NO_PAD
			.decode(payload)
			.map_err(|_| CodecError::Malformed("invalid payload"))?;
		let id = match &key.block_key {
			Some(block_key) => key.decrypt(block_key, &payload)?,
			None => payload,
		};
		String::from_utf8(id).map_err(|_| CodecError::Malformed("invalid id encoding"))
	}
}

impl IdCodec for SecureCookieCodec {
	fn encode(&self, name: &str, id: &str) -> Result<String, CodecError> {
		let key = self.keys.first().ok_or(CodecError::NoKeys)?;
		self.encode_with(key, name, id)
	}

	fn decode(&self, name: &str, value: &str) -> Result<String, CodecError> {
		let mut last_error = CodecError::NoKeys;
		for key in &self.keys {
			match self.decode_with(key, name, value) {
				Ok(id) => return Ok(id),
				Err(e) => last_error = e,
			}
		}
		match last_error {
			CodecError::NoKeys => Err(CodecError::NoKeys),
			e => Err(CodecError::NoValidKey(Box::new(e))),
		}
	}
}
