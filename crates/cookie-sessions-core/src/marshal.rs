//! Conversion of session values to bytes for byte-oriented storage
//!
//! ## Available Marshalers
//!
//! - **JSON** (always available): human-readable, `application/json`
//! - **MessagePack** (feature: `messagepack`): compact binary, `application/msgpack`
//!
//! Both formats only support [`SessionKey::Name`] keys. Marshaling a value set
//! that contains an integer key fails with [`MarshalError::NonStringKey`]
//! instead of dropping or coercing the key.
//!
//! ## Example
//!
//! ```rust
//! use cookie_sessions_core::{JsonMarshaler, Marshaler, SessionValues};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut values = SessionValues::new();
//! values.set("user_id", json!(42));
//!
//! let marshaler = JsonMarshaler;
//! let bytes = marshaler.marshal(&values)?;
//! assert_eq!(marshaler.unmarshal(&bytes)?, values);
//! assert_eq!(marshaler.content_type(), "application/json");
//! # Ok(())
//! # }
//! ```

use crate::error::MarshalError;
use crate::value::{SessionKey, SessionValues};
use serde_json::{Map, Value};

/// Converts session values to and from bytes
///
/// Implementations must round-trip every value set they successfully marshal.
pub trait Marshaler: Send + Sync {
	/// Encode values as bytes
	fn marshal(&self, values: &SessionValues) -> Result<Vec<u8>, MarshalError>;

	/// Decode bytes produced by [`Marshaler::marshal`]
	fn unmarshal(&self, data: &[u8]) -> Result<SessionValues, MarshalError>;

	/// MIME type of the encoded bytes
	fn content_type(&self) -> &str;
}

/// Build a string-keyed map, rejecting integer keys
fn string_keyed(values: &SessionValues) -> Result<Map<String, Value>, MarshalError> {
	values
		.iter()
		.map(|(key, value)| match key {
			SessionKey::Name(name) => Ok((name.clone(), value.clone())),
			SessionKey::Index(_) => Err(MarshalError::NonStringKey(key.clone())),
		})
		.collect()
}

fn from_string_keyed(decoded: Value) -> Result<SessionValues, MarshalError> {
	match decoded {
		Value::Object(map) => Ok(map
			.into_iter()
			.map(|(name, value)| (SessionKey::Name(name), value))
			.collect()),
		other => Err(MarshalError::InvalidPayload(format!(
			"expected a map, found {}",
			type_name(&other)
		))),
	}
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "a map",
	}
}

/// JSON marshaler
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaler;

impl Marshaler for JsonMarshaler {
	fn marshal(&self, values: &SessionValues) -> Result<Vec<u8>, MarshalError> {
		let map = string_keyed(values)?;
		Ok(serde_json::to_vec(&map)?)
	}

	fn unmarshal(&self, data: &[u8]) -> Result<SessionValues, MarshalError> {
		let decoded: Value = serde_json::from_slice(data)?;
		from_string_keyed(decoded)
	}

	fn content_type(&self) -> &str {
		"application/json"
	}
}

/// MessagePack marshaler
#[cfg(feature = "messagepack")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackMarshaler;

#[cfg(feature = "messagepack")]
impl Marshaler for MessagePackMarshaler {
	fn marshal(&self, values: &SessionValues) -> Result<Vec<u8>, MarshalError> {
		let map = string_keyed(values)?;
		Ok(rmp_serde::to_vec_named(&map)?)
	}

	fn unmarshal(&self, data: &[u8]) -> Result<SessionValues, MarshalError> {
		let decoded: Value = rmp_serde::from_slice(data)?;
		from_string_keyed(decoded)
	}

	fn content_type(&self) -> &str {
		"application/msgpack"
	}
}
