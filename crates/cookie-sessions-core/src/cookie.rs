//! Cookie transport
//!
//! The orchestrator reads one named cookie from the request and writes one
//! `Set-Cookie` header to the response. [`RequestCookies`] and
//! [`ResponseCookies`] are the seams to the HTTP layer; implementations are
//! provided for the `http` crate's header map, request and response types.

use crate::error::CookieError;
use crate::options::SessionOptions;
use chrono::{Duration, Utc};
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Request, Response};

const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:01 GMT";

/// Read access to the cookies sent with a request
pub trait RequestCookies {
	/// Value of the first cookie named `name`
	fn cookie(&self, name: &str) -> Option<String>;
}

/// Write access to the cookies set on a response
pub trait ResponseCookies {
	/// Append a `Set-Cookie` for `cookie`
	fn set_cookie(&mut self, cookie: &SessionCookie) -> Result<(), CookieError>;
}

/// A cookie ready to be written to a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
	/// Cookie name
	pub name: String,
	/// Cookie value, empty when the session is being deleted
	pub value: String,
	/// Attributes taken from the session
	pub options: SessionOptions,
}

impl SessionCookie {
	/// Create a cookie
	pub fn new(name: impl Into<String>, value: impl Into<String>, options: SessionOptions) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
			options,
		}
	}

	/// Build the `Set-Cookie` header value
	///
	/// # Examples
	///
	/// ```
	/// use cookie_sessions_core::{SessionCookie, SessionOptions};
	///
	/// let options = SessionOptions::default().with_max_age(0).with_http_only(false);
	/// let cookie = SessionCookie::new("sessionid", "abc", options);
	/// assert_eq!(cookie.to_header_string(), "sessionid=abc; Path=/");
	/// ```
	pub fn to_header_string(&self) -> String {
		let options = &self.options;
		let mut parts = vec![format!("{}={}", self.name, self.value)];

		if !options.path.is_empty() {
			parts.push(format!("Path={}", options.path));
		}

		if let Some(domain) = &options.domain {
			parts.push(format!("Domain={}", domain));
		}

		if options.max_age > 0 {
			if let Some(expires) =
				Duration::try_seconds(options.max_age).and_then(|d| Utc::now().checked_add_signed(d))
			{
				parts.push(format!("Expires={}", expires.format(COOKIE_DATE_FORMAT)));
			}
			parts.push(format!("Max-Age={}", options.max_age));
		} else if options.max_age < 0 {
			parts.push(format!("Expires={}", EXPIRED_DATE));
			parts.push("Max-Age=0".to_string());
		}

		if options.http_only {
			parts.push("HttpOnly".to_string());
		}

		if options.secure {
			parts.push("Secure".to_string());
		}

		if let Some(same_site) = options.same_site.as_attribute() {
			parts.push(format!("SameSite={}", same_site));
		}

		parts.join("; ")
	}
}

impl RequestCookies for HeaderMap {
	fn cookie(&self, name: &str) -> Option<String> {
		self.get_all(COOKIE)
			.iter()
			.filter_map(|header| header.to_str().ok())
			.flat_map(|header| header.split(';'))
			.find_map(|pair| {
				let (key, value) = pair.trim().split_once('=')?;
				if key.trim() != name {
					return None;
				}
				let value = value.trim();
				let value = value
					.strip_prefix('"')
					.and_then(|v| v.strip_suffix('"'))
					.unwrap_or(value);
				Some(value.to_string())
			})
	}
}

impl<B> RequestCookies for Request<B> {
	fn cookie(&self, name: &str) -> Option<String> {
		self.headers().cookie(name)
	}
}

impl ResponseCookies for HeaderMap {
	fn set_cookie(&mut self, cookie: &SessionCookie) -> Result<(), CookieError> {
		let header = HeaderValue::from_str(&cookie.to_header_string()).map_err(|e| {
			CookieError::InvalidHeader {
				name: cookie.name.clone(),
				message: e.to_string(),
			}
		})?;
		self.append(SET_COOKIE, header);
		Ok(())
	}
}

impl<B> ResponseCookies for Response<B> {
	fn set_cookie(&mut self, cookie: &SessionCookie) -> Result<(), CookieError> {
		self.headers_mut().set_cookie(cookie)
	}
}
