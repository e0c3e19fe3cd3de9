//! Transport primitives for partner API calls.
//!
//! The module exposes [`PartnerHttpClient`] so downstream crates can integrate custom
//! HTTP clients. Unlike a full middleware stack, the contract is deliberately small:
//! one method that executes a [`PartnerRequest`] and resolves to a buffered
//! [`PartnerResponse`], leaving status-based policy (auth retries, envelope checks)
//! to the token cache.

// std
use std::ops::Deref;
// crates.io
use http::{HeaderMap, Method, StatusCode};
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`PartnerHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<PartnerResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing partner API calls.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so they can be shared behind `Arc<C>` across token caches
/// without additional wrappers, and the futures they return must be `Send` so callers
/// can hop executors freely.
pub trait PartnerHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and resolves once the full response body is buffered.
	fn execute(&self, request: PartnerRequest) -> TransportFuture<'_>;
}

/// Buffered outbound request handed to a [`PartnerHttpClient`].
///
/// The body is owned bytes so the token cache can clone the request up front and
/// replay an identical payload on its single auth retry.
#[derive(Clone, Debug)]
pub struct PartnerRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Headers to send verbatim; the token cache adds `partner-token` on dispatch.
	pub headers: HeaderMap,
	/// Request body bytes (empty for body-less methods).
	pub body: Vec<u8>,
}
impl PartnerRequest {
	/// Creates a `GET` request for the provided URL.
	pub fn get(url: Url) -> Self {
		Self { method: Method::GET, url, headers: HeaderMap::new(), body: Vec::new() }
	}

	/// Creates a `POST` request for the provided URL.
	pub fn post(url: Url) -> Self {
		Self { method: Method::POST, url, headers: HeaderMap::new(), body: Vec::new() }
	}

	/// Inserts (or replaces) a header.
	pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Replaces the request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}
}

/// Buffered response produced by a [`PartnerHttpClient`].
#[derive(Clone, Debug)]
pub struct PartnerResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Full response body bytes.
	pub body: Vec<u8>,
}
impl PartnerResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Deserializes the body as JSON, reporting the path of the offending field on
	/// failure.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: serde::de::DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client from a caller-configured [`reqwest::ClientBuilder`].
	pub fn from_builder(
		builder: reqwest::ClientBuilder,
	) -> Result<Self, crate::error::ConfigError> {
		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl PartnerHttpClient for ReqwestHttpClient {
	fn execute(&self, request: PartnerRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client
				.request(request.method, request.url.as_str())
				.headers(request.headers)
				.body(request.body)
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(PartnerResponse { status, headers, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde::Deserialize;
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Probe {
		status: String,
	}

	#[test]
	fn json_reports_offending_path() {
		let response = PartnerResponse {
			status: StatusCode::OK,
			headers: HeaderMap::new(),
			body: b"{\"status\":42}".to_vec(),
		};
		let err = response.json::<Probe>().expect_err("Numeric status should fail to parse.");

		assert_eq!(err.path().to_string(), "status");
	}

	#[test]
	fn request_builders_compose() {
		let url = Url::parse("https://api.example.com/cards").expect("Fixture URL should parse.");
		let request = PartnerRequest::post(url)
			.with_header(
				http::header::CONTENT_TYPE,
				http::HeaderValue::from_static("application/json"),
			)
			.with_body(b"{}".to_vec());

		assert_eq!(request.method, Method::POST);
		assert_eq!(request.body, b"{}");
		assert!(request.headers.contains_key(http::header::CONTENT_TYPE));
	}
}
