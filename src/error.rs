//! Crate-level error types shared across the token cache, redirect gate, and
//! interstitial session.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token endpoint or authenticated-request failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Redirect-side failure classification.
	#[error(transparent)]
	Redirect(#[from] RedirectError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Failures raised while obtaining or using a partner bearer token.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The token endpoint rejected the fixed partner API key. Not retryable without
	/// operator intervention (key rotation).
	#[error("Token endpoint rejected the partner API key (HTTP {status}).")]
	InvalidKey {
		/// HTTP status reported by the endpoint (401 or 403).
		status: u16,
	},
	/// Transient failure fetching a token; the caller may retry later.
	#[error("Token endpoint is unavailable: {message}.")]
	EndpointUnavailable {
		/// Endpoint- or crate-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The token endpoint violated the success-envelope contract.
	#[error("Token endpoint returned a malformed success envelope.")]
	MalformedResponse {
		/// Structured parsing failure pointing at the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl AuthError {
	/// Returns `true` when a later retry may succeed without operator action.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::EndpointUnavailable { .. })
	}
}

/// Redirect-side failure classifications.
///
/// Public redirect APIs resolve these to sentinel values (`None`, or the session's
/// error state) instead of propagating them, because a failed redirect must never
/// break the hosting page. The variants exist so hosts can render or log the cause.
#[derive(Debug, ThisError)]
pub enum RedirectError {
	/// The bank name is absent from both the canonical and alias tables.
	#[error("Bank `{name}` has no whitelisted destination.")]
	UnresolvedBank {
		/// Display name the lookup was attempted with.
		name: String,
	},
	/// The new browsing context was blocked or could not be confirmed open.
	#[error("Browsing context open was blocked; the current page was left untouched.")]
	PopupBlocked,
	/// The destination carried a scheme other than HTTPS (localhost excepted).
	#[error("Destination scheme `{scheme}` is not trusted for navigation.")]
	InvalidTargetScheme {
		/// Scheme found on the destination URL.
		scheme: String,
	},
	/// The destination could not be parsed as a URL at all.
	#[error("Destination is not a valid URL.")]
	InvalidTarget {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is missing.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name the lookup used.
		name: &'static str,
	},
	/// The token endpoint URL cannot be parsed.
	#[error("Token endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the partner endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the partner endpoint.")]
	Io(#[from] std::io::Error),
	/// The request could not be assembled for the transport.
	#[error("Request could not be constructed for the partner endpoint.")]
	Request {
		/// Header or body construction failure.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a request-construction failure.
	pub fn request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Request { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn auth_error_retryability_matches_taxonomy() {
		let unavailable =
			AuthError::EndpointUnavailable { message: "HTTP 503".into(), status: Some(503) };
		let invalid = AuthError::InvalidKey { status: 403 };

		assert!(unavailable.is_retryable());
		assert!(!invalid.is_retryable());
	}

	#[test]
	fn redirect_errors_render_actionable_messages() {
		let unresolved = RedirectError::UnresolvedBank { name: "Random Credit Union".into() };
		let scheme = RedirectError::InvalidTargetScheme { scheme: "http".into() };

		assert!(unresolved.to_string().contains("Random Credit Union"));
		assert!(scheme.to_string().contains("http"));
	}
}
