//! Partner endpoint configuration.
//!
//! The descriptor carries the two build/deploy-time facts the token cache needs: the
//! token endpoint URL and the fixed shared API key. The key is externalized through
//! the environment instead of being hard-coded; the behavioral contract (one key,
//! periodically exchanged for a short-lived token) is unchanged.

// std
use std::env;
// self
use crate::{_prelude::*, auth::ApiKey, error::ConfigError};

/// Environment variable holding the token endpoint URL.
pub const TOKEN_ENDPOINT_VAR: &str = "HANDOFF_TOKEN_ENDPOINT";
/// Environment variable holding the partner API key.
pub const API_KEY_VAR: &str = "HANDOFF_API_KEY";

/// Immutable partner configuration consumed by the token cache.
#[derive(Clone, Debug)]
pub struct PartnerDescriptor {
	/// Token-issuing endpoint; receives the `x-api-key` exchange POST.
	pub token_endpoint: Url,
	/// Fixed shared secret presented to the token endpoint.
	pub api_key: ApiKey,
}
impl PartnerDescriptor {
	/// Creates a descriptor from explicit parts.
	pub fn new(token_endpoint: Url, api_key: ApiKey) -> Self {
		Self { token_endpoint, api_key }
	}

	/// Reads the descriptor from `HANDOFF_TOKEN_ENDPOINT` and `HANDOFF_API_KEY`.
	pub fn from_env() -> Result<Self, ConfigError> {
		let endpoint = env::var(TOKEN_ENDPOINT_VAR)
			.map_err(|_| ConfigError::MissingEnv { name: TOKEN_ENDPOINT_VAR })?;
		let token_endpoint =
			Url::parse(&endpoint).map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let api_key =
			env::var(API_KEY_VAR).map_err(|_| ConfigError::MissingEnv { name: API_KEY_VAR })?;

		Ok(Self::new(token_endpoint, ApiKey::new(api_key)))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_output_redacts_the_api_key() {
		let descriptor = PartnerDescriptor::new(
			Url::parse("https://partner.example.com/token").expect("Fixture URL should parse."),
			ApiKey::new("do-not-log-me"),
		);
		let rendered = format!("{descriptor:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("do-not-log-me"));
	}
}
