//! Process-lifetime cached bearer-token record and lifecycle helpers.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer token cached for the lifetime of the process.
///
/// Created on the first successful token fetch, replaced on refresh, and cleared when
/// an authenticated request reports the credential rejected. Never persisted.
#[derive(Clone, Debug)]
pub struct CachedToken {
	/// Opaque bearer-token value; redacted in `Debug` output.
	pub secret: TokenSecret,
	/// Instant the token was received from the endpoint.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry reported by the endpoint.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds a record from the endpoint's success envelope fields.
	pub fn new(secret: TokenSecret, issued_at: OffsetDateTime, expires_at: OffsetDateTime) -> Self {
		Self { secret, issued_at, expires_at }
	}

	/// Returns `true` once the provided instant has reached the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Remaining validity at the provided instant, clamped to zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		(self.expires_at - instant).max(Duration::ZERO)
	}
}
