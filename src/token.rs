//! Bearer-token caching with singleflight deduplication and a single auth retry.
//!
//! [`TokenCache`] owns the only shared mutable state in the crate: the cached token
//! and the guard that collapses concurrent fetches. Callers either receive the cached
//! secret with no network call, piggyback on an in-flight fetch, or trigger exactly
//! one request to the token endpoint. [`TokenCache::authenticated_request`] layers the
//! 401/403 policy on top: invalidate, refetch, retry exactly once, and surface a
//! repeated rejection to the caller as-is.

// crates.io
use http::{HeaderName, HeaderValue, StatusCode, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::{CachedToken, TokenSecret},
	error::{AuthError, TransportError},
	http::{PartnerHttpClient, PartnerRequest, PartnerResponse},
	obs::{self, OpKind, OpOutcome, OpSpan},
	partner::PartnerDescriptor,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Header carrying the bearer token on authenticated partner requests.
pub const PARTNER_TOKEN_HEADER: &str = "partner-token";

#[cfg(feature = "reqwest")]
/// Token cache specialized for the crate's default reqwest transport.
pub type ReqwestTokenCache = TokenCache<ReqwestHttpClient>;

/// JSON body of the token exchange POST.
#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
	#[serde(rename = "x-api-key")]
	api_key: &'a str,
}

/// Minimal probe for the envelope's `status` discriminator.
#[derive(Deserialize)]
struct EnvelopeProbe {
	status: String,
}

/// Success envelope carrying the issued token.
#[derive(Deserialize)]
struct SuccessEnvelope {
	data: TokenGrant,
}

#[derive(Deserialize)]
struct TokenGrant {
	jwttoken: String,
	#[serde(rename = "expiresAt", with = "time::serde::rfc3339")]
	expires_at: OffsetDateTime,
}

/// Process-lifetime bearer-token cache bound to one partner descriptor.
///
/// Clones share cache state, so a cache constructed once per process can be handed to
/// every data-fetching component without reintroducing duplicate token requests.
pub struct TokenCache<C>
where
	C: ?Sized + PartnerHttpClient,
{
	/// HTTP client used for the token exchange and authenticated requests.
	pub http_client: Arc<C>,
	/// Partner endpoint + credential configuration.
	pub descriptor: PartnerDescriptor,
	preemptive_window: Duration,
	state: Arc<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
	cached: Mutex<Option<CachedToken>>,
	fetch_guard: AsyncMutex<()>,
}

impl<C> TokenCache<C>
where
	C: ?Sized + PartnerHttpClient,
{
	/// Creates a cache that reuses the caller-provided transport.
	pub fn with_http_client(
		descriptor: PartnerDescriptor,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			descriptor,
			preemptive_window: Duration::ZERO,
			state: Default::default(),
		}
	}

	/// Refreshes this many seconds before expiry instead of exactly at it. Defaults to
	/// zero (refresh only once `expires_at` has passed). Negative windows clamp to
	/// zero.
	pub fn with_preemptive_window(mut self, window: Duration) -> Self {
		self.preemptive_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Returns a valid bearer token, fetching at most once across concurrent callers.
	pub async fn token(&self) -> Result<TokenSecret> {
		let span = OpSpan::new(OpKind::TokenFetch, "token");

		span.instrument(async move {
			if let Some(secret) = self.fresh_secret_at(OffsetDateTime::now_utc()) {
				return Ok(secret);
			}

			let _singleflight = self.state.fetch_guard.lock().await;

			// A caller that queued behind an in-flight fetch piggybacks on its result
			// instead of issuing a duplicate request.
			if let Some(secret) = self.fresh_secret_at(OffsetDateTime::now_utc()) {
				return Ok(secret);
			}

			obs::record_op_outcome(OpKind::TokenFetch, OpOutcome::Attempt);

			match self.fetch_new_token().await {
				Ok(token) => {
					let secret = token.secret.clone();

					*self.state.cached.lock() = Some(token);

					obs::record_op_outcome(OpKind::TokenFetch, OpOutcome::Success);

					Ok(secret)
				},
				Err(err) => {
					obs::record_op_outcome(OpKind::TokenFetch, OpOutcome::Failure);

					Err(err)
				},
			}
		})
		.await
	}

	/// Clears the cached token so the next [`token`](Self::token) call fetches anew.
	/// Idempotent.
	pub fn invalidate(&self) {
		self.state.cached.lock().take();
	}

	/// Issues `request` with the bearer token attached.
	///
	/// A 401/403 response invalidates the cached token, fetches a fresh one, and
	/// retries exactly once; the retry's response is returned as-is even when it is
	/// another rejection, so a broken upstream credential cannot loop.
	pub async fn authenticated_request(&self, request: PartnerRequest) -> Result<PartnerResponse> {
		const KIND: OpKind = OpKind::AuthenticatedRequest;

		let span = OpSpan::new(KIND, "authenticated_request");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.token().await?;
				let response = self.dispatch(request.clone(), &token).await?;

				if !is_auth_rejection(response.status) {
					return Ok(response);
				}

				self.invalidate();

				let token = self.token().await?;

				self.dispatch(request, &token).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	fn fresh_secret_at(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		self.state
			.cached
			.lock()
			.as_ref()
			.filter(|token| !self.should_refresh(token, now))
			.map(|token| token.secret.clone())
	}

	fn should_refresh(&self, token: &CachedToken, now: OffsetDateTime) -> bool {
		if token.is_expired_at(now) {
			return true;
		}
		if self.preemptive_window.is_zero() {
			return false;
		}

		token.remaining_at(now) <= self.preemptive_window
	}

	async fn fetch_new_token(&self) -> Result<CachedToken> {
		let payload = TokenExchangeRequest { api_key: self.descriptor.api_key.expose() };
		let body = serde_json::to_vec(&payload).map_err(TransportError::request)?;
		let request = PartnerRequest::post(self.descriptor.token_endpoint.clone())
			.with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
			.with_body(body);
		let response = self.http_client.execute(request).await?;
		let status = response.status;

		if is_auth_rejection(status) {
			return Err(AuthError::InvalidKey { status: status.as_u16() }.into());
		}
		if !response.is_success() {
			return Err(AuthError::EndpointUnavailable {
				message: format!("HTTP {status}"),
				status: Some(status.as_u16()),
			}
			.into());
		}

		let probe: EnvelopeProbe = response.json().map_err(|source| {
			AuthError::MalformedResponse { source, status: Some(status.as_u16()) }
		})?;

		if probe.status != "success" {
			return Err(AuthError::EndpointUnavailable {
				message: format!("token endpoint reported `{}`", probe.status),
				status: Some(status.as_u16()),
			}
			.into());
		}

		let envelope: SuccessEnvelope = response.json().map_err(|source| {
			AuthError::MalformedResponse { source, status: Some(status.as_u16()) }
		})?;

		Ok(CachedToken::new(
			TokenSecret::new(envelope.data.jwttoken),
			OffsetDateTime::now_utc(),
			envelope.data.expires_at,
		))
	}

	async fn dispatch(
		&self,
		request: PartnerRequest,
		token: &TokenSecret,
	) -> Result<PartnerResponse> {
		let value = HeaderValue::from_str(token.expose()).map_err(TransportError::request)?;
		let request = request
			.with_header(HeaderName::from_static(PARTNER_TOKEN_HEADER), value)
			.with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(self.http_client.execute(request).await?)
	}
}
#[cfg(feature = "reqwest")]
impl TokenCache<ReqwestHttpClient> {
	/// Creates a cache with the crate's default reqwest-backed transport.
	pub fn new(descriptor: PartnerDescriptor) -> Self {
		Self::with_http_client(descriptor, ReqwestHttpClient::default())
	}
}
impl<C> Clone for TokenCache<C>
where
	C: ?Sized + PartnerHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			descriptor: self.descriptor.clone(),
			preemptive_window: self.preemptive_window,
			state: Arc::clone(&self.state),
		}
	}
}
impl<C> Debug for TokenCache<C>
where
	C: ?Sized + PartnerHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("descriptor", &self.descriptor)
			.field("preemptive_window", &self.preemptive_window)
			.field("cached", &self.state.cached.lock().is_some())
			.finish()
	}
}

fn is_auth_rejection(status: StatusCode) -> bool {
	status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}
