//! Interstitial countdown session.
//!
//! The session is a deterministic state machine the host drives: it parses the
//! interstitial address query on construction, validates the target (an empty or
//! non-HTTPS target enters the error state, even though the whitelist only holds
//! HTTPS destinations), then counts down from three.
//! The host calls [`RedirectSession::tick`] once per second; the user may
//! [`continue_now`](RedirectSession::continue_now) or
//! [`cancel`](RedirectSession::cancel) at any point. Navigation happens at most once,
//! no matter how timer ticks and manual actions interleave.

// self
use crate::{
	_prelude::*,
	analytics::{AnalyticsEvent, AnalyticsSink},
	error::RedirectError,
	gate::InterstitialRequest,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Countdown length in ticks.
pub const COUNTDOWN_SECONDS: u8 = 3;
/// Interval at which the host should call [`RedirectSession::tick`].
pub const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_millis(1000);

/// Host seam that performs the actual navigation (sets the browsing context's
/// location). Called at most once per session; the ensuing navigation is expected to
/// tear the session down.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Navigates the current browsing context to the validated target.
	fn navigate(&self, target: &Url);
}
impl<N> Navigator for Arc<N>
where
	N: Navigator + ?Sized,
{
	fn navigate(&self, target: &Url) {
		(**self).navigate(target);
	}
}

/// Observable session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
	/// Countdown in progress; the payload is the number of seconds remaining.
	CountingDown(u8),
	/// Navigation was performed. Terminal.
	Navigated,
	/// The user cancelled; control returned to the prior page. Terminal.
	Cancelled,
	/// The target was missing or untrusted; the page renders the explanatory state.
	/// Terminal, no countdown.
	ErrorNoTarget,
}

/// One navigation attempt's worth of interstitial state.
pub struct RedirectSession<N>
where
	N: Navigator,
{
	request: InterstitialRequest,
	target: Option<Url>,
	status: SessionStatus,
	error: Option<RedirectError>,
	navigated: bool,
	navigator: N,
	analytics: Arc<dyn AnalyticsSink>,
}
impl<N> RedirectSession<N>
where
	N: Navigator,
{
	/// Builds a session from the interstitial address query string.
	pub fn from_query(query: &str, navigator: N, analytics: Arc<dyn AnalyticsSink>) -> Self {
		let request = InterstitialRequest::from_query(query);

		match validate_target(&request) {
			Ok(target) => Self {
				request,
				target: Some(target),
				status: SessionStatus::CountingDown(COUNTDOWN_SECONDS),
				error: None,
				navigated: false,
				navigator,
				analytics,
			},
			Err(error) => Self {
				request,
				target: None,
				status: SessionStatus::ErrorNoTarget,
				error: Some(error),
				navigated: false,
				navigator,
				analytics,
			},
		}
	}

	/// Advances the countdown by one second; navigates on reaching zero. No-op in
	/// terminal states, so a timer that outlives a manual action cannot re-navigate.
	pub fn tick(&mut self) {
		let SessionStatus::CountingDown(remaining) = self.status else {
			return;
		};
		let remaining = remaining.saturating_sub(1);

		self.status = SessionStatus::CountingDown(remaining);

		if remaining == 0 {
			self.navigate();
		}
	}

	/// Navigates immediately, cancelling the remaining countdown.
	pub fn continue_now(&mut self) {
		if matches!(self.status, SessionStatus::CountingDown(_)) {
			self.navigate();
		}
	}

	/// Cancels the countdown and returns control to the prior page. Unconditional and
	/// idempotent: cancelling twice, or after navigation already fired, is a no-op.
	pub fn cancel(&mut self) {
		if matches!(self.status, SessionStatus::CountingDown(_)) {
			self.status = SessionStatus::Cancelled;
		}
	}

	/// Current state.
	pub fn status(&self) -> SessionStatus {
		self.status
	}

	/// Seconds left on the countdown, when one is running.
	pub fn seconds_remaining(&self) -> Option<u8> {
		match self.status {
			SessionStatus::CountingDown(remaining) => Some(remaining),
			_ => None,
		}
	}

	/// Why the session entered [`SessionStatus::ErrorNoTarget`], when it did.
	pub fn error(&self) -> Option<&RedirectError> {
		self.error.as_ref()
	}

	/// Display bank name from the address.
	pub fn bank_name(&self) -> &str {
		&self.request.bank
	}

	/// Display card name from the address.
	pub fn card_name(&self) -> &str {
		&self.request.card
	}

	/// Bank logo URL from the address, when present.
	pub fn bank_logo(&self) -> Option<&str> {
		self.request.logo.as_deref()
	}

	/// Validated destination, when the session has one.
	pub fn target(&self) -> Option<&Url> {
		self.target.as_ref()
	}

	/// Target for the always-present plain hyperlink (immediate manual fallback).
	pub fn fallback_hyperlink(&self) -> Option<&Url> {
		self.target.as_ref()
	}

	/// `content` value for a meta-refresh tag so scripting-disabled consumers still
	/// reach the target after the same delay.
	pub fn meta_refresh_content(&self) -> Option<String> {
		self.target.as_ref().map(|target| format!("{COUNTDOWN_SECONDS};url={target}"))
	}

	fn navigate(&mut self) {
		// Idempotent guard: both the timer and a manual action may request navigation.
		if self.navigated {
			return;
		}

		let Some(target) = self.target.clone() else {
			return;
		};

		self.navigated = true;

		const KIND: OpKind = OpKind::InterstitialNavigate;

		let _guard = OpSpan::new(KIND, "navigate").entered();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		// Best-effort beacon first; the location change tears this context down.
		self.analytics
			.emit(AnalyticsEvent::redirect_confirm(self.request.bank.clone(), self.request.card.clone()));
		self.navigator.navigate(&target);

		self.status = SessionStatus::Navigated;

		obs::record_op_outcome(KIND, OpOutcome::Success);
	}
}
impl<N> Debug for RedirectSession<N>
where
	N: Navigator,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RedirectSession")
			.field("status", &self.status)
			.field("bank", &self.request.bank)
			.field("target", &self.target)
			.finish_non_exhaustive()
	}
}

fn validate_target(request: &InterstitialRequest) -> Result<Url, RedirectError> {
	if request.target.is_empty() {
		return Err(RedirectError::UnresolvedBank { name: request.bank.clone() });
	}

	let target =
		Url::parse(&request.target).map_err(|source| RedirectError::InvalidTarget { source })?;

	if target.scheme() != "https" && !is_localhost(&target) {
		return Err(RedirectError::InvalidTargetScheme { scheme: target.scheme().to_owned() });
	}

	Ok(target)
}

/// Development-only exception to the HTTPS requirement.
fn is_localhost(url: &Url) -> bool {
	matches!(url.host_str(), Some("localhost" | "127.0.0.1"))
}
