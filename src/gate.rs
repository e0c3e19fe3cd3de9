//! Redirect gate: whitelisted bank resolution and safe interstitial opening.
//!
//! The gate converts an untrusted, upstream-supplied bank-name string plus card
//! metadata into an interstitial address whose destination only ever comes from the
//! fixed whitelist in [`banks`]. The caller-supplied name is a lookup key, never a
//! navigation target. When the new browsing context is blocked the gate returns
//! `None` and leaves the caller's page untouched; a blocked popup must never degrade
//! into redirecting the current tab.

pub mod address;
pub mod banks;

pub use address::*;
pub use banks::*;

// self
use crate::{
	_prelude::*,
	analytics::{AnalyticsEvent, AnalyticsSink},
	error::RedirectError,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Resolves a free-form bank name to its whitelisted destination, or `None` when the
/// name is absent from both the canonical and alias tables. Pure.
pub fn resolve_bank_url(raw: &str) -> Option<Url> {
	BankKey::resolve(raw).map(|key| key.destination().clone())
}

/// Checks a URL's hostname against an allow-list (exact match or `.suffix` match).
///
/// An empty allow-list defers to other validation layers and returns `true`; any
/// URL-parse failure returns `false`. Pure.
pub fn is_allowed_domain(url: &str, allowed_domains: &[&str]) -> bool {
	let Ok(parsed) = Url::parse(url) else {
		return false;
	};
	let Some(hostname) = parsed.host_str() else {
		return false;
	};
	let hostname = hostname.to_lowercase();

	if allowed_domains.is_empty() {
		return true;
	}

	allowed_domains.iter().any(|domain| {
		let domain = domain.to_lowercase();

		hostname == domain || hostname.ends_with(&format!(".{domain}"))
	})
}

/// Card metadata accompanying a redirect attempt. The bank name is used purely as a
/// whitelist lookup key; none of these fields ever becomes the navigation target.
#[derive(Clone, Debug)]
pub struct RedirectParams {
	/// Free-form bank name as emitted by the upstream card-data API.
	pub bank_name: String,
	/// Optional bank logo for the interstitial, display only.
	pub bank_logo: Option<Url>,
	/// Display card name.
	pub card_name: String,
	/// Optional card identifier, analytics only.
	pub card_id: Option<String>,
}

/// Handle to a newly opened browsing context.
pub trait ContextHandle {
	/// Returns `true` when the context is already closed or its state cannot be
	/// determined; both are treated as a blocked open.
	fn is_closed(&self) -> bool;
}

/// Host seam for opening new browsing contexts.
pub trait ContextOpener
where
	Self: Send + Sync,
{
	/// Concrete handle type returned on a confirmed open.
	type Handle: ContextHandle;

	/// Opens the interstitial address in a new, script-isolated context (the
	/// `noopener`/`noreferrer` contract: the new context must not hold a handle back
	/// to the opener). Returns `None` when the open was blocked outright.
	fn open_isolated(&self, address: &InterstitialAddress) -> Option<Self::Handle>;
}

/// Opens interstitials for whitelisted banks without ever trusting caller URLs.
#[derive(Clone)]
pub struct RedirectGate<O>
where
	O: ContextOpener,
{
	opener: O,
	analytics: Arc<dyn AnalyticsSink>,
	user_agent: Option<String>,
}
impl<O> Debug for RedirectGate<O>
where
	O: ContextOpener,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RedirectGate").finish_non_exhaustive()
	}
}
impl<O> RedirectGate<O>
where
	O: ContextOpener,
{
	/// Creates a gate over the host's context opener and beacon sink.
	pub fn new(opener: O, analytics: Arc<dyn AnalyticsSink>) -> Self {
		Self { opener, analytics, user_agent: None }
	}

	/// Attaches the reporting user agent stamped onto every apply-click beacon.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Opens the interstitial for `params`, returning the new context's handle.
	///
	/// An unresolved bank still opens the interstitial with an empty target so the
	/// countdown page can render its explanatory state. A blocked or undetermined
	/// open resolves to `None`; the caller's own page is never mutated in response.
	pub fn open_interstitial(&self, params: &RedirectParams) -> Option<O::Handle> {
		self.try_open_interstitial(params).ok()
	}

	/// Like [`open_interstitial`](Self::open_interstitial), but reports why the open
	/// failed so hosts can log or surface popup guidance.
	pub fn try_open_interstitial(
		&self,
		params: &RedirectParams,
	) -> Result<O::Handle, RedirectError> {
		const KIND: OpKind = OpKind::RedirectOpen;

		let _guard = OpSpan::new(KIND, "open_interstitial").entered();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let destination = resolve_bank_url(&params.bank_name);
		let address = InterstitialAddress::new(destination.as_ref(), params);

		let mut event = AnalyticsEvent::apply_click(
			params.bank_name.clone(),
			params.card_name.clone(),
			destination.as_ref(),
		);

		if let Some(user_agent) = &self.user_agent {
			event = event.with_user_agent(user_agent.clone());
		}

		// Fire-and-forget: a lost beacon never blocks or fails the redirect.
		self.analytics.emit(event);

		match self.opener.open_isolated(&address) {
			Some(handle) if !handle.is_closed() => {
				obs::record_op_outcome(KIND, OpOutcome::Success);

				Ok(handle)
			},
			_ => {
				obs::record_op_outcome(KIND, OpOutcome::Failure);

				Err(RedirectError::PopupBlocked)
			},
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::analytics::MemorySink;

	/// Opener stub with a scripted outcome; counts every navigation-capable action it
	/// performs so tests can assert the caller page stayed untouched.
	struct ScriptedOpener {
		outcome: Outcome,
		opens: AtomicUsize,
	}
	enum Outcome {
		Open,
		OpenButClosed,
		Blocked,
	}
	impl ScriptedOpener {
		fn new(outcome: Outcome) -> Self {
			Self { outcome, opens: AtomicUsize::new(0) }
		}
	}
	#[derive(Debug)]
	struct FakeHandle {
		closed: bool,
	}
	impl ContextHandle for FakeHandle {
		fn is_closed(&self) -> bool {
			self.closed
		}
	}
	impl ContextOpener for ScriptedOpener {
		type Handle = FakeHandle;

		fn open_isolated(&self, _address: &InterstitialAddress) -> Option<Self::Handle> {
			self.opens.fetch_add(1, Ordering::SeqCst);

			match self.outcome {
				Outcome::Open => Some(FakeHandle { closed: false }),
				Outcome::OpenButClosed => Some(FakeHandle { closed: true }),
				Outcome::Blocked => None,
			}
		}
	}

	fn params(bank: &str) -> RedirectParams {
		RedirectParams {
			bank_name: bank.into(),
			bank_logo: None,
			card_name: "Test Card".into(),
			card_id: Some("7".into()),
		}
	}

	#[test]
	fn resolve_matches_direct_and_alias_lookups() {
		assert_eq!(resolve_bank_url("HDFC Bank"), resolve_bank_url("HDFC"));
		assert_eq!(resolve_bank_url("Random Credit Union"), None);
	}

	#[test]
	fn allowed_domain_accepts_exact_and_suffix_matches() {
		assert!(is_allowed_domain("https://cards.kotak.com/", &["kotak.com"]));
		assert!(is_allowed_domain("https://kotak.com/", &["kotak.com"]));
		assert!(!is_allowed_domain("https://notkotak.com/", &["kotak.com"]));
		assert!(!is_allowed_domain("https://kotak.com.evil.example/", &["kotak.com"]));
	}

	#[test]
	fn allowed_domain_defers_when_no_list_is_given() {
		assert!(is_allowed_domain("https://anything.example/", &[]));
	}

	#[test]
	fn allowed_domain_rejects_unparseable_urls() {
		assert!(!is_allowed_domain("not a url", &[]));
		assert!(!is_allowed_domain("not a url", &["kotak.com"]));
	}

	#[test]
	fn open_succeeds_for_whitelisted_bank() {
		let sink = Arc::new(MemorySink::default());
		let gate = RedirectGate::new(ScriptedOpener::new(Outcome::Open), sink.clone());
		let handle = gate
			.open_interstitial(&params("HDFC Bank"))
			.expect("Confirmed open should yield a handle.");

		assert!(!handle.is_closed());

		let events = sink.take();

		assert_eq!(events.len(), 1);
		assert_eq!(events[0].bank, "HDFC Bank");
		assert_eq!(events[0].target_url.as_deref(), Some(BankKey::Hdfc.destination().as_str()));
		assert_eq!(events[0].user_agent, None);
	}

	#[test]
	fn configured_user_agent_is_stamped_onto_the_beacon() {
		let sink = Arc::new(MemorySink::default());
		let gate = RedirectGate::new(ScriptedOpener::new(Outcome::Open), sink.clone())
			.with_user_agent("handoff-gate-test/1.0");

		gate.open_interstitial(&params("HDFC Bank"))
			.expect("Confirmed open should yield a handle.");

		let events = sink.take();

		assert_eq!(events[0].user_agent.as_deref(), Some("handoff-gate-test/1.0"));
	}

	#[test]
	fn unresolved_bank_still_opens_with_empty_target() {
		let sink = Arc::new(MemorySink::default());
		let opener = ScriptedOpener::new(Outcome::Open);
		let gate = RedirectGate::new(opener, sink.clone());

		assert!(gate.open_interstitial(&params("Random Credit Union")).is_some());

		let events = sink.take();

		assert_eq!(events[0].target_url.as_deref(), Some(""));
	}

	#[test]
	fn blocked_open_returns_none() {
		let sink = Arc::new(MemorySink::default());
		let gate = RedirectGate::new(ScriptedOpener::new(Outcome::Blocked), sink);

		assert!(gate.open_interstitial(&params("HDFC")).is_none());
	}

	#[test]
	fn undetermined_handle_counts_as_blocked() {
		let sink = Arc::new(MemorySink::default());
		let gate = RedirectGate::new(ScriptedOpener::new(Outcome::OpenButClosed), sink);
		let err = gate
			.try_open_interstitial(&params("HDFC"))
			.expect_err("Closed handle should classify as a blocked popup.");

		assert!(matches!(err, RedirectError::PopupBlocked));
	}
}
