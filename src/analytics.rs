//! Fire-and-forget analytics beacons.
//!
//! Beacon delivery lives in the host (a browser's `sendBeacon`, a background task, a
//! log pipeline); this crate only defines the wire payloads and the sink seam. A sink
//! must never fail or block the caller: a lost beacon is acceptable, a broken redirect
//! is not.

// self
use crate::_prelude::*;

/// Beacon event names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
	/// User clicked an apply CTA and the gate is opening the interstitial.
	ApplyClick,
	/// The interstitial performed (or is about to perform) the navigation.
	RedirectConfirm,
}
impl EventKind {
	/// Returns the stable wire label for the event.
	pub const fn as_str(self) -> &'static str {
		match self {
			EventKind::ApplyClick => "apply_click",
			EventKind::RedirectConfirm => "redirect_confirm",
		}
	}
}
impl Display for EventKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Serializable beacon payload.
///
/// `apply_click` events carry `targetUrl` (empty string when the bank was
/// unresolved) and optionally `userAgent`; `redirect_confirm` events omit both.
#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsEvent {
	/// Event name.
	pub event: EventKind,
	/// Display bank name.
	pub bank: String,
	/// Display card name.
	pub card: String,
	/// Resolved destination, when the event describes one.
	#[serde(rename = "targetUrl", skip_serializing_if = "Option::is_none")]
	pub target_url: Option<String>,
	/// Event instant, serialized as a millisecond epoch timestamp.
	#[serde(with = "time::serde::timestamp::milliseconds")]
	pub timestamp: OffsetDateTime,
	/// Reporting user agent, when the host supplies one.
	#[serde(rename = "userAgent", skip_serializing_if = "Option::is_none")]
	pub user_agent: Option<String>,
}
impl AnalyticsEvent {
	/// Builds an `apply_click` event; `target` is `None` for unresolved banks and is
	/// serialized as an empty string.
	pub fn apply_click(
		bank: impl Into<String>,
		card: impl Into<String>,
		target: Option<&Url>,
	) -> Self {
		Self {
			event: EventKind::ApplyClick,
			bank: bank.into(),
			card: card.into(),
			target_url: Some(target.map(|url| url.to_string()).unwrap_or_default()),
			timestamp: OffsetDateTime::now_utc(),
			user_agent: None,
		}
	}

	/// Builds a `redirect_confirm` event.
	pub fn redirect_confirm(bank: impl Into<String>, card: impl Into<String>) -> Self {
		Self {
			event: EventKind::RedirectConfirm,
			bank: bank.into(),
			card: card.into(),
			target_url: None,
			timestamp: OffsetDateTime::now_utc(),
			user_agent: None,
		}
	}

	/// Attaches the reporting user agent.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}
}

/// Delivery seam for beacon events.
pub trait AnalyticsSink
where
	Self: Send + Sync,
{
	/// Accepts an event for best-effort delivery. Implementations must swallow their
	/// own failures and return promptly; callers never await or inspect delivery.
	fn emit(&self, event: AnalyticsEvent);
}

/// Sink that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;
impl AnalyticsSink for NoopSink {
	fn emit(&self, _event: AnalyticsEvent) {}
}

/// In-memory sink capturing events for assertions.
#[derive(Debug, Default)]
pub struct MemorySink(Mutex<Vec<AnalyticsEvent>>);
impl MemorySink {
	/// Returns a snapshot of the captured events.
	pub fn events(&self) -> Vec<AnalyticsEvent> {
		self.0.lock().clone()
	}

	/// Drains and returns the captured events.
	pub fn take(&self) -> Vec<AnalyticsEvent> {
		std::mem::take(&mut *self.0.lock())
	}
}
impl AnalyticsSink for MemorySink {
	fn emit(&self, event: AnalyticsEvent) {
		self.0.lock().push(event);
	}
}

/// Sink that records events as structured `tracing` events.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;
#[cfg(feature = "tracing")]
impl AnalyticsSink for TracingSink {
	fn emit(&self, event: AnalyticsEvent) {
		tracing::info!(
			event = event.event.as_str(),
			bank = %event.bank,
			card = %event.card,
			target_url = event.target_url.as_deref().unwrap_or(""),
			"analytics beacon",
		);
	}
}
