//! Interstitial page address: query construction and parsing.
//!
//! The address is the contract between the gate (which opens the interstitial) and
//! the countdown session (which runs inside it): `url` (destination, empty when the
//! bank was unresolved), `bank` and `card` display names, optional `logo` and
//! `cardId`.

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, gate::RedirectParams};

/// Path the interstitial page is served from.
pub const INTERSTITIAL_PATH: &str = "/redirect";

/// Fully encoded interstitial address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterstitialAddress {
	query: String,
}
impl InterstitialAddress {
	/// Encodes an address for the resolved destination (or an empty target when the
	/// bank was unresolved) plus the display metadata.
	pub fn new(target: Option<&Url>, params: &RedirectParams) -> Self {
		let mut serializer = form_urlencoded::Serializer::new(String::new());

		serializer.append_pair("url", target.map(Url::as_str).unwrap_or(""));
		serializer.append_pair("bank", &params.bank_name);
		serializer.append_pair("card", &params.card_name);

		if let Some(logo) = &params.bank_logo {
			serializer.append_pair("logo", logo.as_str());
		}
		if let Some(card_id) = &params.card_id {
			serializer.append_pair("cardId", card_id);
		}

		Self { query: serializer.finish() }
	}

	/// Returns the encoded query string (without the leading `?`).
	pub fn query(&self) -> &str {
		&self.query
	}
}
impl Display for InterstitialAddress {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{INTERSTITIAL_PATH}?{}", self.query)
	}
}

/// Parameters decoded by the interstitial page on mount.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterstitialRequest {
	/// Destination URL string; empty when the bank was unresolved.
	pub target: String,
	/// Display bank name; defaults to `"Bank"` when absent.
	pub bank: String,
	/// Display card name.
	pub card: String,
	/// Optional bank logo URL, display only.
	pub logo: Option<String>,
	/// Optional card identifier, analytics only.
	pub card_id: Option<String>,
}
impl InterstitialRequest {
	/// Decodes the query-string side of an [`InterstitialAddress`]. Unknown keys are
	/// ignored; missing keys fall back to empty values.
	pub fn from_query(query: &str) -> Self {
		let mut request = Self::default();

		for (key, value) in form_urlencoded::parse(query.as_bytes()) {
			match &*key {
				"url" => request.target = value.into_owned(),
				"bank" => request.bank = value.into_owned(),
				"card" => request.card = value.into_owned(),
				"logo" => request.logo = Some(value.into_owned()),
				"cardId" => request.card_id = Some(value.into_owned()),
				_ => {},
			}
		}

		if request.bank.is_empty() {
			request.bank = "Bank".into();
		}

		request
	}
}
