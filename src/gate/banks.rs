//! Closed partner-bank whitelist: canonical keys, name aliases, and destinations.
//!
//! The table is the sole source of truth for where a user may be sent. Changing a
//! destination requires a code change here; nothing at runtime can insert an entry or
//! substitute a caller-supplied URL.

// std
use std::{collections::HashMap, sync::LazyLock};
// self
use crate::_prelude::*;

/// Canonical partner-bank code. The enum is the whitelist: a key exists iff the bank
/// has a vetted destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BankKey {
	/// Axis Bank.
	Axis,
	/// IDFC First Bank.
	Idfc,
	/// SBI Card.
	Sbi,
	/// HDFC Bank.
	Hdfc,
	/// AU Small Finance Bank.
	Au,
	/// IndusInd Bank.
	Indusind,
	/// Standard Chartered.
	StanChart,
	/// American Express.
	Amex,
	/// HSBC.
	Hsbc,
	/// Kotak Mahindra Bank.
	Kotak,
	/// ICICI Bank.
	Icici,
}
impl BankKey {
	/// Every canonical key, in declaration order.
	pub const ALL: [BankKey; 11] = [
		BankKey::Axis,
		BankKey::Idfc,
		BankKey::Sbi,
		BankKey::Hdfc,
		BankKey::Au,
		BankKey::Indusind,
		BankKey::StanChart,
		BankKey::Amex,
		BankKey::Hsbc,
		BankKey::Kotak,
		BankKey::Icici,
	];

	/// Returns the canonical uppercase code.
	pub const fn as_str(self) -> &'static str {
		match self {
			BankKey::Axis => "AXIS",
			BankKey::Idfc => "IDFC",
			BankKey::Sbi => "SBI",
			BankKey::Hdfc => "HDFC",
			BankKey::Au => "AU",
			BankKey::Indusind => "INDUSIND",
			BankKey::StanChart => "STAN_CHART",
			BankKey::Amex => "AMEX",
			BankKey::Hsbc => "HSBC",
			BankKey::Kotak => "KOTAK",
			BankKey::Icici => "ICICI",
		}
	}

	/// Resolves a free-form bank name: uppercase + trim, then an exact match against
	/// the canonical codes, then against the alias table. No fuzzy matching: a wrong
	/// guess could route a user to the wrong bank's application page, so unknown
	/// names resolve to `None`.
	pub fn resolve(raw: &str) -> Option<Self> {
		let normalized = raw.trim().to_uppercase();

		Self::from_canonical(&normalized).or_else(|| Self::from_alias(&normalized))
	}

	/// Returns the vetted HTTPS destination for this key.
	pub fn destination(self) -> &'static Url {
		&DESTINATIONS[&self]
	}

	fn from_canonical(code: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|key| key.as_str() == code)
	}

	/// Fixed alias table for the name variants the upstream card-data API emits.
	/// Hand-maintained; extend it here when upstream strings drift.
	fn from_alias(name: &str) -> Option<Self> {
		Some(match name {
			"AXIS BANK" => BankKey::Axis,
			"IDFC FIRST" | "IDFC FIRST BANK" => BankKey::Idfc,
			"SBI CARD" | "SBI CARDS" | "STATE BANK OF INDIA" => BankKey::Sbi,
			"HDFC BANK" => BankKey::Hdfc,
			"AU SMALL FINANCE" | "AU SMALL FINANCE BANK" | "AU BANK" => BankKey::Au,
			"INDUSIND BANK" => BankKey::Indusind,
			"STANDARD CHARTERED" | "STANDARD CHARTERED BANK" | "SC BANK" => BankKey::StanChart,
			"AMERICAN EXPRESS" => BankKey::Amex,
			"HSBC BANK" => BankKey::Hsbc,
			"KOTAK MAHINDRA" | "KOTAK MAHINDRA BANK" => BankKey::Kotak,
			"ICICI BANK" => BankKey::Icici,
			_ => return None,
		})
	}

	const fn destination_str(self) -> &'static str {
		match self {
			BankKey::Axis => "https://www.axis.bank.in/cards/credit-card",
			BankKey::Idfc => "https://www.idfcfirst.bank.in/credit-card",
			BankKey::Sbi => "https://www.sbicard.com/en/personal/credit-cards.page",
			BankKey::Hdfc => "https://applyonline.hdfcbank.com/cards/credit-cards.html?CHANNELSOURCE=ZETA&LGCode=MKTG",
			BankKey::Au => "https://cconboarding.aubank.in/auccself/#/landing",
			BankKey::Indusind => "https://www.indusind.bank.in/in/en/personal/cards/credit-card.html",
			BankKey::StanChart => "https://www.sc.com/in/credit-cards/",
			BankKey::Amex => "https://www.americanexpress.com/en-in/",
			BankKey::Hsbc => "https://www.hsbc.co.in/credit-cards/products/visa-platinum/",
			BankKey::Kotak => "https://cards.kotak.com/",
			BankKey::Icici => "https://www.icici.bank.in/personal-banking/cards",
		}
	}
}
impl Display for BankKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

static DESTINATIONS: LazyLock<HashMap<BankKey, Url>> = LazyLock::new(|| {
	BankKey::ALL
		.into_iter()
		.map(|key| {
			let url = Url::parse(key.destination_str())
				.expect("Whitelist destinations are build-time constants and must parse.");

			(key, url)
		})
		.collect()
});

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn every_destination_parses_and_is_https() {
		for key in BankKey::ALL {
			let destination = key.destination();

			assert_eq!(destination.scheme(), "https", "{key} destination must be HTTPS");
			assert!(destination.host_str().is_some(), "{key} destination must carry a host");
		}
	}

	#[test]
	fn canonical_codes_resolve_case_insensitively() {
		assert_eq!(BankKey::resolve("HDFC"), Some(BankKey::Hdfc));
		assert_eq!(BankKey::resolve("hdfc"), Some(BankKey::Hdfc));
		assert_eq!(BankKey::resolve("  Stan_Chart  "), Some(BankKey::StanChart));
	}

	#[test]
	fn aliases_resolve_to_their_canonical_key() {
		assert_eq!(BankKey::resolve("HDFC Bank"), Some(BankKey::Hdfc));
		assert_eq!(BankKey::resolve("Standard Chartered Bank"), Some(BankKey::StanChart));
		assert_eq!(BankKey::resolve("State Bank of India"), Some(BankKey::Sbi));
		assert_eq!(BankKey::resolve("AU Small Finance Bank"), Some(BankKey::Au));
		assert_eq!(BankKey::resolve("Kotak Mahindra"), Some(BankKey::Kotak));
	}

	#[test]
	fn unknown_names_do_not_fuzzy_match() {
		assert_eq!(BankKey::resolve("Random Credit Union"), None);
		assert_eq!(BankKey::resolve("HDFC Bank Ltd"), None);
		assert_eq!(BankKey::resolve(""), None);
	}

	#[test]
	fn alias_lookup_is_consistent_with_direct_lookup() {
		let pairs = [
			("HDFC Bank", "HDFC"),
			("Axis Bank", "AXIS"),
			("IDFC First Bank", "IDFC"),
			("American Express", "AMEX"),
			("IndusInd Bank", "INDUSIND"),
		];

		for (alias, canonical) in pairs {
			let via_alias = BankKey::resolve(alias).expect("Alias should resolve.");
			let direct = BankKey::resolve(canonical).expect("Canonical code should resolve.");

			assert_eq!(via_alias, direct);
			assert_eq!(via_alias.destination(), direct.destination());
		}
	}
}
