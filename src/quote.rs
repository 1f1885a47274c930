//! Price estimates for bag orders.
//!
//! An estimate is a pure function of (design, size, case count, reorder).
//! Prices are per case and fixed per (design, size); the authoritative price
//! is confirmed by a person after the request comes in, so nothing here is
//! persisted or sent anywhere.
//!
//! ```text
//! cases    = max(4, floor(requested))        # 4-case minimum
//! subtotal = case_price(design, size) × cases
//! fee      = $50 art/plate setup, first order of a printed design only
//! total    = subtotal + fee
//! units    = cases × units_per_case(size)
//! ```
//!
//! Money is kept in integer cents.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Minimum billable case count.
pub const MIN_CASES: u32 = 4;

/// Art/plate setup fee charged on the first order of a printed design.
pub const SETUP_FEE_CENTS: u64 = 5_000;

/// Display order of sizes; also decides which size substitutes for an
/// invalid one.
pub const SIZE_ORDER: &[&str] = &[
    "21", "22", "23", "25", "26", "28", "12", "14", "15", "32", "35", "30",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Unknown bag design: {0}")]
    UnknownDesign(String),
}

/// One bag design and its per-case prices.
#[derive(Debug)]
pub struct DesignSpec {
    pub id: &'static str,
    pub label: &'static str,
    /// Alternate ids accepted on input.
    pub aliases: &'static [&'static str],
    /// Whether a first order pays the setup fee (printed designs do).
    pub setup_fee: bool,
    /// (size, cents per case)
    pub prices: &'static [(&'static str, u64)],
}

impl DesignSpec {
    pub fn price_cents(&self, size: &str) -> Option<u64> {
        self.prices
            .iter()
            .find(|(s, _)| *s == size)
            .map(|(_, cents)| *cents)
    }

    /// Sizes offered for this design, in [`SIZE_ORDER`].
    pub fn sizes(&self) -> Vec<&'static str> {
        SIZE_ORDER
            .iter()
            .copied()
            .filter(|size| self.price_cents(size).is_some())
            .collect()
    }
}

pub const DESIGNS: &[DesignSpec] = &[
    DesignSpec {
        id: "GS",
        label: "GS Pharmacy Print",
        aliases: &[],
        setup_fee: true,
        prices: &[
            ("21", 9_556),
            ("22", 11_981),
            ("23", 11_742),
            ("25", 6_591),
            ("26", 10_229),
            ("28", 11_210),
            ("12", 11_535),
            ("14", 9_969),
            ("15", 9_578),
            ("32", 7_084),
            ("35", 9_084),
            ("30", 11_603),
        ],
    },
    DesignSpec {
        id: "TY",
        label: "TY Pharmacy Print",
        aliases: &[],
        setup_fee: true,
        prices: &[
            ("21", 9_556),
            ("22", 11_981),
            ("23", 11_741),
            ("25", 6_591),
            ("26", 10_229),
            ("28", 11_210),
            ("12", 11_535),
            ("14", 9_969),
            ("15", 9_578),
        ],
    },
    DesignSpec {
        id: "VB1",
        label: "Veterinary Design 1",
        aliases: &[],
        setup_fee: false,
        prices: &[("12", 11_535), ("22", 11_981), ("25", 6_591)],
    },
    DesignSpec {
        id: "VB2",
        label: "Veterinary Design 2",
        aliases: &[],
        setup_fee: false,
        prices: &[("12", 11_535), ("22", 11_981), ("25", 6_591)],
    },
    DesignSpec {
        id: "VB6",
        label: "Veterinary Design 6",
        aliases: &[],
        setup_fee: false,
        prices: &[("12", 11_535), ("22", 11_981), ("25", 6_591)],
    },
    DesignSpec {
        id: "DS",
        label: "Plain Stock (unprinted)",
        aliases: &["stock"],
        setup_fee: false,
        prices: &[("12", 4_500), ("21", 3_600), ("23", 3_900), ("25", 3_500)],
    },
    DesignSpec {
        id: "PlasticGS",
        label: "Plastic GS",
        aliases: &[],
        setup_fee: true,
        prices: &[("32", 7_084), ("35", 9_084), ("30", 11_603)],
    },
];

/// Bags per case for a size.
pub fn units_per_case(size: &str) -> u64 {
    match size {
        "21" | "22" | "23" | "12" => 3_000,
        "25" | "14" => 2_000,
        "26" | "15" | "32" | "35" => 1_000,
        "28" | "30" => 500,
        _ => 0,
    }
}

/// Physical dimensions of a size, for display.
pub fn size_dimensions(size: &str) -> &'static str {
    match size {
        "21" => "3.5\" x 1.5\" x 10\"",
        "22" => "4.5\" x 2.25\" x 11\"",
        "23" => "5\" x 2\" x 10\"",
        "25" => "6\" x 4\" x 11\"",
        "26" => "7\" x 4\" x 14\"",
        "28" => "8\" x 5\" x 17\"",
        "12" => "7\" x 10\"",
        "14" => "9\" x 11\"",
        "15" => "8.5\" x 3.5\" x 14.5\"",
        "32" => "9\" x 5.5\" x 18\"",
        "35" => "12\" x 7\" x 23\"",
        "30" => "12\" x 7\" x 25\"",
        _ => "",
    }
}

/// Look up a design by id or alias, case-insensitively.
pub fn find_design(id: &str) -> Option<&'static DesignSpec> {
    let id = id.trim();
    DESIGNS.iter().find(|d| {
        d.id.eq_ignore_ascii_case(id) || d.aliases.iter().any(|a| a.eq_ignore_ascii_case(id))
    })
}

/// Inputs to an estimate, as a customer or employee would enter them.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub design: String,
    /// Size id, with or without a leading `#` (`"25"`, `"#25"`).
    pub size: String,
    /// Requested case count; fractional and non-finite values are tolerated.
    pub cases: f64,
    pub reorder: bool,
}

/// A computed estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub design: String,
    pub size: String,
    /// True when the requested size was not offered and the design's first
    /// size was used instead.
    pub size_substituted: bool,
    pub cases: u32,
    pub case_price_cents: u64,
    pub subtotal_cents: u64,
    pub setup_fee_cents: u64,
    pub total_cents: u64,
    pub units: u64,
    pub dimensions: String,
}

/// Effective case count: floor of the request, at least [`MIN_CASES`].
pub fn effective_cases(requested: f64) -> u32 {
    if !requested.is_finite() || requested < MIN_CASES as f64 {
        return MIN_CASES;
    }
    requested.floor().min(u32::MAX as f64) as u32
}

pub fn quote(request: &QuoteRequest) -> Result<Quote, QuoteError> {
    let design =
        find_design(&request.design).ok_or_else(|| QuoteError::UnknownDesign(request.design.clone()))?;

    let requested_size = request.size.trim().trim_start_matches('#');
    let (size, size_substituted) = match design.price_cents(requested_size) {
        Some(_) => (requested_size, false),
        None => (design.sizes().first().copied().unwrap_or_default(), true),
    };

    let case_price_cents = design.price_cents(size).unwrap_or(0);
    let cases = effective_cases(request.cases);
    let subtotal_cents = case_price_cents * u64::from(cases);
    let setup_fee_cents = if design.setup_fee && !request.reorder {
        SETUP_FEE_CENTS
    } else {
        0
    };

    Ok(Quote {
        design: design.id.to_string(),
        size: size.to_string(),
        size_substituted,
        cases,
        case_price_cents,
        subtotal_cents,
        setup_fee_cents,
        total_cents: subtotal_cents + setup_fee_cents,
        units: units_per_case(size) * u64::from(cases),
        dimensions: size_dimensions(size).to_string(),
    })
}

/// Dollar formatting for cent amounts: `1234567` → `$12,345.67`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dollars(pub u64);

impl fmt::Display for Dollars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", group_thousands(self.0 / 100), self.0 % 100)
    }
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
