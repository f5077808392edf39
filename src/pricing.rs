//! Booking price calculator.
//!
//! DESIGN
//! ======
//! Pure arithmetic, recomputed whenever rate, room count, stay length, or
//! discount changes. The GST tier is picked from the undiscounted
//! per-night base (`rate × rooms`) and applied to both the original and the
//! discounted subtotal, so a promotion never moves a booking into a cheaper
//! tax bracket.
//!
//! Stay length counts both endpoints: a booking from the 1st to the 3rd is
//! three nights, a same-day booking is one.

use serde::Serialize;
use time::Date;
use time::macros::format_description;

/// Per-night base above which the top GST tier applies.
pub const GST_HIGH_THRESHOLD: f64 = 75.0;
/// Per-night base above which the middle GST tier applies.
pub const GST_MID_THRESHOLD: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("discount must be between 0 and 100, got {0}")]
    InvalidDiscount(f64),
    #[error("nightly rate must be a non-negative amount")]
    InvalidRate,
    #[error("check-out date cannot be before check-in date")]
    CheckOutBeforeCheckIn,
    #[error("invalid date {0:?}, expected dd-MM-yyyy or yyyy-MM-dd")]
    InvalidDate(String),
}

// =============================================================================
// GST TIERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GstTier {
    Standard,
    Mid,
    High,
}

impl GstTier {
    /// Tier for a per-night base amount. Thresholds are exclusive.
    #[must_use]
    pub fn for_base_per_night(base_per_night: f64) -> Self {
        if base_per_night > GST_HIGH_THRESHOLD {
            Self::High
        } else if base_per_night > GST_MID_THRESHOLD {
            Self::Mid
        } else {
            Self::Standard
        }
    }

    #[must_use]
    pub fn rate(self) -> f64 {
        match self {
            Self::Standard => 0.12,
            Self::Mid => 0.15,
            Self::High => 0.18,
        }
    }

    #[must_use]
    pub fn percent(self) -> u8 {
        match self {
            Self::Standard => 12,
            Self::Mid => 15,
            Self::High => 18,
        }
    }
}

// =============================================================================
// QUOTE
// =============================================================================

/// Inputs to a price computation. `nightly_rate` is `None` until a room is picked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteInput {
    pub nightly_rate: Option<f64>,
    pub rooms: u32,
    pub nights: u32,
    pub discount_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub nightly_rate: f64,
    pub rooms: u32,
    pub nights: u32,
    pub discount_percentage: f64,
    pub gst_tier: GstTier,
    pub gst_percent: u8,
    pub base_per_night: f64,
    pub original_subtotal: f64,
    pub original_taxes: f64,
    pub original_total: f64,
    pub discounted_subtotal: f64,
    pub discounted_taxes: f64,
    pub discounted_total: f64,
}

impl PriceQuote {
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount_percentage > 0.0
    }

    /// The amount the guest pays: discounted when a promotion applies.
    #[must_use]
    pub fn payable_total(&self) -> f64 {
        if self.has_discount() { self.discounted_total } else { self.original_total }
    }

    #[must_use]
    pub fn payable_taxes(&self) -> f64 {
        if self.has_discount() { self.discounted_taxes } else { self.original_taxes }
    }

    #[must_use]
    pub fn payable_subtotal(&self) -> f64 {
        if self.has_discount() { self.discounted_subtotal } else { self.original_subtotal }
    }
}

/// Compute a price quote.
///
/// Returns `Ok(None)` when a required input is missing (no room rate, zero
/// rooms, or zero nights).
///
/// # Errors
///
/// Returns an error for a negative or non-finite rate, or a discount outside `0..=100`.
pub fn quote(input: &QuoteInput) -> Result<Option<PriceQuote>, PricingError> {
    let discount = input.discount_percentage;
    if !discount.is_finite() || !(0.0..=100.0).contains(&discount) {
        return Err(PricingError::InvalidDiscount(discount));
    }

    let Some(rate) = input.nightly_rate else {
        return Ok(None);
    };
    if !rate.is_finite() || rate < 0.0 {
        return Err(PricingError::InvalidRate);
    }
    if input.rooms == 0 || input.nights == 0 {
        return Ok(None);
    }

    let nights = f64::from(input.nights);
    let base_per_night = rate * f64::from(input.rooms);
    let discounted_per_night = base_per_night * (1.0 - discount / 100.0);

    let tier = GstTier::for_base_per_night(base_per_night);
    let gst = tier.rate();

    let original_subtotal = base_per_night * nights;
    let original_taxes = original_subtotal * gst;
    let discounted_subtotal = discounted_per_night * nights;
    let discounted_taxes = discounted_subtotal * gst;

    Ok(Some(PriceQuote {
        nightly_rate: rate,
        rooms: input.rooms,
        nights: input.nights,
        discount_percentage: discount,
        gst_tier: tier,
        gst_percent: tier.percent(),
        base_per_night,
        original_subtotal,
        original_taxes,
        original_total: original_subtotal + original_taxes,
        discounted_subtotal,
        discounted_taxes,
        discounted_total: discounted_subtotal + discounted_taxes,
    }))
}

/// Round to whole cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

// =============================================================================
// STAY LENGTH
// =============================================================================

/// Nights in a stay, counting both the check-in and check-out day.
/// A missing check-out counts as a single night.
///
/// # Errors
///
/// Returns an error if check-out precedes check-in.
pub fn stay_nights(check_in: Date, check_out: Option<Date>) -> Result<u32, PricingError> {
    let Some(check_out) = check_out else {
        return Ok(1);
    };
    let days = (check_out - check_in).whole_days();
    if days < 0 {
        return Err(PricingError::CheckOutBeforeCheckIn);
    }
    u32::try_from(days + 1).map_err(|_| PricingError::CheckOutBeforeCheckIn)
}

/// Parse a stay date in either `dd-MM-yyyy` (checkout query strings) or ISO `yyyy-MM-dd`.
///
/// # Errors
///
/// Returns an error if neither format matches.
pub fn parse_stay_date(raw: &str) -> Result<Date, PricingError> {
    let trimmed = raw.trim();
    let day_first = format_description!("[day]-[month]-[year]");
    let iso = format_description!("[year]-[month]-[day]");
    Date::parse(trimmed, &day_first)
        .or_else(|_| Date::parse(trimmed, &iso))
        .map_err(|_| PricingError::InvalidDate(trimmed.to_owned()))
}

/// Format a date the way checkout query strings carry it (`dd-MM-yyyy`).
#[must_use]
pub fn format_stay_date(date: Date) -> String {
    let day_first = format_description!("[day]-[month]-[year]");
    date.format(&day_first).unwrap_or_default()
}

// =============================================================================
// DISPLAY
// =============================================================================

/// Format an amount with two decimals and Indian digit grouping
/// (`123456.5` → `"1,23,456.50"`). Non-finite input renders as `"0.00"`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_price(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let grouped = group_indian(&whole);
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac:02}")
}

/// Parse a price string produced by `format_price` (or a plain number).
/// Anything unparsable is `None`.
#[must_use]
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('€')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, last3) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{last3}", groups.join(","))
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
