//! Admin analytics — booking and revenue trends, current occupancy.
//!
//! Trends cover the last `TREND_MONTHS` calendar months including the
//! current one; months without bookings appear with zeros so the charts keep
//! a fixed x-axis. Cancelled bookings are excluded from both trends.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{PgPool, Row};
use time::{Date, Month};

use crate::services::booking;

pub const TREND_MONTHS: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: Month,
}

impl MonthKey {
    #[must_use]
    pub fn of(date: Date) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    #[must_use]
    pub fn previous(self) -> Self {
        match self.month {
            Month::January => Self { year: self.year - 1, month: Month::December },
            m => Self { year: self.year, month: m.previous() },
        }
    }

    #[must_use]
    pub fn first_day(self) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month, 1).ok()
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self.month {
            Month::January => "Jan",
            Month::February => "Feb",
            Month::March => "Mar",
            Month::April => "Apr",
            Month::May => "May",
            Month::June => "Jun",
            Month::July => "Jul",
            Month::August => "Aug",
            Month::September => "Sep",
            Month::October => "Oct",
            Month::November => "Nov",
            Month::December => "Dec",
        }
    }
}

/// The `count` months ending with the month of `today`, oldest first.
#[must_use]
pub fn trailing_months(today: Date, count: u8) -> Vec<MonthKey> {
    let mut months = Vec::with_capacity(usize::from(count));
    let mut current = MonthKey::of(today);
    for _ in 0..count {
        months.push(current);
        current = current.previous();
    }
    months.reverse();
    months
}

/// Percentage of inventory occupied, rounded and clamped to 0..=100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn occupancy_percent(occupied: i64, inventory: i64) -> u8 {
    if inventory <= 0 || occupied <= 0 {
        return 0;
    }
    let pct = (occupied as f64 / inventory as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingsPoint {
    pub month: &'static str,
    pub bookings: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    pub month: &'static str,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyPoint {
    pub name: String,
    pub occupancy: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub bookings_trend: Vec<BookingsPoint>,
    pub revenue_trend: Vec<RevenuePoint>,
    pub hotel_occupancy: Vec<OccupancyPoint>,
}

/// Per-month totals keyed by month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthTotals {
    pub bookings: i64,
    pub revenue: f64,
}

/// Lay totals onto a fixed month axis, filling gaps with zeros.
#[must_use]
pub fn build_trends(months: &[MonthKey], totals: &HashMap<MonthKey, MonthTotals>) -> (Vec<BookingsPoint>, Vec<RevenuePoint>) {
    months
        .iter()
        .map(|m| {
            let t = totals.get(m).copied().unwrap_or_default();
            (
                BookingsPoint { month: m.label(), bookings: t.bookings },
                RevenuePoint { month: m.label(), revenue: crate::pricing::round_cents(t.revenue) },
            )
        })
        .unzip()
}

fn month_from_number(n: i32) -> Option<Month> {
    u8::try_from(n).ok().and_then(|n| Month::try_from(n).ok())
}

pub async fn dashboard(pool: &PgPool, today: Date) -> Result<Dashboard, sqlx::Error> {
    let months = trailing_months(today, TREND_MONTHS);
    let since = months.first().and_then(|m| m.first_day()).unwrap_or(today);

    let rows = sqlx::query(
        r"SELECT EXTRACT(YEAR FROM created_at)::int AS y,
                 EXTRACT(MONTH FROM created_at)::int AS m,
                 count(*) AS n,
                 COALESCE(sum(total_price), 0)::float8 AS revenue
          FROM bookings
          WHERE status <> 'cancelled' AND created_at >= $1::date
          GROUP BY y, m",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let mut totals = HashMap::new();
    for row in &rows {
        let Some(month) = month_from_number(row.get("m")) else {
            continue;
        };
        totals.insert(
            MonthKey { year: row.get("y"), month },
            MonthTotals { bookings: row.get("n"), revenue: row.get("revenue") },
        );
    }
    let (bookings_trend, revenue_trend) = build_trends(&months, &totals);

    let occupancy_rows = sqlx::query(
        r"SELECT h.name,
                 COALESCE((SELECT sum(r.inventory) FROM rooms r WHERE r.hotel_id = h.id), 0)::bigint AS inventory,
                 COALESCE((SELECT sum(b.rooms) FROM bookings b
                           WHERE b.hotel_id = h.id AND b.status = ANY($2)
                             AND b.check_in <= $1 AND b.check_out >= $1), 0)::bigint AS occupied
          FROM hotels h
          ORDER BY h.name",
    )
    .bind(today)
    .bind(&booking::HOLDING_STATUSES[..])
    .fetch_all(pool)
    .await?;

    let hotel_occupancy = occupancy_rows
        .iter()
        .map(|r| OccupancyPoint { name: r.get("name"), occupancy: occupancy_percent(r.get("occupied"), r.get("inventory")) })
        .collect();

    Ok(Dashboard { bookings_trend, revenue_trend, hotel_occupancy })
}

#[cfg(test)]
#[path = "analytics_test.rs"]
mod tests;
