//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod account;
pub mod analytics;
pub mod booking;
pub mod checkout;
pub mod hotel;
pub mod payment;
pub mod promotion;
pub mod review;
pub mod session;

use time::Date;

// Serde adapters for `time::Date` as ISO `yyyy-MM-dd`.
time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");
