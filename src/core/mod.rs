//! Core building blocks: channel layout, averaging configuration, and the
//! processing primitives (masked averaging, dataset filters, sub-tiles, band
//! statistics). These are pure and consumed by the high-level `api` module.
pub mod layout;
pub mod params;
pub mod processing;
