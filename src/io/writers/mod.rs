//! Output writers: the averaged dataset CSV, band statistics CSV and the
//! JSON build report.
pub mod dataset;
pub mod report;
pub mod statistics;
