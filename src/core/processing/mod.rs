pub mod averager;
pub mod filters;
pub mod stats;
pub mod subtile;
