pub mod cadence;
pub mod projection;
pub mod schedule;
pub mod summary;
