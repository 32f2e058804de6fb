pub mod overlay;
pub mod schedule;
