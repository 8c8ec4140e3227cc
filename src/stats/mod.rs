//! Status reporting

pub mod status;

pub use status::StatusReport;
