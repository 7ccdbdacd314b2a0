//! C ABI surface
//!
//! - [`exports`] - Functions called by the host
//! - [`log`] - Host log sink backed by a C callback

pub mod exports;
pub mod log;

pub use log::{CallbackLog, LogCallback};
