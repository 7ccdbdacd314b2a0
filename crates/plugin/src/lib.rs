//! Dynamis - FFI Layer
//!
//! This crate provides the C ABI boundary between a native plugin host and
//! the Rust core logic. It compiles to a cdylib (.so/.dll).

pub mod ffi;

pub use dynamis_core::Plugin;
