//! Error taxonomy modules.
//!
//! `error_code` holds the canonical code strings; the `CoreError` type that
//! carries them lives in `crate::error`.

pub mod error_code;

pub use error_code::ErrorCode;
