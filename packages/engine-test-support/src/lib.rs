//! Shared test plumbing for the coinche engine workspace.

pub mod logging;
