//! User action handlers
//!
//! Entry points the UI calls in response to clicks and dropdown changes.

pub mod panel;

pub use panel::{dispatch, render, ActionOutcome, UserAction};
