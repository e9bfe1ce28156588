//! Authentication against the platform's internal API
//!
//! This module implements the guest-token bootstrap, the CSRF/header
//! assembly every outbound call needs, and the interactive login flow
//! state machine with its conditional subtasks and two-factor support.

pub mod flow;
pub mod guest;
pub mod headers;
pub mod totp;

pub use flow::{LoginFlowEngine, SubtaskId};
pub use guest::GuestTokenManager;
