//! # sealtok-service
//!
//! Issue and redeem expiring tokens over any [`SealingBackend`].
//!
//! ```text
//! issue:  compute expiry -> encode -> seal
//! redeem: open -> decode -> check expiry
//! ```
//!
//! Each redeem ends in exactly one state:
//!
//! | State | Result |
//! |-------|--------|
//! | Valid | `Ok(token)` |
//! | Expired | `Err(TokenError::Expired { token, .. })` (payload still inspectable) |
//! | Authentication failed | `Err(TokenError::Authentication)` |
//! | Malformed | `Err(TokenError::MalformedToken(_))` |
//!
//! Nothing is retried internally and nothing is kept between calls.

pub mod armor;
pub mod error;
pub mod service;

pub use armor::{ARMOR_PREFIX, armor, dearmor};
pub use error::TokenError;
pub use sealtok_backend::SealingBackend;
pub use sealtok_core::Token;
pub use service::{Expiry, IssuePolicy, TokenService, issue, redeem};
