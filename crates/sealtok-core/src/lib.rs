//! # sealtok-core
//!
//! Backend-independent pieces of sealtok expiring tokens.
//!
//! - [`token`]: the logical token (expiration instant + opaque payload) and its
//!   canonical binary layout
//! - [`clock`]: wall-clock source used for expiry computation and checks
//! - [`config`]: YAML configuration shared by the service and the CLI
//!
//! ## Plaintext Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 8 | expiration timestamp, milliseconds since Unix epoch, big-endian `i64` |
//! | 8 | N | payload, `N >= 0`, length implied by the plaintext length |

pub mod clock;
pub mod config;
pub mod error;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BackendKind, KeyConfig, TokenConfig};
pub use error::{ConfigError, ModelError};
pub use token::{TIMESTAMP_SIZE, Token};
