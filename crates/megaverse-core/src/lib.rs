//! # megaverse-core
//!
//! Core types for the Megaverse grid reconciler.
//!
//! The remote "megaverse" is a grid of astral objects held by a REST service.
//! A symbolic goal grid describes what every cell should contain; the engine
//! crate mutates the remote grid until it matches.
//!
//! ## Object model
//!
//! - POLYANET: a plain object, no modifier
//! - SOLOON: a colored marker (blue, red, purple, white)
//! - COMETH: a directional marker (up, down, right, left)

pub mod config;
mod error;
pub mod token;
mod types;

pub use config::{MegaverseConfig, RetryConfig};
pub use error::{MegaverseError, Result};
pub use token::{is_space, parse_token, split_token, Modifier, TokenParts};
pub use types::*;
