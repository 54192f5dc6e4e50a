//! Redis protocol implementation
//!
//! This module provides RESP (REdis Serialization Protocol) framing and the
//! Redis commands the store client sends.

pub mod command;
pub mod resp;

pub use command::{Command, glob_escape, prefix_pattern};
pub use resp::{ParseError, Parser, Value};
