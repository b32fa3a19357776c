/*
 * error.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use std::fmt;

/// Crate-wide error taxonomy. Kept narrow and named, in the style of the
/// kernel-bootstrap error type this crate is modeled on: most call sites
/// propagate an [`anyhow::Error`] with `?` and only the loop boundary needs
/// to distinguish these cases.
#[derive(Debug)]
pub enum Error {
    /// The transport reported that it is closed or has no peers.
    ChannelClosed,

    /// A message arrived that could not be interpreted.
    MalformedMessage(String),

    /// Anything else: wrapped so internal bugs degrade to a logged error
    /// instead of a panic (see §7.7 of the design).
    Internal(anyhow::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ChannelClosed => write!(f, "channel closed or has no peers"),
            Error::MalformedMessage(msg) => write!(f, "malformed message: {msg}"),
            Error::Internal(err) => write!(f, "internal error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
