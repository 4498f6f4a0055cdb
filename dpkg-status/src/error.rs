// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Error handling. */

use thiserror::Error;

/// Primary crate error type.
///
/// Parsing is lenient and never fails. The only fallible operation is reading the
/// status database itself.
#[derive(Debug, Error)]
pub enum DpkgStatusError {
    #[error("I/O error reading status file {0}: {1}")]
    StatusFileRead(String, #[source] std::io::Error),
}

impl DpkgStatusError {
    /// Obtain the underlying I/O error.
    pub fn io_error(&self) -> &std::io::Error {
        match self {
            Self::StatusFileRead(_, e) => e,
        }
    }
}

/// Result wrapper for this crate.
pub type Result<T> = std::result::Result<T, DpkgStatusError>;
