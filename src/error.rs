// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Error taxonomy shared by the profile loader and the masking engine.

use thiserror::Error;

/// Failures raised while loading a profile or masking a file.
#[derive(Debug, Error)]
pub enum MaskError {
    /// The masking profile (or a CLI value feeding it) is unusable.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Reading the input or writing the output failed.
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The input rows cannot be masked as configured.
    #[error("data error: {message}")]
    Data { message: String },
}

pub type Result<T> = std::result::Result<T, MaskError>;

impl MaskError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_source() {
        let err = MaskError::io(
            "failed to read extract.dat",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "I/O operation failed: failed to read extract.dat");
        assert!(std::error::Error::source(&err).is_some());
    }
}
