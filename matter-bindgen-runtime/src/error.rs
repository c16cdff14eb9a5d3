//! Runtime error taxonomy.
//!
//! Generation-time failures (parse, reference, output mismatch) live in the
//! generator crates; only errors a binding consumer can observe are here.

use thiserror::Error;

/// A scalar argument fell outside its declared bounds.
///
/// Raised before any encoding or transmission happens, synchronously to the
/// caller supplying the value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("argument {argument}: value {value} outside [{min}, {max}]")]
pub struct ArgumentRangeError {
    pub argument: String,
    pub value: i128,
    pub min: i128,
    pub max: i128,
}

/// A response of unexpected shape arrived for a command that declares a
/// specific response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected response command {expected}, got {actual:?}")]
pub struct ProtocolMismatchError {
    pub expected: u32,
    pub actual: Option<u32>,
}

/// Any failure surfaced by the underlying request/response mechanism.
///
/// Opaque to bindings: passed through to the caller as the round trip's
/// failure, never retried by the binding itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A failure while encoding or decoding a generic value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of encoded data")]
    UnexpectedEnd,
    #[error("unknown type tag {0:#04x}")]
    UnknownTypeTag(u8),
    #[error("trailing data after decoded value")]
    TrailingData,
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("encoded length overflows the platform")]
    LengthOverflow,
}

/// Any failure a binding round trip can report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    ArgumentRange(#[from] ArgumentRangeError),
    #[error(transparent)]
    ProtocolMismatch(#[from] ProtocolMismatchError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}
