//! Unified error type.

/// The error type returned by strata's fallible operations.
///
/// Application-level failures (400, 401, 500, etc.) are written to the
/// response sink, not returned as `Error`s. This type surfaces
/// infrastructure failures: parsing a listen address, binding to a port.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
