use thiserror::Error;

/// Errors surfaced by fallible construction and scheduler startup.
///
/// Lookup misses during dispatch and double releases on a [`crate::pool::Pool`]
/// are deliberately *not* errors: the former is a no-op dispatch, the latter a
/// documented no-op returning `false`.
#[derive(Debug, Error)]
pub enum Error {
    /// A required construction option was invalid. Fatal to that construction
    /// call only.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The scheduler's driver preference chain was exhausted without finding
    /// a usable timing primitive.
    #[error("no frame driver available")]
    DriverUnavailable,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
