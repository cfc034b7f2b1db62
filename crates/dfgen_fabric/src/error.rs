//! Error types for fabric construction.

/// Result alias for fabric construction.
pub type FabricResult<T> = Result<T, FabricError>;

/// A fabric description that cannot be built.
///
/// These are configuration mistakes: they are raised immediately when the
/// fabric is built and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FabricError {
    /// The QCA clocking scheme token is not one of `U`, `R`, `T`.
    #[error("unknown QCA architecture type '{0}' (expected U, R or T)")]
    UnknownQcaScheme(String),

    /// The CGRA interconnect string is not four `0`/`1` characters.
    #[error("invalid interconnect bits '{0}' (expected 4 characters of 0/1 in mdht order)")]
    InvalidInterconnect(String),

    /// The grid has zero rows or zero columns.
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions {
        /// Requested row count.
        rows: u32,
        /// Requested column count.
        cols: u32,
    },

    /// The initiation interval is zero.
    #[error("initiation interval must be at least 1")]
    ZeroInitiationInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_scheme() {
        let err = FabricError::UnknownQcaScheme("X".to_string());
        assert_eq!(
            format!("{err}"),
            "unknown QCA architecture type 'X' (expected U, R or T)"
        );
    }

    #[test]
    fn display_dimensions() {
        let err = FabricError::InvalidDimensions { rows: 0, cols: 4 };
        assert_eq!(format!("{err}"), "invalid grid dimensions 0x4");
    }

    #[test]
    fn display_interconnect() {
        let err = FabricError::InvalidInterconnect("10".to_string());
        assert!(format!("{err}").starts_with("invalid interconnect bits '10'"));
    }
}
