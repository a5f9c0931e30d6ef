//! Recoverable engine errors.
//!
//! Only construction-time failures (bad configuration, malformed map data)
//! and snapshot serialization are reported through [`EngineError`].
//! Invariant violations inside a tick panic instead, since a simulation in
//! that state cannot be trusted to continue.

/// Errors produced while building a simulation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A configuration value is outside its valid range.
    #[error("invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A tile layer does not have `width * height` cells.
    #[error("map layer {layer} has {actual} cells, expected {expected} ({width}x{height})")]
    MapSizeMismatch {
        layer: usize,
        actual: usize,
        expected: usize,
        width: usize,
        height: usize,
    },

    /// A tile index has no entry in the attribute table.
    #[error("tile index {tile} at ({x}, {y}) has no attribute entry (table size {table_len})")]
    UnknownTile {
        tile: u16,
        x: usize,
        y: usize,
        table_len: usize,
    },

    /// JSON input could not be parsed.
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Simulation state could not be serialized for a snapshot.
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
