use thiserror::Error;

/// Domain errors surfaced by engine operations.
///
/// `InsufficientFunds` and `PositionOutOfBounds` are expected, recoverable
/// outcomes; the not-found variants indicate bad or stale client data.
/// Ownership mismatches surface as `CharacterNotFound` rather than a
/// forbidden-style error so callers cannot probe which character ids exist.
/// Nothing is retried; every error is terminal for the current request.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("region not found: {0}")]
    RegionNotFound(String),

    #[error("character not found")]
    CharacterNotFound,

    #[error("settlement not found: {0}")]
    SettlementNotFound(String),

    #[error("Not enough gold. Need {required}g.")]
    InsufficientFunds { required: i64 },

    #[error("position ({x},{y}) is outside region {region_id}")]
    PositionOutOfBounds { region_id: String, x: i64, y: i64 },

    #[error("position ({x},{y}) is not walkable")]
    PositionBlocked { x: i64, y: i64 },

    #[error("storage error")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl WorldError {
    /// True for the errors a player can run into through normal play.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            WorldError::InsufficientFunds { .. }
                | WorldError::PositionOutOfBounds { .. }
                | WorldError::PositionBlocked { .. }
        )
    }
}
