//! Fast travel: fee computation, gold debit, and relocation as one SQLite
//! transaction. A debit without relocation (or the reverse) can never commit.

use crate::saves::{read_save, require_character, upsert_save, SaveRow};
use crate::{now_ms, Engine, WorldError};

/// What the caller gets back after a successful trip, sized for user feedback.
#[derive(Debug, Clone)]
pub struct TravelReceipt {
    pub fee: i64,
    pub settlement_name: String,
    pub gold: i64,
    pub save: SaveRow,
}

impl Engine {
    /// Move a character to a settlement in the given region for a fee.
    ///
    /// Fee is the settlement's explicit override if present, else the default
    /// for its kind. The destination is the signpost coordinate when one
    /// exists, else the settlement's own coordinate. Gold debit and position
    /// upsert commit together or not at all.
    pub fn fast_travel(
        &self,
        account_id: &str,
        character_id: &str,
        region_id: &str,
        settlement_id: &str,
    ) -> Result<TravelReceipt, WorldError> {
        // Settlements are re-read from the registry on every load; a stale
        // client pick is caught here, not trusted.
        let region = self.load_region(region_id)?;
        let settlement = region
            .settlement(settlement_id)
            .cloned()
            .ok_or_else(|| WorldError::SettlementNotFound(settlement_id.to_string()))?;

        let dest = settlement.arrival();
        if !region.in_bounds(dest.x, dest.y) {
            // Registry rows are authoritative but still bounds-checked before
            // they can become a save state.
            return Err(WorldError::PositionOutOfBounds {
                region_id: region_id.to_string(),
                x: dest.x,
                y: dest.y,
            });
        }

        let fee = settlement.fee();
        let now = now_ms();

        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        let character = require_character(&tx, character_id, account_id)?;
        if character.gold < fee {
            return Err(WorldError::InsufficientFunds { required: fee });
        }

        tx.execute(
            "UPDATE characters SET gold = gold - ?1, updated_at_ms = ?2 WHERE id = ?3",
            (fee, now, character_id),
        )?;
        upsert_save(&tx, character_id, &region.id, dest.x, dest.y, now)?;

        let gold: i64 = tx.query_row(
            "SELECT gold FROM characters WHERE id = ?1",
            [character_id],
            |row| row.get(0),
        )?;
        let save = read_save(&tx, character_id)?.ok_or(WorldError::CharacterNotFound)?;

        tx.commit()?;

        tracing::info!(
            character_id,
            region_id,
            settlement = %settlement.name,
            fee,
            gold,
            "fast travel committed"
        );

        Ok(TravelReceipt {
            fee,
            settlement_name: settlement.name,
            gold,
            save,
        })
    }
}
