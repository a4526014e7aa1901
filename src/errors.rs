use std::io;

use thiserror::Error;

use crate::data::SlotType;

/// Error type for randomizer preconditions, persistence, and ingestion
/// failures.
///
/// Precondition variants carry user-presentable messages; persistence
/// variants are caught and logged at call sites rather than propagated out
/// of state-store reads and writes.
#[derive(Debug, Error)]
pub enum RephraseError {
    #[error("no sentence pool is loaded; run a full randomize first")]
    MissingPool,
    #[error("no sentence is currently displayed; run a full randomize first")]
    MissingCurrentSlots,
    #[error("slot '{slot}' has too few alternatives to redraw ({available} available)")]
    NotEnoughAlternatives { slot: SlotType, available: usize },
    #[error("slot '{slot}' has no alternative outside the current example")]
    NoFreshAlternative { slot: SlotType },
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("corpus parse failure: {0}")]
    Corpus(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
