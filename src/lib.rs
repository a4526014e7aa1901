#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Randomizer and state-store configuration types.
pub mod config;
/// Centralized constants used across randomizer, store, and session.
pub mod constants;
/// Corpus ingestion and row normalization.
pub mod corpus;
/// Slot-row and selection data types.
pub mod data;
/// Reusable demo runners shared by the bundled binaries.
pub mod demo_apps;
/// Duplicate-avoidance history windows.
pub mod history;
/// The full and per-slot randomization passes.
pub mod randomizer;
/// Session state shared between randomization passes.
pub mod session;
/// Durable bucket storage backends.
pub mod storage;
/// Hierarchical state store with listeners and durable mirroring.
pub mod store;
/// Shared type aliases.
pub mod types;
/// Sentence-form text helpers.
pub mod utils;

mod errors;

pub use config::{RandomizerConfig, StoreConfig};
pub use corpus::{parse_corpus, rows_from_value};
pub use data::{
    PhraseKind, QuestionType, RandomizationState, SelectedSlot, SentencePositionInfo, SlotRow,
    SlotType,
};
pub use errors::RephraseError;
pub use history::{HistoryKind, SelectionHistory};
pub use randomizer::Randomizer;
pub use session::{RandomizationSession, RenderSink};
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
pub use store::{ListenerFn, StateStore};
pub use types::{BucketName, ExampleId, GroupKey, ListenerId, SetTag, StatePath};
