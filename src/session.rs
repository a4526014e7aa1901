//! Session state shared by the full and per-slot randomization passes.

use std::sync::Arc;

use tracing::warn;

use crate::config::RandomizerConfig;
use crate::constants::session::{POSITION_FALLBACK_BUCKET, POSITION_INFO_PATH};
use crate::data::{RandomizationState, SelectedSlot, SentencePositionInfo, SlotRow};
use crate::history::SelectionHistory;
use crate::storage::StorageBackend;
use crate::store::StateStore;

/// Receiver for each newly assembled sentence.
///
/// Both the full pass and per-slot redraws push their result here; the
/// demo apps print, a UI would re-render.
pub trait RenderSink {
    fn present(&mut self, slots: &[SelectedSlot]);
}

/// Everything a randomization run carries between calls: the active
/// sentence pool, the displayed slots, summary state, duplicate-avoidance
/// history, and the optional state store.
///
/// The pool and displayed slots start empty; per-slot redraws refuse to
/// run until a full pass has filled them.
pub struct RandomizationSession {
    full_pool: Vec<SlotRow>,
    current_slots: Vec<SelectedSlot>,
    state: RandomizationState,
    history: SelectionHistory,
    store: Option<StateStore>,
    position_fallback: Option<Arc<dyn StorageBackend>>,
    sink: Option<Box<dyn RenderSink>>,
}

impl RandomizationSession {
    pub fn new(config: &RandomizerConfig) -> Self {
        Self {
            full_pool: Vec::new(),
            current_slots: Vec::new(),
            state: RandomizationState::default(),
            history: SelectionHistory::new(config.history_limit),
            store: None,
            position_fallback: None,
            sink: None,
        }
    }

    /// Attach a state store; the sentence-position snapshot then lives at
    /// its `randomizer.sentencePositionInfo` path.
    pub fn with_store(mut self, store: StateStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Storage used for the position snapshot when no store is attached.
    pub fn with_fallback_storage(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.position_fallback = Some(storage);
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn RenderSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Rows of the currently active grammar group.
    pub fn full_pool(&self) -> &[SlotRow] {
        &self.full_pool
    }

    /// Slots of the currently displayed sentence.
    pub fn current_slots(&self) -> &[SelectedSlot] {
        &self.current_slots
    }

    /// Summary of the last full pass.
    pub fn state(&self) -> &RandomizationState {
        &self.state
    }

    pub fn history(&self) -> &SelectionHistory {
        &self.history
    }

    pub fn store(&self) -> Option<&StateStore> {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> Option<&mut StateStore> {
        self.store.as_mut()
    }

    pub(crate) fn state_mut(&mut self) -> &mut RandomizationState {
        &mut self.state
    }

    pub(crate) fn history_mut(&mut self) -> &mut SelectionHistory {
        &mut self.history
    }

    pub(crate) fn replace_pool(&mut self, pool: Vec<SlotRow>) {
        self.full_pool = pool;
    }

    pub(crate) fn set_current_slots(&mut self, slots: Vec<SelectedSlot>) {
        self.current_slots = slots;
        if let Some(sink) = &mut self.sink {
            sink.present(&self.current_slots);
        }
    }

    /// Persist the sentence-boundary snapshot for later redraws: into the
    /// store when one is attached, else into the fallback bucket. Failures
    /// are logged, never raised.
    pub(crate) fn store_position_info(&mut self, info: &SentencePositionInfo) {
        if let Some(store) = &mut self.store {
            match serde_json::to_value(info) {
                Ok(value) => store.set(POSITION_INFO_PATH, value),
                Err(err) => warn!(error = %err, "sentence position info not serializable"),
            }
            return;
        }
        let Some(storage) = &self.position_fallback else {
            return;
        };
        match serde_json::to_string(info) {
            Ok(payload) => {
                if let Err(err) = storage.save_bucket(POSITION_FALLBACK_BUCKET, &payload) {
                    warn!(error = %err, "sentence position fallback write failed");
                }
            }
            Err(err) => warn!(error = %err, "sentence position info not serializable"),
        }
    }

    /// Snapshot stored by the last full pass, if readable.
    pub fn load_position_info(&self) -> Option<SentencePositionInfo> {
        if let Some(store) = &self.store {
            let value = store.get(POSITION_INFO_PATH)?.clone();
            return match serde_json::from_value(value) {
                Ok(info) => Some(info),
                Err(err) => {
                    warn!(error = %err, "stored sentence position info malformed");
                    None
                }
            };
        }
        let storage = self.position_fallback.as_ref()?;
        let payload = match storage.load_bucket(POSITION_FALLBACK_BUCKET) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "sentence position fallback read failed");
                return None;
            }
        };
        match serde_json::from_str(&payload) {
            Ok(info) => Some(info),
            Err(err) => {
                warn!(error = %err, "sentence position fallback payload malformed");
                None
            }
        }
    }
}
