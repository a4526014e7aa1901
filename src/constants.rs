use crate::data::SlotType;

/// Constants describing the slot layout of a sentence.
pub mod slots {
    use super::SlotType;

    /// Standard left-to-right slot order; individual examples may deviate.
    pub const CANONICAL_ORDER: [SlotType; 10] = [
        SlotType::M1,
        SlotType::S,
        SlotType::Aux,
        SlotType::M2,
        SlotType::V,
        SlotType::C1,
        SlotType::O1,
        SlotType::O2,
        SlotType::C2,
        SlotType::M3,
    ];

    /// Auxiliaries that mark a question when they open the sentence.
    pub const QUESTION_AUXILIARIES: [&str; 3] = ["do", "does", "did"];
}

/// Constants used by duplicate-avoidance history.
pub mod history {
    /// Default number of recent selections remembered per history kind.
    pub const DEFAULT_RECENT_LIMIT: usize = 6;
}

/// Constants used by state-store durable routing and bucket layout.
pub mod store {
    /// Literal subscription key receiving every state write.
    pub const ALL_PATHS_WILDCARD: &str = "*";

    /// Path prefix for per-slot visibility flags.
    pub const SLOT_VISIBILITY_PREFIX: &str = "visibility.slots";
    /// Path prefix for per-subslot visibility flags.
    pub const SUBSLOT_VISIBILITY_PREFIX: &str = "visibility.subslots";
    /// Path prefix for question-word visibility flags.
    pub const QUESTION_WORD_VISIBILITY_PREFIX: &str = "visibility.questionWord";
    /// Path for the playback volume setting.
    pub const VOLUME_PREFIX: &str = "audio.volume";
    /// Path for the layout zoom factor.
    pub const ZOOM_PREFIX: &str = "ui.zoom";
    /// Path for the global control-panels toggle.
    pub const CONTROL_PANELS_PREFIX: &str = "ui.controlPanelsVisible";

    /// Legacy bucket holding the slot-visibility subtree.
    pub const SLOT_VISIBILITY_BUCKET: &str = "rephrase_slot_visibility";
    /// Legacy bucket holding the subslot-visibility subtree and the
    /// control-panels flag.
    pub const SUBSLOT_VISIBILITY_BUCKET: &str = "rephrase_subslot_visibility";
    /// Legacy bucket holding the question-word visibility subtree.
    pub const QUESTION_WORD_VISIBILITY_BUCKET: &str = "rephrase_question_word_visibility";
    /// Sub-key the control-panels flag occupies inside the subslot bucket.
    pub const CONTROL_PANELS_SUBKEY: &str = "controlPanelsVisible";

    /// Path prefixes mirrored to durable buckets by default.
    pub const DEFAULT_DURABLE_ROUTES: [&str; 6] = [
        SLOT_VISIBILITY_PREFIX,
        SUBSLOT_VISIBILITY_PREFIX,
        QUESTION_WORD_VISIBILITY_PREFIX,
        VOLUME_PREFIX,
        ZOOM_PREFIX,
        CONTROL_PANELS_PREFIX,
    ];
}

/// Constants used by session position caching.
pub mod session {
    /// State path holding the persisted sentence-boundary snapshot.
    pub const POSITION_INFO_PATH: &str = "randomizer.sentencePositionInfo";
    /// Bucket used for the snapshot when no state store is attached.
    pub const POSITION_FALLBACK_BUCKET: &str = "rephrase_sentence_position";
}
