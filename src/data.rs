use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::types::{ExampleId, GroupKey, SetTag};

/// Grammatical slot positions, in canonical sentence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotType {
    /// Sentence-initial modifier.
    M1,
    /// Subject.
    S,
    /// Auxiliary.
    Aux,
    /// Mid-sentence modifier.
    M2,
    /// Verb.
    V,
    /// First complement.
    C1,
    /// First object.
    O1,
    /// Second object.
    O2,
    /// Second complement.
    C2,
    /// Sentence-final modifier.
    M3,
}

impl SlotType {
    /// Canonical name as it appears in corpus data.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SlotType::M1 => "M1",
            SlotType::S => "S",
            SlotType::Aux => "Aux",
            SlotType::M2 => "M2",
            SlotType::V => "V",
            SlotType::C1 => "C1",
            SlotType::O1 => "O1",
            SlotType::O2 => "O2",
            SlotType::C2 => "C2",
            SlotType::M3 => "M3",
        }
    }

    /// Parse a canonical slot name; names are case-sensitive.
    pub fn parse(value: &str) -> Option<SlotType> {
        match value {
            "M1" => Some(SlotType::M1),
            "S" => Some(SlotType::S),
            "Aux" => Some(SlotType::Aux),
            "M2" => Some(SlotType::M2),
            "V" => Some(SlotType::V),
            "C1" => Some(SlotType::C1),
            "O1" => Some(SlotType::O1),
            "O2" => Some(SlotType::O2),
            "C2" => Some(SlotType::C2),
            "M3" => Some(SlotType::M3),
            _ => None,
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distinguishes atomic word slots from clause slots (affects O1 policy).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseKind {
    /// Single word or short phrase.
    #[default]
    Word,
    /// Full clause.
    Clause,
}

impl PhraseKind {
    /// Parse a corpus kind marker; anything but `clause` is a word.
    pub fn parse(value: &str) -> PhraseKind {
        if value.trim().eq_ignore_ascii_case("clause") {
            PhraseKind::Clause
        } else {
            PhraseKind::Word
        }
    }
}

/// Marks wh-question word rows; at most one may surface per sentence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    /// Ordinary row.
    #[default]
    Plain,
    /// Wh-question word row.
    WhWord,
}

impl QuestionType {
    /// Parse a corpus question marker; anything but `wh-word` is plain.
    pub fn parse(value: &str) -> QuestionType {
        if value.trim().eq_ignore_ascii_case("wh-word") {
            QuestionType::WhWord
        } else {
            QuestionType::Plain
        }
    }
}

/// One corpus record: a main-slot row or a subslot row of one example.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotRow {
    /// Sentence-family key; rows sharing it are mutually substitutable.
    pub grammar_group: GroupKey,
    /// One concrete example sentence within the group.
    pub example_id: ExampleId,
    /// Slot position; `None` for rows whose source slot field was blank.
    pub slot_type: Option<SlotType>,
    /// Empty for main-slot rows; non-empty nests the row under the main
    /// slot sharing its `(example_id, slot_type)`.
    pub subslot_id: String,
    pub subslot_element: String,
    pub subslot_text: String,
    /// Learner-facing English text.
    pub phrase: String,
    /// Translation/explanatory text shown alongside the phrase.
    pub aux_text: String,
    /// Left-to-right ordering among an example's main slots.
    pub display_order: i64,
    /// Ordering within one slot's subslot group.
    pub sub_display_order: i64,
    pub phrase_kind: PhraseKind,
    pub question_type: QuestionType,
}

impl SlotRow {
    /// True for main-slot rows (empty subslot id).
    pub fn is_main(&self) -> bool {
        self.subslot_id.is_empty()
    }

    /// True for wh-question word rows.
    pub fn is_wh_word(&self) -> bool {
        self.question_type == QuestionType::WhWord
    }
}

/// One row of the assembled output sentence (main slot or subslot).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedSlot {
    pub slot_type: SlotType,
    /// Example the row was drawn from; per-slot redraws exclude it.
    pub example_id: ExampleId,
    pub phrase: String,
    pub aux_text: String,
    pub display_order: i64,
    pub phrase_kind: PhraseKind,
    pub question_type: QuestionType,
    pub subslot_id: String,
    pub subslot_element: String,
    pub subslot_text: String,
    pub sub_display_order: i64,
    /// Traceability tag `"{slot_type}-{set_index}"`; never drives logic.
    pub set_tag: SetTag,
}

impl SelectedSlot {
    /// Build an output row from a pool row and its traceability tag.
    pub fn from_row(row: &SlotRow, slot_type: SlotType, set_tag: SetTag) -> Self {
        Self {
            slot_type,
            example_id: row.example_id.clone(),
            phrase: row.phrase.clone(),
            aux_text: row.aux_text.clone(),
            display_order: row.display_order,
            phrase_kind: row.phrase_kind,
            question_type: row.question_type,
            subslot_id: row.subslot_id.clone(),
            subslot_element: row.subslot_element.clone(),
            subslot_text: row.subslot_text.clone(),
            sub_display_order: row.sub_display_order,
            set_tag,
        }
    }

    /// True for main-slot rows (empty subslot id).
    pub fn is_main(&self) -> bool {
        self.subslot_id.is_empty()
    }

    /// True for wh-question word rows.
    pub fn is_wh_word(&self) -> bool {
        self.question_type == QuestionType::WhWord
    }
}

/// Sentence-boundary snapshot persisted after a full randomize and read
/// back by per-slot redraws.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentencePositionInfo {
    /// Slot type rendered sentence-first.
    pub first_slot: SlotType,
    /// Slot type rendered sentence-last.
    pub last_slot: SlotType,
    /// Whether the sentence was judged a question.
    pub is_question: bool,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

/// Shared record of the most recent full randomization.
///
/// Mutated only by the full pass; per-slot redraws leave it untouched so it
/// always describes the last complete selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RandomizationState {
    /// Grammar group of the current sentence.
    pub current_group: Option<GroupKey>,
    /// Comma-joined example ids of the current selection.
    pub current_example_ids: String,
    /// When the last full randomize completed.
    pub last_randomized: Option<DateTime<Utc>>,
    /// Last assembled slot list.
    pub selected: Vec<SelectedSlot>,
}
