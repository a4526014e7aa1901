//! Corpus ingestion: tolerant JSON decoding of slot-row exports.
//!
//! Source exports come in two key dialects (a camelCase one and a legacy
//! spreadsheet one), order columns arrive as numbers or numeric strings,
//! and individual rows can be malformed. Decoding is lossy by policy:
//! broken rows are skipped with a warning instead of failing the batch.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::data::{PhraseKind, QuestionType, SlotRow, SlotType};
use crate::errors::RephraseError;

/// Wire form of one corpus row before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawSlotRow {
    #[serde(rename = "grammarGroupKey", alias = "V_group_key")]
    grammar_group: String,
    #[serde(rename = "exampleId", alias = "例文ID")]
    example_id: String,
    #[serde(rename = "slotType", alias = "Slot")]
    slot_type: String,
    #[serde(rename = "subslotId", alias = "SubslotID")]
    subslot_id: String,
    #[serde(rename = "subslotElement", alias = "SubslotElement")]
    subslot_element: String,
    #[serde(rename = "subslotText", alias = "SubslotText")]
    subslot_text: String,
    #[serde(rename = "phraseText", alias = "SlotPhrase")]
    phrase: String,
    #[serde(rename = "auxText", alias = "SlotText")]
    aux_text: String,
    #[serde(rename = "displayOrder", alias = "Slot_display_order")]
    display_order: OrderValue,
    #[serde(rename = "subDisplayOrder", alias = "Subslot_display_order")]
    sub_display_order: OrderValue,
    #[serde(rename = "phraseKind", alias = "PhraseType")]
    phrase_kind: String,
    #[serde(rename = "questionType", alias = "QuestionType")]
    question_type: String,
}

/// Ordering column as exported: integer, float, or numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OrderValue {
    Number(i64),
    Float(f64),
    Text(String),
}

impl Default for OrderValue {
    fn default() -> Self {
        OrderValue::Number(0)
    }
}

impl OrderValue {
    fn as_i64(&self) -> i64 {
        match self {
            OrderValue::Number(value) => *value,
            OrderValue::Float(value) => value.round() as i64,
            OrderValue::Text(text) => {
                let trimmed = text.trim();
                trimmed
                    .parse::<i64>()
                    .or_else(|_| trimmed.parse::<f64>().map(|value| value.round() as i64))
                    .unwrap_or(0)
            }
        }
    }
}

fn normalize(raw: RawSlotRow) -> SlotRow {
    SlotRow {
        grammar_group: raw.grammar_group.trim().to_string(),
        example_id: raw.example_id.trim().to_string(),
        slot_type: parse_slot_type(&raw.slot_type),
        subslot_id: raw.subslot_id.trim().to_string(),
        subslot_element: raw.subslot_element,
        subslot_text: raw.subslot_text,
        phrase: raw.phrase,
        aux_text: raw.aux_text,
        display_order: raw.display_order.as_i64(),
        sub_display_order: raw.sub_display_order.as_i64(),
        phrase_kind: PhraseKind::parse(&raw.phrase_kind),
        question_type: QuestionType::parse(&raw.question_type),
    }
}

fn parse_slot_type(value: &str) -> Option<SlotType> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = SlotType::parse(trimmed);
    if parsed.is_none() {
        warn!(slot = trimmed, "unknown slot type; row kept but unselectable");
    }
    parsed
}

/// Decode a JSON array of corpus rows from text.
///
/// Fails only when the payload is not valid JSON or not an array of
/// objects; field-level oddities are absorbed row by row.
pub fn parse_corpus(payload: &str) -> Result<Vec<SlotRow>, RephraseError> {
    let value: Value = serde_json::from_str(payload)?;
    Ok(rows_from_value(value))
}

/// Decode corpus rows from an already-parsed JSON value.
///
/// Non-array payloads and malformed rows degrade to warnings; the
/// returned vector holds whatever decoded cleanly, in source order.
pub fn rows_from_value(value: Value) -> Vec<SlotRow> {
    let Value::Array(items) = value else {
        warn!("corpus payload is not a JSON array; no rows loaded");
        return Vec::new();
    };
    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawSlotRow>(item) {
            Ok(raw) => rows.push(normalize(raw)),
            Err(err) => {
                warn!(index = idx, error = %err, "skipping malformed corpus row");
            }
        }
    }
    rows
}
