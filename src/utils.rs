//! Sentence-boundary text normalization shared by both randomization passes.

use crate::constants::slots::QUESTION_AUXILIARIES;
use crate::data::{SelectedSlot, SlotType};

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Drop any trailing `.`, `?`, or `!` characters.
pub fn strip_terminal_punctuation(text: &str) -> &str {
    text.trim_end_matches(['.', '?', '!'])
}

/// Replace existing terminal punctuation with `mark`.
pub fn punctuate(text: &str, mark: char) -> String {
    format!("{}{}", strip_terminal_punctuation(text), mark)
}

/// True when a trimmed phrase is one of the question-opening auxiliaries.
pub fn is_question_auxiliary(phrase: &str) -> bool {
    let trimmed = phrase.trim();
    QUESTION_AUXILIARIES
        .iter()
        .any(|aux| trimmed.eq_ignore_ascii_case(aux))
}

/// Judge whether the assembled sentence is a question.
///
/// Only the first two main rows by display order are inspected: a wh-word
/// row or a bare `do`/`does`/`did` phrase marks a question. Punctuation is
/// never part of the evidence, so the verdict is stable across the
/// normalization pass.
pub fn detect_question(slots: &[SelectedSlot]) -> bool {
    let mut mains: Vec<&SelectedSlot> = slots.iter().filter(|slot| slot.is_main()).collect();
    mains.sort_by_key(|slot| slot.display_order);
    mains
        .iter()
        .take(2)
        .any(|slot| slot.is_wh_word() || is_question_auxiliary(&slot.phrase))
}

/// Slot types holding the minimum and maximum display order among main rows.
pub fn sentence_bounds(slots: &[SelectedSlot]) -> Option<(SlotType, SlotType)> {
    let first = slots
        .iter()
        .filter(|slot| slot.is_main())
        .min_by_key(|slot| slot.display_order)?;
    let last = slots
        .iter()
        .filter(|slot| slot.is_main())
        .max_by_key(|slot| slot.display_order)?;
    Some((first.slot_type, last.slot_type))
}

/// Apply sentence-boundary capitalization and punctuation in place.
///
/// The sentence-first main row (minimum display order within `first_slot`)
/// is capitalized and the sentence-last main row (maximum display order
/// within `last_slot`) gets terminal punctuation. Subslot text is touched
/// only when `subslot_focus` names the boundary slot itself: per-slot
/// redraws pass their target type here, the full pass passes `None`.
pub fn apply_sentence_form(
    slots: &mut [SelectedSlot],
    first_slot: SlotType,
    last_slot: SlotType,
    is_question: bool,
    subslot_focus: Option<SlotType>,
) {
    let mark = if is_question { '?' } else { '.' };

    if let Some(idx) = main_index(slots, first_slot, Bound::Min) {
        slots[idx].phrase = capitalize_first(&slots[idx].phrase);
    }
    if let Some(idx) = main_index(slots, last_slot, Bound::Max) {
        slots[idx].phrase = punctuate(&slots[idx].phrase, mark);
    }

    let Some(focus) = subslot_focus else { return };
    if focus == first_slot
        && let Some(idx) = subslot_index(slots, focus, Bound::Min)
    {
        slots[idx].subslot_text = capitalize_first(&slots[idx].subslot_text);
    }
    if focus == last_slot
        && let Some(idx) = subslot_index(slots, focus, Bound::Max)
    {
        slots[idx].subslot_text = punctuate(&slots[idx].subslot_text, mark);
    }
}

enum Bound {
    Min,
    Max,
}

fn main_index(slots: &[SelectedSlot], slot_type: SlotType, bound: Bound) -> Option<usize> {
    let candidates = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_main() && slot.slot_type == slot_type);
    match bound {
        Bound::Min => candidates
            .min_by_key(|(_, slot)| slot.display_order)
            .map(|(idx, _)| idx),
        Bound::Max => candidates
            .max_by_key(|(_, slot)| slot.display_order)
            .map(|(idx, _)| idx),
    }
}

fn subslot_index(slots: &[SelectedSlot], slot_type: SlotType, bound: Bound) -> Option<usize> {
    let candidates = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| !slot.is_main() && slot.slot_type == slot_type);
    match bound {
        Bound::Min => candidates
            .min_by_key(|(_, slot)| slot.sub_display_order)
            .map(|(idx, _)| idx),
        Bound::Max => candidates
            .max_by_key(|(_, slot)| slot.sub_display_order)
            .map(|(idx, _)| idx),
    }
}
