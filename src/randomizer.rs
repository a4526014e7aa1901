//! The two randomization passes: full-sentence assembly and per-slot
//! redraw.
//!
//! The full pass owns group choice, per-slot selection with its wh-word
//! and empty-slot rules, the object-slot special cases, sentence-form
//! normalization, and all bookkeeping writes. The per-slot pass swaps one
//! slot against the pool left behind by the full pass and re-applies
//! sentence form without re-deciding it.

use chrono::Utc;
use indexmap::{IndexMap, IndexSet};
use rand::seq::IndexedRandom;
use tracing::warn;

use crate::config::RandomizerConfig;
use crate::data::{PhraseKind, SelectedSlot, SentencePositionInfo, SlotRow, SlotType};
use crate::errors::RephraseError;
use crate::history::HistoryKind;
use crate::session::RandomizationSession;
use crate::utils::{apply_sentence_form, detect_question, sentence_bounds};

#[derive(Debug, Clone)]
/// Small deterministic RNG used for reproducible selection behavior.
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Sentence randomizer driving a [`RandomizationSession`].
///
/// Seeded explicitly through [`RandomizerConfig`] for reproducible runs,
/// or from entropy when no seed is given.
pub struct Randomizer {
    rng: DeterministicRng,
}

impl Randomizer {
    pub fn new(config: &RandomizerConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            rng: DeterministicRng::new(seed),
        }
    }

    /// Assemble a fresh sentence from `rows` and install it in `session`.
    ///
    /// Picks a grammar group (avoiding recent ones), draws one row per
    /// slot type with the wh-word and empty-slot rules applied, handles
    /// the object slot's construction cases, normalizes sentence form,
    /// and finally updates pool, history, summary state, and the
    /// displayed slots. Unusable input degrades to a warning and an empty
    /// result with the session left untouched.
    pub fn randomize_all(
        &mut self,
        session: &mut RandomizationSession,
        rows: &[SlotRow],
    ) -> Vec<SelectedSlot> {
        let mut group_keys: IndexSet<&str> = IndexSet::new();
        for row in rows {
            if !row.grammar_group.is_empty() {
                group_keys.insert(row.grammar_group.as_str());
            }
        }
        if group_keys.is_empty() {
            warn!("no grammar groups in corpus; nothing to randomize");
            return Vec::new();
        }

        let candidates: Vec<String> = group_keys.iter().map(|key| key.to_string()).collect();
        let current_group = session.state().current_group.clone();
        let fresh = session.history().filter_fresh(
            &candidates,
            current_group.as_deref(),
            HistoryKind::GroupKeys,
        );
        let pick_list = if fresh.is_empty() { &candidates } else { &fresh };
        let Some(group) = pick_list.choose(&mut self.rng).cloned() else {
            return Vec::new();
        };

        let group_rows: Vec<SlotRow> = rows
            .iter()
            .filter(|row| row.grammar_group == group)
            .cloned()
            .collect();

        let mut example_ids: IndexSet<&str> = IndexSet::new();
        for row in &group_rows {
            if !row.example_id.is_empty() {
                example_ids.insert(row.example_id.as_str());
            }
        }
        if example_ids.is_empty() {
            warn!(group = %group, "grammar group has no example ids; nothing to randomize");
            return Vec::new();
        }
        let total_examples = example_ids.len();
        let set_index =
            |example_id: &str| example_ids.get_index_of(example_id).map_or(0, |idx| idx + 1);

        let main_rows: Vec<&SlotRow> = group_rows
            .iter()
            .filter(|row| row.is_main() && row.slot_type.is_some() && !row.example_id.is_empty())
            .collect();
        let mut slot_types: IndexSet<SlotType> = IndexSet::new();
        for row in &main_rows {
            if let Some(slot_type) = row.slot_type {
                slot_types.insert(slot_type);
            }
        }

        let mut selected: Vec<SelectedSlot> = Vec::new();
        let mut wh_word_placed = false;

        // Object slot is handled after every other type; see below.
        for &slot_type in &slot_types {
            if slot_type == SlotType::O1 {
                continue;
            }
            let candidates: Vec<&SlotRow> = main_rows
                .iter()
                .copied()
                .filter(|row| row.slot_type == Some(slot_type))
                .collect();
            let has_wh = candidates.iter().any(|row| row.is_wh_word());
            let covering: IndexSet<&str> = candidates
                .iter()
                .map(|row| row.example_id.as_str())
                .collect();
            // A type missing from some examples may come up empty, but
            // never at the cost of dropping a wh-word candidate.
            let offer_empty = covering.len() < total_examples && !has_wh;

            let mut eligible: Vec<Option<&SlotRow>> = candidates
                .iter()
                .copied()
                .filter(|row| !(wh_word_placed && row.is_wh_word()))
                .map(Some)
                .collect();
            if offer_empty {
                eligible.push(None);
            }
            let Some(choice) = eligible.choose(&mut self.rng).copied() else {
                continue;
            };
            let Some(row) = choice else {
                continue;
            };
            if row.is_wh_word() {
                wh_word_placed = true;
            }
            append_selection(
                &mut selected,
                &group_rows,
                row,
                slot_type,
                set_index(&row.example_id),
            );
        }

        if slot_types.contains(&SlotType::O1) {
            let o1_rows: Vec<&SlotRow> = main_rows
                .iter()
                .copied()
                .filter(|row| row.slot_type == Some(SlotType::O1))
                .collect();
            let unique_orders: IndexSet<i64> =
                o1_rows.iter().map(|row| row.display_order).collect();
            if unique_orders.len() > 1 {
                let mut orders_by_example: IndexMap<&str, IndexSet<i64>> = IndexMap::new();
                for &row in &o1_rows {
                    orders_by_example
                        .entry(row.example_id.as_str())
                        .or_insert_with(IndexSet::new)
                        .insert(row.display_order);
                }
                let split_construction =
                    orders_by_example.values().any(|orders| orders.len() > 1);
                if split_construction {
                    // Split questions ("What ... about") need every part of
                    // the construction on screen at once.
                    let mut sub_done: IndexSet<&str> = IndexSet::new();
                    for &row in &o1_rows {
                        let tag = format!("{}-{}", SlotType::O1, set_index(&row.example_id));
                        selected.push(SelectedSlot::from_row(row, SlotType::O1, tag.clone()));
                        if sub_done.insert(row.example_id.as_str()) {
                            append_subslots(
                                &mut selected,
                                &group_rows,
                                &row.example_id,
                                SlotType::O1,
                                &tag,
                            );
                        }
                    }
                } else if let Some(row) = o1_rows.choose(&mut self.rng).copied() {
                    append_selection(
                        &mut selected,
                        &group_rows,
                        row,
                        SlotType::O1,
                        set_index(&row.example_id),
                    );
                }
            } else if !o1_rows.is_empty() {
                let clause_rows: Vec<&SlotRow> = o1_rows
                    .iter()
                    .copied()
                    .filter(|row| row.phrase_kind == PhraseKind::Clause)
                    .collect();
                let pick_from = if clause_rows.is_empty() {
                    &o1_rows
                } else {
                    &clause_rows
                };
                if let Some(row) = pick_from.choose(&mut self.rng).copied() {
                    append_selection(
                        &mut selected,
                        &group_rows,
                        row,
                        SlotType::O1,
                        set_index(&row.example_id),
                    );
                }
            }
        }

        if selected.is_empty() {
            warn!(group = %group, "selection produced no slots; session left untouched");
            return Vec::new();
        }

        let is_question = detect_question(&selected);
        let now = Utc::now();
        if let Some((first_slot, last_slot)) = sentence_bounds(&selected) {
            apply_sentence_form(&mut selected, first_slot, last_slot, is_question, None);
            session.store_position_info(&SentencePositionInfo {
                first_slot,
                last_slot,
                is_question,
                timestamp: now,
            });
        }

        let mut chosen_examples: IndexSet<&str> = IndexSet::new();
        for slot in &selected {
            chosen_examples.insert(slot.example_id.as_str());
        }
        let joined = chosen_examples
            .iter()
            .copied()
            .collect::<Vec<_>>()
            .join(",");

        session.history_mut().record(group.clone(), joined.clone());
        let state = session.state_mut();
        state.current_group = Some(group);
        state.current_example_ids = joined;
        state.last_randomized = Some(now);
        state.selected = selected.clone();
        session.replace_pool(group_rows);
        session.set_current_slots(selected.clone());
        selected
    }

    /// Redraw one slot against the session's pool, keeping every other
    /// slot byte-for-byte as displayed.
    ///
    /// Requires a prior full pass (pool and displayed slots present), at
    /// least two candidate rows for the slot, and a candidate outside the
    /// currently displayed example. Sentence form is re-applied from the
    /// stored position snapshot, extending to the redrawn slot's subslot
    /// text when that slot is sentence-first or sentence-last.
    pub fn randomize_slot(
        &mut self,
        session: &mut RandomizationSession,
        slot: SlotType,
    ) -> Result<(), RephraseError> {
        if session.full_pool().is_empty() {
            return Err(RephraseError::MissingPool);
        }
        if session.current_slots().is_empty() {
            return Err(RephraseError::MissingCurrentSlots);
        }

        let pool = session.full_pool();
        let candidates: Vec<&SlotRow> = pool
            .iter()
            .filter(|row| {
                row.is_main() && row.slot_type == Some(slot) && !row.example_id.is_empty()
            })
            .collect();
        if candidates.len() <= 1 {
            return Err(RephraseError::NotEnoughAlternatives {
                slot,
                available: candidates.len(),
            });
        }

        let current_example: Option<String> = session
            .current_slots()
            .iter()
            .find(|displayed| displayed.is_main() && displayed.slot_type == slot)
            .map(|displayed| displayed.example_id.clone());
        let fresh: Vec<&SlotRow> = candidates
            .iter()
            .copied()
            .filter(|row| current_example.as_deref() != Some(row.example_id.as_str()))
            .collect();
        let Some(chosen) = fresh.choose(&mut self.rng).copied() else {
            return Err(RephraseError::NoFreshAlternative { slot });
        };

        let mut example_ids: IndexSet<&str> = IndexSet::new();
        for row in pool {
            if !row.example_id.is_empty() {
                example_ids.insert(row.example_id.as_str());
            }
        }
        let set_index = example_ids
            .get_index_of(chosen.example_id.as_str())
            .map_or(0, |idx| idx + 1);
        let tag = format!("{slot}-{set_index}");

        let mut replacement: Vec<SelectedSlot> =
            vec![SelectedSlot::from_row(chosen, slot, tag.clone())];
        for row in pool {
            if !row.is_main() && row.example_id == chosen.example_id && row.slot_type == Some(slot)
            {
                replacement.push(SelectedSlot::from_row(row, slot, tag.clone()));
            }
        }

        let mut updated: Vec<SelectedSlot> = session
            .current_slots()
            .iter()
            .filter(|displayed| displayed.slot_type != slot)
            .cloned()
            .collect();
        updated.extend(replacement);

        let info = session.load_position_info().or_else(|| {
            warn!(slot = %slot, "sentence position info missing; deriving from slots in hand");
            derive_position_info(&updated)
        });
        if let Some(info) = info {
            apply_sentence_form(
                &mut updated,
                info.first_slot,
                info.last_slot,
                info.is_question,
                Some(slot),
            );
        }
        session.set_current_slots(updated);
        Ok(())
    }
}

fn append_selection(
    selected: &mut Vec<SelectedSlot>,
    group_rows: &[SlotRow],
    main: &SlotRow,
    slot_type: SlotType,
    set_index: usize,
) {
    let tag = format!("{slot_type}-{set_index}");
    selected.push(SelectedSlot::from_row(main, slot_type, tag.clone()));
    append_subslots(selected, group_rows, &main.example_id, slot_type, &tag);
}

fn append_subslots(
    selected: &mut Vec<SelectedSlot>,
    group_rows: &[SlotRow],
    example_id: &str,
    slot_type: SlotType,
    tag: &str,
) {
    for row in group_rows {
        if !row.is_main() && row.example_id == example_id && row.slot_type == Some(slot_type) {
            selected.push(SelectedSlot::from_row(row, slot_type, tag.to_string()));
        }
    }
}

fn derive_position_info(slots: &[SelectedSlot]) -> Option<SentencePositionInfo> {
    let (first_slot, last_slot) = sentence_bounds(slots)?;
    Some(SentencePositionInfo {
        first_slot,
        last_slot,
        is_question: detect_question(slots),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_rng_reproduces_sequences() {
        let mut a = DeterministicRng::new(42);
        let mut b = DeterministicRng::new(42);
        let left: Vec<u64> = (0..8).map(|_| a.next_u64_internal()).collect();
        let right: Vec<u64> = (0..8).map(|_| b.next_u64_internal()).collect();
        assert_eq!(left, right);

        let mut c = DeterministicRng::new(43);
        let other: Vec<u64> = (0..8).map(|_| c.next_u64_internal()).collect();
        assert_ne!(left, other);
    }

    #[test]
    fn fill_bytes_covers_unaligned_lengths() {
        use rand::RngCore;
        let mut rng = DeterministicRng::new(7);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert_ne!(buf, [0u8; 13]);
    }

    #[test]
    fn redraw_requires_a_prior_full_pass() {
        let mut randomizer = Randomizer::new(&RandomizerConfig {
            seed: Some(1),
            ..RandomizerConfig::default()
        });
        let mut session = RandomizationSession::new(&RandomizerConfig::default());
        let err = randomizer
            .randomize_slot(&mut session, SlotType::S)
            .unwrap_err();
        assert!(matches!(err, RephraseError::MissingPool));

        session.replace_pool(vec![SlotRow {
            grammar_group: "G1".to_string(),
            example_id: "e1".to_string(),
            slot_type: Some(SlotType::S),
            subslot_id: String::new(),
            subslot_element: String::new(),
            subslot_text: String::new(),
            phrase: "the cat".to_string(),
            aux_text: String::new(),
            display_order: 2,
            sub_display_order: 0,
            phrase_kind: PhraseKind::Word,
            question_type: crate::data::QuestionType::Plain,
        }]);
        let err = randomizer
            .randomize_slot(&mut session, SlotType::S)
            .unwrap_err();
        assert!(matches!(err, RephraseError::MissingCurrentSlots));
    }
}
