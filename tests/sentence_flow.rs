use rephrase::utils::detect_question;
use rephrase::{
    PhraseKind, QuestionType, RandomizationSession, Randomizer, RandomizerConfig, SelectedSlot,
    SlotRow, SlotType,
};

fn row(group: &str, example: &str, slot: SlotType, phrase: &str, order: i64) -> SlotRow {
    SlotRow {
        grammar_group: group.to_string(),
        example_id: example.to_string(),
        slot_type: Some(slot),
        subslot_id: String::new(),
        subslot_element: String::new(),
        subslot_text: String::new(),
        phrase: phrase.to_string(),
        aux_text: String::new(),
        display_order: order,
        sub_display_order: 0,
        phrase_kind: PhraseKind::Word,
        question_type: QuestionType::Plain,
    }
}

fn sub_row(
    group: &str,
    example: &str,
    slot: SlotType,
    id: &str,
    text: &str,
    sub_order: i64,
) -> SlotRow {
    SlotRow {
        subslot_id: id.to_string(),
        subslot_element: "word".to_string(),
        subslot_text: text.to_string(),
        sub_display_order: sub_order,
        ..row(group, example, slot, "", 0)
    }
}

fn wh_row(group: &str, example: &str, slot: SlotType, phrase: &str, order: i64) -> SlotRow {
    SlotRow {
        question_type: QuestionType::WhWord,
        ..row(group, example, slot, phrase, order)
    }
}

fn seeded(seed: u64) -> (Randomizer, RandomizationSession) {
    let config = RandomizerConfig {
        seed: Some(seed),
        ..RandomizerConfig::default()
    };
    (Randomizer::new(&config), RandomizationSession::new(&config))
}

fn declarative_pool() -> Vec<SlotRow> {
    vec![
        row("G-cat", "e1", SlotType::S, "the cat", 2),
        sub_row("G-cat", "e1", SlotType::S, "s1", "the", 1),
        sub_row("G-cat", "e1", SlotType::S, "s2", "cat", 2),
        row("G-cat", "e1", SlotType::V, "sleeps", 5),
        sub_row("G-cat", "e1", SlotType::V, "v1", "sleeps", 1),
        row("G-cat", "e2", SlotType::S, "my brother", 2),
        sub_row("G-cat", "e2", SlotType::S, "s1", "my", 1),
        sub_row("G-cat", "e2", SlotType::S, "s2", "brother", 2),
        row("G-cat", "e2", SlotType::V, "snores", 5),
        sub_row("G-cat", "e2", SlotType::V, "v1", "snores", 1),
    ]
}

fn aux_question_pool() -> Vec<SlotRow> {
    vec![
        row("G-do", "q1", SlotType::Aux, "do", 1),
        row("G-do", "q1", SlotType::S, "you", 2),
        row("G-do", "q1", SlotType::V, "run", 5),
        row("G-do", "q2", SlotType::Aux, "does", 1),
        row("G-do", "q2", SlotType::S, "she", 2),
        row("G-do", "q2", SlotType::V, "swim", 5),
    ]
}

fn wh_question_pool() -> Vec<SlotRow> {
    vec![
        wh_row("G-why", "w1", SlotType::M1, "why", 1),
        row("G-why", "w1", SlotType::Aux, "did", 2),
        row("G-why", "w1", SlotType::S, "you", 3),
        row("G-why", "w1", SlotType::V, "leave", 5),
        wh_row("G-why", "w2", SlotType::M1, "when", 1),
        row("G-why", "w2", SlotType::Aux, "did", 2),
        row("G-why", "w2", SlotType::S, "they", 3),
        row("G-why", "w2", SlotType::V, "move", 5),
    ]
}

fn main_rows(slots: &[SelectedSlot]) -> Vec<&SelectedSlot> {
    let mut mains: Vec<&SelectedSlot> = slots.iter().filter(|slot| slot.is_main()).collect();
    mains.sort_by_key(|slot| slot.display_order);
    mains
}

fn terminal_mark_count(slots: &[SelectedSlot]) -> usize {
    slots
        .iter()
        .filter(|slot| slot.is_main())
        .filter(|slot| slot.phrase.ends_with(['.', '?', '!']))
        .count()
}

#[test]
fn assembled_sentences_keep_the_expected_envelope() {
    let pool = vec![
        row("G-mix", "e1", SlotType::S, "the cat", 2),
        row("G-mix", "e1", SlotType::V, "sleeps", 5),
        row("G-mix", "e2", SlotType::S, "the dog", 2),
        row("G-mix", "e2", SlotType::V, "runs", 5),
        row("G-mix", "e2", SlotType::O1, "laps", 7),
    ];
    for seed in 0..40 {
        let (mut randomizer, mut session) = seeded(seed);
        let selected = randomizer.randomize_all(&mut session, &pool);

        for slot in &selected {
            assert!(
                matches!(slot.slot_type, SlotType::S | SlotType::V | SlotType::O1),
                "unexpected slot type in seed {seed}"
            );
        }
        assert!(selected.iter().any(|slot| slot.slot_type == SlotType::S));
        assert!(selected.iter().any(|slot| slot.slot_type == SlotType::V));

        let mains = main_rows(&selected);
        let first = mains.first().unwrap();
        let last = mains.last().unwrap();
        assert_eq!(first.slot_type, SlotType::S);
        assert!(first.phrase.starts_with(char::is_uppercase));
        assert!(last.phrase.ends_with('.'), "seed {seed}: {:?}", last.phrase);
        assert_eq!(terminal_mark_count(&selected), 1);
    }
}

#[test]
fn question_marks_track_the_detection_verdict() {
    for seed in 0..25 {
        let (mut randomizer, mut session) = seeded(seed);

        let declarative = randomizer.randomize_all(&mut session, &declarative_pool());
        assert!(!detect_question(&declarative));
        assert!(main_rows(&declarative).last().unwrap().phrase.ends_with('.'));

        let aux = randomizer.randomize_all(&mut session, &aux_question_pool());
        assert!(detect_question(&aux));
        assert!(main_rows(&aux).last().unwrap().phrase.ends_with('?'));

        let wh = randomizer.randomize_all(&mut session, &wh_question_pool());
        assert!(detect_question(&wh));
        assert!(main_rows(&wh).last().unwrap().phrase.ends_with('?'));
    }
}

#[test]
fn full_pass_normalizes_only_main_phrases() {
    for seed in 0..20 {
        let (mut randomizer, mut session) = seeded(seed);
        let selected = randomizer.randomize_all(&mut session, &declarative_pool());
        for slot in selected.iter().filter(|slot| !slot.is_main()) {
            assert!(
                slot.subslot_text.starts_with(char::is_lowercase),
                "seed {seed} capitalized subslot text {:?}",
                slot.subslot_text
            );
            assert!(!slot.subslot_text.ends_with(['.', '?', '!']));
        }
    }
}

#[test]
fn redraw_of_a_middle_slot_preserves_sentence_form() {
    let pool = vec![
        row("G-mid", "e1", SlotType::S, "the cat", 2),
        row("G-mid", "e1", SlotType::V, "sleeps", 5),
        row("G-mid", "e1", SlotType::M3, "at night", 9),
        row("G-mid", "e2", SlotType::S, "dogs", 2),
        row("G-mid", "e2", SlotType::V, "bark", 5),
        row("G-mid", "e2", SlotType::M3, "loudly", 9),
    ];
    for seed in 0..20 {
        let (mut randomizer, mut session) = seeded(seed);
        randomizer.randomize_all(&mut session, &pool);
        randomizer.randomize_slot(&mut session, SlotType::V).unwrap();

        let slots = session.current_slots();
        let mains = main_rows(slots);
        assert!(mains.first().unwrap().phrase.starts_with(char::is_uppercase));
        assert!(mains.last().unwrap().phrase.ends_with('.'));
        assert_eq!(terminal_mark_count(slots), 1);

        let v_phrase = &mains
            .iter()
            .find(|slot| slot.slot_type == SlotType::V)
            .unwrap()
            .phrase;
        assert!(!v_phrase.ends_with(['.', '?', '!']));
        assert!(v_phrase.starts_with(char::is_lowercase));
    }
}

#[test]
fn redraw_of_the_first_slot_capitalizes_its_subslot_text() {
    for seed in 0..20 {
        let (mut randomizer, mut session) = seeded(seed);
        randomizer.randomize_all(&mut session, &declarative_pool());
        randomizer.randomize_slot(&mut session, SlotType::S).unwrap();

        let slots = session.current_slots();
        let mut s_subs: Vec<&SelectedSlot> = slots
            .iter()
            .filter(|slot| !slot.is_main() && slot.slot_type == SlotType::S)
            .collect();
        s_subs.sort_by_key(|slot| slot.sub_display_order);
        assert_eq!(s_subs.len(), 2);
        assert!(s_subs[0].subslot_text.starts_with(char::is_uppercase));
        assert!(s_subs[1].subslot_text.starts_with(char::is_lowercase));

        for sub in slots
            .iter()
            .filter(|slot| !slot.is_main() && slot.slot_type == SlotType::V)
        {
            assert!(sub.subslot_text.starts_with(char::is_lowercase));
            assert!(!sub.subslot_text.ends_with(['.', '?', '!']));
        }
    }
}

#[test]
fn redraw_of_the_last_slot_punctuates_its_subslot_text() {
    for seed in 0..20 {
        let (mut randomizer, mut session) = seeded(seed);
        randomizer.randomize_all(&mut session, &declarative_pool());
        randomizer.randomize_slot(&mut session, SlotType::V).unwrap();

        let slots = session.current_slots();
        let v_subs: Vec<&SelectedSlot> = slots
            .iter()
            .filter(|slot| !slot.is_main() && slot.slot_type == SlotType::V)
            .collect();
        assert_eq!(v_subs.len(), 1);
        assert!(
            v_subs[0].subslot_text.ends_with('.'),
            "seed {seed}: {:?}",
            v_subs[0].subslot_text
        );

        // Subject subslots were not the redraw target and stay raw.
        for sub in slots
            .iter()
            .filter(|slot| !slot.is_main() && slot.slot_type == SlotType::S)
        {
            assert!(sub.subslot_text.starts_with(char::is_lowercase));
        }
    }
}

#[test]
fn redraws_keep_the_question_verdict_stable() {
    for seed in 0..20 {
        let (mut randomizer, mut session) = seeded(seed);
        randomizer.randomize_all(&mut session, &aux_question_pool());

        for _ in 0..4 {
            randomizer.randomize_slot(&mut session, SlotType::S).unwrap();
            let slots = session.current_slots();
            assert!(detect_question(slots));
            assert!(main_rows(slots).last().unwrap().phrase.ends_with('?'));
            assert_eq!(terminal_mark_count(slots), 1);
        }
    }
}
