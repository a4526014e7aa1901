//! Runnable demo logic backing the `demos/` binaries.
//!
//! Kept in the library so the argument parsing and wiring are unit
//! testable; the binaries are thin wrappers around the `run_*` functions.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, error::ErrorKind};
use serde_json::json;

use crate::config::RandomizerConfig;
use crate::corpus::parse_corpus;
use crate::data::{SelectedSlot, SlotType};
use crate::randomizer::Randomizer;
use crate::session::{RandomizationSession, RenderSink};
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};
use crate::store::StateStore;

/// Small bundled corpus in the legacy export dialect: a declarative group
/// with subslots, a split wh-question group, and a clause-object group.
const DEMO_CORPUS: &str = r#"[
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-01", "Slot": "S", "SlotPhrase": "the cat", "SlotText": "猫", "Slot_display_order": 2},
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-01", "Slot": "S", "SubslotID": "s1", "SubslotElement": "article", "SubslotText": "the", "Subslot_display_order": 1},
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-01", "Slot": "S", "SubslotID": "s2", "SubslotElement": "noun", "SubslotText": "cat", "Subslot_display_order": 2},
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-01", "Slot": "V", "SlotPhrase": "sleeps", "SlotText": "眠る", "Slot_display_order": 5},
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-01", "Slot": "M3", "SlotPhrase": "at night", "SlotText": "夜に", "Slot_display_order": 9},
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-02", "Slot": "S", "SlotPhrase": "my brother", "SlotText": "私の兄", "Slot_display_order": 2},
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-02", "Slot": "S", "SubslotID": "s1", "SubslotElement": "possessive", "SubslotText": "my", "Subslot_display_order": 1},
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-02", "Slot": "S", "SubslotID": "s2", "SubslotElement": "noun", "SubslotText": "brother", "Subslot_display_order": 2},
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-02", "Slot": "V", "SlotPhrase": "snores", "SlotText": "いびきをかく", "Slot_display_order": 5},
  {"V_group_key": "present-simple-sleep", "例文ID": "sleep-02", "Slot": "M3", "SlotPhrase": "loudly", "SlotText": "大きな音で", "Slot_display_order": 9},

  {"V_group_key": "buy-wh-question", "例文ID": "buy-01", "Slot": "O1", "SlotPhrase": "what", "SlotText": "何を", "Slot_display_order": 1, "QuestionType": "wh-word"},
  {"V_group_key": "buy-wh-question", "例文ID": "buy-01", "Slot": "Aux", "SlotPhrase": "did", "SlotText": "", "Slot_display_order": 3},
  {"V_group_key": "buy-wh-question", "例文ID": "buy-01", "Slot": "S", "SlotPhrase": "you", "SlotText": "あなたは", "Slot_display_order": 4},
  {"V_group_key": "buy-wh-question", "例文ID": "buy-01", "Slot": "V", "SlotPhrase": "buy", "SlotText": "買う", "Slot_display_order": 5},
  {"V_group_key": "buy-wh-question", "例文ID": "buy-01", "Slot": "O1", "SlotPhrase": "for the trip", "SlotText": "旅行のために", "Slot_display_order": 8},
  {"V_group_key": "buy-wh-question", "例文ID": "buy-02", "Slot": "Aux", "SlotPhrase": "did", "SlotText": "", "Slot_display_order": 3},
  {"V_group_key": "buy-wh-question", "例文ID": "buy-02", "Slot": "S", "SlotPhrase": "they", "SlotText": "彼らは", "Slot_display_order": 4},
  {"V_group_key": "buy-wh-question", "例文ID": "buy-02", "Slot": "V", "SlotPhrase": "pack", "SlotText": "詰める", "Slot_display_order": 5},

  {"V_group_key": "think-clause", "例文ID": "think-01", "Slot": "S", "SlotPhrase": "I", "SlotText": "私は", "Slot_display_order": 2},
  {"V_group_key": "think-clause", "例文ID": "think-01", "Slot": "V", "SlotPhrase": "think", "SlotText": "思う", "Slot_display_order": 5},
  {"V_group_key": "think-clause", "例文ID": "think-01", "Slot": "O1", "SlotPhrase": "that it works", "SlotText": "うまくいくと", "Slot_display_order": 7, "PhraseType": "clause"},
  {"V_group_key": "think-clause", "例文ID": "think-01", "Slot": "M3", "SlotPhrase": "today", "SlotText": "今日", "Slot_display_order": 9},
  {"V_group_key": "think-clause", "例文ID": "think-02", "Slot": "S", "SlotPhrase": "she", "SlotText": "彼女は", "Slot_display_order": 2},
  {"V_group_key": "think-clause", "例文ID": "think-02", "Slot": "V", "SlotPhrase": "says", "SlotText": "言う", "Slot_display_order": 5},
  {"V_group_key": "think-clause", "例文ID": "think-02", "Slot": "O1", "SlotPhrase": "it is fine", "SlotText": "大丈夫だと", "Slot_display_order": 7, "PhraseType": "clause"},
  {"V_group_key": "think-clause", "例文ID": "think-03", "Slot": "S", "SlotPhrase": "they", "SlotText": "彼らは", "Slot_display_order": 2},
  {"V_group_key": "think-clause", "例文ID": "think-03", "Slot": "V", "SlotPhrase": "agree", "SlotText": "同意する", "Slot_display_order": 5}
]"#;

#[derive(Debug, Parser)]
#[command(
    name = "shuffle_demo",
    disable_help_subcommand = true,
    about = "Assemble randomized sentences from a bundled corpus",
    long_about = "Run full randomization rounds over a small bundled corpus, printing each assembled sentence, then optionally redraw a single slot per round."
)]
struct ShuffleDemoCli {
    #[arg(long, help = "Optional deterministic seed override")]
    seed: Option<u64>,
    #[arg(
        long,
        default_value_t = 3,
        help = "Number of full randomization rounds"
    )]
    rounds: usize,
    #[arg(
        long,
        value_name = "SLOT",
        help = "Slot to redraw after each round (e.g. S, V, O1)"
    )]
    redraw: Option<String>,
    #[arg(
        long = "state-dir",
        value_name = "PATH",
        help = "Directory for durable state buckets"
    )]
    state_dir: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[command(
    name = "state_demo",
    disable_help_subcommand = true,
    about = "Exercise the durable state store",
    long_about = "Write visibility and UI settings through the state store, sync them to durable buckets, and show what a fresh store hydrates back."
)]
struct StateDemoCli {
    #[arg(
        long = "state-dir",
        value_name = "PATH",
        help = "Directory for durable state buckets"
    )]
    state_dir: Option<PathBuf>,
}

struct PrintSink;

impl RenderSink for PrintSink {
    fn present(&mut self, slots: &[SelectedSlot]) {
        println!("sentence   : {}", assemble_sentence(slots));
        for slot in slots {
            if !slot.is_main() {
                continue;
            }
            if slot.aux_text.is_empty() {
                println!("  [{:<5}] {:<3} {}", slot.set_tag, slot.slot_type.as_str(), slot.phrase);
            } else {
                println!(
                    "  [{:<5}] {:<3} {}  ({})",
                    slot.set_tag,
                    slot.slot_type.as_str(),
                    slot.phrase,
                    slot.aux_text
                );
            }
        }
    }
}

/// Join a selection's main phrases in display order.
pub fn assemble_sentence(slots: &[SelectedSlot]) -> String {
    let mut mains: Vec<&SelectedSlot> = slots.iter().filter(|slot| slot.is_main()).collect();
    mains.sort_by_key(|slot| slot.display_order);
    let parts: Vec<&str> = mains
        .iter()
        .filter(|slot| !slot.phrase.is_empty())
        .map(|slot| slot.phrase.as_str())
        .collect();
    parts.join(" ")
}

/// Entry point for the `shuffle_demo` binary.
pub fn run_shuffle_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<ShuffleDemoCli, _>(
        std::iter::once("shuffle_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let redraw = match &cli.redraw {
        Some(raw) => match SlotType::parse(raw.trim()) {
            Some(slot) => Some(slot),
            None => {
                return Err(format!(
                    "unknown slot '{raw}'; expected one of M1, S, Aux, M2, V, C1, O1, O2, C2, M3"
                )
                .into());
            }
        },
        None => None,
    };

    let rows = parse_corpus(DEMO_CORPUS)?;
    let config = RandomizerConfig {
        seed: cli.seed,
        ..RandomizerConfig::default()
    };

    let mut session = RandomizationSession::new(&config).with_sink(Box::new(PrintSink));
    if let Some(dir) = &cli.state_dir {
        let storage: Arc<dyn StorageBackend> = Arc::new(FileStorage::open(dir)?);
        session = session.with_store(StateStore::with_storage(storage));
    }
    let mut randomizer = Randomizer::new(&config);

    for round in 1..=cli.rounds {
        println!("=== round {round} ===");
        let selected = randomizer.randomize_all(&mut session, &rows);
        if selected.is_empty() {
            println!("(no sentence could be assembled)");
            continue;
        }
        let state = session.state();
        if let Some(group) = &state.current_group {
            println!("group      : {group}");
        }
        println!("examples   : {}", state.current_example_ids);
        if let Some(slot) = redraw {
            println!("--- redraw {slot} ---");
            if let Err(err) = randomizer.randomize_slot(&mut session, slot) {
                println!("redraw failed: {err}");
            }
        }
        println!();
    }
    Ok(())
}

/// Entry point for the `state_demo` binary.
pub fn run_state_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<StateDemoCli, _>(std::iter::once("state_demo".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let storage: Arc<dyn StorageBackend> = match &cli.state_dir {
        Some(dir) => Arc::new(FileStorage::open(dir)?),
        None => Arc::new(MemoryStorage::new()),
    };

    let mut store = StateStore::with_storage(Arc::clone(&storage));
    store.add_listener(
        "*",
        Box::new(|new, old, path| {
            match old {
                Some(old) => println!("changed {path}: {old} -> {new}"),
                None => println!("created {path}: {new}"),
            }
            Ok(())
        }),
    );

    store.set("visibility.slots.s.text", json!(false));
    store.set("visibility.slots.v.image", json!(true));
    store.set("visibility.subslots.o1.text", json!(true));
    store.set("visibility.questionWord.enabled", json!(true));
    store.set("audio.volume", json!(0.8));
    store.set("ui.zoom", json!(1.25));
    store.set("ui.controlPanelsVisible", json!(true));
    store.sync();

    println!();
    println!("in-memory tree:");
    println!("{}", serde_json::to_string_pretty(store.tree())?);

    let rehydrated = StateStore::with_storage(Arc::clone(&storage));
    println!();
    println!("rehydrated tree:");
    println!("{}", serde_json::to_string_pretty(rehydrated.tree())?);
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
