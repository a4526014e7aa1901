use crate::constants::history::DEFAULT_RECENT_LIMIT;
use crate::constants::store::DEFAULT_DURABLE_ROUTES;

/// Controls seeding and duplicate avoidance for the randomizer.
#[derive(Clone, Debug)]
pub struct RandomizerConfig {
    /// RNG seed; `None` seeds from OS entropy, `Some` makes selection
    /// reproducible.
    pub seed: Option<u64>,
    /// Number of recent selections remembered per history kind.
    pub history_limit: usize,
}

impl Default for RandomizerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            history_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

/// Controls which state paths are mirrored to durable storage.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Path prefixes mirrored to durable buckets on every write under them.
    pub durable_routes: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            durable_routes: DEFAULT_DURABLE_ROUTES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        }
    }
}
