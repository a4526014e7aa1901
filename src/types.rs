/// Grammar-group key; rows sharing it form one sentence family.
/// Examples: `buy-wh-question`, `present-simple-01`
pub type GroupKey = String;
/// Identifier for one concrete example sentence within a grammar group.
/// Examples: `ex001`, `buy-01-2`
pub type ExampleId = String;
/// Dot-separated state path.
/// Examples: `visibility.slots.s.text`, `randomizer.sentencePositionInfo`
pub type StatePath = String;
/// Name of a durable storage bucket.
/// Examples: `rephrase_slot_visibility`, `ui_zoom`
pub type BucketName = String;
/// Synthetic traceability tag attached to selected rows (`"{slot}-{set}"`).
/// Examples: `S-1`, `O1-3`
pub type SetTag = String;
/// Handle returned by listener registration, used for removal.
pub type ListenerId = u64;
