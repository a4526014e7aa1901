//! Hierarchical session state with dot-path access, change listeners,
//! and selective durable mirroring.
//!
//! The store is a single JSON object tree. Writes address leaves by
//! dot-separated path, creating intermediate objects on demand. A small
//! set of routed prefixes is mirrored to named storage buckets on every
//! write under them; each mirror is a read-modify-write of the bucket so
//! concurrent owners of sibling keys are preserved. Persistence problems
//! never surface to the writer: they are logged and the in-memory write
//! stands.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::StoreConfig;
use crate::constants::store::{
    ALL_PATHS_WILDCARD, CONTROL_PANELS_PREFIX, CONTROL_PANELS_SUBKEY,
    QUESTION_WORD_VISIBILITY_BUCKET, QUESTION_WORD_VISIBILITY_PREFIX, SLOT_VISIBILITY_BUCKET,
    SLOT_VISIBILITY_PREFIX, SUBSLOT_VISIBILITY_BUCKET, SUBSLOT_VISIBILITY_PREFIX,
};
use crate::errors::RephraseError;
use crate::storage::StorageBackend;
use crate::types::ListenerId;

/// Change callback: `(new_value, old_value, path)`.
///
/// A returned `Err` is logged against the listener's id and never stops
/// delivery to the remaining listeners.
pub type ListenerFn = Box<dyn FnMut(&Value, Option<&Value>, &str) -> Result<(), String>>;

struct ListenerEntry {
    id: ListenerId,
    callback: ListenerFn,
}

/// Mapping from a state-path prefix to its durable bucket.
///
/// `sub_key` places the prefix's subtree under a named key inside the
/// bucket instead of at the bucket root, so several prefixes can share
/// one bucket.
#[derive(Clone, Debug)]
struct DurableRoute {
    prefix: String,
    bucket: String,
    sub_key: Option<String>,
}

fn route_for(prefix: &str) -> DurableRoute {
    let (bucket, sub_key) = match prefix {
        SLOT_VISIBILITY_PREFIX => (SLOT_VISIBILITY_BUCKET.to_string(), None),
        SUBSLOT_VISIBILITY_PREFIX => (SUBSLOT_VISIBILITY_BUCKET.to_string(), None),
        QUESTION_WORD_VISIBILITY_PREFIX => (QUESTION_WORD_VISIBILITY_BUCKET.to_string(), None),
        CONTROL_PANELS_PREFIX => (
            SUBSLOT_VISIBILITY_BUCKET.to_string(),
            Some(CONTROL_PANELS_SUBKEY.to_string()),
        ),
        other => (other.replace('.', "_"), None),
    };
    DurableRoute {
        prefix: prefix.to_string(),
        bucket,
        sub_key,
    }
}

/// Dot-path keyed state tree with listeners and durable mirroring.
pub struct StateStore {
    tree: Value,
    listeners: HashMap<String, Vec<ListenerEntry>>,
    next_listener_id: ListenerId,
    routes: Vec<DurableRoute>,
    storage: Option<Arc<dyn StorageBackend>>,
}

impl StateStore {
    /// Purely in-memory store with the default durable routes inert.
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default(), None)
    }

    /// Store backed by `storage`, hydrated from any existing buckets.
    pub fn with_storage(storage: Arc<dyn StorageBackend>) -> Self {
        Self::with_config(&StoreConfig::default(), Some(storage))
    }

    /// Store with explicit route configuration.
    pub fn with_config(config: &StoreConfig, storage: Option<Arc<dyn StorageBackend>>) -> Self {
        let mut store = Self {
            tree: Value::Object(Map::new()),
            listeners: HashMap::new(),
            next_listener_id: 1,
            routes: config.durable_routes.iter().map(|p| route_for(p)).collect(),
            storage,
        };
        if store.storage.is_some() {
            store.hydrate();
        }
        store
    }

    /// Value at `path`, `None` when any segment is missing or a
    /// non-object intervenes.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut node = &self.tree;
        for segment in path.split('.') {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    /// Write `value` at `path`, mirror routed prefixes, notify listeners.
    pub fn set(&mut self, path: &str, value: Value) {
        self.set_with_notify(path, value, true);
    }

    /// [`set`](Self::set) with listener notification optionally skipped.
    /// Durable mirroring always runs.
    pub fn set_with_notify(&mut self, path: &str, value: Value, notify: bool) {
        let old = self.get(path).cloned();
        write_into(&mut self.tree, path, value.clone());
        self.mirror(path);
        if notify {
            self.notify(path, &value, old.as_ref());
        }
    }

    /// Subscribe to writes at exactly `path`, or every write via the
    /// `"*"` key. Returns a handle for [`remove_listener`](Self::remove_listener).
    pub fn add_listener(&mut self, path: &str, callback: ListenerFn) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners
            .entry(path.to_string())
            .or_default()
            .push(ListenerEntry { id, callback });
        id
    }

    /// Drop one subscription; unknown handles are ignored.
    pub fn remove_listener(&mut self, path: &str, id: ListenerId) {
        if let Some(entries) = self.listeners.get_mut(path) {
            entries.retain(|entry| entry.id != id);
        }
    }

    /// Push every routed subtree present in memory out to its bucket.
    pub fn sync(&self) {
        let Some(storage) = &self.storage else { return };
        for route in &self.routes {
            let Some(value) = self.get(&route.prefix) else {
                continue;
            };
            if let Err(err) = mirror_route(storage.as_ref(), route, "", value.clone()) {
                warn!(
                    prefix = %route.prefix,
                    bucket = %route.bucket,
                    error = %err,
                    "durable sync failed"
                );
            }
        }
    }

    /// Whole in-memory tree, for display and diagnostics.
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    fn mirror(&self, path: &str) {
        let Some(storage) = &self.storage else { return };
        for route in &self.routes {
            if !route_matches(&route.prefix, path) {
                continue;
            }
            let Some(value) = self.get(path) else {
                continue;
            };
            let sub_path = remainder_of(&route.prefix, path);
            if let Err(err) = mirror_route(storage.as_ref(), route, sub_path, value.clone()) {
                warn!(path, bucket = %route.bucket, error = %err, "durable mirror failed");
            }
        }
    }

    /// Pull routed subtrees back out of their buckets into memory.
    /// Missing or corrupt buckets simply leave the tree untouched.
    fn hydrate(&mut self) {
        let Some(storage) = self.storage.clone() else {
            return;
        };
        let routes = self.routes.clone();
        for route in &routes {
            let Some(mut value) = load_bucket_value(storage.as_ref(), &route.bucket) else {
                continue;
            };
            match &route.sub_key {
                Some(key) => {
                    let Value::Object(mut map) = value else { continue };
                    let Some(inner) = map.remove(key) else { continue };
                    value = inner;
                }
                None => {
                    // Shared buckets carry piggybacked keys owned by
                    // other routes; those must not leak into this prefix.
                    if let Value::Object(map) = &mut value {
                        for other in &routes {
                            if other.bucket == route.bucket
                                && let Some(key) = &other.sub_key
                            {
                                map.remove(key);
                            }
                        }
                    }
                }
            }
            write_into(&mut self.tree, &route.prefix, value);
        }
    }

    fn notify(&mut self, path: &str, new_value: &Value, old_value: Option<&Value>) {
        self.dispatch(path, path, new_value, old_value);
        if path != ALL_PATHS_WILDCARD {
            self.dispatch(ALL_PATHS_WILDCARD, path, new_value, old_value);
        }
    }

    fn dispatch(&mut self, key: &str, path: &str, new_value: &Value, old_value: Option<&Value>) {
        let Some(entries) = self.listeners.get_mut(key) else {
            return;
        };
        for entry in entries.iter_mut() {
            if let Err(reason) = (entry.callback)(new_value, old_value, path) {
                warn!(path, listener = entry.id, reason = %reason, "state listener failed");
            }
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `path` equals `prefix` or sits strictly under it.
fn route_matches(prefix: &str, path: &str) -> bool {
    if path == prefix {
        return true;
    }
    path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'.')
}

fn remainder_of<'a>(prefix: &str, path: &'a str) -> &'a str {
    path.strip_prefix(prefix)
        .unwrap_or("")
        .trim_start_matches('.')
}

/// Write `value` at `path` below `node`, materializing intermediate
/// objects and replacing any non-object in the way.
fn write_into(node: &mut Value, path: &str, value: Value) {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        match path.split_once('.') {
            None => {
                map.insert(path.to_string(), value);
            }
            Some((head, rest)) => {
                let child = map
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                write_into(child, rest, value);
            }
        }
    }
}

fn mirror_route(
    storage: &dyn StorageBackend,
    route: &DurableRoute,
    sub_path: &str,
    value: Value,
) -> Result<(), RephraseError> {
    let mut bucket_value =
        load_bucket_value(storage, &route.bucket).unwrap_or_else(|| Value::Object(Map::new()));
    match join_paths(route.sub_key.as_deref(), sub_path) {
        Some(path) => write_into(&mut bucket_value, &path, value),
        None => merge_at_root(&mut bucket_value, value),
    }
    let payload = serde_json::to_string(&bucket_value)
        .map_err(|err| RephraseError::Storage(err.to_string()))?;
    storage.save_bucket(&route.bucket, &payload)
}

/// Folds an at-prefix write into the bucket root. Object payloads merge key
/// by key, so sub-keys owned by other routes sharing the bucket survive;
/// anything else replaces the bucket wholesale.
fn merge_at_root(bucket_value: &mut Value, value: Value) {
    match value {
        Value::Object(incoming) => {
            if !bucket_value.is_object() {
                *bucket_value = Value::Object(Map::new());
            }
            if let Value::Object(existing) = bucket_value {
                existing.extend(incoming);
            }
        }
        other => *bucket_value = other,
    }
}

fn join_paths(base: Option<&str>, rest: &str) -> Option<String> {
    match (base, rest) {
        (None, "") => None,
        (None, rest) => Some(rest.to_string()),
        (Some(base), "") => Some(base.to_string()),
        (Some(base), rest) => Some(format!("{base}.{rest}")),
    }
}

fn load_bucket_value(storage: &dyn StorageBackend, bucket: &str) -> Option<Value> {
    let payload = match storage.load_bucket(bucket) {
        Ok(Some(payload)) => payload,
        Ok(None) => return None,
        Err(err) => {
            warn!(bucket, error = %err, "bucket read failed; treating as empty");
            return None;
        }
    };
    match serde_json::from_str(&payload) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(bucket, error = %err, "bucket payload corrupt; ignoring");
            None
        }
    }
}
