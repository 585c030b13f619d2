//! pull::options
//!
//! Pull options and their serialized request form.
//!
//! # Design
//!
//! [`PullOptions`] is the caller-facing value object: which refs to
//! fetch and whether to record them under a different remote name. At
//! session start it is serialized into an [`OptionsBag`], an open
//! string-to-variant map matching the engine's request structure. The
//! bag deliberately has no fixed schema: engines may grow new keys
//! without this crate changing shape, while the two keys this crate
//! populates stay type-checked at the construction site.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Options for a pull operation.
///
/// Immutable once handed to a [`crate::pull::PullSession`]. The default
/// value requests the remote's full configured ref set under its own
/// name.
///
/// # Example
///
/// ```
/// use cairn::pull::PullOptions;
///
/// let options = PullOptions {
///     refs: vec!["main".into(), "release".into()],
///     ..PullOptions::default()
/// };
/// let bag = options.to_bag();
/// assert!(bag.get(PullOptions::KEY_REFS).is_some());
/// assert!(bag.get(PullOptions::KEY_OVERRIDE_REMOTE_NAME).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullOptions {
    /// Record fetched refs under this remote name instead of the one
    /// the transfer targets. `None` (or an empty string) means no
    /// override.
    pub override_remote_name: Option<String>,

    /// Fetch exactly these refs. Empty means the remote's default set,
    /// every ref the remote is configured to carry.
    pub refs: Vec<String>,
}

impl PullOptions {
    /// Bag key for the remote-name override entry.
    pub const KEY_OVERRIDE_REMOTE_NAME: &'static str = "override-remote-name";

    /// Bag key for the explicit ref-list entry.
    pub const KEY_REFS: &'static str = "refs";

    /// Serialize into the engine's request structure.
    ///
    /// At most two entries are emitted, each independently optional:
    /// the override entry only when the override is non-empty, and the
    /// refs entry only when the list is non-empty.
    pub fn to_bag(&self) -> OptionsBag {
        let mut bag = OptionsBag::new();

        if let Some(name) = &self.override_remote_name {
            if !name.is_empty() {
                bag.insert(
                    Self::KEY_OVERRIDE_REMOTE_NAME,
                    OptionValue::Str(name.clone()),
                );
            }
        }

        if !self.refs.is_empty() {
            bag.insert(Self::KEY_REFS, OptionValue::StrList(self.refs.clone()));
        }

        bag
    }
}

/// A value in an [`OptionsBag`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Text value.
    Str(String),
    /// Ordered list of strings.
    StrList(Vec<String>),
}

impl OptionValue {
    /// Interpret the value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Interpret the value as a string list, if it is one.
    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::StrList(list) => Some(list.as_slice()),
            _ => None,
        }
    }
}

/// Open key-value request map handed to the engine.
///
/// Keys are free-form strings; values are [`OptionValue`] variants.
/// Engines ignore keys they do not understand, and new keys require no
/// change to this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionsBag(BTreeMap<String, OptionValue>);

impl OptionsBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any existing value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        self.0.insert(key.into(), value);
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// Whether the bag has an entry for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
