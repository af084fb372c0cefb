//! Cross-instance key equivalence.
//!
//! `parent_linking` and `exact_key` compare literal keys across trackers that do
//! not share a key space. Whether `DLREQ-1447` on one instance names the same
//! initiative as `DLREQ-1447` (or `SYS-12`) on another is a business decision, so
//! the engine asks a [`KeyTranslator`] instead of assuming literal equality.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::ReconError;
use crate::model::KeyTranslation;

pub trait KeyTranslator: Send + Sync {
    /// Canonical initiative key for `key` as seen on `instance_id`.
    fn translate<'k>(&self, instance_id: &str, key: &'k str) -> Cow<'k, str>;
}

/// Literal equality: a key means the same thing on every instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralKeys;

impl KeyTranslator for LiteralKeys {
    fn translate<'k>(&self, _instance_id: &str, key: &'k str) -> Cow<'k, str> {
        Cow::Borrowed(key)
    }
}

/// Explicit `(instance, key) -> canonical key` table. Keys without an entry
/// pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    map: HashMap<(String, String), String>,
}

impl TranslationTable {
    pub fn new(entries: &[KeyTranslation]) -> Result<Self, ReconError> {
        let mut map: HashMap<(String, String), String> = HashMap::new();
        for e in entries {
            if e.instance_id.trim().is_empty() || e.from.trim().is_empty() || e.to.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "key translation needs non-empty instance, from and to".into(),
                ));
            }
            let slot = (e.instance_id.clone(), e.from.trim().to_string());
            if let Some(existing) = map.get(&slot) {
                if existing != e.to.trim() {
                    return Err(ReconError::ConfigValidation(format!(
                        "key translation for '{}' on instance '{}' maps to both '{existing}' and '{}'",
                        e.from, e.instance_id, e.to
                    )));
                }
            }
            map.insert(slot, e.to.trim().to_string());
        }
        Ok(Self { map })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl KeyTranslator for TranslationTable {
    fn translate<'k>(&self, instance_id: &str, key: &'k str) -> Cow<'k, str> {
        match self.map.get(&(instance_id.to_string(), key.to_string())) {
            Some(canonical) => Cow::Owned(canonical.clone()),
            None => Cow::Borrowed(key),
        }
    }
}
