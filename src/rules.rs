//! Correction rules applied when merging an upstream export into an existing locale.
//!
//! The upstream export is known to drop some keys, collapse plural forms and
//! explode default arrays into indexed entries. [`MergeRules::merge`] undoes
//! those defects in a fixed order:
//!
//! 1. restore known-missing keys from the existing file
//! 2. keep existing values whose plural forms only exist in the reference language
//! 3. keep existing scalars where the reference language uses a list (table entries only)
//! 4. drop every value that is identical to the reference language

use serde::{
    Deserialize,
    Serialize,
};

use crate::types::{
    FlatMap,
    KEY_SEPARATOR,
};

/// Keys the upstream export drops. Most of them carry URLs.
const DEFAULT_RESTORE_KEYS: &[&str] = &[
    "layouts.help_url",
    "layouts.wiki_url",
    "layouts.shop_url",
    "layouts.community_url",
    "site.edit.anon_edits_link",
    "site.index.license.license_url",
    "site.index.license.project_url",
    "site.sidebar.search_results_url",
    "license_page.legal_babble.contributors_url",
    "license_page.legal_babble.infringement_url",
    "user.terms.legale_url",
];

const DEFAULT_PLURAL_SUFFIXES: &[&str] = &["zero", "one", "many", "few", "other", "two"];

const DEFAULT_TABLE_ENTRY_PREFIX: &str = "site.key.table.entry";

/// Hand-curated data driving the merge rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeRules {
    /// Keys restored from the existing file when the export lacks them.
    pub restore_keys: Vec<String>,
    /// Plural sub-form names appended to a key (e.g. `items.one`).
    pub plural_suffixes: Vec<String>,
    /// Namespace in which a scalar translation may replace a reference list.
    pub table_entry_prefix: String,
}

impl Default for MergeRules {
    fn default() -> Self {
        Self {
            restore_keys: DEFAULT_RESTORE_KEYS.iter().map(ToString::to_string).collect(),
            plural_suffixes: DEFAULT_PLURAL_SUFFIXES.iter().map(ToString::to_string).collect(),
            table_entry_prefix: DEFAULT_TABLE_ENTRY_PREFIX.to_string(),
        }
    }
}

impl MergeRules {
    /// Merges an upstream export with the existing local translation.
    ///
    /// `upstream` seeds the result; `existing` and `reference` are only read.
    #[must_use]
    pub fn merge(&self, upstream: &FlatMap, existing: &FlatMap, reference: &FlatMap) -> FlatMap {
        let mut merged = upstream.clone();

        let restored = self.restore_missing_keys(&mut merged, existing, reference);
        let plurals = self.preserve_plural_forms(&mut merged, upstream, existing, reference);
        let scalars = self.preserve_table_scalars(&mut merged, existing, reference);
        let purged = purge_reference_duplicates(&mut merged, reference);

        tracing::debug!(restored, plurals, scalars, purged, kept = merged.len(), "Merge finished");
        merged
    }

    fn restore_missing_keys(
        &self,
        merged: &mut FlatMap,
        existing: &FlatMap,
        reference: &FlatMap,
    ) -> usize {
        let mut count = 0;
        for key in &self.restore_keys {
            if merged.contains_key(key) {
                continue;
            }
            let Some(value) = existing.get(key) else {
                continue;
            };
            if reference.get(key) == Some(value) {
                continue;
            }
            merged.insert(key.clone(), value.clone());
            count += 1;
        }
        count
    }

    fn preserve_plural_forms(
        &self,
        merged: &mut FlatMap,
        upstream: &FlatMap,
        existing: &FlatMap,
        reference: &FlatMap,
    ) -> usize {
        let mut count = 0;
        for (key, value) in existing {
            if upstream.contains_key(key) || reference.contains_key(key) {
                continue;
            }
            if self.has_plural_variants(key, reference) {
                merged.insert(key.clone(), value.clone());
                count += 1;
            }
        }
        count
    }

    /// Returns true if any plural sub-form of `base_key` exists in `keys`.
    #[must_use]
    pub fn has_plural_variants(&self, base_key: &str, keys: &FlatMap) -> bool {
        self.plural_suffixes.iter().any(|suffix| {
            let variant_key = format!("{base_key}{KEY_SEPARATOR}{suffix}");
            keys.contains_key(&variant_key)
        })
    }

    /// Keeps scalar table entries the reference language stores as lists.
    ///
    /// Index-exploded siblings (`key.0`, `key.1`, ...) are dropped with it,
    /// otherwise expanding the result would turn the scalar back into a mapping.
    fn preserve_table_scalars(
        &self,
        merged: &mut FlatMap,
        existing: &FlatMap,
        reference: &FlatMap,
    ) -> usize {
        let mut count = 0;
        for (key, value) in existing {
            if !key.starts_with(&self.table_entry_prefix) || is_index_key(key) {
                continue;
            }
            let reference_is_list = reference.get(key).is_some_and(|v| v.is_list());
            if !reference_is_list || value.is_list() {
                continue;
            }

            merged.retain(|k, _| !is_index_of(k, key));
            merged.insert(key.clone(), value.clone());
            count += 1;
        }
        count
    }
}

/// Drops every merged value identical to the reference language.
fn purge_reference_duplicates(merged: &mut FlatMap, reference: &FlatMap) -> usize {
    let before = merged.len();
    merged.retain(|key, value| reference.get(key) != Some(value));
    before - merged.len()
}

/// Whether the last segment of `key` is a numeric list index.
fn is_index_key(key: &str) -> bool {
    key.rsplit(KEY_SEPARATOR)
        .next()
        .is_some_and(|last| !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()))
}

/// Whether `key` is `parent.<digits>`.
fn is_index_of(key: &str, parent: &str) -> bool {
    key.strip_prefix(parent)
        .and_then(|rest| rest.strip_prefix(KEY_SEPARATOR))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}
