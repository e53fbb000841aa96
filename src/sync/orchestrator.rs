//! Drives fetching, merging and writing for every upstream language.

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use super::SyncError;
use crate::codec::{
    expand,
    flatten,
    split_root,
    wrap_root,
};
use crate::config::SyncSettings;
use crate::input::cache::{
    self,
    UpstreamSnapshot,
};
use crate::input::provider::SourceProvider;
use crate::input::store::{
    LocaleStore,
    StoreError,
};
use crate::rules::MergeRules;
use crate::types::{
    FlatMap,
    LanguageRecord,
    destination_code,
};

/// How languages that already have a locale file are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Merge upstream data into existing files.
    #[default]
    Full,
    /// Only import languages without a locale file.
    OnlyNew,
}

/// What happens to a single language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguagePlan {
    /// No local file yet: write the upstream data as is.
    Import,
    /// Merge with the existing file at the given path.
    Merge(PathBuf),
    /// Leave the existing file untouched.
    Skip(PathBuf),
}

impl LanguagePlan {
    #[must_use]
    pub fn decide(existing: Option<&Path>, mode: SyncMode) -> Self {
        match (existing, mode) {
            (None, _) => Self::Import,
            (Some(path), SyncMode::Full) => Self::Merge(path.to_path_buf()),
            (Some(path), SyncMode::OnlyNew) => Self::Skip(path.to_path_buf()),
        }
    }
}

/// Outcome of a run. Language lists hold destination codes in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub imported: Vec<String>,
    pub merged: Vec<String>,
    pub skipped: Vec<String>,
    pub written: Vec<PathBuf>,
}

/// Synchronizes upstream translations into a locale store.
///
/// Languages are processed one at a time in code order; the first failure
/// aborts the run. Files written before the failure are kept.
#[derive(Debug)]
pub struct Synchronizer<P, S> {
    provider: P,
    store: S,
    rules: MergeRules,
    reference_language: String,
    mode: SyncMode,
    cache_path: Option<PathBuf>,
}

impl<P: SourceProvider, S: LocaleStore> Synchronizer<P, S> {
    #[must_use]
    pub fn new(provider: P, store: S, settings: &SyncSettings) -> Self {
        Self {
            provider,
            store,
            rules: settings.rules.clone(),
            reference_language: settings.reference_language.to_lowercase(),
            mode: SyncMode::default(),
            cache_path: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reuses (or creates) an upstream snapshot at `path`.
    #[must_use]
    pub fn with_cache(mut self, path: Option<PathBuf>) -> Self {
        self.cache_path = path;
        self
    }

    /// # Errors
    /// Any fetch, parse or write failure aborts the run.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let files = self.store.existing_files()?;
        let reference = match self.mode {
            SyncMode::Full => Some(self.load_reference(&files)?),
            SyncMode::OnlyNew => None,
        };

        let upstream = self.upstream().await?;

        let mut report = SyncReport::default();
        for (record, keys) in &upstream {
            self.sync_language(record, keys, &files, reference.as_ref(), &mut report)?;
        }

        tracing::info!(
            imported = report.imported.len(),
            merged = report.merged.len(),
            skipped = report.skipped.len(),
            "Synchronization finished"
        );
        Ok(report)
    }

    fn load_reference(&self, files: &HashMap<String, PathBuf>) -> Result<FlatMap, SyncError> {
        let Some(path) = files.get(&self.reference_language) else {
            return Err(SyncError::MissingReference(self.reference_language.clone()));
        };

        let tree = self.store.load(path).map_err(SyncError::Reference)?;
        let (_, body) = split_root(tree).map_err(|source| {
            SyncError::Reference(StoreError::Tree { path: path.clone(), source })
        })?;
        Ok(flatten(&body))
    }

    /// Upstream data of every language except the reference, sorted by code.
    async fn upstream(&self) -> Result<Vec<(LanguageRecord, FlatMap)>, SyncError> {
        if let Some(path) = &self.cache_path
            && let Some(snapshot) = cache::load(path)?
        {
            return Ok(snapshot
                .into_entries()
                .filter(|(record, _)| record.code != self.reference_language)
                .collect());
        }

        let mut records = self.provider.languages().await?;
        records.retain(|record| record.code != self.reference_language);
        records.sort_by(|a, b| a.code.cmp(&b.code));
        records.dedup_by(|a, b| a.code == b.code);

        let mut upstream = Vec::with_capacity(records.len());
        for record in records {
            tracing::info!("Fetching {record}");
            let raw = self.provider.fetch(&record.code).await?;
            let (_, body) = split_root(raw).map_err(|source| SyncError::MalformedUpstream {
                language: record.code.clone(),
                source,
            })?;
            let keys = flatten(&body);
            upstream.push((record, keys));
        }

        if let Some(path) = &self.cache_path {
            let mut snapshot = UpstreamSnapshot::default();
            for (record, keys) in &upstream {
                snapshot.insert(record, keys.clone());
            }
            cache::save(path, &snapshot)?;
        }

        Ok(upstream)
    }

    fn sync_language(
        &self,
        record: &LanguageRecord,
        upstream: &FlatMap,
        files: &HashMap<String, PathBuf>,
        reference: Option<&FlatMap>,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let destination = destination_code(&record.code);
        let existing = files.get(&destination.to_lowercase()).map(PathBuf::as_path);

        let (path, tree) = match LanguagePlan::decide(existing, self.mode) {
            LanguagePlan::Import => {
                tracing::info!(language = %destination, "Importing new language");
                report.imported.push(destination.clone());
                (self.store.path_for(&destination), expand(upstream))
            }
            LanguagePlan::Skip(path) => {
                tracing::debug!(language = %destination, "Skipping existing {:?}", path);
                report.skipped.push(destination);
                return Ok(());
            }
            LanguagePlan::Merge(path) => {
                let Some(reference) = reference else {
                    return Err(SyncError::MissingReference(self.reference_language.clone()));
                };
                let existing = self.load_existing(&destination, &path)?;
                tracing::info!(language = %destination, "Merging into {:?}", path);
                let merged = self.rules.merge(upstream, &existing, reference);
                report.merged.push(destination.clone());
                // 既存ファイルを上書きする (大文字小文字の違う重複ファイルを作らない)
                (path, expand(&merged))
            }
        };

        self.store.write(&path, &wrap_root(&destination, tree))?;
        report.written.push(path);
        Ok(())
    }

    fn load_existing(&self, language: &str, path: &Path) -> Result<FlatMap, SyncError> {
        let ambiguous = |reason: String| SyncError::AmbiguousLocalState {
            language: language.to_string(),
            path: path.to_path_buf(),
            reason,
        };

        let tree = self.store.load(path).map_err(|e| ambiguous(e.to_string()))?;
        let (root, body) = split_root(tree).map_err(|e| ambiguous(e.to_string()))?;
        if !root.eq_ignore_ascii_case(language) {
            tracing::warn!(language, root = %root, "Locale file root does not match its file name");
        }
        Ok(flatten(&body))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, SyncMode::Full, LanguagePlan::Import)]
    #[case(None, SyncMode::OnlyNew, LanguagePlan::Import)]
    #[case(Some("de.yml"), SyncMode::Full, LanguagePlan::Merge(PathBuf::from("de.yml")))]
    #[case(Some("de.yml"), SyncMode::OnlyNew, LanguagePlan::Skip(PathBuf::from("de.yml")))]
    fn test_language_plan(
        #[case] existing: Option<&str>,
        #[case] mode: SyncMode,
        #[case] expected: LanguagePlan,
    ) {
        assert_eq!(LanguagePlan::decide(existing.map(Path::new), mode), expected);
    }
}
