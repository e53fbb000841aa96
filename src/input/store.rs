//! ローカルのロケールファイルの読み書き

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use globset::{
    GlobBuilder,
    GlobMatcher,
};
use ignore::WalkBuilder;
use thiserror::Error;

use crate::codec::{
    TreeError,
    tree_from_yaml,
};
use crate::types::Tree;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_norway::Error,
    },

    #[error("Unexpected structure in {}: {source}", path.display())]
    Tree {
        path: PathBuf,
        #[source]
        source: TreeError,
    },

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Failed to list {}: {source}", dir.display())]
    Walk {
        dir: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// Persistence of per-language locale files.
pub trait LocaleStore {
    /// Existing locale files keyed by lowercased language code.
    fn existing_files(&self) -> Result<HashMap<String, PathBuf>, StoreError>;

    /// Loads a locale file, root key included.
    fn load(&self, path: &Path) -> Result<Tree, StoreError>;

    /// Path of a new locale file for `language`.
    fn path_for(&self, language: &str) -> PathBuf;

    /// Writes `tree` to `path`, replacing any previous content.
    fn write(&self, path: &Path, tree: &Tree) -> Result<(), StoreError>;
}

/// Locale files stored as `<dir>/<language>.<ext>`.
#[derive(Debug, Clone)]
pub struct FsLocaleStore {
    dir: PathBuf,
    extension: String,
    matcher: GlobMatcher,
}

impl FsLocaleStore {
    /// # Errors
    /// Returns error if the extension cannot form a valid file pattern.
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Result<Self, StoreError> {
        let matcher = GlobBuilder::new(&format!("*.{extension}"))
            .case_insensitive(true)
            .literal_separator(true)
            .build()?
            .compile_matcher();

        Ok(Self { dir: dir.into(), extension: extension.to_string(), matcher })
    }
}

impl LocaleStore for FsLocaleStore {
    fn existing_files(&self) -> Result<HashMap<String, PathBuf>, StoreError> {
        let mut files = HashMap::new();

        // ロケールディレクトリ直下のみを走査
        for result in WalkBuilder::new(&self.dir)
            .max_depth(Some(1))
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .follow_links(false)
            .build()
        {
            let entry =
                result.map_err(|source| StoreError::Walk { dir: self.dir.clone(), source })?;

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(file_name) = path.file_name() else {
                continue;
            };
            if !self.matcher.is_match(file_name) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!("Skipping file with non UTF-8 name: {:?}", path);
                continue;
            };

            files.insert(stem.to_lowercase(), path.to_path_buf());
        }

        tracing::debug!(count = files.len(), dir = %self.dir.display(), "Found locale files");
        Ok(files)
    }

    fn load(&self, path: &Path) -> Result<Tree, StoreError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        let value: serde_norway::Value = serde_norway::from_str(&content)
            .map_err(|source| StoreError::Yaml { path: path.to_path_buf(), source })?;

        tree_from_yaml(&value).map_err(|source| StoreError::Tree { path: path.to_path_buf(), source })
    }

    /// 言語コードに対応するファイルパス
    fn path_for(&self, language: &str) -> PathBuf {
        self.dir.join(format!("{language}.{}", self.extension))
    }

    fn write(&self, path: &Path, tree: &Tree) -> Result<(), StoreError> {
        let content = serde_norway::to_string(tree)
            .map_err(|source| StoreError::Yaml { path: path.to_path_buf(), source })?;

        std::fs::write(path, content)
            .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;
    use crate::codec::wrap_root;
    use crate::types::{
        Leaf,
        Node,
    };

    fn store(temp_dir: &TempDir) -> FsLocaleStore {
        FsLocaleStore::new(temp_dir.path(), "yml").unwrap()
    }

    /// `existing_files`: 言語コードは小文字で索引される
    #[googletest::test]
    fn test_existing_files_indexed_by_lowercase_code() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("en.yml"), "en: {}\n").unwrap();
        fs::write(temp_dir.path().join("pt-BR.yml"), "pt-BR: {}\n").unwrap();
        fs::write(temp_dir.path().join("README.md"), "docs").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested/fr.yml"), "fr: {}\n").unwrap();

        let files = store(&temp_dir).existing_files().unwrap();

        expect_that!(files.len(), eq(2));
        expect_that!(files.get("pt-br"), some(eq(&temp_dir.path().join("pt-BR.yml"))));
        expect_that!(files.contains_key("en"), eq(true));
        expect_that!(files.contains_key("fr"), eq(false));
    }

    /// `write`: キーがソートされた YAML として書き出される
    #[googletest::test]
    fn test_write_sorted_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let body = Tree::from([
            ("zebra".to_string(), Node::Leaf(Leaf::from("Zebra"))),
            ("apple".to_string(), Node::Leaf(Leaf::from("Apfel"))),
        ]);

        let store = store(&temp_dir);
        let path = store.path_for("de");
        store.write(&path, &wrap_root("de", body)).unwrap();

        expect_that!(path, eq(&temp_dir.path().join("de.yml")));
        expect_that!(fs::read_to_string(&path).unwrap(), eq("de:\n  apple: Apfel\n  zebra: Zebra\n"));
    }

    /// `load`: 書き出したファイルを読み戻せる
    #[googletest::test]
    fn test_write_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let tree = wrap_root(
            "zh-TW",
            Tree::from([(
                "days".to_string(),
                Node::Leaf(Leaf::List(vec!["星期日".to_string(), "星期一".to_string()])),
            )]),
        );

        let path = store.path_for("zh-TW");
        store.write(&path, &tree).unwrap();

        expect_that!(store.load(&path).unwrap(), eq(&tree));
    }

    /// `existing_files`: 存在しないディレクトリは走査エラー
    #[googletest::test]
    fn test_existing_files_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let missing = FsLocaleStore::new(temp_dir.path().join("missing"), "yml").unwrap();

        let result = missing.existing_files();

        expect_that!(matches!(result, Err(StoreError::Walk { .. })), eq(true));
        expect_that!(
            result.map(|files| files.len()),
            err(displays_as(contains_substring("Failed to list")))
        );
    }

    /// `load`: YAML パースエラー
    #[googletest::test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("de.yml");
        fs::write(&path, "de: [unclosed").unwrap();

        let result = store(&temp_dir).load(&path);

        expect_that!(matches!(result, Err(StoreError::Yaml { .. })), eq(true));
    }
}
