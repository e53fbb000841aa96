//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    ConfigError,
    SyncSettings,
};

/// 作業ディレクトリで探す設定ファイル名
pub const CONFIG_FILE_NAME: &str = ".locale-sync.json";

/// 設定を読み込んでバリデーションする
///
/// `explicit_path` が指定された場合はそのファイルを必ず読み込む。
/// 指定がない場合は `workspace_root` の `.locale-sync.json` を探し、
/// 見つからなければデフォルト設定を使う。
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
/// - バリデーションエラー
pub fn load_settings(
    explicit_path: Option<&Path>,
    workspace_root: &Path,
) -> Result<SyncSettings, ConfigError> {
    let settings = match explicit_path {
        Some(path) => load_from_file(path)?,
        None => load_from_workspace(workspace_root)?.unwrap_or_default(),
    };

    settings.validate().map_err(ConfigError::ValidationErrors)?;
    tracing::debug!("Settings loaded successfully: {:?}", settings);

    Ok(settings)
}

/// ワークスペースから設定を読み込む
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
/// - `Err(ConfigError)`: ファイル読み込みまたはパースエラー
fn load_from_workspace(workspace_root: &Path) -> Result<Option<SyncSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    load_from_file(&config_path).map(Some)
}

fn load_from_file(config_path: &Path) -> Result<SyncSettings, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)?;
    let settings: SyncSettings = serde_json::from_str(&content)?;

    Ok(settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    /// `load_settings`: 設定ファイルが存在する場合
    #[rstest]
    fn test_load_settings_with_workspace_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"referenceLanguage": "de"}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let settings = load_settings(None, temp_dir.path()).unwrap();

        assert_eq!(settings.reference_language, "de");
    }

    /// `load_settings`: 設定ファイルが存在しない場合はデフォルト値
    #[rstest]
    fn test_load_settings_without_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let settings = load_settings(None, temp_dir.path()).unwrap();

        assert_eq!(settings.reference_language, "en");
    }

    /// `load_settings`: 明示的なパスが優先される
    #[rstest]
    fn test_load_settings_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), r#"{"referenceLanguage": "de"}"#)
            .unwrap();
        let explicit = temp_dir.path().join("custom.json");
        fs::write(&explicit, r#"{"referenceLanguage": "fr"}"#).unwrap();

        let settings = load_settings(Some(&explicit), temp_dir.path()).unwrap();

        assert_eq!(settings.reference_language, "fr");
    }

    /// `load_settings`: 明示的なパスが存在しない場合はエラー
    #[rstest]
    fn test_load_settings_explicit_path_missing() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_settings(Some(&temp_dir.path().join("missing.json")), temp_dir.path());

        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    /// `load_settings`: JSON パースエラー
    #[rstest]
    fn test_load_settings_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "invalid json").unwrap();

        let result = load_settings(None, temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    /// `load_settings`: エクスポート URL のテンプレートに言語コードが埋め込まれる
    #[rstest]
    fn test_load_settings_export_url_template() {
        let temp_dir = TempDir::new().unwrap();
        let template = format!("https://example.org/export/{}.yml", crate::config::CODE_PLACEHOLDER);
        let config_content = serde_json::json!({ "exportUrlTemplate": template }).to_string();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let settings = load_settings(None, temp_dir.path()).unwrap();

        assert_eq!(settings.export_url("pt-br"), "https://example.org/export/pt-br.yml");
    }

    /// `load_settings`: バリデーションエラー
    #[rstest]
    fn test_load_settings_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), r#"{"fileExtension": ""}"#).unwrap();

        let result = load_settings(None, temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ValidationErrors(errors)) if errors.len() == 1));
    }
}
