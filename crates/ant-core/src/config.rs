use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::model::{TemplateSource, DEFAULT_TEMPLATE_BRANCH, DEFAULT_TEMPLATE_URL};

/// 設定ファイル名。
pub const CONFIG_FILE_NAME: &str = "ant.yaml";

/// 設定ファイルの場所を上書きする環境変数。
pub const CONFIG_ENV: &str = "ANT_CONFIG";

/// CLI全体の設定を保持する構造体。
///
/// すべての項目にデフォルト値があり、設定ファイルは省略できる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntConfig {
    /// テンプレートリポジトリの URL
    pub repository_url: String,
    /// クローンするブランチ
    pub branch: String,
    /// ログレベル (ANT_LOG 未指定時に使用)
    pub log_level: String,
    /// ログ形式 (text / json)
    pub log_format: String,
}

impl Default for AntConfig {
    fn default() -> Self {
        Self {
            repository_url: DEFAULT_TEMPLATE_URL.to_string(),
            branch: DEFAULT_TEMPLATE_BRANCH.to_string(),
            log_level: "warn".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl AntConfig {
    pub fn template_source(&self) -> TemplateSource {
        TemplateSource {
            url: self.repository_url.clone(),
            branch: self.branch.clone(),
        }
    }
}

/// 設定ファイルを読み込む。
///
/// 指定されたパスから YAML 形式の設定ファイルを読み込む。
/// ファイルが存在しない場合はデフォルト値を返す。
///
/// # Errors
/// ファイルの読み込み、またはパースに失敗した場合。
pub fn load_config(path: &Path) -> anyhow::Result<AntConfig> {
    if !path.exists() {
        return Ok(AntConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("failed to read config file {}: {}", path.display(), e)
    })?;
    let config: AntConfig = serde_yaml::from_str(&content).map_err(|e| {
        anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e)
    })?;
    Ok(config)
}

/// 設定ファイルの探索候補を優先順に返す。
///
/// 1. `ANT_CONFIG` で指定されたパス
/// 2. 作業ディレクトリの `ant.yaml`
/// 3. ユーザー設定ディレクトリの `ant/ant.yaml`
pub fn config_candidates(env_override: Option<PathBuf>, workdir: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = env_override {
        candidates.push(path);
    }
    candidates.push(workdir.join(CONFIG_FILE_NAME));
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("ant").join(CONFIG_FILE_NAME));
    }
    candidates
}

/// 候補のうち最初に存在する設定ファイルを読み込む。どれも無ければデフォルト値。
///
/// # Errors
/// 見つかった設定ファイルの読み込み、またはパースに失敗した場合。
pub fn discover_config(workdir: &Path) -> anyhow::Result<AntConfig> {
    let env_override = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    match config_candidates(env_override, workdir)
        .into_iter()
        .find(|p| p.exists())
    {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config(&path)
        }
        None => Ok(AntConfig::default()),
    }
}
