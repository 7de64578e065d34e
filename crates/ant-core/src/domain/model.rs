use serde::{Deserialize, Serialize};

/// ロールがサポートする対象プラットフォーム。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "ubuntu2004")]
    Ubuntu2004,
    #[serde(rename = "ubuntu2204")]
    Ubuntu2204,
    #[serde(rename = "rockylinux8")]
    RockyLinux8,
    #[serde(rename = "rockylinux9")]
    RockyLinux9,
}

/// ロールに付与するライセンス。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum License {
    #[serde(rename = "GPL-2.0-or-later")]
    Gpl2OrLater,
    #[serde(rename = "GPL-3.0-or-later")]
    Gpl3OrLater,
    #[default]
    #[serde(rename = "MIT")]
    Mit,
    #[serde(rename = "BSD")]
    Bsd,
}

/// 対話で収集したロールのメタデータ。
///
/// テンプレートのレンダリングコンテキストとしてそのまま使うため、
/// シリアライズ時のキーはテンプレート側のフィールド名 (小文字) に揃えている。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMetadata {
    pub name: String,
    pub author: String,
    pub company: String,
    pub namespace: String,
    pub description: String,
    pub platforms: Vec<Platform>,
    pub license: License,
    pub gitinit: bool,
}

/// テンプレートリポジトリの取得元。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub url: String,
    pub branch: String,
}

pub const DEFAULT_TEMPLATE_URL: &str = "https://github.com/hpc-unibe-ch/ansible-role-template.git";
pub const DEFAULT_TEMPLATE_BRANCH: &str = "ant";

impl Default for TemplateSource {
    fn default() -> Self {
        Self {
            url: DEFAULT_TEMPLATE_URL.to_string(),
            branch: DEFAULT_TEMPLATE_BRANCH.to_string(),
        }
    }
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Ubuntu2004,
        Platform::Ubuntu2204,
        Platform::RockyLinux8,
        Platform::RockyLinux9,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ubuntu2004 => "ubuntu2004",
            Platform::Ubuntu2204 => "ubuntu2204",
            Platform::RockyLinux8 => "rockylinux8",
            Platform::RockyLinux9 => "rockylinux9",
        }
    }
}

impl License {
    pub const ALL: [License; 4] = [
        License::Gpl2OrLater,
        License::Gpl3OrLater,
        License::Mit,
        License::Bsd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            License::Gpl2OrLater => "GPL-2.0-or-later",
            License::Gpl3OrLater => "GPL-3.0-or-later",
            License::Mit => "MIT",
            License::Bsd => "BSD",
        }
    }
}

impl RoleMetadata {
    /// 出力先ディレクトリ名 (`<namespace>.<name>`) を返す。
    pub fn directory_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for License {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown platform: {s}"))
    }
}

impl std::str::FromStr for License {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        License::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown license: {s}"))
    }
}
