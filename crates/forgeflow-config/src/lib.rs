pub mod error;

pub use error::*;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// dockerbuild.cfg のデフォルトファイル名
pub const DEFAULT_CONFIG_FILE: &str = "dockerbuild.cfg";

/// globals セクションの先頭エントリ
#[derive(Debug, Clone, Deserialize)]
struct Globals {
    registry: String,
    insecure_registry: bool,
    tag_preamble: String,
    maintainer: String,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    globals: Vec<Globals>,
    services: Vec<ServiceSpec>,
}

/// サービスひとつ分のビルド設定
///
/// 必須4キーのほかに任意の文字列フィールドを持てる。追加フィールドは
/// Dockerfileテンプレートの置換変数としてそのまま使われる。
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSpec {
    pub app_name: String,
    pub app_version: String,
    pub from_image: String,
    pub from_image_version: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ServiceSpec {
    /// 必須フィールドと追加フィールドをまとめて列挙する
    ///
    /// テンプレート置換はキー順に依存しないので、列挙順は固定4キー →
    /// 追加キー(辞書順)としている。
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        [
            ("app_name", self.app_name.as_str()),
            ("app_version", self.app_version.as_str()),
            ("from_image", self.from_image.as_str()),
            ("from_image_version", self.from_image_version.as_str()),
        ]
        .into_iter()
        .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

/// 読み込み済みのビルド設定。起動時に一度だけロードし、以降は不変。
#[derive(Debug, Clone)]
pub struct Config {
    pub registry: String,
    pub insecure_registry: bool,
    pub tag_preamble: String,
    pub maintainer: String,
    pub services: Vec<ServiceSpec>,
}

impl Config {
    /// JSON設定ファイルをロードする
    ///
    /// ファイルが無い・JSONが壊れている・必須キーが欠けている場合はすべて
    /// `ConfigError`。部分的なロードは行わない。
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: RawConfig = serde_json::from_str(&text)?;

        let globals = raw
            .globals
            .into_iter()
            .next()
            .ok_or(ConfigError::EmptyGlobals)?;

        Ok(Self {
            registry: globals.registry,
            insecure_registry: globals.insecure_registry,
            tag_preamble: globals.tag_preamble,
            maintainer: globals.maintainer,
            services: raw.services,
        })
    }
}
