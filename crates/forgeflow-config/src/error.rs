use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ファイルを読み込めません: {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("設定ファイルのJSONが不正です: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("globals セクションに設定がありません")]
    EmptyGlobals,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
