//! Dockerfileテンプレートの置換処理
//!
//! ファイル全体を読み込み、変換して書き戻す。ストリーミングや
//! アトミックなリネームはしない(最後に書いた者勝ち)。

use crate::error::{BuildError, BuildResult};
use forgeflow_config::ServiceSpec;
use regex::{NoExpand, Regex};
use std::path::Path;

fn read_file(path: &Path) -> BuildResult<String> {
    std::fs::read_to_string(path).map_err(|source| BuildError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> BuildResult<()> {
    std::fs::write(path, content).map_err(|source| BuildError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// リテラルマーカーをすべて置換する
pub fn replace_marker(path: &Path, marker: &str, value: &str) -> BuildResult<()> {
    let data = read_file(path)?;
    write_file(path, &data.replace(marker, value))
}

/// 行アンカー付き正規表現で置換する
///
/// パターンは複数行モードでコンパイルされるので、`^`/`$` は
/// 物理行ごとにマッチする。
pub fn replace_line(path: &Path, pattern: &str, replacement: &str) -> BuildResult<()> {
    tracing::debug!(
        "replace_line parameter: filename={}; pattern={}; replacement={}",
        path.display(),
        pattern,
        replacement
    );

    let re = Regex::new(&format!("(?m){}", pattern))?;

    let data = read_file(path)?;
    write_file(path, &re.replace_all(&data, NoExpand(replacement)))
}

/// サービス設定でDockerfileをレンダリングする
///
/// 各フィールド `k=v` について `$K$` (キーは大文字化)を `v` へ置換し、
/// そのあと `MAINTAINER` 行と `FROM` 行をまるごと書き換える。
pub fn render_dockerfile(
    path: &Path,
    service: &ServiceSpec,
    maintainer: &str,
) -> BuildResult<()> {
    for (key, value) in service.fields() {
        let marker = format!("${}$", key.to_uppercase());
        replace_marker(path, &marker, value)?;
    }

    replace_line(
        path,
        r"^MAINTAINER.*",
        &format!("MAINTAINER {}", maintainer),
    )?;
    replace_line(
        path,
        r"^FROM.*",
        &format!(
            "FROM {}:{}",
            service.from_image, service.from_image_version
        ),
    )?;

    Ok(())
}
