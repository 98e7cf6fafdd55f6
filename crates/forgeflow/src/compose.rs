//! docker-compose.yml の image: 行の書き換え
//!
//! YAMLとしてはパースせず、コメントや整形を保ったまま行単位で
//! 走査する。対象サービスのブロック内で最初に現れる image: 行
//! だけを置き換える。

use anyhow::Context;
use std::path::Path;

/// サービスブロック探索の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// サービス名を含む行を探している
    Searching,
    /// サービスブロック内。次の image: 行を書き換える
    InBlock,
    /// 書き換え済み。以降は素通し
    Done,
}

/// compose ファイル内容の該当サービスの image: 行を新しいタグへ書き換える
///
/// - `#` で始まる行は常に素通しで、マッチ対象にもならない
/// - サービス名を部分文字列として含む最初の行でブロック開始
/// - ブロック内で最初の `image:` 行のみ4スペースインデントで置換
/// - マッチする行がなければ内容はそのまま返る
pub fn rewrite_image(content: &str, service: &str, tag: &str) -> String {
    let mut state = ScanState::Searching;
    let mut lines: Vec<String> = Vec::new();

    for line in content.lines() {
        if line.starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        match state {
            ScanState::Searching if line.contains(service) => {
                state = ScanState::InBlock;
                lines.push(line.to_string());
            }
            ScanState::InBlock if line.trim_start().starts_with("image:") => {
                state = ScanState::Done;
                lines.push(format!("    image: {}", tag));
            }
            _ => lines.push(line.to_string()),
        }
    }

    let mut result = lines.join("\n");
    if content.ends_with('\n') {
        result.push('\n');
    }
    result
}

/// compose ファイルを書き換える。存在チェックは呼び出し側の責務。
pub fn rewrite_compose_file(path: &Path, service: &str, tag: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("composeファイルを読み込めません: {}", path.display()))?;

    let rewritten = rewrite_image(&content, service, tag);

    std::fs::write(path, rewritten)
        .with_context(|| format!("composeファイルを書き込めません: {}", path.display()))?;

    Ok(())
}
