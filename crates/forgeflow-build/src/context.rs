use crate::error::{BuildError, BuildResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::Path;
use tar::Builder;

/// ビルドコンテキストをtar.gzアーカイブとして作成
///
/// Dockerfileはコンテキストディレクトリ直下にある前提なので、
/// ディレクトリをまるごと再帰的に詰めるだけでよい。
pub fn create_context(context_dir: &Path) -> BuildResult<Vec<u8>> {
    if !context_dir.is_dir() {
        return Err(BuildError::ContextNotFound(context_dir.to_path_buf()));
    }

    tracing::debug!("Creating build context from: {}", context_dir.display());

    let mut archive_data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut archive_data, Compression::default());
        let mut tar = Builder::new(encoder);

        tar.append_dir_all(".", context_dir).map_err(BuildError::Io)?;
        tar.finish().map_err(BuildError::Io)?;
    }

    tracing::debug!("Build context created: {} bytes", archive_data.len());

    Ok(archive_data)
}
