use crate::context;
use crate::error::{BuildError, BuildResult};
use bollard::Docker;
use colored::Colorize;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use std::path::Path;

/// イメージビルドを実行するハンドラ
pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// コンテキストディレクトリからイメージをビルドする
    ///
    /// 毎回キャッシュなしでビルドし、結果に `tag` を付ける。
    /// ビルド失敗の扱い(継続するか中断するか)は呼び出し側の責務。
    pub async fn build(
        &self,
        context_dir: &Path,
        tag: &str,
        build_args: HashMap<String, String>,
        verbose: bool,
    ) -> BuildResult<()> {
        tracing::debug!(
            "build parameter: path={}; tag={}; build_args={:?}",
            context_dir.display(),
            tag,
            build_args
        );

        let context_data = context::create_context(context_dir)?;

        // build_argsを&str型に変換
        let build_args_refs: HashMap<&str, &str> = build_args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: "Dockerfile",
            t: tag,
            buildargs: build_args_refs,
            nocache: true,
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            ..Default::default()
        };

        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(output) => {
                    self.handle_build_output(output, verbose)?;
                }
                Err(e) => {
                    return Err(BuildError::DockerConnection(e));
                }
            }
        }

        tracing::info!("build OK: {}", tag);
        Ok(())
    }

    /// ビルド出力の処理
    fn handle_build_output(
        &self,
        output: bollard::models::BuildInfo,
        verbose: bool,
    ) -> BuildResult<()> {
        if let Some(stream) = output.stream {
            // ビルドステップの出力。デフォルトでは静かに進める
            if verbose {
                print!("{}", stream);
            }
        }

        if let Some(error) = output.error {
            return Err(BuildError::BuildFailed(error));
        }

        if let Some(error_detail) = output.error_detail {
            let error_msg = error_detail
                .message
                .unwrap_or_else(|| "Unknown build error".to_string());
            return Err(BuildError::BuildFailed(error_msg));
        }

        if let Some(status) = output.status {
            if verbose {
                println!("{}", status.cyan());
            }
        }

        Ok(())
    }
}
