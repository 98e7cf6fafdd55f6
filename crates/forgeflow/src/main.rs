mod compose;
mod docker;

use clap::Parser;
use colored::Colorize;
use forgeflow_build::{
    ImageBuilder, ImagePusher, VersionResolver, compose_image_tag, next_build_release,
};
use forgeflow_config::Config;
use std::collections::HashMap;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
ビルド環境:
    - ビルドディレクトリ直下に dockerbuild.cfg の <app_name> ごとの
      サブディレクトリを置く(サービス1つにつき1ディレクトリ)
    - Dockerfile: <app_name>/Dockerfile
    - docker-compose ファイル: ../docker-compose.yml

例 (ビルドディレクトリから実行):

  # 静かにビルド
  forge

  # 詳細出力つきでビルド
  forge -v

  # ビルドして設定ファイルのレジストリへプッシュ
  forge -p
";

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "サービスごとにバージョン付きDockerイメージをビルドする")]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// ビルド後にイメージをレジストリへプッシュ
    #[arg(short, long)]
    push: bool,

    /// ビルド設定ファイル
    #[arg(short, long, default_value = forgeflow_config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// デバッグ出力
    #[arg(short, long)]
    debug: bool,

    /// 詳細出力
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let config = Config::load(&cli.config)?;

    let docker_conn = docker::init_docker().await?;

    let resolver = VersionResolver::new(docker_conn.clone());
    let builder = ImageBuilder::new(docker_conn.clone());
    let pusher = ImagePusher::new(docker_conn);

    let work_dir = std::env::current_dir()?;
    let compose_path = work_dir.join("..").join("docker-compose.yml");

    // サービスは設定ファイルの記載順に1つずつ処理する
    for service in &config.services {
        println!();
        println!(
            "{}",
            format!("🔨 {} をビルド中...", service.app_name).green().bold()
        );

        let build_dir = work_dir.join(&service.app_name);
        let dockerfile = build_dir.join("Dockerfile");
        if !dockerfile.is_file() {
            anyhow::bail!(
                "Dockerfileが見つかりません: {}\n\
                 dockerbuild.cfg に合わせて <app_name>/Dockerfile を用意してください",
                dockerfile.display()
            );
        }

        // 既存ビルドから次のビルド番号を決める
        let versions = resolver
            .existing_versions(&config.tag_preamble, &service.app_name, &service.app_version)
            .await?;
        if let Some(last) = versions.last() {
            tracing::info!(
                "latest version found: {}/{}:{}",
                config.tag_preamble,
                service.app_name,
                last
            );
        }
        let build_release = next_build_release(&service.app_version, &versions);

        // 新しいタグを組み立て、Dockerfileをレンダリング
        // プッシュ時はビルド時点からレジストリ付きのタグを使う
        let image_tag = compose_image_tag(
            &config.tag_preamble,
            &service.app_name,
            &build_release,
            cli.push.then_some(config.registry.as_str()),
        );
        tracing::info!("new build release tag: {}", image_tag);

        forgeflow_build::render_dockerfile(&dockerfile, service, &config.maintainer)?;

        // ビルド[とプッシュ]。どちらも失敗は警告扱いで続行する
        println!("  → {}", image_tag.cyan());
        match builder
            .build(
                &build_dir,
                &image_tag,
                HashMap::new(),
                cli.verbose || cli.debug,
            )
            .await
        {
            Ok(_) => println!("  {} ビルド完了", "✓".green()),
            Err(e) => eprintln!(
                "  {} Build of {} FAILED: {}",
                "⚠".yellow(),
                image_tag.cyan(),
                e
            ),
        }

        if cli.push {
            match pusher.push(&image_tag, config.insecure_registry).await {
                Ok(_) => println!("  {} プッシュ完了", "✓".green()),
                Err(e) => eprintln!(
                    "  {} Push of {} FAILED: {}",
                    "⚠".yellow(),
                    image_tag.cyan(),
                    e
                ),
            }
        }

        // docker-compose.yml を新しいタグに合わせる
        if compose_path.is_file() {
            compose::rewrite_compose_file(&compose_path, &service.app_name, &image_tag)?;
        } else {
            eprintln!(
                "  {} {} が見つかりません",
                "⚠".yellow(),
                compose_path.display()
            );
        }
    }

    Ok(())
}
