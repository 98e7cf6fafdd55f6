use colored::Colorize;

/// Docker接続を初期化し、コンテナ一覧で到達性を確認する
///
/// クライアント/サーバのAPIバージョン不一致だけなら警告して続行する。
/// それ以外の失敗は致命的エラー。
pub async fn init_docker() -> anyhow::Result<bollard::Docker> {
    let docker = match bollard::Docker::connect_with_local_defaults() {
        Ok(docker) => docker,
        Err(e) => {
            print_connection_help(&e.to_string());
            return Err(anyhow::anyhow!("Docker接続に失敗しました"));
        }
    };

    #[allow(deprecated)]
    let options = bollard::container::ListContainersOptions::<String>::default();

    #[allow(deprecated)]
    let probe = docker.list_containers(Some(options)).await;

    match probe {
        Ok(_) => Ok(docker),
        Err(e) if is_version_mismatch(&e) => {
            eprintln!(
                "  {} Client/Server API version mismatch: {}",
                "⚠".yellow(),
                e
            );
            Ok(docker)
        }
        Err(e) => {
            print_connection_help(&e.to_string());
            Err(anyhow::anyhow!("Docker接続に失敗しました"))
        }
    }
}

fn is_version_mismatch(e: &bollard::errors::Error) -> bool {
    let msg = e.to_string();
    msg.contains("client is newer than server") || msg.contains("is too new")
}

fn print_connection_help(cause: &str) {
    eprintln!();
    eprintln!("{}", "✗ Docker接続エラー".red().bold());
    eprintln!();
    eprintln!("{}", "原因:".yellow());
    eprintln!("  {}", cause);
    eprintln!();
    eprintln!("{}", "解決方法:".yellow());
    eprintln!("  • Dockerが起動しているか確認してください");
    eprintln!("  • docker ps コマンドが正常に動作するか確認してください");
}
