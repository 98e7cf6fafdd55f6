//! イメージプッシュ処理
//!
//! ビルドしたイメージをコンテナレジストリにプッシュします。

use crate::error::{BuildError, BuildResult};
use bollard::Docker;
use bollard::auth::DockerCredentials;
use futures_util::StreamExt;

/// イメージプッシュを実行するハンドラ
pub struct ImagePusher {
    docker: Docker,
}

impl ImagePusher {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// イメージをレジストリにプッシュ
    ///
    /// `insecure_registry` の場合は認証情報を付けずに送る。TLS検証を
    /// 省略するかどうか自体は daemon 側の insecure-registries 設定に従う。
    pub async fn push(&self, image_tag: &str, insecure_registry: bool) -> BuildResult<()> {
        tracing::debug!(
            "push parameter: tag={}; insecure_registry={}",
            image_tag,
            insecure_registry
        );

        let (image, tag) = split_image_tag(image_tag);

        let credentials = if insecure_registry {
            None
        } else {
            extract_registry(&image).and_then(docker_credentials)
        };

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> { tag };

        #[allow(deprecated)]
        let mut stream = self.docker.push_image(&image, Some(options), credentials);

        let mut error_message: Option<String> = None;

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(err) = info.error {
                        error_message = Some(err);
                    }
                }
                Err(e) => {
                    return Err(BuildError::PushFailed(e.to_string()));
                }
            }
        }

        if let Some(err) = error_message {
            return Err(BuildError::PushFailed(err));
        }

        tracing::info!("push OK: {}", image_tag);
        Ok(())
    }
}

/// イメージ名とタグを分離
///
/// # Examples
/// - `acme/web:1.2-3` -> `("acme/web", "1.2-3")`
/// - `localhost:5000/acme/web:1.2-3` -> `("localhost:5000/acme/web", "1.2-3")`
/// - `localhost:5000/acme/web` -> `("localhost:5000/acme/web", "latest")`
pub fn split_image_tag(image: &str) -> (String, String) {
    if let Some(pos) = image.rfind(':') {
        let potential_tag = &image[pos + 1..];
        let potential_image = &image[..pos];

        // 最後の : より後ろが / を含まず、純粋な数字でもなければタグ。
        // 純粋な数字だけの場合はレジストリのポート番号とみなす。
        if !potential_tag.contains('/') && !potential_tag.chars().all(|c| c.is_ascii_digit()) {
            return (potential_image.to_string(), potential_tag.to_string());
        }
    }

    (image.to_string(), "latest".to_string())
}

/// イメージ名からレジストリを抽出
///
/// 先頭セグメントが . か : を含む場合のみレジストリ(例: ghcr.io, localhost:5000)
fn extract_registry(image: &str) -> Option<&str> {
    let first = image.split('/').next()?;
    if image.contains('/') && (first.contains('.') || first.contains(':')) {
        return Some(first);
    }
    None
}

/// Docker config.json からレジストリの認証情報を取得
fn docker_credentials(registry: &str) -> Option<DockerCredentials> {
    let home = std::env::var("HOME").ok()?;
    let config_path = format!("{}/.docker/config.json", home);
    let config_content = std::fs::read_to_string(&config_path).ok()?;
    let config: serde_json::Value = serde_json::from_str(&config_content).ok()?;

    let auths = config.get("auths")?.as_object()?;
    let auth_entry = auths.get(registry)?;
    let auth_b64 = auth_entry.get("auth")?.as_str()?;

    // Base64 デコード (username:password 形式)
    use base64::Engine;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(auth_b64)
        .ok()?;
    let auth_str = String::from_utf8(decoded).ok()?;
    let (username, password) = auth_str.split_once(':')?;

    Some(DockerCredentials {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        serveraddress: Some(registry.to_string()),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_image_tag_with_tag() {
        let (image, tag) = split_image_tag("acme/web:1.2-3");
        assert_eq!(image, "acme/web");
        assert_eq!(tag, "1.2-3");
    }

    #[test]
    fn test_split_image_tag_without_tag() {
        let (image, tag) = split_image_tag("acme/web");
        assert_eq!(image, "acme/web");
        assert_eq!(tag, "latest");
    }

    #[test]
    fn test_split_image_tag_with_port() {
        // localhost:5000/web はポート番号を含むレジストリ
        let (image, tag) = split_image_tag("localhost:5000/web");
        assert_eq!(image, "localhost:5000/web");
        assert_eq!(tag, "latest");
    }

    #[test]
    fn test_split_image_tag_with_port_and_tag() {
        let (image, tag) = split_image_tag("localhost:5000/acme/web:1.2-3");
        assert_eq!(image, "localhost:5000/acme/web");
        assert_eq!(tag, "1.2-3");
    }

    #[test]
    fn test_extract_registry() {
        assert_eq!(
            extract_registry("registry.example.com:5000/acme/web"),
            Some("registry.example.com:5000")
        );
        assert_eq!(extract_registry("acme/web"), None);
        assert_eq!(extract_registry("alpine"), None);
    }
}
