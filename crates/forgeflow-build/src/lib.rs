//! forgeflow のDockerイメージビルド機能
//!
//! ビルドコンテキストの作成、イメージのビルド/プッシュ、既存タグからの
//! ビルド番号解決、Dockerfileテンプレートの置換を提供します。

pub mod builder;
pub mod context;
pub mod error;
pub mod pusher;
pub mod resolver;
pub mod template;

pub use builder::ImageBuilder;
pub use error::{BuildError, BuildResult};
pub use pusher::{ImagePusher, split_image_tag};
pub use resolver::{VersionResolver, collect_versions, compose_image_tag, next_build_release};
pub use template::{render_dockerfile, replace_line, replace_marker};
