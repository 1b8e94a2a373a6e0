use crate::error::Result;
use config::{AppStrategy, create_strategy, default_runtime_dir};
use search_core::{FsContentStore, SearchConfig, SearchEngine};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default = "default_config", deny_unknown_fields)]
pub struct Config {
    /// 内容根目录，包含 schemas/、examples/ 和 docs/
    pub content_root: PathBuf,
    pub runtime_dir: PathBuf,
    pub http_bind: SocketAddr,
    pub index_policy: IndexPolicy,
    pub search: SearchConfig,
}

/// When the server builds the search index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexPolicy {
    /// Reload content and rebuild for every query
    #[default]
    PerRequest,
    /// Build once when the server starts
    Startup,
}

fn default_config() -> Config {
    Config {
        content_root: PathBuf::from("."),
        runtime_dir: default_runtime_dir(),
        http_bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
        index_policy: IndexPolicy::default(),
        search: SearchConfig::default(),
    }
}

impl Config {
    fn load_str(user_config_str: &str) -> Result<Config> {
        let user_config: Config = toml::from_str(user_config_str)?;
        user_config.search.validate()?;
        Ok(user_config)
    }

    pub fn load() -> Result<Config> {
        let strategy = create_strategy()?;
        let config_path = strategy.config_dir().join(config::constants::SERVER_CONFIG_FILE_NAME);

        match std::fs::read_to_string(&config_path) {
            Ok(user_config_str) => Self::load_str(&user_config_str),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // 配置文件不存在，创建示例配置文件
                Self::create_example_config(&config_path)?;
                Self::load_str("")
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn socket_path(&self) -> PathBuf {
        self.runtime_dir.join(config::constants::UNIX_SOCKET_FILE_NAME)
    }

    /// Engine over the configured content root, honouring the index policy.
    pub fn engine(&self) -> Result<SearchEngine> {
        let store = FsContentStore::new(&self.content_root);
        let engine = SearchEngine::new(Arc::new(store), self.search.clone());
        Ok(match self.index_policy {
            IndexPolicy::PerRequest => engine,
            IndexPolicy::Startup => engine.preload()?,
        })
    }

    fn create_example_config(config_path: &Path) -> Result<()> {
        use std::io::Write;

        // 确保配置目录存在
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let example_config = format!(
            r#"# Server 配置文件
#
# 此文件在首次运行时自动创建
# 配置修改后重启服务生效

# 内容根目录 (包含 schemas/、examples/、docs/)
content-root = "."

# HTTP 监听地址
http-bind = "{}"

# per-request: 每次查询重新加载内容; startup: 启动时构建一次索引
index-policy = "per-request"

# 可选：自定义运行时目录
# runtime-dir = "/custom/runtime/path"

# [search.matcher]
# threshold = 0.4
# max_results = 10
"#,
            config::constants::DEFAULT_HTTP_BIND
        );

        let mut file = std::fs::File::create(config_path)?;
        file.write_all(example_config.as_bytes())?;

        tracing::info!("created example configuration at {:?}", config_path);
        Ok(())
    }
}
