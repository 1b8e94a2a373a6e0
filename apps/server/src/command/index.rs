use super::Command;
use crate::config::Config;
use crate::error::{Result, WrapErr};
use search_core::ItemKind;

pub struct IndexCommand {
    config: Config,
}

impl IndexCommand {
    pub fn new(cfg: Config) -> Self {
        Self { config: cfg }
    }
}

#[async_trait::async_trait]
impl Command for IndexCommand {
    async fn execute(&self) -> Result<()> {
        let engine = self.config.engine()?;
        let index = engine
            .build_index()
            .with_context(|| format!("Failed to index {:?}", self.config.content_root))?;

        if index.is_empty() {
            tracing::warn!("no content found under {:?}", self.config.content_root);
        }

        let counts = index.count_by_kind();
        for kind in [ItemKind::Schema, ItemKind::Example, ItemKind::Doc] {
            println!("{:<8} {}", kind, counts.get(&kind).copied().unwrap_or(0));
        }
        println!();
        for item in index.items() {
            println!("{:<8} {:<40} {}", item.kind, item.title, item.href);
        }
        Ok(())
    }
}
