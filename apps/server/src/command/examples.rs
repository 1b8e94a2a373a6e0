use super::Command;
use crate::config::Config;
use crate::error::{Result, WrapErr};
use search_core::{ContentSource, FsContentStore};

pub struct ExamplesCommand {
    config: Config,
}

impl ExamplesCommand {
    pub fn new(cfg: Config) -> Self {
        Self { config: cfg }
    }
}

#[async_trait::async_trait]
impl Command for ExamplesCommand {
    async fn execute(&self) -> Result<()> {
        let store = FsContentStore::new(&self.config.content_root);
        let examples = store.get_all_examples().context("Failed to load examples")?;
        println!("{}", serde_json::to_string_pretty(&examples)?);
        Ok(())
    }
}
