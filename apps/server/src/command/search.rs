use super::Command;
use crate::config::Config;
use crate::error::{Result, WrapErr};

pub struct SearchCommand {
    config: Config,
    query: String,
    limit: Option<usize>,
}

impl SearchCommand {
    pub fn new(cfg: Config, query: String, limit: Option<usize>) -> Self {
        Self {
            config: cfg,
            query,
            limit,
        }
    }
}

#[async_trait::async_trait]
impl Command for SearchCommand {
    async fn execute(&self) -> Result<()> {
        let engine = self.config.engine()?;
        let limit = self.limit.unwrap_or(self.config.search.matcher.max_results);
        let results = engine
            .query(&self.query, limit)
            .context("Search unavailable")?;

        if results.is_empty() {
            println!("No results for {:?}", self.query);
            return Ok(());
        }
        for (rank, result) in results.iter().enumerate() {
            println!("{:>2}. [{}] {}  {}", rank + 1, result.kind, result.title, result.href);
            if let Some(description) = &result.description {
                println!("    {}", description);
            }
        }
        Ok(())
    }
}
