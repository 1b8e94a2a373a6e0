// search-core/src/config.rs
//! 配置模块

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Upper bound on the results of one query.
pub const MAX_RESULTS: usize = 10;

/// 搜索引擎配置
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub index: IndexConfig,
    pub matcher: MatcherConfig,
    pub session: SessionConfig,
}

/// 索引配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Checked in order against the schema file name
    pub schema_routes: Vec<SchemaRoute>,
    pub default_schema_href: String,
}

/// Sends schemas whose file name contains `contains` to `href`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SchemaRoute {
    pub contains: String,
    pub href: String,
}

/// 匹配配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub weights: FieldWeights,
    /// 0.0 only accepts exact matches, 1.0 accepts anything
    pub threshold: f64,
    pub min_match_char_length: usize,
    /// At most [`MAX_RESULTS`]
    pub max_results: usize,
    /// Longer queries are cut to this many characters before matching
    pub max_query_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldWeights {
    pub keywords: f64,
    pub title: f64,
    pub description: f64,
    pub content: f64,
}

/// 会话配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub debounce_ms: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            schema_routes: vec![SchemaRoute {
                contains: "oral_history".to_string(),
                href: "/schemas/interview".to_string(),
            }],
            default_schema_href: "/schemas/collection".to_string(),
        }
    }
}

impl IndexConfig {
    pub fn schema_href(&self, source_id: &str) -> &str {
        self.schema_routes
            .iter()
            .find(|route| source_id.contains(&route.contains))
            .map(|route| route.href.as_str())
            .unwrap_or(&self.default_schema_href)
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            weights: FieldWeights::default(),
            threshold: 0.4,
            min_match_char_length: 2,
            max_results: MAX_RESULTS,
            max_query_chars: 256,
        }
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            keywords: 0.4,
            title: 0.3,
            description: 0.2,
            content: 0.1,
        }
    }
}

impl FieldWeights {
    /// Weights scaled so that they sum to one.
    pub fn normalized(&self) -> FieldWeights {
        let total = self.keywords + self.title + self.description + self.content;
        if total <= 0.0 {
            return FieldWeights::default();
        }
        FieldWeights {
            keywords: self.keywords / total,
            title: self.title / total,
            description: self.description / total,
            content: self.content / total,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl SessionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl SearchConfig {
    /// 从 TOML 文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    pub fn load_str(content: &str) -> Result<Self> {
        let config: SearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        use crate::error::Error;

        if !(0.0..=1.0).contains(&self.matcher.threshold) {
            return Err(Error::InvalidConfig(format!(
                "matcher.threshold must be within 0.0..=1.0, got {}",
                self.matcher.threshold
            )));
        }
        let w = &self.matcher.weights;
        if [w.keywords, w.title, w.description, w.content].iter().any(|v| *v < 0.0) {
            return Err(Error::InvalidConfig("matcher weights must not be negative".into()));
        }
        if !(1..=MAX_RESULTS).contains(&self.matcher.max_results) {
            return Err(Error::InvalidConfig(format!(
                "matcher.max_results must be within 1..={MAX_RESULTS}, got {}",
                self.matcher.max_results
            )));
        }
        if self.matcher.max_query_chars == 0 {
            return Err(Error::InvalidConfig("matcher.max_query_chars must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SearchConfig::load_str("").unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.session.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_override() {
        let config = SearchConfig::load_str(
            r#"
            [matcher]
            threshold = 0.2

            [matcher.weights]
            title = 0.6
            "#,
        )
        .unwrap();
        assert_eq!(config.matcher.threshold, 0.2);
        assert_eq!(config.matcher.weights.title, 0.6);
        assert_eq!(config.matcher.weights.keywords, 0.4);
        assert_eq!(config.matcher.max_results, 10);
        assert_eq!(config.matcher.max_query_chars, 256);
    }

    #[rstest]
    #[case("[matcher]\nthreshold = 1.5")]
    #[case("[matcher.weights]\ncontent = -0.1")]
    #[case("[matcher]\nthreshold = \"loose\"")]
    #[case("[matcher]\nmax_results = 50")]
    #[case("[matcher]\nmax_results = 0")]
    #[case("[matcher]\nmax_query_chars = 0")]
    fn test_invalid_config(#[case] input: &str) {
        assert!(SearchConfig::load_str(input).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.toml");
        std::fs::write(&path, "[session]\ndebounce_ms = 120\n").unwrap();
        assert_eq!(SearchConfig::load_from_file(&path).unwrap().session.debounce_ms, 120);
        assert!(SearchConfig::load_from_file(dir.path().join("missing.toml")).is_err());
    }

    #[rstest]
    #[case("oral_history.json", "/schemas/interview")]
    #[case("collection.json", "/schemas/collection")]
    fn test_schema_href(#[case] source_id: &str, #[case] expected: &str) {
        assert_eq!(IndexConfig::default().schema_href(source_id), expected);
    }

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let w = FieldWeights { keywords: 2.0, title: 1.0, description: 1.0, content: 0.0 }.normalized();
        assert!((w.keywords + w.title + w.description + w.content - 1.0).abs() < 1e-9);
        assert_eq!(w.keywords, 0.5);
    }
}
