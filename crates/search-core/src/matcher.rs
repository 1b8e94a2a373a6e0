// search-core/src/matcher.rs
//! 模糊匹配模块
//!
//! Approximate, typo tolerant matching over the weighted item fields.
//!
//! A field's score is `errors / pattern_length`, where `errors` is the
//! smallest edit distance between the pattern and any substring of the field
//! (semi-global alignment), so a match can sit anywhere in a long field. A
//! field matches when its score does not exceed the configured threshold.
//! Scores of matched fields are folded into one cost per item:
//!
//! ```text
//! cost = Π max(score, ε) ^ (weight × 1/√tokens(field))
//! ```
//!
//! Lower cost is better. The query is only ever compared character by
//! character, never compiled into a pattern language.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{FieldWeights, MatcherConfig};
use crate::models::{RankedResult, SearchableItem};

/// Longest pattern matched in one piece; longer ones are split.
pub const MAX_CHUNK_CHARS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Keywords,
    Title,
    Description,
    Content,
}

/// An item that matched, by position in the searched slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub index: usize,
    pub cost: f64,
    pub matched_fields: Vec<Field>,
}

#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Best `limit` items for `query`, projected for display.
    pub fn search(&self, items: &[SearchableItem], query: &str, limit: usize) -> Vec<RankedResult> {
        self.search_until(items, query, limit, &AtomicBool::new(false))
    }

    /// Like [`search`](Self::search), but returns nothing once `cancelled`
    /// is set. The flag is checked between items.
    pub fn search_until(
        &self,
        items: &[SearchableItem],
        query: &str,
        limit: usize,
        cancelled: &AtomicBool,
    ) -> Vec<RankedResult> {
        self.rank_until(items, query, cancelled)
            .into_iter()
            .take(limit)
            .map(|m| RankedResult::from(&items[m.index]))
            .collect()
    }

    /// Every matching item, cheapest first. Ties keep index order.
    pub fn rank(&self, items: &[SearchableItem], query: &str) -> Vec<ScoredMatch> {
        self.rank_until(items, query, &AtomicBool::new(false))
    }

    fn rank_until(&self, items: &[SearchableItem], query: &str, cancelled: &AtomicBool) -> Vec<ScoredMatch> {
        let query = query.trim();
        if query.is_empty() || items.is_empty() {
            return Vec::new();
        }
        let Some(pattern) = Pattern::new(query, &self.config) else {
            return Vec::new();
        };

        let weights = self.config.weights.normalized();
        let mut matches = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if cancelled.load(Ordering::Acquire) {
                tracing::debug!("query {:?} cancelled after {} of {} items", query, index, items.len());
                return Vec::new();
            }
            if let Some((cost, matched_fields)) = self.score_item(&pattern, item, &weights) {
                matches.push(ScoredMatch { index, cost, matched_fields });
            }
        }

        matches.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        tracing::debug!("query {:?} matched {} of {} items", query, matches.len(), items.len());
        matches
    }

    fn score_item(
        &self,
        pattern: &Pattern,
        item: &SearchableItem,
        weights: &FieldWeights,
    ) -> Option<(f64, Vec<Field>)> {
        let fields = [
            (Field::Keywords, item.keywords.as_deref(), weights.keywords),
            (Field::Title, Some(item.title.as_str()), weights.title),
            (Field::Description, item.description.as_deref(), weights.description),
            (Field::Content, Some(item.content.as_str()), weights.content),
        ];

        let mut cost = 1.0;
        let mut matched = Vec::new();
        for (field, text, weight) in fields {
            let Some(text) = text else { continue };
            let Some(score) = pattern.score(text, self.config.threshold) else {
                continue;
            };
            cost *= score.max(f64::EPSILON).powf(weight * field_norm(text));
            matched.push(field);
        }

        if matched.is_empty() { None } else { Some((cost, matched)) }
    }
}

/// Convenience wrapper using the default weights and threshold.
pub fn search(items: &[SearchableItem], query: &str, limit: usize) -> Vec<RankedResult> {
    Matcher::default().search(items, query, limit)
}

/// Longer fields weigh less: `1 / sqrt(number of space separated tokens)`.
fn field_norm(text: &str) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count().max(1);
    1.0 / (tokens as f64).sqrt()
}

/// A lower-cased query split into chunks of at most [`MAX_CHUNK_CHARS`].
///
/// Only the first `max_query_chars` characters take part.
#[derive(Debug)]
struct Pattern {
    chunks: Vec<Vec<char>>,
}

impl Pattern {
    fn new(query: &str, config: &MatcherConfig) -> Option<Self> {
        let mut chars: Vec<char> = query.to_lowercase().chars().collect();
        if chars.len() < config.min_match_char_length.max(1) {
            return None;
        }
        if chars.len() > config.max_query_chars.max(1) {
            tracing::debug!("query truncated from {} to {} chars", chars.len(), config.max_query_chars);
            chars.truncate(config.max_query_chars.max(1));
        }

        let chunks = if chars.len() <= MAX_CHUNK_CHARS {
            vec![chars]
        } else {
            let mut chunks: Vec<Vec<char>> = chars
                .chunks_exact(MAX_CHUNK_CHARS)
                .map(<[char]>::to_vec)
                .collect();
            if chars.len() % MAX_CHUNK_CHARS != 0 {
                // The tail chunk overlaps so that every chunk is full length.
                chunks.push(chars[chars.len() - MAX_CHUNK_CHARS..].to_vec());
            }
            chunks
        };
        Some(Self { chunks })
    }

    /// Score in `0.0..=1.0` when `text` matches, `None` otherwise.
    ///
    /// Matches when at least one chunk is within the threshold; chunks that
    /// miss count as 1.0 towards the mean.
    fn score(&self, text: &str, threshold: f64) -> Option<f64> {
        let text: Vec<char> = text.to_lowercase().chars().collect();

        let mut any_match = false;
        let mut total = 0.0;
        for chunk in &self.chunks {
            let errors = best_substring_distance(chunk, &text);
            let score = errors as f64 / chunk.len() as f64;
            if score <= threshold {
                any_match = true;
                total += score;
            } else {
                total += 1.0;
            }
        }

        any_match.then(|| total / self.chunks.len() as f64)
    }
}

/// Smallest edit distance between `pattern` and any substring of `text`.
fn best_substring_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    if m == 0 {
        return 0;
    }
    if text.windows(m).any(|window| window == pattern) {
        return 0;
    }

    // column[i]: cost of aligning pattern[..i] so that it ends at the current
    // text position; row 0 is free because a match may start anywhere.
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut cur = vec![0; m + 1];
    let mut best = m;

    for &c in text {
        cur[0] = 0;
        for i in 1..=m {
            let substitution = prev[i - 1] + usize::from(pattern[i - 1] != c);
            cur[i] = substitution.min(prev[i] + 1).min(cur[i - 1] + 1);
        }
        best = best.min(cur[m]);
        if best == 0 {
            break;
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}
