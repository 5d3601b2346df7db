//! Lexical overlap re-ranking.
//!
//! Text is lowercased and split into maximal runs of word characters
//! (alphanumerics and `_`). A record scores
//! `2 * |prompt ∩ title| + |prompt ∩ text|`, where `∩` is multiset
//! intersection: each token contributes `min(count_in_prompt, count_in_field)`.

use std::collections::HashMap;

use wikidb_core::types::{Record, ScoredArticle};

type TokenCounts = HashMap<String, u64>;

const TITLE_WEIGHT: u64 = 2;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lowercased word tokens of `text`, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

fn token_counts(text: &str) -> TokenCounts {
    let mut counts = TokenCounts::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

fn overlap(prompt: &TokenCounts, field: &TokenCounts) -> u64 {
    let (small, large) = if prompt.len() <= field.len() { (prompt, field) } else { (field, prompt) };
    small
        .iter()
        .filter_map(|(token, &count)| large.get(token).map(|&other| count.min(other)))
        .sum()
}

/// Scores records against one prompt. The prompt is tokenized once.
#[derive(Debug, Clone)]
pub struct OverlapRanker {
    prompt: TokenCounts,
}

impl OverlapRanker {
    pub fn new(prompt: &str) -> Self {
        Self { prompt: token_counts(prompt) }
    }

    pub fn score(&self, record: &Record) -> u64 {
        let title = overlap(&self.prompt, &token_counts(&record.title));
        let text = overlap(&self.prompt, &token_counts(&record.text));
        TITLE_WEIGHT * title + text
    }

    /// Score every record, keeping input order.
    pub fn score_all(&self, records: Vec<Record>) -> Vec<ScoredArticle> {
        records
            .into_iter()
            .map(|record| {
                let score = self.score(&record);
                ScoredArticle { record, score }
            })
            .collect()
    }
}

/// Score of `record` for `prompt`.
pub fn score(prompt: &str, record: &Record) -> u64 {
    OverlapRanker::new(prompt).score(record)
}

/// The first article holding the maximum score. Later articles only replace
/// the running best on a strictly greater score.
pub fn best_one(scored: Vec<ScoredArticle>) -> Option<ScoredArticle> {
    let mut best: Option<ScoredArticle> = None;
    for article in scored {
        if best.as_ref().map_or(true, |current| article.score > current.score) {
            best = Some(article);
        }
    }
    best
}

/// `n >= 0`: the `n` best, strongest first.
/// `n < 0`: the `|n|` best, weakest first, so the strongest sits last.
///
/// Both sorts are stable, so equal scores keep their input order.
pub fn select(mut scored: Vec<ScoredArticle>, n: isize) -> Vec<ScoredArticle> {
    let count = n.unsigned_abs();
    if n >= 0 {
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(count);
    } else {
        scored.sort_by_key(|article| article.score);
        let skip = scored.len().saturating_sub(count);
        scored.drain(..skip);
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(label: &str, score: u64) -> ScoredArticle {
        ScoredArticle { record: Record::new(label, ""), score }
    }

    fn scored(scores: &[u64]) -> Vec<ScoredArticle> {
        scores.iter().enumerate().map(|(i, &s)| article(&format!("a{i}"), s)).collect()
    }

    fn scores_of(articles: &[ScoredArticle]) -> Vec<u64> {
        articles.iter().map(|a| a.score).collect()
    }

    #[test]
    fn tokenizer_lowercases_and_drops_punctuation() {
        assert_eq!(tokenize("Hello, World! snake_case x2"), vec!["hello", "world", "snake_case", "x2"]);
        assert!(tokenize("  ...  ").is_empty());
        assert_eq!(tokenize("Ünïcode café"), vec!["ünïcode", "café"]);
    }

    #[test]
    fn title_matches_count_double() {
        let record = Record::new("cat cat", "dog runs");
        assert_eq!(score("cat dog", &record), 3);
    }

    #[test]
    fn overlap_is_multiplicity_aware() {
        let record = Record::new("", "the the the cat");
        assert_eq!(score("the the", &record), 2);
        assert_eq!(score("THE cat, the!", &record), 3);
        assert_eq!(score("unrelated", &record), 0);
    }

    #[test]
    fn score_ignores_token_order() {
        let record = Record::new("Solar eclipse", "An eclipse of the Sun by the Moon.");
        assert_eq!(score("solar eclipse moon", &record), score("moon eclipse solar", &record));
    }

    #[test]
    fn top_n_is_descending() {
        let top = select(scored(&[5, 3, 1, 4, 2]), 2);
        assert_eq!(scores_of(&top), vec![5, 4]);
    }

    #[test]
    fn bottom_n_puts_strongest_last() {
        let bottom = select(scored(&[5, 3, 1, 4, 2]), -2);
        assert_eq!(scores_of(&bottom), vec![4, 5]);
    }

    #[test]
    fn selection_larger_than_input_returns_everything() {
        assert_eq!(scores_of(&select(scored(&[1, 3, 2]), 10)), vec![3, 2, 1]);
        assert_eq!(scores_of(&select(scored(&[1, 3, 2]), -10)), vec![1, 2, 3]);
        assert!(select(scored(&[1, 3, 2]), 0).is_empty());
    }

    #[test]
    fn top_n_keeps_input_order_among_ties() {
        let top = select(scored(&[2, 7, 7, 1]), 2);
        let labels: Vec<&str> = top.iter().map(|a| a.record.title.as_str()).collect();
        assert_eq!(labels, vec!["a1", "a2"]);
    }

    #[test]
    fn best_one_prefers_first_maximum() {
        let best = best_one(scored(&[3, 5, 5, 1])).unwrap();
        assert_eq!(best.record.title, "a1");
        assert_eq!(best.score, 5);
    }

    #[test]
    fn best_one_of_all_zero_scores_is_first() {
        assert_eq!(best_one(scored(&[0, 0, 0])).unwrap().record.title, "a0");
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(best_one(Vec::new()).is_none());
        assert!(select(Vec::new(), 3).is_empty());
        assert!(select(Vec::new(), -3).is_empty());
    }
}
