//! Analysis jobs.
//!
//! Every job maps one chunk of text to a [`Frequencies`] multiset and all
//! jobs share one additive reduce. The job kind only decides how the chunk
//! is tokenized and how the combined multiset is turned into a
//! [`FinalResult`].

use std::{collections::HashMap, fmt, str::FromStr};

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

/// Key under which `word_count` records the token total of a chunk.
pub const WORD_COUNT_KEY: &str = "word_count";

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z0-9']+\b").expect("word pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    WordCount,
    TopWord,
}

impl JobKind {
    pub fn name(self) -> &'static str {
        match self {
            JobKind::WordCount => "word_count",
            JobKind::TopWord => "top_word",
        }
    }

    /// Map function applied to the full text of one chunk.
    pub fn map(self, contents: &str) -> Frequencies {
        match self {
            JobKind::WordCount => map_word_count(contents),
            JobKind::TopWord => map_top_word(contents),
        }
    }

    /// Turns the reduced multiset into the job's answer.
    pub fn finalize(self, mut combined: Frequencies) -> Result<FinalResult> {
        match self {
            JobKind::WordCount => Ok(FinalResult::TotalWords(combined.get(WORD_COUNT_KEY))),
            JobKind::TopWord => {
                combined.remove(WORD_COUNT_KEY);
                combined
                    .most_common(1)
                    .into_iter()
                    .next()
                    .map(|(word, count)| FinalResult::TopWord {
                        word: word.to_owned(),
                        count,
                    })
                    .ok_or(Error::EmptyCorpus)
            }
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JobKind {
    type Err = Error;

    /// Accepts the job names and the numeric menu choices `1` and `2`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "word_count" | "1" => Ok(JobKind::WordCount),
            "top_word" | "2" => Ok(JobKind::TopWord),
            other => Err(Error::UnknownJob(other.to_owned())),
        }
    }
}

/// Whitespace tokens, recorded as a single aggregate under [`WORD_COUNT_KEY`].
pub fn map_word_count(contents: &str) -> Frequencies {
    let mut counts = Frequencies::new();
    counts.add(WORD_COUNT_KEY, contents.split_whitespace().count() as u64);
    counts
}

/// Lowercased words made of ASCII letters, digits and apostrophes.
pub fn map_top_word(contents: &str) -> Frequencies {
    let lowered = contents.to_lowercase();
    WORD.find_iter(&lowered).map(|m| m.as_str()).collect()
}

/// Additive merge of partial results. Commutative and associative, so the
/// outcome does not depend on the order partials arrive in.
pub fn reduce<I>(partials: I) -> Frequencies
where
    I: IntoIterator<Item = Frequencies>,
{
    partials
        .into_iter()
        .fold(Frequencies::new(), |mut combined, partial| {
            combined.merge(partial);
            combined
        })
}

/// A multiset of token frequencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frequencies(HashMap<String, u64>);

impl Frequencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, n: u64) {
        match self.0.get_mut(key) {
            Some(count) => *count += n,
            None => {
                self.0.insert(key.to_owned(), n);
            }
        }
    }

    pub fn merge(&mut self, other: Frequencies) {
        for (key, n) in other.0 {
            *self.0.entry(key).or_default() += n;
        }
    }

    /// Count for `key`, zero when absent.
    pub fn get(&self, key: &str) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn remove(&mut self, key: &str) -> Option<u64> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `n` highest counts, descending. Equal counts are ordered by
    /// token, lexicographically smallest first.
    pub fn most_common(&self, n: usize) -> Vec<(&str, u64)> {
        self.0
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .take(n)
            .collect_vec()
    }
}

impl<'a> FromIterator<&'a str> for Frequencies {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut counts = Frequencies::new();
        for token in iter {
            counts.add(token, 1);
        }
        counts
    }
}

/// The answer of one job run. Rendered, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalResult {
    TotalWords(u64),
    TopWord { word: String, count: u64 },
}

impl fmt::Display for FinalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalResult::TotalWords(total) => write!(f, "Total Words: {total}"),
            FinalResult::TopWord { word, count } => {
                write!(f, "Most Frequent Word: '{word}' ({count} times)")
            }
        }
    }
}
