//! Sentiment labeling for cleaned news text.
//!
//! Domain keywords decide first; a general-purpose valence scorer is only consulted
//! when the text carries no domain marker at all.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Discrete label attached to every news item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Mixed,
    Neutral,
    /// Nothing to classify (empty description).
    Unknown,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Bullish => "Bullish",
            Sentiment::Bearish => "Bearish",
            Sentiment::Mixed => "Mixed",
            Sentiment::Neutral => "Neutral",
            Sentiment::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compound score at or above which the fallback says Bullish (and its negation Bearish).
pub const COMPOUND_THRESHOLD: f64 = 0.1;

// Matched by substring, so short stems also fire inside longer words
// ("ban" in "bank"). "resistance" is left out of the negative list: it is
// chart vocabulary and "surges past resistance" reads bullish.
const POSITIVE_TERMS: &[&str] = &[
    "gain",
    "soar",
    "surge",
    "rally",
    "moon",
    "pump",
    "bull run",
    "bullish",
    "green",
    "ath",
    "rise",
    "adoption",
    "all-time high",
    "breakout",
    "etf approved",
    "support",
    "buy",
    "buying",
    "halving",
    "halvening",
    "institutional",
    "btc halving",
    "expansion",
    "partnership",
    "launch",
    "recover",
    "listing",
    "funding",
    "backed",
];

const NEGATIVE_TERMS: &[&str] = &[
    "dump",
    "plunge",
    "dip",
    "rekt",
    "bearish",
    "collapse",
    "fud",
    "scam",
    "crash",
    "liquidated",
    "selloff",
    "downtrend",
    "decline",
    "freeze",
    "rugpull",
    "lawsuit",
    "ban",
    "exploit",
    "hacked",
    "breach",
    "layoffs",
    "shut down",
    "warning",
];

/// Two fixed keyword lists, lower-case, matched by substring against lower-cased text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Lexicon {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        fn clean<I>(items: I) -> Vec<String>
        where
            I: IntoIterator,
            I::Item: AsRef<str>,
        {
            items
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        }
        Self {
            positive: clean(positive),
            negative: clean(negative),
        }
    }

    pub fn positive(&self) -> &[String] {
        &self.positive
    }

    pub fn negative(&self) -> &[String] {
        &self.negative
    }

    /// `(has_positive, has_negative)` for already lower-cased text.
    fn hits(&self, lowered: &str) -> (bool, bool) {
        let pos = self.positive.iter().any(|t| lowered.contains(t.as_str()));
        let neg = self.negative.iter().any(|t| lowered.contains(t.as_str()));
        (pos, neg)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(POSITIVE_TERMS, NEGATIVE_TERMS)
    }
}

/// Statistical polarity collaborator: a compound score in `[-1, 1]` for a non-empty string.
pub trait PolarityScorer: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

static VALENCES: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

/// Normalisation constant for the compound score (`s / sqrt(s^2 + ALPHA)`).
const ALPHA: f64 = 15.0;
/// Added per `!` (up to four) in the direction of the raw sum.
const EXCLAMATION_BOOST: f64 = 0.292;

/// Word-valence scorer backed by the bundled general-purpose lexicon.
#[derive(Debug, Clone, Default)]
pub struct ValenceScorer;

impl ValenceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Valence of a single lower-case token (0.0 when unknown).
    #[inline]
    fn word_valence(&self, w: &str) -> f64 {
        VALENCES.get(w).copied().unwrap_or(0.0)
    }

    /// Raw (un-normalised) sum. A negator within the previous 1..=3 tokens
    /// flips the sign of a word's valence.
    pub fn raw_sum(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum = 0.0;
        for i in 0..tokens.len() {
            let base = self.word_valence(&tokens[i]);
            if base == 0.0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(&tokens[i - k]));
            sum += if negated { -base } else { base };
        }
        sum
    }
}

impl PolarityScorer for ValenceScorer {
    fn compound(&self, text: &str) -> f64 {
        let mut sum = self.raw_sum(text);
        if sum == 0.0 {
            return 0.0;
        }
        let bangs = text.matches('!').count().min(4) as f64;
        sum += sum.signum() * bangs * EXCLAMATION_BOOST;
        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

/// Lower-case word tokens; apostrophes stay inside words so "isn't" survives.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "nor"
            | "neither"
            | "without"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
    )
}

/// Hybrid classifier: keyword lexicon first, polarity score as the fallback.
#[derive(Clone)]
pub struct SentimentClassifier {
    lexicon: Lexicon,
    scorer: Arc<dyn PolarityScorer>,
}

impl fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentClassifier")
            .field("lexicon", &self.lexicon)
            .finish_non_exhaustive()
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(Lexicon::default(), Arc::new(ValenceScorer::new()))
    }
}

impl SentimentClassifier {
    pub fn new(lexicon: Lexicon, scorer: Arc<dyn PolarityScorer>) -> Self {
        Self { lexicon, scorer }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// One of Bullish / Bearish / Mixed / Neutral. Never returns `Unknown`.
    pub fn classify(&self, text: &str) -> Sentiment {
        let lowered = text.to_lowercase();
        match self.lexicon.hits(&lowered) {
            (true, true) => Sentiment::Mixed,
            (true, false) => Sentiment::Bullish,
            (false, true) => Sentiment::Bearish,
            (false, false) => {
                if text.trim().is_empty() {
                    return Sentiment::Neutral;
                }
                let score = self.scorer.compound(text);
                if score >= COMPOUND_THRESHOLD {
                    Sentiment::Bullish
                } else if score <= -COMPOUND_THRESHOLD {
                    Sentiment::Bearish
                } else {
                    Sentiment::Neutral
                }
            }
        }
    }

    /// Label for an assembled description: `Unknown` when there is no text at all.
    pub fn label_description(&self, description: &str) -> Sentiment {
        if description.trim().is_empty() {
            Sentiment::Unknown
        } else {
            self.classify(description)
        }
    }
}
