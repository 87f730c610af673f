//! Deterministic lexicon fallbacks.
//!
//! Used whenever the remote classifier is unavailable or answers with
//! something unusable. Every function here is total and pure.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::html::truncate_chars;
use crate::types::bulk::{BulkReport, CategoryCount, FeedbackItem, OverallSentiment, ReportSource};
use crate::types::classification::{
    clamp_percent, clamp_rating, ClassificationResult, ExternalClassification, FeedbackCategory,
    Sentiment,
};

lazy_static! {
    static ref WORD_REGEX: Regex = Regex::new(r"[a-z0-9']+").unwrap();
    static ref SENTENCE_REGEX: Regex = Regex::new(r"[^.!?\n]+").unwrap();
}

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "fantastic", "wonderful", "love",
    "loved", "lovely", "perfect", "best", "friendly", "helpful", "delicious", "tasty", "clean",
    "fast", "quick", "nice", "pleasant", "recommend", "recommended", "happy", "enjoyed",
    "enjoy", "fresh", "polite", "welcoming", "cozy", "beautiful", "reasonable", "attentive",
    "satisfied", "impressed", "outstanding", "superb", "fair",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "worst", "poor", "rude", "slow", "dirty", "cold",
    "hate", "hated", "disappointing", "disappointed", "disappointment", "bland", "overpriced",
    "expensive", "noisy", "broken", "wrong", "late", "unfriendly", "unhelpful", "stale",
    "disgusting", "mediocre", "annoying", "waited", "waiting", "unacceptable",
    "refund", "complaint", "crowded", "greasy",
];

const NEGATORS: &[&str] = &["not", "no", "never", "hardly", "barely", "without", "nothing"];

/// How far back a negator reaches, in tokens.
const NEGATION_WINDOW: usize = 2;

const CATEGORY_KEYWORDS: &[(FeedbackCategory, &[&str])] = &[
    (
        FeedbackCategory::Service,
        &["service", "wait", "waited", "waiting", "slow", "fast", "quick", "order", "delivery", "served"],
    ),
    (
        FeedbackCategory::Quality,
        &["quality", "food", "taste", "tasty", "delicious", "fresh", "stale", "bland", "dish", "meal", "product"],
    ),
    (
        FeedbackCategory::Price,
        &["price", "prices", "expensive", "cheap", "overpriced", "value", "cost", "bill", "money", "affordable"],
    ),
    (
        FeedbackCategory::Ambiance,
        &["ambiance", "atmosphere", "music", "noisy", "quiet", "decor", "cozy", "clean", "dirty", "crowded", "place"],
    ),
    (
        FeedbackCategory::Staff,
        &["staff", "waiter", "waitress", "server", "rude", "friendly", "polite", "manager", "employee", "attentive"],
    ),
];

const MAX_POINTS: usize = 5;
const MAX_POINT_CHARS: usize = 120;

/// Lexicon tally for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexiconScore {
    pub positive_hits: u32,
    pub negative_hits: u32,
}

impl LexiconScore {
    pub fn score(&self) -> i64 {
        self.positive_hits as i64 - self.negative_hits as i64
    }

    pub fn hits(&self) -> u32 {
        self.positive_hits + self.negative_hits
    }

    pub fn sentiment(&self) -> Sentiment {
        match self.score() {
            s if s > 0 => Sentiment::Positive,
            s if s < 0 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    /// 50 for neutral, otherwise `min(50 + 10 × hits, 85)`.
    pub fn confidence(&self) -> i64 {
        match self.sentiment() {
            Sentiment::Neutral => 50,
            _ => (50 + 10 * self.hits() as i64).min(85),
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_REGEX
        .find_iter(&lower)
        .map(|m| m.as_str().trim_matches('\'').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}

/// Score `text` against the polarity lexicon.
///
/// A negator within the two preceding tokens flips a hit's polarity.
pub fn score_text(text: &str) -> LexiconScore {
    let tokens = tokenize(text);
    let mut score = LexiconScore::default();

    for (i, token) in tokens.iter().enumerate() {
        let polarity = if POSITIVE_WORDS.contains(&token.as_str()) {
            1
        } else if NEGATIVE_WORDS.contains(&token.as_str()) {
            -1
        } else {
            continue;
        };

        let negated = tokens[i.saturating_sub(NEGATION_WINDOW)..i]
            .iter()
            .any(|t| is_negator(t));

        if (polarity > 0) != negated {
            score.positive_hits += 1;
        } else {
            score.negative_hits += 1;
        }
    }

    score
}

/// Best keyword match, or `Other`.
pub fn guess_category(text: &str) -> FeedbackCategory {
    let tokens = tokenize(text);
    let mut best = (FeedbackCategory::Other, 0usize);

    for (category, keywords) in CATEGORY_KEYWORDS {
        let hits = tokens
            .iter()
            .filter(|t| keywords.contains(&t.as_str()))
            .count();
        if hits > best.1 {
            best = (*category, hits);
        }
    }

    best.0
}

/// Sentences of `text` that carry lexicon hits of the given polarity.
fn key_sentences(text: &str, sentiment: Sentiment) -> Vec<String> {
    SENTENCE_REGEX
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty() && score_text(s).sentiment() == sentiment)
        .map(|s| truncate_chars(s, MAX_POINT_CHARS).to_string())
        .collect()
}

fn first_sentence(text: &str) -> String {
    SENTENCE_REGEX
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|s| !s.is_empty())
        .map(|s| truncate_chars(s, MAX_POINT_CHARS).to_string())
        .unwrap_or_default()
}

/// Classify one message without the remote service.
pub fn fallback_classification(message: &str) -> ClassificationResult {
    let lexicon = score_text(message);
    let sentiment = lexicon.sentiment();

    let summary = match first_sentence(message) {
        s if s.is_empty() => format!("{} feedback", capitalize(sentiment.as_str())),
        s => format!("{} feedback: {}", capitalize(sentiment.as_str()), s),
    };

    let mut key_points = key_sentences(message, sentiment);
    key_points.truncate(3);

    ClassificationResult::new(sentiment, lexicon.confidence(), summary, key_points)
}

/// Classify imported text without the remote service.
pub fn fallback_external(text: &str) -> ExternalClassification {
    let lexicon = score_text(text);
    let rating = match lexicon.score() {
        s if s >= 3 => 5,
        s if s > 0 => 4,
        0 => 3,
        s if s > -3 => 2,
        _ => 1,
    };

    ExternalClassification::new(
        fallback_classification(text),
        rating,
        None,
        guess_category(text),
    )
}

fn mean_rating(items: &[FeedbackItem]) -> f64 {
    if items.is_empty() {
        return 3.0;
    }
    items
        .iter()
        .map(|i| clamp_rating(i.rating as i64) as f64)
        .sum::<f64>()
        / items.len() as f64
}

/// Mean star rating mapped onto 0-100 (1 star is 0, 5 stars is 100).
pub fn rating_score(items: &[FeedbackItem]) -> u8 {
    clamp_percent(((mean_rating(items) - 1.0) / 4.0 * 100.0).round() as i64)
}

/// Summarize a batch without the remote service.
pub fn fallback_bulk(items: &[FeedbackItem]) -> BulkReport {
    if items.is_empty() {
        return BulkReport::empty();
    }

    let total = items.len() as u32;
    let positive = items.iter().filter(|i| i.is_positive).count() as u32;
    let negative = total - positive;

    let average = mean_rating(items);
    let overall_score = rating_score(items);

    let positive_share = positive as f64 / total as f64;
    let overall_sentiment = if positive_share >= 0.6 {
        OverallSentiment::Positive
    } else if positive_share <= 0.4 {
        OverallSentiment::Negative
    } else {
        OverallSentiment::Mixed
    };

    let top_positive_points = collect_points(items.iter().filter(|i| i.is_positive), Sentiment::Positive);
    let top_negative_points = collect_points(items.iter().filter(|i| !i.is_positive), Sentiment::Negative);

    let mut breakdown: IndexMap<(FeedbackCategory, Sentiment), u32> = IndexMap::new();
    for item in items {
        let sentiment = if item.is_positive {
            Sentiment::Positive
        } else if item.rating <= 2 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };
        *breakdown
            .entry((guess_category(&item.message), sentiment))
            .or_insert(0) += 1;
    }

    let recommendations = recommendations_for(&breakdown);

    let category_breakdown = breakdown
        .into_iter()
        .map(|((category, sentiment), count)| CategoryCount {
            category,
            sentiment,
            count,
        })
        .collect();

    BulkReport {
        total_analyzed: total,
        overall_sentiment,
        overall_score,
        overall_summary: format!(
            "Analyzed {} feedback entries: {} positive and {} negative, average rating {:.1}/5.",
            total, positive, negative, average
        ),
        positive,
        negative,
        top_positive_points,
        top_negative_points,
        recommendations,
        category_breakdown,
        source: ReportSource::Heuristic,
    }
}

fn collect_points<'a>(
    items: impl Iterator<Item = &'a FeedbackItem>,
    sentiment: Sentiment,
) -> Vec<String> {
    let mut points: Vec<String> = Vec::new();
    for sentence in items.flat_map(|i| key_sentences(&i.message, sentiment)) {
        if !points.iter().any(|p| p.eq_ignore_ascii_case(&sentence)) {
            points.push(sentence);
        }
        if points.len() == MAX_POINTS {
            break;
        }
    }
    points
}

fn recommendations_for(breakdown: &IndexMap<(FeedbackCategory, Sentiment), u32>) -> Vec<String> {
    let mut negative: Vec<(FeedbackCategory, u32)> = breakdown
        .iter()
        .filter(|((_, s), _)| *s == Sentiment::Negative)
        .map(|((c, _), n)| (*c, *n))
        .collect();
    // Stable: ties keep first-seen order
    negative.sort_by(|a, b| b.1.cmp(&a.1));

    let mut recommendations: Vec<String> = negative
        .into_iter()
        .take(3)
        .map(|(category, _)| recommendation(category).to_string())
        .collect();

    if recommendations.is_empty() {
        recommendations.push("Keep doing what customers already appreciate.".to_string());
    }
    recommendations
}

fn recommendation(category: FeedbackCategory) -> &'static str {
    match category {
        FeedbackCategory::Service => "Review service speed and order handling at peak times.",
        FeedbackCategory::Quality => "Check product quality and consistency with the team.",
        FeedbackCategory::Price => "Revisit pricing or communicate value more clearly.",
        FeedbackCategory::Ambiance => "Look at cleanliness, noise and the overall atmosphere.",
        FeedbackCategory::Staff => "Follow up with staff on friendliness and attentiveness.",
        FeedbackCategory::Other => "Read the negative feedback in detail and follow up with customers.",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
