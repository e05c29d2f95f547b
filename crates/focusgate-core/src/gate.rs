//! Justification gate.
//!
//! Classifies the free-text reason typed on a blocked page. The input is
//! lower-cased and checked for substrings, weak excuses first:
//!
//! 1. any weak-excuse term present → rejected as weak
//! 2. any valid-reason term present → accepted
//! 3. otherwise → rejected as unconvincing
//!
//! Substring matching means "chill" inside an otherwise serious sentence
//! still rejects it. The weak list always wins a tie.

use serde::{Deserialize, Serialize};

pub const WEAK_EXCUSES: &[&str] = &[
    "meme",
    "memes",
    "bored",
    "scroll",
    "just want",
    "fun",
    "wasting",
    "procrastinate",
    "procrastination",
    "chill",
    "random",
    "nothing",
    "entertainment",
    "pass time",
];

pub const VALID_REASONS: &[&str] = &[
    "coding",
    "tutorial",
    "work",
    "research",
    "study",
    "project",
    "assignment",
    "learn",
    "education",
    "school",
    "college",
    "university",
    "job",
    "career",
    "important",
    "urgent",
    "reference",
];

/// Why a justification was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rejection {
    /// Matched the weak-excuse lexicon.
    Weak,
    /// Matched neither lexicon.
    Unconvinced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "lowercase")]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }

    /// Reply shown under the prompt.
    pub fn message(self) -> &'static str {
        match self {
            Verdict::Accepted => "Valid reason! Unblocking...",
            Verdict::Rejected(Rejection::Weak) => "Scrolling memes is not a valid emergency.",
            Verdict::Rejected(Rejection::Unconvinced) => "Not convinced. Try again.",
        }
    }
}

/// Classify a justification.
pub fn evaluate(free_text: &str) -> Verdict {
    let text = free_text.to_lowercase();
    if WEAK_EXCUSES.iter().any(|term| text.contains(term)) {
        return Verdict::Rejected(Rejection::Weak);
    }
    if VALID_REASONS.iter().any(|term| text.contains(term)) {
        return Verdict::Accepted;
    }
    Verdict::Rejected(Rejection::Unconvinced)
}
