//! Cosmetic rewards fired after every XP-granting event.
//!
//! The category is drawn uniformly from three options through a
//! [`RewardPicker`], so callers can pin the outcome. Rewards never touch
//! goal or user state.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::gamification::AwardSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    Quote,
    Celebration,
    Star,
}

impl RewardKind {
    pub const ALL: [RewardKind; 3] = [RewardKind::Quote, RewardKind::Celebration, RewardKind::Star];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub kind: RewardKind,
    pub title: String,
    pub message: String,
}

pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

pub const QUOTES: [Quote; 10] = [
    Quote {
        text: "The only way to do great work is to love what you do.",
        author: "Steve Jobs",
    },
    Quote {
        text: "Success is not final, failure is not fatal: It is the courage to continue that counts.",
        author: "Winston Churchill",
    },
    Quote {
        text: "Believe you can and you're halfway there.",
        author: "Theodore Roosevelt",
    },
    Quote {
        text: "It does not matter how slowly you go as long as you do not stop.",
        author: "Confucius",
    },
    Quote {
        text: "Quality is not an act, it is a habit.",
        author: "Aristotle",
    },
    Quote {
        text: "The future belongs to those who believe in the beauty of their dreams.",
        author: "Eleanor Roosevelt",
    },
    Quote {
        text: "Well done is better than well said.",
        author: "Benjamin Franklin",
    },
    Quote {
        text: "Small deeds done are better than great deeds planned.",
        author: "Peter Marshall",
    },
    Quote {
        text: "What we do every day matters more than what we do once in a while.",
        author: "Gretchen Rubin",
    },
    Quote {
        text: "Action is the foundational key to all success.",
        author: "Pablo Picasso",
    },
];

/// Randomness source for reward selection.
pub trait RewardPicker {
    /// Pick an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// PCG-backed picker; seeded for reproducible runs.
pub struct RandomRewards {
    rng: Mcg128Xsl64,
}

impl RandomRewards {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self { rng }
    }
}

impl Default for RandomRewards {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RewardPicker for RandomRewards {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Always picks the same index (clamped to the range).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedRewards(pub usize);

impl FixedRewards {
    pub fn kind(kind: RewardKind) -> Self {
        let index = RewardKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        Self(index)
    }
}

impl RewardPicker for FixedRewards {
    fn pick(&mut self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}

/// Draw exactly one reward for an XP-granting event.
pub fn choose_reward(picker: &mut dyn RewardPicker, source: AwardSource, xp: u64) -> Reward {
    let kind = RewardKind::ALL[picker.pick(RewardKind::ALL.len())];
    let what = match source {
        AwardSource::Task => "a task".to_string(),
        AwardSource::Milestone => "a milestone".to_string(),
        AwardSource::Timer => format!("a {xp}-minute focus session"),
    };

    match kind {
        RewardKind::Quote => {
            let quote = &QUOTES[picker.pick(QUOTES.len())];
            Reward {
                kind,
                title: format!("You completed {what}! 🎉"),
                message: format!("\"{}\" - {}", quote.text, quote.author),
            }
        }
        RewardKind::Celebration => Reward {
            kind,
            title: "Amazing work! 🎊".to_string(),
            message: format!("You completed {what} and earned {xp} XP!"),
        },
        RewardKind::Star => Reward {
            kind,
            title: "You earned a star! ⭐".to_string(),
            message: format!("Great job completing {what}!"),
        },
    }
}
