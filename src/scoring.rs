//! Hotness scoring
//!
//! A bounded 0-100 score built from four capped components:
//!
//! | component  | cap | grows with                         |
//! |------------|-----|------------------------------------|
//! | velocity   | 40  | views per hour since publish       |
//! | engagement | 30  | (likes + 2 * comments) / views     |
//! | views      | 20  | absolute views                     |
//! | subscriber | 10  | views relative to channel size     |

use chrono::{DateTime, Utc};

use crate::results::Candidate;

const VELOCITY_WEIGHT: f64 = 40.0;
const ENGAGEMENT_WEIGHT: f64 = 30.0;
const VIEWS_WEIGHT: f64 = 20.0;
const SUBSCRIBER_WEIGHT: f64 = 10.0;

/// Views per hour that earns the full velocity component
const VELOCITY_SATURATION: f64 = 10_000.0;
/// Absolute views that earn the full views component
const VIEWS_SATURATION: f64 = 1_000_000.0;
/// Subscriber component for channels with a hidden or zero count
const NEUTRAL_SUBSCRIBER_SCORE: f64 = 5.0;
/// Floor on video age so brand-new uploads do not divide by zero
const MIN_HOURS_SINCE: f64 = 0.1;

const MAX_SCORE: f64 = 100.0;

/// Raw signals a score is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub subscribers: u64,
    pub published_at: DateTime<Utc>,
}

impl From<&Candidate> for Signals {
    fn from(candidate: &Candidate) -> Self {
        Self {
            views: candidate.views,
            likes: candidate.likes,
            comments: candidate.comments,
            subscribers: candidate.subscribers,
            published_at: candidate.published_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub hours_since: f64,
    pub velocity: f64,
    pub velocity_score: f64,
    pub engagement_score: f64,
    pub views_score: f64,
    pub sub_score: f64,
    /// Component sum rounded to one decimal, clamped to [0, 100]
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the score of one video as of `now`
    pub fn score(&self, signals: &Signals, now: DateTime<Utc>) -> ScoreBreakdown {
        let views = signals.views as f64;

        let elapsed_hours = (now - signals.published_at).num_milliseconds() as f64 / 3_600_000.0;
        let hours_since = elapsed_hours.max(MIN_HOURS_SINCE);

        let velocity = views / hours_since;
        let velocity_score =
            (velocity / VELOCITY_SATURATION * VELOCITY_WEIGHT).clamp(0.0, VELOCITY_WEIGHT);

        let interactions = signals.likes as f64 + 2.0 * signals.comments as f64;
        let engagement = interactions / views.max(1.0);
        let engagement_score =
            (engagement * 100.0 * ENGAGEMENT_WEIGHT).clamp(0.0, ENGAGEMENT_WEIGHT);

        let views_score = (views / VIEWS_SATURATION * VIEWS_WEIGHT).clamp(0.0, VIEWS_WEIGHT);

        let sub_score = if signals.subscribers > 0 {
            (views / signals.subscribers as f64 * 2.0).clamp(0.0, SUBSCRIBER_WEIGHT)
        } else {
            NEUTRAL_SUBSCRIBER_SCORE
        };

        let sum = velocity_score + engagement_score + views_score + sub_score;
        let total = round1(sum).clamp(0.0, MAX_SCORE);

        ScoreBreakdown {
            hours_since,
            velocity,
            velocity_score,
            engagement_score,
            views_score,
            sub_score,
            total,
        }
    }

    /// Score every candidate in place
    pub fn apply(&self, candidates: &mut [Candidate], now: DateTime<Utc>) {
        for candidate in candidates.iter_mut() {
            let breakdown = self.score(&Signals::from(&*candidate), now);
            candidate.apply_score(&breakdown);
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
