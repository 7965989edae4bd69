//! Scored candidates of one completed search
//!
//! A [`ResultSet`] is produced once per search and replaces the previous one in
//! the session. It is only ever re-ordered or projected, never edited. Every
//! re-order starts again from fetch order, so ties always fall back to it.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::platform::VideoRecord;
use crate::regions::{self, Locale};
use crate::scoring::ScoreBreakdown;

/// Videos at or below this length are Shorts
pub const SHORTS_DURATION_LIMIT_SECS: u64 = 180;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, video_id)
}

/// One video under consideration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
    pub duration_secs: u64,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub thumbnail: String,
    /// Region code, `GLOBAL` or `UNKNOWN`
    pub origin_region: String,

    pub subscribers: u64,
    pub hours_since: f64,
    pub velocity: f64,
    pub score: f64,
}

impl Candidate {
    /// Build from a raw record; `None` when the publish time is unparseable
    pub fn from_record(record: VideoRecord, origin_region: impl Into<String>) -> Option<Self> {
        let published_at = DateTime::parse_from_rfc3339(&record.published_at)
            .ok()?
            .with_timezone(&Utc);

        Some(Self {
            video_id: record.video_id,
            title: record.title,
            channel_id: record.channel_id,
            channel_title: record.channel_title,
            published_at,
            duration_secs: record.duration_secs,
            views: record.views,
            likes: record.likes,
            comments: record.comments,
            thumbnail: record.thumbnail,
            origin_region: origin_region.into(),
            subscribers: 0,
            hours_since: 0.0,
            velocity: 0.0,
            score: 0.0,
        })
    }

    pub fn apply_score(&mut self, breakdown: &ScoreBreakdown) {
        self.hours_since = breakdown.hours_since;
        self.velocity = breakdown.velocity;
        self.score = breakdown.total;
    }

    pub fn format(&self, shorts_threshold_secs: u64) -> VideoFormat {
        VideoFormat::classify(self.duration_secs, shorts_threshold_secs)
    }

    pub fn watch_url(&self) -> String {
        watch_url(&self.video_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoFormat {
    Shorts,
    Standard,
}

impl VideoFormat {
    pub fn classify(duration_secs: u64, shorts_threshold_secs: u64) -> Self {
        if duration_secs <= shorts_threshold_secs {
            VideoFormat::Shorts
        } else {
            VideoFormat::Standard
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (VideoFormat::Shorts, _) => "Shorts",
            (VideoFormat::Standard, Locale::En) => "standard",
            (VideoFormat::Standard, Locale::Ko) => "일반",
        }
    }
}

/// Ordering applied to a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Highest score first
    #[default]
    Score,
    /// Most views first
    Views,
    /// Fastest growing first
    Velocity,
    /// Newest first
    Recent,
}

impl SortKey {
    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        match self {
            SortKey::Score => b.score.total_cmp(&a.score),
            SortKey::Views => b.views.cmp(&a.views),
            SortKey::Velocity => b.velocity.total_cmp(&a.velocity),
            SortKey::Recent => a.hours_since.total_cmp(&b.hours_since),
        }
    }
}

/// Export-ready projection of a candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub rank: usize,
    pub title: String,
    pub channel: String,
    pub search_country: String,
    pub format: String,
    pub views: u64,
    pub likes: u64,
    pub score: f64,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// As returned by the aggregator
    fetched: Vec<Candidate>,
    /// Current display order
    candidates: Vec<Candidate>,
}

impl ResultSet {
    /// `candidates` must be in fetch order
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            fetched: candidates.clone(),
            candidates,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Stable sort of the fetch-ordered candidates; ties keep fetch order
    /// whatever order was applied before
    pub fn sort_by(&mut self, key: SortKey) {
        let mut sorted = self.fetched.clone();
        sorted.sort_by(|a, b| key.compare(a, b));
        self.candidates = sorted;
    }

    pub fn project(&self, locale: Locale, shorts_threshold_secs: u64) -> Vec<ExportRow> {
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, c)| ExportRow {
                rank: i + 1,
                title: c.title.clone(),
                channel: c.channel_title.clone(),
                search_country: regions::display_name(&c.origin_region, locale),
                format: c.format(shorts_threshold_secs).label(locale).to_string(),
                views: c.views,
                likes: c.likes,
                score: c.score,
                url: c.watch_url(),
            })
            .collect()
    }
}

impl IntoIterator for ResultSet {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}
