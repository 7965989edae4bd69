//! Wire shapes of the video platform's list responses
//!
//! Every field the pipeline reads is optional on the wire. Missing or malformed
//! values fall back to zero or an empty string so one odd record never spoils
//! its batch.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::humanize::VideoDuration;

/// `{"items": [...]}` envelope shared by all list endpoints
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub items: Vec<Value>,
}

/// `{"error": {"code": 403, "message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: SearchItemId,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    #[serde(default)]
    pub kind: String,
    pub video_id: Option<String>,
}

impl SearchItem {
    pub const VIDEO_KIND: &'static str = "youtube#video";

    /// Video id when this hit is a video (searches can also return channels)
    pub fn video_id(&self) -> Option<&str> {
        if self.id.kind != Self::VIDEO_KIND {
            return None;
        }
        self.id.video_id.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub content_details: ContentDetails,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Thumbnails {
    pub medium: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContentDetails {
    #[serde(default)]
    pub duration: String,
}

/// Counts arrive as decimal strings; hidden counts are simply absent
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default, deserialize_with = "lenient_count")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comment_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChannelItem {
    pub id: String,
    #[serde(default)]
    pub statistics: ChannelStatistics,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    #[serde(default, deserialize_with = "lenient_count")]
    pub subscriber_count: u64,
}

/// Accept `"123"`, `123` or anything else (as zero)
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Flattened statistics record for one video, as the fetch layer returns it
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    /// Raw RFC 3339 timestamp; validated when candidates are built
    pub published_at: String,
    pub duration_secs: u64,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub thumbnail: String,
}

impl From<VideoItem> for VideoRecord {
    fn from(item: VideoItem) -> Self {
        Self {
            video_id: item.id,
            title: item.snippet.title,
            channel_id: item.snippet.channel_id,
            channel_title: item.snippet.channel_title,
            published_at: item.snippet.published_at,
            duration_secs: VideoDuration::parse_lenient(&item.content_details.duration).as_secs(),
            views: item.statistics.view_count,
            likes: item.statistics.like_count,
            comments: item.statistics.comment_count,
            thumbnail: item
                .snippet
                .thumbnails
                .medium
                .map(|t| t.url)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_item_to_record() {
        let item: VideoItem = serde_json::from_value(json!({
            "id": "abc123",
            "snippet": {
                "title": "Hot video",
                "channelId": "UC1",
                "channelTitle": "Channel One",
                "publishedAt": "2024-05-01T10:00:00Z",
                "thumbnails": {"medium": {"url": "https://i.ytimg.com/vi/abc123/mqdefault.jpg"}}
            },
            "contentDetails": {"duration": "PT2M59S"},
            "statistics": {"viewCount": "100000", "likeCount": "2000", "commentCount": "300"}
        }))
        .unwrap();

        let record = VideoRecord::from(item);
        assert_eq!(record.video_id, "abc123");
        assert_eq!(record.channel_id, "UC1");
        assert_eq!(record.duration_secs, 179);
        assert_eq!(record.views, 100_000);
        assert_eq!(record.likes, 2_000);
        assert_eq!(record.comments, 300);
        assert!(record.thumbnail.ends_with("mqdefault.jpg"));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let item: VideoItem = serde_json::from_value(json!({
            "id": "bare",
            "statistics": {"viewCount": "12", "likeCount": "n/a"}
        }))
        .unwrap();

        let record = VideoRecord::from(item);
        assert_eq!(record.views, 12);
        assert_eq!(record.likes, 0);
        assert_eq!(record.comments, 0);
        assert_eq!(record.duration_secs, 0);
        assert_eq!(record.title, "");
        assert_eq!(record.thumbnail, "");
    }

    #[test]
    fn test_search_item_kind_filter() {
        let video: SearchItem = serde_json::from_value(json!({
            "id": {"kind": "youtube#video", "videoId": "v1"}
        }))
        .unwrap();
        let channel: SearchItem = serde_json::from_value(json!({
            "id": {"kind": "youtube#channel", "channelId": "UC1"}
        }))
        .unwrap();

        assert_eq!(video.video_id(), Some("v1"));
        assert_eq!(channel.video_id(), None);
    }

    #[test]
    fn test_channel_subscribers_numeric_or_string() {
        let a: ChannelItem =
            serde_json::from_value(json!({"id": "UC1", "statistics": {"subscriberCount": "2000000"}}))
                .unwrap();
        let b: ChannelItem =
            serde_json::from_value(json!({"id": "UC2", "statistics": {"subscriberCount": 15}}))
                .unwrap();
        let hidden: ChannelItem =
            serde_json::from_value(json!({"id": "UC3", "statistics": {"hiddenSubscriberCount": true}}))
                .unwrap();

        assert_eq!(a.statistics.subscriber_count, 2_000_000);
        assert_eq!(b.statistics.subscriber_count, 15);
        assert_eq!(hidden.statistics.subscriber_count, 0);
    }
}
