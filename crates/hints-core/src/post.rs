use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::platform::Platform;

/// A publish or comment time exactly as the backend reported it.
///
/// Platforms disagree on representation: ISO strings, digit strings, unix
/// seconds and unix milliseconds all occur, and the field may be missing.
/// Normalization to epoch milliseconds lives in `hints_engine::timestamp`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    #[default]
    Missing,
    Number(serde_json::Number),
    Text(String),
}

impl TimeValue {
    /// Textual form used by exports; empty for a missing value.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            TimeValue::Missing => String::new(),
            TimeValue::Number(n) => n.to_string(),
            TimeValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for TimeValue {
    fn from(s: &str) -> Self {
        TimeValue::Text(s.to_string())
    }
}

impl From<i64> for TimeValue {
    fn from(n: i64) -> Self {
        TimeValue::Number(n.into())
    }
}

impl From<DateTime<Utc>> for TimeValue {
    fn from(dt: DateTime<Utc>) -> Self {
        TimeValue::Text(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub platform: Platform,
    // Extended fields, mostly populated for commenters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sec_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_location: Option<String>,
}

impl Author {
    /// Display name, falling back to the id when the platform returned no name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.author_name.trim().is_empty() {
            &self.author_id
        } else {
            &self.author_name
        }
    }
}

/// One scraped item (note, video, article) from a platform.
///
/// Identity is `(platform, post_id)`; see [`Post::key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub platform: Platform,
    pub post_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub publish_time: TimeValue,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub share_count: u64,
    #[serde(default)]
    pub collect_count: Option<u64>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Platform-specific payload; may embed a `comments` array.
    #[serde(default)]
    pub platform_data: Map<String, Value>,
}

/// Coarse content classification used by analytics and search options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Video,
    ImageText,
    Link,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Video, ContentType::ImageText, ContentType::Link];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::ImageText => "image_text",
            ContentType::Link => "link",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(ContentType::Video),
            "image_text" => Ok(ContentType::ImageText),
            "link" => Ok(ContentType::Link),
            other => Err(format!("unknown content type '{other}'")),
        }
    }
}

impl Post {
    /// Composite key `"<platform>-<post_id>"` used for merging and selection.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}-{}", self.platform.code(), self.post_id)
    }

    /// `video` if a video URL is present, `image_text` with at least one image, else `link`.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        if self.video_url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
            ContentType::Video
        } else if !self.image_urls.is_empty() {
            ContentType::ImageText
        } else {
            ContentType::Link
        }
    }

    /// Comments the backend embedded under `platform_data.comments`.
    ///
    /// Entries that do not parse as a [`Comment`] are skipped.
    #[must_use]
    pub fn embedded_comments(&self) -> Vec<Comment> {
        let Some(Value::Array(items)) = self.platform_data.get("comments") else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| serde_json::from_value::<Comment>(item.clone()).ok())
            .collect()
    }
}

/// A comment under a post, either embedded in the post payload or fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub comment_time: TimeValue,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
    #[serde(default)]
    pub sub_comment_count: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn make_post(video: Option<&str>, images: &[&str]) -> Post {
        Post {
            platform: Platform::Douyin,
            post_id: "7301".to_string(),
            title: "Cat video".to_string(),
            content: "so cute".to_string(),
            author: Author {
                author_id: "u1".to_string(),
                author_name: "Alice".to_string(),
                platform: Platform::Douyin,
                ..Author::default()
            },
            publish_time: TimeValue::from("2024-01-02T08:00:00Z"),
            like_count: 10,
            comment_count: 2,
            share_count: 1,
            collect_count: None,
            url: "https://www.douyin.com/video/7301".to_string(),
            image_urls: images.iter().map(|s| (*s).to_string()).collect(),
            video_url: video.map(str::to_string),
            platform_data: Map::new(),
        }
    }

    #[test]
    fn key_joins_platform_and_id() {
        assert_eq!(make_post(None, &[]).key(), "dy-7301");
    }

    #[test]
    fn content_type_prefers_video() {
        let post = make_post(Some("https://v.example/1.mp4"), &["a.jpg"]);
        assert_eq!(post.content_type(), ContentType::Video);
    }

    #[test]
    fn content_type_image_text_when_images_only() {
        assert_eq!(make_post(None, &["a.jpg"]).content_type(), ContentType::ImageText);
    }

    #[test]
    fn content_type_blank_video_url_is_ignored() {
        assert_eq!(make_post(Some("  "), &[]).content_type(), ContentType::Link);
    }

    #[test]
    fn deserializes_backend_shape_with_defaults() {
        let post: Post = serde_json::from_value(json!({
            "platform": "xhs",
            "post_id": "abc",
            "author": { "author_id": "u9", "author_name": "Bob", "platform": "xhs" },
            "publish_time": 1_704_153_600
        }))
        .expect("post should parse");
        assert_eq!(post.platform, Platform::Xhs);
        assert_eq!(post.like_count, 0);
        assert!(post.collect_count.is_none());
        assert_eq!(post.publish_time, TimeValue::from(1_704_153_600_i64));
        assert!(post.platform_data.is_empty());
    }

    #[test]
    fn time_value_parses_each_representation() {
        let values: Vec<TimeValue> =
            serde_json::from_str(r#"[null, 1700000000, 1.5, "2024-01-01"]"#).unwrap();
        assert_eq!(values[0], TimeValue::Missing);
        assert!(matches!(values[1], TimeValue::Number(_)));
        assert!(matches!(values[2], TimeValue::Number(_)));
        assert_eq!(values[3], TimeValue::from("2024-01-01"));
        assert_eq!(values[1].as_text(), "1700000000");
        assert_eq!(values[0].as_text(), "");
    }

    #[test]
    fn embedded_comments_skip_malformed_entries() {
        let mut post = make_post(None, &[]);
        post.platform_data.insert(
            "comments".to_string(),
            json!([
                { "comment_id": "c1", "content": "nice", "author": { "author_id": "u2", "author_name": "Carol" } },
                { "no_id": true },
                "garbage"
            ]),
        );
        let comments = post.embedded_comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment_id, "c1");
        assert_eq!(comments[0].author.display_name(), "Carol");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let author = Author {
            author_id: "u7".to_string(),
            ..Author::default()
        };
        assert_eq!(author.display_name(), "u7");
    }
}
