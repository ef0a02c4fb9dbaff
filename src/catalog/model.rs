//! Track records and the JSON shapes returned by the catalog proxy.
//!
//! The proxy reshapes video-platform responses into `{ videos: [...] }`
//! lists and `{ video: {...} }` details. Titles and channel names arrive
//! HTML-encoded and are decoded once here, so everything downstream works
//! with display-ready text.

use std::time::Duration;

use serde::Deserialize;

/// A playable music video.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Platform-specific video id.
    pub id: String,
    pub title: String,
    /// Explicit artist, when the catalog knows one.
    pub artist: Option<String>,
    pub channel_title: String,
    /// Thumbnail URL.
    pub thumbnail: String,
    /// Known once the catalog or the player reports it.
    pub duration: Option<Duration>,
    pub description: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub published_at: Option<String>,
}

impl Track {
    /// Create a track with only the fields every catalog entry carries.
    pub fn new(id: impl Into<String>, title: impl Into<String>, channel_title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: None,
            channel_title: channel_title.into(),
            thumbnail: String::new(),
            duration: None,
            description: None,
            view_count: None,
            like_count: None,
            published_at: None,
        }
    }

    #[cfg(test)]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// The identity used to group tracks by artist: the artist field, falling
    /// back to the channel name.
    pub fn artist_key(&self) -> &str {
        self.artist
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(self.channel_title.trim())
    }

    /// `Channel - Title`, or just the title when the channel is blank.
    pub fn display(&self) -> String {
        let who = self.artist_key();
        if who.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", who, self.title)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoDto {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub duration: Option<String>,
    // The platform sends counts as strings; accept plain numbers too.
    #[serde(default)]
    pub view_count: Option<serde_json::Value>,
    #[serde(default)]
    pub like_count: Option<serde_json::Value>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoList {
    #[serde(default)]
    pub videos: Vec<VideoDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoDetails {
    pub video: VideoDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

impl From<VideoDto> for Track {
    fn from(dto: VideoDto) -> Self {
        Self {
            id: dto.id,
            title: decode_html(&dto.title),
            artist: dto
                .artist
                .map(|a| decode_html(&a))
                .filter(|a| !a.trim().is_empty()),
            channel_title: decode_html(&dto.channel_title),
            thumbnail: dto.thumbnail,
            duration: dto.duration.as_deref().and_then(parse_iso8601_duration),
            description: dto.description.map(|d| decode_html(&d)),
            view_count: dto.view_count.as_ref().and_then(parse_count),
            like_count: dto.like_count.as_ref().and_then(parse_count),
            published_at: dto.published_at,
        }
    }
}

/// Decode HTML entities (`&amp;`, `&#39;`, ...) into plain text.
pub fn decode_html(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

fn parse_count(v: &serde_json::Value) -> Option<u64> {
    match v {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse an ISO-8601 duration such as `PT3M30S` or `P1DT2H`.
///
/// Returns `None` for anything that is not a well-formed day/time duration
/// (years, months and weeks are not used by the platform and are rejected).
pub fn parse_iso8601_duration(s: &str) -> Option<Duration> {
    let rest = s.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let mut secs: u64 = 0;
    let mut in_time = false;
    let mut digits = String::new();
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            'T' if !in_time && digits.is_empty() => in_time = true,
            '0'..='9' => digits.push(c),
            unit => {
                let n: u64 = digits.parse().ok()?;
                digits.clear();
                let scale = match (in_time, unit) {
                    (false, 'D') => 86_400,
                    (true, 'H') => 3_600,
                    (true, 'M') => 60,
                    (true, 'S') => 1,
                    _ => return None,
                };
                secs = secs.checked_add(n.checked_mul(scale)?)?;
                saw_component = true;
            }
        }
    }

    if !digits.is_empty() || !saw_component {
        return None;
    }
    Some(Duration::from_secs(secs))
}
