use super::stream_info::StreamInfo;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Normalized description of a resolved asset, ready for the downloader.
///
/// # Fields
///
/// * `id` - Opaque asset id returned by the API
/// * `display_id` - The slug taken from the page URL
/// * `title` - Asset name, surrounding whitespace removed
/// * `description` - Optional asset description
/// * `formats` - Playable variants ordered worst to best
/// * `thumbnail` - Optional preview image URL
/// * `timestamp` - Start of the content as epoch seconds
/// * `duration` - Seconds between content start and end, only when both are known
///
/// # Examples
///
/// ```rust
/// use sportdeutschland_parser::media::{MediaDescriptor, StreamFormat, StreamInfo};
///
/// let media = MediaDescriptor {
///     id: "5318cac0275701382770543d7edaf0a0".to_string(),
///     display_id: "badminton/finals".to_string(),
///     title: "Finals".to_string(),
///     description: None,
///     formats: vec![StreamInfo::direct("https://example.com/a.mp4", StreamFormat::Mp4)],
///     thumbnail: None,
///     timestamp: None,
///     duration: None,
/// };
/// assert!(media.best_format().is_some());
/// ```
pub struct MediaDescriptor {
    pub id: String,
    pub display_id: String,
    pub title: String,
    pub description: Option<String>,
    pub formats: Vec<StreamInfo>,
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl MediaDescriptor {
    /// Formats are kept sorted worst to best, so the best one is last.
    pub fn best_format(&self) -> Option<&StreamInfo> {
        self.formats.last()
    }
}
