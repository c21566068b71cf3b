//! Wire types for the platform's JSON API.
//!
//! Every struct defaults missing fields so a sparse or slightly reshaped
//! payload still decodes; the normalizer decides what an absent value means.

use serde::Deserialize;
use xhs_core::NoteSummary;

/// Common `{success, code, msg, data}` wrapper around every API response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

pub type FeedResponse = ApiEnvelope<FeedData>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedData {
    pub items: Option<Vec<RawNoteItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawNoteItem {
    pub id: Option<String>,
    pub note_card: RawNoteCard,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawNoteCard {
    pub note_id: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub user: RawUser,
    pub interact_info: RawInteractInfo,
    pub image_list: Vec<RawImage>,
    pub video: Option<RawVideo>,
    pub tag_list: Vec<RawTag>,
    /// Publish time in epoch milliseconds.
    pub time: Option<i64>,
    pub ip_location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawUser {
    pub user_id: Option<String>,
    #[serde(alias = "nick_name")]
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawInteractInfo {
    pub liked_count: Option<RawCount>,
    pub collected_count: Option<RawCount>,
    pub comment_count: Option<RawCount>,
    pub share_count: Option<RawCount>,
}

/// Engagement counters arrive as integers or as display strings such as
/// `"1.2万"`; anything else is kept so decoding never fails on a counter.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
    Int(i64),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawImage {
    pub info_list: Vec<RawImageInfo>,
    pub url_default: Option<String>,
    pub url_pre: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawImageInfo {
    pub image_scene: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVideo {
    pub consumer: RawVideoConsumer,
    pub media: RawVideoMedia,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVideoConsumer {
    pub origin_video_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVideoMedia {
    pub stream: RawVideoStreams,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVideoStreams {
    pub h264: Vec<RawStream>,
    pub h265: Vec<RawStream>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStream {
    pub master_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTag {
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// User listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawUserNotesData {
    pub notes: Vec<RawUserNote>,
    pub cursor: Option<String>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawUserNote {
    pub note_id: Option<String>,
    pub xsec_token: Option<String>,
}

/// One page of a user's post listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserNotesPage {
    pub notes: Vec<NoteSummary>,
    /// Opaque cursor for the next page; empty when the upstream sent none.
    pub cursor: String,
    pub has_more: bool,
}

impl From<RawUserNotesData> for UserNotesPage {
    fn from(raw: RawUserNotesData) -> Self {
        let notes = raw
            .notes
            .into_iter()
            .map(|n| NoteSummary {
                note_id: n.note_id,
                xsec_token: n.xsec_token.unwrap_or_default(),
            })
            .collect();
        Self {
            notes,
            cursor: raw.cursor.unwrap_or_default(),
            has_more: raw.has_more,
        }
    }
}

// ---------------------------------------------------------------------------
// User profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawUserProfile {
    pub basic_info: RawBasicInfo,
    pub interact_info: RawProfileInteractInfo,
    /// Newer payloads report counters as a typed list instead of
    /// `interact_info`.
    pub interactions: Vec<RawInteraction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBasicInfo {
    pub nickname: Option<String>,
    pub red_id: Option<String>,
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProfileInteractInfo {
    pub followed_count: Option<RawCount>,
    pub liked_count: Option<RawCount>,
    pub note_count: Option<RawCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawInteraction {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub count: Option<RawCount>,
}
