use serde::{Deserialize, Serialize};

/// Post format as reported by the platform's type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    /// Image gallery post.
    #[default]
    Normal,
    Video,
}

impl NoteType {
    /// Maps the raw discriminator to a [`NoteType`]. Anything other than
    /// `"video"` (including an absent value) is a gallery post.
    #[must_use]
    pub fn from_discriminator(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("video") => Self::Video,
            _ => Self::Normal,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for NoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal entry from a user's post listing.
///
/// `note_id` is `None` when the upstream entry was unusable; such entries are
/// recorded as failures by the batch aggregator rather than dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub note_id: Option<String>,
    /// Capability token required by the detail endpoint. Empty when the
    /// listing did not carry one.
    pub xsec_token: String,
}

impl NoteSummary {
    #[must_use]
    pub fn new(note_id: impl Into<String>, xsec_token: impl Into<String>) -> Self {
        Self {
            note_id: Some(note_id.into()),
            xsec_token: xsec_token.into(),
        }
    }

    /// Returns the note id when it is present and non-blank.
    #[must_use]
    pub fn usable_id(&self) -> Option<&str> {
        self.note_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// A post normalized into the platform-agnostic canonical schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub note_id: String,
    /// The URL the record was resolved from.
    pub note_url: String,
    pub title: String,
    pub desc: String,
    pub note_type: NoteType,
    /// Watermark-free image URLs in display order.
    pub image_list: Vec<String>,
    pub video_cover: Option<String>,
    /// Present iff `note_type == Video`.
    pub video_addr: Option<String>,
    pub user_id: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub home_url: String,
    pub liked_count: u64,
    pub collected_count: u64,
    pub comment_count: u64,
    pub share_count: u64,
    /// Topic tags, de-duplicated in first-seen order.
    pub tags: Vec<String>,
    /// Publish time as `YYYY-MM-DD HH:MM:SS` (UTC+8).
    pub upload_time: Option<String>,
    pub ip_location: Option<String>,
}

impl NoteRecord {
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.note_type == NoteType::Video
    }

    /// `true` when the `video_addr ⇔ video` pairing holds for this record.
    #[must_use]
    pub fn media_is_consistent(&self) -> bool {
        let has_addr = self.video_addr.as_deref().is_some_and(|s| !s.is_empty());
        self.is_video() == has_addr
    }
}

/// Public profile of the user whose posts are being crawled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub nickname: Option<String>,
    /// Display handle shown on the profile page.
    pub red_id: Option<String>,
    pub desc: Option<String>,
    pub followed_count: u64,
    /// Likes and collects aggregated across all of the user's posts.
    pub liked_count: u64,
    pub note_count: u64,
}

impl UserProfile {
    /// Default base name for output artifacts: `<nickname>_<user_id>` when a
    /// nickname is known, otherwise the bare user id.
    #[must_use]
    pub fn output_name(&self) -> String {
        match self.nickname.as_deref().map(str::trim) {
            Some(nick) if !nick.is_empty() => format!("{nick}_{}", self.user_id),
            _ => self.user_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(note_type: NoteType, video_addr: Option<&str>) -> NoteRecord {
        NoteRecord {
            note_id: "64f0c0a1000000001f03a1b2".to_string(),
            note_url: "https://www.xiaohongshu.com/explore/64f0c0a1000000001f03a1b2".to_string(),
            title: "Weekend hike".to_string(),
            desc: String::new(),
            note_type,
            image_list: Vec::new(),
            video_cover: None,
            video_addr: video_addr.map(str::to_string),
            user_id: "5a1b".to_string(),
            nickname: "hiker".to_string(),
            avatar: None,
            home_url: "https://www.xiaohongshu.com/user/profile/5a1b".to_string(),
            liked_count: 0,
            collected_count: 0,
            comment_count: 0,
            share_count: 0,
            tags: Vec::new(),
            upload_time: None,
            ip_location: None,
        }
    }

    #[test]
    fn note_type_from_discriminator_defaults_to_normal() {
        assert_eq!(NoteType::from_discriminator(None), NoteType::Normal);
        assert_eq!(NoteType::from_discriminator(Some("")), NoteType::Normal);
        assert_eq!(NoteType::from_discriminator(Some("normal")), NoteType::Normal);
        assert_eq!(NoteType::from_discriminator(Some("video")), NoteType::Video);
        assert_eq!(NoteType::from_discriminator(Some(" Video ")), NoteType::Video);
    }

    #[test]
    fn note_type_serializes_lowercase() {
        let json = serde_json::to_string(&NoteType::Video).unwrap();
        assert_eq!(json, "\"video\"");
    }

    #[test]
    fn usable_id_rejects_blank_ids() {
        let blank = NoteSummary {
            note_id: Some("  ".to_string()),
            xsec_token: String::new(),
        };
        assert!(blank.usable_id().is_none());
        assert!(NoteSummary::default().usable_id().is_none());
        assert_eq!(NoteSummary::new("abc", "").usable_id(), Some("abc"));
    }

    #[test]
    fn media_consistency_requires_addr_iff_video() {
        assert!(make_record(NoteType::Video, Some("https://v/x.mp4")).media_is_consistent());
        assert!(make_record(NoteType::Normal, None).media_is_consistent());
        assert!(!make_record(NoteType::Video, None).media_is_consistent());
        assert!(!make_record(NoteType::Video, Some("")).media_is_consistent());
        assert!(!make_record(NoteType::Normal, Some("https://v/x.mp4")).media_is_consistent());
    }

    #[test]
    fn output_name_prefers_nickname() {
        let mut profile = UserProfile {
            user_id: "674cc72b000000001d02e831".to_string(),
            nickname: Some("小红".to_string()),
            ..UserProfile::default()
        };
        assert_eq!(profile.output_name(), "小红_674cc72b000000001d02e831");

        profile.nickname = Some("   ".to_string());
        assert_eq!(profile.output_name(), "674cc72b000000001d02e831");

        profile.nickname = None;
        assert_eq!(profile.output_name(), "674cc72b000000001d02e831");
    }
}
