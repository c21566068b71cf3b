use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which persistence sinks run for a batch. The JSON snapshot is written in
/// every mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveMode {
    #[default]
    All,
    Excel,
    Media,
    MediaVideo,
    MediaImage,
}

impl SaveMode {
    pub const ALL_TOKENS: [&'static str; 5] =
        ["all", "excel", "media", "media-video", "media-image"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Excel => "excel",
            Self::Media => "media",
            Self::MediaVideo => "media-video",
            Self::MediaImage => "media-image",
        }
    }

    /// Whether the tabular export runs.
    #[must_use]
    pub fn writes_table(self) -> bool {
        matches!(self, Self::All | Self::Excel)
    }

    /// Whether cover and video assets of video posts are downloaded.
    #[must_use]
    pub fn downloads_video(self) -> bool {
        matches!(self, Self::All | Self::Media | Self::MediaVideo)
    }

    /// Whether gallery images of normal posts are downloaded.
    #[must_use]
    pub fn downloads_images(self) -> bool {
        matches!(self, Self::All | Self::Media | Self::MediaImage)
    }

    #[must_use]
    pub fn downloads_media(self) -> bool {
        self.downloads_video() || self.downloads_images()
    }
}

impl std::fmt::Display for SaveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "excel" => Ok(Self::Excel),
            "media" => Ok(Self::Media),
            "media-video" => Ok(Self::MediaVideo),
            "media-image" => Ok(Self::MediaImage),
            other => Err(format!(
                "unknown save mode \"{other}\"; expected one of: {}",
                Self::ALL_TOKENS.join(", ")
            )),
        }
    }
}
