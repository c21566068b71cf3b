//! Normalization from raw platform payloads to [`xhs_core::NoteRecord`] and
//! [`xhs_core::UserProfile`].
//!
//! Normalization is total: absent fields become `None` or empty values, never
//! errors. The resolver has already decided whether a response is usable.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use xhs_core::config::DEFAULT_WEB_BASE_URL;
use xhs_core::{NoteRecord, NoteType, UserProfile};

use crate::target::{origin_of, NoteTarget};
use crate::types::{RawCount, RawImage, RawNoteItem, RawUserProfile, RawVideo};

/// CDN host serving watermark-free originals by `origin_video_key`.
pub const VIDEO_CDN_BASE: &str = "https://sns-video-bd.xhscdn.com";

const SCENE_CLEAN: &str = "WB_DFT";
const SCENE_PREVIEW: &str = "WB_PRV";

/// Platform local time (UTC+8), used when rendering publish timestamps.
const PLATFORM_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Normalizes one raw note into a [`NoteRecord`] stamped with `source_url`.
#[must_use]
pub fn normalize_note(raw: &RawNoteItem, source_url: &str) -> NoteRecord {
    let card = &raw.note_card;

    let note_id = non_empty(raw.id.as_deref())
        .or_else(|| non_empty(card.note_id.as_deref()))
        .or_else(|| NoteTarget::parse(source_url).ok().map(|t| t.note_id))
        .unwrap_or_default();

    let image_list: Vec<String> = card.image_list.iter().filter_map(clean_image_url).collect();

    let declared = NoteType::from_discriminator(card.note_type.as_deref());
    let video_addr = match declared {
        NoteType::Video => video_address(card.video.as_ref()),
        NoteType::Normal => None,
    };
    let note_type = if declared == NoteType::Video && video_addr.is_none() {
        tracing::warn!(
            note_id = %note_id,
            "video note carries no playable address; recording it as normal"
        );
        NoteType::Normal
    } else {
        declared
    };
    let video_cover = match note_type {
        NoteType::Video => image_list.first().cloned(),
        NoteType::Normal => None,
    };

    let user_id = card.user.user_id.clone().unwrap_or_default();
    let origin = origin_of(source_url).unwrap_or_else(|| DEFAULT_WEB_BASE_URL.to_owned());
    let home_url = format!("{origin}/user/profile/{user_id}");

    let interact = &card.interact_info;

    NoteRecord {
        note_id,
        note_url: source_url.to_owned(),
        title: card.title.clone().unwrap_or_default(),
        desc: card.desc.clone().unwrap_or_default(),
        note_type,
        image_list,
        video_cover,
        video_addr,
        user_id,
        nickname: card.user.nickname.clone().unwrap_or_default(),
        avatar: non_empty(card.user.avatar.as_deref()),
        home_url,
        liked_count: parse_count(interact.liked_count.as_ref()),
        collected_count: parse_count(interact.collected_count.as_ref()),
        comment_count: parse_count(interact.comment_count.as_ref()),
        share_count: parse_count(interact.share_count.as_ref()),
        tags: unique_tags(card.tag_list.iter().filter_map(|t| t.name.as_deref())),
        upload_time: format_upload_time(card.time),
        ip_location: non_empty(card.ip_location.as_deref()),
    }
}

/// Builds a [`UserProfile`] from the profile payload of `user_id`.
///
/// Counters come from `interact_info` when present and fall back to the
/// typed `interactions` list (`fans` for followers, `interaction` for likes).
#[must_use]
pub fn normalize_profile(user_id: &str, raw: &RawUserProfile) -> UserProfile {
    let interaction = |kind: &str| {
        raw.interactions
            .iter()
            .find(|i| i.kind.as_deref() == Some(kind))
            .map(|i| parse_count(i.count.as_ref()))
            .unwrap_or(0)
    };

    let info = &raw.interact_info;
    let followed_count = match &info.followed_count {
        Some(count) => parse_count(Some(count)),
        None => interaction("fans"),
    };
    let liked_count = match &info.liked_count {
        Some(count) => parse_count(Some(count)),
        None => interaction("interaction"),
    };

    UserProfile {
        user_id: user_id.to_owned(),
        nickname: non_empty(raw.basic_info.nickname.as_deref()),
        red_id: non_empty(raw.basic_info.red_id.as_deref()),
        desc: non_empty(raw.basic_info.desc.as_deref()),
        followed_count,
        liked_count,
        note_count: parse_count(info.note_count.as_ref()),
    }
}

/// Converts a raw engagement counter to an integer.
///
/// Accepts plain integers and display strings like `"1,234"`, `"3千"`,
/// `"1.2万"` or `"10万+"`. Negative or unparseable values yield `0`.
#[must_use]
pub fn parse_count(raw: Option<&RawCount>) -> u64 {
    match raw {
        Some(RawCount::Int(n)) => u64::try_from(*n).unwrap_or(0),
        Some(RawCount::Text(text)) => parse_count_text(text).unwrap_or(0),
        Some(RawCount::Other(serde_json::Value::Number(n))) => {
            n.as_u64().or_else(|| n.as_f64().and_then(round_non_negative)).unwrap_or(0)
        }
        Some(RawCount::Other(_)) | None => 0,
    }
}

fn parse_count_text(text: &str) -> Option<u64> {
    let cleaned: String = text
        .trim()
        .trim_end_matches('+')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    let (number, multiplier) = if let Some(n) = cleaned.strip_suffix('亿') {
        (n, 100_000_000.0)
    } else if let Some(n) = cleaned.strip_suffix(['万', 'w', 'W']) {
        (n, 10_000.0)
    } else if let Some(n) = cleaned.strip_suffix(['千', 'k', 'K']) {
        (n, 1_000.0)
    } else {
        (cleaned.as_str(), 1.0)
    };

    let value: f64 = number.parse().ok()?;
    round_non_negative(value * multiplier)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_non_negative(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.round() as u64)
}

/// Picks the watermark-free variant of one image, falling back to the
/// watermarked preview only when nothing else exists.
fn clean_image_url(image: &RawImage) -> Option<String> {
    let by_scene = |scene: &str| {
        image
            .info_list
            .iter()
            .find(|i| i.image_scene.as_deref() == Some(scene))
            .and_then(|i| non_empty(i.url.as_deref()))
    };
    let unlabelled = || {
        image
            .info_list
            .iter()
            .rev()
            .filter(|i| i.image_scene.as_deref() != Some(SCENE_PREVIEW))
            .find_map(|i| non_empty(i.url.as_deref()))
    };

    by_scene(SCENE_CLEAN)
        .or_else(|| non_empty(image.url_default.as_deref()))
        .or_else(unlabelled)
        .or_else(|| non_empty(image.url.as_deref()))
        .or_else(|| non_empty(image.url_pre.as_deref()))
        .or_else(|| by_scene(SCENE_PREVIEW))
}

fn video_address(video: Option<&RawVideo>) -> Option<String> {
    let video = video?;
    if let Some(key) = non_empty(video.consumer.origin_video_key.as_deref()) {
        return Some(format!("{VIDEO_CDN_BASE}/{key}"));
    }
    let streams = &video.media.stream;
    streams
        .h264
        .iter()
        .chain(streams.h265.iter())
        .find_map(|s| non_empty(s.master_url.as_deref()))
}

fn unique_tags<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .map(str::trim)
        .filter(|n| !n.is_empty() && seen.insert(*n))
        .map(str::to_owned)
        .collect()
}

fn format_upload_time(millis: Option<i64>) -> Option<String> {
    let millis = millis.filter(|m| *m > 0)?;
    let offset = FixedOffset::east_opt(PLATFORM_UTC_OFFSET_SECS)?;
    let utc = DateTime::from_timestamp_millis(millis)?;
    Some(
        utc.with_timezone(&offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
