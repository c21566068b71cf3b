use serde_json::json;

use super::*;
use crate::types::FeedResponse;

const SOURCE_URL: &str =
    "https://www.xiaohongshu.com/explore/64f0c0a1000000001f03a1b2?xsec_token=tok&xsec_source=pc_user";

fn item_from(value: serde_json::Value) -> RawNoteItem {
    let resp: FeedResponse = serde_json::from_value(json!({
        "success": true,
        "data": { "items": [value] }
    }))
    .unwrap();
    resp.data.unwrap().items.unwrap().remove(0)
}

fn image(default: &str, preview: &str) -> serde_json::Value {
    json!({
        "info_list": [
            { "image_scene": "WB_PRV", "url": preview },
            { "image_scene": "WB_DFT", "url": default }
        ],
        "url_pre": preview,
        "url_default": default
    })
}

fn normal_note() -> serde_json::Value {
    json!({
        "id": "64f0c0a1000000001f03a1b2",
        "model_type": "note",
        "note_card": {
            "type": "normal",
            "title": "Weekend hike",
            "desc": "Trail notes #hiking",
            "user": {
                "user_id": "5ff0e6410000000001008400",
                "nickname": "hiker",
                "avatar": "https://sns-avatar.xhscdn.com/avatar/1.jpg"
            },
            "interact_info": {
                "liked_count": "1.2万",
                "collected_count": "3千",
                "comment_count": "1,234",
                "share_count": 7
            },
            "image_list": [
                image("https://sns-img.xhscdn.com/clean-1", "https://sns-img.xhscdn.com/wm-1"),
                image("https://sns-img.xhscdn.com/clean-2", "https://sns-img.xhscdn.com/wm-2")
            ],
            "tag_list": [
                { "id": "1", "name": "hiking" },
                { "id": "2", "name": "outdoors" },
                { "id": "3", "name": "hiking" }
            ],
            "time": 1_700_000_000_000_i64,
            "ip_location": "Zhejiang"
        }
    })
}

fn video_note() -> serde_json::Value {
    json!({
        "id": "65aa00000000000000000001",
        "note_card": {
            "type": "video",
            "title": "Sunrise timelapse",
            "user": { "user_id": "u2", "nickname": "filmer" },
            "image_list": [ image("https://sns-img.xhscdn.com/cover", "https://sns-img.xhscdn.com/cover-wm") ],
            "video": {
                "consumer": { "origin_video_key": "pre_post/1040g0cg30abc" },
                "media": { "stream": { "h264": [ { "master_url": "https://sns-video-hw.xhscdn.com/stream/1.mp4" } ] } }
            }
        }
    })
}

#[test]
fn normal_note_maps_every_field() {
    let record = normalize_note(&item_from(normal_note()), SOURCE_URL);

    assert_eq!(record.note_id, "64f0c0a1000000001f03a1b2");
    assert_eq!(record.note_url, SOURCE_URL);
    assert_eq!(record.title, "Weekend hike");
    assert_eq!(record.desc, "Trail notes #hiking");
    assert_eq!(record.note_type, NoteType::Normal);
    assert_eq!(
        record.image_list,
        vec![
            "https://sns-img.xhscdn.com/clean-1".to_owned(),
            "https://sns-img.xhscdn.com/clean-2".to_owned()
        ]
    );
    assert!(record.video_addr.is_none());
    assert!(record.video_cover.is_none());
    assert_eq!(record.user_id, "5ff0e6410000000001008400");
    assert_eq!(record.nickname, "hiker");
    assert_eq!(
        record.home_url,
        "https://www.xiaohongshu.com/user/profile/5ff0e6410000000001008400"
    );
    assert_eq!(record.liked_count, 12_000);
    assert_eq!(record.collected_count, 3_000);
    assert_eq!(record.comment_count, 1_234);
    assert_eq!(record.share_count, 7);
    assert_eq!(record.tags, vec!["hiking".to_owned(), "outdoors".to_owned()]);
    assert_eq!(record.upload_time.as_deref(), Some("2023-11-15 06:13:20"));
    assert_eq!(record.ip_location.as_deref(), Some("Zhejiang"));
}

#[test]
fn video_note_uses_origin_key_and_first_image_as_cover() {
    let record = normalize_note(&item_from(video_note()), SOURCE_URL);
    assert_eq!(record.note_type, NoteType::Video);
    assert_eq!(
        record.video_addr.as_deref(),
        Some("https://sns-video-bd.xhscdn.com/pre_post/1040g0cg30abc")
    );
    assert_eq!(record.video_cover.as_deref(), Some("https://sns-img.xhscdn.com/cover"));
    assert!(record.media_is_consistent());
}

#[test]
fn video_without_origin_key_falls_back_to_stream() {
    let mut raw = video_note();
    raw["note_card"]["video"]["consumer"] = json!({});
    let record = normalize_note(&item_from(raw), SOURCE_URL);
    assert_eq!(
        record.video_addr.as_deref(),
        Some("https://sns-video-hw.xhscdn.com/stream/1.mp4")
    );
}

#[test]
fn video_without_any_address_is_downgraded() {
    let mut raw = video_note();
    raw["note_card"]["video"] = json!({});
    let record = normalize_note(&item_from(raw), SOURCE_URL);
    assert_eq!(record.note_type, NoteType::Normal);
    assert!(record.video_addr.is_none());
    assert!(record.video_cover.is_none());
    assert!(record.media_is_consistent());
}

#[test]
fn missing_fields_normalize_to_empty_values() {
    let record = normalize_note(&item_from(json!({})), SOURCE_URL);
    // Falls back to the id in the source URL.
    assert_eq!(record.note_id, "64f0c0a1000000001f03a1b2");
    assert_eq!(record.note_type, NoteType::Normal);
    assert!(record.title.is_empty());
    assert!(record.image_list.is_empty());
    assert!(record.tags.is_empty());
    assert_eq!(record.liked_count, 0);
    assert!(record.avatar.is_none());
    assert!(record.upload_time.is_none());
    assert!(record.ip_location.is_none());
    assert_eq!(record.home_url, "https://www.xiaohongshu.com/user/profile/");
}

#[test]
fn normalization_is_deterministic() {
    let raw = item_from(normal_note());
    assert_eq!(normalize_note(&raw, SOURCE_URL), normalize_note(&raw, SOURCE_URL));
}

#[test]
fn home_url_follows_source_origin() {
    let record = normalize_note(&item_from(normal_note()), "http://127.0.0.1:9000/explore/abc");
    assert_eq!(
        record.home_url,
        "http://127.0.0.1:9000/user/profile/5ff0e6410000000001008400"
    );
}

#[test]
fn preview_image_is_used_only_as_last_resort() {
    let raw = item_from(json!({
        "note_card": {
            "image_list": [
                { "info_list": [ { "image_scene": "WB_PRV", "url": "https://img/wm" } ] },
                { "url_pre": "https://img/pre", "url": "https://img/plain" },
                { "info_list": [ { "image_scene": "CRD_WM_WEBP", "url": "https://img/other" } ] },
                {}
            ]
        }
    }));
    let record = normalize_note(&raw, SOURCE_URL);
    assert_eq!(
        record.image_list,
        vec![
            "https://img/wm".to_owned(),
            "https://img/plain".to_owned(),
            "https://img/other".to_owned()
        ]
    );
}

#[test]
fn parse_count_handles_display_forms() {
    let text = |s: &str| parse_count(Some(&RawCount::Text(s.to_owned())));
    assert_eq!(text("0"), 0);
    assert_eq!(text("999"), 999);
    assert_eq!(text("1,234"), 1_234);
    assert_eq!(text("1.2万"), 12_000);
    assert_eq!(text("10万+"), 100_000);
    assert_eq!(text("3千"), 3_000);
    assert_eq!(text("2.5w"), 25_000);
    assert_eq!(text("1亿"), 100_000_000);
    assert_eq!(text(""), 0);
    assert_eq!(text("lots"), 0);
    assert_eq!(text("-5"), 0);
    assert_eq!(parse_count(Some(&RawCount::Int(-3))), 0);
    assert_eq!(parse_count(Some(&RawCount::Other(json!(12.6)))), 13);
    assert_eq!(parse_count(Some(&RawCount::Other(json!(true)))), 0);
    assert_eq!(parse_count(None), 0);
}

#[test]
fn profile_prefers_interact_info() {
    let raw: RawUserProfile = serde_json::from_value(json!({
        "basic_info": { "nickname": "hiker", "red_id": "9527", "desc": "trails" },
        "interact_info": { "followed_count": "1.5万", "liked_count": 300, "note_count": 42 },
        "interactions": [ { "type": "fans", "count": "1" } ]
    }))
    .unwrap();
    let profile = normalize_profile("u1", &raw);
    assert_eq!(profile.user_id, "u1");
    assert_eq!(profile.nickname.as_deref(), Some("hiker"));
    assert_eq!(profile.red_id.as_deref(), Some("9527"));
    assert_eq!(profile.followed_count, 15_000);
    assert_eq!(profile.liked_count, 300);
    assert_eq!(profile.note_count, 42);
}

#[test]
fn profile_falls_back_to_interactions_list() {
    let raw: RawUserProfile = serde_json::from_value(json!({
        "basic_info": { "nickname": "" },
        "interactions": [
            { "type": "follows", "count": "10" },
            { "type": "fans", "count": "2千" },
            { "type": "interaction", "count": "8万" }
        ]
    }))
    .unwrap();
    let profile = normalize_profile("u1", &raw);
    assert!(profile.nickname.is_none());
    assert_eq!(profile.followed_count, 2_000);
    assert_eq!(profile.liked_count, 80_000);
    assert_eq!(profile.note_count, 0);
}
