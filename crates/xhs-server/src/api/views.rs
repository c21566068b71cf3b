//! Response shapes for post data. Field names differ from [`NoteRecord`]:
//! media is grouped under `images`/`video`, author fields under `user`, and
//! engagement counts under `stats`.

use serde::Serialize;
use xhs_core::{BatchResult, FailedItem, NoteRecord};

#[derive(Debug, Serialize)]
pub(super) struct PostView {
    note_id: String,
    note_url: String,
    title: String,
    desc: String,
    note_type: &'static str,
    images: Vec<String>,
    video: Option<VideoView>,
    user: AuthorView,
    stats: StatsView,
    tags: Vec<String>,
    upload_time: Option<String>,
    ip_location: Option<String>,
}

#[derive(Debug, Serialize)]
struct VideoView {
    cover: Option<String>,
    url: String,
}

#[derive(Debug, Serialize)]
struct AuthorView {
    user_id: String,
    nickname: String,
    avatar: Option<String>,
    home_url: String,
}

#[derive(Debug, Serialize)]
struct StatsView {
    liked_count: u64,
    collected_count: u64,
    comment_count: u64,
    share_count: u64,
}

impl From<NoteRecord> for PostView {
    fn from(record: NoteRecord) -> Self {
        let video = record
            .video_addr
            .filter(|addr| !addr.is_empty())
            .map(|url| VideoView {
                cover: record.video_cover,
                url,
            });

        Self {
            note_id: record.note_id,
            note_url: record.note_url,
            title: record.title,
            desc: record.desc,
            note_type: record.note_type.as_str(),
            images: record.image_list,
            video,
            user: AuthorView {
                user_id: record.user_id,
                nickname: record.nickname,
                avatar: record.avatar,
                home_url: record.home_url,
            },
            stats: StatsView {
                liked_count: record.liked_count,
                collected_count: record.collected_count,
                comment_count: record.comment_count,
                share_count: record.share_count,
            },
            tags: record.tags,
            upload_time: record.upload_time,
            ip_location: record.ip_location,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct FailureView {
    identifier: String,
    reason: String,
}

impl From<FailedItem> for FailureView {
    fn from(item: FailedItem) -> Self {
        Self {
            reason: item.reason(),
            identifier: item.identifier,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct BatchView {
    total: usize,
    succeeded: usize,
    failed: usize,
    posts: Vec<PostView>,
    failures: Vec<FailureView>,
}

impl From<BatchResult> for BatchView {
    fn from(result: BatchResult) -> Self {
        Self {
            total: result.total,
            succeeded: result.succeeded_count(),
            failed: result.failed_count(),
            posts: result.successful.into_iter().map(PostView::from).collect(),
            failures: result.failed.into_iter().map(FailureView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xhs_core::{ItemError, NoteType};

    fn record(note_type: NoteType, video_addr: Option<&str>) -> NoteRecord {
        NoteRecord {
            note_id: "64f0a1".to_string(),
            note_url: "https://www.xiaohongshu.com/explore/64f0a1".to_string(),
            title: "Weekend in Dali".to_string(),
            desc: "lake views".to_string(),
            note_type,
            image_list: vec!["https://ci.xiaohongshu.com/a".to_string()],
            video_cover: video_addr.map(|_| "https://ci.xiaohongshu.com/a".to_string()),
            video_addr: video_addr.map(str::to_owned),
            user_id: "5f1a".to_string(),
            nickname: "traveler".to_string(),
            avatar: None,
            home_url: "https://www.xiaohongshu.com/user/profile/5f1a".to_string(),
            liked_count: 12_000,
            collected_count: 3,
            comment_count: 4,
            share_count: 5,
            tags: vec!["dali".to_string()],
            upload_time: Some("2024-01-02 03:04:05".to_string()),
            ip_location: Some("Yunnan".to_string()),
        }
    }

    #[test]
    fn normal_post_has_null_video_and_nested_groups() {
        let json = serde_json::to_value(PostView::from(record(NoteType::Normal, None))).unwrap();
        assert_eq!(json["note_type"], "normal");
        assert!(json["video"].is_null());
        assert_eq!(json["images"][0], "https://ci.xiaohongshu.com/a");
        assert_eq!(json["user"]["nickname"], "traveler");
        assert_eq!(json["stats"]["liked_count"], 12_000);
        assert!(json.get("image_list").is_none());
    }

    #[test]
    fn video_post_exposes_cover_and_url() {
        let json = serde_json::to_value(PostView::from(record(
            NoteType::Video,
            Some("https://sns-video-bd.xhscdn.com/v.mp4"),
        )))
        .unwrap();
        assert_eq!(json["note_type"], "video");
        assert_eq!(json["video"]["url"], "https://sns-video-bd.xhscdn.com/v.mp4");
        assert_eq!(json["video"]["cover"], "https://ci.xiaohongshu.com/a");
    }

    #[test]
    fn batch_view_counts_and_reasons() {
        let result = BatchResult {
            total: 2,
            successful: vec![record(NoteType::Normal, None)],
            failed: vec![FailedItem::new(
                "https://www.xiaohongshu.com/explore/gone",
                ItemError::NotFound,
            )],
        };
        let json = serde_json::to_value(BatchView::from(result)).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["failures"][0]["reason"], "NotFound");
    }
}
