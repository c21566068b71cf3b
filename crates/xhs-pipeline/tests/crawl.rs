//! Crawl orchestration against an in-memory `NoteSource`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use xhs_core::{Credential, ItemError, NoteSummary, PipelineError};
use xhs_pipeline::{crawl_posts, crawl_user, fetch_profile, CrawlSettings};
use xhs_scraper::types::{FeedResponse, RawUserProfile, UserNotesPage};
use xhs_scraper::{NoteSource, NoteTarget, ScraperError, UserTarget};

const USER_URL: &str = "https://www.xiaohongshu.com/user/profile/u1";

enum Detail {
    Found,
    Empty,
    Status(u16),
}

#[derive(Default)]
struct StubSource {
    details: HashMap<String, Detail>,
    pages: HashMap<String, Result<UserNotesPage, u16>>,
    profile: Option<serde_json::Value>,
    detail_calls: Mutex<Vec<String>>,
}

impl StubSource {
    fn with_notes(ids: &[&str]) -> Self {
        let mut source = Self::default();
        for id in ids {
            source.details.insert((*id).to_owned(), Detail::Found);
        }
        source
    }

    fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NoteSource for StubSource {
    fn web_base_url(&self) -> &str {
        "https://www.xiaohongshu.com"
    }

    async fn fetch_note_detail(
        &self,
        note_url: &str,
        _credential: &Credential,
    ) -> Result<FeedResponse, ScraperError> {
        let note_id = NoteTarget::parse(note_url).unwrap().note_id;
        self.detail_calls.lock().unwrap().push(note_id.clone());
        let body = match self.details.get(&note_id) {
            Some(Detail::Found) => json!({
                "success": true,
                "data": { "items": [{
                    "id": note_id.clone(),
                    "note_card": {
                        "type": "normal",
                        "title": format!("title {note_id}"),
                        "user": { "user_id": "u1", "nickname": "hiker" }
                    }
                }] }
            }),
            Some(Detail::Empty) | None => json!({ "success": true, "data": { "items": [] } }),
            Some(Detail::Status(status)) => {
                return Err(ScraperError::UnexpectedStatus {
                    status: *status,
                    url: note_url.to_owned(),
                })
            }
        };
        Ok(serde_json::from_value(body).unwrap())
    }

    async fn fetch_user_notes_page(
        &self,
        _user: &UserTarget,
        cursor: &str,
        _credential: &Credential,
    ) -> Result<UserNotesPage, ScraperError> {
        match self.pages.get(cursor) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(status)) => Err(ScraperError::UnexpectedStatus {
                status: *status,
                url: "user_posted".to_owned(),
            }),
            None => panic!("unexpected cursor {cursor:?}"),
        }
    }

    async fn fetch_user_profile(
        &self,
        _user: &UserTarget,
        _credential: &Credential,
    ) -> Result<RawUserProfile, ScraperError> {
        match &self.profile {
            Some(value) => Ok(serde_json::from_value(value.clone()).unwrap()),
            None => Err(ScraperError::Api {
                code: -1,
                msg: "profile unavailable".to_owned(),
            }),
        }
    }
}

fn page(ids: &[&str], cursor: &str, has_more: bool) -> UserNotesPage {
    UserNotesPage {
        notes: ids.iter().map(|id| NoteSummary::new(*id, "tok")).collect(),
        cursor: cursor.to_owned(),
        has_more,
    }
}

fn three_page_source() -> StubSource {
    let mut source = StubSource::with_notes(&["a", "b", "c", "d"]);
    source.pages.insert(String::new(), Ok(page(&["a", "b"], "p2", true)));
    source.pages.insert("p2".to_owned(), Ok(page(&["c", "b"], "p3", true)));
    source.pages.insert("p3".to_owned(), Ok(page(&["d"], "", false)));
    source.profile = Some(json!({ "basic_info": { "nickname": "hiker" } }));
    source
}

fn credential() -> Credential {
    Credential::new("a1=test").unwrap()
}

fn settings(dedupe_listing: bool) -> CrawlSettings {
    CrawlSettings {
        max_concurrent_notes: 2,
        dedupe_listing,
    }
}

#[tokio::test]
async fn user_crawl_dedupes_listing_by_default() {
    let source = three_page_source();
    let cancel = CancellationToken::new();

    let crawl = crawl_user(&source, &settings(true), USER_URL, &credential(), &cancel)
        .await
        .unwrap();

    assert_eq!(crawl.user_id, "u1");
    assert_eq!(crawl.output_name, "hiker_u1");
    assert_eq!(crawl.result.total, 4);
    let ids: Vec<_> = crawl
        .result
        .successful
        .iter()
        .map(|r| r.note_id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
    assert!(crawl.result.successful[0]
        .note_url
        .starts_with("https://www.xiaohongshu.com/explore/a?xsec_token=tok"));
}

#[tokio::test]
async fn user_crawl_without_dedupe_resolves_repeats() {
    let source = three_page_source();
    let cancel = CancellationToken::new();

    let crawl = crawl_user(&source, &settings(false), USER_URL, &credential(), &cancel)
        .await
        .unwrap();

    assert_eq!(crawl.result.total, 5);
    assert_eq!(crawl.result.succeeded_count(), 5);
    let b_calls = source.detail_calls().iter().filter(|id| *id == "b").count();
    assert_eq!(b_calls, 2);
}

#[tokio::test]
async fn profile_failure_is_not_fatal() {
    let mut source = three_page_source();
    source.profile = None;
    let cancel = CancellationToken::new();

    let crawl = crawl_user(&source, &settings(true), USER_URL, &credential(), &cancel)
        .await
        .unwrap();

    assert!(crawl.profile.is_none());
    assert_eq!(crawl.output_name, "u1");
    assert_eq!(crawl.result.succeeded_count(), 4);
}

#[tokio::test]
async fn listing_failure_aborts_user_crawl() {
    let mut source = three_page_source();
    source.pages.insert("p3".to_owned(), Err(500));
    let cancel = CancellationToken::new();

    let err = crawl_user(&source, &settings(true), USER_URL, &credential(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::ListingFailed { .. }));
    assert!(source.detail_calls().is_empty());
}

#[tokio::test]
async fn listing_entry_without_id_is_reported() {
    let mut source = StubSource::with_notes(&["a", "c"]);
    source.pages.insert(
        String::new(),
        Ok(UserNotesPage {
            notes: vec![
                NoteSummary::new("a", ""),
                NoteSummary::default(),
                NoteSummary::new("c", ""),
            ],
            cursor: String::new(),
            has_more: false,
        }),
    );
    let cancel = CancellationToken::new();

    let crawl = crawl_user(&source, &settings(true), USER_URL, &credential(), &cancel)
        .await
        .unwrap();

    assert_eq!(crawl.result.total, 3);
    assert_eq!(crawl.result.succeeded_count(), 2);
    assert_eq!(crawl.result.failed[0].identifier, "listing entry #2");
    assert_eq!(crawl.result.failed[0].error, ItemError::MissingIdentifier);
    assert_eq!(source.detail_calls().len(), 2);
}

#[tokio::test]
async fn post_crawl_isolates_not_found() {
    let mut source = StubSource::with_notes(&["n1", "n2", "n4", "n5"]);
    source.details.insert("n3".to_owned(), Detail::Empty);
    let urls: Vec<String> = (1..=5)
        .map(|i| format!("https://www.xiaohongshu.com/explore/n{i}"))
        .collect();
    let cancel = CancellationToken::new();

    let result = crawl_posts(&source, &settings(true), &urls, &credential(), &cancel)
        .await
        .unwrap();

    assert_eq!(result.total, 5);
    assert_eq!(result.succeeded_count(), 4);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].identifier, urls[2]);
    assert_eq!(result.failed[0].reason(), "NotFound");
    let ids: Vec<_> = result.successful.iter().map(|r| r.note_id.as_str()).collect();
    assert_eq!(ids, vec!["n1", "n2", "n4", "n5"]);
}

#[tokio::test]
async fn post_crawl_reports_fetch_failures() {
    let mut source = StubSource::with_notes(&["n1"]);
    source.details.insert("n2".to_owned(), Detail::Status(461));
    let urls = vec![
        "https://www.xiaohongshu.com/explore/n1".to_owned(),
        "https://www.xiaohongshu.com/explore/n2".to_owned(),
    ];
    let cancel = CancellationToken::new();

    let result = crawl_posts(&source, &settings(true), &urls, &credential(), &cancel)
        .await
        .unwrap();

    assert_eq!(result.succeeded_count(), 1);
    assert!(result.failed[0].reason().starts_with("FetchFailed"));
    assert!(result.failed[0].reason().contains("461"));
}

#[tokio::test]
async fn malformed_post_url_fails_before_any_fetch() {
    let source = StubSource::with_notes(&["n1"]);
    let urls = vec![
        "https://www.xiaohongshu.com/explore/n1".to_owned(),
        "explore/n2".to_owned(),
    ];
    let cancel = CancellationToken::new();

    let err = crawl_posts(&source, &settings(true), &urls, &credential(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidInput { ref input, .. } if input == "explore/n2"));
    assert!(source.detail_calls().is_empty());
}

#[tokio::test]
async fn profile_lookup_reports_failure() {
    let source = StubSource::default();
    let err = fetch_profile(&source, USER_URL, &credential())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ProfileFailed { .. }));
}
