//! Cursor-driven walk over a user's post listing.

use xhs_core::{Credential, NoteSummary, PipelineError};

use crate::error::ScraperError;
use crate::source::NoteSource;
use crate::target::UserTarget;

/// Maximum number of listing pages before the walk is abandoned.
/// Guards against upstream cursors that cycle.
pub const MAX_PAGES: usize = 200;

/// Collects every post summary for the user behind `user_url`.
///
/// Pages are fetched sequentially, following the cursor until the upstream
/// reports no more pages. Summaries keep arrival order and are **not**
/// de-duplicated here.
///
/// **All-or-nothing semantics**: if any page fails, summaries from earlier
/// pages are discarded and the error is returned.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] if `user_url` has no usable user id.
/// - [`PipelineError::ListingFailed`] if a page fetch fails or the walk
///   exceeds [`MAX_PAGES`].
pub async fn list_user_posts<S>(
    source: &S,
    user_url: &str,
    credential: &Credential,
) -> Result<Vec<NoteSummary>, PipelineError>
where
    S: NoteSource + ?Sized,
{
    let target = UserTarget::parse(user_url)?;
    walk_pages(source, &target, credential)
        .await
        .map_err(|e| PipelineError::ListingFailed {
            reason: e.to_string(),
        })
}

async fn walk_pages<S>(
    source: &S,
    target: &UserTarget,
    credential: &Credential,
) -> Result<Vec<NoteSummary>, ScraperError>
where
    S: NoteSource + ?Sized,
{
    let mut all_notes: Vec<NoteSummary> = Vec::new();
    let mut cursor = String::new();
    let mut page_count = 0usize;

    loop {
        page_count += 1;
        if page_count > MAX_PAGES {
            return Err(ScraperError::PaginationLimit {
                user_id: target.user_id.clone(),
                max_pages: MAX_PAGES,
            });
        }

        let page = source
            .fetch_user_notes_page(target, &cursor, credential)
            .await?;
        tracing::debug!(
            user_id = %target.user_id,
            page = page_count,
            notes = page.notes.len(),
            has_more = page.has_more,
            "fetched listing page"
        );
        all_notes.extend(page.notes);

        if !page.has_more {
            break;
        }
        if page.cursor.is_empty() {
            tracing::warn!(
                user_id = %target.user_id,
                page = page_count,
                "listing reports more pages but sent no cursor; stopping"
            );
            break;
        }
        cursor = page.cursor;
    }

    tracing::info!(
        user_id = %target.user_id,
        pages = page_count,
        notes = all_notes.len(),
        "user listing complete"
    );
    Ok(all_notes)
}

#[cfg(test)]
#[path = "pagination_test.rs"]
mod tests;
