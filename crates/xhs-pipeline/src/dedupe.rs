//! Listing de-duplication policy.

use std::collections::HashSet;

use xhs_core::NoteSummary;

/// Drops repeated note ids, keeping the first occurrence.
///
/// Entries without a usable id are kept so the batch can report them as
/// missing-identifier failures.
#[must_use]
pub fn dedupe_summaries(summaries: Vec<NoteSummary>) -> Vec<NoteSummary> {
    let mut seen: HashSet<String> = HashSet::new();
    summaries
        .into_iter()
        .filter(|summary| match summary.usable_id() {
            Some(id) => seen.insert(id.to_owned()),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_occurrence_in_order() {
        let listing = vec![
            NoteSummary::new("a", "t1"),
            NoteSummary::new("b", "t2"),
            NoteSummary::new("a", "t3"),
            NoteSummary::new("c", "t4"),
            NoteSummary::new("b", "t5"),
        ];
        let deduped = dedupe_summaries(listing);
        assert_eq!(
            deduped,
            vec![
                NoteSummary::new("a", "t1"),
                NoteSummary::new("b", "t2"),
                NoteSummary::new("c", "t4"),
            ]
        );
    }

    #[test]
    fn entries_without_ids_survive() {
        let listing = vec![
            NoteSummary::default(),
            NoteSummary::new("a", ""),
            NoteSummary::default(),
        ];
        assert_eq!(dedupe_summaries(listing).len(), 3);
    }
}
