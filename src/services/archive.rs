//! Archive building
//!
//! Transforms a flat list of published posts into the two-level
//! year -> month grouping used for chronological browsing. The archive is
//! a derived view: it is rebuilt from live data on every request and never
//! persisted.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::models::{PostSummary, TagRef};

/// Simplified post record inside an archive month
#[derive(Debug, Clone, Serialize)]
pub struct ArchivePost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub tags: Vec<TagRef>,
    pub create_time: DateTime<Utc>,
}

/// One calendar month of posts within a year group
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveMonth {
    /// Calendar month, 1-12
    pub month: u32,
    /// Number of posts in this month
    pub total: i64,
    pub posts: Vec<ArchivePost>,
}

/// One calendar year of posts
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveYear {
    pub year: i32,
    /// Sum of this year's month totals
    pub total: i64,
    pub months: Vec<ArchiveMonth>,
}

/// Group posts by year, then month, newest first.
///
/// The input is sorted by creation time descending and groups are emitted
/// in encounter order, so years and months come out in descending
/// chronological order without a second sort. Empty input yields an empty
/// list.
pub fn build_archive(posts: Vec<PostSummary>) -> Vec<ArchiveYear> {
    let mut entries: Vec<ArchivePost> = posts
        .into_iter()
        .map(|post| ArchivePost {
            id: post.id,
            title: post.title,
            slug: post.slug,
            tags: post.tags,
            create_time: post.create_time,
        })
        .collect();
    entries.sort_by(|a, b| b.create_time.cmp(&a.create_time));

    let mut years: Vec<ArchiveYear> = Vec::new();
    for entry in entries {
        let year = entry.create_time.year();
        let month = entry.create_time.month();

        if years.last().map(|group| group.year) != Some(year) {
            years.push(ArchiveYear {
                year,
                total: 0,
                months: Vec::new(),
            });
        }
        if let Some(year_group) = years.last_mut() {
            if year_group.months.last().map(|group| group.month) != Some(month) {
                year_group.months.push(ArchiveMonth {
                    month,
                    total: 0,
                    posts: Vec::new(),
                });
            }
            if let Some(month_group) = year_group.months.last_mut() {
                month_group.posts.push(entry);
                month_group.total += 1;
            }
            year_group.total += 1;
        }
    }

    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublishStatus;
    use chrono::TimeZone;

    fn summary(id: i64, timestamp: &str) -> PostSummary {
        PostSummary {
            id,
            title: format!("Post {}", id),
            slug: format!("post-{}", id),
            summary: None,
            cover_image: None,
            views: 0,
            read_time: 1,
            is_pinned: false,
            status: PublishStatus::Published,
            create_time: timestamp.parse().expect("valid timestamp"),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_list() {
        assert!(build_archive(Vec::new()).is_empty());
    }

    #[test]
    fn test_groups_by_year_then_month() {
        let posts = vec![
            summary(1, "2024-03-10T12:00:00Z"),
            summary(2, "2024-03-02T12:00:00Z"),
            summary(3, "2024-01-15T12:00:00Z"),
            summary(4, "2023-12-31T12:00:00Z"),
        ];

        let archive = build_archive(posts);

        assert_eq!(archive.len(), 2);
        assert_eq!(archive[0].year, 2024);
        assert_eq!(archive[0].total, 3);
        assert_eq!(archive[1].year, 2023);
        assert_eq!(archive[1].total, 1);

        let months_2024: Vec<u32> = archive[0].months.iter().map(|m| m.month).collect();
        assert_eq!(months_2024, vec![3, 1]);
        assert_eq!(archive[0].months[0].total, 2);
        assert_eq!(archive[0].months[0].posts[0].id, 1);
        assert_eq!(archive[0].months[0].posts[1].id, 2);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let shuffled = vec![
            summary(3, "2024-01-15T12:00:00Z"),
            summary(1, "2024-03-10T12:00:00Z"),
            summary(4, "2023-12-31T12:00:00Z"),
            summary(2, "2024-03-02T12:00:00Z"),
        ];
        let sorted = vec![
            summary(1, "2024-03-10T12:00:00Z"),
            summary(2, "2024-03-02T12:00:00Z"),
            summary(3, "2024-01-15T12:00:00Z"),
            summary(4, "2023-12-31T12:00:00Z"),
        ];

        let from_shuffled = build_archive(shuffled);
        let from_sorted = build_archive(sorted);

        let flat_a: Vec<i64> = flatten(&from_shuffled);
        let flat_b: Vec<i64> = flatten(&from_sorted);
        assert_eq!(flat_a, flat_b);
    }

    #[test]
    fn test_same_month_across_years_stays_separate() {
        let posts = vec![
            summary(1, "2024-06-01T00:00:00Z"),
            summary(2, "2023-06-01T00:00:00Z"),
        ];

        let archive = build_archive(posts);
        assert_eq!(archive.len(), 2);
        assert_eq!(archive[0].months[0].month, 6);
        assert_eq!(archive[1].months[0].month, 6);
    }

    #[test]
    fn test_round_trip_is_a_permutation() {
        // Timestamps spanning two years and three months
        let posts = vec![
            summary(1, "2024-03-10T08:00:00Z"),
            summary(2, "2024-03-11T08:00:00Z"),
            summary(3, "2024-01-05T08:00:00Z"),
            summary(4, "2023-11-20T08:00:00Z"),
            summary(5, "2023-11-21T08:00:00Z"),
        ];
        let input_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();

        let archive = build_archive(posts);

        let mut flattened = flatten(&archive);
        flattened.sort_unstable();
        let mut expected = input_ids;
        expected.sort_unstable();
        assert_eq!(flattened, expected, "no omissions, no duplicates");

        for year in &archive {
            let month_sum: i64 = year.months.iter().map(|m| m.total).sum();
            assert_eq!(year.total, month_sum);
            for month in &year.months {
                assert_eq!(month.total, month.posts.len() as i64);
            }
        }
    }

    fn flatten(archive: &[ArchiveYear]) -> Vec<i64> {
        archive
            .iter()
            .flat_map(|y| y.months.iter())
            .flat_map(|m| m.posts.iter())
            .map(|p| p.id)
            .collect()
    }

    mod properties {
        use super::*;
        use chrono::Utc;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Flattening the archive recovers exactly the input posts
            #[test]
            fn flatten_is_permutation(specs in prop::collection::vec(0i64..200_000_000, 0..60)) {
                let posts: Vec<PostSummary> = specs
                    .iter()
                    .enumerate()
                    .map(|(i, secs)| {
                        let time = Utc.timestamp_opt(1_500_000_000 + secs, 0).single().expect("valid");
                        let mut post = summary(i as i64 + 1, "2024-01-01T00:00:00Z");
                        post.create_time = time;
                        post
                    })
                    .collect();
                let count = posts.len();

                let archive = build_archive(posts);

                let mut ids = flatten(&archive);
                ids.sort_unstable();
                let expected: Vec<i64> = (1..=count as i64).collect();
                prop_assert_eq!(ids, expected);
            }

            /// Totals agree with the lists at every level, and ordering is
            /// strictly descending for years and for months within a year
            #[test]
            fn totals_and_ordering_hold(specs in prop::collection::vec(0i64..200_000_000, 0..60)) {
                let posts: Vec<PostSummary> = specs
                    .iter()
                    .enumerate()
                    .map(|(i, secs)| {
                        let time = Utc.timestamp_opt(1_500_000_000 + secs, 0).single().expect("valid");
                        let mut post = summary(i as i64 + 1, "2024-01-01T00:00:00Z");
                        post.create_time = time;
                        post
                    })
                    .collect();

                let archive = build_archive(posts);

                for window in archive.windows(2) {
                    prop_assert!(window[0].year > window[1].year);
                }
                for year in &archive {
                    prop_assert!(year.total > 0);
                    let month_sum: i64 = year.months.iter().map(|m| m.total).sum();
                    prop_assert_eq!(year.total, month_sum);
                    for window in year.months.windows(2) {
                        prop_assert!(window[0].month > window[1].month);
                    }
                    for month in &year.months {
                        prop_assert_eq!(month.total, month.posts.len() as i64);
                        for window in month.posts.windows(2) {
                            prop_assert!(window[0].create_time >= window[1].create_time);
                        }
                    }
                }
            }
        }
    }
}
