//! In-memory search over password records.
//!
//! Pure, deterministic functions over already-fetched record slices — no
//! storage access. Identical inputs always yield identical, order-stable
//! outputs.
//!
//! # Strategies
//!
//! - [`filter_by_substring`]: case-insensitive substring match, the default
//!   for the search box
//! - [`filter_by_criteria`]: substring + date window + service allow-list,
//!   composed with AND semantics
//! - [`fuzzy_rank`]: relevance-scored ordering for approximate queries,
//!   tolerant of typos via Levenshtein similarity

use chrono::{DateTime, Utc};

use crate::models::PasswordRecord;

/// Similarity below this floor is treated as noise and contributes nothing
/// to the fuzzy score, so records related to the query only by a few stray
/// characters drop out entirely.
const MIN_SIMILARITY: f64 = 0.5;

/// Multi-criteria filter. Omitted criteria are no-ops; present ones compose
/// with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Substring to match against service or username.
    pub query: Option<String>,
    /// Inclusive `[from, to]` window on `updated_at`.
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Allow-list of exact `service` values.
    pub services: Option<Vec<String>>,
}

/// Keep records whose `service` or `username` contains the query,
/// case-insensitively. An empty or whitespace-only query is the identity.
pub fn filter_by_substring(records: &[PasswordRecord], query: &str) -> Vec<PasswordRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| {
            record.service.to_lowercase().contains(&query)
                || record.username.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Apply substring, date-window, and service-membership filters in order.
pub fn filter_by_criteria(
    records: &[PasswordRecord],
    criteria: &SearchCriteria,
) -> Vec<PasswordRecord> {
    let mut out = match &criteria.query {
        Some(query) => filter_by_substring(records, query),
        None => records.to_vec(),
    };
    if let Some((from, to)) = criteria.date_range {
        out.retain(|record| record.updated_at >= from && record.updated_at <= to);
    }
    if let Some(services) = &criteria.services {
        out.retain(|record| services.contains(&record.service));
    }
    out
}

/// Rank records by relevance to the query, best first, dropping records that
/// score zero. An empty query returns the input unchanged.
///
/// The score per record combines exact/prefix/substring hits on `service` or
/// `username` (+100/+50/+25) with `10 ×` the character similarity of each
/// field, where similarity only counts once it clears [`MIN_SIMILARITY`].
pub fn fuzzy_rank(records: &[PasswordRecord], query: &str) -> Vec<PasswordRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return records.to_vec();
    }

    let mut scored: Vec<(f64, &PasswordRecord)> = records
        .iter()
        .map(|record| (relevance_score(record, &query), record))
        .filter(|(score, _)| *score > 0.0)
        .collect();
    // Stable sort keeps equal-score records in input order.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, record)| record.clone()).collect()
}

fn relevance_score(record: &PasswordRecord, query: &str) -> f64 {
    let service = record.service.to_lowercase();
    let username = record.username.to_lowercase();

    let mut score = 0.0;
    if service == query || username == query {
        score += 100.0;
    }
    if service.starts_with(query) || username.starts_with(query) {
        score += 50.0;
    }
    if service.contains(query) || username.contains(query) {
        score += 25.0;
    }
    for field in [&service, &username] {
        let similarity = character_similarity(field, query);
        if similarity >= MIN_SIMILARITY {
            score += 10.0 * similarity;
        }
    }
    score
}

/// Normalized character similarity in `[0, 1]`: 1 for identical strings,
/// scaled down by edit distance relative to the longer input.
pub fn character_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    (longest - levenshtein(a, b)) as f64 / longest as f64
}

/// Classic dynamic-programming Levenshtein distance with unit insert,
/// delete, and substitute costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(service: &str, username: &str) -> PasswordRecord {
        let now = Utc::now();
        PasswordRecord {
            id: format!("pw_{service}"),
            service: service.to_string(),
            username: username.to_string(),
            password: "secret".to_string(),
            url: None,
            notes: None,
            folder: None,
            tags: None,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_levenshtein_classics() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("gmail", "gmail"), 0);
        assert_eq!(levenshtein("", "gmail"), 5);
        assert_eq!(levenshtein("gmail", ""), 5);
        assert_eq!(levenshtein("gmail", "gmailx"), 1);
    }

    #[test]
    fn test_character_similarity_bounds() {
        assert_eq!(character_similarity("gmail", "gmail"), 1.0);
        assert_eq!(character_similarity("", ""), 1.0);
        assert_eq!(character_similarity("gmail", "facebook"), 0.0);
        let sim = character_similarity("gmail", "gmailx");
        assert!(sim > 0.8 && sim < 0.84);
    }

    #[test]
    fn test_substring_filter_is_case_insensitive() {
        let records = vec![
            record("Gmail", "alice@gmail.com"),
            record("Bank", "ALICE"),
            record("Forum", "bob"),
        ];

        let hits = filter_by_substring(&records, "alice");
        assert_eq!(hits.len(), 2);

        let hits = filter_by_substring(&records, "GMAIL");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].service, "Gmail");
    }

    #[test]
    fn test_empty_query_is_identity() {
        let records = vec![record("Gmail", "a"), record("Bank", "b")];
        assert_eq!(filter_by_substring(&records, "").len(), 2);
        assert_eq!(filter_by_substring(&records, "   ").len(), 2);
        assert_eq!(fuzzy_rank(&records, "  ").len(), 2);
    }

    #[test]
    fn test_criteria_compose_with_and_semantics() {
        let mut old = record("Gmail", "alice@gmail.com");
        old.updated_at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let recent = record("Gmail", "work@gmail.com");
        let other = record("Bank", "alice");
        let records = vec![old, recent.clone(), other];

        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let criteria = SearchCriteria {
            query: Some("gmail".to_string()),
            date_range: Some((from, Utc::now())),
            services: Some(vec!["Gmail".to_string()]),
        };

        let hits = filter_by_criteria(&records, &criteria);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, recent.username);
    }

    #[test]
    fn test_criteria_default_is_identity() {
        let records = vec![record("Gmail", "a"), record("Bank", "b")];
        let hits = filter_by_criteria(&records, &SearchCriteria::default());
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_fuzzy_rank_orders_exact_before_partial() {
        let records = vec![
            record("Facebook", "zuck@fb.com"),
            record("Gmailx", "other@example.com"),
            record("Gmail", "user@example.com"),
        ];

        let ranked = fuzzy_rank(&records, "gmail");
        let services: Vec<&str> = ranked.iter().map(|r| r.service.as_str()).collect();
        // Exact match first, prefix/substring match second, unrelated record
        // excluded outright.
        assert_eq!(services, vec!["Gmail", "Gmailx"]);
    }

    #[test]
    fn test_fuzzy_rank_matches_username_too() {
        let records = vec![
            record("Socials", "gmail-backup"),
            record("Unrelated", "nobody@example.org"),
        ];

        let ranked = fuzzy_rank(&records, "gmail");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].service, "Socials");
    }

    #[test]
    fn test_fuzzy_rank_is_deterministic() {
        let records = vec![
            record("Gmail", "a@example.com"),
            record("Gmailx", "b@example.com"),
        ];
        let first = fuzzy_rank(&records, "gmail");
        let second = fuzzy_rank(&records, "gmail");
        let ids = |rs: &[PasswordRecord]| rs.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }
}
