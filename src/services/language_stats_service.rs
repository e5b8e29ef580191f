use std::collections::HashMap;

use crate::entities::repository::Repository;
use crate::models::user_repos::LanguageStat;

pub const OTHER_THRESHOLD: f64 = 1.0;
pub const OTHER_NAME: &str = "Other";
pub const OTHER_COLOR: &str = "#cccccc";

struct LanguageTotal {
    name: String,
    bytes: u64,
    color: Option<String>,
}

/// Sum language byte sizes across repositories into percentage stats.
///
/// Languages below a 1% share are folded into a trailing "Other" entry.
/// Only each repository's `languages` list counts; the primary language
/// does not contribute bytes.
pub fn calculate_language_stats(repositories: &[Repository]) -> Vec<LanguageStat> {
    let mut totals: Vec<LanguageTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut total_bytes: u64 = 0;

    for repository in repositories {
        for language in &repository.languages {
            let position = *index.entry(language.name.as_str()).or_insert_with(|| {
                // First-seen color wins
                totals.push(LanguageTotal {
                    name: language.name.clone(),
                    bytes: 0,
                    color: language.color.clone(),
                });
                totals.len() - 1
            });
            let size = language.size.unwrap_or(0);
            totals[position].bytes += size;
            total_bytes += size;
        }
    }

    let mut stats: Vec<LanguageStat> = totals
        .into_iter()
        .map(|total| LanguageStat {
            percentage: if total_bytes > 0 {
                total.bytes as f64 / total_bytes as f64 * 100.0
            } else {
                0.0
            },
            name: total.name,
            size: total.bytes,
            color: total.color,
        })
        .collect();
    stats.sort_by(|a, b| b.size.cmp(&a.size));

    let (mut main, tail): (Vec<LanguageStat>, Vec<LanguageStat>) = stats
        .into_iter()
        .partition(|stat| stat.percentage >= OTHER_THRESHOLD);

    if !tail.is_empty() {
        main.push(LanguageStat {
            name: OTHER_NAME.into(),
            size: tail.iter().map(|stat| stat.size).sum(),
            percentage: tail.iter().map(|stat| stat.percentage).sum(),
            color: Some(OTHER_COLOR.into()),
        });
    }

    main
}
