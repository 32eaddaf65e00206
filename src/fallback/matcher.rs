//! Keyword-based category selection.

use super::catalog::{CategoryTemplates, TemplateCatalog};
use crate::types::Subtask;

/// Pick the category whose keywords occur most often in the subtask's title,
/// description and tags. Ties go to the earlier category; no hits selects `generic`.
pub fn select_category<'a>(catalog: &'a TemplateCatalog, subtask: &Subtask) -> &'a CategoryTemplates {
    let haystack = format!(
        "{} {} {}",
        subtask.title,
        subtask.description,
        subtask.tags.join(" ")
    )
    .to_lowercase();

    let mut best: Option<(&CategoryTemplates, usize)> = None;
    for category in catalog.categories() {
        let score = score(&haystack, &category.keywords);
        if score == 0 {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((category, score)),
        }
    }
    best.map(|(c, _)| c).unwrap_or_else(|| catalog.generic())
}

fn score(haystack: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|k| haystack.contains(k.as_str()))
        .count()
}
