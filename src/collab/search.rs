use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::dataset::Dataset;

pub const SEARCH_RESULT_LIMIT: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Exact,
    Prefix,
    Contains,
    Fuzzy,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl Dataset {
    pub fn search(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let query_lower = query.to_lowercase();
        let matcher = SkimMatcherV2::default();
        let mut ranked = self
            .graph()
            .nodes()
            .iter()
            .filter_map(|node| {
                let name_lower = node.name.to_lowercase();
                let rank = if name_lower == query_lower {
                    (MatchRank::Exact, 0)
                } else if name_lower.starts_with(&query_lower) {
                    (MatchRank::Prefix, 0)
                } else if name_lower.contains(&query_lower) {
                    (MatchRank::Contains, 0)
                } else {
                    let score = fuzzy_match_score(&matcher, &node.name, query)?;
                    (MatchRank::Fuzzy, -score)
                };
                Some((rank, node.name.as_str()))
            })
            .collect::<Vec<_>>();

        ranked.sort();
        ranked.dedup_by(|a, b| a.1 == b.1);
        ranked
            .into_iter()
            .take(SEARCH_RESULT_LIMIT)
            .map(|(_, name)| name.to_owned())
            .collect()
    }
}
