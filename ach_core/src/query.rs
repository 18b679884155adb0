/*!
 * Multi-term weighted search over the package index.
 *
 * Every term must match at least one enabled field for a package to
 * survive; every (package, field, term) hit adds ranking weight on
 * top of that. So a package whose name AND summary both carry a term
 * outranks one that matched in a single field.
 */
use std::collections::HashSet;

use crate::index::{FieldSet, PkgIndex, PkgRecord, TermMatcher, FIELD_TABLE};

/* STRUCTS */
#[derive(Debug, Clone)]
pub struct Ranked {
    pub pkg: PkgRecord,
    pub weight: u32,
}

/**
 * Ranked search results, strongest match first.
 */
#[derive(Debug, Clone)]
pub struct Query {
    results: Vec<Ranked>,
}

impl Query {
    /// Ranks every available package against {terms}.
    /// An empty term list yields an empty query without touching the
    /// index.
    pub fn rank(index: &PkgIndex, terms: &[String], fields: FieldSet, latest_only: bool) -> Query {
        if terms.is_empty() {
            return Query { results: Vec::new() };
        }

        let matchers: Vec<TermMatcher> = terms.iter().map(|term| TermMatcher::new(term)).collect();
        let mut results: Vec<Ranked> = Vec::new();

        for pkg in index.available() {
            let mut matched_terms: HashSet<usize> = HashSet::new();
            let mut weight: u32 = 0;

            for (field, value_of) in FIELD_TABLE {
                if !fields.enabled(field) {
                    continue;
                }
                for (i, matcher) in matchers.iter().enumerate() {
                    if matcher.matches(value_of(pkg)) {
                        matched_terms.insert(i);
                        weight += 1;
                    }
                }
            }

            // Every term has to land somewhere.
            if matched_terms.len() < matchers.len() {
                continue;
            }
            if latest_only && !index.is_latest(pkg) {
                continue;
            }
            results.push(Ranked { pkg: pkg.clone(), weight });
        }

        // Weight descending; equal weights fall back to name, then repo,
        // so the ordering is stable across runs.
        results.sort_by(|a, b| {
            b.weight.cmp(&a.weight)
                .then_with(|| a.pkg.name.cmp(&b.pkg.name))
                .then_with(|| a.pkg.repo.cmp(&b.pkg.repo))
        });

        log::debug!("{} of {} packages matched {terms:?}", results.len(), index.available().len());
        return Query { results };
    }

    pub fn len(&self) -> usize {
        return self.results.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.results.is_empty();
    }

    /// 0-indexed access; selection numbers are 1-based at the prompt.
    pub fn get(&self, index: usize) -> Option<&Ranked> {
        return self.results.get(index);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ranked> {
        return self.results.iter();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    fn record(name: &str, summary: &str, repo: &str, version: &str) -> PkgRecord {
        return PkgRecord {
            name: name.to_string(),
            version: version.to_string(),
            release: "1.fc40".to_string(),
            arch: "x86_64".to_string(),
            repo: repo.to_string(),
            summary: summary.to_string(),
            description: String::new(),
            size: 1000,
        };
    }

    fn index_of(records: Vec<PkgRecord>) -> PkgIndex {
        return PkgIndex::from_parts(records, HashMap::new(), HashSet::new());
    }

    fn names(query: &Query) -> Vec<String> {
        return query.iter().map(|ranked| ranked.pkg.name.to_owned()).collect();
    }

    #[test]
    fn test_every_term_must_match() {
        let index = index_of(vec![
            record("git-extras", "Extras for git", "fedora", "7.1.0"),
            record("git", "Fast Version Control System", "fedora", "2.45.1"),
        ]);
        let terms = vec!["git".to_string(), "extras".to_string()];
        let query = Query::rank(&index, &terms, FieldSet::default(), false);
        assert_eq!(names(&query), vec!["git-extras"]);
    }

    #[test]
    fn test_any_enabled_field_satisfies_a_term() {
        let index = index_of(vec![
            record("ripgrep", "Line-oriented fast search tool", "updates", "14.1.0"),
        ]);
        let terms = vec!["fast".to_string()];

        let query = Query::rank(&index, &terms, FieldSet::default(), false);
        assert_eq!(query.len(), 1);

        // Same term with summary matching disabled finds nothing.
        let fields = FieldSet { name: true, summary: false, description: false };
        let query = Query::rank(&index, &terms, fields, false);
        assert!(query.is_empty());
    }

    #[test]
    fn test_multi_field_hits_raise_weight_not_term_count() {
        let index = index_of(vec![
            record("git", "git version control", "fedora", "2.45.1"),
            record("gitk", "Repository browser", "fedora", "2.45.1"),
            record("other", "Unrelated", "fedora", "1.0"),
        ]);
        let terms = vec!["git".to_string()];
        let query = Query::rank(&index, &terms, FieldSet::default(), false);

        // "other" is excluded; the double hit on git (name + summary)
        // puts it above gitk.
        assert_eq!(names(&query), vec!["git", "gitk"]);
        assert_eq!(query.get(0).unwrap().weight, 2);
        assert_eq!(query.get(1).unwrap().weight, 1);
    }

    #[test]
    fn test_terms_are_case_insensitive() {
        let index = index_of(vec![record("Git", "SCM", "fedora", "2.45.1")]);
        let query = Query::rank(&index, &["gIt".to_string()], FieldSet::default(), false);
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_glob_terms() {
        let index = index_of(vec![
            record("git", "SCM", "fedora", "2.45.1"),
            record("gitk", "Browser", "fedora", "2.45.1"),
        ]);
        let query = Query::rank(&index, &["git?".to_string()], FieldSet::default(), false);
        assert_eq!(names(&query), vec!["gitk"]);
    }

    #[test]
    fn test_empty_terms_yield_empty_query() {
        let index = index_of(vec![record("git", "SCM", "fedora", "2.45.1")]);
        let query = Query::rank(&index, &[], FieldSet::default(), false);
        assert!(query.is_empty());
    }

    #[test]
    fn test_latest_only_keeps_the_engines_cut() {
        let old = record("git", "SCM", "fedora", "2.44.0");
        let new = record("git", "SCM", "updates", "2.45.1");
        let latest: HashSet<String> = [new.specifier()].into_iter().collect();
        let index = PkgIndex::from_parts(vec![old, new], HashMap::new(), latest);

        let query = Query::rank(&index, &["git".to_string()], FieldSet::default(), true);
        assert_eq!(query.len(), 1);
        assert_eq!(query.get(0).unwrap().pkg.version, "2.45.1");

        // Without the limit both versions rank.
        let query = Query::rank(&index, &["git".to_string()], FieldSet::default(), false);
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_ties_break_on_name_then_repo() {
        let index = index_of(vec![
            record("zsh-git", "plugin", "updates", "1.0"),
            record("bash-git", "plugin", "fedora", "1.0"),
            record("bash-git", "plugin", "copr", "1.0"),
        ]);
        let query = Query::rank(&index, &["git".to_string()], FieldSet::default(), false);
        let ordered: Vec<(String, String)> = query.iter()
            .map(|ranked| (ranked.pkg.name.to_owned(), ranked.pkg.repo.to_owned()))
            .collect();
        assert_eq!(ordered, vec![
            ("bash-git".to_string(), "copr".to_string()),
            ("bash-git".to_string(), "fedora".to_string()),
            ("zsh-git".to_string(), "updates".to_string()),
        ]);
    }
}
