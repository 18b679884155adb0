/*!
 * Renders ranked results as the numbered list the selection prompt
 * reads from.
 */
use std::io::stdout;

use termion::color;

use crate::config::Config;
use crate::index::{PkgIndex, PkgRecord};
use crate::query::{Query, Ranked};

const UNITS: [&str; 5] = ["B", "kiB", "MB", "GB", "TB"];

/// SI scaling with two decimals. The divisor is 1000, never 1024.
pub fn human_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit: usize = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    return format!("{:.2} {}", value, UNITS[unit]);
}

/// Color only an interactive stdout.
pub fn use_color(config: &Config) -> bool {
    return config.color && termion::is_tty(&stdout());
}

pub fn terminal_width() -> Option<usize> {
    return termsize::get().map(|size| size.cols as usize);
}

fn repo_color(repo: &str) -> String {
    if repo == "fedora" {
        return color::Fg(color::Blue).to_string();
    }
    if repo == "updates" {
        return color::Fg(color::Green).to_string();
    }
    if repo.starts_with("rpmfusion") {
        return color::Fg(color::Magenta).to_string();
    }
    return String::new();
}

fn paint(text: &str, color_code: &str, use_color: bool) -> String {
    if !use_color || color_code.is_empty() {
        return text.to_string();
    }
    return format!("{color_code}{text}{reset}", reset = color::Fg(color::Reset));
}

/**
 * One package line: selection number, repo, name, version-release.arch,
 * bracketed size, and the installed badge when the index knows this
 * (name, arch). An exact version match shows a plain badge; anything
 * else warns with the version that is actually installed.
 */
pub fn render_line(
    pkg: &PkgRecord,
    number: usize,
    number_width: usize,
    repo_width: usize,
    name_width: usize,
    installed: Option<&str>,
    use_color: bool,
) -> String {
    let repo = paint(&format!("{:<repo_width$}", pkg.repo), &repo_color(&pkg.repo), use_color);
    let badge = match installed {
        Some(version) if version == pkg.version_release() => {
            paint(" Installed", &color::Fg(color::Green).to_string(), use_color)
        }
        Some(version) => {
            paint(&format!(" Installed: {version}"), &color::Fg(color::Yellow).to_string(), use_color)
        }
        None => String::new(),
    };

    return format!(
        "{number:>number_width$}. {repo} {name:<name_width$} {evra} [{size}]{badge}",
        name = pkg.name,
        evra = format!("{}.{}", pkg.version_release(), pkg.arch),
        size = human_size(pkg.size),
    );
}

/**
 * The full listing, two lines per package (entry + indented summary).
 * Reverse order puts the strongest match directly above the prompt;
 * each entry keeps its forward selection number either way.
 */
pub fn render_results(
    query: &Query,
    index: &PkgIndex,
    reverse: bool,
    use_color: bool,
    width: Option<usize>,
) -> Vec<String> {
    let number_width = query.len().to_string().len();
    let repo_width = query.iter().map(|ranked| ranked.pkg.repo.len()).max().unwrap_or(0);
    let name_width = query.iter().map(|ranked| ranked.pkg.name.len()).max().unwrap_or(0);

    let mut entries: Vec<(usize, &Ranked)> = query.iter()
        .enumerate()
        .map(|(i, ranked)| (i + 1, ranked))
        .collect();
    if reverse {
        entries.reverse();
    }

    let mut lines: Vec<String> = Vec::with_capacity(entries.len() * 2);
    for (number, ranked) in entries {
        lines.push(render_line(
            &ranked.pkg,
            number,
            number_width,
            repo_width,
            name_width,
            index.installed_version(&ranked.pkg),
            use_color,
        ));
        lines.push(clip(&format!("      {}", ranked.pkg.summary), width));
    }
    return lines;
}

fn clip(line: &str, width: Option<usize>) -> String {
    let Some(width) = width else {
        return line.to_string();
    };
    if line.chars().count() <= width {
        return line.to_string();
    }
    return line.chars().take(width).collect();
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use crate::index::FieldSet;

    use super::*;

    #[test]
    fn test_human_size_scales_by_thousands() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(999), "999.00 B");
        assert_eq!(human_size(1000), "1.00 kiB");
        assert_eq!(human_size(1024), "1.02 kiB");
        assert_eq!(human_size(1_500_000), "1.50 MB");
        assert_eq!(human_size(2_000_000_000), "2.00 GB");
        assert_eq!(human_size(3_250_000_000_000), "3.25 TB");
        // Units run out at TB; the value keeps growing instead.
        assert_eq!(human_size(5_000_000_000_000_000), "5000.00 TB");
    }

    fn record(name: &str, version: &str, repo: &str) -> PkgRecord {
        return PkgRecord {
            name: name.to_string(),
            version: version.to_string(),
            release: "1.fc40".to_string(),
            arch: "x86_64".to_string(),
            repo: repo.to_string(),
            summary: format!("{name} summary"),
            description: String::new(),
            size: 1_500_000,
        };
    }

    fn query_of(records: Vec<PkgRecord>, installed: HashMap<(String, String), String>) -> (Query, PkgIndex) {
        let index = PkgIndex::from_parts(records, installed, HashSet::new());
        let query = Query::rank(&index, &["*".to_string()], FieldSet::default(), false);
        return (query, index);
    }

    #[test]
    fn test_line_layout() {
        let (query, index) = query_of(vec![record("gitk-extras", "1.2", "updates")], HashMap::new());
        let lines = render_results(&query, &index, false, false, None);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "1. updates gitk-extras 1.2-1.fc40.x86_64 [1.50 MB]");
        assert_eq!(lines[1], "      gitk-extras summary");
    }

    #[test]
    fn test_reverse_listing_keeps_forward_numbers() {
        // Ten results force a two-digit number column.
        let records: Vec<PkgRecord> = (0..10)
            .map(|i| record(&format!("pkg-{i:02}"), "1.0", "fedora"))
            .collect();
        let (query, index) = query_of(records, HashMap::new());

        let forward = render_results(&query, &index, false, false, None);
        let reversed = render_results(&query, &index, true, false, None);

        assert!(forward[0].starts_with(" 1. "));
        assert!(reversed[0].starts_with("10. "));
        // Same entry, same number, regardless of display order.
        assert_eq!(reversed[0], forward[18]);
        assert_eq!(reversed[19], forward[1]);
    }

    #[test]
    fn test_installed_badges() {
        let mut installed: HashMap<(String, String), String> = HashMap::new();
        installed.insert(("same".to_string(), "x86_64".to_string()), "1.0-1.fc40".to_string());
        installed.insert(("older".to_string(), "x86_64".to_string()), "0.9-1.fc40".to_string());

        let (query, index) = query_of(
            vec![record("same", "1.0", "fedora"), record("older", "1.0", "fedora"), record("new", "1.0", "fedora")],
            installed,
        );
        let lines = render_results(&query, &index, false, false, None);

        let older = lines.iter().find(|line| line.contains(" older ")).unwrap();
        assert!(older.ends_with("Installed: 0.9-1.fc40"));
        let same = lines.iter().find(|line| line.contains(" same ")).unwrap();
        assert!(same.ends_with(" Installed"));
        let new = lines.iter().find(|line| line.contains(" new ")).unwrap();
        assert!(new.ends_with("]"));
    }

    #[test]
    fn test_summary_clipped_to_terminal_width() {
        let (query, index) = query_of(vec![record("wide", "1.0", "fedora")], HashMap::new());
        let lines = render_results(&query, &index, false, false, Some(12));
        assert_eq!(lines[1], "      wide s");
    }
}
