/*!
 * Snapshot of the dnf package index, taken once per run.
 * Holds the three things the rest of the tool needs from the engine:
 * per-field term matching, the installed set, and the engine's own
 * latest-version-per-name determination.
 */
use std::collections::{HashMap, HashSet};

use duct::cmd;
use glob::{MatchOptions, Pattern};
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

// Separators for --queryformat output. Repoquery passes these through
// untouched, so descriptions can span lines without breaking the parse.
const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/* STRUCTS */
/**
 * One row of the repo snapshot. Installed state is not stored here;
 * it is derived by asking the index for (name, arch).
 */
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PkgRecord {
    pub name: String,
    pub version: String,
    pub release: String,
    pub arch: String,
    pub repo: String,
    pub summary: String,
    pub description: String,
    pub size: u64,
}

impl PkgRecord {
    /// Full specifier the engine accepts on its install command line.
    pub fn specifier(&self) -> String {
        return format!("{}-{}-{}.{}", self.name, self.version, self.release, self.arch);
    }

    pub fn version_release(&self) -> String {
        return format!("{}-{}", self.version, self.release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Summary,
    Description,
}

fn field_name(pkg: &PkgRecord) -> &str {
    return &pkg.name;
}
fn field_summary(pkg: &PkgRecord) -> &str {
    return &pkg.summary;
}
fn field_description(pkg: &PkgRecord) -> &str {
    return &pkg.description;
}

/// Field -> accessor table. The ranker walks this instead of resolving
/// field names at runtime; a new searchable field means a new row.
pub const FIELD_TABLE: [(Field, fn(&PkgRecord) -> &str); 3] = [
    (Field::Name, field_name),
    (Field::Summary, field_summary),
    (Field::Description, field_description),
];

/**
 * Which fields a search term may match against.
 * Name matching is always on; the flags only widen the search.
 */
#[derive(Debug, Clone, Copy)]
pub struct FieldSet {
    pub name: bool,
    pub summary: bool,
    pub description: bool,
}

impl FieldSet {
    pub fn enabled(&self, field: Field) -> bool {
        return match field {
            Field::Name => self.name,
            Field::Summary => self.summary,
            Field::Description => self.description,
        };
    }
}

impl Default for FieldSet {
    fn default() -> FieldSet {
        return FieldSet { name: true, summary: true, description: false };
    }
}

/**
 * A single search term, compiled once. Terms carrying glob
 * metacharacters match the whole field; everything else is a
 * case-insensitive substring match.
 */
#[derive(Debug, Clone)]
pub enum TermMatcher {
    Substring(String),
    Glob(Pattern),
}

impl TermMatcher {
    pub fn new(term: &str) -> TermMatcher {
        if term.contains(['*', '?', '[']) {
            match Pattern::new(term) {
                Ok(pattern) => return TermMatcher::Glob(pattern),
                Err(err) => log::debug!("unparseable glob '{term}', matching as substring: {err}"),
            }
        }
        return TermMatcher::Substring(term.to_lowercase());
    }

    pub fn matches(&self, value: &str) -> bool {
        return match self {
            TermMatcher::Substring(term) => value.to_lowercase().contains(term.as_str()),
            TermMatcher::Glob(pattern) => pattern.matches_with(value, MatchOptions {
                case_sensitive: false,
                require_literal_separator: false,
                require_literal_leading_dot: false,
            }),
        };
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("could not run '{0}': {1}")]
    Engine(String, #[source] std::io::Error),
}

#[derive(Debug)]
pub struct PkgIndex {
    available: Vec<PkgRecord>,
    // (name, arch) -> installed version-release
    installed: HashMap<(String, String), String>,
    // Specifiers the engine reported as newest per name.
    latest: HashSet<String>,
}

impl PkgIndex {
    /// Opens the index: one snapshot each for the available packages,
    /// the installed set, and the engine's latest-version cut.
    pub fn open(config: &Config) -> Result<PkgIndex, IndexError> {
        let queryformat = [
            "%{name}", "%{version}", "%{release}", "%{arch}",
            "%{reponame}", "%{size}", "%{summary}", "%{description}",
        ].join(&FIELD_SEP.to_string()) + &RECORD_SEP.to_string();

        let raw = run_engine(&config.pkg_manager, &[
            "repoquery", "--quiet", "--queryformat", &queryformat,
        ])?;
        let available = parse_available(&raw);

        let raw = run_engine(&config.pkg_manager, &[
            "repoquery", "--quiet", "--installed",
            "--queryformat", "%{name}\u{1f}%{arch}\u{1f}%{version}-%{release}\n",
        ])?;
        let installed = parse_installed(&raw);

        let raw = run_engine(&config.pkg_manager, &[
            "repoquery", "--quiet", "--latest-limit=1",
            "--queryformat", "%{name}-%{version}-%{release}.%{arch}\n",
        ])?;
        let latest = parse_latest(&raw);

        log::info!("index opened: {} available, {} installed", available.len(), installed.len());
        return Ok(PkgIndex::from_parts(available, installed, latest));
    }

    /// Assembles an index from already-parsed snapshots.
    pub fn from_parts(
        available: Vec<PkgRecord>,
        installed: HashMap<(String, String), String>,
        latest: HashSet<String>,
    ) -> PkgIndex {
        return PkgIndex { available, installed, latest };
    }

    pub fn available(&self) -> &[PkgRecord] {
        return &self.available;
    }

    /// Whether the engine reported this record as the newest of its name.
    pub fn is_latest(&self, pkg: &PkgRecord) -> bool {
        return self.latest.contains(&pkg.specifier());
    }

    /// Installed version-release for this record's (name, arch), if any.
    pub fn installed_version(&self, pkg: &PkgRecord) -> Option<&str> {
        let key = (pkg.name.to_owned(), pkg.arch.to_owned());
        return self.installed.get(&key).map(|version| version.as_str());
    }
}

fn run_engine(pkg_manager: &str, args: &[&str]) -> Result<String, IndexError> {
    log::debug!("querying index: {pkg_manager} {}", args.join(" "));
    return cmd(pkg_manager, args)
        .read()
        .map_err(|err| IndexError::Engine(format!("{pkg_manager} {}", args.join(" ")), err));
}

fn parse_available(raw: &str) -> Vec<PkgRecord> {
    let mut output: Vec<PkgRecord> = Vec::new();

    for record in raw.split(RECORD_SEP) {
        let fields: Vec<&str> = record.trim_start().split(FIELD_SEP).collect();
        if fields.len() != 8 {
            if !record.trim().is_empty() {
                log::warn!("skipping unreadable index record: {record:?}");
            }
            continue;
        }
        let size = match fields[5].trim().parse::<u64>() {
            Ok(size) => size,
            Err(_) => {
                log::warn!("skipping record with unreadable size: {}", fields[0]);
                continue;
            }
        };
        output.push(PkgRecord {
            name: fields[0].into(),
            version: fields[1].into(),
            release: fields[2].into(),
            arch: fields[3].into(),
            repo: fields[4].into(),
            size,
            summary: fields[6].trim().into(),
            description: fields[7].trim().into(),
        });
    }
    return output;
}

fn parse_installed(raw: &str) -> HashMap<(String, String), String> {
    let mut output: HashMap<(String, String), String> = HashMap::new();

    for line in raw.lines() {
        let fields: Vec<&str> = line.split(FIELD_SEP).collect();
        if fields.len() != 3 {
            if !line.trim().is_empty() {
                log::warn!("skipping unreadable installed record: {line:?}");
            }
            continue;
        }
        output.insert((fields[0].to_string(), fields[1].to_string()), fields[2].to_string());
    }
    return output;
}

fn parse_latest(raw: &str) -> HashSet<String> {
    return raw.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect();
}
