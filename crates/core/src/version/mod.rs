//! Version string helpers
//!
//! Versions follow `M[.m[.p]][.|-qualifier[.|-buildNumber]]`. The build
//! number is the trailing number of a qualifier (`redhat-00005` carries
//! `00005`) and may be zero padded. `SNAPSHOT` is always the last token.

mod calculator;

pub use calculator::VersionCalculator;

use regex::Regex;
use std::sync::LazyLock;

static SNAPSHOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)[.\-_]?SNAPSHOT$").expect("valid regex"));
static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)[.\-_]?(.*)$").expect("valid regex"));
static BUILD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*[A-Za-z])([.\-_]?)(\d+)$").expect("valid regex"));
static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+$").expect("valid regex"));

const SNAPSHOT_TAIL: &str = "-SNAPSHOT";

pub fn is_snapshot(version: &str) -> bool {
    SNAPSHOT.is_match(version)
}

pub fn remove_snapshot(version: &str) -> String {
    split_snapshot(version).0.to_string()
}

/// `(version without snapshot, snapshot tail to re-append)`
fn split_snapshot(version: &str) -> (&str, &'static str) {
    match SNAPSHOT.captures(version).and_then(|c| c.get(1)) {
        Some(base) => (base.as_str(), SNAPSHOT_TAIL),
        None => (version, ""),
    }
}

/// Numeric segments and qualifier; `None` when the version does not start
/// with a number
fn split_numeric(version: &str) -> Option<(Vec<&str>, &str)> {
    let captures = NUMERIC.captures(version)?;
    let numeric = captures.get(1)?.as_str().split('.').collect();
    let qualifier = captures.get(2).map_or("", |m| m.as_str());
    Some((numeric, qualifier))
}

/// `(prefix, separator, digits)` of a version with a build number,
/// snapshot excluded
fn split_build_number(version: &str) -> Option<(&str, &str, &str)> {
    let captures = BUILD_NUMBER.captures(remove_snapshot_ref(version))?;
    Some((
        captures.get(1)?.as_str(),
        captures.get(2).map_or("", |m| m.as_str()),
        captures.get(3)?.as_str(),
    ))
}

fn remove_snapshot_ref(version: &str) -> &str {
    split_snapshot(version).0
}

pub fn has_build_number(version: &str) -> bool {
    split_build_number(version).is_some()
}

/// The build number as written, zero padding included
pub fn build_number(version: &str) -> Option<&str> {
    split_build_number(version).map(|(_, _, digits)| digits)
}

/// Numeric build number, 0 when there is none
pub fn integer_build_number(version: &str) -> u64 {
    build_number(version)
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Replace the build number, or append `-<digits>` when there is none
pub fn set_build_number(version: &str, digits: &str) -> String {
    let (base, snapshot) = split_snapshot(version);
    match split_build_number(base) {
        Some((prefix, separator, _)) => format!("{prefix}{separator}{digits}{snapshot}"),
        None => format!("{base}-{digits}{snapshot}"),
    }
}

/// Suffix without its own build number: `redhat-5` becomes `redhat`
pub fn suffix_base(suffix: &str) -> String {
    TRAILING_NUMBER.replace(suffix, "").into_owned()
}

/// Remove a trailing `[.-_]<suffix base>[-N]` qualifier, keeping any
/// snapshot tail
pub fn strip_suffix(version: &str, suffix: &str) -> String {
    let (base, snapshot) = split_snapshot(version);
    match suffix_match(base, &suffix_base(suffix)) {
        Some((kept, _)) => format!("{kept}{snapshot}"),
        None => version.to_string(),
    }
}

/// `(version before the suffix, build number)` when `version` ends in the
/// suffix base
pub(crate) fn suffix_match<'a>(version: &'a str, base: &str) -> Option<(&'a str, Option<&'a str>)> {
    if base.is_empty() {
        return None;
    }
    let pattern = format!(r"^(.*?)[.\-_]{}(?:[.\-_](\d+))?$", regex::escape(base));
    let regex = Regex::new(&pattern).ok()?;
    let captures = regex.captures(version)?;
    Some((captures.get(1)?.as_str(), captures.get(2).map(|m| m.as_str())))
}

/// Append `suffix` as a qualifier.
///
/// An existing qualifier with the same suffix base is replaced, unless the
/// suffix carries no build number of its own, in which case the version is
/// already suffixed and returned unchanged. The separator is `.` after a
/// purely numeric version and `-` after a qualifier.
pub fn append_qualifier_suffix(version: &str, suffix: &str) -> String {
    let (mut base, snapshot) = split_snapshot(version);
    let stem = suffix_base(suffix);

    if let Some((kept, _)) = suffix_match(base, &stem) {
        if stem == suffix {
            return version.to_string();
        }
        base = kept;
    }

    let separator = match split_numeric(base) {
        Some((_, "")) => ".",
        _ => "-",
    };
    format!("{base}{separator}{suffix}{snapshot}")
}

/// OSGi form: three numeric segments, qualifier after a `.` with any
/// character outside `[A-Za-z0-9_-]` replaced by `-`. A snapshot tail is
/// kept as `-SNAPSHOT`. Versions not starting with a number are returned
/// unchanged.
pub fn osgi_version(version: &str) -> String {
    let (base, snapshot) = split_snapshot(version);
    let Some((numeric, qualifier)) = split_numeric(base) else {
        return version.to_string();
    };

    let mut segments: Vec<String> = numeric.iter().take(3).map(|s| s.to_string()).collect();
    while segments.len() < 3 {
        segments.push("0".to_string());
    }

    let mut qualifier_parts: Vec<&str> = numeric.iter().skip(3).copied().collect();
    if !qualifier.is_empty() {
        qualifier_parts.push(qualifier);
    }
    let qualifier: String = qualifier_parts
        .join(".")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();

    let mut osgi = segments.join(".");
    if !qualifier.is_empty() {
        osgi.push('.');
        osgi.push_str(&qualifier);
    }
    osgi.push_str(snapshot);
    osgi
}

/// Comparable form of everything before the build number: numeric part
/// padded to three segments and `.`, `-` and `_` treated alike
fn matching_prefix(version: &str) -> String {
    let base = remove_snapshot_ref(version);
    let prefix = split_build_number(base).map_or(base, |(prefix, _, _)| prefix);
    osgi_version(prefix).replace(['-', '_'], ".")
}

/// Largest build number among `candidates` whose version equals `version`
/// up to the build number. 0 when none matches.
pub fn find_highest_matching_build_number<'a, I>(version: &str, candidates: I) -> u64
where
    I: IntoIterator<Item = &'a String>,
{
    let wanted = matching_prefix(version);
    candidates
        .into_iter()
        .filter(|candidate| has_build_number(candidate))
        .filter(|candidate| matching_prefix(candidate) == wanted)
        .map(|candidate| integer_build_number(candidate))
        .max()
        .unwrap_or(0)
}

/// Width to pad build numbers to: the configured width or the widest zero
/// padded build number among `candidates`, whichever is larger
pub fn build_number_padding<'a, I>(configured: usize, candidates: I) -> usize
where
    I: IntoIterator<Item = &'a String>,
{
    candidates
        .into_iter()
        .filter_map(|candidate| build_number(candidate))
        .filter(|digits| digits.len() > 1 && digits.starts_with('0'))
        .map(str::len)
        .fold(configured, usize::max)
}

/// Left-pad `number` with zeros to `width`
pub fn pad_build_number(number: u64, width: usize) -> String {
    format!("{number:0>width$}")
}
