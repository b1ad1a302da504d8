use crate::version::{osgi_version, remove_snapshot, suffix_base, suffix_match};
use regex::Regex;

/// Whether `new` is a legal realignment of `old`.
///
/// `new` must be `old` (or its OSGi form) optionally followed by
/// `[.-]<suffix>-N`. With `ignore_suffix`, a suffix `old` already carries is
/// dropped first and `new` must then carry a build number at least as high.
pub fn check_strict_value(old: &str, new: &str, suffix: &str, ignore_suffix: bool) -> bool {
    if old == new {
        return true;
    }

    let stem = suffix_base(suffix);
    let old = remove_snapshot(old);
    let new = remove_snapshot(new);

    let mut base = old.as_str();
    let mut minimum: Option<u64> = None;
    if ignore_suffix {
        if let Some((kept, number)) = suffix_match(&old, &stem) {
            base = kept;
            minimum = Some(number.and_then(|n| n.parse().ok()).unwrap_or(0));
        }
    }

    let rest_pattern = (!stem.is_empty())
        .then(|| Regex::new(&format!(r"^[.\-]{}-(\d+)$", regex::escape(&stem))).ok())
        .flatten();

    let osgi = osgi_version(base);
    [base, osgi.as_str()].into_iter().any(|candidate| {
        if new == candidate {
            return minimum.is_none();
        }
        let (Some(rest), Some(pattern)) = (new.strip_prefix(candidate), &rest_pattern) else {
            return false;
        };
        pattern
            .captures(rest)
            .and_then(|c| c.get(1))
            .and_then(|n| n.as_str().parse::<u64>().ok())
            .is_some_and(|n| n >= minimum.unwrap_or(0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_strict_value_table() {
        // (old, new, expected, ignore suffix)
        let rows = [
            ("2.6", "2.6.0.redhat-9", true, false),
            ("2.6", "2.6.0", true, false),
            ("1.0.0", "1.0.0", true, false),
            ("1", "1.0.0.redhat-1", true, false),
            ("2.6.0.Final", "2.6.0.Final-redhat-5", true, false),
            ("2.6.Final", "2.6.0.Final-redhat-3", true, false),
            ("2.5", "2.5.0-redhat-3", true, false),
            ("2.6.Final", "2.6.1.Final-redhat-3", false, false),
            ("1.0.jbossorg-1", "1.0.redhat-1", false, false),
            ("1.0.redhat-4", "1.0.redhat-3", false, false),
            ("3.2.1.redhat-4", "3.2.1.redhat-3", false, false),
            ("3.2.redhat-4", "3.2.redhat-5", false, false),
            ("3.2.0.redhat-4", "3.2.0.redhat-6", true, true),
            ("3.2.0.redha-1", "3.2.0.redhat-6", false, true),
            ("3.1.0.redhat-1", "3.2.0.redhat-1", false, true),
            ("3.2.0.redhat-6", "3.2.0.redhat-4", false, true),
            ("3.2.0.redhat-5", "3.2.0.redhat-6", false, false),
            ("1.2.0.redhat-1", "3.2.0.redhat-6", false, true),
            ("3.2.0.Final.redhat-6", "3.2.0.redhat-4", false, false),
            ("3.2.redhat-1", "3.2.0.redhat-4", true, true),
            ("3.2.Qualifier", "3.2.Qualifier-redhat-5", true, false),
            ("2.6.0.temporary-redhat-2", "2.6.0.temporary-redhat-1", false, true),
            ("2.6.0.temporary-redhat-2", "2.6.0.temporary-redhat-3", true, true),
            ("1.0.0", "1.0.0.Final.temporary-redhat-1", false, true),
            ("3.2.0.Final-redhat-10", "3.2.1.Final-temporary-redhat-6", false, true),
            ("3.2.0.temporary-redhat-4", "3.2.0.temporary-redhat-5", true, true),
            ("6.2.0.Final-temporary-redhat-2", "6.2.0.Final-redhat-1", false, true),
        ];

        for (old, new, expected, ignore_suffix) in rows {
            assert_eq!(
                check_strict_value(old, new, "redhat-5", ignore_suffix),
                expected,
                "{old} --> {new}"
            );
        }
    }

    #[test]
    fn test_snapshot_is_ignored() {
        assert!(check_strict_value("1.0-SNAPSHOT", "1.0.0.redhat-1", "redhat-1", true));
        assert!(!check_strict_value("1.0-SNAPSHOT", "1.1.0.redhat-1", "redhat-1", true));
    }

    #[test]
    fn test_without_suffix_only_osgi_form_is_accepted() {
        assert!(check_strict_value("1.0", "1.0.0", "", true));
        assert!(!check_strict_value("1.0", "1.0.0.redhat-1", "", true));
    }
}
