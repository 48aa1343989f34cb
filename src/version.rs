//! Version ordering and selection for app versions.
//!
//! App versions on the portal are free-form strings such as `4.0.2`,
//! `1.3 ucs-2` or `2.0-rc1`, so strict semver does not apply. Comparison uses
//! a loose scheme: the string is split into runs of digits, runs of letters
//! and single other characters (dots are dropped). Runs are compared pairwise.
//! Numbers compare numerically, text compares lexically, and a number sorts
//! before text.

use std::cmp::Ordering;

use crate::app::AppVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Number(u64),
    Text(String),
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Component::Number(a), Component::Number(b)) => a.cmp(b),
            (Component::Text(a), Component::Text(b)) => a.cmp(b),
            (Component::Number(_), Component::Text(_)) => Ordering::Less,
            (Component::Text(_), Component::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A version string ordered component-wise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LooseVersion(Vec<Component>);

impl LooseVersion {
    pub fn parse(input: &str) -> Self {
        let mut components = Vec::new();
        let mut chars = input.char_indices().peekable();
        while let Some((start, first)) = chars.next() {
            let mut end = start + first.len_utf8();
            let same_run = |c: char| {
                (first.is_ascii_digit() && c.is_ascii_digit())
                    || (first.is_ascii_alphabetic() && c.is_ascii_alphabetic())
            };
            while let Some(&(at, c)) = chars.peek() {
                if !same_run(c) {
                    break;
                }
                end = at + c.len_utf8();
                chars.next();
            }

            let part = &input[start..end];
            if part == "." {
                continue;
            }
            components.push(match part.parse::<u64>() {
                Ok(n) if first.is_ascii_digit() => Component::Number(n),
                _ => Component::Text(part.to_string()),
            });
        }
        LooseVersion(components)
    }
}

/// Pick an app version among `candidates`.
///
/// With `wanted` set, only an exact string match qualifies. Without it the
/// highest version wins; among equal versions the later candidate is taken.
pub fn select_version<'a>(
    candidates: &'a [AppVersion],
    wanted: Option<&str>,
) -> Option<&'a AppVersion> {
    match wanted {
        Some(wanted) => candidates.iter().find(|app| app.version == wanted),
        None => candidates
            .iter()
            .max_by_key(|app| LooseVersion::parse(&app.version)),
    }
}

/// Version string for a copy of `current` within the same UCS version.
///
/// `1.0 ucs-2` becomes `1.0 ucs-3`; anything else gets ` ucs-1` appended.
pub fn next_app_version(current: &str) -> String {
    let bumped = current.rsplit_once(" ucs-").and_then(|(base, suffix)| {
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let next = suffix.parse::<u64>().ok()?.checked_add(1)?;
        Some(format!("{base} ucs-{next}"))
    });
    bumped.unwrap_or_else(|| format!("{current} ucs-1"))
}
