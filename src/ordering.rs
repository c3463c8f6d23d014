//! Directory name ordering strategies.
//!
//! Two interchangeable comparators, chosen once per session: the current
//! case-insensitive ordinal order, and a legacy order matching the output of
//! a discontinued reporting tool. The legacy order exists only so captured
//! reference listings diff clean; it must not be "improved".

use std::cmp::Ordering;

/// How directory names are sorted during traversal.
///
/// File names always sort case-insensitive ordinal regardless of this
/// choice; only directory names use the legacy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOrdering {
    CaseInsensitive,
    Legacy,
}

impl DirOrdering {
    pub fn for_legacy(legacy: bool) -> Self {
        if legacy {
            DirOrdering::Legacy
        } else {
            DirOrdering::CaseInsensitive
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            DirOrdering::CaseInsensitive => compare_case_insensitive(a, b),
            DirOrdering::Legacy => compare_legacy(a, b),
        }
    }
}

/// Case-insensitive ordinal comparison, raw tie-break for determinism.
pub fn compare_case_insensitive(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .map(lower)
        .cmp(b.chars().map(lower));
    match folded {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}

/// Character priority table of the legacy report tool, found by matching
/// its directory ordering experimentally. Uppercase letters are absent on
/// purpose: when one falls outside the table the comparison drops to raw
/// character codes, and that quirk is part of the reference output.
const LEGACY_CHAR_ORDER: &[char] = &[
    ' ', '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', //
    ':', '<', '=', '>', '?', '@', //
    '\\', ']', '^', '`', //
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', //
    ';', //
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', //
    '[', '_', //
    '{', '|', '}', '~',
];

/// Compare two names the way the legacy tool sorted directories.
///
/// Characters are lowercased, then ordered by table position when both
/// appear in the table, by raw character code otherwise. Equal prefixes
/// compare by length.
pub fn compare_legacy(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars();
    let mut bi = b.chars();
    loop {
        match (ai.next(), bi.next()) {
            (Some(ca), Some(cb)) => {
                let result = compare_legacy_chars(ca, cb);
                if result != Ordering::Equal {
                    return result;
                }
            }
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
        }
    }
}

fn compare_legacy_chars(a: char, b: char) -> Ordering {
    let a = lower(a);
    let b = lower(b);
    if a == b {
        return Ordering::Equal;
    }
    let idx_a = LEGACY_CHAR_ORDER.iter().position(|&c| c == a);
    let idx_b = LEGACY_CHAR_ORDER.iter().position(|&c| c == b);
    match (idx_a, idx_b) {
        (Some(ia), Some(ib)) => ia.cmp(&ib),
        _ => a.cmp(&b),
    }
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
