//! Pre-release label handling for semantic versioning
//!
//! Release candidates are labelled `rc.N`. Precedence between labels follows
//! semver.org (https://semver.org/#spec-item-11) via [`semver::Prerelease`].

use std::sync::OnceLock;

use regex::Regex;
use semver::Prerelease;

use crate::error::{PromoteError, Result};

/// Identifier used for release candidate labels
pub const CANDIDATE_TOKEN: &str = "rc";

fn trailing_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)(\D*)$").expect("static regex"))
}

/// The first release candidate label, `rc.0`.
pub fn first_candidate() -> Prerelease {
    Prerelease::new(&format!("{}.0", CANDIDATE_TOKEN)).expect("static prerelease label")
}

/// Whether a label marks a release candidate (`rc`, `rc.3`, `rc1`, ...).
pub fn is_candidate(pre: &Prerelease) -> bool {
    !pre.is_empty() && pre.as_str().starts_with(CANDIDATE_TOKEN)
}

/// Increment the last number in a label.
///
/// `rc.0` -> `rc.1`, `rc1` -> `rc2`. A label without any digits gets `.0`
/// appended (`rc` -> `rc.0`), which still sorts after the original. An empty
/// label becomes the first candidate.
pub fn increment(pre: &Prerelease) -> Result<Prerelease> {
    if pre.is_empty() {
        return Ok(first_candidate());
    }

    let label = pre.as_str();
    let next = match trailing_number().captures(label) {
        Some(captures) => {
            let digits = &captures[1];
            let number: u64 = digits.parse().map_err(|_| {
                PromoteError::malformed_tag(label, "pre-release counter is out of range")
            })?;
            let next = number.checked_add(1).ok_or_else(|| {
                PromoteError::malformed_tag(label, "pre-release counter is out of range")
            })?;
            let start = captures.get(1).map_or(0, |m| m.start());
            format!("{}{}{}", &label[..start], next, &captures[2])
        }
        None => format!("{}.0", label),
    };

    Prerelease::new(&next).map_err(|e| PromoteError::malformed_tag(next.clone(), e.to_string()))
}
