//! Semantic version parsing and precedence.
//!
//! Accepts `MAJOR.MINOR.PATCH`, an optional leading `v`, and optional
//! `-pre.release` and `+build` suffixes. Ordering follows SemVer 2.0
//! precedence; build metadata is ignored when comparing.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Why a version string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid semantic version '{version}': {reason}")]
pub struct ParseVersionError {
    /// The rejected input.
    pub version: String,
    /// What is wrong with it.
    pub reason: &'static str,
}

/// One dot-separated pre-release identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// All-digit identifier without leading zeros, compared numerically at
    /// any length.
    Numeric(String),
    /// Identifier containing letters or hyphens, compared lexically.
    AlphaNumeric(String),
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // No leading zeros, so the longer digit string is the larger number.
            (Identifier::Numeric(a), Identifier::Numeric(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Identifier::Numeric(_), Identifier::AlphaNumeric(_)) => Ordering::Less,
            (Identifier::AlphaNumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::AlphaNumeric(a), Identifier::AlphaNumeric(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(s) | Identifier::AlphaNumeric(s) => f.write_str(s),
        }
    }
}

/// A parsed semantic version.
#[derive(Debug, Clone)]
pub struct Version {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Pre-release identifiers; empty for a release.
    pub pre: Vec<Identifier>,
    /// Build metadata identifiers, ignored for precedence.
    pub build: Vec<String>,
}

impl Version {
    /// Parse a version string.
    pub fn parse(input: &str) -> Result<Self, ParseVersionError> {
        let fail = |reason| ParseVersionError {
            version: input.to_string(),
            reason,
        };

        let s = input.strip_prefix('v').unwrap_or(input);
        if s.is_empty() {
            return Err(fail("version cannot be empty"));
        }

        let (rest, build) = match s.split_once('+') {
            Some((rest, build)) => (rest, Some(build)),
            None => (s, None),
        };
        let (core, pre) = match rest.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (rest, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(fail("expected MAJOR.MINOR.PATCH"));
        }
        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            let digits = numeric(part).map_err(&fail)?;
            *slot = digits.parse().map_err(|_| fail("component out of range"))?;
        }

        let pre = match pre {
            Some(pre) => pre
                .split('.')
                .map(|id| {
                    if !is_identifier(id) {
                        return Err(fail("malformed pre-release identifier"));
                    }
                    if id.bytes().all(|b| b.is_ascii_digit()) {
                        numeric(id)
                            .map(|digits| Identifier::Numeric(digits.to_string()))
                            .map_err(&fail)
                    } else {
                        Ok(Identifier::AlphaNumeric(id.to_string()))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let build = match build {
            Some(build) => build
                .split('.')
                .map(|id| {
                    if is_identifier(id) {
                        Ok(id.to_string())
                    } else {
                        Err(fail("malformed build identifier"))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
            build,
        })
    }

    /// Check whether this is a pre-release.
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

/// Digits only, no leading zero unless the value is `0`.
fn numeric(s: &str) -> Result<&str, &'static str> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err("components must be numeric");
    }
    if s.len() > 1 && s.starts_with('0') {
        return Err("numeric identifiers must not have leading zeros");
    }
    Ok(s)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // A release outranks any of its pre-releases.
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            let pre: Vec<String> = self.pre.iter().map(ToString::to_string).collect();
            write!(f, "-{}", pre.join("."))?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build.join("."))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_release() {
        let version = v("1.2.3");
        assert_eq!((version.major, version.minor, version.patch), (1, 2, 3));
        assert!(!version.is_prerelease());
        assert_eq!(version.to_string(), "1.2.3");
    }

    #[test]
    fn test_parse_prefix_pre_and_build() {
        let version = v("v2.0.0-rc.1+build.5");
        assert_eq!(version.major, 2);
        assert_eq!(
            version.pre,
            vec![
                Identifier::AlphaNumeric("rc".to_string()),
                Identifier::Numeric("1".to_string())
            ]
        );
        assert_eq!(version.build, vec!["build", "5"]);
        assert_eq!(version.to_string(), "2.0.0-rc.1+build.5");
    }

    #[test]
    fn test_rejects_invalid() {
        for input in [
            "", "v", "invalid", "not-semver", "1", "1.2", "1.2.3.4", "01.2.3", "1.2.x",
            "1.2.3-", "1.2.3-alpha..1", "1.2.3-01", "1.2.3+", "1.2.3+bu_ild",
        ] {
            assert!(Version::parse(input).is_err(), "{input:?} should not parse");
        }
    }

    #[test]
    fn test_large_numeric_prerelease() {
        let big = v("1.0.0-18446744073709551616");
        assert_eq!(
            big.pre,
            vec![Identifier::Numeric("18446744073709551616".to_string())]
        );
        assert!(big > v("1.0.0-18446744073709551615"));
        assert!(big > v("1.0.0-99"));
        assert!(big < v("1.0.0-alpha"));
        assert!(big < v("1.0.0"));
    }

    #[test]
    fn test_error_reasons() {
        let err = Version::parse("18446744073709551616.0.0").unwrap_err();
        assert_eq!(err.reason, "component out of range");
        let err = Version::parse("1.0.0-01").unwrap_err();
        assert_eq!(err.reason, "numeric identifiers must not have leading zeros");
        let err = Version::parse("1.x.0").unwrap_err();
        assert_eq!(err.reason, "components must be numeric");
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.10.0") > v("1.9.0"));
        assert!(v("2.0.0") > v("1.99.99"));
        assert!(v("1.0.1") > v("1.0.0"));
    }

    #[test]
    fn test_prerelease_precedence() {
        // Ordering example from the SemVer 2.0 document.
        let ordered = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_build_metadata_ignored_for_precedence() {
        assert_eq!(v("1.0.0+a"), v("1.0.0+b"));
        assert_eq!(v("v1.0.0").cmp(&v("1.0.0")), Ordering::Equal);
    }
}
