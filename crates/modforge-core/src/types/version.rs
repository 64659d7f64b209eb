//! Semantic version types.
//!
//! Provides Version and VersionReq types with semantic versioning precedence.
//! A `VersionReq` keeps the text it was parsed from so that
//! conflict reports can quote constraints exactly as a release declared them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic version (major.minor.patch-prerelease+build)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

/// Version requirement (`1.0.0`, `>= 1.0.0`, `~2.3.0`, `1.x`, `>=1.0.0 <2.0.0`)
///
/// An empty comparator list is the unconstrained requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    pub comparators: Vec<Comparator>,
    raw: String,
}

/// Individual version comparator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub version: PartialVersion,
}

/// Comparison operator for version requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Exact,     // =1.0.0
    Greater,   // >1.0.0
    GreaterEq, // >=1.0.0
    Less,      // <1.0.0
    LessEq,    // <=1.0.0
    Tilde,     // ~1.0.0
    Caret,     // ^1.0.0
    Wildcard,  // *
}

/// Partial version for comparisons (may have missing components)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub prerelease: Option<String>,
}

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("Invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("Dangling operator '{op}' in requirement: {input}")]
    DanglingOperator { op: String, input: String },
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// The `v`-prefixed form used in user-facing messages
    pub fn vstring(&self) -> String {
        format!("v{}", self)
    }

    /// Get the precedence for comparison (ignores build metadata)
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => {
                match (&self.prerelease, &other.prerelease) {
                    (None, None) => Ordering::Equal,
                    (Some(_), None) => Ordering::Less, // prerelease < normal
                    (None, Some(_)) => Ordering::Greater, // normal > prerelease
                    (Some(a), Some(b)) => a.cmp(b),    // lexical comparison
                }
            },
            other => other,
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        // Split on '+' for build metadata
        let (version_part, build) = match input.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (input, None),
        };

        // Split on '-' for prerelease
        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((c, p)) => (c, Some(p.to_string())),
            None => (version_part, None),
        };

        // Parse major.minor.patch
        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let major = parse_component(parts[0])?;
        let minor = parse_component(parts[1])?;
        let patch = parse_component(parts[2])?;

        Ok(Version {
            major,
            minor,
            patch,
            prerelease,
            build,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Version::from_str(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}

fn parse_component(component: &str) -> Result<u64, VersionError> {
    component.parse().map_err(|_| VersionError::InvalidNumber {
        component: component.to_string(),
    })
}

const OPERATORS: [(&str, Op); 7] = [
    (">=", Op::GreaterEq),
    ("<=", Op::LessEq),
    (">", Op::Greater),
    ("<", Op::Less),
    ("=", Op::Exact),
    ("^", Op::Caret),
    ("~", Op::Tilde),
];

impl VersionReq {
    /// The unconstrained requirement: every version matches
    pub fn any() -> Self {
        Self {
            comparators: Vec::new(),
            raw: String::new(),
        }
    }

    /// Requirement matching exactly one version
    pub fn exact(version: &Version) -> Self {
        Self {
            comparators: vec![Comparator {
                op: Op::Exact,
                version: PartialVersion::from(version),
            }],
            raw: version.to_string(),
        }
    }

    /// Parse a version requirement string
    ///
    /// Comparators are separated by whitespace and must all hold. An operator
    /// may be separated from its version by spaces (`>= 1.0.0`).
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Ok(Self::any());
        }

        let mut comparators = Vec::new();
        let mut tokens = raw.split_whitespace();
        while let Some(token) = tokens.next() {
            let (op, rest) = split_operator(token);
            let version_str = if rest.is_empty() {
                match tokens.next() {
                    Some(next) => next,
                    None => {
                        return Err(VersionError::DanglingOperator {
                            op: token.to_string(),
                            input: raw.to_string(),
                        })
                    },
                }
            } else {
                rest
            };

            comparators.push(parse_comparator(op, version_str)?);
        }

        Ok(VersionReq {
            comparators,
            raw: raw.to_string(),
        })
    }

    /// Check if a version matches this requirement
    pub fn matches(&self, version: &Version) -> bool {
        self.comparators.iter().all(|comp| comp.matches(version))
    }

    /// Whether this requirement accepts every version
    pub fn is_any(&self) -> bool {
        self.comparators.iter().all(|comp| comp.op == Op::Wildcard)
    }

    /// The single version this requirement pins, if it is a full exact match
    pub fn exact_version(&self) -> Option<Version> {
        match self.comparators.as_slice() {
            [Comparator {
                op: Op::Exact,
                version,
            }] if version.minor.is_some() && version.patch.is_some() => {
                Some(version.to_version())
            },
            _ => None,
        }
    }

    /// The text this requirement was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for VersionReq {
    fn default() -> Self {
        Self::any()
    }
}

impl FromStr for VersionReq {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionReq::parse(s)
    }
}

impl fmt::Display for VersionReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw.is_empty() {
            f.write_str("*")
        } else {
            f.write_str(&self.raw)
        }
    }
}

fn split_operator(token: &str) -> (Op, &str) {
    for (prefix, op) in OPERATORS {
        if let Some(stripped) = token.strip_prefix(prefix) {
            return (op, stripped);
        }
    }
    (Op::Exact, token)
}

fn parse_comparator(op: Op, version_str: &str) -> Result<Comparator, VersionError> {
    let version_str = version_str.trim().trim_start_matches('v');
    if matches!(version_str, "*" | "x" | "X") {
        return Ok(Comparator {
            op: Op::Wildcard,
            version: PartialVersion::new(0, None, None),
        });
    }

    // Full versions keep their prerelease tag
    if let Ok(version) = Version::from_str(version_str) {
        return Ok(Comparator {
            op,
            version: PartialVersion::from(&version),
        });
    }

    // Partial versions: `1`, `1.2`, `1.x`, `1.2.x`
    let parts: Vec<&str> = version_str.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(VersionError::InvalidFormat {
            input: version_str.to_string(),
        });
    }

    let is_wild = |part: &str| matches!(part, "x" | "X" | "*");
    let major = parse_component(parts[0])?;
    let mut minor = None;
    let mut patch = None;
    if let Some(part) = parts.get(1) {
        if !is_wild(part) {
            minor = Some(parse_component(part)?);
        }
    }
    if let Some(part) = parts.get(2) {
        if !is_wild(part) {
            if minor.is_none() {
                return Err(VersionError::InvalidFormat {
                    input: version_str.to_string(),
                });
            }
            patch = Some(parse_component(part)?);
        }
    }

    Ok(Comparator {
        op,
        version: PartialVersion::new(major, minor, patch),
    })
}

impl Comparator {
    /// Check if a version matches this comparator
    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Exact => self.version.matches_exact(version),
            Op::Wildcard => true,
            Op::Greater => self
                .version
                .upper_bound()
                .map_or(false, |bound| version >= &bound),
            Op::GreaterEq => version >= &self.version.to_version(),
            Op::Less => version < &self.version.to_version(),
            Op::LessEq => self
                .version
                .upper_bound()
                .map_or(true, |bound| version < &bound),
            Op::Tilde => self.version.matches_tilde(version),
            Op::Caret => self.version.matches_caret(version),
        }
    }
}

impl PartialVersion {
    /// Create a partial version without prerelease tag
    pub fn new(major: u64, minor: Option<u64>, patch: Option<u64>) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Convert to a full version (filling missing parts with 0)
    pub fn to_version(&self) -> Version {
        Version {
            major: self.major,
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            prerelease: self.prerelease.clone(),
            build: None,
        }
    }

    /// First version above every version this partial version covers
    ///
    /// `None` when no such version exists because a component is at its
    /// maximum.
    fn upper_bound(&self) -> Option<Version> {
        match (self.minor, self.patch) {
            (None, _) => self
                .major
                .checked_add(1)
                .map(|major| Version::new(major, 0, 0)),
            (Some(minor), None) => match minor.checked_add(1) {
                Some(minor) => Some(Version::new(self.major, minor, 0)),
                None => PartialVersion::new(self.major, None, None).upper_bound(),
            },
            (Some(minor), Some(patch)) => {
                if self.prerelease.is_some() {
                    // Any later prerelease or the release itself
                    let mut next = self.to_version();
                    next.prerelease = next.prerelease.map(|pre| format!("{}.0", pre));
                    return Some(next);
                }
                match patch.checked_add(1) {
                    Some(patch) => Some(Version::new(self.major, minor, patch)),
                    None => PartialVersion::new(self.major, Some(minor), None).upper_bound(),
                }
            },
        }
    }

    /// Check exact match
    fn matches_exact(&self, version: &Version) -> bool {
        version.major == self.major
            && self.minor.map_or(true, |m| version.minor == m)
            && self.patch.map_or(true, |p| version.patch == p)
            && version.prerelease == self.prerelease
    }

    /// Check tilde match (~1.2.3 allows >=1.2.3 <1.3.0)
    fn matches_tilde(&self, version: &Version) -> bool {
        if version.major != self.major {
            return false;
        }

        match self.minor {
            Some(minor) => version.minor == minor && version.patch >= self.patch.unwrap_or(0),
            None => true,
        }
    }

    /// Check caret match (^1.2.3 allows >=1.2.3 <2.0.0)
    fn matches_caret(&self, version: &Version) -> bool {
        if version.major != self.major {
            return false;
        }

        let base_version = self.to_version();
        version >= &base_version
    }
}

impl From<&Version> for PartialVersion {
    fn from(version: &Version) -> Self {
        Self {
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            prerelease: version.prerelease.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::from_str(s).unwrap()
    }

    #[test]
    fn test_version_parsing() {
        let v = Version::from_str("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
        assert_eq!(v.prerelease, None);
        assert_eq!(v.build, None);
    }

    #[test]
    fn test_version_with_prerelease() {
        let v = Version::from_str("1.2.3-alpha.1").unwrap();
        assert_eq!(v.prerelease, Some("alpha.1".to_string()));
        assert_eq!(v.build, None);
    }

    #[test]
    fn test_version_with_build() {
        let v = Version::from_str("1.2.3+build.1").unwrap();
        assert_eq!(v.prerelease, None);
        assert_eq!(v.build, Some("build.1".to_string()));
    }

    #[test]
    fn test_version_rejects_partial() {
        assert!(Version::from_str("1.2").is_err());
        assert!(Version::from_str("one.two.three").is_err());
        assert!(Version::from_str("").is_err());
    }

    #[test]
    fn test_version_display() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.to_string(), "1.2.3");
        assert_eq!(v.vstring(), "v1.2.3");

        let v = Version {
            major: 1,
            minor: 2,
            patch: 3,
            prerelease: Some("alpha".to_string()),
            build: Some("build".to_string()),
        };
        assert_eq!(v.to_string(), "1.2.3-alpha+build");
    }

    #[test]
    fn test_version_comparison() {
        let v1 = Version::new(1, 0, 0);
        let v2 = Version::new(2, 0, 0);
        let v3 = Version::new(1, 1, 0);

        assert!(v1 < v2);
        assert!(v1 < v3);
        assert!(v3 < v2);
        assert!(v("1.0.0-rc.1") < v1);
    }

    #[test]
    fn test_version_serde_as_string() {
        let json = serde_json::to_string(&Version::new(0, 0, 2)).unwrap();
        assert_eq!(json, "\"0.0.2\"");
        let parsed: Version = serde_json::from_str("\"1.7.1\"").unwrap();
        assert_eq!(parsed, Version::new(1, 7, 1));
        assert!(serde_json::from_str::<Version>("\"latest\"").is_err());
    }

    #[test]
    fn test_version_req_exact() {
        let req = VersionReq::parse("1.2.3").unwrap();
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(!req.matches(&Version::new(1, 2, 4)));
        assert_eq!(req.exact_version(), Some(Version::new(1, 2, 3)));
        assert_eq!(req.to_string(), "1.2.3");
    }

    #[test]
    fn test_version_req_any() {
        let empty = VersionReq::parse("  ").unwrap();
        assert!(empty.is_any());
        assert!(empty.matches(&Version::new(999, 999, 999)));
        assert_eq!(empty.to_string(), "*");

        let star = VersionReq::parse("*").unwrap();
        assert!(star.is_any());
        assert!(star.matches(&Version::new(1, 2, 3)));
        assert_eq!(star.exact_version(), None);
    }

    #[test]
    fn test_version_req_spaced_operator() {
        let req = VersionReq::parse(">= 1.0.0").unwrap();
        assert!(req.matches(&Version::new(1, 0, 0)));
        assert!(req.matches(&Version::new(1, 7, 1)));
        assert!(!req.matches(&Version::new(0, 0, 2)));
        assert_eq!(req.as_str(), ">= 1.0.0");
        assert_eq!(req.exact_version(), None);
    }

    #[test]
    fn test_version_req_conjunction() {
        let req = VersionReq::parse(">= 1.0.0 < 2.0.0").unwrap();
        assert_eq!(req.comparators.len(), 2);
        assert!(req.matches(&Version::new(1, 9, 9)));
        assert!(!req.matches(&Version::new(2, 0, 0)));
        assert!(!req.matches(&Version::new(0, 9, 0)));
    }

    #[test]
    fn test_version_req_partial_and_wildcards() {
        let req = VersionReq::parse("1.x").unwrap();
        assert!(req.matches(&Version::new(1, 0, 0)));
        assert!(req.matches(&Version::new(1, 9, 3)));
        assert!(!req.matches(&Version::new(2, 0, 0)));

        let req = VersionReq::parse("1.2").unwrap();
        assert!(req.matches(&Version::new(1, 2, 7)));
        assert!(!req.matches(&Version::new(1, 3, 0)));

        let req = VersionReq::parse(">1.2").unwrap();
        assert!(!req.matches(&Version::new(1, 2, 9)));
        assert!(req.matches(&Version::new(1, 3, 0)));

        let req = VersionReq::parse("<=1.2").unwrap();
        assert!(req.matches(&Version::new(1, 2, 9)));
        assert!(!req.matches(&Version::new(1, 3, 0)));
    }

    #[test]
    fn test_version_req_caret() {
        let req = VersionReq::parse("^1.2.3").unwrap();

        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(req.matches(&Version::new(1, 3, 0)));
        assert!(!req.matches(&Version::new(2, 0, 0)));
        assert!(!req.matches(&Version::new(0, 9, 9)));
    }

    #[test]
    fn test_version_req_tilde() {
        let req = VersionReq::parse("~1.2.3").unwrap();
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(req.matches(&Version::new(1, 2, 9)));
        assert!(!req.matches(&Version::new(1, 3, 0)));
    }

    #[test]
    fn test_version_req_operators() {
        let v1_2_3 = Version::new(1, 2, 3);
        let v1_2_4 = Version::new(1, 2, 4);
        let v1_3_0 = Version::new(1, 3, 0);

        let req = VersionReq::parse(">1.2.3").unwrap();
        assert!(!req.matches(&v1_2_3));
        assert!(req.matches(&v1_2_4));
        assert!(req.matches(&v1_3_0));

        let req = VersionReq::parse("<1.2.4").unwrap();
        assert!(req.matches(&v1_2_3));
        assert!(!req.matches(&v1_2_4));

        let req = VersionReq::parse("<=1.2.4").unwrap();
        assert!(req.matches(&v1_2_4));
        assert!(!req.matches(&v1_3_0));
    }

    #[test]
    fn test_version_req_bounds_at_component_maximum() {
        let max = u64::MAX;
        let top = Version::new(max, max, max);

        let req = VersionReq::parse(&format!("> {}", max)).unwrap();
        assert!(!req.matches(&top));
        assert!(!req.matches(&Version::new(1, 0, 0)));

        let req = VersionReq::parse(&format!("<= {}", max)).unwrap();
        assert!(req.matches(&top));

        let req = VersionReq::parse(&format!("> 1.{}", max)).unwrap();
        assert!(req.matches(&Version::new(2, 0, 0)));
        assert!(!req.matches(&Version::new(1, max, 7)));

        let req = VersionReq::parse(&format!("<= 3.4.{}", max)).unwrap();
        assert!(req.matches(&Version::new(3, 4, max)));
        assert!(!req.matches(&Version::new(3, 5, 0)));

        let req = VersionReq::parse(&format!("> {}.{}.{}", max, max, max)).unwrap();
        assert!(!req.matches(&top));
    }

    #[test]
    fn test_version_req_errors() {
        assert!(matches!(
            VersionReq::parse(">="),
            Err(VersionError::DanglingOperator { .. })
        ));
        assert!(VersionReq::parse("banana").is_err());
        assert!(VersionReq::parse("1.x.3").is_err());
        assert!(VersionReq::parse("1.2.3.4").is_err());
    }

    #[test]
    fn test_exact_constructor() {
        let req = VersionReq::exact(&Version::new(0, 0, 1));
        assert_eq!(req.as_str(), "0.0.1");
        assert!(req.matches(&Version::new(0, 0, 1)));
        assert!(!req.matches(&Version::new(0, 0, 2)));
    }
}
