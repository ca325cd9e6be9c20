//! Semantic versions and the range predicate used to gate version-sensitive behavior.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

/// Target technology 5.4 and later.
pub const V5_4_OR_GREATER: &str = ">=5.4.0";
/// Target technology 7.0 and later.
pub const V7_OR_GREATER: &str = ">=7.0.0";

/// Errors raised while parsing versions and range expressions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("invalid version '{0}', expected 'X.Y.Z'")]
    InvalidVersion(String),

    #[error("invalid version range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },
}

impl VersionError {
    fn range(range: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            range: range.to_string(),
            reason: reason.into(),
        }
    }
}

/// A `major.minor.patch` semantic version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct SemVer {
    major: u64,
    minor: u64,
    patch: u64,
}

impl SemVer {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Check this version against a range expression such as `>=5.4.0` or `2.x`.
    pub fn satisfies(&self, range: &str) -> bool {
        satisfies(self, range)
    }
}

impl TryFrom<String> for SemVer {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for SemVer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemVer {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::InvalidVersion(s.to_string());
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let number = |part: &str| part.parse::<u64>().map_err(|_| invalid());
        Ok(Self {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: number(parts[2])?,
        })
    }
}

/// A comparison operator in a desugared range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

/// A single `operator version` test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator {
    pub operator: Operator,
    pub version: SemVer,
}

impl Comparator {
    const fn new(operator: Operator, version: SemVer) -> Self {
        Self { operator, version }
    }

    pub fn test(&self, version: &SemVer) -> bool {
        let ordering = version.cmp(&self.version);
        match self.operator {
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ge => ordering != Ordering::Less,
            Operator::Gt => ordering == Ordering::Greater,
        }
    }
}

/// A parsed range expression.
///
/// Supports the node-semver subset used by MetaEd plugins: primitive
/// comparators (`>=a.b.c`, `<x.y.z`), whitespace-joined intersections,
/// `||` unions, hyphen ranges, caret and tilde ranges, and `x`/`*`
/// wildcards such as `2.x` or `3.1.x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    /// Union of intersections. An empty intersection matches every version.
    sets: Vec<Vec<Comparator>>,
}

impl VersionRange {
    pub fn parse(range: &str) -> Result<Self, VersionError> {
        let sets = range
            .split("||")
            .map(|set| parse_set(range, set))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sets })
    }

    pub fn matches(&self, version: &SemVer) -> bool {
        self.sets
            .iter()
            .any(|set| set.iter().all(|comparator| comparator.test(version)))
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Check whether `version` satisfies the range expression.
///
/// An unparseable range never matches.
pub fn satisfies(version: &SemVer, range: &str) -> bool {
    VersionRange::parse(range)
        .map(|parsed| parsed.matches(version))
        .unwrap_or(false)
}

/// A version with possibly wildcarded trailing components.
#[derive(Debug, Clone, Copy)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
}

impl Partial {
    fn floor(&self) -> SemVer {
        SemVer::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        )
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    /// First version above every version the partial covers.
    fn ceiling(&self) -> Option<SemVer> {
        match (self.major, self.minor) {
            (None, _) => None,
            (Some(major), None) => Some(SemVer::new(major + 1, 0, 0)),
            (Some(major), Some(minor)) => Some(SemVer::new(major, minor + 1, 0)),
        }
    }
}

fn parse_partial(range: &str, text: &str) -> Result<Partial, VersionError> {
    let text = text.strip_prefix('v').unwrap_or(text);
    let parts: Vec<&str> = text.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(VersionError::range(range, format!("bad version '{text}'")));
    }

    let mut numbers = [None; 3];
    let mut wildcard_seen = false;
    for (slot, part) in numbers.iter_mut().zip(parts.iter()) {
        if matches!(*part, "x" | "X" | "*") {
            wildcard_seen = true;
            continue;
        }
        if wildcard_seen {
            return Err(VersionError::range(
                range,
                format!("number after wildcard in '{text}'"),
            ));
        }
        let number = part
            .parse::<u64>()
            .map_err(|_| VersionError::range(range, format!("bad version '{text}'")))?;
        *slot = Some(number);
    }

    Ok(Partial {
        major: numbers[0],
        minor: numbers[1],
        patch: numbers[2],
    })
}

fn split_operator(token: &str) -> (&str, &str) {
    for op in [">=", "<=", ">", "<", "=", "^", "~"] {
        if let Some(rest) = token.strip_prefix(op) {
            return (op, rest);
        }
    }
    ("", token)
}

fn parse_set(range: &str, set: &str) -> Result<Vec<Comparator>, VersionError> {
    // Operators may be separated from their version by whitespace (">= 5.4.0").
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_operator: Option<String> = None;
    for raw in set.split_whitespace() {
        if let Some(op) = pending_operator.take() {
            tokens.push(format!("{op}{raw}"));
        } else if matches!(raw, ">=" | "<=" | ">" | "<" | "=" | "^" | "~") {
            pending_operator = Some(raw.to_string());
        } else {
            tokens.push(raw.to_string());
        }
    }
    if pending_operator.is_some() {
        return Err(VersionError::range(range, "operator without a version"));
    }

    if tokens.len() == 3 && tokens[1] == "-" {
        return hyphen_range(range, &tokens[0], &tokens[2]);
    }

    let mut comparators = Vec::new();
    for token in &tokens {
        let (op, version) = split_operator(token);
        if version.is_empty() {
            return Err(VersionError::range(range, "operator without a version"));
        }
        let partial = parse_partial(range, version)?;
        desugar(op, partial, &mut comparators);
    }
    Ok(comparators)
}

fn hyphen_range(range: &str, low: &str, high: &str) -> Result<Vec<Comparator>, VersionError> {
    let low = parse_partial(range, low)?;
    let high = parse_partial(range, high)?;
    let mut comparators = vec![Comparator::new(Operator::Ge, low.floor())];
    if high.is_full() {
        comparators.push(Comparator::new(Operator::Le, high.floor()));
    } else if let Some(ceiling) = high.ceiling() {
        comparators.push(Comparator::new(Operator::Lt, ceiling));
    }
    Ok(comparators)
}

fn desugar(op: &str, partial: Partial, out: &mut Vec<Comparator>) {
    use Operator::*;

    let floor = partial.floor();
    match op {
        ">=" => out.push(Comparator::new(Ge, floor)),
        "<" => out.push(Comparator::new(Lt, floor)),
        ">" => match (partial.is_full(), partial.ceiling()) {
            (true, _) => out.push(Comparator::new(Gt, floor)),
            (false, Some(ceiling)) => out.push(Comparator::new(Ge, ceiling)),
            // ">*" matches nothing
            (false, None) => out.push(Comparator::new(Lt, SemVer::default())),
        },
        "<=" => match (partial.is_full(), partial.ceiling()) {
            (true, _) => out.push(Comparator::new(Le, floor)),
            (false, Some(ceiling)) => out.push(Comparator::new(Lt, ceiling)),
            (false, None) => {}
        },
        "^" => {
            out.push(Comparator::new(Ge, floor));
            let ceiling = match (partial.major, partial.minor, partial.patch) {
                (Some(major), _, _) if major > 0 => Some(SemVer::new(major + 1, 0, 0)),
                (Some(0), Some(minor), _) if minor > 0 => Some(SemVer::new(0, minor + 1, 0)),
                (Some(0), Some(0), Some(patch)) => Some(SemVer::new(0, 0, patch + 1)),
                _ => partial.ceiling(),
            };
            if let Some(ceiling) = ceiling {
                out.push(Comparator::new(Lt, ceiling));
            }
        }
        "~" => {
            out.push(Comparator::new(Ge, floor));
            let ceiling = match (partial.major, partial.minor) {
                (Some(major), Some(minor)) => Some(SemVer::new(major, minor + 1, 0)),
                _ => partial.ceiling(),
            };
            if let Some(ceiling) = ceiling {
                out.push(Comparator::new(Lt, ceiling));
            }
        }
        // bare or "=": exact when fully specified, otherwise an x-range
        _ => {
            if partial.is_full() {
                out.push(Comparator::new(Eq, floor));
            } else if let Some(ceiling) = partial.ceiling() {
                out.push(Comparator::new(Ge, floor));
                out.push(Comparator::new(Lt, ceiling));
            }
        }
    }
}
