use core::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
    num::ParseIntError,
    str::FromStr,
};
use std::error::Error;

/// An error that can occur during parsing a version string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The version string was empty.
    Empty,
    /// One of the dot-separated components is not a non-negative integer.
    InvalidComponent {
        version: String,
        component: String,
        cause: Option<ParseIntError>,
    },
    /// Versions need at least a major and a minor component.
    TooFewComponents { version: String },
    /// Anything after the numeric part that is neither a stage nor a snapshot marker.
    InvalidQualifier { version: String, qualifier: String },
}

impl Display for ParseError {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            ParseError::Empty => fmt.write_str("empty version string"),
            ParseError::InvalidComponent { version, component, .. } => write!(
                fmt,
                "invalid version \"{}\": component \"{}\" is not a non-negative integer",
                version, component
            ),
            ParseError::TooFewComponents { version } => {
                write!(fmt, "invalid version \"{}\": expected at least two components", version)
            }
            ParseError::InvalidQualifier { version, qualifier } => {
                write!(fmt, "invalid version \"{}\": unexpected qualifier \"{}\"", version, qualifier)
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::InvalidComponent { cause: Some(err), .. } => Some(err),
            _ => None,
        }
    }
}

/// Pre-release stage kinds, in release order.
///
/// Names other than `milestone`, `preview` and `rc` (such as `alpha` or
/// `beta`) rank as `Unknown`. Names are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageKind {
    Milestone,
    Unknown,
    Preview,
    Rc,
}

impl StageKind {
    fn from_name(name: &str) -> Self {
        match name {
            "milestone" => StageKind::Milestone,
            "preview" => StageKind::Preview,
            "rc" => StageKind::Rc,
            _ => StageKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stage {
    pub kind: StageKind,
    /// Stage number times ten, plus the offset of a trailing `a`..`z` letter.
    pub minor: u64,
}

/// A release version such as `1.580`, `1.580.1`, `2.0-beta-1` or `1.600-SNAPSHOT`.
///
/// Ordering compares the numeric components one by one, so `1.6 < 1.598`.
/// When one version is a strict prefix of the other the shorter one is older,
/// staged versions are older than the release they precede, and a snapshot is
/// older than the same version without the marker.
#[derive(Debug, Clone)]
pub struct Version {
    text: String,
    components: Vec<u64>,
    stage: Option<Stage>,
    /// Build time in seconds since the Unix epoch, `0` for a bare `SNAPSHOT`.
    snapshot: Option<i64>,
}

impl Version {
    #[inline]
    pub fn from_str(s: &str) -> Result<Self, ParseError> {
        <Version as FromStr>::from_str(s)
    }

    /// Returns numeric components in order, major first.
    #[inline]
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    #[inline]
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    #[inline]
    pub fn is_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Returns the snapshot build time in UTC seconds since the Unix epoch.
    ///
    /// A bare `SNAPSHOT` marker reports `0`, older than any timestamped build.
    #[inline]
    pub fn snapshot_timestamp(&self) -> Option<i64> {
        self.snapshot
    }

    /// Returns the string this version was parsed from.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns `true` if this version is strictly older than `upper`.
    #[inline]
    pub fn is_older_than(&self, upper: &Version) -> bool {
        self < upper
    }

    /// Returns `true` if this version lies in `[lower, upper)`.
    #[inline]
    pub fn is_between(&self, lower: &Version, upper: &Version) -> bool {
        self >= lower && self.is_older_than(upper)
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let (base, qualifiers) = match s.find('-') {
            Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
            None => (s, None),
        };

        let mut components = Vec::new();
        for component in base.split('.') {
            components.push(parse_number(component).map_err(|cause| ParseError::InvalidComponent {
                version: s.into(),
                component: component.into(),
                cause,
            })?);
        }

        if components.len() < 2 {
            return Err(ParseError::TooFewComponents { version: s.into() });
        }

        let (stage, snapshot) = match qualifiers {
            Some(qualifiers) => parse_qualifiers(s, qualifiers)?,
            None => (None, None),
        };

        let v = Self {
            text: s.into(),
            components,
            stage,
            snapshot,
        };

        Ok(v)
    }
}

/// Parses a run of ASCII digits.
///
/// `u64::from_str` alone would accept a leading `+`, which is not a valid component.
fn parse_number(s: &str) -> Result<u64, Option<ParseIntError>> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(None);
    }

    s.parse().map_err(Some)
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Parses a stage number of the form `<digits>[a-z]`.
///
/// Returns `Ok(None)` for any other shape, which leaves the version unstaged.
fn parse_stage_minor(s: &str) -> Result<Option<u64>, ()> {
    let (digits, letter) = match s.as_bytes().last() {
        Some(&b) if b.is_ascii_lowercase() => (&s[..s.len() - 1], u64::from(b - b'a')),
        _ => (s, 0),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }

    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(10))
        .and_then(|n| n.checked_add(letter))
        .map(Some)
        .ok_or(())
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
///
/// Out-of-range months and days roll over into the neighbouring ones.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = year + (month - 1).div_euclid(12);
    let month = (month - 1).rem_euclid(12) + 1;

    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let doy = (153 * ((month + 9) % 12) + 2) / 5;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;

    era * 146_097 + doe - 719_468 + day - 1
}

/// Converts a `yyyyMMddHHmmss` stamp with a `hhmm` UTC offset into epoch seconds.
///
/// Both arguments must already be validated as ASCII digits.
fn snapshot_seconds(stamp: &str, sign: i64, offset: &str) -> i64 {
    let field = |from: usize, to: usize| stamp[from..to].parse::<i64>().unwrap_or(0);
    let offset_field = |from: usize, to: usize| offset[from..to].parse::<i64>().unwrap_or(0);

    let days = days_from_civil(field(0, 4), field(4, 6), field(6, 8));
    let local = days * 86_400 + field(8, 10) * 3_600 + field(10, 12) * 60 + field(12, 14);

    local - sign * (offset_field(0, 2) * 3_600 + offset_field(2, 4) * 60)
}

fn parse_qualifiers(version: &str, qualifiers: &str) -> Result<(Option<Stage>, Option<i64>), ParseError> {
    let invalid = || ParseError::InvalidQualifier {
        version: version.into(),
        qualifier: qualifiers.into(),
    };

    let tokens: Vec<&str> = qualifiers.split('-').collect();
    let mut rest = &tokens[..];

    let mut stage = None;
    let mut snapshot_stage = false;
    if let [name, number, ..] = rest {
        if is_alpha(name) && is_word(number) {
            if *name == "snapshot" {
                snapshot_stage = true;
            } else if let Some(minor) = parse_stage_minor(number).map_err(|()| invalid())? {
                stage = Some(Stage {
                    kind: StageKind::from_name(name),
                    minor,
                });
            }

            rest = &rest[2..];
        }
    }

    let snapshot = match rest {
        [] => None,
        ["SNAPSHOT"] => Some(0),
        [stamp] => match stamp.find('+') {
            Some(idx) if is_digits(&stamp[..idx], 14) && is_digits(&stamp[idx + 1..], 4) => {
                Some(snapshot_seconds(&stamp[..idx], 1, &stamp[idx + 1..]))
            }
            None if is_digits(stamp, 14) => Some(snapshot_seconds(stamp, 1, "0000")),
            _ => return Err(invalid()),
        },
        [stamp, offset] if is_digits(stamp, 14) && is_digits(offset, 4) => Some(snapshot_seconds(stamp, -1, offset)),
        _ => return Err(invalid()),
    };

    if snapshot_stage {
        return Ok((None, Some(0)));
    }

    Ok((stage, snapshot))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        for (lhs, rhs) in self.components.iter().zip(&other.components) {
            match lhs.cmp(rhs) {
                Ordering::Equal => {}
                ordering => return ordering,
            }
        }

        self.components
            .len()
            .cmp(&other.components.len())
            .then_with(|| match (&self.stage, &other.stage) {
                (None, None) => Ordering::Equal,
                (None, Some(..)) => Ordering::Greater,
                (Some(..), None) => Ordering::Less,
                (Some(lhs), Some(rhs)) => lhs.cmp(rhs),
            })
            .then_with(|| match (&self.snapshot, &other.snapshot) {
                (None, None) => Ordering::Equal,
                (None, Some(..)) => Ordering::Greater,
                (Some(..), None) => Ordering::Less,
                (Some(lhs), Some(rhs)) => lhs.cmp(rhs),
            })
    }
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
        self.stage.hash(state);
        self.snapshot.hash(state);
    }
}

impl Display for Version {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        fmt.write_str(&self.text)
    }
}
