//! This module contains the [`Duration`] struct used by the cluster manager's API, for example for
//! kubelet timeouts or etcd heartbeat intervals. It parses the manager's duration syntax, like
//! `5m0s`, `1h30m`, `1.5s`, `250ms` or `2d12h`, and renders durations in the manager's canonical
//! form (`1h0m0s`, `2m30s`, `1.5s`, `500ms`, `0s`), which is also the form stored in state.
//!
//! It implements [`Deref`], which enables us to use all associated functions of
//! [`std::time::Duration`] without re-implementing the public functions on our own type.

use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt::{Display, Write},
    num::ParseIntError,
    ops::Deref,
    str::FromStr,
};

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use snafu::{OptionExt, ResultExt, Snafu};

mod serde_impl;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits beyond this are below nanosecond precision for every unit.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(module)]
pub enum DurationParseError {
    #[snafu(display("invalid input, the duration is empty"))]
    InvalidInput,

    #[snafu(display("unexpected character {chr:?}"))]
    UnexpectedCharacter { chr: char },

    #[snafu(display("fragment with value {value:?} has no unit"))]
    NoUnit { value: String },

    #[snafu(display("invalid fragment order, {current} must be before {previous}"))]
    InvalidUnitOrdering {
        previous: DurationUnit,
        current: DurationUnit,
    },

    #[snafu(display("fragment unit {unit} was specified multiple times"))]
    DuplicateUnit { unit: DurationUnit },

    #[snafu(display("failed to parse fragment unit {unit:?}"))]
    ParseUnitError { unit: String },

    #[snafu(display("failed to parse fragment value {value:?} as number"))]
    InvalidNumber { value: String },

    #[snafu(display("failed to parse fragment value as integer"))]
    ParseIntError { source: ParseIntError },

    #[snafu(display("duration is too large"))]
    TooLarge,
}

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(std::time::Duration);

/// Splits `input` after the longest prefix whose characters all match `f`.
fn split_while(input: &str, f: impl Fn(char) -> bool) -> (&str, &str) {
    let end = input
        .char_indices()
        .find(|&(_, chr)| !f(chr))
        .map_or(input.len(), |(index, _)| index);
    input.split_at(end)
}

/// Parses a decimal fragment value (`12`, `1.5`, `.25`) and scales it to `unit` in nanoseconds.
fn fragment_nanos(value: &str, unit: &DurationUnit) -> Result<u128, DurationParseError> {
    use duration_parse_error::*;

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return InvalidNumberSnafu { value }.fail();
    }

    let whole = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().context(ParseIntSnafu)?
    };
    let mut nanos = whole.checked_mul(unit.nanos()).context(TooLargeSnafu)?;

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if !fraction.is_empty() {
        let numerator = fraction.parse::<u128>().context(ParseIntSnafu)?;
        let denominator = 10_u128.pow(fraction.len() as u32);
        nanos = nanos
            .checked_add(numerator * unit.nanos() / denominator)
            .context(TooLargeSnafu)?;
    }

    Ok(nanos)
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use duration_parse_error::*;
        let input = s.trim();

        if input.is_empty() {
            return Err(DurationParseError::InvalidInput);
        }

        // A bare zero is the only fragment that doesn't need a unit
        if input == "0" {
            return Ok(Self::default());
        }

        let mut rest = input;
        let mut nanos: u128 = 0;
        let mut last_unit = None;

        while let Some(chr) = rest.chars().next() {
            let (value, tail) = split_while(rest, |c| c.is_ascii_digit() || c == '.');
            if value.is_empty() {
                return UnexpectedCharacterSnafu { chr }.fail();
            }

            let (unit, tail) = split_while(tail, char::is_alphabetic);
            if unit.is_empty() {
                if let Some(chr) = tail.chars().next() {
                    return UnexpectedCharacterSnafu { chr }.fail();
                }
                return NoUnitSnafu { value }.fail();
            }

            let unit = unit.parse::<DurationUnit>().ok().context(ParseUnitSnafu {
                unit: unit.to_string(),
            })?;

            // Check that the unit is smaller than the previous one, and that
            // it wasn't specified multiple times
            if let Some(last_unit) = last_unit {
                match unit.cmp(&last_unit) {
                    Ordering::Less => {
                        return InvalidUnitOrderingSnafu {
                            previous: last_unit,
                            current: unit,
                        }
                        .fail();
                    }
                    Ordering::Equal => return DuplicateUnitSnafu { unit }.fail(),
                    Ordering::Greater => (),
                }
            }

            nanos = nanos
                .checked_add(fragment_nanos(value, &unit)?)
                .context(TooLargeSnafu)?;
            last_unit = Some(unit);
            rest = tail;
        }

        let secs = u64::try_from(nanos / NANOS_PER_SEC)
            .ok()
            .context(TooLargeSnafu)?;
        let subsec_nanos = (nanos % NANOS_PER_SEC) as u32;
        Ok(Self(std::time::Duration::new(secs, subsec_nanos)))
    }
}

/// Writes `value / unit` with as many fraction digits as needed, like `1.5` or `250`.
fn write_decimal(
    f: &mut std::fmt::Formatter<'_>,
    value: u128,
    unit: u128,
    width: usize,
) -> std::fmt::Result {
    write!(f, "{}", value / unit)?;

    let fraction = value % unit;
    if fraction > 0 {
        let digits = format!("{fraction:0width$}");
        f.write_char('.')?;
        f.write_str(digits.trim_end_matches('0'))?;
    }

    Ok(())
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nanos = self.0.as_nanos();

        if nanos == 0 {
            return write!(f, "0{}", DurationUnit::Seconds);
        }

        // Durations below one second use the largest unit that keeps the
        // whole part non-zero
        if nanos < NANOS_PER_MICRO {
            return write!(f, "{nanos}{}", DurationUnit::Nanoseconds);
        }
        if nanos < NANOS_PER_MILLI {
            write_decimal(f, nanos, NANOS_PER_MICRO, 3)?;
            return write!(f, "{}", DurationUnit::Microseconds);
        }
        if nanos < NANOS_PER_SEC {
            write_decimal(f, nanos, NANOS_PER_MILLI, 6)?;
            return write!(f, "{}", DurationUnit::Milliseconds);
        }

        // Everything else is written as hours, minutes and seconds. Days are
        // folded into hours, and minutes are always written once hours are.
        let secs = self.0.as_secs();
        let hours = secs / 3600;
        let minutes = secs % 3600 / 60;

        if hours > 0 {
            write!(f, "{hours}{}", DurationUnit::Hours)?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}{}", DurationUnit::Minutes)?;
        }

        let seconds =
            u128::from(secs % 60) * NANOS_PER_SEC + u128::from(self.0.subsec_nanos());
        write_decimal(f, seconds, NANOS_PER_SEC, 9)?;
        write!(f, "{}", DurationUnit::Seconds)
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        Self(value)
    }
}

impl JsonSchema for Duration {
    fn schema_name() -> Cow<'static, str> {
        "Duration".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
        })
    }
}

impl Duration {
    /// Creates a new [`Duration`] from the specified number of whole seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(std::time::Duration::from_secs(secs))
    }

    /// Creates a new [`Duration`] from the specified number of milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self(std::time::Duration::from_millis(millis))
    }
}

/// Defines supported [`DurationUnit`]s. Each fragment consists of a numeric
/// value followed by a [`DurationUnit`]. The order of variants **MATTERS**:
/// fragments must be written from the largest to the smallest unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, strum::EnumString, strum::Display)]
pub enum DurationUnit {
    #[strum(serialize = "d")]
    Days,

    #[strum(serialize = "h")]
    Hours,

    #[strum(serialize = "m")]
    Minutes,

    #[strum(serialize = "s")]
    Seconds,

    #[strum(serialize = "ms")]
    Milliseconds,

    #[strum(to_string = "µs", serialize = "us", serialize = "μs")]
    Microseconds,

    #[strum(serialize = "ns")]
    Nanoseconds,
}

impl DurationUnit {
    /// Returns the number of nanoseconds in each supported [`DurationUnit`].
    fn nanos(&self) -> u128 {
        use DurationUnit::*;

        match self {
            Days => 24 * Hours.nanos(),
            Hours => 60 * Minutes.nanos(),
            Minutes => 60 * Seconds.nanos(),
            Seconds => NANOS_PER_SEC,
            Milliseconds => NANOS_PER_MILLI,
            Microseconds => NANOS_PER_MICRO,
            Nanoseconds => 1,
        }
    }
}
