use std::ops::Deref;

use serde::Deserialize;
use thiserror::Error;

/// A duration written as whitespace separated parts like `"1m 30s"`.
///
/// Supported units are `ms`, `s`, `m`, `h` and `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::str::FromStr for Duration {
    type Err = InvalidDuration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .try_fold(std::time::Duration::ZERO, |out, part| {
                out.checked_add(parse_part(part)?)
            })
            .map(Self)
            .ok_or(InvalidDuration)
    }
}

fn parse_part(part: &str) -> Option<std::time::Duration> {
    let split = part.find(|c: char| !c.is_ascii_digit())?;
    let (value, unit) = part.split_at(split);
    let value = value.parse::<u64>().ok()?;
    let millis = match unit {
        "ms" => 1,
        "s" => 1000,
        "m" => 60 * 1000,
        "h" => 60 * 60 * 1000,
        "d" => 24 * 60 * 60 * 1000,
        _ => return None,
    };
    value
        .checked_mul(millis)
        .map(std::time::Duration::from_millis)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid duration")]
pub struct InvalidDuration;

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration() {
        for (input, expected) in [
            ("250ms", Some(250)),
            ("13s", Some(13_000)),
            ("42m", Some(42 * 60_000)),
            ("7h", Some(7 * 60 * 60_000)),
            ("20d", Some(20 * 24 * 60 * 60_000)),
            ("", Some(0)),
            ("1d 2h 3m 4s 5ms", Some((((24 + 2) * 60 + 3) * 60 + 4) * 1000 + 5)),
            ("xyz", None),
            ("7dd", None),
            ("5", None),
            ("s", None),
        ] {
            let input = serde_json::Value::String(input.into());
            let output = serde_json::from_value::<Duration>(input)
                .ok()
                .map(|x| x.0.as_millis() as u64);
            assert_eq!(output, expected);
        }
    }

    #[test]
    fn overflowing_sum_is_invalid() {
        let input = vec!["18446744073709551615ms"; 1001].join(" ");
        assert_eq!(input.parse::<Duration>(), Err(InvalidDuration));
    }
}
