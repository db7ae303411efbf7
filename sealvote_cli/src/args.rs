use crate::CliError;
use sealvote::Timestamp;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Expand `~` and environment variables in a path
pub fn expand(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_e) => PathBuf::from(path),
    }
}

pub fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })
}

pub fn value<'a>(matches: &'a clap::ArgMatches, name: &'static str) -> Result<&'a str, CliError> {
    matches
        .value_of(name)
        .ok_or(CliError::MissingArgument(name))
}

pub fn parse_str<T>(name: &'static str, value: &str) -> Result<T, CliError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| CliError::InvalidArgument {
            name,
            value: value.to_owned(),
            reason: e.to_string(),
        })
}

pub fn parse<T>(matches: &clap::ArgMatches, name: &'static str) -> Result<T, CliError>
where
    T: FromStr,
    T::Err: Display,
{
    parse_str(name, value(matches, name)?)
}

/// Parse every occurrence of a multi-valued argument
pub fn parse_all<T>(matches: &clap::ArgMatches, name: &'static str) -> Result<Vec<T>, CliError>
where
    T: FromStr,
    T::Err: Display,
{
    match matches.values_of(name) {
        Some(values) => values.map(|value| parse_str(name, value)).collect(),
        None => Ok(vec![]),
    }
}

/// A timestamp, either absolute or relative to `now` when prefixed with `+`
pub fn parse_time_str(
    name: &'static str,
    value: &str,
    now: Timestamp,
) -> Result<Timestamp, CliError> {
    match value.trim().strip_prefix('+') {
        Some(offset) => {
            let offset: u64 = parse_str(name, offset)?;
            now.checked_add(offset)
                .ok_or_else(|| CliError::InvalidArgument {
                    name,
                    value: value.to_owned(),
                    reason: "timestamp overflows".to_owned(),
                })
        }
        None => parse_str(name, value),
    }
}

pub fn parse_time(
    matches: &clap::ArgMatches,
    name: &'static str,
    now: Timestamp,
) -> Result<Timestamp, CliError> {
    parse_time_str(name, value(matches, name)?, now)
}
