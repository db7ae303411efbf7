use crate::args::{expand, parse_str};
use crate::CliError;
use sealvote::Address;
use std::env::var;
use std::path::PathBuf;

pub const DEFAULT_STATE_PATH: &str = "./sealvote.json";

pub struct Config {
    /// Where the ledger snapshot lives
    pub state_path: PathBuf,

    /// Account given with `--sender`
    pub sender: Option<Address>,

    /// Raw `SEALVOTE_SENDER`, only parsed when no flag overrides it
    pub sender_env: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let state_path = match var("SEALVOTE_STATE") {
            Ok(val) => expand(&val),
            Err(_e) => PathBuf::from(DEFAULT_STATE_PATH),
        };

        Config {
            state_path,
            sender: None,
            sender_env: var("SEALVOTE_SENDER").ok(),
        }
    }

    /// Command line flags take precedence over the environment
    pub fn with_matches(mut self, matches: &clap::ArgMatches) -> Result<Self, CliError> {
        if let Some(path) = matches.value_of("state") {
            self.state_path = expand(path);
        }
        if let Some(sender) = matches.value_of("sender") {
            self.sender = Some(parse_str("sender", sender)?);
        }
        Ok(self)
    }

    pub fn sender(&self) -> Result<Address, CliError> {
        match (&self.sender, &self.sender_env) {
            (Some(sender), _) => Ok(*sender),
            (None, Some(raw)) => parse_str("SEALVOTE_SENDER", raw),
            (None, None) => Err(CliError::MissingSender),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn config(sender_env: Option<&str>) -> Config {
        Config {
            state_path: DEFAULT_STATE_PATH.into(),
            sender: None,
            sender_env: sender_env.map(str::to_owned),
        }
    }

    #[test]
    fn flag_overrides_a_bad_environment() {
        let matches = crate::app()
            .get_matches_from_safe(vec![
                "sealvote",
                "--sender",
                "0x0101010101010101010101010101010101010101",
                "time",
                "show",
            ])
            .unwrap();

        let config = config(Some("not-an-address")).with_matches(&matches).unwrap();
        assert_eq!(config.sender().unwrap(), Address([1; 20]));
    }

    #[test]
    fn environment_sender_is_parsed_on_use() {
        let bad = config(Some("not-an-address"));
        let message = bad.sender().unwrap_err().to_string();
        assert!(message.contains("SEALVOTE_SENDER"), "{}", message);

        let good = config(Some("0202020202020202020202020202020202020202"));
        assert_eq!(good.sender().unwrap(), Address([2; 20]));

        assert!(matches!(config(None).sender(), Err(CliError::MissingSender)));
    }
}
