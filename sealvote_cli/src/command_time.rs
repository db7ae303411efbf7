use crate::args::{parse, parse_time};
use crate::state::{self, print_json};
use crate::{CliError, Config};
use sealvote::Ledger;
use serde_json::json;

/// Show or move the ledger clock
pub fn command_time(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let mut ledger: Ledger = state::load(config)?;
    match matches.subcommand() {
        ("advance", Some(matches)) => {
            ledger.advance_time(parse(matches, "SECS")?);
            state::save(config, &ledger)?;
        }
        ("set", Some(matches)) => {
            let timestamp = parse_time(matches, "TIMESTAMP", ledger.now())?;
            ledger.set_time(timestamp)?;
            state::save(config, &ledger)?;
        }
        ("show", Some(_)) => {}
        _ => return Err(CliError::MissingArgument("SUBCOMMAND")),
    }
    print_json(&json!({ "time": ledger.now(), "height": ledger.height() }))
}
