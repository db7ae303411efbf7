use crate::args::{expand, parse, parse_str, read_file};
use crate::state::{self, print_json};
use crate::{CliError, Config};
use sealvote::GenesisConfig;
use serde_json::json;

pub fn command_init(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let mut genesis = match matches.value_of("genesis") {
        Some(path) => GenesisConfig::from_json(&read_file(&expand(path))?)?,
        None => {
            let admin = match matches.value_of("admin") {
                Some(admin) => parse_str("admin", admin)?,
                None => config.sender()?,
            };
            GenesisConfig::new(admin)
        }
    };
    if matches.is_present("time") {
        genesis.genesis_time = parse(matches, "time")?;
    }

    let admin = genesis.admin;
    let ledger = state::init(config, genesis, matches.is_present("force"))?;

    print_json(&json!({
        "state": config.state_path.display().to_string(),
        "admin": admin,
        "height": ledger.height(),
        "time": ledger.now(),
        "genesis": ledger.head().hash,
    }))
}
