use crate::args::{parse, parse_all, parse_time, value};
use crate::state::{self, print_json};
use crate::{CliError, Config};
use sealvote::{ElectionId, ElectionParams, Transaction};
use serde_json::json;

pub fn command_election(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    match matches.subcommand() {
        ("create", Some(matches)) => command_election_create(matches, config),
        ("show", Some(matches)) => command_election_show(matches, config),
        _ => Err(CliError::MissingArgument("SUBCOMMAND")),
    }
}

/// Create an election. Times may be given relative to the ledger clock as `+SECS`.
pub fn command_election_create(
    matches: &clap::ArgMatches,
    config: &Config,
) -> Result<(), CliError> {
    let sender = config.sender()?;
    let mut ledger = state::load(config)?;
    let now = ledger.now();

    let params = ElectionParams {
        name: value(matches, "NAME")?.to_owned(),
        start_time: parse_time(matches, "start", now)?,
        commit_deadline: parse_time(matches, "commit-deadline", now)?,
        reveal_deadline: parse_time(matches, "reveal-deadline", now)?,
        candidate_ids: parse_all(matches, "candidates")?,
        gating_enabled: matches.is_present("gated"),
    };

    let receipt = ledger.execute(sender, Transaction::CreateElection(params))?;
    state::save(config, &ledger)?;
    state::report(&receipt)
}

pub fn command_election_show(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let ledger = state::load(config)?;
    let election_id: ElectionId = parse(matches, "ELECTION-ID")?;

    let election = ledger.get_election(election_id)?;
    let phase = ledger.phase(election_id)?;
    let results = ledger.results(election_id)?;

    print_json(&json!({
        "election": election,
        "phase": phase,
        "now": ledger.now(),
        "results": results,
    }))
}
