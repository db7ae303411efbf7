use crate::args::parse;
use crate::state::{self, print_json};
use crate::{CliError, Config};
use sealvote::{Address, CandidateId, ElectionId};
use serde_json::json;

/// Read-only queries against the committed state
pub fn command_query(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let ledger = state::load(config)?;
    match matches.subcommand() {
        ("times", Some(matches)) => print_json(&ledger.get_times(election_id(matches)?)?),
        ("candidates", Some(matches)) => {
            let candidate_ids = ledger.get_candidate_ids(election_id(matches)?)?;
            let candidate_ids: Vec<String> = candidate_ids.iter().map(|id| id.to_string()).collect();
            print_json(&candidate_ids)
        }
        ("tally", Some(matches)) => {
            let candidate_id: CandidateId = parse(matches, "CANDIDATE-ID")?;
            print_json(&ledger.get_tally(election_id(matches)?, candidate_id))
        }
        ("results", Some(matches)) => print_json(&ledger.results(election_id(matches)?)?),
        ("phase", Some(matches)) => print_json(&ledger.phase(election_id(matches)?)?),
        ("commit", Some(matches)) => {
            let (election_id, voter) = voter(matches)?;
            print_json(&ledger.commits(election_id, &voter))
        }
        ("revealed", Some(matches)) => {
            let (election_id, voter) = voter(matches)?;
            print_json(&ledger.revealed(election_id, &voter))
        }
        ("count", Some(_)) => print_json(&json!({ "elections": ledger.elections_count() })),
        _ => Err(CliError::MissingArgument("SUBCOMMAND")),
    }
}

fn election_id(matches: &clap::ArgMatches) -> Result<ElectionId, CliError> {
    parse(matches, "ELECTION-ID")
}

fn voter(matches: &clap::ArgMatches) -> Result<(ElectionId, Address), CliError> {
    Ok((election_id(matches)?, parse(matches, "VOTER")?))
}
