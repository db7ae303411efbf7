use crate::args::parse;
use crate::state::{self, print_json};
use crate::{CliError, Config};
use sealvote::{commitment_hash, CandidateId, Commitment, ElectionId, Salt, Transaction};
use serde_json::json;

/// Compute a commitment without touching the ledger
pub fn command_commitment(matches: &clap::ArgMatches) -> Result<(), CliError> {
    let candidate_id: CandidateId = parse(matches, "CANDIDATE-ID")?;
    let salt = match matches.value_of("salt") {
        Some(_) => parse(matches, "salt")?,
        None => Salt::random(),
    };

    print_json(&json!({
        "candidate_id": candidate_id.to_string(),
        "salt": salt,
        "commitment": commitment_hash(candidate_id, &salt),
    }))
}

pub fn command_vote(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    match matches.subcommand() {
        ("commit", Some(matches)) => command_vote_commit(matches, config),
        ("reveal", Some(matches)) => command_vote_reveal(matches, config),
        _ => Err(CliError::MissingArgument("SUBCOMMAND")),
    }
}

/// Commit either a precomputed commitment or a candidate choice. For a
/// candidate choice the salt is printed with the receipt: it is needed to
/// reveal and cannot be recovered.
pub fn command_vote_commit(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let election_id: ElectionId = parse(matches, "ELECTION-ID")?;

    let (commitment, opening) = if matches.is_present("commitment") {
        let commitment: Commitment = parse(matches, "commitment")?;
        (commitment, None)
    } else {
        let candidate_id: CandidateId = parse(matches, "candidate")?;
        let salt = match matches.value_of("salt") {
            Some(_) => parse(matches, "salt")?,
            None => Salt::random(),
        };
        (commitment_hash(candidate_id, &salt), Some((candidate_id, salt)))
    };

    let receipt = state::submit(
        config,
        Transaction::CommitVote {
            election_id,
            commitment,
        },
    )?;

    match opening {
        Some((candidate_id, salt)) => print_json(&json!({
            "receipt": receipt,
            "candidate_id": candidate_id.to_string(),
            "salt": salt,
        }))?,
        None => print_json(&receipt)?,
    }
    state::check(&receipt)
}

pub fn command_vote_reveal(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let tx = Transaction::RevealVote {
        election_id: parse(matches, "ELECTION-ID")?,
        candidate_id: parse(matches, "CANDIDATE-ID")?,
        salt: parse(matches, "SALT")?,
    };
    let receipt = state::submit(config, tx)?;
    state::report(&receipt)
}

pub fn command_finalize(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let election_id: ElectionId = parse(matches, "ELECTION-ID")?;
    let receipt = state::submit(config, Transaction::Finalize { election_id })?;
    state::report(&receipt)
}

