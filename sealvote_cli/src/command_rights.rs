use crate::args::{parse, parse_all};
use crate::state::{self, print_json};
use crate::{CliError, Config};
use sealvote::{Address, ElectionId, Role, Transaction};
use serde_json::json;

pub fn command_rights(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    match matches.subcommand() {
        ("grant", Some(matches)) => {
            let (election_id, accounts) = batch(matches)?;
            let tx = Transaction::GrantBatch {
                election_id,
                accounts,
            };
            state::report(&state::submit(config, tx)?)
        }
        ("revoke", Some(matches)) => {
            let (election_id, accounts) = batch(matches)?;
            let tx = Transaction::RevokeBatch {
                election_id,
                accounts,
            };
            state::report(&state::submit(config, tx)?)
        }
        ("check", Some(matches)) => command_rights_check(matches, config),
        _ => Err(CliError::MissingArgument("SUBCOMMAND")),
    }
}

fn batch(matches: &clap::ArgMatches) -> Result<(ElectionId, Vec<Address>), CliError> {
    Ok((parse(matches, "ELECTION-ID")?, parse_all(matches, "ACCOUNTS")?))
}

pub fn command_rights_check(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let ledger = state::load(config)?;
    let election_id: ElectionId = parse(matches, "ELECTION-ID")?;
    let account: Address = parse(matches, "ACCOUNT")?;

    print_json(&json!({
        "election_id": election_id.to_string(),
        "account": account,
        "has_right": ledger.has_right(&account, election_id),
        "balance": ledger.balance_of(&account, election_id),
    }))
}

pub fn command_role(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let (name, matches) = match matches.subcommand() {
        (name, Some(matches)) => (name, matches),
        _ => return Err(CliError::MissingArgument("SUBCOMMAND")),
    };
    let role: Role = parse(matches, "ROLE")?;
    let account: Address = parse(matches, "ACCOUNT")?;

    let tx = match name {
        "grant" => Transaction::GrantRole { role, account },
        "revoke" => Transaction::RevokeRole { role, account },
        _ => return Err(CliError::MissingArgument("SUBCOMMAND")),
    };
    state::report(&state::submit(config, tx)?)
}
