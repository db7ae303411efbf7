use crate::args::{expand, read_file, value};
use crate::state;
use crate::{CliError, Config};
use sealvote::Transaction;

/// Submit a transaction file in JSON or CBOR format
pub fn command_post_transaction(
    matches: &clap::ArgMatches,
    config: &Config,
) -> Result<(), CliError> {
    let filename = expand(value(matches, "INPUT")?);
    let file_bytes = read_file(&filename)?;
    let tx = Transaction::from_bytes(&file_bytes)?;

    log::info!("posting {} from {}", tx.transaction_type(), filename.display());
    let receipt = state::submit(config, tx)?;
    state::report(&receipt)
}
