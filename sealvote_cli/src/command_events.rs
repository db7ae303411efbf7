use crate::args::parse;
use crate::state::{self, print_json};
use crate::{CliError, Config};
use sealvote::{AuditRecord, ElectionId, EventRecord, Indexer, MemAuditLog, NoAnalysis};

fn election_filter(matches: &clap::ArgMatches) -> Result<Option<ElectionId>, CliError> {
    match matches.value_of("election") {
        Some(_) => Ok(Some(parse(matches, "election")?)),
        None => Ok(None),
    }
}

/// Print the raw event log
pub fn command_events(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let ledger = state::load(config)?;
    let since: usize = match matches.value_of("since") {
        Some(_) => parse(matches, "since")?,
        None => 0,
    };
    let election = election_filter(matches)?;

    let events: Vec<&EventRecord> = ledger
        .events_since(since)
        .iter()
        .filter(|record| election.is_none() || record.event.election_id() == election)
        .collect();
    print_json(&events)
}

/// Replay the event log through an indexer and print the audit trail
pub fn command_audit(matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    let ledger = state::load(config)?;
    let mut indexer: Indexer = Indexer::new(MemAuditLog::default(), NoAnalysis);
    indexer.sync(&ledger);

    let records: Vec<&AuditRecord> = match election_filter(matches)? {
        Some(election_id) => indexer.audit().by_election(election_id),
        None => indexer.audit().records().iter().collect(),
    };
    print_json(&records)
}
