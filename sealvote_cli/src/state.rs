use crate::{CliError, Config};
use log::info;
use sealvote::{Address, GenesisConfig, Ledger, MemStore, Receipt, Transaction};
use serde::Serialize;

/// Load the ledger snapshot named by the config
pub fn load(config: &Config) -> Result<Ledger, CliError> {
    if !config.state_path.exists() {
        return Err(CliError::NoState(config.state_path.clone()));
    }
    Ok(Ledger::<MemStore>::load(&config.state_path)?)
}

pub fn save(config: &Config, ledger: &Ledger) -> Result<(), CliError> {
    ledger.save(&config.state_path)?;
    Ok(())
}

/// Write a fresh ledger snapshot
pub fn init(config: &Config, genesis: GenesisConfig, force: bool) -> Result<Ledger, CliError> {
    if config.state_path.exists() && !force {
        return Err(CliError::StateExists(config.state_path.clone()));
    }
    let ledger: Ledger = Ledger::new(genesis);
    save(config, &ledger)?;
    info!("initialised ledger at {}", config.state_path.display());
    Ok(ledger)
}

/// Execute a transaction from the configured sender and persist the result
///
/// The snapshot is saved even when the transaction reverts: the block that
/// ordered it was still mined.
pub fn submit(config: &Config, tx: Transaction) -> Result<Receipt, CliError> {
    let sender = config.sender()?;
    submit_as(config, sender, tx)
}

pub fn submit_as(config: &Config, sender: Address, tx: Transaction) -> Result<Receipt, CliError> {
    let mut ledger = load(config)?;
    let receipt = ledger.execute(sender, tx)?;
    save(config, &ledger)?;
    Ok(receipt)
}

/// Print the receipt, failing if the transaction reverted
pub fn report(receipt: &Receipt) -> Result<(), CliError> {
    print_json(receipt)?;
    check(receipt)
}

pub fn check(receipt: &Receipt) -> Result<(), CliError> {
    match receipt.reason() {
        Some(reason) => Err(CliError::Reverted(reason)),
        None => Ok(()),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use sealvote::{ElectionParams, Outcome};

    const ADMIN: Address = Address([0xad; 20]);

    fn config(dir: &tempfile::TempDir) -> Config {
        Config {
            state_path: dir.path().join("sealvote.json"),
            sender: Some(ADMIN),
            sender_env: None,
        }
    }

    fn create_tx() -> Transaction {
        Transaction::CreateElection(ElectionParams {
            name: "CLI".to_owned(),
            start_time: 10,
            commit_deadline: 20,
            reveal_deadline: 30,
            candidate_ids: vec![1, 2],
            gating_enabled: false,
        })
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);

        assert!(matches!(load(&config), Err(CliError::NoState(_))));
        init(&config, GenesisConfig::new(ADMIN), false).unwrap();
        assert!(matches!(
            init(&config, GenesisConfig::new(ADMIN), false),
            Err(CliError::StateExists(_))
        ));
        init(&config, GenesisConfig::new(ADMIN), true).unwrap();
    }

    #[test]
    fn submissions_persist() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        init(&config, GenesisConfig::new(ADMIN), false).unwrap();

        let receipt = submit(&config, create_tx()).unwrap();
        assert_eq!(receipt.outcome, Ok(Outcome::ElectionCreated(1)));

        let ledger = load(&config).unwrap();
        assert_eq!(ledger.elections_count(), 1);
        assert_eq!(ledger.height(), 1);
    }

    #[test]
    fn reverted_submissions_are_still_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        init(&config, GenesisConfig::new(ADMIN), false).unwrap();

        let stranger = Address([9; 20]);
        let receipt = submit_as(&config, stranger, create_tx()).unwrap();
        assert!(matches!(check(&receipt), Err(CliError::Reverted("Missing role"))));

        let ledger = load(&config).unwrap();
        assert_eq!(ledger.elections_count(), 0);
        assert_eq!(ledger.height(), 1);
    }

    #[test]
    fn missing_sender() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir);
        config.sender = None;
        init(&config, GenesisConfig::new(ADMIN), false).unwrap();
        assert!(matches!(
            submit(&config, create_tx()),
            Err(CliError::MissingSender)
        ));
    }
}
