use crate::*;
use digest::Digest;
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::path::Path;

/// Initial roles and clock of a ledger
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisConfig {
    /// Holder of the admin role, who manages every other role
    pub admin: Address,

    /// Accounts allowed to create elections
    #[serde(default)]
    pub authorities: Vec<Address>,

    /// Accounts allowed to grant and revoke voting rights
    #[serde(default)]
    pub minters: Vec<Address>,

    #[serde(default)]
    pub genesis_time: Timestamp,
}

impl GenesisConfig {
    /// A genesis where `admin` holds every role
    pub fn new(admin: Address) -> Self {
        GenesisConfig {
            admin,
            authorities: vec![admin],
            minters: vec![admin],
            genesis_time: 0,
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// A sealed block
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u64,
    pub timestamp: Timestamp,
    pub parent: Hash32,
    pub tx_hashes: Vec<Hash32>,
    pub hash: Hash32,
}

impl BlockHeader {
    fn seal(height: u64, timestamp: Timestamp, parent: Hash32, tx_hashes: Vec<Hash32>) -> Self {
        let hash = Self::compute_hash(height, timestamp, &parent, &tx_hashes);
        BlockHeader {
            height,
            timestamp,
            parent,
            tx_hashes,
            hash,
        }
    }

    /// SHA-256 over height, timestamp, parent hash and transaction hashes
    pub fn compute_hash(
        height: u64,
        timestamp: Timestamp,
        parent: &Hash32,
        tx_hashes: &[Hash32],
    ) -> Hash32 {
        let mut sha = sha2::Sha256::new();
        sha.update(height.to_be_bytes());
        sha.update(timestamp.to_be_bytes());
        sha.update(parent.as_bytes());
        for tx_hash in tx_hashes {
            sha.update(tx_hash.as_bytes());
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&sha.finalize());
        Hash32(out)
    }
}

/// The result of one transaction
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: Hash32,
    pub block_height: u64,
    pub sender: Address,
    pub transaction_type: TransactionType,
    pub outcome: Result<Outcome, ValidationError>,

    /// Events emitted by the transaction; empty when it reverted
    pub events: Vec<EventRecord>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The stable failure reason, if the transaction reverted
    pub fn reason(&self) -> Option<&'static str> {
        self.outcome.as_ref().err().map(|e| e.reason())
    }

    /// The id of the election created by this transaction, if any
    pub fn election_id(&self) -> Option<ElectionId> {
        match self.outcome {
            Ok(Outcome::ElectionCreated(id)) => Some(id),
            _ => None,
        }
    }
}

/// In-process ledger: serial execution, one clock, an append-only event log
///
/// Transactions run one at a time in submission order. Each runs against a
/// fresh `WorkingSet`; its writes and events are kept only if it succeeds.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ledger<S = MemStore> {
    state: S,
    clock: Timestamp,
    nonce: u64,
    blocks: Vec<BlockHeader>,
    events: Vec<EventRecord>,
}

impl<S: StoreMut + Default> Ledger<S> {
    /// Create a ledger with an empty state seeded from `genesis`
    pub fn new(genesis: GenesisConfig) -> Self {
        Self::with_store(S::default(), genesis)
    }
}

impl<S: StoreMut> Ledger<S> {
    /// Create a ledger over an existing store, seeded from `genesis`
    pub fn with_store(mut state: S, genesis: GenesisConfig) -> Self {
        state.set_role(Role::Admin, genesis.admin, true);
        for authority in &genesis.authorities {
            state.set_role(Role::ElectionAuthority, *authority, true);
        }
        for minter in &genesis.minters {
            state.set_role(Role::Minter, *minter, true);
        }

        let block = BlockHeader::seal(0, genesis.genesis_time, Hash32::ZERO, vec![]);
        info!("genesis block {} at {}", block.hash, block.timestamp);

        Ledger {
            state,
            clock: genesis.genesis_time,
            nonce: 0,
            blocks: vec![block],
            events: vec![],
        }
    }

    /// Execute one transaction in its own block at the current time
    pub fn execute(&mut self, sender: Address, tx: Transaction) -> Result<Receipt, Error> {
        let mut receipts = self.execute_block(vec![(sender, tx)])?;
        // execute_block returns exactly one receipt per transaction
        Ok(receipts.remove(0))
    }

    /// Execute several transactions in one block, in order, at the current time
    ///
    /// Each transaction is atomic on its own: a revert discards only that
    /// transaction's writes.
    pub fn execute_block(
        &mut self,
        txs: Vec<(Address, Transaction)>,
    ) -> Result<Vec<Receipt>, Error> {
        let height = self.blocks.len() as u64;
        let timestamp = self.clock;
        let mut receipts = Vec::with_capacity(txs.len());
        let mut log_index: u32 = 0;

        // Every envelope is hashed before any of them touches the state
        let envelopes: Vec<Envelope> = txs
            .into_iter()
            .zip(self.nonce..)
            .map(|((sender, tx), nonce)| Envelope { sender, nonce, tx })
            .collect();
        let tx_hashes = envelopes
            .iter()
            .map(Envelope::hash)
            .collect::<Result<Vec<Hash32>, Error>>()?;
        self.nonce += envelopes.len() as u64;

        for (envelope, tx_hash) in envelopes.into_iter().zip(tx_hashes.iter().copied()) {
            let sender = envelope.sender;
            let ctx = CallContext {
                sender,
                now: timestamp,
                block_height: height,
                tx_hash,
            };
            let transaction_type = envelope.tx.transaction_type();

            let result = {
                let mut ws = WorkingSet::new(&self.state);
                envelope
                    .tx
                    .execute(&ctx, &mut ws)
                    .map(|outcome| (outcome, ws.into_parts()))
            };

            let receipt = match result {
                Ok((outcome, (changes, events))) => {
                    changes.apply_to(&mut self.state);
                    let records: Vec<EventRecord> = events
                        .into_iter()
                        .map(|event| {
                            let record = EventRecord {
                                event,
                                tx_hash,
                                block_height: height,
                                log_index,
                            };
                            log_index += 1;
                            record
                        })
                        .collect();
                    self.events.extend(records.iter().cloned());
                    debug!("{} {} from {} applied", transaction_type, tx_hash, sender);

                    Receipt {
                        tx_hash,
                        block_height: height,
                        sender,
                        transaction_type,
                        outcome: Ok(outcome),
                        events: records,
                    }
                }
                Err(err) => {
                    warn!(
                        "{} {} from {} reverted: {}",
                        transaction_type,
                        tx_hash,
                        sender,
                        err.reason()
                    );
                    Receipt {
                        tx_hash,
                        block_height: height,
                        sender,
                        transaction_type,
                        outcome: Err(err),
                        events: vec![],
                    }
                }
            };
            receipts.push(receipt);
        }

        let parent = self.head().hash;
        let block = BlockHeader::seal(height, timestamp, parent, tx_hashes);
        info!(
            "block {} mined at {} with {} transaction(s)",
            height,
            timestamp,
            block.tx_hashes.len()
        );
        self.blocks.push(block);

        Ok(receipts)
    }
}

impl<S> Ledger<S> {
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Current ledger time, used as the timestamp of the next block
    pub fn now(&self) -> Timestamp {
        self.clock
    }

    /// Move the clock forward
    pub fn advance_time(&mut self, secs: u64) {
        self.clock = self.clock.saturating_add(secs);
    }

    /// Set the clock; it may never move backwards
    pub fn set_time(&mut self, timestamp: Timestamp) -> Result<(), Error> {
        if timestamp < self.clock {
            return Err(Error::ClockRegression {
                current: self.clock,
                requested: timestamp,
            });
        }
        self.clock = timestamp;
        Ok(())
    }

    /// Height of the latest block
    pub fn height(&self) -> u64 {
        self.head().height
    }

    pub fn head(&self) -> &BlockHeader {
        // A ledger always holds at least its genesis block
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn blocks(&self) -> &[BlockHeader] {
        &self.blocks
    }

    /// Events after the first `cursor` ones, in emission order
    ///
    /// Subscribers keep the cursor; the log itself is never rewritten.
    pub fn events_since(&self, cursor: usize) -> &[EventRecord] {
        self.events.get(cursor..).unwrap_or(&[])
    }

    /// Recompute every block hash and parent link
    pub fn verify_chain(&self) -> Result<(), Error> {
        let mut parent = Hash32::ZERO;
        for (index, block) in self.blocks.iter().enumerate() {
            let expected =
                BlockHeader::compute_hash(block.height, block.timestamp, &block.parent, &block.tx_hashes);
            if block.height != index as u64 || block.parent != parent || block.hash != expected {
                return Err(Error::BrokenChain(index as u64));
            }
            parent = block.hash;
        }
        Ok(())
    }
}

// Read-only queries, answered from committed state
impl<S: Store> Ledger<S> {
    pub fn elections_count(&self) -> u64 {
        ElectionRegistry.elections_count(&self.state)
    }

    pub fn get_election(&self, election_id: ElectionId) -> Result<Election, ValidationError> {
        ElectionRegistry.get_election(&self.state, election_id)
    }

    pub fn get_times(&self, election_id: ElectionId) -> Result<ElectionTimes, ValidationError> {
        ElectionRegistry.get_times(&self.state, election_id)
    }

    pub fn get_candidate_ids(
        &self,
        election_id: ElectionId,
    ) -> Result<Vec<CandidateId>, ValidationError> {
        ElectionRegistry.get_candidate_ids(&self.state, election_id)
    }

    pub fn get_tally(&self, election_id: ElectionId, candidate_id: CandidateId) -> u64 {
        ElectionRegistry.get_tally(&self.state, election_id, candidate_id)
    }

    pub fn results(
        &self,
        election_id: ElectionId,
    ) -> Result<IndexMap<CandidateId, u64>, ValidationError> {
        ElectionRegistry.results(&self.state, election_id)
    }

    pub fn commits(&self, election_id: ElectionId, voter: &Address) -> Commitment {
        ElectionRegistry.commits(&self.state, election_id, voter)
    }

    pub fn revealed(&self, election_id: ElectionId, voter: &Address) -> bool {
        ElectionRegistry.revealed(&self.state, election_id, voter)
    }

    /// Phase of an election at the current ledger time
    pub fn phase(&self, election_id: ElectionId) -> Result<Phase, ValidationError> {
        ElectionRegistry.phase(&self.state, election_id, self.clock)
    }

    pub fn has_right(&self, account: &Address, election_id: ElectionId) -> bool {
        VotingRights.has_right(&self.state, account, election_id)
    }

    pub fn balance_of(&self, account: &Address, election_id: ElectionId) -> u8 {
        VotingRights.balance_of(&self.state, account, election_id)
    }

    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        VotingRights.is_approved_for_all(owner, operator)
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.state.has_role(role, account)
    }
}

impl Ledger<MemStore> {
    /// Load a ledger snapshot written by `save`, checking its block chain
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        let ledger: Self = serde_json::from_slice(&bytes)?;
        ledger.verify_chain()?;
        Ok(ledger)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
