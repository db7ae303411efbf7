use crate::*;
use std::collections::{BTreeMap, BTreeSet};

/// Read access to ledger state
pub trait Store {
    /// Number of elections created so far, which is also the highest id
    fn election_count(&self) -> u64;

    fn get_election(&self, id: ElectionId) -> Option<Election>;

    fn get_commit(&self, election_id: ElectionId, voter: &Address) -> Option<CommitRecord>;

    fn get_tally(&self, election_id: ElectionId, candidate_id: CandidateId) -> u64;

    /// Voting right balance, always 0 or 1
    fn right_balance(&self, election_id: ElectionId, account: &Address) -> u8;

    fn has_role(&self, role: Role, account: &Address) -> bool;

    /// Get an election, failing if it does not exist
    fn election(&self, id: ElectionId) -> Result<Election, ValidationError> {
        self.get_election(id)
            .ok_or(ValidationError::ElectionNotFound(id))
    }

    /// Fail unless `account` holds `role`
    fn require_role(&self, role: Role, account: &Address) -> Result<(), ValidationError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(ValidationError::MissingRole {
                account: *account,
                role,
            })
        }
    }
}

/// Write access to ledger state
///
/// Only the ledger harness writes through this trait directly. Operations
/// write into a `WorkingSet` which is applied once the whole transaction has
/// succeeded.
pub trait StoreMut: Store {
    fn set_election_count(&mut self, count: u64);

    fn put_election(&mut self, election: Election);

    fn put_commit(&mut self, election_id: ElectionId, voter: Address, record: CommitRecord);

    fn set_tally(&mut self, election_id: ElectionId, candidate_id: CandidateId, count: u64);

    fn set_right_balance(&mut self, election_id: ElectionId, account: Address, balance: u8);

    fn set_role(&mut self, role: Role, account: Address, granted: bool);
}

/// A simple store that uses in-memory BTreeMaps
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct MemStore {
    election_count: u64,

    #[serde(with = "entries")]
    elections: BTreeMap<ElectionId, Election>,

    #[serde(with = "entries")]
    commits: BTreeMap<(ElectionId, Address), CommitRecord>,

    #[serde(with = "entries")]
    tallies: BTreeMap<(ElectionId, CandidateId), u64>,

    #[serde(with = "entries")]
    rights: BTreeMap<(ElectionId, Address), u8>,

    roles: BTreeSet<(Role, Address)>,
}

impl MemStore {
    /// All elections in id order
    pub fn elections(&self) -> impl Iterator<Item = &Election> {
        self.elections.values()
    }

    /// Every account holding a voting right for the given election
    pub fn right_holders(&self, election_id: ElectionId) -> Vec<Address> {
        self.rights
            .range((election_id, Address::ZERO)..=(election_id, Address([0xff; 20])))
            .filter(|(_, balance)| **balance > 0)
            .map(|((_, account), _)| *account)
            .collect()
    }

    /// Every account holding the given role
    pub fn role_holders(&self, role: Role) -> Vec<Address> {
        self.roles
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, account)| *account)
            .collect()
    }
}

impl Store for MemStore {
    fn election_count(&self) -> u64 {
        self.election_count
    }

    fn get_election(&self, id: ElectionId) -> Option<Election> {
        self.elections.get(&id).cloned()
    }

    fn get_commit(&self, election_id: ElectionId, voter: &Address) -> Option<CommitRecord> {
        self.commits.get(&(election_id, *voter)).copied()
    }

    fn get_tally(&self, election_id: ElectionId, candidate_id: CandidateId) -> u64 {
        self.tallies
            .get(&(election_id, candidate_id))
            .copied()
            .unwrap_or(0)
    }

    fn right_balance(&self, election_id: ElectionId, account: &Address) -> u8 {
        self.rights
            .get(&(election_id, *account))
            .copied()
            .unwrap_or(0)
    }

    fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.contains(&(role, *account))
    }
}

impl StoreMut for MemStore {
    fn set_election_count(&mut self, count: u64) {
        self.election_count = count;
    }

    fn put_election(&mut self, election: Election) {
        self.elections.insert(election.id, election);
    }

    fn put_commit(&mut self, election_id: ElectionId, voter: Address, record: CommitRecord) {
        self.commits.insert((election_id, voter), record);
    }

    fn set_tally(&mut self, election_id: ElectionId, candidate_id: CandidateId, count: u64) {
        self.tallies.insert((election_id, candidate_id), count);
    }

    fn set_right_balance(&mut self, election_id: ElectionId, account: Address, balance: u8) {
        if balance == 0 {
            self.rights.remove(&(election_id, account));
        } else {
            self.rights.insert((election_id, account), balance);
        }
    }

    fn set_role(&mut self, role: Role, account: Address, granted: bool) {
        if granted {
            self.roles.insert((role, account));
        } else {
            self.roles.remove(&(role, account));
        }
    }
}

/// Writes buffered by a `WorkingSet`, not yet applied to any store
#[derive(Default, Debug, Clone)]
pub struct StateChanges {
    election_count: Option<u64>,
    elections: BTreeMap<ElectionId, Election>,
    commits: BTreeMap<(ElectionId, Address), CommitRecord>,
    tallies: BTreeMap<(ElectionId, CandidateId), u64>,
    rights: BTreeMap<(ElectionId, Address), u8>,
    roles: BTreeMap<(Role, Address), bool>,
}

impl StateChanges {
    pub fn is_empty(&self) -> bool {
        self.election_count.is_none()
            && self.elections.is_empty()
            && self.commits.is_empty()
            && self.tallies.is_empty()
            && self.rights.is_empty()
            && self.roles.is_empty()
    }

    /// Write every buffered change into `store`
    pub fn apply_to<S: StoreMut + ?Sized>(self, store: &mut S) {
        if let Some(count) = self.election_count {
            store.set_election_count(count);
        }
        for (_, election) in self.elections {
            store.put_election(election);
        }
        for ((election_id, voter), record) in self.commits {
            store.put_commit(election_id, voter, record);
        }
        for ((election_id, candidate_id), count) in self.tallies {
            store.set_tally(election_id, candidate_id, count);
        }
        for ((election_id, account), balance) in self.rights {
            store.set_right_balance(election_id, account, balance);
        }
        for ((role, account), granted) in self.roles {
            store.set_role(role, account, granted);
        }
    }
}

/// Copy-on-write view over a store for the duration of one transaction
///
/// Reads fall through to the underlying store unless the transaction already
/// wrote the key. Events are buffered alongside the writes. Dropping the
/// working set discards both.
pub struct WorkingSet<'a, S: Store + ?Sized> {
    inner: &'a S,
    changes: StateChanges,
    events: Vec<Event>,
}

impl<'a, S: Store + ?Sized> WorkingSet<'a, S> {
    pub fn new(inner: &'a S) -> Self {
        WorkingSet {
            inner,
            changes: StateChanges::default(),
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events emitted so far, in emission order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Release the borrow on the underlying store, keeping the buffered
    /// writes and events
    pub fn into_parts(self) -> (StateChanges, Vec<Event>) {
        (self.changes, self.events)
    }
}

impl<'a, S: Store + ?Sized> Store for WorkingSet<'a, S> {
    fn election_count(&self) -> u64 {
        self.changes
            .election_count
            .unwrap_or_else(|| self.inner.election_count())
    }

    fn get_election(&self, id: ElectionId) -> Option<Election> {
        match self.changes.elections.get(&id) {
            Some(election) => Some(election.clone()),
            None => self.inner.get_election(id),
        }
    }

    fn get_commit(&self, election_id: ElectionId, voter: &Address) -> Option<CommitRecord> {
        match self.changes.commits.get(&(election_id, *voter)) {
            Some(record) => Some(*record),
            None => self.inner.get_commit(election_id, voter),
        }
    }

    fn get_tally(&self, election_id: ElectionId, candidate_id: CandidateId) -> u64 {
        match self.changes.tallies.get(&(election_id, candidate_id)) {
            Some(count) => *count,
            None => self.inner.get_tally(election_id, candidate_id),
        }
    }

    fn right_balance(&self, election_id: ElectionId, account: &Address) -> u8 {
        match self.changes.rights.get(&(election_id, *account)) {
            Some(balance) => *balance,
            None => self.inner.right_balance(election_id, account),
        }
    }

    fn has_role(&self, role: Role, account: &Address) -> bool {
        match self.changes.roles.get(&(role, *account)) {
            Some(granted) => *granted,
            None => self.inner.has_role(role, account),
        }
    }
}

impl<'a, S: Store + ?Sized> StoreMut for WorkingSet<'a, S> {
    fn set_election_count(&mut self, count: u64) {
        self.changes.election_count = Some(count);
    }

    fn put_election(&mut self, election: Election) {
        self.changes.elections.insert(election.id, election);
    }

    fn put_commit(&mut self, election_id: ElectionId, voter: Address, record: CommitRecord) {
        self.changes.commits.insert((election_id, voter), record);
    }

    fn set_tally(&mut self, election_id: ElectionId, candidate_id: CandidateId, count: u64) {
        self.changes
            .tallies
            .insert((election_id, candidate_id), count);
    }

    fn set_right_balance(&mut self, election_id: ElectionId, account: Address, balance: u8) {
        self.changes.rights.insert((election_id, account), balance);
    }

    fn set_role(&mut self, role: Role, account: Address, granted: bool) {
        self.changes.roles.insert((role, account), granted);
    }
}
