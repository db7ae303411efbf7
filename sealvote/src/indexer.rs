use crate::*;
use log::{debug, info};
use serde_json::json;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::collections::BTreeMap;

/// Uniquely identifies an indexed event, so redelivery is harmless
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AuditKey {
    pub event_type: EventType,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub election_id: Option<ElectionId>,
    pub account: Option<Address>,
    pub tx_hash: Hash32,
}

/// One row of the audit log
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub key: AuditKey,
    pub block_height: u64,
    pub log_index: u32,
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub candidate_id: Option<CandidateId>,
    pub payload: serde_json::Value,
}

impl AuditRecord {
    pub fn from_event(record: &EventRecord) -> Self {
        let event = &record.event;
        let candidate_id = match event {
            Event::VoteRevealed { candidate_id, .. } => Some(*candidate_id),
            _ => None,
        };

        let payload = match event {
            Event::ElectionCreated {
                name,
                start_time,
                commit_deadline,
                reveal_deadline,
                candidate_ids,
                gating_enabled,
                ..
            } => json!({
                "name": name,
                "start_time": start_time,
                "commit_deadline": commit_deadline,
                "reveal_deadline": reveal_deadline,
                "candidate_ids": candidate_ids.iter().map(u64::to_string).collect::<Vec<_>>(),
                "gating_enabled": gating_enabled,
            }),
            Event::VoteCommitted { commitment, .. } => json!({
                "commitment": commitment.to_string(),
            }),
            Event::VoteRevealed { candidate_id, .. } => json!({
                "candidate_id": candidate_id.to_string(),
            }),
            Event::RoleGranted { role, sender, .. } | Event::RoleRevoked { role, sender, .. } => {
                json!({
                    "role": role.name(),
                    "sender": sender.to_string(),
                })
            }
            Event::ElectionFinalized { .. }
            | Event::VotingRightGranted { .. }
            | Event::VotingRightRevoked { .. } => serde_json::Value::Null,
        };

        AuditRecord {
            key: AuditKey {
                event_type: event.event_type(),
                election_id: event.election_id(),
                account: event.account(),
                tx_hash: record.tx_hash,
            },
            block_height: record.block_height,
            log_index: record.log_index,
            candidate_id,
            payload,
        }
    }
}

/// Destination for audit records
pub trait AuditSink {
    /// Insert the record unless its key is already present.
    /// Returns `true` if it was inserted.
    fn upsert(&mut self, record: AuditRecord) -> bool;
}

/// An audit log kept in memory, in insertion order
#[derive(Default, Debug, Clone)]
pub struct MemAuditLog {
    records: Vec<AuditRecord>,
    keys: BTreeMap<AuditKey, usize>,
}

impl MemAuditLog {
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &AuditKey) -> Option<&AuditRecord> {
        self.keys.get(key).map(|index| &self.records[*index])
    }

    /// Records of one election, sorted by block and position
    pub fn by_election(&self, election_id: ElectionId) -> Vec<&AuditRecord> {
        let mut found: Vec<&AuditRecord> = self
            .records
            .iter()
            .filter(|r| r.key.election_id == Some(election_id))
            .collect();
        found.sort_by_key(|r| (r.block_height, r.log_index));
        found
    }
}

impl AuditSink for MemAuditLog {
    fn upsert(&mut self, record: AuditRecord) -> bool {
        if self.keys.contains_key(&record.key) {
            return false;
        }
        self.keys.insert(record.key.clone(), self.records.len());
        self.records.push(record);
        true
    }
}

/// Hook run once when an election is first seen finalized
///
/// Implementations must not fail the indexer: they only get told.
pub trait AnalysisTrigger {
    fn election_finalized(&mut self, election_id: ElectionId);
}

/// Trigger that does nothing
#[derive(Debug, Default, Copy, Clone)]
pub struct NoAnalysis;

impl AnalysisTrigger for NoAnalysis {
    fn election_finalized(&mut self, _election_id: ElectionId) {}
}

/// Off-ledger consumer of the event log
///
/// Keeps an audit log and a read model of every election.
#[derive(Debug, Default)]
pub struct Indexer<A = MemAuditLog, T = NoAnalysis> {
    audit: A,
    trigger: T,
    elections: BTreeMap<ElectionId, Election>,
    cursor: usize,
}

impl<A: AuditSink, T: AnalysisTrigger> Indexer<A, T> {
    pub fn new(audit: A, trigger: T) -> Self {
        Indexer {
            audit,
            trigger,
            elections: BTreeMap::new(),
            cursor: 0,
        }
    }

    /// Index one event. Returns `false` if it had already been indexed.
    pub fn ingest(&mut self, record: &EventRecord) -> bool {
        match &record.event {
            Event::ElectionCreated {
                id,
                name,
                start_time,
                commit_deadline,
                reveal_deadline,
                candidate_ids,
                gating_enabled,
            } => {
                let view = self.elections.entry(*id).or_insert_with(|| Election {
                    id: *id,
                    name: name.clone(),
                    start_time: *start_time,
                    commit_deadline: *commit_deadline,
                    reveal_deadline: *reveal_deadline,
                    finalized: false,
                    gating_enabled: *gating_enabled,
                    candidate_ids: vec![],
                });
                view.candidate_ids = candidate_ids.clone();
            }
            Event::ElectionFinalized { election_id } => {
                if let Some(view) = self.elections.get_mut(election_id) {
                    if !view.finalized {
                        view.finalized = true;
                        info!("election {} finalized, running analysis", election_id);
                        self.trigger.election_finalized(*election_id);
                    }
                }
            }
            _ => {}
        }

        let inserted = self.audit.upsert(AuditRecord::from_event(record));
        if !inserted {
            debug!(
                "{} from {} already indexed",
                record.event.event_type(),
                record.tx_hash
            );
        }
        inserted
    }

    /// Index every event the ledger emitted since the last sync.
    /// Returns the number of new audit records.
    pub fn sync<S>(&mut self, ledger: &Ledger<S>) -> usize {
        let fresh = ledger.events_since(self.cursor);
        self.cursor += fresh.len();
        fresh.iter().filter(|record| self.ingest(record)).count()
    }

    pub fn election(&self, election_id: ElectionId) -> Option<&Election> {
        self.elections.get(&election_id)
    }

    pub fn elections(&self) -> impl Iterator<Item = &Election> {
        self.elections.values()
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    /// Number of ledger events consumed so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
