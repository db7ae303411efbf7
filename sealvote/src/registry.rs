use crate::*;
use indexmap::IndexMap;
use log::{debug, info};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// Parameters of a new election
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ElectionParams {
    pub name: String,
    pub start_time: Timestamp,
    pub commit_deadline: Timestamp,
    pub reveal_deadline: Timestamp,

    #[serde_as(as = "Vec<PickFirst<(DisplayFromStr, _)>>")]
    pub candidate_ids: Vec<CandidateId>,

    #[serde(default)]
    pub gating_enabled: bool,
}

impl ElectionParams {
    /// Check the creation preconditions, in order
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.candidate_ids.is_empty() {
            return Err(ValidationError::NoCandidates);
        }
        if !(self.start_time < self.commit_deadline && self.commit_deadline < self.reveal_deadline)
        {
            return Err(ValidationError::TimesOrder);
        }
        Ok(())
    }
}

/// The election registry and voting state machine
///
/// Every operation either returns `Ok` having written to the working set, or
/// returns the reason it failed. Callers must discard the working set on
/// failure; operations check all of their gates before their first write.
#[derive(Debug, Default, Copy, Clone)]
pub struct ElectionRegistry;

impl ElectionRegistry {
    /// Create an election and return its id
    pub fn create_election<S: Store + ?Sized>(
        &self,
        ctx: &CallContext,
        ws: &mut WorkingSet<S>,
        params: &ElectionParams,
    ) -> Result<ElectionId, ValidationError> {
        ws.require_role(Role::ElectionAuthority, &ctx.sender)?;
        params.validate()?;

        let id = ws.election_count() + 1;
        let election = Election {
            id,
            name: params.name.clone(),
            start_time: params.start_time,
            commit_deadline: params.commit_deadline,
            reveal_deadline: params.reveal_deadline,
            finalized: false,
            gating_enabled: params.gating_enabled,
            candidate_ids: params.candidate_ids.clone(),
        };

        ws.set_election_count(id);
        for candidate_id in &election.candidate_ids {
            ws.set_tally(id, *candidate_id, 0);
        }
        ws.put_election(election);
        ws.emit(Event::ElectionCreated {
            id,
            name: params.name.clone(),
            start_time: params.start_time,
            commit_deadline: params.commit_deadline,
            reveal_deadline: params.reveal_deadline,
            candidate_ids: params.candidate_ids.clone(),
            gating_enabled: params.gating_enabled,
        });

        info!("election {} created: {:?}", id, params.name);
        Ok(id)
    }

    /// Record the sender's commitment
    pub fn commit_vote<S: Store + ?Sized>(
        &self,
        ctx: &CallContext,
        ws: &mut WorkingSet<S>,
        election_id: ElectionId,
        commitment: Commitment,
    ) -> Result<(), ValidationError> {
        let election = ws.election(election_id)?;

        if ctx.now < election.start_time {
            return Err(ValidationError::TooEarly);
        }
        if ctx.now > election.commit_deadline {
            return Err(ValidationError::CommitPhaseOver);
        }
        if commitment.is_zero() {
            return Err(ValidationError::EmptyCommit);
        }
        if election.gating_enabled && !VotingRights.has_right(&*ws, &ctx.sender, election_id) {
            return Err(ValidationError::NoVotingRight);
        }
        if ws.get_commit(election_id, &ctx.sender).is_some() {
            return Err(ValidationError::AlreadyCommitted);
        }

        ws.put_commit(election_id, ctx.sender, CommitRecord::new(commitment));
        ws.emit(Event::VoteCommitted {
            election_id,
            voter: ctx.sender,
            commitment,
        });

        debug!("election {}: {} committed {}", election_id, ctx.sender, commitment);
        Ok(())
    }

    /// Open the sender's commitment and count the vote
    pub fn reveal_vote<S: Store + ?Sized>(
        &self,
        ctx: &CallContext,
        ws: &mut WorkingSet<S>,
        election_id: ElectionId,
        candidate_id: CandidateId,
        salt: &Salt,
    ) -> Result<(), ValidationError> {
        let election = ws.election(election_id)?;

        if ctx.now <= election.commit_deadline {
            return Err(ValidationError::CommitPhaseStillOpen);
        }
        if ctx.now > election.reveal_deadline {
            return Err(ValidationError::RevealPhaseOver);
        }

        let mut record = ws
            .get_commit(election_id, &ctx.sender)
            .ok_or(ValidationError::NoCommit)?;
        if record.revealed {
            return Err(ValidationError::AlreadyRevealed);
        }
        if !record.commitment.verify(candidate_id, salt) {
            return Err(ValidationError::InvalidReveal);
        }
        if !election.has_candidate(candidate_id) {
            return Err(ValidationError::UnknownCandidate(candidate_id));
        }

        record.revealed = true;
        ws.put_commit(election_id, ctx.sender, record);
        let tally = ws.get_tally(election_id, candidate_id);
        ws.set_tally(election_id, candidate_id, tally + 1);
        ws.emit(Event::VoteRevealed {
            election_id,
            voter: ctx.sender,
            candidate_id,
        });

        debug!(
            "election {}: {} revealed a vote for candidate {}",
            election_id, ctx.sender, candidate_id
        );
        Ok(())
    }

    /// Mark the tallies of an ended election as final. Anyone may call this.
    pub fn finalize<S: Store + ?Sized>(
        &self,
        ctx: &CallContext,
        ws: &mut WorkingSet<S>,
        election_id: ElectionId,
    ) -> Result<(), ValidationError> {
        let mut election = ws.election(election_id)?;

        if ctx.now <= election.reveal_deadline {
            return Err(ValidationError::RevealNotOver);
        }
        if election.finalized {
            return Err(ValidationError::AlreadyFinalized);
        }

        election.finalized = true;
        ws.put_election(election);
        ws.emit(Event::ElectionFinalized { election_id });

        info!("election {} finalized", election_id);
        Ok(())
    }

    // Reads
    // -----

    pub fn elections_count<S: Store + ?Sized>(&self, store: &S) -> u64 {
        store.election_count()
    }

    pub fn get_election<S: Store + ?Sized>(
        &self,
        store: &S,
        election_id: ElectionId,
    ) -> Result<Election, ValidationError> {
        store.election(election_id)
    }

    pub fn get_times<S: Store + ?Sized>(
        &self,
        store: &S,
        election_id: ElectionId,
    ) -> Result<ElectionTimes, ValidationError> {
        Ok(store.election(election_id)?.times())
    }

    pub fn get_candidate_ids<S: Store + ?Sized>(
        &self,
        store: &S,
        election_id: ElectionId,
    ) -> Result<Vec<CandidateId>, ValidationError> {
        Ok(store.election(election_id)?.candidate_ids)
    }

    /// Votes counted for a candidate, zero for unknown elections or candidates
    pub fn get_tally<S: Store + ?Sized>(
        &self,
        store: &S,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> u64 {
        store.get_tally(election_id, candidate_id)
    }

    /// The voter's stored commitment, or the zero sentinel
    pub fn commits<S: Store + ?Sized>(
        &self,
        store: &S,
        election_id: ElectionId,
        voter: &Address,
    ) -> Commitment {
        store
            .get_commit(election_id, voter)
            .map(|record| record.commitment)
            .unwrap_or(Commitment::ZERO)
    }

    pub fn revealed<S: Store + ?Sized>(
        &self,
        store: &S,
        election_id: ElectionId,
        voter: &Address,
    ) -> bool {
        store
            .get_commit(election_id, voter)
            .map(|record| record.revealed)
            .unwrap_or(false)
    }

    /// Tally of every roster candidate, in roster order
    pub fn results<S: Store + ?Sized>(
        &self,
        store: &S,
        election_id: ElectionId,
    ) -> Result<IndexMap<CandidateId, u64>, ValidationError> {
        let election = store.election(election_id)?;
        Ok(election
            .candidate_ids
            .iter()
            .map(|candidate_id| (*candidate_id, store.get_tally(election_id, *candidate_id)))
            .collect())
    }

    pub fn phase<S: Store + ?Sized>(
        &self,
        store: &S,
        election_id: ElectionId,
        now: Timestamp,
    ) -> Result<Phase, ValidationError> {
        Ok(store.election(election_id)?.phase(now))
    }
}
