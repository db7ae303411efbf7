use crate::*;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// A stored election
///
/// Elections are never deleted. After creation only `finalized` changes; the
/// tallies and commitments live under their own keys in the store.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Election {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub id: ElectionId,

    pub name: String,

    pub start_time: Timestamp,

    /// Last instant (inclusive) at which commitments are accepted
    pub commit_deadline: Timestamp,

    /// Last instant (inclusive) at which reveals are accepted
    pub reveal_deadline: Timestamp,

    pub finalized: bool,

    /// When set, only holders of a voting right may commit
    pub gating_enabled: bool,

    /// Roster in creation order. Duplicates are kept as given.
    #[serde_as(as = "Vec<PickFirst<(DisplayFromStr, _)>>")]
    pub candidate_ids: Vec<CandidateId>,
}

/// Where an election stands at a given instant
///
/// Always computed from the clock and the stored deadlines, never stored.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before `start_time`
    Pending,

    /// `start_time <= now <= commit_deadline`
    Commit,

    /// `commit_deadline < now <= reveal_deadline`
    Reveal,

    /// After `reveal_deadline`
    Ended,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Phase::Pending => "pending",
            Phase::Commit => "commit",
            Phase::Reveal => "reveal",
            Phase::Ended => "ended",
        };
        write!(f, "{}", name)
    }
}

impl Election {
    pub fn phase(&self, now: Timestamp) -> Phase {
        if now < self.start_time {
            Phase::Pending
        } else if now <= self.commit_deadline {
            Phase::Commit
        } else if now <= self.reveal_deadline {
            Phase::Reveal
        } else {
            Phase::Ended
        }
    }

    pub fn has_candidate(&self, candidate_id: CandidateId) -> bool {
        self.candidate_ids.iter().any(|c| *c == candidate_id)
    }

    pub fn times(&self) -> ElectionTimes {
        ElectionTimes {
            start_time: self.start_time,
            commit_deadline: self.commit_deadline,
            reveal_deadline: self.reveal_deadline,
            finalized: self.finalized,
        }
    }
}

/// Timing view of an election
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct ElectionTimes {
    pub start_time: Timestamp,
    pub commit_deadline: Timestamp,
    pub reveal_deadline: Timestamp,
    pub finalized: bool,
}

/// Per (election, voter) commitment state
///
/// `NoCommit -> Committed -> Revealed`, never backwards. A missing record is
/// the `NoCommit` state.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub commitment: Commitment,
    pub committed: bool,
    pub revealed: bool,
}

impl CommitRecord {
    pub fn new(commitment: Commitment) -> Self {
        CommitRecord {
            commitment,
            committed: true,
            revealed: false,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn sample() -> Election {
        Election {
            id: 1,
            name: "Board".to_owned(),
            start_time: 100,
            commit_deadline: 200,
            reveal_deadline: 300,
            finalized: false,
            gating_enabled: false,
            candidate_ids: vec![1, 2, 2],
        }
    }

    #[test]
    fn phase_boundaries() {
        let election = sample();
        assert_eq!(election.phase(99), Phase::Pending);
        assert_eq!(election.phase(100), Phase::Commit);
        assert_eq!(election.phase(200), Phase::Commit);
        assert_eq!(election.phase(201), Phase::Reveal);
        assert_eq!(election.phase(300), Phase::Reveal);
        assert_eq!(election.phase(301), Phase::Ended);
    }

    #[test]
    fn roster_lookup() {
        let election = sample();
        assert!(election.has_candidate(2));
        assert!(!election.has_candidate(3));
    }

    #[test]
    fn ids_cross_the_boundary_as_strings() {
        let json = serde_json::to_value(&sample()).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["candidate_ids"], serde_json::json!(["1", "2", "2"]));
    }
}
