use crate::*;
use num_enum::TryFromPrimitive;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// A state change announced to subscribers
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Event {
    ElectionCreated {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        id: ElectionId,
        name: String,
        start_time: Timestamp,
        commit_deadline: Timestamp,
        reveal_deadline: Timestamp,
        #[serde_as(as = "Vec<PickFirst<(DisplayFromStr, _)>>")]
        candidate_ids: Vec<CandidateId>,
        gating_enabled: bool,
    },
    VoteCommitted {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
        voter: Address,
        commitment: Commitment,
    },
    VoteRevealed {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
        voter: Address,
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        candidate_id: CandidateId,
    },
    ElectionFinalized {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
    },
    VotingRightGranted {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
        account: Address,
    },
    VotingRightRevoked {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
        account: Address,
    },
    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },
    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::ElectionCreated { .. } => EventType::ElectionCreated,
            Event::VoteCommitted { .. } => EventType::VoteCommitted,
            Event::VoteRevealed { .. } => EventType::VoteRevealed,
            Event::ElectionFinalized { .. } => EventType::ElectionFinalized,
            Event::VotingRightGranted { .. } => EventType::VotingRightGranted,
            Event::VotingRightRevoked { .. } => EventType::VotingRightRevoked,
            Event::RoleGranted { .. } => EventType::RoleGranted,
            Event::RoleRevoked { .. } => EventType::RoleRevoked,
        }
    }

    /// The election this event belongs to, if any
    pub fn election_id(&self) -> Option<ElectionId> {
        match self {
            Event::ElectionCreated { id, .. } => Some(*id),
            Event::VoteCommitted { election_id, .. }
            | Event::VoteRevealed { election_id, .. }
            | Event::ElectionFinalized { election_id }
            | Event::VotingRightGranted { election_id, .. }
            | Event::VotingRightRevoked { election_id, .. } => Some(*election_id),
            Event::RoleGranted { .. } | Event::RoleRevoked { .. } => None,
        }
    }

    /// The voter or account this event is about, if any
    pub fn account(&self) -> Option<Address> {
        match self {
            Event::VoteCommitted { voter, .. } | Event::VoteRevealed { voter, .. } => Some(*voter),
            Event::VotingRightGranted { account, .. }
            | Event::VotingRightRevoked { account, .. }
            | Event::RoleGranted { account, .. }
            | Event::RoleRevoked { account, .. } => Some(*account),
            Event::ElectionCreated { .. } | Event::ElectionFinalized { .. } => None,
        }
    }
}

/// An event type
#[derive(Serialize, Deserialize, TryFromPrimitive, Copy, Debug, Clone, PartialEq, Eq, Hash)]
#[derive(PartialOrd, Ord)]
#[repr(u8)]
pub enum EventType {
    ElectionCreated = 1,
    VoteCommitted = 2,
    VoteRevealed = 3,
    ElectionFinalized = 4,
    VotingRightGranted = 5,
    VotingRightRevoked = 6,
    RoleGranted = 7,
    RoleRevoked = 8,
}

impl EventType {
    pub fn name(&self) -> &'static str {
        match self {
            EventType::ElectionCreated => "ElectionCreated",
            EventType::VoteCommitted => "VoteCommitted",
            EventType::VoteRevealed => "VoteRevealed",
            EventType::ElectionFinalized => "ElectionFinalized",
            EventType::VotingRightGranted => "VotingRightGranted",
            EventType::VotingRightRevoked => "VotingRightRevoked",
            EventType::RoleGranted => "RoleGranted",
            EventType::RoleRevoked => "RoleRevoked",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An event as delivered to subscribers, tagged with where it was emitted
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub event: Event,
    pub tx_hash: Hash32,
    pub block_height: u64,

    /// Position of the event within its block
    pub log_index: u32,
}
