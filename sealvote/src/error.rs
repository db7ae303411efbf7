use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("sealvote: invalid hexadecimal")]
    BadHex,

    #[error("sealvote: wrong length - expected {expected} bytes, found {found}")]
    BadLength { expected: usize, found: usize },

    #[error("sealvote: CBOR error: {0}")]
    CBOR(#[from] serde_cbor::Error),

    #[error("sealvote: JSON error: {0}")]
    JSON(#[from] serde_json::Error),

    #[error("sealvote: error deserializing transaction: unknown format")]
    DeserializationUnknownFormat,

    #[error("sealvote: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sealvote: clock cannot go backwards from {current} to {requested}")]
    ClockRegression {
        current: Timestamp,
        requested: Timestamp,
    },

    #[error("sealvote: block chain broken at height {0}")]
    BrokenChain(u64),
}

/// The three classes of transaction failure
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed parameters
    Validation,

    /// Operation outside its time window or out of sequence
    Phase,

    /// Missing role or missing voting right
    Authorization,
}

/// Transaction validation errors
///
/// Every failure reverts the whole transaction. `reason()` is the stable
/// string surfaced to callers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Error)]
#[serde(tag = "error", content = "detail", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("sealvote validation: election name is empty")]
    EmptyName,

    #[error("sealvote validation: election has no candidates")]
    NoCandidates,

    #[error("sealvote validation: start time, commit deadline, and reveal deadline are out of order")]
    TimesOrder,

    #[error("sealvote validation: election {0} does not exist")]
    ElectionNotFound(ElectionId),

    #[error("sealvote validation: election has not started")]
    TooEarly,

    #[error("sealvote validation: commit phase is over")]
    CommitPhaseOver,

    #[error("sealvote validation: commitment is the zero hash")]
    EmptyCommit,

    #[error("sealvote validation: sender holds no voting right for this election")]
    NoVotingRight,

    #[error("sealvote validation: sender already committed")]
    AlreadyCommitted,

    #[error("sealvote validation: commit phase is still open")]
    CommitPhaseStillOpen,

    #[error("sealvote validation: reveal phase is over")]
    RevealPhaseOver,

    #[error("sealvote validation: sender has no commitment")]
    NoCommit,

    #[error("sealvote validation: sender already revealed")]
    AlreadyRevealed,

    #[error("sealvote validation: revealed vote does not match commitment")]
    InvalidReveal,

    #[error("sealvote validation: candidate {0} is not on the roster")]
    UnknownCandidate(CandidateId),

    #[error("sealvote validation: reveal phase is not over")]
    RevealNotOver,

    #[error("sealvote validation: election already finalized")]
    AlreadyFinalized,

    #[error("sealvote validation: no accounts given")]
    NoAccounts,

    #[error("sealvote validation: account {account} is missing role {role}")]
    MissingRole { account: Address, role: Role },

    #[error("sealvote validation: voting rights cannot be transferred")]
    TransferDisabled,

    #[error("sealvote validation: voting rights cannot be approved for transfer")]
    ApprovalDisabled,
}

impl ValidationError {
    /// Stable, machine-checkable failure reason
    pub fn reason(&self) -> &'static str {
        use ValidationError::*;
        match self {
            EmptyName => "Empty name",
            NoCandidates => "No candidates",
            TimesOrder => "Times order",
            ElectionNotFound(_) => "Election not found",
            TooEarly => "Too early",
            CommitPhaseOver => "Commit phase over",
            EmptyCommit => "Empty commit",
            NoVotingRight => "No voting right",
            AlreadyCommitted => "Already committed",
            CommitPhaseStillOpen => "Commit phase",
            RevealPhaseOver => "Reveal phase over",
            NoCommit => "No commit",
            AlreadyRevealed => "Already revealed",
            InvalidReveal => "Invalid reveal",
            UnknownCandidate(_) => "Unknown candidate",
            RevealNotOver => "Reveal not over",
            AlreadyFinalized => "Already finalized",
            NoAccounts => "No accounts",
            MissingRole { .. } => "Missing role",
            TransferDisabled => "SBT: transfer disabled",
            ApprovalDisabled => "SBT: approvals disabled",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        use ValidationError::*;
        match self {
            EmptyName | NoCandidates | TimesOrder | EmptyCommit | InvalidReveal
            | UnknownCandidate(_) | NoAccounts => ErrorKind::Validation,
            ElectionNotFound(_) | TooEarly | CommitPhaseOver | AlreadyCommitted
            | CommitPhaseStillOpen | RevealPhaseOver | NoCommit | AlreadyRevealed
            | RevealNotOver | AlreadyFinalized => ErrorKind::Phase,
            NoVotingRight | MissingRole { .. } | TransferDisabled | ApprovalDisabled => {
                ErrorKind::Authorization
            }
        }
    }
}
