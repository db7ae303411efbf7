use crate::*;
use content_inspector::ContentType;
use digest::Digest;
use num_enum::TryFromPrimitive;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// A state-changing call
///
/// The sender is not part of the transaction: the ledger authenticates it
/// and attaches it in the `Envelope`.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Transaction {
    CreateElection(ElectionParams),
    CommitVote {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
        commitment: Commitment,
    },
    RevealVote {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        candidate_id: CandidateId,
        salt: Salt,
    },
    Finalize {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
    },
    GrantBatch {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
        accounts: Vec<Address>,
    },
    RevokeBatch {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
        accounts: Vec<Address>,
    },
    SetApprovalForAll {
        operator: Address,
        approved: bool,
    },
    SafeTransferFrom {
        from: Address,
        to: Address,
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        election_id: ElectionId,
        amount: u64,
    },
    SafeBatchTransferFrom {
        from: Address,
        to: Address,
        #[serde_as(as = "Vec<PickFirst<(DisplayFromStr, _)>>")]
        election_ids: Vec<ElectionId>,
        amounts: Vec<u64>,
    },
    GrantRole {
        role: Role,
        account: Address,
    },
    RevokeRole {
        role: Role,
        account: Address,
    },
}

impl Transaction {
    /// Get the transaction type
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Transaction::CreateElection(_) => TransactionType::CreateElection,
            Transaction::CommitVote { .. } => TransactionType::CommitVote,
            Transaction::RevealVote { .. } => TransactionType::RevealVote,
            Transaction::Finalize { .. } => TransactionType::Finalize,
            Transaction::GrantBatch { .. } => TransactionType::GrantBatch,
            Transaction::RevokeBatch { .. } => TransactionType::RevokeBatch,
            Transaction::SetApprovalForAll { .. } => TransactionType::SetApprovalForAll,
            Transaction::SafeTransferFrom { .. } => TransactionType::SafeTransferFrom,
            Transaction::SafeBatchTransferFrom { .. } => TransactionType::SafeBatchTransferFrom,
            Transaction::GrantRole { .. } => TransactionType::GrantRole,
            Transaction::RevokeRole { .. } => TransactionType::RevokeRole,
        }
    }

    /// Pack into bytes
    pub fn as_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Unpack from JSON or CBOR bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        // Small CBOR payloads can be free of NUL bytes and pass as text, so
        // JSON is only assumed when the text opens an object.
        let opens_object = bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .map_or(false, |b| *b == b'{');

        match content_inspector::inspect(bytes) {
            ContentType::UTF_8 if opens_object => Ok(serde_json::from_slice(bytes)?),
            ContentType::UTF_8 | ContentType::BINARY => Ok(serde_cbor::from_slice(bytes)?),
            _ => Err(Error::DeserializationUnknownFormat),
        }
    }

    /// Run the transaction against a working set
    ///
    /// On error the working set holds partial writes and must be dropped.
    pub fn execute<S: Store + ?Sized>(
        &self,
        ctx: &CallContext,
        ws: &mut WorkingSet<S>,
    ) -> Result<Outcome, ValidationError> {
        let registry = ElectionRegistry;
        let rights = VotingRights;

        match self {
            Transaction::CreateElection(params) => registry
                .create_election(ctx, ws, params)
                .map(Outcome::ElectionCreated),
            Transaction::CommitVote {
                election_id,
                commitment,
            } => registry
                .commit_vote(ctx, ws, *election_id, *commitment)
                .map(|_| Outcome::Done),
            Transaction::RevealVote {
                election_id,
                candidate_id,
                salt,
            } => registry
                .reveal_vote(ctx, ws, *election_id, *candidate_id, salt)
                .map(|_| Outcome::Done),
            Transaction::Finalize { election_id } => registry
                .finalize(ctx, ws, *election_id)
                .map(|_| Outcome::Done),
            Transaction::GrantBatch {
                election_id,
                accounts,
            } => rights
                .grant_batch(ctx, ws, *election_id, accounts)
                .map(Outcome::Changed),
            Transaction::RevokeBatch {
                election_id,
                accounts,
            } => rights
                .revoke_batch(ctx, ws, *election_id, accounts)
                .map(Outcome::Changed),
            Transaction::SetApprovalForAll { operator, approved } => rights
                .set_approval_for_all(operator, *approved)
                .map(|_| Outcome::Done),
            Transaction::SafeTransferFrom {
                from,
                to,
                election_id,
                amount,
            } => rights
                .safe_transfer_from(from, to, *election_id, *amount)
                .map(|_| Outcome::Done),
            Transaction::SafeBatchTransferFrom {
                from,
                to,
                election_ids,
                amounts,
            } => rights
                .safe_batch_transfer_from(from, to, election_ids, amounts)
                .map(|_| Outcome::Done),
            Transaction::GrantRole { role, account } => rights
                .grant_role(ctx, ws, *role, *account)
                .map(|changed| Outcome::Changed(changed as usize)),
            Transaction::RevokeRole { role, account } => rights
                .revoke_role(ctx, ws, *role, *account)
                .map(|changed| Outcome::Changed(changed as usize)),
        }
    }
}

/// What a successful transaction produced
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A new election with this id
    ElectionCreated(#[serde_as(as = "PickFirst<(DisplayFromStr, _)>")] ElectionId),

    /// Number of rights or roles that actually changed
    Changed(usize),

    Done,
}

/// A transaction type
#[derive(Serialize, Deserialize, TryFromPrimitive, Copy, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TransactionType {
    CreateElection = 1,
    CommitVote = 2,
    RevealVote = 3,
    Finalize = 4,
    GrantBatch = 5,
    RevokeBatch = 6,
    SetApprovalForAll = 7,
    SafeTransferFrom = 8,
    SafeBatchTransferFrom = 9,
    GrantRole = 10,
    RevokeRole = 11,
}

impl TransactionType {
    pub fn name(&self) -> &'static str {
        match self {
            TransactionType::CreateElection => "create_election",
            TransactionType::CommitVote => "commit_vote",
            TransactionType::RevealVote => "reveal_vote",
            TransactionType::Finalize => "finalize",
            TransactionType::GrantBatch => "grant_batch",
            TransactionType::RevokeBatch => "revoke_batch",
            TransactionType::SetApprovalForAll => "set_approval_for_all",
            TransactionType::SafeTransferFrom => "safe_transfer_from",
            TransactionType::SafeBatchTransferFrom => "safe_batch_transfer_from",
            TransactionType::GrantRole => "grant_role",
            TransactionType::RevokeRole => "revoke_role",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A transaction as ordered by the ledger, bound to its authenticated sender
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub sender: Address,

    /// Position of this transaction in the ledger's total order
    pub nonce: u64,

    pub tx: Transaction,
}

impl Envelope {
    /// SHA-256 over the CBOR packing of the envelope
    pub fn hash(&self) -> Result<Hash32, Error> {
        let packed = serde_cbor::to_vec(self)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&sha2::Sha256::digest(&packed));
        Ok(Hash32(out))
    }
}
