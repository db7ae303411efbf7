use crate::*;
use log::{debug, info};

/// Authority roles
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May grant and revoke roles
    Admin,

    /// May create elections
    ElectionAuthority,

    /// May grant and revoke voting rights
    Minter,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ElectionAuthority => "election_authority",
            Role::Minter => "minter",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "election_authority" | "authority" => Ok(Role::ElectionAuthority),
            "minter" => Ok(Role::Minter),
            _ => Err(format!("unknown role {}", s)),
        }
    }
}

/// The voting-rights capability
///
/// A voting right is a unit balance per (election, account). Rights are
/// granted and revoked by minters and can never move between accounts.
#[derive(Debug, Default, Copy, Clone)]
pub struct VotingRights;

impl VotingRights {
    /// Grant a voting right to every listed account that does not hold one
    ///
    /// Accounts that already hold the right are skipped without an event.
    /// Returns how many rights were actually granted.
    pub fn grant_batch<S: Store + ?Sized>(
        &self,
        ctx: &CallContext,
        ws: &mut WorkingSet<S>,
        election_id: ElectionId,
        accounts: &[Address],
    ) -> Result<usize, ValidationError> {
        ws.require_role(Role::Minter, &ctx.sender)?;
        if accounts.is_empty() {
            return Err(ValidationError::NoAccounts);
        }

        let granted = accounts.iter().fold(0, |granted, account| {
            if ws.right_balance(election_id, account) > 0 {
                debug!("election {}: {} already holds a voting right", election_id, account);
                return granted;
            }
            ws.set_right_balance(election_id, *account, 1);
            ws.emit(Event::VotingRightGranted {
                election_id,
                account: *account,
            });
            granted + 1
        });

        info!(
            "election {}: granted {} of {} voting rights",
            election_id,
            granted,
            accounts.len()
        );
        Ok(granted)
    }

    /// Revoke the voting right of every listed account that holds one
    ///
    /// Accounts without a right are skipped. Returns how many rights were
    /// actually revoked.
    pub fn revoke_batch<S: Store + ?Sized>(
        &self,
        ctx: &CallContext,
        ws: &mut WorkingSet<S>,
        election_id: ElectionId,
        accounts: &[Address],
    ) -> Result<usize, ValidationError> {
        ws.require_role(Role::Minter, &ctx.sender)?;
        if accounts.is_empty() {
            return Err(ValidationError::NoAccounts);
        }

        let revoked = accounts.iter().fold(0, |revoked, account| {
            if ws.right_balance(election_id, account) == 0 {
                return revoked;
            }
            ws.set_right_balance(election_id, *account, 0);
            ws.emit(Event::VotingRightRevoked {
                election_id,
                account: *account,
            });
            revoked + 1
        });

        info!(
            "election {}: revoked {} of {} voting rights",
            election_id,
            revoked,
            accounts.len()
        );
        Ok(revoked)
    }

    pub fn has_right<S: Store + ?Sized>(
        &self,
        store: &S,
        account: &Address,
        election_id: ElectionId,
    ) -> bool {
        store.right_balance(election_id, account) > 0
    }

    pub fn balance_of<S: Store + ?Sized>(
        &self,
        store: &S,
        account: &Address,
        election_id: ElectionId,
    ) -> u8 {
        store.right_balance(election_id, account)
    }

    /// Voting rights cannot be approved for transfer. Always fails.
    pub fn set_approval_for_all(
        &self,
        _operator: &Address,
        _approved: bool,
    ) -> Result<(), ValidationError> {
        Err(ValidationError::ApprovalDisabled)
    }

    /// Always `false`: no operator can ever be approved
    pub fn is_approved_for_all(&self, _owner: &Address, _operator: &Address) -> bool {
        false
    }

    /// Voting rights cannot be transferred. Always fails.
    pub fn safe_transfer_from(
        &self,
        _from: &Address,
        _to: &Address,
        _election_id: ElectionId,
        _amount: u64,
    ) -> Result<(), ValidationError> {
        Err(ValidationError::TransferDisabled)
    }

    /// Voting rights cannot be transferred. Always fails.
    pub fn safe_batch_transfer_from(
        &self,
        _from: &Address,
        _to: &Address,
        _election_ids: &[ElectionId],
        _amounts: &[u64],
    ) -> Result<(), ValidationError> {
        Err(ValidationError::TransferDisabled)
    }

    /// Give `account` a role. Admin only; granting a held role is a no-op.
    pub fn grant_role<S: Store + ?Sized>(
        &self,
        ctx: &CallContext,
        ws: &mut WorkingSet<S>,
        role: Role,
        account: Address,
    ) -> Result<bool, ValidationError> {
        ws.require_role(Role::Admin, &ctx.sender)?;
        if ws.has_role(role, &account) {
            return Ok(false);
        }
        ws.set_role(role, account, true);
        ws.emit(Event::RoleGranted {
            role,
            account,
            sender: ctx.sender,
        });
        info!("role {} granted to {}", role, account);
        Ok(true)
    }

    /// Take a role away from `account`. Admin only; revoking an unheld role
    /// is a no-op.
    pub fn revoke_role<S: Store + ?Sized>(
        &self,
        ctx: &CallContext,
        ws: &mut WorkingSet<S>,
        role: Role,
        account: Address,
    ) -> Result<bool, ValidationError> {
        ws.require_role(Role::Admin, &ctx.sender)?;
        if !ws.has_role(role, &account) {
            return Ok(false);
        }
        ws.set_role(role, account, false);
        ws.emit(Event::RoleRevoked {
            role,
            account,
            sender: ctx.sender,
        });
        info!("role {} revoked from {}", role, account);
        Ok(true)
    }
}
