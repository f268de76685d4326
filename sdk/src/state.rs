//! Client-side views of on-chain pool accounts and checked decoding for reads.
//!
//! A fetched account is interpreted through [`read_pool_state`] or
//! [`read_user_stake_record`], which classify the ways a read can come back
//! empty or wrong instead of handing raw bytes to the caller.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::constants::STAKE_POOL_PROGRAM_ID;

// ── Account Structs (exact Borsh match to program) ──────────────────────────

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub is_initialized: bool,
    pub initializer: Pubkey,
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub total_staked: u64,
    pub bump: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserStakeRecord {
    pub is_initialized: bool,
    pub owner: Pubkey,
    pub token_account: Pubkey,
    pub staked_amount: u64,
    pub bump: u8,
}

// ── Read Errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// No account exists at the derived address, or the account has never
    /// been initialized as a record.
    #[error("record not found")]
    NotFound,
    /// An account exists but is owned by a different program.
    #[error("account is not managed by the stake pool program")]
    OwnershipMismatch,
    /// The account is program-owned but its bytes do not decode as the
    /// expected record type.
    #[error("account data does not decode as the expected record")]
    MalformedRecord,
}

// ── Checked Decoding ────────────────────────────────────────────────────────

/// Interpret a fetched account as the pool state record.
///
/// `account` is `(owner, data)` of the account found at the pool state
/// address, or `None` when no account exists there.
pub fn read_pool_state(account: Option<(&Pubkey, &[u8])>) -> Result<PoolState, QueryError> {
    let (owner, data) = account.ok_or(QueryError::NotFound)?;
    if *owner != STAKE_POOL_PROGRAM_ID {
        return Err(QueryError::OwnershipMismatch);
    }
    let pool = PoolState::try_from_slice(data).map_err(|_| QueryError::MalformedRecord)?;
    if !pool.is_initialized {
        return Err(QueryError::NotFound);
    }
    Ok(pool)
}

/// Interpret a fetched account as the stake record of `expected_owner`.
///
/// `account` is `(owner, data)` of the account found at the address derived
/// for `expected_owner`, or `None` when no account exists there.
pub fn read_user_stake_record(
    expected_owner: &Pubkey,
    account: Option<(&Pubkey, &[u8])>,
) -> Result<UserStakeRecord, QueryError> {
    let (owner, data) = account.ok_or(QueryError::NotFound)?;
    if *owner != STAKE_POOL_PROGRAM_ID {
        return Err(QueryError::OwnershipMismatch);
    }
    let record =
        UserStakeRecord::try_from_slice(data).map_err(|_| QueryError::MalformedRecord)?;
    if !record.is_initialized || record.owner != *expected_owner {
        return Err(QueryError::NotFound);
    }
    Ok(record)
}
