//! Stake pool program ID and PDA seeds.

use solana_program::pubkey::Pubkey;

// ── Program ID ──────────────────────────────────────────────────────────────

/// Stake pool program — pool setup, user registration, and stake/unstake.
pub const STAKE_POOL_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("StakePoo11111111111111111111111111111111111");

// ── PDA Seeds ───────────────────────────────────────────────────────────────

/// Singleton pool record.
pub const POOL_STATE_SEED: &[u8] = b"pool_state";

/// Token account holding all staked tokens.
pub const VAULT_SEED: &[u8] = b"vault";

/// Token-level owner of the vault; no private key exists for this address.
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Per-user stake record; the owner pubkey is appended to this prefix.
pub const USER_STAKE_SEED: &[u8] = b"user_stake";
