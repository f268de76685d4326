//! Stake pool instruction builders — pool setup, registration, deposits, withdrawals.
//!
//! Matches: programs/stake-pool/src/lib.rs
//! Program ID: StakePoo11111111111111111111111111111111111
//!
//! Instructions:
//!   0 = Initialize
//!   1 = CreateUserAccount
//!   2 = Stake
//!   3 = Unstake

use borsh::BorshSerialize;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};

use crate::constants::*;

// ── Instruction Discriminators ──────────────────────────────────────────────

const IX_INITIALIZE: u8 = 0;
const IX_CREATE_USER_ACCOUNT: u8 = 1;
const IX_STAKE: u8 = 2;
const IX_UNSTAKE: u8 = 3;

// ── Param Structs (exact Borsh match to program) ────────────────────────────

#[derive(BorshSerialize)]
pub struct InitializeParams {
    pub vault_bump: u8,
    pub pool_bump: u8,
}

#[derive(BorshSerialize)]
pub struct CreateUserAccountParams {
    pub bump: u8,
}

#[derive(BorshSerialize)]
pub struct AmountParams {
    pub amount: u64,
}

// ── PDA Helpers ─────────────────────────────────────────────────────────────

pub fn find_pool_state() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_STATE_SEED], &STAKE_POOL_PROGRAM_ID)
}

pub fn find_vault() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED], &STAKE_POOL_PROGRAM_ID)
}

pub fn find_vault_authority() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_AUTHORITY_SEED], &STAKE_POOL_PROGRAM_ID)
}

pub fn find_user_stake(owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[USER_STAKE_SEED, owner.as_ref()],
        &STAKE_POOL_PROGRAM_ID,
    )
}

// ── Instruction Builders ────────────────────────────────────────────────────

/// Initialize the pool and create its token vault.
///
/// Accounts:
///   0. `[signer, writable]` initializer (payer)
///   1. `[]` mint
///   2. `[writable]` pool_state PDA
///   3. `[writable]` vault PDA (token account)
///   4. `[]` vault_authority PDA
///   5. `[]` token_program
///   6. `[]` system_program
///   7. `[]` rent sysvar
pub fn create_initialize_instruction(initializer: &Pubkey, mint: &Pubkey) -> Instruction {
    let (pool_pda, pool_bump) = find_pool_state();
    let (vault_pda, vault_bump) = find_vault();
    let (vault_authority_pda, _) = find_vault_authority();

    let params = InitializeParams {
        vault_bump,
        pool_bump,
    };
    let mut data = vec![IX_INITIALIZE];
    params.serialize(&mut data).unwrap();

    Instruction {
        program_id: STAKE_POOL_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*initializer, true),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(pool_pda, false),
            AccountMeta::new(vault_pda, false),
            AccountMeta::new_readonly(vault_authority_pda, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
        data,
    }
}

/// Create the caller's stake record and bind its token account.
///
/// Accounts:
///   0. `[signer, writable]` user (payer)
///   1. `[writable]` user_stake PDA
///   2. `[]` user token account (bound as deposit source / withdrawal destination)
///   3. `[]` pool_state PDA
///   4. `[]` system_program
pub fn create_user_account_instruction(
    user: &Pubkey,
    user_token_account: &Pubkey,
) -> Instruction {
    let (record_pda, bump) = find_user_stake(user);
    let (pool_pda, _) = find_pool_state();

    let params = CreateUserAccountParams { bump };
    let mut data = vec![IX_CREATE_USER_ACCOUNT];
    params.serialize(&mut data).unwrap();

    Instruction {
        program_id: STAKE_POOL_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*user, true),
            AccountMeta::new(record_pda, false),
            AccountMeta::new_readonly(*user_token_account, false),
            AccountMeta::new_readonly(pool_pda, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    }
}

/// Move tokens from the caller's bound token account into the vault.
///
/// Accounts:
///   0. `[signer]` user
///   1. `[writable]` user_stake PDA
///   2. `[writable]` user token account (must match the record binding)
///   3. `[writable]` vault PDA
///   4. `[writable]` pool_state PDA
///   5. `[]` token_program
pub fn create_stake_instruction(
    user: &Pubkey,
    user_token_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let (record_pda, _) = find_user_stake(user);
    let (vault_pda, _) = find_vault();
    let (pool_pda, _) = find_pool_state();

    let params = AmountParams { amount };
    let mut data = vec![IX_STAKE];
    params.serialize(&mut data).unwrap();

    Instruction {
        program_id: STAKE_POOL_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new_readonly(*user, true),
            AccountMeta::new(record_pda, false),
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new(vault_pda, false),
            AccountMeta::new(pool_pda, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data,
    }
}

/// Move tokens from the vault back to the caller's bound token account.
///
/// Accounts:
///   0. `[signer]` user
///   1. `[writable]` user_stake PDA
///   2. `[writable]` user token account (must match the record binding)
///   3. `[writable]` vault PDA
///   4. `[]` vault_authority PDA
///   5. `[writable]` pool_state PDA
///   6. `[]` token_program
pub fn create_unstake_instruction(
    user: &Pubkey,
    user_token_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let (record_pda, _) = find_user_stake(user);
    let (vault_pda, _) = find_vault();
    let (vault_authority_pda, _) = find_vault_authority();
    let (pool_pda, _) = find_pool_state();

    let params = AmountParams { amount };
    let mut data = vec![IX_UNSTAKE];
    params.serialize(&mut data).unwrap();

    Instruction {
        program_id: STAKE_POOL_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new_readonly(*user, true),
            AccountMeta::new(record_pda, false),
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new(vault_pda, false),
            AccountMeta::new_readonly(vault_authority_pda, false),
            AccountMeta::new(pool_pda, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data,
    }
}
