// StakePool — single-mint token custody pool
// PDA-derived vault with per-user stake records and a running staked total.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    system_program,
    sysvar::Sysvar,
};

// ---------------------------------------------------------------------------
// Program ID
// ---------------------------------------------------------------------------

solana_program::declare_id!("StakePoo11111111111111111111111111111111111");

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const POOL_STATE_SEED: &[u8] = b"pool_state";
const VAULT_SEED: &[u8] = b"vault";
const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";
const USER_STAKE_SEED: &[u8] = b"user_stake";

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

#[cfg(not(feature = "no-entrypoint"))]
entrypoint!(process_instruction);

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let (&disc, rest) = instruction_data
        .split_first()
        .ok_or(ProgramError::InvalidInstructionData)?;

    match disc {
        0 => process_initialize(program_id, accounts, rest),
        1 => process_create_user_account(program_id, accounts, rest),
        2 => process_stake(program_id, accounts, rest),
        3 => process_unstake(program_id, accounts, rest),
        _ => Err(StakePoolError::InvalidInstruction.into()),
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StakePoolError {
    #[error("Invalid instruction discriminator")]
    InvalidInstruction,
    #[error("Pool already initialized")]
    AlreadyInitialized,
    #[error("Pool not initialized")]
    NotInitialized,
    #[error("Stake record already exists for this user")]
    AlreadyExists,
    #[error("Required signature is missing")]
    Unauthenticated,
    #[error("Signer does not own this stake record")]
    Unauthorized,
    #[error("Account does not match its derived address")]
    DerivationMismatch,
    #[error("Account is owned by the wrong program")]
    OwnershipMismatch,
    #[error("Vault does not match the pool's recorded vault")]
    VaultMismatch,
    #[error("Token account does not match the stake record")]
    TokenAccountMismatch,
    #[error("Token account mint does not match the pool")]
    MintMismatch,
    #[error("Insufficient token balance to stake")]
    InsufficientFunds,
    #[error("Unstake amount exceeds staked balance")]
    InsufficientStakedBalance,
    #[error("Amount must be greater than zero")]
    ZeroAmount,
    #[error("Arithmetic overflow")]
    Overflow,
    #[error("Account not writable")]
    AccountNotWritable,
}

impl From<StakePoolError> for ProgramError {
    fn from(e: StakePoolError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct PoolState {
    pub is_initialized: bool,   // 1
    pub initializer: Pubkey,    // 32
    pub mint: Pubkey,           // 32
    pub vault: Pubkey,          // 32
    pub total_staked: u64,      // 8
    pub bump: u8,               // 1
}

impl PoolState {
    pub const SIZE: usize = 1 + 32 + 32 + 32 + 8 + 1; // 106
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct UserStakeRecord {
    pub is_initialized: bool,   // 1
    pub owner: Pubkey,          // 32
    /// Deposit source and withdrawal destination, fixed at creation.
    pub token_account: Pubkey,  // 32
    pub staked_amount: u64,     // 8
    pub bump: u8,               // 1
}

impl UserStakeRecord {
    pub const SIZE: usize = 1 + 32 + 32 + 8 + 1; // 74
}

// ---------------------------------------------------------------------------
// Instruction data structs
// ---------------------------------------------------------------------------

#[derive(BorshSerialize, BorshDeserialize)]
pub struct InitializeArgs {
    pub vault_bump: u8,
    pub pool_bump: u8,
}

#[derive(BorshSerialize, BorshDeserialize)]
pub struct CreateUserAccountArgs {
    pub bump: u8,
}

#[derive(BorshSerialize, BorshDeserialize)]
pub struct AmountArgs {
    pub amount: u64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn assert_signer(info: &AccountInfo) -> ProgramResult {
    if !info.is_signer {
        return Err(StakePoolError::Unauthenticated.into());
    }
    Ok(())
}

fn assert_writable(info: &AccountInfo) -> ProgramResult {
    if !info.is_writable {
        return Err(StakePoolError::AccountNotWritable.into());
    }
    Ok(())
}

fn assert_owned_by(info: &AccountInfo, owner: &Pubkey) -> ProgramResult {
    if info.owner != owner {
        return Err(StakePoolError::OwnershipMismatch.into());
    }
    Ok(())
}

fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    space: usize,
    owner: &Pubkey,
    system_program: &AccountInfo<'a>,
    pda: &AccountInfo<'a>,
    seeds: &[&[u8]],
) -> ProgramResult {
    let rent = Rent::get()?;
    let lamports = rent.minimum_balance(space);

    invoke_signed(
        &system_instruction::create_account(payer.key, pda.key, lamports, space as u64, owner),
        &[payer.clone(), pda.clone(), system_program.clone()],
        &[seeds],
    )
}

/// Unpack an SPL token account and check that it holds the expected mint.
fn unpack_token_account(
    info: &AccountInfo,
    mint: &Pubkey,
) -> Result<spl_token::state::Account, ProgramError> {
    assert_owned_by(info, &spl_token::id())?;
    let token = spl_token::state::Account::unpack(&info.try_borrow_data()?)?;
    if token.mint != *mint {
        return Err(StakePoolError::MintMismatch.into());
    }
    Ok(token)
}

/// Transfer SPL tokens between token accounts.
fn transfer_spl_tokens<'a>(
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    token_program: &AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let ix = spl_token::instruction::transfer(
        token_program.key,
        source.key,
        destination.key,
        authority.key,
        &[],
        amount,
    )?;

    if signer_seeds.is_empty() {
        invoke(
            &ix,
            &[
                source.clone(),
                destination.clone(),
                authority.clone(),
                token_program.clone(),
            ],
        )
    } else {
        invoke_signed(
            &ix,
            &[
                source.clone(),
                destination.clone(),
                authority.clone(),
                token_program.clone(),
            ],
            &[signer_seeds],
        )
    }
}

// ---------------------------------------------------------------------------
// Instruction 0: Initialize
// ---------------------------------------------------------------------------
// Accounts:
//   0. [signer, writable] initializer (payer)
//   1. []                 mint
//   2. [writable]         pool_state PDA
//   3. [writable]         vault PDA (token account, created here)
//   4. []                 vault_authority PDA
//   5. []                 token_program
//   6. []                 system_program
//   7. []                 rent sysvar

fn process_initialize(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let args = InitializeArgs::try_from_slice(data)
        .map_err(|_| ProgramError::InvalidInstructionData)?;

    let account_iter = &mut accounts.iter();
    let initializer = next_account_info(account_iter)?;
    let mint_info = next_account_info(account_iter)?;
    let pool_info = next_account_info(account_iter)?;
    let vault_info = next_account_info(account_iter)?;
    let vault_authority_info = next_account_info(account_iter)?;
    let token_program = next_account_info(account_iter)?;
    let system_prog = next_account_info(account_iter)?;
    let rent_sysvar = next_account_info(account_iter)?;

    assert_signer(initializer)?;
    assert_writable(pool_info)?;
    assert_writable(vault_info)?;

    if *token_program.key != spl_token::id() {
        return Err(ProgramError::IncorrectProgramId);
    }
    if *system_prog.key != system_program::id() {
        return Err(ProgramError::IncorrectProgramId);
    }
    assert_owned_by(mint_info, &spl_token::id())?;

    // Caller-supplied bumps must match the canonical derivations.
    let (pool_pda, pool_bump) = Pubkey::find_program_address(&[POOL_STATE_SEED], program_id);
    if pool_info.key != &pool_pda || args.pool_bump != pool_bump {
        return Err(StakePoolError::DerivationMismatch.into());
    }

    if !pool_info.data_is_empty() {
        return Err(StakePoolError::AlreadyInitialized.into());
    }

    let (vault_pda, vault_bump) = Pubkey::find_program_address(&[VAULT_SEED], program_id);
    if vault_info.key != &vault_pda || args.vault_bump != vault_bump {
        return Err(StakePoolError::DerivationMismatch.into());
    }

    let (vault_authority_pda, _) =
        Pubkey::find_program_address(&[VAULT_AUTHORITY_SEED], program_id);
    if vault_authority_info.key != &vault_authority_pda {
        return Err(StakePoolError::DerivationMismatch.into());
    }

    // Create the vault token account at the vault PDA. Its token-level owner
    // is the vault authority PDA, an address with no private key, so the only
    // way tokens leave is a transfer this program signs with the seeds.
    let vault_rent = Rent::get()?.minimum_balance(spl_token::state::Account::LEN);
    invoke_signed(
        &system_instruction::create_account(
            initializer.key,
            &vault_pda,
            vault_rent,
            spl_token::state::Account::LEN as u64,
            &spl_token::id(),
        ),
        &[initializer.clone(), vault_info.clone(), system_prog.clone()],
        &[&[VAULT_SEED, &[vault_bump]]],
    )?;

    invoke_signed(
        &spl_token::instruction::initialize_account(
            &spl_token::id(),
            &vault_pda,
            mint_info.key,
            &vault_authority_pda,
        )?,
        &[
            vault_info.clone(),
            mint_info.clone(),
            vault_authority_info.clone(),
            rent_sysvar.clone(),
        ],
        &[&[VAULT_SEED, &[vault_bump]]],
    )?;

    create_pda_account(
        initializer,
        PoolState::SIZE,
        program_id,
        system_prog,
        pool_info,
        &[POOL_STATE_SEED, &[pool_bump]],
    )?;

    let pool = PoolState {
        is_initialized: true,
        initializer: *initializer.key,
        mint: *mint_info.key,
        vault: vault_pda,
        total_staked: 0,
        bump: pool_bump,
    };

    pool.serialize(&mut &mut pool_info.try_borrow_mut_data()?[..])?;

    msg!(
        "EVENT:PoolInitialized:{{\"initializer\":\"{}\",\"mint\":\"{}\",\"vault\":\"{}\"}}",
        initializer.key,
        mint_info.key,
        vault_pda,
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// Instruction 1: CreateUserAccount
// ---------------------------------------------------------------------------
// Accounts:
//   0. [signer, writable] user (payer)
//   1. [writable]         user_stake PDA
//   2. []                 user_token_account
//   3. []                 pool_state PDA
//   4. []                 system_program

fn process_create_user_account(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let args = CreateUserAccountArgs::try_from_slice(data)
        .map_err(|_| ProgramError::InvalidInstructionData)?;

    let account_iter = &mut accounts.iter();
    let user = next_account_info(account_iter)?;
    let record_info = next_account_info(account_iter)?;
    let user_token_info = next_account_info(account_iter)?;
    let pool_info = next_account_info(account_iter)?;
    let system_prog = next_account_info(account_iter)?;

    assert_signer(user)?;
    assert_writable(record_info)?;

    if *system_prog.key != system_program::id() {
        return Err(ProgramError::IncorrectProgramId);
    }

    // The record address is a pure function of the signer's identity, so a
    // caller can never set up a record slot under someone else's key.
    let (record_pda, record_bump) =
        Pubkey::find_program_address(&[USER_STAKE_SEED, user.key.as_ref()], program_id);
    if record_info.key != &record_pda || args.bump != record_bump {
        return Err(StakePoolError::DerivationMismatch.into());
    }

    if !record_info.data_is_empty() {
        return Err(StakePoolError::AlreadyExists.into());
    }

    let (pool_pda, _) = Pubkey::find_program_address(&[POOL_STATE_SEED], program_id);
    if pool_info.key != &pool_pda {
        return Err(StakePoolError::DerivationMismatch.into());
    }
    assert_owned_by(pool_info, program_id)?;

    let pool = PoolState::try_from_slice(&pool_info.try_borrow_data()?)?;
    if !pool.is_initialized {
        return Err(StakePoolError::NotInitialized.into());
    }

    // The deposit-source token account is bound once here; it must hold the
    // pool's mint and belong to the registering user.
    let token = unpack_token_account(user_token_info, &pool.mint)?;
    if token.owner != *user.key {
        return Err(StakePoolError::OwnershipMismatch.into());
    }

    create_pda_account(
        user,
        UserStakeRecord::SIZE,
        program_id,
        system_prog,
        record_info,
        &[USER_STAKE_SEED, user.key.as_ref(), &[record_bump]],
    )?;

    let record = UserStakeRecord {
        is_initialized: true,
        owner: *user.key,
        token_account: *user_token_info.key,
        staked_amount: 0,
        bump: record_bump,
    };

    record.serialize(&mut &mut record_info.try_borrow_mut_data()?[..])?;

    msg!(
        "EVENT:UserAccountCreated:{{\"owner\":\"{}\",\"token_account\":\"{}\"}}",
        user.key,
        user_token_info.key,
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// Instruction 2: Stake
// ---------------------------------------------------------------------------
// Accounts:
//   0. [signer]   user
//   1. [writable] user_stake PDA
//   2. [writable] user_token_account
//   3. [writable] vault (token account)
//   4. [writable] pool_state PDA
//   5. []         token_program

fn process_stake(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let args = AmountArgs::try_from_slice(data)
        .map_err(|_| ProgramError::InvalidInstructionData)?;

    if args.amount == 0 {
        return Err(StakePoolError::ZeroAmount.into());
    }

    let account_iter = &mut accounts.iter();
    let user = next_account_info(account_iter)?;
    let record_info = next_account_info(account_iter)?;
    let user_token_info = next_account_info(account_iter)?;
    let vault_info = next_account_info(account_iter)?;
    let pool_info = next_account_info(account_iter)?;
    let token_program = next_account_info(account_iter)?;

    assert_signer(user)?;
    assert_writable(record_info)?;
    assert_writable(user_token_info)?;
    assert_writable(vault_info)?;
    assert_writable(pool_info)?;

    if *token_program.key != spl_token::id() {
        return Err(ProgramError::IncorrectProgramId);
    }

    // The record must be the one derived from the signer's own identity;
    // the stored owner field is re-checked but the derivation is what makes
    // staking into someone else's record impossible.
    let (record_pda, _) =
        Pubkey::find_program_address(&[USER_STAKE_SEED, user.key.as_ref()], program_id);
    if record_info.key != &record_pda {
        return Err(StakePoolError::DerivationMismatch.into());
    }
    assert_owned_by(record_info, program_id)?;

    let mut record = UserStakeRecord::try_from_slice(&record_info.try_borrow_data()?)?;
    if !record.is_initialized {
        return Err(StakePoolError::NotInitialized.into());
    }
    if record.owner != *user.key {
        return Err(StakePoolError::Unauthorized.into());
    }
    if record.token_account != *user_token_info.key {
        return Err(StakePoolError::TokenAccountMismatch.into());
    }

    assert_owned_by(pool_info, program_id)?;
    let mut pool = PoolState::try_from_slice(&pool_info.try_borrow_data()?)?;
    if !pool.is_initialized {
        return Err(StakePoolError::NotInitialized.into());
    }
    if vault_info.key != &pool.vault {
        return Err(StakePoolError::VaultMismatch.into());
    }

    // Explicit balance check so a short deposit fails before any transfer.
    let user_token = unpack_token_account(user_token_info, &pool.mint)?;
    if user_token.amount < args.amount {
        return Err(StakePoolError::InsufficientFunds.into());
    }

    transfer_spl_tokens(
        user_token_info,
        vault_info,
        user,
        token_program,
        args.amount,
        &[],
    )?;

    record.staked_amount = record
        .staked_amount
        .checked_add(args.amount)
        .ok_or(StakePoolError::Overflow)?;

    pool.total_staked = pool
        .total_staked
        .checked_add(args.amount)
        .ok_or(StakePoolError::Overflow)?;

    record.serialize(&mut &mut record_info.try_borrow_mut_data()?[..])?;
    pool.serialize(&mut &mut pool_info.try_borrow_mut_data()?[..])?;

    msg!(
        "EVENT:Staked:{{\"user\":\"{}\",\"amount\":{},\"staked_amount\":{},\"total_staked\":{}}}",
        user.key,
        args.amount,
        record.staked_amount,
        pool.total_staked,
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// Instruction 3: Unstake
// ---------------------------------------------------------------------------
// Accounts:
//   0. [signer]   user
//   1. [writable] user_stake PDA
//   2. [writable] user_token_account
//   3. [writable] vault (token account)
//   4. []         vault_authority PDA
//   5. [writable] pool_state PDA
//   6. []         token_program

fn process_unstake(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let args = AmountArgs::try_from_slice(data)
        .map_err(|_| ProgramError::InvalidInstructionData)?;

    if args.amount == 0 {
        return Err(StakePoolError::ZeroAmount.into());
    }

    let account_iter = &mut accounts.iter();
    let user = next_account_info(account_iter)?;
    let record_info = next_account_info(account_iter)?;
    let user_token_info = next_account_info(account_iter)?;
    let vault_info = next_account_info(account_iter)?;
    let vault_authority_info = next_account_info(account_iter)?;
    let pool_info = next_account_info(account_iter)?;
    let token_program = next_account_info(account_iter)?;

    assert_signer(user)?;
    assert_writable(record_info)?;
    assert_writable(user_token_info)?;
    assert_writable(vault_info)?;
    assert_writable(pool_info)?;

    if *token_program.key != spl_token::id() {
        return Err(ProgramError::IncorrectProgramId);
    }

    let (record_pda, _) =
        Pubkey::find_program_address(&[USER_STAKE_SEED, user.key.as_ref()], program_id);
    if record_info.key != &record_pda {
        return Err(StakePoolError::DerivationMismatch.into());
    }
    assert_owned_by(record_info, program_id)?;

    let mut record = UserStakeRecord::try_from_slice(&record_info.try_borrow_data()?)?;
    if !record.is_initialized {
        return Err(StakePoolError::NotInitialized.into());
    }
    if record.owner != *user.key {
        return Err(StakePoolError::Unauthorized.into());
    }
    if record.token_account != *user_token_info.key {
        return Err(StakePoolError::TokenAccountMismatch.into());
    }

    // The withdrawable amount is bounded by this record alone, never by the
    // aggregate vault balance; this runs before the vault is even looked at.
    if record.staked_amount < args.amount {
        return Err(StakePoolError::InsufficientStakedBalance.into());
    }

    assert_owned_by(pool_info, program_id)?;
    let mut pool = PoolState::try_from_slice(&pool_info.try_borrow_data()?)?;
    if !pool.is_initialized {
        return Err(StakePoolError::NotInitialized.into());
    }
    if vault_info.key != &pool.vault {
        return Err(StakePoolError::VaultMismatch.into());
    }

    let (vault_authority_pda, vault_authority_bump) =
        Pubkey::find_program_address(&[VAULT_AUTHORITY_SEED], program_id);
    if vault_authority_info.key != &vault_authority_pda {
        return Err(StakePoolError::DerivationMismatch.into());
    }

    // The vault's owner has no private key; the outbound transfer is
    // authorized by the derivation seeds instead.
    transfer_spl_tokens(
        vault_info,
        user_token_info,
        vault_authority_info,
        token_program,
        args.amount,
        &[VAULT_AUTHORITY_SEED, &[vault_authority_bump]],
    )?;

    record.staked_amount = record
        .staked_amount
        .checked_sub(args.amount)
        .ok_or(StakePoolError::Overflow)?;

    pool.total_staked = pool
        .total_staked
        .checked_sub(args.amount)
        .ok_or(StakePoolError::Overflow)?;

    record.serialize(&mut &mut record_info.try_borrow_mut_data()?[..])?;
    pool.serialize(&mut &mut pool_info.try_borrow_mut_data()?[..])?;

    msg!(
        "EVENT:Unstaked:{{\"user\":\"{}\",\"amount\":{},\"staked_amount\":{},\"total_staked\":{}}}",
        user.key,
        args.amount,
        record.staked_amount,
        pool.total_staked,
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
