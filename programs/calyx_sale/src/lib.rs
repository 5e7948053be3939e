/**
 * Calyx Token Sale
 *
 * Capped fundraising token with a whitelist-restricted presale, a global
 * transfer freeze until a scheduled unlock, and time-locked insider
 * allocations (one-shot team/reserve grant, multi-cliff advisors grant).
 */

use anchor_lang::prelude::*;

pub mod state;
pub mod instructions;

use state::*;
use instructions::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

// =============================================================================
// SEEDS
// =============================================================================

pub const SALE_CONFIG_SEED: &[u8] = b"sale_config";
pub const TOKEN_LEDGER_SEED: &[u8] = b"token_ledger";
pub const HOLDING_SEED: &[u8] = b"holding";
pub const WHITELIST_SEED: &[u8] = b"whitelist";
pub const ALLOWANCE_SEED: &[u8] = b"allowance";
pub const VESTING_VAULT_SEED: &[u8] = b"vesting_vault";

// =============================================================================
// CONSTANTS
// =============================================================================

/// Base units per whole token (9 decimals)
pub const TOKEN_UNIT: u64 = 1_000_000_000;

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Ceiling on total token issuance
pub const MAX_SUPPLY: u64 = 50_000_000 * TOKEN_UNIT;

/// Pool sold through the public sale; drives the exchange rate
pub const SALE_TOKENS_SUPPLY: u64 = 11_125_000 * TOKEN_UNIT;

/// Team grant, locked for a year after finalization
pub const TEAM_TOKENS_SUPPLY: u64 = 10_500_000 * TOKEN_UNIT;

/// Reserve grant, locked alongside the team grant
pub const RESERVE_TOKENS_SUPPLY: u64 = 10_000_000 * TOKEN_UNIT;

/// Investment fund allocation, liquid at finalization
pub const INVESTMENT_FUND_TOKENS_SUPPLY: u64 = 10_000_000 * TOKEN_UNIT;

/// Advisors grant, released over the configured cliff schedule
pub const ADVISORS_TOKENS_SUPPLY: u64 = 5_500_000 * TOKEN_UNIT;

/// Miscellaneous allocation, liquid at finalization
pub const MISCELLANEOUS_TOKENS_SUPPLY: u64 = 2_875_000 * TOKEN_UNIT;

/// Transfers stay frozen this long after finalization
pub const UNFREEZE_GRACE_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Team and reserve grants unlock this long after finalization
pub const TEAM_RESERVE_LOCK_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Below-cap finalization becomes possible this long after the open sale starts
pub const SALE_WINDOW_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Maximum entries in an advisor cliff schedule
pub const MAX_ADVISOR_CLIFFS: usize = 8;

// =============================================================================
// PROGRAM
// =============================================================================

#[program]
pub mod calyx_sale {
    use super::*;

    /// Create the sale/ledger pair
    /// Administrator is the deployer until finalization clears it
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        ctx: Context<Initialize>,
        presale_start: i64,
        sale_start: i64,
        hard_cap: u64,
        advisor_cliffs: Vec<CliffPoint>,
        treasury: Pubkey,
        team_wallet: Pubkey,
        reserve_wallet: Pubkey,
        advisors_wallet: Pubkey,
        investment_fund_wallet: Pubkey,
        miscellaneous_wallet: Pubkey,
    ) -> Result<()> {
        instructions::initialize::handler(
            ctx,
            presale_start,
            sale_start,
            hard_cap,
            advisor_cliffs,
            treasury,
            team_wallet,
            reserve_wallet,
            advisors_wallet,
            investment_fund_wallet,
            miscellaneous_wallet,
        )
    }

    // =========================================================================
    // SALE
    // =========================================================================

    /// Buy tokens at the current rate; lamports are forwarded to the treasury
    pub fn contribute(ctx: Context<Contribute>, amount: u64) -> Result<()> {
        instructions::sale::contribute_handler(ctx, amount)
    }

    /// Change the hard cap and re-derive the rate (before the presale only)
    pub fn set_hard_cap(ctx: Context<SetHardCap>, new_hard_cap: u64) -> Result<()> {
        instructions::sale::set_hard_cap_handler(ctx, new_hard_cap)
    }

    /// Whitelist a buyer for the restricted phase with a personal cap
    pub fn add_presale_wallet(
        ctx: Context<AddPresaleWallet>,
        buyer: Pubkey,
        personal_cap: u64,
    ) -> Result<()> {
        instructions::sale::add_presale_wallet_handler(ctx, buyer, personal_cap)
    }

    /// Suspend contributions during the open sale
    pub fn pause(ctx: Context<PauseSale>) -> Result<()> {
        instructions::sale::pause_handler(ctx)
    }

    /// Resume contributions
    pub fn unpause(ctx: Context<PauseSale>) -> Result<()> {
        instructions::sale::unpause_handler(ctx)
    }

    /// End the sale: mint insider allocations, seal the supply, start the
    /// vesting clock, relinquish administration
    pub fn finalize(ctx: Context<Finalize>) -> Result<()> {
        instructions::sale::finalize_handler(ctx)
    }

    // =========================================================================
    // LEDGER
    // =========================================================================

    /// Administrator mint (only while minting is open)
    pub fn mint_tokens(ctx: Context<MintTokens>, to: Pubkey, amount: u64) -> Result<()> {
        instructions::ledger::mint_tokens_handler(ctx, to, amount)
    }

    /// Move tokens between holdings once the global freeze has lifted
    pub fn transfer(ctx: Context<TransferTokens>, to: Pubkey, amount: u64) -> Result<()> {
        instructions::ledger::transfer_handler(ctx, to, amount)
    }

    /// Grant a spender an allowance over the caller's holding
    pub fn approve(ctx: Context<Approve>, spender: Pubkey, amount: u64) -> Result<()> {
        instructions::ledger::approve_handler(ctx, spender, amount)
    }

    /// Spend a previously granted allowance
    pub fn transfer_from(
        ctx: Context<TransferFrom>,
        from: Pubkey,
        to: Pubkey,
        amount: u64,
    ) -> Result<()> {
        instructions::ledger::transfer_from_handler(ctx, from, to, amount)
    }

    /// Lift the global freeze; anyone may call once the grace period passed
    pub fn unfreeze(ctx: Context<Unfreeze>) -> Result<()> {
        instructions::ledger::unfreeze_handler(ctx)
    }

    // =========================================================================
    // VESTING
    // =========================================================================

    /// Release the full team and reserve grants; anyone may call after the
    /// lock year, exactly once
    pub fn unlock_team_and_reserve(ctx: Context<UnlockTeamAndReserve>) -> Result<()> {
        instructions::vesting::unlock_team_and_reserve_handler(ctx)
    }

    /// Release whatever fraction of the advisors grant has vested
    pub fn unlock_advisor_tokens(ctx: Context<UnlockAdvisorTokens>) -> Result<()> {
        instructions::vesting::unlock_advisor_tokens_handler(ctx)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Log the current phase, raised total, rate and supply
    pub fn sale_status(ctx: Context<SaleStatus>) -> Result<()> {
        instructions::status::sale_status_handler(ctx)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[error_code]
pub enum SaleError {
    #[msg("Caller is not the administrator")]
    Unauthorized,

    #[msg("Sale has not opened yet")]
    NotYetOpen,

    #[msg("Sale is paused")]
    Paused,

    #[msg("Buyer is not on the presale whitelist")]
    NotWhitelisted,

    #[msg("Contribution exceeds the buyer's personal limit")]
    OverPersonalLimit,

    #[msg("Contribution exceeds the hard cap")]
    HardCapExceeded,

    #[msg("Mint exceeds the supply cap")]
    CapExceeded,

    #[msg("Hard cap is locked once the presale opens")]
    CapLocked,

    #[msg("Whitelist entries can only be added before the open sale")]
    WhitelistClosed,

    #[msg("Pausing is only available during the open sale")]
    PauseUnavailable,

    #[msg("Sale is already paused")]
    AlreadyPaused,

    #[msg("Sale is not paused")]
    NotPaused,

    #[msg("Hard cap not reached and the sale window is still open")]
    CapNotReached,

    #[msg("Sale is already finalized")]
    AlreadyFinalized,

    #[msg("Sale is not finalized")]
    NotFinalized,

    #[msg("Minting is closed")]
    MintingClosed,

    #[msg("Token transfers are frozen")]
    Frozen,

    #[msg("Tokens are already unfrozen")]
    AlreadyUnfrozen,

    #[msg("Balance is locked by an allocation schedule")]
    LockedAllocation,

    #[msg("Insufficient balance")]
    InsufficientBalance,

    #[msg("Insufficient allowance")]
    InsufficientAllowance,

    #[msg("Time condition not yet met")]
    TooEarly,

    #[msg("Allocation already released")]
    AlreadyReleased,

    #[msg("Nothing to release")]
    NothingToRelease,

    #[msg("Presale must start before the open sale")]
    InvalidSaleSchedule,

    #[msg("Hard cap must be positive and within the sale pool")]
    InvalidHardCap,

    #[msg("Cliff schedule must rise monotonically to 100%")]
    InvalidCliffSchedule,

    #[msg("Account does not match the configured wallet")]
    InvalidWallet,

    #[msg("Invalid amount")]
    InvalidAmount,

    #[msg("Math overflow")]
    MathOverflow,
}

// =============================================================================
// EVENTS
// =============================================================================

#[event]
pub struct SaleInitialized {
    pub admin: Pubkey,
    pub presale_start: i64,
    pub sale_start: i64,
    pub hard_cap: u64,
    pub rate: u64,
}

#[event]
pub struct HardCapChanged {
    pub old_hard_cap: u64,
    pub new_hard_cap: u64,
    pub rate: u64,
}

#[event]
pub struct PresaleWalletAdded {
    pub buyer: Pubkey,
    pub personal_cap: u64,
}

#[event]
pub struct ContributionReceived {
    pub buyer: Pubkey,
    pub amount: u64,
    pub tokens_minted: u64,
    pub raised_total: u64,
}

#[event]
pub struct SaleSuspended {
    pub admin: Pubkey,
}

#[event]
pub struct SaleResumed {
    pub admin: Pubkey,
}

#[event]
pub struct SaleFinalized {
    pub raised_total: u64,
    pub total_supply: u64,
    pub finalized_at: i64,
}

#[event]
pub struct TokensMinted {
    pub to: Pubkey,
    pub amount: u64,
    pub total_supply: u64,
}

#[event]
pub struct TokensTransferred {
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

#[event]
pub struct ApprovalSet {
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub amount: u64,
}

#[event]
pub struct TokensUnfrozen {
    pub unfrozen_at: i64,
}

#[event]
pub struct TeamAndReserveReleased {
    pub team_wallet: Pubkey,
    pub reserve_wallet: Pubkey,
    pub team_amount: u64,
    pub reserve_amount: u64,
}

#[event]
pub struct AdvisorTokensReleased {
    pub amount: u64,
    pub total_released: u64,
}
