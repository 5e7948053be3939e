/**
 * Sale Instructions
 *
 * Contribution entry point plus the administrative surface: cap changes,
 * whitelist uploads, pause toggle, finalization.
 */

use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};

use crate::state::{SaleConfig, TokenHolding, TokenLedger, VestingVault, WhitelistEntry};
use crate::{
    ContributionReceived, HardCapChanged, PresaleWalletAdded, SaleError, SaleFinalized,
    SaleResumed, SaleSuspended, ADVISORS_TOKENS_SUPPLY, HOLDING_SEED,
    INVESTMENT_FUND_TOKENS_SUPPLY, MISCELLANEOUS_TOKENS_SUPPLY, RESERVE_TOKENS_SUPPLY,
    SALE_CONFIG_SEED, TEAM_TOKENS_SUPPLY, TOKEN_LEDGER_SEED, VESTING_VAULT_SEED, WHITELIST_SEED,
};

// =============================================================================
// CONTRIBUTE
// =============================================================================

#[derive(Accounts)]
pub struct Contribute<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_CONFIG_SEED],
        bump = sale_config.bump,
    )]
    pub sale_config: Account<'info, SaleConfig>,

    #[account(
        mut,
        seeds = [TOKEN_LEDGER_SEED],
        bump = ledger.bump,
    )]
    pub ledger: Account<'info, TokenLedger>,

    #[account(
        init_if_needed,
        payer = buyer,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, buyer.key().as_ref()],
        bump,
    )]
    pub buyer_holding: Account<'info, TokenHolding>,

    /// Required during the restricted sale; ignored once the sale is open
    #[account(
        mut,
        seeds = [WHITELIST_SEED, buyer.key().as_ref()],
        bump,
    )]
    pub whitelist_entry: Option<Account<'info, WhitelistEntry>>,

    /// CHECK: validated against the configured treasury wallet
    #[account(
        mut,
        constraint = treasury.key() == sale_config.treasury @ SaleError::InvalidWallet,
    )]
    pub treasury: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn contribute_handler(ctx: Context<Contribute>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let entry = ctx
        .accounts
        .whitelist_entry
        .as_mut()
        .map(|entry| &mut **entry);
    let tokens = ctx
        .accounts
        .sale_config
        .accept_contribution(now, amount, entry)?;

    let holding = &mut ctx.accounts.buyer_holding;
    holding.owner = ctx.accounts.buyer.key();
    holding.bump = ctx.bumps.buyer_holding;
    ctx.accounts.ledger.mint(holding, tokens)?;

    // lamports move only after every state effect has landed
    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.buyer.to_account_info(),
                to: ctx.accounts.treasury.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(ContributionReceived {
        buyer: ctx.accounts.buyer.key(),
        amount,
        tokens_minted: tokens,
        raised_total: ctx.accounts.sale_config.raised_total,
    });

    Ok(())
}

// =============================================================================
// SET HARD CAP
// =============================================================================

#[derive(Accounts)]
pub struct SetHardCap<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_CONFIG_SEED],
        bump = sale_config.bump,
    )]
    pub sale_config: Account<'info, SaleConfig>,
}

pub fn set_hard_cap_handler(ctx: Context<SetHardCap>, new_hard_cap: u64) -> Result<()> {
    let config = &mut ctx.accounts.sale_config;
    require!(
        config.is_admin(&ctx.accounts.admin.key()),
        SaleError::Unauthorized
    );

    let now = Clock::get()?.unix_timestamp;
    let old_hard_cap = config.hard_cap;
    let rate = config.set_hard_cap(now, new_hard_cap)?;

    emit!(HardCapChanged {
        old_hard_cap,
        new_hard_cap,
        rate,
    });

    Ok(())
}

// =============================================================================
// ADD PRESALE WALLET
// =============================================================================

#[derive(Accounts)]
#[instruction(buyer: Pubkey)]
pub struct AddPresaleWallet<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [SALE_CONFIG_SEED],
        bump = sale_config.bump,
    )]
    pub sale_config: Account<'info, SaleConfig>,

    #[account(
        init_if_needed,
        payer = admin,
        space = WhitelistEntry::LEN,
        seeds = [WHITELIST_SEED, buyer.as_ref()],
        bump,
    )]
    pub whitelist_entry: Account<'info, WhitelistEntry>,

    pub system_program: Program<'info, System>,
}

pub fn add_presale_wallet_handler(
    ctx: Context<AddPresaleWallet>,
    buyer: Pubkey,
    personal_cap: u64,
) -> Result<()> {
    require!(
        ctx.accounts.sale_config.is_admin(&ctx.accounts.admin.key()),
        SaleError::Unauthorized
    );
    require!(personal_cap > 0, SaleError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    ctx.accounts.sale_config.whitelist_open(now)?;

    // re-adding an entry updates its cap; contributions so far are kept
    let entry = &mut ctx.accounts.whitelist_entry;
    entry.buyer = buyer;
    entry.personal_cap = personal_cap;
    entry.bump = ctx.bumps.whitelist_entry;

    emit!(PresaleWalletAdded {
        buyer,
        personal_cap,
    });

    Ok(())
}

// =============================================================================
// PAUSE / UNPAUSE
// =============================================================================

#[derive(Accounts)]
pub struct PauseSale<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_CONFIG_SEED],
        bump = sale_config.bump,
    )]
    pub sale_config: Account<'info, SaleConfig>,
}

pub fn pause_handler(ctx: Context<PauseSale>) -> Result<()> {
    let config = &mut ctx.accounts.sale_config;
    require!(
        config.is_admin(&ctx.accounts.admin.key()),
        SaleError::Unauthorized
    );

    let now = Clock::get()?.unix_timestamp;
    config.pause(now)?;

    emit!(SaleSuspended {
        admin: ctx.accounts.admin.key(),
    });

    Ok(())
}

pub fn unpause_handler(ctx: Context<PauseSale>) -> Result<()> {
    let config = &mut ctx.accounts.sale_config;
    require!(
        config.is_admin(&ctx.accounts.admin.key()),
        SaleError::Unauthorized
    );

    let now = Clock::get()?.unix_timestamp;
    config.unpause(now)?;

    emit!(SaleResumed {
        admin: ctx.accounts.admin.key(),
    });

    Ok(())
}

// =============================================================================
// FINALIZE
// =============================================================================

#[derive(Accounts)]
pub struct Finalize<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_CONFIG_SEED],
        bump = sale_config.bump,
    )]
    pub sale_config: Account<'info, SaleConfig>,

    #[account(
        mut,
        seeds = [TOKEN_LEDGER_SEED],
        bump = ledger.bump,
    )]
    pub ledger: Account<'info, TokenLedger>,

    #[account(
        init,
        payer = admin,
        space = VestingVault::LEN,
        seeds = [VESTING_VAULT_SEED],
        bump,
    )]
    pub vault: Account<'info, VestingVault>,

    #[account(
        init_if_needed,
        payer = admin,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, sale_config.team_wallet.as_ref()],
        bump,
    )]
    pub team_holding: Account<'info, TokenHolding>,

    #[account(
        init_if_needed,
        payer = admin,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, sale_config.reserve_wallet.as_ref()],
        bump,
    )]
    pub reserve_holding: Account<'info, TokenHolding>,

    #[account(
        init_if_needed,
        payer = admin,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, sale_config.advisors_wallet.as_ref()],
        bump,
    )]
    pub advisors_holding: Account<'info, TokenHolding>,

    #[account(
        init_if_needed,
        payer = admin,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, sale_config.investment_fund_wallet.as_ref()],
        bump,
    )]
    pub investment_fund_holding: Account<'info, TokenHolding>,

    #[account(
        init_if_needed,
        payer = admin,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, sale_config.miscellaneous_wallet.as_ref()],
        bump,
    )]
    pub miscellaneous_holding: Account<'info, TokenHolding>,

    /// Escrow for the advisors grant, owned by the vault PDA
    #[account(
        init,
        payer = admin,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, vault.key().as_ref()],
        bump,
    )]
    pub advisors_escrow: Account<'info, TokenHolding>,

    pub system_program: Program<'info, System>,
}

pub fn finalize_handler(ctx: Context<Finalize>) -> Result<()> {
    require!(
        ctx.accounts.sale_config.is_admin(&ctx.accounts.admin.key()),
        SaleError::Unauthorized
    );

    let now = Clock::get()?.unix_timestamp;
    ctx.accounts.sale_config.finalize(now)?;

    // mint the insider allocations while minting is still open
    let team = &mut ctx.accounts.team_holding;
    team.owner = ctx.accounts.sale_config.team_wallet;
    team.bump = ctx.bumps.team_holding;
    ctx.accounts.ledger.mint(team, TEAM_TOKENS_SUPPLY)?;
    team.vesting_locked = true;

    let reserve = &mut ctx.accounts.reserve_holding;
    reserve.owner = ctx.accounts.sale_config.reserve_wallet;
    reserve.bump = ctx.bumps.reserve_holding;
    ctx.accounts.ledger.mint(reserve, RESERVE_TOKENS_SUPPLY)?;
    reserve.vesting_locked = true;

    let escrow = &mut ctx.accounts.advisors_escrow;
    escrow.owner = ctx.accounts.vault.key();
    escrow.bump = ctx.bumps.advisors_escrow;
    ctx.accounts.ledger.mint(escrow, ADVISORS_TOKENS_SUPPLY)?;
    escrow.vesting_locked = true;

    // advisors receive released tranches here; nothing is minted yet
    let advisors = &mut ctx.accounts.advisors_holding;
    advisors.owner = ctx.accounts.sale_config.advisors_wallet;
    advisors.bump = ctx.bumps.advisors_holding;

    // investment fund and miscellaneous allocations are liquid immediately
    // (still subject to the global freeze until the grace period passes)
    let investment = &mut ctx.accounts.investment_fund_holding;
    investment.owner = ctx.accounts.sale_config.investment_fund_wallet;
    investment.bump = ctx.bumps.investment_fund_holding;
    ctx.accounts
        .ledger
        .mint(investment, INVESTMENT_FUND_TOKENS_SUPPLY)?;

    let miscellaneous = &mut ctx.accounts.miscellaneous_holding;
    miscellaneous.owner = ctx.accounts.sale_config.miscellaneous_wallet;
    miscellaneous.bump = ctx.bumps.miscellaneous_holding;
    ctx.accounts
        .ledger
        .mint(miscellaneous, MISCELLANEOUS_TOKENS_SUPPLY)?;

    // seal the supply and relinquish administration
    ctx.accounts.ledger.finalize(now)?;

    // the vesting clock starts now
    let config = &ctx.accounts.sale_config;
    let vault = &mut ctx.accounts.vault;
    vault.team_wallet = config.team_wallet;
    vault.reserve_wallet = config.reserve_wallet;
    vault.advisors_wallet = config.advisors_wallet;
    vault.team_amount = TEAM_TOKENS_SUPPLY;
    vault.reserve_amount = RESERVE_TOKENS_SUPPLY;
    vault.advisors_total = ADVISORS_TOKENS_SUPPLY;
    vault.advisors_released = 0;
    vault.reference_time = now;
    vault.team_reserve_released = false;
    vault.advisor_cliff_count = config.advisor_cliff_count;
    vault.advisor_cliffs = config.advisor_cliffs;
    vault.bump = ctx.bumps.vault;

    msg!(
        "Sale finalized: raised {} lamports, supply sealed at {}",
        config.raised_total,
        ctx.accounts.ledger.total_supply
    );

    emit!(SaleFinalized {
        raised_total: config.raised_total,
        total_supply: ctx.accounts.ledger.total_supply,
        finalized_at: now,
    });

    Ok(())
}
