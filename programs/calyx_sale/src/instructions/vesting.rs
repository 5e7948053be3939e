/**
 * Vesting Instructions
 *
 * Both releases are permissionless: once the time conditions hold, any
 * caller may trigger them. The amounts and destinations were fixed at
 * finalization.
 */

use anchor_lang::prelude::*;

use crate::state::{TokenHolding, VestingVault};
use crate::{
    AdvisorTokensReleased, TeamAndReserveReleased, HOLDING_SEED, VESTING_VAULT_SEED,
};

// =============================================================================
// UNLOCK TEAM AND RESERVE
// =============================================================================

#[derive(Accounts)]
pub struct UnlockTeamAndReserve<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VESTING_VAULT_SEED],
        bump = vault.bump,
    )]
    pub vault: Account<'info, VestingVault>,

    #[account(
        mut,
        seeds = [HOLDING_SEED, vault.team_wallet.as_ref()],
        bump = team_holding.bump,
    )]
    pub team_holding: Account<'info, TokenHolding>,

    #[account(
        mut,
        seeds = [HOLDING_SEED, vault.reserve_wallet.as_ref()],
        bump = reserve_holding.bump,
    )]
    pub reserve_holding: Account<'info, TokenHolding>,
}

pub fn unlock_team_and_reserve_handler(ctx: Context<UnlockTeamAndReserve>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let (team_amount, reserve_amount) = ctx.accounts.vault.release_team_and_reserve(
        now,
        &mut ctx.accounts.team_holding,
        &mut ctx.accounts.reserve_holding,
    )?;

    msg!(
        "Team and reserve grants released: {} + {}",
        team_amount,
        reserve_amount
    );

    emit!(TeamAndReserveReleased {
        team_wallet: ctx.accounts.vault.team_wallet,
        reserve_wallet: ctx.accounts.vault.reserve_wallet,
        team_amount,
        reserve_amount,
    });

    Ok(())
}

// =============================================================================
// UNLOCK ADVISOR TOKENS
// =============================================================================

#[derive(Accounts)]
pub struct UnlockAdvisorTokens<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VESTING_VAULT_SEED],
        bump = vault.bump,
    )]
    pub vault: Account<'info, VestingVault>,

    #[account(
        mut,
        seeds = [HOLDING_SEED, vault.key().as_ref()],
        bump = advisors_escrow.bump,
    )]
    pub advisors_escrow: Account<'info, TokenHolding>,

    #[account(
        mut,
        seeds = [HOLDING_SEED, vault.advisors_wallet.as_ref()],
        bump = advisors_holding.bump,
    )]
    pub advisors_holding: Account<'info, TokenHolding>,
}

pub fn unlock_advisor_tokens_handler(ctx: Context<UnlockAdvisorTokens>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let amount = ctx.accounts.vault.release_advisor_tokens(
        now,
        &mut ctx.accounts.advisors_escrow,
        &mut ctx.accounts.advisors_holding,
    )?;

    msg!(
        "Advisor tranche released: {} ({} of {} so far)",
        amount,
        ctx.accounts.vault.advisors_released,
        ctx.accounts.vault.advisors_total
    );

    emit!(AdvisorTokensReleased {
        amount,
        total_released: ctx.accounts.vault.advisors_released,
    });

    Ok(())
}
