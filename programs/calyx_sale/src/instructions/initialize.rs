/**
 * Initialize Instruction
 *
 * Creates the sale controller and the token ledger as one pair. The ledger
 * starts frozen with minting open; the deployer is the administrator of
 * both until finalization clears it.
 */

use anchor_lang::prelude::*;

use crate::state::{validate_cliff_schedule, CliffPoint, SaleConfig, TokenLedger};
use crate::{
    SaleError, SaleInitialized, MAX_ADVISOR_CLIFFS, MAX_SUPPLY, SALE_CONFIG_SEED,
    TOKEN_LEDGER_SEED,
};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = SaleConfig::LEN,
        seeds = [SALE_CONFIG_SEED],
        bump,
    )]
    pub sale_config: Account<'info, SaleConfig>,

    #[account(
        init,
        payer = admin,
        space = TokenLedger::LEN,
        seeds = [TOKEN_LEDGER_SEED],
        bump,
    )]
    pub ledger: Account<'info, TokenLedger>,

    pub system_program: Program<'info, System>,
}

#[allow(clippy::too_many_arguments)]
pub fn handler(
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
    require!(presale_start < sale_start, SaleError::InvalidSaleSchedule);
    let rate = SaleConfig::compute_rate(hard_cap)?;
    validate_cliff_schedule(&advisor_cliffs)?;

    // every allocation wallet gets its own holding at finalization
    let wallets = [
        team_wallet,
        reserve_wallet,
        advisors_wallet,
        investment_fund_wallet,
        miscellaneous_wallet,
    ];
    for (i, wallet) in wallets.iter().enumerate() {
        require!(
            !wallets[i + 1..].contains(wallet),
            SaleError::InvalidWallet
        );
    }

    let config = &mut ctx.accounts.sale_config;
    config.admin = Some(ctx.accounts.admin.key());
    config.presale_start = presale_start;
    config.sale_start = sale_start;
    config.hard_cap = hard_cap;
    config.rate = rate;
    config.raised_total = 0;
    config.paused = false;
    config.finalized = false;
    config.treasury = treasury;
    config.team_wallet = team_wallet;
    config.reserve_wallet = reserve_wallet;
    config.advisors_wallet = advisors_wallet;
    config.investment_fund_wallet = investment_fund_wallet;
    config.miscellaneous_wallet = miscellaneous_wallet;
    config.advisor_cliff_count = advisor_cliffs.len() as u8;
    config.advisor_cliffs = [CliffPoint::default(); MAX_ADVISOR_CLIFFS];
    config.advisor_cliffs[..advisor_cliffs.len()].copy_from_slice(&advisor_cliffs);
    config.bump = ctx.bumps.sale_config;

    let ledger = &mut ctx.accounts.ledger;
    ledger.admin = Some(ctx.accounts.admin.key());
    ledger.total_supply = 0;
    ledger.cap = MAX_SUPPLY;
    ledger.minting_open = true;
    ledger.frozen = true;
    ledger.finalized = false;
    ledger.finalized_at = 0;
    ledger.bump = ctx.bumps.ledger;

    emit!(SaleInitialized {
        admin: ctx.accounts.admin.key(),
        presale_start,
        sale_start,
        hard_cap,
        rate,
    });

    Ok(())
}
