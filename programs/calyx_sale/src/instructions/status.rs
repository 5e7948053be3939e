/**
 * Status Query
 */

use anchor_lang::prelude::*;

use crate::state::{SaleConfig, TokenLedger};
use crate::{SALE_CONFIG_SEED, TOKEN_LEDGER_SEED};

#[derive(Accounts)]
pub struct SaleStatus<'info> {
    #[account(
        seeds = [SALE_CONFIG_SEED],
        bump = sale_config.bump,
    )]
    pub sale_config: Account<'info, SaleConfig>,

    #[account(
        seeds = [TOKEN_LEDGER_SEED],
        bump = ledger.bump,
    )]
    pub ledger: Account<'info, TokenLedger>,
}

pub fn sale_status_handler(ctx: Context<SaleStatus>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let config = &ctx.accounts.sale_config;
    let ledger = &ctx.accounts.ledger;

    msg!("Phase: {:?}", config.phase_at(now));
    msg!(
        "Raised: {} / {} lamports at rate {}",
        config.raised_total,
        config.hard_cap,
        config.rate
    );
    msg!("Paused: {}", config.paused);
    msg!(
        "Supply: {} / {} (minting open: {}, frozen: {})",
        ledger.total_supply,
        ledger.cap,
        ledger.minting_open,
        ledger.frozen
    );

    Ok(())
}
