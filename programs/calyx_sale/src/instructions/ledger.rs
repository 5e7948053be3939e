/**
 * Ledger Instructions
 *
 * Administrator minting, holder transfers and allowances, and the one-shot
 * global unfreeze.
 */

use anchor_lang::prelude::*;

use crate::state::{Allowance, TokenHolding, TokenLedger};
use crate::{
    ApprovalSet, SaleError, TokensMinted, TokensTransferred, TokensUnfrozen, ALLOWANCE_SEED,
    HOLDING_SEED, TOKEN_LEDGER_SEED,
};

// =============================================================================
// MINT
// =============================================================================

#[derive(Accounts)]
#[instruction(to: Pubkey)]
pub struct MintTokens<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [TOKEN_LEDGER_SEED],
        bump = ledger.bump,
    )]
    pub ledger: Account<'info, TokenLedger>,

    #[account(
        init_if_needed,
        payer = admin,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, to.as_ref()],
        bump,
    )]
    pub to_holding: Account<'info, TokenHolding>,

    pub system_program: Program<'info, System>,
}

pub fn mint_tokens_handler(ctx: Context<MintTokens>, to: Pubkey, amount: u64) -> Result<()> {
    require!(
        ctx.accounts.ledger.is_admin(&ctx.accounts.admin.key()),
        SaleError::Unauthorized
    );

    let holding = &mut ctx.accounts.to_holding;
    holding.owner = to;
    holding.bump = ctx.bumps.to_holding;
    ctx.accounts.ledger.mint(holding, amount)?;

    emit!(TokensMinted {
        to,
        amount,
        total_supply: ctx.accounts.ledger.total_supply,
    });

    Ok(())
}

// =============================================================================
// TRANSFER
// =============================================================================

#[derive(Accounts)]
#[instruction(to: Pubkey)]
pub struct TransferTokens<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [TOKEN_LEDGER_SEED],
        bump = ledger.bump,
    )]
    pub ledger: Account<'info, TokenLedger>,

    #[account(
        mut,
        seeds = [HOLDING_SEED, owner.key().as_ref()],
        bump = from_holding.bump,
        constraint = owner.key() != to @ SaleError::InvalidWallet,
    )]
    pub from_holding: Account<'info, TokenHolding>,

    #[account(
        init_if_needed,
        payer = owner,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, to.as_ref()],
        bump,
    )]
    pub to_holding: Account<'info, TokenHolding>,

    pub system_program: Program<'info, System>,
}

pub fn transfer_handler(ctx: Context<TransferTokens>, to: Pubkey, amount: u64) -> Result<()> {
    let to_holding = &mut ctx.accounts.to_holding;
    to_holding.owner = to;
    to_holding.bump = ctx.bumps.to_holding;

    ctx.accounts
        .ledger
        .transfer(&mut ctx.accounts.from_holding, to_holding, amount)?;

    emit!(TokensTransferred {
        from: ctx.accounts.owner.key(),
        to,
        amount,
    });

    Ok(())
}

// =============================================================================
// APPROVE
// =============================================================================

#[derive(Accounts)]
#[instruction(spender: Pubkey)]
pub struct Approve<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [TOKEN_LEDGER_SEED],
        bump = ledger.bump,
    )]
    pub ledger: Account<'info, TokenLedger>,

    #[account(
        init_if_needed,
        payer = owner,
        space = Allowance::LEN,
        seeds = [ALLOWANCE_SEED, owner.key().as_ref(), spender.as_ref()],
        bump,
    )]
    pub allowance: Account<'info, Allowance>,

    pub system_program: Program<'info, System>,
}

pub fn approve_handler(ctx: Context<Approve>, spender: Pubkey, amount: u64) -> Result<()> {
    let allowance = &mut ctx.accounts.allowance;
    allowance.owner = ctx.accounts.owner.key();
    allowance.spender = spender;
    allowance.bump = ctx.bumps.allowance;

    ctx.accounts.ledger.approve(allowance, amount)?;

    emit!(ApprovalSet {
        owner: ctx.accounts.owner.key(),
        spender,
        amount,
    });

    Ok(())
}

// =============================================================================
// TRANSFER FROM
// =============================================================================

#[derive(Accounts)]
#[instruction(from: Pubkey, to: Pubkey)]
pub struct TransferFrom<'info> {
    #[account(mut)]
    pub spender: Signer<'info>,

    #[account(
        seeds = [TOKEN_LEDGER_SEED],
        bump = ledger.bump,
    )]
    pub ledger: Account<'info, TokenLedger>,

    #[account(
        mut,
        seeds = [ALLOWANCE_SEED, from.as_ref(), spender.key().as_ref()],
        bump = allowance.bump,
    )]
    pub allowance: Account<'info, Allowance>,

    #[account(
        mut,
        seeds = [HOLDING_SEED, from.as_ref()],
        bump = from_holding.bump,
        constraint = from != to @ SaleError::InvalidWallet,
    )]
    pub from_holding: Account<'info, TokenHolding>,

    #[account(
        init_if_needed,
        payer = spender,
        space = TokenHolding::LEN,
        seeds = [HOLDING_SEED, to.as_ref()],
        bump,
    )]
    pub to_holding: Account<'info, TokenHolding>,

    pub system_program: Program<'info, System>,
}

pub fn transfer_from_handler(
    ctx: Context<TransferFrom>,
    from: Pubkey,
    to: Pubkey,
    amount: u64,
) -> Result<()> {
    let to_holding = &mut ctx.accounts.to_holding;
    to_holding.owner = to;
    to_holding.bump = ctx.bumps.to_holding;

    ctx.accounts.ledger.transfer_from(
        &mut ctx.accounts.allowance,
        &mut ctx.accounts.from_holding,
        to_holding,
        amount,
    )?;

    emit!(TokensTransferred { from, to, amount });

    Ok(())
}

// =============================================================================
// UNFREEZE
// =============================================================================

#[derive(Accounts)]
pub struct Unfreeze<'info> {
    /// Anyone may trigger the unfreeze once the grace period has passed
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [TOKEN_LEDGER_SEED],
        bump = ledger.bump,
    )]
    pub ledger: Account<'info, TokenLedger>,
}

pub fn unfreeze_handler(ctx: Context<Unfreeze>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    ctx.accounts.ledger.unfreeze(now)?;

    msg!("Transfers unfrozen at {}", now);

    emit!(TokensUnfrozen { unfrozen_at: now });

    Ok(())
}
