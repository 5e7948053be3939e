/**
 * Token Ledger State
 *
 * Owns supply accounting, the issuance cap, and the two-tier transfer lock:
 * a global freeze that lifts once after finalization plus a grace period,
 * and per-holding allocation locks cleared by the vesting engine.
 */

use anchor_lang::prelude::*;

use crate::{SaleError, UNFREEZE_GRACE_SECONDS};

/// Supply ledger account
/// The administrator is cleared permanently at finalization
#[account]
pub struct TokenLedger {
    /// Administrator authorized to mint and finalize; None once finalized
    pub admin: Option<Pubkey>,

    /// Sum of all holding balances
    pub total_supply: u64,

    /// Ceiling on total issuance; sealed by finalization
    pub cap: u64,

    /// Minting allowed until finalization
    pub minting_open: bool,

    /// Global transfer freeze, set at creation
    pub frozen: bool,

    /// One-way finalization latch
    pub finalized: bool,

    /// Timestamp finalization happened; gates the unfreeze grace period
    pub finalized_at: i64,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 16],
}

impl TokenLedger {
    pub const LEN: usize = 8 + // discriminator
        33 + // admin (Option<Pubkey>)
        8 +  // total_supply
        8 +  // cap
        1 +  // minting_open
        1 +  // frozen
        1 +  // finalized
        8 +  // finalized_at
        1 +  // bump
        16;  // reserved

    /// Check a key against the current administrator
    pub fn is_admin(&self, key: &Pubkey) -> bool {
        self.admin == Some(*key)
    }

    /// Issue new tokens into a holding
    pub fn mint(
        &mut self,
        holding: &mut TokenHolding,
        amount: u64,
    ) -> std::result::Result<(), SaleError> {
        if !self.minting_open {
            return Err(SaleError::MintingClosed);
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;
        if new_supply > self.cap {
            return Err(SaleError::CapExceeded);
        }
        let new_balance = holding
            .balance
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;

        self.total_supply = new_supply;
        holding.balance = new_balance;
        Ok(())
    }

    /// Move tokens between holdings, subject to both lock tiers
    pub fn transfer(
        &self,
        from: &mut TokenHolding,
        to: &mut TokenHolding,
        amount: u64,
    ) -> std::result::Result<(), SaleError> {
        if self.frozen {
            return Err(SaleError::Frozen);
        }
        if from.vesting_locked {
            return Err(SaleError::LockedAllocation);
        }
        if from.balance < amount {
            return Err(SaleError::InsufficientBalance);
        }
        let new_to = to
            .balance
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;

        from.balance -= amount;
        to.balance = new_to;
        Ok(())
    }

    /// Record an allowance; approvals are blocked while frozen
    pub fn approve(
        &self,
        allowance: &mut Allowance,
        amount: u64,
    ) -> std::result::Result<(), SaleError> {
        if self.frozen {
            return Err(SaleError::Frozen);
        }
        allowance.amount = amount;
        Ok(())
    }

    /// Spend an allowance: same checks as a transfer, plus the allowance debit
    pub fn transfer_from(
        &self,
        allowance: &mut Allowance,
        from: &mut TokenHolding,
        to: &mut TokenHolding,
        amount: u64,
    ) -> std::result::Result<(), SaleError> {
        if allowance.amount < amount {
            return Err(SaleError::InsufficientAllowance);
        }
        self.transfer(from, to, amount)?;
        allowance.amount -= amount;
        Ok(())
    }

    /// Seal the ledger: close minting, clear the administrator, start the
    /// unfreeze clock
    pub fn finalize(&mut self, now: i64) -> std::result::Result<(), SaleError> {
        if self.finalized {
            return Err(SaleError::AlreadyFinalized);
        }
        self.minting_open = false;
        self.finalized = true;
        self.finalized_at = now;
        self.admin = None;
        Ok(())
    }

    /// Lift the global freeze, once, after finalization plus the grace period
    pub fn unfreeze(&mut self, now: i64) -> std::result::Result<(), SaleError> {
        if !self.finalized {
            return Err(SaleError::NotFinalized);
        }
        if !self.frozen {
            return Err(SaleError::AlreadyUnfrozen);
        }
        if now < self.finalized_at + UNFREEZE_GRACE_SECONDS {
            return Err(SaleError::TooEarly);
        }
        self.frozen = false;
        Ok(())
    }
}

/// One row of the balance table, PDA per owner
#[account]
pub struct TokenHolding {
    /// Identity this balance belongs to
    pub owner: Pubkey,

    /// Balance in base units
    pub balance: u64,

    /// Set on allocation holdings until the vesting engine releases them
    pub vesting_locked: bool,

    /// Bump seed for PDA
    pub bump: u8,
}

impl TokenHolding {
    pub const LEN: usize = 8 + // discriminator
        32 + // owner
        8 +  // balance
        1 +  // vesting_locked
        1;   // bump
}

/// Spending allowance granted by an owner to a spender
#[account]
pub struct Allowance {
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub amount: u64,
    pub bump: u8,
}

impl Allowance {
    pub const LEN: usize = 8 + // discriminator
        32 + // owner
        32 + // spender
        8 +  // amount
        1;   // bump
}
