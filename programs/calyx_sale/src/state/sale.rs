/**
 * Sale Phase Controller State
 *
 * Phases move forward only: PreSale -> RestrictedSale -> OpenSale ->
 * Finalized, with a pause toggle available inside the open sale. Every
 * handler derives the phase from one function so no two code paths can
 * disagree about what is currently legal.
 */

use anchor_lang::prelude::*;

use crate::state::vesting::CliffPoint;
use crate::{SaleError, MAX_ADVISOR_CLIFFS, SALE_TOKENS_SUPPLY, SALE_WINDOW_SECONDS};

/// Sale lifecycle phase, derived from the clock and the finalization latch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalePhase {
    /// Before the presale opens: configuration window
    PreSale,
    /// Whitelisted buyers only, each capped individually
    RestrictedSale,
    /// Anyone may buy until the hard cap
    OpenSale,
    /// Sale ended, supply sealed
    Finalized,
}

/// Sale controller account
#[account]
pub struct SaleConfig {
    /// Administrator for sale operations; None once finalized
    pub admin: Option<Pubkey>,

    /// Restricted sale opens at this timestamp
    pub presale_start: i64,

    /// Open sale starts at this timestamp
    pub sale_start: i64,

    /// Maximum payment accepted, in lamports; mutable before the presale only
    pub hard_cap: u64,

    /// Token base units minted per lamport, floor(SALE_TOKENS_SUPPLY / hard_cap)
    pub rate: u64,

    /// Cumulative payment received, never exceeds hard_cap
    pub raised_total: u64,

    /// Owner-toggleable during the open sale
    pub paused: bool,

    /// One-way finalization latch
    pub finalized: bool,

    /// Destination for contributed lamports
    pub treasury: Pubkey,

    pub team_wallet: Pubkey,
    pub reserve_wallet: Pubkey,
    pub advisors_wallet: Pubkey,
    pub investment_fund_wallet: Pubkey,
    pub miscellaneous_wallet: Pubkey,

    /// Advisor release schedule, fixed at construction, copied into the
    /// vesting vault at finalization
    pub advisor_cliff_count: u8,
    pub advisor_cliffs: [CliffPoint; MAX_ADVISOR_CLIFFS],

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl SaleConfig {
    pub const LEN: usize = 8 + // discriminator
        33 + // admin (Option<Pubkey>)
        8 +  // presale_start
        8 +  // sale_start
        8 +  // hard_cap
        8 +  // rate
        8 +  // raised_total
        1 +  // paused
        1 +  // finalized
        32 + // treasury
        32 + // team_wallet
        32 + // reserve_wallet
        32 + // advisors_wallet
        32 + // investment_fund_wallet
        32 + // miscellaneous_wallet
        1 +  // advisor_cliff_count
        (8 + 2) * MAX_ADVISOR_CLIFFS + // advisor_cliffs
        1 +  // bump
        32;  // reserved

    /// Check a key against the current administrator
    pub fn is_admin(&self, key: &Pubkey) -> bool {
        self.admin == Some(*key)
    }

    /// The one phase function every operation consults
    pub fn phase_at(&self, now: i64) -> SalePhase {
        if self.finalized {
            SalePhase::Finalized
        } else if now < self.presale_start {
            SalePhase::PreSale
        } else if now < self.sale_start {
            SalePhase::RestrictedSale
        } else {
            SalePhase::OpenSale
        }
    }

    /// Derive the exchange rate from a hard cap
    /// Caps above the sale pool would floor to a zero rate and are rejected
    pub fn compute_rate(hard_cap: u64) -> std::result::Result<u64, SaleError> {
        if hard_cap == 0 || hard_cap > SALE_TOKENS_SUPPLY {
            return Err(SaleError::InvalidHardCap);
        }
        Ok(SALE_TOKENS_SUPPLY / hard_cap)
    }

    /// Change the hard cap; frozen once the presale opens
    pub fn set_hard_cap(&mut self, now: i64, new_cap: u64) -> std::result::Result<u64, SaleError> {
        if self.phase_at(now) != SalePhase::PreSale {
            return Err(SaleError::CapLocked);
        }
        let rate = Self::compute_rate(new_cap)?;
        self.hard_cap = new_cap;
        self.rate = rate;
        Ok(rate)
    }

    /// Whitelist uploads are legal before and during the restricted sale
    pub fn whitelist_open(&self, now: i64) -> std::result::Result<(), SaleError> {
        match self.phase_at(now) {
            SalePhase::PreSale | SalePhase::RestrictedSale => Ok(()),
            _ => Err(SaleError::WhitelistClosed),
        }
    }

    /// Validate and book a contribution, returning the token amount to mint.
    /// Every check runs before any state is touched; a rejected contribution
    /// leaves the controller and the whitelist entry untouched.
    pub fn accept_contribution(
        &mut self,
        now: i64,
        amount: u64,
        entry: Option<&mut WhitelistEntry>,
    ) -> std::result::Result<u64, SaleError> {
        if amount == 0 {
            return Err(SaleError::InvalidAmount);
        }

        let mut entry_update: Option<(&mut WhitelistEntry, u64)> = None;
        match self.phase_at(now) {
            SalePhase::PreSale => return Err(SaleError::NotYetOpen),
            SalePhase::Finalized => return Err(SaleError::AlreadyFinalized),
            SalePhase::OpenSale => {
                if self.paused {
                    return Err(SaleError::Paused);
                }
            }
            SalePhase::RestrictedSale => {
                let entry = entry.ok_or(SaleError::NotWhitelisted)?;
                let new_contributed = entry
                    .contributed
                    .checked_add(amount)
                    .ok_or(SaleError::MathOverflow)?;
                if new_contributed > entry.personal_cap {
                    return Err(SaleError::OverPersonalLimit);
                }
                entry_update = Some((entry, new_contributed));
            }
        }

        let new_raised = self
            .raised_total
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;
        if new_raised > self.hard_cap {
            return Err(SaleError::HardCapExceeded);
        }

        let tokens = (amount as u128)
            .checked_mul(self.rate as u128)
            .and_then(|t| u64::try_from(t).ok())
            .ok_or(SaleError::MathOverflow)?;

        self.raised_total = new_raised;
        if let Some((entry, new_contributed)) = entry_update {
            entry.contributed = new_contributed;
        }
        Ok(tokens)
    }

    /// Suspend the open sale
    pub fn pause(&mut self, now: i64) -> std::result::Result<(), SaleError> {
        if self.phase_at(now) != SalePhase::OpenSale {
            return Err(SaleError::PauseUnavailable);
        }
        if self.paused {
            return Err(SaleError::AlreadyPaused);
        }
        self.paused = true;
        Ok(())
    }

    /// Resume the open sale
    pub fn unpause(&mut self, now: i64) -> std::result::Result<(), SaleError> {
        if self.phase_at(now) != SalePhase::OpenSale {
            return Err(SaleError::PauseUnavailable);
        }
        if !self.paused {
            return Err(SaleError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    /// Latch the sale shut. Legal once the hard cap is exactly reached, or
    /// once the sale window has elapsed regardless of the amount raised.
    pub fn finalize(&mut self, now: i64) -> std::result::Result<(), SaleError> {
        if self.finalized {
            return Err(SaleError::AlreadyFinalized);
        }
        let cap_reached = self.raised_total == self.hard_cap;
        let window_closed = now >= self.sale_start + SALE_WINDOW_SECONDS;
        if !cap_reached && !window_closed {
            return Err(SaleError::CapNotReached);
        }
        self.finalized = true;
        self.paused = false;
        self.admin = None;
        Ok(())
    }
}

/// Per-buyer presale permission and contribution tracking, PDA per buyer
#[account]
pub struct WhitelistEntry {
    pub buyer: Pubkey,

    /// Maximum lamports this buyer may contribute during the restricted sale
    pub personal_cap: u64,

    /// Lamports contributed so far during the restricted sale
    pub contributed: u64,

    /// Bump seed for PDA
    pub bump: u8,
}

impl WhitelistEntry {
    pub const LEN: usize = 8 + // discriminator
        32 + // buyer
        8 +  // personal_cap
        8 +  // contributed
        1;   // bump
}
