/**
 * Vesting Vault State
 *
 * Created once, at finalization. Holds the one-shot team/reserve release
 * latch and the advisors cliff schedule. The advisors grant sits in an
 * escrow holding owned by the vault PDA until cliffs pass, so the escrowed
 * balance stays inside the ledger's balance table.
 */

use anchor_lang::prelude::*;

use crate::state::ledger::TokenHolding;
use crate::{SaleError, BPS_DENOMINATOR, MAX_ADVISOR_CLIFFS, TEAM_RESERVE_LOCK_SECONDS};

/// One step of the advisors schedule: once `offset_seconds` have elapsed
/// since the vesting reference time, `cumulative_bps` of the grant is vested
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct CliffPoint {
    pub offset_seconds: i64,
    pub cumulative_bps: u16,
}

/// Schedules must be non-empty, strictly increasing in time, non-decreasing
/// in fraction, and end at exactly 100%
pub fn validate_cliff_schedule(cliffs: &[CliffPoint]) -> std::result::Result<(), SaleError> {
    if cliffs.is_empty() || cliffs.len() > MAX_ADVISOR_CLIFFS {
        return Err(SaleError::InvalidCliffSchedule);
    }
    let mut prev_offset: i64 = 0;
    let mut prev_bps: u16 = 0;
    for cliff in cliffs {
        if cliff.offset_seconds <= prev_offset {
            return Err(SaleError::InvalidCliffSchedule);
        }
        if cliff.cumulative_bps < prev_bps || cliff.cumulative_bps as u64 > BPS_DENOMINATOR {
            return Err(SaleError::InvalidCliffSchedule);
        }
        prev_offset = cliff.offset_seconds;
        prev_bps = cliff.cumulative_bps;
    }
    if prev_bps as u64 != BPS_DENOMINATOR {
        return Err(SaleError::InvalidCliffSchedule);
    }
    Ok(())
}

/// Vesting vault account
#[account]
pub struct VestingVault {
    pub team_wallet: Pubkey,
    pub reserve_wallet: Pubkey,
    pub advisors_wallet: Pubkey,

    /// Grant sizes fixed at finalization
    pub team_amount: u64,
    pub reserve_amount: u64,
    pub advisors_total: u64,

    /// Amount already moved out of the advisors escrow, monotone
    pub advisors_released: u64,

    /// Vesting clock zero, captured at finalization
    pub reference_time: i64,

    /// One-way latch for the joint team/reserve release
    pub team_reserve_released: bool,

    pub advisor_cliff_count: u8,
    pub advisor_cliffs: [CliffPoint; MAX_ADVISOR_CLIFFS],

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl VestingVault {
    pub const LEN: usize = 8 + // discriminator
        32 + // team_wallet
        32 + // reserve_wallet
        32 + // advisors_wallet
        8 +  // team_amount
        8 +  // reserve_amount
        8 +  // advisors_total
        8 +  // advisors_released
        8 +  // reference_time
        1 +  // team_reserve_released
        1 +  // advisor_cliff_count
        (8 + 2) * MAX_ADVISOR_CLIFFS + // advisor_cliffs
        1 +  // bump
        32;  // reserved

    /// Cumulative fraction vested by `now`, in bps
    pub fn vested_bps(&self, now: i64) -> u16 {
        let mut bps = 0;
        for cliff in &self.advisor_cliffs[..self.advisor_cliff_count as usize] {
            if now >= self.reference_time + cliff.offset_seconds {
                bps = cliff.cumulative_bps;
            }
        }
        bps
    }

    /// Absolute amount of the advisors grant vested by `now`
    pub fn vested_amount(&self, now: i64) -> u64 {
        ((self.advisors_total as u128) * (self.vested_bps(now) as u128)
            / (BPS_DENOMINATOR as u128)) as u64
    }

    /// Vested but not yet released
    pub fn claimable(&self, now: i64) -> u64 {
        self.vested_amount(now).saturating_sub(self.advisors_released)
    }

    /// Whether the joint team/reserve lock year has elapsed
    pub fn team_reserve_unlockable(&self, now: i64) -> bool {
        now >= self.reference_time + TEAM_RESERVE_LOCK_SECONDS
    }

    /// Clear the allocation locks on both grants, exactly once
    pub fn release_team_and_reserve(
        &mut self,
        now: i64,
        team: &mut TokenHolding,
        reserve: &mut TokenHolding,
    ) -> std::result::Result<(u64, u64), SaleError> {
        if self.team_reserve_released {
            return Err(SaleError::AlreadyReleased);
        }
        if !self.team_reserve_unlockable(now) {
            return Err(SaleError::TooEarly);
        }
        self.team_reserve_released = true;
        team.vesting_locked = false;
        reserve.vesting_locked = false;
        Ok((self.team_amount, self.reserve_amount))
    }

    /// Move whatever has newly vested from the escrow to the advisors wallet.
    /// A call that lands before the first cliff, or repeats inside one cliff,
    /// has nothing to move and fails without side effects.
    pub fn release_advisor_tokens(
        &mut self,
        now: i64,
        escrow: &mut TokenHolding,
        advisors: &mut TokenHolding,
    ) -> std::result::Result<u64, SaleError> {
        let claimable = self.claimable(now);
        if claimable == 0 {
            return Err(SaleError::NothingToRelease);
        }
        let new_escrow = escrow
            .balance
            .checked_sub(claimable)
            .ok_or(SaleError::MathOverflow)?;
        let new_advisors = advisors
            .balance
            .checked_add(claimable)
            .ok_or(SaleError::MathOverflow)?;
        let new_released = self
            .advisors_released
            .checked_add(claimable)
            .ok_or(SaleError::MathOverflow)?;

        escrow.balance = new_escrow;
        advisors.balance = new_advisors;
        self.advisors_released = new_released;
        Ok(claimable)
    }
}
