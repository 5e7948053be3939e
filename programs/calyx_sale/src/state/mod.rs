/**
 * State Accounts for the Calyx Token Sale
 */

pub mod ledger;
pub mod sale;
pub mod vesting;

pub use ledger::*;
pub use sale::*;
pub use vesting::*;

#[cfg(test)]
mod lifecycle_tests {
    use super::*;
    use crate::{
        SaleError, ADVISORS_TOKENS_SUPPLY, INVESTMENT_FUND_TOKENS_SUPPLY, MAX_ADVISOR_CLIFFS,
        MAX_SUPPLY, MISCELLANEOUS_TOKENS_SUPPLY, RESERVE_TOKENS_SUPPLY, TEAM_RESERVE_LOCK_SECONDS,
        TEAM_TOKENS_SUPPLY, TOKEN_UNIT, UNFREEZE_GRACE_SECONDS,
    };
    use anchor_lang::prelude::Pubkey;

    const DAY: i64 = 24 * 60 * 60;
    const PRESALE_START: i64 = 1_000_000;
    const SALE_START: i64 = PRESALE_START + 2 * DAY;

    struct World {
        sale: SaleConfig,
        ledger: TokenLedger,
        holdings: Vec<TokenHolding>,
    }

    /// Holding indices created by finalization
    struct Allocations {
        vault: VestingVault,
        team: usize,
        reserve: usize,
        escrow: usize,
        advisors: usize,
    }

    fn two_mut<T>(v: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
        assert!(i != j);
        if i < j {
            let (a, b) = v.split_at_mut(j);
            (&mut a[i], &mut b[0])
        } else {
            let (a, b) = v.split_at_mut(i);
            (&mut b[0], &mut a[j])
        }
    }

    impl World {
        fn new(hard_cap: u64) -> Self {
            let cliffs = [
                CliffPoint { offset_seconds: 92 * DAY, cumulative_bps: 2_500 },
                CliffPoint { offset_seconds: 365 * DAY, cumulative_bps: 5_000 },
                CliffPoint { offset_seconds: 730 * DAY, cumulative_bps: 10_000 },
            ];
            validate_cliff_schedule(&cliffs).unwrap();
            let admin = Pubkey::new_unique();
            let mut advisor_cliffs = [CliffPoint::default(); MAX_ADVISOR_CLIFFS];
            advisor_cliffs[..cliffs.len()].copy_from_slice(&cliffs);

            World {
                sale: SaleConfig {
                    admin: Some(admin),
                    presale_start: PRESALE_START,
                    sale_start: SALE_START,
                    hard_cap,
                    rate: SaleConfig::compute_rate(hard_cap).unwrap(),
                    raised_total: 0,
                    paused: false,
                    finalized: false,
                    treasury: Pubkey::new_unique(),
                    team_wallet: Pubkey::new_unique(),
                    reserve_wallet: Pubkey::new_unique(),
                    advisors_wallet: Pubkey::new_unique(),
                    investment_fund_wallet: Pubkey::new_unique(),
                    miscellaneous_wallet: Pubkey::new_unique(),
                    advisor_cliff_count: cliffs.len() as u8,
                    advisor_cliffs,
                    bump: 255,
                    reserved: [0; 32],
                },
                ledger: TokenLedger {
                    admin: Some(admin),
                    total_supply: 0,
                    cap: MAX_SUPPLY,
                    minting_open: true,
                    frozen: true,
                    finalized: false,
                    finalized_at: 0,
                    bump: 255,
                    reserved: [0; 16],
                },
                holdings: Vec::new(),
            }
        }

        fn holding(&mut self, owner: Pubkey) -> usize {
            self.holdings.push(TokenHolding {
                owner,
                balance: 0,
                vesting_locked: false,
                bump: 255,
            });
            self.holdings.len() - 1
        }

        fn assert_supply_invariant(&self) {
            let sum: u64 = self.holdings.iter().map(|h| h.balance).sum();
            assert_eq!(sum, self.ledger.total_supply);
            assert!(self.ledger.total_supply <= self.ledger.cap);
        }

        /// What the finalize instruction does, at the state layer
        fn finalize(&mut self, now: i64) -> Allocations {
            self.sale.finalize(now).unwrap();

            let team = self.holding(self.sale.team_wallet);
            self.ledger
                .mint(&mut self.holdings[team], TEAM_TOKENS_SUPPLY)
                .unwrap();
            self.holdings[team].vesting_locked = true;

            let reserve = self.holding(self.sale.reserve_wallet);
            self.ledger
                .mint(&mut self.holdings[reserve], RESERVE_TOKENS_SUPPLY)
                .unwrap();
            self.holdings[reserve].vesting_locked = true;

            let vault_key = Pubkey::new_unique();
            let escrow = self.holding(vault_key);
            self.ledger
                .mint(&mut self.holdings[escrow], ADVISORS_TOKENS_SUPPLY)
                .unwrap();
            self.holdings[escrow].vesting_locked = true;

            let advisors = self.holding(self.sale.advisors_wallet);

            let investment = self.holding(self.sale.investment_fund_wallet);
            self.ledger
                .mint(&mut self.holdings[investment], INVESTMENT_FUND_TOKENS_SUPPLY)
                .unwrap();

            let miscellaneous = self.holding(self.sale.miscellaneous_wallet);
            self.ledger
                .mint(&mut self.holdings[miscellaneous], MISCELLANEOUS_TOKENS_SUPPLY)
                .unwrap();

            self.ledger.finalize(now).unwrap();

            Allocations {
                vault: VestingVault {
                    team_wallet: self.sale.team_wallet,
                    reserve_wallet: self.sale.reserve_wallet,
                    advisors_wallet: self.sale.advisors_wallet,
                    team_amount: TEAM_TOKENS_SUPPLY,
                    reserve_amount: RESERVE_TOKENS_SUPPLY,
                    advisors_total: ADVISORS_TOKENS_SUPPLY,
                    advisors_released: 0,
                    reference_time: now,
                    team_reserve_released: false,
                    advisor_cliff_count: self.sale.advisor_cliff_count,
                    advisor_cliffs: self.sale.advisor_cliffs,
                    bump: 255,
                    reserved: [0; 32],
                },
                team,
                reserve,
                escrow,
                advisors,
            }
        }
    }

    #[test]
    fn full_sale_lifecycle_preserves_the_supply_invariant() {
        let hard_cap = 1_000 * TOKEN_UNIT;
        let mut world = World::new(hard_cap);
        let rate = world.sale.rate;
        assert_eq!(rate, 11_125);

        // restricted phase: a whitelisted buyer fills part of the cap
        let presale_buyer = Pubkey::new_unique();
        let mut entry = WhitelistEntry {
            buyer: presale_buyer,
            personal_cap: 600 * TOKEN_UNIT,
            contributed: 0,
            bump: 255,
        };
        let buyer_a = world.holding(presale_buyer);
        let tokens = world
            .sale
            .accept_contribution(PRESALE_START + DAY, 400 * TOKEN_UNIT, Some(&mut entry))
            .unwrap();
        world
            .ledger
            .mint(&mut world.holdings[buyer_a], tokens)
            .unwrap();
        world.assert_supply_invariant();

        // open phase: anyone fills the rest, to the cap exactly
        let buyer_b = world.holding(Pubkey::new_unique());
        let tokens = world
            .sale
            .accept_contribution(SALE_START, 600 * TOKEN_UNIT, None)
            .unwrap();
        world
            .ledger
            .mint(&mut world.holdings[buyer_b], tokens)
            .unwrap();
        world.assert_supply_invariant();
        assert_eq!(world.sale.raised_total, hard_cap);

        // sale tokens issued match the whole pool once the cap is filled
        let issued = world.holdings[buyer_a].balance + world.holdings[buyer_b].balance;
        assert_eq!(issued, hard_cap * rate);

        // finalization mints the insider pools and seals the ledger
        let finalized_at = SALE_START + DAY;
        let mut alloc = world.finalize(finalized_at);
        world.assert_supply_invariant();
        assert!(!world.ledger.minting_open);
        assert_eq!(world.ledger.admin, None);
        assert_eq!(
            world.ledger.total_supply,
            hard_cap * rate
                + TEAM_TOKENS_SUPPLY
                + RESERVE_TOKENS_SUPPLY
                + ADVISORS_TOKENS_SUPPLY
                + INVESTMENT_FUND_TOKENS_SUPPLY
                + MISCELLANEOUS_TOKENS_SUPPLY
        );

        // still frozen: nothing moves inside the grace week
        let outsider = world.holding(Pubkey::new_unique());
        {
            let (from, to) = two_mut(&mut world.holdings, buyer_a, outsider);
            assert!(matches!(
                world.ledger.transfer(from, to, 1),
                Err(SaleError::Frozen)
            ));
        }
        assert!(matches!(
            world.ledger.unfreeze(finalized_at + UNFREEZE_GRACE_SECONDS - 1),
            Err(SaleError::TooEarly)
        ));

        // a week on, the freeze lifts and sale balances move
        world
            .ledger
            .unfreeze(finalized_at + UNFREEZE_GRACE_SECONDS)
            .unwrap();
        {
            let (from, to) = two_mut(&mut world.holdings, buyer_a, outsider);
            world.ledger.transfer(from, to, TOKEN_UNIT).unwrap();
        }
        world.assert_supply_invariant();

        // team stays locked until the vesting year passes
        {
            let (from, to) = two_mut(&mut world.holdings, alloc.team, outsider);
            assert!(matches!(
                world.ledger.transfer(from, to, 1),
                Err(SaleError::LockedAllocation)
            ));
        }
        assert!(matches!(
            alloc.vault.release_team_and_reserve(
                finalized_at + TEAM_RESERVE_LOCK_SECONDS - 1,
                &mut TokenHolding {
                    owner: Pubkey::new_unique(),
                    balance: 0,
                    vesting_locked: true,
                    bump: 255,
                },
                &mut TokenHolding {
                    owner: Pubkey::new_unique(),
                    balance: 0,
                    vesting_locked: true,
                    bump: 255,
                },
            ),
            Err(SaleError::TooEarly)
        ));
        {
            let (team, reserve) = two_mut(&mut world.holdings, alloc.team, alloc.reserve);
            alloc
                .vault
                .release_team_and_reserve(finalized_at + TEAM_RESERVE_LOCK_SECONDS, team, reserve)
                .unwrap();
        }
        {
            let (from, to) = two_mut(&mut world.holdings, alloc.team, outsider);
            world.ledger.transfer(from, to, TOKEN_UNIT).unwrap();
        }
        world.assert_supply_invariant();

        // advisors drain the escrow across the cliffs
        {
            let (escrow, advisors) = two_mut(&mut world.holdings, alloc.escrow, alloc.advisors);
            alloc
                .vault
                .release_advisor_tokens(finalized_at + 92 * DAY, escrow, advisors)
                .unwrap();
            alloc
                .vault
                .release_advisor_tokens(finalized_at + 730 * DAY, escrow, advisors)
                .unwrap();
            assert_eq!(advisors.balance, ADVISORS_TOKENS_SUPPLY);
            assert_eq!(escrow.balance, 0);
        }
        {
            let (from, to) = two_mut(&mut world.holdings, alloc.advisors, outsider);
            world.ledger.transfer(from, to, TOKEN_UNIT).unwrap();
        }
        world.assert_supply_invariant();
    }
}
