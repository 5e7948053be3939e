/**
 * Instructions for the Calyx Token Sale
 */

pub mod initialize;
pub mod sale;
pub mod ledger;
pub mod vesting;
pub mod status;

pub use initialize::*;
pub use sale::*;
pub use ledger::*;
pub use vesting::*;
pub use status::*;
