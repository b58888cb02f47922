//! Trading gate: one-shot opening and the dead-block window.

use crate::{errors::Error, fees::Direction, BlockNumber};

/// Outcome of a gate check for a transfer that may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// The buyer landed inside the dead-block window.
    AllowAndBlacklist,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct TradingGate {
    opened_at: Option<BlockNumber>,
    dead_blocks: u32,
}

impl TradingGate {
    pub fn is_open(&self) -> bool {
        self.opened_at.is_some()
    }

    pub fn opened_at(&self) -> Option<BlockNumber> {
        self.opened_at
    }

    pub fn dead_blocks(&self) -> u32 {
        self.dead_blocks
    }

    pub fn open(&mut self, now: BlockNumber, dead_blocks: u32) -> Result<(), Error> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }
        self.opened_at = Some(now);
        self.dead_blocks = dead_blocks;
        Ok(())
    }

    /// `opened_at <= now < opened_at + dead_blocks`.
    pub fn in_dead_window(&self, now: BlockNumber) -> bool {
        match self.opened_at {
            Some(opened_at) => {
                let closes_at = u64::from(opened_at) + u64::from(self.dead_blocks);
                now >= opened_at && u64::from(now) < closes_at
            }
            None => false,
        }
    }

    /// Decides whether a transfer may go ahead.
    ///
    /// `exempt` is true when either party is excluded from fees; such
    /// transfers pass unconditionally, as do plain wallet-to-wallet moves.
    pub fn check_transfer_allowed(
        &self,
        direction: Direction,
        exempt: bool,
        sender_blacklisted: bool,
        now: BlockNumber,
    ) -> Result<Verdict, Error> {
        if exempt || direction == Direction::Plain {
            return Ok(Verdict::Allow);
        }
        if !self.is_open() {
            return Err(Error::TradingNotOpen);
        }
        match direction {
            Direction::Sell if sender_blacklisted => Err(Error::Blacklisted),
            Direction::Buy if self.in_dead_window(now) => Ok(Verdict::AllowAndBlacklist),
            _ => Ok(Verdict::Allow),
        }
    }
}
