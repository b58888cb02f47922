//! Adaptive sell premium.
//!
//! Each taxed sell raises the premium by one step up to the ceiling; each
//! taxed buy lowers it by one step down to zero. The premium is added to the
//! base sell rate, so the sell rate never drops below `sell_fee`.

use crate::{
    constants::*,
    errors::{Bound, Error},
    fees::Direction,
    Bp10,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct AdaptiveConfig {
    pub increase_step: Bp10,
    pub max_premium: Bp10,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            increase_step: DEFAULT_ADAPTIVE_INCREASE,
            max_premium: DEFAULT_ADAPTIVE_PREMIUM_MAX,
        }
    }
}

impl AdaptiveConfig {
    pub fn new(increase_step: Bp10, max_premium: Bp10) -> Result<Self, Error> {
        if max_premium > MAX_ADAPTIVE_PREMIUM {
            return Err(Bound::AdaptiveMax.into());
        }
        if increase_step > MAX_ADAPTIVE_INCREASE {
            return Err(Bound::AdaptiveIncrease.into());
        }
        Ok(Self {
            increase_step,
            max_premium,
        })
    }
}

/// Current premium, always within `[0, max_premium]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct AdaptiveState {
    premium: Bp10,
}

impl AdaptiveState {
    pub fn premium(&self) -> Bp10 {
        self.premium
    }

    pub fn on_sell(&mut self, config: &AdaptiveConfig) {
        self.premium = self
            .premium
            .saturating_add(config.increase_step)
            .min(config.max_premium);
    }

    pub fn on_buy(&mut self, config: &AdaptiveConfig) {
        self.premium = self.premium.saturating_sub(config.increase_step);
    }

    /// Applies the transition for `direction`. Returns `false` for plain
    /// transfers, which leave the premium alone.
    pub fn apply(&mut self, direction: Direction, config: &AdaptiveConfig) -> bool {
        match direction {
            Direction::Sell => self.on_sell(config),
            Direction::Buy => self.on_buy(config),
            Direction::Plain => return false,
        }
        true
    }

    pub fn reset(&mut self) {
        self.premium = 0;
    }

    /// Pulls the premium under a lowered ceiling.
    pub fn clamp_to(&mut self, max_premium: Bp10) {
        self.premium = self.premium.min(max_premium);
    }
}
