//! Treasury sweep planning.
//!
//! Collected tax sits in the contract's own balance until a sweep converts
//! it. Part of it is paired with native currency and added to the pool; the
//! rest is sold and forwarded to the fee wallet.

use crate::{
    constants::*,
    errors::{Bound, Error},
    math::mul_div,
    Balance,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct SwapSettings {
    /// Contract balance at which a sell triggers a sweep.
    pub threshold: Balance,
    /// Largest amount an automatic sweep converts at once.
    pub max_amount: Balance,
    pub enabled: bool,
}

impl SwapSettings {
    /// Defaults for a fresh deployment: 0.05 % threshold, 0.5 % cap, off.
    pub fn initial(total_supply: Balance) -> Self {
        Self {
            threshold: total_supply / DEFAULT_SWAP_THRESHOLD_DENOMINATOR
                * DEFAULT_SWAP_THRESHOLD_NUMERATOR,
            max_amount: total_supply / SWAP_THRESHOLD_MAX_DIVISOR,
            enabled: false,
        }
    }

    pub fn sweep_cap(&self, balance: Balance) -> Balance {
        balance.min(self.max_amount.max(self.threshold))
    }
}

/// Inclusive `(low, high)` range for swap amounts.
pub fn threshold_bounds(total_supply: Balance) -> (Balance, Balance) {
    (
        total_supply / SWAP_THRESHOLD_MIN_DIVISOR,
        total_supply / SWAP_THRESHOLD_MAX_DIVISOR,
    )
}

pub fn validate_threshold(amount: Balance, total_supply: Balance) -> Result<(), Error> {
    let (low, high) = threshold_bounds(total_supply);
    if amount < low {
        return Err(Bound::SwapThresholdLow.into());
    }
    if amount > high {
        return Err(Bound::SwapThresholdHigh.into());
    }
    Ok(())
}

/// Checks a `(threshold, max_amount)` pair supplied at opening.
pub fn validate_range(low: Balance, high: Balance, total_supply: Balance) -> Result<(), Error> {
    validate_threshold(low, total_supply)?;
    validate_threshold(high, total_supply)?;
    if low > high {
        return Err(Bound::SwapRangeInverted.into());
    }
    Ok(())
}

/// How one sweep divides `amount` between the pool and the fee wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPlan {
    pub amount: Balance,
    /// Share of `amount` attributed to liquidity.
    pub liquidity_portion: Balance,
    /// Half of the liquidity portion, kept as tokens for pairing.
    pub liquidity_tokens: Balance,
    /// Everything sold for native currency.
    pub swap_tokens: Balance,
}

impl SweepPlan {
    pub fn new(
        amount: Balance,
        tokens_for_liquidity: Balance,
        tokens_for_marketing: Balance,
    ) -> Result<Self, Error> {
        let attributed = tokens_for_liquidity
            .checked_add(tokens_for_marketing)
            .ok_or(Error::Overflow)?;
        let liquidity_portion = if attributed == 0 {
            0
        } else {
            mul_div(amount, tokens_for_liquidity, attributed)?
        };
        let liquidity_tokens = liquidity_portion / 2;
        Ok(Self {
            amount,
            liquidity_portion,
            liquidity_tokens,
            swap_tokens: amount - liquidity_tokens,
        })
    }

    /// Amount of the sold tokens' proceeds that pairs with `liquidity_tokens`.
    pub fn native_for_liquidity(&self, received: Balance) -> Result<Balance, Error> {
        if self.swap_tokens == 0 {
            return Ok(0);
        }
        mul_div(
            received,
            self.liquidity_portion - self.liquidity_tokens,
            self.swap_tokens,
        )
    }

    /// Minimum acceptable output given the router's quote.
    pub fn min_native_out(quote: Balance) -> Result<Balance, Error> {
        mul_div(
            quote,
            Balance::from(FEE_DENOMINATOR - SWEEP_SLIPPAGE),
            Balance::from(FEE_DENOMINATOR),
        )
    }

    /// Attribution consumed by this sweep as `(liquidity, marketing)`.
    pub fn consumed(&self) -> (Balance, Balance) {
        (
            self.liquidity_portion,
            self.amount - self.liquidity_portion,
        )
    }
}
