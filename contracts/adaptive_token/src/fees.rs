//! Fee policy: transfer direction and the tax it owes.

use crate::{
    constants::*,
    errors::{Bound, Error},
    math::mul_div,
    AccountId, Balance, Bp10,
};

/// Which side of a transfer touches the pool pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The pair is the sender.
    Buy,
    /// The pair is the recipient.
    Sell,
    /// Neither side is the pair.
    Plain,
}

impl Direction {
    pub fn classify(from: AccountId, to: AccountId, pair: AccountId) -> Self {
        if from == pair {
            Direction::Buy
        } else if to == pair {
            Direction::Sell
        } else {
            Direction::Plain
        }
    }
}

/// Configured base rates and the marketing/liquidity weighting of collected
/// tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct FeeConfig {
    pub marketing_fee: Bp10,
    pub liquidity_fee: Bp10,
    pub buy_fee: Bp10,
    pub sell_fee: Bp10,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            marketing_fee: DEFAULT_MARKETING_FEE,
            liquidity_fee: DEFAULT_LIQUIDITY_FEE,
            buy_fee: DEFAULT_BUY_FEE,
            sell_fee: DEFAULT_SELL_FEE,
        }
    }
}

impl FeeConfig {
    /// Validated constructor. Only the marketing/liquidity weighting is
    /// bounded; buy and sell rates are taken as given.
    pub fn new(
        marketing_fee: Bp10,
        liquidity_fee: Bp10,
        buy_fee: Bp10,
        sell_fee: Bp10,
    ) -> Result<Self, Error> {
        let split = marketing_fee
            .checked_add(liquidity_fee)
            .ok_or(Bound::FeeSum)?;
        if split > MAX_FEE_SPLIT {
            return Err(Bound::FeeSum.into());
        }
        Ok(Self {
            marketing_fee,
            liquidity_fee,
            buy_fee,
            sell_fee,
        })
    }

    pub fn effective_buy(&self) -> Bp10 {
        self.buy_fee
    }

    /// Base sell rate with the adaptive premium stacked on top.
    pub fn effective_sell(&self, premium: Bp10) -> Bp10 {
        self.sell_fee.saturating_add(premium)
    }

    /// Rate charged for `direction`, never above 100 %.
    pub fn rate(&self, direction: Direction, premium: Bp10) -> Bp10 {
        let rate = match direction {
            Direction::Buy => self.effective_buy(),
            Direction::Sell => self.effective_sell(premium),
            Direction::Plain => 0,
        };
        rate.min(FEE_DENOMINATOR)
    }

    /// Splits collected tax between marketing and liquidity in proportion
    /// to their weights. Unweighted tax goes to marketing.
    pub fn attribute(&self, tax: Balance) -> Result<(Balance, Balance), Error> {
        let weight = Balance::from(self.marketing_fee) + Balance::from(self.liquidity_fee);
        if weight == 0 {
            return Ok((tax, 0));
        }
        let liquidity = mul_div(tax, Balance::from(self.liquidity_fee), weight)?;
        Ok((tax - liquidity, liquidity))
    }
}

/// Tax owed by one transfer and its attribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeQuote {
    pub tax: Balance,
    pub marketing_share: Balance,
    pub liquidity_share: Balance,
}

impl FeeQuote {
    /// Amount left for the recipient.
    pub fn net(&self, amount: Balance) -> Balance {
        amount.saturating_sub(self.tax)
    }
}

/// `tax = amount * rate / 1000`, floored.
///
/// Callers pass [`Direction::Plain`] for fee-exempt transfers.
pub fn compute_fee(
    direction: Direction,
    amount: Balance,
    fees: &FeeConfig,
    premium: Bp10,
) -> Result<FeeQuote, Error> {
    let rate = fees.rate(direction, premium);
    if rate == 0 {
        return Ok(FeeQuote::default());
    }
    let tax = mul_div(
        amount,
        Balance::from(rate),
        Balance::from(FEE_DENOMINATOR),
    )?;
    let (marketing_share, liquidity_share) = fees.attribute(tax)?;
    Ok(FeeQuote {
        tax,
        marketing_share,
        liquidity_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn account(byte: u8) -> AccountId {
        AccountId::from([byte; 32])
    }

    #[test]
    fn classifies_by_pair_side() {
        let pair = account(9);
        assert_eq!(Direction::classify(pair, account(1), pair), Direction::Buy);
        assert_eq!(Direction::classify(account(1), pair, pair), Direction::Sell);
        assert_eq!(Direction::classify(account(1), account(2), pair), Direction::Plain);
    }

    #[test]
    fn buy_uses_static_rate() {
        let fees = FeeConfig::default();
        let quote = compute_fee(Direction::Buy, 10_000, &fees, 200).unwrap();
        assert_eq!(quote.tax, 900);
    }

    #[test]
    fn sell_stacks_premium() {
        let fees = FeeConfig::default();
        // 9.0% + 1.5%
        let quote = compute_fee(Direction::Sell, 10_000, &fees, 15).unwrap();
        assert_eq!(quote.tax, 1_050);
    }

    #[test]
    fn plain_is_free() {
        let fees = FeeConfig::default();
        assert_eq!(
            compute_fee(Direction::Plain, 10_000, &fees, 300).unwrap(),
            FeeQuote::default()
        );
    }

    #[test]
    fn tax_floors_to_zero_on_dust() {
        let fees = FeeConfig::default();
        // 11 * 90 = 990 < 1000
        assert_eq!(compute_fee(Direction::Buy, 11, &fees, 0).unwrap().tax, 0);
        assert_eq!(compute_fee(Direction::Buy, 12, &fees, 0).unwrap().tax, 1);
    }

    #[test]
    fn rate_is_clamped_to_whole_amount() {
        let fees = FeeConfig::new(0, 0, 2_000, 900).unwrap();
        assert_eq!(compute_fee(Direction::Buy, 500, &fees, 0).unwrap().tax, 500);
        assert_eq!(compute_fee(Direction::Sell, 500, &fees, 300).unwrap().tax, 500);
    }

    #[test]
    fn attribution_follows_weights() {
        let fees = FeeConfig::new(30, 10, 50, 50).unwrap();
        let quote = compute_fee(Direction::Buy, 100_000, &fees, 0).unwrap();
        assert_eq!(quote.tax, 5_000);
        assert_eq!(quote.liquidity_share, 1_250);
        assert_eq!(quote.marketing_share, 3_750);
    }

    #[test]
    fn unweighted_tax_goes_to_marketing() {
        let fees = FeeConfig::new(0, 0, 50, 50).unwrap();
        assert_eq!(fees.attribute(77), Ok((77, 0)));
    }

    #[test]
    fn rejects_split_above_fourteen_percent() {
        assert_eq!(
            FeeConfig::new(100, 50, 10, 10),
            Err(Error::BoundExceeded(Bound::FeeSum))
        );
        assert!(FeeConfig::new(70, 70, 10, 10).is_ok());
    }

    proptest! {
        #[test]
        fn split_bound_is_exact(
            marketing in 0u32..=400,
            liquidity in 0u32..=400,
            buy in any::<u32>(),
            sell in any::<u32>(),
        ) {
            let result = FeeConfig::new(marketing, liquidity, buy, sell);
            if marketing + liquidity <= MAX_FEE_SPLIT {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result, Err(Error::BoundExceeded(Bound::FeeSum)));
            }
        }

        #[test]
        fn attribution_conserves_tax(
            marketing in 0u32..=70,
            liquidity in 0u32..=70,
            amount in 0u128..=1_000_000_000_000_000_000_000_000_000,
        ) {
            let fees = FeeConfig::new(marketing, liquidity, 90, 90).unwrap();
            let quote = compute_fee(Direction::Buy, amount, &fees, 0).unwrap();
            prop_assert_eq!(quote.marketing_share + quote.liquidity_share, quote.tax);
            prop_assert!(quote.tax <= amount);
        }
    }
}
