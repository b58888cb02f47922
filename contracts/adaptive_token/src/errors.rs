/// A configuration bound that an update would violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Bound {
    /// `marketing_fee + liquidity_fee > 140`.
    FeeSum,
    /// Adaptive step above 2.0 %.
    AdaptiveIncrease,
    /// Adaptive ceiling above 30.0 %.
    AdaptiveMax,
    /// Swap amount below 0.001 % of supply.
    SwapThresholdLow,
    /// Swap amount above 0.5 % of supply.
    SwapThresholdHigh,
    /// Lower swap bound above the upper one.
    SwapRangeInverted,
}

impl Bound {
    pub fn reason(&self) -> &'static str {
        match self {
            Bound::FeeSum => "Must keep fees at 14% or less",
            Bound::AdaptiveIncrease => "Must keep increase at 2% or less",
            Bound::AdaptiveMax => "Must keep fees at 30% or less",
            Bound::SwapThresholdLow => "Swap amount cannot be lower than 0.001% total supply.",
            Bound::SwapThresholdHigh => "Swap amount cannot be higher than 0.5% total supply.",
            Bound::SwapRangeInverted => "Swap lower bound cannot exceed the upper bound.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    /// Caller is not the contract owner.
    NotOwner,
    /// A configuration update is outside its permitted range.
    BoundExceeded(Bound),
    /// Pool-facing transfer attempted before `open_trade`.
    TradingNotOpen,
    /// Sender was caught in the dead-block window and may not sell.
    Blacklisted,
    /// `open_trade` was already called.
    AlreadyOpen,
    /// The contract holds no collected tax to sweep.
    ZeroSweepBalance,
    /// A sweep is already running further up the call stack.
    SweepInProgress,
    InsufficientBalance,
    InsufficientAllowance,
    /// An arithmetic operation overflowed.
    Overflow,
    /// The DEX router rejected or failed a call.
    RouterCallFailed,
    /// A native value transfer failed.
    NativeTransferFailed,
}

impl From<Bound> for Error {
    fn from(bound: Bound) -> Self {
        Error::BoundExceeded(bound)
    }
}

impl Error {
    /// Human-readable reason for a rejected configuration update.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Error::BoundExceeded(bound) => Some(bound.reason()),
            _ => None,
        }
    }
}
