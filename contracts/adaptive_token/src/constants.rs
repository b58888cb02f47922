//! Denominators, hard bounds and deployment defaults.
//!
//! All fee quantities are expressed in bp10: one unit is 0.1 %, so the
//! denominator is 1 000.

use crate::{Balance, Bp10, Timestamp};

// ── Units ─────────────────────────────────────────────────────────────────────

/// Denominator for every bp10 rate (1 000 = 100 %).
pub const FEE_DENOMINATOR: Bp10 = 1_000;

/// Token decimals reported by `decimals()`.
pub const DECIMALS: u8 = 18;

// ── Hard bounds (enforced on update) ──────────────────────────────────────────

/// `marketing_fee + liquidity_fee` may not exceed 14.0 %.
pub const MAX_FEE_SPLIT: Bp10 = 140;

/// Adaptive premium step may not exceed 2.0 % per sell.
pub const MAX_ADAPTIVE_INCREASE: Bp10 = 20;

/// Adaptive premium ceiling may not exceed 30.0 %.
pub const MAX_ADAPTIVE_PREMIUM: Bp10 = 300;

/// Swap threshold floor: `total_supply / 100_000` (0.001 %).
pub const SWAP_THRESHOLD_MIN_DIVISOR: Balance = 100_000;

/// Swap threshold ceiling: `total_supply / 200` (0.5 %).
pub const SWAP_THRESHOLD_MAX_DIVISOR: Balance = 200;

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_MARKETING_FEE: Bp10 = 20;
pub const DEFAULT_LIQUIDITY_FEE: Bp10 = 20;
pub const DEFAULT_BUY_FEE: Bp10 = 90;
pub const DEFAULT_SELL_FEE: Bp10 = 90;

/// Each sell adds 0.5 % to the sell rate.
pub const DEFAULT_ADAPTIVE_INCREASE: Bp10 = 5;

/// Sell rate tops out at 9.0 % + 26.0 % = 35.0 %.
pub const DEFAULT_ADAPTIVE_PREMIUM_MAX: Bp10 = 260;

/// Default swap threshold is 0.05 % of supply (5 / 10 000).
pub const DEFAULT_SWAP_THRESHOLD_NUMERATOR: Balance = 5;
pub const DEFAULT_SWAP_THRESHOLD_DENOMINATOR: Balance = 10_000;

// ── Sweep execution ───────────────────────────────────────────────────────────

/// Tolerated shortfall against the router quote when swapping collected tax.
pub const SWEEP_SLIPPAGE: Bp10 = 100;

/// Router deadline offset (5 minutes, in milliseconds).
pub const SWAP_DEADLINE_MS: Timestamp = 300_000;
