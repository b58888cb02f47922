//! Transfer pipeline and administrative operations.
//!
//! The engine is written once against four small traits. The ink! contract
//! implements them over its storage and environment; the test chain in
//! `mock` implements them in memory so sweeps run end to end.

use ink::prelude::vec::Vec;

use crate::{
    adaptive::{AdaptiveConfig, AdaptiveState},
    constants::SWAP_DEADLINE_MS,
    errors::Error,
    fees::{compute_fee, Direction, FeeConfig, FeeQuote},
    gate::{TradingGate, Verdict},
    treasury::{validate_range, validate_threshold, SwapSettings, SweepPlan},
    AccountId, Balance, BlockNumber, Bp10, Timestamp,
};

// ── Collaborators ─────────────────────────────────────────────────────────────

/// Token balances and allowances.
pub trait Ledger {
    fn total_supply(&self) -> Balance;
    fn balance_of(&self, owner: AccountId) -> Balance;
    /// Moves `amount` and records a `Transfer`. Fails on a short balance.
    fn transfer_internal(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<(), Error>;
    fn approve_internal(
        &mut self,
        owner: AccountId,
        spender: AccountId,
        amount: Balance,
    ) -> Result<(), Error>;
}

/// The subset of a constant-product DEX router used by sweeps.
pub trait SwapRouter {
    fn get_amounts_out(
        &self,
        amount_in: Balance,
        path: Vec<AccountId>,
    ) -> Result<Vec<Balance>, Error>;

    fn swap_exact_tokens_for_native(
        &mut self,
        amount_in: Balance,
        min_out: Balance,
        path: Vec<AccountId>,
        to: AccountId,
        deadline: Timestamp,
    ) -> Result<(), Error>;

    /// `value` is the native amount sent along with the call. Returns the
    /// native amount the pool actually took; the rest is refunded.
    #[allow(clippy::too_many_arguments)]
    fn add_liquidity_native(
        &mut self,
        token: AccountId,
        amount_token: Balance,
        min_token: Balance,
        min_native: Balance,
        to: AccountId,
        deadline: Timestamp,
        value: Balance,
    ) -> Result<Balance, Error>;
}

/// Execution environment.
pub trait Host {
    fn caller(&self) -> AccountId;
    /// The token contract's own account.
    fn this(&self) -> AccountId;
    fn block_number(&self) -> BlockNumber;
    fn timestamp(&self) -> Timestamp;
    fn native_balance(&self) -> Balance;
    fn transfer_native(&mut self, to: AccountId, value: Balance) -> Result<(), Error>;
    fn emit(&mut self, event: EngineEvent);
}

/// Engine-owned state and per-account flags.
pub trait EngineStorage {
    fn state(&self) -> &EngineState;
    fn state_mut(&mut self) -> &mut EngineState;
    fn fee_exempt(&self, account: AccountId) -> bool;
    fn set_fee_exempt(&mut self, account: AccountId, excluded: bool);
    fn blacklisted(&self, account: AccountId) -> bool;
    fn set_blacklisted(&mut self, account: AccountId, blacklisted: bool);
    /// In-sweep guard. Must be visible to re-entrant calls.
    fn swapping(&self) -> bool;
    fn set_swapping(&mut self, swapping: bool);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    AdaptiveFeesUpdated {
        buy_fee: Bp10,
        sell_fee: Bp10,
    },
    ExcludeFromFees {
        account: AccountId,
        is_excluded: bool,
    },
    FeeWalletUpdated {
        new_wallet: AccountId,
        old_wallet: AccountId,
    },
    LiquidityWalletUpdated {
        new_wallet: AccountId,
        old_wallet: AccountId,
    },
    SwapAndLiquify {
        tokens_swapped: Balance,
        native_received: Balance,
        tokens_into_liquidity: Balance,
    },
    NativeTransfer {
        to: AccountId,
        value: Balance,
    },
    FeesUpdated {
        marketing_fee: Bp10,
        liquidity_fee: Bp10,
        buy_fee: Bp10,
        sell_fee: Bp10,
    },
    TradingOpened {
        block: BlockNumber,
        dead_blocks: u32,
    },
    BlacklistUpdated {
        account: AccountId,
        blacklisted: bool,
    },
    SwapThresholdUpdated {
        previous: Balance,
        updated: Balance,
    },
}

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct EngineState {
    pub owner: AccountId,
    pub router: AccountId,
    pub pair: AccountId,
    pub wrapped_native: AccountId,
    pub fee_wallet: AccountId,
    pub liquidity_wallet: AccountId,
    pub fees: FeeConfig,
    pub adaptive: AdaptiveConfig,
    pub premium: AdaptiveState,
    pub gate: TradingGate,
    pub swap: SwapSettings,
    pub tokens_for_marketing: Balance,
    pub tokens_for_liquidity: Balance,
}

impl EngineState {
    pub fn new(
        owner: AccountId,
        router: AccountId,
        pair: AccountId,
        wrapped_native: AccountId,
        total_supply: Balance,
    ) -> Self {
        Self {
            owner,
            router,
            pair,
            wrapped_native,
            fee_wallet: owner,
            liquidity_wallet: owner,
            fees: FeeConfig::default(),
            adaptive: AdaptiveConfig::default(),
            premium: AdaptiveState::default(),
            gate: TradingGate::default(),
            swap: SwapSettings::initial(total_supply),
            tokens_for_marketing: 0,
            tokens_for_liquidity: 0,
        }
    }

    /// `(buy, sell)` rates currently charged, premium included.
    pub fn effective_fees(&self) -> (Bp10, Bp10) {
        (
            self.fees.effective_buy(),
            self.fees.effective_sell(self.premium.premium()),
        )
    }

    fn adaptive_event(&self) -> EngineEvent {
        let (buy_fee, sell_fee) = self.effective_fees();
        EngineEvent::AdaptiveFeesUpdated { buy_fee, sell_fee }
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

pub trait Engine: Ledger + SwapRouter + Host + EngineStorage {
    fn ensure_owner(&self) -> Result<(), Error> {
        if self.caller() != self.state().owner {
            return Err(Error::NotOwner);
        }
        Ok(())
    }

    /// Gate, optional sweep, tax and delivery for one transfer.
    fn process_transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<(), Error> {
        if amount == 0 {
            return self.transfer_internal(from, to, 0);
        }
        if self.balance_of(from) < amount {
            return Err(Error::InsufficientBalance);
        }

        let direction = Direction::classify(from, to, self.state().pair);
        let exempt = self.swapping() || self.fee_exempt(from) || self.fee_exempt(to);
        let now = self.block_number();
        let verdict = self.state().gate.check_transfer_allowed(
            direction,
            exempt,
            self.blacklisted(from),
            now,
        )?;
        if verdict == Verdict::AllowAndBlacklist && !self.blacklisted(to) {
            self.set_blacklisted(to, true);
            self.emit(EngineEvent::BlacklistUpdated {
                account: to,
                blacklisted: true,
            });
        }

        let taxed = !exempt && direction != Direction::Plain;
        if taxed && direction == Direction::Sell && self.should_sweep() {
            self.swap_back(false)?;
        }

        let quote = if taxed {
            let state = self.state();
            compute_fee(direction, amount, &state.fees, state.premium.premium())?
        } else {
            FeeQuote::default()
        };
        if quote.tax > 0 {
            let this = self.this();
            self.transfer_internal(from, this, quote.tax)?;
            let state = self.state_mut();
            state.tokens_for_marketing = state
                .tokens_for_marketing
                .checked_add(quote.marketing_share)
                .ok_or(Error::Overflow)?;
            state.tokens_for_liquidity = state
                .tokens_for_liquidity
                .checked_add(quote.liquidity_share)
                .ok_or(Error::Overflow)?;
        }
        self.transfer_internal(from, to, quote.net(amount))?;

        if taxed {
            self.update_adaptive(direction);
        }
        Ok(())
    }

    fn should_sweep(&self) -> bool {
        let swap = &self.state().swap;
        swap.enabled && !self.swapping() && self.balance_of(self.this()) >= swap.threshold
    }

    fn update_adaptive(&mut self, direction: Direction) {
        let state = self.state_mut();
        let config = state.adaptive;
        if state.premium.apply(direction, &config) {
            let event = state.adaptive_event();
            self.emit(event);
        }
    }

    /// Sweeps collected tax. `force` converts the whole balance.
    fn swap_back(&mut self, force: bool) -> Result<(), Error> {
        let balance = self.balance_of(self.this());
        let amount = if force {
            balance
        } else {
            self.state().swap.sweep_cap(balance)
        };
        if amount == 0 {
            return if force {
                Err(Error::ZeroSweepBalance)
            } else {
                Ok(())
            };
        }

        self.set_swapping(true);
        let result = self.execute_sweep(amount);
        self.set_swapping(false);
        result
    }

    fn execute_sweep(&mut self, amount: Balance) -> Result<(), Error> {
        let this = self.this();
        let state = self.state();
        let (router, wrapped_native) = (state.router, state.wrapped_native);
        let (fee_wallet, liquidity_wallet) = (state.fee_wallet, state.liquidity_wallet);
        let plan = SweepPlan::new(amount, state.tokens_for_liquidity, state.tokens_for_marketing)?;

        self.approve_internal(this, router, amount)?;

        let path = Vec::from([this, wrapped_native]);
        let quote = self
            .get_amounts_out(plan.swap_tokens, path.clone())?
            .last()
            .copied()
            .ok_or(Error::RouterCallFailed)?;
        let min_out = SweepPlan::min_native_out(quote)?;
        let deadline = self.timestamp().saturating_add(SWAP_DEADLINE_MS);

        let before = self.native_balance();
        self.swap_exact_tokens_for_native(plan.swap_tokens, min_out, path, this, deadline)?;
        let received = self.native_balance().saturating_sub(before);

        let native_for_liquidity = plan.native_for_liquidity(received)?;
        let mut native_used = 0;
        if plan.liquidity_tokens > 0 && native_for_liquidity > 0 {
            native_used = self.add_liquidity_native(
                this,
                plan.liquidity_tokens,
                0,
                0,
                liquidity_wallet,
                deadline,
                native_for_liquidity,
            )?;
        }
        self.emit(EngineEvent::SwapAndLiquify {
            tokens_swapped: plan.swap_tokens,
            native_received: received,
            tokens_into_liquidity: plan.liquidity_tokens,
        });

        let payout = received.saturating_sub(native_used);
        if payout > 0 {
            self.transfer_native(fee_wallet, payout)?;
            self.emit(EngineEvent::NativeTransfer {
                to: fee_wallet,
                value: payout,
            });
        }

        let (liquidity, marketing) = plan.consumed();
        let state = self.state_mut();
        state.tokens_for_liquidity = state.tokens_for_liquidity.saturating_sub(liquidity);
        state.tokens_for_marketing = state.tokens_for_marketing.saturating_sub(marketing);
        Ok(())
    }

    // ── Owner operations ──────────────────────────────────────────────────────

    fn update_fees(
        &mut self,
        marketing_fee: Bp10,
        liquidity_fee: Bp10,
        buy_fee: Bp10,
        sell_fee: Bp10,
    ) -> Result<(), Error> {
        self.ensure_owner()?;
        let fees = FeeConfig::new(marketing_fee, liquidity_fee, buy_fee, sell_fee)?;
        let state = self.state_mut();
        state.fees = fees;
        let adaptive = state.adaptive_event();
        self.emit(EngineEvent::FeesUpdated {
            marketing_fee,
            liquidity_fee,
            buy_fee,
            sell_fee,
        });
        self.emit(adaptive);
        Ok(())
    }

    fn update_adaptive_sell_fee(
        &mut self,
        increase_step: Bp10,
        max_premium: Bp10,
    ) -> Result<(), Error> {
        self.ensure_owner()?;
        let config = AdaptiveConfig::new(increase_step, max_premium)?;
        let state = self.state_mut();
        state.adaptive = config;
        state.premium.clamp_to(max_premium);
        let event = state.adaptive_event();
        self.emit(event);
        Ok(())
    }

    fn reset_adaptive_fees(&mut self) -> Result<(), Error> {
        self.ensure_owner()?;
        let state = self.state_mut();
        state.premium.reset();
        let event = state.adaptive_event();
        self.emit(event);
        Ok(())
    }

    fn update_swap_tokens_at_amount(&mut self, amount: Balance) -> Result<(), Error> {
        self.ensure_owner()?;
        validate_threshold(amount, self.total_supply())?;
        let swap = &mut self.state_mut().swap;
        let previous = swap.threshold;
        swap.threshold = amount;
        self.emit(EngineEvent::SwapThresholdUpdated {
            previous,
            updated: amount,
        });
        Ok(())
    }

    fn update_swap_enabled(&mut self, enabled: bool) -> Result<(), Error> {
        self.ensure_owner()?;
        self.state_mut().swap.enabled = enabled;
        Ok(())
    }

    fn exclude_from_fees(&mut self, account: AccountId, excluded: bool) -> Result<(), Error> {
        self.ensure_owner()?;
        self.set_fee_exempt(account, excluded);
        self.emit(EngineEvent::ExcludeFromFees {
            account,
            is_excluded: excluded,
        });
        Ok(())
    }

    fn update_fee_wallet(&mut self, new_wallet: AccountId) -> Result<(), Error> {
        self.ensure_owner()?;
        let old_wallet = core::mem::replace(&mut self.state_mut().fee_wallet, new_wallet);
        self.emit(EngineEvent::FeeWalletUpdated {
            new_wallet,
            old_wallet,
        });
        Ok(())
    }

    fn update_liquidity_wallet(&mut self, new_wallet: AccountId) -> Result<(), Error> {
        self.ensure_owner()?;
        let old_wallet = core::mem::replace(&mut self.state_mut().liquidity_wallet, new_wallet);
        self.emit(EngineEvent::LiquidityWalletUpdated {
            new_wallet,
            old_wallet,
        });
        Ok(())
    }

    fn force_swap(&mut self) -> Result<(), Error> {
        self.ensure_owner()?;
        if self.swapping() {
            return Err(Error::SweepInProgress);
        }
        self.swap_back(true)
    }

    fn open_trade(
        &mut self,
        dead_blocks: u32,
        swap_low: Balance,
        swap_high: Balance,
    ) -> Result<(), Error> {
        self.ensure_owner()?;
        if self.state().gate.is_open() {
            return Err(Error::AlreadyOpen);
        }
        validate_range(swap_low, swap_high, self.total_supply())?;
        let block = self.block_number();
        let state = self.state_mut();
        state.gate.open(block, dead_blocks)?;
        state.swap.threshold = swap_low;
        state.swap.max_amount = swap_high;
        state.swap.enabled = true;
        self.emit(EngineEvent::TradingOpened { block, dead_blocks });
        Ok(())
    }

    fn remove_from_blacklist(&mut self, account: AccountId) -> Result<(), Error> {
        self.ensure_owner()?;
        self.set_blacklisted(account, false);
        self.emit(EngineEvent::BlacklistUpdated {
            account,
            blacklisted: false,
        });
        Ok(())
    }
}

impl<T: Ledger + SwapRouter + Host + EngineStorage> Engine for T {}
