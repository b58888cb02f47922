#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub type AccountId = <ink::env::DefaultEnvironment as ink::env::Environment>::AccountId;
pub type Balance = <ink::env::DefaultEnvironment as ink::env::Environment>::Balance;
pub type BlockNumber = <ink::env::DefaultEnvironment as ink::env::Environment>::BlockNumber;
pub type Timestamp = <ink::env::DefaultEnvironment as ink::env::Environment>::Timestamp;

/// Fee units: 1 = 0.1 %, 1 000 = 100 %.
pub type Bp10 = u32;

pub mod adaptive;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod fees;
pub mod gate;
pub mod math;
pub mod treasury;

#[cfg(test)]
mod mock;

#[ink::contract]
mod adaptive_token {
    use ink::codegen::Env as _;
    use ink::env::call::{build_call, ExecutionInput, Selector};
    use ink::env::{CallFlags, DefaultEnvironment};
    use ink::prelude::{string::String, vec::Vec};
    use ink::storage::{Lazy, Mapping};

    use crate::{
        adaptive::AdaptiveConfig,
        constants::DECIMALS,
        engine::{Engine, EngineEvent, EngineState, EngineStorage, Host, Ledger, SwapRouter},
        errors::Error,
        fees::FeeConfig,
        Bp10,
    };

    /// Router messages answer with a fieldless error enum, read here by index.
    type RouterResult<T> = core::result::Result<T, u8>;

    #[ink(storage)]
    pub struct AdaptiveToken {
        name: String,
        symbol: String,
        total_supply: Balance,
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
        excluded_from_fees: Mapping<AccountId, bool>,
        blacklist: Mapping<AccountId, bool>,
        engine: EngineState,
        /// Written straight to storage so router re-entry sees it.
        swapping: Lazy<bool>,
    }

    // =====================================================================
    // EVENTS
    // =====================================================================

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)] from: Option<AccountId>,
        #[ink(topic)] to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)] owner: AccountId,
        #[ink(topic)] spender: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct AdaptiveFeesUpdated {
        buy_fee: Bp10,
        sell_fee: Bp10,
    }

    #[ink(event)]
    pub struct ExcludeFromFees {
        #[ink(topic)] account: AccountId,
        is_excluded: bool,
    }

    #[ink(event)]
    pub struct FeeWalletUpdated {
        #[ink(topic)] new_wallet: AccountId,
        #[ink(topic)] old_wallet: AccountId,
    }

    #[ink(event)]
    pub struct LiquidityWalletUpdated {
        #[ink(topic)] new_wallet: AccountId,
        #[ink(topic)] old_wallet: AccountId,
    }

    #[ink(event)]
    pub struct SwapAndLiquify {
        tokens_swapped: Balance,
        native_received: Balance,
        tokens_into_liquidity: Balance,
    }

    #[ink(event)]
    pub struct NativeTransfer {
        #[ink(topic)] to: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct FeesUpdated {
        marketing_fee: Bp10,
        liquidity_fee: Bp10,
        buy_fee: Bp10,
        sell_fee: Bp10,
    }

    #[ink(event)]
    pub struct TradingOpened {
        block: BlockNumber,
        dead_blocks: u32,
    }

    #[ink(event)]
    pub struct BlacklistUpdated {
        #[ink(topic)] account: AccountId,
        blacklisted: bool,
    }

    #[ink(event)]
    pub struct SwapThresholdUpdated {
        previous: Balance,
        updated: Balance,
    }

    impl AdaptiveToken {
        /// Mints `total_supply` to the deployer, who becomes owner, fee wallet
        /// and liquidity wallet.
        #[ink(constructor)]
        pub fn new(
            total_supply: Balance,
            name: String,
            symbol: String,
            router: AccountId,
            pair: AccountId,
            wrapped_native: AccountId,
        ) -> Self {
            let caller = Self::env().caller();
            let mut balances = Mapping::default();
            balances.insert(caller, &total_supply);

            let mut excluded_from_fees = Mapping::default();
            excluded_from_fees.insert(caller, &true);
            excluded_from_fees.insert(Self::env().account_id(), &true);

            Self::env().emit_event(Transfer {
                from: None,
                to: Some(caller),
                value: total_supply,
            });

            Self {
                name,
                symbol,
                total_supply,
                balances,
                allowances: Mapping::default(),
                excluded_from_fees,
                blacklist: Mapping::default(),
                engine: EngineState::new(caller, router, pair, wrapped_native, total_supply),
                swapping: Lazy::default(),
            }
        }

        // =================================================================
        // PSP22
        // =================================================================

        #[ink(message)]
        pub fn name(&self) -> String {
            self.name.clone()
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            self.symbol.clone()
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            DECIMALS
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<(), Error> {
            let owner = self.env().caller();
            self.approve_internal(owner, spender, value)
        }

        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, value: Balance) -> Result<(), Error> {
            let from = self.env().caller();
            self.process_transfer(from, to, value)
        }

        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            let caller = self.env().caller();
            let allowance = self.allowance(from, caller);
            if allowance < value {
                return Err(Error::InsufficientAllowance);
            }
            self.allowances.insert((from, caller), &(allowance - value));
            self.process_transfer(from, to, value)
        }

        // =================================================================
        // OWNER
        // =================================================================

        #[ink(message)]
        pub fn update_fees(
            &mut self,
            marketing_fee: Bp10,
            liquidity_fee: Bp10,
            buy_fee: Bp10,
            sell_fee: Bp10,
        ) -> Result<(), Error> {
            reported(Engine::update_fees(
                self,
                marketing_fee,
                liquidity_fee,
                buy_fee,
                sell_fee,
            ))
        }

        #[ink(message)]
        pub fn update_adaptive_sell_fee(&mut self, increase: Bp10, max: Bp10) -> Result<(), Error> {
            reported(Engine::update_adaptive_sell_fee(self, increase, max))
        }

        #[ink(message)]
        pub fn reset_adaptive_fees(&mut self) -> Result<(), Error> {
            Engine::reset_adaptive_fees(self)
        }

        #[ink(message)]
        pub fn update_swap_tokens_at_amount(&mut self, amount: Balance) -> Result<(), Error> {
            reported(Engine::update_swap_tokens_at_amount(self, amount))
        }

        #[ink(message)]
        pub fn update_swap_enabled(&mut self, enabled: bool) -> Result<(), Error> {
            Engine::update_swap_enabled(self, enabled)
        }

        #[ink(message)]
        pub fn exclude_from_fees(&mut self, account: AccountId, excluded: bool) -> Result<(), Error> {
            Engine::exclude_from_fees(self, account, excluded)
        }

        #[ink(message)]
        pub fn update_fee_wallet(&mut self, new_wallet: AccountId) -> Result<(), Error> {
            Engine::update_fee_wallet(self, new_wallet)
        }

        #[ink(message)]
        pub fn update_liquidity_wallet(&mut self, new_wallet: AccountId) -> Result<(), Error> {
            Engine::update_liquidity_wallet(self, new_wallet)
        }

        #[ink(message)]
        pub fn force_swap(&mut self) -> Result<(), Error> {
            Engine::force_swap(self)
        }

        #[ink(message)]
        pub fn open_trade(
            &mut self,
            dead_blocks: u32,
            swap_low: Balance,
            swap_high: Balance,
        ) -> Result<(), Error> {
            reported(Engine::open_trade(self, dead_blocks, swap_low, swap_high))
        }

        #[ink(message)]
        pub fn remove_from_blacklist(&mut self, account: AccountId) -> Result<(), Error> {
            Engine::remove_from_blacklist(self, account)
        }

        // =================================================================
        // VIEW FUNCTIONS
        // =================================================================

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.engine.owner
        }

        #[ink(message)]
        pub fn fees(&self) -> FeeConfig {
            self.engine.fees
        }

        /// `(buy, sell)` rates currently charged.
        #[ink(message)]
        pub fn effective_fees(&self) -> (Bp10, Bp10) {
            self.engine.effective_fees()
        }

        #[ink(message)]
        pub fn adaptive_config(&self) -> AdaptiveConfig {
            self.engine.adaptive
        }

        #[ink(message)]
        pub fn adaptive_premium(&self) -> Bp10 {
            self.engine.premium.premium()
        }

        #[ink(message)]
        pub fn swap_tokens_at_amount(&self) -> Balance {
            self.engine.swap.threshold
        }

        #[ink(message)]
        pub fn max_swap_amount(&self) -> Balance {
            self.engine.swap.max_amount
        }

        #[ink(message)]
        pub fn swap_enabled(&self) -> bool {
            self.engine.swap.enabled
        }

        #[ink(message)]
        pub fn is_trading_open(&self) -> bool {
            self.engine.gate.is_open()
        }

        #[ink(message)]
        pub fn opened_at_block(&self) -> Option<BlockNumber> {
            self.engine.gate.opened_at()
        }

        #[ink(message)]
        pub fn dead_blocks(&self) -> u32 {
            self.engine.gate.dead_blocks()
        }

        #[ink(message)]
        pub fn is_blacklisted(&self, account: AccountId) -> bool {
            self.blacklisted(account)
        }

        #[ink(message)]
        pub fn is_excluded_from_fees(&self, account: AccountId) -> bool {
            self.fee_exempt(account)
        }

        #[ink(message)]
        pub fn fee_wallet(&self) -> AccountId {
            self.engine.fee_wallet
        }

        #[ink(message)]
        pub fn liquidity_wallet(&self) -> AccountId {
            self.engine.liquidity_wallet
        }

        #[ink(message)]
        pub fn pair(&self) -> AccountId {
            self.engine.pair
        }

        #[ink(message)]
        pub fn router(&self) -> AccountId {
            self.engine.router
        }

        /// Collected tax not yet swept, as `(marketing, liquidity)`.
        #[ink(message)]
        pub fn tokens_for_fees(&self) -> (Balance, Balance) {
            (
                self.engine.tokens_for_marketing,
                self.engine.tokens_for_liquidity,
            )
        }
    }

    // =====================================================================
    // ENGINE BINDINGS
    // =====================================================================

    impl Ledger for AdaptiveToken {
        fn total_supply(&self) -> Balance {
            self.total_supply
        }

        fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(owner).unwrap_or(0)
        }

        fn transfer_internal(
            &mut self,
            from: AccountId,
            to: AccountId,
            amount: Balance,
        ) -> Result<(), Error> {
            let from_bal = self.balances.get(from).unwrap_or(0);
            if from_bal < amount {
                return Err(Error::InsufficientBalance);
            }
            self.balances.insert(from, &(from_bal - amount));
            let to_bal = self.balances.get(to).unwrap_or(0);
            let to_bal = to_bal.checked_add(amount).ok_or(Error::Overflow)?;
            self.balances.insert(to, &to_bal);

            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value: amount,
            });
            Ok(())
        }

        fn approve_internal(
            &mut self,
            owner: AccountId,
            spender: AccountId,
            amount: Balance,
        ) -> Result<(), Error> {
            self.allowances.insert((owner, spender), &amount);
            self.env().emit_event(Approval {
                owner,
                spender,
                value: amount,
            });
            Ok(())
        }
    }

    impl Host for AdaptiveToken {
        fn caller(&self) -> AccountId {
            self.env().caller()
        }

        fn this(&self) -> AccountId {
            self.env().account_id()
        }

        fn block_number(&self) -> BlockNumber {
            self.env().block_number()
        }

        fn timestamp(&self) -> Timestamp {
            self.env().block_timestamp()
        }

        fn native_balance(&self) -> Balance {
            self.env().balance()
        }

        fn transfer_native(&mut self, to: AccountId, value: Balance) -> Result<(), Error> {
            self.env().transfer(to, value).map_err(|_| Error::NativeTransferFailed)
        }

        fn emit(&mut self, event: EngineEvent) {
            let env = self.env();
            match event {
                EngineEvent::AdaptiveFeesUpdated { buy_fee, sell_fee } => {
                    env.emit_event(AdaptiveFeesUpdated { buy_fee, sell_fee })
                }
                EngineEvent::ExcludeFromFees {
                    account,
                    is_excluded,
                } => env.emit_event(ExcludeFromFees {
                    account,
                    is_excluded,
                }),
                EngineEvent::FeeWalletUpdated {
                    new_wallet,
                    old_wallet,
                } => env.emit_event(FeeWalletUpdated {
                    new_wallet,
                    old_wallet,
                }),
                EngineEvent::LiquidityWalletUpdated {
                    new_wallet,
                    old_wallet,
                } => env.emit_event(LiquidityWalletUpdated {
                    new_wallet,
                    old_wallet,
                }),
                EngineEvent::SwapAndLiquify {
                    tokens_swapped,
                    native_received,
                    tokens_into_liquidity,
                } => env.emit_event(SwapAndLiquify {
                    tokens_swapped,
                    native_received,
                    tokens_into_liquidity,
                }),
                EngineEvent::NativeTransfer { to, value } => {
                    env.emit_event(NativeTransfer { to, value })
                }
                EngineEvent::FeesUpdated {
                    marketing_fee,
                    liquidity_fee,
                    buy_fee,
                    sell_fee,
                } => env.emit_event(FeesUpdated {
                    marketing_fee,
                    liquidity_fee,
                    buy_fee,
                    sell_fee,
                }),
                EngineEvent::TradingOpened { block, dead_blocks } => {
                    env.emit_event(TradingOpened { block, dead_blocks })
                }
                EngineEvent::BlacklistUpdated {
                    account,
                    blacklisted,
                } => env.emit_event(BlacklistUpdated {
                    account,
                    blacklisted,
                }),
                EngineEvent::SwapThresholdUpdated { previous, updated } => {
                    env.emit_event(SwapThresholdUpdated { previous, updated })
                }
            }
        }
    }

    impl EngineStorage for AdaptiveToken {
        fn state(&self) -> &EngineState {
            &self.engine
        }

        fn state_mut(&mut self) -> &mut EngineState {
            &mut self.engine
        }

        fn fee_exempt(&self, account: AccountId) -> bool {
            self.excluded_from_fees.get(account).unwrap_or(false)
        }

        fn set_fee_exempt(&mut self, account: AccountId, excluded: bool) {
            self.excluded_from_fees.insert(account, &excluded);
        }

        fn blacklisted(&self, account: AccountId) -> bool {
            self.blacklist.get(account).unwrap_or(false)
        }

        fn set_blacklisted(&mut self, account: AccountId, blacklisted: bool) {
            if blacklisted {
                self.blacklist.insert(account, &true);
            } else {
                self.blacklist.remove(account);
            }
        }

        fn swapping(&self) -> bool {
            self.swapping.get().unwrap_or(false)
        }

        fn set_swapping(&mut self, swapping: bool) {
            self.swapping.set(&swapping);
        }
    }

    /// Logs why a configuration update was rejected.
    fn reported(result: Result<(), Error>) -> Result<(), Error> {
        if let Err(error) = &result {
            if let Some(reason) = error.reason() {
                ink::env::debug_println!("update rejected: {}", reason);
            }
        }
        result
    }

    // =====================================================================
    // INTERNAL — Router Cross-Contract Calls
    // =====================================================================

    /// Collapses the three failure layers of a router call into one error.
    fn router_outcome<T>(
        call: &str,
        result: core::result::Result<ink::MessageResult<RouterResult<T>>, ink::env::Error>,
    ) -> Result<T, Error> {
        match result {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(code))) => {
                ink::env::debug_println!("router {} rejected with code {}", call, code);
                Err(Error::RouterCallFailed)
            }
            Ok(Err(lang)) => {
                ink::env::debug_println!("router {} dispatch failed: {:?}", call, lang);
                Err(Error::RouterCallFailed)
            }
            Err(env) => {
                ink::env::debug_println!("router {} call failed: {:?}", call, env);
                Err(Error::RouterCallFailed)
            }
        }
    }

    impl SwapRouter for AdaptiveToken {
        fn get_amounts_out(
            &self,
            amount_in: Balance,
            path: Vec<AccountId>,
        ) -> Result<Vec<Balance>, Error> {
            let result = build_call::<DefaultEnvironment>()
                .call(self.engine.router)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("get_amounts_out")))
                        .push_arg(amount_in)
                        .push_arg(path),
                )
                .returns::<RouterResult<Vec<Balance>>>()
                .try_invoke();
            router_outcome("get_amounts_out", result)
        }

        fn swap_exact_tokens_for_native(
            &mut self,
            amount_in: Balance,
            min_out: Balance,
            path: Vec<AccountId>,
            to: AccountId,
            deadline: Timestamp,
        ) -> Result<(), Error> {
            // the router pulls our tokens back through `transfer_from`
            let result = build_call::<DefaultEnvironment>()
                .call(self.engine.router)
                .call_flags(CallFlags::ALLOW_REENTRY)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!(
                        "swap_exact_tokens_for_native_supporting_fee_on_transfer_tokens"
                    )))
                    .push_arg(amount_in)
                    .push_arg(min_out)
                    .push_arg(path)
                    .push_arg(to)
                    .push_arg(deadline),
                )
                .returns::<RouterResult<()>>()
                .try_invoke();
            router_outcome("swap_exact_tokens_for_native", result)
        }

        fn add_liquidity_native(
            &mut self,
            token: AccountId,
            amount_token: Balance,
            min_token: Balance,
            min_native: Balance,
            to: AccountId,
            deadline: Timestamp,
            value: Balance,
        ) -> Result<Balance, Error> {
            let result = build_call::<DefaultEnvironment>()
                .call(self.engine.router)
                .call_flags(CallFlags::ALLOW_REENTRY)
                .transferred_value(value)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("add_liquidity_native")))
                        .push_arg(token)
                        .push_arg(amount_token)
                        .push_arg(min_token)
                        .push_arg(min_native)
                        .push_arg(to)
                        .push_arg(deadline),
                )
                .returns::<RouterResult<(Balance, Balance, Balance)>>()
                .try_invoke();
            // (amount_token, amount_native, liquidity)
            let (_, amount_native, _) = router_outcome("add_liquidity_native", result)?;
            Ok(amount_native)
        }
    }

}
