//! In-memory chain for engine tests: a token ledger, native balances and a
//! single constant-product pool behind a router that pulls tokens back
//! through the engine, the way the on-chain router re-enters
//! `transfer_from`.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    engine::{Engine, EngineEvent, EngineState, EngineStorage, Host, Ledger, SwapRouter},
    errors::Error,
    math::mul_div,
    AccountId, Balance, BlockNumber, Timestamp,
};

pub const UNIT: Balance = 1_000_000_000_000_000_000;

pub fn account(byte: u8) -> AccountId {
    AccountId::from([byte; 32])
}

/// Uniswap v2 output for `amount_in` with the 0.3 % pool fee.
pub fn amount_out(
    amount_in: Balance,
    reserve_in: Balance,
    reserve_out: Balance,
) -> Result<Balance, Error> {
    if amount_in == 0 || reserve_in == 0 || reserve_out == 0 {
        return Err(Error::RouterCallFailed);
    }
    let with_fee = amount_in.checked_mul(997).ok_or(Error::Overflow)?;
    let denominator = reserve_in
        .checked_mul(1_000)
        .and_then(|r| r.checked_add(with_fee))
        .ok_or(Error::Overflow)?;
    mul_div(with_fee, reserve_out, denominator)
}

pub struct MockChain {
    pub caller: AccountId,
    pub block: BlockNumber,
    pub now: Timestamp,
    pub events: Vec<EngineEvent>,
    pub transfers: Vec<(AccountId, AccountId, Balance)>,
    /// Guard value seen by each token pull the router made.
    pub reentries: Vec<bool>,
    pub router_fails: bool,
    token: AccountId,
    supply: Balance,
    balances: BTreeMap<AccountId, Balance>,
    allowances: BTreeMap<(AccountId, AccountId), Balance>,
    native: BTreeMap<AccountId, Balance>,
    lp: BTreeMap<AccountId, Balance>,
    excluded: BTreeSet<AccountId>,
    blacklist: BTreeSet<AccountId>,
    swapping: bool,
    state: EngineState,
}

impl MockChain {
    /// Whole supply minted to the owner, who is also the caller.
    pub fn deploy(supply: Balance) -> Self {
        let owner = account(1);
        let token = account(100);
        let state = EngineState::new(owner, account(102), account(101), account(103), supply);
        Self {
            caller: owner,
            block: 1,
            now: 1_000_000,
            events: Vec::new(),
            transfers: Vec::new(),
            reentries: Vec::new(),
            router_fails: false,
            token,
            supply,
            balances: BTreeMap::from([(owner, supply)]),
            allowances: BTreeMap::new(),
            native: BTreeMap::new(),
            lp: BTreeMap::new(),
            excluded: BTreeSet::from([owner, token]),
            blacklist: BTreeSet::new(),
            swapping: false,
            state,
        }
    }

    pub fn native_of(&self, account: AccountId) -> Balance {
        self.native.get(&account).copied().unwrap_or(0)
    }

    pub fn lp_of(&self, account: AccountId) -> Balance {
        self.lp.get(&account).copied().unwrap_or(0)
    }

    /// Owner deposits both sides of the pool.
    pub fn seed_liquidity(&mut self, tokens: Balance, native: Balance) -> Result<(), Error> {
        let (owner, pair) = (self.state.owner, self.state.pair);
        self.process_transfer(owner, pair, tokens)?;
        *self.native.entry(pair).or_default() += native;
        Ok(())
    }

    /// Tokens the pool pays out for `native_in`, before tax.
    pub fn quote_buy(&self, native_in: Balance) -> Result<Balance, Error> {
        let pair = self.state.pair;
        amount_out(native_in, self.native_of(pair), self.balance_of(pair))
    }

    pub fn buy(&mut self, buyer: AccountId, native_in: Balance) -> Result<(), Error> {
        let pair = self.state.pair;
        let out = self.quote_buy(native_in)?;
        self.process_transfer(pair, buyer, out)?;
        *self.native.entry(pair).or_default() += native_in;
        Ok(())
    }

    /// Sends tokens into the pool. Proceeds are not paid back out.
    pub fn sell(&mut self, seller: AccountId, amount: Balance) -> Result<(), Error> {
        let pair = self.state.pair;
        self.process_transfer(seller, pair, amount)
    }

    fn move_native(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<(), Error> {
        let held = self.native_of(from);
        if held < value {
            return Err(Error::NativeTransferFailed);
        }
        self.native.insert(from, held - value);
        *self.native.entry(to).or_default() += value;
        Ok(())
    }

    /// Router-side `transfer_from`: spends the allowance, then re-enters the
    /// token's transfer path.
    fn pull(&mut self, from: AccountId, to: AccountId, amount: Balance) -> Result<(), Error> {
        let key = (from, self.state.router);
        let allowed = self.allowances.get(&key).copied().unwrap_or(0);
        if allowed < amount {
            return Err(Error::InsufficientAllowance);
        }
        self.allowances.insert(key, allowed - amount);
        self.reentries.push(self.swapping);
        self.process_transfer(from, to, amount)
    }

    fn check_path(&self, path: &[AccountId]) -> Result<(), Error> {
        if self.router_fails || path != [self.token, self.state.wrapped_native] {
            return Err(Error::RouterCallFailed);
        }
        Ok(())
    }
}

impl Ledger for MockChain {
    fn total_supply(&self) -> Balance {
        self.supply
    }

    fn balance_of(&self, owner: AccountId) -> Balance {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    fn transfer_internal(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<(), Error> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance);
        }
        self.balances.insert(from, from_balance - amount);
        *self.balances.entry(to).or_default() += amount;
        self.transfers.push((from, to, amount));
        Ok(())
    }

    fn approve_internal(
        &mut self,
        owner: AccountId,
        spender: AccountId,
        amount: Balance,
    ) -> Result<(), Error> {
        self.allowances.insert((owner, spender), amount);
        Ok(())
    }
}

impl SwapRouter for MockChain {
    fn get_amounts_out(
        &self,
        amount_in: Balance,
        path: Vec<AccountId>,
    ) -> Result<Vec<Balance>, Error> {
        self.check_path(&path)?;
        let pair = self.state.pair;
        let out = amount_out(amount_in, self.balance_of(pair), self.native_of(pair))?;
        Ok(vec![amount_in, out])
    }

    fn swap_exact_tokens_for_native(
        &mut self,
        amount_in: Balance,
        min_out: Balance,
        path: Vec<AccountId>,
        to: AccountId,
        deadline: Timestamp,
    ) -> Result<(), Error> {
        self.check_path(&path)?;
        if self.now > deadline {
            return Err(Error::RouterCallFailed);
        }
        let pair = self.state.pair;
        let reserve_in = self.balance_of(pair);
        let reserve_out = self.native_of(pair);
        self.pull(self.token, pair, amount_in)?;
        let received = self.balance_of(pair) - reserve_in;
        let out = amount_out(received, reserve_in, reserve_out)?;
        if out < min_out {
            return Err(Error::RouterCallFailed);
        }
        self.move_native(pair, to, out)
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
        if self.router_fails || token != self.token || self.now > deadline {
            return Err(Error::RouterCallFailed);
        }
        let (pair, router) = (self.state.pair, self.state.router);
        self.move_native(self.token, router, value)?;

        let reserve_token = self.balance_of(pair);
        let reserve_native = self.native_of(pair);
        let native_optimal = mul_div(amount_token, reserve_native, reserve_token)?;
        let (amount_token, amount_native) = if native_optimal <= value {
            (amount_token, native_optimal)
        } else {
            (mul_div(value, reserve_token, reserve_native)?, value)
        };
        if amount_token < min_token || amount_native < min_native {
            return Err(Error::RouterCallFailed);
        }

        self.pull(self.token, pair, amount_token)?;
        self.move_native(router, pair, amount_native)?;
        self.move_native(router, self.token, value - amount_native)?;
        *self.lp.entry(to).or_default() += amount_native;
        Ok(amount_native)
    }
}

impl Host for MockChain {
    fn caller(&self) -> AccountId {
        self.caller
    }

    fn this(&self) -> AccountId {
        self.token
    }

    fn block_number(&self) -> BlockNumber {
        self.block
    }

    fn timestamp(&self) -> Timestamp {
        self.now
    }

    fn native_balance(&self) -> Balance {
        self.native_of(self.token)
    }

    fn transfer_native(&mut self, to: AccountId, value: Balance) -> Result<(), Error> {
        self.move_native(self.token, to, value)
    }

    fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }
}

impl EngineStorage for MockChain {
    fn state(&self) -> &EngineState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EngineState {
        &mut self.state
    }

    fn fee_exempt(&self, account: AccountId) -> bool {
        self.excluded.contains(&account)
    }

    fn set_fee_exempt(&mut self, account: AccountId, excluded: bool) {
        if excluded {
            self.excluded.insert(account);
        } else {
            self.excluded.remove(&account);
        }
    }

    fn blacklisted(&self, account: AccountId) -> bool {
        self.blacklist.contains(&account)
    }

    fn set_blacklisted(&mut self, account: AccountId, blacklisted: bool) {
        if blacklisted {
            self.blacklist.insert(account);
        } else {
            self.blacklist.remove(&account);
        }
    }

    fn swapping(&self) -> bool {
        self.swapping
    }

    fn set_swapping(&mut self, swapping: bool) {
        self.swapping = swapping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_output_includes_fee() {
        // 1:1 pool, 1 % of reserves in
        let out = amount_out(1_000, 100_000, 100_000).unwrap();
        assert_eq!(out, 987);
        assert_eq!(amount_out(0, 1, 1), Err(Error::RouterCallFailed));
    }

    #[test]
    fn router_pull_needs_allowance() {
        let mut chain = MockChain::deploy(1_000 * UNIT);
        let (owner, pair) = (account(1), account(101));
        assert_eq!(chain.pull(owner, pair, UNIT), Err(Error::InsufficientAllowance));
        chain.approve_internal(owner, account(102), UNIT).unwrap();
        chain.pull(owner, pair, UNIT).unwrap();
        assert_eq!(chain.balance_of(pair), UNIT);
    }
}
