use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError}
};

use alloy_primitives::Address;
use auto_impl::auto_impl;
use cl_structure::{Amount, Coin};
use itertools::Itertools;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("{address} holds {available}{denom} but {required}{denom} is required")]
    InsufficientFunds { address: Address, denom: String, available: Amount, required: Amount },
    #[error("balance of {denom} for {address} overflows")]
    BalanceOverflow { address: Address, denom: String }
}

/// Token custody. A transfer either moves every coin or nothing.
#[auto_impl(&mut, Box)]
#[cfg_attr(test, mockall::automock)]
pub trait Bank {
    fn balance(&self, address: Address, denom: &str) -> Amount;

    fn send_coins(&mut self, from: Address, to: Address, coins: &[Coin]) -> Result<(), BankError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBank {
    balances: HashMap<(Address, String), Amount>
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, address: Address, coin: Coin) -> Result<(), BankError> {
        let balance = self.balances.entry((address, coin.denom.clone())).or_default();
        *balance = balance
            .checked_add(coin.amount)
            .ok_or(BankError::BalanceOverflow { address, denom: coin.denom })?;
        Ok(())
    }
}

impl Bank for MemoryBank {
    fn balance(&self, address: Address, denom: &str) -> Amount {
        self.balances
            .get(&(address, denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    fn send_coins(&mut self, from: Address, to: Address, coins: &[Coin]) -> Result<(), BankError> {
        // the same denom may appear more than once
        let totals = coins
            .iter()
            .filter(|coin| coin.amount > 0)
            .into_group_map_by(|coin| coin.denom.clone())
            .into_iter()
            .map(|(denom, coins)| {
                let total = coins
                    .iter()
                    .try_fold(0 as Amount, |acc, coin| acc.checked_add(coin.amount))
                    .ok_or(BankError::BalanceOverflow { address: to, denom: denom.clone() })?;
                Ok((denom, total))
            })
            .collect::<Result<Vec<_>, BankError>>()?;

        for (denom, required) in &totals {
            let available = self.balance(from, denom);
            if available < *required {
                return Err(BankError::InsufficientFunds {
                    address: from,
                    denom: denom.clone(),
                    available,
                    required: *required
                })
            }
            if from != to && self.balance(to, denom).checked_add(*required).is_none() {
                return Err(BankError::BalanceOverflow { address: to, denom: denom.clone() })
            }
        }

        if from == to {
            return Ok(())
        }

        for (denom, amount) in totals {
            *self.balances.entry((from, denom.clone())).or_default() -= amount;
            *self.balances.entry((to, denom)).or_default() += amount;
        }

        Ok(())
    }
}

/// Cloneable handle to one [`MemoryBank`], for ledgers that share custody.
#[derive(Debug, Clone, Default)]
pub struct SharedBank {
    inner: Arc<Mutex<MemoryBank>>
}

impl SharedBank {
    pub fn new(bank: MemoryBank) -> Self {
        Self { inner: Arc::new(Mutex::new(bank)) }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryBank> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mint(&self, address: Address, coin: Coin) -> Result<(), BankError> {
        self.lock().mint(address, coin)
    }
}

impl Bank for SharedBank {
    fn balance(&self, address: Address, denom: &str) -> Amount {
        self.lock().balance(address, denom)
    }

    fn send_coins(&mut self, from: Address, to: Address, coins: &[Coin]) -> Result<(), BankError> {
        self.lock().send_coins(from, to, coins)
    }
}
