//! Prices

use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency used to display totals of carts with no line items.
pub fn default_currency() -> &'static Currency {
    iso::USD
}

/// Errors that can occur while converting or totalling prices.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// The price carries a currency code that is not an ISO 4217 currency.
    #[error("unknown currency code {0:?}")]
    UnknownCurrency(String),

    /// Two prices in the same total use different currencies (expected, found).
    #[error("cannot total {1} with {0}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A line-item price in minor units (cents, pence) and its ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    amount: i64,
    currency: String,
}

impl Price {
    /// Creates a new price from a minor-unit amount and an ISO currency code.
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Creates a price in US dollars.
    pub fn usd(amount: i64) -> Self {
        Self::new(amount, iso::USD.iso_alpha_code)
    }

    /// Amount in minor units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// ISO currency code as sent by the backend.
    pub fn currency_code(&self) -> &str {
        &self.currency
    }

    /// Whether this line item can be bought without paying.
    pub fn is_free(&self) -> bool {
        self.amount == 0
    }

    /// Convert into a currency-aware money value.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::UnknownCurrency`] when the currency code is not recognised.
    pub fn to_money(&self) -> Result<Money<'static, Currency>, PriceError> {
        let currency = iso::find(&self.currency)
            .ok_or_else(|| PriceError::UnknownCurrency(self.currency.clone()))?;

        Ok(Money::from_minor(self.amount, currency))
    }

    /// Display string, e.g. `$3.00`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::UnknownCurrency`] when the currency code is not recognised.
    pub fn formatted(&self) -> Result<String, PriceError> {
        Ok(self.to_money()?.to_string())
    }
}

/// Sums prices that must all share one currency.
///
/// An empty iterator totals zero in the [`default_currency`].
///
/// # Errors
///
/// - [`PriceError::UnknownCurrency`]: a price has an unrecognised currency code.
/// - [`PriceError::CurrencyMismatch`]: prices use more than one currency.
/// - [`PriceError::Money`]: wrapped money arithmetic error.
pub fn total_price<'a>(
    prices: impl IntoIterator<Item = &'a Price>,
) -> Result<Money<'static, Currency>, PriceError> {
    let mut prices = prices.into_iter();

    let Some(first) = prices.next() else {
        return Ok(Money::from_minor(0, default_currency()));
    };

    let first = first.to_money()?;
    let currency = first.currency();

    prices.try_fold(first, |acc, price| {
        let money = price.to_money()?;

        if money.currency() != currency {
            return Err(PriceError::CurrencyMismatch(
                currency.iso_alpha_code,
                money.currency().iso_alpha_code,
            ));
        }

        Ok(acc.add(money)?)
    })
}
