//! Money types: amounts in minor units and the currencies they belong to
//!
//! Amounts never carry floating point. A checkout prices everything in
//! the minor units of the project currency, so sums and products are
//! exact and the only rounding happens when user input or an fx rate
//! produces more precision than the currency has.

use crate::{PledgeError, PledgeResult};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Amount of money in minor units (cents, pence, yen...)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Amount(pub u64);

impl Amount {
    pub fn new(minor: u64) -> Self {
        Self(minor)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    /// Amount of `major` whole units in a currency
    pub fn from_major(major: u64, currency: Currency) -> Self {
        Self(major.saturating_mul(currency.major_unit()))
    }

    pub fn minor(&self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiply by an item quantity
    pub fn checked_mul(self, quantity: NonZeroU32) -> Option<Self> {
        self.0.checked_mul(u64::from(quantity.get())).map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::zero(), Amount::saturating_add)
    }
}

/// Currencies a project can be priced in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Cad,
    Aud,
    Nzd,
    Gbp,
    Eur,
    Chf,
    Dkk,
    Nok,
    Sek,
    Hkd,
    Sgd,
    Mxn,
    Jpy,
}

impl Currency {
    pub const ALL: [Currency; 14] = [
        Currency::Usd,
        Currency::Cad,
        Currency::Aud,
        Currency::Nzd,
        Currency::Gbp,
        Currency::Eur,
        Currency::Chf,
        Currency::Dkk,
        Currency::Nok,
        Currency::Sek,
        Currency::Hkd,
        Currency::Sgd,
        Currency::Mxn,
        Currency::Jpy,
    ];

    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Nzd => "NZD",
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
            Currency::Chf => "CHF",
            Currency::Dkk => "DKK",
            Currency::Nok => "NOK",
            Currency::Sek => "SEK",
            Currency::Hkd => "HKD",
            Currency::Sgd => "SGD",
            Currency::Mxn => "MXN",
            Currency::Jpy => "JPY",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Cad => "CA$",
            Currency::Aud => "AU$",
            Currency::Nzd => "NZ$",
            Currency::Gbp => "£",
            Currency::Eur => "€",
            Currency::Chf => "CHF ",
            Currency::Dkk => "DKK ",
            Currency::Nok => "NOK ",
            Currency::Sek => "SEK ",
            Currency::Hkd => "HK$",
            Currency::Sgd => "S$",
            Currency::Mxn => "MX$",
            Currency::Jpy => "¥",
        }
    }

    /// Number of decimal places in the minor unit
    pub fn precision(&self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Minor units per whole unit
    pub fn major_unit(&self) -> u64 {
        10u64.pow(self.precision())
    }

    /// Amount as a floating point number of whole units
    pub fn to_major(&self, amount: Amount) -> f64 {
        amount.0 as f64 / self.major_unit() as f64
    }

    /// Parse a decimal string into minor units.
    ///
    /// Digits past the currency precision are rounded half up. A leading
    /// `-` yields [`PledgeError::NegativeAmount`] so callers can clamp it;
    /// anything else that is not a plain decimal is malformed.
    pub fn parse_amount(&self, raw: &str) -> PledgeResult<Amount> {
        let trimmed = raw.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(PledgeError::MalformedAmount(raw.to_string()));
        }
        if negative {
            return Err(PledgeError::NegativeAmount(raw.to_string()));
        }

        let precision = self.precision() as usize;
        let whole_value: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| PledgeError::Overflow)?
        };

        let kept: String = fraction.chars().take(precision).collect();
        let fraction_value: u64 = if precision == 0 {
            0
        } else {
            format!("{:0<width$}", kept, width = precision)
                .parse()
                .map_err(|_| PledgeError::MalformedAmount(raw.to_string()))?
        };
        let round_up = fraction
            .as_bytes()
            .get(precision)
            .is_some_and(|digit| *digit >= b'5');

        whole_value
            .checked_mul(self.major_unit())
            .and_then(|minor| minor.checked_add(fraction_value))
            .and_then(|minor| minor.checked_add(u64::from(round_up)))
            .map(Amount)
            .ok_or(PledgeError::Overflow)
    }

    /// Render an amount as a plain decimal string ("414.00", "1200")
    pub fn to_decimal_string(&self, amount: Amount) -> String {
        let precision = self.precision() as usize;
        if precision == 0 {
            return amount.0.to_string();
        }
        let unit = self.major_unit();
        format!(
            "{}.{:0width$}",
            amount.0 / unit,
            amount.0 % unit,
            width = precision
        )
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = PledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| PledgeError::UnknownCurrency(s.to_string()))
    }
}

/// An amount tagged with its currency, for display at the edges
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Amount,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: Amount, currency: Currency) -> Self {
        Self { amount, currency }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            self.currency.symbol(),
            self.currency.to_decimal_string(self.amount)
        )
    }
}

/// Round a non-negative value half up to `precision` decimal places,
/// returning the result in minor units.
///
/// Negative and non-finite values round to zero.
pub fn round_half_up(value: f64, precision: u32) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let scaled = value * 10f64.powi(precision as i32);
    // Absorbs representation error such as 1.005 * 100 == 100.49999...
    (scaled + 0.5 + 1e-7).floor() as u64
}
