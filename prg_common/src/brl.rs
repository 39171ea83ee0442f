use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const BRL_CURRENCY_CODE: &str = "BRL";

//--------------------------------------        Brl          ---------------------------------------------------------
/// An amount of Brazilian Real, held as a whole number of centavos.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Brl(i64);

impl Add for Brl {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Brl {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Brl {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in centavos: {0}")]
pub struct BrlConversionError(String);

impl From<i64> for Brl {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Brl {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Brl {}

impl FromStr for Brl {
    type Err = BrlConversionError;

    /// Parses decimal amounts of the form `12`, `12.3` or `12.34`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || BrlConversionError(s.to_string());
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut parts = digits.splitn(2, '.');
        let whole = parts.next().filter(|w| !w.is_empty()).ok_or_else(err)?;
        let whole = whole.parse::<i64>().map_err(|_| err())?;
        if whole < 0 {
            return Err(err());
        }
        let centavos = match parts.next() {
            None => 0,
            Some(frac) if frac.len() == 1 => frac.parse::<u32>().map_err(|_| err())? * 10,
            Some(frac) if frac.len() == 2 => frac.parse::<u32>().map_err(|_| err())?,
            Some(_) => return Err(err()),
        };
        let total = whole * 100 + i64::from(centavos);
        Ok(Self(if negative { -total } else { total }))
    }
}

impl Display for Brl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R$ {}", self.to_wire())
    }
}

impl Brl {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_centavos(centavos: i64) -> Self {
        Self(centavos)
    }

    pub fn from_reais(reais: i64) -> Self {
        Self(reais * 100)
    }

    /// The decimal string the charge API expects, e.g. `37.50`.
    pub fn to_wire(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let centavos = self.0.abs();
        format!("{sign}{}.{:02}", centavos / 100, centavos % 100)
    }
}
