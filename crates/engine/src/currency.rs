use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code attached to a trip and all of its money values.
///
/// A trip is mono-currency: every expense and every allocation inside it is
/// denominated in the trip currency, and the engine never converts between
/// currencies.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units**
/// (see `MoneyCents`). All supported currencies use 2 fraction digits, so
/// `10.50 USD` ⇄ `1050`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Npr,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Npr => "NPR",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Usd | Currency::Eur | Currency::Npr => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "NPR" => Ok(Currency::Npr),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
