//! Countries a project can launch from, with their pledge bounds

use crate::{Amount, Currency, PledgeError};
use serde::{Deserialize, Serialize};

/// Launch country of a project
///
/// The country fixes the project currency and the minimum and maximum
/// amount a single pledge may reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    US,
    CA,
    AU,
    NZ,
    GB,
    IE,
    DE,
    FR,
    NL,
    ES,
    IT,
    BE,
    AT,
    LU,
    DK,
    NO,
    SE,
    CH,
    HK,
    SG,
    MX,
    JP,
}

impl Country {
    pub const ALL: [Country; 22] = [
        Country::US,
        Country::CA,
        Country::AU,
        Country::NZ,
        Country::GB,
        Country::IE,
        Country::DE,
        Country::FR,
        Country::NL,
        Country::ES,
        Country::IT,
        Country::BE,
        Country::AT,
        Country::LU,
        Country::DK,
        Country::NO,
        Country::SE,
        Country::CH,
        Country::HK,
        Country::SG,
        Country::MX,
        Country::JP,
    ];

    /// ISO 3166 alpha-2 code
    pub fn code(&self) -> &'static str {
        match self {
            Country::US => "US",
            Country::CA => "CA",
            Country::AU => "AU",
            Country::NZ => "NZ",
            Country::GB => "GB",
            Country::IE => "IE",
            Country::DE => "DE",
            Country::FR => "FR",
            Country::NL => "NL",
            Country::ES => "ES",
            Country::IT => "IT",
            Country::BE => "BE",
            Country::AT => "AT",
            Country::LU => "LU",
            Country::DK => "DK",
            Country::NO => "NO",
            Country::SE => "SE",
            Country::CH => "CH",
            Country::HK => "HK",
            Country::SG => "SG",
            Country::MX => "MX",
            Country::JP => "JP",
        }
    }

    pub fn currency(&self) -> Currency {
        match self {
            Country::US => Currency::Usd,
            Country::CA => Currency::Cad,
            Country::AU => Currency::Aud,
            Country::NZ => Currency::Nzd,
            Country::GB => Currency::Gbp,
            Country::IE
            | Country::DE
            | Country::FR
            | Country::NL
            | Country::ES
            | Country::IT
            | Country::BE
            | Country::AT
            | Country::LU => Currency::Eur,
            Country::DK => Currency::Dkk,
            Country::NO => Currency::Nok,
            Country::SE => Currency::Sek,
            Country::CH => Currency::Chf,
            Country::HK => Currency::Hkd,
            Country::SG => Currency::Sgd,
            Country::MX => Currency::Mxn,
            Country::JP => Currency::Jpy,
        }
    }

    /// (minimum, maximum) pledge in whole currency units
    fn pledge_bounds(&self) -> (u64, u64) {
        match self {
            Country::US => (1, 10_000),
            Country::CA => (1, 13_000),
            Country::AU => (1, 13_000),
            Country::NZ => (1, 14_000),
            Country::GB => (1, 8_000),
            Country::IE
            | Country::DE
            | Country::FR
            | Country::NL
            | Country::ES
            | Country::IT
            | Country::BE
            | Country::AT
            | Country::LU => (1, 8_500),
            Country::DK => (5, 65_000),
            Country::NO => (5, 85_000),
            Country::SE => (5, 85_000),
            Country::CH => (1, 9_500),
            Country::HK => (10, 75_000),
            Country::SG => (2, 13_000),
            Country::MX => (10, 200_000),
            Country::JP => (100, 1_200_000),
        }
    }

    /// Smallest pledge accepted, in minor units of [`Country::currency`]
    pub fn min_pledge(&self) -> Amount {
        Amount::from_major(self.pledge_bounds().0, self.currency())
    }

    /// Largest pledge accepted, in minor units of [`Country::currency`]
    pub fn max_pledge(&self) -> Amount {
        Amount::from_major(self.pledge_bounds().1, self.currency())
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Country {
    type Err = PledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Country::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| PledgeError::UnknownCountry(s.to_string()))
    }
}
