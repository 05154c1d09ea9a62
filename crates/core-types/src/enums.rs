use crate::error::CoreError;
use crate::structs::Window;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The part an instrument plays in a crash report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentRole {
    /// The benchmark every sector is compared against.
    Index,
    Sector,
}

/// One of the market crashes the tool knows how to analyse.
///
/// Serialized as the bare calendar year so it reads naturally in `config.toml`
/// and in JSON reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum CrashYear {
    GlobalFinancialCrisis,
    Covid,
    RateShock,
}

impl CrashYear {
    pub const ALL: [CrashYear; 3] = [
        CrashYear::GlobalFinancialCrisis,
        CrashYear::Covid,
        CrashYear::RateShock,
    ];

    /// Returns the calendar year of the crash.
    pub fn year(&self) -> i32 {
        match self {
            CrashYear::GlobalFinancialCrisis => 2008,
            CrashYear::Covid => 2020,
            CrashYear::RateShock => 2022,
        }
    }

    /// The analysis window around the crash: the year before through the end of the crash year.
    pub fn window(&self) -> Result<Window, CoreError> {
        Window::around_year(self.year())
    }
}

impl TryFrom<i32> for CrashYear {
    type Error = CoreError;

    fn try_from(year: i32) -> Result<Self, Self::Error> {
        CrashYear::ALL
            .into_iter()
            .find(|c| c.year() == year)
            .ok_or(CoreError::UnsupportedCrashYear(year))
    }
}

impl From<CrashYear> for i32 {
    fn from(crash: CrashYear) -> Self {
        crash.year()
    }
}

impl FromStr for CrashYear {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year = s
            .trim()
            .parse::<i32>()
            .map_err(|e| CoreError::InvalidInput("crash year".to_string(), e.to_string()))?;
        CrashYear::try_from(year)
    }
}

impl fmt::Display for CrashYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.year())
    }
}
