//! Provider enum for type-safe handling of external contribution sources.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supported contribution-data providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// GitHub (REST profile + GraphQL contribution calendar).
    #[sea_orm(string_value = "github")]
    GitHub,
    /// LeetCode (single GraphQL endpoint).
    #[sea_orm(string_value = "leetcode")]
    LeetCode,
}

impl Provider {
    /// All providers, in a stable order.
    pub const ALL: [Provider; 2] = [Provider::GitHub, Provider::LeetCode];
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::GitHub => write!(f, "github"),
            Provider::LeetCode => write!(f, "leetcode"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(Provider::GitHub),
            "leetcode" => Ok(Provider::LeetCode),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_display() {
        assert_eq!(Provider::GitHub.to_string(), "github");
        assert_eq!(Provider::LeetCode.to_string(), "leetcode");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("github".parse::<Provider>().unwrap(), Provider::GitHub);
        assert_eq!("GitHub".parse::<Provider>().unwrap(), Provider::GitHub);
        assert_eq!("leetcode".parse::<Provider>().unwrap(), Provider::LeetCode);
        assert!("gitlab".parse::<Provider>().is_err());
    }

    #[test]
    fn test_all_is_exhaustive() {
        assert_eq!(Provider::ALL.len(), Provider::iter().count());
    }
}
