use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Statement type
// ---------------------------------------------------------------------------

/// Which fact table a metric lives in. Determines the period compatibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    CashFlow,
    IncomeStatement,
    BalanceSheet,
}

impl StatementType {
    pub const ALL: [StatementType; 3] = [
        StatementType::CashFlow,
        StatementType::IncomeStatement,
        StatementType::BalanceSheet,
    ];

    /// Fact table holding rows of this statement type.
    pub fn table_name(self) -> &'static str {
        match self {
            StatementType::CashFlow => "Cash_Flow_Statements",
            StatementType::IncomeStatement => "Income_Statements",
            StatementType::BalanceSheet => "Balance_Sheets",
        }
    }

    /// Public name used in query strings (`statement_type=cash_flow`).
    pub fn as_str(self) -> &'static str {
        match self {
            StatementType::CashFlow => "cash_flow",
            StatementType::IncomeStatement => "income_statement",
            StatementType::BalanceSheet => "balance_sheet",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for StatementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Report periods
// ---------------------------------------------------------------------------

/// Period vocabulary exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserPeriod {
    Quarterly,
    Annual,
}

impl UserPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            UserPeriod::Quarterly => "quarterly",
            UserPeriod::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quarterly" => Some(UserPeriod::Quarterly),
            "annual" => Some(UserPeriod::Annual),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Period vocabulary stored in the `report_type` column of the fact tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoragePeriod {
    Quarterly,
    Accumulated,
}

impl StoragePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            StoragePeriod::Quarterly => "quarterly",
            StoragePeriod::Accumulated => "accumulated",
        }
    }

    /// The user-facing name this storage period is requested as.
    pub fn user_period(self) -> UserPeriod {
        match self {
            StoragePeriod::Quarterly => UserPeriod::Quarterly,
            StoragePeriod::Accumulated => UserPeriod::Annual,
        }
    }
}

impl std::fmt::Display for StoragePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_type_round_trips_through_public_name() {
        for t in StatementType::ALL {
            assert_eq!(StatementType::parse(t.as_str()), Some(t));
        }
        assert_eq!(StatementType::parse("Cash_Flow_Statements"), None);
    }

    #[test]
    fn storage_period_maps_back_to_user_vocabulary() {
        assert_eq!(StoragePeriod::Accumulated.user_period(), UserPeriod::Annual);
        assert_eq!(StoragePeriod::Quarterly.user_period(), UserPeriod::Quarterly);
        assert_eq!(StoragePeriod::Accumulated.to_string(), "accumulated");
    }
}
