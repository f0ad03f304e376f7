use serde::Serialize;

use crate::config::ANNUAL_QUARTER;
use crate::rules::ValidationError;
use crate::types::{StatementType, StoragePeriod, UserPeriod};

/// Storage periods each statement type is published under.
pub fn allowed_periods(statement: StatementType) -> &'static [StoragePeriod] {
    match statement {
        StatementType::CashFlow => &[StoragePeriod::Accumulated],
        StatementType::BalanceSheet => &[StoragePeriod::Quarterly],
        StatementType::IncomeStatement => &[StoragePeriod::Quarterly, StoragePeriod::Accumulated],
    }
}

/// `annual → accumulated`, `quarterly → quarterly`.
pub fn normalize_period(user_period: &str) -> Result<StoragePeriod, ValidationError> {
    match UserPeriod::parse(user_period) {
        Some(UserPeriod::Annual) => Ok(StoragePeriod::Accumulated),
        Some(UserPeriod::Quarterly) => Ok(StoragePeriod::Quarterly),
        None => Err(ValidationError::InvalidPeriod(user_period.to_string())),
    }
}

/// Accumulated figures are only published as of Q4; quarterly ones need an explicit quarter.
pub fn default_quarter_for(period: StoragePeriod) -> Option<u8> {
    match period {
        StoragePeriod::Accumulated => Some(ANNUAL_QUARTER),
        StoragePeriod::Quarterly => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub user_period: UserPeriod,
    pub storage_period: StoragePeriod,
    pub quarter: u8,
}

/// Validates quarter, period and statement compatibility, in that order.
pub fn resolve_period(
    statement: StatementType,
    user_period: &str,
    quarter: Option<i64>,
) -> Result<ResolvedPeriod, ValidationError> {
    if let Some(q) = quarter {
        if !(1..=4).contains(&q) {
            return Err(ValidationError::QuarterOutOfRange(q));
        }
    }

    match (UserPeriod::parse(user_period), quarter) {
        (Some(UserPeriod::Quarterly), None) => return Err(ValidationError::MissingQuarter),
        (Some(UserPeriod::Annual), Some(q)) if q != i64::from(ANNUAL_QUARTER) => {
            return Err(ValidationError::InvalidAnnualQuarter(q))
        }
        _ => {}
    }

    let storage_period = normalize_period(user_period)?;
    let allowed = allowed_periods(statement);
    if !allowed.contains(&storage_period) {
        return Err(ValidationError::IncompatiblePeriod {
            statement,
            requested: storage_period,
            allowed,
        });
    }

    // Range-checked above; quarterly always carries one by now.
    let quarter = match default_quarter_for(storage_period) {
        Some(q) => q,
        None => quarter.map(|q| q as u8).ok_or(ValidationError::MissingQuarter)?,
    };

    Ok(ResolvedPeriod {
        user_period: storage_period.user_period(),
        storage_period,
        quarter,
    })
}

/// Compatibility table entry as exposed by the rules listing.
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityRule {
    pub statement_type: StatementType,
    pub table: &'static str,
    pub supported_periods: Vec<UserPeriod>,
    pub quarter_rule: &'static str,
    pub description: &'static str,
}

pub fn compatibility_rules() -> Vec<CompatibilityRule> {
    StatementType::ALL
        .into_iter()
        .map(|statement| {
            let (quarter_rule, description) = match statement {
                StatementType::CashFlow => (
                    "quarter is always 4",
                    "Cash flow statements are only published as annual figures",
                ),
                StatementType::IncomeStatement => (
                    "quarterly requires a quarter (1-4); annual always uses quarter 4",
                    "Income statements support both quarterly and annual figures",
                ),
                StatementType::BalanceSheet => (
                    "a quarter (1-4) is required",
                    "Balance sheets are only published as quarterly snapshots",
                ),
            };
            CompatibilityRule {
                statement_type: statement,
                table: statement.table_name(),
                supported_periods: allowed_periods(statement)
                    .iter()
                    .map(|p| p.user_period())
                    .collect(),
                quarter_rule,
                description,
            }
        })
        .collect()
}
