use serde::Serialize;

use crate::types::StatementType;

/// One rankable metric: the public key, where it is stored, and what it means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub ranking_key: &'static str,
    pub statement_type: StatementType,
    /// Column in the statement's fact table. Only ever interpolated into SQL
    /// from this table, never from request input.
    pub column: &'static str,
    pub description: &'static str,
}

impl CatalogEntry {
    pub fn table(&self) -> &'static str {
        self.statement_type.table_name()
    }
}

const fn entry(
    ranking_key: &'static str,
    statement_type: StatementType,
    description: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        ranking_key,
        statement_type,
        column: ranking_key,
        description,
    }
}

use StatementType::{BalanceSheet, CashFlow, IncomeStatement};

static CATALOG: &[CatalogEntry] = &[
    // Cash flow statement
    entry("operating_cash_flow", CashFlow, "Cash flow from operating activities ranking"),
    entry("free_cash_flow", CashFlow, "Free cash flow ranking"),
    entry("net_change_in_cash", CashFlow, "Net change in cash and cash equivalents ranking"),
    // Income statement
    entry("revenue", IncomeStatement, "Revenue ranking"),
    entry("gross_profit", IncomeStatement, "Gross profit ranking"),
    entry("operating_expenses", IncomeStatement, "Operating expenses ranking"),
    entry("operating_income", IncomeStatement, "Operating income ranking"),
    entry("net_income", IncomeStatement, "Net income ranking"),
    entry("gross_profit_pct", IncomeStatement, "Gross profit as % of revenue ranking"),
    entry("sales_expenses_pct", IncomeStatement, "Sales expenses as % of revenue ranking"),
    entry(
        "administrative_expenses_pct",
        IncomeStatement,
        "Administrative expenses as % of revenue ranking",
    ),
    entry(
        "research_and_development_expenses_pct",
        IncomeStatement,
        "R&D expenses as % of revenue ranking",
    ),
    entry("operating_expenses_pct", IncomeStatement, "Operating expenses as % of revenue ranking"),
    entry("operating_income_pct", IncomeStatement, "Operating income as % of revenue ranking"),
    entry("net_income_pct", IncomeStatement, "Net income as % of revenue ranking"),
    entry("cost_of_revenue_pct", IncomeStatement, "Cost of revenue as % of revenue ranking"),
    // Balance sheet
    entry("cash_and_equivalents", BalanceSheet, "Cash and cash equivalents ranking"),
    entry("short_term_investments", BalanceSheet, "Short-term investments ranking"),
    entry(
        "accounts_receivable_and_notes",
        BalanceSheet,
        "Accounts and notes receivable ranking",
    ),
    entry("inventory", BalanceSheet, "Inventory ranking"),
    entry("current_assets", BalanceSheet, "Current assets ranking"),
    entry("fixed_assets_total", BalanceSheet, "Fixed assets ranking"),
    entry("total_assets", BalanceSheet, "Total assets ranking"),
    entry(
        "cash_and_equivalents_pct",
        BalanceSheet,
        "Cash and cash equivalents as % of total assets ranking",
    ),
    entry(
        "short_term_investments_pct",
        BalanceSheet,
        "Short-term investments as % of total assets ranking",
    ),
    entry(
        "accounts_receivable_and_notes_pct",
        BalanceSheet,
        "Accounts and notes receivable as % of total assets ranking",
    ),
    entry("inventory_pct", BalanceSheet, "Inventory as % of total assets ranking"),
    entry("current_assets_pct", BalanceSheet, "Current assets as % of total assets ranking"),
    entry("fixed_assets_total_pct", BalanceSheet, "Fixed assets as % of total assets ranking"),
    entry(
        "other_non_current_assets_pct",
        BalanceSheet,
        "Other non-current assets as % of total assets ranking",
    ),
];

pub fn lookup(ranking_key: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.ranking_key == ranking_key)
}

/// Every entry, in declaration order.
pub fn list_all() -> &'static [CatalogEntry] {
    CATALOG
}

pub fn for_statement(statement_type: StatementType) -> impl Iterator<Item = &'static CatalogEntry> {
    CATALOG.iter().filter(move |e| e.statement_type == statement_type)
}

pub fn ranking_keys() -> Vec<&'static str> {
    CATALOG.iter().map(|e| e.ranking_key).collect()
}
