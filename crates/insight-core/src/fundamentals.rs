//! Fundamental data and financial statement types

use serde::{Deserialize, Serialize};

/// Valuation fundamentals for a single instrument
///
/// Every field is nullable: a provider may omit any metric, and absence
/// means "unknown", not zero. The indicator engine passes these through
/// untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsSnapshot {
    /// Price / trailing-twelve-month earnings
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    /// Price / analyst-estimated forward earnings
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    /// Price / book value per share
    #[serde(rename = "priceToBook")]
    pub price_to_book: Option<f64>,
}

/// One quarterly income statement row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyIncome {
    /// Fiscal period label, usually an ISO date such as `2024-03-31`
    pub period: String,
    pub total_revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
}

/// Financial statements for an instrument
///
/// Currently only quarterly income statements are carried; rows are ordered
/// most recent first, matching the provider's reporting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub income_quarterly: Vec<QuarterlyIncome>,
}

impl FinancialStatements {
    /// Whether no statement data is available
    pub fn is_empty(&self) -> bool {
        self.income_quarterly.is_empty()
    }

    /// The `count` most recent quarters
    pub fn recent_quarters(&self, count: usize) -> &[QuarterlyIncome] {
        &self.income_quarterly[..self.income_quarterly.len().min(count)]
    }
}
