// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! China individual income tax, cumulative-withholding method.
//!
//! Monthly taxable income = gross - social insurance - housing fund
//! - 5000 (statutory threshold) - special deductions; the applicable
//! bracket is looked up on the year-to-date cumulative taxable income and
//! the month's withholding is the increment over tax already withheld.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::utils::{round2, round_whole};

/// Statutory monthly pre-tax threshold, CNY.
const MONTHLY_THRESHOLD: i64 = 5000;

struct TaxBracket {
    /// Annual cumulative taxable ceiling; None for the top bracket.
    ceiling: Option<Decimal>,
    rate: Decimal,
    quick_deduction: Decimal,
}

static TAX_BRACKETS: Lazy<[TaxBracket; 7]> = Lazy::new(|| {
    let b = |ceiling: Option<i64>, rate_pct: i64, quick: i64| TaxBracket {
        ceiling: ceiling.map(Decimal::from),
        rate: Decimal::new(rate_pct, 2),
        quick_deduction: Decimal::from(quick),
    };
    [
        b(Some(36_000), 3, 0),
        b(Some(144_000), 10, 2_520),
        b(Some(300_000), 20, 16_920),
        b(Some(420_000), 25, 31_920),
        b(Some(660_000), 30, 52_920),
        b(Some(960_000), 35, 85_920),
        b(None, 45, 181_920),
    ]
});

/// Inputs are assumed finite and non-negative; validation is the caller's
/// job (the `salary set` command).
#[derive(Debug, Clone)]
pub struct TaxInput {
    pub monthly_gross: Decimal,
    pub social_insurance: Decimal,
    /// Percent, e.g. 12 for 12%.
    pub housing_fund_rate: Decimal,
    pub housing_fund_base: Option<Decimal>,
    pub special_deductions: Decimal,
}

impl From<&crate::models::SalaryConfig> for TaxInput {
    fn from(c: &crate::models::SalaryConfig) -> Self {
        TaxInput {
            monthly_gross: c.monthly_gross,
            social_insurance: c.social_insurance,
            housing_fund_rate: c.housing_fund_rate,
            housing_fund_base: c.housing_fund_base,
            special_deductions: c.special_deductions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyBreakdown {
    pub month: u32,
    pub gross: Decimal,
    pub social_insurance: Decimal,
    pub housing_fund: Decimal,
    pub taxable_income: Decimal,
    pub cumulative_taxable: Decimal,
    pub cumulative_tax: Decimal,
    pub monthly_tax: Decimal,
    pub net_income: Decimal,
    pub housing_fund_company: Decimal,
}

/// 12-month withholding forecast. Pure arithmetic, no side effects.
pub fn calculate_yearly_tax(input: &TaxInput) -> Vec<MonthlyBreakdown> {
    let base = input.housing_fund_base.unwrap_or(input.monthly_gross);
    // Contributions round to whole yuan; the company side mirrors the
    // individual amount.
    let housing_fund = round_whole(base * input.housing_fund_rate / Decimal::from(100));
    let housing_fund_company = housing_fund;

    let monthly_deduction = input.social_insurance
        + housing_fund
        + Decimal::from(MONTHLY_THRESHOLD)
        + input.special_deductions;

    let mut results = Vec::with_capacity(12);
    let mut cumulative_taxable = Decimal::ZERO;
    let mut cumulative_tax = Decimal::ZERO;

    for month in 1..=12u32 {
        let taxable_income = (input.monthly_gross - monthly_deduction).max(Decimal::ZERO);
        cumulative_taxable += taxable_income;

        let bracket = TAX_BRACKETS
            .iter()
            .find(|b| b.ceiling.is_none_or(|c| cumulative_taxable <= c))
            .unwrap_or(&TAX_BRACKETS[TAX_BRACKETS.len() - 1]);

        let new_cumulative_tax = cumulative_taxable * bracket.rate - bracket.quick_deduction;
        let monthly_tax = round2(new_cumulative_tax - cumulative_tax).max(Decimal::ZERO);
        cumulative_tax = new_cumulative_tax;

        results.push(MonthlyBreakdown {
            month,
            gross: input.monthly_gross,
            social_insurance: input.social_insurance,
            housing_fund,
            taxable_income,
            cumulative_taxable,
            cumulative_tax,
            monthly_tax,
            net_income: input.monthly_gross - input.social_insurance - housing_fund - monthly_tax,
            housing_fund_company,
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn input(gross: &str, si: &str, rate: &str, base: Option<&str>, special: &str) -> TaxInput {
        TaxInput {
            monthly_gross: dec(gross),
            social_insurance: dec(si),
            housing_fund_rate: dec(rate),
            housing_fund_base: base.map(dec),
            special_deductions: dec(special),
        }
    }

    #[test]
    fn housing_fund_rounds_to_whole_yuan() {
        // 10333 * 7% = 723.31 -> 723
        let rows = calculate_yearly_tax(&input("10333", "0", "7", None, "0"));
        assert_eq!(rows[0].housing_fund, dec("723"));
        assert_eq!(rows[0].housing_fund_company, dec("723"));
    }

    #[test]
    fn explicit_fund_base_overrides_gross() {
        let rows = calculate_yearly_tax(&input("30000", "0", "12", Some("20000"), "0"));
        assert_eq!(rows[0].housing_fund, dec("2400"));
    }

    #[test]
    fn below_threshold_pays_nothing() {
        let rows = calculate_yearly_tax(&input("4500", "0", "0", None, "0"));
        for r in &rows {
            assert_eq!(r.taxable_income, Decimal::ZERO);
            assert_eq!(r.monthly_tax, Decimal::ZERO);
            assert_eq!(r.net_income, dec("4500"));
        }
    }
}
