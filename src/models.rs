// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Immutable classification of an account; "savings" accounts are the ones
/// aggregated by the milestone engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountPurpose {
    Salary,
    FixedExpense,
    DatingFund,
    Savings,
    Flexible,
    HousingFund,
}

impl AccountPurpose {
    pub const ALL: [AccountPurpose; 6] = [
        AccountPurpose::Salary,
        AccountPurpose::FixedExpense,
        AccountPurpose::DatingFund,
        AccountPurpose::Savings,
        AccountPurpose::Flexible,
        AccountPurpose::HousingFund,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountPurpose::Salary => "salary",
            AccountPurpose::FixedExpense => "fixed_expense",
            AccountPurpose::DatingFund => "dating_fund",
            AccountPurpose::Savings => "savings",
            AccountPurpose::Flexible => "flexible",
            AccountPurpose::HousingFund => "housing_fund",
        }
    }
}

impl FromStr for AccountPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountPurpose::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown account purpose '{}'", s))
    }
}

impl fmt::Display for AccountPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub bank: Option<String>,
    pub purpose: AccountPurpose,
    pub sort_order: i64,
}

/// One observed balance per account per day; the engine only keeps the
/// latest snapshot per account per calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub id: i64,
    pub account_id: i64,
    pub recorded_at: NaiveDate,
    pub balance: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopTemplate {
    pub id: i64,
    pub step_key: String,
    pub step_label: String,
    pub due_day: u32,
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
    pub default_amount: Option<Decimal>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusType {
    SigningBonus,
    YearEndBonus,
    Other,
}

impl BonusType {
    pub const ALL: [BonusType; 3] = [
        BonusType::SigningBonus,
        BonusType::YearEndBonus,
        BonusType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BonusType::SigningBonus => "signing_bonus",
            BonusType::YearEndBonus => "year_end_bonus",
            BonusType::Other => "other",
        }
    }
}

impl FromStr for BonusType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BonusType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown bonus type '{}'", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusEvent {
    pub id: i64,
    pub r#type: BonusType,
    pub label: String,
    pub amount: Decimal,
    pub expected_date: NaiveDate,
    pub is_received: bool,
    pub actual_amount: Option<Decimal>,
    pub target_account_id: Option<i64>,
    pub note: Option<String>,
}

impl BonusEvent {
    /// Amount the plan counts for this event: the recorded actual once
    /// received, the expectation until then.
    pub fn effective_amount(&self) -> Decimal {
        if self.is_received {
            self.actual_amount.unwrap_or(self.amount)
        } else {
            self.amount
        }
    }
}

/// Only the most recently effective config is authoritative; effective_from
/// also fixes the first month of the milestone series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryConfig {
    pub id: i64,
    pub monthly_gross: Decimal,
    pub housing_fund_rate: Decimal,
    pub housing_fund_base: Option<Decimal>,
    pub social_insurance: Decimal,
    pub special_deductions: Decimal,
    pub effective_from: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    OnTrack,
    Exceeded,
    Missed,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::OnTrack => "on_track",
            MilestoneStatus::Exceeded => "exceeded",
            MilestoneStatus::Missed => "missed",
        }
    }
}

impl FromStr for MilestoneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MilestoneStatus::Pending),
            "on_track" => Ok(MilestoneStatus::OnTrack),
            "exceeded" => Ok(MilestoneStatus::Exceeded),
            "missed" => Ok(MilestoneStatus::Missed),
            _ => Err(format!("unknown milestone status '{}'", s)),
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per month, keyed by year_month; owned exclusively by the
/// regeneration engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMilestone {
    pub id: i64,
    pub year_month: String,
    pub planned_savings: Decimal,
    pub planned_total_savings: Decimal,
    pub actual_savings: Option<Decimal>,
    pub actual_total_savings: Option<Decimal>,
    pub status: MilestoneStatus,
}
