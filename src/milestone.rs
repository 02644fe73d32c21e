// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Milestone regeneration: a 12-month planned-vs-actual savings forecast
//! rebuilt from scratch on every call and upserted by year_month.
//!
//! Forward targets project from a rolling anchor: whenever a month has an
//! observed savings-account total, that total becomes the new base and the
//! cumulative planned amount resets, so the forecast self-corrects each
//! time real data arrives.

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

use crate::error::CoachError;
use crate::models::{
    BonusEvent, BonusType, MilestoneStatus, MonthlyMilestone, SalaryConfig, SopTemplate,
};
use crate::utils::{month_key, round2, year_month};

/// Inputs to the pure scheduling pass, already gathered from the store.
pub struct SchedulePlan<'a> {
    /// Salary config effective_from; its (year, month) starts the series.
    pub start: NaiveDate,
    /// Fixed monthly baseline from active SOP templates into savings.
    pub fixed_monthly: Decimal,
    pub bonuses: &'a [BonusEvent],
    pub savings_accounts: &'a HashSet<i64>,
    /// year_month -> observed total savings balance (sparse).
    pub observed: &'a BTreeMap<String, Decimal>,
    /// year_months that already have a milestone row.
    pub existing_months: &'a HashSet<String>,
}

/// A computed month before it is written back.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneDraft {
    pub year_month: String,
    pub planned_savings: Decimal,
    pub planned_total_savings: Decimal,
    pub actual_savings: Option<Decimal>,
    pub actual_total_savings: Option<Decimal>,
    pub status: MilestoneStatus,
}

/// Sum of default amounts over active templates whose destination is a
/// savings account.
pub fn fixed_monthly_savings(templates: &[SopTemplate], savings: &HashSet<i64>) -> Decimal {
    templates
        .iter()
        .filter(|t| t.is_active)
        .filter(|t| t.to_account_id.is_some_and(|id| savings.contains(&id)))
        .filter_map(|t| t.default_amount)
        .sum()
}

/// Collapse snapshots (ordered by recorded_at ascending) to one total per
/// calendar month: the latest snapshot per account per month, summed
/// across accounts. Only months where at least one account was observed
/// appear in the result.
pub fn monthly_savings_balances(snapshots: &[(i64, NaiveDate, Decimal)]) -> BTreeMap<String, Decimal> {
    let mut per_account: HashMap<i64, BTreeMap<String, Decimal>> = HashMap::new();
    for (account_id, recorded_at, balance) in snapshots {
        // Ascending input order means a later snapshot in the same month
        // overwrites the earlier one.
        per_account
            .entry(*account_id)
            .or_default()
            .insert(year_month(*recorded_at), *balance);
    }

    let mut months: HashSet<&String> = HashSet::new();
    for m in per_account.values() {
        months.extend(m.keys());
    }

    let mut totals = BTreeMap::new();
    for ym in months {
        let total = per_account
            .values()
            .filter_map(|m| m.get(ym))
            .copied()
            .sum::<Decimal>();
        totals.insert(ym.clone(), total);
    }
    totals
}

/// The rolling-anchor reconciliation pass over the 12-month window.
pub fn build_schedule(plan: &SchedulePlan, today: NaiveDate) -> Vec<MilestoneDraft> {
    let current_ym = year_month(today);
    let (start_year, start_month) = (plan.start.year(), plan.start.month());

    // The earliest observed month seeds the anchor; with no history both
    // the anchor and the previous-balance tracker start at zero.
    let initial_baseline = plan
        .observed
        .values()
        .next()
        .copied()
        .unwrap_or(Decimal::ZERO);

    let mut anchor_balance = initial_baseline;
    let mut prev_balance = initial_baseline;
    let mut cumulative_from_anchor = Decimal::ZERO;
    let mut drafts = Vec::new();

    for i in 0..12 {
        let (year, month) = crate::utils::add_months(start_year, start_month, i);
        let ym = month_key(year, month);

        // Months already begun that never got a milestone row are left
        // alone, so no rows appear for months before the app was
        // configured. The current month counts as begun.
        if ym.as_str() <= current_ym.as_str() && !plan.existing_months.contains(&ym) {
            continue;
        }

        let mut planned = plan.fixed_monthly;
        for bonus in plan.bonuses {
            let lands_here = year_month(bonus.expected_date) == ym;
            let into_savings = bonus
                .target_account_id
                .is_some_and(|id| plan.savings_accounts.contains(&id));
            if lands_here && into_savings {
                planned += bonus.effective_amount();
            }
        }

        cumulative_from_anchor += planned;

        let (actual_savings, actual_total_savings, status) = match plan.observed.get(&ym) {
            Some(&balance) => {
                let delta = round2(balance - prev_balance);
                // An observation after unobserved months attributes the
                // whole multi-month delta to this single month. Kept as-is
                // for compatibility with existing milestone data.
                let status = match delta.cmp(&planned) {
                    Ordering::Greater => MilestoneStatus::Exceeded,
                    Ordering::Equal => MilestoneStatus::OnTrack,
                    Ordering::Less => MilestoneStatus::Missed,
                };
                anchor_balance = balance;
                prev_balance = balance;
                cumulative_from_anchor = Decimal::ZERO;
                (Some(delta), Some(balance), status)
            }
            None => (None, None, MilestoneStatus::Pending),
        };

        drafts.push(MilestoneDraft {
            year_month: ym,
            planned_savings: round2(planned),
            planned_total_savings: round2(anchor_balance + cumulative_from_anchor),
            actual_savings,
            actual_total_savings,
            status,
        });
    }

    drafts
}

/// Recompute the full 12-month series and upsert it, returning every
/// milestone row in chronological order. `today` is injected so callers
/// and tests control the skip boundary.
pub fn regenerate(
    conn: &mut Connection,
    today: NaiveDate,
) -> Result<Vec<MonthlyMilestone>, CoachError> {
    let config = latest_salary_config(conn)?.ok_or(CoachError::ConfigurationMissing)?;

    let savings_accounts = savings_account_ids(conn)?;
    let templates = active_templates(conn)?;
    let bonuses = all_bonuses(conn)?;
    let snapshots = savings_snapshots(conn)?;
    let existing_months = existing_milestone_months(conn)?;

    let observed = monthly_savings_balances(&snapshots);
    let fixed_monthly = fixed_monthly_savings(&templates, &savings_accounts);

    let plan = SchedulePlan {
        start: config.effective_from,
        fixed_monthly,
        bonuses: &bonuses,
        savings_accounts: &savings_accounts,
        observed: &observed,
        existing_months: &existing_months,
    };
    let drafts = build_schedule(&plan, today);

    upsert_milestones(conn, &drafts)?;

    all_milestones(conn)
}

/// The authoritative configuration: most recent by effective_from.
pub fn latest_salary_config(conn: &Connection) -> Result<Option<SalaryConfig>, CoachError> {
    conn.query_row(
        "SELECT id, monthly_gross, housing_fund_rate, housing_fund_base,
                social_insurance, special_deductions, effective_from, note
         FROM salary_configs ORDER BY effective_from DESC, id DESC LIMIT 1",
        [],
        |r| {
            Ok(SalaryConfig {
                id: r.get(0)?,
                monthly_gross: text_decimal(r, 1)?,
                housing_fund_rate: text_decimal(r, 2)?,
                housing_fund_base: opt_text_decimal(r, 3)?,
                social_insurance: text_decimal(r, 4)?,
                special_deductions: text_decimal(r, 5)?,
                effective_from: r.get(6)?,
                note: r.get(7)?,
            })
        },
    )
    .optional()
    .map_err(CoachError::read("salary configuration"))
}

fn savings_account_ids(conn: &Connection) -> Result<HashSet<i64>, CoachError> {
    let read = CoachError::read("accounts");
    let mut stmt = conn
        .prepare("SELECT id FROM accounts WHERE purpose='savings'")
        .map_err(read)?;
    let ids = stmt
        .query_map([], |r| r.get::<_, i64>(0))
        .and_then(|rows| rows.collect::<Result<HashSet<_>, _>>())
        .map_err(CoachError::read("accounts"))?;
    Ok(ids)
}

fn active_templates(conn: &Connection) -> Result<Vec<SopTemplate>, CoachError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, step_key, step_label, due_day, from_account_id, to_account_id,
                    default_amount, is_active
             FROM sop_templates WHERE is_active=1 ORDER BY sort_order, id",
        )
        .map_err(CoachError::read("SOP templates"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok(SopTemplate {
                id: r.get(0)?,
                step_key: r.get(1)?,
                step_label: r.get(2)?,
                due_day: r.get(3)?,
                from_account_id: r.get(4)?,
                to_account_id: r.get(5)?,
                default_amount: opt_text_decimal(r, 6)?,
                is_active: r.get(7)?,
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(CoachError::read("SOP templates"))?;
    Ok(rows)
}

fn all_bonuses(conn: &Connection) -> Result<Vec<BonusEvent>, CoachError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, type, label, amount, expected_date, is_received, actual_amount,
                    target_account_id, note
             FROM bonus_events ORDER BY expected_date",
        )
        .map_err(CoachError::read("bonus events"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok(BonusEvent {
                id: r.get(0)?,
                r#type: text_enum::<BonusType>(r, 1)?,
                label: r.get(2)?,
                amount: text_decimal(r, 3)?,
                expected_date: r.get(4)?,
                is_received: r.get(5)?,
                actual_amount: opt_text_decimal(r, 6)?,
                target_account_id: r.get(7)?,
                note: r.get(8)?,
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(CoachError::read("bonus events"))?;
    Ok(rows)
}

fn savings_snapshots(conn: &Connection) -> Result<Vec<(i64, NaiveDate, Decimal)>, CoachError> {
    let mut stmt = conn
        .prepare(
            "SELECT s.account_id, s.recorded_at, s.balance
             FROM balance_snapshots s
             JOIN accounts a ON s.account_id = a.id
             WHERE a.purpose='savings'
             ORDER BY s.recorded_at ASC",
        )
        .map_err(CoachError::read("balance snapshots"))?;
    let rows = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, text_decimal(r, 2)?)))
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(CoachError::read("balance snapshots"))?;
    Ok(rows)
}

fn existing_milestone_months(conn: &Connection) -> Result<HashSet<String>, CoachError> {
    let mut stmt = conn
        .prepare("SELECT year_month FROM monthly_milestones")
        .map_err(CoachError::read("milestones"))?;
    let months = stmt
        .query_map([], |r| r.get::<_, String>(0))
        .and_then(|rows| rows.collect::<Result<HashSet<_>, _>>())
        .map_err(CoachError::read("milestones"))?;
    Ok(months)
}

/// All 12 rows go in one transaction: either the whole window commits or
/// the table stays exactly as it was. Update-if-exists keeps row ids
/// stable; rows outside the window are never touched.
fn upsert_milestones(conn: &mut Connection, drafts: &[MilestoneDraft]) -> Result<(), CoachError> {
    let write = |year_month: &str| {
        let year_month = year_month.to_string();
        move |source| CoachError::DataWrite { year_month, source }
    };

    let tx = conn.transaction().map_err(write("(begin)"))?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO monthly_milestones(
                     year_month, planned_savings, planned_total_savings,
                     actual_savings, actual_total_savings, status)
                 VALUES (?1,?2,?3,?4,?5,?6)
                 ON CONFLICT(year_month) DO UPDATE SET
                     planned_savings=excluded.planned_savings,
                     planned_total_savings=excluded.planned_total_savings,
                     actual_savings=excluded.actual_savings,
                     actual_total_savings=excluded.actual_total_savings,
                     status=excluded.status",
            )
            .map_err(write("(prepare)"))?;
        for d in drafts {
            stmt.execute(params![
                d.year_month,
                d.planned_savings.to_string(),
                d.planned_total_savings.to_string(),
                d.actual_savings.map(|v| v.to_string()),
                d.actual_total_savings.map(|v| v.to_string()),
                d.status.as_str(),
            ])
            .map_err(write(&d.year_month))?;
        }
    }
    tx.commit().map_err(write("(commit)"))
}

pub fn all_milestones(conn: &Connection) -> Result<Vec<MonthlyMilestone>, CoachError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, year_month, planned_savings, planned_total_savings,
                    actual_savings, actual_total_savings, status
             FROM monthly_milestones ORDER BY year_month",
        )
        .map_err(CoachError::read("milestones"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok(MonthlyMilestone {
                id: r.get(0)?,
                year_month: r.get(1)?,
                planned_savings: text_decimal(r, 2)?,
                planned_total_savings: text_decimal(r, 3)?,
                actual_savings: opt_text_decimal(r, 4)?,
                actual_total_savings: opt_text_decimal(r, 5)?,
                status: text_enum::<MilestoneStatus>(r, 6)?,
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(CoachError::read("milestones"))?;
    Ok(rows)
}

fn text_decimal(r: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn opt_text_decimal(r: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = r.get(idx)?;
    s.map(|s| {
        s.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}

fn text_enum<T: FromStr>(r: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T::Err: std::fmt::Display,
{
    let s: String = r.get(idx)?;
    s.parse().map_err(|e: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            e.to_string().into(),
        )
    })
}
