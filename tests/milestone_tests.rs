// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use nestegg::milestone::{
    build_schedule, fixed_monthly_savings, monthly_savings_balances, SchedulePlan,
};
use nestegg::models::{BonusEvent, BonusType, MilestoneStatus, SopTemplate};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bonus(
    id: i64,
    amount: &str,
    expected: NaiveDate,
    target: Option<i64>,
    received: bool,
    actual: Option<&str>,
) -> BonusEvent {
    BonusEvent {
        id,
        r#type: BonusType::Other,
        label: format!("bonus-{}", id),
        amount: dec(amount),
        expected_date: expected,
        is_received: received,
        actual_amount: actual.map(dec),
        target_account_id: target,
        note: None,
    }
}

fn template(id: i64, to: Option<i64>, amount: Option<&str>, active: bool) -> SopTemplate {
    SopTemplate {
        id,
        step_key: format!("step-{}", id),
        step_label: format!("Step {}", id),
        due_day: 5,
        from_account_id: None,
        to_account_id: to,
        default_amount: amount.map(dec),
        is_active: active,
    }
}

struct Fixture {
    savings: HashSet<i64>,
    observed: BTreeMap<String, Decimal>,
    existing: HashSet<String>,
    bonuses: Vec<BonusEvent>,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            savings: HashSet::from([1]),
            observed: BTreeMap::new(),
            existing: HashSet::new(),
            bonuses: Vec::new(),
        }
    }

    fn plan(&self, start: NaiveDate, fixed: &str) -> SchedulePlan<'_> {
        SchedulePlan {
            start,
            fixed_monthly: dec(fixed),
            bonuses: &self.bonuses,
            savings_accounts: &self.savings,
            observed: &self.observed,
            existing_months: &self.existing,
        }
    }
}

// today before the series start: nothing falls under the skip guard
fn before_start() -> NaiveDate {
    date(2024, 12, 1)
}

#[test]
fn re_anchoring_resets_targets_to_observed_reality() {
    let mut fx = Fixture::new();
    fx.observed.insert("2025-01".into(), dec("10000"));
    fx.observed.insert("2025-03".into(), dec("12500"));

    let drafts = build_schedule(&fx.plan(date(2025, 1, 1), "1000"), before_start());
    assert_eq!(drafts.len(), 12);

    // Month 1 is both the initial baseline and an observation: delta 0.
    assert_eq!(drafts[0].year_month, "2025-01");
    assert_eq!(drafts[0].actual_savings, Some(dec("0")));
    assert_eq!(drafts[0].actual_total_savings, Some(dec("10000")));
    assert_eq!(drafts[0].status, MilestoneStatus::Missed);
    assert_eq!(drafts[0].planned_total_savings, dec("10000"));

    // Month 2 unobserved: projects from the month-1 anchor.
    assert_eq!(drafts[1].status, MilestoneStatus::Pending);
    assert_eq!(drafts[1].actual_savings, None);
    assert_eq!(drafts[1].planned_total_savings, dec("11000"));

    // Month 3 observed at 12500: the whole gap since month 1 counts here.
    assert_eq!(drafts[2].actual_savings, Some(dec("2500")));
    assert_eq!(drafts[2].status, MilestoneStatus::Exceeded);
    assert_eq!(drafts[2].planned_total_savings, dec("12500"));

    // Month 4 projects from the new anchor, not the original baseline.
    assert_eq!(drafts[3].planned_total_savings, dec("13500"));
    assert_eq!(drafts[3].status, MilestoneStatus::Pending);
}

#[test]
fn on_track_when_delta_matches_plan_exactly() {
    let mut fx = Fixture::new();
    fx.observed.insert("2025-01".into(), dec("5000"));
    fx.observed.insert("2025-02".into(), dec("6000"));

    let drafts = build_schedule(&fx.plan(date(2025, 1, 1), "1000"), before_start());
    assert_eq!(drafts[1].actual_savings, Some(dec("1000")));
    assert_eq!(drafts[1].status, MilestoneStatus::OnTrack);
}

#[test]
fn bonus_counts_only_into_savings_accounts() {
    let mut fx = Fixture::new();
    // id 2 is not a savings account
    fx.bonuses = vec![
        bonus(1, "5000", date(2025, 5, 10), Some(2), false, None),
        bonus(2, "5000", date(2025, 6, 15), Some(1), false, None),
        bonus(3, "4000", date(2025, 7, 1), None, false, None),
    ];

    let drafts = build_schedule(&fx.plan(date(2025, 1, 1), "1000"), before_start());
    assert_eq!(drafts[4].year_month, "2025-05");
    assert_eq!(drafts[4].planned_savings, dec("1000"));
    assert_eq!(drafts[5].planned_savings, dec("6000"));
    assert_eq!(drafts[6].planned_savings, dec("1000"));
}

#[test]
fn received_bonus_counts_actual_amount() {
    let mut fx = Fixture::new();
    fx.bonuses = vec![bonus(1, "5000", date(2025, 6, 15), Some(1), true, Some("7777"))];

    let drafts = build_schedule(&fx.plan(date(2025, 1, 1), "1000"), before_start());
    assert_eq!(drafts[5].planned_savings, dec("8777"));

    // Not yet received: the expectation still counts, even with a
    // pre-filled actual amount.
    fx.bonuses[0].is_received = false;
    let drafts = build_schedule(&fx.plan(date(2025, 1, 1), "1000"), before_start());
    assert_eq!(drafts[5].planned_savings, dec("6000"));
}

#[test]
fn no_history_projects_from_zero_all_pending() {
    let fx = Fixture::new();
    let drafts = build_schedule(&fx.plan(date(2025, 1, 1), "1500"), before_start());

    assert_eq!(drafts.len(), 12);
    for (i, d) in drafts.iter().enumerate() {
        assert_eq!(d.status, MilestoneStatus::Pending);
        assert_eq!(d.actual_savings, None);
        assert_eq!(d.actual_total_savings, None);
        assert_eq!(
            d.planned_total_savings,
            dec("1500") * Decimal::from(i as i64 + 1)
        );
    }
}

#[test]
fn skip_guard_drops_begun_months_without_rows() {
    let mut fx = Fixture::new();
    fx.existing.insert("2025-02".into());

    // Mid-March: January and March have neither rows nor future standing;
    // February survives because a row already exists. The current month is
    // skipped too when it has no row.
    let drafts = build_schedule(&fx.plan(date(2025, 1, 1), "1000"), date(2025, 3, 10));

    let months: Vec<&str> = drafts.iter().map(|d| d.year_month.as_str()).collect();
    assert_eq!(
        months,
        vec![
            "2025-02", "2025-04", "2025-05", "2025-06", "2025-07", "2025-08", "2025-09",
            "2025-10", "2025-11", "2025-12"
        ]
    );

    // Skipped months contribute nothing to the cumulative plan.
    assert_eq!(drafts[0].planned_total_savings, dec("1000"));
    assert_eq!(drafts[1].planned_total_savings, dec("2000"));
}

#[test]
fn series_window_wraps_the_year_boundary() {
    let fx = Fixture::new();
    let drafts = build_schedule(&fx.plan(date(2025, 10, 1), "100"), before_start());
    assert_eq!(drafts.first().unwrap().year_month, "2025-10");
    assert_eq!(drafts.last().unwrap().year_month, "2026-09");
}

#[test]
fn multi_month_gap_attributes_whole_delta_to_observed_month() {
    let mut fx = Fixture::new();
    fx.observed.insert("2025-04".into(), dec("9000"));

    let drafts = build_schedule(&fx.plan(date(2025, 1, 1), "1000"), before_start());
    // Months 1-3 pending, projecting from the zero baseline.
    assert_eq!(drafts[2].planned_total_savings, dec("3000"));
    // Month 4 takes the entire delta since the baseline as its own.
    assert_eq!(drafts[3].actual_savings, Some(dec("9000")));
    assert_eq!(drafts[3].status, MilestoneStatus::Exceeded);
    assert_eq!(drafts[4].planned_total_savings, dec("10000"));
}

#[test]
fn latest_snapshot_per_account_per_month_wins() {
    let snaps = vec![
        (1, date(2025, 1, 5), dec("100")),
        (1, date(2025, 1, 20), dec("150")),
        (2, date(2025, 1, 10), dec("50")),
        (2, date(2025, 2, 3), dec("80")),
    ];
    let totals = monthly_savings_balances(&snaps);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals["2025-01"], dec("200"));
    // Account 1 has no February observation; only account 2 counts.
    assert_eq!(totals["2025-02"], dec("80"));
}

#[test]
fn fixed_baseline_filters_inactive_and_non_savings() {
    let savings = HashSet::from([1]);
    let templates = vec![
        template(1, Some(1), Some("1000"), true),
        template(2, Some(1), Some("500"), false), // inactive
        template(3, Some(2), Some("700"), true),  // not a savings account
        template(4, Some(1), None, true),         // no default amount
        template(5, None, Some("300"), true),     // no destination
    ];
    assert_eq!(fixed_monthly_savings(&templates, &savings), dec("1000"));
}
