// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use nestegg::error::CoachError;
use nestegg::milestone::regenerate;
use nestegg::models::MilestoneStatus;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    nestegg::db::init_schema(&mut conn).unwrap();
    conn
}

fn add_account(conn: &Connection, name: &str, purpose: &str) -> i64 {
    conn.execute(
        "INSERT INTO accounts(name, purpose) VALUES (?1, ?2)",
        params![name, purpose],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn add_salary(conn: &Connection, effective_from: &str) {
    conn.execute(
        "INSERT INTO salary_configs(monthly_gross, housing_fund_rate, housing_fund_base,
                                    social_insurance, special_deductions, effective_from)
         VALUES ('20000','12',NULL,'2000','0',?1)",
        params![effective_from],
    )
    .unwrap();
}

fn add_template(conn: &Connection, to: i64, amount: &str) {
    conn.execute(
        "INSERT INTO sop_templates(step_key, step_label, due_day, to_account_id, default_amount)
         VALUES ('save','Monthly transfer',5,?1,?2)",
        params![to, amount],
    )
    .unwrap();
}

fn add_snapshot(conn: &Connection, account: i64, recorded_at: &str, balance: &str) {
    conn.execute(
        "INSERT INTO balance_snapshots(account_id, recorded_at, balance) VALUES (?1,?2,?3)",
        params![account, recorded_at, balance],
    )
    .unwrap();
}

fn milestone_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM monthly_milestones", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn missing_config_aborts_without_writes() {
    let mut conn = setup();
    let err = regenerate(&mut conn, date(2025, 1, 15)).unwrap_err();
    assert!(matches!(err, CoachError::ConfigurationMissing));
    assert_eq!(milestone_count(&conn), 0);
}

#[test]
fn full_series_with_history_template_and_bonus() {
    let mut conn = setup();
    add_salary(&conn, "2025-01-01");
    let savings = add_account(&conn, "CMB Savings", "savings");
    let flexible = add_account(&conn, "Spending", "flexible");
    add_template(&conn, savings, "1000");
    add_snapshot(&conn, savings, "2025-01-31", "10000");
    // This one must not count: the account is not a savings account.
    add_snapshot(&conn, flexible, "2025-01-31", "99999");
    conn.execute(
        "INSERT INTO bonus_events(type, label, amount, expected_date, target_account_id)
         VALUES ('year_end_bonus','Year end','5000','2025-06-05',?1)",
        params![savings],
    )
    .unwrap();

    let rows = regenerate(&mut conn, date(2024, 12, 20)).unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0].year_month, "2025-01");
    assert_eq!(rows[0].actual_savings, Some(dec("0")));
    assert_eq!(rows[0].actual_total_savings, Some(dec("10000")));
    assert_eq!(rows[0].status, MilestoneStatus::Missed);

    // Anchored at the January observation.
    assert_eq!(rows[1].planned_total_savings, dec("11000"));
    assert_eq!(rows[1].status, MilestoneStatus::Pending);

    // June carries the bonus on top of the template baseline.
    assert_eq!(rows[5].year_month, "2025-06");
    assert_eq!(rows[5].planned_savings, dec("6000"));
    assert_eq!(rows[11].planned_total_savings, dec("10000") + dec("1000") * dec("11") + dec("5000"));
}

#[test]
fn regenerating_twice_is_idempotent() {
    let mut conn = setup();
    add_salary(&conn, "2025-01-01");
    let savings = add_account(&conn, "Savings", "savings");
    add_template(&conn, savings, "800");
    add_snapshot(&conn, savings, "2025-02-10", "3000");

    let first = regenerate(&mut conn, date(2024, 12, 20)).unwrap();
    let second = regenerate(&mut conn, date(2024, 12, 20)).unwrap();
    assert_eq!(first, second);
    assert_eq!(milestone_count(&conn), 12);
}

#[test]
fn upsert_preserves_ids_and_out_of_window_rows() {
    let mut conn = setup();
    add_salary(&conn, "2025-01-01");
    let savings = add_account(&conn, "Savings", "savings");
    add_template(&conn, savings, "1000");

    // A stale in-window row and one outside the window.
    conn.execute(
        "INSERT INTO monthly_milestones(year_month, planned_savings, planned_total_savings, status)
         VALUES ('2025-03','1','1','pending')",
        [],
    )
    .unwrap();
    let stale_id: i64 = conn
        .query_row(
            "SELECT id FROM monthly_milestones WHERE year_month='2025-03'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    conn.execute(
        "INSERT INTO monthly_milestones(year_month, planned_savings, planned_total_savings, status)
         VALUES ('2024-09','123','456','missed')",
        [],
    )
    .unwrap();

    let rows = regenerate(&mut conn, date(2024, 12, 20)).unwrap();
    // 12 window months plus the untouched 2024-09 row, chronological.
    assert_eq!(rows.len(), 13);
    assert_eq!(rows[0].year_month, "2024-09");
    assert_eq!(rows[0].planned_savings, dec("123"));
    assert_eq!(rows[0].status, MilestoneStatus::Missed);

    let march = rows.iter().find(|m| m.year_month == "2025-03").unwrap();
    assert_eq!(march.id, stale_id);
    assert_eq!(march.planned_savings, dec("1000"));
    assert_eq!(march.planned_total_savings, dec("3000"));
}

#[test]
fn skip_guard_applies_through_the_store() {
    let mut conn = setup();
    add_salary(&conn, "2025-01-01");
    let savings = add_account(&conn, "Savings", "savings");
    add_template(&conn, savings, "1000");

    // Mid-March with an empty milestone table: begun months get no rows,
    // including the current month.
    let rows = regenerate(&mut conn, date(2025, 3, 10)).unwrap();
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[0].year_month, "2025-04");
    assert_eq!(rows.last().unwrap().year_month, "2025-12");
}

#[test]
fn received_bonus_amount_flows_into_plan() {
    let mut conn = setup();
    add_salary(&conn, "2025-01-01");
    let savings = add_account(&conn, "Savings", "savings");
    add_template(&conn, savings, "1000");
    conn.execute(
        "INSERT INTO bonus_events(type, label, amount, expected_date, target_account_id,
                                  is_received, actual_amount)
         VALUES ('signing_bonus','Sign-on','5000','2025-02-20',?1,1,'7777')",
        params![savings],
    )
    .unwrap();

    let rows = regenerate(&mut conn, date(2024, 12, 20)).unwrap();
    assert_eq!(rows[1].year_month, "2025-02");
    assert_eq!(rows[1].planned_savings, dec("8777"));
}

#[test]
fn persists_across_reopen_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nestegg.sqlite");

    {
        let mut conn = Connection::open(&path).unwrap();
        nestegg::db::init_schema(&mut conn).unwrap();
        add_salary(&conn, "2025-01-01");
        let savings = add_account(&conn, "Savings", "savings");
        add_template(&conn, savings, "500");
        let rows = regenerate(&mut conn, date(2024, 12, 20)).unwrap();
        assert_eq!(rows.len(), 12);
    }

    let conn = Connection::open(&path).unwrap();
    let rows = nestegg::milestone::all_milestones(&conn).unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[11].planned_total_savings, dec("6000"));
}
