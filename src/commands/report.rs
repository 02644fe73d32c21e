// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{fmt_opt, maybe_print_json, parse_month, pretty_table, round2};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("month", sub)) => month(conn, sub),
        _ => Ok(()),
    }
}

#[derive(Serialize)]
struct MilestoneSummary {
    planned_savings: Decimal,
    planned_total_savings: Decimal,
    actual_savings: Option<Decimal>,
    actual_total_savings: Option<Decimal>,
    status: String,
}

/// First/last snapshot of one account within the month.
#[derive(Serialize)]
struct AccountChange {
    account: String,
    purpose: String,
    start_balance: Option<Decimal>,
    end_balance: Option<Decimal>,
    change: Option<Decimal>,
}

#[derive(Serialize)]
struct MonthlyReport {
    year_month: String,
    milestone: Option<MilestoneSummary>,
    accounts: Vec<AccountChange>,
}

fn month(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let ym = parse_month(sub.get_one::<String>("month").unwrap())?;

    let milestone = conn
        .query_row(
            "SELECT planned_savings, planned_total_savings, actual_savings,
                    actual_total_savings, status
             FROM monthly_milestones WHERE year_month=?1",
            params![ym],
            |r| {
                Ok(MilestoneSummary {
                    planned_savings: parse_dec(r.get::<_, String>(0)?),
                    planned_total_savings: parse_dec(r.get::<_, String>(1)?),
                    actual_savings: r.get::<_, Option<String>>(2)?.map(parse_dec),
                    actual_total_savings: r.get::<_, Option<String>>(3)?.map(parse_dec),
                    status: r.get(4)?,
                })
            },
        )
        .optional()?;

    // Snapshots of the month, ascending: the first seen per account is the
    // month's start, the last one its end.
    let mut stmt = conn.prepare(
        "SELECT a.name, a.purpose, s.balance
         FROM balance_snapshots s JOIN accounts a ON s.account_id=a.id
         WHERE substr(s.recorded_at,1,7)=?1
         ORDER BY s.recorded_at, a.name",
    )?;
    let rows = stmt.query_map(params![ym], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;

    let mut per_account: BTreeMap<String, (String, Decimal, Decimal)> = BTreeMap::new();
    for row in rows {
        let (name, purpose, balance) = row?;
        let balance = parse_dec(balance);
        per_account
            .entry(name)
            .and_modify(|e| e.2 = balance)
            .or_insert((purpose, balance, balance));
    }
    let accounts: Vec<AccountChange> = per_account
        .into_iter()
        .map(|(account, (purpose, start, end))| AccountChange {
            account,
            purpose,
            start_balance: Some(start),
            end_balance: Some(end),
            change: Some(round2(end - start)),
        })
        .collect();

    let report = MonthlyReport {
        year_month: ym.clone(),
        milestone,
        accounts,
    };
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }

    match &report.milestone {
        Some(ms) => {
            let rows = vec![vec![
                ym.clone(),
                format!("{:.2}", ms.planned_savings),
                format!("{:.2}", ms.planned_total_savings),
                fmt_opt(ms.actual_savings),
                fmt_opt(ms.actual_total_savings),
                ms.status.clone(),
            ]];
            println!(
                "{}",
                pretty_table(
                    &["Month", "Planned", "Target total", "Actual", "Actual total", "Status"],
                    rows
                )
            );
        }
        None => println!("No milestone for {}", ym),
    }

    if report.accounts.is_empty() {
        println!("No balance snapshots in {}", ym);
    } else {
        let rows: Vec<Vec<String>> = report
            .accounts
            .iter()
            .map(|a| {
                vec![
                    a.account.clone(),
                    a.purpose.clone(),
                    fmt_opt(a.start_balance),
                    fmt_opt(a.end_balance),
                    fmt_opt(a.change),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Account", "Purpose", "Start", "End", "Change"], rows)
        );
    }
    Ok(())
}

fn parse_dec(s: String) -> Decimal {
    s.parse().unwrap_or(Decimal::ZERO)
}
