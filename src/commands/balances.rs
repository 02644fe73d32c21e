// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::refresh_milestones;
use crate::utils::{
    id_for_account, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table,
};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => record(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn record(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_name = sub.get_one::<String>("account").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let balance = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let note = sub.get_one::<String>("note").map(|s| s.to_string());
    if balance.is_sign_negative() {
        anyhow::bail!("Balance must be non-negative, got {}", balance);
    }

    let account_id = id_for_account(conn, account_name)?;
    // One snapshot per account per day; recording again overwrites.
    conn.execute(
        "INSERT INTO balance_snapshots(account_id, recorded_at, balance, note)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(account_id, recorded_at) DO UPDATE SET
             balance=excluded.balance, note=excluded.note",
        params![account_id, date.to_string(), balance.to_string(), note],
    )?;
    println!("Recorded {} for '{}' on {}", balance, account_name, date);

    refresh_milestones(conn)
}

#[derive(Serialize)]
struct SnapshotRow {
    date: String,
    account: String,
    balance: String,
    note: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut sql = String::from(
        "SELECT s.recorded_at, a.name, s.balance, s.note
         FROM balance_snapshots s JOIN accounts a ON s.account_id=a.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(account) = sub.get_one::<String>("account") {
        params_vec.push(account.clone());
        sql.push_str(&format!(" AND a.name=?{}", params_vec.len()));
    }
    if let Some(month) = sub.get_one::<String>("month") {
        params_vec.push(parse_month(month)?);
        sql.push_str(&format!(" AND substr(s.recorded_at,1,7)=?{}", params_vec.len()));
    }
    sql.push_str(" ORDER BY s.recorded_at, a.name");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok(SnapshotRow {
            date: r.get(0)?,
            account: r.get(1)?,
            balance: r.get(2)?,
            note: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|s| {
                vec![
                    s.date.clone(),
                    s.account.clone(),
                    s.balance.clone(),
                    s.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Account", "Balance", "Note"], rows)
        );
    }
    Ok(())
}
