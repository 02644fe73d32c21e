// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::refresh_milestones;
use crate::models::BonusType;
use crate::utils::{id_for_account, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("received", sub)) => received(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let label = sub.get_one::<String>("label").unwrap();
    let typ: BonusType = sub
        .get_one::<String>("type")
        .unwrap()
        .parse()
        .map_err(anyhow::Error::msg)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let expected = parse_date(sub.get_one::<String>("date").unwrap())?;
    let target_id = sub
        .get_one::<String>("target")
        .map(|n| id_for_account(conn, n))
        .transpose()?;
    let note = sub.get_one::<String>("note").map(|s| s.to_string());
    if amount <= Decimal::ZERO {
        anyhow::bail!("Bonus amount must be positive, got {}", amount);
    }

    conn.execute(
        "INSERT INTO bonus_events(type, label, amount, expected_date, target_account_id, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            typ.as_str(),
            label,
            amount.to_string(),
            expected.to_string(),
            target_id,
            note
        ],
    )?;
    println!("Added bonus '{}' ({} expected {})", label, amount, expected);

    refresh_milestones(conn)
}

#[derive(Serialize)]
struct BonusRow {
    id: i64,
    r#type: String,
    label: String,
    amount: String,
    expected_date: String,
    received: bool,
    actual_amount: String,
    target: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut stmt = conn.prepare(
        "SELECT b.id, b.type, b.label, b.amount, b.expected_date, b.is_received,
                b.actual_amount, a.name
         FROM bonus_events b LEFT JOIN accounts a ON b.target_account_id=a.id
         ORDER BY b.expected_date",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(BonusRow {
            id: r.get(0)?,
            r#type: r.get(1)?,
            label: r.get(2)?,
            amount: r.get(3)?,
            expected_date: r.get(4)?,
            received: r.get(5)?,
            actual_amount: r.get::<_, Option<String>>(6)?.unwrap_or_default(),
            target: r.get::<_, Option<String>>(7)?.unwrap_or_default(),
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.r#type.clone(),
                    b.label.clone(),
                    b.amount.clone(),
                    b.expected_date.clone(),
                    if b.received { "yes".into() } else { "no".into() },
                    b.actual_amount.clone(),
                    b.target.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Type", "Label", "Amount", "Expected", "Received", "Actual", "Target"],
                rows
            )
        );
    }
    Ok(())
}

fn received(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let actual = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if actual < Decimal::ZERO {
        anyhow::bail!("Actual amount must be non-negative, got {}", actual);
    }

    let n = conn.execute(
        "UPDATE bonus_events SET is_received=1, actual_amount=?1 WHERE id=?2",
        params![actual.to_string(), id],
    )?;
    if n == 0 {
        anyhow::bail!("Bonus event {} not found", id);
    }
    println!("Marked bonus {} received ({})", id, actual);

    refresh_milestones(conn)
}

fn rm(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let n = conn.execute("DELETE FROM bonus_events WHERE id=?1", params![id])?;
    if n == 0 {
        anyhow::bail!("Bonus event {} not found", id);
    }
    println!("Removed bonus event {}", id);

    refresh_milestones(conn)
}
