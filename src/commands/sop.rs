// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::refresh_milestones;
use crate::utils::{id_for_account, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("enable", sub)) => set_active(conn, sub, true)?,
        Some(("disable", sub)) => set_active(conn, sub, false)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let key = sub.get_one::<String>("key").unwrap();
    let label = sub.get_one::<String>("label").unwrap();
    let due_day = *sub.get_one::<u32>("due-day").unwrap();
    let from_id = sub
        .get_one::<String>("from")
        .map(|n| id_for_account(conn, n))
        .transpose()?;
    let to_id = sub
        .get_one::<String>("to")
        .map(|n| id_for_account(conn, n))
        .transpose()?;
    let amount = sub
        .get_one::<String>("amount")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let sort_order = *sub.get_one::<i64>("sort-order").unwrap();

    conn.execute(
        "INSERT INTO sop_templates(step_key, step_label, due_day, from_account_id,
                                   to_account_id, default_amount, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            key,
            label,
            due_day,
            from_id,
            to_id,
            amount.map(|a| a.to_string()),
            sort_order
        ],
    )?;
    println!("Added SOP template '{}' (due day {})", key, due_day);

    refresh_milestones(conn)
}

#[derive(Serialize)]
struct TemplateRow {
    key: String,
    label: String,
    due_day: u32,
    from: String,
    to: String,
    amount: String,
    active: bool,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut stmt = conn.prepare(
        "SELECT t.step_key, t.step_label, t.due_day, fa.name, ta.name, t.default_amount, t.is_active
         FROM sop_templates t
         LEFT JOIN accounts fa ON t.from_account_id=fa.id
         LEFT JOIN accounts ta ON t.to_account_id=ta.id
         ORDER BY t.sort_order, t.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(TemplateRow {
            key: r.get(0)?,
            label: r.get(1)?,
            due_day: r.get(2)?,
            from: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
            to: r.get::<_, Option<String>>(4)?.unwrap_or_default(),
            amount: r.get::<_, Option<String>>(5)?.unwrap_or_default(),
            active: r.get(6)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.key.clone(),
                    t.label.clone(),
                    t.due_day.to_string(),
                    t.from.clone(),
                    t.to.clone(),
                    t.amount.clone(),
                    if t.active { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Key", "Label", "Due", "From", "To", "Amount", "Active"],
                rows
            )
        );
    }
    Ok(())
}

fn set_active(conn: &mut Connection, sub: &clap::ArgMatches, active: bool) -> Result<()> {
    let key = sub.get_one::<String>("key").unwrap();
    let n = conn.execute(
        "UPDATE sop_templates SET is_active=?1 WHERE step_key=?2",
        params![active, key],
    )?;
    if n == 0 {
        anyhow::bail!("SOP template '{}' not found", key);
    }
    println!(
        "{} SOP template '{}'",
        if active { "Enabled" } else { "Disabled" },
        key
    );

    refresh_milestones(conn)
}

fn rm(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let key = sub.get_one::<String>("key").unwrap();
    let n = conn.execute("DELETE FROM sop_templates WHERE step_key=?1", params![key])?;
    if n == 0 {
        anyhow::bail!("SOP template '{}' not found", key);
    }
    println!("Removed SOP template '{}'", key);

    refresh_milestones(conn)
}
