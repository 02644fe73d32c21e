// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::refresh_milestones;
use crate::models::AccountPurpose;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let purpose: AccountPurpose = sub
        .get_one::<String>("purpose")
        .unwrap()
        .parse()
        .map_err(anyhow::Error::msg)?;
    let bank = sub.get_one::<String>("bank").map(|s| s.to_string());
    let sort_order = *sub.get_one::<i64>("sort-order").unwrap();

    conn.execute(
        "INSERT INTO accounts(name, bank, purpose, sort_order) VALUES (?1, ?2, ?3, ?4)",
        params![name, bank, purpose.as_str(), sort_order],
    )?;
    println!("Added account '{}' ({})", name, purpose);

    refresh_milestones(conn)
}

#[derive(Serialize)]
struct AccountRow {
    name: String,
    bank: String,
    purpose: String,
    sort_order: i64,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut stmt = conn.prepare(
        "SELECT name, bank, purpose, sort_order FROM accounts ORDER BY sort_order, name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(AccountRow {
            name: r.get(0)?,
            bank: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
            purpose: r.get(2)?,
            sort_order: r.get(3)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|a| {
                vec![
                    a.name.clone(),
                    a.bank.clone(),
                    a.purpose.clone(),
                    a.sort_order.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Name", "Bank", "Purpose", "Order"], rows)
        );
    }
    Ok(())
}

fn rm(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let n = conn.execute("DELETE FROM accounts WHERE name=?1", params![name])?;
    if n == 0 {
        anyhow::bail!("Account '{}' not found", name);
    }
    println!("Removed account '{}'", name);

    refresh_milestones(conn)
}
