// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::milestone::{all_milestones, regenerate};
use crate::models::MonthlyMilestone;
use crate::utils::{fmt_opt, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("regen", _)) => regen(conn)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn regen(conn: &mut Connection) -> Result<()> {
    let milestones = regenerate(conn, chrono::Local::now().date_naive())?;
    println!("Regenerated milestones ({} rows)", milestones.len());
    print_table(&milestones);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let milestones = all_milestones(conn)?;
    if !maybe_print_json(json_flag, jsonl_flag, &milestones)? {
        print_table(&milestones);
    }
    Ok(())
}

fn print_table(milestones: &[MonthlyMilestone]) {
    let rows: Vec<Vec<String>> = milestones
        .iter()
        .map(|m| {
            vec![
                m.year_month.clone(),
                format!("{:.2}", m.planned_savings),
                format!("{:.2}", m.planned_total_savings),
                fmt_opt(m.actual_savings),
                fmt_opt(m.actual_total_savings),
                m.status.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Month", "Planned", "Target total", "Actual", "Actual total", "Status"],
            rows
        )
    );
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let n = conn.execute(
        "DELETE FROM monthly_milestones WHERE year_month=?1",
        params![month],
    )?;
    if n == 0 {
        anyhow::bail!("No milestone for {}", month);
    }
    println!("Removed milestone {}", month);
    Ok(())
}
