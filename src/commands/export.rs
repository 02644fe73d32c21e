// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::milestone::all_milestones;
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("milestones", sub)) => export_milestones(conn, sub),
        _ => Ok(()),
    }
}

fn export_milestones(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let milestones = all_milestones(conn)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "year_month",
                "planned_savings",
                "planned_total_savings",
                "actual_savings",
                "actual_total_savings",
                "status",
            ])?;
            for ms in &milestones {
                wtr.write_record([
                    ms.year_month.clone(),
                    ms.planned_savings.to_string(),
                    ms.planned_total_savings.to_string(),
                    ms.actual_savings.map(|v| v.to_string()).unwrap_or_default(),
                    ms.actual_total_savings
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                    ms.status.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = milestones
                .iter()
                .map(|ms| {
                    json!({
                        "year_month": ms.year_month,
                        "planned_savings": ms.planned_savings,
                        "planned_total_savings": ms.planned_total_savings,
                        "actual_savings": ms.actual_savings,
                        "actual_total_savings": ms.actual_total_savings,
                        "status": ms.status.as_str(),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => anyhow::bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported milestones to {}", out);
    Ok(())
}
