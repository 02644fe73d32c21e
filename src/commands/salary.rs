// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::refresh_milestones;
use crate::milestone::latest_salary_config;
use crate::tax::{calculate_yearly_tax, TaxInput};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("tax", sub)) => tax(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn non_negative(label: &str, v: Decimal) -> Result<Decimal> {
    if v.is_sign_negative() {
        anyhow::bail!("{} must be non-negative, got {}", label, v);
    }
    Ok(v)
}

fn set(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let gross = non_negative(
        "Monthly gross",
        parse_decimal(sub.get_one::<String>("gross").unwrap())?,
    )?;
    let fund_rate = non_negative(
        "Housing fund rate",
        parse_decimal(sub.get_one::<String>("fund-rate").unwrap())?,
    )?;
    let fund_base = sub
        .get_one::<String>("fund-base")
        .map(|s| parse_decimal(s).and_then(|v| non_negative("Housing fund base", v)))
        .transpose()?;
    let social = non_negative(
        "Social insurance",
        parse_decimal(sub.get_one::<String>("social").unwrap())?,
    )?;
    let deductions = non_negative(
        "Special deductions",
        parse_decimal(sub.get_one::<String>("deductions").unwrap())?,
    )?;
    let effective_from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let note = sub.get_one::<String>("note").map(|s| s.to_string());

    conn.execute(
        "INSERT INTO salary_configs(monthly_gross, housing_fund_rate, housing_fund_base,
                                    social_insurance, special_deductions, effective_from, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            gross.to_string(),
            fund_rate.to_string(),
            fund_base.map(|v| v.to_string()),
            social.to_string(),
            deductions.to_string(),
            effective_from.to_string(),
            note
        ],
    )?;
    println!(
        "Saved salary config: gross {} effective {}",
        gross, effective_from
    );

    refresh_milestones(conn)
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let Some(config) = latest_salary_config(conn)? else {
        println!("No salary configuration; run `nestegg salary set` first");
        return Ok(());
    };
    if !maybe_print_json(json_flag, jsonl_flag, &config)? {
        let rows = vec![
            vec!["Monthly gross".into(), config.monthly_gross.to_string()],
            vec![
                "Housing fund rate (%)".into(),
                config.housing_fund_rate.to_string(),
            ],
            vec![
                "Housing fund base".into(),
                config
                    .housing_fund_base
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "(gross)".into()),
            ],
            vec!["Social insurance".into(), config.social_insurance.to_string()],
            vec![
                "Special deductions".into(),
                config.special_deductions.to_string(),
            ],
            vec!["Effective from".into(), config.effective_from.to_string()],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}

fn tax(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let Some(config) = latest_salary_config(conn)? else {
        println!("No salary configuration; run `nestegg salary set` first");
        return Ok(());
    };
    let breakdown = calculate_yearly_tax(&TaxInput::from(&config));

    if !maybe_print_json(json_flag, jsonl_flag, &breakdown)? {
        let rows: Vec<Vec<String>> = breakdown
            .iter()
            .map(|b| {
                vec![
                    b.month.to_string(),
                    format!("{:.2}", b.gross),
                    format!("{:.2}", b.social_insurance),
                    format!("{:.2}", b.housing_fund),
                    format!("{:.2}", b.taxable_income),
                    format!("{:.2}", b.cumulative_taxable),
                    format!("{:.2}", b.monthly_tax),
                    format!("{:.2}", b.net_income),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Month", "Gross", "Social", "Fund", "Taxable", "Cum. taxable", "Tax", "Net"],
                rows
            )
        );
    }
    Ok(())
}
