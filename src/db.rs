// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Nestegg", "nestegg"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("nestegg.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

/// Amounts are stored as TEXT and parsed into Decimal; dates as ISO TEXT.
/// UNIQUE keys back the two upsert paths: balance snapshots on
/// (account_id, recorded_at) and milestones on year_month.
pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        bank TEXT,
        purpose TEXT NOT NULL CHECK(purpose IN
            ('salary','fixed_expense','dating_fund','savings','flexible','housing_fund')),
        sort_order INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS balance_snapshots(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account_id INTEGER NOT NULL,
        recorded_at TEXT NOT NULL,
        balance TEXT NOT NULL,
        note TEXT,
        UNIQUE(account_id, recorded_at),
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_snapshots_recorded ON balance_snapshots(recorded_at);

    CREATE TABLE IF NOT EXISTS sop_templates(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        step_key TEXT NOT NULL,
        step_label TEXT NOT NULL,
        due_day INTEGER NOT NULL CHECK(due_day BETWEEN 1 AND 31),
        from_account_id INTEGER,
        to_account_id INTEGER,
        default_amount TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        FOREIGN KEY(from_account_id) REFERENCES accounts(id) ON DELETE SET NULL,
        FOREIGN KEY(to_account_id) REFERENCES accounts(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS bonus_events(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL CHECK(type IN ('signing_bonus','year_end_bonus','other')),
        label TEXT NOT NULL,
        amount TEXT NOT NULL,
        expected_date TEXT NOT NULL,
        is_received INTEGER NOT NULL DEFAULT 0,
        actual_amount TEXT,
        target_account_id INTEGER,
        note TEXT,
        FOREIGN KEY(target_account_id) REFERENCES accounts(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_bonus_expected ON bonus_events(expected_date);

    CREATE TABLE IF NOT EXISTS salary_configs(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        monthly_gross TEXT NOT NULL,
        housing_fund_rate TEXT NOT NULL,
        housing_fund_base TEXT,
        social_insurance TEXT NOT NULL,
        special_deductions TEXT NOT NULL,
        effective_from TEXT NOT NULL,
        note TEXT
    );

    CREATE TABLE IF NOT EXISTS monthly_milestones(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        year_month TEXT NOT NULL UNIQUE,
        planned_savings TEXT NOT NULL,
        planned_total_savings TEXT NOT NULL,
        actual_savings TEXT,
        actual_total_savings TEXT,
        status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN
            ('pending','on_track','exceeded','missed'))
    );
    "#,
    )?;
    Ok(())
}
