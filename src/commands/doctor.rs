// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Surface configuration that will silently count for nothing in the
/// milestone plan.
pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) No salary config means milestones cannot be generated at all
    let configs: i64 = conn.query_row("SELECT COUNT(*) FROM salary_configs", [], |r| r.get(0))?;
    if configs == 0 {
        rows.push(vec![
            "no_salary_config".into(),
            "run `nestegg salary set`".into(),
        ]);
    }

    // 2) Active templates whose default_amount is ignored by the plan:
    //    no destination, or a destination that is not a savings account
    let mut stmt = conn.prepare(
        "SELECT t.step_key, a.purpose
         FROM sop_templates t LEFT JOIN accounts a ON t.to_account_id=a.id
         WHERE t.is_active=1 AND t.default_amount IS NOT NULL
           AND (t.to_account_id IS NULL OR a.purpose != 'savings')",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let key: String = r.get(0)?;
        let purpose: Option<String> = r.get(1)?;
        rows.push(vec![
            "sop_not_counted".into(),
            format!(
                "{} -> {}",
                key,
                purpose.unwrap_or_else(|| "(no destination)".into())
            ),
        ]);
    }

    // 3) Bonus events that cannot contribute to any month's plan
    let mut stmt2 = conn.prepare(
        "SELECT b.label, b.expected_date, a.purpose
         FROM bonus_events b LEFT JOIN accounts a ON b.target_account_id=a.id
         WHERE b.target_account_id IS NULL OR a.purpose != 'savings'
         ORDER BY b.expected_date",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let label: String = r.get(0)?;
        let date: String = r.get(1)?;
        let purpose: Option<String> = r.get(2)?;
        rows.push(vec![
            "bonus_not_counted".into(),
            format!(
                "{} ({}) -> {}",
                label,
                date,
                purpose.unwrap_or_else(|| "(no target)".into())
            ),
        ]);
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
