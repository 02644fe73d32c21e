// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::error::CoachError;

pub mod accounts;
pub mod balances;
pub mod sop;
pub mod bonus;
pub mod salary;
pub mod milestones;
pub mod report;
pub mod export;
pub mod doctor;

/// Every financial-data mutation re-runs milestone regeneration. Before a
/// salary config exists there is nothing to regenerate, so that case is a
/// no-op rather than an error here.
pub(crate) fn refresh_milestones(conn: &mut Connection) -> Result<()> {
    match crate::milestone::regenerate(conn, chrono::Local::now().date_naive()) {
        Ok(_) => Ok(()),
        Err(CoachError::ConfigurationMissing) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
