// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failure modes of milestone regeneration. Reads abort the whole run;
/// writes happen inside one transaction, so a write failure leaves the
/// milestone table as it was before the call.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("no salary configuration found; run `nestegg salary set` first")]
    ConfigurationMissing,

    #[error("failed to read {what}: {source}")]
    DataRead {
        what: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to write milestone {year_month}: {source}")]
    DataWrite {
        year_month: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl CoachError {
    pub(crate) fn read(what: &'static str) -> impl FnOnce(rusqlite::Error) -> CoachError {
        move |source| CoachError::DataRead { what, source }
    }
}
