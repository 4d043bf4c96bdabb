// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The fixed, closed set of analysis stages a job runs through, in the
//! order the executor drives them.
//!
//! Unlike the compression/encryption pipeline this crate was grown from,
//! this pipeline is not user-configurable: every job runs the same five
//! persisted stages, followed by a virtual `ReportGeneration` step the
//! executor synthesizes from their results rather than persists.

use crate::error::ForensicError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One stage in the fixed analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    MetadataExtraction,
    Prnu,
    Fft,
    Classification,
    Cleaning,
}

impl StageName {
    /// The five persisted stages, in execution order.
    pub const ORDER: [StageName; 5] = [
        StageName::MetadataExtraction,
        StageName::Prnu,
        StageName::Fft,
        StageName::Classification,
        StageName::Cleaning,
    ];

    /// Position of this stage in the fixed execution order, zero-based.
    pub fn position(&self) -> usize {
        Self::ORDER
            .iter()
            .position(|s| s == self)
            .expect("StageName::ORDER is exhaustive")
    }

    /// The stage that runs immediately after this one, if any.
    pub fn next(&self) -> Option<StageName> {
        Self::ORDER.get(self.position() + 1).copied()
    }

    /// The stage that must complete before this one may start.
    pub fn previous(&self) -> Option<StageName> {
        let pos = self.position();
        if pos == 0 {
            None
        } else {
            Self::ORDER.get(pos - 1).copied()
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::MetadataExtraction => "metadata_extraction",
            StageName::Prnu => "prnu",
            StageName::Fft => "fft",
            StageName::Classification => "classification",
            StageName::Cleaning => "cleaning",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StageName {
    type Err = ForensicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metadata_extraction" => Ok(StageName::MetadataExtraction),
            "prnu" => Ok(StageName::Prnu),
            "fft" => Ok(StageName::Fft),
            "classification" => Ok(StageName::Classification),
            "cleaning" => Ok(StageName::Cleaning),
            other => Err(ForensicError::validation(format!(
                "unknown stage name: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_stable_and_exhaustive() {
        assert_eq!(StageName::ORDER.len(), 5);
        assert_eq!(StageName::ORDER[0], StageName::MetadataExtraction);
        assert_eq!(StageName::ORDER[4], StageName::Cleaning);
    }

    #[test]
    fn next_and_previous_chain_through_the_whole_order() {
        let mut cur = StageName::MetadataExtraction;
        let mut count = 1;
        while let Some(next) = cur.next() {
            assert_eq!(next.previous(), Some(cur));
            cur = next;
            count += 1;
        }
        assert_eq!(cur, StageName::Cleaning);
        assert_eq!(count, 5);
    }

    #[test]
    fn first_stage_has_no_predecessor() {
        assert_eq!(StageName::MetadataExtraction.previous(), None);
    }

    #[test]
    fn last_stage_has_no_successor() {
        assert_eq!(StageName::Cleaning.next(), None);
    }

    #[test]
    fn round_trips_through_display_and_from_str() {
        for stage in StageName::ORDER {
            let parsed: StageName = stage.to_string().parse().unwrap();
            assert_eq!(stage, parsed);
        }
    }

    #[test]
    fn rejects_unknown_stage_names() {
        let err = "transcode".parse::<StageName>().unwrap_err();
        assert_eq!(err.category(), "validation");
    }

    #[test]
    fn serializes_as_snake_case_string() {
        let json = serde_json::to_string(&StageName::Prnu).unwrap();
        assert_eq!(json, "\"prnu\"");
    }
}
