// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! RFC3339 serialization for `DateTime<Utc>` fields, used via
//! `#[serde(with = "datetime_serde")]`. Keeps every persisted and wire
//! timestamp in one canonical, human-readable format instead of an epoch
//! integer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

/// `#[serde(with = "datetime_serde::optional")]` for `Option<DateTime<Utc>>`
/// fields such as `started_at`/`completed_at` that are absent until a stage
/// reaches that point in its lifecycle.
pub mod optional {
    use super::*;

    pub fn serialize<S>(opt_dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match opt_dt {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt_s: Option<String> = Option::deserialize(deserializer)?;
        match opt_s {
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "crate::value_objects::datetime_serde")]
        at: DateTime<Utc>,
        #[serde(with = "crate::value_objects::datetime_serde::optional")]
        maybe_at: Option<DateTime<Utc>>,
    }

    #[test]
    fn round_trips_through_json() {
        let original = Wrapper {
            at: Utc::now(),
            maybe_at: None,
        };
        let json = serde_json::to_string(&original).expect("serialize");
        let parsed: Wrapper = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(original.at.timestamp_millis(), parsed.at.timestamp_millis());
        assert!(parsed.maybe_at.is_none());
    }
}
