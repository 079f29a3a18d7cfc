use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Outbound body: the submission's own fields with a `timestamp` appended.
#[derive(Debug, Serialize)]
pub struct Stamped<'a, T> {
    #[serde(flatten)]
    pub inner: &'a T,
    /// ISO-8601 UTC with millisecond precision, e.g. `2025-03-01T09:30:00.000Z`
    pub timestamp: String,
}

impl<'a, T: Serialize> Stamped<'a, T> {
    pub fn now(inner: &'a T) -> Self {
        Self::at(inner, Utc::now())
    }

    pub fn at(inner: &'a T, at: DateTime<Utc>) -> Self {
        Self {
            inner,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        #[serde(rename = "jobType")]
        job_type: String,
    }

    #[test]
    fn test_timestamp_is_appended_to_fields() {
        let sample = Sample {
            name: "Jan".to_string(),
            job_type: "Lekkage".to_string(),
        };
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();

        let value = serde_json::to_value(Stamped::at(&sample, at)).unwrap();

        assert_eq!(
            value,
            json!({
                "name": "Jan",
                "jobType": "Lekkage",
                "timestamp": "2025-03-01T09:30:00.000Z"
            })
        );
    }
}
