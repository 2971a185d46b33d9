//! Wall-clock timestamps as exposed over the API.
//!
//! All timestamps leave the process as integer milliseconds since the Unix
//! epoch; an absent timestamp is `0`.

use std::time::{Duration, SystemTime};

use serde::Serializer;

/// Milliseconds since the Unix epoch, `0` for times before it.
pub fn to_millis(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Whole milliseconds of a duration, saturating.
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub fn serialize_millis<S: Serializer>(time: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(to_millis(*time))
}

pub fn serialize_opt_millis<S: Serializer>(
    time: &Option<SystemTime>,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_u64(time.map(to_millis).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_millis() {
        assert_eq!(to_millis(SystemTime::UNIX_EPOCH), 0);
        assert_eq!(
            to_millis(SystemTime::UNIX_EPOCH + Duration::from_millis(1500)),
            1500
        );
    }

    #[test]
    fn test_serialize_absent_is_zero() {
        #[derive(serde::Serialize)]
        struct Stamp {
            #[serde(serialize_with = "serialize_opt_millis")]
            at: Option<SystemTime>,
        }
        let json = serde_json::to_string(&Stamp { at: None }).unwrap();
        assert_eq!(json, r#"{"at":0}"#);
    }
}
