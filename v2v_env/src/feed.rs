//! Fleet feed wire format.
//!
//! The transport backend pushes a JSON mapping `agentId → record` whenever
//! any peer updates. The record layout matches what each peer broadcasts
//! after its own motion estimation:
//!
//! ```json
//! { "lat": 12.9716, "lng": 77.5946, "speedKmh": 60.0,
//!   "headingDeg": 90.0, "timestampMs": 1712000000000, "braking": false }
//! ```
//!
//! Decoding is a transport concern; semantic validation (finite fields,
//! heading range) happens in the core, where an invalid record is treated
//! as absent rather than as a fault.

use crate::error::EnvError;
use crate::types::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One peer's broadcast state, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerStateRecord {
    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lng: f64,

    /// Speed in km/h as derived by the peer's motion estimator
    pub speed_kmh: f64,

    /// Heading in degrees, [0, 360)
    pub heading_deg: f64,

    /// Timestamp of the underlying fix (sender's clock, ms)
    pub timestamp_ms: i64,

    /// Sudden-braking flag as detected by the peer
    pub braking: bool,
}

/// Decodes a pushed fleet snapshot into per-agent records.
///
/// Rejects the whole payload on malformed JSON or an empty agent key;
/// callers treat a rejected payload as "no update arrived".
pub fn decode_feed(json: &str) -> Result<HashMap<AgentId, PeerStateRecord>, EnvError> {
    let raw: HashMap<String, PeerStateRecord> = serde_json::from_str(json)?;

    let mut feed = HashMap::with_capacity(raw.len());
    for (key, record) in raw {
        if key.is_empty() {
            return Err(EnvError::invalid("empty agent id key"));
        }
        feed.insert(AgentId::from_key(key), record);
    }
    Ok(feed)
}

/// Encodes per-agent records into the wire payload.
pub fn encode_feed(feed: &HashMap<AgentId, PeerStateRecord>) -> Result<String, EnvError> {
    let raw: HashMap<&str, &PeerStateRecord> =
        feed.iter().map(|(id, rec)| (id.as_str(), rec)).collect();
    Ok(serde_json::to_string(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_feed_wire_names() {
        let json = r#"{
            "veh-a": { "lat": 12.9716, "lng": 77.5946, "speedKmh": 60.0,
                       "headingDeg": 90.0, "timestampMs": 1000, "braking": false }
        }"#;

        let feed = decode_feed(json).unwrap();
        let record = feed.get(&AgentId::from_key("veh-a")).unwrap();

        assert_eq!(record.lat, 12.9716);
        assert_eq!(record.speed_kmh, 60.0);
        assert_eq!(record.heading_deg, 90.0);
        assert!(!record.braking);
    }

    #[test]
    fn test_decode_feed_malformed() {
        assert!(decode_feed("not json").is_err());
    }

    #[test]
    fn test_decode_feed_empty_key() {
        let json = r#"{ "": { "lat": 0.0, "lng": 0.0, "speedKmh": 0.0,
                              "headingDeg": 0.0, "timestampMs": 0, "braking": false } }"#;
        assert!(matches!(
            decode_feed(json),
            Err(EnvError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_encode_feed_round() {
        let mut feed = HashMap::new();
        feed.insert(
            AgentId::from_key("veh-b"),
            PeerStateRecord {
                lat: 1.0,
                lng: 2.0,
                speed_kmh: 30.0,
                heading_deg: 180.0,
                timestamp_ms: 42,
                braking: true,
            },
        );

        let json = encode_feed(&feed).unwrap();
        assert!(json.contains("speedKmh"));
        assert_eq!(decode_feed(&json).unwrap(), feed);
    }
}
