//! JSON batch adapter.
//!
//! A thin serde layer for feeding the normalizer from a file: a batch holds
//! routes and trips with their stop times, named after the GTFS fields they
//! come from. The output is one record per normalized trip.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::NormalizerConfig;
use crate::domain::{
    Direction, FeedRoute, InvalidStopId, RouteId, ScheduleTime, StopId, StopTime, TimeError, Trip,
    TripId,
};
use crate::normalize::clean::clean_stop_name;
use crate::normalize::{NormalizeError, NormalizedTrip, Normalizer};
use crate::rules::{RuleSet, RuleTableError};

/// Error reading or normalizing a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Failed to read the batch file
    #[error("failed to read batch: {0}")]
    Io(#[from] std::io::Error),

    /// Batch is not valid JSON for the expected shape
    #[error("invalid batch JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidStopId(#[from] InvalidStopId),

    #[error(transparent)]
    InvalidTime(#[from] TimeError),

    /// `direction_id` other than 0 or 1
    #[error("trip {trip}: invalid direction_id {value}")]
    InvalidDirection { trip: String, value: u8 },

    /// Stop time departs before it arrives
    #[error("stop {stop} (sequence {sequence}): departure before arrival")]
    DepartureBeforeArrival { stop: String, sequence: u32 },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// Rule set failed validation
    #[error("invalid rule set: {0}")]
    Rules(#[from] RuleTableError),
}

/// Routes and trips of one feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedBatch {
    pub routes: Vec<RouteRecord>,
    pub trips: Vec<TripRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub route_id: String,
    pub route_short_name: String,
    #[serde(default)]
    pub route_long_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip_id: String,
    /// Feed route code, e.g. "3C".
    pub route_id: String,
    #[serde(default)]
    pub trip_headsign: String,
    #[serde(default)]
    pub direction_id: Option<u8>,
    #[serde(default)]
    pub stop_times: Vec<StopTimeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTimeRecord {
    pub stop_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_name: Option<String>,
    pub stop_sequence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
}

/// One normalized trip, as written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTripRecord {
    pub trip_id: String,
    /// Derived numeric route identifier.
    pub route_id: u64,
    pub direction_id: u8,
    pub trip_headsign: String,
    pub stop_times: Vec<StopTimeRecord>,
}

impl FeedBatch {
    /// Read a batch from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BatchError> {
        let text = fs::read_to_string(path.as_ref())?;
        let batch: FeedBatch = serde_json::from_str(&text)?;
        debug!(
            path = %path.as_ref().display(),
            routes = batch.routes.len(),
            trips = batch.trips.len(),
            "loaded batch"
        );
        Ok(batch)
    }

    /// Normalize every trip of the batch.
    pub fn normalize(
        self,
        rules: &RuleSet,
        config: NormalizerConfig,
    ) -> Result<Vec<NormalizedTripRecord>, BatchError> {
        let normalizer = Normalizer::new(rules, config);
        let feed_routes: Vec<FeedRoute> = self.routes.into_iter().map(FeedRoute::from).collect();
        let routes = normalizer.build_routes(&feed_routes)?;
        let trips = self
            .trips
            .into_iter()
            .map(Trip::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(normalizer
            .normalize(&routes, trips)?
            .into_iter()
            .map(NormalizedTripRecord::from)
            .collect())
    }
}

impl From<RouteRecord> for FeedRoute {
    fn from(record: RouteRecord) -> Self {
        FeedRoute {
            code: record.route_id,
            short_name: record.route_short_name,
            long_name: record.route_long_name,
        }
    }
}

impl TryFrom<TripRecord> for Trip {
    type Error = BatchError;

    fn try_from(record: TripRecord) -> Result<Self, Self::Error> {
        let route_id = RouteId::parse(&record.route_id).map_err(NormalizeError::from)?;
        let stop_times = record
            .stop_times
            .iter()
            .map(StopTime::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut trip = Trip::new(TripId::new(record.trip_id.as_str()), route_id, record.trip_headsign)
            .with_stop_times(stop_times);
        if let Some(value) = record.direction_id {
            let direction = Direction::from_index(value).ok_or(BatchError::InvalidDirection {
                trip: record.trip_id,
                value,
            })?;
            trip = trip.with_direction_flag(direction);
        }
        Ok(trip)
    }
}

impl TryFrom<&StopTimeRecord> for StopTime {
    type Error = BatchError;

    fn try_from(record: &StopTimeRecord) -> Result<Self, Self::Error> {
        let parse_time = |s: &Option<String>| {
            s.as_deref()
                .map(ScheduleTime::parse_hhmmss)
                .transpose()
        };
        let arrival = parse_time(&record.arrival_time)?;
        let departure = parse_time(&record.departure_time)?;
        if let (Some(arrival), Some(departure)) = (arrival, departure) {
            if departure.signed_duration_since(arrival) < Duration::zero() {
                return Err(BatchError::DepartureBeforeArrival {
                    stop: record.stop_id.clone(),
                    sequence: record.stop_sequence,
                });
            }
        }

        Ok(StopTime {
            stop_id: StopId::parse(&record.stop_id)?,
            sequence: record.stop_sequence,
            name: record.stop_name.as_deref().map(clean_stop_name),
            arrival,
            departure,
        })
    }
}

impl From<&StopTime> for StopTimeRecord {
    fn from(stop_time: &StopTime) -> Self {
        StopTimeRecord {
            stop_id: stop_time.stop_id.as_str().to_string(),
            stop_name: stop_time.name.clone(),
            stop_sequence: stop_time.sequence,
            arrival_time: stop_time.arrival.map(|t| t.to_string()),
            departure_time: stop_time.departure.map(|t| t.to_string()),
        }
    }
}

impl From<NormalizedTrip> for NormalizedTripRecord {
    fn from(trip: NormalizedTrip) -> Self {
        NormalizedTripRecord {
            trip_id: trip.trip_id.as_str().to_string(),
            route_id: trip.route_id.value(),
            direction_id: trip.direction.index(),
            trip_headsign: trip.headsign,
            stop_times: trip.ordered_stops.iter().map(StopTimeRecord::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::rules::thunder_bay;

    const BATCH: &str = r#"{
        "routes": [
            {"route_id": "4", "route_short_name": "4"},
            {"route_id": "1", "route_short_name": "1", "route_long_name": "MAINLINE"}
        ],
        "trips": [
            {
                "trip_id": "T1",
                "route_id": "4",
                "trip_headsign": "Neebing",
                "stop_times": [
                    {"stop_id": "1521", "stop_name": "Memorial Avenue & First Street", "stop_sequence": 2, "arrival_time": "06:05:00", "departure_time": "06:05:00"},
                    {"stop_id": "1615", "stop_sequence": 1, "arrival_time": "06:00:00", "departure_time": "06:00:00"},
                    {"stop_id": "1019", "stop_sequence": 3, "arrival_time": "25:10:00", "departure_time": "25:10:00"}
                ]
            },
            {"trip_id": "T2", "route_id": "1", "trip_headsign": "Mainline to City Hall", "direction_id": 0},
            {"trip_id": "T3", "route_id": "1", "trip_headsign": "OFF ONLY"}
        ]
    }"#;

    fn write_batch(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_and_normalize() {
        let file = write_batch(BATCH);
        let batch = FeedBatch::load(file.path()).unwrap();
        assert_eq!(batch.routes.len(), 2);
        assert_eq!(batch.trips.len(), 3);

        let rules = thunder_bay().unwrap();
        let out = batch.normalize(&rules, NormalizerConfig::default()).unwrap();
        assert_eq!(out.len(), 2);

        assert_eq!(out[0].trip_id, "T2");
        assert_eq!(out[0].route_id, 1);
        assert_eq!(out[0].direction_id, 0);
        assert_eq!(out[0].trip_headsign, "City Hall");

        assert_eq!(out[1].trip_id, "T1");
        assert_eq!(out[1].direction_id, 0);
        assert_eq!(out[1].trip_headsign, "East");
        let stops: Vec<&str> = out[1].stop_times.iter().map(|s| s.stop_id.as_str()).collect();
        assert_eq!(stops, vec!["1615", "1521", "1019"]);
        assert_eq!(out[1].stop_times[2].arrival_time.as_deref(), Some("25:10:00"));
        assert_eq!(out[1].stop_times[1].stop_name.as_deref(), Some("Memorial Ave & 1st St"));
        assert_eq!(out[1].stop_times[0].stop_name, None);
    }

    #[test]
    fn output_serializes_to_json() {
        let record = NormalizedTripRecord {
            trip_id: "T1".into(),
            route_id: 3_003,
            direction_id: 1,
            trip_headsign: "Northwood".into(),
            stop_times: vec![StopTimeRecord {
                stop_id: "1019".into(),
                stop_name: None,
                stop_sequence: 1,
                arrival_time: None,
                departure_time: None,
            }],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "trip_id": "T1",
                "route_id": 3003,
                "direction_id": 1,
                "trip_headsign": "Northwood",
                "stop_times": [{"stop_id": "1019", "stop_sequence": 1}]
            })
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FeedBatch::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BatchError::Io(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let file = write_batch("{\"routes\": [}");
        assert!(matches!(
            FeedBatch::load(file.path()).unwrap_err(),
            BatchError::Json(_)
        ));
    }

    #[test]
    fn invalid_records_are_rejected() {
        let trip = |direction_id, stop_id: &str, time: &str| TripRecord {
            trip_id: "T9".into(),
            route_id: "1".into(),
            trip_headsign: "Mainline to City Hall".into(),
            direction_id,
            stop_times: vec![StopTimeRecord {
                stop_id: stop_id.into(),
                stop_name: None,
                stop_sequence: 1,
                arrival_time: Some(time.into()),
                departure_time: None,
            }],
        };

        assert!(matches!(
            Trip::try_from(trip(Some(2), "1019", "06:00:00")),
            Err(BatchError::InvalidDirection { value: 2, .. })
        ));
        assert!(matches!(
            Trip::try_from(trip(None, "City Hall", "06:00:00")),
            Err(BatchError::InvalidStopId(_))
        ));
        assert!(matches!(
            Trip::try_from(trip(None, "1019", "6am")),
            Err(BatchError::InvalidTime(_))
        ));

        let mut early_departure = trip(None, "1019", "06:00:00");
        early_departure.stop_times[0].departure_time = Some("05:59:00".into());
        assert!(matches!(
            Trip::try_from(early_departure),
            Err(BatchError::DepartureBeforeArrival { sequence: 1, .. })
        ));

        let mut bad_route = trip(None, "1019", "06:00:00");
        bad_route.route_id = "X".into();
        assert!(matches!(
            Trip::try_from(bad_route),
            Err(BatchError::Normalize(NormalizeError::MalformedRouteCode(_)))
        ));
    }
}
