use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::time::TsTime;

/// Top level response envelope.
/// `T` is whatever shape the caller expects under `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub data: T,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: i64,
}

impl<T> Response<T>
where
    T: DeserializeOwned,
{
    /// Decode a response body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Load a response saved to disk, e.g. a test fixture
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }
}

/// Convenience DTO for typical station requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationDto<M> {
    #[serde(default)]
    pub scode: String,
    #[serde(default)]
    pub sname: String,
    #[serde(default)]
    pub sorigin: String,
    #[serde(rename = "scoordinate", default)]
    pub scoord: Coordinate,
    #[serde(rename = "smetadata")]
    pub smeta: M,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f32,
    pub y: f32,
    pub srid: u32,
}

/// Convenience DTO for typical /latest requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestDto {
    #[serde(default)]
    pub mperiod: i64,
    #[serde(default)]
    pub mvalidtime: TsTime,
    #[serde(default)]
    pub mvalue: f64,
    #[serde(default)]
    pub scode: String,
    #[serde(default)]
    pub stype: String,
    #[serde(default)]
    pub tname: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_envelope_with_raw_data() {
        let body = br#"{"offset": 0, "limit": 200, "data": [{"scode": "a"}, {"scode": "b"}]}"#;
        let response: Response<Vec<Value>> = Response::from_slice(body).unwrap();

        assert_eq!(response.limit, 200);
        assert_eq!(response.offset, 0);
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[1]["scode"], "b");
    }

    #[test]
    fn test_latest_dto() {
        let body = br#"{
            "offset": 0,
            "limit": -1,
            "data": [{
                "mperiod": 300,
                "mvalidtime": "2024-05-02 10:15:00.000+0000",
                "mvalue": 42,
                "scode": "103",
                "stype": "ParkingStation",
                "tname": "free"
            }]
        }"#;
        let response: Response<Vec<LatestDto>> = Response::from_slice(body).unwrap();

        let latest = &response.data[0];
        assert_eq!(latest.mperiod, 300);
        assert_eq!(latest.mvalue, 42.0);
        assert_eq!(latest.tname, "free");
        assert_eq!(latest.mvalidtime.timestamp(), 1_714_644_900);
        assert_eq!(response.limit, -1);
    }

    #[test]
    fn test_station_dto_null_metadata() {
        let body = br#"{"data": [{"scode": "x", "smetadata": null}]}"#;
        let response: Response<Vec<StationDto<Option<Value>>>> = Response::from_slice(body).unwrap();

        assert_eq!(response.data[0].scode, "x");
        assert!(response.data[0].smeta.is_none());
        assert_eq!(response.data[0].scoord, Coordinate::default());
    }

    #[test]
    fn test_decode_error() {
        let result: Result<Response<Vec<LatestDto>>> = Response::from_slice(b"<html>");
        assert!(matches!(result, Err(crate::error::OdhError::Decode(_))));
    }
}
