use std::collections::BTreeMap;

use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use serde::{Deserialize, Serialize};

use crate::roi::RoiRect;

/// One detection event as returned by `/api/detections`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub id: i64,
    /// ISO-8601 local timestamp, no timezone suffix.
    pub timestamp: String,
    pub class_name: String,
    pub confidence: f64,
    pub image_path: String,
    #[serde(default)]
    pub bbox_x: i64,
    #[serde(default)]
    pub bbox_y: i64,
    #[serde(default)]
    pub bbox_width: i64,
    #[serde(default)]
    pub bbox_height: i64,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Counts from `/api/detections/stats`. The class map is ordered so the
/// filter dropdown lists classes alphabetically without an extra sort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionStats {
    pub total_detections: i64,
    pub recent_detections: i64,
    #[serde(default)]
    pub detections_by_class: BTreeMap<String, i64>,
}

/// A registered detection source. The four roi_* columns are nullable on
/// the server; an ROI exists only when all four are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_detect_enabled: bool,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub roi_x1: Option<f64>,
    #[serde(default)]
    pub roi_y1: Option<f64>,
    #[serde(default)]
    pub roi_x2: Option<f64>,
    #[serde(default)]
    pub roi_y2: Option<f64>,
}

impl ClientRecord {
    /// All four or nothing. 0 is a valid coordinate, so presence is
    /// decided by the options themselves, never by value.
    pub fn roi(&self) -> Option<RoiRect> {
        match (self.roi_x1, self.roi_y1, self.roi_x2, self.roi_y2) {
            (Some(x1), Some(y1), Some(x2), Some(y2)) => Some(RoiRect::new(x1, y1, x2, y2)),
            _ => None,
        }
    }

    pub fn set_roi(&mut self, rect: Option<RoiRect>) {
        match rect {
            Some(rect) => {
                self.roi_x1 = Some(rect.x1);
                self.roi_y1 = Some(rect.y1);
                self.roi_x2 = Some(rect.x2);
                self.roi_y2 = Some(rect.y2);
            }
            None => {
                self.roi_x1 = None;
                self.roi_y1 = None;
                self.roi_x2 = None;
                self.roi_y2 = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roi_requires_all_four_fields() {
        let mut rec = ClientRecord {
            name: "gate camera".to_string(),
            ..Default::default()
        };
        assert_eq!(rec.roi(), None);

        rec.roi_x1 = Some(10.);
        rec.roi_y1 = Some(20.);
        rec.roi_x2 = Some(300.);
        assert_eq!(rec.roi(), None);

        rec.roi_y2 = Some(240.);
        assert_eq!(rec.roi(), Some(RoiRect::new(10., 20., 300., 240.)));
    }

    #[test]
    fn zero_is_a_valid_coordinate() {
        let mut rec = ClientRecord::default();
        rec.set_roi(Some(RoiRect::new(0., 0., 100., 100.)));
        assert_eq!(rec.roi(), Some(RoiRect::new(0., 0., 100., 100.)));
    }

    #[test]
    fn cleared_roi_serializes_as_nulls() {
        let mut rec = ClientRecord {
            id: Some(3),
            name: "yard".to_string(),
            ..Default::default()
        };
        rec.set_roi(None);

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["roi_x1"], serde_json::Value::Null);
        assert_eq!(json["roi_y2"], serde_json::Value::Null);
    }

    #[test]
    fn detection_parses_server_shape() {
        let json = r#"{
            "id": 7,
            "timestamp": "2025-06-01T12:30:00.123456",
            "class_name": "person",
            "confidence": 0.82,
            "image_path": "person_7.jpg",
            "bbox_x": 12,
            "bbox_y": 40,
            "bbox_width": 80,
            "bbox_height": 180,
            "metadata": {}
        }"#;
        let det: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(det.class_name, "person");
        assert_eq!(det.bbox_width, 80);
    }

    #[test]
    fn stats_classes_iterate_sorted() {
        let json = r#"{
            "total_detections": 12,
            "recent_detections": 3,
            "detections_by_class": {"truck": 2, "car": 6, "person": 4}
        }"#;
        let stats: DetectionStats = serde_json::from_str(json).unwrap();
        let classes: Vec<&str> = stats
            .detections_by_class
            .keys()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(classes, vec!["car", "person", "truck"]);
    }

    #[test]
    fn partial_roi_from_server_is_no_roi() {
        let json = r#"{"id": 1, "name": "lot", "roi_x1": 0.0}"#;
        let rec: ClientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.roi(), None);
    }
}
