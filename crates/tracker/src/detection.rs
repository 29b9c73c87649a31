//! Per-frame detector output

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bbox::BoundingBox;

/// Object class reported by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Car,
    Truck,
    Bus,
    Motorcycle,
    Bicycle,
    Pedestrian,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ObjectClass {
    /// Map a detector label (COCO-style names included) to a class
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "car" | "vehicle" | "van" | "suv" => Self::Car,
            "truck" | "lorry" => Self::Truck,
            "bus" => Self::Bus,
            "motorcycle" | "motorbike" => Self::Motorcycle,
            "bicycle" | "bike" | "cyclist" => Self::Bicycle,
            "person" | "pedestrian" => Self::Pedestrian,
            _ => Self::Unknown,
        }
    }

    pub fn is_pedestrian(&self) -> bool {
        matches!(self, Self::Pedestrian)
    }

    /// Motorised road users that can lead the ego vehicle in its lane
    pub fn is_vehicle(&self) -> bool {
        matches!(
            self,
            Self::Car | Self::Truck | Self::Bus | Self::Motorcycle | Self::Unknown
        )
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Car => "car",
            Self::Truck => "truck",
            Self::Bus => "bus",
            Self::Motorcycle => "motorcycle",
            Self::Bicycle => "bicycle",
            Self::Pedestrian => "pedestrian",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A single detection; lives for one frame only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box in pixels
    pub bbox: BoundingBox,

    /// Object class
    #[serde(default)]
    pub class: ObjectClass,

    /// Detection confidence in [0, 1]
    pub confidence: f64,
}

impl Detection {
    pub fn new(bbox: BoundingBox, class: ObjectClass, confidence: f64) -> Self {
        Self { bbox, class, confidence }
    }

    /// Box is non-degenerate and confidence lies in [0, 1]
    pub fn is_well_formed(&self) -> bool {
        self.bbox.is_valid() && (0.0..=1.0).contains(&self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping() {
        assert_eq!(ObjectClass::from_label("person"), ObjectClass::Pedestrian);
        assert_eq!(ObjectClass::from_label(" Truck "), ObjectClass::Truck);
        assert_eq!(ObjectClass::from_label("traffic light"), ObjectClass::Unknown);
    }

    #[test]
    fn test_unknown_label_deserializes() {
        let class: ObjectClass = serde_json::from_str("\"tractor\"").unwrap();
        assert_eq!(class, ObjectClass::Unknown);
    }

    #[test]
    fn test_well_formed() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(Detection::new(bbox, ObjectClass::Car, 0.9).is_well_formed());
        assert!(!Detection::new(bbox, ObjectClass::Car, 1.5).is_well_formed());
        assert!(!Detection::new(bbox, ObjectClass::Car, f64::NAN).is_well_formed());
        let flat = BoundingBox::new(0.0, 5.0, 10.0, 5.0);
        assert!(!Detection::new(flat, ObjectClass::Car, 0.9).is_well_formed());
    }
}
