//! Object classes and their physical reference sizes

use serde::{Deserialize, Serialize};

pub use tracker::ObjectClass;

/// Typical physical extent of an object class (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSize {
    pub height_m: f64,
    pub width_m: f64,
    pub length_m: f64,
}

impl ReferenceSize {
    /// Generic passenger vehicle, also used for unknown classes
    pub const VEHICLE: Self = Self::new(1.5, 1.8, 4.5);

    const fn new(height_m: f64, width_m: f64, length_m: f64) -> Self {
        Self { height_m, width_m, length_m }
    }

    /// Reference size for a class
    pub fn for_class(class: ObjectClass) -> Self {
        match class {
            ObjectClass::Car => Self::VEHICLE,
            ObjectClass::Truck => Self::new(3.0, 2.5, 10.0),
            ObjectClass::Bus => Self::new(3.2, 2.55, 12.0),
            ObjectClass::Motorcycle => Self::new(1.4, 0.8, 2.2),
            ObjectClass::Bicycle => Self::new(1.7, 0.6, 1.8),
            ObjectClass::Pedestrian => Self::new(1.7, 0.5, 0.5),
            ObjectClass::Unknown => Self::VEHICLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_falls_back_to_vehicle() {
        assert_eq!(ReferenceSize::for_class(ObjectClass::Unknown), ReferenceSize::VEHICLE);
        assert_eq!(ReferenceSize::for_class(ObjectClass::Car).height_m, 1.5);
    }
}
