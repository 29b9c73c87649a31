//! Constant-velocity Kalman filter over box geometry
//!
//! State vector:
//! ```text
//! [cx, cy, s, r, vcx, vcy, vs, vr]
//!  center  area aspect   first derivatives (per frame)
//! ```
//! Measurements observe `[cx, cy, s, r]` directly.

use nalgebra::{SMatrix, SVector};

use crate::bbox::BoundingBox;
use crate::config::KalmanNoise;
use crate::TrackerError;

type StateVector = SVector<f64, 8>;
type StateMatrix = SMatrix<f64, 8, 8>;
type MeasurementVector = SVector<f64, 4>;
type MeasurementMatrix = SMatrix<f64, 4, 4>;
type ObservationMatrix = SMatrix<f64, 4, 8>;

/// Kalman filter tracking one bounding box
#[derive(Debug, Clone)]
pub struct KalmanBoxFilter {
    /// State estimate
    state: StateVector,
    /// Error covariance
    covariance: StateMatrix,
    /// Transition (F)
    transition: StateMatrix,
    /// Observation (H)
    observation: ObservationMatrix,
    /// Process noise (Q)
    process_noise: StateMatrix,
    /// Measurement noise (R)
    measurement_noise: MeasurementMatrix,
}

impl KalmanBoxFilter {
    /// Initialise from a first detection with a zero velocity prior
    pub fn new(bbox: &BoundingBox, noise: &KalmanNoise) -> Self {
        let [cx, cy, s, r] = bbox.to_measurement();
        let state = StateVector::from_column_slice(&[cx, cy, s, r, 0.0, 0.0, 0.0, 0.0]);

        let p = noise.initial_position_variance;
        let v = noise.initial_velocity_variance;
        let covariance = StateMatrix::from_diagonal(&StateVector::from_column_slice(&[
            p, p, p, p, v, v, v, v,
        ]));

        let mut transition = StateMatrix::identity();
        for i in 0..4 {
            transition[(i, i + 4)] = 1.0;
        }

        let observation = ObservationMatrix::from_fn(|row, col| if row == col { 1.0 } else { 0.0 });

        let qp = noise.process_position;
        let qv = noise.process_velocity;
        let qs = noise.process_shape_velocity;
        let process_noise = StateMatrix::from_diagonal(&StateVector::from_column_slice(&[
            qp, qp, qp, qp, qv, qv, qs, qs,
        ]));

        let rp = noise.measurement_position;
        let rs = noise.measurement_shape;
        let measurement_noise =
            MeasurementMatrix::from_diagonal(&MeasurementVector::new(rp, rp, rs, rs));

        Self {
            state,
            covariance,
            transition,
            observation,
            process_noise,
            measurement_noise,
        }
    }

    /// Advance one frame: x = F x, P = F P F^T + Q
    pub fn predict(&mut self) -> Result<(), TrackerError> {
        // Area must not be driven negative by its own velocity
        if self.state[2] + self.state[6] <= 0.0 {
            self.state[6] = 0.0;
        }

        self.state = self.transition * self.state;
        self.covariance =
            self.transition * self.covariance * self.transition.transpose() + self.process_noise;

        self.check_finite()
    }

    /// Fold a measured box into the state
    pub fn update(&mut self, bbox: &BoundingBox) -> Result<(), TrackerError> {
        let z = MeasurementVector::from_column_slice(&bbox.to_measurement());

        let innovation = z - self.observation * self.state;
        let projected = self.observation * self.covariance;
        let s = projected * self.observation.transpose() + self.measurement_noise;

        let chol = s.cholesky().ok_or(TrackerError::IllConditioned)?;

        // K = P H^T S^-1 = (S^-1 H P)^T since P and S are symmetric
        let gain = chol.solve(&projected).transpose();

        self.state += gain * innovation;
        let identity = StateMatrix::identity();
        let updated = (identity - gain * self.observation) * self.covariance;
        self.covariance = (updated + updated.transpose()) * 0.5;

        self.check_finite()
    }

    /// Current box estimate; `None` if the area or aspect collapsed
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_measurement(self.state[0], self.state[1], self.state[2], self.state[3])
    }

    fn check_finite(&self) -> Result<(), TrackerError> {
        let finite = self.state.iter().all(|v| v.is_finite())
            && self.covariance.iter().all(|v| v.is_finite());
        if finite {
            Ok(())
        } else {
            Err(TrackerError::NonFiniteState)
        }
    }
}
