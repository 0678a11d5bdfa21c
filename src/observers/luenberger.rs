use debug_print::debug_println;
use nalgebra as na;

use crate::error::ObserverError;
use crate::models::{LinearSystem, PlantModel, TankSystem};

use super::observer::Observer;

/// Luenberger-style observer integrated with fixed-step explicit Euler.
///
/// x_hat' = x_hat + T * (f(x_hat, u) + L * (y - g(x_hat)))
#[derive(Clone, Copy)]
pub struct LuenbergerObserver<M, const NX: usize> {
    model: M,
    sample_time: f64,
    gain: na::SVector<f64, NX>,
    x_hat: Option<na::SVector<f64, NX>>,
}

/// Observer running the nonlinear two-tank model.
pub type TankObserver = LuenbergerObserver<TankSystem, 2>;

/// Observer running a linearized two-tank model.
pub type LinearTankObserver = LuenbergerObserver<LinearSystem<2>, 2>;

impl<M: PlantModel<NX>, const NX: usize> LuenbergerObserver<M, NX> {
    /// Create an uninitialized observer with zero gain (open loop).
    ///
    /// The sample time is fixed for the lifetime of the observer.
    pub fn new(model: M, sample_time: f64) -> Result<Self, ObserverError> {
        if !sample_time.is_finite() || sample_time <= 0.0 {
            return Err(ObserverError::InvalidSampleTime(sample_time));
        }
        Ok(Self {
            model,
            sample_time,
            gain: na::SVector::zeros(),
            x_hat: None,
        })
    }

    pub fn sample_time(&self) -> f64 {
        self.sample_time
    }

    pub fn gain(&self) -> &na::SVector<f64, NX> {
        &self.gain
    }

    /// Current estimate, `None` until an initial state has been set.
    pub fn estimate(&self) -> Option<&na::SVector<f64, NX>> {
        self.x_hat.as_ref()
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M: PlantModel<NX>, const NX: usize> Observer<NX> for LuenbergerObserver<M, NX> {
    fn set_initial_state(&mut self, initial_state: &[f64]) -> Result<(), ObserverError> {
        if initial_state.len() != NX {
            return Err(ObserverError::DimensionMismatch {
                expected: NX,
                actual: initial_state.len(),
            });
        }
        self.x_hat = Some(na::SVector::from_column_slice(initial_state));
        Ok(())
    }

    fn set_gain(&mut self, gain: &[f64]) -> Result<(), ObserverError> {
        if gain.len() != NX {
            return Err(ObserverError::DimensionMismatch {
                expected: NX,
                actual: gain.len(),
            });
        }
        self.gain = na::SVector::from_column_slice(gain);
        debug_println!("observer gain set to {:?}", gain);
        Ok(())
    }

    fn compute(
        &mut self,
        measurement: f64,
        input: f64,
    ) -> Result<na::SVector<f64, NX>, ObserverError> {
        let x_hat = self.x_hat.ok_or(ObserverError::Uninitialized)?;

        let innovation = measurement - self.model.output(&x_hat);
        let dx = self.model.derivative(&x_hat, input) + self.gain * innovation;
        let x_next = x_hat + dx * self.sample_time;

        self.x_hat = Some(x_next);
        Ok(x_next)
    }
}
