use nalgebra as na;

use crate::error::ObserverError;

/// Capability set shared by the observer variants.
///
/// An observer starts out uninitialized; `set_initial_state` makes it ready,
/// after which `compute` may be called once per sample for the lifetime of
/// the simulation.
pub trait Observer<const NX: usize> {
    /// Replace the stored estimate with `initial_state`.
    fn set_initial_state(&mut self, initial_state: &[f64]) -> Result<(), ObserverError>;

    /// Store the innovation gain, one entry per corrected state channel.
    ///
    /// May be called at any time between steps; entries are not validated
    /// numerically, a zero entry simply leaves that channel uncorrected.
    fn set_gain(&mut self, gain: &[f64]) -> Result<(), ObserverError>;

    /// Advance the estimate by exactly one sample time using the current
    /// measurement and input, and return the new estimate.
    fn compute(
        &mut self,
        measurement: f64,
        input: f64,
    ) -> Result<na::SVector<f64, NX>, ObserverError>;
}
