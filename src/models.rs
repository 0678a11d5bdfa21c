use nalgebra as na;
use rand::distributions::Distribution;

/// Standard gravity in m/s^2.
pub const GRAVITY: f64 = 9.81;

/// Continuous-time plant seen by an observer.
///
/// The observer core only ever evaluates the state derivative and the
/// predicted output, so any model implementing these two maps can be plugged
/// in, including synthetic ones in tests.
pub trait PlantModel<const NX: usize> {
    /// State derivative at state `x` and input `u`.
    fn derivative(&self, x: &na::SVector<f64, NX>, u: f64) -> na::SVector<f64, NX>;

    /// Output predicted from state `x` (the quantity a sensor would measure).
    fn output(&self, x: &na::SVector<f64, NX>) -> f64;

    /// Open-loop explicit-Euler rollout of the plant.
    ///
    /// Returns `inputs.len() + 1` states, the initial state first.
    fn simulate(
        &self,
        x0: &na::SVector<f64, NX>,
        sample_time: f64,
        inputs: &[f64],
    ) -> Vec<na::SVector<f64, NX>> {
        let mut states = Vec::with_capacity(inputs.len() + 1);
        let mut x = *x0;
        states.push(x);
        for &u in inputs {
            x += self.derivative(&x, u) * sample_time;
            states.push(x);
        }
        states
    }
}

/// Physical constants of the two-tank rig, SI units.
#[derive(Debug, Clone, Copy)]
pub struct TankParams {
    /// Cross-section of tank 1 in m^2.
    pub tank1_area: f64,
    /// Cross-section of tank 2 in m^2.
    pub tank2_area: f64,
    /// Drain cross-section of tank 1 in m^2.
    pub drain1_area: f64,
    /// Drain cross-section of tank 2 in m^2.
    pub drain2_area: f64,
    /// Pump volume flow per volt in m^3/(V s).
    pub pump_gain: f64,
}

impl Default for TankParams {
    fn default() -> Self {
        Self {
            tank1_area: 1.539e-2,
            tank2_area: 1.539e-2,
            drain1_area: 1.257e-5,
            drain2_area: 1.131e-5,
            pump_gain: 3.43e-6,
        }
    }
}

/// Nonlinear coupled two-tank system.
///
/// dh1 = (Ku*u - AS1*sqrt(2*g*h1)) / AT1
/// dh2 = (AS1*sqrt(2*g*h1) - AS2*sqrt(2*g*h2)) / AT2
///
/// The pump feeds tank 1, tank 1 drains into tank 2, tank 2 drains out.
#[derive(Debug, Clone, Copy)]
pub struct TankSystem {
    params: TankParams,
}

impl TankSystem {
    pub fn new(params: TankParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TankParams {
        &self.params
    }

    /// Stationary heights for a constant pump voltage.
    pub fn equilibrium(&self, voltage: f64) -> na::SVector<f64, 2> {
        let flow = self.params.pump_gain * voltage.max(0.0);
        let h1 = (flow / self.params.drain1_area).powi(2) / (2.0 * GRAVITY);
        let h2 = (flow / self.params.drain2_area).powi(2) / (2.0 * GRAVITY);
        na::SVector::<f64, 2>::new(h1, h2)
    }

    /// Jacobian model about the equilibrium for `voltage`.
    ///
    /// Returns `None` when the equilibrium leaves a tank dry, since the
    /// outflow law is not differentiable at zero height.
    pub fn linearize(&self, voltage: f64) -> Option<LinearSystem<2>> {
        let x_op = self.equilibrium(voltage);
        if x_op[0] <= 0.0 || x_op[1] <= 0.0 {
            return None;
        }
        let p = &self.params;
        let slope1 = p.drain1_area * GRAVITY / (2.0 * GRAVITY * x_op[0]).sqrt();
        let slope2 = p.drain2_area * GRAVITY / (2.0 * GRAVITY * x_op[1]).sqrt();
        let a_matrix = na::SMatrix::<f64, 2, 2>::new(
            -slope1 / p.tank1_area,
            0.0,
            slope1 / p.tank2_area,
            -slope2 / p.tank2_area,
        );
        let b_matrix = na::SVector::<f64, 2>::new(p.pump_gain / p.tank1_area, 0.0);
        Some(LinearSystem::about(a_matrix, b_matrix, x_op, voltage))
    }
}

impl PlantModel<2> for TankSystem {
    fn derivative(&self, x: &na::SVector<f64, 2>, u: f64) -> na::SVector<f64, 2> {
        let p = &self.params;
        // outflow stalls once a tank runs dry
        let outflow1 = p.drain1_area * (2.0 * GRAVITY * x[0].max(0.0)).sqrt();
        let outflow2 = p.drain2_area * (2.0 * GRAVITY * x[1].max(0.0)).sqrt();
        na::SVector::<f64, 2>::new(
            (p.pump_gain * u - outflow1) / p.tank1_area,
            (outflow1 - outflow2) / p.tank2_area,
        )
    }

    fn output(&self, x: &na::SVector<f64, 2>) -> f64 {
        x[0]
    }
}

/// Linear(ized) state-space plant
/// dx = A*(x - x_op) + b*(u - u_op)
/// y = x[0]
#[derive(Debug, Clone, Copy)]
pub struct LinearSystem<const NX: usize> {
    a_matrix: na::SMatrix<f64, NX, NX>,
    b_matrix: na::SVector<f64, NX>,
    x_op: na::SVector<f64, NX>,
    u_op: f64,
}

impl<const NX: usize> LinearSystem<NX> {
    /// Linear plant with a zero operating point.
    pub fn new(a_matrix: na::SMatrix<f64, NX, NX>, b_matrix: na::SVector<f64, NX>) -> Self {
        Self::about(a_matrix, b_matrix, na::SVector::zeros(), 0.0)
    }

    /// Linear plant valid in deviations from the operating point `(x_op, u_op)`.
    pub fn about(
        a_matrix: na::SMatrix<f64, NX, NX>,
        b_matrix: na::SVector<f64, NX>,
        x_op: na::SVector<f64, NX>,
        u_op: f64,
    ) -> Self {
        Self {
            a_matrix,
            b_matrix,
            x_op,
            u_op,
        }
    }

    pub fn a_matrix(&self) -> &na::SMatrix<f64, NX, NX> {
        &self.a_matrix
    }

    pub fn b_matrix(&self) -> &na::SVector<f64, NX> {
        &self.b_matrix
    }

    /// Output row selecting the first state.
    pub fn output_matrix(&self) -> na::SMatrix<f64, 1, NX> {
        let mut c_matrix = na::SMatrix::<f64, 1, NX>::zeros();
        c_matrix[(0, 0)] = 1.0;
        c_matrix
    }
}

impl<const NX: usize> PlantModel<NX> for LinearSystem<NX> {
    fn derivative(&self, x: &na::SVector<f64, NX>, u: f64) -> na::SVector<f64, NX> {
        self.a_matrix * (x - self.x_op) + self.b_matrix * (u - self.u_op)
    }

    fn output(&self, x: &na::SVector<f64, NX>) -> f64 {
        x[0]
    }
}

/// Gaussian measurement-noise series for simulation-driven tests.
pub fn measurement_noise(std_dev: f64, len: usize) -> Vec<f64> {
    if std_dev == 0.0 {
        // no noise
        return vec![0.0; len];
    }
    let sampler = statrs::distribution::Normal::new(0.0, std_dev).unwrap();
    let mut rng = rand::rngs::OsRng;
    (0..len).map(|_| sampler.sample(&mut rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pump_fills_an_empty_tank() {
        let tank = TankSystem::new(TankParams::default());
        let dx = tank.derivative(&na::SVector::<f64, 2>::zeros(), 6.0);
        assert!(dx[0] > 0.0);
        assert_eq!(dx[1], 0.0);
    }

    #[test]
    fn derivative_stays_finite_for_dry_tanks() {
        let tank = TankSystem::new(TankParams::default());
        let dx = tank.derivative(&na::SVector::<f64, 2>::new(-0.01, -0.02), 2.0);
        assert!(dx[0].is_finite() && dx[1].is_finite());
        assert!(dx[0] > 0.0);
    }

    #[test]
    fn equilibrium_is_a_fixed_point() {
        let tank = TankSystem::new(TankParams::default());
        let x_eq = tank.equilibrium(6.3);
        assert!(x_eq[0] > 0.0 && x_eq[1] > 0.0);
        let dx = tank.derivative(&x_eq, 6.3);
        assert!(dx.norm() < 1.0e-12, "residual flow at equilibrium: {dx}");
    }

    #[test]
    fn linearization_matches_the_nonlinear_model_nearby() {
        let tank = TankSystem::new(TankParams::default());
        let linear = tank.linearize(6.3).unwrap();
        let x = tank.equilibrium(6.3) + na::SVector::<f64, 2>::new(1.0e-3, -1.0e-3);
        approx::assert_relative_eq!(
            tank.derivative(&x, 6.4),
            linear.derivative(&x, 6.4),
            epsilon = 1.0e-7
        );
    }

    #[test]
    fn no_linearization_without_pump_flow() {
        let tank = TankSystem::new(TankParams::default());
        assert!(tank.linearize(0.0).is_none());
    }

    #[test]
    fn simulate_starts_at_the_initial_state() {
        let plant = LinearSystem::new(
            na::SMatrix::<f64, 2, 2>::new(-1.0, 0.0, 1.0, -1.0),
            na::SVector::<f64, 2>::new(1.0, 0.0),
        );
        let x0 = na::SVector::<f64, 2>::new(0.3, 0.1);
        let inputs = vec![1.0; 50];
        let states = plant.simulate(&x0, 0.1, &inputs);
        assert_eq!(states.len(), inputs.len() + 1);
        assert_eq!(states[0], x0, "initial state is the first element");
        let x1 = x0 + plant.derivative(&x0, 1.0) * 0.1;
        assert_eq!(states[1], x1, "x(1) is located at states[1]");
    }

    #[test]
    fn zero_deviation_noise_is_silent() {
        let noise = measurement_noise(0.0, 16);
        assert_eq!(noise, vec![0.0; 16]);
    }

    #[test]
    fn noise_spread_follows_the_deviation() {
        let noise = measurement_noise(0.5, 4000);
        let mean = noise.iter().sum::<f64>() / noise.len() as f64;
        let var = noise.iter().map(|n| (n - mean).powi(2)).sum::<f64>() / noise.len() as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var.sqrt() - 0.5).abs() < 0.05, "std {}", var.sqrt());
    }
}
