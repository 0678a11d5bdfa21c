use debug_print::debug_println;
use nalgebra as na;

/// Determine if a continuous-time system matrix is Hurwitz stable.
pub fn is_stable(a_matrix: &na::DMatrix<f64>) -> bool {
    assert!(a_matrix.is_square());
    // Convert to complex matrix to solve eigenvalues
    let a_complex = a_matrix.map(|x| na::Complex::new(x, 0.0));
    match a_complex.eigenvalues() {
        Some(eigenvalues) => eigenvalues.iter().all(|eigenvalue| eigenvalue.re < 0.0),
        // eigenvalue iteration failed, stability is not established
        None => false,
    }
}

/// Determine if every state of `(A, C)` is visible in the output.
///
/// Rank test on the observability matrix `[C; C*A; ...; C*A^(n-1)]`.
pub fn is_observable(a_matrix: &na::DMatrix<f64>, c_matrix: &na::DMatrix<f64>) -> bool {
    assert!(a_matrix.is_square());
    assert_eq!(a_matrix.ncols(), c_matrix.ncols());
    let n = a_matrix.nrows();
    let p = c_matrix.nrows();

    let mut obs_matrix = na::DMatrix::<f64>::zeros(n * p, n);
    let mut block = c_matrix.clone();
    for i in 0..n {
        obs_matrix.rows_mut(i * p, p).copy_from(&block);
        block = &block * a_matrix;
    }

    let eps = 1.0e-9 * obs_matrix.norm().max(1.0);
    obs_matrix.rank(eps) == n
}

/// Determine if `(A, C)` is detectable.
///
/// Continuous-time PHB test: for every eigenvalue with nonnegative real part,
/// `rank [A - lambda*I; C]` must equal the state dimension.
/// See https://en.wikipedia.org/wiki/Hautus_lemma
pub fn is_detectable(a_matrix: &na::DMatrix<f64>, c_matrix: &na::DMatrix<f64>) -> bool {
    assert!(a_matrix.is_square());
    assert_eq!(a_matrix.ncols(), c_matrix.ncols());
    let n = a_matrix.nrows();
    let p = c_matrix.nrows();

    let a_complex = a_matrix.map(|x| na::Complex::new(x, 0.0));
    let c_complex = c_matrix.map(|x| na::Complex::new(x, 0.0));
    let eigenvalues = match a_complex.eigenvalues() {
        Some(eigenvalues) => eigenvalues,
        None => return false,
    };

    for eigenvalue in eigenvalues.iter() {
        if eigenvalue.re < 0.0 {
            // stable modes need no correction
            continue;
        }
        let shifted = &a_complex - na::DMatrix::from_diagonal_element(n, n, *eigenvalue);
        let mut phb_matrix = na::DMatrix::<na::Complex<f64>>::zeros(n + p, n);
        phb_matrix.rows_mut(0, n).copy_from(&shifted);
        phb_matrix.rows_mut(n, p).copy_from(&c_complex);

        let eps = 1.0e-9 * phb_matrix.norm().max(1.0);
        if phb_matrix.rank(eps) != n {
            return false;
        }
    }
    true
}

/// Ackermann observer-gain synthesis for a two-state plant.
///
/// Places the eigenvalues of `A - L*C` at the requested poles and returns
/// `L`. Returns `None` when `(A, C)` is not observable.
pub fn place_observer_poles(
    a_matrix: &na::SMatrix<f64, 2, 2>,
    c_matrix: &na::SMatrix<f64, 1, 2>,
    poles: (f64, f64),
) -> Option<na::SVector<f64, 2>> {
    let ca = c_matrix * a_matrix;
    let obs_matrix = na::SMatrix::<f64, 2, 2>::new(
        c_matrix[(0, 0)],
        c_matrix[(0, 1)],
        ca[(0, 0)],
        ca[(0, 1)],
    );
    let obs_inv = obs_matrix.try_inverse()?;

    // q(A) = (A - p1*I)(A - p2*I), the desired characteristic polynomial in A
    let (p1, p2) = poles;
    let identity = na::SMatrix::<f64, 2, 2>::identity();
    let q = (a_matrix - identity * p1) * (a_matrix - identity * p2);

    let gain = q * obs_inv * na::SVector::<f64, 2>::new(0.0, 1.0);
    debug_println!("placed observer poles {:?}, gain {:?}", poles, gain);
    Some(gain)
}
