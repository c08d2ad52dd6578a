//! Angle wrapping, ZYZ decomposition, principal square root, and dephased
//! matrix signatures — the small pieces of numerical machinery every other
//! pass in this crate builds on.

use crate::error::{CompileError, CompileResult};
use num_complex::Complex64;
use qtx_ir::Unitary2x2;
use std::f64::consts::PI;

/// Singularity tolerance for ZYZ decomposition (`|det U| < EPSILON` fails).
pub const EPSILON: f64 = 1e-10;

/// Threshold below which `sin(theta/2)` is treated as zero in ZYZ.
const SIN_HALF_THETA_TOL: f64 = 1e-12;

/// Decimal places matrix signatures are rounded to before comparison.
const SIGNATURE_DECIMALS: i32 = 12;

/// Wrap `angle` to `(-pi, pi]`, with the boundary convention `-pi -> +pi`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// ZYZ decomposition of a 2x2 unitary: `(theta, phi, gamma)` such that
/// `RZ(phi) . RY(theta) . RZ(gamma) == U` up to global phase.
pub fn zyz_decompose(u: &Unitary2x2) -> CompileResult<(f64, f64, f64)> {
    let det = u.det();
    if det.norm() < EPSILON {
        return Err(CompileError::SingularMatrix { tolerance: EPSILON });
    }

    let [a, b, c, d] = u.data;
    let theta = 2.0 * b.norm().atan2(a.norm());

    if (theta / 2.0).sin() < SIN_HALF_THETA_TOL {
        return Ok((0.0, 0.0, d.arg()));
    }

    let phi = c.arg();
    let gamma = (-b).arg();
    Ok((theta, phi, gamma))
}

/// Principal square root `V` of a 2x2 unitary `U` (`V^2 == U`), computed by
/// projecting `U`'s eigenvalues onto the unit circle and halving their
/// phases.
pub fn principal_sqrt(u: &Unitary2x2) -> Unitary2x2 {
    let [a, b, c, d] = u.data;
    let trace = a + d;
    let det = u.det();

    // Eigenvalues of a 2x2 matrix: roots of lambda^2 - trace*lambda + det = 0.
    let disc = (trace * trace - Complex64::new(4.0, 0.0) * det).sqrt();
    let lambda1 = project_to_unit_circle((trace + disc) / 2.0);
    let lambda2 = project_to_unit_circle((trace - disc) / 2.0);
    let sqrt_lambda1 = Complex64::from_polar(1.0, lambda1.arg() / 2.0);
    let sqrt_lambda2 = Complex64::from_polar(1.0, lambda2.arg() / 2.0);

    // Eigenvectors via the standard 2x2 formula; degenerate to identity axes
    // when off-diagonal entries vanish (U already diagonal).
    if b.norm() < EPSILON && c.norm() < EPSILON {
        return Unitary2x2::new(
            sqrt_lambda1,
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            sqrt_lambda2,
        );
    }

    // Eigenvector for lambda1: (b, lambda1 - a), normalized.
    let v1 = (b, lambda1 - a);
    let n1 = (v1.0.norm_sqr() + v1.1.norm_sqr()).sqrt();
    let v1 = (v1.0 / n1, v1.1 / n1);

    // Eigenvector for lambda2: (lambda2 - d, c), normalized.
    let v2 = (lambda2 - d, c);
    let n2 = (v2.0.norm_sqr() + v2.1.norm_sqr()).sqrt();
    let v2 = (v2.0 / n2, v2.1 / n2);

    // V = P . diag(sqrt_lambda1, sqrt_lambda2) . P^-1, with P = [v1 | v2].
    let p = Unitary2x2::new(v1.0, v2.0, v1.1, v2.1);
    let p_inv_det = v1.0 * v2.1 - v2.0 * v1.1;
    let p_inv = Unitary2x2::new(v2.1, -v2.0, -v1.1, v1.0).scale(Complex64::new(1.0, 0.0) / p_inv_det);
    let d_sqrt = Unitary2x2::new(
        sqrt_lambda1,
        Complex64::new(0.0, 0.0),
        Complex64::new(0.0, 0.0),
        sqrt_lambda2,
    );
    p.mul(&d_sqrt).mul(&p_inv)
}

fn project_to_unit_circle(z: Complex64) -> Complex64 {
    if z.norm() < 1e-15 {
        Complex64::new(1.0, 0.0)
    } else {
        z / z.norm()
    }
}

/// Dephased signature of a unitary: multiply by `exp(-i arg(first nonzero
/// entry))`, round to 12 decimals, and return the flat `(re, im)` tuple for
/// each of the four entries. Used as a hashable fallback key for
/// matrix-based identity detection.
pub fn dephased_signature(u: &Unitary2x2) -> [(i64, i64); 4] {
    let phase_ref = u
        .data
        .iter()
        .find(|z| z.norm() > 1e-12)
        .map(|z| z.arg())
        .unwrap_or(0.0);
    let dephase = Complex64::from_polar(1.0, -phase_ref);

    let scale = 10f64.powi(SIGNATURE_DECIMALS);
    let mut out = [(0i64, 0i64); 4];
    for (i, z) in u.data.iter().enumerate() {
        let dz = z * dephase;
        out[i] = (
            (dz.re * scale).round() as i64,
            (dz.im * scale).round() as i64,
        );
    }
    out
}

trait ScaleExt {
    fn scale(&self, factor: Complex64) -> Self;
}

impl ScaleExt for Unitary2x2 {
    fn scale(&self, factor: Complex64) -> Self {
        Unitary2x2::new(
            self.data[0] * factor,
            self.data[1] * factor,
            self.data[2] * factor,
            self.data[3] * factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_angle_boundary_is_plus_pi() {
        assert!((wrap_angle(-PI) - PI).abs() < 1e-15);
        assert!((wrap_angle(PI) - PI).abs() < 1e-15);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for raw in [-10.0, -PI - 0.01, 0.0, 3.0, 10.5] {
            let w = wrap_angle(raw);
            assert!(w > -PI && w <= PI, "{w} out of range for input {raw}");
        }
    }

    #[test]
    fn zyz_reconstructs_hadamard() {
        let h = Unitary2x2::h();
        let (theta, phi, gamma) = zyz_decompose(&h).unwrap();
        let reconstructed = Unitary2x2::rz(phi).mul(&Unitary2x2::ry(theta)).mul(&Unitary2x2::rz(gamma));
        // Equal up to global phase: compare dephased signatures.
        assert_eq!(dephased_signature(&h), dephased_signature(&reconstructed));
    }

    #[test]
    fn zyz_rejects_singular_matrix() {
        let singular = Unitary2x2::new(
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        );
        assert!(matches!(
            zyz_decompose(&singular),
            Err(CompileError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn principal_sqrt_of_x_squares_back_to_x() {
        let x = Unitary2x2::x();
        let v = principal_sqrt(&x);
        let v2 = v.mul(&v);
        assert_eq!(dephased_signature(&x), dephased_signature(&v2));
    }

    #[test]
    fn dephased_signature_ignores_global_phase() {
        let h = Unitary2x2::h();
        let phased = Unitary2x2::new(
            h.data[0] * Complex64::from_polar(1.0, 0.37),
            h.data[1] * Complex64::from_polar(1.0, 0.37),
            h.data[2] * Complex64::from_polar(1.0, 0.37),
            h.data[3] * Complex64::from_polar(1.0, 0.37),
        );
        assert_eq!(dephased_signature(&h), dephased_signature(&phased));
    }
}
