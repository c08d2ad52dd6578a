//! Plain 2x2 unitary matrix representation.
//!
//! This module only holds the matrix data and the handful of algebraic
//! operations (`mul`, `dagger`) needed to expose a gate's unitary and to
//! combine gates. The decomposition algorithms that consume these matrices
//! (ZYZ, dephased signatures, angle wrapping) live in `qtx-compile`'s
//! numeric-helpers module, which is where the pipeline's Euler-angle math
//! belongs.

use num_complex::Complex64;
use std::f64::consts::PI;

/// A 2x2 unitary matrix in row-major order: `[[a, b], [c, d]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unitary2x2 {
    /// Matrix elements, row-major: `[a, b, c, d]`.
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Build a matrix from its four entries.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// The 2x2 identity.
    pub fn identity() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
        )
    }

    /// Pauli-X.
    pub fn x() -> Self {
        Self::new(
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
        )
    }

    /// Pauli-Y.
    pub fn y() -> Self {
        Self::new(
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, -1.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(0.0, 0.0),
        )
    }

    /// Pauli-Z.
    pub fn z() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(-1.0, 0.0),
        )
    }

    /// Hadamard.
    pub fn h() -> Self {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        Self::new(
            Complex64::new(s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(-s, 0.0),
        )
    }

    /// S = sqrt(Z).
    pub fn s() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 1.0),
        )
    }

    /// T = fourth root of Z.
    pub fn t() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::from_polar(1.0, PI / 4.0),
        )
    }

    /// RX(theta).
    pub fn rx(theta: f64) -> Self {
        let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
        Self::new(
            Complex64::new(c, 0.0),
            Complex64::new(0.0, -s),
            Complex64::new(0.0, -s),
            Complex64::new(c, 0.0),
        )
    }

    /// RY(theta).
    pub fn ry(theta: f64) -> Self {
        let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
        Self::new(
            Complex64::new(c, 0.0),
            Complex64::new(-s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(c, 0.0),
        )
    }

    /// RZ(phi).
    pub fn rz(phi: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -phi / 2.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::from_polar(1.0, phi / 2.0),
        )
    }

    /// U1(phi) = RZ(phi) up to global phase (diag(1, e^{i phi})).
    pub fn u1(phi: f64) -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::from_polar(1.0, phi),
        )
    }

    /// U3(theta, phi, gamma) = RZ(phi) . RY(theta) . RZ(gamma).
    pub fn u3(theta: f64, phi: f64, gamma: f64) -> Self {
        Self::rz(phi).mul(&Self::ry(theta)).mul(&Self::rz(gamma))
    }

    /// U2(phi, gamma) = U3(pi/2, phi, gamma).
    pub fn u2(phi: f64, gamma: f64) -> Self {
        Self::u3(PI / 2.0, phi, gamma)
    }

    /// Matrix product `self . other`.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        Self::new(
            self.data[0].conj(),
            self.data[2].conj(),
            self.data[1].conj(),
            self.data[3].conj(),
        )
    }

    /// Determinant.
    pub fn det(&self) -> Complex64 {
        let [a, b, c, d] = self.data;
        a * d - b * c
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}
