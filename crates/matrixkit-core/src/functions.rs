//! Function objects accepted by the elementwise operations.
//!
//! Any closure `Fn(f64) -> f64` / `Fn(f64, f64) -> f64` works. The named
//! kinds [`Mult`] and [`PlusMult`] additionally describe themselves, which
//! lets matrix operations replace the per-cell call with plain arithmetic
//! (and, for sparse stores, skip zero cells entirely).

/// Unary transform `x -> f(x)`.
pub trait DoubleFunction {
    fn apply(&self, x: f64) -> f64;

    /// `Some(c)` if this function is exactly `x -> x * c`.
    fn as_mult(&self) -> Option<f64> {
        None
    }
}

impl<F: Fn(f64) -> f64> DoubleFunction for F {
    #[inline]
    fn apply(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Binary transform `(a, b) -> f(a, b)`.
pub trait DoubleDoubleFunction {
    fn apply(&self, a: f64, b: f64) -> f64;

    /// `Some(c)` if this function is exactly `(a, b) -> a + b * c`.
    fn as_plus_mult(&self) -> Option<f64> {
        None
    }
}

impl<F: Fn(f64, f64) -> f64> DoubleDoubleFunction for F {
    #[inline]
    fn apply(&self, a: f64, b: f64) -> f64 {
        self(a, b)
    }
}

/// `x -> x * multiplicator`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mult(pub f64);

impl Mult {
    /// `x -> x / divisor`, expressed as a multiplication.
    pub fn div(divisor: f64) -> Self {
        Self(1.0 / divisor)
    }
}

impl DoubleFunction for Mult {
    #[inline]
    fn apply(&self, x: f64) -> f64 {
        x * self.0
    }

    fn as_mult(&self) -> Option<f64> {
        Some(self.0)
    }
}

/// `(a, b) -> a + b * multiplicator`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlusMult(pub f64);

impl PlusMult {
    /// `(a, b) -> a - b * multiplicator`.
    pub fn minus_mult(multiplicator: f64) -> Self {
        Self(-multiplicator)
    }
}

impl DoubleDoubleFunction for PlusMult {
    #[inline]
    fn apply(&self, a: f64, b: f64) -> f64 {
        a + b * self.0
    }

    fn as_plus_mult(&self) -> Option<f64> {
        Some(self.0)
    }
}
