//! Affine functions and the half-space predicates built from them.

/// Affine function over `n` features.
///
/// Coefficients are stored in a single flat buffer of length `n + 1`:
///
/// ```text
/// coeff[i] → weight of feature i   (i < n)
/// coeff[n] → constant term
/// ```
///
/// Evaluation is `Σ coeff[i] * x[i] + coeff[n]`, accumulated left to right in
/// `f32`. Every consumer (training-time separator checks, inference) goes
/// through [`evaluate`](Self::evaluate), so the arithmetic is identical at
/// both ends.
///
/// # Example
///
/// ```
/// use pwaffine::repr::AffineFunction;
///
/// // f(x) = 2*x0 + 1
/// let f = AffineFunction::new(vec![2.0, 1.0]);
/// assert_eq!(f.n_features(), 1);
/// assert_eq!(f.evaluate(&[3.0]), 7.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AffineFunction {
    coeff: Box<[f32]>,
}

impl AffineFunction {
    /// Create from the flat coefficient layout (weights followed by constant).
    ///
    /// # Panics
    ///
    /// Panics if `coeff` is empty: even a zero-feature function has a constant.
    pub fn new(coeff: impl Into<Box<[f32]>>) -> Self {
        let coeff = coeff.into();
        assert!(!coeff.is_empty(), "affine function needs at least a constant term");
        Self { coeff }
    }

    /// Create from separate weights and constant.
    pub fn from_parts(weights: &[f32], constant: f32) -> Self {
        let mut coeff = Vec::with_capacity(weights.len() + 1);
        coeff.extend_from_slice(weights);
        coeff.push(constant);
        Self { coeff: coeff.into_boxed_slice() }
    }

    /// The constant function `c` over `n_features` features.
    pub fn constant(n_features: usize, c: f32) -> Self {
        let mut coeff = vec![0.0; n_features + 1];
        coeff[n_features] = c;
        Self { coeff: coeff.into_boxed_slice() }
    }

    /// Number of input features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.coeff.len() - 1
    }

    /// Full coefficient buffer, constant last.
    #[inline]
    pub fn coefficients(&self) -> &[f32] {
        &self.coeff
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.coeff[..self.n_features()]
    }

    #[inline]
    pub fn constant_term(&self) -> f32 {
        self.coeff[self.n_features()]
    }

    /// Evaluate at `x`.
    ///
    /// `x` must have exactly [`n_features`](Self::n_features) entries; extra
    /// entries are ignored in release builds.
    #[inline]
    pub fn evaluate(&self, x: &[f32]) -> f32 {
        debug_assert_eq!(x.len(), self.n_features(), "feature count mismatch");
        let mut acc = 0.0f32;
        for (c, v) in self.weights().iter().zip(x) {
            acc += c * v;
        }
        acc + self.constant_term()
    }

    /// Copy with the constant term replaced.
    pub fn with_constant(&self, constant: f32) -> Self {
        let mut coeff = self.coeff.clone();
        let n = self.n_features();
        coeff[n] = constant;
        Self { coeff }
    }

    /// Copy with every coefficient negated.
    pub fn negated(&self) -> Self {
        Self { coeff: self.coeff.iter().map(|c| -c).collect() }
    }

    /// Coefficients expressed over raw (unscaled) features.
    ///
    /// A function learned over `x * scale` equals, over raw `x`, the function
    /// with weights `coeff[i] * scale[i]` and the same constant.
    pub fn unscaled(&self, scale: &[f32]) -> Self {
        if scale.is_empty() {
            return self.clone();
        }
        let mut coeff = self.coeff.clone();
        for (c, s) in coeff.iter_mut().zip(scale) {
            *c *= s;
        }
        Self { coeff }
    }

    /// Returns `true` if every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.coeff.iter().all(|c| c.is_finite())
    }
}

// =============================================================================
// Predicate
// =============================================================================

/// Half-space predicate: holds at `x` iff `f(x) >= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate(AffineFunction);

impl Predicate {
    pub fn new(function: AffineFunction) -> Self {
        Self(function)
    }

    /// Predicate that holds everywhere (`+1 >= 0`).
    pub fn always_true(n_features: usize) -> Self {
        Self(AffineFunction::constant(n_features, 1.0))
    }

    /// Predicate that holds nowhere (`-1 >= 0`).
    pub fn always_false(n_features: usize) -> Self {
        Self(AffineFunction::constant(n_features, -1.0))
    }

    /// `x[axis] <= threshold`, written as `-x[axis] + threshold >= 0`.
    pub fn at_most(n_features: usize, axis: usize, threshold: f32) -> Self {
        let mut coeff = vec![0.0; n_features + 1];
        coeff[axis] = -1.0;
        coeff[n_features] = threshold;
        Self(AffineFunction::new(coeff))
    }

    /// `x[axis] >= threshold`, written as `x[axis] - threshold >= 0`.
    pub fn at_least(n_features: usize, axis: usize, threshold: f32) -> Self {
        let mut coeff = vec![0.0; n_features + 1];
        coeff[axis] = 1.0;
        coeff[n_features] = -threshold;
        Self(AffineFunction::new(coeff))
    }

    #[inline]
    pub fn function(&self) -> &AffineFunction {
        &self.0
    }

    #[inline]
    pub fn into_function(self) -> AffineFunction {
        self.0
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.0.n_features()
    }

    /// Signed value `f(x)`.
    #[inline]
    pub fn value(&self, x: &[f32]) -> f32 {
        self.0.evaluate(x)
    }

    #[inline]
    pub fn evaluate(&self, x: &[f32]) -> bool {
        self.value(x) >= 0.0
    }
}

impl From<AffineFunction> for Predicate {
    fn from(function: AffineFunction) -> Self {
        Self(function)
    }
}
