//! Guards in conjunctive normal form over half-space predicates.

use super::affine::Predicate;

/// Disjunction of predicates. Holds iff any term holds; an empty clause never holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrClause {
    terms: Vec<Predicate>,
}

impl OrClause {
    pub fn new(terms: Vec<Predicate>) -> Self {
        Self { terms }
    }

    pub fn single(term: Predicate) -> Self {
        Self { terms: vec![term] }
    }

    #[inline]
    pub fn terms(&self) -> &[Predicate] {
        &self.terms
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[inline]
    pub fn evaluate(&self, x: &[f32]) -> bool {
        self.terms.iter().any(|t| t.evaluate(x))
    }
}

/// Conjunction of [`OrClause`]s.
///
/// Holds iff every clause holds. A guard with no clauses means "no guard was
/// built" and holds nowhere; use [`always_true`](Self::always_true) for the
/// catch-all guard.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuardPredicate {
    clauses: Vec<OrClause>,
}

impl GuardPredicate {
    pub fn new(clauses: Vec<OrClause>) -> Self {
        Self { clauses }
    }

    /// Single clause with the constant `+1 >= 0` predicate.
    pub fn always_true(n_features: usize) -> Self {
        Self::new(vec![OrClause::single(Predicate::always_true(n_features))])
    }

    /// Single clause with the constant `-1 >= 0` predicate.
    pub fn always_false(n_features: usize) -> Self {
        Self::new(vec![OrClause::single(Predicate::always_false(n_features))])
    }

    #[inline]
    pub fn clauses(&self) -> &[OrClause] {
        &self.clauses
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn evaluate(&self, x: &[f32]) -> bool {
        !self.clauses.is_empty() && self.clauses.iter().all(|c| c.evaluate(x))
    }

    /// Iterate every predicate in every clause.
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.clauses.iter().flat_map(|c| c.terms.iter())
    }

    /// Feature count of the first predicate, if any.
    pub fn n_features(&self) -> Option<usize> {
        self.predicates().next().map(Predicate::n_features)
    }

    /// Structural size: `(clauses, widest clause, total terms)`.
    pub fn complexity(&self) -> (usize, usize, usize) {
        let widest = self.clauses.iter().map(OrClause::len).max().unwrap_or(0);
        let total = self.clauses.iter().map(OrClause::len).sum();
        (self.clauses.len(), widest, total)
    }
}
