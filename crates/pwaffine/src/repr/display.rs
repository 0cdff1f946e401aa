//! Human-readable rendering of models.
//!
//! [`fmt::Display`] on the representation types prints coefficients as
//! stored (scaled feature space). [`PiecewiseModel::display_raw`] maps every
//! coefficient back to raw feature units first.

use std::fmt;

use super::affine::{AffineFunction, Predicate};
use super::guard::{GuardPredicate, OrClause};
use super::piecewise::PiecewiseModel;

impl fmt::Display for AffineFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        for (i, &c) in self.weights().iter().enumerate() {
            if c == 0.0 {
                continue;
            }
            if wrote {
                let sign = if c < 0.0 { '-' } else { '+' };
                write!(f, " {sign} {}*x{i}", c.abs())?;
            } else {
                write!(f, "{c}*x{i}")?;
            }
            wrote = true;
        }
        let c = self.constant_term();
        if !wrote {
            write!(f, "{c}")
        } else if c != 0.0 {
            let sign = if c < 0.0 { '-' } else { '+' };
            write!(f, " {sign} {}", c.abs())
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} >= 0", self.function())
    }
}

impl fmt::Display for OrClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "false");
        }
        for (i, term) in self.terms().iter().enumerate() {
            if i > 0 {
                write!(f, " or ")?;
            }
            write!(f, "({term})")?;
        }
        Ok(())
    }
}

impl fmt::Display for GuardPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "false");
        }
        for (i, clause) in self.clauses().iter().enumerate() {
            if i > 0 {
                write!(f, "\n   and ")?;
            }
            write!(f, "[{clause}]")?;
        }
        Ok(())
    }
}

impl fmt::Display for PiecewiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_regions(f, self, &[])
    }
}

/// Display adapter printing a model in raw feature units.
pub struct RawModelDisplay<'a>(&'a PiecewiseModel);

impl fmt::Display for RawModelDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_regions(f, self.0, self.0.scale())
    }
}

impl PiecewiseModel {
    /// Render with coefficients mapped back to raw feature units.
    pub fn display_raw(&self) -> RawModelDisplay<'_> {
        RawModelDisplay(self)
    }
}

fn write_regions(f: &mut fmt::Formatter<'_>, model: &PiecewiseModel, scale: &[f32]) -> fmt::Result {
    if model.regions().is_empty() {
        return writeln!(f, "(empty model)");
    }
    for (i, region) in model.regions().iter().enumerate() {
        writeln!(f, "Region {i}")?;
        writeln!(f, "-- affine function: {}", region.function.unscaled(scale))?;
        if region.guard.is_empty() {
            writeln!(f, "-- guard: false")?;
            continue;
        }
        write!(f, "-- guard: ")?;
        for (j, clause) in region.guard.clauses().iter().enumerate() {
            if j > 0 {
                write!(f, "\n   and ")?;
            }
            write!(f, "[")?;
            for (k, term) in clause.terms().iter().enumerate() {
                if k > 0 {
                    write!(f, " or ")?;
                }
                write!(f, "({} >= 0)", term.function().unscaled(scale))?;
            }
            write!(f, "]")?;
        }
        writeln!(f)?;
    }
    Ok(())
}
