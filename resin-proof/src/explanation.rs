//! Conflict explanations supplied by the search engine and theory plugins.

/// Rational number type carried by theory conflict witnesses.
pub type Rational = num_rational::Rational64;

/// Why a conflict clause exists.
///
/// Only the [`Boolean`](ConflictExplanation::Boolean) variant refers to a
/// clause that is already in the database. The other variants describe a
/// clause synthesized by a theory plugin; the tracer has to insert such a
/// clause into the proof as an original. FRAT cannot express theory
/// reasoning, so the attached witnesses are recorded but not verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConflictExplanation {
    /// A learned or asserted clause is falsified by the current assignment.
    Boolean,
    /// A lower and an upper bound on a rational variable are in conflict.
    LraBounds {
        /// Farkas coefficients witnessing the bound conflict.
        coefficients: Vec<Rational>,
    },
    /// Non-strict bounds pin a value that a disequality prohibits.
    LraDisequality {
        /// Farkas coefficients witnessing the derived equality.
        coefficients: Vec<Rational>,
    },
    /// Arguments are pairwise equal but the function values differ.
    UfCongruence,
}

impl ConflictExplanation {
    /// Whether the conflict clause already exists in the database.
    pub fn is_boolean(&self) -> bool {
        matches!(self, ConflictExplanation::Boolean)
    }
}
