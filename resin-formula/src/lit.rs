//! Literals and variables.
use std::{fmt, ops};

/// The backing type used to represent literals and variables.
pub type LitIdx = u32;

/// A boolean variable.
///
/// Variables are 0-indexed internally. Proof and input formats use a 1-based
/// index instead, so that a negated variable can be written as a negative
/// integer; conversions between the two encodings go through `from_dimacs` and
/// `to_dimacs`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var {
    ord: LitIdx,
}

impl Var {
    /// Creates a variable from a 1-based signed encoding index.
    ///
    /// The parameter must be positive.
    #[inline]
    pub fn from_dimacs(number: isize) -> Var {
        debug_assert!(number > 0);
        Var::from_ord((number - 1) as usize)
    }

    /// Creates a variable from a 0-based ordinal.
    #[inline]
    pub fn from_ord(ord: usize) -> Var {
        debug_assert!(ord <= Var::max_var().ord());
        Var { ord: ord as LitIdx }
    }

    /// The 1-based index representing this variable in signed external
    /// encodings.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        (self.ord + 1) as isize
    }

    /// The 0-based ordinal of this variable.
    #[inline]
    pub const fn ord(self) -> usize {
        self.ord as usize
    }

    /// The variable with the largest supported ordinal.
    ///
    /// Smaller than the backing type allows, leaving room for a sign bit when
    /// variables are packed into literals.
    pub const fn max_var() -> Var {
        Var {
            ord: LitIdx::max_value() >> 4,
        }
    }

    /// Creates a literal from this var and a `bool` that is `true` when the
    /// literal is positive.
    #[inline]
    pub fn lit(self, polarity: bool) -> Lit {
        Lit::from_var(self, polarity)
    }

    /// Creates a positive literal from this var.
    #[inline]
    pub fn positive(self) -> Lit {
        self.lit(true)
    }

    /// Creates a negative literal from this var.
    #[inline]
    pub fn negative(self) -> Lit {
        self.lit(false)
    }
}

/// Uses the 1-based signed external encoding.
impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Uses the 1-based signed external encoding.
impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A boolean literal: a variable or the negation of a variable.
///
/// Stored as a single integer that is two times the variable ordinal for a
/// positive literal and one more for a negative literal. This integer is
/// called the `code` of the literal.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit {
    code: LitIdx,
}

impl Lit {
    /// Creates a literal from a `Var` and a `bool` that is `true` when the
    /// literal is positive.
    #[inline]
    pub fn from_var(var: Var, polarity: bool) -> Lit {
        Lit {
            code: (var.ord << 1) | (!polarity as LitIdx),
        }
    }

    /// Creates a literal from a 0-based variable ordinal and a polarity.
    #[inline]
    pub fn from_ord(ord: usize, polarity: bool) -> Lit {
        Lit::from_var(Var::from_ord(ord), polarity)
    }

    /// Creates a literal with the given code.
    #[inline]
    pub fn from_code(code: usize) -> Lit {
        debug_assert!(code <= Var::max_var().ord() * 2 + 1);
        Lit {
            code: code as LitIdx,
        }
    }

    /// Creates a literal from a signed 1-based encoding.
    ///
    /// The absolute value is the 1-based variable index, the sign is the
    /// polarity.
    #[inline]
    pub fn from_dimacs(number: isize) -> Lit {
        Lit::from_var(Var::from_dimacs(number.abs()), number > 0)
    }

    /// The signed 1-based encoding of this literal, opposite of
    /// `from_dimacs`.
    ///
    /// This is the encoding proof formats use: `(ord + 1)` negated for
    /// negative literals.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        let number = self.var().to_dimacs();
        if self.is_negative() {
            -number
        } else {
            number
        }
    }

    /// 0-based ordinal of the literal's _variable_.
    #[inline]
    pub fn ord(self) -> usize {
        (self.code >> 1) as usize
    }

    /// The literal's variable.
    #[inline]
    pub fn var(self) -> Var {
        Var {
            ord: self.code >> 1,
        }
    }

    /// Whether the literal is a negated variable.
    #[inline]
    pub fn is_negative(self) -> bool {
        (self.code & 1) != 0
    }

    /// Whether the literal is a non-negated variable.
    #[inline]
    pub fn is_positive(self) -> bool {
        !self.is_negative()
    }

    /// The literal's code: two times the variable ordinal, plus one for
    /// negative literals.
    #[inline]
    pub fn code(self) -> usize {
        self.code as usize
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit {
            code: self.code ^ 1,
        }
    }
}

impl ops::BitXor<bool> for Lit {
    type Output = Lit;

    #[inline]
    fn bitxor(self, rhs: bool) -> Lit {
        Lit {
            code: self.code ^ (rhs as LitIdx),
        }
    }
}

impl From<Var> for Lit {
    #[inline]
    fn from(var: Var) -> Lit {
        var.positive()
    }
}

/// Uses the 1-based signed external encoding.
impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Uses the 1-based signed external encoding.
impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use proptest::{prelude::*, *};

    pub fn var(ord: impl Strategy<Value = usize>) -> impl Strategy<Value = Var> {
        ord.prop_map(Var::from_ord)
    }

    pub fn lit(ord: impl Strategy<Value = usize>) -> impl Strategy<Value = Lit> {
        (var(ord), bool::ANY).prop_map(|(var, polarity)| var.lit(polarity))
    }
}
