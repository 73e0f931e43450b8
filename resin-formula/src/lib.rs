//! Formula data types used by the resin proof core.

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lit {
    ($x:expr) => {
        $crate::lit::Lit::from_dimacs($x)
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lits {
    ( $( $x:expr ),* ) => { vec![ $( $crate::lit!( $x ) ),* ] };
    ( $( $x:expr ),* , ) => { $crate::lits! [ $( $x ),* ] };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! clause {
    ( $( $x:expr ),* ) => { $crate::clause::Clause::new($crate::lits![ $( $x ),* ]) };
}

pub mod clause;
pub mod db;
pub mod lit;

pub use clause::{Clause, ClauseId};
pub use db::Database;
pub use lit::{Lit, Var};
