//! Proof tracing for the resin solver core.
//!
//! While the search runs, a [`Tracer`](tracer::Tracer) records how every
//! learned clause was derived from asserted and theory-explanation clauses;
//! at termination it emits a machine-checkable refutation. The only tracer
//! currently implemented produces proofs in the FRAT family, in ASCII or
//! binary encoding.
use resin_formula::Lit;

pub mod explanation;
pub mod frat;
pub mod handle;
pub mod node;
pub mod tracer;

pub use explanation::{ConflictExplanation, Rational};
pub use frat::FratTracer;
pub use handle::TracerHandle;
pub use node::ProofNode;
pub use tracer::{ProofError, ProofFormat, Tracer};

/// Integer type used to store a hash of a literal or clause.
pub type ClauseHash = u64;

/// Hash a single literal.
///
/// Multiple literals can be combined with xor, as done in [`clause_hash`].
/// The same hash drives the 64-bit subsumption signatures.
pub fn lit_hash(lit: Lit) -> ClauseHash {
    lit_code_hash(lit.code())
}

/// Hash a single literal from a code.
///
/// This doesn't require the code to correspond to a valid literal.
pub fn lit_code_hash(lit_code: usize) -> ClauseHash {
    // Constant based on the golden ratio provides good mixing for the resulting upper bits
    (!(lit_code as u64)).wrapping_mul(0x61c8864680b583ebu64)
}

/// A fast hash function for clauses (or other *sets* of literals).
///
/// This hash function interprets the given slice as a set and will not change
/// when the input is permuted. It does not handle duplicated items.
pub fn clause_hash(lits: &[Lit]) -> ClauseHash {
    let mut hash = 0;
    for &lit in lits {
        hash ^= lit_hash(lit);
    }
    hash
}
