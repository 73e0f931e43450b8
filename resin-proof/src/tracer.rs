//! Tracer interface for proof production.
use std::io;

use thiserror::Error;

use resin_formula::{Clause, ClauseId, Database};

use crate::explanation::ConflictExplanation;

/// Proof formats selectable when proof production is enabled.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ProofFormat {
    /// ASCII FRAT.
    FratAscii,
    /// Binary FRAT.
    FratBinary,
    /// Alethe streamed into a file. Declared but not implemented.
    AletheStream,
    /// Alethe built and pruned in memory. Declared but not implemented.
    AletheMemory,
}

/// Errors raised while configuring or writing a proof.
///
/// Both variants are fatal to the run: an unsupported format is rejected
/// before solving starts, and a proof stream that fails to accept a write
/// leaves a partial file behind for inspection.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("proof format {0:?} is not supported")]
    UnsupportedFormat(ProofFormat),
    #[error("failed to write the proof")]
    Io(#[from] io::Error),
}

/// Traces the solver's execution to produce a proof of unsatisfiability.
///
/// The search engine invokes these operations synchronously and in program
/// order. Several conflicts can be open at once, conflicts may be renamed as
/// the search replaces a conflict clause with a resolvent carrying a new id,
/// and a conflict that never becomes a learned clause is abandoned at
/// [`finish_conflicts`](Tracer::finish_conflicts). A tracer has to keep the
/// emitted proof valid under all of these.
pub trait Tracer {
    /// The input formula already reduces to false.
    ///
    /// Emits an empty original clause and an empty final clause; no search
    /// happens.
    fn trivial_proof(&mut self) -> Result<(), ProofError>;

    /// Begin the proof by emitting every asserted clause of `db` as an
    /// original step.
    ///
    /// Must be called exactly once, before any conflict is traced.
    fn begin_proof(&mut self, db: &Database) -> Result<(), ProofError>;

    /// Start tracking a conflict.
    ///
    /// A non-Boolean explanation means the clause was synthesized by a theory
    /// plugin and is not in the database; it enters the proof as an original
    /// and is remembered for cleanup in case the conflict is abandoned.
    fn init_conflict(
        &mut self,
        conflict: &Clause,
        explanation: ConflictExplanation,
    ) -> Result<(), ProofError>;

    /// Record that the open conflict `conflict` was resolved with `other`.
    fn resolve_conflict(&mut self, conflict: ClauseId, other: ClauseId) -> Result<(), ProofError>;

    /// Move an open conflict to a new id.
    ///
    /// Invoked when the search replaces the conflict clause with a resolvent
    /// that has a fresh id. A no-op when `from == to`; otherwise `to` must
    /// not be an open conflict.
    fn rename_conflict(&mut self, from: ClauseId, to: ClauseId) -> Result<(), ProofError>;

    /// End the conflict-analysis phase.
    ///
    /// Conflicts still open at this point were abandoned; theory clauses
    /// introduced for them are deleted from the proof again.
    fn finish_conflicts(&mut self) -> Result<(), ProofError>;

    /// Learn a clause, closing the conflict with the same id.
    fn learn_clause(&mut self, learned: &Clause) -> Result<(), ProofError>;

    /// Delete a clause from the proof.
    fn delete_clause(&mut self, deleted: &Clause) -> Result<(), ProofError>;

    /// Derive the final empty clause (called instead of
    /// [`learn_clause`](Tracer::learn_clause)).
    fn derive_final(&mut self, empty: &Clause) -> Result<(), ProofError>;

    /// Finalize the proof with a snapshot of the surviving clauses.
    fn end_proof(&mut self, db: &Database) -> Result<(), ProofError>;

    /// Whether linear rational arithmetic conflicts can be represented.
    fn supports_lra(&self) -> bool;

    /// Whether uninterpreted function conflicts can be represented.
    fn supports_uf(&self) -> bool;
}
