//! Null-safe shared handle to a tracer.
use std::cell::RefCell;
use std::rc::Rc;

use resin_formula::{Clause, ClauseId, Database};

use crate::explanation::ConflictExplanation;
use crate::tracer::{ProofError, Tracer};

/// A possibly-empty, shared tracer.
///
/// The search engine and every theory plugin hold a copy by value; all copies
/// forward to the same underlying tracer. With no tracer installed every
/// operation is a no-op and the capability queries report support, so running
/// without proofs never restricts which theories may be used.
#[derive(Clone, Default)]
pub struct TracerHandle {
    tracer: Option<Rc<RefCell<dyn Tracer>>>,
}

impl TracerHandle {
    /// A handle with no tracer installed.
    pub fn none() -> TracerHandle {
        TracerHandle::default()
    }

    /// Wraps a tracer.
    pub fn new(tracer: impl Tracer + 'static) -> TracerHandle {
        TracerHandle {
            tracer: Some(Rc::new(RefCell::new(tracer))),
        }
    }

    /// Whether a tracer is installed.
    pub fn is_active(&self) -> bool {
        self.tracer.is_some()
    }

    fn with(
        &self,
        op: impl FnOnce(&mut dyn Tracer) -> Result<(), ProofError>,
    ) -> Result<(), ProofError> {
        match &self.tracer {
            Some(tracer) => op(&mut *tracer.borrow_mut()),
            None => Ok(()),
        }
    }

    pub fn trivial_proof(&self) -> Result<(), ProofError> {
        self.with(|tracer| tracer.trivial_proof())
    }

    pub fn begin_proof(&self, db: &Database) -> Result<(), ProofError> {
        self.with(|tracer| tracer.begin_proof(db))
    }

    pub fn init_conflict(
        &self,
        conflict: &Clause,
        explanation: ConflictExplanation,
    ) -> Result<(), ProofError> {
        self.with(|tracer| tracer.init_conflict(conflict, explanation))
    }

    pub fn resolve_conflict(&self, conflict: ClauseId, other: ClauseId) -> Result<(), ProofError> {
        self.with(|tracer| tracer.resolve_conflict(conflict, other))
    }

    pub fn rename_conflict(&self, from: ClauseId, to: ClauseId) -> Result<(), ProofError> {
        self.with(|tracer| tracer.rename_conflict(from, to))
    }

    pub fn finish_conflicts(&self) -> Result<(), ProofError> {
        self.with(|tracer| tracer.finish_conflicts())
    }

    pub fn learn_clause(&self, learned: &Clause) -> Result<(), ProofError> {
        self.with(|tracer| tracer.learn_clause(learned))
    }

    pub fn delete_clause(&self, deleted: &Clause) -> Result<(), ProofError> {
        self.with(|tracer| tracer.delete_clause(deleted))
    }

    pub fn derive_final(&self, empty: &Clause) -> Result<(), ProofError> {
        self.with(|tracer| tracer.derive_final(empty))
    }

    pub fn end_proof(&self, db: &Database) -> Result<(), ProofError> {
        self.with(|tracer| tracer.end_proof(db))
    }

    /// Whether the installed tracer can represent LRA conflicts.
    ///
    /// Reports `true` when no tracer is installed: disabled proofs must not
    /// block any theory.
    pub fn supports_lra(&self) -> bool {
        match &self.tracer {
            Some(tracer) => tracer.borrow().supports_lra(),
            None => true,
        }
    }

    /// Whether the installed tracer can represent UF conflicts.
    ///
    /// Reports `true` when no tracer is installed.
    pub fn supports_uf(&self) -> bool {
        match &self.tracer {
            Some(tracer) => tracer.borrow().supports_uf(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resin_formula::clause;

    #[test]
    fn empty_handle_ignores_operations() {
        let handle = TracerHandle::none();
        let db = Database::new();
        let conflict = clause![1, -2];

        assert!(!handle.is_active());
        handle.begin_proof(&db).unwrap();
        handle
            .init_conflict(&conflict, ConflictExplanation::Boolean)
            .unwrap();
        handle.finish_conflicts().unwrap();
        handle.end_proof(&db).unwrap();
    }

    #[test]
    fn empty_handle_supports_all_theories() {
        let handle = TracerHandle::none();
        assert!(handle.supports_lra());
        assert!(handle.supports_uf());
    }

    #[test]
    fn copies_share_the_tracer() {
        use crate::frat::FratTracer;

        let file = tempfile::NamedTempFile::new().unwrap();
        let writer = file.reopen().unwrap();
        let handle = TracerHandle::new(FratTracer::from_writer(writer, false));
        let copy = handle.clone();

        let mut db = Database::new();
        db.add_asserted(clause![1]);

        handle.begin_proof(&db).unwrap();
        copy.end_proof(&db).unwrap();

        let proof = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(proof, "o 1 1 0\nf 1 1 0\n");
    }
}
