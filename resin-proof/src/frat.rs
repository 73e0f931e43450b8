//! Tracer producing FRAT proofs.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::mem::take;
use std::path::Path;

use rustc_hash::FxHashMap;

use resin_formula::{Clause, ClauseId, Database, Lit};

use crate::explanation::ConflictExplanation;
use crate::node::ProofNode;
use crate::tracer::{ProofError, Tracer};

/// Tracer that produces FRAT proofs, in ASCII or binary encoding.
///
/// FRAT was made for SAT solvers, so theory conflict clauses enter the proof
/// as originals and their correctness is not checked.
///
/// One proof tree is buffered per open conflict; everything else is streamed
/// to the output as soon as it is known. Proof step ids are allocated here
/// and are unrelated to clause ids, which only key the bookkeeping maps.
pub struct FratTracer {
    binary_mode: bool,
    target: BufWriter<Box<dyn Write>>,
    /// Conflict clause id -> proof tree of the open conflict.
    open_conflicts: BTreeMap<ClauseId, ProofNode>,
    /// Theory conflict clauses by proof step id, kept so they can be cleaned
    /// up if their conflict never produces a learned clause.
    open_theory_conflicts: BTreeMap<u64, Clause>,
    /// Clause id -> proof step id, for every clause the proof currently
    /// knows.
    clause_definitions: FxHashMap<ClauseId, u64>,
    next_step_id: u64,
    proof_started: bool,
}

impl FratTracer {
    /// Creates a tracer writing to a file at `path`.
    pub fn create(path: &Path, binary_mode: bool) -> Result<FratTracer, ProofError> {
        let file = File::create(path)?;
        Ok(FratTracer::from_writer(file, binary_mode))
    }

    /// Creates a tracer writing to an arbitrary target.
    pub fn from_writer(target: impl Write + 'static, binary_mode: bool) -> FratTracer {
        FratTracer {
            binary_mode,
            target: BufWriter::new(Box::new(target)),
            open_conflicts: BTreeMap::new(),
            open_theory_conflicts: BTreeMap::new(),
            clause_definitions: FxHashMap::default(),
            next_step_id: 1,
            proof_started: false,
        }
    }

    /// Add an original (asserted / theory) clause.
    fn original_clause(&mut self, clause: &Clause) -> Result<(), ProofError> {
        let step = self.next_step_id;
        self.next_step_id += 1;
        debug_assert!(!self.clause_definitions.contains_key(&clause.id()));
        self.clause_definitions.insert(clause.id(), step);
        self.write_command(b'o')?;
        self.write_unsigned(step)?;
        self.write_clause(clause.lits())?;
        self.end_command()
    }

    /// Add a final clause.
    fn final_clause(&mut self, clause: &Clause) -> Result<(), ProofError> {
        let step = self.step_of(clause.id());
        self.write_command(b'f')?;
        self.write_unsigned(step)?;
        self.write_clause(clause.lits())?;
        self.end_command()
    }

    fn step_of(&self, id: ClauseId) -> u64 {
        match self.clause_definitions.get(&id) {
            Some(&step) => step,
            None => panic!("clause {} is not known to the proof", id),
        }
    }

    /// Write a comment explaining a theory conflict.
    fn theory_comment(&mut self, explanation: &ConflictExplanation) -> Result<(), ProofError> {
        let text = match explanation {
            ConflictExplanation::Boolean => return Ok(()),
            ConflictExplanation::LraBounds { .. } => "LRA bound conflict",
            ConflictExplanation::LraDisequality { .. } => "LRA disequality conflict",
            ConflictExplanation::UfCongruence => "UF congruence conflict",
        };
        self.write_comment(text)
    }

    fn write_command(&mut self, cmd: u8) -> Result<(), ProofError> {
        if self.binary_mode {
            self.target.write_all(&[cmd])?;
        } else {
            self.target.write_all(&[cmd, b' '])?;
        }
        Ok(())
    }

    fn write_unsigned(&mut self, value: u64) -> Result<(), ProofError> {
        if self.binary_mode {
            leb128::write::unsigned(&mut self.target, value)?;
        } else {
            let mut buf = itoa::Buffer::new();
            self.target.write_all(buf.format(value).as_bytes())?;
            self.target.write_all(b" ")?;
        }
        Ok(())
    }

    fn write_signed(&mut self, value: i64) -> Result<(), ProofError> {
        if self.binary_mode {
            // n >= 0 maps to 2n, n < 0 maps to 2(-n) + 1
            let mapped = if value >= 0 {
                2 * value as u64
            } else {
                2 * -value as u64 + 1
            };
            leb128::write::unsigned(&mut self.target, mapped)?;
        } else {
            let mut buf = itoa::Buffer::new();
            self.target.write_all(buf.format(value).as_bytes())?;
            self.target.write_all(b" ")?;
        }
        Ok(())
    }

    /// Separate command parts with a zero.
    fn write_zero(&mut self) -> Result<(), ProofError> {
        if self.binary_mode {
            self.target.write_all(&[0])?;
        } else {
            self.target.write_all(b"0 ")?;
        }
        Ok(())
    }

    /// End a command.
    fn end_command(&mut self) -> Result<(), ProofError> {
        if self.binary_mode {
            self.target.write_all(&[0])?;
        } else {
            self.target.write_all(b"0\n")?;
        }
        Ok(())
    }

    /// Write clause literals in the signed external encoding.
    fn write_clause(&mut self, lits: &[Lit]) -> Result<(), ProofError> {
        for &lit in lits {
            self.write_signed(lit.to_dimacs() as i64)?;
        }
        Ok(())
    }

    /// Write a comment. Binary FRAT has no comments, so this is a no-op in
    /// binary mode.
    fn write_comment(&mut self, comment: &str) -> Result<(), ProofError> {
        if !self.binary_mode {
            self.target.write_all(b"c ")?;
            self.target.write_all(comment.as_bytes())?;
            self.target.write_all(b" .\n")?;
        }
        Ok(())
    }
}

impl Tracer for FratTracer {
    fn trivial_proof(&mut self) -> Result<(), ProofError> {
        let empty = Clause::new(vec![]);
        self.write_comment("false asserted, proof is trivial")?;
        self.original_clause(&empty)?;
        self.final_clause(&empty)
    }

    fn begin_proof(&mut self, db: &Database) -> Result<(), ProofError> {
        debug_assert!(!self.proof_started, "begin_proof called twice");
        self.proof_started = true;
        for clause in db.asserted() {
            self.original_clause(clause)?;
        }
        Ok(())
    }

    fn init_conflict(
        &mut self,
        conflict: &Clause,
        explanation: ConflictExplanation,
    ) -> Result<(), ProofError> {
        if !explanation.is_boolean() {
            // A theory-introduced clause, not present in the database
            debug_assert!(!self.clause_definitions.contains_key(&conflict.id()));
            self.theory_comment(&explanation)?;
            self.original_clause(conflict)?;
            let step = self.step_of(conflict.id());
            self.open_theory_conflicts.insert(step, conflict.clone());
        }
        debug_assert!(self.clause_definitions.contains_key(&conflict.id()));
        debug_assert!(!self.open_conflicts.contains_key(&conflict.id()));
        self.open_conflicts.insert(
            conflict.id(),
            ProofNode::ConflictIntro {
                id: conflict.id(),
                explanation,
            },
        );
        Ok(())
    }

    fn resolve_conflict(&mut self, conflict: ClauseId, other: ClauseId) -> Result<(), ProofError> {
        debug_assert!(self.clause_definitions.contains_key(&other));
        let node = match self.open_conflicts.remove(&conflict) {
            Some(node) => node,
            None => panic!("conflict {} is not open", conflict),
        };
        self.open_conflicts.insert(conflict, node.resolve(other));
        Ok(())
    }

    fn rename_conflict(&mut self, from: ClauseId, to: ClauseId) -> Result<(), ProofError> {
        if from == to {
            return Ok(());
        }
        let node = match self.open_conflicts.remove(&from) {
            Some(node) => node,
            None => panic!("conflict {} is not open", from),
        };
        let previous = self.open_conflicts.insert(to, node);
        debug_assert!(previous.is_none(), "rename target is already open");
        Ok(())
    }

    fn finish_conflicts(&mut self) -> Result<(), ProofError> {
        // Theory clauses of conflicts that were never learned are not in the
        // database, so they would be missing from the final block; delete
        // them now.
        for (_, clause) in take(&mut self.open_theory_conflicts) {
            self.delete_clause(&clause)?;
        }
        self.open_conflicts.clear();
        Ok(())
    }

    fn learn_clause(&mut self, learned: &Clause) -> Result<(), ProofError> {
        let node = match self.open_conflicts.remove(&learned.id()) {
            Some(node) => node,
            None => panic!("learned clause {} is not an open conflict", learned.id()),
        };
        let chain = node.into_resolvents();
        if chain.len() == 1 {
            let intro_step = self.step_of(chain[0]);
            if self.open_theory_conflicts.remove(&intro_step).is_some() {
                // Trivial analysis: the theory explanation clause is learned
                // as-is. It now lives in the database, so it needs no cleanup
                // and its proof step doubles as the learned clause's step.
                let comment = format!("theory clause {} learned as-is", intro_step);
                self.write_comment(&comment)?;
                self.clause_definitions.insert(learned.id(), intro_step);
                return Ok(());
            }
        }
        let step = self.next_step_id;
        self.next_step_id += 1;
        debug_assert!(!self.clause_definitions.contains_key(&learned.id()));
        self.clause_definitions.insert(learned.id(), step);
        self.write_command(b'a')?;
        self.write_unsigned(step)?;
        self.write_clause(learned.lits())?;
        self.write_zero()?;
        self.write_command(b'l')?;
        for id in &chain {
            // Signed because negative values are used in RAT steps
            let hint = self.step_of(*id);
            self.write_signed(hint as i64)?;
        }
        self.end_command()
    }

    fn delete_clause(&mut self, deleted: &Clause) -> Result<(), ProofError> {
        let step = match self.clause_definitions.remove(&deleted.id()) {
            Some(step) => step,
            None => panic!("clause {} is not known to the proof", deleted.id()),
        };
        self.write_command(b'd')?;
        self.write_unsigned(step)?;
        self.write_clause(deleted.lits())?;
        self.end_command()
    }

    fn derive_final(&mut self, empty: &Clause) -> Result<(), ProofError> {
        self.learn_clause(empty)?;
        self.final_clause(empty)
    }

    fn end_proof(&mut self, db: &Database) -> Result<(), ProofError> {
        // Leftover theory conflicts shouldn't normally exist at this point,
        // but the final block has to cover them if they do.
        for (_, clause) in take(&mut self.open_theory_conflicts) {
            self.final_clause(&clause)?;
        }
        for clause in db.learned().iter().rev() {
            self.final_clause(clause)?;
        }
        for clause in db.asserted().iter().rev() {
            self.final_clause(clause)?;
        }
        self.target.flush()?;
        Ok(())
    }

    fn supports_lra(&self) -> bool {
        true
    }

    fn supports_uf(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::NamedTempFile;

    use resin_formula::{clause, Clause};

    use crate::explanation::Rational;

    fn ascii_tracer() -> (NamedTempFile, FratTracer) {
        let file = NamedTempFile::new().unwrap();
        let writer = file.reopen().unwrap();
        (file, FratTracer::from_writer(writer, false))
    }

    fn binary_tracer() -> (NamedTempFile, FratTracer) {
        let file = NamedTempFile::new().unwrap();
        let writer = file.reopen().unwrap();
        (file, FratTracer::from_writer(writer, true))
    }

    fn proof_text(file: &NamedTempFile, tracer: FratTracer) -> String {
        drop(tracer);
        fs::read_to_string(file.path()).unwrap()
    }

    fn proof_bytes(file: &NamedTempFile, tracer: FratTracer) -> Vec<u8> {
        drop(tracer);
        fs::read(file.path()).unwrap()
    }

    #[test]
    fn trivial_proof() {
        let (file, mut tracer) = ascii_tracer();
        tracer.trivial_proof().unwrap();
        assert_eq!(
            proof_text(&file, tracer),
            "c false asserted, proof is trivial .\no 1 0\nf 1 0\n"
        );
    }

    #[test]
    fn unit_resolution_to_empty_clause() {
        let (file, mut tracer) = ascii_tracer();

        let mut db = Database::new();
        db.add_asserted(clause![1]);
        db.add_asserted(clause![-1]);
        let positive = db.asserted()[0].clone();
        let negative = db.asserted()[1].clone();

        tracer.begin_proof(&db).unwrap();
        tracer
            .init_conflict(&negative, ConflictExplanation::Boolean)
            .unwrap();
        tracer
            .resolve_conflict(negative.id(), positive.id())
            .unwrap();

        let empty = Clause::new(vec![]);
        tracer.rename_conflict(negative.id(), empty.id()).unwrap();
        tracer.derive_final(&empty).unwrap();
        tracer.finish_conflicts().unwrap();
        tracer.end_proof(&db).unwrap();

        assert_eq!(
            proof_text(&file, tracer),
            "o 1 1 0\n\
             o 2 -1 0\n\
             a 3 0 l 1 2 0\n\
             f 3 0\n\
             f 2 -1 0\n\
             f 1 1 0\n"
        );
    }

    #[test]
    fn theory_conflict_learned_as_is() {
        let (file, mut tracer) = ascii_tracer();

        let mut db = Database::new();
        tracer.begin_proof(&db).unwrap();

        let conflict = clause![1, 2];
        let explanation = ConflictExplanation::LraBounds {
            coefficients: vec![Rational::new(1, 2), Rational::new(3, 1)],
        };
        tracer.init_conflict(&conflict, explanation).unwrap();
        tracer.learn_clause(&conflict).unwrap();
        tracer.finish_conflicts().unwrap();

        db.add_learned(conflict);
        tracer.end_proof(&db).unwrap();

        // One original for the theory clause, no addition, no stale delete,
        // and exactly one final entry
        assert_eq!(
            proof_text(&file, tracer),
            "c LRA bound conflict .\n\
             o 1 1 2 0\n\
             c theory clause 1 learned as-is .\n\
             f 1 1 2 0\n"
        );
    }

    #[test]
    fn abandoned_theory_conflict_is_deleted() {
        let (file, mut tracer) = ascii_tracer();

        let db = Database::new();
        tracer.begin_proof(&db).unwrap();

        let conflict = clause![-1, 3];
        tracer
            .init_conflict(&conflict, ConflictExplanation::UfCongruence)
            .unwrap();
        tracer.finish_conflicts().unwrap();
        tracer.end_proof(&db).unwrap();

        assert_eq!(
            proof_text(&file, tracer),
            "c UF congruence conflict .\n\
             o 1 -1 3 0\n\
             d 1 -1 3 0\n"
        );
    }

    #[test]
    fn renamed_conflict_keeps_its_chain() {
        let (file, mut tracer) = ascii_tracer();

        let mut db = Database::new();
        db.add_asserted(clause![1, 2]);
        db.add_asserted(clause![-2, 3]);
        let first = db.asserted()[0].clone();
        let second = db.asserted()[1].clone();

        tracer.begin_proof(&db).unwrap();
        tracer
            .init_conflict(&first, ConflictExplanation::Boolean)
            .unwrap();
        tracer.resolve_conflict(first.id(), second.id()).unwrap();

        let resolvent = clause![1, 3];
        tracer.rename_conflict(first.id(), resolvent.id()).unwrap();
        tracer.learn_clause(&resolvent).unwrap();
        tracer.finish_conflicts().unwrap();

        db.add_learned(resolvent);
        tracer.end_proof(&db).unwrap();

        assert_eq!(
            proof_text(&file, tracer),
            "o 1 1 2 0\n\
             o 2 -2 3 0\n\
             a 3 1 3 0 l 2 1 0\n\
             f 3 1 3 0\n\
             f 2 -2 3 0\n\
             f 1 1 2 0\n"
        );
    }

    #[test]
    fn rename_to_same_id_is_a_no_op() {
        let (file, mut tracer) = ascii_tracer();

        let mut db = Database::new();
        db.add_asserted(clause![1]);
        let conflict = db.asserted()[0].clone();

        tracer.begin_proof(&db).unwrap();
        tracer
            .init_conflict(&conflict, ConflictExplanation::Boolean)
            .unwrap();
        tracer
            .rename_conflict(conflict.id(), conflict.id())
            .unwrap();
        tracer.finish_conflicts().unwrap();
        tracer.end_proof(&db).unwrap();

        assert_eq!(proof_text(&file, tracer), "o 1 1 0\nf 1 1 0\n");
    }

    #[test]
    fn overlapping_conflicts_close_independently() {
        let (file, mut tracer) = ascii_tracer();

        let mut db = Database::new();
        db.add_asserted(clause![1, 2]);
        db.add_asserted(clause![-1, 2]);
        db.add_asserted(clause![1, -2]);
        let a = db.asserted()[0].clone();
        let b = db.asserted()[1].clone();
        let c = db.asserted()[2].clone();

        tracer.begin_proof(&db).unwrap();

        // Two conflicts are open at the same time; the second one closes
        // first and the first one is abandoned.
        tracer.init_conflict(&a, ConflictExplanation::Boolean).unwrap();
        tracer.init_conflict(&b, ConflictExplanation::Boolean).unwrap();
        tracer.resolve_conflict(b.id(), c.id()).unwrap();
        tracer.resolve_conflict(a.id(), b.id()).unwrap();

        let learned = clause![1];
        tracer.rename_conflict(b.id(), learned.id()).unwrap();
        tracer.learn_clause(&learned).unwrap();
        tracer.finish_conflicts().unwrap();

        db.add_learned(learned);
        tracer.end_proof(&db).unwrap();

        assert_eq!(
            proof_text(&file, tracer),
            "o 1 1 2 0\n\
             o 2 -1 2 0\n\
             o 3 1 -2 0\n\
             a 4 1 0 l 3 2 0\n\
             f 4 1 0\n\
             f 3 1 -2 0\n\
             f 2 -1 2 0\n\
             f 1 1 2 0\n"
        );
    }

    #[test]
    fn deletion_forgets_the_clause() {
        let (file, mut tracer) = ascii_tracer();

        let mut db = Database::new();
        db.add_asserted(clause![1, -2]);
        let clause = db.asserted()[0].clone();

        tracer.begin_proof(&db).unwrap();
        tracer.delete_clause(&clause).unwrap();

        assert_eq!(proof_text(&file, tracer), "o 1 1 -2 0\nd 1 1 -2 0\n");
    }

    #[test]
    fn binary_trivial_proof() {
        let (file, mut tracer) = binary_tracer();
        tracer.trivial_proof().unwrap();
        // Comments are suppressed, step ids are LEB128, terminators are NUL
        assert_eq!(proof_bytes(&file, tracer), b"o\x01\x00f\x01\x00");
    }

    #[test]
    fn binary_literal_mapping() {
        let (file, mut tracer) = binary_tracer();

        let mut db = Database::new();
        db.add_asserted(clause![1, -2]);
        tracer.begin_proof(&db).unwrap();

        // 1 maps to 2 and -2 maps to 5
        assert_eq!(proof_bytes(&file, tracer), b"o\x01\x02\x05\x00");
    }

    #[test]
    fn binary_encoding_uses_continuation_bits() {
        let (file, mut tracer) = binary_tracer();

        let mut db = Database::new();
        // Variable ordinal 64 encodes as 65, mapped to 130 = 0b1000_0010
        db.add_asserted(Clause::new(vec![resin_formula::lit!(65)]));
        tracer.begin_proof(&db).unwrap();

        assert_eq!(proof_bytes(&file, tracer), b"o\x01\x82\x01\x00");
    }

    #[test]
    fn binary_learned_step() {
        let (file, mut tracer) = binary_tracer();

        let mut db = Database::new();
        db.add_asserted(clause![1]);
        db.add_asserted(clause![-1]);
        let positive = db.asserted()[0].clone();
        let negative = db.asserted()[1].clone();

        tracer.begin_proof(&db).unwrap();
        tracer
            .init_conflict(&negative, ConflictExplanation::Boolean)
            .unwrap();
        tracer
            .resolve_conflict(negative.id(), positive.id())
            .unwrap();
        let empty = Clause::new(vec![]);
        tracer.rename_conflict(negative.id(), empty.id()).unwrap();
        tracer.derive_final(&empty).unwrap();
        tracer.end_proof(&db).unwrap();

        // o 1 (1): "o" 1 2 0 / o 2 (-1): "o" 2 3 0
        // a 3 0 l 1 2: "a" 3 0 "l" 2 4 0 (chain steps are signed)
        // f 3 / f 2 (-1) / f 1 (1)
        assert_eq!(
            proof_bytes(&file, tracer),
            b"o\x01\x02\x00\
              o\x02\x03\x00\
              a\x03\x00l\x02\x04\x00\
              f\x03\x00\
              f\x02\x03\x00\
              f\x01\x02\x00"
        );
    }

    #[test]
    #[should_panic(expected = "is not open")]
    fn resolving_unknown_conflict_panics() {
        let (_file, mut tracer) = ascii_tracer();
        let a = clause![1];
        let b = clause![-1];
        let _ = tracer.resolve_conflict(a.id(), b.id());
    }
}
