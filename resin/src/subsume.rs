//! Restart-time subsumption and clause minimization.
use log::debug;

use resin_formula::{Clause, ClauseId, Database, Lit};
use resin_proof::lit_hash;
use resin_proof::tracer::ProofError;
use resin_proof::TracerHandle;

/// Computes the 64-bit signature of a clause.
///
/// One bit per literal, selected by the literal's hash. If clause A is a
/// sub-multiset of clause B then `sig(A) & !sig(B) == 0`, so the signature is
/// a cheap necessary condition tested before any literal-by-literal subset
/// check.
fn signature(lits: &[Lit]) -> u64 {
    let mut sig = 0;
    for &lit in lits {
        sig |= 1 << (lit_hash(lit) & 63);
    }
    sig
}

/// Occurrence index entry: a position in the learned region together with the
/// clause's id and signature.
///
/// The id is checked against the database before the entry is used, since the
/// learned region may have been compacted since the index was built.
#[derive(Copy, Clone)]
struct OccurEntry {
    index: usize,
    id: ClauseId,
    sig: u64,
}

/// Periodically (on restart) removes subsumed learned clauses.
///
/// Also minimizes clauses about to be learned using self-subsuming
/// resolution. Every clause removed from the database is reported to the
/// tracer so the proof stays consistent.
pub struct Subsumption {
    /// literal code -> learned clauses containing that literal
    occur: Vec<Vec<OccurEntry>>,
    /// scratch bitset for subset tests, cleared after every use
    lit_bitset: Vec<bool>,
    /// number of learned clauses at the end of the previous restart pass
    old_size: usize,
    tracer: TracerHandle,
}

impl Subsumption {
    pub fn new(tracer: TracerHandle) -> Subsumption {
        Subsumption {
            occur: Vec::new(),
            lit_bitset: Vec::new(),
            old_size: 0,
            tracer,
        }
    }

    /// Finds and removes subsumed learned clauses from `db`.
    ///
    /// Clauses added since the previous restart are sorted to the front of
    /// their region by ascending length, so short clauses get to subsume
    /// before anything else. The tracer hears about every removed clause.
    pub fn on_restart(&mut self, db: &mut Database) -> Result<(), ProofError> {
        self.reserve_vars(db.var_count());

        let fresh = self.old_size.min(db.learned().len());
        db.learned_mut()[fresh..].sort_by_key(Clause::len);

        self.index(db);

        let mut removed = Vec::new();
        for index in 0..db.learned().len() {
            self.remove_subsumed(index, db, &mut removed);
        }

        let emptied = db.compact_learned();
        debug_assert_eq!(emptied.len(), removed.len());

        // Rebuild the index over the packed region so minimization sees
        // valid entries until the next restart.
        self.index(db);
        self.old_size = db.learned().len();

        for clause in &removed {
            self.tracer.delete_clause(clause)?;
        }
        if !removed.is_empty() {
            debug!("subsumption removed {} learned clauses", removed.len());
        }
        Ok(())
    }

    /// Minimizes `clause` using self-subsuming resolution.
    ///
    /// A literal can be dropped when some indexed learned clause resolves
    /// against it into a subset of the remainder. Removal swaps in the last
    /// literal, so the cursor stays put after a hit to re-examine the swapped
    /// literal.
    pub fn minimize(&mut self, db: &Database, clause: &mut Clause) {
        let clause_vars = clause.lits().iter().map(|lit| lit.ord() + 1).max();
        self.reserve_vars(db.var_count().max(clause_vars.unwrap_or(0)));
        let mut shrunk = 0usize;

        let mut cursor = 0;
        while cursor < clause.len() {
            let lit = clause.lits()[cursor];
            let resolved = !lit;
            if resolved.code() >= self.occur.len() {
                cursor += 1;
                continue;
            }
            let sig = signature(clause.lits());
            let allowed = sig | 1 << (lit_hash(resolved) & 63);

            let mut dropped = false;
            for entry_index in 0..self.occur[resolved.code()].len() {
                let entry = self.occur[resolved.code()][entry_index];
                let other = match db.learned().get(entry.index) {
                    Some(other) if other.id() == entry.id => other,
                    _ => continue,
                };
                if other.len() > clause.len() || entry.sig & !allowed != 0 {
                    continue;
                }
                if self.selfsubsumes(other.lits(), clause.lits(), resolved) {
                    clause.lits_mut().swap_remove(cursor);
                    shrunk += 1;
                    dropped = true;
                    break;
                }
            }
            if !dropped {
                cursor += 1;
            }
        }
        if shrunk > 0 {
            debug!("self-subsumption dropped {} literals", shrunk);
        }
    }

    fn reserve_vars(&mut self, var_count: usize) {
        let codes = var_count * 2;
        if self.occur.len() < codes {
            self.occur.resize_with(codes, Vec::new);
            self.lit_bitset.resize(codes, false);
        }
    }

    /// Builds `occur` over the learned region of `db`.
    fn index(&mut self, db: &Database) {
        for list in &mut self.occur {
            list.clear();
        }
        for (index, clause) in db.learned().iter().enumerate() {
            let sig = signature(clause.lits());
            for &lit in clause.lits() {
                self.occur[lit.code()].push(OccurEntry {
                    index,
                    id: clause.id(),
                    sig,
                });
            }
        }
    }

    /// Empties every learned clause subsumed by the clause at `index`,
    /// recording a copy of each victim (literals intact) in `removed`.
    fn remove_subsumed(&mut self, index: usize, db: &mut Database, removed: &mut Vec<Clause>) {
        let clause = &db.learned()[index];
        if clause.is_empty() {
            return;
        }
        let sig = signature(clause.lits());

        // Scan candidates through the literal with the fewest occurrences
        let probe = match clause
            .lits()
            .iter()
            .copied()
            .min_by_key(|lit| self.occur[lit.code()].len())
        {
            Some(lit) => lit,
            None => return,
        };

        for entry_index in 0..self.occur[probe.code()].len() {
            let entry = self.occur[probe.code()][entry_index];
            if entry.index == index {
                continue;
            }
            let other = match db.learned().get(entry.index) {
                Some(other) if other.id() == entry.id => other,
                _ => continue,
            };
            if self.subsumes(db.learned()[index].lits(), sig, other.lits(), entry.sig) {
                removed.push(other.clone());
                db.learned_mut()[entry.index].lits_mut().clear();
            }
        }
    }

    /// Checks whether `first` is a proper subset of `second`.
    ///
    /// The caller has already ruled out comparing a clause against itself.
    fn subsumes(&mut self, first: &[Lit], first_sig: u64, second: &[Lit], second_sig: u64) -> bool {
        if first.len() >= second.len() || first_sig & !second_sig != 0 {
            return false;
        }
        for &lit in second {
            self.lit_bitset[lit.code()] = true;
        }
        let subset = first.iter().all(|lit| self.lit_bitset[lit.code()]);
        for &lit in second {
            self.lit_bitset[lit.code()] = false;
        }
        subset
    }

    /// Checks whether resolving `first` and `second` on `lit` yields a
    /// proper subset of `second`.
    ///
    /// `lit` occurs in `first`; its negation occurs in `second`.
    fn selfsubsumes(&mut self, first: &[Lit], second: &[Lit], lit: Lit) -> bool {
        for &l in second {
            if l != !lit {
                self.lit_bitset[l.code()] = true;
            }
        }
        let mut subset = true;
        for &l in first {
            if l != lit && !self.lit_bitset[l.code()] {
                subset = false;
                break;
            }
        }
        for &l in second {
            self.lit_bitset[l.code()] = false;
        }
        subset
    }
}
