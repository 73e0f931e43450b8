//! Per-conflict proof trees.
use resin_formula::ClauseId;

use crate::explanation::ConflictExplanation;

/// A node of the in-memory proof tree kept for each open conflict.
///
/// Conflict analysis is linear resolution: the conflict side grows while the
/// other side is always a single database clause, so the tree is a chain.
/// Each `Resolution` owns its inner node exclusively; there is no sharing and
/// the chain lives exactly as long as its entry in the tracer's open conflict
/// map.
#[derive(Debug)]
pub enum ProofNode {
    /// The conflict started from this clause.
    ConflictIntro {
        id: ClauseId,
        explanation: ConflictExplanation,
    },
    /// The conflict clause is the resolvent of the inner conflict with
    /// `other`.
    Resolution {
        conflict: Box<ProofNode>,
        other: ClauseId,
    },
}

impl ProofNode {
    /// Wraps this node in a resolution step against `other`.
    pub fn resolve(self, other: ClauseId) -> ProofNode {
        ProofNode::Resolution {
            conflict: Box::new(self),
            other,
        }
    }

    /// Collects the clause ids of a linear resolution chain.
    ///
    /// The ids are ordered from the last resolution back to the introduction,
    /// so the introduced conflict clause is always the final entry. Consumes
    /// the tree.
    pub fn into_resolvents(self) -> Vec<ClauseId> {
        let mut resolvents = Vec::new();
        let mut node = self;
        loop {
            match node {
                ProofNode::Resolution { conflict, other } => {
                    resolvents.push(other);
                    node = *conflict;
                }
                ProofNode::ConflictIntro { id, .. } => {
                    resolvents.push(id);
                    return resolvents;
                }
            }
        }
    }
}
