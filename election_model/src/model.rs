// ********* Canonical data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The identity of a candidate within one election.
///
/// Ids are opaque sequence numbers local to a single conversion run:
/// the BLT adapter numbers candidates 1..=N in declaration order, the
/// poll-export adapter keeps the option ids of the source document.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub u64);

impl Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The voting method the downstream tabulator is expected to apply.
///
/// The converter does not run any of these algorithms, it only records
/// which one the source format implies.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ElectionMethod {
    SingleTransferableVote,
    RankedPairs,
}

impl Display for ElectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ElectionMethod::SingleTransferableVote => "SingleTransferableVote",
            ElectionMethod::RankedPairs => "RankedPairs",
        };
        write!(f, "{}", s)
    }
}

/// A declared candidate. Identity is the id, the name is display-only
/// and may have been truncated by an adapter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
}

/// One voter's ranked preference list, most preferred first.
///
/// An empty list is a valid ballot (the voter ranked no one).
#[derive(PartialEq, Debug, Clone)]
pub struct Ballot {
    pub weight: f64,
    pub choices: Vec<CandidateId>,
}

impl Ballot {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

/// The validated, format-independent election model.
///
/// All references in `ballots` are guaranteed to resolve against
/// `candidates`. Both sequences preserve the input order of the source
/// document, which may matter to tabulators with
/// tie-break-by-submission-order policies.
#[derive(PartialEq, Debug, Clone)]
pub struct Election {
    pub method: ElectionMethod,
    pub num_positions: u32,
    pub title: Option<String>,
    pub candidates: Vec<Candidate>,
    pub ballots: Vec<Ballot>,
}

impl Election {
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// The candidate names of one ballot, in preference order.
    pub fn ranked_names<'a>(&'a self, ballot: &Ballot) -> Vec<&'a str> {
        ballot
            .choices
            .iter()
            .filter_map(|&cid| self.candidate(cid).map(|c| c.name.as_str()))
            .collect()
    }
}

/// Errors detected while assembling the canonical model.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ModelError {
    /// A candidate id was declared more than once.
    DuplicateCandidate { id: CandidateId, name: String },
    /// A ballot referenced a candidate id with no declaration.
    UnresolvedReference {
        ballot: usize,
        reference: CandidateId,
    },
    /// The source declared a candidate count that does not match the
    /// number of candidates actually provided.
    CandidateCountMismatch { declared: usize, actual: usize },
    /// A ballot's ranks are not 1, 2, 3, ... without gaps or repeats.
    RankSequence {
        ballot: usize,
        expected: u32,
        found: u32,
    },
    /// The number of positions must be at least 1.
    InvalidPositionCount { num_positions: u32 },
}

impl Error for ModelError {}

impl Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::DuplicateCandidate { id, name } => {
                write!(f, "duplicate candidate id {} (name {:?})", id, name)
            }
            ModelError::UnresolvedReference { ballot, reference } => {
                write!(
                    f,
                    "ballot {}: unresolved candidate reference {}",
                    ballot, reference
                )
            }
            ModelError::CandidateCountMismatch { declared, actual } => {
                write!(
                    f,
                    "candidate count mismatch: {} declared, {} provided",
                    declared, actual
                )
            }
            ModelError::RankSequence {
                ballot,
                expected,
                found,
            } => {
                write!(
                    f,
                    "ballot {}: expected rank {}, found rank {}",
                    ballot, expected, found
                )
            }
            ModelError::InvalidPositionCount { num_positions } => {
                write!(f, "the number of positions must be at least 1, got {}", num_positions)
            }
        }
    }
}
