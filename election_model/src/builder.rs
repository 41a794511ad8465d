use log::debug;

use std::collections::HashSet;

pub use crate::model::*;

// A ballot as accumulated by the builder, before any validation.
// Ranks are kept explicit so that the density check can report what
// the source actually said.
#[derive(PartialEq, Debug, Clone)]
struct RawBallot {
    weight: f64,
    entries: Vec<(u32, CandidateId)>,
}

/// A builder for assembling a validated [Election].
///
/// The adapters accumulate raw candidates and ballots in source order;
/// all cross-checks (duplicate ids, declared counts, rank density,
/// reference resolution) happen in one [build](Builder::build) step,
/// once all candidate declarations are known.
///
/// ```
/// use election_model::{Builder, CandidateId, ElectionMethod};
/// # use election_model::ModelError;
///
/// let mut builder = Builder::new(ElectionMethod::SingleTransferableVote);
/// builder.candidate(CandidateId(1), "Anna");
/// builder.candidate(CandidateId(2), "Bob");
/// builder.add_ballot_simple(&[CandidateId(2), CandidateId(1)]);
///
/// let election = builder.build()?;
/// assert_eq!(election.ballots.len(), 1);
/// # Ok::<(), ModelError>(())
/// ```
pub struct Builder {
    method: ElectionMethod,
    num_positions: u32,
    title: Option<String>,
    declared_count: Option<usize>,
    candidates: Vec<Candidate>,
    ballots: Vec<RawBallot>,
}

impl Builder {
    pub fn new(method: ElectionMethod) -> Builder {
        Builder {
            method,
            num_positions: 1,
            title: None,
            declared_count: None,
            candidates: Vec::new(),
            ballots: Vec::new(),
        }
    }

    pub fn num_positions(mut self, num_positions: u32) -> Builder {
        self.num_positions = num_positions;
        self
    }

    pub fn title(mut self, title: &str) -> Builder {
        self.title = Some(title.to_string());
        self
    }

    /// The candidate count stated by the source format, when it states
    /// one. Checked against the actual declarations at build time.
    pub fn declared_candidate_count(mut self, count: usize) -> Builder {
        self.declared_count = Some(count);
        self
    }

    pub fn candidate(&mut self, id: CandidateId, name: &str) {
        self.candidates.push(Candidate {
            id,
            name: name.to_string(),
        });
    }

    /// Adds a ballot with explicit ranks, as (rank, candidate) pairs in
    /// rank order. Ranks must run 1, 2, 3, ... — anything else is
    /// rejected at build time.
    pub fn add_ballot(&mut self, weight: f64, ranked: &[(u32, CandidateId)]) {
        self.ballots.push(RawBallot {
            weight,
            entries: ranked.to_vec(),
        });
    }

    /// Adds a ballot of weight 1 whose ranks are implied by position.
    pub fn add_ballot_simple(&mut self, choices: &[CandidateId]) {
        let entries: Vec<(u32, CandidateId)> = choices
            .iter()
            .enumerate()
            .map(|(idx, &cid)| ((idx + 1) as u32, cid))
            .collect();
        self.ballots.push(RawBallot {
            weight: Ballot::DEFAULT_WEIGHT,
            entries,
        });
    }

    /// Validates the accumulated records and assembles the election.
    ///
    /// Ballots keep their insertion order in the output.
    pub fn build(self) -> Result<Election, ModelError> {
        if self.num_positions < 1 {
            return Err(ModelError::InvalidPositionCount {
                num_positions: self.num_positions,
            });
        }

        let mut known_ids: HashSet<CandidateId> = HashSet::new();
        for c in self.candidates.iter() {
            if !known_ids.insert(c.id) {
                return Err(ModelError::DuplicateCandidate {
                    id: c.id,
                    name: c.name.clone(),
                });
            }
        }

        if let Some(declared) = self.declared_count {
            if declared != self.candidates.len() {
                return Err(ModelError::CandidateCountMismatch {
                    declared,
                    actual: self.candidates.len(),
                });
            }
        }

        let mut ballots: Vec<Ballot> = Vec::with_capacity(self.ballots.len());
        for (idx, raw) in self.ballots.iter().enumerate() {
            let mut choices: Vec<CandidateId> = Vec::with_capacity(raw.entries.len());
            for (pos, &(rank, cid)) in raw.entries.iter().enumerate() {
                let expected = (pos + 1) as u32;
                if rank != expected {
                    return Err(ModelError::RankSequence {
                        ballot: idx,
                        expected,
                        found: rank,
                    });
                }
                if !known_ids.contains(&cid) {
                    return Err(ModelError::UnresolvedReference {
                        ballot: idx,
                        reference: cid,
                    });
                }
                choices.push(cid);
            }
            ballots.push(Ballot {
                weight: raw.weight,
                choices,
            });
        }

        debug!(
            "build: {} candidates, {} ballots, method {:?}",
            self.candidates.len(),
            ballots.len(),
            self.method
        );

        Ok(Election {
            method: self.method,
            num_positions: self.num_positions,
            title: self.title,
            candidates: self.candidates,
            ballots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_candidates() -> Builder {
        let mut b = Builder::new(ElectionMethod::SingleTransferableVote);
        b.candidate(CandidateId(1), "Anna");
        b.candidate(CandidateId(2), "Bob");
        b
    }

    #[test]
    fn builds_in_input_order() {
        let mut b = two_candidates();
        b.add_ballot_simple(&[CandidateId(2), CandidateId(1)]);
        b.add_ballot_simple(&[CandidateId(1)]);
        let e = b.build().unwrap();
        assert_eq!(
            e.candidates.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Anna", "Bob"]
        );
        assert_eq!(e.ranked_names(&e.ballots[0]), vec!["Bob", "Anna"]);
        assert_eq!(e.ranked_names(&e.ballots[1]), vec!["Anna"]);
    }

    #[test]
    fn empty_ballot_is_valid() {
        let mut b = two_candidates();
        b.add_ballot(2.0, &[]);
        let e = b.build().unwrap();
        assert!(e.ballots[0].is_empty());
        assert_eq!(e.ballots[0].weight, 2.0);
    }

    #[test]
    fn duplicate_candidate_id_is_rejected() {
        let mut b = two_candidates();
        b.candidate(CandidateId(1), "Anna again");
        assert_eq!(
            b.build(),
            Err(ModelError::DuplicateCandidate {
                id: CandidateId(1),
                name: "Anna again".to_string()
            })
        );
    }

    #[test]
    fn unresolved_reference_names_ballot_and_id() {
        let mut b = two_candidates();
        b.add_ballot_simple(&[CandidateId(1)]);
        b.add_ballot_simple(&[CandidateId(5)]);
        assert_eq!(
            b.build(),
            Err(ModelError::UnresolvedReference {
                ballot: 1,
                reference: CandidateId(5)
            })
        );
    }

    #[test]
    fn declared_count_must_match() {
        let b = two_candidates().declared_candidate_count(3);
        assert_eq!(
            b.build(),
            Err(ModelError::CandidateCountMismatch {
                declared: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn rank_gap_is_rejected() {
        let mut b = two_candidates();
        b.add_ballot(1.0, &[(1, CandidateId(1)), (3, CandidateId(2))]);
        assert_eq!(
            b.build(),
            Err(ModelError::RankSequence {
                ballot: 0,
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn repeated_rank_is_rejected() {
        let mut b = two_candidates();
        b.add_ballot(1.0, &[(1, CandidateId(1)), (1, CandidateId(2))]);
        assert_eq!(
            b.build(),
            Err(ModelError::RankSequence {
                ballot: 0,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn zero_positions_is_rejected() {
        let b = two_candidates().num_positions(0);
        assert_eq!(
            b.build(),
            Err(ModelError::InvalidPositionCount { num_positions: 0 })
        );
    }
}
