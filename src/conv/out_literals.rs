// Renders the canonical model as source literals for the downstream
// election library.

use election_model::{Election, ElectionMethod};

// The election classes exposed by the downstream library.
fn election_class(method: ElectionMethod) -> &'static str {
    match method {
        ElectionMethod::RankedPairs => "RankedBallotRankedPairsElection",
        ElectionMethod::SingleTransferableVote => "RankedBallotSingleTransferableVoteElection",
    }
}

pub fn election_to_literals(e: &Election) -> String {
    let mut out = String::new();
    out.push_str("import elections._\n");

    let mut vals: Vec<String> = Vec::new();
    for c in e.candidates.iter() {
        let val = format!("option{}", c.id);
        out.push_str(&format!("val {} = Candidate(\"{}\")\n", val, c.name));
        vals.push(val);
    }
    out.push_str(&format!("val candidates = Set({})\n", vals.join(", ")));
    out.push_str(&format!(
        "val election = new {}(candidates)\n",
        election_class(e.method)
    ));

    out.push_str("val ballots = Set(\n");
    for b in e.ballots.iter() {
        let refs: Vec<String> = b
            .choices
            .iter()
            .map(|cid| format!("option{}", cid))
            .collect();
        out.push_str(&format!(
            "  new RankedBallot(election, List({})),\n",
            refs.join(", ")
        ));
    }
    out.push_str(")\n");

    out.push_str("val result = election.countBallots(ballots)\n");
    out.push_str("result.preferenceMatrix.description\n");
    out
}
