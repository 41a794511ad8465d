// Renders the canonical model as the election JSON document.

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use election_model::Election;

pub fn election_to_json(e: &Election) -> JSValue {
    let candidates: Vec<JSValue> = e
        .candidates
        .iter()
        .map(|c| json!({ "name": c.name }))
        .collect();
    let ballots: Vec<JSValue> = e.ballots.iter().map(|b| json!(e.ranked_names(b))).collect();

    let mut election: JSMap<String, JSValue> = JSMap::new();
    election.insert("method".to_string(), json!(e.method.to_string()));
    election.insert("numPositions".to_string(), json!(e.num_positions));
    if let Some(title) = e.title.clone() {
        election.insert("title".to_string(), json!(title));
    }
    election.insert("candidates".to_string(), JSValue::Array(candidates));

    json!({
        "election": election,
        "ballots": ballots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use election_model::{Builder, CandidateId, ElectionMethod};

    #[test]
    fn title_is_omitted_when_absent() {
        let mut b = Builder::new(ElectionMethod::RankedPairs);
        b.candidate(CandidateId(1), "Yes");
        b.add_ballot_simple(&[CandidateId(1)]);
        let e = b.build().unwrap();
        let js = election_to_json(&e);
        assert!(js["election"].get("title").is_none());
        assert_eq!(
            js,
            serde_json::json!({
                "election": {
                    "method": "RankedPairs",
                    "numPositions": 1,
                    "candidates": [{"name": "Yes"}],
                },
                "ballots": [["Yes"]],
            })
        );
    }
}
