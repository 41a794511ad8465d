// Reader for the Loomio poll export format.

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use std::collections::{BTreeMap, HashMap};

use election_model::{Ballot, Builder, CandidateId, Election, ElectionMethod};

use crate::conv::*;

/// Display names longer than this are cut down for the downstream
/// presentation. Identity is carried by the option id and is not affected.
pub const MAX_NAME_WIDTH: usize = 14;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct PollOption {
    pub id: u64,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct StanceChoice {
    #[serde(rename = "stance_id")]
    pub stance_id: u64,
    pub rank: u32,
    #[serde(rename = "poll_option_id")]
    pub option_id: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct PollExport {
    #[serde(rename = "poll_options")]
    pub options: Vec<PollOption>,
    #[serde(rename = "stance_choices")]
    pub stance_choices: Vec<StanceChoice>,
}

pub fn read_poll_export(contents: &str) -> BConvResult<Election> {
    let export: PollExport = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    debug!(
        "read_poll_export: {} options, {} stance choices",
        export.options.len(),
        export.stance_choices.len()
    );

    // Group by stance, then by rank. The records of one stance may arrive in
    // any order, so each stance is finalized only once all of its rank
    // entries are known.
    let mut stance_order: Vec<u64> = Vec::new();
    let mut stances: HashMap<u64, BTreeMap<u32, u64>> = HashMap::new();
    for sc in export.stance_choices.iter() {
        let stance = stances.entry(sc.stance_id).or_insert_with(|| {
            stance_order.push(sc.stance_id);
            BTreeMap::new()
        });
        if stance.insert(sc.rank, sc.option_id).is_some() {
            return Err(Box::new(ConvError::DuplicateStanceRank {
                stance_id: sc.stance_id,
                rank: sc.rank,
            }));
        }
    }

    let mut builder = Builder::new(ElectionMethod::RankedPairs);
    for opt in export.options.iter() {
        let display: String = opt.name.chars().take(MAX_NAME_WIDTH).collect();
        builder.candidate(CandidateId(opt.id), display.as_str());
    }

    for stance_id in stance_order.iter() {
        if let Some(ranks) = stances.get(stance_id) {
            let mut entries: Vec<(u32, CandidateId)> = Vec::with_capacity(ranks.len());
            for expected in 1..=(ranks.len() as u32) {
                let option_id = ranks.get(&expected).context(MissingStanceRankSnafu {
                    stance_id: *stance_id,
                    rank: expected,
                })?;
                entries.push((expected, CandidateId(*option_id)));
            }
            debug!("read_poll_export: stance {}: {:?}", stance_id, entries);
            builder.add_ballot(Ballot::DEFAULT_WEIGHT, &entries);
        }
    }

    let election = builder.build().context(InvalidModelSnafu {})?;
    Ok(election)
}
