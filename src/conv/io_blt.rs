// Reader for the OpaVote-style BLT plaintext ballot format.

use log::debug;
use snafu::{OptionExt, ResultExt};

use election_model::{Builder, CandidateId, Election, ElectionMethod};

use crate::conv::*;

/// Strips comments and blank lines from a raw text stream, yielding the
/// significant logical lines together with their 1-based raw line numbers.
///
/// Everything from the first `#` to the end of the line is discarded, then
/// surrounding whitespace is trimmed. Lines left empty disappear entirely:
/// they do not count as ballot lines, name lines or anything else for the
/// downstream parser.
pub struct LogicalLines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> LogicalLines<'a> {
    pub fn new(contents: &'a str) -> LogicalLines<'a> {
        LogicalLines {
            inner: contents.lines().enumerate(),
        }
    }
}

impl<'a> Iterator for LogicalLines<'a> {
    type Item = (u64, &'a str);

    fn next(&mut self) -> Option<(u64, &'a str)> {
        for (idx, raw) in self.inner.by_ref() {
            let significant = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            }
            .trim();
            if !significant.is_empty() {
                return Some(((idx + 1) as u64, significant));
            }
        }
        None
    }
}

// The four sections of a BLT file, visited strictly in this order.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum ParseState {
    Header,
    Ballots,
    CandidateNames,
    Title,
}

// A ballot line before index resolution. The indices are 1-based and refer
// to candidate names that are declared only after the whole ballot section,
// so resolution is deferred to the model builder.
#[derive(PartialEq, Debug, Clone)]
struct RawBltBallot {
    weight: f64,
    rankings: Vec<u64>,
}

fn parse_ballot_line(lineno: u64, line: &str) -> ConvResult<RawBltBallot> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(ConvError::MalformedLine {
            lineno,
            expected: "a ballot line with a weight and a 0 terminator".to_string(),
            content: line.to_string(),
        });
    }
    // The trailing 0 is one token among several, unlike the end-of-ballots
    // marker which is a whole logical line.
    if tokens[tokens.len() - 1] != "0" {
        return Err(ConvError::MalformedLine {
            lineno,
            expected: "a 0 terminator at the end of the ballot line".to_string(),
            content: line.to_string(),
        });
    }
    let weight = match tokens[0].parse::<f64>() {
        Ok(w) => w,
        Err(_) => {
            return Err(ConvError::MalformedLine {
                lineno,
                expected: "a numeric ballot weight".to_string(),
                content: line.to_string(),
            });
        }
    };
    let mut rankings: Vec<u64> = Vec::new();
    for tok in tokens[1..tokens.len() - 1].iter() {
        match tok.parse::<u64>() {
            Ok(idx) => rankings.push(idx),
            Err(_) => {
                return Err(ConvError::MalformedLine {
                    lineno,
                    expected: "a 1-based candidate index".to_string(),
                    content: line.to_string(),
                });
            }
        }
    }
    Ok(RawBltBallot { weight, rankings })
}

// Candidate names and the title are written in double quotes.
fn unquote(line: &str) -> String {
    line.trim_matches('"').to_string()
}

pub fn read_blt_ballots(contents: &str) -> BConvResult<Election> {
    let mut lines = LogicalLines::new(contents);

    let mut num_candidates: usize = 0;
    let mut num_seats: u32 = 0;
    let mut raw_ballots: Vec<RawBltBallot> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut title: Option<String> = None;

    let mut state = ParseState::Header;
    loop {
        match state {
            ParseState::Header => {
                let (lineno, line) = lines.next().context(TruncatedInputSnafu {
                    expected: "the header line with the candidate and seat counts",
                })?;
                let tokens: Vec<&str> = line.split_whitespace().collect();
                let parsed: Option<(usize, u32)> = match tokens.as_slice() {
                    [nc, ns] => nc.parse::<usize>().ok().zip(ns.parse::<u32>().ok()),
                    _ => None,
                };
                match parsed {
                    Some((nc, ns)) => {
                        num_candidates = nc;
                        num_seats = ns;
                    }
                    None => {
                        return Err(Box::new(ConvError::MalformedLine {
                            lineno,
                            expected: "two integers: the candidate count and the seat count"
                                .to_string(),
                            content: line.to_string(),
                        }));
                    }
                }
                debug!(
                    "read_blt_ballots: header: {} candidates, {} seats",
                    num_candidates, num_seats
                );
                state = ParseState::Ballots;
            }
            ParseState::Ballots => {
                let (lineno, line) = lines.next().context(TruncatedInputSnafu {
                    expected: "a ballot line or the end-of-ballots marker",
                })?;
                if line == "0" {
                    // End-of-ballots marker, consumed but not a ballot.
                    state = ParseState::CandidateNames;
                    continue;
                }
                raw_ballots.push(parse_ballot_line(lineno, line)?);
            }
            ParseState::CandidateNames => {
                if names.len() == num_candidates {
                    state = ParseState::Title;
                    continue;
                }
                let (_, line) = lines.next().context(TruncatedInputSnafu {
                    expected: format!(
                        "{} candidate name lines, got {}",
                        num_candidates,
                        names.len()
                    ),
                })?;
                names.push(unquote(line));
            }
            ParseState::Title => {
                let (_, line) = lines.next().context(TruncatedInputSnafu {
                    expected: "the election title line",
                })?;
                title = Some(unquote(line));
                break;
            }
        }
    }

    debug!(
        "read_blt_ballots: {} ballots, names: {:?}, title: {:?}",
        raw_ballots.len(),
        names,
        title
    );

    let mut builder = Builder::new(ElectionMethod::SingleTransferableVote)
        .num_positions(num_seats)
        .declared_candidate_count(num_candidates);
    if let Some(t) = title {
        builder = builder.title(t.as_str());
    }
    for (idx, name) in names.iter().enumerate() {
        builder.candidate(CandidateId((idx + 1) as u64), name);
    }
    for raw in raw_ballots.iter() {
        let entries: Vec<(u32, CandidateId)> = raw
            .rankings
            .iter()
            .enumerate()
            .map(|(pos, &r)| ((pos + 1) as u32, CandidateId(r)))
            .collect();
        builder.add_ballot(raw.weight, &entries);
    }
    let election = builder.build().context(InvalidModelSnafu {})?;
    Ok(election)
}

#[cfg(test)]
mod tests {
    use super::*;
    use election_model::ModelError;

    fn logical(contents: &str) -> Vec<&str> {
        LogicalLines::new(contents).map(|(_, l)| l).collect()
    }

    #[test]
    fn logical_lines_strip_comments_and_blanks() {
        let text = "# leading comment\n\n3 4   # seats\n   \n\"A\" # name\n";
        assert_eq!(logical(text), vec!["3 4", "\"A\""]);
    }

    #[test]
    fn logical_lines_keep_raw_line_numbers() {
        let text = "# c\n\n3 4\n";
        let numbered: Vec<(u64, &str)> = LogicalLines::new(text).collect();
        assert_eq!(numbered, vec![(3, "3 4")]);
    }

    #[test]
    fn comment_stripping_is_position_independent() {
        let with_comment = "3 4   # seats\n0\n\"A\"\n\"B\"\n\"C\"\n\"T\"\n";
        let without = "3 4\n0\n\"A\"\n\"B\"\n\"C\"\n\"T\"\n";
        let e1 = read_blt_ballots(with_comment).unwrap();
        let e2 = read_blt_ballots(without).unwrap();
        assert_eq!(e1, e2);
        assert_eq!(e1.num_positions, 4);
    }

    #[test]
    fn parses_a_small_election() {
        let text = "3 1\n1 1 2 3 0\n1 0\n0\n\"A\"\n\"B\"\n\"C\"\n\"T\"\n";
        let e = read_blt_ballots(text).unwrap();
        assert_eq!(e.candidates.len(), 3);
        assert_eq!(e.num_positions, 1);
        assert_eq!(e.title.as_deref(), Some("T"));
        assert_eq!(e.ballots.len(), 2);
        assert_eq!(e.ranked_names(&e.ballots[0]), vec!["A", "B", "C"]);
        assert!(e.ballots[1].is_empty());
        assert_eq!(e.ballots[1].weight, 1.0);
    }

    #[test]
    fn blank_and_commented_lines_do_not_advance_the_parser() {
        let text = "2 1\n# not a ballot\n1 2 0\n\n0\n# not a name\n\"A\"\n\"B\"\n\n\"T\"\n";
        let e = read_blt_ballots(text).unwrap();
        assert_eq!(e.ballots.len(), 1);
        assert_eq!(e.ranked_names(&e.ballots[0]), vec!["B"]);
        assert_eq!(e.title.as_deref(), Some("T"));
    }

    #[test]
    fn ranking_count_follows_the_source_line() {
        let text = "3 1\n2 3 1 0\n1 0\n0\n\"A\"\n\"B\"\n\"C\"\n\"T\"\n";
        let e = read_blt_ballots(text).unwrap();
        assert_eq!(e.ballots[0].weight, 2.0);
        assert_eq!(e.ballots[0].choices.len(), 2);
        assert_eq!(e.ballots[1].choices.len(), 0);
    }

    #[test]
    fn missing_header_is_truncated_input() {
        let res = read_blt_ballots("# only comments\n");
        assert!(matches!(*res.unwrap_err(), ConvError::TruncatedInput { .. }));
    }

    #[test]
    fn non_numeric_header_is_malformed() {
        let res = read_blt_ballots("three 1\n0\n\"T\"\n");
        assert!(matches!(
            *res.unwrap_err(),
            ConvError::MalformedLine { lineno: 1, .. }
        ));
    }

    #[test]
    fn missing_sentinel_is_truncated_input() {
        let res = read_blt_ballots("2 1\n1 1 2 0\n");
        assert!(matches!(*res.unwrap_err(), ConvError::TruncatedInput { .. }));
    }

    #[test]
    fn short_ballot_line_is_malformed() {
        let res = read_blt_ballots("2 1\n1\n0\n\"A\"\n\"B\"\n\"T\"\n");
        assert!(matches!(
            *res.unwrap_err(),
            ConvError::MalformedLine { lineno: 2, .. }
        ));
    }

    #[test]
    fn missing_ballot_terminator_is_malformed() {
        let res = read_blt_ballots("2 1\n1 1 2\n0\n\"A\"\n\"B\"\n\"T\"\n");
        assert!(matches!(
            *res.unwrap_err(),
            ConvError::MalformedLine { lineno: 2, .. }
        ));
    }

    #[test]
    fn truncated_names_is_not_a_count_mismatch() {
        let res = read_blt_ballots("2 1\n0\n\"A\"\n");
        assert!(matches!(*res.unwrap_err(), ConvError::TruncatedInput { .. }));
    }

    #[test]
    fn out_of_range_index_names_the_reference() {
        let res = read_blt_ballots("3 1\n1 5 0\n0\n\"A\"\n\"B\"\n\"C\"\n\"T\"\n");
        match *res.unwrap_err() {
            ConvError::InvalidModel {
                source: ModelError::UnresolvedReference { ballot, reference },
            } => {
                assert_eq!(ballot, 0);
                assert_eq!(reference, CandidateId(5));
            }
            e => panic!("unexpected error: {:?}", e),
        }
    }

    // Renders an election back into the BLT grammar, for round trips.
    fn render_blt(e: &Election) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} {}\n", e.candidates.len(), e.num_positions));
        for b in e.ballots.iter() {
            out.push_str(&format!("{}", b.weight));
            for cid in b.choices.iter() {
                out.push_str(&format!(" {}", cid));
            }
            out.push_str(" 0\n");
        }
        out.push_str("0\n");
        for c in e.candidates.iter() {
            out.push_str(&format!("\"{}\"\n", c.name));
        }
        out.push_str(&format!(
            "\"{}\"\n",
            e.title.clone().unwrap_or_else(|| "Untitled".to_string())
        ));
        out
    }

    #[test]
    fn round_trips_through_the_grammar() {
        let text = "3 2\n1 3 1 0\n2 0\n1 2 3 1 0\n0\n\"A\"\n\"B\"\n\"C\"\n\"T\"\n";
        let e1 = read_blt_ballots(text).unwrap();
        let rendered = render_blt(&e1);
        let e2 = read_blt_ballots(rendered.as_str()).unwrap();
        assert_eq!(e1, e2);
    }
}
