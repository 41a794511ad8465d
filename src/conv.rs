use log::{debug, info, warn};

use election_model::Election;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod io_blt;
pub mod io_loomio;
pub mod out_json;
pub mod out_literals;

#[derive(Debug, Snafu)]
pub enum ConvError {
    #[snafu(display("Error opening input file {path}"))]
    OpeningInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON document"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error rendering JSON output"))]
    RenderingJson { source: serde_json::Error },
    #[snafu(display("line {lineno}: expected {expected}, found {content:?}"))]
    MalformedLine {
        lineno: u64,
        expected: String,
        content: String,
    },
    #[snafu(display("unexpected end of input: expected {expected}"))]
    TruncatedInput { expected: String },
    #[snafu(display("stance {stance_id}: missing rank {rank}"))]
    MissingStanceRank { stance_id: u64, rank: u32 },
    #[snafu(display("stance {stance_id}: rank {rank} appears more than once"))]
    DuplicateStanceRank { stance_id: u64, rank: u32 },
    #[snafu(display("invalid election data: {source}"))]
    InvalidModel { source: election_model::ModelError },
    #[snafu(display("Error writing output file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl snafu::FromString for Box<ConvError> {
    type Source = <ConvError as snafu::FromString>::Source;

    fn without_source(message: String) -> Self {
        Box::new(ConvError::without_source(message))
    }

    fn with_source(source: Self::Source, message: String) -> Self {
        Box::new(ConvError::with_source(source, message))
    }
}

pub type ConvResult<T> = Result<T, ConvError>;
pub type BConvResult<T> = Result<T, Box<ConvError>>;

fn read_reference(path: String) -> BConvResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningInputSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_ballot_data(contents: &str, input_type: &str) -> BConvResult<Election> {
    match input_type {
        "blt" => io_blt::read_blt_ballots(contents),
        "loomio" => io_loomio::read_poll_export(contents),
        x => whatever!("Input type not implemented {:?}", x),
    }
}

pub fn run_conversion(args: &Args) -> BConvResult<()> {
    let path = args.input.clone();
    info!("Attempting to read ballot file {:?}", path);
    let contents =
        fs::read_to_string(path.clone()).context(OpeningInputSnafu { path: path.clone() })?;

    let input_type = match args.input_type.clone() {
        Some(s) => s,
        None => match Path::new(path.as_str()).extension().and_then(|e| e.to_str()) {
            Some("blt") => "blt".to_string(),
            Some("json") => "loomio".to_string(),
            x => {
                whatever!(
                    "Cannot infer the input type from extension {:?}, pass --input-type",
                    x
                )
            }
        },
    };

    let election = read_ballot_data(contents.as_str(), input_type.as_str())?;
    info!(
        "Read {} candidates and {} ballots from {:?}",
        election.candidates.len(),
        election.ballots.len(),
        path
    );
    debug!("run_conversion: election: {:?}", election);

    let format = args.format.clone().unwrap_or_else(|| "json".to_string());
    let rendered = match format.as_str() {
        "json" => {
            let js = out_json::election_to_json(&election);
            serde_json::to_string_pretty(&js).context(RenderingJsonSnafu {})?
        }
        "scala" => out_literals::election_to_literals(&election),
        x => whatever!("Output format not implemented {:?}", x),
    };

    match args.out.as_deref() {
        None | Some("stdout") => println!("{}", rendered),
        Some(out_path) => {
            fs::write(out_path, rendered.as_bytes()).context(WritingOutputSnafu {
                path: out_path.to_string(),
            })?;
        }
    }

    // The reference output, if provided for comparison
    if let Some(reference_path) = args.reference.clone() {
        let reference = read_reference(reference_path)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference).context(RenderingJsonSnafu {})?;
        if pretty_reference != rendered {
            warn!("Found differences with the reference file");
            print_diff(pretty_reference.as_str(), rendered.as_str(), "\n");
            whatever!("Difference detected between converted output and reference file")
        }
    }

    Ok(())
}
