use clap::Parser;

/// Converts ranked-choice ballot exports into a canonical election model.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The ballot export to convert: an OpaVote-style BLT file or a
    /// Loomio poll export in JSON format.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (blt or loomio) The type of the input. If not specified, it is inferred
    /// from the file extension (.blt -> blt, .json -> loomio).
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the converted election.
    /// Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (json or scala, default json) The output format: the canonical JSON
    /// document, or source literals for the downstream election library.
    #[clap(long, value_parser)]
    pub format: Option<String>,

    /// (file path) A reference JSON document. If provided, ballotconv checks
    /// that the converted output matches the reference and fails otherwise.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
