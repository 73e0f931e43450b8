use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info, Level, LevelFilter, Record};

use resin::config::{Options, Phase};
use resin_formula::{Clause, Database, Lit};
use resin_proof::tracer::ProofFormat;

/// Proof-producing SMT solver front end.
#[derive(Debug, Parser)]
#[command(name = "resin", version, disable_help_subcommand = true)]
struct Cli {
    /// The input file to use.
    input: PathBuf,

    /// Print solver counters.
    #[arg(long)]
    print_stats: bool,

    /// Decide rational variables with only one allowed value first.
    #[arg(long)]
    prop_rational: bool,

    /// Derive new LRA bounds using Fourier-Motzkin elimination.
    #[arg(long)]
    deduce_bounds: bool,

    /// Value selection strategy for boolean variables.
    #[arg(long, value_enum, default_value = "positive")]
    phase: PhaseArg,

    /// Produce an ASCII FRAT proof (shorthand for --proof-format frat).
    #[arg(long)]
    frat: bool,

    /// Proof format to produce. Implies proof production.
    #[arg(long, value_enum)]
    proof_format: Option<ProofFormatArg>,

    /// Proof output path.
    ///
    /// Defaults to the input path with a format-specific suffix appended.
    #[arg(long)]
    proof: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PhaseArg {
    Positive,
    Negative,
    Cache,
}

impl From<PhaseArg> for Phase {
    fn from(phase: PhaseArg) -> Phase {
        match phase {
            PhaseArg::Positive => Phase::Positive,
            PhaseArg::Negative => Phase::Negative,
            PhaseArg::Cache => Phase::Cache,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ProofFormatArg {
    Frat,
    BinaryFrat,
    AletheStream,
    AletheMemory,
}

impl From<ProofFormatArg> for ProofFormat {
    fn from(format: ProofFormatArg) -> ProofFormat {
        match format {
            ProofFormatArg::Frat => ProofFormat::FratAscii,
            ProofFormatArg::BinaryFrat => ProofFormat::FratBinary,
            ProofFormatArg::AletheStream => ProofFormat::AletheStream,
            ProofFormatArg::AletheMemory => ProofFormat::AletheMemory,
        }
    }
}

impl Cli {
    fn into_options(self) -> Options {
        let proof_format = match (self.proof_format, self.frat) {
            (Some(format), _) => Some(format.into()),
            (None, true) => Some(ProofFormat::FratAscii),
            (None, false) => None,
        };
        Options {
            prop_rational: self.prop_rational,
            deduce_bounds: self.deduce_bounds,
            print_stats: self.print_stats,
            phase: self.phase.into(),
            input_path: self.input,
            produce_proofs: proof_format.is_some(),
            proof_format: proof_format.unwrap_or(ProofFormat::FratAscii),
            proof_path: self.proof,
        }
    }
}

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{:#}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut env_logger::fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = env_logger::Builder::new();
    builder
        .target(env_logger::Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("RESIN_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn main_with_err() -> Result<i32> {
    let options = Cli::parse().into_options();

    init_logging();
    info!("This is resin {}", env!("CARGO_PKG_VERSION"));

    let tracer = options
        .build_tracer()
        .context("failed to set up proof output")?;

    let input = fs::read_to_string(&options.input_path)
        .with_context(|| format!("failed to open '{}'", options.input_path.display()))?;

    let mut db = Database::new();
    load_dimacs(&input, &mut db)?;

    if options.print_stats {
        info!(
            "{} variables, {} clauses",
            db.var_count(),
            db.asserted().len()
        );
    }

    if db.asserted().iter().any(Clause::is_empty) {
        // The input already contains false; no search is needed.
        tracer.trivial_proof()?;
        println!("s UNSATISFIABLE");
        return Ok(20);
    }

    // The conflict analysis core is built; the search engine that drives it
    // is not part of this crate.
    info!("no search engine is linked into this build");
    println!("s UNKNOWN");
    Ok(0)
}

/// Reads a DIMACS CNF formula into the asserted region of `db`.
///
/// This is a deliberately small reader: comments and the problem line are
/// skipped, clauses are zero-terminated literal runs.
fn load_dimacs(input: &str, db: &mut Database) -> Result<()> {
    let mut lits: Vec<Lit> = Vec::new();
    for line in input.lines() {
        let line = line.trim();
        if line == "%" {
            // Some benchmark sets terminate the formula this way
            break;
        }
        if line.is_empty() || line.starts_with('c') || line.starts_with('p') {
            continue;
        }
        for token in line.split_whitespace() {
            let number: isize = token
                .parse()
                .with_context(|| format!("invalid literal '{}'", token))?;
            if number == 0 {
                db.add_asserted(Clause::new(std::mem::take(&mut lits)));
            } else {
                lits.push(Lit::from_dimacs(number));
            }
        }
    }
    if !lits.is_empty() {
        bail!("unterminated clause at end of input");
    }
    Ok(())
}
