//! Run configuration.
use std::path::PathBuf;

use resin_proof::frat::FratTracer;
use resin_proof::tracer::{ProofError, ProofFormat};
use resin_proof::TracerHandle;

/// Value selection strategy for boolean variables.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Phase {
    /// Always decide true.
    #[default]
    Positive,
    /// Always decide false.
    Negative,
    /// Reuse the last value the variable was assigned.
    Cache,
}

/// Solver options, typically parsed from the command line.
#[derive(Clone, Debug)]
pub struct Options {
    /// Decide rational variables with only one allowed value first.
    pub prop_rational: bool,

    /// Derive new LRA bounds using Fourier-Motzkin elimination.
    pub deduce_bounds: bool,

    /// Print solver counters at the end of the run.
    pub print_stats: bool,

    /// Value selection strategy for boolean variables.
    pub phase: Phase,

    /// Input file path.
    pub input_path: PathBuf,

    /// Enable proof production.
    pub produce_proofs: bool,

    /// Produced proof format.
    pub proof_format: ProofFormat,

    /// Proof file path.
    ///
    /// If not set, the path is derived from the input path by appending a
    /// format-specific suffix.
    pub proof_path: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            prop_rational: false,
            deduce_bounds: false,
            print_stats: false,
            phase: Phase::default(),
            input_path: PathBuf::new(),
            produce_proofs: false,
            proof_format: ProofFormat::FratAscii,
            proof_path: None,
        }
    }
}

impl Options {
    /// Constructs the proof tracer these options call for.
    ///
    /// Returns an empty handle when proof production is disabled, and
    /// [`ProofError::UnsupportedFormat`] for the declared-but-unimplemented
    /// Alethe formats.
    pub fn build_tracer(&self) -> Result<TracerHandle, ProofError> {
        if !self.produce_proofs {
            return Ok(TracerHandle::none());
        }
        match self.proof_format {
            ProofFormat::FratAscii => {
                let path = self.proof_path_with_suffix(".frat");
                Ok(TracerHandle::new(FratTracer::create(&path, false)?))
            }
            ProofFormat::FratBinary => {
                let path = self.proof_path_with_suffix(".bfrat");
                Ok(TracerHandle::new(FratTracer::create(&path, true)?))
            }
            format @ (ProofFormat::AletheStream | ProofFormat::AletheMemory) => {
                Err(ProofError::UnsupportedFormat(format))
            }
        }
    }

    fn proof_path_with_suffix(&self, suffix: &str) -> PathBuf {
        match &self.proof_path {
            Some(path) => path.clone(),
            None => {
                let mut path = self.input_path.clone().into_os_string();
                path.push(suffix);
                PathBuf::from(path)
            }
        }
    }
}
