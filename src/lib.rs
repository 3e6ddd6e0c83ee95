//! Partial order alignment (POA) graph engine.
//!
//! A [`Graph`] represents a set of related sequences as paths through a
//! directed acyclic graph. The first sequence seeds a simple chain; every
//! later sequence is incorporated from an [`Alignment`] produced by an
//! external sequence-to-graph aligner, either reusing existing nodes or
//! forking new ones tied into an aligned equivalence class. From the graph,
//! the engine extracts a multiple sequence alignment view and a
//! heaviest-bundle consensus.
//!
//! ```
//! use poagraph::{Alignment, Graph};
//!
//! let mut graph = Graph::from_sequence(b"ACGT", 1.0)?;
//! let alignment = Alignment::from_indices(&[0, 1, 2, 3], &[0, 1, 2, 3])?;
//! graph.add_alignment(&alignment, b"AGGT", 1.0)?;
//!
//! let msa = graph.generate_msa(false)?;
//! assert_eq!(msa, vec!["ACGT".to_string(), "AGGT".to_string()]);
//! # Ok::<(), poagraph::Error>(())
//! ```

pub mod alignment;
pub mod graph;
pub mod output;
pub mod params;

pub use crate::alignment::Alignment;
pub use crate::graph::{Edge, Graph, Node};
pub use crate::output::dot::{write_dot, DotOptions, RankDir};
pub use crate::params::{EdgeId, NodeId, NodeKind};

use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Zero-length sequences are rejected at construction and mutation.
    #[error("empty sequence")]
    EmptySequence,

    #[error("sequence length {sequence} does not match weight count {weights}")]
    LengthMismatch { sequence: usize, weights: usize },

    #[error("invalid alignment: {0}")]
    InvalidAlignment(Cow<'static, str>),

    /// The topological sort visited a node already on its stack. Construction
    /// rules keep the graph acyclic, so seeing this indicates a bug.
    #[error("graph contains a cycle")]
    NotADag,

    /// Diagnostic from [`Graph::check_msa`]: a gap-stripped row differs from
    /// the input sequence it was extracted from.
    #[error("msa row {row} does not reproduce its input sequence")]
    MsaMismatch { row: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
