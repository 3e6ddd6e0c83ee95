//! GraphViz DOT output for the partial order graph.

use crate::graph::Graph;
use crate::Result;
use std::io::Write;

/// GraphViz rank direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDir {
    LeftToRight,
    TopToBottom,
    RightToLeft,
    BottomToTop,
}

impl RankDir {
    fn as_dot(self) -> &'static str {
        match self {
            RankDir::LeftToRight => "LR",
            RankDir::TopToBottom => "TB",
            RankDir::RightToLeft => "RL",
            RankDir::BottomToTop => "BT",
        }
    }
}

/// Rendering settings for [`write_dot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotOptions {
    pub rankdir: RankDir,
    /// Dotted arrowhead-free links between members of an aligned class.
    pub show_aligned_links: bool,
    /// Decimal places for edge weight labels.
    pub weight_precision: usize,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            rankdir: RankDir::LeftToRight,
            show_aligned_links: true,
            weight_precision: 3,
        }
    }
}

/// Write a DOT view of the graph.
///
/// Nodes are labelled `id|letter` and edges with their aggregate weight.
/// Aligned nodes are tied by dotted undirected links, emitted once in the
/// lower to higher id direction.
pub fn write_dot(graph: &Graph, writer: &mut impl Write, options: &DotOptions) -> Result<()> {
    writeln!(writer, "digraph {} {{", graph.sequence_count())?;
    writeln!(writer, "    graph [rankdir={}]", options.rankdir.as_dot())?;
    for node in graph.nodes() {
        writeln!(
            writer,
            "    {} [label = \"{}|{}\"]",
            node.id(),
            node.id(),
            char::from(node.letter())
        )?;
        for edge in graph.out_edges(node.id()) {
            writeln!(
                writer,
                "    {} -> {} [label = \"{:.*}\"]",
                node.id(),
                edge.end(),
                options.weight_precision,
                edge.total_weight()
            )?;
        }
        if options.show_aligned_links {
            for &aligned in node.aligned() {
                if aligned > node.id() {
                    writeln!(
                        writer,
                        "    {} -> {} [style = dotted, arrowhead = none]",
                        node.id(),
                        aligned
                    )?;
                }
            }
        }
    }
    writeln!(writer, "}}")?;
    Ok(())
}

impl Graph {
    /// DOT dump with default options.
    pub fn dot_string(&self) -> Result<String> {
        let mut out = Vec::new();
        write_dot(self, &mut out, &DotOptions::default())?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Alignment;

    #[test]
    fn seed_graph_dot_layout() {
        let graph = Graph::from_sequence(b"ACG", 1.0).unwrap();
        let dot = graph.dot_string().unwrap();
        assert!(dot.starts_with("digraph 1 {\n    graph [rankdir=LR]\n"));
        assert!(dot.contains("    0 [label = \"0|A\"]\n"));
        assert!(dot.contains("    0 -> 1 [label = \"2.000\"]\n"));
        assert!(dot.contains("    1 -> 2 [label = \"2.000\"]\n"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn aligned_nodes_link_once_lower_to_higher() {
        let mut graph = Graph::from_sequence(b"ACGT", 1.0).unwrap();
        let alignment = Alignment::from_indices(&[0, 1, 2, 3], &[0, 1, 2, 3]).unwrap();
        graph.add_alignment(&alignment, b"AGGT", 1.0).unwrap();

        let dot = graph.dot_string().unwrap();
        assert!(dot.contains("    1 -> 4 [style = dotted, arrowhead = none]\n"));
        assert!(!dot.contains("    4 -> 1 [style = dotted"));
    }

    #[test]
    fn aligned_links_can_be_suppressed() {
        let mut graph = Graph::from_sequence(b"ACGT", 1.0).unwrap();
        let alignment = Alignment::from_indices(&[0, 1, 2, 3], &[0, 1, 2, 3]).unwrap();
        graph.add_alignment(&alignment, b"AGGT", 1.0).unwrap();

        let mut out = Vec::new();
        let options = DotOptions {
            show_aligned_links: false,
            ..DotOptions::default()
        };
        write_dot(&graph, &mut out, &options).unwrap();
        let dot = String::from_utf8(out).unwrap();
        assert!(!dot.contains("dotted"));
    }
}
