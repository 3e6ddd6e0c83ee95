//! Partial order graph: arena storage, construction, and accessors.
//!
//! The graph owns two arenas, one of nodes and one of edges, and refers to
//! entries by dense integer ids. A node's letter and kind are fixed at
//! creation; its edge lists and aligned set only grow. Between any ordered
//! node pair there is at most one edge; repeated traversals coalesce by
//! summing weight and appending the sequence label.

mod consensus;
mod msa;
mod topology;


use crate::alignment::Alignment;
use crate::params::{self, EdgeId, NodeId, NodeKind};
use crate::{Error, Result};
use log::debug;
use std::collections::BTreeSet;

/// Letter-bearing vertex of the partial order graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    letter: u8,
    kind: NodeKind,
    in_edges: Vec<EdgeId>,
    out_edges: Vec<EdgeId>,
    aligned: Vec<NodeId>,
}

impl Node {
    fn new(id: NodeId, letter: u8, kind: NodeKind) -> Self {
        Self {
            id,
            letter,
            kind,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            aligned: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn letter(&self) -> u8 {
        self.letter
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Ids of the nodes occupying the same alignment column with a different
    /// letter, in insertion order.
    pub fn aligned(&self) -> &[NodeId] {
        &self.aligned
    }

    pub fn in_edges(&self) -> &[EdgeId] {
        &self.in_edges
    }

    pub fn out_edges(&self) -> &[EdgeId] {
        &self.out_edges
    }

    pub fn is_sink(&self) -> bool {
        self.out_edges.is_empty()
    }
}

/// Directed link carrying an aggregate weight and the labels of every
/// sequence that traverses it.
#[derive(Debug, Clone)]
pub struct Edge {
    begin: NodeId,
    end: NodeId,
    labels: Vec<u32>,
    total_weight: f32,
}

impl Edge {
    fn new(begin: NodeId, end: NodeId, label: u32, weight: f32) -> Self {
        Self {
            begin,
            end,
            labels: vec![label],
            total_weight: weight,
        }
    }

    /// Record another traversal of this edge.
    fn add_sequence(&mut self, label: u32, weight: f32) {
        self.labels.push(label);
        self.total_weight += weight;
    }

    pub fn begin(&self) -> NodeId {
        self.begin
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    /// Labels of the sequences traversing this edge, in admission order.
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn total_weight(&self) -> f32 {
        self.total_weight
    }

    pub(crate) fn carries(&self, label: u32) -> bool {
        self.labels.contains(&label)
    }
}

/// Partial order graph over the sequences admitted so far.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    alphabet: BTreeSet<u8>,
    num_sequences: u32,
    start_nodes: Vec<NodeId>,
    sorted: Vec<NodeId>,
    is_sorted: bool,
    consensus: Vec<NodeId>,
}

impl Graph {
    /// Seed a graph with a sequence and one weight replicated per position.
    pub fn from_sequence(sequence: &[u8], weight: f32) -> Result<Self> {
        Self::from_sequence_with_weights(sequence, &params::uniform_weights(sequence.len(), weight))
    }

    /// Seed a graph with per-position weights derived from a PHRED+33
    /// quality string of the same length.
    pub fn from_sequence_with_quality(sequence: &[u8], quality: &[u8]) -> Result<Self> {
        Self::from_sequence_with_weights(sequence, &params::quality_weights(quality))
    }

    /// Seed a graph with explicit per-position weights.
    pub fn from_sequence_with_weights(sequence: &[u8], weights: &[f32]) -> Result<Self> {
        params::check_lengths(sequence, weights)?;

        let mut graph = Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            alphabet: BTreeSet::new(),
            num_sequences: 0,
            start_nodes: Vec::new(),
            sorted: Vec::new(),
            is_sorted: false,
            consensus: Vec::new(),
        };
        graph.alphabet.extend(sequence.iter().copied());
        let start = graph
            .add_chain(sequence, weights, 0, sequence.len())
            .ok_or(Error::EmptySequence)?;
        graph.start_nodes.push(start);
        graph.num_sequences = 1;
        graph.topological_sort()?;
        Ok(graph)
    }

    /// Incorporate a sequence aligned against this graph, with one weight
    /// replicated per position.
    pub fn add_alignment(
        &mut self,
        alignment: &Alignment,
        sequence: &[u8],
        weight: f32,
    ) -> Result<()> {
        self.add_alignment_with_weights(
            alignment,
            sequence,
            &params::uniform_weights(sequence.len(), weight),
        )
    }

    /// Incorporate a sequence with weights from a PHRED+33 quality string.
    pub fn add_alignment_with_quality(
        &mut self,
        alignment: &Alignment,
        sequence: &[u8],
        quality: &[u8],
    ) -> Result<()> {
        self.add_alignment_with_weights(alignment, sequence, &params::quality_weights(quality))
    }

    /// Incorporate a sequence aligned against this graph.
    ///
    /// Aligned entries reuse existing nodes where the letters agree, reuse a
    /// member of the anchor's aligned class on a letter match, or fork a new
    /// variant node tied into the whole class. Unaligned prefix and suffix
    /// positions become fresh chains. Every edge added for this sequence
    /// carries its label and the weight of both endpoints.
    pub fn add_alignment_with_weights(
        &mut self,
        alignment: &Alignment,
        sequence: &[u8],
        weights: &[f32],
    ) -> Result<()> {
        params::check_lengths(sequence, weights)?;
        self.check_alignment(alignment, sequence)?;
        self.alphabet.extend(sequence.iter().copied());

        let valid: Vec<usize> = alignment.seq_ids().iter().flatten().copied().collect();

        // No anchoring to the existing graph: the sequence becomes a
        // disjoint chain.
        let (Some(&first_valid), Some(&last_valid)) = (valid.first(), valid.last()) else {
            let start = self
                .add_chain(sequence, weights, 0, sequence.len())
                .ok_or(Error::EmptySequence)?;
            return self.finish_sequence(start);
        };

        // Head chain over the unaligned prefix; its last node is the first
        // attachment point for the body.
        let nodes_before = self.nodes.len();
        let mut start_node = self.add_chain(sequence, weights, 0, first_valid);
        let mut head = (self.nodes.len() > nodes_before)
            .then(|| NodeId((self.nodes.len() - 1) as u32));

        // Tail chain over the unaligned suffix, linked up after the body.
        let tail = self.add_chain(sequence, weights, last_valid + 1, sequence.len());

        let mut prev_weight = match head {
            Some(_) => weights[first_valid - 1],
            None => 0.0,
        };

        for (node_id, seq_id) in alignment
            .node_ids()
            .iter()
            .zip(alignment.seq_ids())
            .filter_map(|(node_id, seq_id)| seq_id.map(|s| (*node_id, s)))
        {
            let letter = sequence[seq_id];
            let new_node = match node_id {
                None => self.add_node(letter, NodeKind::Representative),
                Some(anchor) => self.resolve_aligned(anchor, letter),
            };

            if start_node.is_none() {
                start_node = Some(new_node);
            }
            if let Some(from) = head {
                self.add_edge(from, new_node, prev_weight + weights[seq_id]);
            }
            head = Some(new_node);
            prev_weight = weights[seq_id];
        }

        if let (Some(from), Some(tail)) = (head, tail) {
            self.add_edge(from, tail, prev_weight + weights[last_valid + 1]);
        }

        let start = start_node.ok_or_else(|| {
            Error::InvalidAlignment("alignment consumed no sequence positions".into())
        })?;
        self.finish_sequence(start)
    }

    /// Append `sequence[begin..end]` as a fresh simple chain. Returns the id
    /// of the first node, or `None` when the range is empty.
    fn add_chain(
        &mut self,
        sequence: &[u8],
        weights: &[f32],
        begin: usize,
        end: usize,
    ) -> Option<NodeId> {
        if begin == end {
            return None;
        }
        let first = self.add_node(sequence[begin], NodeKind::Representative);
        let mut prev = first;
        for i in begin + 1..end {
            let node = self.add_node(sequence[i], NodeKind::Representative);
            self.add_edge(prev, node, weights[i - 1] + weights[i]);
            prev = node;
        }
        Some(first)
    }

    fn add_node(&mut self, letter: u8, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, letter, kind));
        id
    }

    /// Add one traversal of `begin -> end` for the sequence currently being
    /// admitted, coalescing with an existing edge between the same
    /// endpoints.
    fn add_edge(&mut self, begin: NodeId, end: NodeId, weight: f32) {
        let label = self.num_sequences;
        let existing = self.nodes[begin.index()]
            .out_edges
            .iter()
            .copied()
            .find(|eid| self.edges[eid.index()].end == end);
        if let Some(eid) = existing {
            self.edges[eid.index()].add_sequence(label, weight);
            return;
        }

        let eid = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge::new(begin, end, label, weight));
        self.nodes[begin.index()].out_edges.push(eid);
        self.nodes[end.index()].in_edges.push(eid);
    }

    /// Resolve the node receiving `letter` at the column anchored by
    /// `anchor`: the anchor itself or an aligned member on a letter match,
    /// otherwise a fresh variant node linked bidirectionally into every
    /// current member of the class.
    fn resolve_aligned(&mut self, anchor: NodeId, letter: u8) -> NodeId {
        if self.nodes[anchor.index()].letter == letter {
            return anchor;
        }

        let matching = self.nodes[anchor.index()]
            .aligned
            .iter()
            .copied()
            .find(|aid| self.nodes[aid.index()].letter == letter);
        if let Some(aid) = matching {
            return aid;
        }

        let class_members = self.nodes[anchor.index()].aligned.clone();
        let new_node = self.add_node(letter, NodeKind::Variant);
        for member in class_members {
            self.nodes[new_node.index()].aligned.push(member);
            self.nodes[member.index()].aligned.push(new_node);
        }
        self.nodes[new_node.index()].aligned.push(anchor);
        self.nodes[anchor.index()].aligned.push(new_node);
        new_node
    }

    /// Node ids must reference nodes extant before this call and sequence
    /// indices must stay within the new sequence.
    fn check_alignment(&self, alignment: &Alignment, sequence: &[u8]) -> Result<()> {
        for id in alignment.node_ids().iter().flatten() {
            if id.index() >= self.nodes.len() {
                return Err(Error::InvalidAlignment(
                    "node id does not reference an existing node".into(),
                ));
            }
        }
        for index in alignment.seq_ids().iter().flatten() {
            if *index >= sequence.len() {
                return Err(Error::InvalidAlignment(
                    "sequence index out of bounds".into(),
                ));
            }
        }
        Ok(())
    }

    fn finish_sequence(&mut self, start: NodeId) -> Result<()> {
        self.num_sequences += 1;
        self.start_nodes.push(start);
        self.is_sorted = false;
        self.topological_sort()?;
        debug!(
            "sequence {} admitted: {} nodes, {} edges",
            self.num_sequences - 1,
            self.nodes.len(),
            self.edges.len()
        );
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of sequences admitted so far.
    pub fn sequence_count(&self) -> u32 {
        self.num_sequences
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Outgoing edges of a node; empty for an unknown id.
    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.nodes
            .get(id.index())
            .map(|node| node.out_edges.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|eid| &self.edges[eid.index()])
    }

    /// Incoming edges of a node; empty for an unknown id.
    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.nodes
            .get(id.index())
            .map(|node| node.in_edges.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|eid| &self.edges[eid.index()])
    }

    /// Letters observed across all admitted sequences, ordered.
    pub fn alphabet(&self) -> impl Iterator<Item = u8> + '_ {
        self.alphabet.iter().copied()
    }

    /// Start node of an admitted sequence.
    pub fn start_node(&self, label: u32) -> Option<NodeId> {
        self.start_nodes.get(label as usize).copied()
    }

    /// Node path traversed by an admitted sequence, found by following the
    /// unique out-edge carrying its label from the sequence start.
    pub fn sequence_path(&self, label: u32) -> Vec<NodeId> {
        let Some(start) = self.start_node(label) else {
            return Vec::new();
        };
        let mut path = vec![start];
        let mut current = start;
        while let Some(next) = self
            .out_edges(current)
            .find(|edge| edge.carries(label))
            .map(Edge::end)
        {
            path.push(next);
            current = next;
        }
        path
    }

    /// Cached topological order; valid for all current nodes after every
    /// mutation.
    pub fn topological_order(&self) -> &[NodeId] {
        debug_assert!(self.is_sorted);
        &self.sorted
    }
}
