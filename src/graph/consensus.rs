//! Heaviest-bundle consensus extraction.
//!
//! Over the topological order, every node picks its best incoming edge:
//! highest aggregate weight, ties broken toward the predecessor whose own
//! running score is at least as large. Scores accumulate along the chosen
//! path. When the best-scoring node is not a sink, branch completion
//! disqualifies the sibling predecessors of its successors and recomputes
//! the downstream scores until the traversal ends at a true sink.

use super::Graph;
use crate::params::NodeId;
use crate::Result;
use log::debug;

// Disqualified nodes are excluded as predecessors during recomputation.
const DISQUALIFIED: f32 = -1.0;

impl Graph {
    /// Letters along the heaviest bundle.
    pub fn generate_consensus(&mut self) -> Result<String> {
        self.traverse_heaviest_bundle()?;
        let letters: Vec<u8> = self
            .consensus
            .iter()
            .map(|id| self.nodes[id.index()].letter)
            .collect();
        Ok(String::from_utf8_lossy(&letters).into_owned())
    }

    /// Node ids along the heaviest bundle, source to sink.
    pub fn consensus_path(&mut self) -> Result<&[NodeId]> {
        self.traverse_heaviest_bundle()?;
        Ok(&self.consensus)
    }

    pub(crate) fn traverse_heaviest_bundle(&mut self) -> Result<()> {
        self.topological_sort()?;

        let mut predecessors: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut scores = vec![0.0f32; self.nodes.len()];
        let mut max_id = NodeId(0);

        for &id in &self.sorted {
            self.pick_predecessor(id, &mut scores, &mut predecessors);
            if scores[max_id.index()] < scores[id.index()] {
                max_id = id;
            }
        }

        if !self.nodes[max_id.index()].out_edges.is_empty() {
            let mut rank = vec![0usize; self.nodes.len()];
            for (position, &id) in self.sorted.iter().enumerate() {
                rank[id.index()] = position;
            }
            while !self.nodes[max_id.index()].out_edges.is_empty() {
                debug!("branch completion from node {}", max_id);
                max_id = self.branch_completion(&mut scores, &mut predecessors, rank[max_id.index()]);
            }
        }

        let mut path = Vec::new();
        let mut current = max_id;
        while let Some(previous) = predecessors[current.index()] {
            path.push(current);
            current = previous;
        }
        path.push(current);
        path.reverse();
        self.consensus = path;
        Ok(())
    }

    // Best incoming edge for `id`: update on a strictly heavier edge, or on
    // an equal one whose source outscores the current predecessor.
    fn pick_predecessor(
        &self,
        id: NodeId,
        scores: &mut [f32],
        predecessors: &mut [Option<NodeId>],
    ) {
        for &eid in &self.nodes[id.index()].in_edges {
            let edge = &self.edges[eid.index()];
            let source = edge.begin;
            if scores[source.index()] == DISQUALIFIED {
                continue;
            }

            let better = scores[id.index()] < edge.total_weight
                || (scores[id.index()] == edge.total_weight
                    && predecessors[id.index()]
                        .is_none_or(|p| scores[p.index()] <= scores[source.index()]));
            if better {
                scores[id.index()] = edge.total_weight;
                predecessors[id.index()] = Some(source);
            }
        }

        if let Some(previous) = predecessors[id.index()] {
            scores[id.index()] += scores[previous.index()];
        }
    }

    // Disqualify the sibling predecessors of the successors of the node at
    // `rank`, then rescore everything after it in topological order and
    // return the new downstream maximum.
    fn branch_completion(
        &self,
        scores: &mut [f32],
        predecessors: &mut [Option<NodeId>],
        rank: usize,
    ) -> NodeId {
        let node_id = self.sorted[rank];
        for &eid in &self.nodes[node_id.index()].out_edges {
            let successor = self.edges[eid.index()].end;
            for &in_eid in &self.nodes[successor.index()].in_edges {
                let source = self.edges[in_eid.index()].begin;
                if source != node_id {
                    scores[source.index()] = DISQUALIFIED;
                }
            }
        }

        let mut max_score = 0.0f32;
        let mut max_id = NodeId(0);
        for &id in &self.sorted[rank + 1..] {
            scores[id.index()] = DISQUALIFIED;
            predecessors[id.index()] = None;
            self.pick_predecessor(id, scores, predecessors);

            if max_score < scores[id.index()] {
                max_score = scores[id.index()];
                max_id = id;
            }
        }
        max_id
    }
}
