//! Topological ordering of the partial order graph.
//!
//! Both sorts are depth-first post-orders over incoming edges, run with an
//! explicit stack so deep chains cannot exhaust the call stack. The rigorous
//! variant additionally emits every aligned equivalence class as one
//! contiguous run headed by its representative, which is what allows MSA
//! column assignment in a single left-to-right pass.

use super::Graph;
use crate::params::NodeId;
use crate::{Error, Result};
use log::trace;

const UNVISITED: u8 = 0;
const ACTIVE: u8 = 1;
const DONE: u8 = 2;
// Variant node whose ancestors have been expanded but whose emission waits
// for its class representative.
const EXPANDED: u8 = 3;

impl Graph {
    /// Rebuild the cached topological order. A clean cache is left
    /// untouched.
    pub(crate) fn topological_sort(&mut self) -> Result<()> {
        if self.is_sorted {
            return Ok(());
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut marks = vec![UNVISITED; self.nodes.len()];
        for root in 0..self.nodes.len() {
            if marks[root] == UNVISITED {
                self.visit(NodeId(root as u32), &mut marks, &mut order)?;
            }
        }

        debug_assert!(self.order_is_topological(&order));
        trace!("topological sort over {} nodes", order.len());
        self.sorted = order;
        self.is_sorted = true;
        Ok(())
    }

    // Post-order DFS over in-edges. A parent found on the stack means the
    // graph has a cycle.
    fn visit(&self, root: NodeId, marks: &mut [u8], order: &mut Vec<NodeId>) -> Result<()> {
        let mut stack = vec![root];
        'dfs: while let Some(&id) = stack.last() {
            if marks[id.index()] == UNVISITED {
                marks[id.index()] = ACTIVE;
            }

            for &eid in &self.nodes[id.index()].in_edges {
                let parent = self.edges[eid.index()].begin;
                match marks[parent.index()] {
                    UNVISITED => {
                        stack.push(parent);
                        continue 'dfs;
                    }
                    ACTIVE => return Err(Error::NotADag),
                    _ => {}
                }
            }

            stack.pop();
            marks[id.index()] = DONE;
            order.push(id);
        }
        Ok(())
    }

    /// Topological order that places every aligned class contiguously,
    /// representative first. Computed into a fresh buffer; the cached plain
    /// order is not replaced.
    pub(crate) fn rigorous_sort(&self) -> Vec<NodeId> {
        debug_assert!(self.is_sorted);

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut marks = vec![UNVISITED; self.nodes.len()];
        for &root in &self.sorted {
            if marks[root.index()] == UNVISITED {
                self.visit_rigorously(root, &mut marks, &mut order);
            }
        }

        debug_assert!(self.order_is_topological(&order));
        order
    }

    // Like `visit`, but a representative waits for the ancestors of its
    // whole aligned class and then emits the class as one block. A variant
    // reached directly is only expanded; its representative emits it.
    fn visit_rigorously(&self, root: NodeId, marks: &mut [u8], order: &mut Vec<NodeId>) {
        let mut stack = vec![root];
        'dfs: while let Some(&id) = stack.last() {
            let node = &self.nodes[id.index()];
            if marks[id.index()] == UNVISITED {
                marks[id.index()] = ACTIVE;
            }

            for &eid in &node.in_edges {
                let parent = self.edges[eid.index()].begin;
                if marks[parent.index()] == UNVISITED {
                    stack.push(parent);
                    continue 'dfs;
                }
            }

            if node.kind.is_representative() {
                for &aid in &node.aligned {
                    if marks[aid.index()] == UNVISITED {
                        stack.push(aid);
                        continue 'dfs;
                    }
                }
            }

            stack.pop();
            if node.kind.is_representative() {
                marks[id.index()] = DONE;
                order.push(id);
                for &aid in &node.aligned {
                    marks[aid.index()] = DONE;
                    order.push(aid);
                }
            } else if marks[id.index()] == ACTIVE {
                marks[id.index()] = EXPANDED;
            }
        }
    }

    /// Whether the cached order is a valid topological order over all
    /// current nodes.
    pub fn is_topologically_sorted(&self) -> bool {
        self.order_is_topological(&self.sorted)
    }

    pub(crate) fn order_is_topological(&self, order: &[NodeId]) -> bool {
        if order.len() != self.nodes.len() {
            return false;
        }
        let mut seen = vec![false; self.nodes.len()];
        for &id in order {
            for &eid in &self.nodes[id.index()].in_edges {
                if !seen[self.edges[eid.index()].begin.index()] {
                    return false;
                }
            }
            seen[id.index()] = true;
        }
        true
    }
}
