//! MSA column assignment and row extraction.

use super::Graph;
use crate::{Error, Result};

impl Graph {
    /// Produce one row per admitted sequence, in admission order, each as
    /// long as the number of alignment columns; gaps are '-'. When
    /// `include_consensus` is set, the heaviest-bundle consensus is appended
    /// as one more row.
    pub fn generate_msa(&mut self, include_consensus: bool) -> Result<Vec<String>> {
        self.topological_sort()?;
        let rigorous = self.rigorous_sort();

        // One column per aligned class: a representative claims the next
        // column for itself and for the contiguous run of its members.
        let mut columns = vec![0usize; self.nodes.len()];
        let mut column_count = 0;
        let mut i = 0;
        while i < rigorous.len() {
            let id = rigorous[i];
            debug_assert!(self.nodes[id.index()].kind.is_representative());
            let span = 1 + self.nodes[id.index()].aligned.len();
            for &member in &rigorous[i..i + span] {
                columns[member.index()] = column_count;
            }
            column_count += 1;
            i += span;
        }

        let mut rows = Vec::with_capacity(self.num_sequences as usize + usize::from(include_consensus));
        for label in 0..self.num_sequences {
            let mut row = vec![b'-'; column_count];
            for id in self.sequence_path(label) {
                row[columns[id.index()]] = self.nodes[id.index()].letter;
            }
            rows.push(String::from_utf8_lossy(&row).into_owned());
        }

        if include_consensus {
            self.traverse_heaviest_bundle()?;
            let mut row = vec![b'-'; column_count];
            for &id in &self.consensus {
                row[columns[id.index()]] = self.nodes[id.index()].letter;
            }
            rows.push(String::from_utf8_lossy(&row).into_owned());
        }

        Ok(rows)
    }

    /// Diagnostic: the gap-stripped row `msa[i]` must reproduce
    /// `sequences[indices[i]]` exactly.
    pub fn check_msa(msa: &[String], sequences: &[&[u8]], indices: &[usize]) -> Result<()> {
        for (row, (text, &index)) in msa.iter().zip(indices).enumerate() {
            let stripped: Vec<u8> = text.bytes().filter(|&b| b != b'-').collect();
            let matches = sequences
                .get(index)
                .is_some_and(|original| stripped == *original);
            if !matches {
                return Err(Error::MsaMismatch { row });
            }
        }
        Ok(())
    }
}
