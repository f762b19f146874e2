//! Torque diagnostics per beam.
//!
//! The report follows the exact walk of [`BeamTree::is_balanced`]: a beam's
//! children are only listed when the beam itself is in equilibrium, and the
//! walk stops at the first failing beam.

use tracing::instrument;

use crate::domain::{BeamId, BeamTree};

/// Torques measured at one beam.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamTorque {
    pub name: String,
    pub left: f64,
    pub right: f64,
    pub balanced: bool,
}

/// Diagnostics of a full balance check.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReport {
    /// Visited beams, in visit order
    pub entries: Vec<BeamTorque>,
    /// Verdict for the whole tree
    pub balanced: bool,
}

impl BalanceReport {
    #[instrument(level = "debug", skip(tree))]
    pub fn from_tree(tree: &BeamTree, tolerance: f64) -> Self {
        let mut entries = Vec::new();
        let balanced = match tree.root() {
            Some(root) => visit(tree, root, tolerance, &mut entries),
            None => false,
        };
        Self { entries, balanced }
    }

    /// First beam that failed its own check.
    pub fn first_failure(&self) -> Option<&BeamTorque> {
        self.entries.iter().find(|entry| !entry.balanced)
    }
}

fn visit(tree: &BeamTree, idx: BeamId, tolerance: f64, entries: &mut Vec<BeamTorque>) -> bool {
    let Some(node) = tree.get_node(idx) else {
        return false;
    };
    let split = tree.torque_split(idx);
    let balanced = split.is_balanced(tolerance);
    entries.push(BeamTorque {
        name: node.name.clone(),
        left: split.left,
        right: split.right,
        balanced,
    });
    balanced
        && node
            .children
            .iter()
            .all(|child| visit(tree, child.beam, tolerance, entries))
}
