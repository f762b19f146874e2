//! Missing-weight inference from the equilibrium constraint.

use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::domain::arena::BeamTree;
use crate::domain::entities::{BeamId, Weight};
use crate::domain::error::{DomainError, DomainResult};

/// The weight that inference filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Beam carrying the resolved pan
    pub beam: String,
    pub distance: f64,
    pub mass: f64,
}

/// Outcome of an inference pass.
#[derive(Debug, Clone)]
pub struct Inference {
    pub tree: BeamTree,
    /// `None` when there was nothing to infer
    pub resolution: Option<Resolution>,
}

/// Resolve the single unknown weight reachable from the root.
pub fn infer_missing_weight(tree: &BeamTree) -> DomainResult<Inference> {
    match tree.root() {
        Some(root) => infer_missing_weight_from(tree, root),
        None => Ok(Inference {
            tree: tree.clone(),
            resolution: None,
        }),
    }
}

/// Resolve the single unknown weight reachable from `start`.
///
/// The pan gets the mass that brings its own beam into equilibrium:
/// `| |left| - right | / |distance|`, with the pan itself counting zero.
/// More than one unknown is rejected; none at all leaves the tree as is.
#[instrument(level = "debug", skip(tree))]
pub fn infer_missing_weight_from(tree: &BeamTree, start: BeamId) -> DomainResult<Inference> {
    let unknowns = tree.unknown_weights(start);
    if unknowns.len() > 1 {
        let beams = unknowns
            .iter()
            .filter_map(|u| tree.get_node(u.beam))
            .map(|node| node.name.clone())
            .dedup()
            .collect();
        return Err(DomainError::MultipleUnknownWeights {
            count: unknowns.len(),
            beams,
        });
    }
    let Some(unknown) = unknowns.first() else {
        debug!("no unknown weight to infer");
        return Ok(Inference {
            tree: tree.clone(),
            resolution: None,
        });
    };

    let split = tree.torque_split(unknown.beam);
    let required = (split.left.abs() - split.right).abs();
    let mass = required / unknown.distance.abs();
    let resolved = Weight::known(unknown.distance, mass)?;

    let mut inferred = tree.clone();
    let node = inferred.node_mut(unknown.beam)?;
    node.replace_unknown(resolved);
    let beam = node.name.clone();
    debug!(%beam, distance = unknown.distance, mass, "resolved missing weight");

    let tolerance = required.abs().max(1.0) * 1e-9;
    if !inferred.is_node_balanced(unknown.beam, tolerance) {
        warn!(
            %beam,
            "beam stays unbalanced after inference: the missing pan sits on the heavier side"
        );
    }

    Ok(Inference {
        tree: inferred,
        resolution: Some(Resolution {
            beam,
            distance: unknown.distance,
            mass,
        }),
    })
}
