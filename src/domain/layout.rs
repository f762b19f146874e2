//! Layout sizing: picks a drawing scale per beam so hung elements do not overlap.
//!
//! Each beam is sized from the spans of its direct children. The children's
//! spans are weighted against each other around a fixed center clearance; the
//! result only ever raises a beam's scale.

use tracing::{debug, instrument};

use crate::domain::arena::BeamTree;
use crate::domain::entities::{BeamId, Side};

/// Scale a beam starts with before any sizing pass.
pub const DEFAULT_LAYOUT_SCALE: f64 = 20.0;

/// Base unit the packing requirement is computed in.
pub const PROVISIONAL_SCALE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub provisional_scale: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            provisional_scale: PROVISIONAL_SCALE,
        }
    }
}

impl LayoutParams {
    /// Clearance kept free around the pivot.
    pub fn center_clearance(&self) -> f64 {
        self.provisional_scale * 2.0
    }
}

/// Packing requirement of one beam, or `None` when the spans cancel out.
#[instrument(level = "trace", skip(tree))]
pub fn required_scale(tree: &BeamTree, idx: BeamId, params: LayoutParams) -> Option<f64> {
    let node = tree.get_node(idx)?;
    let unit = params.provisional_scale;

    // Weighting factors; the spans of the last child on each side win.
    let mut ls = node.right_span * unit;
    let mut llr = ls;
    let mut lls = node.left_span * unit;
    let mut lr = lls;

    let (mut left_left, mut left_right) = (0.0, 0.0);
    let (mut right_left, mut right_right) = (0.0, 0.0);

    for child in &node.children {
        let Some(shape) = tree.get_node(child.beam) else {
            continue;
        };
        let (l, r) = (shape.left_span.abs(), shape.right_span.abs());
        match child.side() {
            Side::Left => {
                left_right += r * unit;
                left_left += l * unit;
                ls = r;
                lls = l;
            }
            Side::Right => {
                right_left += l * unit;
                right_right += r * unit;
                lr = l;
                llr = r;
            }
        }
    }

    let denominator = ls + lr + llr + lls;
    if denominator == 0.0 {
        return None;
    }
    let numerator = left_right * ls
        + right_left * lr
        + right_right * llr
        + left_left * lls
        + params.center_clearance();
    let required = numerator / denominator;
    required.is_finite().then_some(required)
}

/// Size every beam reachable from the root.
///
/// Returns a new tree; scales are raised to the packing requirement and never
/// lowered, so running the pass again on its output changes nothing.
#[instrument(level = "debug", skip(tree))]
pub fn compute_layout_scales(tree: &BeamTree, params: LayoutParams) -> BeamTree {
    let mut sized = tree.clone();
    let Some(root) = tree.root() else {
        return sized;
    };
    for idx in tree.reachable(root) {
        let Some(required) = required_scale(tree, idx, params) else {
            continue;
        };
        if let Ok(node) = sized.node_mut(idx) {
            if required > node.layout_scale {
                debug!(beam = %node.name, from = node.layout_scale, to = required, "raising layout scale");
                node.layout_scale = required;
            }
        }
    }
    sized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::BeamNode;
    use crate::domain::entities::Weight;

    fn spanned(name: &str, left: f64, right: f64) -> BeamNode {
        let mut node = BeamNode::new(name);
        node.add_weight(Weight::known(left, 1.0).unwrap());
        node.add_weight(Weight::known(right, 1.0).unwrap());
        node
    }

    #[test]
    fn test_childless_beam_keeps_default_scale() {
        let mut tree = BeamTree::new();
        let b = tree.insert_beam(spanned("B", -3.0, 5.0)).unwrap();
        // (80) / (200 - 120 + 200 - 120) = 0.5
        assert_eq!(required_scale(&tree, b, LayoutParams::default()), Some(0.5));
        let sized = compute_layout_scales(&tree, LayoutParams::default());
        assert_eq!(sized.node(b).unwrap().layout_scale, DEFAULT_LAYOUT_SCALE);
    }

    #[test]
    fn test_symmetric_spans_give_no_requirement() {
        let mut tree = BeamTree::new();
        let b = tree.insert_beam(spanned("B", -10.0, 10.0)).unwrap();
        assert_eq!(required_scale(&tree, b, LayoutParams::default()), None);
        let sized = compute_layout_scales(&tree, LayoutParams::default());
        assert_eq!(sized.node(b).unwrap().layout_scale, DEFAULT_LAYOUT_SCALE);
    }

    #[test]
    fn test_children_on_both_sides_raise_scale() {
        let mut tree = BeamTree::new();
        let b1 = tree.insert_beam(spanned("B1", -1.0, 1.0)).unwrap();
        let b2 = tree.insert_beam(spanned("B2", -1.0, 1.0)).unwrap();
        let b = tree.insert_beam(BeamNode::new("B")).unwrap();
        tree.attach(b, b1, -2.0).unwrap();
        tree.attach(b, b2, 3.0).unwrap();

        // (40 + 40 + 40 + 40 + 80) / 4
        assert_eq!(required_scale(&tree, b, LayoutParams::default()), Some(60.0));
        let sized = compute_layout_scales(&tree, LayoutParams::default());
        assert_eq!(sized.node(b).unwrap().layout_scale, 60.0);
        assert_eq!(sized.node(b1).unwrap().layout_scale, DEFAULT_LAYOUT_SCALE);
    }

    #[test]
    fn test_pass_does_not_touch_input_tree() {
        let mut tree = BeamTree::new();
        let b1 = tree.insert_beam(spanned("B1", -1.0, 1.0)).unwrap();
        let b2 = tree.insert_beam(spanned("B2", -1.0, 1.0)).unwrap();
        let b = tree.insert_beam(BeamNode::new("B")).unwrap();
        tree.attach(b, b1, -2.0).unwrap();
        tree.attach(b, b2, 3.0).unwrap();

        let _ = compute_layout_scales(&tree, LayoutParams::default());
        assert_eq!(tree.node(b).unwrap().layout_scale, DEFAULT_LAYOUT_SCALE);
    }
}
