//! Text rendering of a sized beam tree.
//!
//! Offsets are shown both logically (`d`) and scaled by the parent's layout
//! scale (`x`), which is where a drawing would place the element.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{BeamId, BeamTree, Weight};

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeRender for BeamTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let Some(root) = self.root() else {
            return Tree::new("Empty tree".to_string());
        };
        let Some(node) = self.get_node(root) else {
            return Tree::new("Empty tree".to_string());
        };
        let mut tree = Tree::new(format!("{} (scale {})", node.name, num(node.layout_scale)));
        build_tree(self, root, &mut tree);
        tree
    }
}

fn build_tree(beams: &BeamTree, idx: BeamId, parent_tree: &mut Tree<String>) {
    let Some(node) = beams.get_node(idx) else {
        return;
    };
    let scale = node.layout_scale;
    for weight in node.weights() {
        parent_tree.push(Tree::new(weight_label(weight, scale)));
    }
    for child in &node.children {
        if let Some(shape) = beams.get_node(child.beam) {
            let mut child_tree = Tree::new(format!(
                "{} @ d={} (x={}, scale {})",
                shape.name,
                num(child.distance),
                num(child.distance * scale),
                num(shape.layout_scale)
            ));
            build_tree(beams, child.beam, &mut child_tree);
            parent_tree.push(child_tree);
        }
    }
}

fn weight_label(weight: &Weight, scale: f64) -> String {
    format!(
        "w={} @ d={} (x={})",
        weight.mass(),
        num(weight.distance()),
        num(weight.distance() * scale)
    )
}

/// Whole numbers without a fractional part, others to two decimals.
fn num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TreeBuilder;

    #[test]
    fn test_render_lists_weights_then_children() {
        let tree = TreeBuilder::new().build("C -1 2 1 2\nB -2 C 4 2\n").unwrap();
        let rendered = tree.to_tree_string().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "B (scale 20)");
        assert!(lines[1].ends_with("w=2 @ d=4 (x=80)"));
        assert!(lines[2].ends_with("C @ d=-2 (x=-40, scale 20)"));
        assert!(lines[3].ends_with("w=2 @ d=-1 (x=-20)"));
    }

    #[test]
    fn test_render_empty_tree() {
        assert_eq!(BeamTree::new().to_tree_string().to_string().trim(), "Empty tree");
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(20.0), "20");
        assert_eq!(num(2.5), "2.50");
        assert_eq!(num(-40.0), "-40");
    }
}
