use std::collections::{HashMap, HashSet};
use std::fmt;

use generational_arena::Arena;
use tracing::instrument;

use crate::domain::entities::{Attachment, BeamId, Side, TorqueSplit, Weight};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::layout::DEFAULT_LAYOUT_SCALE;

/// Beam shape stored in the arena.
///
/// A shape knows what hangs from it but not where it hangs itself; that is
/// the `distance` of the [`Attachment`] it is reached through.
#[derive(Debug, Clone)]
pub struct BeamNode {
    /// Unique name within the tree
    pub name: String,
    /// Weights at negative offsets, in record order
    pub left: Vec<Weight>,
    /// Weights at non-negative offsets, in record order
    pub right: Vec<Weight>,
    /// Child beams in record order
    pub children: Vec<Attachment>,
    /// Offset of the first element recorded on this beam
    pub left_span: f64,
    /// Offset of the last element recorded on this beam
    pub right_span: f64,
    /// Multiplier from logical offsets to drawing offsets
    pub layout_scale: f64,
    elements: usize,
}

impl BeamNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_layout_scale(name, DEFAULT_LAYOUT_SCALE)
    }

    pub fn with_layout_scale(name: impl Into<String>, layout_scale: f64) -> Self {
        Self {
            name: name.into(),
            left: Vec::new(),
            right: Vec::new(),
            children: Vec::new(),
            left_span: 0.0,
            right_span: 0.0,
            layout_scale,
            elements: 0,
        }
    }

    /// Hang a weight on the side given by its sign.
    pub fn add_weight(&mut self, weight: Weight) {
        self.record_span(weight.distance());
        match weight.side() {
            Side::Left => self.left.push(weight),
            Side::Right => self.right.push(weight),
        }
    }

    fn record_span(&mut self, distance: f64) {
        if self.elements == 0 {
            self.left_span = distance;
        }
        self.right_span = distance;
        self.elements += 1;
    }

    /// All weights, left side first.
    pub fn weights(&self) -> impl Iterator<Item = &Weight> {
        self.left.iter().chain(self.right.iter())
    }

    fn weights_mut(&mut self) -> impl Iterator<Item = &mut Weight> {
        self.left.iter_mut().chain(self.right.iter_mut())
    }

    /// Replace the first unresolved weight with `weight`. Returns false if none was found.
    pub(crate) fn replace_unknown(&mut self, weight: Weight) -> bool {
        match self.weights_mut().find(|w| w.mass().is_unknown()) {
            Some(slot) => {
                *slot = weight;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for BeamNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One visit of a beam during traversal.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub id: BeamId,
    pub node: &'a BeamNode,
    /// Offset from the parent's pivot, 0 for the root
    pub distance: f64,
    /// 0 for the root
    pub depth: usize,
}

/// Location of an unresolved weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnknownWeight {
    pub beam: BeamId,
    pub distance: f64,
}

/// Arena-based beam tree.
///
/// Beam shapes are stored once and referenced by [`BeamId`]; parents point at
/// children through [`Attachment`]s. The most recently inserted beam is the
/// root unless [`BeamTree::set_root`] says otherwise.
#[derive(Debug, Clone)]
pub struct BeamTree {
    arena: Arena<BeamNode>,
    root: Option<BeamId>,
    names: HashMap<String, BeamId>,
}

impl Default for BeamTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BeamTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            names: HashMap::new(),
        }
    }

    #[instrument(level = "trace", skip(self, node), fields(name = %node.name))]
    pub fn insert_beam(&mut self, node: BeamNode) -> DomainResult<BeamId> {
        if self.names.contains_key(&node.name) {
            return Err(DomainError::DuplicateBeam(node.name));
        }
        let name = node.name.clone();
        let idx = self.arena.insert(node);
        self.names.insert(name, idx);
        self.root = Some(idx);
        Ok(idx)
    }

    /// Hang `child` from `parent` at `distance`.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, parent: BeamId, child: BeamId, distance: f64) -> DomainResult<()> {
        if !distance.is_finite() {
            return Err(DomainError::InvalidDistance(distance));
        }
        let child_name = self.node(child)?.name.clone();
        let parent_name = self.node(parent)?.name.clone();
        if parent == child || self.subtree_contains(child, parent) {
            return Err(DomainError::CycleDetected {
                parent: parent_name,
                child: child_name,
            });
        }
        let node = self.node_mut(parent)?;
        node.record_span(distance);
        node.children.push(Attachment {
            beam: child,
            distance,
        });
        Ok(())
    }

    pub fn set_root(&mut self, idx: BeamId) -> DomainResult<()> {
        self.node(idx)?;
        self.root = Some(idx);
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn root(&self) -> Option<BeamId> {
        self.root
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: BeamId) -> Option<&BeamNode> {
        self.arena.get(idx)
    }

    pub fn node(&self, idx: BeamId) -> DomainResult<&BeamNode> {
        self.arena
            .get(idx)
            .ok_or_else(|| DomainError::UnknownBeam(format!("{:?}", idx)))
    }

    pub(crate) fn node_mut(&mut self, idx: BeamId) -> DomainResult<&mut BeamNode> {
        self.arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::UnknownBeam(format!("{:?}", idx)))
    }

    pub fn find(&self, name: &str) -> Option<BeamId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order walk from the root. A shape attached twice is visited twice.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, idx: BeamId) -> usize {
        if let Some(node) = self.get_node(idx) {
            1 + node
                .children
                .iter()
                .map(|child| self.calculate_depth(child.beam))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Sum of all weight masses below `idx`, unresolved weights counting 0.
    #[instrument(level = "trace", skip(self))]
    pub fn total_mass(&self, idx: BeamId) -> f64 {
        match self.get_node(idx) {
            Some(node) => {
                let own: f64 = node.weights().map(|w| w.mass().value_or_zero()).sum();
                let hung: f64 = node
                    .children
                    .iter()
                    .map(|child| self.total_mass(child.beam))
                    .sum();
                own + hung
            }
            None => 0.0,
        }
    }

    /// Left and right torque of one beam, each child acting as a point load.
    #[instrument(level = "trace", skip(self))]
    pub fn torque_split(&self, idx: BeamId) -> TorqueSplit {
        let mut split = TorqueSplit::default();
        let Some(node) = self.get_node(idx) else {
            return split;
        };
        split.left = node.left.iter().map(Weight::torque).sum();
        split.right = node.right.iter().map(Weight::torque).sum();
        for child in &node.children {
            let torque = self.total_mass(child.beam) * child.distance;
            match child.side() {
                Side::Left => split.left += torque,
                Side::Right => split.right += torque,
            }
        }
        split
    }

    /// Equilibrium of this beam alone, ignoring what happens inside its children.
    pub fn is_node_balanced(&self, idx: BeamId, tolerance: f64) -> bool {
        self.torque_split(idx).is_balanced(tolerance)
    }

    /// Equilibrium of this beam and, if it holds, of every child beneath it.
    ///
    /// Children are not visited once a beam fails; the first failing child
    /// stops the walk.
    #[instrument(level = "debug", skip(self))]
    pub fn is_balanced(&self, idx: BeamId, tolerance: f64) -> bool {
        let Some(node) = self.get_node(idx) else {
            return false;
        };
        if !self.is_node_balanced(idx, tolerance) {
            return false;
        }
        node.children
            .iter()
            .all(|child| self.is_balanced(child.beam, tolerance))
    }

    /// True iff a direct child of `idx` is called `name`.
    pub fn contains_beam_named(&self, idx: BeamId, name: &str) -> bool {
        self.get_node(idx).is_some_and(|node| {
            node.children
                .iter()
                .filter_map(|child| self.get_node(child.beam))
                .any(|child| child.name == name)
        })
    }

    /// True iff any beam strictly below `idx` is called `name`.
    pub fn contains_beam_named_recursive(&self, idx: BeamId, name: &str) -> bool {
        self.reachable(idx)
            .into_iter()
            .filter(|&id| id != idx)
            .filter_map(|id| self.get_node(id))
            .any(|node| node.name == name)
    }

    fn subtree_contains(&self, idx: BeamId, target: BeamId) -> bool {
        self.reachable(idx).contains(&target)
    }

    /// Distinct beam shapes reachable from `idx` (itself included), in pre-order.
    #[instrument(level = "trace", skip(self))]
    pub fn reachable(&self, idx: BeamId) -> Vec<BeamId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get_node(current) else {
                continue;
            };
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            for child in node.children.iter().rev() {
                stack.push(child.beam);
            }
        }
        order
    }

    /// Names of beams the root cannot reach.
    pub fn unreachable_beams(&self) -> Vec<String> {
        let reachable: HashSet<BeamId> = match self.root {
            Some(root) => self.reachable(root).into_iter().collect(),
            None => HashSet::new(),
        };
        let mut names: Vec<String> = self
            .arena
            .iter()
            .filter(|(idx, _)| !reachable.contains(idx))
            .map(|(_, node)| node.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Unresolved weights on the distinct shapes reachable from `idx`.
    #[instrument(level = "debug", skip(self))]
    pub fn unknown_weights(&self, idx: BeamId) -> Vec<UnknownWeight> {
        self.reachable(idx)
            .into_iter()
            .filter_map(|id| self.get_node(id).map(|node| (id, node)))
            .flat_map(|(id, node)| {
                node.weights()
                    .filter(|w| w.mass().is_unknown())
                    .map(move |w| UnknownWeight {
                        beam: id,
                        distance: w.distance(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

pub struct TreeIterator<'a> {
    tree: &'a BeamTree,
    stack: Vec<(BeamId, f64, usize)>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a BeamTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, 0.0, 0));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = Placement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, distance, depth)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(id) {
                // Push children in reverse order for record-order traversal
                for child in node.children.iter().rev() {
                    self.stack.push((child.beam, child.distance, depth + 1));
                }
                return Some(Placement {
                    id,
                    node,
                    distance,
                    depth,
                });
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a BeamTree,
    stack: Vec<(BeamId, f64, usize, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a BeamTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, 0.0, 0, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = Placement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, distance, depth, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(id) {
                if !visited {
                    self.stack.push((id, distance, depth, true));
                    for child in node.children.iter().rev() {
                        self.stack.push((child.beam, child.distance, depth + 1, false));
                    }
                } else {
                    return Some(Placement {
                        id,
                        node,
                        distance,
                        depth,
                    });
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam(name: &str, weights: &[(f64, f64)]) -> BeamNode {
        let mut node = BeamNode::new(name);
        for &(d, m) in weights {
            node.add_weight(Weight::known(d, m).unwrap());
        }
        node
    }

    #[test]
    fn test_weights_are_sorted_by_side() {
        let node = beam("B", &[(-3.0, 1.0), (2.0, 4.0), (-1.0, 2.0)]);
        assert_eq!(node.left.len(), 2);
        assert_eq!(node.right.len(), 1);
        assert_eq!(node.left_span, -3.0);
        assert_eq!(node.right_span, -1.0);
    }

    #[test]
    fn test_insert_rejects_duplicate_names() {
        let mut tree = BeamTree::new();
        tree.insert_beam(BeamNode::new("B")).unwrap();
        let err = tree.insert_beam(BeamNode::new("B")).unwrap_err();
        assert_eq!(err, DomainError::DuplicateBeam("B".into()));
    }

    #[test]
    fn test_latest_insert_becomes_root() {
        let mut tree = BeamTree::new();
        let c = tree.insert_beam(BeamNode::new("C")).unwrap();
        let b = tree.insert_beam(BeamNode::new("B")).unwrap();
        assert_eq!(tree.root(), Some(b));
        tree.set_root(c).unwrap();
        assert_eq!(tree.root(), Some(c));
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut tree = BeamTree::new();
        let c = tree.insert_beam(BeamNode::new("C")).unwrap();
        let b = tree.insert_beam(BeamNode::new("B")).unwrap();
        tree.attach(b, c, -2.0).unwrap();
        assert!(tree.attach(c, b, 1.0).is_err());
        assert!(tree.attach(b, b, 1.0).is_err());
    }

    #[test]
    fn test_attach_rejects_non_finite_distance() {
        let mut tree = BeamTree::new();
        let c = tree.insert_beam(BeamNode::new("C")).unwrap();
        let b = tree.insert_beam(BeamNode::new("B")).unwrap();
        assert_eq!(
            tree.attach(b, c, f64::INFINITY),
            Err(DomainError::InvalidDistance(f64::INFINITY))
        );
        assert!(tree.attach(b, c, f64::NAN).is_err());
        assert!(tree.node(b).unwrap().children.is_empty());
    }

    #[test]
    fn test_attachment_updates_spans() {
        let mut tree = BeamTree::new();
        let c = tree.insert_beam(BeamNode::new("C")).unwrap();
        let mut b = BeamNode::new("B");
        b.add_weight(Weight::known(-4.0, 1.0).unwrap());
        let b = tree.insert_beam(b).unwrap();
        tree.attach(b, c, 6.0).unwrap();
        let node = tree.node(b).unwrap();
        assert_eq!(node.left_span, -4.0);
        assert_eq!(node.right_span, 6.0);
    }

    #[test]
    fn test_preorder_and_postorder_visit_order() {
        let mut tree = BeamTree::new();
        let c = tree.insert_beam(beam("C", &[(-1.0, 1.0)])).unwrap();
        let d = tree.insert_beam(beam("D", &[(1.0, 1.0)])).unwrap();
        let b = tree.insert_beam(BeamNode::new("B")).unwrap();
        tree.attach(b, c, -2.0).unwrap();
        tree.attach(b, d, 2.0).unwrap();

        let pre: Vec<&str> = tree.iter().map(|p| p.node.name.as_str()).collect();
        let post: Vec<&str> = tree.iter_postorder().map(|p| p.node.name.as_str()).collect();
        assert_eq!(pre, vec!["B", "C", "D"]);
        assert_eq!(post, vec!["C", "D", "B"]);
        assert_eq!(tree.depth(), 2);

        let c_visit = tree.iter().find(|p| p.node.name == "C").unwrap();
        assert_eq!(c_visit.distance, -2.0);
        assert_eq!(c_visit.depth, 1);
    }

    #[test]
    fn test_shared_shape_keeps_both_positions() {
        let mut tree = BeamTree::new();
        let c = tree.insert_beam(beam("C", &[(-1.0, 1.0), (1.0, 1.0)])).unwrap();
        let b = tree.insert_beam(BeamNode::new("B")).unwrap();
        tree.attach(b, c, -3.0).unwrap();
        tree.attach(b, c, 3.0).unwrap();

        let distances: Vec<f64> = tree.iter().skip(1).map(|p| p.distance).collect();
        assert_eq!(distances, vec![-3.0, 3.0]);
        assert_eq!(tree.total_mass(b), 4.0);
        assert!(tree.is_balanced(b, 1e-9));
        assert_eq!(tree.reachable(b).len(), 2);
    }

    #[test]
    fn test_contains_beam_named_direct_and_recursive() {
        let mut tree = BeamTree::new();
        let d = tree.insert_beam(beam("D", &[(1.0, 1.0)])).unwrap();
        let c = tree.insert_beam(BeamNode::new("C")).unwrap();
        tree.attach(c, d, 1.0).unwrap();
        let b = tree.insert_beam(BeamNode::new("B")).unwrap();
        tree.attach(b, c, -1.0).unwrap();

        assert!(tree.contains_beam_named(b, "C"));
        assert!(!tree.contains_beam_named(b, "D"));
        assert!(tree.contains_beam_named_recursive(b, "D"));
        assert!(!tree.contains_beam_named_recursive(b, "B"));
    }

    #[test]
    fn test_unreachable_beams_are_listed() {
        let mut tree = BeamTree::new();
        tree.insert_beam(BeamNode::new("Orphan")).unwrap();
        tree.insert_beam(BeamNode::new("B")).unwrap();
        assert_eq!(tree.unreachable_beams(), vec!["Orphan".to_string()]);
    }
}
