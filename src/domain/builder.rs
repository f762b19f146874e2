//! Puzzle parser: turns beam records into a [`BeamTree`].
//!
//! One record per line: `NAME d1 p1 d2 p2 ...`. Each payload is either a mass
//! (`-1` marks the pan to infer) or the name of a beam defined on an earlier
//! line, hung at that distance. The last record is the root.

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::domain::arena::{BeamNode, BeamTree};
use crate::domain::entities::{BeamId, Mass, Weight};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::layout::DEFAULT_LAYOUT_SCALE;

pub struct TreeBuilder {
    name_regex: Regex,
    default_scale: f64,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

enum Payload<'a> {
    Mass(Mass),
    Beam(&'a str),
}

enum Element {
    Weight(Weight),
    Child(BeamId, f64),
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            name_regex: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap(),
            default_scale: DEFAULT_LAYOUT_SCALE,
        }
    }

    /// Layout scale every parsed beam starts with.
    pub fn with_default_scale(mut self, scale: f64) -> Self {
        self.default_scale = scale;
        self
    }

    #[instrument(level = "debug", skip(self, source))]
    pub fn build(&self, source: &str) -> DomainResult<BeamTree> {
        let mut tree = BeamTree::new();

        for (i, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            self.parse_record(&mut tree, i + 1, trimmed)?;
        }

        if tree.is_empty() {
            return Err(DomainError::EmptyPuzzle);
        }

        let unreachable = tree.unreachable_beams();
        if !unreachable.is_empty() {
            warn!(beams = ?unreachable, "beams not reachable from the root are ignored");
        }
        debug!(beams = tree.len(), depth = tree.depth(), "puzzle built");
        Ok(tree)
    }

    fn parse_record(&self, tree: &mut BeamTree, line: usize, record: &str) -> DomainResult<BeamId> {
        let mut tokens = record.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        if !self.name_regex.is_match(name) {
            return Err(DomainError::InvalidRecord {
                line,
                reason: format!("invalid beam name '{}'", name),
            });
        }

        let pairs: Vec<&str> = tokens.collect();
        if pairs.is_empty() {
            return Err(DomainError::InvalidRecord {
                line,
                reason: format!("beam '{}' has nothing hanging from it", name),
            });
        }
        if pairs.len() % 2 != 0 {
            return Err(DomainError::InvalidRecord {
                line,
                reason: format!("beam '{}' has a distance without a payload", name),
            });
        }

        // Resolve references before inserting, so a beam cannot name itself
        let mut elements = Vec::with_capacity(pairs.len() / 2);
        for pair in pairs.chunks(2) {
            let distance = pair[0]
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .ok_or_else(|| DomainError::InvalidRecord {
                    line,
                    reason: format!("invalid distance '{}'", pair[0]),
                })?;
            let element = match self.parse_payload(line, pair[1])? {
                Payload::Mass(mass) => {
                    let weight = Weight::new(distance, mass).map_err(|e| DomainError::InvalidRecord {
                        line,
                        reason: format!("beam '{}': {}", name, e),
                    })?;
                    Element::Weight(weight)
                }
                Payload::Beam(reference) => {
                    let child = tree.find(reference).ok_or_else(|| DomainError::DanglingReference {
                        line,
                        beam: name.to_string(),
                        reference: reference.to_string(),
                    })?;
                    Element::Child(child, distance)
                }
            };
            elements.push(element);
        }

        let idx = tree.insert_beam(BeamNode::with_layout_scale(name, self.default_scale))?;
        for element in elements {
            match element {
                Element::Weight(weight) => tree.node_mut(idx)?.add_weight(weight),
                Element::Child(child, distance) => tree.attach(idx, child, distance)?,
            }
        }
        debug!(line, beam = name, "record parsed");
        Ok(idx)
    }

    /// Finite numbers are masses; anything else that looks like a name is a
    /// beam reference, so beams may be called `inf` or `nan`.
    fn parse_payload<'a>(&self, line: usize, token: &'a str) -> DomainResult<Payload<'a>> {
        if let Some(value) = token.parse::<f64>().ok().filter(|v| v.is_finite()) {
            let mass = if value == Mass::UNKNOWN_MARKER {
                Mass::Unknown
            } else {
                Mass::Known(value)
            };
            return Ok(Payload::Mass(mass));
        }
        if self.name_regex.is_match(token) {
            return Ok(Payload::Beam(token));
        }
        Err(DomainError::InvalidRecord {
            line,
            reason: format!("payload '{}' is neither a mass nor a beam name", token),
        })
    }
}
