//! Balance-beam puzzle solver.
//!
//! A puzzle is a tree of beams. Each beam carries weights and child beams at
//! signed offsets from its pivot (negative = left). The crate builds the tree
//! from puzzle text, infers the one missing weight, sizes each beam for
//! drawing and checks torque equilibrium everywhere.
//!
//! ```
//! use balance::domain::{infer_missing_weight, TreeBuilder};
//!
//! let tree = TreeBuilder::new().build("B -10 5 5 -1").unwrap();
//! let inference = infer_missing_weight(&tree).unwrap();
//! assert_eq!(inference.resolution.unwrap().mass, 10.0);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
