// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Spatial Graph
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Undirected spatial multigraph embedded in a 3-D box.
//!
//! Architecture:
//!   - geometry: vector helpers and the box with its boundary condition
//!   - graph: node/edge arena with stable handles and O(1) random picks
//!   - degree_sequence: bounded geometric degree sequences and the
//!     simple graphs realizing them

pub mod degree_sequence;
pub mod geometry;
pub mod graph;

pub use degree_sequence::{
    generate_degree_sequence_geometric_bounded, graph_from_degree_sequence, havel_hakimi,
    is_graphical, shuffle_edges,
};
pub use geometry::{cos_director, euclidean_distance, norm, spoke_cosine, Domain, Point3};
pub use graph::{EdgeId, NodeId, SpatialEdge, SpatialGraph, SpatialNode};
