//! Graphviz export.
//!
//! [`to_dot`] draws the whole table with the keys as declared. Role views
//! ([`to_dot_for_roles`]) draw only what a set of roles may do, merge edges
//! that several roles share, and humanize every name at render time.

mod batch;
mod edges;
mod render;

pub use batch::{batch, DotFile};
pub use edges::{DotEdge, EdgeSet};
pub use render::{role_edges, to_dot, to_dot_for_roles, DotOptions, RoleStyle, RoleStyles};
