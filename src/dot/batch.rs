//! The set of role views a graph export run produces.

use super::render::{to_dot_for_roles, DotOptions, RoleStyles};
use crate::machine::Machine;

/// A rendered graph and the file name it is meant for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DotFile {
    pub file_name: String,
    pub dot: String,
}

/// Render every role view of `machine`.
///
/// The views are the full role list, each shorter prefix of it down to one
/// role, then each role on its own. A view's file name is its roles joined
/// by `_`, then `_`, then `base_name`. Views that come out with the same
/// file name are rendered once.
pub fn batch<E>(
    machine: &Machine<E>,
    roles: &RoleStyles,
    options: &DotOptions,
    base_name: &str,
) -> Vec<DotFile> {
    let prefixes = (1..=roles.len()).rev().map(|len| roles.prefix(len));
    let singles = roles
        .iter()
        .map(|(role, style)| RoleStyles::new().role(role, style.color.as_str()));

    let mut files: Vec<DotFile> = Vec::new();
    for view in prefixes.chain(singles) {
        let file_name = format!("{}_{base_name}", view.names().collect::<Vec<_>>().join("_"));
        if files.iter().any(|file| file.file_name == file_name) {
            continue;
        }
        tracing::trace!(file = %file_name, roles = view.len(), "rendering role view");
        files.push(DotFile {
            dot: to_dot_for_roles(machine, &view, options),
            file_name,
        });
    }

    files
}
