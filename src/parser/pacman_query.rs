//! Parser for `pacman -Q` output

use tracing::warn;

use crate::parser::types::Inventory;

/// Parse `name version` lines into an inventory, keeping the line order.
///
/// Blank lines are ignored; a line without a version is skipped.
pub fn parse_query_output(output: &str) -> Inventory {
    let mut inventory = Inventory::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ') {
            Some((name, version)) if !name.is_empty() && !version.trim().is_empty() => {
                inventory.insert(name, version.trim());
            }
            _ => warn!("Ignoring unexpected package query line: {:?}", line),
        }
    }

    inventory
}
