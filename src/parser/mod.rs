//! Parser layer
//! - traits.rs: IndexParser trait and ParseError
//! - types.rs: Common types (PackageRecord, PackageIndex, Inventory)
//! - sync_db.rs: pacman sync database (`<repo>.db`) parser
//! - pacman_query.rs: `pacman -Q` output parser

pub mod pacman_query;
pub mod sync_db;
pub mod traits;
pub mod types;

pub use pacman_query::parse_query_output;
pub use sync_db::SyncDbParser;
pub use traits::{IndexParser, ParseError};
pub use types::{Inventory, PackageIndex, PackageRecord};
