#![deny(missing_docs)]
#![doc = "Core error, value and table types shared by the cast workspace."]

pub mod channels;
pub mod errors;
/// Canonical hashing helpers.
pub mod hash;
/// Canonical JSON and YAML serde helpers.
pub mod serde;
pub mod table;
pub mod value;

pub use channels::ChannelMap;
pub use errors::{io_failure, CastError, ErrorInfo};
pub use hash::stable_hash_string;
pub use table::{Accept, CellMatch, Clause, ColumnLabel, Predicate, Table, TagTable};
pub use value::TagValue;
