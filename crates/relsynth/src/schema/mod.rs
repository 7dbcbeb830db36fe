//! Schema types describing dataset columns and tables.

mod column;
mod table;
mod types;

pub use column::{ColumnMeta, ForeignKey};
pub use table::{DEFAULT_INDEX_COLUMN, TableSchema};
pub use types::{ColumnRole, ColumnType, DeclaredType, VariableType};
