//! Request-to-SQL compilation: filters, ordering and statement assembly.

pub mod assembler;
pub mod filter;
pub mod order;

pub use assembler::{assemble, QueryPlan, SelectedColumn};
pub use filter::{compile_filter, CompiledFilter};
pub use order::compile_order;
