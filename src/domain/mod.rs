//! Pure request-to-SQL compilation. Nothing in here touches a database.

pub mod compile;
pub mod diagnostics;
pub mod format;
pub mod model;
pub mod predicate;
pub mod schema;
