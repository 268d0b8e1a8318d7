pub mod alias;
pub mod assignments;
pub mod error;
pub mod types;

pub use alias::AliasTable;
pub use assignments::Assignments;
pub use error::{Result, WorkmapError};
pub use types::{BranchFailure, PersonIdentity, RunSummary, WorkItem};
