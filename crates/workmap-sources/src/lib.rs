pub mod aggregate;
pub mod fanout;
pub mod github;
pub mod page;
pub mod pivotal;
pub mod source;

pub use aggregate::{build_client, run, run_with_client};
pub use github::{GithubConfig, GithubSource};
pub use pivotal::{PivotalConfig, PivotalSource};
pub use source::Source;
