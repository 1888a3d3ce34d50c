pub use crate::{
    error::Error,
    range::{is_between, is_older_than},
    version::{ParseError, Version},
    workaround::{Action, Applied, Condition, Workaround, Workarounds},
};

pub mod error;
pub mod fs;
pub mod range;
pub mod version;
pub mod workaround;

/// Environment variable consulted for the Jenkins core version when it is not
/// passed on the command line.
pub const JENKINS_CORE_VERSION_ENV: &str = "JENKINS_CORE_VERSION";
