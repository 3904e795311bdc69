pub mod branch_name;
pub mod module_id;
pub mod package_version;
pub mod remote_url;

pub use branch_name::{BranchName, BranchNameError};
pub use module_id::{ModuleId, ModuleIdError};
pub use package_version::PackageVersion;
pub use remote_url::{RemoteUrl, RemoteUrlError};
