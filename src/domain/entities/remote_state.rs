use std::collections::BTreeSet;

use crate::domain::value_objects::{BranchName, PackageVersion};

/// Branches and tags observed on a module's remote when its session was checked out.
///
/// Read once per session and never refreshed; publish decisions are taken against
/// this snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteState {
    branches: BTreeSet<String>,
    tags: BTreeSet<String>,
}

impl RemoteState {
    pub fn new<B, T>(branches: B, tags: T) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            branches: branches.into_iter().map(Into::into).collect(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// State of a remote that has never been pushed to
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_branch(&self, branch: &BranchName) -> bool {
        self.branches.contains(branch.as_str())
    }

    pub fn has_tag(&self, version: &PackageVersion) -> bool {
        self.tags.contains(version.as_str())
    }
}
