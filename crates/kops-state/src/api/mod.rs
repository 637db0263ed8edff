//! The cluster manager's typed API objects.
//!
//! These types read and write kops manifests (`apiVersion: kops.k8s.io/v1alpha2`) with serde, and
//! are converted to and from state with the [`Block`](crate::resource::Block) implementations
//! derived on them.
use serde::{Deserialize, Serialize};
use snafu::{Snafu, ensure};

mod cluster;
mod etcd;
mod hook;
mod instance_group;
mod kubelet;
mod meta;
mod networking;

pub use cluster::*;
pub use etcd::*;
pub use hook::*;
pub use instance_group::*;
pub use kubelet::*;
pub use networking::*;

/// The API version written to (and expected in) every manifest.
pub const API_VERSION: &str = "kops.k8s.io/v1alpha2";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("unsupported apiVersion {found:?}, expected {API_VERSION:?}"))]
    UnsupportedApiVersion { found: String },

    #[snafu(display("unexpected kind {found:?}, expected {expected:?}"))]
    UnexpectedKind {
        found: String,
        expected: &'static str,
    },
}

/// A top level API object that is stored in its own manifest.
pub trait Kind {
    /// The manifest's `kind`, for example `Cluster`.
    const KIND: &'static str;
}

/// A complete manifest: an API object together with its `apiVersion` and `kind`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest<T> {
    pub api_version: String,
    pub kind: String,

    #[serde(flatten)]
    pub object: T,
}

impl<T: Kind> Manifest<T> {
    pub fn new(object: T) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: T::KIND.to_owned(),
            object,
        }
    }

    /// Returns the contained object, after checking that the manifest actually describes a `T`.
    pub fn into_object(self) -> Result<T, Error> {
        ensure!(
            self.api_version == API_VERSION,
            UnsupportedApiVersionSnafu {
                found: self.api_version
            }
        );
        ensure!(
            self.kind == T::KIND,
            UnexpectedKindSnafu {
                found: self.kind,
                expected: T::KIND,
            }
        );
        Ok(self.object)
    }
}
