//! ## Crate Features
//!
//! This crate has no optional features. The `kops-state` binary is a thin command line front end
//! around the library.
//!
//! ## Overview
//!
//! `kops-state` translates the kops cluster manager's API objects ([`api::Cluster`],
//! [`api::InstanceGroup`] and everything nested in them) to and from the nested-map state of an
//! infrastructure-as-code tool's resource model ([`resource::StateMap`]).
//!
//! - [`schema`] declares the shape of that state for every configuration block.
//! - [`flatten`] converts API objects into state maps.
//! - [`expand`] converts state maps back into API objects.
//!
//! Both directions are driven by [`resource::Block`], which is usually derived. Manifests are
//! read and written with [`yaml`].
extern crate self as kops_state;

pub mod api;
pub mod cli;
pub mod duration;
pub mod expand;
pub mod flatten;
pub mod logging;
pub mod resource;
pub mod schema;
pub mod yaml;

pub use k8s_openapi;
pub use schemars;
