//! The `kops-state` command line interface.
//!
//! ```text
//! kops-state flatten --kind cluster cluster.yaml > cluster.json
//! kops-state expand --kind cluster cluster.json > cluster.yaml
//! kops-state schema --kind instance-group
//! ```
//!
//! Input is read from standard input when no file is given.
use std::{
    io::Write,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use snafu::{ResultExt, Snafu};
use tracing::Level;

use crate::{
    api::{self, Cluster, InstanceGroup, Manifest},
    expand::{expand_cluster, expand_instance_group},
    flatten::{flatten_cluster, flatten_instance_group},
    logging::{self, LOG_ENV},
    resource::{ResourceSchema, StateError, StateMap},
    schema::{resource_cluster, resource_instance_group},
    yaml,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to initialize logging"))]
    InitLogging { source: logging::Error },

    #[snafu(display("failed to read {}", path.display()))]
    ReadFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to read standard input"))]
    ReadStdin { source: std::io::Error },

    #[snafu(display("failed to parse {kind} manifest"))]
    ParseManifest {
        source: yaml::Error,
        kind: ResourceKind,
    },

    #[snafu(display("invalid {kind} manifest"))]
    InvalidManifest {
        source: api::Error,
        kind: ResourceKind,
    },

    #[snafu(display("failed to parse state as JSON"))]
    ParseState { source: serde_json::Error },

    #[snafu(display("state does not match the {kind} schema"))]
    InvalidState {
        source: StateError,
        kind: ResourceKind,
    },

    #[snafu(display("failed to expand {kind} state"))]
    Expand {
        source: StateError,
        kind: ResourceKind,
    },

    #[snafu(display("failed to serialize manifest"))]
    SerializeManifest { source: yaml::Error },

    #[snafu(display("failed to serialize JSON output"))]
    SerializeJson { source: serde_json::Error },

    #[snafu(display("failed to write output"))]
    WriteOutput { source: std::io::Error },
}

#[derive(Debug, Parser)]
#[command(
    name = "kops-state",
    author,
    version,
    about = "Converts kops manifests to and from resource state"
)]
pub struct Opts {
    /// The log level, used unless KOPS_STATE_LOG contains tracing directives
    #[arg(long, env = "KOPS_STATE_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the state of a kops manifest as JSON
    Flatten(InputArguments),

    /// Validate a state file and print it as kops manifest
    Expand(InputArguments),

    /// Print the resource schema as JSON
    Schema(KindArguments),
}

#[derive(Debug, Args)]
pub struct InputArguments {
    #[command(flatten)]
    pub kind: KindArguments,

    /// The input file, standard input if not given
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct KindArguments {
    /// The kind of resource
    #[arg(long, value_enum)]
    pub kind: ResourceKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Cluster,
    InstanceGroup,
}

impl ResourceKind {
    pub fn resource(self) -> ResourceSchema {
        match self {
            Self::Cluster => resource_cluster(),
            Self::InstanceGroup => resource_instance_group(),
        }
    }
}

impl Opts {
    /// Initializes logging and runs the selected command, writing its output to stdout.
    pub fn run(self) -> Result<(), Error> {
        logging::initialize_logging(LOG_ENV, self.log_level).context(InitLoggingSnafu)?;
        self.command.execute(&mut std::io::stdout().lock())
    }
}

impl Command {
    pub fn execute(&self, out: &mut impl Write) -> Result<(), Error> {
        match self {
            Self::Flatten(InputArguments { kind, file }) => {
                let input = read_input(file.as_deref())?;
                let state = flatten_manifest(kind.kind, &input)?;
                write_json(out, &state)
            }
            Self::Expand(InputArguments { kind, file }) => {
                let input = read_input(file.as_deref())?;
                expand_state(kind.kind, &input, out)
            }
            Self::Schema(KindArguments { kind }) => write_json(out, &kind.resource()),
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<String, Error> {
    match file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading input file");
            std::fs::read_to_string(path).context(ReadFileSnafu { path })
        }
        None => {
            tracing::debug!("reading standard input");
            std::io::read_to_string(std::io::stdin()).context(ReadStdinSnafu)
        }
    }
}

fn write_json(out: &mut impl Write, value: &impl serde::Serialize) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut *out, value).context(SerializeJsonSnafu)?;
    writeln!(out).context(WriteOutputSnafu)
}

/// Reads a kops manifest of the given kind and flattens it into state.
pub fn flatten_manifest(kind: ResourceKind, manifest: &str) -> Result<StateMap, Error> {
    let state = match kind {
        ResourceKind::Cluster => {
            let manifest: Manifest<Cluster> =
                yaml::deserialize(manifest).context(ParseManifestSnafu { kind })?;
            let cluster = manifest
                .into_object()
                .context(InvalidManifestSnafu { kind })?;
            flatten_cluster(&cluster)
        }
        ResourceKind::InstanceGroup => {
            let manifest: Manifest<InstanceGroup> =
                yaml::deserialize(manifest).context(ParseManifestSnafu { kind })?;
            let instance_group = manifest
                .into_object()
                .context(InvalidManifestSnafu { kind })?;
            flatten_instance_group(&instance_group)
        }
    };

    tracing::info!(%kind, attributes = state.len(), "flattened manifest");
    Ok(state)
}

/// Reads JSON state, checks it against the schema of `kind` and writes it to `out` as kops
/// manifest.
pub fn expand_state(kind: ResourceKind, state: &str, out: &mut impl Write) -> Result<(), Error> {
    let state: StateMap = serde_json::from_str(state).context(ParseStateSnafu)?;
    kind.resource()
        .validate(&state)
        .context(InvalidStateSnafu { kind })?;

    let written = match kind {
        ResourceKind::Cluster => {
            let cluster = expand_cluster(&state).context(ExpandSnafu { kind })?;
            yaml::serialize_to_explicit_document(out, &Manifest::new(cluster))
        }
        ResourceKind::InstanceGroup => {
            let instance_group = expand_instance_group(&state).context(ExpandSnafu { kind })?;
            yaml::serialize_to_explicit_document(out, &Manifest::new(instance_group))
        }
    };
    written.context(SerializeManifestSnafu)?;

    tracing::info!(%kind, "expanded state");
    Ok(())
}
