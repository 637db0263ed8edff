use clap::Parser;
use kops_state::cli::{Error, Opts};

#[snafu::report]
fn main() -> Result<(), Error> {
    Opts::parse().run()
}
