//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rdis::{DiscoveryConfig, Options, Xlen, parse_address, parse_label};
use tracing::error;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[allow(clippy::struct_excessive_bools)]
#[command(name = "rdis")]
#[command(about = "Recursive disassembler - lists the functions reachable from entry points")]
#[command(version)]
pub struct Cli {
    /// Flat binary to disassemble
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Load address of the binary (hex)
    #[arg(long, value_name = "HEX", value_parser = parse_address)]
    pub base: u64,

    /// Function entry address (hex); defaults to the base address
    #[arg(short, long = "entry", value_name = "HEX", value_parser = parse_address)]
    pub entries: Vec<u64>,

    /// Register width
    #[arg(long, value_enum, default_value = "64")]
    pub xlen: XlenArg,

    /// Reject 16-bit compressed encodings
    #[arg(long)]
    pub no_compressed: bool,

    /// Name a function (HEX=NAME)
    #[arg(short, long = "label", value_name = "HEX=NAME", value_parser = parse_label)]
    pub labels: Vec<(u64, String)>,

    /// Also coalesce each function into basic blocks
    #[arg(long)]
    pub reduce: bool,

    /// Disassemble each wave of functions in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Print every instruction under its function
    #[arg(long)]
    pub listing: bool,

    /// Enable verbose output (sets `RUST_LOG=debug`)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress output (only show warnings and errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub fn options(&self) -> Options {
        let discovery = DiscoveryConfig::new()
            .with_reduce(self.reduce)
            .with_parallel(self.parallel);
        let mut options = Options::new(self.base)
            .with_xlen(self.xlen.into())
            .with_compressed(!self.no_compressed)
            .with_discovery(discovery);
        options.entries.clone_from(&self.entries);
        for (address, name) in &self.labels {
            options.symbols.insert(*address, name.as_str());
        }
        options
    }
}

/// Register width argument.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum XlenArg {
    #[value(name = "32")]
    Rv32,
    #[default]
    #[value(name = "64")]
    Rv64,
}

impl From<XlenArg> for Xlen {
    fn from(arg: XlenArg) -> Self {
        match arg {
            XlenArg::Rv32 => Self::Rv32,
            XlenArg::Rv64 => Self::Rv64,
        }
    }
}

/// Run the analysis and print the function listing.
#[must_use]
pub fn run(cli: &Cli) -> i32 {
    let options = cli.options();
    match rdis::analyze_file(&cli.input, &options) {
        Ok(analysis) => {
            print!("{}", analysis.render(cli.listing));
            EXIT_SUCCESS
        }
        Err(e) => {
            error!(input = %cli.input.display(), error = %e, "analysis failed");
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "rdis", "boot.bin", "--base", "0x80000000", "-e", "80000010", "--xlen", "32",
            "--label", "80000010=main", "--reduce",
        ])
        .unwrap();
        let options = cli.options();
        assert_eq!(options.base, 0x8000_0000);
        assert_eq!(options.entries(), vec![0x8000_0010]);
        assert_eq!(options.xlen, Xlen::Rv32);
        assert!(options.discovery.reduce);
        assert!(!options.discovery.parallel);
        assert_eq!(options.symbols.fetch(0x8000_0010), Some("main"));
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(Cli::try_parse_from(["rdis", "boot.bin", "--base", "zz"]).is_err());
        assert!(Cli::try_parse_from(["rdis", "boot.bin", "--base", "0", "-v", "-q"]).is_err());
    }
}
