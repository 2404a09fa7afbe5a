use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nodecfg")]
#[command(version)]
#[command(about = "Reconcile declared node configuration with the management API", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/nodecfg/config.toml)
    #[arg(short, long, global = true, env = "NODECFG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a resource from its state file
    Create(ResourceArgs),

    /// Refresh a state file from the API and show drift
    Read(ResourceArgs),

    /// Push a state file over the existing resource
    Update(ResourceArgs),

    /// Delete a resource (or reset it, for kinds without delete)
    Delete(ResourceArgs),

    /// Adopt an existing resource by identity, e.g. `snmp_abc123`
    Import {
        /// Resource kind
        kind: String,
        /// Identity `<kind>_<node id>`
        id: String,
        /// State file to write
        state: PathBuf,
    },

    /// Create or update every resource in a manifest
    Apply(BatchArgs),

    /// Refresh every resource in a manifest, dropping ones gone remotely
    Refresh(BatchArgs),

    /// Delete every resource in a manifest
    Destroy(BatchArgs),

    /// List resource kinds
    Kinds,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ResourceArgs {
    /// Resource kind (see `nodecfg kinds`)
    pub kind: String,
    /// State file (JSON)
    pub state: PathBuf,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Manifest file (JSON)
    pub manifest: PathBuf,
    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resource_command() {
        let cli = Cli::try_parse_from(["nodecfg", "-vv", "update", "snmp", "snmp.json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Update(args) = cli.command else {
            panic!("expected update");
        };
        assert_eq!(args.kind, "snmp");
        assert_eq!(args.state, PathBuf::from("snmp.json"));
    }

    #[test]
    fn test_parse_apply_jobs() {
        let cli = Cli::try_parse_from(["nodecfg", "apply", "fleet.json", "--jobs", "8"]).unwrap();
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.jobs, 8);
    }

    #[test]
    fn test_parse_import() {
        let cli =
            Cli::try_parse_from(["nodecfg", "import", "cpu_limits", "cpu_limits_abc123", "cpu.json"]).unwrap();
        assert!(matches!(cli.command, Command::Import { ref id, .. } if id == "cpu_limits_abc123"));
    }
}
