use clap::Parser;

/// Module dependency and activation resolver for tenant configurations.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Root directory holding the catalog and tenant files.
    #[clap(short, long)]
    pub root: Option<String>,
    /// Catalog definition file, relative to the root. Falls back to the
    /// built-in catalog when the file does not exist.
    #[clap(short, long)]
    pub catalog_location: Option<String>,
    /// Tenant module file, relative to the root.
    #[clap(short, long)]
    pub tenant_location: Option<String>,
}

#[derive(Debug, Parser)]
pub enum Command {
    ///Lists every module in the catalog with its dependencies
    Catalog,
    ///Lists the preset bundles
    Bundles,
    ///Validates the tenant's active module set
    Validate,
    ///Enables a module, auto-enabling its dependencies
    Enable { module: String },
    ///Disables a module; prints the cascade and stops unless confirmed
    Disable {
        module: String,
        /// Apply the full cascade without asking
        #[clap(short, long)]
        yes: bool,
    },
    ///Replaces the tenant's active modules with a bundle
    ApplyBundle { bundle: String },
}
