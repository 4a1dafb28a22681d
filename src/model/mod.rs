use thiserror::Error;

pub mod catalog;
pub mod tenant;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading configuration toml: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Missing TOML key `{0}` while parsing")]
    MissingKey(String),
    #[error("Invalid module id `{0}`, expected a short lowercase code")]
    InvalidModuleId(String),
    #[error("Invalid bundle id `{0}`, expected a short lowercase code")]
    InvalidBundleId(String),
    #[error("Unsupported tenant file version: {0}")]
    UnsupportedTenantFileVersion(toml::Value),
    #[error("Tenant file does not declare a version")]
    MissingTenantFileVersion,
}
