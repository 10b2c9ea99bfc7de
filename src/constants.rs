//! Environment variable names recognized by this crate.

/// Client token for [`EnvCredentialProvider`][crate::EnvCredentialProvider].
pub const AKAMAI_CLIENT_TOKEN: &str = "AKAMAI_CLIENT_TOKEN";
/// Client secret for [`EnvCredentialProvider`][crate::EnvCredentialProvider].
pub const AKAMAI_CLIENT_SECRET: &str = "AKAMAI_CLIENT_SECRET";
/// Access token for [`EnvCredentialProvider`][crate::EnvCredentialProvider].
pub const AKAMAI_ACCESS_TOKEN: &str = "AKAMAI_ACCESS_TOKEN";

/// Overrides the `.edgerc` file path, default `~/.edgerc`.
pub const AKAMAI_EDGERC: &str = "AKAMAI_EDGERC";
/// Overrides the `.edgerc` section, default `default`.
pub const AKAMAI_EDGERC_SECTION: &str = "AKAMAI_EDGERC_SECTION";

// Set by the Akamai CLI for the User-Agent suffix. Diagnostic only.
pub const AKAMAI_CLI: &str = "AKAMAI_CLI";
pub const AKAMAI_CLI_VERSION: &str = "AKAMAI_CLI_VERSION";
pub const AKAMAI_CLI_COMMAND: &str = "AKAMAI_CLI_COMMAND";
pub const AKAMAI_CLI_COMMAND_VERSION: &str = "AKAMAI_CLI_COMMAND_VERSION";
