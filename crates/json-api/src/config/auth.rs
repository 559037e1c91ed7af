//! Operator Auth Config

use clap::Args;

/// Operator route settings.
#[derive(Debug, Args)]
pub struct OperatorConfig {
    /// Bearer token accepted on operator routes; operator routes are refused when unset
    #[arg(long, env = "OPERATOR_TOKEN", hide_env_values = true)]
    pub operator_token: Option<String>,
}
