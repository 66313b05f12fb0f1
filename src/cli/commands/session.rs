use crate::api::state::DEFAULT_RESTRICTED_PATTERN;
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_SESSION_TTL: &str = "session-ttl";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_RESTRICTED_PATTERN: &str = "restricted-pattern";
pub const ARG_HIDE_PASSWORD_HASH: &str = "hide-password-hash";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_TTL)
                .long(ARG_SESSION_TTL)
                .help("Idle session lifetime in seconds (0 keeps sessions forever)")
                .env("AUTHGATE_SESSION_TTL")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie as Secure (HTTPS only)")
                .env("AUTHGATE_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_RESTRICTED_PATTERN)
                .long(ARG_RESTRICTED_PATTERN)
                .help("Regex matched against request paths that require a session")
                .env("AUTHGATE_RESTRICTED_PATTERN")
                .default_value(DEFAULT_RESTRICTED_PATTERN),
        )
        .arg(
            Arg::new(ARG_HIDE_PASSWORD_HASH)
                .long(ARG_HIDE_PASSWORD_HASH)
                .help("Omit passwordHash from user responses")
                .env("AUTHGATE_HIDE_PASSWORD_HASH")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug, Clone)]
pub struct Options {
    pub session_ttl_seconds: u64,
    pub cookie_secure: bool,
    pub restricted_pattern: String,
    pub hide_password_hash: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if an argument with a default value is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let session_ttl_seconds = matches
            .get_one::<u64>(ARG_SESSION_TTL)
            .copied()
            .context("missing required argument: --session-ttl")?;
        let restricted_pattern = matches
            .get_one::<String>(ARG_RESTRICTED_PATTERN)
            .cloned()
            .context("missing required argument: --restricted-pattern")?;

        Ok(Self {
            session_ttl_seconds,
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
            restricted_pattern,
            hide_password_hash: matches.get_flag(ARG_HIDE_PASSWORD_HASH),
        })
    }
}
