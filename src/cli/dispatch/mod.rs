//! Maps validated CLI arguments to an action.

use crate::cli::{
    actions::{Action, server::Args},
    commands::session,
};
use anyhow::{Context, Result, bail};
use regex::Regex;
use secrecy::SecretString;
use url::Url;

/// # Errors
/// Returns an error if the DSN or the restricted path pattern is invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let dsn = matches
        .get_one::<String>("dsn")
        .map(|dsn| validate_dsn(dsn).map(|()| SecretString::from(dsn.as_str())))
        .transpose()?;

    let opts = session::Options::parse(matches)?;
    Regex::new(&opts.restricted_pattern).context("invalid --restricted-pattern")?;

    Ok(Action::Server(Args {
        port,
        dsn,
        session_ttl_seconds: opts.session_ttl_seconds,
        cookie_secure: opts.cookie_secure,
        restricted_pattern: opts.restricted_pattern,
        hide_password_hash: opts.hide_password_hash,
    }))
}

fn validate_dsn(dsn: &str) -> Result<()> {
    // Url's Display would echo the password, so errors only mention the scheme.
    let url = Url::parse(dsn).context("invalid --dsn")?;
    match url.scheme() {
        "postgres" | "postgresql" => Ok(()),
        scheme => bail!("invalid --dsn: unsupported scheme {scheme:?}"),
    }
}
