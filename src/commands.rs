use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::{decode_claims, SportPlusClient, TokenStore};
use crate::models::{Config, Endpoint, User};
use crate::scheduler;

pub const SUCCESS_LINE: &str = "All schedules created successfully!";

/// Sign in every configured user once. The returned tokens are reused for the rest of the run.
pub async fn authenticate_all(api: &SportPlusClient, users: &[User]) -> Result<TokenStore> {
    let mut tokens = TokenStore::default();
    for user in users {
        info!("Signing in as {} ({})", user.login, user.role);
        let token = api.get_token(&user.login, &user.password).await?;
        log_claims(user, &token);
        tokens.insert(&user.login, token);
    }
    debug!("Obtained {} tokens", tokens.len());
    Ok(tokens)
}

fn log_claims(user: &User, token: &str) {
    let Some(claims) = decode_claims(token) else {
        debug!("Token for {} is not a decodable JWT", user.login);
        return;
    };

    let expires = claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0));
    debug!(
        "Token for {}: login {:?}, id {:?}, expires {:?}",
        user.login, claims.login, claims.id, expires
    );

    if let (Some(configured), Some(signed)) = (user.id, claims.id) {
        if configured != signed {
            warn!(
                "{} is configured with id {} but the server signed id {}",
                user.login, configured, signed
            );
        }
    }
}

/// Print global schedules, then the coach's and the client's local schedules.
/// Stops at the first failed read; sections already printed stay printed.
pub async fn run_check<W: Write>(api: &SportPlusClient, cfg: &Config, out: &mut W) -> Result<()> {
    let coach = cfg.coach()?;
    let client = cfg.client()?;

    let tokens = authenticate_all(api, &cfg.users).await?;

    let sections = [
        ("Global Schedules", coach, Endpoint::Global),
        ("Coach Local Schedules", coach, Endpoint::Local),
        ("Client Local Schedules", client, Endpoint::Local),
    ];

    for (i, (title, user, endpoint)) in sections.into_iter().enumerate() {
        info!("Fetching {} schedules as {}", endpoint, user.login);
        let entries = api.get_schedules(tokens.get(&user.login)?, endpoint).await?;

        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}:", title)?;
        for entry in &entries {
            writeln!(out, "{}", entry)?;
        }
    }

    Ok(())
}

/// Generate the synthetic batch and submit it entry by entry.
/// With `dry_run`, print what would be sent instead of posting.
pub async fn run_create<W: Write>(
    api: &SportPlusClient,
    cfg: &Config,
    dry_run: bool,
    now: DateTime<Utc>,
    out: &mut W,
) -> Result<()> {
    let coach = cfg.coach()?;
    let client = cfg.client()?;
    let schedules = scheduler::generate_schedules(cfg, now)?;
    info!("Generated {} schedules", schedules.len());

    let tokens = authenticate_all(api, &cfg.users).await?;

    for (i, entry) in schedules.iter().enumerate() {
        let signer = scheduler::select_signer(entry, coach, client);
        let token = tokens.get(&signer.login)?;

        if dry_run {
            writeln!(
                out,
                "[DRY RUN] Would create {} as {}",
                serde_json::to_string(entry)?,
                signer.login
            )?;
            continue;
        }

        debug!(
            "Creating schedule {}/{} ({:?}, client {}, {} to {}) as {}",
            i + 1,
            schedules.len(),
            entry.kind(),
            entry.client_id(),
            entry.start_time(),
            entry.end_time(),
            signer.login
        );
        api.create_schedule(token, entry).await?;
    }

    if !dry_run {
        writeln!(out, "{}", SUCCESS_LINE)?;
    }
    Ok(())
}
