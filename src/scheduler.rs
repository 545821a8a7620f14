use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::models::{CalendarEntry, Config, User};

/// Days ahead of `now` at which each user gets local entries.
pub const LOCAL_OFFSETS_DAYS: [i64; 4] = [1, 3, 7, 30];
pub const LOCAL_ENTRIES_PER_OFFSET: usize = 2;

pub const GLOBAL_OFFSET_DAYS: i64 = 7;
pub const GLOBAL_ENTRY_COUNT: usize = 5;

/// Hours added on top of the day offset.
pub const START_HOUR_OFFSET: i64 = 12;

/// Placeholder client id that routes a local entry to the coach's token.
/// No default user has this id, so the coach fallback never fires with the built-in config.
pub const SENTINEL_CLIENT_ID: i64 = 1;

/// Number of entries [`generate_schedules`] produces for `users` configured users.
pub fn expected_count(users: usize) -> usize {
    users * LOCAL_OFFSETS_DAYS.len() * LOCAL_ENTRIES_PER_OFFSET + GLOBAL_ENTRY_COUNT
}

/// Start of an entry placed `days` after `now`.
pub fn slot_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now + Duration::days(days) + Duration::hours(START_HOUR_OFFSET)
}

/// Build the batch of synthetic entries for every configured user plus the
/// coach's global entries. `now` is truncated to whole seconds.
pub fn generate_schedules(config: &Config, now: DateTime<Utc>) -> Result<Vec<CalendarEntry>> {
    let now = now.trunc_subsecs(0);
    let coach_id = user_id(config.coach()?)?;

    let mut schedules = Vec::with_capacity(expected_count(config.users.len()));

    for user in &config.users {
        let id = user_id(user)?;
        for &days in &LOCAL_OFFSETS_DAYS {
            let start = slot_start(now, days);
            for _ in 0..LOCAL_ENTRIES_PER_OFFSET {
                schedules.push(CalendarEntry::local(id, start));
            }
        }
    }

    let start = slot_start(now, GLOBAL_OFFSET_DAYS);
    for _ in 0..GLOBAL_ENTRY_COUNT {
        schedules.push(CalendarEntry::global(coach_id, start));
    }

    Ok(schedules)
}

/// Pick the user whose token submits `entry`.
///
/// Global entries go through the coach. Local entries go through the client,
/// except when `client_id` is [`SENTINEL_CLIENT_ID`].
///
/// The server records the token's user as the entry's coach, so local entries
/// (the coach's own included) are stored with the client as coach.
pub fn select_signer<'a>(entry: &CalendarEntry, coach: &'a User, client: &'a User) -> &'a User {
    if entry.is_global() || entry.client_id() == SENTINEL_CLIENT_ID {
        coach
    } else {
        client
    }
}

fn user_id(user: &User) -> Result<i64> {
    user.id
        .with_context(|| format!("User {} has no id configured", user.login))
}
