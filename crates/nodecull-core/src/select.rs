//! Victim selection: filter, order by creation time, truncate.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::model::{ProbeResult, SelectionPolicy, Victim, VictimSet};

/// Parse a provider creation timestamp into an absolute, zoned point in time.
///
/// Accepts RFC 3339 (`2021-01-01T00:00:00Z`, `2021-01-01T08:00:00+08:00`) and
/// the minute-precision form `2021-01-01T00:00Z` returned by ECS. Timestamps
/// without zone information are rejected.
///
/// # Errors
///
/// Returns the parse error of the RFC 3339 attempt when no accepted form matches.
pub fn parse_creation_time(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let value = value.trim();
    let rfc3339 = match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => return Ok(parsed),
        Err(err) => err,
    };

    if let Some(naive) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z'))
        && let Ok(parsed) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M")
    {
        return Ok(parsed.and_utc().fixed_offset());
    }

    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z").map_err(|_| rfc3339)
}

/// Select at most `requested` victims from the probe results.
///
/// Failed and ineligible results are discarded first. `OldestFirst` and
/// `NewestFirst` order by parsed creation time with a stable sort;
/// `Unordered` keeps the incoming order.
///
/// # Errors
///
/// Returns [`CoreError::Timestamp`] when ordering is required and any eligible
/// result has an unparseable creation time. No partial set is returned.
pub fn select_victims(
    results: Vec<ProbeResult>,
    requested: usize,
    policy: SelectionPolicy,
) -> CoreResult<VictimSet> {
    let eligible: Vec<Victim> = results
        .into_iter()
        .filter(ProbeResult::is_eligible)
        .filter_map(into_victim)
        .collect();
    let filtered = eligible.len();

    let mut ordered = match policy {
        SelectionPolicy::Unordered => eligible,
        SelectionPolicy::OldestFirst => sort_by_creation(eligible, false)?,
        SelectionPolicy::NewestFirst => sort_by_creation(eligible, true)?,
    };
    ordered.truncate(requested.min(filtered));

    debug!(
        policy = %policy,
        requested,
        eligible = filtered,
        selected = ordered.len(),
        "victims selected"
    );
    Ok(VictimSet::new(ordered))
}

fn into_victim(result: ProbeResult) -> Option<Victim> {
    let creation_time = result.creation_time()?.to_string();
    Some(Victim {
        id: result.instance_id,
        host_name: result.host_name,
        internal_ip: result.internal_ip,
        creation_time,
    })
}

fn sort_by_creation(victims: Vec<Victim>, newest_first: bool) -> CoreResult<Vec<Victim>> {
    let mut keyed = Vec::with_capacity(victims.len());
    for victim in victims {
        let created = parse_creation_time(&victim.creation_time).map_err(|source| {
            CoreError::Timestamp {
                instance_id: victim.id.clone(),
                value: victim.creation_time.clone(),
                source,
            }
        })?;
        keyed.push((created, victim));
    }

    if newest_first {
        keyed.sort_by(|(left, _), (right, _)| right.cmp(left));
    } else {
        keyed.sort_by(|(left, _), (right, _)| left.cmp(right));
    }
    Ok(keyed.into_iter().map(|(_, victim)| victim).collect())
}
