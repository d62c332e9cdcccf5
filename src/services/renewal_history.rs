//! Renewal history accumulator
//!
//! Turns the loose renewal input accepted by the API (one date, or a list of
//! dates and `{date, processed_by}` objects) into history records. The
//! existing history is never rewritten: days already recorded keep their
//! original actor and only unseen days are appended.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::vehicle::RenewalRecord;
use crate::utils::errors::AppResult;
use crate::utils::validation::parse_date_input;

/// Renewal dates as sent by clients
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RenewalDatesInput {
    Many(Vec<RenewalEntryInput>),
    One(RenewalEntryInput),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RenewalEntryInput {
    Date(String),
    /// `{date, processed_by}`: any `processed_by` is dropped unread
    Record { date: String },
}

impl RenewalEntryInput {
    fn date(&self) -> &str {
        match self {
            RenewalEntryInput::Date(date) => date,
            RenewalEntryInput::Record { date, .. } => date,
        }
    }
}

impl RenewalDatesInput {
    fn entries(&self) -> &[RenewalEntryInput] {
        match self {
            RenewalDatesInput::Many(entries) => entries,
            RenewalDatesInput::One(entry) => std::slice::from_ref(entry),
        }
    }
}

fn iso_day(record: &RenewalRecord) -> NaiveDate {
    record.date.date_naive()
}

/// Merge `input` into `existing`.
///
/// New days are attributed to `actor`; `None` records the system actor.
/// A `processed_by` sent by the client is ignored.
pub fn accumulate_renewals(
    existing: &[RenewalRecord],
    input: &RenewalDatesInput,
    actor: Option<Uuid>,
) -> AppResult<Vec<RenewalRecord>> {
    let mut seen: HashSet<NaiveDate> = existing.iter().map(iso_day).collect();
    let mut history = existing.to_vec();

    let mut incoming = input
        .entries()
        .iter()
        .map(|entry| parse_date_input(entry.date()))
        .collect::<AppResult<Vec<_>>>()?;
    incoming.sort();

    for date in incoming {
        if seen.insert(date.date_naive()) {
            history.push(RenewalRecord {
                date,
                processed_by: actor,
            });
        }
    }

    Ok(history)
}

/// History for a vehicle being created
pub fn initial_renewals(input: Option<&RenewalDatesInput>, actor: Option<Uuid>) -> AppResult<Vec<RenewalRecord>> {
    match input {
        Some(input) => accumulate_renewals(&[], input, actor),
        None => Ok(Vec::new()),
    }
}
