use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Local,
  NaiveDate,
  NaiveDateTime
};
use tracing::debug;

pub const DUE_DATE_FORMAT: &str =
  "%Y-%m-%d";
pub const CREATED_AT_FORMAT: &str =
  "%Y-%m-%dT%H:%M:%S%.6f";

#[must_use]
pub fn local_today() -> NaiveDate {
  Local::now().date_naive()
}

#[must_use]
pub fn local_now() -> NaiveDateTime {
  Local::now().naive_local()
}

#[must_use]
pub fn format_due_date(
  date: NaiveDate
) -> String {
  date
    .format(DUE_DATE_FORMAT)
    .to_string()
}

#[must_use]
pub fn format_created_at(
  ts: NaiveDateTime
) -> String {
  ts.format(CREATED_AT_FORMAT)
    .to_string()
}

/// Reads a stored due date. Anything
/// that is not a calendar date (or a
/// date-time starting with one) comes
/// back as `None`.
#[must_use]
pub fn parse_due_date(
  raw: &str
) -> Option<NaiveDate> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      trimmed,
      DUE_DATE_FORMAT
    )
  {
    return Some(date);
  }

  let parsed = trimmed
    .get(..10)
    .filter(|_| {
      matches!(
        trimmed.as_bytes().get(10),
        Some(b'T') | Some(b' ')
      )
    })
    .and_then(|head| {
      NaiveDate::parse_from_str(
        head,
        DUE_DATE_FORMAT
      )
      .ok()
    });

  if parsed.is_none() {
    debug!(raw = %trimmed, "unparseable due date coerced to none");
  }
  parsed
}

/// Strict variant for user input: an
/// empty field means "no due date", a
/// malformed one is an error.
pub fn parse_due_input(
  raw: &str
) -> anyhow::Result<Option<NaiveDate>>
{
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  NaiveDate::parse_from_str(
    trimmed,
    DUE_DATE_FORMAT
  )
  .map(Some)
  .map_err(|err| {
    anyhow!(
      "invalid due date '{trimmed}': \
       {err}"
    )
  })
}

pub fn parse_created_at(
  raw: &str
) -> anyhow::Result<NaiveDateTime> {
  let trimmed = raw.trim();
  NaiveDateTime::parse_from_str(
    trimmed,
    "%Y-%m-%dT%H:%M:%S%.f"
  )
  .or_else(|_| {
    NaiveDateTime::parse_from_str(
      trimmed,
      "%Y-%m-%d %H:%M:%S%.f"
    )
  })
  .with_context(|| {
    format!(
      "invalid created_at timestamp: \
       {trimmed}"
    )
  })
}

#[must_use]
pub fn relative_due_label(
  due: NaiveDate,
  today: NaiveDate
) -> String {
  let days = (due - today).num_days();
  match days {
    | 0 => "due today".to_string(),
    | 1 => "due tomorrow".to_string(),
    | -1 => "1 day overdue".to_string(),
    | d if d < 0 => {
      format!("{} days overdue", -d)
    }
    | d => format!("in {d} days")
  }
}
