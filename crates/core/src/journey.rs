//! Multi-leg journey arithmetic.
//!
//! Each leg is entered as local departure and arrival wall-clock times at
//! its origin and destination airports. Times are converted to UTC through
//! the airports' IANA zones (DST aware) before any subtraction, so a leg
//! that crosses the date line or a DST switch still yields its true length.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default layover suggested between an arrival and the next departure.
pub const SUGGESTED_LAYOVER_HOURS: i64 = 2;

/// Display format for local times, e.g. `Mon, 06 May 2024 • 09:00 +08`.
const LOCAL_DISPLAY_FORMAT: &str = "%a, %d %b %Y • %H:%M %Z";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One flight leg as entered by the user.
///
/// Missing keys read as empty strings so an incomplete leg is reported in
/// the summary's `errors` instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LegInput {
    pub origin: String,
    pub destination: String,
    /// `YYYY-MM-DD`
    pub depart_date: String,
    /// `HH:MM`
    pub depart_time: String,
    pub arrive_date: String,
    pub arrive_time: String,
}

/// Body of a journey computation request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JourneyRequest {
    #[validate(length(min = 1, max = 20, message = "Provide between 1 and 20 legs"))]
    pub legs: Vec<LegInput>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A local date and time pair, in the same shape as the input fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalSlot {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegSummary {
    /// 1-based position in the journey.
    pub leg: usize,
    pub origin: String,
    pub destination: String,
    pub origin_tz: String,
    pub destination_tz: String,
    /// `false` when the airport could not be resolved and UTC was assumed.
    pub origin_tz_resolved: bool,
    pub destination_tz_resolved: bool,
    pub depart_local: String,
    pub arrive_local: String,
    pub depart_utc: DateTime<Utc>,
    pub arrive_utc: DateTime<Utc>,
    pub duration_minutes: i64,
    pub duration: String,
    /// Arrival plus the default layover, in the arrival zone. Only present
    /// when another leg follows.
    pub next_departure_suggestion: Option<LocalSlot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitSummary {
    pub from_leg: usize,
    pub to_leg: usize,
    pub minutes: i64,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneySummary {
    pub legs: Vec<LegSummary>,
    pub transits: Vec<TransitSummary>,
    pub total_flight_minutes: i64,
    pub total_transit_minutes: i64,
    pub total_journey_minutes: i64,
    pub total_flight: String,
    pub total_transit: String,
    pub total_journey: String,
    /// Legs that could not be computed. They are left out of every total.
    pub errors: Vec<String>,
    /// Computed but suspicious results (negative durations, unknown airports).
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Format minutes as `"{h}h {m}m"`; negative spans get a leading `-`.
pub fn format_hm(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let abs = minutes.unsigned_abs();
    format!("{sign}{}h {}m", abs / 60, abs % 60)
}

fn parse_local(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = time.trim();
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()?;
    Some(date.and_time(time))
}

/// Pin a wall-clock time to an instant in `tz`.
///
/// Ambiguous times (DST fall-back overlap) take the earlier offset. Times
/// that do not exist (spring-forward gap) are read with the offset in force
/// before the gap, which moves them forward by the gap's actual length.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            // A day earlier is safely before the transition.
            let before = tz.offset_from_utc_datetime(&(local - Duration::days(1))).fix();
            let shift = Duration::seconds(i64::from(before.local_minus_utc()));
            let utc = local.checked_sub_signed(shift)?;
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}

fn format_local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(LOCAL_DISPLAY_FORMAT).to_string()
}

/// Arrival plus the default layover, expressed in the arrival zone.
pub fn suggest_next_departure(arrive_utc: DateTime<Utc>, tz: Tz) -> LocalSlot {
    let next = (arrive_utc + Duration::hours(SUGGESTED_LAYOVER_HOURS)).with_timezone(&tz);
    LocalSlot {
        date: next.format("%Y-%m-%d").to_string(),
        time: next.format("%H:%M").to_string(),
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute per-leg, transit and total durations.
///
/// `resolve` maps an upper-cased IATA code to its zone. Unresolved airports
/// fall back to UTC and produce a warning rather than an error.
pub fn compute_journey<F>(legs: &[LegInput], resolve: F) -> JourneySummary
where
    F: Fn(&str) -> Option<Tz>,
{
    let mut summaries: Vec<LegSummary> = Vec::with_capacity(legs.len());
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (idx, leg) in legs.iter().enumerate() {
        let number = idx + 1;
        let origin = leg.origin.trim().to_ascii_uppercase();
        let destination = leg.destination.trim().to_ascii_uppercase();

        let origin_tz = resolve(&origin);
        let destination_tz = resolve(&destination);
        for (code, tz) in [(&origin, origin_tz), (&destination, destination_tz)] {
            if tz.is_none() {
                warnings.push(format!("Leg {number}: unknown airport '{code}', assuming UTC"));
            }
        }
        let otz = origin_tz.unwrap_or(Tz::UTC);
        let dtz = destination_tz.unwrap_or(Tz::UTC);

        let Some(depart_utc) =
            parse_local(&leg.depart_date, &leg.depart_time).and_then(|l| local_to_utc(otz, l))
        else {
            errors.push(format!("Invalid departure date/time for {origin}"));
            continue;
        };
        let Some(arrive_utc) =
            parse_local(&leg.arrive_date, &leg.arrive_time).and_then(|l| local_to_utc(dtz, l))
        else {
            errors.push(format!("Invalid arrival date/time for {destination}"));
            continue;
        };

        let duration_minutes = (arrive_utc - depart_utc).num_minutes();
        if duration_minutes < 0 {
            warnings.push(format!("Leg {number}: arrival is before departure"));
        }

        summaries.push(LegSummary {
            leg: number,
            origin,
            destination,
            origin_tz: otz.name().to_string(),
            destination_tz: dtz.name().to_string(),
            origin_tz_resolved: origin_tz.is_some(),
            destination_tz_resolved: destination_tz.is_some(),
            depart_local: format_local(depart_utc, otz),
            arrive_local: format_local(arrive_utc, dtz),
            depart_utc,
            arrive_utc,
            duration_minutes,
            duration: format_hm(duration_minutes),
            next_departure_suggestion: (number < legs.len())
                .then(|| suggest_next_departure(arrive_utc, dtz)),
        });
    }

    let transits: Vec<TransitSummary> = summaries
        .windows(2)
        .map(|pair| {
            let minutes = (pair[1].depart_utc - pair[0].arrive_utc).num_minutes();
            TransitSummary {
                from_leg: pair[0].leg,
                to_leg: pair[1].leg,
                minutes,
                duration: format_hm(minutes),
            }
        })
        .collect();

    let total_flight_minutes: i64 = summaries.iter().map(|l| l.duration_minutes).sum();
    let total_transit_minutes: i64 = transits.iter().map(|t| t.minutes).sum();
    let total_journey_minutes = total_flight_minutes + total_transit_minutes;

    JourneySummary {
        legs: summaries,
        transits,
        total_flight_minutes,
        total_transit_minutes,
        total_journey_minutes,
        total_flight: format_hm(total_flight_minutes),
        total_transit: format_hm(total_transit_minutes),
        total_journey: format_hm(total_journey_minutes),
        errors,
        warnings,
    }
}
