//! Plain-text rendering of weather observations and usage reports.
//!
//! Everything here is pure: the wall clock is passed in by the caller.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::{
    error::ApiError,
    model::{UsageReport, WeatherObservation},
    units::{Units, wind_direction_label},
};

/// Render the full weather report, or the error message verbatim if the fetch failed.
pub fn format_report(
    requested_city: &str,
    outcome: &Result<WeatherObservation, ApiError>,
    now: DateTime<Utc>,
    display_zone: FixedOffset,
) -> String {
    let obs = match outcome {
        Ok(obs) => obs,
        Err(err) => return err.to_string(),
    };

    let timezone = utc_offset_label(obs.timezone_offset_secs());
    let local_time = display_timestamp(now, display_zone);
    let day_length = day_length_label(obs.sunrise(), obs.sunset());

    let mut out = format!("Погода у місті {requested_city} ({}):\n", obs.city_name());
    out.push_str(&format!("Часова зона: {timezone}\n"));
    out.push_str(&format!("Дата і час запиту (локальний час): {local_time}\n"));
    out.push_str(&format!("Тривалість дня: {day_length} (г:хв)\n"));
    out.push_str(&format!("Опис: {}\n", obs.description()));
    out.push_str(&format!(
        "Температура: {:.2}°C (відчувається як {:.2}°C)\n",
        obs.temperature(),
        obs.feels_like()
    ));
    out.push_str(&format!("Вологість: {}%\n", obs.humidity()));
    out.push_str(&format!("Швидкість вітру: {:.2} м/с", obs.wind_speed()));
    out
}

/// Fixed zone for report timestamps; out-of-range offsets fall back to UTC.
pub fn display_zone(offset_secs: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_secs).unwrap_or_else(|| {
        tracing::warn!(offset_secs, "display offset out of range, using UTC");
        Utc.fix()
    })
}

/// `UTC±HH:MM` for an offset in seconds east of UTC.
pub fn utc_offset_label(offset_secs: i64) -> String {
    let hours = offset_secs / 3600;
    let minutes = (offset_secs % 3600).abs() / 60;
    let sign = if offset_secs >= 0 { '+' } else { '-' };
    format!("UTC{sign}{:02}:{minutes:02}", hours.abs())
}

pub fn display_timestamp(now: DateTime<Utc>, zone: FixedOffset) -> String {
    now.with_timezone(&zone).format("%Y-%m-%d %H:%M:%S%:z").to_string()
}

/// `H:MM` between sunrise and sunset. Missing values yield `0:00` or a negative span.
pub fn day_length_label(sunrise: i64, sunset: i64) -> String {
    let secs = sunset - sunrise;
    // Floored, so the minutes stay in 0..60 for negative spans.
    format!("{}:{:02}", secs.div_euclid(3600), secs.rem_euclid(3600) / 60)
}

/// Compact multi-line summary with units matching the query's unit system.
pub fn format_summary(obs: &WeatherObservation, units: Units) -> String {
    let t = units.temperature_symbol();
    let speed = units.speed_unit();

    let mut out = format!("{}, {}\n", obs.city_name(), obs.country());
    out.push_str(&format!("Description: {}\n\n", obs.description()));
    out.push_str(&format!(
        "Temperature: {:.1}{t} (feels {:.1}{t})\n",
        obs.temperature(),
        obs.feels_like()
    ));
    out.push_str(&format!("Min/Max: {:.1}/{:.1}{t}\n", obs.temp_min(), obs.temp_max()));
    out.push_str(&format!(
        "Pressure: {} hPa | Humidity: {}%\n",
        obs.pressure(),
        obs.humidity()
    ));
    out.push_str(&format!(
        "Wind: {:.1} {speed}, {}° ({})\n",
        obs.wind_speed(),
        obs.wind_deg(),
        wind_direction_label(obs.wind_deg())
    ));
    out.push_str(&format!(
        "Clouds: {}% | Visibility: {:.1} km",
        obs.cloudiness(),
        obs.visibility_m() / 1000.0
    ));
    out
}

/// Answer followed by token counters and cost.
pub fn format_usage(report: &UsageReport) -> String {
    let mut out = format!("Відповідь: {}\n\n", report.response);
    out.push_str(&format!("Модель: {}\n", report.model));
    out.push_str(&format!("Токенів запит: {}\n", report.prompt_tokens));
    out.push_str(&format!("Токенів відповідь: {}\n", report.completion_tokens));
    out.push_str(&format_cost_line(report.total_tokens, report.total_cost_usd));
    out
}

pub fn format_cost_line(total_tokens: u64, cost_usd: f64) -> String {
    format!("Токени: {total_tokens}, Вартість: ${cost_usd:.6}")
}
