//! CF conventions support.
//!
//! Resolves which dimension of a variable plays the X (longitude), Y
//! (latitude) and T (time) role, decodes CF time coordinates and matches
//! request datetimes against them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::error::{IsobarError, Result};
use crate::state::{AppState, Variable};

/// Spatial and temporal axes a dimension can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    X,
    Y,
    T,
}

impl Axis {
    fn standard_names(&self) -> &'static [&'static str] {
        match self {
            Axis::X => &["longitude", "grid_longitude", "projection_x_coordinate"],
            Axis::Y => &["latitude", "grid_latitude", "projection_y_coordinate"],
            Axis::T => &["time"],
        }
    }

    fn fallback_names(&self) -> &'static [&'static str] {
        match self {
            Axis::X => &["lon", "longitude", "x", "nav_lon", "rlon"],
            Axis::Y => &["lat", "latitude", "y", "nav_lat", "rlat"],
            Axis::T => &["time", "t", "valid_time", "ocean_time"],
        }
    }

    fn matches_units(&self, units: &str) -> bool {
        let units = units.trim().to_lowercase();
        match self {
            Axis::X => matches!(
                units.as_str(),
                "degrees_east" | "degree_east" | "degrees_e" | "degree_e" | "degreese" | "degreee"
            ),
            Axis::Y => matches!(
                units.as_str(),
                "degrees_north"
                    | "degree_north"
                    | "degrees_n"
                    | "degree_n"
                    | "degreesn"
                    | "degreen"
            ),
            Axis::T => units.contains(" since "),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::T => "T",
        };
        write!(f, "{}", name)
    }
}

/// Dimensions of a variable resolved to their CF axes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisDims {
    pub x: Option<String>,
    pub y: Option<String>,
    pub t: Option<String>,
}

impl AxisDims {
    /// Resolve all three axes for a variable
    pub fn resolve(state: &AppState, var: &Variable) -> Self {
        Self {
            x: resolve_axis(state, var, Axis::X),
            y: resolve_axis(state, var, Axis::Y),
            t: resolve_axis(state, var, Axis::T),
        }
    }

    /// Both horizontal axes, or an error naming the variable
    pub fn horizontal(&self, var_name: &str) -> Result<(&str, &str)> {
        match (&self.x, &self.y) {
            (Some(x), Some(y)) => Ok((x.as_str(), y.as_str())),
            _ => Err(IsobarError::invalid(
                "parameter",
                format!(
                    "Variable {} has no longitude/latitude dimensions and cannot be mapped",
                    var_name
                ),
            )),
        }
    }
}

/// Find the dimension of `var` that plays the given axis role.
///
/// Explicit `axis` attributes win over `standard_name`, which wins over
/// `units`, which wins over well-known dimension names.
pub fn resolve_axis(state: &AppState, var: &Variable, axis: Axis) -> Option<String> {
    let axis_label = axis.to_string();
    let coord_vars = || {
        var.dimensions
            .iter()
            .filter_map(|dim| state.get_variable_metadata(dim).map(|cv| (dim, cv)))
    };

    if let Some((dim, _)) = coord_vars().find(|(_, cv)| {
        cv.attribute_text("axis")
            .is_some_and(|a| a.trim().eq_ignore_ascii_case(&axis_label))
    }) {
        return Some(dim.clone());
    }

    if let Some((dim, _)) = coord_vars().find(|(_, cv)| {
        cv.attribute_text("standard_name")
            .is_some_and(|s| axis.standard_names().contains(&s.trim()))
    }) {
        return Some(dim.clone());
    }

    if let Some((dim, _)) = coord_vars().find(|(_, cv)| {
        cv.attribute_text("units")
            .is_some_and(|u| axis.matches_units(u))
    }) {
        return Some(dim.clone());
    }

    var.dimensions
        .iter()
        .find(|dim| axis.fallback_names().contains(&dim.to_lowercase().as_str()))
        .cloned()
}

/// A CF time unit definition, e.g. `hours since 1900-01-01 00:00:00`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnits {
    /// Seconds per coordinate unit
    pub seconds_per_unit: f64,
    /// Reference instant
    pub epoch: DateTime<Utc>,
}

impl TimeUnits {
    /// Parse a CF `<unit> since <reference>` string
    pub fn parse(units: &str) -> Result<Self> {
        let units = units.trim();
        let split_at = units.to_ascii_lowercase().find(" since ").ok_or_else(|| {
            IsobarError::invalid(
                "datetime",
                format!("Time units are not of the form '<unit> since <date>': {}", units),
            )
        })?;
        let unit = units[..split_at].trim().to_ascii_lowercase();
        let reference = &units[split_at + " since ".len()..];

        let seconds_per_unit = match unit.as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3600.0,
            "days" | "day" | "d" => 86400.0,
            other => {
                return Err(IsobarError::invalid(
                    "datetime",
                    format!("Unsupported time unit: {}", other),
                ))
            }
        };

        let epoch = parse_reference_instant(reference.trim()).ok_or_else(|| {
            IsobarError::invalid("datetime", format!("Unparseable time reference: {}", reference))
        })?;

        Ok(Self {
            seconds_per_unit,
            epoch,
        })
    }

    /// Units of a time coordinate variable, honouring its `calendar` attribute
    ///
    /// Only calendars that follow the Gregorian rules are decodable.
    pub fn for_coordinate(var: &Variable) -> Result<Self> {
        if let Some(calendar) = var.attribute_text("calendar") {
            let calendar = calendar.trim().to_ascii_lowercase();
            if !GREGORIAN_CALENDARS.contains(&calendar.as_str()) {
                return Err(IsobarError::invalid(
                    "datetime",
                    format!(
                        "Calendar {} of {} is not supported; request a raw coordinate value instead",
                        calendar, var.name
                    ),
                ));
            }
        }
        let units = var.attribute_text("units").ok_or_else(|| {
            IsobarError::invalid(
                "datetime",
                format!(
                    "Time dimension {} has no CF units; request a raw coordinate value instead",
                    var.name
                ),
            )
        })?;
        Self::parse(units)
    }

    /// Convert a coordinate value into an instant
    ///
    /// Returns `None` when the instant falls outside the representable range.
    pub fn decode(&self, value: f64) -> Option<DateTime<Utc>> {
        let millis = (value * self.seconds_per_unit * 1000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        let offset = chrono::Duration::try_milliseconds(millis as i64)?;
        self.epoch.checked_add_signed(offset)
    }
}

const GREGORIAN_CALENDARS: [&str; 3] = ["standard", "gregorian", "proleptic_gregorian"];

fn parse_reference_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let trimmed = s
        .trim_end_matches("utc")
        .trim_end_matches("UTC")
        .trim_end_matches(['z', 'Z'])
        .trim();

    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A time requested by a client
#[derive(Debug, Clone, PartialEq)]
pub enum RequestedTime {
    /// A calendar instant (ISO 8601 / RFC 3339 input)
    Instant(DateTime<Utc>),
    /// A raw time coordinate value
    Raw(f64),
}

impl RequestedTime {
    /// Parse the `datetime` / `t` request value
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IsobarError::invalid("datetime", "Datetime must not be empty"));
        }
        if let Some(instant) = parse_reference_instant(s) {
            return Ok(RequestedTime::Instant(instant));
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(RequestedTime::Raw(v)),
            _ => Err(IsobarError::invalid(
                "datetime",
                format!("Unrecognized datetime: {}", s),
            )),
        }
    }
}

impl fmt::Display for RequestedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestedTime::Instant(dt) => write!(f, "{}", dt.to_rfc3339()),
            RequestedTime::Raw(v) => write!(f, "{}", v),
        }
    }
}

/// Decode the time coordinate of a dimension into instants
///
/// Values outside the representable range decode to `None`.
pub fn decode_times(state: &AppState, dim: &str) -> Result<Vec<Option<DateTime<Utc>>>> {
    let units = match state.get_variable_metadata(dim) {
        Some(cv) => TimeUnits::for_coordinate(cv)?,
        None => {
            return Err(IsobarError::invalid(
                "datetime",
                format!(
                    "Time dimension {} has no CF units; request a raw coordinate value instead",
                    dim
                ),
            ))
        }
    };
    let values = state.get_coordinate_checked(dim)?;
    Ok(values.iter().map(|&v| units.decode(v)).collect())
}

/// Find the index along the time dimension matching the requested time exactly
pub fn select_time_index(state: &AppState, dim: &str, requested: &RequestedTime) -> Result<usize> {
    let values = state.get_coordinate_checked(dim)?;

    let found = match requested {
        RequestedTime::Instant(instant) => {
            let times = decode_times(state, dim)?;
            times.iter().position(|t| {
                t.is_some_and(|t| (t - *instant).num_milliseconds().abs() < 500)
            })
        }
        RequestedTime::Raw(raw) => values.iter().position(|v| (v - raw).abs() < 1e-9),
    };

    found.ok_or_else(|| {
        let available = match decode_times(state, dim) {
            Ok(times) => times
                .iter()
                .zip(values)
                .take(10)
                .map(|(t, v)| t.map_or_else(|| v.to_string(), |t| t.to_rfc3339()))
                .collect::<Vec<_>>(),
            Err(_) => values.iter().take(10).map(|v| v.to_string()).collect(),
        };
        IsobarError::not_found(format!(
            "Time {} not found along {}; available (first {}): {}",
            requested,
            dim,
            available.len(),
            available.join(", ")
        ))
    })
}
