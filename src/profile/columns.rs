// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Column declarations carried by a masking profile.
//! Everything here is validated once at load time so the engine can treat a
//! `ColumnSpec` as trusted while it walks the rows.

use crate::error::{MaskError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Largest number of decimal digits we generate numerically (10^18 fits in a u64).
pub const MAX_NUMERIC_DIGITS: u32 = 18;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d"];

static LENGTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*(?:,\s*(\d+)\s*)?$").expect("valid regex"));

/// Declared data type of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Char,
    Varchar,
    Decimal,
    Date,
    Timestamp,
    Integer,
    /// Anything we do not recognise; kept verbatim for reporting.
    Other(String),
}

impl DataType {
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CHAR" => DataType::Char,
            "VARCHAR" | "VARCHAR2" => DataType::Varchar,
            "DECIMAL" | "NUMERIC" => DataType::Decimal,
            "DATE" => DataType::Date,
            "TIMESTAMP" => DataType::Timestamp,
            "INTEGER" | "INT" => DataType::Integer,
            _ => DataType::Other(upper),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Char => "CHAR",
            DataType::Varchar => "VARCHAR",
            DataType::Decimal => "DECIMAL",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Integer => "INTEGER",
            DataType::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// Declared length: a plain width, or `precision,scale` for decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLength {
    Scalar(usize),
    Decimal { precision: u32, scale: u32 },
}

impl ColumnLength {
    pub fn parse(raw: &str) -> Result<Self> {
        let caps = LENGTH_REGEX
            .captures(raw)
            .ok_or_else(|| MaskError::configuration(format!("invalid length '{raw}'")))?;
        let first: usize = caps[1]
            .parse()
            .map_err(|_| MaskError::configuration(format!("length out of range '{raw}'")))?;
        match caps.get(2) {
            None if first == 0 => Err(MaskError::configuration("length must be positive")),
            None => Ok(ColumnLength::Scalar(first)),
            Some(scale) => {
                let precision = u32::try_from(first).map_err(|_| {
                    MaskError::configuration(format!("precision out of range '{raw}'"))
                })?;
                let scale: u32 = scale.as_str().parse().map_err(|_| {
                    MaskError::configuration(format!("scale out of range '{raw}'"))
                })?;
                Ok(ColumnLength::Decimal { precision, scale })
            }
        }
    }
}

impl fmt::Display for ColumnLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnLength::Scalar(n) => write!(f, "{n}"),
            ColumnLength::Decimal { precision, scale } => write!(f, "{precision},{scale}"),
        }
    }
}

/// Inclusive date range used by the DATE generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateBounds {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(MaskError::configuration(format!(
                "date range starts after it ends ({start} > {end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }
}

impl Default for DateBounds {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
        }
    }
}

/// Inclusive timestamp range used by the TIMESTAMP generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampBounds {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimestampBounds {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(MaskError::configuration(format!(
                "timestamp range starts after it ends ({start} > {end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }
}

impl Default for TimestampBounds {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(2025, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .unwrap_or_default();
        Self { start, end }
    }
}

/// Inclusive bounds for INTEGER columns without a fixed digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl Default for IntRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: i64::from(i32::MAX),
        }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| MaskError::configuration(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDateTime::parse_from_str(trimmed, fmt)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(trimmed, fmt)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
        })
        .ok_or_else(|| {
            MaskError::configuration(format!(
                "invalid timestamp '{raw}', expected YYYY-MM-DD HH:MM:SS"
            ))
        })
}

/// One masked column: where it sits, what it holds and how to fake it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub position: usize,
    pub name: String,
    pub data_type: DataType,
    pub length: Option<ColumnLength>,
    pub params: BTreeMap<String, String>,
    pub dates: Option<DateBounds>,
    pub timestamps: Option<TimestampBounds>,
    pub range: Option<IntRange>,
}

impl ColumnSpec {
    /// Build and validate a column from its raw declaration.
    pub fn new(
        position: usize,
        name: &str,
        data_type: DataType,
        length: Option<ColumnLength>,
        params: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut spec = ColumnSpec {
            position,
            name: name.trim().to_string(),
            data_type,
            length,
            params,
            dates: None,
            timestamps: None,
            range: None,
        };
        spec.resolve_params()?;
        spec.validate_length()?;
        Ok(spec)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn scalar_length(&self) -> Option<usize> {
        match self.length {
            Some(ColumnLength::Scalar(n)) => Some(n),
            _ => None,
        }
    }

    /// `(precision, scale)` for DECIMAL columns. A scalar length means scale 0.
    pub fn decimal_shape(&self) -> Option<(u32, u32)> {
        match self.length? {
            ColumnLength::Decimal { precision, scale } => Some((precision, scale)),
            ColumnLength::Scalar(n) => u32::try_from(n).ok().map(|p| (p, 0)),
        }
    }

    /// Comma separated `values` param, trimmed, empties dropped.
    pub fn allowed_values(&self) -> Vec<String> {
        self.param("values")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn separator(&self) -> &str {
        self.param("separator").unwrap_or(" ")
    }

    fn resolve_params(&mut self) -> Result<()> {
        let start = self.param("start").map(str::to_string);
        let end = self.param("end").map(str::to_string);
        match self.data_type {
            DataType::Date if start.is_some() || end.is_some() => {
                let defaults = DateBounds::default();
                let start = start.as_deref().map(parse_date).transpose()?;
                let end = end.as_deref().map(parse_date).transpose()?;
                self.dates = Some(DateBounds::new(
                    start.unwrap_or(defaults.start),
                    end.unwrap_or(defaults.end),
                )?);
            }
            DataType::Timestamp if start.is_some() || end.is_some() => {
                let defaults = TimestampBounds::default();
                let start = start.as_deref().map(parse_timestamp).transpose()?;
                let end = end.as_deref().map(parse_timestamp).transpose()?;
                self.timestamps = Some(TimestampBounds::new(
                    start.unwrap_or(defaults.start),
                    end.unwrap_or(defaults.end),
                )?);
            }
            _ => {}
        }

        if self.param("min").is_some() || self.param("max").is_some() {
            let defaults = IntRange::default();
            let min = self.int_param("min")?.unwrap_or(defaults.min);
            let max = self.int_param("max")?.unwrap_or(defaults.max);
            if min > max {
                return Err(MaskError::configuration(format!(
                    "column {} ({}): min {min} exceeds max {max}",
                    self.position, self.name
                )));
            }
            self.range = Some(IntRange { min, max });
        }
        Ok(())
    }

    fn int_param(&self, key: &str) -> Result<Option<i64>> {
        self.param(key)
            .map(|raw| {
                raw.trim().parse::<i64>().map_err(|_| {
                    MaskError::configuration(format!(
                        "column {} ({}): {key} must be an integer, got '{raw}'",
                        self.position, self.name
                    ))
                })
            })
            .transpose()
    }

    fn validate_length(&self) -> Result<()> {
        let context = || format!("column {} ({})", self.position, self.name);
        match (&self.data_type, self.length) {
            (DataType::Decimal, None) => Err(MaskError::configuration(format!(
                "{}: DECIMAL needs a length such as 10,2",
                context()
            ))),
            (DataType::Decimal, Some(_)) => {
                let (precision, scale) = self.decimal_shape().ok_or_else(|| {
                    MaskError::configuration(format!("{}: precision out of range", context()))
                })?;
                if precision == 0 || scale > precision {
                    return Err(MaskError::configuration(format!(
                        "{}: invalid precision/scale {precision},{scale}",
                        context()
                    )));
                }
                if precision - scale > MAX_NUMERIC_DIGITS || scale > MAX_NUMERIC_DIGITS {
                    return Err(MaskError::configuration(format!(
                        "{}: at most {MAX_NUMERIC_DIGITS} digits either side of the point",
                        context()
                    )));
                }
                Ok(())
            }
            (_, Some(ColumnLength::Decimal { .. })) => Err(MaskError::configuration(format!(
                "{}: precision,scale lengths only apply to DECIMAL",
                context()
            ))),
            (DataType::Integer, Some(ColumnLength::Scalar(n)))
                if n > MAX_NUMERIC_DIGITS as usize =>
            {
                Err(MaskError::configuration(format!(
                    "{}: INTEGER length {n} exceeds {MAX_NUMERIC_DIGITS} digits",
                    context()
                )))
            }
            _ => Ok(()),
        }
    }
}
