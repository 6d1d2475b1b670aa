//! Date utilities, so the model can turn "tomorrow at 3pm" into the
//! `YYYY-MM-DD HH:MM:SS` strings the backend expects.
//!
//! Neither tool touches the backend.

use crate::support::{self, args};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, Months, NaiveDate, NaiveDateTime, TimeZone};
use jamespot_core::error::ToolError;
use jamespot_core::tool::{Tool, ToolResult};
use serde_json::{json, Value};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where wall-clock times are read and interpreted.
#[derive(Debug, Clone, Copy)]
enum Zone {
    Server,
    Named(chrono_tz::Tz),
}

impl Zone {
    fn parse(name: Option<&str>) -> Result<Self, String> {
        match name {
            None => Ok(Self::Server),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(Self::Named)
                .map_err(|_| format!("Invalid timezone: '{name}'")),
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Server => "server default".into(),
            Self::Named(tz) => tz.name().to_string(),
        }
    }

    fn now(&self) -> NaiveDateTime {
        match self {
            Self::Server => Local::now().naive_local(),
            Self::Named(tz) => chrono::Utc::now().with_timezone(tz).naive_local(),
        }
    }

    /// Describe a wall-clock time in this zone.
    fn describe(&self, wall: NaiveDateTime) -> Result<Value, String> {
        let described = match self {
            Self::Server => Local.from_local_datetime(&wall).earliest().map(|dt| instant(&dt)),
            Self::Named(tz) => tz.from_local_datetime(&wall).earliest().map(|dt| instant(&dt)),
        };
        described.ok_or_else(|| format!("{} does not exist in timezone {}", wall.format(DATETIME_FORMAT), self.label()))
    }
}

fn instant<Tz: TimeZone>(dt: &DateTime<Tz>) -> Value
where
    Tz::Offset: std::fmt::Display,
{
    json!({
        "datetime": dt.format(DATETIME_FORMAT).to_string(),
        "date": dt.format(DATE_FORMAT).to_string(),
        "iso": dt.to_rfc3339(),
        "timestamp": dt.timestamp_millis(),
        "dayOfWeek": dt.format("%A").to_string(),
    })
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or the `T`-separated form.
fn parse_base_date(text: &str) -> Result<NaiveDateTime, String> {
    let text = text.trim();
    let normalized = text.replacen('T', " ", 1);
    NaiveDateTime::parse_from_str(&normalized, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, DATE_FORMAT).map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|_| format!("Invalid base date '{text}'. Use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS"))
}

fn timezone_schema() -> Value {
    json!({
        "type": "string",
        "description": "Timezone to use (e.g., \"Europe/Paris\", \"America/New_York\"). Defaults to server timezone."
    })
}

pub struct CurrentDateTimeTool {
    debug: bool,
}

impl CurrentDateTimeTool {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    fn run(&self, arguments: &Value) -> Result<String, String> {
        let zone = Zone::parse(args::opt_string(arguments, "timezone"))?;
        let now = zone.now();

        let mut current = zone.describe(now)?;
        current["timezone"] = json!(zone.label());
        current["time"] = json!(now.format("%H:%M").to_string());

        let day = now.date();
        let next_month = day.checked_add_months(Months::new(1)).unwrap_or(day);
        let response = json!({
            "current": current,
            "helpful_relative_dates": {
                "tomorrow": (day + Duration::days(1)).format(DATE_FORMAT).to_string(),
                "next_week": (day + Duration::days(7)).format(DATE_FORMAT).to_string(),
                "next_month": next_month.format(DATE_FORMAT).to_string(),
            },
            "format_info": {
                "for_jamespot_datetime": "YYYY-MM-DD HH:MM:SS (e.g., \"2025-10-21 14:30:00\")",
                "for_jamespot_date": "YYYY-MM-DD (e.g., \"2025-10-21\")",
                "note": "Use datetime format for specific times, date format for all-day events",
            },
        });
        Ok(support::pretty(&response))
    }
}

#[async_trait]
impl Tool for CurrentDateTimeTool {
    fn name(&self) -> &str {
        "jamespot_get_current_datetime"
    }

    fn description(&self) -> &str {
        "Get the current date and time. Use this tool to know what date and time it is right now, \
         which is essential for creating events, meetings, or understanding relative dates like \
         \"tomorrow\", \"next week\", etc. Returns the current date and time in multiple formats \
         useful for Jamespot API calls."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "timezone": timezone_schema() }
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        support::log_input(self.debug, self.name(), &arguments);
        Ok(support::finish(self.debug, self.name(), self.run(&arguments)))
    }
}

pub struct CalculateDateTool {
    debug: bool,
}

impl CalculateDateTool {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    fn run(&self, arguments: &Value) -> Result<String, String> {
        let zone = Zone::parse(args::opt_string(arguments, "timezone"))?;
        let base_text = args::opt_string(arguments, "baseDate");
        let base = match base_text {
            Some(text) => parse_base_date(text)?,
            None => zone.now(),
        };

        let days = args::number_or(arguments, "days", 0);
        let hours = args::number_or(arguments, "hours", 0);
        let minutes = args::number_or(arguments, "minutes", 0);

        let offset = Duration::try_days(days)
            .zip(Duration::try_hours(hours))
            .zip(Duration::try_minutes(minutes))
            .and_then(|((d, h), m)| d.checked_add(&h)?.checked_add(&m))
            .ok_or_else(|| "Offset is out of range".to_string())?;
        let target = base
            .checked_add_signed(offset)
            .ok_or_else(|| "Resulting date is out of range".to_string())?;

        let response = json!({
            "result": zone.describe(target)?,
            "calculation": {
                "base_date": base_text.unwrap_or("current date/time"),
                "days_added": days,
                "hours_added": hours,
                "minutes_added": minutes,
                "timezone": zone.label(),
            },
        });
        Ok(support::pretty(&response))
    }
}

#[async_trait]
impl Tool for CalculateDateTool {
    fn name(&self) -> &str {
        "jamespot_calculate_date"
    }

    fn description(&self) -> &str {
        "Calculate a date by adding or subtracting days, hours, or minutes from a base date. \
         Useful for scheduling events relative to a specific date. If no base date is provided, \
         uses the current date/time."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "baseDate": {
                    "type": "string",
                    "description": "Base date to calculate from (format: YYYY-MM-DD or YYYY-MM-DD HH:MM:SS). Defaults to current date/time."
                },
                "days": { "type": "number", "description": "Number of days to add (positive) or subtract (negative)" },
                "hours": { "type": "number", "description": "Number of hours to add (positive) or subtract (negative)" },
                "minutes": { "type": "number", "description": "Number of minutes to add (positive) or subtract (negative)" },
                "timezone": timezone_schema()
            }
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        support::log_input(self.debug, self.name(), &arguments);
        Ok(support::finish(self.debug, self.name(), self.run(&arguments)))
    }
}

pub fn tools(debug: bool) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(CurrentDateTimeTool::new(debug)),
        Box::new(CalculateDateTool::new(debug)),
    ]
}
