//! Daily aggregation of hourly Open-Meteo readings.

use super::{table_ref, DataSource};
use crate::checks::support::present_predicate;
use crate::config::{CITY_COLUMN, DATE_COLUMN};
use crate::prelude::*;
use crate::security::SqlSecurity;
use arrow::datatypes::DataType;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::{debug, info, instrument};

/// Hourly column names and the daily names they are averaged into, in output
/// order. A source may already use the daily name.
pub const HOURLY_COLUMNS: [(&str, &str); 9] = [
    ("pm2_5", "pm25"),
    ("pm10", "pm10"),
    ("nitrogen_dioxide", "no2"),
    ("sulphur_dioxide", "so2"),
    ("ozone", "o3"),
    ("carbon_monoxide", "co"),
    ("dust", "dust"),
    ("uv_index", "uv"),
    ("ammonia", "nh3"),
];

/// Daily means of these must lie in `[0, CORE_UPPER_BOUND)` to be kept.
const CORE_POLLUTANTS: [&str; 5] = ["pm25", "pm10", "no2", "so2", "o3"];
const CORE_UPPER_BOUND: f64 = 5000.0;

/// Turns an hourly table into the daily `(city, date)` table the validator
/// expects.
///
/// The hourly source is registered as `{table}_hourly`; `{table}` becomes a
/// view with one row per city and calendar day holding the mean of each
/// pollutant. Cities with `min_hourly_readings` or fewer non-missing pm2.5
/// readings are dropped, and so is any day whose core pollutant means are
/// missing or outside `[0, 5000)`.
///
/// ```rust,no_run
/// use aq_guard::sources::{CsvSource, DailyAggregation, DataSource};
/// use datafusion::prelude::SessionContext;
///
/// # async fn example() -> aq_guard::prelude::Result<()> {
/// let hourly = CsvSource::new("data/processed/air_quality_full.csv")?;
/// let daily = DailyAggregation::new(Box::new(hourly)).with_min_hourly_readings(5000);
/// let ctx = SessionContext::new();
/// daily.register(&ctx, "data").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DailyAggregation {
    hourly: Box<dyn DataSource>,
    time_column: String,
    min_hourly_readings: u64,
}

impl DailyAggregation {
    /// Aggregates `hourly`, reading timestamps from its `time` column.
    pub fn new(hourly: Box<dyn DataSource>) -> Self {
        Self {
            hourly,
            time_column: "time".to_string(),
            min_hourly_readings: 10_000,
        }
    }

    /// Sets the number of non-missing pm2.5 readings a city must exceed.
    pub fn with_min_hourly_readings(mut self, readings: u64) -> Self {
        self.min_hourly_readings = readings;
        self
    }

    /// Sets the timestamp column of the hourly table.
    pub fn with_time_column(mut self, column: impl Into<String>) -> Self {
        self.time_column = column.into();
        self
    }

    fn build_query(
        &self,
        staging: &str,
        column_type: impl Fn(&str) -> Option<DataType>,
    ) -> Result<String> {
        let city = SqlSecurity::escape_identifier(CITY_COLUMN)?;
        let date = SqlSecurity::escape_identifier(DATE_COLUMN)?;
        if column_type(CITY_COLUMN).is_none() {
            return Err(AqError::ColumnNotFound {
                column: CITY_COLUMN.to_string(),
            });
        }

        let time = SqlSecurity::escape_identifier(&self.time_column)?;
        let day = match column_type(&self.time_column) {
            None => {
                return Err(AqError::ColumnNotFound {
                    column: self.time_column.clone(),
                })
            }
            Some(DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View) => {
                format!("CAST(CAST({time} AS TIMESTAMP) AS DATE)")
            }
            Some(_) => format!("CAST({time} AS DATE)"),
        };

        let mut projections = Vec::new();
        let mut averages = Vec::new();
        let mut pm25_present = None;
        for (hourly_name, daily_name) in HOURLY_COLUMNS {
            let Some((source, data_type)) = [hourly_name, daily_name]
                .into_iter()
                .find_map(|name| column_type(name).map(|t| (name, t)))
            else {
                continue;
            };
            let source = SqlSecurity::escape_identifier(source)?;
            let target = SqlSecurity::escape_identifier(daily_name)?;
            if daily_name == "pm25" {
                pm25_present = Some(present_predicate(&source, &data_type));
            }
            // NaN hours are missing and must not poison the daily mean
            let present = present_predicate(&source, &data_type);
            projections.push(format!("CASE WHEN {present} THEN {source} END AS {target}"));
            averages.push(format!("AVG({target}) AS {target}"));
        }

        let Some(pm25_present) = pm25_present else {
            return Err(AqError::ColumnNotFound {
                column: "pm2_5".to_string(),
            });
        };

        let filters: Vec<String> = CORE_POLLUTANTS
            .iter()
            .filter(|name| {
                HOURLY_COLUMNS.iter().any(|(hourly_name, daily_name)| {
                    daily_name == *name
                        && (column_type(hourly_name).is_some() || column_type(daily_name).is_some())
                })
            })
            .map(|name| {
                let column = SqlSecurity::escape_identifier(name)?;
                let upper = SqlSecurity::float_literal(CORE_UPPER_BOUND, "upper bound")?;
                Ok(format!("{column} >= 0.0 AND {column} < {upper}"))
            })
            .collect::<Result<_>>()?;

        Ok(format!(
            "SELECT * FROM (\
               SELECT {city}, {date}, {averages} FROM (\
                 SELECT CAST({city} AS VARCHAR) AS {city}, {day} AS {date}, {projections} \
                 FROM {staging} \
                 WHERE {city} IN (\
                   SELECT {city} FROM {staging} WHERE {pm25_present} \
                   GROUP BY {city} HAVING COUNT(*) > {min})\
               ) AS hourly GROUP BY {city}, {date}\
             ) AS daily WHERE {filters} ORDER BY {city}, {date}",
            averages = averages.join(", "),
            projections = projections.join(", "),
            min = self.min_hourly_readings,
            filters = filters.join(" AND "),
        ))
    }
}

#[async_trait]
impl DataSource for DailyAggregation {
    #[instrument(skip(self, ctx), fields(
        table.name = %table_name,
        source.type = "daily",
        daily.min_hourly_readings = self.min_hourly_readings
    ))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        let staging_name = format!("{table_name}_hourly");
        self.hourly.register(ctx, &staging_name).await?;
        let staging = table_ref(&staging_name)?;

        let hourly = ctx.table(staging.as_str()).await?;
        let schema = hourly.schema().inner().clone();
        let sql = self.build_query(&staging, |name| {
            schema
                .column_with_name(name)
                .map(|(_, field)| field.data_type().clone())
        })?;
        debug!(sql = %sql, "Daily aggregation query");

        let daily = ctx.sql(&sql).await?;
        ctx.register_table(table_ref(table_name)?.as_str(), daily.into_view())?;
        info!(
            table.name = %table_name,
            source.staging = %staging_name,
            source.hourly = %self.hourly.description(),
            "Registered daily aggregation"
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Daily means of {}", self.hourly.description())
    }
}
