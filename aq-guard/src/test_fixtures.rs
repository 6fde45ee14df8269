//! In-memory reading tables for unit tests.

use crate::core::{
    validation_context::CURRENT_CONTEXT, QualityCheck, ReportBuilder, ValidationContext,
    ValidationReport,
};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use std::sync::Arc;
use std::time::Duration;

/// Days since the Unix epoch for an ISO date.
pub fn epoch_days(date: &str) -> i32 {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (day - epoch).num_days() as i32
}

/// Column-by-column builder for a readings table.
#[derive(Debug, Default, Clone)]
pub struct TableBuilder {
    fields: Vec<Field>,
    arrays: Vec<ArrayRef>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strings(mut self, name: &str, values: &[Option<&str>]) -> Self {
        self.fields.push(Field::new(name, DataType::Utf8, true));
        self.arrays
            .push(Arc::new(StringArray::from(values.to_vec())) as ArrayRef);
        self
    }

    pub fn city(self, values: &[&str]) -> Self {
        let values: Vec<Option<&str>> = values.iter().map(|v| Some(*v)).collect();
        self.strings("city", &values)
    }

    /// Adds a `date` column `start + offset` days for each offset.
    pub fn dates(mut self, start: &str, offsets: &[i32]) -> Self {
        let base = epoch_days(start);
        let values: Vec<i32> = offsets.iter().map(|o| base + o).collect();
        self.fields.push(Field::new("date", DataType::Date32, true));
        self.arrays.push(Arc::new(Date32Array::from(values)) as ArrayRef);
        self
    }

    /// Adds `n` consecutive daily dates.
    pub fn daily_dates(self, start: &str, n: i32) -> Self {
        let offsets: Vec<i32> = (0..n).collect();
        self.dates(start, &offsets)
    }

    pub fn nullable(mut self, name: &str, values: &[Option<f64>]) -> Self {
        self.fields.push(Field::new(name, DataType::Float64, true));
        self.arrays
            .push(Arc::new(Float64Array::from(values.to_vec())) as ArrayRef);
        self
    }

    pub fn floats(self, name: &str, values: &[f64]) -> Self {
        let values: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        self.nullable(name, &values)
    }

    pub fn batch(&self) -> RecordBatch {
        let schema = Arc::new(Schema::new(self.fields.clone()));
        RecordBatch::try_new(schema, self.arrays.clone()).unwrap()
    }

    /// Registers the table as `data` in a fresh context.
    pub fn context(&self) -> SessionContext {
        let batch = self.batch();
        let ctx = SessionContext::new();
        let table = MemTable::try_new(batch.schema(), vec![vec![batch]]).unwrap();
        ctx.register_table("data", Arc::new(table)).unwrap();
        ctx
    }
}

pub const PM25: [f64; 10] = [10.0, 15.0, 12.0, 18.0, 14.0, 16.0, 11.0, 13.0, 17.0, 15.0];
pub const PM10: [f64; 10] = [20.0, 25.0, 22.0, 28.0, 24.0, 26.0, 21.0, 23.0, 27.0, 25.0];
pub const NO2: [f64; 10] = [30.0, 35.0, 32.0, 38.0, 34.0, 36.0, 31.0, 33.0, 37.0, 35.0];
pub const SO2: [f64; 10] = [5.0, 7.0, 6.0, 8.0, 7.0, 6.0, 5.0, 7.0, 8.0, 6.0];
pub const O3: [f64; 10] = [40.0, 45.0, 42.0, 48.0, 44.0, 46.0, 41.0, 43.0, 47.0, 45.0];

/// Ten clean daily readings for one city, starting 2023-01-01.
pub fn clean_readings() -> TableBuilder {
    TableBuilder::new()
        .city(&["Moscow"; 10])
        .daily_dates("2023-01-01", 10)
        .floats("pm25", &PM25)
        .floats("pm10", &PM10)
        .floats("no2", &NO2)
        .floats("so2", &SO2)
        .floats("o3", &O3)
}

/// Runs a single check against table `data` and returns its report.
pub async fn run_check(check: &dyn QualityCheck, ctx: &SessionContext) -> ValidationReport {
    let validation_ctx = ValidationContext::load(ctx, "data").await.unwrap();
    let mut builder = ReportBuilder::new("data", validation_ctx.total_rows());
    CURRENT_CONTEXT
        .scope(validation_ctx, check.run(ctx, &mut builder))
        .await
        .unwrap();
    builder.finish(Duration::ZERO)
}
