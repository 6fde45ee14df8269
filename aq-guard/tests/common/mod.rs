//! Shared helpers for integration tests.

#![allow(dead_code)]

use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const POLLUTANTS: [&str; 5] = ["pm25", "pm10", "no2", "so2", "o3"];

/// Days since the Unix epoch for an ISO date.
pub fn epoch_days(date: &str) -> i32 {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (day - epoch).num_days() as i32
}

/// A daily readings table built row by row.
#[derive(Debug, Clone, Default)]
pub struct Readings {
    cities: Vec<String>,
    days: Vec<i32>,
    values: Vec<[Option<f64>; 5]>,
    skip: Vec<String>,
}

impl Readings {
    pub fn new() -> Self {
        Self::default()
    }

    /// `n` consecutive days of in-range readings for one city.
    pub fn clean(city: &str, start: &str, n: i32) -> Self {
        let mut readings = Self::new();
        for i in 0..n {
            let base = 10.0 + f64::from(i % 7);
            readings = readings.row(
                city,
                epoch_days(start) + i,
                [Some(base), Some(base * 2.0), Some(base * 3.0), Some(base / 2.0), Some(base * 4.0)],
            );
        }
        readings
    }

    pub fn row(mut self, city: &str, day: i32, values: [Option<f64>; 5]) -> Self {
        self.cities.push(city.to_string());
        self.days.push(day);
        self.values.push(values);
        self
    }

    /// Replaces one pollutant value in an existing row.
    pub fn set(mut self, row: usize, column: &str, value: Option<f64>) -> Self {
        let index = POLLUTANTS.iter().position(|c| *c == column).unwrap();
        self.values[row][index] = value;
        self
    }

    /// Leaves a column out of the table.
    pub fn without(mut self, column: &str) -> Self {
        self.skip.push(column.to_string());
        self
    }

    pub fn extend(mut self, other: Readings) -> Self {
        self.cities.extend(other.cities);
        self.days.extend(other.days);
        self.values.extend(other.values);
        self
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn schema(&self) -> SchemaRef {
        let mut fields = Vec::new();
        if !self.skipped("city") {
            fields.push(Field::new("city", DataType::Utf8, true));
        }
        if !self.skipped("date") {
            fields.push(Field::new("date", DataType::Date32, true));
        }
        for name in POLLUTANTS {
            if !self.skipped(name) {
                fields.push(Field::new(name, DataType::Float64, true));
            }
        }
        Arc::new(Schema::new(fields))
    }

    pub fn batch(&self) -> RecordBatch {
        let mut arrays: Vec<ArrayRef> = Vec::new();
        if !self.skipped("city") {
            arrays.push(Arc::new(StringArray::from(self.cities.clone())));
        }
        if !self.skipped("date") {
            arrays.push(Arc::new(Date32Array::from(self.days.clone())));
        }
        for (index, name) in POLLUTANTS.iter().enumerate() {
            if !self.skipped(name) {
                let column: Vec<Option<f64>> = self.values.iter().map(|row| row[index]).collect();
                arrays.push(Arc::new(Float64Array::from(column)));
            }
        }
        RecordBatch::try_new(self.schema(), arrays).unwrap()
    }

    /// Renders the table as CSV with ISO dates; missing values are empty.
    pub fn to_csv(&self) -> String {
        let mut header = vec!["city", "date"];
        header.extend(POLLUTANTS);
        let mut out = header.join(",");
        out.push('\n');
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        for ((city, day), values) in self.cities.iter().zip(&self.days).zip(&self.values) {
            let date = epoch + chrono::Duration::days(i64::from(*day));
            let values: Vec<String> = values
                .iter()
                .map(|v| v.map(|v| format!("{v:.1}")).unwrap_or_default())
                .collect();
            out.push_str(&format!("{city},{date},{}\n", values.join(",")));
        }
        out
    }

    fn skipped(&self, column: &str) -> bool {
        self.skip.iter().any(|c| c == column)
    }
}

/// Writes `contents` to `dir/name` and returns the path as a string.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path: PathBuf = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}
