use crate::ir::Datum;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};
use std::io::Read;

/// Columns that can be injected into a raw series.
pub const SERIES_COLUMNS: [&str; 4] = ["x", "y", "z", "text"];

/// Point records in columns: a header row and one typed cell per column.
#[derive(Debug, Clone)]
pub struct SeriesData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Datum>>,
}

impl SeriesData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Datum>>) -> Self {
        Self { headers, rows }
    }

    /// Read CSV with a header row. Numeric cells become numbers and empty
    /// cells are missing.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("Failed to read CSV row {}", i + 1))?;
            rows.push(record.iter().map(csv_cell).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Read a JSON array of point objects, e.g. `[{"x": 1, "y": 2, "z": 3}]`.
    ///
    /// Headers are the union of keys in first-seen order; a point without a
    /// key has a missing cell there.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader).context("Failed to parse JSON points")?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let points = value
            .as_array()
            .ok_or_else(|| anyhow!("JSON points must be an array of objects"))?;

        let mut headers: Vec<String> = Vec::new();
        for (i, point) in points.iter().enumerate() {
            let fields = point
                .as_object()
                .ok_or_else(|| anyhow!("Point {} is not a JSON object", i))?;
            for key in fields.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                headers
                    .iter()
                    .map(|h| json_cell(point.get(h)).with_context(|| format!("Point {}, field '{}'", i, h)))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<Datum>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(Datum::Missing))
                .collect(),
        )
    }

    /// Set `x`, `y`, `z` and `text` on a raw series from same-named columns.
    /// Columns already set on the series are left alone.
    pub fn inject_into(&self, series: &mut Value) -> Result<()> {
        if series.is_null() {
            *series = Value::Object(Map::new());
        }
        let obj = series
            .as_object_mut()
            .ok_or_else(|| anyhow!("Series style must be a JSON object"))?;

        for name in SERIES_COLUMNS {
            if obj.contains_key(name) {
                continue;
            }
            let Some(cells) = self.column(name) else {
                continue;
            };
            let values = cells
                .into_iter()
                .map(|d| match d {
                    Datum::Number(n) if name != "text" => Value::from(n),
                    Datum::Missing if name != "text" => Value::Null,
                    other => Value::String(other.to_string()),
                })
                .collect();
            obj.insert(name.to_string(), Value::Array(values));
        }
        Ok(())
    }
}

fn csv_cell(cell: &str) -> Datum {
    if cell.is_empty() {
        return Datum::Missing;
    }
    cell.parse::<f64>()
        .map(Datum::Number)
        .unwrap_or_else(|_| Datum::Text(cell.to_string()))
}

fn json_cell(value: Option<&Value>) -> Result<Datum> {
    match value {
        None | Some(Value::Null) => Ok(Datum::Missing),
        Some(v @ (Value::Number(_) | Value::String(_) | Value::Bool(_))) => Ok(Datum::from_value(v)),
        Some(other) => bail!("unsupported nested value {}", other),
    }
}
