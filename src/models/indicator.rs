use crate::models::status::{Frequency, IndicatorCategory, enum_col};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Indikator kinerja: a measurable outcome tracked against yearly targets.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceIndicator {
    pub id: i64,
    pub instansi_id: i64,
    pub program_id: Option<i64>,
    pub kegiatan_id: Option<i64>,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub measurement_unit: String,
    pub data_source: Option<String>,
    pub collection_method: Option<String>,
    pub frequency: Frequency,
    pub category: IndicatorCategory,
    pub weight: f64,
    pub is_mandatory: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl PerformanceIndicator {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            instansi_id: row.get("instansi_id")?,
            program_id: row.get("program_id")?,
            kegiatan_id: row.get("kegiatan_id")?,
            code: row.get("code")?,
            name: row.get("name")?,
            description: row.get("description")?,
            measurement_unit: row.get("measurement_unit")?,
            data_source: row.get("data_source")?,
            collection_method: row.get("collection_method")?,
            frequency: enum_col(row, "frequency")?,
            category: enum_col(row, "category")?,
            weight: row.get("weight")?,
            is_mandatory: row.get::<_, i64>("is_mandatory")? == 1,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndicatorInput {
    pub instansi_id: Option<i64>,
    pub program_id: Option<i64>,
    pub kegiatan_id: Option<i64>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub measurement_unit: Option<String>,
    pub data_source: Option<String>,
    pub collection_method: Option<String>,
    pub frequency: Option<Frequency>,
    pub category: Option<IndicatorCategory>,
    pub weight: Option<f64>,
    pub is_mandatory: Option<bool>,
}
