// src/export/logic.rs

use crate::config::Config;
use crate::core::assessment::AssessmentLogic;
use crate::core::dashboard::{DashboardLogic, achievement_percentage, performance_status};
use crate::core::indicator::IndicatorLogic;
use crate::core::instansi::InstansiLogic;
use crate::core::kegiatan::KegiatanLogic;
use crate::core::program::ProgramLogic;
use crate::core::target::TargetLogic;
use crate::db::queries::performance::{self as perf, DataFilter};
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::model::{Dataset, num, opt};
use crate::export::range::PeriodRange;
use crate::export::{ExportFormat, write_dataset};
use crate::models::status::{DbEnum, ReportType};
use crate::ui::messages::{info, success, warning};
use crate::utils::date::current_year;
use clap::ValueEnum;
use rusqlite::Connection;
use std::path::Path;

/// What to export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    Instansi,
    Programs,
    Kegiatan,
    Indicators,
    Targets,
    PerformanceData,
    Assessments,
    PerformanceSummary,
    AchievementTrends,
    ComplianceStatus,
    IndicatorComparison,
}

impl From<ReportType> for ExportKind {
    fn from(t: ReportType) -> Self {
        match t {
            ReportType::PerformanceSummary => ExportKind::PerformanceSummary,
            ReportType::AchievementTrends => ExportKind::AchievementTrends,
            ReportType::ComplianceStatus => ExportKind::ComplianceStatus,
            ReportType::IndicatorComparison => ExportKind::IndicatorComparison,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExportFilter {
    pub year: Option<i32>,
    pub instansi_id: Option<i64>,
    pub period: Option<PeriodRange>,
}

impl ExportFilter {
    fn year_or_current(&self) -> i32 {
        self.year.unwrap_or_else(current_year)
    }
}

pub struct ExportLogic;

impl ExportLogic {
    /// CLI export: absolute path only, overwrite guarded unless `force`.
    pub fn export(
        conn: &Connection,
        cfg: &Config,
        kind: ExportKind,
        format: ExportFormat,
        file: &str,
        filter: &ExportFilter,
        force: bool,
    ) -> AppResult<()> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "Output file path must be absolute: {file}"
            )));
        }

        ensure_writable(path, force)?;

        let dataset = Self::dataset(conn, cfg, kind, filter)?;
        if dataset.is_empty() {
            warning("No rows found for the selected filters.");
            return Ok(());
        }

        info(format!(
            "Exporting {} row(s) to {}: {}",
            dataset.rows.len(),
            format.as_str().to_uppercase(),
            path.display()
        ));
        write_dataset(&dataset, format, path, &cfg.institution_name)?;
        success(format!(
            "{} export completed: {}",
            format.as_str().to_uppercase(),
            path.display()
        ));
        Ok(())
    }

    /// Build the table for `kind`.
    pub fn dataset(
        conn: &Connection,
        cfg: &Config,
        kind: ExportKind,
        filter: &ExportFilter,
    ) -> AppResult<Dataset> {
        match kind {
            ExportKind::Instansi => instansi(conn),
            ExportKind::Programs => programs(conn, filter),
            ExportKind::Kegiatan => kegiatan(conn),
            ExportKind::Indicators => indicators(conn, filter),
            ExportKind::Targets => targets(conn, filter),
            ExportKind::PerformanceData => performance_data(conn, filter),
            ExportKind::Assessments => assessments(conn, cfg),
            ExportKind::PerformanceSummary => summary(conn, filter),
            ExportKind::AchievementTrends => trends(conn, filter),
            ExportKind::ComplianceStatus => compliance(conn, filter),
            ExportKind::IndicatorComparison => comparison(conn, filter),
        }
    }
}

fn instansi(conn: &Connection) -> AppResult<Dataset> {
    let mut ds = Dataset::new(
        "Instansi",
        &["id", "kode", "nama", "kepala", "nip_kepala", "email", "telepon", "status"],
    );
    for i in InstansiLogic::list(conn)? {
        ds.push(vec![
            i.id.to_string(),
            i.kode_instansi,
            i.nama_instansi,
            opt(&i.kepala_instansi),
            opt(&i.nip_kepala),
            opt(&i.email),
            opt(&i.telepon),
            i.status.to_db_str().into(),
        ]);
    }
    Ok(ds)
}

fn programs(conn: &Connection, f: &ExportFilter) -> AppResult<Dataset> {
    let mut ds = Dataset::new(
        "Programs",
        &["id", "kode", "nama", "instansi_id", "tahun", "anggaran", "status"],
    );
    for p in ProgramLogic::list(conn, f.instansi_id, f.year)? {
        ds.push(vec![
            p.id.to_string(),
            p.kode_program,
            p.nama_program,
            p.instansi_id.to_string(),
            p.tahun.to_string(),
            num(p.anggaran),
            p.status.to_db_str().into(),
        ]);
    }
    Ok(ds)
}

fn kegiatan(conn: &Connection) -> AppResult<Dataset> {
    let mut ds = Dataset::new(
        "Kegiatan",
        &[
            "id",
            "kode",
            "nama",
            "program_id",
            "tanggal_mulai",
            "tanggal_selesai",
            "penanggung_jawab",
            "anggaran",
            "status",
        ],
    );
    for k in KegiatanLogic::list(conn, None)? {
        ds.push(vec![
            k.id.to_string(),
            k.kode_kegiatan,
            k.nama_kegiatan,
            k.program_id.to_string(),
            opt(&k.tanggal_mulai),
            opt(&k.tanggal_selesai),
            opt(&k.penanggung_jawab),
            num(k.anggaran),
            k.status.to_db_str().into(),
        ]);
    }
    Ok(ds)
}

fn indicators(conn: &Connection, f: &ExportFilter) -> AppResult<Dataset> {
    let mut ds = Dataset::new(
        "Performance indicators",
        &[
            "id",
            "code",
            "name",
            "category",
            "frequency",
            "unit",
            "weight",
            "mandatory",
            "instansi_id",
        ],
    );
    for i in IndicatorLogic::list(conn, f.instansi_id, None)? {
        ds.push(vec![
            i.id.to_string(),
            i.code,
            i.name,
            i.category.to_db_str().into(),
            i.frequency.to_db_str().into(),
            i.measurement_unit,
            num(i.weight),
            if i.is_mandatory { "yes" } else { "no" }.into(),
            i.instansi_id.to_string(),
        ]);
    }
    Ok(ds)
}

fn targets(conn: &Connection, f: &ExportFilter) -> AppResult<Dataset> {
    let mut ds = Dataset::new(
        "Targets",
        &["id", "indicator_id", "year", "target_value", "minimum_value", "status"],
    );
    for t in TargetLogic::list(conn, None, f.year)? {
        ds.push(vec![
            t.id.to_string(),
            t.indicator_id.to_string(),
            t.year.to_string(),
            num(t.target_value),
            t.minimum_value.map(num).unwrap_or_default(),
            t.status.to_db_str().into(),
        ]);
    }
    Ok(ds)
}

fn performance_data(conn: &Connection, f: &ExportFilter) -> AppResult<Dataset> {
    let prefix = f.year.map(|y| y.to_string());
    let filter = DataFilter {
        instansi_id: f.instansi_id,
        indicator_id: None,
        status: None,
        period_prefix: prefix.as_deref(),
    };

    let mut ds = Dataset::new(
        "Performance data",
        &[
            "id",
            "period",
            "indicator_code",
            "indicator",
            "instansi",
            "actual_value",
            "target_value",
            "achievement_pct",
            "status",
            "submitted_at",
        ],
    );
    for p in perf::points(conn, &filter, None)? {
        if let Some(range) = &f.period
            && !range.contains(&p.period)
        {
            continue;
        }
        let pct = achievement_percentage(p.actual_value, p.target_value);
        ds.push(vec![
            p.data_id.to_string(),
            p.period,
            p.indicator_code,
            p.indicator_name,
            p.instansi_name,
            num(p.actual_value),
            p.target_value.map(num).unwrap_or_default(),
            num(pct),
            p.status,
            opt(&p.submitted_at),
        ]);
    }
    Ok(ds)
}

fn assessments(conn: &Connection, cfg: &Config) -> AppResult<Dataset> {
    let mut ds = Dataset::new(
        "Assessments",
        &[
            "id",
            "performance_data_id",
            "score",
            "grade",
            "status",
            "assessed_at",
            "approved_at",
        ],
    );
    for a in AssessmentLogic::list(conn, cfg, None)? {
        ds.push(vec![
            a.id.to_string(),
            a.performance_data_id.to_string(),
            a.overall_score.map(num).unwrap_or_default(),
            opt(&a.grade),
            a.status.to_db_str().into(),
            opt(&a.assessed_at),
            opt(&a.approved_at),
        ]);
    }
    Ok(ds)
}

fn summary(conn: &Connection, f: &ExportFilter) -> AppResult<Dataset> {
    let year = f.year_or_current();
    let s = DashboardLogic::performance_summary(conn, f.instansi_id, year)?;

    let mut ds = Dataset::new(
        format!("Performance summary {year}"),
        &["section", "name", "total", "achieved", "average_achievement"],
    );
    ds.push(vec![
        "overall".into(),
        format!(
            "{} achieved / {} partial / {} not achieved",
            s.achieved_indicators, s.partially_achieved, s.not_achieved
        ),
        s.total_indicators.to_string(),
        s.achieved_indicators.to_string(),
        num(s.average_achievement),
    ]);
    for (section, rows) in [
        ("category", &s.category_breakdown),
        ("instansi", &s.instansi_breakdown),
    ] {
        for b in rows {
            ds.push(vec![
                section.into(),
                b.name.clone(),
                b.total.to_string(),
                num(b.achieved),
                num(b.average_achievement),
            ]);
        }
    }
    Ok(ds)
}

fn trends(conn: &Connection, f: &ExportFilter) -> AppResult<Dataset> {
    let mut ds = Dataset::new(
        "Achievement trends",
        &["period", "indicator", "actual_value", "target_value", "achievement_pct", "status"],
    );
    for t in DashboardLogic::achievement_trends(conn, f.instansi_id, None, 12)? {
        ds.push(vec![
            t.period,
            t.indicator_name,
            num(t.actual_value),
            num(t.target_value),
            num(t.achievement_percentage),
            t.status,
        ]);
    }
    Ok(ds)
}

fn compliance(conn: &Connection, f: &ExportFilter) -> AppResult<Dataset> {
    let year = f.year_or_current();
    let c = DashboardLogic::compliance_status(conn, f.instansi_id, year)?;

    let mut ds = Dataset::new(format!("Compliance status {year}"), &["metric", "value"]);
    let m = &c.mandatory_compliance;
    for (metric, value) in [
        ("total_indicators", c.total_indicators.to_string()),
        ("submitted_data", c.submitted_data.to_string()),
        ("validated_data", c.validated_data.to_string()),
        ("submission_rate", num(c.submission_rate)),
        ("validation_rate", num(c.validation_rate)),
        ("mandatory_indicators", m.mandatory_indicators.to_string()),
        ("mandatory_compliant_data", m.compliant_data.to_string()),
        ("mandatory_compliance_rate", num(m.compliance_rate)),
    ] {
        ds.push(vec![metric.into(), value]);
    }
    Ok(ds)
}

fn comparison(conn: &Connection, f: &ExportFilter) -> AppResult<Dataset> {
    let year = f.year_or_current();
    let mut ds = Dataset::new(
        format!("Indicator comparison {year}"),
        &[
            "code",
            "indicator",
            "category",
            "instansi",
            "period",
            "actual_value",
            "target_value",
            "achievement_pct",
            "status",
            "weight",
        ],
    );
    for a in DashboardLogic::indicator_comparison(conn, f.instansi_id, year, None)? {
        ds.push(vec![
            a.indicator_code,
            a.indicator_name,
            a.category,
            a.instansi_name,
            a.period,
            num(a.actual_value),
            num(a.target_value),
            num(a.achievement_percentage),
            performance_status(a.achievement_percentage).into(),
            num(a.weight),
        ]);
    }
    Ok(ds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::performance::PerformanceLogic;
    use crate::db::pool::DbPool;
    use crate::export::range::parse_period_range;
    use crate::models::indicator::IndicatorInput;
    use crate::models::instansi::InstansiInput;
    use crate::models::performance_data::PerformanceDataInput;
    use crate::models::target::TargetInput;

    fn seeded() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();
        let conn = &pool.conn;
        let inst = InstansiLogic::create(
            conn,
            InstansiInput {
                kode_instansi: Some("BAPPEDA".into()),
                nama_instansi: Some("Badan Perencanaan".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let ind = IndicatorLogic::create(
            conn,
            IndicatorInput {
                instansi_id: Some(inst.id),
                code: Some("IKU-07".into()),
                name: Some("Dokumen perencanaan tepat waktu".into()),
                measurement_unit: Some("dokumen".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let target = TargetLogic::create(
            conn,
            TargetInput {
                indicator_id: Some(ind.id),
                year: Some(2025),
                target_value: Some(40.0),
                ..Default::default()
            },
        )
        .unwrap();
        TargetLogic::approve(conn, target.id).unwrap();

        for (period, value) in [("2025-01", 10.0), ("2025-06", 30.0)] {
            let row = PerformanceLogic::create(
                conn,
                PerformanceDataInput {
                    indicator_id: Some(ind.id),
                    instansi_id: Some(inst.id),
                    period: Some(period.into()),
                    actual_value: Some(value),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
            PerformanceLogic::submit(conn, row.id, None).unwrap();
            PerformanceLogic::validate(conn, row.id).unwrap();
        }
        pool
    }

    #[test]
    fn performance_data_honours_the_period_range() {
        let pool = seeded();
        let cfg = Config::default();

        let all = ExportLogic::dataset(
            &pool.conn,
            &cfg,
            ExportKind::PerformanceData,
            &ExportFilter::default(),
        )
        .unwrap();
        assert_eq!(all.rows.len(), 2);

        let filter = ExportFilter {
            period: Some(parse_period_range("2025-05:2025-12").unwrap()),
            ..Default::default()
        };
        let ds = ExportLogic::dataset(&pool.conn, &cfg, ExportKind::PerformanceData, &filter)
            .unwrap();
        assert_eq!(ds.rows.len(), 1);
        assert_eq!(ds.rows[0][1], "2025-06");
        assert_eq!(ds.rows[0][7], "75");
    }

    #[test]
    fn compliance_lists_every_metric() {
        let pool = seeded();
        let filter = ExportFilter {
            year: Some(2025),
            ..Default::default()
        };
        let ds = ExportLogic::dataset(
            &pool.conn,
            &Config::default(),
            ExportKind::ComplianceStatus,
            &filter,
        )
        .unwrap();

        let metric = |name: &str| {
            ds.rows
                .iter()
                .find(|r| r[0] == name)
                .map(|r| r[1].clone())
                .unwrap()
        };
        assert_eq!(metric("validated_data"), "2");
        assert_eq!(metric("validation_rate"), "100");
    }

    #[test]
    fn relative_paths_are_refused() {
        let pool = seeded();
        let err = ExportLogic::export(
            &pool.conn,
            &Config::default(),
            ExportKind::Indicators,
            ExportFormat::Csv,
            "out.csv",
            &ExportFilter::default(),
            true,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Export error: Output file path must be absolute: out.csv");
    }
}
