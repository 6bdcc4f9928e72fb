use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension};

/// A schema step, applied once and recorded in `log` as `migration_applied`.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250805_0001_instansi_and_access_control",
        description: "Created instansi, users, roles, permissions and api_tokens",
        sql: r#"
        CREATE TABLE IF NOT EXISTS instansi (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            kode_instansi    TEXT NOT NULL UNIQUE,
            nama_instansi    TEXT NOT NULL,
            alamat           TEXT,
            telepon          TEXT,
            email            TEXT,
            website          TEXT,
            kepala_instansi  TEXT,
            nip_kepala       TEXT,
            status           TEXT NOT NULL DEFAULT 'aktif' CHECK(status IN ('aktif','nonaktif')),
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            name           TEXT NOT NULL,
            email          TEXT NOT NULL UNIQUE,
            password_hash  TEXT NOT NULL,
            instansi_id    INTEGER REFERENCES instansi(id) ON DELETE RESTRICT,
            is_active      INTEGER NOT NULL DEFAULT 1,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS roles (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL UNIQUE,
            display_name  TEXT NOT NULL,
            description   TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS permissions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL UNIQUE,
            display_name  TEXT NOT NULL,
            module        TEXT NOT NULL DEFAULT 'sakip',
            description   TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS role_user (
            role_id  INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            user_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (role_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS permission_role (
            permission_id  INTEGER NOT NULL REFERENCES permissions(id) ON DELETE CASCADE,
            role_id        INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            PRIMARY KEY (permission_id, role_id)
        );

        CREATE TABLE IF NOT EXISTS permission_user (
            permission_id  INTEGER NOT NULL REFERENCES permissions(id) ON DELETE CASCADE,
            user_id        INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (permission_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS api_tokens (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name          TEXT NOT NULL,
            token_hash    TEXT NOT NULL UNIQUE,
            created_at    TEXT NOT NULL,
            last_used_at  TEXT
        );
        "#,
    },
    Migration {
        version: "20251014_0002_performance_tables",
        description: "Created programs, kegiatan, indicators, targets, performance data, assessments and reports",
        sql: r#"
        CREATE TABLE IF NOT EXISTS programs (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            instansi_id   INTEGER NOT NULL REFERENCES instansi(id) ON DELETE RESTRICT,
            kode_program  TEXT NOT NULL UNIQUE,
            nama_program  TEXT NOT NULL,
            deskripsi     TEXT,
            anggaran      REAL NOT NULL DEFAULT 0,
            tahun         INTEGER NOT NULL,
            status        TEXT NOT NULL DEFAULT 'draft' CHECK(status IN ('draft','aktif','selesai')),
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_programs_instansi_tahun ON programs(instansi_id, tahun);

        CREATE TABLE IF NOT EXISTS kegiatan (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            program_id        INTEGER NOT NULL REFERENCES programs(id) ON DELETE RESTRICT,
            kode_kegiatan     TEXT NOT NULL UNIQUE,
            nama_kegiatan     TEXT NOT NULL,
            deskripsi         TEXT,
            anggaran          REAL NOT NULL DEFAULT 0,
            tanggal_mulai     TEXT,
            tanggal_selesai   TEXT,
            penanggung_jawab  TEXT,
            status            TEXT NOT NULL DEFAULT 'draft' CHECK(status IN ('draft','berjalan','selesai','tunda')),
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS performance_indicators (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            instansi_id        INTEGER NOT NULL REFERENCES instansi(id) ON DELETE RESTRICT,
            program_id         INTEGER REFERENCES programs(id) ON DELETE RESTRICT,
            kegiatan_id        INTEGER REFERENCES kegiatan(id) ON DELETE RESTRICT,
            code               TEXT NOT NULL UNIQUE,
            name               TEXT NOT NULL,
            description        TEXT,
            measurement_unit   TEXT NOT NULL,
            data_source        TEXT,
            collection_method  TEXT,
            frequency          TEXT NOT NULL DEFAULT 'annual' CHECK(frequency IN ('monthly','quarterly','semester','annual')),
            category           TEXT NOT NULL DEFAULT 'output' CHECK(category IN ('input','output','outcome','impact')),
            weight             REAL NOT NULL DEFAULT 1.0,
            is_mandatory       INTEGER NOT NULL DEFAULT 0,
            created_at         TEXT NOT NULL,
            updated_at         TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_indicators_instansi ON performance_indicators(instansi_id);

        CREATE TABLE IF NOT EXISTS targets (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            indicator_id   INTEGER NOT NULL REFERENCES performance_indicators(id) ON DELETE RESTRICT,
            year           INTEGER NOT NULL,
            target_value   REAL NOT NULL,
            minimum_value  REAL,
            justification  TEXT,
            status         TEXT NOT NULL DEFAULT 'draft' CHECK(status IN ('draft','approved','rejected','revised')),
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL,
            UNIQUE (indicator_id, year)
        );

        CREATE TABLE IF NOT EXISTS performance_data (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            indicator_id      INTEGER NOT NULL REFERENCES performance_indicators(id) ON DELETE RESTRICT,
            instansi_id       INTEGER NOT NULL REFERENCES instansi(id) ON DELETE RESTRICT,
            submitted_by      INTEGER REFERENCES users(id) ON DELETE SET NULL,
            period            TEXT NOT NULL,
            actual_value      REAL NOT NULL,
            notes             TEXT,
            status            TEXT NOT NULL DEFAULT 'draft' CHECK(status IN ('draft','submitted','validated','rejected')),
            data_quality      TEXT CHECK(data_quality IN ('excellent','good','fair','poor')),
            rejection_reason  TEXT,
            submitted_at      TEXT,
            validated_at      TEXT,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL,
            UNIQUE (indicator_id, instansi_id, period)
        );
        CREATE INDEX IF NOT EXISTS idx_performance_data_period ON performance_data(period, status);

        CREATE TABLE IF NOT EXISTS assessments (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            performance_data_id  INTEGER NOT NULL UNIQUE REFERENCES performance_data(id) ON DELETE RESTRICT,
            assessed_by          INTEGER REFERENCES users(id) ON DELETE SET NULL,
            overall_score        REAL,
            comments             TEXT,
            recommendations      TEXT,
            status               TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending','in_review','completed','approved')),
            assessed_at          TEXT,
            approved_at          TEXT,
            created_at           TEXT NOT NULL,
            updated_at           TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS reports (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            instansi_id   INTEGER REFERENCES instansi(id) ON DELETE RESTRICT,
            generated_by  INTEGER REFERENCES users(id) ON DELETE SET NULL,
            report_type   TEXT NOT NULL,
            format        TEXT NOT NULL,
            period        TEXT NOT NULL,
            file_path     TEXT,
            parameters    TEXT NOT NULL DEFAULT '{}',
            status        TEXT NOT NULL DEFAULT 'generating' CHECK(status IN ('generating','completed','failed','submitted')),
            generated_at  TEXT,
            submitted_at  TEXT,
            created_at    TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20251029_0003_evidence_documents",
        description: "Created evidence_documents",
        sql: r#"
        CREATE TABLE IF NOT EXISTS evidence_documents (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            performance_data_id  INTEGER NOT NULL REFERENCES performance_data(id) ON DELETE CASCADE,
            file_name            TEXT NOT NULL,
            file_path            TEXT NOT NULL,
            file_type            TEXT NOT NULL,
            file_size            INTEGER NOT NULL,
            sha256               TEXT NOT NULL,
            description          TEXT,
            uploaded_by          INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created_at           TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_evidence_data ON evidence_documents(performance_data_id);
        "#,
    },
];

/// Ensure that the `log` table exists: it also records applied migrations.
fn ensure_log_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )
}

fn is_applied(conn: &Connection, version: &str) -> rusqlite::Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;

    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;

    tx.commit()?;
    Ok(())
}

/// Versions not yet applied, in order.
pub fn pending_versions(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut out = Vec::new();
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            out.push(m.version);
        }
    }
    Ok(out)
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        success(format!("Migration applied: {} → {}", m.version, m.description));
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::DbPool;

    #[test]
    fn migrations_are_applied_once() {
        let pool = DbPool::in_memory().unwrap();
        assert_eq!(run_pending_migrations(&pool.conn).unwrap(), MIGRATIONS.len());
        assert_eq!(run_pending_migrations(&pool.conn).unwrap(), 0);
        assert!(pending_versions(&pool.conn).unwrap().is_empty());

        let recorded: i64 = pool
            .conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(recorded as usize, MIGRATIONS.len());
    }
}
