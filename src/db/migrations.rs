use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::schema::SCHEMA_SQL;

/// The reserved legacy owner assigned to rows rewritten from a pre-isolation
/// database. Also the id the first admin account is expected to occupy
/// in a from-scratch database (see `cmd::create_admin`).
pub const LEGACY_OWNER_ID: i64 = 1;

/// The global stock-sheet catalogue, hard-coded rather than owner-scoped:
/// `(name, width_mm, height_mm, thickness_mm, price_per_sqm, in_stock, material)`.
const DEFAULT_STOCK_SHEETS: &[(&str, f64, f64, f64, f64, i64, &str)] = &[
    ("Float 3210x2250 (4mm)", 3210.0, 2250.0, 4.0, 18.50, 40, "float"),
    ("Float 3210x2250 (6mm)", 3210.0, 2250.0, 6.0, 24.75, 30, "float"),
    ("Float 2550x1830 (4mm)", 2550.0, 1830.0, 4.0, 18.50, 60, "float"),
    ("Float 2550x1830 (6mm)", 2550.0, 1830.0, 6.0, 24.75, 50, "float"),
    ("Low-iron 3210x2250 (6mm)", 3210.0, 2250.0, 6.0, 39.00, 15, "low-iron"),
    ("Tempered 2440x1830 (5mm)", 2440.0, 1830.0, 5.0, 32.00, 20, "tempered"),
];

/// Runs schema setup or migrations against `conn`, depending on whether the
/// store is empty or pre-existing. Each migration is idempotent: it checks for
/// the presence/absence of a specific table or column before acting, so running
/// this function against an already-migrated database is a no-op.
pub fn run(conn: &mut Connection) -> rusqlite::Result<()> {
    if !table_exists(conn, "users")? {
        info!("empty database detected, applying full schema");
        conn.execute_batch(SCHEMA_SQL)?;
        seed_stock_sheets(conn)?;
        return Ok(());
    }

    info!("existing database detected, running migrations");
    migrate_add_owner_column(conn, "projects")?;
    migrate_add_owner_column(conn, "designs")?;
    migrate_add_owner_column(conn, "optimizations")?;
    migrate_add_owner_column(conn, "sessions")?;
    add_legacy_designs_column(conn)?;
    seed_stock_sheets(conn)?;

    Ok(())
}

/// Populates the shared stock-sheet catalogue if it's empty. Runs on every
/// startup, not just fresh databases, so a store that predates this catalogue
/// still ends up with it.
fn seed_stock_sheets(conn: &Connection) -> rusqlite::Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM stock_sheets", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    info!("seeding default stock-sheet catalogue");
    let now = chrono::Utc::now().to_rfc3339();
    for (name, width_mm, height_mm, thickness_mm, price_per_sqm, in_stock, material) in DEFAULT_STOCK_SHEETS {
        conn.execute(
            "INSERT INTO stock_sheets (name, width_mm, height_mm, thickness_mm, price_per_sqm, in_stock, \
             material, properties_json, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, '{}', ?8, ?8)",
            params![name, width_mm, height_mm, thickness_mm, price_per_sqm, in_stock, material, now],
        )?;
    }

    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let found = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|r| r.ok())
        .any(|name| name == column);
    Ok(found)
}

/// Rewrites `table` to add an `owner_id` column when it is missing, assigning
/// every existing row to `LEGACY_OWNER_ID`. SQLite's `ALTER TABLE ADD COLUMN`
/// cannot add a `NOT NULL` column with a foreign key in one step on an
/// already-populated table in a way that preserves the constraint, so this
/// follows a four-step rewrite: create `<t>_new`, copy rows (assigning the
/// owner), drop `<t>`, rename `<t>_new` to `<t>`.
fn migrate_add_owner_column(conn: &mut Connection, table: &str) -> rusqlite::Result<()> {
    if !table_exists(conn, table)? || column_exists(conn, table, "owner_id")? {
        return Ok(());
    }

    info!(table, "rewriting legacy table to add owner_id column");

    let tx = conn.transaction()?;

    let existing_columns: Vec<String> = {
        let mut stmt = tx.prepare(&format!("PRAGMA table_info({table})"))?;
        stmt.query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?
    };

    let new_table = format!("{table}_new");
    let create_new = create_statement_with_owner(table, &new_table);
    tx.execute_batch(&create_new)?;

    let column_list = existing_columns.join(", ");
    tx.execute(
        &format!(
            "INSERT INTO {new_table} (owner_id, {column_list}) \
             SELECT {legacy_owner}, {column_list} FROM {table}",
            new_table = new_table,
            column_list = column_list,
            legacy_owner = LEGACY_OWNER_ID,
            table = table,
        ),
        [],
    )?;

    tx.execute(&format!("DROP TABLE {table}"), [])?;
    tx.execute(&format!("ALTER TABLE {new_table} RENAME TO {table}"), [])?;
    recreate_indexes(&tx, table)?;

    tx.commit()
}

/// Returns the `CREATE TABLE` statement (plus its indexes) for the canonical
/// shape of `table`, targeting `new_name` instead of the original name. Only
/// the tables this migration is ever asked to rewrite need an entry here.
fn create_statement_with_owner(table: &str, new_name: &str) -> String {
    let body = match table {
        "projects" => {
            "id INTEGER PRIMARY KEY, owner_id INTEGER NOT NULL REFERENCES users(id), \
             name TEXT NOT NULL, description TEXT NOT NULL DEFAULT '', \
             parent_id INTEGER REFERENCES projects(id) ON DELETE CASCADE, \
             path TEXT NOT NULL, legacy_designs_json TEXT, \
             created_at TEXT NOT NULL, updated_at TEXT NOT NULL"
        }
        "designs" => {
            "id INTEGER PRIMARY KEY, owner_id INTEGER NOT NULL REFERENCES users(id), \
             project_id INTEGER REFERENCES projects(id) ON DELETE SET NULL, \
             name TEXT NOT NULL, description TEXT NOT NULL DEFAULT '', \
             width_mm REAL NOT NULL, height_mm REAL NOT NULL, thickness_mm REAL NOT NULL, \
             elements_json TEXT NOT NULL, \
             created_at TEXT NOT NULL, updated_at TEXT NOT NULL"
        }
        "optimizations" => {
            "id INTEGER PRIMARY KEY, owner_id INTEGER NOT NULL REFERENCES users(id), \
             project_id INTEGER REFERENCES projects(id) ON DELETE SET NULL, \
             name TEXT NOT NULL, sheet_id INTEGER NOT NULL REFERENCES stock_sheets(id), \
             design_items_json TEXT NOT NULL, algorithm TEXT NOT NULL, \
             options_json TEXT NOT NULL, layout_json TEXT NOT NULL, \
             total_area_mm2 REAL NOT NULL, used_area_mm2 REAL NOT NULL, \
             waste_pct REAL NOT NULL, total_cost REAL NOT NULL, execution_ms INTEGER NOT NULL, \
             created_at TEXT NOT NULL, updated_at TEXT NOT NULL"
        }
        "sessions" => {
            "id INTEGER PRIMARY KEY, owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE, \
             session_id TEXT NOT NULL UNIQUE, expires_at TEXT NOT NULL, \
             source_address TEXT, user_agent TEXT, \
             created_at TEXT NOT NULL, last_access_at TEXT NOT NULL"
        }
        other => unreachable!("no owner-column rewrite is defined for table {other}"),
    };

    format!("CREATE TABLE {new_name} ({body})")
}

fn recreate_indexes(conn: &Connection, table: &str) -> rusqlite::Result<()> {
    let statements: &[&str] = match table {
        "projects" => &[
            "CREATE INDEX idx_projects_owner ON projects(owner_id)",
            "CREATE INDEX idx_projects_parent ON projects(parent_id)",
            "CREATE INDEX idx_projects_path ON projects(path)",
        ],
        "designs" => &[
            "CREATE INDEX idx_designs_owner ON designs(owner_id)",
            "CREATE INDEX idx_designs_project ON designs(project_id)",
        ],
        "optimizations" => &[
            "CREATE INDEX idx_optimizations_owner ON optimizations(owner_id)",
            "CREATE INDEX idx_optimizations_project ON optimizations(project_id)",
        ],
        "sessions" => &["CREATE INDEX idx_sessions_owner ON sessions(owner_id)"],
        _ => &[],
    };

    for stmt in statements {
        conn.execute(stmt, [])?;
    }
    Ok(())
}

/// Additive column migration: the engine supports in-place `ADD COLUMN` for a
/// nullable column with no foreign key, so this uses that instead of a
/// table rewrite.
fn add_legacy_designs_column(conn: &Connection) -> rusqlite::Result<()> {
    if table_exists(conn, "projects")? && !column_exists(conn, "projects", "legacy_designs_json")?
    {
        conn.execute("ALTER TABLE projects ADD COLUMN legacy_designs_json TEXT", [])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_full_schema_to_empty_database() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();
        assert!(table_exists(&conn, "users").unwrap());
        assert!(column_exists(&conn, "designs", "owner_id").unwrap());
    }

    #[test]
    fn rewrites_legacy_table_missing_owner_column() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL UNIQUE, \
             password_hash TEXT NOT NULL, given_name TEXT NOT NULL, family_name TEXT NOT NULL, \
             verified INTEGER NOT NULL DEFAULT 0, verification_token TEXT, reset_token TEXT, \
             reset_token_expires_at TEXT, last_login_at TEXT, failed_login_count INTEGER NOT NULL DEFAULT 0, \
             lock_until TEXT, created_at TEXT NOT NULL, updated_at TEXT NOT NULL);
             CREATE TABLE stock_sheets (id INTEGER PRIMARY KEY, name TEXT NOT NULL, \
             width_mm REAL NOT NULL, height_mm REAL NOT NULL, thickness_mm REAL NOT NULL, \
             price_per_sqm REAL NOT NULL, in_stock INTEGER NOT NULL DEFAULT 0, material TEXT, \
             supplier TEXT, grade TEXT, properties_json TEXT NOT NULL DEFAULT '{}', \
             created_at TEXT NOT NULL, updated_at TEXT NOT NULL);
             CREATE TABLE projects (id INTEGER PRIMARY KEY, name TEXT NOT NULL, \
             description TEXT NOT NULL DEFAULT '', parent_id INTEGER, path TEXT NOT NULL, \
             created_at TEXT NOT NULL, updated_at TEXT NOT NULL);
             INSERT INTO projects (id, name, description, parent_id, path, created_at, updated_at) \
             VALUES (1, 'Legacy', '', NULL, '/Legacy', '2020-01-01T00:00:00Z', '2020-01-01T00:00:00Z');",
        )
        .unwrap();

        run(&mut conn).unwrap();

        assert!(column_exists(&conn, "projects", "owner_id").unwrap());
        let owner: i64 = conn
            .query_row("SELECT owner_id FROM projects WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(owner, LEGACY_OWNER_ID);
    }
}
