/// Canonical schema for a from-scratch database. Applied verbatim when the
/// migration runner detects an empty store (no `users` table).
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE users (
    id                  INTEGER PRIMARY KEY,
    email               TEXT NOT NULL UNIQUE,
    password_hash       TEXT NOT NULL,
    given_name          TEXT NOT NULL,
    family_name         TEXT NOT NULL,
    verified            INTEGER NOT NULL DEFAULT 0,
    verification_token  TEXT,
    reset_token         TEXT,
    reset_token_expires_at TEXT,
    last_login_at       TEXT,
    failed_login_count  INTEGER NOT NULL DEFAULT 0,
    lock_until          TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE TABLE stock_sheets (
    id              INTEGER PRIMARY KEY,
    name            TEXT NOT NULL,
    width_mm        REAL NOT NULL,
    height_mm       REAL NOT NULL,
    thickness_mm    REAL NOT NULL,
    price_per_sqm   REAL NOT NULL,
    in_stock        INTEGER NOT NULL DEFAULT 0,
    material        TEXT,
    supplier        TEXT,
    grade           TEXT,
    properties_json TEXT NOT NULL DEFAULT '{}',
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE sessions (
    id              INTEGER PRIMARY KEY,
    owner_id        INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    session_id      TEXT NOT NULL UNIQUE,
    expires_at      TEXT NOT NULL,
    source_address  TEXT,
    user_agent      TEXT,
    created_at      TEXT NOT NULL,
    last_access_at  TEXT NOT NULL
);
CREATE INDEX idx_sessions_owner ON sessions(owner_id);

CREATE TABLE projects (
    id              INTEGER PRIMARY KEY,
    owner_id        INTEGER NOT NULL REFERENCES users(id),
    name            TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    parent_id       INTEGER REFERENCES projects(id) ON DELETE CASCADE,
    path            TEXT NOT NULL,
    legacy_designs_json TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX idx_projects_owner ON projects(owner_id);
CREATE INDEX idx_projects_parent ON projects(parent_id);
CREATE INDEX idx_projects_path ON projects(path);

CREATE TABLE designs (
    id              INTEGER PRIMARY KEY,
    owner_id        INTEGER NOT NULL REFERENCES users(id),
    project_id      INTEGER REFERENCES projects(id) ON DELETE SET NULL,
    name            TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    width_mm        REAL NOT NULL,
    height_mm       REAL NOT NULL,
    thickness_mm    REAL NOT NULL,
    elements_json   TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX idx_designs_owner ON designs(owner_id);
CREATE INDEX idx_designs_project ON designs(project_id);

CREATE TABLE optimizations (
    id                  INTEGER PRIMARY KEY,
    owner_id            INTEGER NOT NULL REFERENCES users(id),
    project_id          INTEGER REFERENCES projects(id) ON DELETE SET NULL,
    name                TEXT NOT NULL,
    sheet_id            INTEGER NOT NULL REFERENCES stock_sheets(id),
    design_items_json    TEXT NOT NULL,
    algorithm           TEXT NOT NULL,
    options_json        TEXT NOT NULL,
    layout_json         TEXT NOT NULL,
    total_area_mm2      REAL NOT NULL,
    used_area_mm2       REAL NOT NULL,
    waste_pct           REAL NOT NULL,
    total_cost          REAL NOT NULL,
    execution_ms        INTEGER NOT NULL,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);
CREATE INDEX idx_optimizations_owner ON optimizations(owner_id);
CREATE INDEX idx_optimizations_project ON optimizations(project_id);
"#;
