use rusqlite::Connection;

use crate::StoreError;

const TABLE_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS project (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS analysis_run (
        id INTEGER PRIMARY KEY,
        project_id INTEGER NOT NULL,
        started_at TEXT NOT NULL,
        completed_at TEXT,
        status TEXT NOT NULL,
        total_files INTEGER,
        total_classes INTEGER,
        total_edges INTEGER,
        error_message TEXT,
        FOREIGN KEY(project_id) REFERENCES project(id)
    )",
    "CREATE TABLE IF NOT EXISTS component_metrics (
        id INTEGER PRIMARY KEY,
        run_id INTEGER NOT NULL,
        component_name TEXT NOT NULL,
        component_type TEXT NOT NULL DEFAULT 'class',
        in_degree INTEGER DEFAULT 0,
        out_degree INTEGER DEFAULT 0,
        weighted_in INTEGER DEFAULT 0,
        weighted_out INTEGER DEFAULT 0,
        betweenness REAL DEFAULT 0.0,
        closeness REAL DEFAULT 0.0,
        scc_id INTEGER DEFAULT 0,
        scc_size INTEGER DEFAULT 0,
        blast_radius INTEGER DEFAULT 0,
        fan_in_ratio REAL DEFAULT 0.0,
        fan_out_ratio REAL DEFAULT 0.0,
        scc_density REAL DEFAULT 0.0,
        reachability_ratio REAL DEFAULT 0.0,
        created_at TEXT NOT NULL,
        FOREIGN KEY(run_id) REFERENCES analysis_run(id)
    )",
];

const INDEX_STATEMENTS: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_run_project ON analysis_run(project_id)",
    "CREATE INDEX IF NOT EXISTS idx_metrics_run ON component_metrics(run_id)",
    "CREATE INDEX IF NOT EXISTS idx_metrics_name ON component_metrics(component_name)",
];

pub(crate) fn create_tables(conn: &Connection) -> Result<(), StoreError> {
    for statement in TABLE_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}

pub(crate) fn create_indexes(conn: &Connection) -> Result<(), StoreError> {
    for statement in INDEX_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}
