//! Run persistence — projects, analysis runs, and component metric rows
//!
//! Backed by SQLite. Graph JSON artifacts are written next to the
//! database in a configurable data directory, one file per run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use lattice_metrics::MetricsMatrix;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use thiserror::Error;

mod schema;


const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("artifact error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown run: {0}")]
    UnknownRun(i64),
}

/// The operations the run orchestrator requires from its persistence
/// collaborator, issued in this order per run: `create_run`,
/// `save_component_metrics`, `save_graph_json`, `update_totals`,
/// `mark_completed` — or `mark_failed` on any error.
pub trait RunRepository {
    fn create_run(&mut self, project_id: i64) -> Result<i64, StoreError>;
    fn update_totals(
        &mut self,
        run_id: i64,
        files: u64,
        classes: u64,
        edges: u64,
    ) -> Result<(), StoreError>;
    fn mark_completed(&mut self, run_id: i64) -> Result<(), StoreError>;
    fn mark_failed(&mut self, run_id: i64, error: &str) -> Result<(), StoreError>;
    fn save_graph_json(&mut self, run_id: i64, json: &[u8]) -> Result<PathBuf, StoreError>;
    fn save_component_metrics(
        &mut self,
        run_id: i64,
        matrix: &MetricsMatrix,
        node_types: &BTreeMap<String, String>,
    ) -> Result<(), StoreError>;
}

/// One row of the per-run metric listing served over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRow {
    pub name: String,
    pub in_degree: i64,
    pub out_degree: i64,
    pub betweenness: f64,
    pub scc_size: i64,
    pub blast_radius: i64,
}

pub struct Store {
    conn: Connection,
    data_dir: PathBuf,
}

impl Store {
    pub fn open(path: impl AsRef<Path>, data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");
        Self::init(conn, data_dir.into())
    }

    pub fn open_in_memory(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, data_dir.into())
    }

    fn init(conn: Connection, data_dir: PathBuf) -> Result<Self, StoreError> {
        schema::create_tables(&conn)?;
        schema::create_indexes(&conn)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(Store { conn, data_dir })
    }

    /// Cheap connectivity probe for the health endpoint.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    pub fn get_or_create_project(&mut self, name: &str) -> Result<i64, StoreError> {
        let existing: Option<i64> = self
            .conn
            .query_row("SELECT id FROM project WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }
        self.conn.execute(
            "INSERT INTO project (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Status and error message of a run.
    pub fn run_status(&self, run_id: i64) -> Result<(String, Option<String>), StoreError> {
        self.conn
            .query_row(
                "SELECT status, error_message FROM analysis_run WHERE id = ?1",
                params![run_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or(StoreError::UnknownRun(run_id))
    }

    /// Metric rows for one run, ordered by component name.
    pub fn metrics_for_run(&self, run_id: i64) -> Result<Vec<ComponentRow>, StoreError> {
        let mut statement = self.conn.prepare(
            "SELECT component_name, in_degree, out_degree, betweenness, scc_size, blast_radius
             FROM component_metrics WHERE run_id = ?1 ORDER BY component_name",
        )?;
        let rows = statement.query_map(params![run_id], |row| {
            Ok(ComponentRow {
                name: row.get(0)?,
                in_degree: row.get(1)?,
                out_degree: row.get(2)?,
                betweenness: row.get(3)?,
                scc_size: row.get(4)?,
                blast_radius: row.get(5)?,
            })
        })?;
        let mut components = Vec::new();
        for row in rows {
            components.push(row?);
        }
        Ok(components)
    }

    fn touch_run(&self, run_id: i64, sql: &str, values: impl rusqlite::Params) -> Result<(), StoreError> {
        let updated = self.conn.execute(sql, values)?;
        if updated == 0 {
            return Err(StoreError::UnknownRun(run_id));
        }
        Ok(())
    }
}

impl RunRepository for Store {
    fn create_run(&mut self, project_id: i64) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO analysis_run (project_id, started_at, status) VALUES (?1, ?2, 'started')",
            params![project_id, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_totals(
        &mut self,
        run_id: i64,
        files: u64,
        classes: u64,
        edges: u64,
    ) -> Result<(), StoreError> {
        self.touch_run(
            run_id,
            "UPDATE analysis_run SET total_files = ?2, total_classes = ?3, total_edges = ?4
             WHERE id = ?1",
            params![run_id, files as i64, classes as i64, edges as i64],
        )
    }

    fn mark_completed(&mut self, run_id: i64) -> Result<(), StoreError> {
        self.touch_run(
            run_id,
            "UPDATE analysis_run SET status = 'completed', completed_at = ?2 WHERE id = ?1",
            params![run_id, Utc::now().to_rfc3339()],
        )
    }

    fn mark_failed(&mut self, run_id: i64, error: &str) -> Result<(), StoreError> {
        self.touch_run(
            run_id,
            "UPDATE analysis_run SET status = 'failed', completed_at = ?2, error_message = ?3
             WHERE id = ?1",
            params![run_id, Utc::now().to_rfc3339(), error],
        )
    }

    fn save_graph_json(&mut self, run_id: i64, json: &[u8]) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(format!("graph_{run_id}.json"));
        fs::write(&path, json)?;
        tracing::debug!(run_id, path = %path.display(), "wrote graph artifact");
        Ok(path)
    }

    fn save_component_metrics(
        &mut self,
        run_id: i64,
        matrix: &MetricsMatrix,
        node_types: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let created_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut statement = tx.prepare(
                "INSERT INTO component_metrics (
                    run_id, component_name, component_type,
                    in_degree, out_degree, weighted_in, weighted_out,
                    betweenness, closeness, scc_id, scc_size, blast_radius,
                    fan_in_ratio, fan_out_ratio, scc_density, reachability_ratio,
                    created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            )?;
            for (name, m) in matrix {
                let component_type = node_types
                    .get(name)
                    .map(String::as_str)
                    .unwrap_or("unknown");
                statement.execute(params![
                    run_id,
                    name,
                    component_type,
                    m.in_degree as i64,
                    m.out_degree as i64,
                    m.weighted_in as i64,
                    m.weighted_out as i64,
                    m.betweenness,
                    m.closeness,
                    m.scc_id as i64,
                    m.scc_size as i64,
                    m.blast_radius as i64,
                    m.fan_in_ratio,
                    m.fan_out_ratio,
                    m.scc_density,
                    m.reachability_ratio,
                    created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
