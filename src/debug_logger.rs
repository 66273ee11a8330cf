// Debug logging module for asynchronous decision logging
//
// This module provides fire-and-forget async logging so that writing the log
// never eats into a move's time budget. Each decision is one JSONL line.

use log::error;
use serde::Serialize;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::types::Move;

/// Everything worth keeping about one evader decision
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub round: usize,
    pub chosen_move: Move,
    pub completed_depth: usize,
    pub score: Option<f32>,
    pub pv: Vec<Move>,
    pub elapsed_ms: u64,
}

/// Represents a single debug log entry
#[derive(Debug, Serialize)]
struct DebugLogEntry {
    #[serde(flatten)]
    record: DecisionRecord,
    timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a decision asynchronously (fire-and-forget)
    /// Must be called from within a tokio runtime
    pub fn log_decision(&self, record: DecisionRecord) {
        if !self.enabled {
            return;
        }

        let file_handle = self.file.clone();
        tokio::spawn(async move {
            Self::write_entry(file_handle, record).await;
        });
    }

    /// Performs the actual file write; also used directly when the caller
    /// wants to wait for the line to land
    pub async fn log_decision_now(&self, record: DecisionRecord) {
        if self.enabled {
            Self::write_entry(self.file.clone(), record).await;
        }
    }

    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, record: DecisionRecord) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            let entry = DebugLogEntry {
                record,
                timestamp: chrono::Utc::now().to_rfc3339(),
            };

            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
