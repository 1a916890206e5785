//! Reads relationship records into a [`Graph`].
//!
//! The edge list is a CSV file with a `source,target` header and one relationship per row:
//!
//! ```text
//! source,target
//! Ada,Grace
//! Grace,Edsger
//! ```

use std::io;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use crate::error::EpiError;
use crate::graph::Graph;

#[derive(Debug, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
}

/// Reads edge records from any CSV source.
///
/// # Errors
///
/// Returns an `EpiError` if a row is malformed or names an empty node.
pub fn read_edge_list<R: io::Read>(reader: R) -> Result<Vec<EdgeRecord>, EpiError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for (row, result) in reader.deserialize().enumerate() {
        let record: EdgeRecord = result?;
        if record.source.is_empty() || record.target.is_empty() {
            return Err(EpiError::EpiError(format!(
                "edge list row {} names an empty node",
                row + 1
            )));
        }
        records.push(record);
    }
    debug!("read {} edge records", records.len());
    Ok(records)
}

/// Builds the graph described by the edge list at `path`.
///
/// # Errors
///
/// Returns an `EpiError` if the file cannot be opened or parsed.
pub fn load_graph(path: &Path) -> Result<Graph, EpiError> {
    info!("Loading edge list from: {}", path.display());
    let file = std::fs::File::open(path)?;
    let records = read_edge_list(file)?;
    let graph = Graph::from_edges(
        records
            .iter()
            .map(|record| (record.source.as_str(), record.target.as_str())),
    );
    info!(
        "loaded {} people and {} relationships",
        graph.len(),
        graph.edge_count()
    );
    Ok(graph)
}
