//! CSV cell-layout loader.
//!
//! # CSV format
//!
//! One row per cell.  Empty link columns mean "no link".
//!
//! ```csv
//! x,y,reservable,input_id,output_id,charge_id,policy
//! 0,0,true,5,,,fail_fast
//! 1,0,true,,,,queued
//! 2,0,false,,,,
//! 3,0,true,,2,,
//! ```
//!
//! | Column       | Values                                              |
//! |--------------|-----------------------------------------------------|
//! | `reservable` | `true`/`false` (also `1`/`0`, `yes`/`no`)           |
//! | `policy`     | `fail_fast` (default when empty) or `queued`        |

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use wh_core::{ChargeId, InputId, OutputId, Position};

use crate::{CellError, CellPolicy, CellSpec};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CellRecord {
    x:          i32,
    y:          i32,
    reservable: String,
    input_id:   Option<u32>,
    output_id:  Option<u32>,
    charge_id:  Option<u32>,
    policy:     Option<String>,
}

/// A cell spec together with where the layout puts it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedSpec {
    pub position: Position,
    pub spec:     CellSpec,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load cell specs from a CSV file, in file order.
pub fn load_cell_specs_csv(path: &Path) -> Result<Vec<PlacedSpec>, CellError> {
    let file = std::fs::File::open(path).map_err(CellError::Io)?;
    load_cell_specs_reader(file)
}

/// Like [`load_cell_specs_csv`] but accepts any `Read` source.
pub fn load_cell_specs_reader<R: Read>(reader: R) -> Result<Vec<PlacedSpec>, CellError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut specs = Vec::new();

    for (line, result) in csv_reader.deserialize::<CellRecord>().enumerate() {
        let row = result.map_err(|e| CellError::Parse(e.to_string()))?;
        let reservable = parse_flag(&row.reservable)
            .ok_or_else(|| CellError::Parse(format!("row {}: invalid reservable {:?}", line + 1, row.reservable)))?;
        let policy = parse_policy(row.policy.as_deref().unwrap_or(""))
            .ok_or_else(|| CellError::Parse(format!("row {}: invalid policy {:?}", line + 1, row.policy)))?;

        specs.push(PlacedSpec {
            position: Position::new(row.x, row.y),
            spec: CellSpec {
                reservable,
                input:  row.input_id.map(InputId),
                output: row.output_id.map(OutputId),
                charge: row.charge_id.map(ChargeId),
                policy,
            },
        });
    }

    Ok(specs)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_policy(s: &str) -> Option<CellPolicy> {
    match s.trim() {
        "" | "fail_fast" => Some(CellPolicy::FailFast),
        "queued" => Some(CellPolicy::Queued),
        _ => None,
    }
}
