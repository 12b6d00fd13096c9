// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{Diagram, DiagramDocument};

pub const EXPORT_VERSION: &str = "1.0.0";

/// A diagram document stamped with export metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(flatten)]
    pub document: DiagramDocument,
    /// UTC, millisecond precision, `Z` suffix.
    pub exported_at: String,
    pub version: String,
}

pub fn export_document(diagram: &Diagram, now: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        document: diagram.to_document(),
        exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        version: EXPORT_VERSION.to_owned(),
    }
}

/// `My  Protocol` becomes `my_protocol_protocol.json`.
pub fn export_file_name(name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    format!("{}_protocol.json", whitespace.replace_all(name, "_").to_lowercase())
}

/// Writes the pretty-printed export of `diagram` into `dir` and returns the file path.
pub fn write_export(
    diagram: &Diagram,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    if diagram.is_empty() {
        return Err(ExportError::Empty);
    }

    let document = export_document(diagram, now);
    let mut json = serde_json::to_string_pretty(&document)?;
    json.push('\n');

    let path = dir.join(export_file_name(diagram.name()));
    std::fs::write(&path, json).map_err(|source| ExportError::Io { path: path.clone(), source })?;
    tracing::info!(path = %path.display(), blocks = diagram.blocks().len(), "exported diagram");
    Ok(path)
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: the diagram has no blocks")]
    Empty,
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write export {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::{export_document, export_file_name, write_export, ExportDocument, ExportError};
    use crate::model::fixtures::input_groth16_output;
    use crate::model::Diagram;

    #[rstest]
    #[case("Private Transfer", "private_transfer_protocol.json")]
    #[case("  Sealed\tBid   Auction ", "_sealed_bid_auction__protocol.json")]
    #[case("MPC", "mpc_protocol.json")]
    fn file_names_collapse_whitespace_runs(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(export_file_name(name), expected);
    }

    #[test]
    fn export_document_flattens_the_diagram() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).single().expect("timestamp");
        let document = export_document(&input_groth16_output(), now);

        let json = serde_json::to_value(&document).expect("serialize");
        assert_eq!(json["name"], "Private Transfer");
        assert_eq!(json["exportedAt"], "2026-03-04T05:06:07.000Z");
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["blocks"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["connections"].as_array().map(Vec::len), Some(2));

        let parsed: ExportDocument = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, document);
    }

    #[test]
    fn write_export_refuses_empty_diagrams() {
        let err = write_export(&Diagram::new("Empty"), &std::env::temp_dir(), Utc::now())
            .expect_err("empty diagram");
        assert!(matches!(err, ExportError::Empty));
    }

    #[test]
    fn write_export_creates_the_named_file() {
        let dir = std::env::temp_dir().join(format!("orbifold-export-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create dir");

        let path = write_export(&input_groth16_output(), &dir, Utc::now()).expect("export");

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("private_transfer_protocol.json"));
        let raw = std::fs::read_to_string(&path).expect("read export");
        assert!(raw.starts_with("{\n  \"name\": \"Private Transfer\""));

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }
}
