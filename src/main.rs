// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Orbifold CLI entrypoint.
//!
//! By default this runs the terminal editor and serves the protocol API at
//! `http://127.0.0.1:<port>/api/protocols`. `serve` runs the API alone; `export` and `validate`
//! work on a saved document without opening the editor.

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};

use orbifold::config::EditorConfig;
use orbifold::editor::Editor;
use orbifold::export::write_export;
use orbifold::model::{Diagram, DiagramDocument};
use orbifold::server;
use orbifold::store::{ProtocolStore, WriteDurability};
use orbifold::telemetry::{self, LogTarget};
use orbifold::tui::{self, TuiOptions};
use orbifold::validate::validate;

const DEFAULT_PORT: u16 = 5000;

/// Visual editor for cryptographic protocol diagrams.
#[derive(Parser, Debug)]
#[command(name = "orbifold", version)]
#[command(about = "Design cryptographic protocols as block diagrams")]
struct Cli {
    /// Diagram document to open and save to
    #[arg(long)]
    file: Option<PathBuf>,

    /// Editor config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port for the protocol API (0 = ephemeral)
    #[arg(long, env = "ORBIFOLD_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Run the editor without the protocol API
    #[arg(long)]
    no_server: bool,

    /// Log file for editor mode
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Serve the protocol API without the editor
    Serve {
        #[arg(long, env = "ORBIFOLD_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// JSON file backing the store; in-memory when omitted
        #[arg(long)]
        data: Option<PathBuf>,

        /// fsync store writes
        #[arg(long)]
        durable_writes: bool,
    },
    /// Write the export document for a saved diagram
    Export {
        file: PathBuf,

        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print the structural report for a saved diagram
    Validate { file: PathBuf },
}

fn read_document(path: &Path) -> Result<DiagramDocument, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let document = serde_json::from_str(&raw)
        .map_err(|err| format!("invalid document {}: {err}", path.display()))?;
    Ok(document)
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(EditorConfig::load(path)?),
        None => Ok(EditorConfig::default()),
    }
}

fn run_serve(
    port: u16,
    data: Option<PathBuf>,
    durable_writes: bool,
) -> Result<(), Box<dyn Error>> {
    telemetry::init(&LogTarget::Stderr)?;
    let store = match data {
        Some(path) => {
            let durability = if durable_writes {
                WriteDurability::Durable
            } else {
                WriteDurability::BestEffort
            };
            ProtocolStore::open(path)?.with_durability(durability)
        }
        None => ProtocolStore::in_memory(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        server::serve(listener, server::shared(store), async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
    })?;
    Ok(())
}

fn run_export(file: &Path, out: &Path) -> Result<(), Box<dyn Error>> {
    telemetry::init(&LogTarget::Stderr)?;
    let (diagram, _) = Diagram::from_document(read_document(file)?);
    let path = write_export(&diagram, out, Utc::now())?;
    println!("{}", path.display());
    Ok(())
}

fn run_validate(file: &Path) -> Result<bool, Box<dyn Error>> {
    let (diagram, _) = Diagram::from_document(read_document(file)?);
    let report = validate(diagram.blocks(), diagram.connections());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.valid)
}

/// Wraps an error message carried out of the blocking editor task.
fn editor_failure(message: String) -> Box<dyn Error> {
    Box::new(std::io::Error::other(message))
}

fn run_editor(cli: Cli) -> Result<(), Box<dyn Error>> {
    let log_target = cli.log_file.clone().map_or_else(LogTarget::default_file, LogTarget::File);
    telemetry::init(&log_target)?;

    let config = load_config(cli.config.as_deref())?;
    let mut editor = Editor::new(config);
    if let Some(path) = cli.file.as_deref().filter(|path| path.exists()) {
        editor.load(read_document(path)?);
        tracing::info!(path = %path.display(), "opened diagram");
    }
    let export_dir = cli
        .file
        .as_deref()
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    if cli.no_server {
        let options = TuiOptions { file: cli.file, export_dir, store: None };
        return tui::run(editor, options);
    }

    let store = server::shared(ProtocolStore::in_memory());
    let options = TuiOptions { file: cli.file, export_dir, store: Some(store.clone()) };
    let port = cli.port;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let server_handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.await;
            };
            if let Err(err) = server::serve(listener, store, shutdown).await {
                tracing::warn!(%err, "protocol API stopped");
            }
        });

        let tui_join = tokio::task::spawn_blocking(move || {
            tui::run(editor, options).map_err(|err| err.to_string())
        })
        .await;

        let _ = shutdown_tx.send(());
        let _ = server_handle.await;

        let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
        tui_result.map_err(editor_failure)?;
        Ok::<(), Box<dyn Error>>(())
    })
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut cli = Cli::parse();
        match cli.command.take() {
            Some(Command::Serve { port, data, durable_writes }) => {
                run_serve(port, data, durable_writes)
            }
            Some(Command::Export { file, out }) => run_export(&file, &out),
            Some(Command::Validate { file }) => {
                if !run_validate(&file)? {
                    std::process::exit(2);
                }
                Ok(())
            }
            None => run_editor(cli),
        }
    })();

    if let Err(err) = result {
        eprintln!("orbifold: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::{editor_failure, Cli, Command, DEFAULT_PORT};

    #[test]
    fn parses_empty_args() {
        let cli = Cli::try_parse_from(["orbifold"]).expect("parse");
        assert_eq!(cli.file, None);
        assert!(!cli.no_server);
        assert_eq!(cli.command, None);
        if std::env::var_os("ORBIFOLD_PORT").is_none() {
            assert_eq!(cli.port, DEFAULT_PORT);
        }
    }

    #[test]
    fn parses_editor_flags() {
        let cli = Cli::try_parse_from([
            "orbifold",
            "--file",
            "voting.json",
            "--port",
            "0",
            "--no-server",
            "--log-file",
            "/tmp/o.log",
        ])
        .expect("parse");
        assert_eq!(cli.file, Some(PathBuf::from("voting.json")));
        assert_eq!(cli.port, 0);
        assert!(cli.no_server);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/o.log")));
    }

    #[test]
    fn parses_serve_subcommand() {
        let cli = Cli::try_parse_from(["orbifold", "serve", "--port", "8080", "--data", "db.json"])
            .expect("parse");
        assert_eq!(
            cli.command,
            Some(Command::Serve {
                port: 8080,
                data: Some(PathBuf::from("db.json")),
                durable_writes: false,
            })
        );
    }

    #[test]
    fn export_defaults_to_the_working_directory() {
        let cli = Cli::try_parse_from(["orbifold", "export", "voting.json"]).expect("parse");
        assert_eq!(
            cli.command,
            Some(Command::Export { file: PathBuf::from("voting.json"), out: PathBuf::from(".") })
        );
    }

    #[test]
    fn editor_failures_keep_their_message() {
        let err = editor_failure("terminal went away".to_owned());
        assert_eq!(err.to_string(), "terminal went away");
        let io = err.downcast_ref::<std::io::Error>().expect("io error");
        assert_eq!(io.kind(), std::io::ErrorKind::Other);
    }

    #[test]
    fn rejects_bad_ports_and_missing_files() {
        Cli::try_parse_from(["orbifold", "--port", "70000"]).unwrap_err();
        Cli::try_parse_from(["orbifold", "validate"]).unwrap_err();
        Cli::try_parse_from(["orbifold", "--nope"]).unwrap_err();
    }
}
