//! Procflow CLI library
//!
//! This module contains the core CLI logic for the Procflow layout tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;
use serde::Serialize;

use procflow::{FlowError, Workbench, identifier::Id, scene::Scene};

/// Scene file written by the CLI.
#[derive(Debug, Serialize)]
struct SceneOutput {
    selected: Option<Scene>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<Scene>,
}

/// Run the Procflow CLI application
///
/// This function loads the input collection, lays out the selected document
/// (and the comparison target, if any), and writes the resulting scene JSON
/// to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `FlowError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Document parsing errors
/// - Unknown `--process` or `--compare` ids
pub fn run(args: &Args) -> Result<(), FlowError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing process collection"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let documents = procflow::parse_collection(&source)?;

    let mut workbench = Workbench::new(app_config);
    workbench.load(documents);

    if let Some(process) = &args.process {
        workbench.select(Id::new(process))?;
    }
    if let Some(compare) = &args.compare {
        workbench.set_comparison_target(Some(Id::new(compare)))?;
    }

    // Initial pass uses trigger 0, then each request flips the direction
    workbench.relayout();
    for _ in 0..args.relayout {
        workbench.request_layout();
    }

    let output = SceneOutput {
        selected: workbench.selected_scene(),
        comparison: workbench.comparison_scene(),
    };
    fs::write(&args.output, serde_json::to_string_pretty(&output)?)?;

    info!(
        output_file = args.output,
        direction = workbench.direction().to_string();
        "Scene exported successfully"
    );

    if let Some(export) = &args.export {
        fs::write(export, workbench.export_json()?)?;
        info!(export_file = export.as_str(); "Collection exported successfully");
    }

    Ok(())
}
