//! sections2csv - Normalize labeling sessions into indexed section tables
//!
//! Reads one or more session JSON files (shapes, groups, labels, text and
//! table sections of a slide), builds the containment hierarchy of each and
//! writes it as a CSV table, as JSON rows or as a nested tree.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use sectree_core::export::{CsvExporter, entries_from_rows, export_rows, tree_from_rows};
use sectree_core::{NormalizeParams, Session, SectionTree, label_slide};
use tracing::info;

/// Output type for the normalized sections.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum OutputType {
    /// Flat CSV table, one row per section (default)
    #[default]
    Csv,
    /// Flat rows as a JSON array
    Json,
    /// Nested {label, sections} tree
    Tree,
}

/// Normalize slide labeling sessions into indexed section tables.
#[derive(Parser, Debug)]
#[command(name = "sections2csv")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more paths to session JSON files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Type of output to generate
    #[arg(short = 't', long = "output-type", value_enum, default_value = "csv")]
    output_type: OutputType,

    // === Normalization options ===
    /// Minimum number of digits per index segment
    #[arg(long = "index-width", default_value = "2")]
    index_width: usize,

    /// Also duplicate overlaid shapes into custom row/column groups
    #[arg(long = "duplicate-into-groups", action = ArgAction::SetTrue)]
    duplicate_into_groups: bool,

    /// Margin for detecting shapes lying over table rows and columns
    #[arg(long = "overlay-tolerance", default_value = "5.0")]
    overlay_tolerance: f64,

    /// Only use overlaid shapes listed in the session, no geometric detection
    #[arg(long = "no-overlay", action = ArgAction::SetTrue)]
    no_overlay: bool,

    /// Drop root sections whose members are all nested elsewhere
    #[arg(long = "trim", action = ArgAction::SetTrue)]
    trim: bool,

    /// Keep sections with identical members instead of merging them
    #[arg(long = "no-dedupe", action = ArgAction::SetTrue)]
    no_dedupe: bool,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Build NormalizeParams from command line arguments.
fn build_params(args: &Args) -> Result<NormalizeParams> {
    if args.index_width == 0 {
        bail!("--index-width must be at least 1");
    }
    let overlay_tolerance = if args.no_overlay {
        None
    } else {
        if !(args.overlay_tolerance >= 0.0 && args.overlay_tolerance.is_finite()) {
            bail!(
                "--overlay-tolerance must be a non-negative number, got {}",
                args.overlay_tolerance
            );
        }
        Some(args.overlay_tolerance)
    };
    Ok(NormalizeParams::new(
        args.index_width,
        args.duplicate_into_groups,
        overlay_tolerance,
        args.trim,
        !args.no_dedupe,
    ))
}

fn load_session(path: &Path) -> Result<Session> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Session::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to read session {}", path.display()))
}

/// Normalize every session, in argument order.
fn normalize_all(files: &[PathBuf], params: &NormalizeParams) -> Result<Vec<SectionTree>> {
    let mut trees = Vec::with_capacity(files.len());
    for path in files {
        let mut session = load_session(path)?;
        let source = session.clone();
        let tree = label_slide(&source, &mut session, params)
            .with_context(|| format!("failed to normalize {}", path.display()))?;
        info!(file = %path.display(), sections = tree.len(), "normalized session");
        trees.push(tree);
    }
    Ok(trees)
}

fn write_output<W: Write>(trees: &[SectionTree], output_type: OutputType, out: W) -> Result<()> {
    match output_type {
        OutputType::Csv => {
            let mut exporter = CsvExporter::new(out);
            for tree in trees {
                exporter.write_tree(tree)?;
            }
            exporter.finish()?.flush()?;
        }
        OutputType::Json => {
            let rows: Vec<_> = trees.iter().flat_map(export_rows).collect();
            write_json(out, &rows)?;
        }
        OutputType::Tree => {
            let mut forest = Vec::new();
            for tree in trees {
                forest.extend(tree_from_rows(&entries_from_rows(&export_rows(tree))?));
            }
            write_json(out, &forest)?;
        }
    }
    Ok(())
}

fn write_json<W: Write, T: serde::Serialize + ?Sized>(mut out: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let params = build_params(&args)?;
    for path in &args.files {
        if !path.exists() {
            bail!("file not found: {}", path.display());
        }
    }
    let trees = normalize_all(&args.files, &params)?;

    if args.outfile == "-" {
        write_output(&trees, args.output_type, BufWriter::new(io::stdout().lock()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        write_output(&trees, args.output_type, BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["sections2csv", "session.json"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_map_to_default_params() {
        let params = build_params(&args(&[])).unwrap();
        assert_eq!(params, NormalizeParams::default());
    }

    #[test]
    fn flags_map_onto_params() {
        let params = build_params(&args(&[
            "--index-width",
            "3",
            "--duplicate-into-groups",
            "--no-overlay",
            "--trim",
            "--no-dedupe",
        ]))
        .unwrap();
        assert_eq!(params.index_width, 3);
        assert!(params.duplicate_into_groups);
        assert_eq!(params.overlay_tolerance, None);
        assert!(params.trim_redundant_roots);
        assert!(!params.dedupe);
    }

    #[test]
    fn zero_index_width_is_rejected() {
        assert!(build_params(&args(&["--index-width", "0"])).is_err());
    }

    #[test]
    fn session_file_normalizes_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{
                "slide": {"test_index": 4, "width": 960.0, "height": 540.0},
                "shapes": [
                    {"id": "1", "top": 10, "left": 10, "width": 100, "height": 20, "text": "Title"},
                    {"id": "2", "top": 50, "left": 10, "width": 100, "height": 20}
                ],
                "shape_labels": [{"shape_id": "1", "label": "Title"}]
            }"#,
        )
        .unwrap();

        let trees = normalize_all(&[path], &NormalizeParams::default()).unwrap();
        let mut out = Vec::new();
        write_output(&trees, OutputType::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("test_index,index,label,shape_id"));
        assert!(lines[1].starts_with(r#"4,01,"Title","[""1""]",individual_shape"#));
        assert!(lines[2].starts_with(r#"4,02,"","[""2""]",individual_shape"#));
    }
}
