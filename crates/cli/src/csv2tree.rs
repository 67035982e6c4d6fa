//! csv2tree - Convert exported section tables into nested trees
//!
//! For every input CSV written by sections2csv, writes `<stem>_tree.json`
//! holding the nested {label, sections} tree and, with --normalize,
//! `<stem>.json` holding slide-relative training entries.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use sectree_core::export::{entries_from_rows, read_rows, training_entries, tree_from_rows};
use tracing::{info, warn};

/// Convert exported section tables into nested trees and training entries.
#[derive(Parser, Debug)]
#[command(name = "csv2tree")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more exported CSV files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Directory to write outputs to (defaults to each input's directory)
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Also write slide-relative training entries
    #[arg(short = 'n', long, action = ArgAction::SetTrue)]
    normalize: bool,

    /// Overwrite existing output files
    #[arg(short = 'f', long, action = ArgAction::SetTrue)]
    force: bool,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Output paths for `input`: the tree file and the training file.
fn output_paths(input: &Path, output_dir: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("no file name in {}", input.display()))?;
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Ok((
        dir.join(format!("{stem}_tree.json")),
        dir.join(format!("{stem}.json")),
    ))
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T, force: bool) -> Result<bool> {
    if path.exists() && !force {
        warn!(path = %path.display(), "file exists, skipping");
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    info!(path = %path.display(), "wrote");
    Ok(true)
}

/// Convert one CSV file.
fn process_file(path: &Path, args: &Args) -> Result<()> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let rows = read_rows(BufReader::new(file))
        .with_context(|| format!("failed to read {}", path.display()))?;
    let (tree_path, training_path) = output_paths(path, args.output_dir.as_deref())?;

    let tree = tree_from_rows(&entries_from_rows(&rows)?);
    write_json(&tree_path, &tree, args.force)?;

    if args.normalize {
        write_json(&training_path, &training_entries(&rows), args.force)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    for path in &args.files {
        if !path.exists() {
            bail!("file not found: {}", path.display());
        }
        process_file(path, &args)
            .with_context(|| format!("error processing {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
test_index,index,label,shape_id,section_type,start_char,end_char,cells,text,top,left,right,bottom,width,height,slide_height,slide_width
2,01,\"Body\",\"[\"\"1\"\", \"\"2\"\"]\",shape_group,,,,,100.0,96.0,480.0,270.0,384.0,170.0,540.0,960.0
2,01.01,\"Left\",\"[\"\"1\"\"]\",individual_shape,,,,\"Hello\",100.0,96.0,200.0,270.0,104.0,170.0,540.0,960.0
";

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn writes_tree_and_training_entries() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("test_002.csv");
        std::fs::write(&input, CSV).unwrap();
        let args = Args::parse_from(["csv2tree", "--normalize", input.to_str().unwrap()]);

        process_file(&input, &args).unwrap();

        let tree = read_json(&dir.path().join("test_002_tree.json"));
        assert_eq!(tree[0]["label"], "Body");
        assert_eq!(tree[0]["sections"][0]["label"], "Left");

        let training = read_json(&dir.path().join("test_002.json"));
        assert_eq!(training[1]["index"], "01.01");
        assert_eq!(training[0]["top"], 0.185);
        assert_eq!(training[0]["left"], 0.1);
    }

    #[test]
    fn output_dir_overrides_input_directory() {
        let (tree, training) =
            output_paths(Path::new("in/slide.csv"), Some(Path::new("out"))).unwrap();
        assert_eq!(tree, PathBuf::from("out/slide_tree.json"));
        assert_eq!(training, PathBuf::from("out/slide.json"));
    }
}
