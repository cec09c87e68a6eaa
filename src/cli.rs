//! Batch uploader behind `gallery-upload`.

use crate::config::{StoreConfig, UploadArgs};
use crate::services::upload_pipeline::{UploadFile, UploadOutcome, UploadPipeline};
use crate::setup;
use anyhow::{Context, Result, bail};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up in directory mode, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Counts from one CLI run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub uploaded: usize,
    pub failed: usize,
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(ext))
        })
}

/// A single file is taken as-is; a directory is listed (not recursively) and
/// filtered to supported extensions, sorted by name.
pub fn collect_images(target: &Path) -> Result<Vec<PathBuf>> {
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }
    if !target.is_dir() {
        bail!("{} is neither a file nor a directory", target.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(target).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("listing {}", target.display()))?;
        if entry.file_type().is_file() && is_supported_image(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// MIME type from the file extension, if it names an image format.
pub fn content_type_for(path: &Path) -> Option<String> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Read one file into an upload, named by its basename.
pub async fn load_upload_file(path: &Path) -> Result<UploadFile> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(UploadFile::new(filename, content_type_for(path), data))
}

/// Upload every selected file, reporting progress as it goes.
pub async fn upload_paths(pipeline: &UploadPipeline, paths: &[PathBuf]) -> RunSummary {
    let mut summary = RunSummary::default();
    let total = paths.len();

    for (index, path) in paths.iter().enumerate() {
        let position = index + 1;
        let file = match load_upload_file(path).await {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!("Skipping {}: {:#}", path.display(), err);
                println!("[{position}/{total}] failed {}: {:#}", path.display(), err);
                summary.failed += 1;
                continue;
            }
        };

        match pipeline.process(file).await {
            UploadOutcome::Stored(record) => {
                println!("[{position}/{total}] uploaded {}", record.name);
                summary.uploaded += 1;
            }
            UploadOutcome::Failed { filename, error } => {
                println!("[{position}/{total}] failed {filename}: {error}");
                summary.failed += 1;
            }
            UploadOutcome::Skipped => {}
        }
    }

    summary
}

/// Entry point for the binary.
pub async fn run(args: UploadArgs) -> Result<RunSummary> {
    let target = std::path::absolute(&args.dir)
        .with_context(|| format!("resolving {}", args.dir.display()))?;
    let store_cfg = StoreConfig::from_env_and_args(args.store)?;
    tracing::debug!("Uploading with config: {:?}", store_cfg);

    let paths = collect_images(&target)?;
    if paths.is_empty() {
        println!("No images found.");
        return Ok(RunSummary::default());
    }

    let stores = setup::open_stores(&store_cfg).await?;
    let state = stores.into_state(store_cfg.thumbnail_max_edge);

    println!("Starting upload of {} image(s)...", paths.len());
    let summary = upload_paths(&state.pipeline, &paths).await;
    println!(
        "Done: {} uploaded, {} failed.",
        summary.uploaded, summary.failed
    );
    Ok(summary)
}
