use anyhow::{Context, Result};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    app::AppVersion,
    commands::CommandOutcome,
    constants::UPLOAD_LIMIT,
    identifier::AppSpec,
    session::{extract_result, Session},
    transport::{Field, Transport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Replace packages of the same name but a different version
    pub clear: bool,
    /// Upload packages even if the version is already published
    pub force: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            clear: true,
            force: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Split `files` into consecutive batches of at most `limit` bytes each.
///
/// Order is preserved. A file that alone exceeds the limit is returned as the error.
pub fn plan_batches(files: Vec<UploadFile>, limit: u64) -> Result<Vec<Vec<UploadFile>>, UploadFile> {
    let mut batches = Vec::new();
    let mut current: Vec<UploadFile> = Vec::new();
    let mut current_size = 0u64;

    for file in files {
        if file.size > limit {
            return Err(file);
        }
        if current_size + file.size > limit && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current_size = 0;
        }
        current_size += file.size;
        current.push(file);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    Ok(batches)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()
            .context("resolving current directory")?
            .join(path))
    }
}

/// Existing files among `paths` with their sizes; missing ones are skipped with a warning
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<UploadFile>> {
    let mut files = Vec::new();
    for path in paths {
        let path = absolute(path)?;
        match fs::metadata(&path) {
            Ok(meta) => files.push(UploadFile {
                path,
                size: meta.len(),
            }),
            Err(_) => tracing::warn!("{} does not exist! Skipping...", path.display()),
        }
    }
    Ok(files)
}

pub async fn run<T: Transport>(
    session: &mut Session<T>,
    app: &AppSpec,
    uploads: &[PathBuf],
    options: UploadOptions,
) -> Result<CommandOutcome> {
    run_with_limit(session, app, uploads, options, UPLOAD_LIMIT).await
}

pub async fn run_with_limit<T: Transport>(
    session: &mut Session<T>,
    app: &AppSpec,
    uploads: &[PathBuf],
    options: UploadOptions,
    limit: u64,
) -> Result<CommandOutcome> {
    tracing::debug!("Calling upload");
    session.use_server_of(app);

    let files = collect_files(uploads)?;
    let batches = match plan_batches(files, limit) {
        Ok(batches) => batches,
        Err(too_big) => {
            tracing::warn!(
                "{} is too big. We can only upload files up to {} bytes",
                too_big.path.display(),
                limit
            );
            return Ok(CommandOutcome::Failed);
        }
    };

    let mut target: Option<AppVersion> = None;
    let count = batches.len();
    for (index, batch) in batches.into_iter().enumerate() {
        for file in &batch {
            println!("Uploading {}", file.path.display());
        }
        let found = match target.take() {
            Some(found) => found,
            None => session.find_app(app).await?,
        };
        upload_batch(session, &found, &batch, options).await?;
        target = Some(found);

        if index + 1 < count {
            println!("Done uploading {} file(s). Continuing...", batch.len());
        } else {
            println!("Finished uploading.");
        }
    }
    Ok(CommandOutcome::Success)
}

async fn upload_batch<T: Transport>(
    session: &mut Session<T>,
    app: &AppVersion,
    files: &[UploadFile],
    options: UploadOptions,
) -> Result<()> {
    let mut fields = vec![
        Field::text("ucs_version", app.ucs_version.as_str()),
        Field::text("component_id", app.component_id.as_str()),
        Field::text("force", options.force.to_string()),
        Field::text("clear", options.clear.to_string()),
    ];
    fields.extend(files.iter().map(|file| Field::file("filename", &file.path)));
    extract_result(session.upload(fields).await?)?;
    Ok(())
}
