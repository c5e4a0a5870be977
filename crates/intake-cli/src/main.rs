//! Intake CLI: validate, upload and inspect assignment files.
//!
//! `validate` and `sniff` work offline. `upload` and `delete` read storage
//! settings from the environment (or `.env`).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use intake_cli::{build_scanner, init_tracing, read_submission, validation_config};
use intake_core::{Config, UploadContext, ValidationProfile};
use intake_processing::{describe_file, FileValidator};
use intake_services::{create_blob_store, FileService};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "intake", about = "Assignment upload validation and storage")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate files against a profile without storing them
    Validate {
        /// Files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Profile: documents, videos or images
        #[arg(long, default_value = "documents")]
        profile: ValidationProfile,
        /// Declared content type applied to every file
        #[arg(long)]
        content_type: Option<String>,
        /// Maximum files per batch
        #[arg(long)]
        max_files: Option<usize>,
        /// Report content type mismatches as warnings
        #[arg(long)]
        lenient: bool,
    },
    /// Validate, store and scan a file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        #[arg(long, default_value = "documents")]
        profile: ValidationProfile,
        /// Store under this assignment's folder
        #[arg(long)]
        assignment: Option<String>,
        /// Store under this submission's folder
        #[arg(long)]
        submission: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete a stored object by id
    Delete {
        /// Object id as returned by upload
        object_id: String,
    },
    /// Print the content type detected from each file's leading bytes
    Sniff {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    Config::from_env().context("Invalid configuration. Check STORAGE_BACKEND and its settings")
}

async fn file_service(config: &Config, profile: ValidationProfile) -> anyhow::Result<FileService> {
    let store = create_blob_store(config)
        .await
        .context("Failed to initialize blob store")?;
    let validation = validation_config(profile, Some(config.max_files_per_batch()), false);
    Ok(FileService::from_config(
        config,
        store,
        build_scanner(config),
        validation,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            files,
            profile,
            content_type,
            max_files,
            lenient,
        } => {
            let mut submissions = Vec::with_capacity(files.len());
            for path in &files {
                submissions.push(read_submission(path, content_type.as_deref()).await?);
            }

            let validator = FileValidator::new(validation_config(profile, max_files, lenient));
            let results = validator.validate_files_concurrent(&submissions).await?;
            print_json(&results)?;

            let rejected = results.iter().filter(|r| !r.is_valid).count();
            if rejected > 0 {
                anyhow::bail!("{} of {} files failed validation", rejected, results.len());
            }
        }
        Commands::Upload {
            file,
            profile,
            assignment,
            submission,
            content_type,
        } => {
            let config = load_config()?;
            let service = file_service(&config, profile).await?;
            let submission_file = read_submission(&file, content_type.as_deref()).await?;

            let context = UploadContext {
                assignment_id: assignment,
                submission_id: submission,
                declared_content_type: submission_file.declared_content_type.clone(),
            };
            let metadata = service
                .upload_file(submission_file.data.clone(), &submission_file.name, &context)
                .await
                .map_err(|e| anyhow::anyhow!(e.detailed_message()))?;
            print_json(&metadata)?;
        }
        Commands::Delete { object_id } => {
            let config = load_config()?;
            let service = file_service(&config, ValidationProfile::Documents).await?;
            let deleted = service.delete_file(&object_id).await;
            print_json(&serde_json::json!({ "object_id": object_id, "deleted": deleted }))?;
            if !deleted {
                anyhow::bail!("Failed to delete {}", object_id);
            }
        }
        Commands::Sniff { files } => {
            let mut report = Vec::with_capacity(files.len());
            for path in &files {
                let submission = read_submission(path, None).await?;
                let info = describe_file(&submission.data, &submission.name, None);
                report.push(serde_json::json!({
                    "name": info.name,
                    "size": info.size,
                    "extension": info.extension,
                    "detected_type": info.detected_type,
                    "is_executable": info.is_executable,
                    "has_multiple_extensions": info.has_multiple_extensions,
                }));
            }
            print_json(&report)?;
        }
    }

    Ok(())
}
