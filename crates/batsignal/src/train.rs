// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `batsignal train`: materialize the journal into a dataset and hand it to
//! the configured external trainer.

use std::path::{Path, PathBuf};

use batsignal_config::model::TrainingConfig;
use batsignal_config::BatsignalConfig;
use batsignal_core::BatsignalError;
use tokio::process::Command;
use tracing::info;

/// What a training run produced.
#[derive(Debug)]
pub struct TrainSummary {
    pub examples: usize,
    pub dataset_path: PathBuf,
    /// `false` when no `training.command` is configured.
    pub trainer_ran: bool,
}

pub async fn run_train(config: &BatsignalConfig) -> Result<TrainSummary, BatsignalError> {
    let log_dir = PathBuf::from(&config.journal.log_dir);
    let training = &config.training;
    let dataset_path = PathBuf::from(&training.dataset_path);

    let (dir, dataset) = (log_dir.clone(), dataset_path.clone());
    let format = training.format;
    let system_prompt = training.system_prompt.clone();
    let examples = tokio::task::spawn_blocking(move || {
        let pairs = batsignal_journal::collect_training_pairs(&dir)?;
        let pairs = batsignal_journal::require_non_empty(pairs)?;
        batsignal_journal::write_dataset(&dataset, &pairs, format, &system_prompt)
    })
    .await
    .map_err(|e| BatsignalError::Internal(format!("dataset task failed: {e}")))??;

    info!(
        examples,
        dataset = %dataset_path.display(),
        log_dir = %log_dir.display(),
        "training dataset written"
    );

    let Some(mut command) = trainer_command(training, &dataset_path)? else {
        info!("no training.command configured; dataset only");
        return Ok(TrainSummary {
            examples,
            dataset_path,
            trainer_ran: false,
        });
    };

    info!(base_model = %training.base_model, "starting trainer");
    let status = command
        .status()
        .await
        .map_err(|e| BatsignalError::Training(format!("failed to start trainer: {e}")))?;
    if !status.success() {
        return Err(BatsignalError::Training(format!("trainer exited with {status}")));
    }
    info!(output_dir = %training.output_dir, "trainer finished");

    Ok(TrainSummary {
        examples,
        dataset_path,
        trainer_ran: true,
    })
}

/// The trainer invocation, or `None` when only the dataset is wanted.
///
/// Hyperparameters travel as `BATSIGNAL_*` environment variables so the
/// trainer needs no argument parsing of its own.
fn trainer_command(
    training: &TrainingConfig,
    dataset_path: &Path,
) -> Result<Option<Command>, BatsignalError> {
    let Some(argv) = &training.command else {
        return Ok(None);
    };
    let Some((program, args)) = argv.split_first() else {
        return Err(BatsignalError::Config(
            "training.command must name a program".into(),
        ));
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .env("BATSIGNAL_DATASET", dataset_path)
        .env("BATSIGNAL_DATASET_FORMAT", training.format.to_string())
        .env("BATSIGNAL_BASE_MODEL", &training.base_model)
        .env("BATSIGNAL_OUTPUT_DIR", &training.output_dir)
        .env("BATSIGNAL_EPOCHS", training.epochs.to_string())
        .env("BATSIGNAL_BATCH_SIZE", training.batch_size.to_string())
        .env("BATSIGNAL_SAVE_STEPS", training.save_steps.to_string())
        .env("BATSIGNAL_SAVE_TOTAL_LIMIT", training.save_total_limit.to_string())
        .env("BATSIGNAL_LOGGING_STEPS", training.logging_steps.to_string())
        .env("BATSIGNAL_MAX_LENGTH", training.max_length.to_string())
        .kill_on_drop(true);
    Ok(Some(command))
}
