// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `batsignal serve`: wire the provider, journal, and knowledge base into
//! the HTTP gateway and run until a shutdown signal arrives.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use batsignal_agent::{detect_trained_model, Capabilities, ChatPipeline, PipelineSettings};
use batsignal_config::BatsignalConfig;
use batsignal_core::{BatsignalError, KnowledgeAdapter, ProviderAdapter};
use batsignal_gateway::{GatewayState, HealthState, ServerConfig};
use batsignal_groq::GroqProvider;
use batsignal_journal::ConversationLog;
use tracing::{info, warn};

/// Runs the gateway with graceful shutdown on SIGTERM or Ctrl-C.
pub async fn run_serve(config: BatsignalConfig) -> Result<(), BatsignalError> {
    info!(agent = %config.agent.name, "starting batsignal");

    let state = build_state(&config).await?;
    let server = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        static_dir: PathBuf::from(&config.gateway.static_dir),
    };
    if !server.static_dir.join("voice.html").is_file() {
        warn!(
            dir = %server.static_dir.display(),
            "static directory has no voice.html; page routes will return 404"
        );
    }

    let cancel = batsignal_agent::install_signal_handler();
    batsignal_gateway::start_server(&server, state, cancel.cancelled_owned()).await?;

    info!("batsignal stopped");
    Ok(())
}

/// Builds everything the gateway handlers share.
pub async fn build_state(config: &BatsignalConfig) -> Result<GatewayState, BatsignalError> {
    let provider: Arc<dyn ProviderAdapter> = Arc::new(GroqProvider::new(&config.groq)?);

    let journal = Arc::new(ConversationLog::new(&config.journal.log_dir));
    info!(dir = %journal.log_dir().display(), "conversation journal ready");

    let system_prompt = batsignal_groq::load_system_prompt(&config.agent).await;
    let settings = PipelineSettings::from_config(config, system_prompt);
    let mut pipeline = ChatPipeline::new(provider, journal, settings);

    let mut embedder = None;
    if config.knowledge.enabled {
        let kb = batsignal_knowledge::from_config(&config.knowledge).await?;
        embedder = Some(kb.embedder().kind());
        let knowledge: Arc<dyn KnowledgeAdapter> = Arc::new(kb);
        pipeline = pipeline.with_knowledge(knowledge);
    } else {
        info!("knowledge base disabled");
    }

    let capabilities = Capabilities {
        knowledge: pipeline.has_knowledge(),
        embedder,
        trained_model: detect_trained_model(Path::new(&config.training.output_dir)),
    };
    info!(
        knowledge = capabilities.knowledge,
        embedder = ?capabilities.embedder,
        trained_model = capabilities.trained_model,
        "capabilities"
    );

    Ok(GatewayState {
        pipeline: Arc::new(pipeline),
        health: HealthState {
            start_time: Instant::now(),
            agent_name: config.agent.name.clone(),
            capabilities,
        },
    })
}
