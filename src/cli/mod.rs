// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::ServiceConfig;

/// Leukocoria screening API server
#[derive(Parser, Debug)]
#[command(name = "leukocoria-api")]
#[command(version)]
#[command(about = "Face and eye detection HTTP API for leukocoria screening", long_about = None)]
pub struct Cli {
    /// TOML configuration file; environment variables override its values
    #[arg(short, long, env = "LEUKO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on, overriding configuration
    #[arg(short, long)]
    pub listen: Option<String>,
}

impl Cli {
    /// Resolve the service configuration: file or defaults, env, then flags
    pub fn load_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ServiceConfig::from_env()?,
        };

        if let Some(listen) = &self.listen {
            config.listen_addr = listen.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
