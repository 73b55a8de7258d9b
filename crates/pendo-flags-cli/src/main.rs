// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `pendo-flags` command-line client.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pendo_flags::{
	Context, FlagProvider, PendoProvider, PendoProviderBuilder, Properties, ProviderConfig,
};
use pendo_flags_core::jzb;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Resolve Pendo segment flags and send track events.
#[derive(Parser, Debug)]
#[command(name = "pendo-flags", version, about, long_about = None)]
struct Args {
	/// TOML provider configuration (defaults to PENDO_* environment variables)
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Override the Pendo data API base URL
	#[arg(long, env = "PENDO_BASE_URL")]
	base_url: Option<String>,

	/// Output logs as JSON
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Resolve a flag for a visitor
	Resolve {
		/// Flag key (segment id)
		flag: String,
		#[arg(long)]
		visitor: Option<String>,
		#[arg(long)]
		account: Option<String>,
		/// Page URL sent with the lookup instead of the configured default
		#[arg(long)]
		url: Option<String>,
		#[arg(long = "type", value_enum, default_value_t = FlagType::Bool)]
		flag_type: FlagType,
	},
	/// Send a track event
	Track {
		event: String,
		#[arg(long)]
		visitor: String,
		#[arg(long)]
		account: Option<String>,
		/// Event properties as a JSON object
		#[arg(long, default_value = "{}")]
		properties: String,
	},
	/// Encode a JSON value as a jzb token
	Encode { json: String },
	/// Decode a jzb token to JSON
	Decode { token: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FlagType {
	Bool,
	String,
	Number,
	Object,
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();
	init_tracing(args.json_logs);

	match args.command {
		Command::Encode { ref json } => {
			let value: Value = serde_json::from_str(json).context("input is not valid JSON")?;
			println!("{}", jzb::encode(&value)?);
		}
		Command::Decode { ref token } => {
			let value: Value = jzb::decode(token).context("token is not a valid jzb payload")?;
			println!("{}", serde_json::to_string_pretty(&value)?);
		}
		Command::Resolve {
			ref flag,
			ref visitor,
			ref account,
			ref url,
			flag_type,
		} => {
			let provider = build_provider(&args).await?;
			let context = build_context(visitor.as_deref(), account.as_deref(), url.as_deref());
			let output = resolve(&provider, flag, flag_type, &context).await?;
			println!("{output}");
			provider.close().await;
		}
		Command::Track {
			ref event,
			ref visitor,
			ref account,
			ref properties,
		} => {
			let provider = build_provider(&args).await?;
			let context = build_context(Some(visitor.as_str()), account.as_deref(), None);
			let properties = parse_properties(properties)?;

			let Some(handle) = provider.reporter().track(event, &context, properties) else {
				bail!("event was not sent; check that a track event secret is configured");
			};
			handle.await.context("track task panicked")?;
			info!(event = %event, visitor_id = %visitor, "Track event dispatched");
			provider.close().await;
		}
	}

	Ok(())
}

fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let registry = tracing_subscriber::registry().with(filter);

	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}

fn load_config(path: Option<&Path>, base_url: Option<&str>) -> Result<ProviderConfig> {
	let config = match path {
		Some(path) => {
			let raw = std::fs::read_to_string(path)
				.with_context(|| format!("failed to read {}", path.display()))?;
			ProviderConfig::from_toml(&raw)
				.with_context(|| format!("invalid configuration in {}", path.display()))?
		}
		None => ProviderConfig::from_env().context("invalid PENDO_* environment configuration")?,
	};

	Ok(match base_url {
		Some(url) => config.with_base_url(url),
		None => config,
	})
}

async fn build_provider(args: &Args) -> Result<PendoProvider> {
	let config = load_config(args.config.as_deref(), args.base_url.as_deref())?;
	let provider = PendoProviderBuilder::from_config(config).build()?;
	provider.initialize().await?;
	Ok(provider)
}

fn build_context(visitor: Option<&str>, account: Option<&str>, url: Option<&str>) -> Context {
	let mut context = Context::new();
	if let Some(visitor) = visitor {
		context = context.with_visitor_id(visitor);
	}
	if let Some(account) = account {
		context = context.with_account_id(account);
	}
	if let Some(url) = url {
		context = context.with_attribute("url", Value::String(url.to_string()));
	}
	context
}

fn parse_properties(raw: &str) -> Result<Properties> {
	let value: Value = serde_json::from_str(raw).context("properties are not valid JSON")?;
	match value {
		Value::Object(map) => Ok(Properties::from(map)),
		other => bail!("properties must be a JSON object, got {other}"),
	}
}

async fn resolve(
	provider: &PendoProvider,
	flag: &str,
	flag_type: FlagType,
	context: &Context,
) -> Result<String> {
	let rendered = match flag_type {
		FlagType::Bool => {
			serde_json::to_string_pretty(&provider.resolve_boolean(flag, false, context).await)?
		}
		FlagType::String => serde_json::to_string_pretty(
			&provider.resolve_string(flag, String::new(), context).await,
		)?,
		FlagType::Number => {
			serde_json::to_string_pretty(&provider.resolve_number(flag, 0.0, context).await)?
		}
		FlagType::Object => serde_json::to_string_pretty(
			&provider.resolve_object(flag, Value::Null, context).await,
		)?,
	};
	Ok(rendered)
}
