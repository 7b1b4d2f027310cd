use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{display_image_terminal, spinner};
use crate::api::StudioClient;
use crate::config::{Config, DisplayMode};
use crate::core::session::download_filename;
use crate::core::{Flow, Session};
use crate::media;

#[derive(Args)]
pub struct CleanupArgs {
    /// Path to the photo to clean up
    #[arg(required = true)]
    pub image: PathBuf,

    /// Output directory for the downloaded image
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't download the image automatically
    #[arg(long)]
    pub no_download: bool,

    /// Output format (text, json, quiet)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn run(args: CleanupArgs, config: &Config) -> Result<()> {
    let client = StudioClient::from_config(config)?;
    let mut session = Session::with_selection(
        config.default_style(),
        config.default_aspect_ratio(),
    );

    let asset = media::encode_file(&args.image).await?;
    session.set_original(asset);

    let pb = if args.format == "text" {
        Some(spinner("Cleaning up photo...".to_string()))
    } else {
        None
    };

    match session.clean_up(&client).await {
        Ok(image) => {
            if let Some(pb) = &pb {
                pb.finish_with_message(format!("{} Photo cleaned up", "✓".green()));
            }

            let output_dir = args
                .output
                .unwrap_or_else(|| PathBuf::from(&config.output.directory));

            let saved = if !args.no_download && config.output.auto_download {
                Some(media::save_image(&image, &output_dir, download_filename(Flow::CleanUp)).await?)
            } else {
                None
            };

            match args.format.as_str() {
                "json" => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "flow": "clean-up",
                            "status": "completed",
                            "mime_type": image.mime_type(),
                            "output": saved.as_ref().map(|p| p.display().to_string()),
                        }))?
                    );
                }
                "quiet" => {
                    if let Some(path) = &saved {
                        println!("{}", path.display());
                    }
                }
                _ => {
                    println!();
                    println!("{}: {}", "Source".cyan().bold(), args.image.display());
                    println!("{}: {}", "Status".cyan().bold(), "completed".green());

                    if let Some(path) = &saved {
                        println!();
                        println!("{}: {}", "Saved".cyan().bold(), path.display());

                        if config.output.display == DisplayMode::Terminal {
                            println!();
                            display_image_terminal(path);
                        }
                    }
                }
            }
            Ok(())
        }
        Err(e) => {
            if let Some(pb) = pb {
                pb.finish_with_message(format!("{} Clean-up failed", "✗".red()));
            }

            if args.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "flow": "clean-up",
                        "status": "failed",
                        "error": e.to_string(),
                    }))?
                );
            } else if args.format != "quiet" {
                eprintln!("{}: {}", "Error".red().bold(), e);
            }
            Err(e.into())
        }
    }
}
