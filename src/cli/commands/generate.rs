use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{display_image_terminal, spinner};
use crate::api::StudioClient;
use crate::config::{Config, DisplayMode};
use crate::core::session::download_filename;
use crate::core::style::{aspect_ratio_by_id, aspect_ratio_ids, style_by_id, style_ids};
use crate::core::{Flow, Session};
use crate::media;

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to the photo to transform
    #[arg(required = true)]
    pub image: PathBuf,

    /// Style preset (neutral, gradient, monochrome, lifestyle)
    #[arg(short, long)]
    pub style: Option<String>,

    /// Aspect ratio (square, portrait, classic, story, widescreen, or a token like 16:9)
    #[arg(short, long, alias = "ar")]
    pub aspect_ratio: Option<String>,

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

pub async fn run(args: GenerateArgs, config: &Config) -> Result<()> {
    // Resolve the style and ratio before touching the file or the network
    let style = match &args.style {
        Some(id) => style_by_id(id).ok_or_else(|| {
            anyhow::anyhow!("Unknown style '{}'. Valid values: {}", id, style_ids().join(", "))
        })?,
        None => config.default_style(),
    };
    let aspect_ratio = match &args.aspect_ratio {
        Some(id) => aspect_ratio_by_id(id).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown aspect ratio '{}'. Valid values: {}",
                id,
                aspect_ratio_ids().join(", ")
            )
        })?,
        None => config.default_aspect_ratio(),
    };

    let client = StudioClient::from_config(config)?;
    let mut session = Session::with_selection(style.clone(), aspect_ratio.clone());

    let asset = media::encode_file(&args.image).await?;
    session.set_original(asset);

    let pb = if args.format == "text" {
        Some(spinner(format!(
            "Generating studio portrait ({})...",
            style.display_name
        )))
    } else {
        None
    };

    match session.generate(&client).await {
        Ok(image) => {
            if let Some(pb) = &pb {
                pb.finish_with_message(format!("{} Studio portrait generated", "✓".green()));
            }

            let output_dir = args
                .output
                .unwrap_or_else(|| PathBuf::from(&config.output.directory));

            let saved = if !args.no_download && config.output.auto_download {
                Some(media::save_image(&image, &output_dir, download_filename(Flow::Generate)).await?)
            } else {
                None
            };

            match args.format.as_str() {
                "json" => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "flow": "generate",
                            "status": "completed",
                            "style": style.id,
                            "aspect_ratio": aspect_ratio.value,
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
                    println!("{}: {}", "Style".cyan().bold(), style.display_name);
                    println!("{}: {}", "Aspect Ratio".cyan().bold(), aspect_ratio.value);
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
                pb.finish_with_message(format!("{} Generation failed", "✗".red()));
            }

            if args.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "flow": "generate",
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
