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
pub struct EditArgs {
    /// Path to the image to edit
    #[arg(required = true)]
    pub image: PathBuf,

    /// The edit instruction (e.g., "make the sky blue", "add a hat")
    #[arg(required = true)]
    pub instruction: String,

    /// Optional reference image for style, pose, or clothing
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Output directory for the edited image
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't download the image automatically
    #[arg(long)]
    pub no_download: bool,

    /// Output format (text, json, quiet)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn run(args: EditArgs, config: &Config) -> Result<()> {
    let client = StudioClient::from_config(config)?;
    let mut session = Session::with_selection(
        config.default_style(),
        config.default_aspect_ratio(),
    );

    let asset = media::encode_file(&args.image).await?;
    session.set_editing(asset);
    session.set_instruction(&args.instruction);

    if let Some(reference_path) = &args.reference {
        let reference = media::encode_file(reference_path).await?;
        session.set_reference(reference);
    }

    let pb = if args.format == "text" {
        Some(spinner(format!(
            "Applying edit: {}...",
            preview(&args.instruction, 40)
        )))
    } else {
        None
    };

    match session.edit(&client).await {
        Ok(image) => {
            if let Some(pb) = &pb {
                pb.finish_with_message(format!("{} Edit applied", "✓".green()));
            }

            let output_dir = args
                .output
                .unwrap_or_else(|| PathBuf::from(&config.output.directory));

            let saved = if !args.no_download && config.output.auto_download {
                Some(media::save_image(&image, &output_dir, download_filename(Flow::Edit)).await?)
            } else {
                None
            };

            match args.format.as_str() {
                "json" => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "flow": "edit",
                            "status": "completed",
                            "instruction": args.instruction,
                            "reference": args.reference.as_ref().map(|p| p.display().to_string()),
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
                    println!("{}: {}", "Edit".cyan().bold(), args.instruction);
                    if let Some(reference) = &args.reference {
                        println!("{}: {}", "Reference".cyan().bold(), reference.display());
                    }
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
                pb.finish_with_message(format!("{} Edit failed", "✗".red()));
            }

            if args.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "flow": "edit",
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

fn preview(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else {
        format!("{}...", &text[..max_len.saturating_sub(3)])
    }
}
