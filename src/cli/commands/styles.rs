use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::core::style::{ASPECT_RATIOS, STYLE_PRESETS};

#[derive(Args)]
pub struct StylesArgs {
    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn run(args: StylesArgs) -> Result<()> {
    if args.format == "json" {
        let value = serde_json::json!({
            "styles": STYLE_PRESETS.iter().map(|p| serde_json::json!({
                "id": p.id,
                "name": p.display_name,
                "prompt_suffix": p.prompt_suffix,
            })).collect::<Vec<_>>(),
            "aspect_ratios": ASPECT_RATIOS.iter().map(|r| serde_json::json!({
                "id": r.id,
                "name": r.display_name,
                "value": r.value,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Style Presets".cyan().bold());
    println!("{}", "=".repeat(50));
    for preset in STYLE_PRESETS.iter() {
        println!();
        println!("  {} ({})", preset.display_name.bold(), preset.id.yellow());
        println!("  {}", preset.prompt_suffix.dimmed());
    }

    println!();
    println!("{}", "Aspect Ratios".cyan().bold());
    println!("{}", "=".repeat(50));
    for ratio in ASPECT_RATIOS.iter() {
        println!(
            "  {:<12} {} ({})",
            ratio.display_name.bold(),
            ratio.value,
            ratio.id.yellow()
        );
    }

    Ok(())
}
