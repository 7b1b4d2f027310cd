pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "studio",
    version,
    about = "📸 Studio Photo CLI - turn casual photos into studio portraits with Google Gemini",
    long_about = r#"📸 Studio Photo CLI - turn casual photos into studio portraits with Google Gemini

Upload a photo, pick a style preset and aspect ratio, and let the model turn
it into a professional studio portrait. Results can be cleaned up or refined
with iterative text-guided edits. Run without arguments to launch the
interactive TUI.

SETUP:
  Set your API key via environment variable or config:
    export GEMINI_API_KEY=your-key-here
    studio config set api.key your-key-here

EXAMPLES:
  Generate a studio portrait:
    studio generate photo.jpg
    studio g photo.jpg --style monochrome --ar 16:9

  Clean up a photo without restyling it:
    studio cleanup photo.jpg

  Edit a photo with a text instruction:
    studio edit portrait.png "change the jacket to leather"
    studio e portrait.png "match this pose" --reference pose.jpg

  List style presets and aspect ratios:
    studio styles

  Manage configuration:
    studio config show
    studio config set defaults.style gradient

  Launch interactive TUI:
    studio

OUTPUT FORMATS:
  --format text   Human-readable output (default)
  --format json   Machine-readable JSON for scripting
  --format quiet  Minimal output, just file paths"#,
    after_help = r#"CONFIGURATION:
  Config file: ~/.config/studio-cli/config.toml (macOS/Linux)

  Style presets: neutral, gradient, monochrome, lifestyle
  Aspect ratios: square (1:1), portrait (3:4), classic (4:3), story (9:16), widescreen (16:9)

  Generated photos are saved as studio_photo.png, edits as edited_photo.png."#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Turn a photo into a styled studio portrait
    ///
    /// Sends the photo and the selected style preset to the model, which
    /// replaces the background, relights the subject, and upscales the
    /// result. The aspect ratio applies to this flow only.
    #[command(
        alias = "g",
        after_help = r#"EXAMPLES:
  Default style (Neutral Studio):
    studio generate photo.jpg

  With a preset and aspect ratio:
    studio generate photo.jpg --style lifestyle --ar portrait

  JSON output for scripting:
    studio generate photo.jpg --format json

  Custom output directory:
    studio generate photo.jpg --output ./portraits"#
    )]
    Generate(commands::generate::GenerateArgs),

    /// Enhance a photo without changing its content
    ///
    /// Improves lighting, color, sharpness and noise while leaving the
    /// subject, background and composition untouched.
    #[command(
        alias = "cu",
        after_help = r#"EXAMPLES:
  Clean up a photo:
    studio cleanup photo.jpg

  Without saving the result:
    studio cleanup photo.jpg --no-download"#
    )]
    Cleanup(commands::cleanup::CleanupArgs),

    /// Edit a photo using a text instruction
    ///
    /// Applies a semantic edit while preserving the person's identity. An
    /// optional reference image can steer style, pose, or clothing.
    #[command(
        alias = "e",
        after_help = r#"EXAMPLES:
  Change details:
    studio edit portrait.png "add a subtle smile"

  Steer the edit with a reference image:
    studio edit portrait.png "copy this outfit" --reference outfit.jpg"#
    )]
    Edit(commands::edit::EditArgs),

    /// List available style presets and aspect ratios
    #[command(alias = "s")]
    Styles(commands::styles::StylesArgs),

    /// View or modify configuration
    ///
    /// Manage the API key, model, default style/ratio, and output settings.
    /// Changes are saved to the config file immediately.
    #[command(
        alias = "c",
        after_help = r#"EXAMPLES:
  Show all settings:
    studio config show

  Set values:
    studio config set api.key YOUR_API_KEY
    studio config set defaults.style monochrome
    studio config set defaults.aspect_ratio 16:9
    studio config set output.directory ~/Pictures/studio

  Reset to defaults:
    studio config reset --force

AVAILABLE SETTINGS:
  api.key               - Gemini API key
  api.model             - Model name
  api.base_url          - API base URL
  api.timeout_secs      - Request timeout in seconds
  defaults.style        - Default style preset
  defaults.aspect_ratio - Default aspect ratio
  output.directory      - Where to save images
  output.auto_download  - Auto-download results (true/false)
  output.display        - Display mode (terminal/viewer/none)"#
    )]
    Config(commands::config::ConfigArgs),
}
