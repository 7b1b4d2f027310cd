use crate::config::Config;
use crate::core::style::{ASPECT_RATIOS, STYLE_PRESETS};
use crate::core::Session;
use anyhow::Result;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Main session view
    Main,
    /// Text input mode
    Input,
    /// Settings screen
    Settings,
}

/// What the input line is currently collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    /// Path of the photo to transform
    OriginalPath,
    /// Path of an image to load into the editor
    EditingPath,
    /// Path of a reference image for edits
    ReferencePath,
    /// Edit instruction text
    Instruction,
}

impl InputPurpose {
    pub fn title(&self) -> &'static str {
        match self {
            InputPurpose::OriginalPath => "Photo path (Enter to load, Esc to cancel)",
            InputPurpose::EditingPath => "Image to edit (Enter to load, Esc to cancel)",
            InputPurpose::ReferencePath => "Reference image path (Enter to load, Esc to cancel)",
            InputPurpose::Instruction => "Edit instruction (Enter to apply, Esc to cancel)",
        }
    }
}

/// Settings field being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Model,
    Style,
    AspectRatio,
    TimeoutSecs,
    OutputDirectory,
    AutoDownload,
    Display,
}

impl SettingsField {
    pub fn all() -> &'static [SettingsField] {
        &[
            SettingsField::Model,
            SettingsField::Style,
            SettingsField::AspectRatio,
            SettingsField::TimeoutSecs,
            SettingsField::OutputDirectory,
            SettingsField::AutoDownload,
            SettingsField::Display,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::Model => "Model",
            SettingsField::Style => "Default Style",
            SettingsField::AspectRatio => "Default Aspect Ratio",
            SettingsField::TimeoutSecs => "Request Timeout (s)",
            SettingsField::OutputDirectory => "Output Directory",
            SettingsField::AutoDownload => "Auto Download",
            SettingsField::Display => "Display Mode",
        }
    }

    pub fn config_key(&self) -> &'static str {
        match self {
            SettingsField::Model => "api.model",
            SettingsField::Style => "defaults.style",
            SettingsField::AspectRatio => "defaults.aspect_ratio",
            SettingsField::TimeoutSecs => "api.timeout_secs",
            SettingsField::OutputDirectory => "output.directory",
            SettingsField::AutoDownload => "output.auto_download",
            SettingsField::Display => "output.display",
        }
    }
}

/// TUI application state
pub struct App {
    /// Current mode
    pub mode: AppMode,

    /// Configuration
    pub config: Config,

    /// The photo session being driven
    pub session: Session,

    /// Current text input
    pub input: String,

    /// Cursor position in input
    pub cursor_pos: usize,

    /// What the input line is for
    pub input_purpose: InputPurpose,

    /// Selected style index in the catalog
    pub style_index: usize,

    /// Selected aspect-ratio index in the catalog
    pub ratio_index: usize,

    /// Status message
    pub status_message: Option<String>,

    /// Error message
    pub error_message: Option<String>,

    /// Whether to quit
    pub should_quit: bool,

    /// Whether config was changed
    pub config_changed: bool,

    /// Settings: selected field index
    pub settings_selected: usize,

    /// Settings: currently editing
    pub settings_editing: bool,

    /// Settings: edit buffer
    pub settings_edit_buffer: String,
}

impl App {
    pub fn new(config: Config) -> Self {
        let style = config.default_style();
        let aspect_ratio = config.default_aspect_ratio();
        let style_index = STYLE_PRESETS
            .iter()
            .position(|p| p.id == style.id)
            .unwrap_or(0);
        let ratio_index = ASPECT_RATIOS
            .iter()
            .position(|r| r.id == aspect_ratio.id)
            .unwrap_or(0);
        let session = Session::with_selection(style, aspect_ratio);

        Self {
            mode: AppMode::Main,
            config,
            session,
            input: String::new(),
            cursor_pos: 0,
            input_purpose: InputPurpose::OriginalPath,
            style_index,
            ratio_index,
            status_message: None,
            error_message: None,
            should_quit: false,
            config_changed: false,
            settings_selected: 0,
            settings_editing: false,
            settings_edit_buffer: String::new(),
        }
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.error_message = None;
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error_message = Some(msg.into());
        self.status_message = None;
    }

    /// Clear messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }

    /// Select the next style preset
    pub fn next_style(&mut self) {
        self.style_index = (self.style_index + 1) % STYLE_PRESETS.len();
        self.session.select_style(STYLE_PRESETS[self.style_index].clone());
    }

    /// Select the previous style preset
    pub fn previous_style(&mut self) {
        self.style_index = (self.style_index + STYLE_PRESETS.len() - 1) % STYLE_PRESETS.len();
        self.session.select_style(STYLE_PRESETS[self.style_index].clone());
    }

    /// Select the next aspect ratio
    pub fn next_ratio(&mut self) {
        self.ratio_index = (self.ratio_index + 1) % ASPECT_RATIOS.len();
        self.session
            .select_aspect_ratio(ASPECT_RATIOS[self.ratio_index].clone());
    }

    /// Select the previous aspect ratio
    pub fn previous_ratio(&mut self) {
        self.ratio_index = (self.ratio_index + ASPECT_RATIOS.len() - 1) % ASPECT_RATIOS.len();
        self.session
            .select_aspect_ratio(ASPECT_RATIOS[self.ratio_index].clone());
    }

    /// Open the input line for a purpose
    pub fn open_input(&mut self, purpose: InputPurpose) {
        self.mode = AppMode::Input;
        self.input_purpose = purpose;
        self.input.clear();
        self.cursor_pos = 0;
        self.clear_messages();
    }

    /// Get current settings value
    pub fn get_settings_value(&self, field: &SettingsField) -> String {
        self.config
            .get(field.config_key())
            .unwrap_or_default()
    }

    /// Set settings value
    pub fn set_settings_value(&mut self, field: &SettingsField, value: &str) -> Result<()> {
        self.config.set(field.config_key(), value)?;
        self.config_changed = true;
        Ok(())
    }

    /// Get options for a settings field (if applicable)
    pub fn get_settings_options(&self, field: &SettingsField) -> Option<Vec<&'static str>> {
        match field {
            SettingsField::Style => Some(crate::core::style::style_ids()),
            SettingsField::AspectRatio => Some(crate::core::style::aspect_ratio_ids()),
            SettingsField::AutoDownload => Some(vec!["true", "false"]),
            SettingsField::Display => Some(crate::config::DisplayMode::variants().to_vec()),
            _ => None,
        }
    }

    /// Cycle to next option for a settings field
    pub fn cycle_settings_option(&mut self, field: &SettingsField) -> Result<()> {
        if let Some(options) = self.get_settings_options(field) {
            let current = self.get_settings_value(field);
            let current_idx = options.iter().position(|&o| o == current).unwrap_or(0);
            let next_idx = (current_idx + 1) % options.len();
            self.set_settings_value(field, options[next_idx])?;
        }
        Ok(())
    }
}
