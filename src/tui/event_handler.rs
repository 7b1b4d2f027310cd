use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::path::{Path, PathBuf};

use super::app::{App, AppMode, InputPurpose, SettingsField};
use crate::api::StudioClient;
use crate::core::session::download_filename;
use crate::core::UploadTarget;
use crate::media;

/// Handle input in main mode
pub async fn handle_main_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        // Style picker
        KeyCode::Left | KeyCode::Char('h') => {
            app.previous_style();
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.next_style();
        }

        // Aspect-ratio picker
        KeyCode::Up | KeyCode::Char('k') => {
            app.previous_ratio();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.next_ratio();
        }

        // Upload targets
        KeyCode::Char('o') => app.open_input(InputPurpose::OriginalPath),
        KeyCode::Char('t') => app.open_input(InputPurpose::EditingPath),
        KeyCode::Char('r') => app.open_input(InputPurpose::ReferencePath),
        KeyCode::Char('x') => {
            app.session.clear_reference();
            app.set_status("Reference image cleared");
        }

        // Flows
        KeyCode::Char('g') => run_generate(app).await?,
        KeyCode::Char('c') => run_clean_up(app).await?,
        KeyCode::Char('e') => {
            // Make sure there is something to edit before asking for text
            if app.session.state.editing.is_none() && !app.session.forward_to_editor() {
                app.set_error(
                    "There is no image to edit yet. Generate a photo or load one with 't'.",
                );
            } else {
                app.open_input(InputPurpose::Instruction);
            }
        }
        KeyCode::Char('f') => {
            if app.session.forward_to_editor() {
                app.set_status("Result loaded into the editor");
            } else {
                app.set_error("No result to edit yet");
            }
        }

        // Download the current result
        KeyCode::Char('d') => download_result(app).await?,

        // Open settings
        KeyCode::Char('s') => {
            app.mode = AppMode::Settings;
            app.settings_selected = 0;
            app.settings_editing = false;
        }

        // Quit
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }

        _ => {}
    }
    Ok(())
}

/// Handle input in text input mode
pub async fn handle_input_mode(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            app.mode = AppMode::Main;
            app.input.clear();
            app.cursor_pos = 0;
        }

        KeyCode::Enter => {
            if !app.input.is_empty() {
                let text = app.input.clone();
                app.input.clear();
                app.cursor_pos = 0;
                app.mode = AppMode::Main;

                match app.input_purpose {
                    InputPurpose::OriginalPath => {
                        load_upload(app, UploadTarget::Original, &text).await;
                    }
                    InputPurpose::EditingPath => {
                        load_upload(app, UploadTarget::Editing, &text).await;
                    }
                    InputPurpose::ReferencePath => {
                        load_upload(app, UploadTarget::Reference, &text).await;
                    }
                    InputPurpose::Instruction => {
                        app.session.set_instruction(text);
                        run_edit(app).await?;
                    }
                }
            }
        }

        KeyCode::Char(c) => {
            app.input.insert(app.cursor_pos, c);
            app.cursor_pos += 1;
        }

        KeyCode::Backspace => {
            if app.cursor_pos > 0 {
                app.cursor_pos -= 1;
                app.input.remove(app.cursor_pos);
            }
        }

        KeyCode::Delete => {
            if app.cursor_pos < app.input.len() {
                app.input.remove(app.cursor_pos);
            }
        }

        KeyCode::Left => {
            if app.cursor_pos > 0 {
                app.cursor_pos -= 1;
            }
        }

        KeyCode::Right => {
            if app.cursor_pos < app.input.len() {
                app.cursor_pos += 1;
            }
        }

        KeyCode::Home => {
            app.cursor_pos = 0;
        }

        KeyCode::End => {
            app.cursor_pos = app.input.len();
        }

        _ => {}
    }
    Ok(())
}

/// Handle input in settings mode
pub fn handle_settings_input(app: &mut App, key: KeyEvent) -> Result<()> {
    let fields = SettingsField::all();

    if app.settings_editing {
        // Editing a text field
        match key.code {
            KeyCode::Esc => {
                app.settings_editing = false;
                app.settings_edit_buffer.clear();
            }

            KeyCode::Enter => {
                let field = fields[app.settings_selected];
                let value = app.settings_edit_buffer.clone();
                if let Err(e) = app.set_settings_value(&field, &value) {
                    app.set_error(e.to_string());
                } else {
                    app.set_status(format!("Updated {}", field.label()));
                }
                app.settings_editing = false;
                app.settings_edit_buffer.clear();
            }

            KeyCode::Char(c) => {
                app.settings_edit_buffer.push(c);
            }

            KeyCode::Backspace => {
                app.settings_edit_buffer.pop();
            }

            _ => {}
        }
    } else {
        // Navigation
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if app.settings_selected > 0 {
                    app.settings_selected -= 1;
                }
            }

            KeyCode::Down | KeyCode::Char('j') => {
                if app.settings_selected < fields.len() - 1 {
                    app.settings_selected += 1;
                }
            }

            KeyCode::Enter | KeyCode::Char(' ') => {
                let field = &fields[app.settings_selected];

                // Check if this field has options to cycle
                if app.get_settings_options(field).is_some() {
                    app.cycle_settings_option(field)?;
                    app.set_status(format!("Updated {}", field.label()));
                } else {
                    // Enter edit mode for text fields
                    app.settings_editing = true;
                    app.settings_edit_buffer = app.get_settings_value(field);
                }
            }

            KeyCode::Esc | KeyCode::Char('q') => {
                app.mode = AppMode::Main;
                app.clear_messages();
            }

            _ => {}
        }
    }
    Ok(())
}

/// Read a file into the session through an upload ticket, so a later upload
/// for the same target always wins.
async fn load_upload(app: &mut App, target: UploadTarget, path: &str) {
    let ticket = app.session.begin_upload(target);
    let result = media::encode_file(Path::new(path)).await;
    let label = match &result {
        Ok(asset) => Some(asset.mime_type().to_string()),
        Err(_) => None,
    };
    app.session.finish_upload(ticket, &result);

    match result {
        Ok(_) => {
            let what = match target {
                UploadTarget::Original => "Photo",
                UploadTarget::Editing => "Edit target",
                UploadTarget::Reference => "Reference",
            };
            app.set_status(format!(
                "{} loaded: {} ({})",
                what,
                path,
                label.unwrap_or_default()
            ));
        }
        Err(e) => app.set_error(e.to_string()),
    }
}

fn make_client(app: &mut App) -> Option<StudioClient> {
    match StudioClient::from_config(&app.config) {
        Ok(client) => Some(client),
        Err(e) => {
            app.set_error(e.to_string());
            None
        }
    }
}

/// Run the style-generation flow
async fn run_generate(app: &mut App) -> Result<()> {
    let Some(client) = make_client(app) else {
        return Ok(());
    };

    let style = app.session.style.display_name;
    app.set_status(format!("Generating studio portrait ({})...", style));

    match app.session.generate(&client).await {
        Ok(_) => finish_success(app, "Studio portrait ready").await,
        Err(e) => app.set_error(e.to_string()),
    }
    Ok(())
}

/// Run the clean-up flow
async fn run_clean_up(app: &mut App) -> Result<()> {
    let Some(client) = make_client(app) else {
        return Ok(());
    };

    app.set_status("Cleaning up photo...");

    match app.session.clean_up(&client).await {
        Ok(_) => finish_success(app, "Photo cleaned up").await,
        Err(e) => app.set_error(e.to_string()),
    }
    Ok(())
}

/// Run the edit flow
async fn run_edit(app: &mut App) -> Result<()> {
    let Some(client) = make_client(app) else {
        return Ok(());
    };

    app.set_status("Applying edit...");

    match app.session.edit(&client).await {
        Ok(_) => finish_success(app, "Edit applied").await,
        Err(e) => app.set_error(e.to_string()),
    }
    Ok(())
}

/// Report a finished flow, auto-downloading when configured.
async fn finish_success(app: &mut App, message: &str) {
    if app.config.output.auto_download {
        if let Some(entry) = app.session.state.history.last() {
            let dir = PathBuf::from(&app.config.output.directory);
            let filename = download_filename(entry.flow);
            match media::save_image(&entry.image, &dir, filename).await {
                Ok(path) => {
                    app.set_status(format!("{}: {}", message, path.display()));
                    return;
                }
                Err(e) => {
                    app.set_error(format!("Download failed: {}", e));
                    return;
                }
            }
        }
    }
    app.set_status(message.to_string());
}

/// Save the most recent result to the output directory.
async fn download_result(app: &mut App) -> Result<()> {
    let Some(entry) = app.session.state.history.last().cloned() else {
        app.set_error("No result to download yet");
        return Ok(());
    };

    let dir = PathBuf::from(&app.config.output.directory);
    let filename = download_filename(entry.flow);
    match media::save_image(&entry.image, &dir, filename).await {
        Ok(path) => app.set_status(format!("Saved: {}", path.display())),
        Err(e) => app.set_error(format!("Download failed: {}", e)),
    }
    Ok(())
}
