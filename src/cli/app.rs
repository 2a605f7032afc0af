//! CLI module for the notebox application
//!
//! This module turns parsed commands into calls on the note repository and
//! the theme state, and prints the results.
use std::{
    fs::{read_to_string, write},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use console::{style, Color, Style};
use log::info;
use shell_words::split;
use tempfile::Builder;

use crate::{
    content_preview, editor_template, process_editor_content, render_note, Commands, Config,
    KeyValueStore, Note, NoteRepository, NoteboxError, Result, StorageNotice, Theme,
    ThemeCommand, ThemeRegistry, ThemeState,
};

/// CLI Application handler - processes CLI commands against the notes and theme state
pub struct App<S: KeyValueStore + Clone> {
    /// The note repository
    notes: NoteRepository<S>,

    /// The active theme
    theme: ThemeState<S>,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl<S: KeyValueStore + Clone> App<S> {
    /// Create a new CLI application whose notes and theme share `store`
    pub fn new(store: S, config: Config, verbose: bool) -> Self {
        Self {
            theme: ThemeState::init(store.clone()),
            notes: NoteRepository::new(store),
            config,
            verbose,
        }
    }

    pub fn notes(&mut self) -> &mut NoteRepository<S> {
        &mut self.notes
    }

    pub fn theme(&self) -> &ThemeState<S> {
        &self.theme
    }

    /// Run the CLI application with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Create {
                title,
                content,
                file,
                markdown,
            } => self.create_note(title, content, file, markdown)?,

            Commands::List {
                search,
                limit,
                json,
            } => self.list_notes(search, limit, json)?,

            Commands::Recent => {
                let notes = self.notes.recent(self.config.recent_count);
                if notes.is_empty() {
                    println!("No notes yet. Create your first note with `notebox create`.");
                } else {
                    self.display_notes_text(&notes);
                }
            }

            Commands::View { id, json, html } => self.view_note(id, json, html)?,

            Commands::Edit {
                id,
                title,
                content,
                file,
            } => self.edit_note(id, title, content, file)?,

            Commands::Delete { id } => self.delete_note(id)?,

            Commands::Clear { force } => self.clear_notes(force)?,

            Commands::Theme { action } => self.handle_theme(action)?,
        }

        for notice in self.take_notices() {
            eprintln!("{} {}", style("warning:").yellow().bold(), notice);
        }

        Ok(())
    }

    /// Storage warnings raised by either component since the last call
    pub fn take_notices(&mut self) -> Vec<StorageNotice> {
        self.notes
            .take_notice()
            .into_iter()
            .chain(self.theme.take_notice())
            .collect()
    }

    fn accent(&self) -> Style {
        Style::new().fg(accent_color(self.theme.get())).bold()
    }

    fn create_note(
        &mut self,
        title: String,
        content: Option<String>,
        file: Option<PathBuf>,
        markdown: bool,
    ) -> Result<()> {
        let note_content = match self.resolve_content(content, file)? {
            Some(content) => content,
            None => self.open_editor_for_content(&title, "")?,
        };

        match self.notes.add(&title, &note_content, markdown) {
            Some(note) => println!("Note created with ID: {}", self.accent().apply_to(note.id)),
            None => println!("Nothing to save: note content is empty."),
        }
        Ok(())
    }

    /// Content given inline or through a file. `None` means ask the editor.
    fn resolve_content(
        &self,
        content: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<Option<String>> {
        match (content, file) {
            (Some(_), Some(_)) => Err(NoteboxError::InvalidInput {
                message: "Cannot specify both --content and --file options".to_string(),
            }),
            (Some(content), None) => Ok(Some(content)),
            (None, Some(file_path)) => {
                if !file_path.exists() {
                    return Err(NoteboxError::InvalidInput {
                        message: format!("File not found: {}", file_path.display()),
                    });
                }
                Ok(Some(read_to_string(file_path)?))
            }
            (None, None) => Ok(None),
        }
    }

    fn open_editor_for_content(&self, title: &str, existing: &str) -> Result<String> {
        // Create a temporary file with .md extension
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();
        write(&temp_path, editor_template(title, existing))?;

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to write note content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(process_editor_content(&content))
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        // Handle shell-like command parsing
        let args = split(editor_cmd).map_err(|e| NoteboxError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let (program, rest) = args.split_first().ok_or_else(|| NoteboxError::EditorError {
            message: "Empty editor command".to_string(),
        })?;

        let status = Command::new(program).args(rest).arg(file_path).status()?;
        if !status.success() {
            return Err(NoteboxError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }

    fn list_notes(&mut self, search: Option<String>, limit: usize, json: bool) -> Result<()> {
        let mut notes = self.notes.list(search.as_deref());
        if limit > 0 {
            notes.truncate(limit);
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&notes)?);
            return Ok(());
        }

        if notes.is_empty() {
            match search {
                Some(term) => println!("No notes found matching \"{}\".", term),
                None => println!("No notes yet. Create your first note with `notebox create`."),
            }
            return Ok(());
        }

        self.display_notes_text(&notes);
        println!(
            "\n{} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    /// Display notes in text format
    fn display_notes_text(&self, notes: &[Note]) {
        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            println!("ID: {} | {}", self.accent().apply_to(note.id), note.date);
            if !note.title.is_empty() {
                println!("Title: {}", style(&note.title).bold());
            }

            if self.verbose {
                println!("\n{}", render_note(note, false));
            } else {
                let preview = content_preview(&note.content, term_width.saturating_sub(10).max(20));
                println!("{}", preview);
            }
        }
    }

    fn find_note(&mut self, id: u64) -> Result<Note> {
        self.notes.get(id).ok_or(NoteboxError::NoteNotFound { id })
    }

    fn view_note(&mut self, id: u64, json: bool, html: bool) -> Result<()> {
        let note = self.find_note(id)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&note)?);
        } else if html {
            print!("{}", render_note(&note, true));
        } else {
            if !note.title.is_empty() {
                println!("{}", self.accent().apply_to(&note.title));
            }
            println!("{}", style(&note.date).dim());
            if self.verbose {
                println!(
                    "Color: {} -> {} (text {})",
                    note.color,
                    note.darker_color(),
                    note.text_color()
                );
            }
            if note.is_markdown {
                println!("{}", style("markdown").italic());
            }
            println!("\n{}", render_note(&note, false));
        }
        Ok(())
    }

    fn edit_note(
        &mut self,
        id: u64,
        title: Option<String>,
        content: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<()> {
        let note = self.find_note(id)?;
        let rename_only = title.is_some() && content.is_none() && file.is_none();

        let new_content = if rename_only {
            None
        } else {
            let raw = match self.resolve_content(content, file)? {
                Some(content) => content,
                None => self.open_editor_for_content(&note.title, &note.content)?,
            };
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(NoteboxError::InvalidInput {
                    message: "Note content cannot be empty".to_string(),
                });
            }
            Some(trimmed.to_string())
        };

        if let Some(title) = &title {
            self.notes.update_title(id, title);
        }
        if let Some(content) = &new_content {
            self.notes.update(id, content);
        }

        println!("Note {} updated.", self.accent().apply_to(id));
        Ok(())
    }

    fn delete_note(&mut self, id: u64) -> Result<()> {
        let note = self.find_note(id)?;
        self.notes.delete(id);

        if note.title.is_empty() {
            println!("Note {} has been deleted.", note.id);
        } else {
            println!("Note '{}' ({}) has been deleted.", note.title, note.id);
        }
        Ok(())
    }

    fn clear_notes(&mut self, force: bool) -> Result<()> {
        let count = self.notes.len();
        if count == 0 {
            println!("There are no notes to clear.");
            return Ok(());
        }

        let prompt = format!("Delete ALL {} notes? This cannot be undone. [y/N]: ", count);
        if !force && !confirm(&prompt)? {
            println!("Clear cancelled.");
            return Ok(());
        }

        self.notes.clear();
        println!("All notes cleared.");
        Ok(())
    }

    fn handle_theme(&mut self, action: ThemeCommand) -> Result<()> {
        match action {
            ThemeCommand::List => {
                let active = self.theme.get().name;
                for theme in ThemeRegistry::all() {
                    let marker = if theme.name == active { "*" } else { " " };
                    let name = Style::new().fg(accent_color(theme)).apply_to(theme.name);
                    println!("{} {:<8} {}", marker, name, theme.label);
                }
            }
            ThemeCommand::Show => {
                let theme = self.theme.get();
                println!("{} ({})", self.accent().apply_to(theme.label), theme.name);
                if self.verbose {
                    println!("{}", self.theme.root_class());
                }
            }
            ThemeCommand::Set { name } => {
                let theme = self.theme.set_by_name(&name)?;
                println!("Theme set to {}", self.accent().apply_to(theme.label));
            }
        }
        Ok(())
    }
}

/// Terminal color closest to a theme's accent
fn accent_color(theme: &Theme) -> Color {
    match theme.name {
        "forest" => Color::Green,
        "sunset" => Color::Yellow,
        _ => Color::Cyan,
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, NOTES_KEY, THEME_KEY};

    fn app(store: &MemoryStore) -> App<&MemoryStore> {
        App::new(store, Config::default(), false)
    }

    fn create(content: &str) -> Commands {
        Commands::Create {
            title: String::new(),
            content: Some(content.to_string()),
            file: None,
            markdown: false,
        }
    }

    #[test]
    fn create_list_delete() {
        let store = MemoryStore::new();
        let mut app = app(&store);

        app.run(create("Buy milk")).unwrap();
        app.run(create("Plan trip")).unwrap();
        let notes = app.notes().list(None);
        assert_eq!(notes.len(), 2);

        app.run(Commands::Delete { id: notes[1].id }).unwrap();
        let remaining = app.notes().list(None);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].content, "Plan trip");
    }

    #[test]
    fn missing_note_is_reported() {
        let store = MemoryStore::new();
        let mut app = app(&store);
        assert!(matches!(
            app.run(Commands::Delete { id: 4 }),
            Err(NoteboxError::NoteNotFound { id: 4 })
        ));
        assert!(matches!(
            app.run(Commands::View { id: 4, json: false, html: false }),
            Err(NoteboxError::NoteNotFound { .. })
        ));
    }

    #[test]
    fn edit_updates_title_and_content() {
        let store = MemoryStore::new();
        let mut app = app(&store);
        app.run(create("draft")).unwrap();
        let id = app.notes().list(None)[0].id;

        app.run(Commands::Edit {
            id,
            title: Some("Final".into()),
            content: None,
            file: None,
        })
        .unwrap();
        app.run(Commands::Edit {
            id,
            title: None,
            content: Some("done".into()),
            file: None,
        })
        .unwrap();

        let note = app.notes().get(id).unwrap();
        assert_eq!(note.title, "Final");
        assert_eq!(note.content, "done");
    }

    #[test]
    fn edit_rejects_blank_content_and_conflicting_sources() {
        let store = MemoryStore::new();
        let mut app = app(&store);
        app.run(create("draft")).unwrap();
        let id = app.notes().list(None)[0].id;

        let blank = Commands::Edit {
            id,
            title: None,
            content: Some("   ".into()),
            file: None,
        };
        assert!(matches!(app.run(blank), Err(NoteboxError::InvalidInput { .. })));

        let both = Commands::Edit {
            id,
            title: None,
            content: Some("x".into()),
            file: Some(PathBuf::from("x.md")),
        };
        assert!(matches!(app.run(both), Err(NoteboxError::InvalidInput { .. })));
        assert_eq!(app.notes().get(id).unwrap().content, "draft");
    }

    #[test]
    fn forced_clear_empties_everything() {
        let store = MemoryStore::new();
        let mut app = app(&store);
        app.run(create("a")).unwrap();
        app.run(Commands::Clear { force: true }).unwrap();
        assert!(app.notes().is_empty());
    }

    #[test]
    fn theme_set_is_shared_through_the_store() {
        let store = MemoryStore::new();
        let mut app = app(&store);
        app.run(Commands::Theme {
            action: ThemeCommand::Set {
                name: "forest".into(),
            },
        })
        .unwrap();
        assert_eq!(store.load(THEME_KEY).unwrap().as_deref(), Some("forest"));

        let reopened = App::new(&store, Config::default(), false);
        assert_eq!(reopened.theme().get().name, "forest");

        assert!(matches!(
            app.run(Commands::Theme {
                action: ThemeCommand::Set { name: "neon".into() }
            }),
            Err(NoteboxError::ThemeNotFound { .. })
        ));
    }

    #[test]
    fn storage_failure_keeps_notes_in_memory() {
        let store = MemoryStore::new();
        let mut app = app(&store);
        store.set_available(false);

        app.run(create("offline")).unwrap();
        assert!(app.take_notices().is_empty());
        assert_eq!(app.notes().len(), 1);
    }

    #[test]
    fn storage_failure_raises_one_notice() {
        let store = MemoryStore::new();
        let mut app = app(&store);
        store.set_available(false);

        app.notes().add("", "first", false).unwrap();
        app.notes().add("", "second", false).unwrap();
        let notices = app.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].key, NOTES_KEY);
        assert!(app.take_notices().is_empty());
    }

    #[test]
    fn rejected_edit_changes_nothing() {
        let store = MemoryStore::new();
        let mut app = app(&store);
        app.run(Commands::Create {
            title: "Orig".into(),
            content: Some("body".into()),
            file: None,
            markdown: false,
        })
        .unwrap();
        let id = app.notes().list(None)[0].id;
        let stored = store.load(NOTES_KEY).unwrap();

        let result = app.run(Commands::Edit {
            id,
            title: Some("Renamed".into()),
            content: Some("   ".into()),
            file: None,
        });
        assert!(matches!(result, Err(NoteboxError::InvalidInput { .. })));

        let note = app.notes().get(id).unwrap();
        assert_eq!(note.title, "Orig");
        assert_eq!(note.content, "body");
        assert_eq!(store.load(NOTES_KEY).unwrap(), stored);
    }
}
