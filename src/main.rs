//! Replays a scripted editing session against the in-memory backend and
//! prints the stored records.
//!
//! ```text
//! colabel-replay <session.json> [--config <config.json>]
//! ```

/// Replay entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    match replay::run(std::env::args().skip(1)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("colabel-replay: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

// The replay tool needs a filesystem
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod replay {
    use std::path::PathBuf;

    use serde::Deserialize;
    use thiserror::Error;

    use colabel::config::ConfigError;
    use colabel::keybindings::{KeyCode, Modifiers};
    use colabel::model::{ImageInfo, Label, Point, User};
    use colabel::sync::{MemoryBackend, MemoryRoom};
    use colabel::tools::ToolKind;
    use colabel::{Editor, EditorConfig, EditorEvent, SyncAdapter};

    #[derive(Error, Debug)]
    pub enum ReplayError {
        #[error("usage: colabel-replay <session.json> [--config <config.json>]")]
        Usage,

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Invalid session: {0}")]
        Session(#[from] serde_json::Error),

        #[error("Config error: {0}")]
        Config(#[from] ConfigError),
    }

    /// A recorded editing session.
    #[derive(Debug, Deserialize)]
    struct Session {
        #[serde(default)]
        project: String,
        image: ImageInfo,
        #[serde(default)]
        labels: Vec<Label>,
        user: Option<User>,
        #[serde(default)]
        steps: Vec<Step>,
    }

    /// One input event, in client coordinates.
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Step {
        Tool(ToolKind),
        Label(String),
        Down(Point),
        Move(Point),
        Up(Point),
        Click(Point),
        Key {
            key: KeyCode,
            #[serde(default)]
            modifiers: Modifiers,
        },
        Text(String),
        Zoom { percent: f64, at: Point },
        /// Reload if other participants stored something.
        Poll,
    }

    pub fn run(mut args: impl Iterator<Item = String>) -> Result<(), ReplayError> {
        let session_path = PathBuf::from(args.next().ok_or(ReplayError::Usage)?);
        let config = match (args.next().as_deref(), args.next()) {
            (Some("--config"), Some(path)) => EditorConfig::load(&PathBuf::from(path))?,
            (None, _) => EditorConfig::load_from_default_path().unwrap_or_default(),
            _ => return Err(ReplayError::Usage),
        };

        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let session: Session = serde_json::from_str(&std::fs::read_to_string(&session_path)?)?;
        log::info!(
            "Replaying {} steps on image {}",
            session.steps.len(),
            session.image.id
        );

        let backend = MemoryBackend::with_labels(session.labels);
        let mut sync = SyncAdapter::new(backend.clone(), MemoryRoom::new());
        let mut editor = Editor::new(&config);
        editor.set_user(session.user);
        if let Err(e) = pollster::block_on(sync.refresh_labels(&mut editor, &session.project)) {
            log::warn!("Could not load labels: {}", e);
        }
        editor.set_image(session.image);

        for step in session.steps {
            if matches!(step, Step::Poll) {
                if let Err(e) = pollster::block_on(sync.poll_peers(&mut editor)) {
                    log::warn!("Reload failed: {}", e);
                }
                continue;
            }
            let events = apply(&mut editor, step);
            for event in events {
                match event {
                    EditorEvent::Sync(intent) => {
                        if let Err(e) = pollster::block_on(sync.dispatch(&mut editor, intent)) {
                            log::warn!("Sync failed: {}", e);
                        }
                    }
                    EditorEvent::AdvanceLabel => {
                        editor.advance_label();
                    }
                }
            }
        }

        println!("{}", serde_json::to_string_pretty(&backend.records())?);
        Ok(())
    }

    fn apply(editor: &mut Editor, step: Step) -> Vec<EditorEvent> {
        match step {
            Step::Tool(tool) => editor.set_tool(tool),
            Step::Label(id) => {
                editor.set_label(&id);
                Vec::new()
            }
            Step::Down(p) => editor.pointer_down(p),
            Step::Move(p) => editor.pointer_move(p),
            Step::Up(p) => editor.pointer_up(p),
            Step::Click(p) => editor.click(p),
            Step::Key { key, modifiers } => editor.key_down(key, modifiers),
            Step::Text(text) => {
                editor.text_input(&text);
                Vec::new()
            }
            Step::Zoom { percent, at } => {
                editor.zoom_at(percent, at);
                Vec::new()
            }
            Step::Poll => Vec::new(),
        }
    }
}
