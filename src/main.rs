// SPDX-License-Identifier: MIT
//
// kilo: a small terminal text editor.
//
// This is the main binary that wires the two crates together:
//
//   kilo-term   → raw mode, key decoding, ANSI output, event loop
//   kilo-editor → rows, highlighting, cursor, search, viewport, config
//
// The Editor struct implements kilo-term's App trait. Each keypress flows
// through:
//
//   stdin → parser → on_key → prompt or key map → document/cursor mutation
//   paint → view.render → output buffer → one write to the terminal
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ gutter + text rows           │  ← h - 2 rows (managed by View)
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row (managed by View)
//   ├──────────────────────────────┤
//   │ prompt / message bar         │  ← 1 row (text supplied by Editor)
//   └──────────────────────────────┘

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::{ArgAction, Parser};
use log::{LevelFilter, debug, info, warn};

use kilo_editor::Error;
use kilo_editor::config::Config;
use kilo_editor::cursor::Cursor;
use kilo_editor::document::Document;
use kilo_editor::prompt::{Prompt, PromptEvent, PromptKind};
use kilo_editor::search::{SearchKey, SearchSession};
use kilo_editor::view::{StatusMessage, View};

use kilo_term::event_loop::{Action, App, EventLoop};
use kilo_term::input::{KeyCode, KeyEvent};
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;

const HELP: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "kilo", version, about, long_about = None)]
struct Args {
    /// File to edit. Created on first save if it does not exist.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Load configuration from a specific file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to a specific file
    #[arg(long = "log", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (repeat for more detail)
    #[arg(short = 'v', action = ArgAction::Count)]
    verbosity: u8,
}

// ─── Logging ────────────────────────────────────────────────────────────────

const fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Send log records to `path`. The terminal belongs to the editor, so
/// nothing is ever logged to stdout or stderr.
fn setup_logging(verbosity: u8, path: &Path) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                message
            ));
        })
        .level(level_for(verbosity))
        .chain(fern::log_file(path)?)
        .apply()?;
    Ok(())
}

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The whole editor state.
struct Editor {
    doc: Document,
    cursor: Cursor,
    view: View,
    config: Config,
    /// Open prompt, if any. Keys go here first.
    prompt: Option<Prompt>,
    /// Live while the search prompt is open.
    search: Option<SearchSession>,
    message: StatusMessage,
    /// Whether `message` was visible at the last tick.
    message_visible: bool,
    /// Ctrl-Q presses still needed to quit with unsaved changes.
    quit_times: u32,
}

impl Editor {
    fn new(doc: Document, config: Config, size: Size) -> Self {
        Self {
            doc,
            cursor: Cursor::new(),
            view: View::new(size, config.line_numbers),
            config,
            prompt: None,
            search: None,
            message: StatusMessage::new(HELP),
            message_visible: true,
            quit_times: config.quit_times,
        }
    }

    fn set_message(&mut self, text: impl Into<String>) {
        self.message = StatusMessage::new(text);
        self.message_visible = true;
    }

    // ── Key map ─────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: &KeyEvent) -> Action {
        if key.is_ctrl(b'q') {
            if self.doc.is_dirty() && self.quit_times > 0 {
                self.set_message(format!(
                    "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                    self.quit_times
                ));
                self.quit_times -= 1;
                return Action::Continue;
            }
            return Action::Quit;
        }
        self.quit_times = self.config.quit_times;

        match key.code {
            KeyCode::Enter => {
                let pos = self
                    .doc
                    .split_at(self.cursor.position(), self.config.auto_indent);
                self.cursor.set_position(pos, &self.doc);
            }
            _ if key.is_ctrl(b's') => self.save(),
            _ if key.is_ctrl(b'f') => self.start_search(),
            _ if key.is_ctrl(b'h') => self.delete_before(),
            _ if key.is_ctrl(b'l') => {}
            KeyCode::Backspace => self.delete_before(),
            KeyCode::Delete => {
                self.cursor.move_right(&self.doc);
                self.delete_before();
            }
            KeyCode::Escape => {}
            KeyCode::Left => self.cursor.move_left(&self.doc),
            KeyCode::Right => self.cursor.move_right(&self.doc),
            KeyCode::Up => self.cursor.move_up(&self.doc),
            KeyCode::Down => self.cursor.move_down(&self.doc),
            KeyCode::Home => self.cursor.move_to_line_start(),
            KeyCode::End => self.cursor.move_to_line_end(&self.doc),
            KeyCode::PageUp => {
                let top = self.view.viewport().row_offset;
                self.cursor.page_up(&self.doc, top, self.view.text_rows());
            }
            KeyCode::PageDown => {
                let top = self.view.viewport().row_offset;
                self.cursor.page_down(&self.doc, top, self.view.text_rows());
            }
            KeyCode::Tab | KeyCode::Char(_) => {
                if let Some(byte) = key.as_byte() {
                    let pos = self.doc.insert_char_at(self.cursor.position(), byte);
                    self.cursor.set_position(pos, &self.doc);
                }
            }
        }
        Action::Continue
    }

    fn delete_before(&mut self) {
        if let Some(pos) = self.doc.delete_char_before(self.cursor.position()) {
            self.cursor.set_position(pos, &self.doc);
        }
    }

    // ── Save ────────────────────────────────────────────────────────────

    fn save(&mut self) {
        if self.doc.path().is_none() {
            self.open_prompt(PromptKind::SaveAs);
            return;
        }
        let result = self.doc.save();
        self.report_save(result);
    }

    fn save_as(&mut self, name: &str) {
        let result = self.doc.save_as(Path::new(name));
        self.report_save(result);
    }

    fn report_save(&mut self, result: kilo_editor::Result<usize>) {
        match result {
            Ok(written) => self.set_message(format!("{written} bytes written to disk")),
            Err(e) => {
                warn!("save failed: {e}");
                let cause = e
                    .io_source()
                    .map_or_else(|| e.to_string(), ToString::to_string);
                self.set_message(format!("Can't save! I/O error: {cause}"));
            }
        }
    }

    // ── Prompt ──────────────────────────────────────────────────────────

    fn open_prompt(&mut self, kind: PromptKind) {
        debug!("prompt opened: {kind:?}");
        self.prompt = Some(Prompt::new(kind));
    }

    fn close_prompt(&mut self) {
        self.prompt = None;
        self.set_message("");
    }

    fn handle_prompt_key(&mut self, key: &KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        let event = prompt.handle(key);
        let query = prompt.input().to_owned();

        match prompt.kind() {
            PromptKind::SaveAs => match event {
                PromptEvent::Submitted(name) => {
                    self.close_prompt();
                    self.save_as(&name);
                }
                PromptEvent::Cancelled => {
                    self.close_prompt();
                    self.set_message("Save aborted");
                }
                PromptEvent::Edited | PromptEvent::Unchanged => {}
            },
            PromptKind::Search => self.search_step(key, &event, &query),
        }
    }

    // ── Search ──────────────────────────────────────────────────────────

    fn start_search(&mut self) {
        let rx = self.cursor.rx(&self.doc);
        self.search = Some(SearchSession::start(
            self.cursor.position(),
            rx,
            self.view.viewport(),
        ));
        self.open_prompt(PromptKind::Search);
    }

    fn search_step(&mut self, key: &KeyEvent, event: &PromptEvent, query: &str) {
        let Some(session) = self.search.as_mut() else {
            return;
        };
        let search_key = match key.code {
            KeyCode::Enter | KeyCode::Escape => SearchKey::Finish,
            KeyCode::Right | KeyCode::Down => SearchKey::Next,
            KeyCode::Left | KeyCode::Up => SearchKey::Previous,
            _ => SearchKey::Edit,
        };

        let rx = self.cursor.rx(&self.doc);
        let found = session.step(
            &mut self.doc,
            query.as_bytes(),
            search_key,
            self.cursor.position(),
            rx,
        );
        if let Some(pos) = found {
            self.cursor.set_position(pos, &self.doc);
            // Scroll so the match lands on the top row.
            let mut viewport = self.view.viewport();
            viewport.row_offset = self.doc.len();
            self.view.set_viewport(viewport);
        }

        match event {
            PromptEvent::Cancelled => {
                let (origin, viewport) = session.origin();
                self.cursor.set_position(origin, &self.doc);
                self.view.set_viewport(viewport);
                self.search = None;
                self.close_prompt();
            }
            PromptEvent::Submitted(_) => {
                self.search = None;
                self.close_prompt();
            }
            PromptEvent::Edited | PromptEvent::Unchanged => {}
        }
    }
}

impl App for Editor {
    fn on_key(&mut self, key: &KeyEvent) -> Action {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return Action::Continue;
        }
        self.handle_key(key)
    }

    fn on_resize(&mut self, size: Size) {
        self.view.resize(size);
    }

    fn on_tick(&mut self) -> bool {
        let visible = self.message.visible_at(Instant::now()).is_some();
        let expired = self.message_visible && !visible;
        self.message_visible = visible;
        expired
    }

    fn paint(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        let prompt_line = self.prompt.as_ref().map(Prompt::message);
        let message = prompt_line
            .as_deref()
            .or_else(|| self.message.visible_at(Instant::now()));
        self.view.render(out, &self.doc, &self.cursor, message)
    }
}

// ─── Startup ────────────────────────────────────────────────────────────────

/// Open `path`, or start an empty document bound to it if it does not exist.
fn open_document(path: &Path, tab_stop: usize) -> kilo_editor::Result<Document> {
    match Document::open(path, tab_stop) {
        Ok(doc) => Ok(doc),
        Err(e) if is_not_found(&e) => {
            info!("{} does not exist, starting empty", path.display());
            let mut doc = Document::new(tab_stop);
            doc.set_path(path.to_path_buf());
            Ok(doc)
        }
        Err(e) => Err(e),
    }
}

fn is_not_found(e: &Error) -> bool {
    e.io_source()
        .is_some_and(|source| source.kind() == io::ErrorKind::NotFound)
}

fn main() {
    let args = Args::parse();

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| env::temp_dir().join("kilo.log"));
    if let Err(e) = setup_logging(args.verbosity, &log_path) {
        eprintln!("kilo: cannot log to {}: {e}", log_path.display());
        process::exit(1);
    }

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::discover(args.config.as_deref(), &cwd).unwrap_or_else(|e| {
        eprintln!("kilo: {e}");
        process::exit(1);
    });

    let doc = match &args.file {
        Some(path) => open_document(path, config.tab_stop).unwrap_or_else(|e| {
            eprintln!("kilo: {e}");
            process::exit(1);
        }),
        None => Document::new(config.tab_stop),
    };

    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("kilo: failed to initialize terminal: {e}");
        process::exit(1);
    });

    let mut editor = Editor::new(doc, config, event_loop.size());
    info!("kilo started, {} rows", editor.doc.len());

    if let Err(e) = event_loop.run(&mut editor) {
        eprintln!("kilo: {e}");
        process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
