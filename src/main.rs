//! Line-oriented host for the shoplist engine.
//!
//! Reads commands from stdin, turns them into engine events, executes the
//! resulting actions against the sync worker, and prints the list after every
//! change.
//!
//! # Usage
//!
//! ```text
//! shoplist [CONFIG.toml] [key=value ...]
//! ```
//!
//! # Commands
//!
//! - `ls`: Print the list
//! - `add`: Append a placeholder
//! - `edit <id> <text>`: Replace an item's text and commit it
//! - `type <id> <text>`: Replace an item's text without committing
//! - `imp <id> <important|normal|unimportant>`: Set importance
//! - `rm <id>`: Remove an item
//! - `undo`: Undo the last change
//! - `expand <id>` / `collapse <id>`: Toggle the options row
//! - `quit`: Exit

#![allow(clippy::multiple_crate_versions)]

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use shoplist::app::ListChange;
use shoplist::storage::JsonStore;
use shoplist::worker::{SyncHandle, SyncMessage, SyncResponse, SyncWorker};
use shoplist::{handle_event, Action, Config, Event, Importance, ItemId, ItemRecord, ListEngine};

const SYNC_WAIT: Duration = Duration::from_secs(2);

/// Host state: the engine plus the optional sync worker handle.
struct Host {
    engine: ListEngine,
    sync: Option<SyncHandle>,
}

impl Host {
    fn new(config: &Config) -> shoplist::Result<Self> {
        let mut engine = shoplist::initialize(config);
        engine.subscribe(|change: &ListChange| print_change(change));

        let sync = if config.sync_enabled {
            let path = shoplist::infrastructure::store_path(config);
            let store = JsonStore::open(path, config.user_id.clone())?;
            tracing::info!(path = ?store.path(), user_id = store.user_id(), "document store opened");
            Some(SyncWorker::spawn(Box::new(store))?)
        } else {
            tracing::debug!("sync disabled, running local only");
            None
        };

        Ok(Self { engine, sync })
    }

    /// Pulls the stored collection, then makes sure there is a placeholder.
    fn start(&mut self) {
        let _span = tracing::debug_span!("host_start").entered();
        self.poll();
        self.dispatch(&Event::EnsurePlaceholder);
    }

    fn dispatch(&mut self, event: &Event) {
        let actions = handle_event(&mut self.engine, event);
        tracing::debug!(action_count = actions.len(), "event handled");

        let posted = actions.iter().any(|action| matches!(action, Action::PostToSync(_)));
        for action in actions {
            self.execute_action(action);
        }
        if posted {
            self.poll();
        }
    }

    fn execute_action(&mut self, action: Action) {
        match action {
            Action::PostToSync(message) => self.post(message),
            Action::ReportSyncFailure { message } => eprintln!("sync failed: {message}"),
        }
    }

    fn post(&self, message: SyncMessage) {
        let Some(sync) = &self.sync else {
            return;
        };
        if let Err(e) = sync.post(message) {
            tracing::error!(error = %e, "failed to post sync message");
            eprintln!("sync failed: {e}");
        }
    }

    /// Requests the change feed and feeds every response back through the
    /// handler until the `Changes` batch has arrived.
    fn poll(&mut self) {
        let Some(sync) = &self.sync else {
            return;
        };
        if let Err(e) = sync.post(SyncMessage::poll()) {
            tracing::error!(error = %e, "failed to post poll");
            return;
        }

        let mut responses = Vec::new();
        loop {
            match sync.recv_timeout(SYNC_WAIT) {
                Ok(response) => {
                    let done = matches!(response, SyncResponse::Changes { .. });
                    responses.push(response);
                    if done {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "gave up waiting for change feed");
                    break;
                }
            }
        }

        for response in responses {
            let actions = handle_event(&mut self.engine, &Event::SyncResponse(response));
            for action in actions {
                self.execute_action(action);
            }
        }
    }

    /// Runs one command line. Returns false on `quit`.
    fn run_command(&mut self, line: &str) -> bool {
        let mut parts = line.trim().splitn(3, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let id = parts.next().map(str::trim);
        let rest = parts.next().map(str::trim).unwrap_or_default();

        let _span = tracing::debug_span!("host_command", command = %command).entered();

        let event = match (command, id) {
            ("", _) => return true,
            ("quit" | "exit", _) => return false,
            ("ls", _) => {
                print_items(self.engine.items());
                return true;
            }
            ("add", _) => Event::AddItem,
            ("undo", _) => Event::Undo,
            (_, Some(raw)) => {
                let Some(id) = parse_id(raw) else {
                    eprintln!("not an item id: {raw}");
                    return true;
                };
                match self.item_event(command, id, rest) {
                    Some(event) => event,
                    None => return true,
                }
            }
            _ => {
                print_usage();
                return true;
            }
        };

        self.dispatch(&event);
        true
    }

    fn item_event(&mut self, command: &str, id: ItemId, rest: &str) -> Option<Event> {
        match command {
            "edit" => {
                let original_text = self.engine.get(id).map(|item| item.text.clone())?;
                self.dispatch(&Event::EditText {
                    id,
                    text: rest.to_string(),
                });
                Some(Event::CommitText { id, original_text })
            }
            "type" => Some(Event::EditText {
                id,
                text: rest.to_string(),
            }),
            "imp" => match rest.parse::<Importance>() {
                Ok(importance) => Some(Event::ChangeImportance { id, importance }),
                Err(e) => {
                    eprintln!("{e}");
                    None
                }
            },
            "rm" => Some(Event::RemoveItem { id }),
            "expand" => Some(Event::SetOptionsExpanded { id, expanded: true }),
            "collapse" => Some(Event::SetOptionsExpanded { id, expanded: false }),
            _ => {
                print_usage();
                None
            }
        }
    }
}

fn parse_id(raw: &str) -> Option<ItemId> {
    raw.parse::<i64>().ok().map(ItemId)
}

fn print_change(change: &ListChange) {
    println!("-- {:?}{}", change.cause, if change.scroll_to_bottom { " (scroll to end)" } else { "" });
    print_items(&change.snapshot);
}

fn print_items(items: &[ItemRecord]) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for item in items {
        let marker = match item.importance {
            Importance::Important => '!',
            Importance::Normal => ' ',
            Importance::Unimportant => '-',
        };
        let text = if item.is_placeholder() { "<new item>" } else { item.text.as_str() };
        let fresh = if item.is_new_entry { " *" } else { "" };
        let _ = writeln!(out, "{:>15} {marker} {text}{fresh}", item.id);
        if item.options_expanded {
            let _ = writeln!(out, "{:>15}   [important | normal | unimportant]", "");
        }
    }
    let _ = out.flush();
}

fn print_usage() {
    eprintln!(
        "commands: ls | add | edit <id> <text> | type <id> <text> | imp <id> <important|normal|unimportant> \
         | rm <id> | undo | expand <id> | collapse <id> | quit"
    );
}

/// Splits arguments into an optional config file and `key=value` overrides.
fn load_config(args: impl Iterator<Item = String>) -> shoplist::Result<Config> {
    let mut file = None;
    let mut overrides = BTreeMap::new();
    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) => {
                overrides.insert(key.trim().to_string(), value.to_string());
            }
            None => file = Some(arg),
        }
    }

    let base = match file {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    Ok(base.with_overrides(&overrides))
}

fn main() -> ExitCode {
    let config = match load_config(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    shoplist::observability::init_tracing(&config);

    let span = tracing::debug_span!("host_main", user_id = %config.user_id);
    let _guard = span.entered();

    let mut host = match Host::new(&config) {
        Ok(host) => host,
        Err(e) => {
            tracing::error!(error = %e, "failed to start");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    host.start();

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                return ExitCode::FAILURE;
            }
        };
        if !host.run_command(&line) {
            break;
        }
    }

    tracing::debug!("shutting down");
    ExitCode::SUCCESS
}
