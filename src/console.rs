//! Default notifier client
//!
//! The [`Console`] owns two well-known observers on its notifier:
//!
//! | Identifier               | Priority    | Installed when            |
//! |--------------------------|-------------|---------------------------|
//! | [`BREAKPOINT_IDENTIFIER`] | `i32::MAX` | console is debuggable     |
//! | [`LOG_IDENTIFIER`]        | `i32::MIN` | always, unless replaced   |
//!
//! The breakpoint runs before anything else and aborts the process on a
//! `Fatal` event, which gives a debugger a fixed place to stop. The logger
//! runs last and renders events to a text sink (stdout by default).
//!
//! An optional third observer, [`TRACING_IDENTIFIER`] at priority 0, forwards
//! events to `tracing`.

use crate::config::ConsoleConfig;
use crate::event::{Code, ErrorEvent, Level};
use crate::notifier::{Callback, Notifier};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, warn};

pub const BREAKPOINT_IDENTIFIER: &str = "cartridge.common.console.breakpoint";
pub const LOG_IDENTIFIER: &str = "cartridge.common.console.log";
pub const TRACING_IDENTIFIER: &str = "cartridge.common.console.tracing";

pub const BREAKPOINT_PRIORITY: i32 = i32::MAX;
pub const LOG_PRIORITY: i32 = i32::MIN;
pub const TRACING_PRIORITY: i32 = 0;

type Sink = Box<dyn Write + Send>;

struct ConsoleState {
    // Held across the breakpoint (un)registration so the two never disagree
    debuggable: Mutex<bool>,
    sink: Mutex<Sink>,
}

impl ConsoleState {
    fn log(&self, event: &ErrorEvent) {
        let debuggable = *self.debuggable.lock();
        if Console::should_print(event.level(), debuggable) {
            self.print(event);
        }
    }

    fn print(&self, event: &ErrorEvent) {
        let mut sink = self.sink.lock();
        if let Err(err) = writeln!(sink, "{}", event).and_then(|()| sink.flush()) {
            warn!(code = event.code(), error = %err, "console sink write failed");
        }
    }
}

/// Severity filter, breakpoint hook and text logger
pub struct Console {
    notifier: Arc<Notifier>,
    state: Arc<ConsoleState>,
}

impl Console {
    /// Build a console on `notifier` and install its observers per `config`
    pub fn new(notifier: Arc<Notifier>, config: &ConsoleConfig) -> Self {
        let console = Console {
            notifier,
            state: Arc::new(ConsoleState {
                debuggable: Mutex::new(false),
                sink: Mutex::new(Box::new(io::stdout())),
            }),
        };
        console.configure(config);
        console
    }

    /// The process-wide console, attached to [`Notifier::shared`]
    ///
    /// Built from [`ConsoleConfig::from_env`] on first use.
    pub fn shared() -> &'static Console {
        static SHARED: OnceLock<Console> = OnceLock::new();
        SHARED.get_or_init(|| {
            Console::new(Arc::clone(Notifier::shared()), &ConsoleConfig::from_env())
        })
    }

    /// Whether the shared console is debuggable
    pub fn debuggable() -> bool {
        Console::shared().is_debuggable()
    }

    /// Re-apply `config` to this console's observers
    pub fn configure(&self, config: &ConsoleConfig) {
        self.set_debuggable(config.effective_debuggable());
        if config.logger {
            self.install_default_logger();
        } else {
            self.set_logger(None);
        }
        self.set_tracing_bridge(config.tracing_bridge);
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn is_debuggable(&self) -> bool {
        *self.state.debuggable.lock()
    }

    /// Toggle debug mode
    ///
    /// Enabling it registers the breakpoint observer and lets `Debug` events
    /// through the default logger; the logger picks the flag up on the next
    /// dispatch.
    pub fn set_debuggable(&self, debuggable: bool) {
        let mut flag = self.state.debuggable.lock();
        *flag = debuggable;
        if debuggable {
            self.notifier.set_notification(
                BREAKPOINT_PRIORITY,
                BREAKPOINT_IDENTIFIER,
                Console::breakpoint,
            );
        } else {
            self.notifier.unset_notification(BREAKPOINT_IDENTIFIER);
        }
    }

    /// Replace the logger; `None` removes logging entirely
    pub fn set_logger(&self, callback: Option<Callback>) {
        match callback {
            Some(callback) => self
                .notifier
                .set_callback(LOG_PRIORITY, LOG_IDENTIFIER, callback),
            None => self.notifier.unset_notification(LOG_IDENTIFIER),
        }
    }

    /// Restore the built-in severity-filtered text logger
    pub fn install_default_logger(&self) {
        let state = Arc::clone(&self.state);
        self.set_logger(Some(Arc::new(move |event: &ErrorEvent| state.log(event))));
    }

    /// Redirect the default logger's output
    pub fn set_sink<W>(&self, sink: W)
    where
        W: Write + Send + 'static,
    {
        *self.state.sink.lock() = Box::new(sink);
    }

    pub fn set_tracing_bridge(&self, enabled: bool) {
        if enabled {
            self.notifier
                .set_notification(TRACING_PRIORITY, TRACING_IDENTIFIER, forward_to_tracing);
        } else {
            self.notifier.unset_notification(TRACING_IDENTIFIER);
        }
    }

    /// Whether the default logger renders an event of `level`
    pub fn should_print(level: Level, debuggable: bool) -> bool {
        match level {
            Level::Ignore => false,
            Level::Debug => debuggable,
            Level::Warning | Level::Notice | Level::Error | Level::Fatal => true,
        }
    }

    /// Render `event` to this console's sink regardless of level
    pub fn print(&self, event: &ErrorEvent) {
        self.state.print(event);
    }

    /// Breakpoint observer: aborts on `Fatal`, ignores everything else
    pub fn breakpoint(event: &ErrorEvent) {
        if event.level() == Level::Fatal {
            error!(code = event.code(), detail = %event.message(), "fatal event");
            eprintln!("Set breakpoint at Console::breakpoint to debug");
            std::process::abort();
        }
    }

    /// Report a `Fatal` misuse event at `location` through this console's notifier
    pub fn fatal(&self, message: impl Into<String>, location: &Location<'_>) {
        self.notifier.notify(&fatal_event(message, location));
    }
}

/// `Fatal` misuse event tagged with its call site
pub fn fatal_event(message: impl Into<String>, location: &Location<'_>) -> ErrorEvent {
    ErrorEvent::new(Level::Fatal, Code::Misuse, message)
        .with_attribute("Line", location.line())
        .with_attribute("Source", "Assertion")
        .with_attribute("File", location.file())
}

/// Report `event` through the shared console's notifier
pub fn report(event: &ErrorEvent) {
    Console::shared().notifier().notify(event);
}

/// Report a `Fatal` misuse event tagged with the caller's location
///
/// This only notifies. Whether the process stops is up to the observers,
/// i.e. the breakpoint of a debuggable console.
#[track_caller]
pub fn fatal(message: impl Into<String>) {
    Console::shared().fatal(message, Location::caller());
}

fn forward_to_tracing(event: &ErrorEvent) {
    let attributes = serde_json::to_string(event.attributes()).unwrap_or_default();
    let code = event.code();
    let message = event.message();
    match event.level() {
        Level::Ignore => {}
        Level::Debug => debug!(code, %attributes, "{}", message),
        Level::Notice => info!(code, %attributes, "{}", message),
        Level::Warning => warn!(code, %attributes, "{}", message),
        Level::Error | Level::Fatal => {
            error!(code, level = %event.level(), %attributes, "{}", message)
        }
    }
}

/// In-memory sink, cloneable so the writer and the reader share one buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
