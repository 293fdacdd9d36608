// crates/refinery-connect/src/connector.rs
// ============================================================================
// Module: Action Refinery Runner Connector
// Description: TCP client for the line-oriented runner link.
// Purpose: Own the runner sockets and pump received lines into a handler.
// Dependencies: crate::wire, std::net, std::thread, thiserror
// ============================================================================

//! ## Overview
//! [`RunnerConnector`] connects one TCP stream per channel binding, spawns a
//! reader thread per stream, and turns every received line into an
//! input-direction [`TorxAction`] handed to the registered handler. Outputs
//! are written synchronously through [`RunnerConnector::send_output`].
//! `stop` is idempotent and safe from a teardown path: it signals shutdown,
//! closes the sockets to unblock the readers, and joins the threads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::net::Shutdown;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;

use thiserror::Error;

use crate::wire::ChannelBinding;
use crate::wire::TorxAction;
use crate::wire::decode_line;
use crate::wire::encode_line;

// ============================================================================
// SECTION: Connector Errors
// ============================================================================

/// Errors raised by the runner connector.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Builder finished without any channel binding.
    #[error("connector has no channel bindings")]
    MissingBindings,
    /// Start was requested without a registered input handler.
    #[error("connector has no input handler")]
    MissingInputHandler,
    /// Start was requested while the connector is already running.
    #[error("connector is already started")]
    AlreadyStarted,
    /// An output was sent while the connector is not running.
    #[error("connector is not started")]
    NotStarted,
    /// TCP connection to the runner failed.
    #[error("runner connection to {host}:{port} failed: {message}")]
    Connect {
        /// Runner host.
        host: String,
        /// Runner port.
        port: u16,
        /// Underlying I/O error message.
        message: String,
    },
    /// Socket I/O failed.
    #[error("runner socket io error: {0}")]
    Io(String),
    /// No binding serves the requested output channel.
    #[error("unknown output channel: {0}")]
    UnknownChannel(String),
    /// Connector runtime lock was poisoned.
    #[error("connector state lock poisoned")]
    LockPoisoned,
}

// ============================================================================
// SECTION: Handler Signatures
// ============================================================================

/// Handler invoked with every received input-direction wire action.
pub type InputHandler = dyn Fn(TorxAction) + Send + Sync;

/// Handler invoked once all runner sockets are connected.
pub type StartedHandler = dyn Fn() + Send + Sync;

// ============================================================================
// SECTION: Connector Builder
// ============================================================================

/// Builder for a runner connector.
///
/// # Invariants
/// - `build` succeeds only with at least one channel binding.
#[derive(Default)]
pub struct RunnerConnectorBuilder {
    /// Runner host.
    host: String,
    /// Channel bindings, one socket each.
    bindings: Vec<ChannelBinding>,
    /// Handler for received lines.
    on_input: Option<Arc<InputHandler>>,
    /// Handler invoked after all sockets connect.
    on_started: Option<Arc<StartedHandler>>,
}

impl RunnerConnectorBuilder {
    /// Sets the runner host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Adds a channel binding.
    #[must_use]
    pub fn binding(mut self, binding: ChannelBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Registers the input handler.
    #[must_use]
    pub fn on_input<F>(mut self, handler: F) -> Self
    where
        F: Fn(TorxAction) + Send + Sync + 'static,
    {
        self.on_input = Some(Arc::new(handler));
        self
    }

    /// Registers the started handler.
    #[must_use]
    pub fn on_started<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_started = Some(Arc::new(handler));
        self
    }

    /// Builds the connector.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::MissingBindings`] without channel bindings.
    pub fn build(self) -> Result<RunnerConnector, ConnectorError> {
        if self.bindings.is_empty() {
            return Err(ConnectorError::MissingBindings);
        }
        Ok(RunnerConnector {
            host: self.host,
            bindings: self.bindings,
            on_input: Mutex::new(self.on_input),
            on_started: self.on_started,
            running: Arc::new(AtomicBool::new(false)),
            runtime: Mutex::new(ConnectorRuntime::default()),
        })
    }
}

// ============================================================================
// SECTION: Connector Runtime
// ============================================================================

/// Socket and thread state owned by a started connector.
#[derive(Default)]
struct ConnectorRuntime {
    /// Write halves keyed by output channel.
    writers: BTreeMap<String, TcpStream>,
    /// All connected streams, kept for shutdown.
    streams: Vec<TcpStream>,
    /// Reader thread handles.
    readers: Vec<JoinHandle<()>>,
    /// True once `start` succeeded and until `stop` completes.
    started: bool,
}

// ============================================================================
// SECTION: Runner Connector
// ============================================================================

/// TCP client owning the line-oriented runner link.
///
/// # Invariants
/// - At most one started runtime exists at a time.
/// - Every received line is handed to the input handler exactly once.
pub struct RunnerConnector {
    /// Runner host.
    host: String,
    /// Channel bindings, one socket each.
    bindings: Vec<ChannelBinding>,
    /// Handler for received lines; settable until `start`.
    on_input: Mutex<Option<Arc<InputHandler>>>,
    /// Handler invoked after all sockets connect.
    on_started: Option<Arc<StartedHandler>>,
    /// Shutdown flag shared with reader threads.
    running: Arc<AtomicBool>,
    /// Socket and thread state.
    runtime: Mutex<ConnectorRuntime>,
}

impl RunnerConnector {
    /// Returns a builder for the connector.
    #[must_use]
    pub fn builder() -> RunnerConnectorBuilder {
        RunnerConnectorBuilder::default()
    }

    /// Registers or replaces the input handler.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::LockPoisoned`] when the handler slot lock is
    /// poisoned.
    pub fn set_on_input<F>(&self, handler: F) -> Result<(), ConnectorError>
    where
        F: Fn(TorxAction) + Send + Sync + 'static,
    {
        let mut slot = self.on_input.lock().map_err(|_| ConnectorError::LockPoisoned)?;
        *slot = Some(Arc::new(handler));
        Ok(())
    }

    /// Connects all runner sockets and starts the reader threads.
    ///
    /// The started handler runs after every socket is connected and before
    /// any received line is dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::AlreadyStarted`] on double start,
    /// [`ConnectorError::MissingInputHandler`] without a handler, and
    /// [`ConnectorError::Connect`] when a socket fails to connect.
    pub fn start(&self) -> Result<(), ConnectorError> {
        let handler = self
            .on_input
            .lock()
            .map_err(|_| ConnectorError::LockPoisoned)?
            .clone()
            .ok_or(ConnectorError::MissingInputHandler)?;

        let mut runtime = self.runtime.lock().map_err(|_| ConnectorError::LockPoisoned)?;
        if runtime.started {
            return Err(ConnectorError::AlreadyStarted);
        }

        // Connect every socket before spawning any reader, so a failed
        // connect has no threads to unwind.
        let mut connected = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            match TcpStream::connect((self.host.as_str(), binding.port)) {
                Ok(stream) => connected.push((binding.clone(), stream)),
                Err(err) => {
                    for (_, stream) in &connected {
                        let _closed = stream.shutdown(Shutdown::Both);
                    }
                    return Err(ConnectorError::Connect {
                        host: self.host.clone(),
                        port: binding.port,
                        message: err.to_string(),
                    });
                }
            }
        }

        self.running.store(true, Ordering::SeqCst);
        runtime.started = true;
        for (binding, stream) in connected {
            let clones = stream.try_clone().and_then(|writer| {
                stream.try_clone().map(|reader_stream| (writer, reader_stream))
            });
            let (writer, reader_stream) = match clones {
                Ok(clones) => clones,
                Err(err) => {
                    let (streams, readers) = Self::extract(&mut runtime);
                    drop(runtime);
                    self.teardown(streams, readers);
                    return Err(ConnectorError::Io(err.to_string()));
                }
            };
            runtime.writers.insert(binding.output_channel.clone(), writer);
            let channel = binding.input_channel;
            let running = Arc::clone(&self.running);
            let handler = Arc::clone(&handler);
            let handle = std::thread::spawn(move || {
                pump_lines(reader_stream, &channel, &running, handler.as_ref());
            });
            runtime.readers.push(handle);
            runtime.streams.push(stream);
        }
        drop(runtime);

        if let Some(started) = &self.on_started {
            started();
        }
        Ok(())
    }

    /// Writes one framed line on the binding serving the output channel.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::NotStarted`] before `start`,
    /// [`ConnectorError::UnknownChannel`] for an unbound channel, and
    /// [`ConnectorError::Io`] on write failure.
    pub fn send_output(&self, channel: &str, data: &str) -> Result<(), ConnectorError> {
        let runtime = self.runtime.lock().map_err(|_| ConnectorError::LockPoisoned)?;
        if !runtime.started {
            return Err(ConnectorError::NotStarted);
        }
        let Some(writer) = runtime.writers.get(channel) else {
            return Err(ConnectorError::UnknownChannel(channel.to_string()));
        };
        let mut writer = writer;
        writer
            .write_all(encode_line(data).as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|err| ConnectorError::Io(err.to_string()))
    }

    /// Stops the connector: signals shutdown, closes sockets, joins readers.
    ///
    /// Idempotent; a never-started or already-stopped connector returns
    /// without effect.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::LockPoisoned`] when the runtime lock is
    /// poisoned.
    pub fn stop(&self) -> Result<(), ConnectorError> {
        let mut runtime = self.runtime.lock().map_err(|_| ConnectorError::LockPoisoned)?;
        if !runtime.started {
            return Ok(());
        }
        let (streams, readers) = Self::extract(&mut runtime);
        drop(runtime);
        self.teardown(streams, readers);
        Ok(())
    }

    /// Empties the runtime under the lock and returns the parts to release.
    fn extract(runtime: &mut ConnectorRuntime) -> (Vec<TcpStream>, Vec<JoinHandle<()>>) {
        runtime.started = false;
        runtime.writers.clear();
        (std::mem::take(&mut runtime.streams), std::mem::take(&mut runtime.readers))
    }

    /// Closes sockets and joins readers outside the runtime lock.
    ///
    /// Joining under the lock would deadlock against a reader thread whose
    /// output path is waiting for the same lock.
    fn teardown(&self, streams: Vec<TcpStream>, readers: Vec<JoinHandle<()>>) {
        self.running.store(false, Ordering::SeqCst);
        for stream in &streams {
            let _closed = stream.shutdown(Shutdown::Both);
        }
        for handle in readers {
            let _joined = handle.join();
        }
    }

    /// Returns true while the connector is started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.runtime.lock().map_or(false, |runtime| runtime.started)
    }
}

impl Drop for RunnerConnector {
    fn drop(&mut self) {
        let _stopped = self.stop();
    }
}

// ============================================================================
// SECTION: Reader Loop
// ============================================================================

/// Pumps received lines into the handler until shutdown or EOF.
fn pump_lines(
    stream: TcpStream,
    channel: &str,
    running: &AtomicBool,
    handler: &InputHandler,
) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let Ok(raw) = line else {
            break;
        };
        if !running.load(Ordering::SeqCst) {
            break;
        }
        handler(TorxAction::input(channel, decode_line(&raw)));
    }
}
