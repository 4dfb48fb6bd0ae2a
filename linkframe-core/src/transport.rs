//! Byte-stream transport abstraction and an in-memory loopback
//!
//! The session only needs to open an endpoint, write bytes to it and read
//! newline-delimited lines from it; closing is dropping the handle. Real
//! serial devices implement [`Transport`] outside this crate.

use crate::config::LinkConfig;
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Something that can open byte-stream endpoints by name
pub trait Transport: Send + Sync + 'static {
    /// Open handle; dropping it closes the endpoint
    type Handle: Read + Write + Send + 'static;

    /// Open `endpoint` at `baud_rate`
    ///
    /// The baud rate is passed through untouched; transports without a
    /// notion of line speed ignore it.
    fn open(&self, endpoint: &str, baud_rate: u32) -> io::Result<Self::Handle>;
}

#[derive(Default)]
struct Links {
    /// Transmit endpoint -> sending half of its link
    writers: HashMap<String, Sender<Vec<u8>>>,
    /// Receive endpoint -> receiving half, while nobody has it open
    readers: HashMap<String, Receiver<Vec<u8>>>,
}

/// In-memory transport wiring transmit endpoints to receive endpoints
///
/// Each link has exactly one receive endpoint, which can be open by one
/// handle at a time. Reads block until bytes arrive or the link is shut down
/// and every write handle has been dropped, at which point they report EOF.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    links: Arc<Mutex<Links>>,
}

impl MemoryTransport {
    /// Transport with no links
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport with both channel pairs of `config` connected
    pub fn for_config(config: &LinkConfig) -> Self {
        let transport = Self::new();
        transport.connect(&config.pair_a.tx_endpoint, &config.pair_a.rx_endpoint);
        transport.connect(&config.pair_b.tx_endpoint, &config.pair_b.rx_endpoint);
        transport
    }

    fn lock(&self) -> MutexGuard<'_, Links> {
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a link from `tx_endpoint` to `rx_endpoint`, replacing any
    /// existing link on either name
    pub fn connect(&self, tx_endpoint: &str, rx_endpoint: &str) {
        let (tx, rx) = mpsc::channel();
        let mut links = self.lock();
        links.writers.insert(tx_endpoint.to_string(), tx);
        links.readers.insert(rx_endpoint.to_string(), rx);
    }

    /// Write raw bytes to a transmit endpoint, bypassing any framing
    pub fn inject(&self, tx_endpoint: &str, bytes: &[u8]) -> io::Result<()> {
        let mut handle = self.open(tx_endpoint, 0)?;
        handle.write_all(bytes)
    }

    /// Tear down every link
    ///
    /// Readers see EOF once the write handles that are still open are
    /// dropped; later opens of a transmit endpoint fail.
    pub fn shutdown(&self) {
        let mut links = self.lock();
        links.writers.clear();
    }
}

impl Transport for MemoryTransport {
    type Handle = MemoryHandle;

    fn open(&self, endpoint: &str, _baud_rate: u32) -> io::Result<MemoryHandle> {
        let mut links = self.lock();

        if let Some(tx) = links.writers.get(endpoint) {
            return Ok(MemoryHandle {
                endpoint: endpoint.to_string(),
                tx: Some(tx.clone()),
                rx: None,
                pending: Vec::new(),
                offset: 0,
                links: None,
            });
        }

        match links.readers.remove(endpoint) {
            Some(rx) => Ok(MemoryHandle {
                endpoint: endpoint.to_string(),
                tx: None,
                rx: Some(rx),
                pending: Vec::new(),
                offset: 0,
                links: Some(Arc::clone(&self.links)),
            }),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no link for endpoint {} (or already open)", endpoint),
            )),
        }
    }
}

/// Open endpoint of a [`MemoryTransport`]
///
/// A handle is either write-only (transmit endpoint) or read-only (receive
/// endpoint); the other direction reports `Unsupported`.
pub struct MemoryHandle {
    endpoint: String,
    tx: Option<Sender<Vec<u8>>>,
    rx: Option<Receiver<Vec<u8>>>,
    pending: Vec<u8>,
    offset: usize,
    /// Set on receive handles so the receiver is returned on close
    links: Option<Arc<Mutex<Links>>>,
}

impl Read for MemoryHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(rx) = &self.rx else {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{} is a transmit endpoint", self.endpoint),
            ));
        };

        if self.offset == self.pending.len() {
            match rx.recv() {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.offset = 0;
                }
                // Every sender is gone
                Err(_) => return Ok(0),
            }
        }

        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

impl Write for MemoryHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(tx) = &self.tx else {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{} is a receive endpoint", self.endpoint),
            ));
        };
        tx.send(buf.to_vec()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("receive side of {} is gone", self.endpoint),
            )
        })?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        if let (Some(links), Some(rx)) = (self.links.take(), self.rx.take()) {
            let mut links = links.lock().unwrap_or_else(PoisonError::into_inner);
            links.readers.entry(self.endpoint.clone()).or_insert(rx);
        }
    }
}

impl std::fmt::Debug for MemoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHandle")
            .field("endpoint", &self.endpoint)
            .field("writable", &self.tx.is_some())
            .field("readable", &self.rx.is_some())
            .finish()
    }
}
