//! Communication session: two channel pairs over one transport
//!
//! The session owns everything the transmit and receive paths share: byte
//! counters, one lock per physical endpoint and one stop token per channel
//! pair. Receive loops hold only their receive endpoint's lock and transmits
//! only their transmit endpoint's, so the two never wait on each other.
//!
//! Counters are reset to zero at the start of every transmit request, for
//! both pairs at once.

use crate::bits::BitString;
use crate::channel::ChannelSimulator;
use crate::config::{LinkConfig, PairId};
use crate::error::{FormatError, LinkError};
use crate::frame::{Frame, FrameBuilder};
use crate::hamming::Decoded;
use crate::transport::Transport;
use crate::Result;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

#[cfg(feature = "logging")]
use tracing::{debug, info, warn};

/// Receives everything the session transmits and decodes
pub trait Presenter: Send + Sync + 'static {
    /// A frame line was written to `endpoint`
    fn transmitted(&self, pair: PairId, endpoint: &str, line: &str);

    /// A frame line was read from `endpoint` and its FCS decoded
    fn received(&self, pair: PairId, endpoint: &str, line: &str, decoded: &Decoded);
}

/// Presenter that reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    #[allow(unused_variables)]
    fn transmitted(&self, pair: PairId, endpoint: &str, line: &str) {
        #[cfg(feature = "logging")]
        info!("Transmitting on {} (pair {}): {}", endpoint, pair, line);
    }

    #[allow(unused_variables)]
    fn received(&self, pair: PairId, endpoint: &str, line: &str, decoded: &Decoded) {
        #[cfg(feature = "logging")]
        info!(
            "Received on {} (pair {}): {} -> data {} (syndrome {:?})",
            endpoint, pair, line, decoded.data, decoded.error_position
        );
    }
}

/// Cooperative stop signal for one receive loop
///
/// Checked before and after every blocking read; a loop blocked in a read
/// notices the signal once the read returns.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Fresh, unraised token
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the signal has been raised
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// TX and RX byte counts for both channel pairs
#[derive(Debug, Default)]
pub struct ByteCounters {
    tx: [AtomicU64; 2],
    rx: [AtomicU64; 2],
}

/// Point-in-time copy of [`ByteCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Bytes written on pair A's transmit endpoint
    pub tx_a: u64,
    /// Bytes read on pair A's receive endpoint
    pub rx_a: u64,
    /// Bytes written on pair B's transmit endpoint
    pub tx_b: u64,
    /// Bytes read on pair B's receive endpoint
    pub rx_b: u64,
}

impl ByteCounters {
    /// Add `bytes` to a pair's TX counter
    pub fn add_tx(&self, pair: PairId, bytes: u64) {
        self.tx[pair.index()].fetch_add(bytes, Ordering::SeqCst);
    }

    /// Add `bytes` to a pair's RX counter
    pub fn add_rx(&self, pair: PairId, bytes: u64) {
        self.rx[pair.index()].fetch_add(bytes, Ordering::SeqCst);
    }

    /// Zero all four counters
    pub fn reset(&self) {
        for counter in self.tx.iter().chain(self.rx.iter()) {
            counter.store(0, Ordering::SeqCst);
        }
    }

    /// Read all four counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            tx_a: self.tx[0].load(Ordering::SeqCst),
            rx_a: self.rx[0].load(Ordering::SeqCst),
            tx_b: self.tx[1].load(Ordering::SeqCst),
            rx_b: self.rx[1].load(Ordering::SeqCst),
        }
    }
}

/// A frame line accepted by the receive path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    /// Line as read, without the terminator
    pub line: String,
    /// Parsed frame
    pub frame: Frame,
    /// FCS decode result
    pub decoded: Decoded,
}

/// Orchestrates transmit and receive on both channel pairs
pub struct CommunicationSession<T: Transport, P: Presenter = LogPresenter> {
    config: LinkConfig,
    builder: FrameBuilder,
    transport: T,
    presenter: P,
    counters: ByteCounters,
    endpoint_locks: HashMap<String, Mutex<()>>,
    stop_tokens: Mutex<[StopToken; 2]>,
    noise: Option<Mutex<ChannelSimulator<ChaCha8Rng>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Transport, P: Presenter> CommunicationSession<T, P> {
    /// Create a session; nothing is opened until the first transmit or
    /// receiver start
    pub fn new(config: LinkConfig, transport: T, presenter: P) -> Self {
        let endpoint_locks = [&config.pair_a, &config.pair_b]
            .iter()
            .flat_map(|pair| [pair.tx_endpoint.clone(), pair.rx_endpoint.clone()])
            .map(|endpoint| (endpoint, Mutex::new(())))
            .collect();

        let noise = config
            .noise
            .map(|noise| Mutex::new(ChannelSimulator::seeded(noise)));

        Self {
            builder: FrameBuilder::from_config(&config),
            config,
            transport,
            presenter,
            counters: ByteCounters::default(),
            endpoint_locks,
            stop_tokens: Mutex::new([StopToken::new(), StopToken::new()]),
            noise,
        }
    }

    /// Session configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Frame builder used for both directions
    pub fn builder(&self) -> &FrameBuilder {
        &self.builder
    }

    /// Presenter the session reports to
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Transport the session opens endpoints on
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current byte counts
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    fn lock_endpoint(&self, endpoint: &str) -> Option<MutexGuard<'_, ()>> {
        self.endpoint_locks.get(endpoint).map(lock)
    }

    /// Frame one line of input and write it on `pair`'s transmit endpoint
    ///
    /// Returns the number of bytes written, including the newline. Format
    /// errors are returned before anything is opened; transport failures
    /// abandon this attempt without retrying.
    pub fn transmit_line(&self, pair: PairId, text: &str) -> Result<usize> {
        self.counters.reset();

        let channel = self.config.pair(pair);
        let payload = BitString::from_line(text);

        let frame = self
            .builder
            .build(&channel.tx_endpoint, &payload)
            .map_err(|e| {
                #[cfg(feature = "logging")]
                warn!("Cannot frame input on {}: {}", channel.tx_endpoint, e);
                LinkError::from(e)
            })?;

        let frame = match &self.noise {
            Some(simulator) => {
                let corruption = lock(simulator).corrupt(frame.fcs());
                #[cfg(feature = "logging")]
                debug!(
                    "Channel noise on {}: flipped FCS bits {:?}",
                    channel.tx_endpoint, corruption.flipped
                );
                frame.with_fcs(corruption.bits)
            }
            None => frame,
        };

        let wire = self.builder.encode_line(&frame);

        {
            let _guard = self.lock_endpoint(&channel.tx_endpoint);
            let transport_error = |e: std::io::Error| {
                #[cfg(feature = "logging")]
                warn!("Error writing to {}: {}", channel.tx_endpoint, e);
                LinkError::transport(&channel.tx_endpoint, e)
            };
            let mut handle = self
                .transport
                .open(&channel.tx_endpoint, channel.baud_rate)
                .map_err(transport_error)?;
            handle.write_all(&wire).map_err(transport_error)?;
            handle.flush().map_err(transport_error)?;
        }

        self.counters.add_tx(pair, wire.len() as u64);
        self.presenter
            .transmitted(pair, &channel.tx_endpoint, &self.builder.render(&frame));
        Ok(wire.len())
    }

    /// Parse and decode one received line
    ///
    /// Blank lines yield `Ok(None)`. On success the pair's RX counter grows
    /// by `raw.len()` and the presenter is notified.
    pub fn accept_line(&self, pair: PairId, raw: &[u8]) -> Result<Option<Received>> {
        let text = std::str::from_utf8(raw).map_err(|e| FormatError::MalformedField {
            field: "line",
            reason: e.to_string(),
        })?;
        let line = text.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let frame = self.builder.parse(line)?;
        let decoded = frame.decode()?;

        self.counters.add_rx(pair, raw.len() as u64);
        let endpoint = &self.config.pair(pair).rx_endpoint;
        self.presenter.received(pair, endpoint, line, &decoded);

        Ok(Some(Received {
            line: line.to_string(),
            frame,
            decoded,
        }))
    }

    /// Raise `pair`'s current stop token, install a fresh one and return it
    ///
    /// A loop still running on the old token ends at its next read boundary
    /// and releases the endpoint to the new one.
    fn arm(&self, pair: PairId) -> StopToken {
        let token = StopToken::new();
        let previous = {
            let mut tokens = lock(&self.stop_tokens);
            core::mem::replace(&mut tokens[pair.index()], token.clone())
        };
        previous.stop();
        token
    }

    /// Stop `pair`'s receive loop at its next read boundary
    pub fn stop(&self, pair: PairId) {
        lock(&self.stop_tokens)[pair.index()].stop();
    }

    /// Stop both receive loops
    pub fn stop_all(&self) {
        for token in lock(&self.stop_tokens).iter() {
            token.stop();
        }
    }

    /// Read and decode frames from `pair`'s receive endpoint until stopped,
    /// the stream ends, or the transport fails
    ///
    /// Malformed lines are logged and skipped.
    pub fn receive_loop(&self, pair: PairId) -> Result<()> {
        let token = self.arm(pair);
        self.run_receiver(pair, &token)
    }

    fn run_receiver(&self, pair: PairId, token: &StopToken) -> Result<()> {
        let channel = self.config.pair(pair);
        let endpoint = &channel.rx_endpoint;
        let _guard = self.lock_endpoint(endpoint);

        let transport_error = |e: std::io::Error| {
            #[cfg(feature = "logging")]
            warn!("Error on receive endpoint {}: {}", endpoint, e);
            LinkError::transport(endpoint, e)
        };

        let handle = self
            .transport
            .open(endpoint, channel.baud_rate)
            .map_err(transport_error)?;
        let mut reader = BufReader::new(handle);
        let mut buf = Vec::new();

        #[cfg(feature = "logging")]
        debug!("Receiving on {} (pair {})", endpoint, pair);

        loop {
            if token.is_stopped() {
                break;
            }

            buf.clear();
            let n = reader.read_until(b'\n', &mut buf).map_err(transport_error)?;
            if n == 0 {
                #[cfg(feature = "logging")]
                debug!("End of stream on {}", endpoint);
                break;
            }

            if token.is_stopped() {
                break;
            }

            if let Err(_e) = self.accept_line(pair, &buf) {
                #[cfg(feature = "logging")]
                warn!("Skipping malformed line on {}: {}", endpoint, _e);
            }
        }

        #[cfg(feature = "logging")]
        debug!("Receive loop on {} finished", endpoint);
        Ok(())
    }
}

impl<T: Transport, P: Presenter> CommunicationSession<T, P> {
    /// Start one receive thread per channel pair
    pub fn start_receivers(self: &Arc<Self>) -> Vec<JoinHandle<Result<()>>> {
        PairId::ALL
            .iter()
            .map(|&pair| self.start_receiver(pair))
            .collect()
    }

    /// Start the receive thread for `pair`
    pub fn start_receiver(self: &Arc<Self>, pair: PairId) -> JoinHandle<Result<()>> {
        let token = self.arm(pair);
        let session = Arc::clone(self);
        thread::spawn(move || session.run_receiver(pair, &token))
    }

    /// Transmit each non-empty line of `text` on `pair`, one thread per line
    ///
    /// Threads are spawned the configured delay apart. The delay only spaces
    /// out dispatch; it does not order writes across pairs.
    pub fn dispatch(self: &Arc<Self>, pair: PairId, text: &str) -> Vec<JoinHandle<Result<usize>>> {
        let delay = self.config.dispatch_delay();
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                if i > 0 {
                    thread::sleep(delay);
                }
                let session = Arc::clone(self);
                let line = line.to_string();
                thread::spawn(move || session.transmit_line(pair, &line))
            })
            .collect()
    }
}
