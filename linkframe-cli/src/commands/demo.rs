use anyhow::{anyhow, Context, Result};
use colored::*;
use linkframe_core::hamming::Decoded;
use linkframe_core::{
    CommunicationSession, CounterSnapshot, LinkConfig, MemoryTransport, PairId, Presenter,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Console presenter for the loopback demo
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    received: AtomicUsize,
}

impl ConsolePresenter {
    /// Frames decoded so far
    pub fn received_count(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

impl Presenter for ConsolePresenter {
    fn transmitted(&self, pair: PairId, endpoint: &str, line: &str) {
        println!("{} [{}] {}: {}", "TX".cyan().bold(), pair, endpoint, line);
    }

    fn received(&self, pair: PairId, endpoint: &str, _line: &str, decoded: &Decoded) {
        self.received.fetch_add(1, Ordering::SeqCst);
        let status = match decoded.error_position {
            None => "clean".green(),
            Some(p) => format!("syndrome {}", p).yellow(),
        };
        println!(
            "{} [{}] {}: {} [{}] {:?}",
            "RX".magenta().bold(),
            pair,
            endpoint,
            decoded.data,
            status,
            decoded.data.to_text_lossy()
        );
    }
}

/// Summary of one demo run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoOutcome {
    /// Lines written without error
    pub sent: usize,
    /// Frames decoded by the receivers
    pub received: usize,
    /// Counters after the last transmit
    pub counters: CounterSnapshot,
}

/// Send `pair_a` and `pair_b` text through an in-memory loopback session
pub fn run(config: LinkConfig, pair_a: &str, pair_b: &str, settle: Duration) -> Result<DemoOutcome> {
    let transport = MemoryTransport::for_config(&config);
    let session = Arc::new(CommunicationSession::new(
        config,
        transport,
        ConsolePresenter::default(),
    ));
    let receivers = session.start_receivers();

    let mut senders = session.dispatch(PairId::A, pair_a);
    senders.extend(session.dispatch(PairId::B, pair_b));

    let mut sent = 0;
    for sender in senders {
        match sender.join() {
            Ok(Ok(_)) => sent += 1,
            Ok(Err(e)) => warn!("Transmit failed: {}", e),
            Err(_) => return Err(anyhow!("Transmit thread panicked")),
        }
    }

    thread::sleep(settle);
    let counters = session.counters();
    session.stop_all();
    session.transport().shutdown();

    for receiver in receivers {
        receiver
            .join()
            .map_err(|_| anyhow!("Receive thread panicked"))?
            .context("Receive loop failed")?;
    }

    Ok(DemoOutcome {
        sent,
        received: session.presenter().received_count(),
        counters,
    })
}

pub fn execute(config: LinkConfig, pair_a: &str, pair_b: &str) -> Result<()> {
    info!(
        "Loopback demo: {}->{} and {}->{}",
        config.pair_a.tx_endpoint,
        config.pair_a.rx_endpoint,
        config.pair_b.tx_endpoint,
        config.pair_b.rx_endpoint
    );

    let outcome = run(config, pair_a, pair_b, Duration::from_millis(200))?;

    println!("\n=== Demo Summary ===");
    println!("Lines sent:       {}", outcome.sent.to_string().green());
    println!("Frames received:  {}", outcome.received.to_string().green());
    println!(
        "Last counters:    TX A {} / RX A {} / TX B {} / RX B {}",
        outcome.counters.tx_a, outcome.counters.rx_a, outcome.counters.tx_b, outcome.counters.rx_b
    );

    Ok(())
}
