//! Example sending frames over a noisy in-memory loopback on both pairs

use linkframe_core::{
    hamming::Decoded, CommunicationSession, LinkConfig, MemoryTransport, NoiseConfig, PairId,
    Presenter,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct Printer;

impl Presenter for Printer {
    fn transmitted(&self, pair: PairId, endpoint: &str, line: &str) {
        println!("[{}] TX {}: {}", pair, endpoint, line);
    }

    fn received(&self, pair: PairId, endpoint: &str, _line: &str, decoded: &Decoded) {
        println!(
            "[{}] RX {}: data {} syndrome {:?} text {:?}",
            pair,
            endpoint,
            decoded.data,
            decoded.error_position,
            decoded.data.to_text_lossy()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Linkframe Loopback Example\n");

    // Step 1: Configure the default deployment with a noisy channel
    let config = LinkConfig {
        noise: Some(NoiseConfig {
            seed: 7,
            ..NoiseConfig::default()
        }),
        ..LinkConfig::default()
    };
    println!(
        "Group {} -> data field {} bits, pairs {}->{} and {}->{}\n",
        config.group_id,
        config.data_len(),
        config.pair_a.tx_endpoint,
        config.pair_a.rx_endpoint,
        config.pair_b.tx_endpoint,
        config.pair_b.rx_endpoint,
    );

    // Step 2: Start the session and both receivers
    let transport = MemoryTransport::for_config(&config);
    let session = Arc::new(CommunicationSession::new(config, transport, Printer));
    let receivers = session.start_receivers();

    // Step 3: Dispatch a few lines on each pair
    let mut senders = session.dispatch(PairId::A, "Hi\n0110\nok");
    senders.extend(session.dispatch(PairId::B, "Yo\n111111"));
    for sender in senders {
        match sender.join() {
            Ok(Ok(bytes)) => println!("Wrote {} bytes", bytes),
            Ok(Err(e)) => println!("Transmit failed: {}", e),
            Err(_) => println!("Transmit thread panicked"),
        }
    }

    // Step 4: Let the receivers drain, then stop everything
    thread::sleep(Duration::from_millis(200));
    let counters = session.counters();
    session.stop_all();
    session.transport().shutdown();
    for receiver in receivers {
        if let Ok(Err(e)) = receiver.join() {
            println!("Receiver ended with error: {}", e);
        }
    }

    println!("\nCounters since last reset: {:?}", counters);
    Ok(())
}
