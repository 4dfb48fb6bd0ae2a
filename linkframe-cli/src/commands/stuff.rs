use anyhow::{Context, Result};
use colored::*;
use linkframe_core::stuffing::{destuff, longest_run, stuff};
use linkframe_core::BitString;

/// Stuffed bits with every inserted marker in brackets
pub fn annotate(bits: &BitString) -> String {
    let stuffed = stuff(bits);
    stuffed
        .bits
        .iter()
        .enumerate()
        .map(|(i, bit)| {
            let digit = if bit { "1" } else { "0" };
            if stuffed.inserted.binary_search(&i).is_ok() {
                format!("[{}]", digit)
            } else {
                digit.to_string()
            }
        })
        .collect()
}

pub fn execute(bits: &str, reverse: bool) -> Result<()> {
    let input: BitString = bits
        .trim()
        .parse()
        .with_context(|| format!("Not a bit string: {}", bits))?;

    if reverse {
        let out = destuff(&input);
        println!("Destuffed: {}", out);
        println!("Removed:   {} bit(s)", input.len() - out.len());
        return Ok(());
    }

    let stuffed = stuff(&input);
    println!("Input:     {} ({} bits)", input, input.len());
    println!("Stuffed:   {}", annotate(&input).cyan());
    println!(
        "Inserted:  {} marker(s) at {:?}",
        stuffed.inserted.len(),
        stuffed.inserted
    );
    match stuffed.last_inserted {
        Some(pos) => println!("Last:      {}", pos),
        None => println!("Last:      {}", "none".dimmed()),
    }
    println!("Max run:   {}", longest_run(&stuffed.bits));

    Ok(())
}
