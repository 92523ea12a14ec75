//! CLI output formatting utilities.

use std::io::Write;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a chunk response header.
    pub fn chunk_header(index: usize, total: usize) {
        println!(
            "\n{}",
            style(format!("--- Chunk {}/{} Response ---", index, total)).bold()
        );
    }

    /// Print text one character at a time, `delay_ms` per character.
    /// A zero delay prints the text at once.
    pub fn typewriter(text: &str, delay_ms: u64) {
        if delay_ms == 0 {
            println!("{}", text);
            return;
        }

        let mut stdout = std::io::stdout();
        for ch in text.chars() {
            print!("{}", ch);
            let _ = stdout.flush();
            std::thread::sleep(Duration::from_millis(delay_ms));
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
