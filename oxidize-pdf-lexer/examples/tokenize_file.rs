//! Tokenize a PDF file and print one token per line
//!
//! Usage: cargo run --example tokenize_file -- <file.pdf> [offset] [max_tokens]
//!
//! Set RUST_LOG=oxidize_pdf_lexer=trace to watch buffer refills and lookahead.

use oxidize_pdf_lexer::{Lexer, LexerOptions, Token};
use std::env;
use std::fs::File;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oxidize_pdf_lexer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.pdf> [offset] [max_tokens]", args[0]);
        std::process::exit(1);
    }

    let offset: u64 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(0);
    let max_tokens: usize = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(200);

    let file = File::open(&args[1])?;
    let mut lexer = Lexer::with_options(file, LexerOptions::large_file());
    lexer.set_position(offset);

    for _ in 0..max_tokens {
        let position = lexer.position();
        match lexer.next_token() {
            Ok(Token::Eof) => {
                println!("{position:>10}  <eof>");
                break;
            }
            Ok(Token::String(bytes)) => {
                println!("{position:>10}  String({:?})", String::from_utf8_lossy(&bytes))
            }
            Ok(token) => println!("{position:>10}  {token:?}"),
            Err(e) => {
                eprintln!("{e}");
                // Skip the offending byte and keep going
                lexer.set_position(e.position().unwrap_or(position) + 1);
            }
        }
    }

    Ok(())
}
