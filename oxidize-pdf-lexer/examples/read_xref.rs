//! Print the classic xref table of a PDF file
//!
//! Usage: cargo run --example read_xref -- <file.pdf>

use oxidize_pdf_lexer::{read_xref_table, Lexer, LexerOptions, ParseError};
use std::env;
use std::fs::File;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How far from the end of the file to look for `startxref`
const TAIL_WINDOW: u64 = 1024;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oxidize_pdf_lexer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = env::args().nth(1).ok_or("Usage: read_xref <file.pdf>")?;
    let file = File::open(&path)?;
    let len = file.metadata()?.len();
    let mut lexer = Lexer::with_options(file, LexerOptions::small_file());

    // Find the last startxref in the tail of the file
    let tail_start = len.saturating_sub(TAIL_WINDOW);
    lexer.set_position(tail_start);
    let mut xref_offset = None;
    while let Some(distance) = lexer.find_keyword_ahead("startxref", TAIL_WINDOW as usize)? {
        lexer.set_position(lexer.position() + distance as u64);
        lexer.expect_keyword("startxref")?;
        xref_offset = lexer.peek_token()?.as_integer();
    }
    let xref_offset = xref_offset.ok_or("startxref not found")?;

    lexer.set_position(xref_offset as u64);
    let subsections = match read_xref_table(&mut lexer) {
        Ok(subsections) => subsections,
        Err(ParseError::UnexpectedToken { found, .. }) => {
            return Err(format!("no classic xref table at {xref_offset} (found {found})").into())
        }
        Err(e) => return Err(e.into()),
    };

    for subsection in &subsections {
        println!("subsection {} ({} entries)", subsection.first_object, subsection.entries.len());
        for (object_number, entry) in subsection.iter() {
            println!(
                "  {object_number:>6}: {:010} {:05} {}",
                entry.offset,
                entry.generation,
                entry.kind()
            );
        }
    }

    if lexer.next_token()?.is_keyword("trailer") {
        println!("trailer keyword ends at {}", lexer.position());
    }

    Ok(())
}
