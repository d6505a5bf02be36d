//! An interactive console over a box factory.
//!
//! Reads a menu choice, then a side and a height, from standard input and
//! prints the outcome. End of input quits.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dominance::{BoxFactory, Error};

#[derive(Parser, Debug)]
#[command(name = "boxes", about = "inserts, removes and looks up boxes interactively")]
struct Args {
    /// Log index operations unless RUST_LOG says otherwise.
    #[arg(long, short = 'v')]
    verbose: bool,
}

const MENU: &[&str] = &[
    "Insert a box",
    "Remove a box",
    "Get the sizes of an appropriate box",
    "Check if an appropriate box exists",
    "Quit",
];

fn main() -> io::Result<()> {

    let args = Args::parse();
    let fallback = if args.verbose { "trace" } else { "off" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    run(&mut BoxFactory::new(), &mut stdin.lock(), &mut io::stdout())
}

// serves menu requests until the user quits, input ends, or memory runs out.
fn run<R: BufRead, W: Write>(boxes: &mut BoxFactory, input: &mut R, output: &mut W) -> io::Result<()> {
    loop {
        for (position, item) in MENU.iter().enumerate() {
            writeln!(output, "{}. {}", position, item)?;
        }
        let choice: usize = match prompt(input, output, "")? {
            Some(choice) => choice,
            None => return Ok(()),
        };

        if choice == MENU.len() - 1 {
            return Ok(());
        }
        if choice >= MENU.len() {
            writeln!(output, "Invalid option: {}\n", choice)?;
            continue;
        }

        let side: u64 = match prompt(input, output, "Enter size of side: ")? {
            Some(side) => side,
            None => return Ok(()),
        };
        let height: u64 = match prompt(input, output, "Enter size of height: ")? {
            Some(height) => height,
            None => return Ok(()),
        };

        match choice {
            0 => {
                if !report_insert(output, side, height, boxes.insert(side, height))? {
                    return Ok(());
                }
            }
            1 => {
                if boxes.remove(side, height) {
                    writeln!(output, "Removed a box with side={} and height={}", side, height)?;
                }
                else {
                    writeln!(output, "Error: Box size not found")?;
                }
            }
            2 => match boxes.get_box(side, height) {
                Some(found) => writeln!(output, "Found a box with {}", found)?,
                None => writeln!(output, "Error: No matching box found")?,
            },
            _ => {
                if boxes.check_box(side, height) {
                    writeln!(output, "A matching box exists")?;
                }
                else {
                    writeln!(output, "No matching box exists")?;
                }
            }
        }
        writeln!(output)?;
    }
}

// reports an insertion, returning `false` when the console should stop.
fn report_insert<W: Write>(output: &mut W, side: u64, height: u64, outcome: dominance::Result<()>) -> io::Result<bool> {
    match outcome {
        Ok(()) => writeln!(output, "Inserted a box with side={} and height={}", side, height)?,
        Err(Error::Allocation(_)) => {
            writeln!(output, "Fatal error: Insertion failed (out of memory)")?;
            return Ok(false);
        }
        Err(error) => writeln!(output, "Error: insertion failed: {}", error)?,
    }
    Ok(true)
}

// prints `label` and reads lines until one parses; `None` at end of input.
fn prompt<T: FromStr, R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<Option<T>> {
    let mut line = String::new();
    loop {
        write!(output, "{}", label)?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => writeln!(output, "Not a number: {:?}", line.trim())?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(script: &str) -> (BoxFactory, String) {
        let mut boxes = BoxFactory::new();
        let mut output = Vec::new();
        run(&mut boxes, &mut script.as_bytes(), &mut output).unwrap();
        (boxes, String::from_utf8(output).unwrap())
    }

    #[test]
    fn serves_requests_until_quit() {
        let (boxes, output) = session("0\n3\n4\n2\n2\n2\n3\n5\n1\n4\n0\n1\n1\n");
        assert!(output.contains("Inserted a box with side=3 and height=4"));
        assert!(output.contains("Found a box with side=3 height=4"));
        assert!(output.contains("No matching box exists"));
        assert!(!output.contains("Removed"));
        assert_eq!(boxes.len(), 1);
    }

    #[test]
    fn oversized_side_keeps_the_console_running() {
        let (boxes, output) = session("0\n4294967296\n1\n0\n2\n2\n");
        assert!(output.contains("Error: insertion failed"));
        assert!(output.contains("Inserted a box with side=2 and height=2"));
        assert_eq!(boxes.len(), 1);
    }

    #[test]
    fn out_of_memory_is_fatal() {
        let exhausted = Vec::<u64>::new().try_reserve(usize::MAX).unwrap_err();
        let mut output = Vec::new();
        assert!(!report_insert(&mut output, 3, 4, Err(Error::Allocation(exhausted))).unwrap());
        assert_eq!(String::from_utf8(output).unwrap(), "Fatal error: Insertion failed (out of memory)\n");

        let mut output = Vec::new();
        assert!(report_insert(&mut output, 3, 4, Err(Error::SideTooLarge(1 << 32))).unwrap());
        assert!(report_insert(&mut output, 3, 4, Ok(())).unwrap());
    }
}
