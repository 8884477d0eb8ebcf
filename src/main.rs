use std::env;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process;

use memsim::memory::{MemoryManager, Outcome};
use memsim::paging::{Clock, Fifo, Lru, Page, Random, ReplacementPolicy};

/// Page size is fixed to 4 KB.
const PAGE_OFFSET_BITS: u32 = 12;

const USAGE: &str = "Usage: memsim inputfile numberframes replacementmode debugmode";

enum PolicyKind {
    Random,
    Fifo,
    Lru,
    Clock,
}

struct Config {
    trace_path: String,
    num_frames: usize,
    policy: PolicyKind,
    debug: bool,
}

impl Config {
    fn build(args: &[String]) -> Result<Config, String> {
        if args.len() != 5 {
            return Err(USAGE.to_string());
        }

        let trace_path = args[1].clone();

        let num_frames: usize = args[2]
            .parse()
            .map_err(|_| "Frame number must be at least 1".to_string())?;
        if num_frames < 1 {
            return Err("Frame number must be at least 1".to_string());
        }

        let policy = match args[3].as_str() {
            "rand" => PolicyKind::Random,
            "fifo" => PolicyKind::Fifo,
            "lru" => PolicyKind::Lru,
            "clock" => PolicyKind::Clock,
            _ => return Err("Replacement algorithm must be rand/fifo/lru/clock".to_string()),
        };

        let debug = match args[4].as_str() {
            "quiet" => false,
            "debug" => true,
            _ => return Err("Debug mode must be quiet/debug".to_string()),
        };

        Ok(Config {
            trace_path,
            num_frames,
            policy,
            debug,
        })
    }
}

#[derive(Default)]
struct Stats {
    events: u64,
    disk_reads: u64,
    disk_writes: u64,
}

impl Stats {
    fn fault_rate(&self) -> f64 {
        if self.events == 0 {
            0.0
        } else {
            self.disk_reads as f64 / self.events as f64
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let config = Config::build(&args).unwrap_or_else(|err| {
        eprintln!("{err}");
        process::exit(1);
    });

    if let Err(e) = run(config) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let file = File::open(&config.trace_path)
        .map_err(|_| format!("Cannot open trace file {}", config.trace_path))?;
    let reader = BufReader::new(file);

    let stats = match config.policy {
        PolicyKind::Random => run_trace(reader, &config, Random)?,
        PolicyKind::Fifo => run_trace(reader, &config, Fifo)?,
        PolicyKind::Lru => run_trace(reader, &config, Lru)?,
        PolicyKind::Clock => run_trace(reader, &config, Clock::new())?,
    };

    print_report(&config, &stats);
    Ok(())
}

fn run_trace<P: ReplacementPolicy>(
    reader: impl BufRead,
    config: &Config,
    policy: P,
) -> Result<Stats, Box<dyn Error>> {
    let mut mm = MemoryManager::new(config.num_frames, policy);
    let mut stats = Stats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (address, is_write) = parse_reference(&line)
            .ok_or_else(|| format!("Badly formatted file. Error on line {}", idx + 1))?;
        let page = Page((address >> PAGE_OFFSET_BITS) as usize);

        match mm.resolve(page, is_write) {
            Outcome::Hit => {}
            Outcome::Fault { evicted } => {
                stats.disk_reads += 1;
                if config.debug {
                    println!("Page fault {:8}", page.0);
                }
                if let Some(victim) = evicted {
                    if victim.was_modified {
                        stats.disk_writes += 1;
                        if config.debug {
                            println!("Disk write {:8}", victim.page.0);
                        }
                    } else if config.debug {
                        println!("Discard    {:8}", victim.page.0);
                    }
                }
            }
        }

        if config.debug {
            let verb = if is_write { "writing" } else { "reading" };
            println!("{verb}    {:8}", page.0);
        }

        stats.events += 1;
    }

    Ok(stats)
}

/// One trace line: a hex address and an access kind, e.g. `0041f7a0 R`.
fn parse_reference(line: &str) -> Option<(u64, bool)> {
    let mut fields = line.split_whitespace();
    let address = u64::from_str_radix(fields.next()?, 16).ok()?;
    let is_write = match fields.next()? {
        "R" => false,
        "W" => true,
        _ => return None,
    };
    if fields.next().is_some() {
        return None;
    }
    Some((address, is_write))
}

fn print_report(config: &Config, stats: &Stats) {
    println!("total memory frames:  {}", config.num_frames);
    println!("events in trace:      {}", stats.events);
    println!("total disk reads:     {}", stats.disk_reads);
    println!("total disk writes:    {}", stats.disk_writes);
    println!("page fault rate:      {:.4}", stats.fault_rate());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_and_write_references() {
        assert_eq!(parse_reference("0041f7a0 R"), Some((0x0041f7a0, false)));
        assert_eq!(parse_reference("13f5e2c0 W"), Some((0x13f5e2c0, true)));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_reference("0041f7a0"), None);
        assert_eq!(parse_reference("0041f7a0 X"), None);
        assert_eq!(parse_reference("nothex R"), None);
        assert_eq!(parse_reference("0041f7a0 R extra"), None);
    }

    #[test]
    fn config_rejects_zero_frames_and_bad_policy() {
        let args = |frames: &str, policy: &str, mode: &str| {
            vec![
                "memsim".to_string(),
                "trace.txt".to_string(),
                frames.to_string(),
                policy.to_string(),
                mode.to_string(),
            ]
        };
        assert!(Config::build(&args("0", "lru", "quiet")).is_err());
        assert!(Config::build(&args("4", "mru", "quiet")).is_err());
        assert!(Config::build(&args("4", "lru", "loud")).is_err());
        assert!(Config::build(&args("4", "clock", "debug")).is_ok());
    }
}
