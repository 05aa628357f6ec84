mod sim;

use anyhow::Result;
use clap::Parser;
use hashchain_core::constants::DEFAULT_DIFFICULTY;
use hashchain_core::pow::Solver;
use hashchain_core::{Chain, ChainConfig};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use sim::{corrupt_block, Simulation};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hashchain-sim")]
#[command(about = "Simulate peers mining a proof-of-work chain, optionally corrupt it, then validate")]
struct Args {
    /// Leading zero hex characters each proof must produce
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u32,

    /// Mining rounds; every peer mines one block per round
    #[arg(long, default_value_t = 5)]
    rounds: usize,

    /// Comma separated peer names
    #[arg(long, value_delimiter = ',', default_values = ["Peer A", "Peer B", "Peer C"])]
    peers: Vec<String>,

    /// Synthetic transactions put in each mined block
    #[arg(long, default_value_t = 1)]
    txs_per_block: usize,

    /// Corrupt the chain for a peer at a 0-based block position (genesis = 0)
    #[arg(
        long,
        num_args = 2,
        value_names = ["PEER_INDEX", "BLOCK_INDEX"],
        allow_negative_numbers = true
    )]
    corrupt: Option<Vec<i64>>,

    /// Search proofs on all cores
    #[arg(long, conflicts_with = "max_attempts")]
    parallel: bool,

    /// Give up a proof search after this many candidates
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Print the chain as single-line JSON
    #[arg(long)]
    compact: bool,
}

impl Args {
    fn solver(&self) -> Solver {
        match (self.parallel, self.max_attempts) {
            (true, _) => Solver::Parallel,
            (false, Some(max)) => Solver::Bounded(max),
            (false, None) => Solver::Sequential,
        }
    }
}

fn render<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    if compact {
        return Ok(serde_json::to_string(value)?);
    }
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

fn print_chain(chain: &Chain, compact: bool) -> Result<()> {
    println!("{}", render(&chain.snapshot_with_current_hash(), compact)?);
    Ok(())
}

fn main() -> Result<()> {
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let mut chain = Chain::with_config(ChainConfig {
        difficulty: args.difficulty,
    });
    let simulation = Simulation {
        peers: args.peers.clone(),
        rounds: args.rounds,
        txs_per_block: args.txs_per_block,
        solver: args.solver(),
    };
    simulation.run(&mut chain)?;
    info!(blocks = chain.len(), difficulty = chain.difficulty(), "mining finished");

    println!("Blockchain before corruption:");
    print_chain(&chain, args.compact)?;

    if let Some([peer_index, block_index]) = args.corrupt.as_deref() {
        match simulation.peer(*peer_index) {
            Some(peer) => {
                println!("Corrupting blockchain for {peer} at block {block_index}.");
                if !corrupt_block(&mut chain, *block_index) {
                    warn!(block_index, "no block at that position, chain left unchanged");
                }
            }
            None => println!("Invalid peer index."),
        }
        println!();
        println!("Blockchain after corruption:");
        print_chain(&chain, args.compact)?;
    }

    let (valid, invalid) = chain.is_valid();
    println!("Blockchain valid: {valid}");
    if !valid {
        println!("Invalid blocks: {invalid:?}");
    }
    Ok(())
}
