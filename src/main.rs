use clap::{Parser, Subcommand};
use eyre::{ensure, Result, WrapErr};
use std::path::PathBuf;
use tracing::{debug, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use xts_aes::{
    vectors::{harness, parse_rsp},
    Block, XtsAes,
};

fn parse_tweak(tweak: &str) -> Result<Block> {
    let bytes = hex::decode(tweak).wrap_err("Tweak is not valid hex")?;
    ensure!(
        bytes.len() == 16,
        "Tweak must be 16 bytes, got {}",
        bytes.len()
    );
    let mut block = [0; 16];
    block.copy_from_slice(&bytes);
    Ok(block)
}

#[derive(Parser)]
#[command(name = "xts-aes", version, about = "XTS-AES encryption with ciphertext stealing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt a file as a single data unit
    Encrypt {
        /// key1 || key2 as hex, 32, 48 or 64 bytes
        #[arg(short = 'k', long, value_name = "HEX")]
        key: String,
        /// The 16 byte raw tweak as hex
        #[arg(short = 't', long, value_name = "HEX")]
        tweak: String,
        #[arg(index = 1)]
        input: PathBuf,
        #[arg(index = 2)]
        output: PathBuf,
    },
    /// Check the encryptor against a NIST CAVS .rsp file
    Verify {
        #[arg(index = 1)]
        vectors: PathBuf,
        /// Also list passed and skipped vectors
        #[arg(short = 'v', long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
    trace!("Starting up xts-aes cli");
    match cli.command {
        Command::Encrypt {
            key,
            tweak,
            input,
            output,
        } => {
            let key = hex::decode(key).wrap_err("Key is not valid hex")?;
            let tweak = parse_tweak(&tweak)?;
            let xts = XtsAes::from_combined_key(&key)?;
            let mut data = std::fs::read(&input)
                .wrap_err_with(|| format!("Couldn't read {input:?}"))?;
            debug!("Encrypting {} bytes from {input:?}", data.len());
            xts.encrypt_in_place(&tweak, &mut data)
                .wrap_err("Failed to encrypt data unit")?;
            std::fs::write(&output, &data)
                .wrap_err_with(|| format!("Couldn't write {output:?}"))?;
        }
        Command::Verify { vectors, verbose } => {
            let text = std::fs::read_to_string(&vectors)
                .wrap_err_with(|| format!("Couldn't read {vectors:?}"))?;
            let parsed = parse_rsp(&text).wrap_err("Failed to parse vector file")?;
            let report = harness::run_vectors(&parsed);
            for result in &report.results {
                let is_failure = matches!(
                    result.outcome,
                    harness::Outcome::Failed { .. } | harness::Outcome::Rejected(_)
                );
                if verbose || is_failure {
                    println!("{result}");
                }
            }
            println!("{report}");
            ensure!(report.is_success(), "{} vectors failed", report.failed());
        }
    }
    Ok(())
}
