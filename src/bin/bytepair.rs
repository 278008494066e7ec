use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use bytepair::config::{EncoderConfig, IngestConfig, TrainerConfig, WhitespaceKind};
use bytepair::corpus::load_corpus;
use bytepair::serialization;
use bytepair::{TokenId, Tokenizer, Trainer, BASE_VOCAB_SIZE};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde_json::json;

const DEFAULT_OUTPUT: &str = "vocab.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Byte pair encoding toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a vocabulary from text files
    Train(TrainArgs),
    /// Encode text with a trained vocabulary
    Encode(EncodeArgs),
    /// Decode token ids back into text
    Decode(DecodeArgs),
    /// Inspect a vocabulary artifact
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Files or directories forming the corpus
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path for the vocabulary artifact
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Target vocabulary size (including the 256 byte tokens)
    #[arg(long, value_name = "SIZE")]
    vocab_size: Option<usize>,

    /// Minimum frequency for merges
    #[arg(long, value_name = "COUNT")]
    min_frequency: Option<usize>,

    /// Maximum merge iterations
    #[arg(long, value_name = "COUNT")]
    max_merge_iterations: Option<usize>,

    /// Never count pairs whose second token is a space
    #[arg(long)]
    skip_whitespace_pairs: bool,

    /// Leave an existing artifact untouched instead of retraining
    #[arg(long)]
    skip_existing: bool,

    /// Write per-iteration training metrics as JSON
    #[arg(long, value_name = "PATH")]
    metrics: Option<PathBuf>,

    /// Disable per-iteration logging/progress
    #[arg(long)]
    no_progress: bool,

    /// Emit pretty JSON
    #[arg(long)]
    pretty: bool,

    /// Disable recursive directory traversal
    #[arg(long)]
    no_recursive: bool,

    /// Follow symlinks during traversal
    #[arg(long)]
    follow_symlinks: bool,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Vocabulary artifact to load
    #[arg(short = 'm', long, value_name = "PATH")]
    vocab: PathBuf,

    /// Files to encode
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    inputs: Vec<PathBuf>,

    /// Encode this text instead of files
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,

    /// Segment each whitespace-led word separately
    #[arg(long)]
    preserve_word_boundaries: bool,

    /// Treat all Unicode whitespace as word separators
    #[arg(long)]
    unicode_whitespace: bool,

    /// Print the matched pieces separated by `|`
    #[arg(long)]
    show_pieces: bool,

    /// Emit JSON lines instead of human-readable output
    #[arg(long)]
    json: bool,

    /// Optional directory to write .tokens files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Vocabulary artifact to load
    #[arg(short = 'm', long, value_name = "PATH")]
    vocab: PathBuf,

    /// Path to whitespace separated token ids
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Token ids to decode when --input is omitted
    #[arg(value_name = "ID", required_unless_present = "input")]
    tokens: Vec<TokenId>,

    /// Output file for decoded bytes (defaults to stdout)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Vocabulary artifact to inspect
    #[arg(short = 'm', long, value_name = "PATH")]
    vocab: PathBuf,

    /// Emit machine-readable JSON summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Info(args) => run_info(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn run_train(args: TrainArgs) -> Result<()> {
    if args.skip_existing && args.output.exists() {
        info!(
            "{} already exists; skipping training",
            args.output.display()
        );
        println!("vocabulary {} exists, nothing to do", args.output.display());
        return Ok(());
    }

    let mut cfg = TrainerConfig::builder();
    if let Some(vocab_size) = args.vocab_size {
        cfg = cfg.target_vocab_size(vocab_size);
    }
    if let Some(min_frequency) = args.min_frequency {
        cfg = cfg.min_frequency(min_frequency);
    }
    cfg = cfg.max_merge_iterations(args.max_merge_iterations);
    cfg = cfg.skip_whitespace_pairs(args.skip_whitespace_pairs);
    cfg = cfg.show_progress(!args.no_progress);
    let trainer_cfg = cfg.build()?;

    let ingest_cfg = IngestConfig {
        recursive: !args.no_recursive,
        follow_symlinks: args.follow_symlinks,
    };
    let corpus = load_corpus(&args.inputs, &ingest_cfg).context("failed to load corpus")?;
    if corpus.is_empty() {
        warn!("corpus is empty; the vocabulary will hold only the byte alphabet");
    }
    info!(
        "loaded corpus of {:.2} MiB",
        bytes_to_mebibytes(corpus.len())
    );

    let spinner = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} training merges... {elapsed}")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    };

    let trainer = Trainer::new(trainer_cfg);
    let start = Instant::now();
    let artifacts = trainer.train(&corpus)?;
    if let Some(pb) = spinner {
        pb.finish_with_message("training complete");
    }
    let elapsed = start.elapsed();

    serialization::save_vocab(&artifacts.vocab, &args.output, args.pretty)
        .with_context(|| format!("failed to save vocabulary to {}", args.output.display()))?;
    if let Some(path) = &args.metrics {
        let report = serde_json::to_string_pretty(&artifacts.metrics)?;
        fs::write(path, report)
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    }

    let vocab_size = artifacts.vocab.size();
    let merges = artifacts.vocab.merge_count();
    info!(
        "training complete: merges={merges} vocab={vocab_size} duration={elapsed:.2?} stop={:?}",
        artifacts.metrics.stop_reason
    );
    println!(
        "wrote vocabulary with {} entries ({} merges) to {}",
        vocab_size,
        merges,
        args.output.display()
    );
    println!(
        "   corpus {:.2} MiB -> {} tokens | duration {:.2?}",
        bytes_to_mebibytes(corpus.len()),
        artifacts.tokens.len(),
        elapsed
    );

    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    let encoder_cfg = EncoderConfig::builder()
        .preserve_word_boundaries(args.preserve_word_boundaries)
        .whitespace(if args.unicode_whitespace {
            WhitespaceKind::Unicode
        } else {
            WhitespaceKind::Ascii
        })
        .build();
    let tokenizer = Tokenizer::from_file(&args.vocab, encoder_cfg)
        .with_context(|| format!("failed to load vocabulary from {}", args.vocab.display()))?;

    let (labels, inputs): (Vec<String>, Vec<Vec<u8>>) = match &args.text {
        Some(text) => (vec!["text".to_string()], vec![text.as_bytes().to_vec()]),
        None => {
            let mut labels = Vec::with_capacity(args.inputs.len());
            let mut inputs = Vec::with_capacity(args.inputs.len());
            for path in &args.inputs {
                let data = fs::read(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                labels.push(path.display().to_string());
                inputs.push(data);
            }
            (labels, inputs)
        }
    };

    if let Some(dir) = &args.output_dir {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        }
    }

    let encoded = tokenizer.encode_batch(&inputs)?;
    for ((label, data), tokens) in labels.iter().zip(&inputs).zip(&encoded) {
        if args.show_pieces {
            let pieces = tokenizer.pieces(data)?;
            let rendered = pieces
                .iter()
                .map(|piece| String::from_utf8_lossy(piece.bytes))
                .collect::<Vec<_>>()
                .join("|");
            eprintln!("{label}: {rendered}|");
        }

        if let Some(dir) = &args.output_dir {
            let filename = Path::new(label)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "text".to_string());
            let out_path = dir.join(format!("{filename}.tokens"));
            let mut output = File::create(&out_path)
                .with_context(|| format!("failed to open {}", out_path.display()))?;
            write_token_sequence(&mut output, tokens)?;
            println!("{label} => {}", out_path.display());
        } else if args.json {
            let record = json!({
                "path": label,
                "tokens": tokens,
            });
            println!("{}", serde_json::to_string(&record)?);
        } else {
            print!("{label}:\t");
            write_token_sequence(&mut io::stdout(), tokens)?;
        }
    }

    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let tokenizer = Tokenizer::from_file(&args.vocab, EncoderConfig::default())
        .with_context(|| format!("failed to load vocabulary from {}", args.vocab.display()))?;

    let tokens = if let Some(input_path) = &args.input {
        let contents = fs::read_to_string(input_path)
            .with_context(|| format!("failed to read {}", input_path.display()))?;
        parse_token_list(&contents)?
    } else {
        args.tokens
    };

    let bytes = tokenizer.decode(&tokens)?;

    if let Some(path) = &args.output {
        let mut file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(&bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {} bytes to {}", bytes.len(), path.display());
    } else {
        io::stdout().write_all(&bytes)?;
    }

    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let vocab = serialization::load_vocab(&args.vocab)
        .with_context(|| format!("failed to load vocabulary from {}", args.vocab.display()))?;

    let longest = vocab
        .iter()
        .max_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.0.cmp(&a.0)))
        .ok_or_else(|| anyhow!("vocabulary is empty"))?;
    let longest_text = String::from_utf8_lossy(longest.1).to_string();
    let summary = json!({
        "path": args.vocab.display().to_string(),
        "vocab_size": vocab.size(),
        "base_size": BASE_VOCAB_SIZE,
        "merges": vocab.merge_count(),
        "longest_token": {
            "id": longest.0,
            "length": longest.1.len(),
            "text": longest_text,
        },
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Vocab size   : {}", vocab.size());
        println!("Merges       : {}", vocab.merge_count());
        println!(
            "Longest token: {} ({} bytes) {:?}",
            longest.0,
            longest.1.len(),
            longest_text
        );
    }

    Ok(())
}

#[must_use]
fn bytes_to_mebibytes(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

fn write_token_sequence<W: Write>(writer: &mut W, tokens: &[TokenId]) -> Result<()> {
    for (idx, token) in tokens.iter().enumerate() {
        if idx > 0 {
            writer.write_all(b" ")?;
        }
        write!(writer, "{token}")?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}

fn parse_token_list(text: &str) -> Result<Vec<TokenId>> {
    text.split_whitespace()
        .map(|part| {
            part.parse::<TokenId>()
                .map_err(|err| anyhow!("invalid token id `{part}`: {err}"))
        })
        .collect()
}
