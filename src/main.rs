use clap::{Parser, Subcommand};
use simple_captcha::batch::{self, BatchRequest};
use simple_captcha::challenge::{ChallengeMode, CustomChallenge};
use simple_captcha::config::{self, Config};
use simple_captcha::{EncodeFormat, Generator, font, output};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that pick a challenge strategy.
#[derive(clap::Args, Clone, Copy)]
struct ModeArgs {
    /// Draw a single-digit sum ("3+5") instead of random text
    #[arg(long)]
    math: bool,
}

impl ModeArgs {
    fn mode(self) -> ChallengeMode {
        if self.math {
            ChallengeMode::Math
        } else {
            ChallengeMode::Text
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-captcha")]
#[command(about = "Generate captcha images")]
#[command(long_about = "\
Generate captcha images

Renders random text or single-digit sums glyph by glyph, with jittered size
and position, over pixel noise and sine-curve strokes. The answer is printed
to stdout; images are written as PNG, JPEG or GIF.

Configuration (first found wins):
  --config FILE
  ./captcha.toml
  built-in defaults

Examples:
  simple-captcha generate -o captcha.png
  simple-captcha generate --math -o sum.gif
  simple-captcha batch --count 100 --out fixtures/
  RUST_LOG=debug simple-captcha generate

Run 'simple-captcha gen-config' to generate a documented captcha.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (defaults to ./captcha.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// TrueType/OpenType font to render with (overrides the config's `font`)
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one captcha and print its answer
    Generate {
        #[command(flatten)]
        mode: ModeArgs,
        /// Output image; the format follows the extension
        /// (default: captcha.<output.format>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render many captchas in parallel, plus an answers.json manifest
    Batch {
        /// Number of captchas to generate
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
        #[command(flatten)]
        mode: ModeArgs,
        /// Output directory
        #[arg(long, default_value = "captchas")]
        out: PathBuf,
    },
    /// Validate config and font without writing anything
    Check,
    /// Print a stock captcha.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Generate { mode, output: out_path } => {
            let (config, _) = setup(cli.config.as_deref(), cli.font.as_deref())?;
            let path = out_path.unwrap_or_else(|| {
                PathBuf::from(format!("captcha.{}", config.output.format.extension()))
            });
            let format = EncodeFormat::from_path(&path).unwrap_or(config.output.format);
            let captcha = match mode.mode() {
                ChallengeMode::Text => {
                    simple_captcha::new(config.width, config.height, &config.captcha)?
                }
                ChallengeMode::Math => {
                    simple_captcha::new_math(config.width, config.height, &config.captcha)?
                }
            };
            let mut writer = BufWriter::new(File::create(&path)?);
            captcha.encode(&mut writer, &config.output.encode_options(format))?;
            writer.flush()?;
            println!("{}", captcha.answer());
        }
        Command::Batch { count, mode, out } => {
            let (config, _) = setup(cli.config.as_deref(), cli.font.as_deref())?;
            init_thread_pool(&config.processing);
            let request = BatchRequest {
                count,
                mode: mode.mode(),
                width: config.width,
                height: config.height,
                options: config.captcha.clone(),
                encode: config.output.encode_options(config.output.format),
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::run_batch(font::default_store(), &out, &request, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let manifest = result?;
            output::print_batch_summary(&manifest, &out);
        }
        Command::Check => {
            let (config, font_path) = setup(cli.config.as_deref(), cli.font.as_deref())?;
            check_font_covers(&config)?;
            output::print_check_output(
                &config,
                font_path.as_deref(),
                config::effective_threads(&config.processing),
            );
            println!("==> Config is valid");
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default
/// `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Load the config (explicit path, else `./captcha.toml`, else defaults) and
/// the font it or `--font` names. Returns the config and the font path used.
fn setup(
    config_path: Option<&Path>,
    font_flag: Option<&Path>,
) -> Result<(Config, Option<PathBuf>), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .or_else(|| config::find_config(Path::new(".")));
    let config = config::load_config(config_path.as_deref())?;
    let font_path = font_flag.map(Path::to_path_buf).or_else(|| config.font.clone());
    if let Some(path) = &font_path {
        load_font_file(path)?;
    }
    Ok((config, font_path))
}

/// Replace the process-wide font with the file at `path`.
fn load_font_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    font::load_font_from_reader(file).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(())
}

/// Render every configured symbol once so a font lacking any of them is
/// reported now rather than on some later, random generation.
fn check_font_covers(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let symbols: String = config
        .captcha
        .character_set
        .chars()
        .chain("0123456789+".chars())
        .collect();
    let mut source = CustomChallenge::new(|| (String::new(), symbols.clone()));
    Generator::new(font::default_store()).generate(
        &mut rand::rng(),
        &mut source,
        config.width,
        config.height,
        &config.captcha,
    )?;
    Ok(())
}
