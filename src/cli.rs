use crate::{
    decode_base64, digest_async, encode_base64, format_bytes, format_duration, generate,
    AdFormat, AdSlotRenderer, AudioConverter, AudioFormat, CandidateFile, CharsetFlags, Config, FileIntake, HashAlgorithm,
    IntakeConfig, Metrics, Notice, Notifier, PasswordSpec, SimulatedAudioConverter,
    SimulatedTask, SimulatedUrlShortener, SimulatedVideoDownloader, Strength, ToolError,
    UrlShortener, VideoDownloader,
};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "toolbench")]
#[command(about = "Everyday utility tools: hashing, passwords, uploads and more")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Maximum accepted file size in bytes")]
    pub max_size: Option<u64>,

    #[arg(long, global = true, help = "Maximum number of files held by the dropzone")]
    pub max_files: Option<usize>,

    #[arg(long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Print Prometheus metrics on exit")]
    pub metrics: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hash text or a file
    Hash {
        #[arg(short, long, default_value = "sha256", help = "Algorithm (simple32, sha1, sha256, sha512)")]
        algorithm: String,

        #[arg(short, long, help = "Text to hash")]
        text: Option<String>,

        #[arg(short, long, help = "File to hash")]
        file: Option<PathBuf>,

        #[arg(long, help = "Print the digest for every algorithm")]
        all: bool,
    },

    /// Encode or decode base64
    Base64 {
        #[arg(help = "Input text")]
        input: String,

        #[arg(short, long, help = "Decode instead of encode")]
        decode: bool,
    },

    /// Generate passwords
    Password {
        #[arg(short, long, help = "Password length (4-50)")]
        length: Option<usize>,

        #[arg(short, long, default_value = "1", help = "Number of passwords")]
        count: usize,

        #[arg(long, help = "Exclude uppercase letters")]
        no_upper: bool,

        #[arg(long, help = "Exclude lowercase letters")]
        no_lower: bool,

        #[arg(long, help = "Exclude digits")]
        no_digits: bool,

        #[arg(long, help = "Exclude symbols")]
        no_symbols: bool,
    },

    /// Validate files against the dropzone rules
    Intake {
        #[arg(required = true, help = "Files to add")]
        files: Vec<PathBuf>,

        #[arg(long, help = "Accepted MIME pattern, e.g. image/* (repeatable)")]
        accept: Vec<String>,
    },

    /// Shorten URLs (simulated)
    Shorten {
        #[arg(required = true, help = "URLs to shorten")]
        urls: Vec<String>,
    },

    /// Look up downloadable formats for a video URL (simulated)
    Video {
        #[arg(help = "Video page URL")]
        url: String,
    },

    /// Convert an audio file (simulated)
    Convert {
        #[arg(short, long, help = "Input audio or video file")]
        input: PathBuf,

        #[arg(short, long, help = "Target format (mp3, wav, ogg, flac, aac, m4a)")]
        to: String,

        #[arg(short, long, help = "Output directory (default: next to the input)")]
        output: Option<PathBuf>,
    },

    /// Validate configuration
    Validate {
        #[arg(short, long, help = "Configuration file to validate")]
        config: PathBuf,
    },
}

impl Commands {
    /// Ad slot shown under the command's output.
    pub fn slot_id(&self) -> &'static str {
        match self {
            Commands::Hash { .. } => "hash-result",
            Commands::Base64 { .. } => "base64-result",
            Commands::Password { .. } => "password-result",
            Commands::Intake { .. } => "intake-result",
            Commands::Shorten { .. } => "shorten-result",
            Commands::Video { .. } => "video-result",
            Commands::Convert { .. } => "convert-result",
            Commands::Validate { .. } => "validate-result",
        }
    }
}

pub struct CliRunner {
    pub config: Config,
    pub metrics: Arc<Metrics>,
    pub notifier: Arc<dyn Notifier>,
    pub ads: Arc<dyn AdSlotRenderer>,
}

impl CliRunner {
    pub fn new(
        mut config: Config,
        args: &Cli,
        metrics: Arc<Metrics>,
        notifier: Arc<dyn Notifier>,
        ads: Arc<dyn AdSlotRenderer>,
    ) -> Self {
        // Override config with CLI args
        if let Some(max_size) = args.max_size {
            config.intake.max_size = max_size;
        }
        if let Some(max_files) = args.max_files {
            config.intake.max_files = max_files;
        }

        Self {
            config,
            metrics,
            notifier,
            ads,
        }
    }

    /// Run `command` unless `interrupt` resolves first, in which case the
    /// pending work is abandoned and `Interrupted` is returned.
    pub async fn run_until<S>(&self, command: Commands, interrupt: S) -> Result<(), Box<dyn std::error::Error>>
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            result = self.run(command) => result,
            _ = interrupt => {
                info!("Received interrupt, abandoning pending work");
                Err(ToolError::Interrupted.into())
            }
        }
    }

    pub async fn run(&self, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
        let slot_id = command.slot_id();
        let result = match command {
            Commands::Hash {
                algorithm,
                text,
                file,
                all,
            } => self.run_hash(&algorithm, text, file, all).await,
            Commands::Base64 { input, decode } => self.run_base64(&input, decode),
            Commands::Password {
                length,
                count,
                no_upper,
                no_lower,
                no_digits,
                no_symbols,
            } => {
                let charset = if no_upper || no_lower || no_digits || no_symbols {
                    CharsetFlags {
                        upper: !no_upper,
                        lower: !no_lower,
                        digit: !no_digits,
                        symbol: !no_symbols,
                    }
                } else {
                    self.config.password.charset
                };
                self.run_password(length.unwrap_or(self.config.password.length), charset, count)
            }
            Commands::Intake { files, accept } => self.run_intake(files, accept).await,
            Commands::Shorten { urls } => self.run_shorten(urls).await,
            Commands::Video { url } => self.run_video(&url).await,
            Commands::Convert { input, to, output } => self.run_convert(input, &to, output).await,
            Commands::Validate { config } => self.validate_config(config).await,
        };

        match &result {
            Ok(()) => self.ads.render(slot_id, AdFormat::Horizontal),
            Err(e) => {
                self.metrics.record_error(e);
                self.notifier.notify(e.notice());
            }
        }

        Ok(result?)
    }

    pub async fn run_hash(
        &self,
        algorithm: &str,
        text: Option<String>,
        file: Option<PathBuf>,
        all: bool,
    ) -> Result<(), ToolError> {
        let input = match (text, file) {
            (Some(text), None) => text.into_bytes(),
            (None, Some(path)) => fs::read(&path).await?,
            (None, None) => {
                return Err(ToolError::ConfigurationError(
                    "Provide either --text or --file".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(ToolError::ConfigurationError(
                    "--text and --file are mutually exclusive".to_string(),
                ))
            }
        };

        let algorithms = if all {
            HashAlgorithm::ALL.to_vec()
        } else {
            vec![algorithm.parse::<HashAlgorithm>()?]
        };

        for algorithm in algorithms {
            let hex = digest_async(algorithm, input.clone()).await?;
            self.metrics.record_hash(input.len());
            println!("{:<26} {}", algorithm.label(), hex);
        }

        Ok(())
    }

    pub fn run_base64(&self, input: &str, decode: bool) -> Result<(), ToolError> {
        let output = if decode {
            let bytes = decode_base64(input)?;
            String::from_utf8(bytes)
                .map_err(|e| ToolError::InvalidEncoding(format!("decoded data is not UTF-8: {e}")))?
        } else {
            encode_base64(input.as_bytes())
        };

        self.metrics.record_encoding();
        println!("{output}");
        Ok(())
    }

    pub fn run_password(&self, length: usize, charset: CharsetFlags, count: usize) -> Result<(), ToolError> {
        let spec = PasswordSpec::new(length, charset)?;

        for _ in 0..count.max(1) {
            let password = generate(&spec)?;
            self.metrics.record_password();
            println!("{password}");
        }

        println!("Strength: {}", Strength::of_length(spec.length()));
        Ok(())
    }

    pub async fn run_intake(&self, files: Vec<PathBuf>, accept: Vec<String>) -> Result<(), ToolError> {
        let mut config = self.config.intake.clone();
        if !accept.is_empty() {
            config.accept = accept;
        }

        let mut candidates = Vec::with_capacity(files.len());
        for path in &files {
            candidates.push(CandidateFile::from_path(path).await?);
        }

        let mut intake = FileIntake::new(config);
        let outcome = intake.accept(candidates);
        self.metrics
            .record_intake(outcome.accepted.len(), outcome.rejected.len());

        println!("Accepted {} file(s):", outcome.accepted.len());
        for file in intake.files() {
            println!("  {} ({}, {})", file.name, file.mime_type, format_bytes(file.size));
        }

        if !outcome.rejected.is_empty() {
            println!("Rejected {} file(s):", outcome.rejected.len());
            for rejection in &outcome.rejected {
                println!("  {}", rejection.file_name);
                for reason in &rejection.reasons {
                    println!("    - {reason}");
                }
                self.notifier.notify(ToolError::from(rejection.clone()).notice());
            }
        }

        println!("Total held: {}", format_bytes(intake.total_bytes()));
        Ok(())
    }

    pub async fn run_shorten(&self, urls: Vec<String>) -> Result<(), ToolError> {
        let shortener = Arc::new(SimulatedUrlShortener::new(self.config.simulation.clone()));
        let start = Instant::now();

        let tasks = urls.into_iter().map(|url| {
            let shortener = shortener.clone();
            SimulatedTask::spawn(async move { shortener.shorten(&url).await }).wait()
        });

        let mut failed = 0;
        for result in join_all(tasks).await {
            match result {
                Ok(link) => println!("{} -> {}", link.original, link.short),
                Err(e) => {
                    failed += 1;
                    warn!("Shortening failed: {}", e);
                    self.notifier.notify(e.notice());
                }
            }
        }

        let elapsed = start.elapsed();
        self.metrics.record_simulated(elapsed);
        info!("Shortening finished in {}", format_duration(elapsed));

        if failed > 0 {
            return Err(ToolError::InvalidUrl(format!("{failed} URL(s) could not be shortened")));
        }
        Ok(())
    }

    pub async fn run_video(&self, url: &str) -> Result<(), ToolError> {
        let downloader = SimulatedVideoDownloader::new(self.config.simulation.clone());
        let url = url.to_string();
        let start = Instant::now();

        let info = SimulatedTask::spawn(async move { downloader.lookup(&url).await })
            .wait()
            .await?;
        self.metrics.record_simulated(start.elapsed());

        println!("{}", info.title);
        println!("Source: {}", info.source_url);
        for format in &info.formats {
            println!(
                "  {:<6} {:<4} ~{}",
                format.quality,
                format.container,
                format_bytes(format.approx_size)
            );
        }
        Ok(())
    }

    pub async fn run_convert(&self, input: PathBuf, to: &str, output: Option<PathBuf>) -> Result<(), ToolError> {
        let target: AudioFormat = to.parse()?;

        let mut intake = FileIntake::new(IntakeConfig {
            accept: vec!["audio/*".to_string(), "video/*".to_string()],
            max_size: self.config.intake.max_size,
            max_files: 1,
        });

        let outcome = intake.accept(vec![CandidateFile::from_path(&input).await?]);
        if let Some(rejection) = outcome.rejected.into_iter().next() {
            return Err(rejection.into());
        }
        let Some(file) = intake.remove(0) else {
            return Err(ToolError::IoError(format!("{} was not read", input.display())));
        };

        let converter = SimulatedAudioConverter::new(self.config.simulation.clone());
        let start = Instant::now();
        let converted = SimulatedTask::spawn(async move { converter.convert(file, target).await })
            .wait()
            .await?;
        self.metrics.record_simulated(start.elapsed());

        let dir = output
            .or_else(|| input.parent().map(|p| p.to_path_buf()))
            .unwrap_or_default();
        fs::create_dir_all(&dir).await?;
        let path = dir.join(crate::sanitize_filename(&converted.file_name));
        fs::write(&path, &converted.bytes).await?;

        self.notifier.notify(Notice::success(
            "Conversion complete",
            format!("Saved {} as {}", path.display(), converted.format),
        ));
        println!("{}", path.display());
        Ok(())
    }

    pub async fn validate_config(&self, config_path: PathBuf) -> Result<(), ToolError> {
        println!("Validating configuration: {}", config_path.display());

        let config_content = fs::read_to_string(&config_path).await?;
        let config = Config::from_json(&config_content)?;

        println!("Configuration is valid:");
        println!("  Accepted types: {}", config.intake.accept.join(", "));
        println!("  Max file size: {}", format_bytes(config.intake.max_size));
        println!("  Max files: {}", config.intake.max_files);
        println!("  Default password length: {}", config.password.length);
        println!("  Short URL base: {}", config.simulation.short_url_base);
        println!("  Record audio: {}", config.recorder.include_audio);

        Ok(())
    }
}

pub fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
