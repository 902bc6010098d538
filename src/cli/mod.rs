use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::clients::gbx_parser::{ContainerParser, GbxParser, ParseMode};
use crate::core::content::ToolOutput;
use crate::core::data::RawBlob;
use crate::dispatch::archive::{ArchiveLimits, ArchiveWalker};
use crate::dispatch::sniff::{classify, Sniff};
use crate::dispatch::BatchResult;
use crate::infra::boot::build_dispatcher;
use crate::infra::config::Config;
use crate::infra::runtime::cancel::cancel_pair;
use crate::tools::file_name;

#[derive(Parser)]
#[command(name = "gbx-io")]
#[command(about = "Route files and zip archives of Gbx files to processing tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered tools
    List,
    /// Run a tool over a file
    Run {
        /// Tool key, see `list`
        tool: String,
        /// Input file (a Gbx file, a zip archive or anything the tool accepts)
        input: PathBuf,
        /// Output directory, overrides GBXIO_OUTPUT_DIR
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Classify a file and list the Gbx entries of an archive
    Sniff {
        input: PathBuf,
    },
    /// Show or validate configuration
    Config {
        /// Fail on invalid configuration instead of falling back to defaults
        #[arg(long)]
        validate: bool,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::List => {
            list_tools(&Config::from_env());
            ExitCode::SUCCESS
        }
        Commands::Run { tool, input, out } => {
            let cfg = Config::from_env();
            let out = out.unwrap_or_else(|| cfg.output_dir.clone());
            match run_tool(&cfg, &tool, &input, &out).await {
                Ok(written) => {
                    for path in &written {
                        println!("{}", path.display());
                    }
                    println!("✅ {tool}: {} output(s) written to {}", written.len(), out.display());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("❌ {tool} failed: {e:#}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Sniff { input } => match sniff_file(&Config::from_env(), &input).await {
            Ok(report) => {
                print!("{report}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Sniff failed: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate } => match load_config(validate) {
            Ok(cfg) => {
                if validate {
                    println!("✅ Configuration is valid");
                }
                match toml::to_string_pretty(&cfg) {
                    Ok(text) => print!("{text}"),
                    Err(e) => eprintln!("❌ Failed to render configuration: {e}"),
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn list_tools(cfg: &Config) {
    let dispatcher = build_dispatcher(cfg);
    for meta in dispatcher.registry().list() {
        println!("{:<20} {:<40} {}", meta.key, meta.capability.to_string(), meta.description);
    }
}

fn load_config(validate: bool) -> Result<Config, crate::infra::config::ConfigError> {
    if validate {
        Config::try_from_env()
    } else {
        Ok(Config::from_env())
    }
}

async fn run_tool(
    cfg: &Config,
    tool: &str,
    input: &Path,
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let dispatcher = build_dispatcher(cfg);
    if !dispatcher.registry().contains(tool) {
        anyhow::bail!("unknown tool {tool:?}, see `gbx-io list`");
    }
    let data = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    let (handle, signal) = cancel_pair();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling batch");
            handle.cancel();
        }
    });
    let result = dispatcher
        .process(tool, RawBlob::new(name, data), &signal)
        .await;
    ctrl_c.abort();

    write_outputs(result?, out_dir).await
}

/// Writes each output under `dir` using only its file-name component.
async fn write_outputs(batch: BatchResult, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(batch.len());
    for (i, output) in batch.into_iter().enumerate() {
        let base = output_file_name(&output, i);
        let mut file = base.clone();
        let mut n = i;
        while !used.insert(file.clone()) {
            file = format!("{n}-{base}");
            n += 1;
        }
        let path = dir.join(&file);
        tokio::fs::write(&path, output.bytes())
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn output_file_name(output: &ToolOutput, index: usize) -> String {
    match file_name(output.name()) {
        Some(name) if name != "." && name != ".." => name.to_owned(),
        _ => format!("output-{index}.{}", output.default_extension()),
    }
}

async fn sniff_file(cfg: &Config, input: &Path) -> anyhow::Result<String> {
    use std::fmt::Write as _;

    let data = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let sniff = classify(&data);
    let mut report = format!("{}: {sniff}\n", input.display());

    match sniff {
        Sniff::NotAContainer => {}
        Sniff::Container => {
            let name = input.to_string_lossy();
            match GbxParser.parse(Some(name.as_ref()), &data, ParseMode::HeaderOnly).await {
                Ok(Some(gbx)) => {
                    let class = gbx.class_id();
                    let _ = writeln!(
                        report,
                        "  class {class} ({}), version {}",
                        class.name().unwrap_or("unknown"),
                        gbx.header().version
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = writeln!(report, "  unreadable header: {e}");
                }
            }
        }
        Sniff::AmbiguousArchive => {
            let limits = ArchiveLimits {
                max_entry_bytes: cfg.max_entry_bytes,
            };
            match ArchiveWalker::open(&data, limits) {
                None => report.push_str("  not a readable archive\n"),
                Some(mut walker) => {
                    let total = walker.len();
                    let mut valid = 0;
                    while let Some(entry) = walker.next_entry() {
                        valid += 1;
                        let _ = writeln!(report, "  {} ({} bytes)", entry.name, entry.data.len());
                    }
                    let _ = writeln!(report, "  {valid} of {total} entries are Gbx files");
                }
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::TextBlob;
    use crate::domain::ClassId;
    use crate::test_support::{zip_bytes, GbxBuilder};
    use serial_test::serial;

    #[test]
    fn output_names_are_confined_to_the_output_dir() {
        let escaping: ToolOutput = RawBlob::named("../../etc/passwd", vec![]).into();
        assert_eq!(output_file_name(&escaping, 0), "passwd");
        let dots: ToolOutput = RawBlob::named("..", vec![]).into();
        assert_eq!(output_file_name(&dots, 3), "output-3.bin");
        let unnamed: ToolOutput = TextBlob::new(None, "{}".into(), TextBlob::JSON).into();
        assert_eq!(output_file_name(&unnamed, 1), "output-1.json");
    }

    #[tokio::test]
    async fn duplicate_names_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let batch = BatchResult::from(vec![
            ToolOutput::from(RawBlob::named("a/x.Gbx", b"1".to_vec())),
            ToolOutput::from(RawBlob::named("b/x.Gbx", b"2".to_vec())),
        ]);
        let written = write_outputs(batch, dir.path()).await.unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read(dir.path().join("x.Gbx")).unwrap(), b"1");
        assert_eq!(std::fs::read(dir.path().join("1-x.Gbx")).unwrap(), b"2");
    }

    #[tokio::test]
    async fn renamed_duplicate_never_replaces_an_earlier_output() {
        let dir = tempfile::tempdir().unwrap();
        let batch = BatchResult::from(vec![
            ToolOutput::from(RawBlob::named("a/x.Gbx", b"first".to_vec())),
            ToolOutput::from(RawBlob::named("2-x.Gbx", b"second".to_vec())),
            ToolOutput::from(RawBlob::named("b/x.Gbx", b"third".to_vec())),
        ]);
        let written = write_outputs(batch, dir.path()).await.unwrap();
        let unique: HashSet<_> = written.iter().collect();
        assert_eq!(unique.len(), 3);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
        assert_eq!(std::fs::read(dir.path().join("2-x.Gbx")).unwrap(), b"second");
        assert_eq!(std::fs::read(dir.path().join("3-x.Gbx")).unwrap(), b"third");
    }

    #[tokio::test]
    #[serial]
    async fn run_extracts_archive_entries() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pack.zip");
        let map = GbxBuilder::new(ClassId::MAP).build();
        std::fs::write(&input, zip_bytes(&[("maps/A01.Map.Gbx", map.as_slice()), ("readme.txt", b"hi there")]))
            .unwrap();
        let out = dir.path().join("out");

        let written = run_tool(&Config::default(), "extract-gbx", &input, &out)
            .await
            .unwrap();
        assert_eq!(written, vec![out.join("A01.Map.Gbx")]);
        assert_eq!(std::fs::read(&written[0]).unwrap(), map);
    }

    #[tokio::test]
    async fn run_rejects_unknown_tool() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_tool(&Config::default(), "nope", dir.path(), dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown tool"));
    }

    #[tokio::test]
    async fn sniff_lists_archive_entries() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pack.zip");
        std::fs::write(&input, zip_bytes(&[("a.ext", b"abcd"), ("b.ext", b"GBX\x06body")])).unwrap();
        let report = sniff_file(&Config::default(), &input).await.unwrap();
        assert!(report.contains("ambiguous-archive"));
        assert!(report.contains("b.ext (8 bytes)"));
        assert!(report.contains("1 of 2 entries"));
    }

    #[tokio::test]
    async fn sniff_reports_container_class() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("r.Replay.Gbx");
        std::fs::write(&input, GbxBuilder::new(ClassId::REPLAY).build()).unwrap();
        let report = sniff_file(&Config::default(), &input).await.unwrap();
        assert!(report.contains(": container"));
        assert!(report.contains("class 03093000 (CGameCtnReplayRecord), version 6"));
    }

    #[test]
    #[serial]
    fn validate_reports_bad_env() {
        std::env::set_var("GBXIO_MAX_ENTRY_BYTES", "-1");
        assert!(load_config(true).is_err());
        assert!(load_config(false).is_ok());
        std::env::remove_var("GBXIO_MAX_ENTRY_BYTES");
    }
}
