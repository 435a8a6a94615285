use anyhow::Result;
use changeset_bundle::{BundleBuilder, Config};
use clap::Parser;

/// Bundle every file git reports as modified, staged, or untracked into
/// `.codex/gemini/changed_files.zip` and print the archive path
/// (or `NO_CHANGES`).
#[derive(Debug, Parser)]
#[command(name = "changeset-bundle", version, about)]
struct Cli {}

fn main() -> Result<()> {
    let _cli = Cli::parse();

    // Logs go to stderr; stdout carries only the result line
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::load();
    let builder = BundleBuilder::new(&config.working_dir, config.git_source());
    let outcome = builder.build()?;

    println!("{outcome}");
    Ok(())
}
