use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use spatia_base::ManipulationConfig;
use spatia_gesture::{ManipulationEvent, Manipulator};
use std::path::PathBuf;
use tracing::info;

mod scene_file;
mod script;

use scene_file::SceneDescription;
use script::Script;

#[derive(Parser)]
#[command(name = "spatia")]
#[command(about = "Spatia gesture manipulation core: scene replay tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Replay(ReplayArgs),
    Resolve(ResolveArgs),
}

#[derive(Args)]
struct ReplayArgs {
    #[arg(long)]
    scene: PathBuf,
    #[arg(long)]
    script: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    debug: bool,
}

#[derive(Args)]
struct ResolveArgs {
    #[arg(long)]
    scene: PathBuf,
    #[arg(long)]
    node: String,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Replay(args) => replay(args),
        Command::Resolve(args) => resolve(args),
    }
}

fn replay(args: ReplayArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ManipulationConfig::from_json_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ManipulationConfig::default(),
    };
    config.debug |= args.debug;

    let description = SceneDescription::from_file(&args.scene)?;
    let mut manipulator = description.build(config)?;
    let script = Script::from_file(&args.script)?;

    let mut printed = 0usize;
    script.replay(&mut manipulator, |events: &[ManipulationEvent]| {
        for event in events {
            println!("{}", serde_json::to_string(event)?);
            printed += 1;
        }
        Ok(())
    })?;

    info!(
        steps = script.len(),
        events = printed,
        path = %args.script.display(),
        "replay complete"
    );
    Ok(())
}

fn resolve(args: ResolveArgs) -> Result<()> {
    let description = SceneDescription::from_file(&args.scene)?;
    let manipulator = description.build(ManipulationConfig::default())?;
    println!("{}", resolution(&manipulator, &args.node)?);
    Ok(())
}

/// JSON for the tracked object owning node `name`, or a not-found line.
fn resolution(manipulator: &Manipulator, name: &str) -> Result<String> {
    let node = manipulator
        .scene()
        .find_by_name(name)
        .with_context(|| format!("no scene node named {name:?}"))?;

    Ok(match manipulator.resolve(node) {
        Some(object) => serde_json::to_string(object)?,
        None => format!("no tracked object under {name:?}"),
    })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "nodes": [
            { "name": "desk", "bounds": [1, 1, 1], "tracked": true },
            { "name": "desk-drawer", "parent": "desk" },
            { "name": "lamp" }
        ]
    }"#;

    fn manipulator() -> Result<Manipulator> {
        let description: SceneDescription = serde_json::from_str(SCENE)?;
        description.build(ManipulationConfig::default())
    }

    #[test]
    fn child_node_resolves_to_tracked_owner() -> Result<()> {
        let line = resolution(&manipulator()?, "desk-drawer")?;
        let object: serde_json::Value = serde_json::from_str(&line)?;
        assert_eq!(object["name"], "desk");
        Ok(())
    }

    #[test]
    fn untracked_node_reports_not_found() -> Result<()> {
        let line = resolution(&manipulator()?, "lamp")?;
        assert_eq!(line, r#"no tracked object under "lamp""#);
        Ok(())
    }

    #[test]
    fn unknown_node_name_is_an_error() -> Result<()> {
        assert!(resolution(&manipulator()?, "sofa").is_err());
        Ok(())
    }
}
