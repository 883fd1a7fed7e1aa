use std::path::Path;

use anyhow::Context;
use colored::Colorize;

use testtree_registry::FactoryConfig;
use testtree_store::ElementStore;

use crate::cli::*;
use crate::manifest::Manifest;
use crate::render::render_tree;
use crate::session::Session;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Discover(args) => cmd_discover(args, config),
        Command::Rescan(args) => cmd_rescan(args, config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FactoryConfig> {
    let Some(path) = path else {
        return Ok(FactoryConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn cmd_discover(args: DiscoverArgs, config: FactoryConfig) -> anyhow::Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let session = Session::new(&manifest.target, config)?;
    let report = session.run_pass(&manifest)?;

    print!("{}", render_tree(session.store())?);
    println!(
        "{} {} elements discovered for {}",
        "✓".green().bold(),
        report.elements.len().to_string().bold(),
        manifest.target.yellow(),
    );
    Ok(())
}

fn cmd_rescan(args: RescanArgs, config: FactoryConfig) -> anyhow::Result<()> {
    let before = Manifest::load(&args.before)?;
    let after = Manifest::load(&args.after)?;
    let session = Session::new(&before.target, config)?;

    let first = session.run_pass(&before)?;
    session.invalidate_all()?;
    let second = session.run_pass(&after)?;

    let reused = second
        .elements
        .keys()
        .filter(|id| first.elements.contains_key(*id))
        .count();
    let created = second.elements.len() - reused;
    println!("{} pass 2: {} reused, {} new", "✓".green().bold(), reused, created);

    for id in first.elements.keys().filter(|id| !second.elements.contains_key(*id)) {
        if session.store().contains(id)? {
            println!("  {} {}", "stale:".dimmed(), id);
        } else {
            println!("  {} {}", "pruned:".red(), id);
        }
    }
    for id in &second.categories_changed {
        println!("  {} {}", "re-tagged:".cyan(), id);
    }

    if !args.no_tree {
        println!();
        print!("{}", render_tree(session.store())?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use testtree_registry::KindMismatchPolicy;

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), FactoryConfig::default());
    }

    #[test]
    fn config_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "on_kind_mismatch = \"reject\"").unwrap();
        writeln!(file, "prune_invalid_children = false").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.on_kind_mismatch, KindMismatchPolicy::Reject);
        assert!(!config.prune_invalid_children);
    }

    #[test]
    fn bad_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "on_kind_mismatch = \"explode\"").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }
}
