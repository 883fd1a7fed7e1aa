//! Plain-text rendering of the stored tree.

use std::fmt::Write;

use colored::Colorize;

use testtree_store::{ElementKind, ElementRef, ElementStore, InMemoryElementStore};

/// Render every root in `store` and its descendants, one element per line.
pub fn render_tree(store: &InMemoryElementStore) -> anyhow::Result<String> {
    let mut out = String::new();
    for root in store.roots()? {
        render_element(store, &root, 0, &mut out)?;
    }
    Ok(out)
}

fn render_element(
    store: &InMemoryElementStore,
    element: &ElementRef,
    depth: usize,
    out: &mut String,
) -> anyhow::Result<()> {
    let marker = match element.kind() {
        ElementKind::Suite => "■",
        ElementKind::Grouping => "◆",
        ElementKind::GroupingCase | ElementKind::SuiteCase => "•",
    };
    let mut line = format!("{}{} {}", "  ".repeat(depth), marker, element.display_name());

    let categories = element.own_categories();
    if !categories.is_empty() {
        write!(line, " [{}]", categories.to_string().cyan())?;
    }
    if element.effective_ignored() {
        write!(line, " {}", "(ignored)".yellow())?;
    }
    if element.state().is_invalid() {
        write!(line, " {}", "(stale)".dimmed())?;
    }
    writeln!(out, "{line}")?;

    for child in store.children_of(element.id())? {
        render_element(store, &child, depth + 1, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use crate::session::Session;
    use testtree_registry::FactoryConfig;

    const MANIFEST: &str = r#"
project = "Sample.Tests"
target = "net8.0"

[[assembly]]
path = "bin/Sample.Tests.dll"

[[assembly.suite]]
type = "Sample.When_adding"
subject = "Calculator"
tags = ["slow"]
cases = ["should_add_numbers", { name = "should_overflow", ignored = true }]
"#;

    #[test]
    fn renders_nested_tree() {
        colored::control::set_override(false);
        let session = Session::new("net8.0", FactoryConfig::default()).unwrap();
        session.run_pass(&Manifest::parse(MANIFEST).unwrap()).unwrap();

        let text = render_tree(session.store()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "■ Calculator, When_adding [slow]");
        assert_eq!(lines[1], "  • should add numbers [slow]");
        assert_eq!(lines[2], "  • should overflow [slow] (ignored)");
    }

    #[test]
    fn empty_store_renders_nothing() {
        let store = InMemoryElementStore::new();
        assert!(render_tree(&store).unwrap().is_empty());
    }
}
