use std::path::PathBuf;

use crate::cli::commands::InitArgs;
use crate::io::workspace_io;

/// Infer a workspace name from a directory name: hyphens and underscores
/// become spaces, words are title-cased.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn cmd_init(args: InitArgs, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match dir {
        Some(d) => PathBuf::from(d),
        None => std::env::current_dir()?,
    };

    // Nested workspaces are allowed, but worth pointing out
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: enclosing workspace found at {}/",
            parent_root.join(workspace_io::SHELF_DIR).display()
        );
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Shelf".to_string())
    });

    let shelf_dir = workspace_io::init_workspace(&root, &name, args.force)?;
    tracing::info!(shelf_dir = %shelf_dir.display(), "initialized workspace");

    println!("Initialized shelf workspace: {}", name);
    println!("  {}", shelf_dir.display());
    Ok(())
}
