mod init;
pub use init::cmd_init;

use std::collections::BTreeSet;
use std::error::Error;

use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::local_backend::{ConfigPermissions, LocalLibrary};
use crate::io::session_store::{FileSessionStore, PersistedCtx, SearchPolicy, load_ctx, save_ctx};
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::workspace_io::{self, save_catalog};
use crate::model::catalog::Workspace;
use crate::model::item::Item;
use crate::model::tag::{Tag, TagType};
use crate::model::tree::TreeNode;
use crate::ops::aggregate::{collect_descendant_tags, count_node, direct_items, get_children};
use crate::ops::browse::{BrowseCache, BrowseError, browse_folder};
use crate::ops::library_ops::{BulkSummary, LibraryError, delete_folder, remove_selected, share_selected};
use crate::ops::search::{compile_query, item_matches, recompute_expanded};
use crate::ops::tree_ops::{build_tree_for, find_node};

type CmdResult = Result<(), Box<dyn Error>>;

/// Directory for per-session chat memory, inside `.shelf/`
const SESSIONS_DIR: &str = "sessions";

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let dir = cli.dir.as_deref();

    match cli.command {
        // Init runs before workspace discovery
        Commands::Init(args) => cmd_init(args, dir),

        // Read commands
        Commands::Tree(args) => cmd_tree(args, dir, json),
        Commands::Ls(args) => cmd_ls(args, dir, json),
        Commands::Count(args) => cmd_count(args, dir, json),
        Commands::Browse(args) => cmd_browse(args, dir, json),
        Commands::Selection => cmd_selection(dir, json),

        // View state
        Commands::Expand(args) => cmd_expand(args, dir, true),
        Commands::Collapse(args) => cmd_expand(args, dir, false),
        Commands::Select(args) => cmd_select(args, dir),
        Commands::SelectFolder(args) => cmd_select_folder(args, dir, json),
        Commands::Clear => cmd_clear(dir),

        // Library mutations
        Commands::Remove => cmd_remove(dir, json),
        Commands::Share(args) => cmd_share(args, dir, json),
        Commands::RmFolder(args) => cmd_rm_folder(args, dir, json),

        Commands::Context(cmd) => match cmd.action {
            ContextAction::Show { session } => cmd_context_show(&session, dir, json),
            ContextAction::Set(args) => cmd_context_set(args, dir, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Find and load the workspace plus its saved view state. Selection
/// entries pointing at items or tags that no longer exist are dropped.
fn open_workspace(dir: Option<&str>) -> Result<(Workspace, UiState), Box<dyn Error>> {
    let start = match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir()?,
    };
    let root = workspace_io::discover_workspace(&start)?;
    let ws = workspace_io::load_workspace(&root)?;

    let mut state = read_ui_state(&ws.shelf_dir);
    let before = state.selection.len();
    state.selection.retain_known(&ws.catalog.items, &ws.catalog.tags);
    if state.selection.len() != before {
        tracing::info!(dropped = before - state.selection.len(), "pruned stale selection");
    }
    Ok((ws, state))
}

fn save_state(ws: &Workspace, state: &UiState) -> CmdResult {
    write_ui_state(&ws.shelf_dir, state)?;
    Ok(())
}

/// `--type` if given, else the configured default
fn library_type(ws: &Workspace, lib: &LibArgs) -> Result<TagType, Box<dyn Error>> {
    match lib.lib_type.as_deref() {
        Some(s) => TagType::parse_type(s).ok_or_else(|| {
            format!(
                "unknown library type \"{}\" (expected document, prompt, profile or chat_context)",
                s
            )
            .into()
        }),
        None => Ok(ws.config.ui.default_type),
    }
}

fn require_node<'a>(root: &'a TreeNode, path: &str) -> Result<&'a TreeNode, Box<dyn Error>> {
    find_node(root, path).ok_or_else(|| format!("no folder \"{}\"", path.trim_matches('/')).into())
}

/// The folder's name for messages; the root has none
fn folder_label(node: &TreeNode) -> &str {
    if node.is_root() { "(all)" } else { &node.full }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_tree(args: TreeArgs, dir: Option<&str>, json: bool) -> CmdResult {
    let (ws, mut state) = open_workspace(dir)?;
    let ty = library_type(&ws, &args.lib)?;
    let root = build_tree_for(&ws.catalog.tags, ty);
    let items = ws.catalog.items.as_slice();

    // An explicit --search replaces the saved one; "" ends it
    let pattern = match args.search.as_deref().map(str::trim) {
        Some("") => None,
        Some(q) => Some(q.to_string()),
        None => state.library(ty).last_search,
    };
    let query = match pattern.as_deref() {
        Some(q) => match compile_query(q) {
            Ok(re) => Some(re),
            Err(e) if args.search.is_some() => {
                return Err(format!("invalid search pattern: {}", e).into());
            }
            Err(e) => {
                tracing::warn!(pattern = q, error = %e, "ignoring saved search");
                None
            }
        },
        None => None,
    };

    let lib_state = state.library_mut(ty);
    let expanded = recompute_expanded(&lib_state.expanded, &root, items, query.as_ref());
    let last_search = query.as_ref().and(pattern);
    let dirty = expanded != lib_state.expanded || last_search != lib_state.last_search;
    lib_state.expanded = expanded.clone();
    lib_state.last_search = last_search;
    if dirty {
        save_state(&ws, &state)?;
    }

    if json {
        let folders: Vec<FolderJson> = get_children(&root)
            .into_iter()
            .map(|c| folder_to_json(c, items, &state.selection, Some(&expanded)))
            .collect();
        return print_json(&folders);
    }

    if root.children.is_empty() {
        println!("no folders in the {} library", ty);
        return Ok(());
    }

    let is_match = |item: &Item| query.as_ref().is_some_and(|re| item_matches(item, re));
    let view = TreeView {
        items,
        selection: &state.selection,
        expanded: &expanded,
        show_all: args.all,
        is_match: query.as_ref().map(|_| &is_match as &dyn Fn(&Item) -> bool),
        max_width: ws.config.ui.max_name_width,
    };
    print_lines(&format_tree(&root, &view));
    Ok(())
}

fn cmd_ls(args: PathArgs, dir: Option<&str>, json: bool) -> CmdResult {
    let (ws, state) = open_workspace(dir)?;
    let ty = library_type(&ws, &args.lib)?;
    let root = build_tree_for(&ws.catalog.tags, ty);
    let node = require_node(&root, &args.path)?;
    let items = ws.catalog.items.as_slice();
    let here = direct_items(node, items);

    if json {
        return print_json(&ListingJson {
            folder: node.full.clone(),
            folders: get_children(node)
                .into_iter()
                .map(|c| folder_summary_json(c, items, &state.selection))
                .collect(),
            items: here
                .iter()
                .map(|i| item_to_json(i, selected_here(node, i, &state.selection)))
                .collect(),
        });
    }

    let closed = BTreeSet::new();
    let view = TreeView {
        items,
        selection: &state.selection,
        expanded: &closed,
        show_all: false,
        is_match: None,
        max_width: ws.config.ui.max_name_width,
    };
    let mut lines: Vec<String> = get_children(node)
        .into_iter()
        .map(|c| format_folder_line(c, &view, 0))
        .collect();
    for item in &here {
        lines.push(format_item_line(
            item,
            selected_here(node, item, &state.selection),
            false,
            0,
            view.max_width,
        ));
    }
    if lines.is_empty() {
        println!("{} is empty", folder_label(node));
    } else {
        print_lines(&lines);
    }
    Ok(())
}

fn cmd_count(args: PathArgs, dir: Option<&str>, json: bool) -> CmdResult {
    let (ws, _) = open_workspace(dir)?;
    let ty = library_type(&ws, &args.lib)?;
    let root = build_tree_for(&ws.catalog.tags, ty);
    let node = require_node(&root, &args.path)?;
    let count = count_node(node);

    if json {
        print_json(&count)
    } else {
        println!("{}: {}", folder_label(node), count.total);
        Ok(())
    }
}

fn cmd_browse(args: BrowseArgs, dir: Option<&str>, json: bool) -> CmdResult {
    let (mut ws, state) = open_workspace(dir)?;
    let ty = library_type(&ws, &args.lib)?;
    let root = build_tree_for(&ws.catalog.tags, ty);
    let node = require_node(&root, &args.path)?;
    let limit = args.limit.unwrap_or(ws.config.browse.page_size);
    if limit == 0 {
        return Err(BrowseError::ZeroPageSize.into());
    }
    let max_width = ws.config.ui.max_name_width;
    let source = LocalLibrary::new(&mut ws.catalog);

    let (items, total) = if args.subtree {
        let mut items: Vec<Item> = Vec::new();
        let mut total;
        let mut pages = 0;
        loop {
            let page = browse_folder(&source, node, items.len(), limit)?;
            total = page.total;
            pages += 1;
            let added = page.items.len();
            items.extend(page.items);
            if added == 0 || items.len() >= total || (!args.all && pages >= args.pages) {
                break;
            }
        }
        (items, total)
    } else {
        let tag = node.primary_tag().ok_or_else(|| {
            format!(
                "{} has no tag of its own; use --subtree to browse what is below it",
                folder_label(node)
            )
        })?;
        let mut cache = BrowseCache::new();
        if args.all {
            cache.load_all(&source, &tag.id, limit)?;
        } else {
            for _ in 0..args.pages.max(1) {
                if cache.slot(&tag.id).is_some_and(|s| s.is_complete()) {
                    break;
                }
                cache.load_more(&source, &tag.id, limit)?;
            }
        }
        let total = cache.slot(&tag.id).and_then(|s| s.total).unwrap_or(0);
        (cache.items(&tag.id).to_vec(), total)
    };

    let in_scope: Vec<&Tag> = if args.subtree {
        collect_descendant_tags(node)
    } else {
        node.tags_here.iter().collect()
    };
    let selected = |item: &Item| {
        state
            .selection
            .tag_for(&item.id)
            .is_some_and(|t| in_scope.contains(&t))
    };

    if json {
        return print_json(&BrowseJson {
            folder: node.full.clone(),
            loaded: items.len(),
            total,
            items: items.iter().map(|i| item_to_json(i, selected(i))).collect(),
        });
    }

    for item in &items {
        println!("{}", format_item_line(item, selected(item), false, 0, max_width));
    }
    if items.len() < total {
        println!("showing {} of {} (--pages {} for more)", items.len(), total, args.pages + 1);
    } else {
        println!("{} item{}", total, if total == 1 { "" } else { "s" });
    }
    Ok(())
}

fn cmd_selection(dir: Option<&str>, json: bool) -> CmdResult {
    let (_, state) = open_workspace(dir)?;
    if json {
        let entries: Vec<SelectionEntryJson> = state
            .selection
            .entries()
            .map(|(item_id, tag)| SelectionEntryJson {
                item_id: item_id.to_string(),
                tag_id: tag.id.clone(),
                folder: tag_location(tag),
            })
            .collect();
        return print_json(&entries);
    }
    print_lines(&format_selection(&state.selection));
    Ok(())
}

// ---------------------------------------------------------------------------
// View state handlers
// ---------------------------------------------------------------------------

fn cmd_expand(args: PathArgs, dir: Option<&str>, open: bool) -> CmdResult {
    let (ws, mut state) = open_workspace(dir)?;
    let ty = library_type(&ws, &args.lib)?;
    let root = build_tree_for(&ws.catalog.tags, ty);
    let node = require_node(&root, &args.path)?;
    if node.is_root() {
        return Err("the root folder is always open".into());
    }

    let expanded = &mut state.library_mut(ty).expanded;
    let changed = if open {
        expanded.insert(node.full.clone())
    } else {
        expanded.remove(&node.full)
    };
    if changed {
        save_state(&ws, &state)?;
    }
    println!("{} {}", if open { "expanded" } else { "collapsed" }, node.full);
    Ok(())
}

fn cmd_select(args: SelectArgs, dir: Option<&str>) -> CmdResult {
    let (ws, mut state) = open_workspace(dir)?;
    let item = ws
        .catalog
        .item(&args.item)
        .ok_or_else(|| format!("no item \"{}\"", args.item))?;
    let tag = ws
        .catalog
        .tag(&args.tag)
        .ok_or_else(|| format!("no tag \"{}\"", args.tag))?;

    if !state.selection.toggle_item_checked(item, tag) {
        println!("{} is not in {}; nothing to do", item.id, tag_location(tag));
        return Ok(());
    }
    save_state(&ws, &state)?;

    let verb = if state.selection.tag_for(&item.id).is_some() {
        "selected"
    } else {
        "deselected"
    };
    println!("{} {} under {}", verb, item.id, tag_location(tag));
    Ok(())
}

fn cmd_select_folder(args: PathArgs, dir: Option<&str>, json: bool) -> CmdResult {
    let (ws, mut state) = open_workspace(dir)?;
    let ty = library_type(&ws, &args.lib)?;
    let root = build_tree_for(&ws.catalog.tags, ty);
    let node = require_node(&root, &args.path)?;
    let items = ws.catalog.items.as_slice();

    if node.primary_tag().is_none() {
        println!("{} has no tag of its own; nothing to select", folder_label(node));
        return Ok(());
    }
    state.selection.toggle_folder(node, items);
    save_state(&ws, &state)?;

    if json {
        return print_json(&folder_summary_json(node, items, &state.selection));
    }
    let (selected, total) = state.selection.folder_counts(node, items);
    println!(
        "{} {} ({}/{} selected)",
        state.selection.folder_state(node, items).marker(),
        node.full,
        selected,
        total
    );
    Ok(())
}

fn cmd_clear(dir: Option<&str>) -> CmdResult {
    let (ws, mut state) = open_workspace(dir)?;
    let n = state.selection.len();
    state.selection.clear();
    save_state(&ws, &state)?;
    println!("cleared {} selected item{}", n, if n == 1 { "" } else { "s" });
    Ok(())
}

// ---------------------------------------------------------------------------
// Library mutation handlers
// ---------------------------------------------------------------------------

/// Persist whatever a bulk call changed, then report. Partial progress is
/// saved too, so the next attempt only redoes what failed.
fn finish_bulk(
    ws: &Workspace,
    state: &UiState,
    action: &str,
    result: Result<BulkSummary, LibraryError>,
    json: bool,
) -> CmdResult {
    save_catalog(&ws.shelf_dir, &ws.catalog)?;
    save_state(ws, state)?;

    match result {
        Ok(summary) => {
            if json {
                print_json(&BulkJson {
                    action,
                    summary: &summary,
                })
            } else {
                println!("{}", format_bulk(action, &summary));
                Ok(())
            }
        }
        Err(e) => Err(format_notice(&e.notice()).into()),
    }
}

fn cmd_remove(dir: Option<&str>, json: bool) -> CmdResult {
    let (mut ws, mut state) = open_workspace(dir)?;
    let perms = ConfigPermissions::new(&ws.config.permissions);
    let result = {
        let mut api = LocalLibrary::new(&mut ws.catalog);
        remove_selected(&mut api, &perms, &mut state.selection)
    };
    finish_bulk(&ws, &state, "removed", result, json)
}

fn cmd_share(args: ShareArgs, dir: Option<&str>, json: bool) -> CmdResult {
    let (mut ws, mut state) = open_workspace(dir)?;
    let target = ws
        .catalog
        .tag(&args.tag)
        .cloned()
        .ok_or_else(|| format!("no tag \"{}\"", args.tag))?;
    let perms = ConfigPermissions::new(&ws.config.permissions);
    let result = {
        let mut api = LocalLibrary::new(&mut ws.catalog);
        share_selected(&mut api, &perms, &mut state.selection, &target)
    };
    finish_bulk(&ws, &state, "shared", result, json)
}

fn cmd_rm_folder(args: PathArgs, dir: Option<&str>, json: bool) -> CmdResult {
    let (mut ws, mut state) = open_workspace(dir)?;
    let ty = library_type(&ws, &args.lib)?;
    let root = build_tree_for(&ws.catalog.tags, ty);
    let node = require_node(&root, &args.path)?;
    if node.is_root() {
        return Err("refusing to delete the whole library".into());
    }

    let perms = ConfigPermissions::new(&ws.config.permissions);
    let result = {
        let mut api = LocalLibrary::new(&mut ws.catalog);
        delete_folder(&mut api, &perms, node)
    };

    let prefix = format!("{}/", node.full);
    state
        .library_mut(ty)
        .expanded
        .retain(|f| f != &node.full && !f.starts_with(&prefix));
    state.selection.retain_known(&ws.catalog.items, &ws.catalog.tags);

    finish_bulk(&ws, &state, "deleted", result, json)
}

// ---------------------------------------------------------------------------
// Session memory handlers
// ---------------------------------------------------------------------------

fn session_store(ws: &Workspace) -> FileSessionStore {
    FileSessionStore::new(ws.shelf_dir.join(SESSIONS_DIR))
}

fn cmd_context_show(session: &str, dir: Option<&str>, json: bool) -> CmdResult {
    let (ws, _) = open_workspace(dir)?;
    let ctx = load_ctx(&session_store(&ws), session);

    if json {
        return print_json(&ctx);
    }
    match ctx {
        Some(ctx) => print_lines(&format_ctx(session, &ctx)),
        None => println!("session {} has no saved context", session),
    }
    Ok(())
}

fn cmd_context_set(args: ContextSetArgs, dir: Option<&str>, json: bool) -> CmdResult {
    let (ws, _) = open_workspace(dir)?;
    let store = session_store(&ws);
    let mut ctx: PersistedCtx = load_ctx(&store, &args.session).unwrap_or_default();

    if let Some(libraries) = args.libraries {
        for id in &libraries {
            if ws.catalog.tag(id).is_none() {
                tracing::warn!(tag_id = %id, "remembering a library that is not in the catalog");
            }
        }
        ctx.library_ids = libraries;
    }
    if let Some(prompts) = args.prompts {
        ctx.prompt_ids = prompts;
    }
    if let Some(templates) = args.templates {
        ctx.template_ids = templates;
    }
    if let Some(policy) = args.policy.as_deref() {
        ctx.search_policy = SearchPolicy::parse_policy(policy).ok_or_else(|| {
            format!(
                "unknown search policy \"{}\" (expected semantic, hybrid or text)",
                policy
            )
        })?;
    }

    save_ctx(&store, &args.session, &ctx);
    let saved = load_ctx(&store, &args.session).unwrap_or(ctx);

    if json {
        return print_json(&saved);
    }
    print_lines(&format_ctx(&args.session, &saved));
    Ok(())
}
