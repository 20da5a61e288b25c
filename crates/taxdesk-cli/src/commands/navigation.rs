//! `open` and `shell`: drive the navigation store through the route guard.

use std::io::{self, BufRead, Write};

use taxdesk_core::navigation::{ClickEvent, Link, NavigationStore};
use taxdesk_core::routes::{Resolved, Route, Router, NAV_ITEMS};

use crate::app::AppContext;
use crate::cli::OpenArgs;
use crate::ui::theme::{styled, styles};
use crate::ui::{badge, print, print_json, Badge, UiContext};

/// First page shown by `shell`.
const SHELL_START: &str = "/dashboard";

pub fn handle_open(ctx: &AppContext, args: &OpenArgs) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let nav = NavigationStore::in_memory(&args.path);
    let resolved = Router::resolve(&nav, ws.auth().state());

    let ui_ctx = ctx.ui_context();
    show_resolution(&ui_ctx, &nav, &resolved)
}

pub fn handle_shell(ctx: &AppContext) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let auth = ws.auth().state().clone();
    let ui_ctx = ctx.ui_context();
    let interactive = ui_ctx.is_interactive();

    let nav = NavigationStore::in_memory(SHELL_START);
    let location = nav.use_location();
    show_resolution(&ui_ctx, &nav, &Router::resolve(&nav, &auth))?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive && !ui_ctx.mode.is_json() {
            let prompt = format!("taxdesk:{}> ", location.pathname());
            print!("{}", styled(&prompt, styles::dim(), ui_ctx.color));
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let rest: Vec<&str> = parts.collect();

        match command {
            "quit" | "exit" | "q" => break,
            "help" | "?" => print_shell_help(&ui_ctx),
            "where" | "pwd" => {
                let path = location.pathname();
                show_page(&ui_ctx, &path, Route::from_path(&path), None)?;
            }
            "go" | "cd" => match rest.first() {
                Some(path) => {
                    nav.navigate(path);
                    show_resolution(&ui_ctx, &nav, &Router::resolve(&nav, &auth))?;
                }
                None => shell_error(&ui_ctx, "Usage: go <path>"),
            },
            "follow" => {
                let name = rest.join(" ");
                match find_nav_item(&name) {
                    Some(href) => {
                        let mut event = ClickEvent::new();
                        Link::new(href).activate(&nav, &mut event);
                        show_resolution(&ui_ctx, &nav, &Router::resolve(&nav, &auth))?;
                    }
                    None => shell_error(&ui_ctx, &format!("No sidebar link named \"{}\"", name)),
                }
            }
            "back" => {
                if nav.back() {
                    show_resolution(&ui_ctx, &nav, &Router::resolve(&nav, &auth))?;
                } else {
                    shell_error(&ui_ctx, "Already at the first page");
                }
            }
            "forward" => {
                if nav.forward() {
                    show_resolution(&ui_ctx, &nav, &Router::resolve(&nav, &auth))?;
                } else {
                    shell_error(&ui_ctx, "Already at the last page");
                }
            }
            "links" => print_links(&ui_ctx, &location.pathname()),
            other => shell_error(
                &ui_ctx,
                &format!("Unknown command \"{}\" (type `help`)", other),
            ),
        }
    }
    Ok(())
}

fn find_nav_item(name: &str) -> Option<&'static str> {
    let wanted = name.trim().to_lowercase();
    NAV_ITEMS
        .iter()
        .find(|item| item.name.to_lowercase() == wanted)
        .map(|item| item.href)
}

fn show_resolution(ui_ctx: &UiContext, nav: &NavigationStore, resolved: &Resolved) -> anyhow::Result<()> {
    match resolved {
        Resolved::Loading => {
            if ui_ctx.mode.is_json() {
                print_json(&serde_json::json!({ "status": "loading" }))
            } else {
                print(ui_ctx, &badge(ui_ctx, Badge::Info, "Loading"));
                Ok(())
            }
        }
        Resolved::Page {
            route,
            redirected_from,
        } => show_page(ui_ctx, &nav.current_path(), *route, redirected_from.as_deref()),
    }
}

fn show_page(
    ui_ctx: &UiContext,
    path: &str,
    route: Route,
    redirected_from: Option<&str>,
) -> anyhow::Result<()> {
    if ui_ctx.mode.is_json() {
        return print_json(&serde_json::json!({
            "path": path,
            "route": route.title(),
            "redirected_from": redirected_from,
        }));
    }
    if ui_ctx.mode.is_pretty() {
        let title = styled(route.title(), styles::bold(), ui_ctx.color);
        let path_styled = styled(path, styles::dim(), ui_ctx.color);
        match redirected_from {
            Some(from) => println!("{}  {}  (redirected from {})", title, path_styled, from),
            None => println!("{}  {}", title, path_styled),
        }
    } else {
        println!("path={}", path);
        println!("route={}", route.title());
        if let Some(from) = redirected_from {
            println!("redirected_from={}", from);
        }
    }
    Ok(())
}

fn print_links(ui_ctx: &UiContext, pathname: &str) {
    for item in NAV_ITEMS.iter() {
        let active = item.is_active(pathname);
        if ui_ctx.mode.is_pretty() {
            let marker = if active { "\u{25B8}" } else { " " };
            let name = if active {
                styled(item.name, styles::bold(), ui_ctx.color)
            } else {
                item.name.to_string()
            };
            let description = styled(item.description, styles::dim(), ui_ctx.color);
            println!("{} {:<14} {}", marker, name, description);
        } else {
            println!("{}\t{}\t{}", item.name, item.path(), if active { "active" } else { "" });
        }
    }
}

fn print_shell_help(ui_ctx: &UiContext) {
    let lines = [
        "go <path>       navigate to a path",
        "follow <name>   click a sidebar link (e.g. follow Payments)",
        "back, forward   move through history",
        "where           show the current page",
        "links           list sidebar links",
        "quit            leave the shell",
    ];
    for line in lines {
        print(ui_ctx, line);
    }
}

fn shell_error(ui_ctx: &UiContext, message: &str) {
    if ui_ctx.mode.is_json() {
        eprintln!("{}", serde_json::json!({ "error": message }));
    } else {
        eprintln!("{}", badge(ui_ctx, Badge::Warn, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_nav_item_is_case_insensitive() {
        assert_eq!(find_nav_item("payments"), Some("dashboard/payments"));
        assert_eq!(find_nav_item(" Activity Logs "), Some("dashboard/activity-logs"));
        assert_eq!(find_nav_item("Reports"), None);
    }
}
