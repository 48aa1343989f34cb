use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::{commands::CommandOutcome, session::Session, transport::Transport};

pub async fn run<T: Transport>(session: &mut Session<T>, json: bool) -> Result<CommandOutcome> {
    tracing::debug!("Calling list");
    let apps = session.query().await?;
    if json {
        println!("{}", format_json(&apps)?);
    } else {
        print!("{}", format_text(&apps));
    }
    Ok(CommandOutcome::Success)
}

/// A record attribute as display text; absent and `null` render empty
fn attr(app: &Value, key: &str) -> String {
    match app.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Vendors in display order: case-insensitive, ties broken by the exact name
fn vendors(apps: &[Value]) -> Vec<String> {
    let unique: BTreeSet<String> = apps.iter().map(|app| attr(app, "vendor")).collect();
    let mut vendors: Vec<String> = unique.into_iter().collect();
    vendors.sort_by_key(|vendor| vendor.to_lowercase());
    vendors
}

fn apps_of<'a>(apps: &'a [Value], vendor: &'a str) -> impl Iterator<Item = &'a Value> {
    apps.iter().filter(move |app| attr(app, "vendor") == vendor)
}

/// Apps grouped by vendor, one `ucs/id=version` line each
pub fn format_text(apps: &[Value]) -> String {
    let mut out = String::new();
    for vendor in vendors(apps) {
        out.push('\n');
        out.push_str(&vendor);
        out.push('\n');
        for app in apps_of(apps, &vendor) {
            out.push_str(&format!(
                "  {}/{}={}\n",
                attr(app, "ucs_version"),
                attr(app, "id"),
                attr(app, "version")
            ));
        }
    }
    out
}

/// Pretty JSON object of vendor -> apps as the server sent them, minus logos
pub fn format_json(apps: &[Value]) -> Result<String> {
    let mut by_vendor = Map::new();
    for vendor in vendors(apps) {
        let entries = apps_of(apps, &vendor)
            .map(|app| {
                let mut app = app.clone();
                if let Value::Object(fields) = &mut app {
                    fields.remove("base64_logo");
                }
                app
            })
            .collect();
        by_vendor.insert(vendor, Value::Array(entries));
    }
    Ok(serde_json::to_string_pretty(&Value::Object(by_vendor))?)
}
