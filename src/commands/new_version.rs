use anyhow::Result;
use serde_json::Value;

use crate::{
    app::{AppRecord, AppVersion},
    identifier::AppSpec,
    session::{extract_result, Session},
    transport::{Field, Transport},
    version::next_app_version,
};

/// Target of a copy: which UCS version, and which app version if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub ucs_version: String,
    pub app_version: Option<String>,
}

/// Decide where a copy of `source` goes.
///
/// Staying on the same UCS version without naming a version bumps the
/// `ucs-N` suffix so the copy does not collide with its source.
pub fn copy_target(source: &AppVersion, new_app: Option<&AppSpec>) -> CopyTarget {
    let requested_ucs = new_app.and_then(|spec| spec.ucs_version.clone());
    let requested_version = new_app.and_then(|spec| spec.app_version.clone());

    let ucs_version = requested_ucs.unwrap_or_else(|| source.ucs_version.clone());
    let app_version = match requested_version {
        None if ucs_version == source.ucs_version => Some(next_app_version(&source.version)),
        other => other,
    };
    CopyTarget {
        ucs_version,
        app_version,
    }
}

pub async fn run<T: Transport>(
    session: &mut Session<T>,
    app: &AppSpec,
    new_app: Option<&AppSpec>,
    new_component: Option<&str>,
) -> Result<AppRecord> {
    tracing::debug!("Calling new-version");
    session.use_server_of(app);
    let source = session.find_app(app).await?;
    let target = copy_target(&source, new_app);

    let mut fields = vec![
        Field::text("ucs_version", source.ucs_version.as_str()),
        Field::text("component_id", source.component_id.as_str()),
        Field::text("new_ucs_version", target.ucs_version.as_str()),
    ];
    if let Some(version) = &target.app_version {
        fields.push(Field::text("new_app_version", version.as_str()));
    }
    if let Some(component) = new_component {
        fields.push(Field::text("new_component", component));
    }

    let result: Value = extract_result(session.command("copy", fields).await?)?;
    let created: AppRecord = serde_json::from_value(result)?;
    println!("New version for {}:", source.id);
    println!("  {}", created.display_name());
    Ok(created)
}
