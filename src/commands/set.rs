use anyhow::Result;
use serde_json::{Map, Value};

use crate::{
    commands::CommandOutcome,
    error::SelfServiceError,
    identifier::AppSpec,
    session::{extract_result, Session},
    transport::{Field, Transport},
};

/// Parse CHANGES, which must be a JSON object
pub fn parse_changes(changes: &str) -> Result<Map<String, Value>, SelfServiceError> {
    match serde_json::from_str(changes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(SelfServiceError::InvalidChanges),
    }
}

pub async fn run<T: Transport>(
    session: &mut Session<T>,
    app: &AppSpec,
    changes: &str,
) -> Result<CommandOutcome> {
    tracing::debug!("Calling set");
    let mut changes = parse_changes(changes)?;
    session.use_server_of(app);
    let found = session.find_app(app).await?;
    changes.insert("component_id".into(), Value::String(found.component_id));
    changes.insert("ucs_version".into(), Value::String(found.ucs_version));

    extract_result(session.command("save", Field::from_json_map(&changes)).await?)?;
    println!("Finished setting new value");
    Ok(CommandOutcome::Success)
}
