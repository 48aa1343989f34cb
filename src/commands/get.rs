use anyhow::Result;
use serde_json::Value;

use crate::{
    identifier::AppSpec,
    session::{extract_result, Session},
    transport::{Field, Transport},
};

/// Fetch the full attribute set of an app version and print it as JSON
pub async fn run<T: Transport>(session: &mut Session<T>, app: &AppSpec) -> Result<Value> {
    tracing::debug!("Calling get");
    session.use_server_of(app);
    let found = session.find_app(app).await?;
    let fields = Field::from_json_map(&found.to_fields());
    let attributes = extract_result(session.command("get", fields).await?)?;
    println!("{}", serde_json::to_string_pretty(&attributes)?);
    Ok(attributes)
}
