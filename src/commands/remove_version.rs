use anyhow::Result;

use crate::{
    commands::CommandOutcome,
    identifier::AppSpec,
    session::{extract_result, Session},
    transport::{Field, Transport},
};

pub async fn run<T: Transport>(session: &mut Session<T>, app: &AppSpec) -> Result<CommandOutcome> {
    tracing::debug!("Calling remove-version");
    session.use_server_of(app);
    let found = session.find_app(app).await?;
    let fields = vec![
        Field::text("ucs_version", found.ucs_version.as_str()),
        Field::text("component_id", found.component_id.as_str()),
    ];
    extract_result(session.command("remove", fields).await?)?;
    println!("Removed {}/{}", found.id, found.ucs_version);
    Ok(CommandOutcome::Success)
}
