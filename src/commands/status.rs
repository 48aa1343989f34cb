use anyhow::Result;

use crate::{
    app::AppVersion, commands::CommandOutcome, identifier::AppSpec, session::Session,
    transport::Transport,
};

pub async fn run<T: Transport>(session: &mut Session<T>, app: &AppSpec) -> Result<CommandOutcome> {
    tracing::debug!("Calling status");
    session.use_server_of(app);
    let versions = session.find_all_app_versions(app).await?;
    print!("{}", format_status(&versions));
    Ok(CommandOutcome::Success)
}

pub fn format_status(versions: &[AppVersion]) -> String {
    let mut out = String::new();
    for version in versions {
        let status = if version.is_published() {
            "Published"
        } else {
            "Draft"
        };
        out.push('\n');
        out.push_str(&format!("{}\n", version.display_name()));
        out.push_str(&format!("   COMPONENT: {}\n", version.component_id));
        out.push_str(&format!("      STATUS: {status}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lists_each_version_with_status() {
        let versions: Vec<AppVersion> = serde_json::from_value(json!([
            {"id": "myapp", "version": "1.0", "ucs_version": "4.4", "component_id": "myapp_1", "in_appcenter": true},
            {"id": "myapp", "version": "1.1", "ucs_version": "5.0", "component_id": "myapp_2", "in_appcenter": false},
        ]))
        .unwrap();

        assert_eq!(
            format_status(&versions),
            "\n4.4/myapp=1.0\n   COMPONENT: myapp_1\n      STATUS: Published\n\
             \n5.0/myapp=1.1\n   COMPONENT: myapp_2\n      STATUS: Draft\n"
        );
    }
}
