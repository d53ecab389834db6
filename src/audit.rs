use serde_json::Value;

use crate::middleware::auth::AuthUser;

/// Records a state-changing action on the `audit` tracing target.
pub fn log_audit(actor: Option<&AuthUser>, action: &str, resource: &str, metadata: Value) {
    match actor {
        Some(user) => tracing::info!(
            target: "audit",
            user_id = %user.user_id,
            username = %user.username,
            role = %user.role,
            action,
            resource,
            %metadata,
            "action recorded"
        ),
        None => tracing::info!(target: "audit", action, resource, %metadata, "action recorded"),
    }
}
