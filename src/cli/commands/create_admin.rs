use crate::config::Config;
use crate::models::Role;
use crate::services::RegistrationRequest;
use crate::state::SharedState;

/// Bootstraps an admin. The HTTP registration routes need an admin session,
/// so the first one has to come from here.
pub async fn cmd_create_admin(
    config: Config,
    name: String,
    email: String,
    password: String,
    tag_id: String,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let registration = state
        .access
        .register(
            Role::Admin,
            RegistrationRequest {
                name,
                email: email.clone(),
                password,
                tag_id,
            },
        )
        .await?;

    println!("✓ Admin {email} created (id {})", registration.id);
    println!();
    println!("Enroll an authenticator app with this URI. It will not be shown again:");
    println!("  {}", registration.totp_provisioning_uri);

    Ok(())
}
