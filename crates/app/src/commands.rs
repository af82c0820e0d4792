//! Subcommand implementations.
//!
//! Each command reports session failures itself, unless the session core
//! already showed them through the terminal.

use anyhow::{Context, Result, bail};
use termbridge_domain::AuthError;

use crate::App;
use crate::terminal::describe_view;

/// Prints `error` unless it was already surfaced as a notification.
fn report(error: AuthError) -> anyhow::Error {
    match &error {
        AuthError::InvalidCredentials { message } => eprintln!("{message}"),
        AuthError::PermissionDenied { .. } => {}
        _ => eprintln!("{}", error.user_message()),
    }
    error.into()
}

pub async fn login(app: &App, user_id: &str, password: &str) -> Result<()> {
    match app.gateway.login(user_id, password).await {
        Ok(profile) => {
            println!("Signed in as {} ({})", profile.display_name, profile.role);
            Ok(())
        }
        // Anything but a refusal was already notified.
        Err(e @ AuthError::InvalidCredentials { .. }) => Err(report(e)),
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(app: &App) {
    app.gateway.logout().await;
}

pub fn status(app: &App) {
    let guard = app.gateway.guard();
    guard.render();

    let Some((view, profile)) = app.terminal.last_view() else {
        return;
    };
    match profile.filter(|_| view.user_info_section) {
        Some(profile) => {
            println!("Signed in as {} ({})", profile.display_name, profile.user_id);
            println!("  role           {}", profile.role);
            if let Some(external_id) = &profile.external_id {
                println!("  ABHA id        {external_id}");
            }
            if let Some(facility) = &profile.facility {
                println!("  facility       {facility}");
            }
            if let Some(token) = guard.store().token() {
                println!("  token          {}", token.preview());
            }
        }
        None => println!("Not signed in"),
    }
    println!("Sections:");
    println!("{}", describe_view(&view));
}

pub async fn refresh(app: &App) -> Result<()> {
    let token = app.gateway.refresh().await.map_err(report)?;
    println!("Token refreshed ({})", token.preview());
    Ok(())
}

pub async fn open(app: &App, path: &str) -> Result<()> {
    app.terminal.visit(path);
    app.gateway.guard().require_access(path).await.map_err(report)?;
    println!("{path}: access granted");
    Ok(())
}

pub async fn get(app: &App, path: &str) -> Result<()> {
    let response = app.gateway.client().get(path).await.map_err(|e| match e {
        // The session core already told the user.
        AuthError::AuthRequired => e.into(),
        e => report(e),
    })?;

    println!("{}", response.text());
    if !response.is_success() {
        bail!("{path} answered with status {}", response.status);
    }
    Ok(())
}

pub async fn userinfo(app: &App) -> Result<()> {
    let profile = app.gateway.fetch_user_info().await.map_err(|e| match e {
        AuthError::AuthRequired => e.into(),
        e => report(e),
    })?;
    let json = serde_json::to_string_pretty(&profile).context("Failed to format user info")?;
    println!("{json}");
    Ok(())
}

pub async fn keepalive(app: &App) -> Result<()> {
    let Some(profile) = app.gateway.resume().await else {
        return Err(report(AuthError::AuthRequired));
    };
    println!(
        "Keeping the session of {} alive, press Ctrl-C to stop",
        profile.display_name
    );
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("keepalive interrupted");
    Ok(())
}
