use clap::Subcommand;
use serde_json::json;

use crate::auth::register_user;
use crate::cli::utils::{output_success, require_database};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, Storage, UserRepository};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an API user")]
    Create {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Allow a user to obtain and use tokens again")]
    Activate {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "Revoke a user's access, including tokens already issued")]
    Deactivate {
        #[arg(help = "Username")]
        username: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    require_database(&config)?;
    let pool = DatabaseManager::connect(&config).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }
    let storage = Storage::postgres(pool);

    let result = run(cmd, storage.users.as_ref(), output_format).await;
    storage.close().await;
    result
}

async fn run(cmd: UserCommands, users: &dyn UserRepository, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { username, password } => {
            let user = register_user(users, &username, &password).await?;
            output_success(
                output_format,
                &format!("Created user '{}'", user.username),
                Some(json!({ "id": user.id, "username": user.username })),
            )
        }
        UserCommands::Activate { username } => set_active(users, &username, true, output_format).await,
        UserCommands::Deactivate { username } => set_active(users, &username, false, output_format).await,
    }
}

async fn set_active(
    users: &dyn UserRepository,
    username: &str,
    active: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let user = users.set_active(username, active).await?;
    let verb = if active { "Activated" } else { "Deactivated" };
    output_success(
        output_format,
        &format!("{} user '{}'", verb, user.username),
        Some(json!({ "id": user.id, "is_active": user.is_active })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryUserRepository;

    #[tokio::test]
    async fn create_then_deactivate() {
        let users = MemoryUserRepository::new();
        run(
            UserCommands::Create { username: "admin".into(), password: "pw".into() },
            &users,
            OutputFormat::Json,
        )
        .await
        .unwrap();
        run(UserCommands::Deactivate { username: "admin".into() }, &users, OutputFormat::Text)
            .await
            .unwrap();
        assert!(!users.find_by_username("admin").await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn duplicate_usernames_fail() {
        let users = MemoryUserRepository::new();
        let create = || UserCommands::Create { username: "admin".into(), password: "pw".into() };
        run(create(), &users, OutputFormat::Text).await.unwrap();
        assert!(run(create(), &users, OutputFormat::Text).await.is_err());
    }
}
