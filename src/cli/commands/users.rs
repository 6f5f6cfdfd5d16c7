use anyhow::anyhow;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{connect, OutputFormat};
use crate::database::models::user::{ROLE_ADMIN, ROLE_USER};
use crate::services::UserService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List all usernames")]
    List,

    #[command(about = "Give a user the admin role")]
    GrantAdmin {
        #[arg(help = "Username")]
        username: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (_, pool) = connect().await?;
    let users = UserService::new(pool);

    match cmd {
        UserCommands::List => {
            let names = users.get_all_users().await?;
            if names.is_empty() {
                return output_empty_collection(&output_format, "users", "No users");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "users": names }))?);
                }
                OutputFormat::Text => {
                    println!("USERNAME");
                    println!("{}", "-".repeat(30));
                    for name in &names {
                        println!("{}", name);
                    }
                }
            }
            Ok(())
        }
        UserCommands::GrantAdmin { username } => {
            let user = users
                .get_user(&username)
                .await?
                .ok_or_else(|| anyhow!("User '{}' not found", username))?;

            let mut roles = user.roles.clone();
            for role in [ROLE_USER, ROLE_ADMIN] {
                if !roles.iter().any(|r| r == role) {
                    roles.push(role.to_string());
                }
            }

            let updated = users
                .update_user_roles(&username, &roles)
                .await?
                .ok_or_else(|| anyhow!("User '{}' not found", username))?;

            output_success(
                &output_format,
                &format!("Granted admin to '{}'", updated.username),
                Some(json!({ "username": updated.username, "roles": updated.roles })),
            )
        }
    }
}
