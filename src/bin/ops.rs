//! Privileged operational tooling. Talks to the database directly and
//! bypasses access resolution, so it must never be exposed to end users.

use clap::{Parser, Subcommand};
use docshare::{configuration::get_configuration, sharing::SharingStore, startup::get_connection_pool};

#[derive(Parser)]
#[command(name = "ops", about = "Administrative sharing operations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every sharing grant in the system.
    ListGrants,
    /// List the sharing grants held by one user.
    UserGrants { user_id: String },
    /// Revoke every sharing grant held by one user.
    RevokeUser { user_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = get_configuration()?;
    let sharing = SharingStore::new(get_connection_pool(&settings.database));

    match cli.command {
        Command::ListGrants => {
            for grant in sharing.list_all_grants().await? {
                println!(
                    "{}\t{}\t{}\t{:?}",
                    grant.id, grant.document_id, grant.user_id, grant.role
                );
            }
        }
        Command::UserGrants { user_id } => {
            for grant in sharing.list_grants_for_user(&user_id).await? {
                println!("{}\t{}\t{:?}", grant.id, grant.document_id, grant.role);
            }
        }
        Command::RevokeUser { user_id } => {
            let revoked = sharing.remove_all_grants_for_user(&user_id).await?;
            println!("Removed {} grants for user {}", revoked, user_id);
        }
    }

    Ok(())
}
