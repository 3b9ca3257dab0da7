use anyhow::Result;
use spark_core::auth;
use spark_core::db::DbPool;

use crate::cli::AuthSubcommand;

pub async fn handle_auth(pool: &DbPool, command: AuthSubcommand) -> Result<()> {
    match command {
        AuthSubcommand::Signup { email } => {
            let user = auth::sign_up(pool, &email).await?;
            println!("Signed up and signed in as {}", user.email.unwrap_or(email));
        }
        AuthSubcommand::Signin { email } => {
            let user = auth::sign_in(pool, &email).await?;
            println!("Signed in as {}", user.email.unwrap_or(email));
        }
        AuthSubcommand::Anonymous => {
            let user = auth::sign_in_anonymously(pool).await?;
            println!("Signed in anonymously ({})", user.id);
        }
        AuthSubcommand::Signout => {
            auth::sign_out(pool).await?;
            println!("Signed out.");
        }
        AuthSubcommand::Whoami => match auth::current_user(pool).await? {
            Some(user) => match user.email {
                Some(email) => println!("Signed in as {}", email),
                None => println!("Signed in anonymously ({})", user.id),
            },
            None => println!("Not signed in."),
        },
    }
    Ok(())
}
