use std::io::{self, Write};

use clap::Parser;

use crate::config::Settings;
use crate::db;
use crate::models::user::SignupInput;
use crate::services::auth::AuthService;

/// Creates a pre-verified admin account. Every field may be passed on
/// the command line; anything left out is prompted for interactively, with
/// the password read via a hidden prompt.
#[derive(Parser, Debug, Default)]
pub struct Args {
    given_name: Option<String>,
    family_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

pub async fn run(settings: &'static Settings, args: Args) -> anyhow::Result<()> {
    let given_name = args.given_name.unwrap_or_else(|| prompt("First name").expect("to read first name"));
    let family_name = args.family_name.unwrap_or_else(|| prompt("Last name").expect("to read last name"));
    let email = args.email.unwrap_or_else(|| prompt("Email").expect("to read email"));
    let password = args
        .password
        .unwrap_or_else(|| rpassword::prompt_password("Password: ").expect("to read password"));

    let pool = db::open_pool(&settings.db_path, 4)?;
    let auth = AuthService::new(pool, &settings.jwt_secret);

    let user = auth
        .register_admin(SignupInput {
            email,
            password,
            first_name: given_name,
            last_name: family_name,
        })
        .await?;

    println!("created admin account {} ({})", user.email, user.id);
    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}
