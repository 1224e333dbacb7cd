//! Argon2id hash generator for seeding admin accounts by hand.
//!
//! Usage:
//!   cargo run --bin hash-password
//!   cargo run --bin hash-password "lab-admin-password"
//!
//! Reading from stdin keeps the password out of the process list.

use std::env;
use std::io::{self, Write};

use eyantra_api::auth::{hash_password, validate_password_length};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let password = match env::args().nth(1) {
        Some(pwd) => pwd,
        None => {
            print!("Enter password to hash: ");
            io::stdout().flush()?;

            let mut password = String::new();
            io::stdin().read_line(&mut password)?;
            password.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if let Err(e) = validate_password_length(&password) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let password_hash = hash_password(&password)?;

    println!("\n{}\n", password_hash);
    println!("Store it in admins.password_hash, for example:");
    println!(
        "UPDATE admins SET password_hash = '{}', refresh_token = NULL WHERE email = 'admin@example.com';",
        password_hash
    );

    Ok(())
}
