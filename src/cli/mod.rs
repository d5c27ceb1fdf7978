mod menu;

pub use menu::Menu;

use std::io::{self, Write};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use crate::application::TransferService;
use crate::domain::{UserId, format_amount};

/// Banksim - Bank Account Simulator
#[derive(Parser)]
#[command(name = "banksim")]
#[command(about = "A command-line bank account simulator over a SQLite users table")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "BANKSIM_DATABASE",
        default_value = "banksim.db",
        global = true
    )]
    pub database: String,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to the interactive menu
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Run the interactive menu
    Menu {
        /// Show transaction history as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the balance of a user
    Balance {
        /// User ID
        id: UserId,

        /// Account holder's name (exact match)
        name: String,
    },

    /// Transfer funds between two users
    Transfer {
        /// Amount to transfer (whole units)
        #[arg(allow_negative_numbers = true)]
        amount: i64,

        /// Sender user ID
        #[arg(long)]
        from: UserId,

        /// Sender name (exact match)
        #[arg(long)]
        name: String,

        /// Receiver user ID
        #[arg(long)]
        to: UserId,
    },

    /// Create a new account
    Create {
        /// Account holder's name
        name: String,

        /// Email address (must be unique)
        email: String,

        /// Initial balance
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        balance: i64,
    },

    /// Delete an account
    Delete {
        /// User ID
        id: UserId,

        /// Account holder's name, to confirm
        name: String,

        /// Confirm that the deletion cannot be undone
        #[arg(long)]
        yes: bool,
    },

    /// List all users
    Users,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let stdout = io::stdout();
        self.run_with(&mut stdout.lock()).await
    }

    /// Dispatch the command, writing its output to `out`.
    /// The interactive menu still reads from stdin.
    pub async fn run_with(self, out: &mut impl Write) -> Result<()> {
        let command = self.command.unwrap_or(Commands::Menu { json: false });

        match command {
            Commands::Init => {
                TransferService::init(&self.database).await?;
                writeln!(out, "Database initialized: {}", self.database)?;
            }

            Commands::Menu { json } => {
                let mut service = TransferService::connect(&self.database).await?;
                let stdin = io::stdin();
                let mut menu = Menu::new(stdin.lock(), &mut *out).with_json_history(json);
                menu.run(&mut service).await?;
            }

            Commands::Balance { id, name } => {
                let service = TransferService::connect(&self.database).await?;
                let check = service.check_balance(id, &name).await?;
                writeln!(out, "{}", check)?;
            }

            Commands::Transfer {
                amount,
                from,
                name,
                to,
            } => {
                let mut service = TransferService::connect(&self.database).await?;
                let result = service.transfer_funds(from, &name, to, amount).await?;
                writeln!(out, "{}", result)?;
                writeln!(out, "{}", result.transaction)?;
            }

            Commands::Create {
                name,
                email,
                balance,
            } => {
                let service = TransferService::connect(&self.database).await?;
                let created = service.create_account(&name, &email, balance).await?;
                writeln!(out, "{}", created)?;
            }

            Commands::Delete { id, name, yes } => {
                if !yes {
                    bail!("Deletion cannot be undone; pass --yes to confirm");
                }
                let service = TransferService::connect(&self.database).await?;
                let deleted = service.delete_account(id, &name).await?;
                writeln!(out, "{}", deleted)?;
            }

            Commands::Users => {
                let service = TransferService::connect(&self.database).await?;
                run_users_command(&service, out).await?;
            }
        }

        Ok(())
    }
}

async fn run_users_command(service: &TransferService, out: &mut impl Write) -> Result<()> {
    let users = service.list_users().await?;
    if users.is_empty() {
        writeln!(out, "No users found.")?;
        return Ok(());
    }

    writeln!(out, "{:<5} {:<25} {:<30} {:>10}", "ID", "NAME", "EMAIL", "BALANCE")?;
    writeln!(out, "{}", "-".repeat(73))?;
    for user in users {
        writeln!(
            out,
            "{:<5} {:<25} {:<30} {:>10}",
            user.id,
            user.name,
            user.email,
            format_amount(user.balance)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Parse and run one command line against `db`, returning its output.
    async fn run_command(db: &str, args: &[&str]) -> Result<String> {
        let mut argv = vec!["banksim", "--database", db];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;

        let mut out = Vec::new();
        cli.run_with(&mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    fn temp_db() -> (TempDir, String) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cli.db").to_str().unwrap().to_string();
        (temp_dir, path)
    }

    #[tokio::test]
    async fn test_users_on_empty_table() {
        let (_temp, db) = temp_db();
        run_command(&db, &["init"]).await.unwrap();

        let output = run_command(&db, &["users"]).await.unwrap();
        assert_eq!(output, "No users found.\n");
    }

    #[tokio::test]
    async fn test_create_then_list_and_check_balance() {
        let (_temp, db) = temp_db();

        let output = run_command(
            &db,
            &["create", "Alice", "alice@example.com", "--balance", "100"],
        )
        .await
        .unwrap();
        assert_eq!(output, "Account created successfully for Alice with ID 1\n");
        run_command(&db, &["create", "Bob", "bob@example.com"]).await.unwrap();

        let output = run_command(&db, &["users"]).await.unwrap();
        assert!(output.starts_with("ID"));
        assert!(output.contains("alice@example.com"));
        assert!(output.contains("$100"));
        assert!(output.contains("bob@example.com"));

        let output = run_command(&db, &["balance", "1", "Alice"]).await.unwrap();
        assert_eq!(output, "Balance for Alice: $100\n");
    }

    #[tokio::test]
    async fn test_transfer_subcommand() {
        let (_temp, db) = temp_db();
        run_command(&db, &["create", "Alice", "alice@example.com", "-b", "100"])
            .await
            .unwrap();
        run_command(&db, &["create", "Bob", "bob@example.com"]).await.unwrap();

        let output = run_command(
            &db,
            &["transfer", "40", "--from", "1", "--name", "Alice", "--to", "2"],
        )
        .await
        .unwrap();
        assert!(output.contains("Successfully transferred $40 from Alice to Bob"));
        assert!(output.contains("Receiver Balance: $0 → $40"));

        let err = run_command(
            &db,
            &["transfer", "999", "--from", "1", "--name", "Alice", "--to", "2"],
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Insufficient balance"));

        let err = run_command(
            &db,
            &["transfer", "-5", "--from", "1", "--name", "Alice", "--to", "2"],
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Transfer amount must be greater than 0");

        let output = run_command(&db, &["balance", "2", "Bob"]).await.unwrap();
        assert_eq!(output, "Balance for Bob: $40\n");
    }

    #[tokio::test]
    async fn test_delete_requires_yes_flag() {
        let (_temp, db) = temp_db();
        run_command(&db, &["create", "Alice", "alice@example.com"]).await.unwrap();

        let err = run_command(&db, &["delete", "1", "Alice"]).await.unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert!(run_command(&db, &["users"]).await.unwrap().contains("Alice"));

        let err = run_command(&db, &["delete", "1", "alice", "--yes"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Name confirmation failed"));

        let output = run_command(&db, &["delete", "1", "Alice", "--yes"])
            .await
            .unwrap();
        assert_eq!(output, "Account for Alice (ID: 1) deleted successfully\n");
        assert_eq!(run_command(&db, &["users"]).await.unwrap(), "No users found.\n");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_email() {
        let (_temp, db) = temp_db();

        let err = run_command(&db, &["create", "Alice", "not-an-email"])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format");
    }
}
