use std::io::{BufRead, Write};

use anyhow::Result;

use crate::application::TransferService;
use crate::domain::{format_amount, parse_amount};

const MENU_ITEMS: [&str; 7] = [
    "Check Balance",
    "Transfer Funds",
    "Create Account",
    "Delete Account",
    "View All Users",
    "View Transaction History",
    "Exit",
];

/// Interactive numbered menu over any line-based input and output.
pub struct Menu<R, W> {
    input: R,
    output: W,
    json_history: bool,
}

enum Choice {
    Continue,
    Exit,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            json_history: false,
        }
    }

    /// Render the transaction history as JSON instead of detail blocks.
    pub fn with_json_history(mut self, json: bool) -> Self {
        self.json_history = json;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the operator picks Exit or input ends.
    pub async fn run(&mut self, service: &mut TransferService) -> Result<()> {
        self.banner("Welcome to Bank Management System")?;

        loop {
            self.display_menu()?;
            let Some(choice) = self.prompt("Enter your choice (1-7): ")? else {
                break;
            };

            match self.dispatch(service, choice.trim()).await? {
                Choice::Continue => {}
                Choice::Exit => break,
            }
        }

        writeln!(
            self.output,
            "\nThank you for using Bank Management System. Goodbye!"
        )?;
        Ok(())
    }

    async fn dispatch(&mut self, service: &mut TransferService, choice: &str) -> Result<Choice> {
        match choice {
            "1" => self.check_balance(service).await?,
            "2" => self.transfer_funds(service).await?,
            "3" => self.create_account(service).await?,
            "4" => self.delete_account(service).await?,
            "5" => self.view_all_users(service).await?,
            "6" => self.view_transaction_history(service)?,
            "7" => return Ok(Choice::Exit),
            _ => writeln!(
                self.output,
                "Invalid choice. Please enter a number between 1 and 7."
            )?,
        }
        Ok(Choice::Continue)
    }

    fn banner(&mut self, title: &str) -> Result<()> {
        let rule = "=".repeat(60);
        writeln!(self.output, "\n{rule}\n{title}\n{rule}")?;
        Ok(())
    }

    fn display_menu(&mut self) -> Result<()> {
        self.banner("BANK MANAGEMENT SYSTEM")?;
        for (i, item) in MENU_ITEMS.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, item)?;
        }
        writeln!(self.output, "{}", "=".repeat(60))?;
        Ok(())
    }

    /// Print a prompt and read one trimmed line. `None` means end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt for an integer. Prints `invalid` and yields `None` when the
    /// input is not a number.
    fn prompt_number(&mut self, label: &str, invalid: &str) -> Result<Option<i64>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match raw.parse::<i64>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.output, "{invalid}")?;
                Ok(None)
            }
        }
    }

    /// Prompt for a money amount; a leading `$` is accepted.
    fn prompt_amount(&mut self, label: &str, invalid: &str) -> Result<Option<i64>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match parse_amount(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.output, "{invalid}")?;
                Ok(None)
            }
        }
    }

    fn report<T: std::fmt::Display, E: std::fmt::Display>(
        &mut self,
        result: &std::result::Result<T, E>,
    ) -> Result<()> {
        match result {
            Ok(message) => writeln!(self.output, "\n✓ {message}")?,
            Err(err) => writeln!(self.output, "\n✗ {err}")?,
        }
        Ok(())
    }

    async fn check_balance(&mut self, service: &TransferService) -> Result<()> {
        const INVALID: &str = "Invalid User ID. Please enter a number.";
        let Some(user_id) = self.prompt_number("Enter User ID: ", INVALID)? else {
            return Ok(());
        };
        let Some(name) = self.prompt("Enter Name: ")? else {
            return Ok(());
        };

        let result = service.check_balance(user_id, &name).await;
        self.report(&result)?;
        if let Ok(check) = result {
            writeln!(self.output, "Balance: {}", format_amount(check.balance))?;
        }
        Ok(())
    }

    async fn transfer_funds(&mut self, service: &mut TransferService) -> Result<()> {
        const INVALID: &str = "Invalid input. Please enter valid numbers.";
        let Some(sender_id) = self.prompt_number("Enter Sender ID: ", INVALID)? else {
            return Ok(());
        };
        let Some(sender_name) = self.prompt("Enter Sender Name: ")? else {
            return Ok(());
        };
        let Some(receiver_id) = self.prompt_number("Enter Receiver ID: ", INVALID)? else {
            return Ok(());
        };
        let Some(amount) = self.prompt_amount("Enter Amount to Transfer: ", INVALID)? else {
            return Ok(());
        };

        let result = service
            .transfer_funds(sender_id, &sender_name, receiver_id, amount)
            .await;
        self.report(&result)?;
        if let Ok(done) = result {
            writeln!(self.output, "\n{}\n", done.transaction)?;
        }
        Ok(())
    }

    async fn create_account(&mut self, service: &TransferService) -> Result<()> {
        let Some(name) = self.prompt("Enter Name: ")? else {
            return Ok(());
        };
        let Some(email) = self.prompt("Enter Email: ")? else {
            return Ok(());
        };
        let Some(raw_balance) = self.prompt("Enter Initial Balance (default 0): ")? else {
            return Ok(());
        };

        let initial_balance = if raw_balance.is_empty() {
            0
        } else {
            match parse_amount(&raw_balance) {
                Ok(balance) => balance,
                Err(_) => {
                    writeln!(
                        self.output,
                        "Invalid input. Please enter valid numbers for balance."
                    )?;
                    return Ok(());
                }
            }
        };

        let result = service.create_account(&name, &email, initial_balance).await;
        self.report(&result)
    }

    async fn delete_account(&mut self, service: &TransferService) -> Result<()> {
        const INVALID: &str = "Invalid User ID. Please enter a number.";
        let Some(user_id) = self.prompt_number("Enter User ID to Delete: ", INVALID)? else {
            return Ok(());
        };
        let Some(confirm_name) =
            self.prompt("Enter the account holder's name to confirm deletion: ")?
        else {
            return Ok(());
        };

        let warn = "!".repeat(60);
        writeln!(
            self.output,
            "\n{warn}\nWARNING: This action cannot be undone!\n{warn}"
        )?;
        let confirmed = self
            .prompt("Are you sure you want to delete this account? (yes/no): ")?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("yes"));
        if !confirmed {
            writeln!(self.output, "Deletion cancelled.")?;
            return Ok(());
        }

        let result = service.delete_account(user_id, &confirm_name).await;
        self.report(&result)
    }

    async fn view_all_users(&mut self, service: &TransferService) -> Result<()> {
        let users = match service.list_users().await {
            Ok(users) => users,
            Err(err) => {
                writeln!(self.output, "\n✗ {err}")?;
                return Ok(());
            }
        };

        if users.is_empty() {
            writeln!(self.output, "\nNo users found in database.")?;
            return Ok(());
        }

        let rule = "=".repeat(80);
        writeln!(self.output, "\n{rule}")?;
        writeln!(
            self.output,
            "{:<5} {:<25} {:<30} {:<15}",
            "ID", "Name", "Email", "Balance"
        )?;
        writeln!(self.output, "{rule}")?;
        for user in &users {
            writeln!(
                self.output,
                "{:<5} {:<25} {:<30} {:<15}",
                user.id,
                user.name,
                user.email,
                format_amount(user.balance)
            )?;
        }
        writeln!(self.output, "{rule}")?;
        Ok(())
    }

    fn view_transaction_history(&mut self, service: &TransferService) -> Result<()> {
        let transactions = service.transaction_history();

        if transactions.is_empty() {
            writeln!(self.output, "\nNo transactions found.")?;
            return Ok(());
        }

        if self.json_history {
            serde_json::to_writer_pretty(&mut self.output, transactions)?;
            writeln!(self.output)?;
            return Ok(());
        }

        let rule = "=".repeat(100);
        writeln!(self.output, "\n{rule}\nTRANSACTION HISTORY\n{rule}")?;
        for (i, transaction) in transactions.iter().enumerate() {
            writeln!(self.output, "\nTransaction {}:", i + 1)?;
            writeln!(self.output, "{transaction}")?;
        }
        Ok(())
    }
}
