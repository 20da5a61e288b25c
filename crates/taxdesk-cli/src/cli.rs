use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use taxdesk_core::VERSION;

/// Taxdesk - a local, single-user tax-management workspace
#[derive(Parser)]
#[command(name = "taxdesk")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the store file
    #[arg(short, long, global = true, env = "TAXDESK_STORE")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    pub format: Option<FormatChoice>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,
}

/// Values accepted by `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatChoice {
    /// Bordered tables and badges on a terminal
    Table,
    /// Stable lines for scripts
    Plain,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the config file and create the store
    Init(InitArgs),

    /// Start a session
    Login(LoginArgs),

    /// Create an account and start a session
    Register(RegisterArgs),

    /// End the session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Resolve a path through the route guard
    Open(OpenArgs),

    /// Interactive navigation shell
    Shell,

    /// Overview of returns, invoices, and recent activity
    Dashboard,

    /// Manage tax returns
    #[command(subcommand)]
    Returns(ReturnsCommand),

    /// Manage the document library
    #[command(subcommand)]
    Documents(DocumentsCommand),

    /// Invoices, payments, and receipts
    #[command(subcommand)]
    Payments(PaymentsCommand),

    /// Show the activity log
    Activity(ActivityArgs),

    /// Profile, notifications, and account
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Check store integrity
    Check,

    /// Back up the store
    Backup(BackupArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the store will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Only allow forward review transitions for returns
    #[arg(long)]
    pub strict_transitions: bool,

    /// Display timezone (e.g. America/New_York)
    #[arg(long)]
    pub timezone: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `login` command
#[derive(Args)]
pub struct LoginArgs {
    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Password (or set TAXDESK_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Name shown in the sidebar
    #[arg(long)]
    pub name: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `register` command
#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: Option<String>,

    /// Password (or set TAXDESK_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Args)]
pub struct OpenArgs {
    /// Application path (e.g. /dashboard/returns)
    #[arg(value_name = "PATH")]
    pub path: String,
}

#[derive(Subcommand)]
pub enum ReturnsCommand {
    /// List returns
    List(ReturnsListArgs),
    /// File a new return
    Add(ReturnsAddArgs),
    /// Edit a return
    Edit(ReturnsEditArgs),
    /// Change a return's status
    Status(ReturnsStatusArgs),
    /// Delete a return
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct ReturnsListArgs {
    /// Only show returns with this status
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args)]
pub struct ReturnsAddArgs {
    /// Form type (e.g. 1040, 1040-ES, Schedule C)
    #[arg(long = "type", value_name = "TYPE")]
    pub return_type: String,

    /// Tax year
    #[arg(long)]
    pub year: i32,

    /// Attach a document by name
    #[arg(short, long = "document", value_name = "NAME")]
    pub documents: Vec<String>,
}

#[derive(Args)]
pub struct ReturnsEditArgs {
    /// Return ID
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long = "type", value_name = "TYPE")]
    pub return_type: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    /// Replace attached documents
    #[arg(short, long = "document", value_name = "NAME")]
    pub documents: Vec<String>,

    /// Remove every attached document
    #[arg(long, conflicts_with = "documents")]
    pub clear_documents: bool,
}

#[derive(Args)]
pub struct ReturnsStatusArgs {
    /// Return ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// New status (pending, in-review, completed)
    #[arg(value_name = "STATUS")]
    pub status: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum DocumentsCommand {
    /// List documents
    List(DocumentsListArgs),
    /// Upload files into the library
    Upload(DocumentsUploadArgs),
    /// Set a document's comments
    Comment(DocumentsCommentArgs),
    /// Delete a document
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct DocumentsListArgs {
    /// Match name or comments
    #[arg(long)]
    pub search: Option<String>,

    /// Only show one type (pdf, image, docx)
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,
}

#[derive(Args)]
pub struct DocumentsUploadArgs {
    /// Files to upload
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<String>,

    /// MIME type for every file (guessed from the extension otherwise)
    #[arg(long)]
    pub mime: Option<String>,
}

#[derive(Args)]
pub struct DocumentsCommentArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(value_name = "TEXT")]
    pub comments: String,
}

#[derive(Subcommand)]
pub enum PaymentsCommand {
    /// List invoices
    Invoices,
    /// List receipts
    Receipts,
    /// Create an invoice
    Create(InvoiceCreateArgs),
    /// Edit an invoice description
    Edit(InvoiceEditArgs),
    /// Pay an invoice
    Pay(PayArgs),
    /// Delete an invoice
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct InvoiceCreateArgs {
    #[arg(long)]
    pub description: String,

    /// Amount in dollars (e.g. 125.50)
    #[arg(long)]
    pub amount: String,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: String,
}

#[derive(Args)]
pub struct InvoiceEditArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long)]
    pub description: String,
}

#[derive(Args)]
pub struct PayArgs {
    /// Invoice ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// credit_card, debit_card, bank_transfer, or paypal
    #[arg(long, default_value = "credit_card")]
    pub method: String,
}

#[derive(Args)]
pub struct ActivityArgs {
    /// Only show one type (auth, return, document, payment, system)
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Match description or details
    #[arg(long)]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show the profile
    Profile,
    /// Update the profile
    SetProfile(SetProfileArgs),
    /// Show notification preferences
    Notifications,
    /// Turn a notification on or off
    Notify(NotifyArgs),
    /// Delete every stored record and end the session
    DeleteAccount(DeleteAccountArgs),
}

#[derive(Args)]
pub struct SetProfileArgs {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Args)]
pub struct NotifyArgs {
    /// email, sms, push, or marketing
    #[arg(value_name = "KIND")]
    pub kind: String,

    /// on or off
    #[arg(value_name = "STATE")]
    pub state: String,
}

#[derive(Args)]
pub struct DeleteAccountArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `backup` command
#[derive(Args)]
pub struct BackupArgs {
    /// Destination path
    #[arg(value_name = "DEST")]
    pub destination: String,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_nested_subcommand() {
        let cli = Cli::try_parse_from([
            "taxdesk", "--json", "returns", "add", "--type", "1040", "--year", "2024",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Returns(ReturnsCommand::Add(args))) => {
                assert_eq!(args.return_type, "1040");
                assert_eq!(args.year, 2024);
                assert!(args.documents.is_empty());
            }
            _ => panic!("expected returns add"),
        }
    }
}
