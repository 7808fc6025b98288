use crate::assess::{run_assessment, send_contact, show_results};
use crate::server;
use brightmind::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "BrightMind",
    about = "Run the BrightMind intake API or take the self-assessment from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP intake API (default command)
    Serve(ServeArgs),
    /// Walk through the nine-question self-assessment
    Assess(AssessArgs),
    /// Show the most recently saved assessment result
    Results(ResultsArgs),
    /// Send a message through the contact form endpoint
    Contact(ContactArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Directory holding the saved result (overrides BRIGHTMIND_RESULTS_DIR)
    #[arg(long)]
    pub(crate) results_dir: Option<PathBuf>,
    /// Comma-separated answers (0-3) instead of prompting on stdin
    #[arg(long, value_delimiter = ',')]
    pub(crate) answers: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub(crate) struct ResultsArgs {
    /// Directory holding the saved result (overrides BRIGHTMIND_RESULTS_DIR)
    #[arg(long)]
    pub(crate) results_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ContactArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) message: String,
    #[arg(long)]
    pub(crate) company: Option<String>,
    #[arg(long)]
    pub(crate) phone: Option<String>,
    /// routine, soon, urgent or crisis
    #[arg(long)]
    pub(crate) urgency: Option<String>,
    /// File to attach to the message
    #[arg(long)]
    pub(crate) attachment: Option<PathBuf>,
    /// Contact endpoint (overrides BRIGHTMIND_CONTACT_URL)
    #[arg(long)]
    pub(crate) api_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assessment(args).await,
        Command::Results(args) => show_results(args),
        Command::Contact(args) => send_contact(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["brightmind-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn answers_split_on_commas() {
        let cli = Cli::try_parse_from(["brightmind-api", "assess", "--answers", "0,1,2,3"])
            .expect("parses");
        match cli.command {
            Some(Command::Assess(args)) => assert_eq!(
                args.answers,
                Some(vec![
                    "0".to_string(),
                    "1".to_string(),
                    "2".to_string(),
                    "3".to_string()
                ])
            ),
            other => panic!("expected assess, got {other:?}"),
        }
    }

    #[test]
    fn contact_requires_the_mandatory_fields() {
        assert!(Cli::try_parse_from(["brightmind-api", "contact", "--name", "Ada"]).is_err());
    }
}
