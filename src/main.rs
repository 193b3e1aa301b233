use std::path::PathBuf;

use clap::{Parser, Subcommand};

use quiz_attempt::protocol::DEFAULT_PORT;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve quizzes and grade submitted attempts
    Serve {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// JSON file holding the quiz bank
        #[arg(short, long, default_value = "quizzes.json")]
        quizzes: PathBuf,
    },

    /// Take a timed attempt at a quiz
    Take {
        /// Id of the quiz to attempt
        quiz_id: String,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve { port, quizzes } => quiz_attempt::server::run(port, quizzes).await,
        Command::Take {
            quiz_id,
            host,
            port,
        } => quiz_attempt::client::run(quiz_id, host, port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
