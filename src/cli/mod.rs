use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod auth;
pub mod send;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Run the API server (the default)
    Serve {
        /// Set the server host address, overrides HOST
        #[arg(long)]
        host: Option<String>,

        /// Set the server port, overrides PORT
        #[arg(long)]
        port: Option<String>,
    },
    /// Send a single notification and exit
    Send {
        /// Device token to address, only used in token-or-topic mode
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        image: Option<String>,
        /// Defaults to a random UUID
        #[arg(long)]
        msg_id: Option<String>,
    },
    /// Mint and print an access token from the service account
    Auth {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Send {
            token,
            topic,
            title,
            body,
            image,
            msg_id,
        }) => {
            send::run(send::SendArgs {
                token,
                topic,
                title,
                body,
                image,
                msg_id,
            })
            .await?;
        }
        Some(Command::Auth {}) => {
            auth::run().await?;
        }
        None => {
            serve::run(None, None).await?;
        }
    }

    Ok(())
}
