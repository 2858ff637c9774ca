use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sheetlog_core::{
    BookingInfo, BookingRequest, ContactInfo, ConversationEvent, IntakeError, LeadScore,
    SheetLogger, SinkConfig, accept_booking,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "sheetlog")]
#[command(about = "Initialize the log spreadsheet and append conversation or booking rows")]
struct Cli {
    /// Target spreadsheet id (defaults to SHEETLOG_SPREADSHEET_ID)
    #[arg(long, global = true)]
    spreadsheet_id: Option<String>,

    /// Path to a service-account key file, raw or base64-wrapped JSON
    /// (defaults to the GOOGLE_SERVICE_ACCOUNT_KEY environment variable)
    #[arg(long, global = true)]
    credentials_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the Conversations and Bookings sheets and install headers
    Init,
    /// Append one conversational exchange
    Conversation {
        /// Session identifier
        #[arg(short, long)]
        session: String,

        /// What the user said
        #[arg(short, long)]
        message: String,

        /// What the assistant answered
        #[arg(short, long)]
        response: String,

        /// Overall lead score
        #[arg(long)]
        score: Option<f64>,

        /// Contact info as a JSON object
        #[arg(long)]
        contact: Option<String>,
    },
    /// Validate and append one completed call booking
    Booking {
        /// Session identifier
        #[arg(short, long)]
        session: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Booking date, e.g. 2024-05-01
        #[arg(long)]
        date: Option<String>,

        /// Booking time, e.g. 10:00
        #[arg(long)]
        time: Option<String>,

        /// Meeting type, e.g. demo
        #[arg(long)]
        meeting_type: Option<String>,
    },
}

fn build_config(cli: &Cli) -> Result<SinkConfig> {
    let mut config = SinkConfig::from_env();
    if cli.spreadsheet_id.is_some() {
        config.spreadsheet_id = cli.spreadsheet_id.clone();
    }
    if let Some(path) = &cli.credentials_file {
        let secret = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file {path}"))?;
        config.credential_secret = Some(secret);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let logger = SheetLogger::new(config);

    match cli.command {
        Command::Init => {
            logger.initialize().await;
            info!("Spreadsheet initialization attempted");
        }
        Command::Conversation {
            session,
            message,
            response,
            score,
            contact,
        } => {
            let contact_info: ContactInfo = match contact {
                Some(raw) => {
                    serde_json::from_str(&raw).context("Contact info is not a JSON object")?
                }
                None => ContactInfo::default(),
            };
            let event = ConversationEvent {
                session_id: session,
                user_message: message,
                ai_response: response,
                lead_score: LeadScore {
                    overall: score,
                    extra: Default::default(),
                },
                contact_info,
                timestamp: Utc::now(),
            };
            logger.append_conversation(event).await;
        }
        Command::Booking {
            session,
            name,
            email,
            phone,
            company,
            title,
            date,
            time,
            meeting_type,
        } => {
            let request = BookingRequest {
                session_id: session,
                contact_info: ContactInfo {
                    name,
                    email,
                    phone,
                    company,
                    title,
                    extra: Default::default(),
                },
                booking_info: BookingInfo {
                    date,
                    time,
                    meeting_type,
                },
            };
            // Mirror the endpoint contract: incomplete requests are a
            // client error and never reach the sink.
            match accept_booking(request, Utc::now()) {
                Ok(event) => logger.append_booking(event).await,
                Err(err @ IntakeError::MissingField(_)) => {
                    eprintln!("Rejected: {err}");
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}
