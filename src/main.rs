use anyhow::Result;
use clap::Parser;
use gravity_gateway::catalog::SchemaCatalog;
use gravity_gateway::config::{DbConfig, LlmConfig};
use gravity_gateway::executor::MySqlExecutor;
use gravity_gateway::gateway::{GatewayOutcome, QueryGateway};
use gravity_gateway::llm::OllamaClient;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "gravity-gateway")]
#[command(about = "Natural-language query gateway for the gravity_books order database")]
struct Args {
    /// The question to ask; read interactively when omitted
    question: Option<String>,

    /// Ollama model to use (overrides OLLAMA_MODEL)
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let llm_config = LlmConfig::from_env();
    let db_config = DbConfig::from_env();
    let model = args.model.unwrap_or(llm_config.model);

    let question = match args.question {
        Some(question) => question,
        None => read_question()?,
    };

    info!("Gateway starting");
    info!("Question: {}", question);

    let llm = Arc::new(OllamaClient::new(llm_config.base_url));
    let executor = Arc::new(MySqlExecutor::new(db_config));
    let gateway = QueryGateway::new(llm, model, executor, SchemaCatalog::shared());

    match gateway.answer(&question).await? {
        GatewayOutcome::Rejected { message } => {
            println!("{}", message);
        }
        GatewayOutcome::Answered {
            summary,
            sql,
            rows_returned,
        } => {
            println!("Generated SQL: {}", sql);
            println!("({} rows)", rows_returned);
            println!("Output: {}", summary);
        }
    }

    Ok(())
}

fn read_question() -> Result<String> {
    print!("What do you want to know about the database?: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
