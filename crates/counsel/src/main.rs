//! A terminal chat client for the `counsel` advisory agent.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use counsel::SessionBuilder;
use counsel_core::store::CheckpointStore;
use counsel_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use counsel_store::PostgresStore;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use sqlx::postgres::PgPoolOptions;
use tokio::io::{self, AsyncBufReadExt};

const BAR_CHAR: &str = "▎";

const DB_MAX_CONNECTIONS: u32 = 20;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(api_key) = env::var("OPENAI_API_KEY") else {
        eprintln!("OPENAI_API_KEY environment variable is not set");
        return;
    };
    let Ok(database_url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL environment variable is not set");
        return;
    };

    let mut config = OpenAIConfigBuilder::with_api_key(api_key);
    if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    if let Ok(model) = env::var("OPENAI_MODEL") {
        config = config.with_model(model);
    }
    let model_provider = OpenAIProvider::new(config.build());

    let pool = match PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("failed to connect to the database: {err}");
            return;
        }
    };

    let store = Arc::new(PostgresStore::new(pool.clone()));
    if let Err(err) = store.ensure_tables().await {
        eprintln!("failed to prepare checkpoint tables: {err}");
        return;
    }

    let thread_id =
        env::args().nth(1).unwrap_or_else(|| "default".to_owned());

    let session = SessionBuilder::with_model_provider(model_provider)
        .with_database_pool(pool)
        .with_checkpoint_store(Arc::clone(&store) as Arc<dyn CheckpointStore>)
        .with_thread_id(&thread_id)
        .build()
        .await;
    let mut session = match session {
        Ok(session) => session,
        Err(err) => {
            eprintln!("failed to start the session: {err}");
            return;
        }
    };

    println!(
        "{}🎓 Chatting on thread `{}`. Type /threads to list saved threads.",
        BAR_CHAR.bright_cyan(),
        thread_id.bright_white()
    );

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "/threads" {
            match store.list_threads().await {
                Ok(threads) => {
                    for thread in threads {
                        println!("{}{}", BAR_CHAR.bright_cyan(), thread);
                    }
                }
                Err(err) => {
                    eprintln!("failed to list threads: {err}");
                }
            }
            continue;
        }

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");
        progress_bar.enable_steady_tick(Duration::from_millis(100));

        let answer = session.send_message(line).await;

        progress_bar.finish_and_clear();
        println!(
            "{}🤖 {}",
            BAR_CHAR.bright_cyan(),
            answer.bright_white()
        );
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
