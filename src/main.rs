use clap::Parser;
use log::info;

mod classifier;
mod config;
mod context;
mod dialogue;
mod entities;
mod intent;
mod llm_manager;
mod logger;
mod memory;
mod providers;
mod tools;
mod ui;

use classifier::{IntentClassifier, LlmClassifier, RuleClassifier};
use config::{ClassifierStrategy, Config, ProviderKind};
use dialogue::DialogueController;
use llm_manager::LLMManager;
use tools::MockTools;

#[derive(Parser)]
#[command(name = "mini_assistant", about = "A small conversational assistant for the terminal")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
    /// Classify intents with a language model instead of keyword rules
    #[arg(long)]
    llm: bool,
    /// Provider for the language model classifier
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,
    /// Disable colored output
    #[arg(long)]
    plain: bool,
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Write the effective configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);
    if dotenv::dotenv().is_ok() {
        info!("Loaded environment from .env");
    }

    let mut config = Config::load(&args.config)?;
    config.merge_with_args(args.llm, args.provider, args.plain);
    if let Some(path) = &args.write_config {
        config.save(shellexpand::tilde(path).into_owned())?;
        println!("Configuration written to {}", path);
        return Ok(());
    }

    let classifier: Box<dyn IntentClassifier> = match config.classifier.strategy {
        ClassifierStrategy::Rules => Box::new(RuleClassifier),
        ClassifierStrategy::Llm => Box::new(LlmClassifier::new(LLMManager::from_config(&config))),
    };
    let mut controller = DialogueController::new(classifier, Box::new(MockTools));

    let ui = ui::UIHandler::new(config.ui.colorful);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    ui.run(&mut controller, &config.ui.banner, stdin, &mut stdout).await?;
    Ok(())
}
