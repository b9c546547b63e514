use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::{json, Value};

use ticket_rules::config::Settings;
use ticket_rules::engine::{MatchPolicy, Rule, RuleSet};
use ticket_rules::tickets::{
    validate_rules, AssignmentAction, EscalationAction, RuleAction, RuleKind, RuleLoader,
};

use serde::Serialize;
use std::fs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a rule file and report condition problems
    Check {
        /// Path to the rule file (YAML or JSON)
        #[arg(short, long)]
        rules: String,

        /// Rule kind: assignment or escalation
        #[arg(short, long)]
        kind: RuleKind,

        /// Fail on any problem instead of only reporting it
        #[arg(long)]
        strict: bool,
    },
    /// Evaluate a rule file against a ticket
    Evaluate {
        /// Path to the rule file (YAML or JSON)
        #[arg(short, long)]
        rules: String,

        /// Rule kind: assignment or escalation
        #[arg(short, long)]
        kind: RuleKind,

        /// Path to the ticket JSON
        #[arg(short, long)]
        subject: String,

        /// Path to extra context JSON overlaid on the ticket
        #[arg(short, long)]
        context: Option<String>,

        /// first or all; defaults to TICKET_RULES_POLICY
        #[arg(short, long)]
        policy: Option<MatchPolicy>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::from_env()?;

    match args.command {
        Commands::Check {
            rules,
            kind,
            strict,
        } => {
            let strict = strict || settings.strict;
            let issues = match kind {
                RuleKind::Assignment => check::<AssignmentAction>(&rules)?,
                RuleKind::Escalation => check::<EscalationAction>(&rules)?,
            };

            if issues.is_empty() {
                println!("{}: no problems found", rules);
                return Ok(());
            }
            for issue in &issues {
                println!("{}", issue);
            }
            if strict {
                bail!("{} problem(s) found in {}", issues.len(), rules);
            }
        }
        Commands::Evaluate {
            rules,
            kind,
            subject,
            context,
            policy,
        } => {
            let policy = policy.unwrap_or(settings.policy);
            let loader = RuleLoader::new(settings.strict);
            let subject = read_json(&subject)?;
            let context = context.as_deref().map(read_json).transpose()?;

            log::info!("Evaluating {} rules with policy '{}'", kind, policy);
            let output = match kind {
                RuleKind::Assignment => {
                    let set: RuleSet<AssignmentAction> = loader.load(&rules)?;
                    report(&set, policy, &subject, context.as_ref())?
                }
                RuleKind::Escalation => {
                    let set: RuleSet<EscalationAction> = loader.load(&rules)?;
                    report(&set, policy, &subject, context.as_ref())?
                }
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn check<A: RuleAction>(path: &str) -> anyhow::Result<Vec<String>> {
    let set: RuleSet<A> = RuleLoader::new(false)
        .load(path)
        .with_context(|| format!("Failed to load {}", path))?;
    Ok(validate_rules(&set).iter().map(|i| i.to_string()).collect())
}

fn read_json(path: &str) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path))
}

fn report<A: Serialize>(
    set: &RuleSet<A>,
    policy: MatchPolicy,
    subject: &Value,
    context: Option<&Value>,
) -> anyhow::Result<Value> {
    let matched: Vec<&Rule<A>> = set.select(policy, subject, context);
    Ok(json!({
        "policy": policy,
        "matched": serde_json::to_value(matched)?,
    }))
}
