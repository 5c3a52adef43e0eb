use clap::Parser;
use comm_core::config::Args;
use comm_core::core::lettering::to_custom;
use comm_core::core::ranking::RankedAlgorithm;
use comm_core::persistence::{load_or_default, save_to_disk, SessionState};
use comm_core::{
    CommError, CommutatorLookup, DatasetRepository, LetteringScheme, LookupOutcome, Pattern,
    PieceType,
};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The mutable bits of an interactive session.
struct Session {
    piece_type: PieceType,
    lettering: Option<LetteringScheme>,
    state: SessionState,
    state_path: PathBuf,
}

impl Session {
    fn save(&mut self) {
        self.state.piece_type = Some(self.piece_type);
        self.state.remember_lettering(self.lettering.as_ref());
        if let Err(e) = save_to_disk(&self.state, &self.state_path) {
            warn!("could not save session to {}: {}", self.state_path.display(), e);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so results on stdout stay pipeable
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("comm_finder={0},comm_core={0},warn", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(2);
    }

    let state_path = args.state_path();
    let state = load_or_default(&state_path);
    let piece_type = args
        .piece_type()?
        .or(state.piece_type)
        .unwrap_or(PieceType::Corner);
    let lettering = match args.lettering()? {
        Some(scheme) => Some(scheme),
        None => state.lettering_scheme(),
    };

    let repository = Arc::new(DatasetRepository::new(args.dataset_source()?));
    info!(source = %repository.source().describe(), "dataset source");
    let engine = CommutatorLookup::new(repository);

    let mut session = Session {
        piece_type,
        lettering,
        state,
        state_path,
    };

    match args.query.as_deref() {
        Some(query) => {
            let found = one_shot(&engine, &session, query, args.json).await?;
            if !found {
                std::process::exit(1);
            }
        }
        None => {
            interactive(&engine, &mut session).await?;
        }
    }
    Ok(())
}

async fn one_shot(
    engine: &CommutatorLookup,
    session: &Session,
    query: &str,
    json: bool,
) -> anyhow::Result<bool> {
    match engine
        .query(session.piece_type, query, session.lettering.as_ref())
        .await
    {
        Ok(outcome) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome, session.lettering.as_ref());
            }
            Ok(outcome.is_found())
        }
        Err(e @ (CommError::InvalidQuery { .. } | CommError::InvalidLetter(_))) => {
            eprintln!("{}", e);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn interactive(engine: &CommutatorLookup, session: &mut Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut search = String::new();
    let mut notice: Option<String> = None;

    loop {
        print_ui(engine, session, &search, notice.take()).await?;

        let Some(input) = lines.next_line().await? else {
            break;
        };
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            ":reset" => {
                session.lettering = None;
                session.save();
                notice = Some("Lettering reset to Speffz.".to_string());
            }
            ":types" => {
                let names: Vec<String> = PieceType::ALL
                    .iter()
                    .map(|p| format!("{} ({})", p.resource_name(), p.display_name()))
                    .collect();
                notice = Some(names.join("\n"));
            }
            ":cases" => match engine.cases(session.piece_type).await {
                Ok(cases) => {
                    let letters: Vec<String> = cases
                        .into_iter()
                        .map(|p| to_custom(session.lettering.as_ref(), p))
                        .collect();
                    notice = Some(format!("{} cases: {}", letters.len(), letters.join(" ")));
                }
                Err(e) => notice = Some(e.to_string()),
            },
            s if s.starts_with(":type ") => match s[":type ".len()..].parse::<PieceType>() {
                Ok(piece_type) => {
                    session.piece_type = piece_type;
                    session.save();
                }
                Err(e) => notice = Some(e.to_string()),
            },
            s if s.starts_with(":lettering ") => {
                let value = s[":lettering ".len()..].trim().to_uppercase();
                match LetteringScheme::new(&value) {
                    Ok(scheme) => {
                        session.lettering = Some(scheme).filter(|s| !s.is_canonical());
                        session.save();
                    }
                    Err(e) => notice = Some(e.to_string()),
                }
            }
            s => {
                search = s.to_string();
            }
        }
    }

    println!("\nSaving session...");
    session.save();
    Ok(())
}

async fn print_ui(
    engine: &CommutatorLookup,
    session: &Session,
    search: &str,
    notice: Option<String>,
) -> anyhow::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Commutator finder".bold());
    println!("---------------------------------------------------------------");
    println!("Type three letters to search. ':type <piece>', ':types', ':cases',");
    println!("':lettering <24 letters>', ':reset'. 'exit' to save and quit.\n");
    println!(
        "Piece type: {}   Lettering: {}",
        session.piece_type.display_name().cyan(),
        session
            .lettering
            .as_ref()
            .filter(|l| !l.is_canonical())
            .map(|l| l.to_string())
            .unwrap_or_else(|| "Speffz".to_string())
            .cyan()
    );

    if let Some(notice) = notice {
        println!("\n{}", notice.yellow());
    }

    if !search.is_empty() {
        println!("\nSearch: [{}]\n", search);
        match engine
            .query(session.piece_type, search, session.lettering.as_ref())
            .await
        {
            Ok(outcome) => print_outcome(&outcome, session.lettering.as_ref()),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    print!("\n> ");
    out.flush()?;
    Ok(())
}

fn print_outcome(outcome: &LookupOutcome, lettering: Option<&LetteringScheme>) {
    let result = match outcome {
        LookupOutcome::Found(result) => result,
        LookupOutcome::NotFound { .. } => {
            println!("not found");
            return;
        }
    };

    if let Some(algs) = &result.direct {
        print_side(&result.label, result.queried, result.piece_type, lettering, algs);
    }
    if let Some(algs) = &result.inverse {
        let title = format!("{} (inverse)", result.inverse_label);
        print_side(&title, result.inverse_queried, result.piece_type, lettering, algs);
    }
}

fn print_side(
    title: &str,
    pattern: Pattern,
    piece_type: PieceType,
    lettering: Option<&LetteringScheme>,
    algs: &[RankedAlgorithm],
) {
    println!(
        "{}  {}",
        title.bold(),
        format!("{} / {}", to_custom(lettering, pattern), pattern.notation(piece_type)).dark_grey()
    );
    for alg in algs {
        println!(
            "  {} {}",
            alg.alg.as_str().cyan(),
            format!("({} user{})", alg.user_count, plural(alg.user_count)).dark_grey()
        );
        for variant in &alg.variants {
            let users: Vec<String> = variant
                .users
                .iter()
                .map(|u| {
                    let sources: Vec<String> = u.sources.iter().map(|s| s.label()).collect();
                    format!("{} [{}]", u.name, sources.join("; "))
                })
                .collect();
            println!("      {:<40} {}", variant.variant, users.join(", "));
            if let Some(notes) = &variant.notes {
                println!("        {}", notes.as_str().italic());
            }
        }
    }
    println!();
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
