use clap::Parser;
use rank_crawler::deploy::{deployment_instructions, DeployPreparer, DEFAULT_COMMIT_MESSAGE};
use rank_crawler::utils::logger;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "prepare-deploy")]
#[command(about = "Initialise git, write .gitignore and commit for deployment")]
struct DeployArgs {
    /// Project directory
    #[arg(default_value = ".")]
    dir: PathBuf,

    #[arg(short, long, default_value = DEFAULT_COMMIT_MESSAGE)]
    message: String,

    #[arg(long, default_value = "git")]
    git: String,

    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = DeployArgs::parse();
    logger::init_cli_logger(args.verbose);

    let preparer = DeployPreparer::new(&args.dir)
        .with_git_program(args.git)
        .with_commit_message(args.message);

    match preparer.prepare() {
        Ok(outcome) => {
            if outcome.initialized_repo {
                println!("📁 Initialized git repository");
            }
            if outcome.wrote_gitignore {
                println!("📝 Created .gitignore");
            }
            if outcome.committed {
                println!("✅ Changes committed");
            } else {
                println!("✅ Nothing to commit, working tree already recorded");
            }
            println!();
            println!("{}", deployment_instructions());
        }
        Err(e) => {
            tracing::error!("❌ Deployment preparation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code().max(1));
        }
    }
}
