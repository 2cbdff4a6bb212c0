// src/main.rs

use sudoku_server::{cli, logging, run};

#[actix_web::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("sudoku-server error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await?;
    Ok(())
}
