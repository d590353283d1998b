use anyhow::Result;
use pm_cli::{init_tracing, Cli, Parser};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = cli.connection.connect()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli.command.run(&client, &cli.connection.server_url, &mut out)
}
