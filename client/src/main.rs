use std::{io::Write as _, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use directory_client::{
    Dashboard, DepartmentFilter, HttpRosterSource,
    input::{HELP, Input},
    render::Renderer,
};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "directory", version, about = "Browse the employee directory")]
struct Cli {
    /// Root or list endpoint of the directory service.
    #[arg(
        long,
        env = "DIRECTORY_API_URL",
        default_value = "http://localhost:8000/api/users"
    )]
    url: String,
    /// Initial search term (matches name or role).
    #[arg(long, default_value = "")]
    search: String,
    /// Initial department, or `All`.
    #[arg(long, default_value = DepartmentFilter::ALL_LABEL)]
    department: String,
    /// Print one view and exit instead of reading commands.
    #[arg(long)]
    once: bool,
    #[arg(long)]
    no_color: bool,
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::client())?;
    let cli = Cli::parse();
    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let source = HttpRosterSource::new(cli.url, Duration::from_secs(cli.timeout_secs))
        .context("failed to build HTTP client")?;
    let renderer = Renderer::new(!cli.no_color);

    let mut dashboard = Dashboard::mount(source);
    dashboard.set_search(cli.search);
    dashboard.select_department(DepartmentFilter::parse(&cli.department));

    if dashboard.is_loading() {
        print!("{}", renderer.render(&dashboard.screen()));
    }
    dashboard.settled().await;
    print!("{}", renderer.render(&dashboard.screen()));

    if cli.once {
        dashboard.unmount();
        return Ok(());
    }

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let input = Input::parse(&line);
        match &input {
            Input::Help => println!("{HELP}"),
            Input::Departments => print!("{}", renderer.departments(&dashboard.screen())),
            Input::Unknown(raw) => println!("unknown command `{raw}`; type `help`"),
            _ => {}
        }
        let rerender = matches!(input, Input::Search(_) | Input::Department(_) | Input::Reset);
        if !input.apply(&mut dashboard) {
            break;
        }
        if rerender {
            print!("{}", renderer.render(&dashboard.screen()));
        }
    }

    dashboard.unmount();
    Ok(())
}
