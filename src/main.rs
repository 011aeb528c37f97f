use clap::{ArgAction, Parser, ValueEnum};
use newsrelay::{
    DEFAULT_MAX_ARTICLE_SIZE, DEFAULT_POLICY_FILE, DEFAULT_PROXY, DEFAULT_SERVER, Denylist,
    Endpoint, GpgDecryptor, InputMode, Relay, RelayConfig, ResultExt,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Input {
    /// Standard input is the article itself
    Plain,
    /// Standard input is a mail with an armored PGP block
    Encrypted,
}

#[derive(Parser, Debug)]
#[command(
    name = "newsrelay",
    version,
    about = "Post one article from stdin to Usenet through a SOCKS5 proxy"
)]
struct Args {
    /// Policy file with `blocked_headers`; missing means nothing is blocked
    #[arg(long, default_value = DEFAULT_POLICY_FILE)]
    config: PathBuf,
    /// NNTP server, host:port
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: Endpoint,
    /// SOCKS5 proxy, host:port
    #[arg(long, default_value = DEFAULT_PROXY)]
    proxy: Endpoint,
    /// Largest article accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_ARTICLE_SIZE)]
    max_size: usize,
    /// What standard input carries
    #[arg(long, value_enum, default_value_t = Input::Plain)]
    input: Input,
    /// gpg program used in encrypted mode
    #[arg(long, default_value = "gpg")]
    gpg: PathBuf,
    /// File holding the secret key passphrase
    #[arg(long)]
    passphrase_file: Option<PathBuf>,
    /// Seconds allowed to reach the server through the proxy (0 = no limit)
    #[arg(long, default_value_t = 120)]
    connect_timeout: u64,
    /// Seconds allowed per server response (0 = no limit)
    #[arg(long, default_value_t = 0)]
    read_timeout: u64,
    /// More logging on stderr (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn echo(out: &mut impl Write, line: &str) -> std::io::Result<()> {
    out.write_all(line.as_bytes())?;
    out.flush()
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "newsrelay=debug",
        _ => "newsrelay=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> newsrelay::Result<String> {
    let denylist = Denylist::load(&args.config).context("error loading config")?;

    let config = RelayConfig::default()
        .with_server(args.server)
        .with_proxy(args.proxy)
        .with_max_article_size(args.max_size)
        .with_input(match args.input {
            Input::Plain => InputMode::Plain,
            Input::Encrypted => InputMode::Encrypted,
        })
        .with_timeouts(seconds(args.connect_timeout), seconds(args.read_timeout));

    let mut gpg = GpgDecryptor::new(args.gpg);
    if let Some(path) = args.passphrase_file {
        gpg = gpg.with_passphrase_file(path);
    }

    let input = newsrelay::read_stdin().await?;
    let relay = Relay::new(config, denylist, gpg);
    let response = relay.run(&input).await?;
    Ok(response.raw)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(line) => match echo(&mut std::io::stdout().lock(), &line) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: article posted but response not written: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
