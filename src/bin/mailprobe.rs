use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};

use mailprobe::{ProbeOptions, ProbeReport, ProxyEndpoint, check_mailbox};

/// Check whether a mailbox accepts mail, without delivering a message.
#[derive(Parser)]
#[command(name = "mailprobe")]
struct Cli {
    /// address to probe (local@domain)
    email: Option<String>,

    /// log every SMTP exchange to stderr
    #[arg(short, long)]
    verbose: bool,

    /// SOCKS5 proxy: host:port or scheme://host:port
    #[arg(long)]
    proxy: Option<String>,

    /// envelope sender used in MAIL FROM
    #[arg(long = "from", default_value = "test@example.com")]
    sender: String,

    /// identity announced in EHLO
    #[arg(long, default_value = "example.com")]
    helo: String,

    /// per-connection timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// output format: human|json
    #[arg(long, default_value = "json")]
    format: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(email) = cli.email.as_deref().filter(|email| email.contains('@')) else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let proxy = cli
        .proxy
        .as_deref()
        .map(|raw| ProxyEndpoint::from_str(raw).with_context(|| format!("parse --proxy '{raw}'")))
        .transpose()?;
    if let Some(endpoint) = &proxy {
        tracing::debug!(%endpoint, "probing through proxy");
    }

    let timeout = Duration::from_secs(cli.timeout);
    let options = ProbeOptions {
        sender: cli.sender.clone(),
        helo_domain: cli.helo.clone(),
        proxy,
        connect_timeout: timeout,
        command_timeout: timeout,
        ..ProbeOptions::default()
    };

    let report = check_mailbox(email, &options).with_context(|| format!("probe of {email}"))?;

    match cli.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "human" => print_human(&report),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
    Ok(())
}

fn print_human(report: &ProbeReport) {
    println!("server online:        {}", yes_no(report.server_is_online));
    if let Some(greeting) = &report.server_helo_response {
        println!("greeting:             {greeting}");
    }
    println!("address syntax valid: {}", yes_no(report.address));
    if report.mx_exists {
        println!("mx records:           {}", report.mx_domains.join(", "));
    } else {
        println!("mx records:           none");
    }
    println!("address exists:       {}", yes_no(report.address_exists));
    println!(
        "catch-all suspected:  {}",
        yes_no(report.wrong_address_accepted)
    );
    if !report.mail_from_response.is_empty() {
        println!("mail from reply:      {}", report.mail_from_response);
    }
    if !report.rcpt_to_response.is_empty() {
        println!("rcpt to reply:        {}", report.rcpt_to_response);
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
