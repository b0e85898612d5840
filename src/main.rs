use clap::Parser;

use mydig::dns::{Resolver, ResolverConfig};

// mydig walks the DNS hierarchy itself instead of asking a recursive
// resolver: the query starts at the root servers and follows referrals
// down to the authoritative answer, optionally proving the DNSSEC chain of
// trust along the way.
#[derive(Parser)]
#[command(name = "mydig", version, about = "An iterative DNS resolver with DNSSEC validation")]
struct Cli {
    /// Hostname to resolve (URL dressing like https:// or www. is stripped)
    hostname: String,

    /// Record type to ask for: A, NS or MX
    #[arg(value_name = "TYPE")]
    record_type: String,

    /// Validate the DNSSEC chain of trust for the answer
    #[arg(long)]
    dnssec: bool,

    /// Print walk and validation diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let config = ResolverConfig {
        dnssec: cli.dnssec,
        ..ResolverConfig::default()
    };
    let mut resolver = Resolver::new(config);

    match resolver.resolve(&cli.hostname, &cli.record_type) {
        Ok(resolution) => println!("{}", resolution),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}
