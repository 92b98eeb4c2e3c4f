use {
    anyhow::{Result, bail},
    clap::Args,
    servicegenius_auth::{TokenCodec, User},
    servicegenius_config::ServiceGeniusConfig,
};

#[derive(Args)]
pub struct TokenArgs {
    /// Sign a session for the demo user.
    #[arg(long)]
    demo: bool,
}

/// Print a session token signed with the configured secret, usable as the
/// `token` cookie when poking the API by hand.
pub fn handle_token(args: TokenArgs, config: &ServiceGeniusConfig) -> Result<()> {
    if !args.demo {
        bail!("only demo tokens can be issued from the command line; pass --demo");
    }
    let ttl = chrono::Duration::hours(i64::from(config.auth.session_ttl_hours));
    let codec = TokenCodec::new(&config.auth.jwt_secret, ttl)?;
    println!("{}", codec.sign(&User::demo())?);
    Ok(())
}
