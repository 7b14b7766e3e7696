//! `dashpub uid`: print the uid a dashboard would be published under.

use anyhow::Result;
use clap::Args;

use dashpub_sync::identifier::{resolve_uid, UidSource};

/// Arguments for `dashpub uid`.
#[derive(Args, Debug)]
pub struct UidArgs {
    /// Dashboard title, used when no uid is given.
    #[arg(long, required_unless_present = "uid")]
    pub title: Option<String>,

    /// Uid carried by the dashboard document.
    #[arg(long)]
    pub uid: Option<String>,

    /// Run-scoped uid suffix (`idSuffix`).
    #[arg(long, allow_hyphen_values = true)]
    pub suffix: Option<String>,
}

impl UidArgs {
    pub fn run(self) -> Result<()> {
        let source = match (self.uid.as_deref(), self.title.as_deref()) {
            (Some(uid), _) if !uid.is_empty() => UidSource::Provided(uid),
            (_, Some(title)) => UidSource::Title(title),
            _ => anyhow::bail!("provide --title or a non-empty --uid"),
        };
        let suffix = self.suffix.as_deref().filter(|s| !s.is_empty());
        println!("{}", resolve_uid(source, suffix));
        Ok(())
    }
}
