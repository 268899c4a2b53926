//! Demo command
//!
//! Usage: viewfilter demo --view <VIEW>... [--profile <PROFILE>]

use clap::{Args, ValueEnum};
use viewfilter_core::demo::UserDomain;
use viewfilter_core::logging_facility::{init, Profile};
use viewfilter_core::{render_value, ViewFilter};

use super::canonical_view_name;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogProfile {
    /// Human-readable logs on stderr
    Development,
    /// JSON logs on stderr
    Production,
}

impl From<LogProfile> for Profile {
    fn from(profile: LogProfile) -> Self {
        match profile {
            LogProfile::Development => Profile::Development,
            LogProfile::Production => Profile::Production,
        }
    }
}

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// View to request (repeatable, case-insensitive)
    #[arg(short, long = "view", required = true)]
    pub views: Vec<String>,

    /// Logging profile
    #[arg(long, value_enum, default_value = "development")]
    pub profile: LogProfile,

    /// Username of the demo user
    #[arg(long, default_value = "alice")]
    pub username: String,

    /// Password of the demo user
    #[arg(long, default_value = "s3cret")]
    pub password: String,

    /// Email of the demo user
    #[arg(long, default_value = "alice@example.com")]
    pub email: String,
}

/// Execute demo command
pub fn execute(args: DemoArgs) -> Result<(), Box<dyn std::error::Error>> {
    init(args.profile.into());

    let domain = UserDomain::new()?;
    let user = domain.new_user(&args.username, &args.password, &args.email)?;

    let mut builder = ViewFilter::builder(domain.schema.clone(), domain.lattice.clone())
        .for_class(domain.user);
    for view in &args.views {
        builder = builder.use_view_named(canonical_view_name(&domain.lattice, view));
    }
    let filter = builder.build()?;

    let projected = filter.apply_to(&user)?;

    println!("original:  {}", render_value(domain.schema.as_ref(), &user)?);
    println!("projected: {}", render_value(domain.schema.as_ref(), &projected)?);

    Ok(())
}
