use std::io::Write as _;
use std::sync::Arc;

use uuid::Uuid;

use agrilink::auth::StaticAccount;
use agrilink::config::AppConfig;
use agrilink::directory::{AdministrativeUnit, Level};
use agrilink::onboarding::{LookupOutcome, OnboardingSession};
use agrilink::roles::{Field, Role};
use agrilink::secure::FileSecureStore;
use agrilink::store::{catalog, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("🌾 AgriLink onboarding v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());

    let backend = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);
    if backend.count_units().await? == 0 {
        eprintln!("   Seeding demo administrative catalog");
        backend.seed_units(&catalog::demo_units()).await?;
    }

    let email = std::env::var("AGRILINK_EMAIL").unwrap_or_else(|_| "demo@agrilink.app".into());
    let account_id = std::env::var("AGRILINK_ACCOUNT_ID")
        .ok()
        .and_then(|s| Uuid::parse_str(&s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let accounts = Arc::new(StaticAccount::new(account_id, &email));
    let secure = Arc::new(FileSecureStore::new(&config.secure_store_path));

    let session = OnboardingSession::start(
        backend.clone(),
        backend.clone(),
        accounts,
        secure,
    )
    .await?;

    eprintln!("   Account: {account_id} <{email}>\n");

    // ── Role ─────────────────────────────────────────────────────────
    let roles = Role::ALL;
    for (i, role) in roles.iter().enumerate() {
        eprintln!("  {}. {role}", i + 1);
    }
    let role = roles[pick("Select your role", roles.len())?];
    session.set_role(role).await?;

    // ── Location ─────────────────────────────────────────────────────
    if role.requires_location() {
        for level in Level::ALL {
            let options = loop {
                match session.load_options(level).await? {
                    LookupOutcome::Options(options) => break options,
                    LookupOutcome::Superseded => continue,
                }
            };
            if options.is_empty() {
                anyhow::bail!("No {level} options available — catalog incomplete");
            }
            let unit = choose_unit(level, &options)?;
            session.set_location(level, &unit.name).await?;
        }
    }

    // ── Details ──────────────────────────────────────────────────────
    if role.requires(Field::FullName) {
        session
            .set_detail(Field::FullName, read_line("Full name")?)
            .await?;
    }
    if role.requires(Field::RegistrationNumber) {
        session
            .set_detail(Field::RegistrationNumber, read_line("Registration number")?)
            .await?;
    }
    if role.requires(Field::OrganizationName) {
        session
            .set_detail(Field::OrganizationName, read_line("Organization name")?)
            .await?;
    }

    // ── Submit ───────────────────────────────────────────────────────
    match session.submit().await {
        Ok(record) => {
            eprintln!("\n✅ Profile committed");
            eprintln!("{}", serde_json::to_string_pretty(&record)?);
        }
        Err(e) => {
            eprintln!("\n❌ Submission failed: {e}");
            eprintln!("   Your entries are preserved — correct and resubmit.");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn choose_unit<'a>(
    level: Level,
    options: &'a [AdministrativeUnit],
) -> anyhow::Result<&'a AdministrativeUnit> {
    eprintln!();
    for (i, unit) in options.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, unit.name);
    }
    Ok(&options[pick(&format!("Select {level}"), options.len())?])
}

/// Prompt until the user enters a number in `1..=max`; returns the index.
fn pick(prompt: &str, max: usize) -> anyhow::Result<usize> {
    loop {
        let line = read_line(&format!("{prompt} [1-{max}]"))?;
        match line.parse::<usize>() {
            Ok(n) if (1..=max).contains(&n) => return Ok(n - 1),
            _ => eprintln!("Enter a number between 1 and {max}"),
        }
    }
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{prompt}: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
