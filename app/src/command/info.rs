use pokemate_config::Config;

/// Strategy for displaying configuration information.
///
/// This strategy outputs the loaded configuration including:
/// - Bot token (masked)
/// - Watched automation accounts and command prefix
/// - Admin role names
/// - Health endpoint port and sweep timings
///
/// # Design
/// - Static dispatch: All method calls are monomorphized
/// - Stateless: No internal state
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== pokemate Configuration ===\n");

        println!("Discord:");
        println!("  Token: {}", mask_token(&config.discord.token));
        println!("  Prefix: {}", config.discord.prefix);
        let ids: Vec<String> = config
            .discord
            .automation_ids
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  Automation Accounts: {}", ids.join(", "));
        if config.discord.admin_roles.is_empty() {
            println!("  Admin Roles: (empty - admin commands disabled)");
        } else {
            println!("  Admin Roles: {}", config.discord.admin_roles.join(", "));
        }
        println!();

        println!("Health:");
        println!("  Port: {}", config.health.port);
        println!();

        println!("Watcher:");
        println!("  Spawn TTL: {}s", config.watcher.spawn_ttl_secs);
        println!("  Spawn Sweep: every {}s", config.watcher.spawn_sweep_secs);
        println!(
            "  Reminder Sweep: every {}s",
            config.watcher.reminder_sweep_secs
        );

        Ok(())
    }
}

fn mask_token(token: &str) -> String {
    if token.is_empty() {
        "(not set)".to_string()
    } else if token.len() > 8 {
        format!("{}...***", &token[..8])
    } else {
        "***".to_string()
    }
}
