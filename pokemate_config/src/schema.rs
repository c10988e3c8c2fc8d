use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscordConfig {
    /// Bot token; the `DISCORD_TOKEN` environment variable overrides it.
    #[serde(default)]
    pub token: String,
    #[serde(default = "DiscordConfig::default_automation_ids")]
    pub automation_ids: Vec<u64>,
    #[serde(default = "DiscordConfig::default_prefix")]
    pub prefix: String,
    #[serde(default = "DiscordConfig::default_admin_roles")]
    pub admin_roles: Vec<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            automation_ids: Self::default_automation_ids(),
            prefix: Self::default_prefix(),
            admin_roles: Self::default_admin_roles(),
        }
    }
}

impl DiscordConfig {
    fn default_automation_ids() -> Vec<u64> {
        vec![716_390_085_896_962_058]
    }

    fn default_prefix() -> String {
        "F!".to_string()
    }

    fn default_admin_roles() -> Vec<String> {
        vec![
            "Admin".to_string(),
            "Moderator".to_string(),
            "PoketwoHelper".to_string(),
        ]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    #[serde(default = "HealthConfig::default_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            port: Self::default_port(),
        }
    }
}

impl HealthConfig {
    const fn default_port() -> u16 {
        8080
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatcherConfig {
    /// Seconds a spawn entry stays live before the sweep drops it.
    #[serde(default = "WatcherConfig::default_spawn_ttl_secs")]
    pub spawn_ttl_secs: i64,
    #[serde(default = "WatcherConfig::default_spawn_sweep_secs")]
    pub spawn_sweep_secs: u64,
    #[serde(default = "WatcherConfig::default_reminder_sweep_secs")]
    pub reminder_sweep_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            spawn_ttl_secs: Self::default_spawn_ttl_secs(),
            spawn_sweep_secs: Self::default_spawn_sweep_secs(),
            reminder_sweep_secs: Self::default_reminder_sweep_secs(),
        }
    }
}

impl WatcherConfig {
    const fn default_spawn_ttl_secs() -> i64 {
        300
    }

    const fn default_spawn_sweep_secs() -> u64 {
        30
    }

    const fn default_reminder_sweep_secs() -> u64 {
        60
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'pokemate init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let mut config: Self = serde_json::from_str(&content)?;

        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            if !token.is_empty() {
                debug!("Using bot token from DISCORD_TOKEN");
                config.discord.token = token;
            }
        }

        Ok(config)
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("pokemate");

        Ok(config_dir.join("config.json"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("pokemate");

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "discord": {
    "token": "your-discord-bot-token-here",
    "automation_ids": [716390085896962058],
    "prefix": "F!",
    "admin_roles": ["Admin", "Moderator", "PoketwoHelper"]
  },
  "health": {
    "port": 8080
  },
  "watcher": {
    "spawn_ttl_secs": 300,
    "spawn_sweep_secs": 30,
    "reminder_sweep_secs": 60
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Discord bot token");
        println!("      (or export DISCORD_TOKEN to override it)");
        println!("   2. Invite the bot to your server with the message content intent enabled");
        println!("   3. Run 'pokemate run' to start the companion");
        println!();
        println!("🔧 Configuration options:");
        println!("   - automation_ids: accounts whose messages are observed for listings");
        println!("   - prefix: command prefix users type (default F!)");
        println!("   - admin_roles: role names allowed to schedule reminders");
        println!();
        Ok(())
    }
}
