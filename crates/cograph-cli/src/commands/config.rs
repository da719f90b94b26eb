//! Config command implementation.
//!
//! Manages CLI configuration.

use anyhow::Result;

use crate::config::Config;

const KEYS: &str = "width, height, tick-ms, emit-every";

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("cograph Configuration");
    println!("{:-<40}", "");

    println!("Width:          {}", config.width);
    println!("Height:         {}", config.height);
    println!(
        "Tick interval:  {}",
        if config.tick_ms == 0 {
            "immediate".to_string()
        } else {
            format!("{} ms", config.tick_ms)
        }
    );
    println!("Emit every:     {} ticks", config.emit_every);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value.
pub fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    apply(config, key, value)?;
    config.save()?;
    println!("Set {} to: {}", key, value);
    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "width" | "height" => {
            let size: f64 = value.parse()?;
            if !(size.is_finite() && size > 0.0) {
                anyhow::bail!("{} must be a positive number, got {}", key, value);
            }
            if key == "width" {
                config.width = size;
            } else {
                config.height = size;
            }
        }
        "tick-ms" => {
            config.tick_ms = value.parse()?;
        }
        "emit-every" => {
            let every: usize = value.parse()?;
            if every == 0 {
                anyhow::bail!("emit-every must be at least 1");
            }
            config.emit_every = every;
        }
        _ => {
            anyhow::bail!("Unknown config key: {}. Valid keys: {}", key, KEYS);
        }
    }
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    let value = match key {
        "width" => config.width.to_string(),
        "height" => config.height.to_string(),
        "tick-ms" => config.tick_ms.to_string(),
        "emit-every" => config.emit_every.to_string(),
        _ => {
            anyhow::bail!("Unknown config key: {}. Valid keys: {}", key, KEYS);
        }
    };

    println!("{}", value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
