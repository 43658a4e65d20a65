//! CLI application for controlling TP-Link bulbs.
//!
//! This example demonstrates a command-line interface covering the
//! library's operations, including a wake-up sunrise built from long
//! transitions.
//!
//! Run with: cargo run --example tplight_cli -- --help

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use tplight_rs::{Bulb, Field, LightStateChange, Mode, TransitionTarget};

#[derive(Parser)]
#[command(name = "tplight-cli")]
#[command(about = "Control TP-Link smart bulbs from the command line", long_about = None)]
struct Cli {
    /// IP address of the bulb
    #[arg(short, long, global = true)]
    ip: Option<String>,

    /// Transition period in milliseconds for this command (0-100000)
    #[arg(short = 'p', long, global = true)]
    transition_period: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get the current status of the bulb
    Status,

    /// Read one field (power, hue, saturation, brightness, color_temperature, mode, transition_period, alias)
    Get { field: Field },

    /// Turn the bulb on
    On,

    /// Turn the bulb off
    Off,

    /// Toggle the bulb on/off
    Toggle,

    /// Set hue and saturation
    Color {
        /// Hue angle (0-360)
        hue: u16,
        /// Saturation (0-100)
        saturation: u8,
    },

    /// Set brightness (1-100)
    Brightness { level: u8 },

    /// Move brightness relative to the current value
    Offset {
        #[arg(allow_negative_numbers = true)]
        offset: i16,
    },

    /// Set color temperature in Kelvin (2500-9000)
    Temperature { kelvin: u16 },

    /// Set the light mode (normal, circadian)
    Mode { mode: Mode },

    /// Pulse the brightness once
    Pulse {
        /// Duration of each half of the pulse in milliseconds
        #[arg(short, long, default_value = "1000")]
        duration: u32,
        /// Brightness difference at the peak
        #[arg(short, long, default_value = "30", allow_negative_numbers = true)]
        diff: i16,
    },

    /// Reboot the bulb
    Reboot,

    /// Set the bulb alias
    Alias { alias: String },

    /// Show the bulb clock, or set it (format: 2024-05-17T06:30:00)
    Time { set: Option<NaiveDateTime> },

    /// Show the timezone index, or set it (0-109)
    Timezone { set: Option<u8> },

    /// Fade to the given values over a long duration
    Fade {
        /// Duration in seconds
        seconds: u64,
        #[arg(short, long)]
        brightness: Option<i64>,
        #[arg(short, long)]
        temperature: Option<i64>,
        #[arg(long)]
        hue: Option<i64>,
        #[arg(long)]
        saturation: Option<i64>,
    },

    /// Wake-up sunrise: warm and dim to the given brightness and temperature
    Sunrise {
        /// Minutes until wake-up
        minutes: u64,
        #[arg(short = 'b', long, default_value = "60")]
        max_brightness: i64,
        #[arg(short = 't', long, default_value = "3600")]
        max_temperature: i64,
    },

    /// Get detailed diagnostics
    Diagnostics,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let ip = cli
        .ip
        .ok_or("IP address is required. Use --ip <IP>")?;
    let mut bulb = Bulb::connect(&ip).await?;

    if let Some(period) = cli.transition_period {
        bulb.set_transition_period(period)?;
    }

    match cli.command {
        Commands::Status => {
            println!("{bulb}");
            let status = bulb.status().await?;
            println!("\nStatus:\n{}", serde_json::to_string_pretty(&status)?);
        }

        Commands::Get { field } => {
            println!("{field}: {:?}", bulb.get(field).await?);
        }

        Commands::On => {
            bulb.on().await?;
            println!("Bulb turned ON");
        }

        Commands::Off => {
            bulb.off().await?;
            println!("Bulb turned OFF");
        }

        Commands::Toggle => {
            bulb.toggle().await?;
            println!(
                "Bulb toggled {}",
                if bulb.state().is_on() { "ON" } else { "OFF" }
            );
        }

        Commands::Color { hue, saturation } => {
            let mut change = LightStateChange::new();
            change.hue(hue).saturation(saturation);
            bulb.apply(&change, false).await?;
            println!("Color set to hue {hue}, saturation {saturation}");
        }

        Commands::Brightness { level } => {
            bulb.set_brightness(level).await?;
            println!("Brightness set to {level}%");
        }

        Commands::Offset { offset } => {
            bulb.offset_brightness(offset).await?;
            println!("Brightness now {}%", bulb.state().brightness().value());
        }

        Commands::Temperature { kelvin } => {
            bulb.set_color_temperature(kelvin).await?;
            println!("Temperature set to {kelvin}K");
        }

        Commands::Mode { mode } => {
            bulb.set_mode(mode).await?;
            println!("Mode set to {mode}");
        }

        Commands::Pulse { duration, diff } => {
            bulb.pulse(duration, diff).await?;
            println!("Pulse done");
        }

        Commands::Reboot => {
            bulb.reboot().await?;
            println!("Bulb rebooting");
        }

        Commands::Alias { alias } => {
            bulb.set_alias(&alias).await?;
            println!("Alias set to {alias:?}");
        }

        Commands::Time { set } => {
            if let Some(time) = set {
                bulb.set_time(&time).await?;
            }
            println!("Bulb time: {}", bulb.time().await?);
        }

        Commands::Timezone { set } => {
            if let Some(index) = set {
                bulb.set_timezone(index).await?;
            }
            println!("Bulb timezone index: {}", bulb.timezone().await?.index());
        }

        Commands::Fade {
            seconds,
            brightness,
            temperature,
            hue,
            saturation,
        } => {
            let mut target = TransitionTarget::new();
            if let Some(v) = brightness {
                target = target.brightness(v);
            }
            if let Some(v) = temperature {
                target = target.color_temperature(v);
            }
            if let Some(v) = hue {
                target = target.hue(v);
            }
            if let Some(v) = saturation {
                target = target.saturation(v);
            }
            let duration = seconds
                .checked_mul(1000)
                .ok_or("fade duration is too long")?;
            println!("Fading over {seconds}s...");
            bulb.long_transition(&target, duration).await?;
            println!("{bulb}");
        }

        Commands::Sunrise {
            minutes,
            max_brightness,
            max_temperature,
        } => {
            let duration = minutes
                .checked_mul(60 * 1000)
                .ok_or("sunrise duration is too long")?;
            let warmest = i64::from(tplight_rs::ColorTemperature::MIN);

            println!("Sunrise over {minutes} minutes...");
            // 50% / 35% / 15% of the duration; 35% is 7/20 without the wide multiply.
            let dawn = duration / 2;
            let morning = duration / 20 * 7 + duration % 20 * 7 / 20;
            let stages = [
                (dawn, 1, warmest),
                (
                    morning,
                    max_brightness / 2,
                    (max_temperature + warmest) / 2,
                ),
                (
                    duration - dawn - morning,
                    max_brightness,
                    max_temperature,
                ),
            ];
            for (millis, brightness, kelvin) in stages {
                let target = TransitionTarget::new()
                    .brightness(brightness)
                    .color_temperature(kelvin);
                bulb.long_transition(&target, millis).await?;
                println!("  {bulb}");
            }
        }

        Commands::Diagnostics => {
            println!(
                "\nDiagnostics:\n{}",
                serde_json::to_string_pretty(&bulb.diagnostics())?
            );
        }
    }

    Ok(())
}
