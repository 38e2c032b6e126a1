use anyhow::{Context, Result};
use clap::Parser;

use keyecho::cli::CliArgs;
use keyecho::config;
use keyecho::inject;
use keyecho::profile::MacroProfile;
use keyecho::runtime::Agent;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    keyecho::tracing::init();

    if args.list_keys {
        print_known_keys();
        return Ok(());
    }

    let forced = args
        .forced_backend()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid --backend")?;

    let settings = config::load_settings(args.settings.as_deref()).into_shared();

    let profile = match args
        .profile
        .clone()
        .or_else(keyecho::config_paths::profile_file)
    {
        Some(path) if path.exists() => MacroProfile::load(&path)
            .with_context(|| format!("loading profile {}", path.display()))?,
        Some(path) => {
            tracing::warn!(path = %path.display(), "profile file not found, starting with no bindings");
            MacroProfile::empty()
        }
        None => {
            tracing::warn!("no config directory available, starting with no bindings");
            MacroProfile::empty()
        }
    };

    let backend = inject::select_backend(forced);
    let agent = Agent::new(settings, profile, backend);

    let (tx, rx) = std::sync::mpsc::channel();

    #[cfg(windows)]
    {
        keyecho::capture::spawn(tx);
    }
    #[cfg(not(windows))]
    {
        // No capture source on this platform; keep the sender alive so the
        // agent idles instead of exiting, ready for a programmatic driver.
        tracing::warn!("no input capture on this platform; agent will idle");
        std::mem::forget(tx);
    }

    agent.run(rx);
    Ok(())
}

fn print_known_keys() {
    // The scan-code table is the authority on what a sequence may target.
    let names = [
        "a-z", "0-9", "f1-f12", "numpad0-numpad9", "numpad_add", "numpad_subtract",
        "numpad_multiply", "numpad_divide", "numpad_decimal", "numpad_enter", "space", "enter",
        "tab", "backspace", "escape", "up", "down", "left", "right", "home", "end", "pageup",
        "pagedown", "insert", "delete", "minus", "equals", "lbracket", "rbracket", "semicolon",
        "apostrophe", "grave", "backslash", "comma", "period", "slash", "lshift", "rshift",
        "lctrl", "rctrl", "lalt", "ralt", "lwin", "rwin", "capslock", "numlock", "scrolllock",
    ];
    println!("Keys usable in sequence steps:");
    for name in names {
        println!("  {}", name);
    }
}
