//! `spick config` — manage the settings file.

use sheetpick_config::WidgetSettings;

use crate::CliError;

pub(crate) fn cmd_init(force: bool) -> Result<(), CliError> {
    let path = WidgetSettings::config_path();
    if path.exists() && !force {
        return Err(CliError::usage(format!("{} already exists", path.display()))
            .with_hint("pass --force to overwrite"));
    }
    WidgetSettings::create_default_file(&path).map_err(CliError::general)?;
    println!("wrote {}", path.display());
    Ok(())
}

pub(crate) fn cmd_path() -> Result<(), CliError> {
    println!("{}", WidgetSettings::config_path().display());
    Ok(())
}
