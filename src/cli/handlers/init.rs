use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, CONFIG_TEMPLATE};
use crate::io::store::Store;

/// Create the data directory and write the config template.
pub fn cmd_init(data_dir: &Path, args: InitArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(data_dir)?;
    let config_path = config_io::config_path(store.dir());
    let existed = config_path.exists();

    if existed && args.force {
        fs::write(&config_path, CONFIG_TEMPLATE)
            .map_err(|e| format!("could not write {}: {}", config_path.display(), e))?;
    } else {
        config_io::ensure_config(store.dir())?;
    }

    if json {
        let out = serde_json::json!({
            "dataDir": store.dir().display().to_string(),
            "config": config_path.display().to_string(),
            "created": !existed || args.force,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if existed && !args.force {
        println!("already initialized: {}", store.dir().display());
    } else {
        println!("initialized {}", store.dir().display());
        println!("config: {}", config_path.display());
    }
    Ok(())
}
