// SmartMark platform paths for Windows
// Config and data: %APPDATA%/SmartMark

use std::env;
use std::path::PathBuf;

/// `%APPDATA%/SmartMark`
pub fn get_config_dir() -> PathBuf {
    let appdata =
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("SmartMark")
}

/// `%APPDATA%/SmartMark`
pub fn get_data_dir() -> PathBuf {
    get_config_dir()
}
