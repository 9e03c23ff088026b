use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_file_exists};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    let data_dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let conn = get_connection(&data_dir.join("tally.db"))?;
    init_db(&conn)?;

    // Seed empty config inputs so the user has files to edit.
    let rules_path = data_dir.join("tag_rules.json");
    if !rules_path.exists() {
        std::fs::write(&rules_path, "[]\n")?;
    }
    let words_path = data_dir.join("sensitive_words.json");
    if !words_path.exists() {
        std::fs::write(&words_path, "{}\n")?;
    }

    let first_run = !settings_file_exists();
    save_settings(&settings)?;

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", data_dir.join("tally.db").display());
    println!("Tag rules:  {}", rules_path.display());
    if first_run {
        println!();
        println!("Next: `tally import <file> --source bank|wallet_a|wallet_b --period YYYYMM`");
    }
    Ok(())
}
