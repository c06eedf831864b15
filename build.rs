use std::{
    env, fs,
    io::Result,
    path::{Path, PathBuf},
};

use clap::CommandFactory;
use clap_complete::{generate_to, shells::Shell};

#[allow(dead_code)]
#[path = "src/options/args.rs"]
mod args;

use args::BatmonArgs;

fn create_dir(dir: &Path) -> Result<()> {
    let res = fs::create_dir_all(dir);
    if let Err(err) = &res {
        eprintln!(
            "Failed to create a directory at location {dir:?}, encountered error {err:?}. Aborting...",
        );
    }

    res
}

fn main() -> Result<()> {
    const COMPLETION_DIR: &str = "./target/tmp/batmon/completion/";
    const MANPAGE_DIR: &str = "./target/tmp/batmon/manpage/";

    match env::var_os("BATMOND_GENERATE") {
        Some(var) if !var.is_empty() => {
            let completion_out_dir = PathBuf::from(COMPLETION_DIR);
            let manpage_out_dir = PathBuf::from(MANPAGE_DIR);

            create_dir(&completion_out_dir)?;
            create_dir(&manpage_out_dir)?;

            // Generate completions
            let mut app = BatmonArgs::command();
            generate_to(Shell::Bash, &mut app, "batmond", &completion_out_dir)?;
            generate_to(Shell::Zsh, &mut app, "batmond", &completion_out_dir)?;
            generate_to(Shell::Fish, &mut app, "batmond", &completion_out_dir)?;
            generate_to(Shell::PowerShell, &mut app, "batmond", &completion_out_dir)?;
            generate_to(Shell::Elvish, &mut app, "batmond", &completion_out_dir)?;

            // Generate manpage
            let app = app.name("batmond");
            let man = clap_mangen::Man::new(app);
            let mut buffer: Vec<u8> = Default::default();
            man.render(&mut buffer)?;
            fs::write(manpage_out_dir.join("batmond.1"), buffer)?;
        }
        _ => {}
    }

    println!("cargo:rerun-if-env-changed=BATMOND_GENERATE");

    Ok(())
}
