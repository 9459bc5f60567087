use super::render::{
    render_config, render_files, render_history, render_log, render_messages, render_tags,
};
use super::setup::{Cli, Commands, TagsAction};
use crate::discover::{canonical_dir, image_files};
use clap::Parser;
use log::LevelFilter;
use nametagapp::api::NametagApi;
use nametagapp::commands::{CmdResult, MessageLevel};
use nametagapp::config::NametagConfig;
use nametagapp::error::Result;
use nametagapp::init::{initialize, NametagContext};
use nametagapp::rename_log::FileRenameLog;
use nametagapp::store::fs::FsStore;
use std::path::{Path, PathBuf};

type Api = NametagApi<FsStore, FileRenameLog>;

/// Parses arguments and runs one command. Returns the process exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let NametagContext { mut api, config } =
        initialize(cli.config.as_deref(), cli.data_dir.clone())?;

    let result = match cli.command {
        Commands::List { dir, tag } => handle_list(&mut api, &config, &dir, tag.as_deref())?,
        Commands::Tracked => {
            let result = api.tracked_files()?;
            print!("{}", render_files(&result.listed_files));
            result
        }
        Commands::Tag { dir, file, tags } => {
            let path = load_dir(&mut api, &config, &dir, &file)?;
            let result = api.add_tags(&path, &tags)?;
            print!("{}", render_files(&result.affected_files));
            result
        }
        Commands::Untag { dir, file, tags } => {
            let path = load_dir(&mut api, &config, &dir, &file)?;
            let result = api.remove_tags(&path, &tags)?;
            print!("{}", render_files(&result.affected_files));
            result
        }
        Commands::Tags(action) => handle_tags(&mut api, action)?,
        Commands::History { dir, file } => {
            let path = load_dir(&mut api, &config, &dir, &file)?;
            let result = api.history(&path)?;
            print!("{}", render_history(&result.history));
            result
        }
        Commands::Revert {
            dir,
            file,
            old_name,
        } => {
            let path = load_dir(&mut api, &config, &dir, &file)?;
            let result = api.revert(&path, &old_name)?;
            print!("{}", render_files(&result.affected_files));
            result
        }
        Commands::Move { dir, file, dest } => {
            let path = load_dir(&mut api, &config, &dir, &file)?;
            let result = api.move_file(&path, &canonical_dir(&dest)?)?;
            print!("{}", render_files(&result.affected_files));
            result
        }
        Commands::Log { limit } => {
            let result = api.rename_log(limit)?;
            print!("{}", render_log(&result.log_entries));
            result
        }
        Commands::Doctor { fix } => api.doctor(fix)?,
        Commands::Config => {
            print!("{}", render_config(&config.describe()));
            CmdResult::default()
        }
    };

    print!("{}", render_messages(&result.messages));
    Ok(if result.has_errors() { 1 } else { 0 })
}

/// `warn` by default, `debug` with `--verbose`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

fn handle_list(
    api: &mut Api,
    config: &NametagConfig,
    dir: &Path,
    tag: Option<&str>,
) -> Result<CmdResult> {
    let loaded = api.load_directory(&image_files(dir, config)?)?;
    let result = match tag {
        Some(tag) => {
            let mut filtered = api.list_files(Some(tag))?;
            // Keep load warnings, drop the unfiltered listing's info lines.
            let warnings: Vec<_> = loaded
                .messages
                .into_iter()
                .filter(|m| m.level != MessageLevel::Info)
                .collect();
            filtered.messages.splice(0..0, warnings);
            filtered
        }
        None => loaded,
    };
    print!("{}", render_files(&result.listed_files));
    Ok(result)
}

fn handle_tags(api: &mut Api, action: TagsAction) -> Result<CmdResult> {
    match action {
        TagsAction::List => {
            let result = api.list_tags()?;
            print!("{}", render_tags(&result.listed_tags));
            Ok(result)
        }
        TagsAction::Create { name } => api.create_tag(&name),
        TagsAction::Delete { names } => api.delete_tags(&names),
    }
}

/// Loads `dir` as the working set and returns the path of `file` in it.
///
/// Load messages are printed here; the command's own result follows.
fn load_dir(api: &mut Api, config: &NametagConfig, dir: &Path, file: &str) -> Result<PathBuf> {
    let dir = canonical_dir(dir)?;
    let loaded = api.load_directory(&image_files(&dir, config)?)?;
    print!("{}", render_messages(&loaded.messages));
    Ok(dir.join(file))
}
