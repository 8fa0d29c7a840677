use chrono::{NaiveDate, Utc};
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use lovestory::api::LoveStoryApi;
use lovestory::client::ClientId;
use lovestory::config::{BackendKind, LoveStoryConfig};
use lovestory::error::{LoveStoryError, Result};
use lovestory::export::backup_filename;
use lovestory::media::NewMediaFile;
use lovestory::model::{MediaItem, Theme};
use lovestory::store::fs::FileStore;
use lovestory::store::remote::RemoteStore;
use lovestory::store::{Backend, MediaSource};
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

mod args;
use args::{Cli, Commands, GuestbookCommands, SettingsCommands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: LoveStoryApi<Backend>,
    author: Option<String>,
    data_dir: PathBuf,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Add { paths, tags }) => handle_add(&mut ctx, paths, tags),
        Some(Commands::List { favorites }) => handle_list(&ctx, favorites),
        Some(Commands::Show { index }) => handle_show(&ctx, &index),
        Some(Commands::Favorite { indexes }) => handle_favorite(&mut ctx, &indexes),
        Some(Commands::Edit {
            index,
            filename,
            date,
        }) => handle_edit(&mut ctx, &index, filename, date),
        Some(Commands::Delete { indexes }) => handle_delete(&mut ctx, &indexes),
        Some(Commands::Comment {
            index,
            text,
            author,
        }) => handle_comment(&mut ctx, &index, text, author),
        Some(Commands::Reply {
            index,
            comment,
            text,
            name,
        }) => handle_reply(&mut ctx, &index, comment, text, name),
        Some(Commands::React {
            index,
            comment,
            emoji,
        }) => handle_react(&mut ctx, &index, comment, &emoji),
        Some(Commands::DeleteComment { index, comment }) => {
            handle_delete_comment(&mut ctx, &index, comment)
        }
        Some(Commands::Guestbook(cmd)) => handle_guestbook(&mut ctx, cmd),
        Some(Commands::Settings(cmd)) => handle_settings(&mut ctx, cmd),
        Some(Commands::Export { out }) => handle_export(&ctx, out),
        Some(Commands::Seed) => handle_seed(&mut ctx),
        Some(Commands::Init) => handle_init(&ctx),
        None => handle_list(&ctx, false),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("lovestory=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lovestory=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match std::env::var_os("LOVESTORY_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let proj_dirs = ProjectDirs::from("com", "lovestory", "lovestory")
                .ok_or_else(|| LoveStoryError::Store("Could not determine data dir".to_string()))?;
            proj_dirs.data_dir().to_path_buf()
        }
    };

    let config = LoveStoryConfig::load(&data_dir).unwrap_or_default();

    let store = if cli.remote || config.backend == BackendKind::Remote {
        Backend::Remote(RemoteStore::from_env()?)
    } else {
        Backend::Local(FileStore::new(data_dir.clone()))
    };

    let client = ClientId::load_or_create(&data_dir);
    let api = LoveStoryApi::new(store, client);

    Ok(AppContext {
        api,
        author: config.author,
        data_dir,
    })
}

fn handle_add(ctx: &mut AppContext, paths: Vec<PathBuf>, tags: Vec<String>) -> Result<()> {
    let limit = ctx.api.settings().upload_limit as usize;
    if paths.len() > limit {
        return Err(LoveStoryError::Api(format!(
            "Batch of {} files exceeds the upload limit of {}",
            paths.len(),
            limit
        )));
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes = std::fs::read(path).map_err(LoveStoryError::Io)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| LoveStoryError::Api(format!("Not a file: {}", path.display())))?;
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        files.push(NewMediaFile {
            filename,
            mime,
            bytes,
        });
    }

    let attempted = files.len();
    let added = ctx.api.add_media_files(files, &tags);

    println!(
        "{}",
        format!("Added {} of {} files.", added.len(), attempted).green()
    );
    if added.len() < attempted {
        println!(
            "{}",
            format!("{} files were skipped; see the log.", attempted - added.len()).yellow()
        );
    }
    for item in &added {
        println!("  {} ({}, {})", item.filename, item.kind, format_size(item.size));
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, favorites: bool) -> Result<()> {
    let items: Vec<MediaItem> = ctx
        .api
        .all_media()
        .into_iter()
        .filter(|m| !favorites || m.favorite)
        .collect();
    print_media(&items);
    Ok(())
}

fn handle_show(ctx: &AppContext, index: &str) -> Result<()> {
    let id = resolve_media(ctx, index)?;
    let item = ctx
        .api
        .media_meta(id)
        .ok_or_else(|| LoveStoryError::Api(format!("No item at position {}", index)))?;

    println!("{}", item.filename.bold());
    println!(
        "{}",
        format!(
            "{} · {} · {} · {}",
            item.kind,
            format_size(item.size),
            item.mime,
            item.created_at.format("%Y-%m-%d")
        )
        .dimmed()
    );
    if !item.tags.is_empty() {
        println!("{}", format!("tags: {}", item.tags.join(", ")).dimmed());
    }
    match ctx.api.media_blob(id) {
        Some(MediaSource::Url(url)) => println!("{}", url.underline()),
        Some(MediaSource::Bytes(_)) | None => {}
    }

    if item.comments.is_empty() {
        println!("\n{}", "No comments yet.".dimmed());
        return Ok(());
    }

    println!();
    for (i, comment) in item.comments.iter().enumerate() {
        println!(
            "{} {} {}",
            format!("{}.", i + 1).yellow(),
            comment.author.bold(),
            format_time_ago(comment.at).dimmed()
        );
        println!("   {}", comment.text);
        if !comment.reactions.is_empty() {
            let tally: Vec<String> = comment
                .reactions
                .iter()
                .filter(|(_, n)| **n > 0)
                .map(|(emoji, n)| format!("{} {}", emoji, n))
                .collect();
            if !tally.is_empty() {
                println!("   {}", tally.join("  "));
            }
        }
        for reply in &comment.replies {
            println!(
                "     {} {} {}",
                "↳".dimmed(),
                reply.name.bold(),
                format_time_ago(reply.at).dimmed()
            );
            println!("       {}", reply.text);
        }
    }
    Ok(())
}

fn handle_favorite(ctx: &mut AppContext, indexes: &[String]) -> Result<()> {
    for id in resolve_media_batch(ctx, indexes)? {
        if let Some(item) = ctx.api.toggle_favorite(id) {
            let state = if item.favorite { "favorited" } else { "unfavorited" };
            println!("{}", format!("{} {}", state, item.filename).green());
        }
    }
    Ok(())
}

fn handle_edit(
    ctx: &mut AppContext,
    index: &str,
    filename: Option<String>,
    date: Option<String>,
) -> Result<()> {
    if filename.is_none() && date.is_none() {
        return Err(LoveStoryError::Api(
            "Nothing to change: pass --filename and/or --date".to_string(),
        ));
    }
    let id = resolve_media(ctx, index)?;

    if let Some(filename) = filename {
        if let Some(item) = ctx.api.rename_media(id, filename) {
            println!("{}", format!("Renamed to {}", item.filename).green());
        }
    }
    if let Some(date) = date {
        let at = parse_date(&date)?
            .and_hms_opt(0, 0, 0)
            .expect("midnight exists")
            .and_utc();
        if let Some(item) = ctx.api.redate_media(id, at) {
            println!(
                "{}",
                format!("Dated {} as {}", item.filename, item.created_at.format("%Y-%m-%d"))
                    .green()
            );
        }
    }
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, indexes: &[String]) -> Result<()> {
    for id in resolve_media_batch(ctx, indexes)? {
        if ctx.api.delete_media(id) {
            println!("{}", "Deleted.".green());
        } else {
            println!("{}", "Already gone.".yellow());
        }
    }
    Ok(())
}

fn handle_comment(
    ctx: &mut AppContext,
    index: &str,
    text: String,
    author: Option<String>,
) -> Result<()> {
    let id = resolve_media(ctx, index)?;
    let author = author.or_else(|| ctx.author.clone());
    if let Some(item) = ctx.api.add_comment(id, text, author) {
        println!(
            "{}",
            format!("Comment added to {} ({} total)", item.filename, item.comments.len()).green()
        );
    }
    Ok(())
}

fn handle_reply(
    ctx: &mut AppContext,
    index: &str,
    comment: usize,
    text: String,
    name: Option<String>,
) -> Result<()> {
    let (media_id, comment_id) = resolve_comment(ctx, index, comment)?;
    let name = name.or_else(|| ctx.author.clone());
    if ctx.api.add_media_reply(media_id, comment_id, name, text).is_some() {
        println!("{}", "Reply added.".green());
    }
    Ok(())
}

fn handle_react(ctx: &mut AppContext, index: &str, comment: usize, emoji: &str) -> Result<()> {
    let (media_id, comment_id) = resolve_comment(ctx, index, comment)?;
    if let Some(item) = ctx.api.add_media_reaction(media_id, comment_id, emoji) {
        let count = item
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .and_then(|c| c.reactions.get(emoji))
            .copied()
            .unwrap_or(0);
        println!("{}", format!("{} {}", emoji, count).green());
    }
    Ok(())
}

fn handle_delete_comment(ctx: &mut AppContext, index: &str, comment: usize) -> Result<()> {
    let (media_id, comment_id) = resolve_comment(ctx, index, comment)?;
    if ctx.api.delete_comment(media_id, comment_id).is_some() {
        println!("{}", "Comment removed.".green());
    }
    Ok(())
}

fn handle_guestbook(ctx: &mut AppContext, cmd: GuestbookCommands) -> Result<()> {
    match cmd {
        GuestbookCommands::Add { text, name } => {
            // The 500-character cap lives here at the submitting surface,
            // not in the repository.
            if text.chars().count() > 500 {
                return Err(LoveStoryError::Api(
                    "Message is longer than 500 characters".to_string(),
                ));
            }
            let name = name.or_else(|| ctx.author.clone());
            match ctx.api.add_guestbook_message(name, text) {
                Some(msg) => println!("{}", format!("Message from {} saved.", msg.name).green()),
                None => println!("{}", "Message could not be saved.".red()),
            }
            Ok(())
        }
        GuestbookCommands::List => {
            let messages = ctx.api.guestbook_messages();
            if messages.is_empty() {
                println!("The guestbook is empty.");
                return Ok(());
            }
            for (i, msg) in messages.iter().enumerate() {
                println!(
                    "{} {} {}",
                    format!("{}.", i + 1).yellow(),
                    msg.name.bold(),
                    format_time_ago(msg.at).dimmed()
                );
                println!("   {}", msg.text);
                let tally: Vec<String> = msg
                    .reactions
                    .iter()
                    .filter(|(_, n)| **n > 0)
                    .map(|(emoji, n)| format!("{} {}", emoji, n))
                    .collect();
                if !tally.is_empty() {
                    println!("   {}", tally.join("  "));
                }
                for reply in &msg.replies {
                    println!("     {} {}: {}", "↳".dimmed(), reply.name.bold(), reply.text);
                }
            }
            Ok(())
        }
        GuestbookCommands::Reply { index, text, name } => {
            let id = resolve_message(ctx, &index)?;
            let name = name.or_else(|| ctx.author.clone());
            match ctx.api.add_guestbook_reply(id, name, text) {
                Some(reply) => println!("{}", format!("Reply from {} saved.", reply.name).green()),
                None => println!("{}", "That message is gone.".yellow()),
            }
            Ok(())
        }
        GuestbookCommands::React { index, emoji } => {
            let id = resolve_message(ctx, &index)?;
            match ctx.api.react_to_message(id, &emoji) {
                Some(update) => {
                    let count = update.reactions.get(&emoji).copied().unwrap_or(0);
                    println!("{}", format!("{} {}", update.user_reaction, count).green());
                }
                None => println!("{}", "That message is gone.".yellow()),
            }
            Ok(())
        }
        GuestbookCommands::Delete { index } => {
            let id = resolve_message(ctx, &index)?;
            if ctx.api.delete_guestbook_message(id) {
                println!("{}", "Message deleted.".green());
            } else {
                println!("{}", "Already gone.".yellow());
            }
            Ok(())
        }
    }
}

fn handle_settings(ctx: &mut AppContext, cmd: SettingsCommands) -> Result<()> {
    match cmd {
        SettingsCommands::Show => {
            let s = ctx.api.settings();
            let theme = match s.theme {
                Theme::Light => "light",
                Theme::Dark => "dark",
            };
            println!("theme = {}", theme);
            println!("upload-limit = {}", s.upload_limit);
            println!(
                "password = {}",
                if s.privacy.password.is_empty() { "(not set)" } else { "(set)" }
            );
            println!("start-date = {}", s.love_start_date);
            let days = (Utc::now().date_naive() - s.love_start_date).num_days();
            if days >= 0 {
                println!("{}", format!("Together for {} days ♥", days).magenta());
            }
            Ok(())
        }
        SettingsCommands::Set {
            theme,
            upload_limit,
            password,
            start_date,
        } => {
            let mut next = ctx.api.settings();
            if let Some(theme) = theme {
                next.theme = parse_theme(&theme)?;
            }
            if let Some(limit) = upload_limit {
                next.upload_limit = limit;
            }
            if let Some(password) = password {
                next.privacy.password = password;
            }
            if let Some(date) = start_date {
                next.love_start_date = parse_date(&date)?;
            }
            // The record is always written back whole.
            ctx.api.save_settings(next);
            println!("{}", "Settings saved.".green());
            Ok(())
        }
    }
}

fn handle_export(ctx: &AppContext, out: Option<PathBuf>) -> Result<()> {
    let dir = out.unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(backup_filename(Utc::now().date_naive()));
    let file = std::fs::File::create(&path).map_err(LoveStoryError::Io)?;

    let summary = ctx.api.export_backup(file)?;

    println!(
        "{}",
        format!(
            "Exported {} items ({} payloads) to {}",
            summary.items,
            summary.payloads,
            path.display()
        )
        .green()
    );
    if summary.skipped > 0 {
        println!(
            "{}",
            format!("{} payloads were unreadable and left out.", summary.skipped).yellow()
        );
    }
    Ok(())
}

fn handle_seed(ctx: &mut AppContext) -> Result<()> {
    let added = ctx.api.ensure_demo_content();
    if added.is_empty() {
        println!("Gallery is not empty; nothing to seed.");
    } else {
        println!("{}", format!("Seeded {} demo items.", added.len()).green());
    }
    Ok(())
}

fn handle_init(ctx: &AppContext) -> Result<()> {
    std::fs::create_dir_all(&ctx.data_dir).map_err(LoveStoryError::Io)?;
    let config = LoveStoryConfig::load(&ctx.data_dir).unwrap_or_default();
    config.save(&ctx.data_dir)?;
    println!("Data directory: {}", ctx.data_dir.display());
    println!("Client id: {}", ctx.api.client_id());
    Ok(())
}

// --- selection ---

fn parse_position(s: &str) -> Result<usize> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(LoveStoryError::Api(format!("Invalid position: {}", s))),
    }
}

fn resolve_media(ctx: &AppContext, index: &str) -> Result<Uuid> {
    let n = parse_position(index)?;
    ctx.api
        .all_media()
        .get(n - 1)
        .map(|item| item.id)
        .ok_or_else(|| LoveStoryError::Api(format!("No item at position {}", n)))
}

/// Resolve every position against one listing snapshot, so acting on the
/// ids (deleting, say) cannot shift later positions mid-batch.
fn resolve_media_batch(ctx: &AppContext, indexes: &[String]) -> Result<Vec<Uuid>> {
    let items = ctx.api.all_media();
    indexes
        .iter()
        .map(|s| {
            let n = parse_position(s)?;
            items
                .get(n - 1)
                .map(|item| item.id)
                .ok_or_else(|| LoveStoryError::Api(format!("No item at position {}", n)))
        })
        .collect()
}

fn resolve_comment(ctx: &AppContext, index: &str, comment: usize) -> Result<(Uuid, Uuid)> {
    let media_id = resolve_media(ctx, index)?;
    let item = ctx
        .api
        .media_meta(media_id)
        .ok_or_else(|| LoveStoryError::Api(format!("No item at position {}", index)))?;
    let comment_id = comment
        .checked_sub(1)
        .and_then(|i| item.comments.get(i))
        .map(|c| c.id)
        .ok_or_else(|| {
            LoveStoryError::Api(format!("{} has no comment {}", item.filename, comment))
        })?;
    Ok((media_id, comment_id))
}

fn resolve_message(ctx: &AppContext, index: &str) -> Result<Uuid> {
    let n = parse_position(index)?;
    ctx.api
        .guestbook_messages()
        .get(n - 1)
        .map(|msg| msg.id)
        .ok_or_else(|| LoveStoryError::Api(format!("No message at position {}", n)))
}

// --- rendering ---

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const FAVORITE_MARKER: &str = "♥";

fn print_media(items: &[MediaItem]) {
    if items.is_empty() {
        println!("No media found.");
        return;
    }

    for (i, item) in items.iter().enumerate() {
        let idx_str = format!("{}. ", i + 1);
        let marker = if item.favorite {
            format!("{} ", FAVORITE_MARKER.magenta())
        } else {
            "  ".to_string()
        };
        let marker_width = 2;

        let time_ago = format_time_ago(item.created_at);

        let mut line = format!("{} · {}", item.kind, format_size(item.size));
        if !item.comments.is_empty() {
            line.push_str(&format!(" · {} comments", item.comments.len()));
        }
        let detail = format!("{}  {}", item.filename, line);

        let fixed_width = idx_str.width() + marker_width + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let detail_display = truncate_to_width(&detail, available);
        let padding = available.saturating_sub(detail_display.width());

        println!(
            "{}{}{}{}{}",
            marker,
            idx_str.normal(),
            detail_display,
            " ".repeat(padding),
            time_ago.dimmed()
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

fn format_time_ago(timestamp: chrono::DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(timestamp);

    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

fn parse_theme(s: &str) -> Result<Theme> {
    match s {
        "light" => Ok(Theme::Light),
        "dark" => Ok(Theme::Dark),
        other => Err(LoveStoryError::Api(format!(
            "Unknown theme: {} (use light or dark)",
            other
        ))),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| LoveStoryError::Api(format!("Invalid date (use YYYY-MM-DD): {}", s)))
}
