mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::recovery;
use crate::io::store::{KEY_TIMER, Store};
use crate::model::config::AppConfig;
use crate::model::{Habit, Priority, Session, Task, TaskStatus, ThemePref};
use crate::ops::stats::{self, Dashboard};
use crate::ops::task_ops::TaskFilter;
use crate::ops::timer::{SessionReview, SessionTimer, TaskRef, TimerMode, TimerStatus};
use crate::ops::{export, habit_ops, note_ops, profile_ops, project_ops, task_ops};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs: the opened store, the parsed config and the
/// output mode.
struct Ctx {
    store: Store,
    config: AppConfig,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Data directory from `-D`, else the per-user default.
pub fn resolve_data_dir(flag: Option<&str>) -> PathBuf {
    match flag {
        Some(dir) => PathBuf::from(dir),
        None => crate::io::default_data_dir(),
    }
}

pub fn dispatch(cli: Cli) -> CmdResult {
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let Some(command) = cli.command else {
        return Err("no command given (run `flow` without arguments for the dashboard)".into());
    };
    if let Commands::Init(args) = command {
        return cmd_init(&data_dir, args, cli.json);
    }

    let ctx = open(&data_dir, cli.json)?;
    match command {
        Commands::Init(_) => Ok(()),

        // Timer
        Commands::Start(args) => cmd_start(&ctx, args),
        Commands::Pause => cmd_pause(&ctx),
        Commands::Stop(args) => cmd_stop(&ctx, args),
        Commands::Complete(args) => cmd_complete(&ctx, args),
        Commands::Cancel => cmd_cancel(&ctx),
        Commands::Distraction(args) => cmd_distraction(&ctx, args),
        Commands::Status => cmd_status(&ctx),

        // Records
        Commands::Task(cmd) => cmd_task(&ctx, cmd),
        Commands::Project(cmd) => cmd_project(&ctx, cmd),
        Commands::Habit(cmd) => cmd_habit(&ctx, cmd),
        Commands::Note(cmd) => cmd_note(&ctx, cmd),

        // Reports
        Commands::Sessions(args) => cmd_sessions(&ctx, args),
        Commands::Stats => cmd_stats(&ctx),
        Commands::Insights => cmd_insights(&ctx),

        // Preferences
        Commands::Profile(args) => cmd_profile(&ctx, args),
        Commands::Theme(args) => cmd_theme(&ctx, args),
        Commands::Config(cmd) => cmd_config(&ctx, cmd),

        // Data management
        Commands::Export(args) => cmd_export(&ctx, args),
        Commands::Import(args) => cmd_import(&ctx, args),
        Commands::Reset(args) => cmd_reset(&ctx, args),
        Commands::Recovery(cmd) => cmd_recovery(&ctx, cmd),
    }
}

fn open(data_dir: &Path, json: bool) -> Result<Ctx, Box<dyn std::error::Error>> {
    let store = Store::open(data_dir)?;
    let config = config_io::load_config_or_default(store.dir());
    Ok(Ctx {
        store,
        config,
        json,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Load the persisted timer, bring it up to date, run `f`, and save it back.
/// The timer is saved even when `f` fails: the catch-up tick may have
/// finished a countdown, and failed transitions leave it unchanged.
fn with_timer<T>(
    ctx: &Ctx,
    f: impl FnOnce(&mut SessionTimer) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<(T, SessionTimer), Box<dyn std::error::Error>> {
    let mut timer = ctx
        .store
        .get_one::<SessionTimer>(KEY_TIMER)
        .unwrap_or_else(|| SessionTimer::from_config(&ctx.config.timer));
    timer.tick(Local::now());
    let result = f(&mut timer);
    ctx.store.put_one(KEY_TIMER, &timer)?;
    Ok((result?, timer))
}

fn print_timer(ctx: &Ctx, timer: &SessionTimer) -> CmdResult {
    let snap = timer.snapshot(Local::now());
    if ctx.json {
        return print_json(&snap);
    }
    for line in format_timer(&snap) {
        println!("{}", line);
    }
    Ok(())
}

fn review_from(args: ReviewArgs) -> SessionReview {
    SessionReview {
        rating: args.rating,
        tags: args
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        distractions: args.distractions,
        notes: args.notes.trim().to_string(),
    }
}

fn print_saved(ctx: &Ctx, session: &Session) -> CmdResult {
    if ctx.json {
        print_json(session)
    } else {
        println!("{}", format_saved_session(session));
        Ok(())
    }
}

fn cmd_start(ctx: &Ctx, args: StartArgs) -> CmdResult {
    let task = match &args.task {
        Some(query) => Some(TaskRef::from(&task_ops::find_task(&ctx.store, query)?)),
        None => None,
    };
    let mode = match args.mode.as_deref() {
        Some(raw) => Some(
            TimerMode::parse_mode(raw)
                .ok_or_else(|| format!("unknown mode '{}' (expected: countdown, elapsed)", raw))?,
        ),
        None => None,
    };

    let ((), timer) = with_timer(ctx, |timer| {
        if let Some(task) = task {
            timer.select_task(task)?;
        }
        if let Some(mode) = mode {
            timer.set_mode(mode)?;
        }
        if let Some(minutes) = args.minutes {
            timer.set_planned_minutes(minutes)?;
        }
        timer.start(None, Local::now())?;
        Ok(())
    })?;
    print_timer(ctx, &timer)
}

fn cmd_pause(ctx: &Ctx) -> CmdResult {
    let ((), timer) = with_timer(ctx, |timer| Ok(timer.pause(Local::now())?))?;
    print_timer(ctx, &timer)
}

fn cmd_stop(ctx: &Ctx, args: ReviewArgs) -> CmdResult {
    let save = args.rating.is_some();
    let review = review_from(args);
    let (saved, timer) = with_timer(ctx, |timer| {
        let now = Local::now();
        timer.stop(now)?;
        if save {
            return Ok(Some(timer.complete(&ctx.store, review, now)?));
        }
        Ok(None)
    })?;
    match saved {
        Some(session) => print_saved(ctx, &session),
        None => print_timer(ctx, &timer),
    }
}

fn cmd_complete(ctx: &Ctx, args: ReviewArgs) -> CmdResult {
    let review = review_from(args);
    let (session, _) = with_timer(ctx, |timer| {
        Ok(timer.complete(&ctx.store, review, Local::now())?)
    })?;
    print_saved(ctx, &session)
}

fn cmd_cancel(ctx: &Ctx) -> CmdResult {
    let (was, timer) = with_timer(ctx, |timer| {
        let was = timer.status();
        timer.reset();
        Ok(was)
    })?;
    if ctx.json {
        return print_json(&timer.snapshot(Local::now()));
    }
    if was == TimerStatus::Idle {
        println!("no session to cancel");
    } else {
        println!("session discarded");
    }
    Ok(())
}

fn cmd_distraction(ctx: &Ctx, args: DistractionArgs) -> CmdResult {
    let (count, _) = with_timer(ctx, |timer| {
        if timer.status() == TimerStatus::Idle {
            return Err("no session in progress".into());
        }
        if args.undo {
            timer.retract_distraction();
        } else {
            timer.note_distraction();
        }
        Ok(timer.distractions())
    })?;
    if ctx.json {
        print_json(&serde_json::json!({ "distractions": count }))
    } else {
        println!("distractions: {}", count);
        Ok(())
    }
}

fn cmd_status(ctx: &Ctx) -> CmdResult {
    let ((), timer) = with_timer(ctx, |_| Ok(()))?;
    print_timer(ctx, &timer)
}

// ---------------------------------------------------------------------------
// Tasks & projects
// ---------------------------------------------------------------------------

fn cmd_task(ctx: &Ctx, cmd: TaskCmd) -> CmdResult {
    match cmd.action {
        TaskAction::Add(args) => {
            let priority = Priority::parse_priority(&args.priority).ok_or_else(|| {
                format!("unknown priority '{}' (expected: high, medium)", args.priority)
            })?;
            let task = task_ops::add_task(&ctx.store, &args.name, &args.project, priority)?;
            if ctx.json {
                print_json(&task)
            } else {
                println!("{}", format_task_line(&task));
                Ok(())
            }
        }
        TaskAction::List(args) => {
            let status = args.status.as_deref().map(parse_status).transpose()?;
            let mut filter = TaskFilter {
                project: args.project,
                status,
                search: None,
                open_only: !args.all,
            };
            if let Some(pattern) = &args.search {
                filter = filter.with_search(pattern)?;
            }
            let tasks = task_ops::list_tasks(&ctx.store, &filter);
            if ctx.json {
                return print_json(&tasks);
            }
            if tasks.is_empty() {
                println!("no tasks");
            }
            for task in &tasks {
                println!("{}", format_task_line(task));
            }
            Ok(())
        }
        TaskAction::Done(arg) => {
            let task = task_ops::mark_done(&ctx.store, &arg.query)?;
            print_task_change(ctx, &task, "done")
        }
        TaskAction::Status(args) => {
            let status = parse_status(&args.status)?;
            let task = task_ops::set_status(&ctx.store, &args.query, status)?;
            print_task_change(ctx, &task, status.label())
        }
        TaskAction::Rm(arg) => {
            let task = task_ops::remove_task(&ctx.store, &arg.query)?;
            print_task_change(ctx, &task, "deleted")
        }
    }
}

fn parse_status(raw: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse_status(raw)
        .ok_or_else(|| format!("unknown status '{}' (expected: todo, in-progress, done)", raw))
}

fn print_task_change(ctx: &Ctx, task: &Task, what: &str) -> CmdResult {
    if ctx.json {
        print_json(task)
    } else {
        println!("{}: {}", what, task.name);
        Ok(())
    }
}

fn cmd_project(ctx: &Ctx, cmd: ProjectCmd) -> CmdResult {
    match cmd.action.unwrap_or(ProjectAction::List) {
        ProjectAction::Add(args) => {
            let project = project_ops::add_project(&ctx.store, &args.name, args.color.as_deref())?;
            if ctx.json {
                print_json(&project)
            } else {
                println!("added project {} ({})", project.name, project.color);
                Ok(())
            }
        }
        ProjectAction::List => {
            let projects = project_ops::list_projects(&ctx.store);
            let tasks = ctx.store.all::<Task>();
            let hours = stats::project_time(&projects, &tasks);
            let rows: Vec<ProjectJson> = projects
                .into_iter()
                .map(|p| ProjectJson {
                    hours: hours.get(&p.name).copied().unwrap_or(0.0),
                    id: p.id,
                    name: p.name,
                    color: p.color,
                })
                .collect();
            if ctx.json {
                return print_json(&rows);
            }
            if rows.is_empty() {
                println!("no projects");
            }
            for row in &rows {
                println!("{}  {}  {}", row.color, row.name, format_hours(row.hours));
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Habits & notes
// ---------------------------------------------------------------------------

fn cmd_habit(ctx: &Ctx, cmd: HabitCmd) -> CmdResult {
    let today = Local::now().date_naive();
    match cmd.action.unwrap_or(HabitAction::List) {
        HabitAction::List => {
            let habits = ctx.store.all::<Habit>();
            if ctx.json {
                let rows: Vec<HabitJson> = habits
                    .iter()
                    .map(|h| HabitJson {
                        id: h.id,
                        text: h.text.clone(),
                        done_today: h.is_done_on(today),
                    })
                    .collect();
                return print_json(&rows);
            }
            if habits.is_empty() {
                println!("no habits");
                return Ok(());
            }
            for habit in &habits {
                println!("{}", format_habit_line(habit, habit.is_done_on(today)));
            }
            println!(
                "{}/{} today ({}%)",
                stats::habits_done_on(&habits, today),
                habits.len(),
                stats::habit_completion_percent(&habits, today)
            );
            Ok(())
        }
        HabitAction::Add(arg) => {
            let habit = habit_ops::add_habit(&ctx.store, &arg.text, today)?;
            print_habit(ctx, &habit, false)
        }
        HabitAction::Check(args) => {
            let habit = habit_ops::set_habit_done(&ctx.store, &args.query, today, !args.off)?;
            print_habit(ctx, &habit, habit.is_done_on(today))
        }
        HabitAction::Rm(arg) => {
            let habit = habit_ops::remove_habit(&ctx.store, &arg.query)?;
            if ctx.json {
                print_json(&habit)
            } else {
                println!("deleted: {}", habit.text);
                Ok(())
            }
        }
    }
}

fn print_habit(ctx: &Ctx, habit: &Habit, done_today: bool) -> CmdResult {
    if ctx.json {
        print_json(&HabitJson {
            id: habit.id,
            text: habit.text.clone(),
            done_today,
        })
    } else {
        println!("{}", format_habit_line(habit, done_today));
        Ok(())
    }
}

fn cmd_note(ctx: &Ctx, cmd: NoteCmd) -> CmdResult {
    match cmd.action.unwrap_or(NoteAction::List) {
        NoteAction::List => {
            let notes = note_ops::list_notes(&ctx.store);
            if ctx.json {
                return print_json(&notes);
            }
            if notes.is_empty() {
                println!("no notes");
            }
            for note in &notes {
                println!("{}  {}  #{}", format_timestamp(note.timestamp), note.text, note.id);
            }
            Ok(())
        }
        NoteAction::Add(arg) => {
            let note = note_ops::add_note(&ctx.store, &arg.text, Local::now())?;
            if ctx.json {
                print_json(&note)
            } else {
                println!("added note #{}", note.id);
                Ok(())
            }
        }
        NoteAction::Rm(arg) => {
            let note = note_ops::remove_note(&ctx.store, arg.id)?;
            if ctx.json {
                print_json(&note)
            } else {
                println!("deleted note #{}", note.id);
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

fn cmd_sessions(ctx: &Ctx, args: SessionsArgs) -> CmdResult {
    let mut sessions = ctx.store.all::<Session>();
    if let Some(project) = &args.project {
        sessions.retain(|s| s.project.eq_ignore_ascii_case(project));
    }
    let recent = stats::recent_sessions(&sessions, args.limit);
    if ctx.json {
        return print_json(&recent);
    }
    if recent.is_empty() {
        println!("no sessions yet");
    }
    for session in recent {
        println!("{}", format_session_line(session));
    }
    Ok(())
}

fn cmd_stats(ctx: &Ctx) -> CmdResult {
    let dash = Dashboard::load(&ctx.store, Local::now().date_naive());
    if ctx.json {
        return print_json(&dash);
    }
    for line in format_stats(&dash) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_insights(ctx: &Ctx) -> CmdResult {
    let dash = Dashboard::load(&ctx.store, Local::now().date_naive());
    if ctx.json {
        return print_json(&InsightsJson::from_dashboard(&dash));
    }
    for line in format_insights(&dash) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

fn cmd_profile(ctx: &Ctx, args: ProfileArgs) -> CmdResult {
    let profile = match (args.name, args.email) {
        (None, None) => profile_ops::load_profile(&ctx.store),
        (name, email) => {
            let current = profile_ops::load_profile(&ctx.store);
            profile_ops::save_profile(
                &ctx.store,
                name.as_deref().unwrap_or(&current.full_name),
                email.as_deref().unwrap_or(&current.email),
            )?
        }
    };
    if ctx.json {
        return print_json(&profile);
    }
    if profile.full_name.is_empty() {
        println!("no profile set (flow profile --name <NAME> --email <EMAIL>)");
    } else {
        println!("{} <{}>", profile.full_name, profile.email);
    }
    Ok(())
}

fn cmd_theme(ctx: &Ctx, args: ThemeArgs) -> CmdResult {
    let theme = match args.theme.as_deref() {
        Some(raw) => {
            let theme = ThemePref::parse_theme(raw)
                .ok_or_else(|| format!("unknown theme '{}' (expected: dark, light, system)", raw))?;
            profile_ops::save_theme(&ctx.store, theme)?;
            theme
        }
        None => profile_ops::load_theme(&ctx.store),
    };
    if ctx.json {
        print_json(&serde_json::json!({ "theme": theme }))
    } else {
        println!("{}", theme.as_str());
        Ok(())
    }
}

fn cmd_config(ctx: &Ctx, cmd: ConfigCmd) -> CmdResult {
    match cmd.action {
        ConfigAction::Path => {
            println!("{}", config_io::config_path(ctx.store.dir()).display());
            Ok(())
        }
        ConfigAction::Get(args) => {
            let (_, doc) = config_io::read_config(ctx.store.dir())?;
            let value = config_io::get_value(&doc, &args.key)
                .ok_or_else(|| format!("{} is not set", args.key))?;
            if ctx.json {
                print_json(&serde_json::json!({ "key": args.key, "value": value }))
            } else {
                println!("{}", value);
                Ok(())
            }
        }
        ConfigAction::Set(args) => {
            config_io::ensure_config(ctx.store.dir())?;
            let (_, mut doc) = config_io::read_config(ctx.store.dir())?;
            config_io::set_value(&mut doc, &args.key, &args.value)?;
            config_io::write_config(ctx.store.dir(), &doc)?;
            if !ctx.json {
                println!("{} = {}", args.key, args.value);
            } else {
                print_json(&serde_json::json!({ "key": args.key, "value": args.value }))?;
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Data management
// ---------------------------------------------------------------------------

fn cmd_export(ctx: &Ctx, args: ExportArgs) -> CmdResult {
    let path = PathBuf::from(args.output.as_deref().unwrap_or(export::DEFAULT_EXPORT_FILE));
    let bundle = export::export_to(&ctx.store, &path, Local::now())?;
    if ctx.json {
        print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "tasks": bundle.tasks.len(),
            "sessions": bundle.sessions.len(),
            "projects": bundle.projects.len(),
            "habits": bundle.habits.len(),
            "notes": bundle.notes.len(),
        }))
    } else {
        println!(
            "exported {} tasks, {} sessions, {} projects to {}",
            bundle.tasks.len(),
            bundle.sessions.len(),
            bundle.projects.len(),
            path.display()
        );
        Ok(())
    }
}

fn cmd_import(ctx: &Ctx, args: ImportArgs) -> CmdResult {
    let summary = export::import_from(&ctx.store, Path::new(&args.file))?;
    if ctx.json {
        return print_json(&summary);
    }
    let parts: Vec<String> = [
        ("tasks", summary.tasks),
        ("sessions", summary.sessions),
        ("projects", summary.projects),
        ("habits", summary.habits),
        ("notes", summary.notes),
    ]
    .iter()
    .filter_map(|(name, count)| count.map(|n| format!("{} {}", n, name)))
    .collect();
    if parts.is_empty() {
        println!("nothing to import");
    } else {
        println!("imported {}", parts.join(", "));
    }
    if summary.skipped > 0 {
        println!("skipped {} unreadable record(s)", summary.skipped);
    }
    Ok(())
}

fn cmd_reset(ctx: &Ctx, args: ResetArgs) -> CmdResult {
    if !args.yes {
        return Err("this deletes every session, task, habit and note; rerun with --yes".into());
    }
    export::reset_all(&ctx.store)?;
    if !ctx.json {
        println!("all data deleted");
    }
    Ok(())
}

fn cmd_recovery(ctx: &Ctx, cmd: RecoveryCmd) -> CmdResult {
    let dir = ctx.store.dir();
    match cmd.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(dir).display());
            Ok(())
        }
        Some(RecoveryAction::Prune(args)) => {
            let removed = recovery::prune_recovery(dir, args.all)?;
            if ctx.json {
                print_json(&serde_json::json!({ "removed": removed }))
            } else {
                println!("removed {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
                Ok(())
            }
        }
        None => {
            let entries = recovery::read_recovery_entries(dir, Some(cmd.limit.unwrap_or(10)));
            if ctx.json {
                let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                return print_json(&values);
            }
            if entries.is_empty() {
                println!("recovery log is empty");
            }
            for entry in &entries {
                print!("{}", entry.to_display_markdown());
            }
            Ok(())
        }
    }
}
