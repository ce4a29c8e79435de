use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flow", about = concat!("flowstate v", env!("CARGO_PKG_VERSION"), " - focus sessions, tasks and habits"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and config file
    Init(InitArgs),

    /// Start a focus session, or resume a paused one
    Start(StartArgs),
    /// Pause the running session
    Pause,
    /// End the session early; saves it when --rating is given
    Stop(ReviewArgs),
    /// Rate and save a finished session
    Complete(ReviewArgs),
    /// Discard the current session
    Cancel,
    /// Count a distraction in the current session
    Distraction(DistractionArgs),
    /// Show the timer
    Status,

    /// Manage tasks
    Task(TaskCmd),
    /// Manage projects
    Project(ProjectCmd),
    /// Manage daily habits
    Habit(HabitCmd),
    /// Manage notes
    Note(NoteCmd),

    /// List recorded sessions
    Sessions(SessionsArgs),
    /// Show focus statistics
    Stats,
    /// Show focus patterns
    Insights,

    /// Show or set the user profile
    Profile(ProfileArgs),
    /// Show or set the color theme (dark, light, system)
    Theme(ThemeArgs),
    /// Read or edit flowstate.toml
    Config(ConfigCmd),

    /// Export all data as JSON
    Export(ExportArgs),
    /// Replace data from an export file
    Import(ImportArgs),
    /// Delete all data
    Reset(ResetArgs),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Rewrite flowstate.toml from the template even if it exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Timer args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct StartArgs {
    /// Task id or name (required unless resuming)
    pub task: Option<String>,
    /// Timer mode: countdown or elapsed
    #[arg(long)]
    pub mode: Option<String>,
    /// Countdown length in minutes (1-180)
    #[arg(long)]
    pub minutes: Option<u32>,
}

#[derive(Args)]
pub struct ReviewArgs {
    /// Session rating, 1 (poor) to 5 (excellent)
    #[arg(long, short)]
    pub rating: Option<u8>,
    /// Tag the session (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Override the distraction count
    #[arg(long)]
    pub distractions: Option<u32>,
    /// Session notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(Args)]
pub struct DistractionArgs {
    /// Take back the last distraction
    #[arg(long)]
    pub undo: bool,
}

// ---------------------------------------------------------------------------
// Record args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskCmd {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task (the project is created if new)
    Add(TaskAddArgs),
    /// List tasks
    List(TaskListArgs),
    /// Mark a task done
    Done(QueryArg),
    /// Set a task's status (todo, in-progress, done)
    Status(TaskStatusArgs),
    /// Delete a task
    Rm(QueryArg),
}

#[derive(Args)]
pub struct TaskAddArgs {
    /// Task name
    pub name: String,
    /// Project name
    #[arg(long, short)]
    pub project: String,
    /// Priority: high or medium
    #[arg(long, default_value = "medium")]
    pub priority: String,
}

#[derive(Args)]
pub struct TaskListArgs {
    /// Only tasks in this project
    #[arg(long, short)]
    pub project: Option<String>,
    /// Only tasks with this status
    #[arg(long)]
    pub status: Option<String>,
    /// Regex matched against name and project
    #[arg(long)]
    pub search: Option<String>,
    /// Include Done tasks
    #[arg(long, short)]
    pub all: bool,
}

#[derive(Args)]
pub struct TaskStatusArgs {
    /// Task id or name
    pub query: String,
    /// New status
    pub status: String,
}

#[derive(Args)]
pub struct QueryArg {
    /// Id or name
    pub query: String,
}

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: Option<ProjectAction>,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects with their focus time (default)
    List,
    /// Add a project
    Add(ProjectAddArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    pub name: String,
    /// Color as #RRGGBB
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct HabitCmd {
    #[command(subcommand)]
    pub action: Option<HabitAction>,
}

#[derive(Subcommand)]
pub enum HabitAction {
    /// List habits with today's marks (default)
    List,
    /// Add a habit
    Add(TextArg),
    /// Check off a habit for today
    Check(HabitCheckArgs),
    /// Delete a habit
    Rm(QueryArg),
}

#[derive(Args)]
pub struct HabitCheckArgs {
    /// Habit id or text
    pub query: String,
    /// Clear the mark instead
    #[arg(long)]
    pub off: bool,
}

#[derive(Args)]
pub struct TextArg {
    pub text: String,
}

#[derive(Args)]
pub struct NoteCmd {
    #[command(subcommand)]
    pub action: Option<NoteAction>,
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// List notes, newest first (default)
    List,
    /// Add a note
    Add(TextArg),
    /// Delete a note by id
    Rm(NoteIdArg),
}

#[derive(Args)]
pub struct NoteIdArg {
    pub id: u64,
}

// ---------------------------------------------------------------------------
// Report args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SessionsArgs {
    /// Maximum number of sessions to show
    #[arg(long, default_value = "20")]
    pub limit: usize,
    /// Only sessions for this project
    #[arg(long, short)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,
    /// Email address
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// dark, light or system (omit to show)
    pub theme: Option<String>,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a config value
    Get(ConfigGetArgs),
    /// Set a config value, keeping comments and layout
    Set(ConfigSetArgs),
    /// Print the path to flowstate.toml
    Path,
}

#[derive(Args)]
pub struct ConfigGetArgs {
    /// Dotted key, e.g. timer.default_minutes
    pub key: String,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Data management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: flowstate-export.json)
    #[arg(long, short)]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Export file to read
    pub file: String,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm deleting all data
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove all entries instead of only those older than 30 days
    #[arg(long)]
    pub all: bool,
}
