use clap::{Args, Parser, Subcommand, ValueEnum};
use spark_core::models::TaskPriority;
use spark_core::projection::View;
use spark_core::recurrence::RecurrencePattern;

/// Spark: a personal task manager with views, date picking and a day planner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show a month grid, optionally dimming dates that do not match a query
    Calendar(CalendarCommand),
    /// Suggest a date for typed text such as "tom" or "fri"
    Suggest(SuggestCommand),
    /// Add a new task
    Add(AddCommand),
    /// List the tasks of a view
    List(ListCommand),
    /// Show one task with its subtasks and repeat rule
    Show(TaskIdCommand),
    /// Mark a task as completed
    Do(TaskIdCommand),
    /// Reopen a completed task
    Undo(TaskIdCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Manage areas
    Area(AreaCommand),
    /// Manage projects
    Project(ProjectCommand),
    /// Manage the checklist of a task
    Subtask(SubtaskCommand),
    /// Manage the repeat rule of a task
    Recur(RecurCommand),
    /// Plan the day with time blocks
    Block(BlockCommand),
    /// Sign up, sign in or sign out
    Auth(AuthCommand),
}

#[derive(Args, Debug, Clone)]
pub struct CalendarCommand {
    /// Month to show as YYYY-MM (defaults to the current month)
    #[arg(long)]
    pub month: Option<String>,
    /// Text to match against the dates of the month
    #[arg(long, short)]
    pub query: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SuggestCommand {
    /// The typed text
    pub query: String,
}

#[derive(Args, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    #[arg(long, short)]
    pub notes: Option<String>,
    /// The due date (YYYY-MM-DD, "tomorrow", "fri", "next week", ...)
    #[arg(long, short)]
    pub due: Option<String>,
    /// The date to work on the task
    #[arg(long, short)]
    pub when: Option<String>,
    /// Park the task in the someday list
    #[arg(long, conflicts_with = "when")]
    pub someday: bool,
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    /// Project name
    #[arg(long, short)]
    pub project: Option<String>,
    /// Area name
    #[arg(long, short)]
    pub area: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListCommand {
    /// A filter query (e.g. "priority:high and (due:today or due:overdue)")
    #[arg(default_value = "")]
    pub query: String,
    /// The view to list (inbox, today, upcoming, someday, completed)
    #[arg(long, short)]
    pub view: Option<View>,
    /// List the tasks of a project instead of a view
    #[arg(long, conflicts_with_all = ["view", "area"])]
    pub project: Option<String>,
    /// List the tasks of an area instead of a view
    #[arg(long, conflicts_with = "view")]
    pub area: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TaskIdCommand {
    /// The ID (or unique ID prefix) of the task
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the task to edit
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, conflicts_with = "notes")]
    pub notes_clear: bool,

    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, conflicts_with = "due")]
    pub due_clear: bool,

    #[arg(long)]
    pub when: Option<String>,
    #[arg(long, conflicts_with = "when")]
    pub when_clear: bool,

    #[arg(long, conflicts_with = "not_someday")]
    pub someday: bool,
    #[arg(long)]
    pub not_someday: bool,

    #[arg(long)]
    pub priority: Option<TaskPriority>,

    #[arg(long)]
    pub project: Option<String>,
    #[arg(long, conflicts_with = "project")]
    pub project_clear: bool,

    #[arg(long)]
    pub area: Option<String>,
    #[arg(long, conflicts_with = "area")]
    pub area_clear: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AreaCommand {
    #[command(subcommand)]
    pub command: AreaSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AreaSubcommand {
    /// Add a new area
    Add {
        name: String,
        /// Position in the area list
        #[arg(long)]
        order: Option<i64>,
    },
    /// List areas
    List,
    /// Rename an area
    Rename { name: String, new_name: String },
    /// Archive an area
    Archive { name: String },
}

#[derive(Args, Debug, Clone)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProjectSubcommand {
    /// Add a new project
    Add(AddProjectCommand),
    /// List projects
    List,
    /// Edit a project
    Edit(EditProjectCommand),
    /// Archive a project
    Archive { name: String },
}

#[derive(Args, Debug, Clone)]
pub struct AddProjectCommand {
    /// The name of the project
    pub name: String,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditProjectCommand {
    /// The current name of the project
    pub name: String,
    #[arg(long)]
    pub rename: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, conflicts_with = "notes")]
    pub notes_clear: bool,
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long, conflicts_with = "area")]
    pub area_clear: bool,
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, conflicts_with = "due")]
    pub due_clear: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SubtaskCommand {
    #[command(subcommand)]
    pub command: SubtaskSubcommand,
}

/// Subtasks are addressed by their 1-based position in the task's checklist.
#[derive(Subcommand, Debug, Clone)]
pub enum SubtaskSubcommand {
    /// Add a checklist item to a task
    Add { task: String, title: String },
    /// List the checklist of a task
    List { task: String },
    /// Check off a checklist item
    Done { task: String, position: usize },
    /// Uncheck a checklist item
    Undo { task: String, position: usize },
    /// Rename a checklist item
    Rename {
        task: String,
        position: usize,
        title: String,
    },
    /// Remove a checklist item
    Delete { task: String, position: usize },
}

#[derive(Args, Debug, Clone)]
pub struct RecurCommand {
    #[command(subcommand)]
    pub command: RecurSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecurSubcommand {
    /// Make a task repeat, replacing any rule it has
    Set(RecurSetCommand),
    /// Show the repeat rule of a task
    Show { task: String },
    /// Stop a task from repeating
    Clear { task: String },
}

#[derive(Args, Debug, Clone)]
pub struct RecurSetCommand {
    /// The ID of the task
    pub task: String,
    #[arg(long, value_enum)]
    pub every: PatternArg,
    /// Repeat every N days, weeks or months
    #[arg(long, default_value_t = 1)]
    pub interval: u32,
    /// Weekdays for weekly rules, comma separated (mon,wed,fri)
    #[arg(long, value_delimiter = ',')]
    pub on: Vec<String>,
    /// Last date of the rule
    #[arg(long, conflicts_with = "count")]
    pub until: Option<String>,
    /// Number of occurrences
    #[arg(long)]
    pub count: Option<u32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternArg {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl From<PatternArg> for RecurrencePattern {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::Daily => RecurrencePattern::Daily,
            PatternArg::Weekly => RecurrencePattern::Weekly,
            PatternArg::Monthly => RecurrencePattern::Monthly,
            PatternArg::Custom => RecurrencePattern::Custom,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BlockCommand {
    #[command(subcommand)]
    pub command: BlockSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum BlockSubcommand {
    /// Block out time on a day
    Add(AddBlockCommand),
    /// List the time blocks of a day
    List {
        /// The day to show (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a time block
    Delete {
        /// The ID (or unique ID prefix) of the block
        id: String,
        /// The day the block is on (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AddBlockCommand {
    pub title: String,
    /// Start time, HH:MM
    #[arg(long)]
    pub from: String,
    /// End time, HH:MM
    #[arg(long)]
    pub to: String,
    /// The day of the block (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
    /// Task the block is for
    #[arg(long)]
    pub task: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AuthSubcommand {
    /// Create an account and sign in
    Signup { email: String },
    /// Sign in to an existing account
    Signin { email: String },
    /// Start over with a fresh anonymous account
    Anonymous,
    /// Sign out
    Signout,
    /// Show who is signed in
    Whoami,
}
