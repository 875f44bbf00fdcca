//! Command definitions and dispatch.
//!
//! Each command runs as one tracked operation: it is started on the
//! tracker, executed against the repository, and finished through the
//! [`ErrorReporter`], whose return value is the process exit code.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::info;

use worktrack_core::{
    CoreError, InMemoryItemRepository, ItemId, ItemRepository, Priority, WorkItem,
    WorkItemCreateRequest, WorkItemType, WorkflowState,
};

use crate::output::to_json;
use crate::{
    Cause, CliError, Config, ErrorReporter, InMemoryOperationTracker, OutputFormat, Severity,
};

/// Worktrack CLI - work item tracking
#[derive(Debug, Parser)]
#[command(name = "worktrack")]
#[command(about = "Track work items from the command line", long_about = None)]
pub struct Cli {
    /// Output format for results and errors
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Include cause and stack detail in error output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file of work items to load before running the command
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Commands {
    /// Create a new work item
    Add {
        /// Short summary
        #[arg(short, long)]
        title: String,

        /// Item type (goal, feature, bug, chore)
        #[arg(long = "type", default_value = "bug")]
        item_type: String,

        /// Priority (critical, high, medium, low)
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Owner of the item
        #[arg(short, long)]
        assignee: Option<String>,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List work items
    List {
        /// Only items of this type
        #[arg(long = "type")]
        item_type: Option<String>,

        /// Only items in this workflow state
        #[arg(long)]
        status: Option<String>,

        /// Only items owned by this assignee
        #[arg(long, conflicts_with = "unassigned")]
        assignee: Option<String>,

        /// Only items without an assignee
        #[arg(long)]
        unassigned: bool,
    },

    /// Show one work item
    Show {
        /// Item ID
        id: String,
    },

    /// Set or clear the assignee of a work item
    Assign {
        /// Item ID
        id: String,

        /// New assignee; omit to unassign
        assignee: Option<String>,
    },

    /// Move a work item to another workflow state
    Move {
        /// Item ID
        id: String,

        /// Target state (found, triaged, to-do, in-progress, in-test, done)
        state: String,
    },

    /// Delete a work item
    Delete {
        /// Item ID
        id: String,
    },
}

impl Commands {
    /// Command name used for tracking and messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::List { .. } => "list",
            Self::Show { .. } => "show",
            Self::Assign { .. } => "assign",
            Self::Move { .. } => "move",
            Self::Delete { .. } => "delete",
        }
    }

    fn params(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Why a command did not succeed.
enum Failure {
    /// Bad input, keyed by field.
    Invalid(BTreeMap<String, String>),
    /// The command could not be carried out.
    Rejected { message: String, cause: Cause },
    /// Anything else.
    Unexpected(Cause),
}

impl Failure {
    fn invalid(field: &str, error: impl ToString) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), error.to_string());
        Self::Invalid(errors)
    }

    fn rejected(error: CoreError) -> Self {
        Self::Rejected {
            message: error.to_string(),
            cause: error.into(),
        }
    }
}

/// Successful command output: data for JSON mode, lines for text mode.
struct Success {
    data: Map<String, Value>,
    text: Vec<String>,
}

/// Build the item repository, loading the seed file when one is configured.
///
/// Seed failures are reported as unexpected errors; the returned `Err`
/// carries the exit code.
pub fn open_repository(
    config: &Config,
    tracker: &InMemoryOperationTracker,
    reporter: &ErrorReporter,
) -> Result<InMemoryItemRepository, i32> {
    let Some(path) = &config.seed_path else {
        return Ok(InMemoryItemRepository::new());
    };

    let op = tracker.start_operation("load-seed", json!({ "path": path.display().to_string() }));
    match load_seed(path) {
        Ok(items) => {
            let count = items.len();
            info!(path = %path.display(), count, "Loaded seed items");
            reporter.handle_success(&op, json!({ "loaded": count }));
            Ok(InMemoryItemRepository::with_items(items))
        }
        Err(e) => {
            let cause = e.into();
            Err(reporter.handle_unexpected_error(&op, "load-seed", cause, Severity::System))
        }
    }
}

/// Read a JSON array of work items.
pub fn load_seed(path: &Path) -> Result<Vec<WorkItem>, CliError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Run one command and return its exit code.
pub fn run(
    command: &Commands,
    repo: &dyn ItemRepository,
    tracker: &InMemoryOperationTracker,
    reporter: &ErrorReporter,
    out: &mut dyn Write,
) -> i32 {
    let name = command.name();
    let op = tracker.start_operation(name, command.params());

    let outcome = match command {
        Commands::Add {
            title,
            item_type,
            priority,
            assignee,
            description,
        } => add(repo, title, item_type, priority, assignee.as_deref(), description.as_deref()),
        Commands::List {
            item_type,
            status,
            assignee,
            unassigned,
        } => list(repo, item_type.as_deref(), status.as_deref(), assignee.as_deref(), *unassigned),
        Commands::Show { id } => show(repo, id),
        Commands::Assign { id, assignee } => assign(repo, id, assignee.as_deref()),
        Commands::Move { id, state } => move_item(repo, id, state),
        Commands::Delete { id } => delete(repo, id),
    };

    let success = match outcome {
        Ok(success) => success,
        Err(Failure::Invalid(errors)) => {
            return reporter.handle_validation_error(&op, name, &errors)
        }
        Err(Failure::Rejected { message, cause }) => {
            return reporter.handle_error(&op, name, &message, Some(cause), Severity::Error)
        }
        Err(Failure::Unexpected(cause)) => {
            return reporter.handle_unexpected_error(&op, name, cause, Severity::System)
        }
    };

    let result = reporter.create_success_result(name, success.data);
    if let Err(e) = write_success(out, reporter, &result, &success.text) {
        return reporter.handle_unexpected_error(&op, name, e.into(), Severity::System);
    }
    reporter.handle_success(&op, Value::Object(result))
}

fn write_success(
    out: &mut dyn Write,
    reporter: &ErrorReporter,
    result: &Map<String, Value>,
    text: &[String],
) -> Result<(), CliError> {
    let config = reporter.config();
    match config.output_format {
        OutputFormat::Json => writeln!(out, "{}", to_json(result, config.verbose))?,
        OutputFormat::Text => {
            for line in text {
                writeln!(out, "{line}")?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn parse_id(id: &str) -> Result<ItemId, Failure> {
    ItemId::parse(id).map_err(|_| Failure::invalid("id", format!("'{id}' is not a valid item id")))
}

fn find(repo: &dyn ItemRepository, id: &str) -> Result<WorkItem, Failure> {
    let id = parse_id(id)?;
    repo.find_by_id(&id)
        .ok_or_else(|| Failure::rejected(CoreError::ItemNotFound(id.to_string())))
}

fn item_data(item: &WorkItem) -> Result<Map<String, Value>, Failure> {
    let value = serde_json::to_value(item).map_err(|e| Failure::Unexpected(e.into()))?;
    let mut data = Map::new();
    data.insert("item".into(), value);
    Ok(data)
}

fn add(
    repo: &dyn ItemRepository,
    title: &str,
    item_type: &str,
    priority: &str,
    assignee: Option<&str>,
    description: Option<&str>,
) -> Result<Success, Failure> {
    let mut errors = BTreeMap::new();
    if title.trim().is_empty() {
        errors.insert("title".to_string(), "must not be empty".to_string());
    }
    let item_type = item_type
        .parse::<WorkItemType>()
        .map_err(|e| errors.insert("type".to_string(), e.to_string()))
        .ok();
    let priority = priority
        .parse::<Priority>()
        .map_err(|e| errors.insert("priority".to_string(), e.to_string()))
        .ok();

    let (Some(item_type), Some(priority), true) = (item_type, priority, errors.is_empty()) else {
        return Err(Failure::Invalid(errors));
    };

    let mut request = WorkItemCreateRequest::new(title.trim())
        .with_type(item_type)
        .with_priority(priority);
    if let Some(assignee) = assignee {
        request = request.with_assignee(assignee);
    }
    if let Some(description) = description {
        request = request.with_description(description);
    }

    let item = repo.create(request);
    info!(item_id = %item.id, "Work item created");

    let mut text = vec!["Work item created:".to_string()];
    text.extend(item_lines(&item));
    Ok(Success {
        data: item_data(&item)?,
        text,
    })
}

fn list(
    repo: &dyn ItemRepository,
    item_type: Option<&str>,
    status: Option<&str>,
    assignee: Option<&str>,
    unassigned: bool,
) -> Result<Success, Failure> {
    let mut errors = BTreeMap::new();
    let item_type = item_type.and_then(|t| {
        t.parse::<WorkItemType>()
            .map_err(|e| errors.insert("type".to_string(), e.to_string()))
            .ok()
    });
    let status = status.and_then(|s| {
        s.parse::<WorkflowState>()
            .map_err(|e| errors.insert("status".to_string(), e.to_string()))
            .ok()
    });
    if !errors.is_empty() {
        return Err(Failure::Invalid(errors));
    }

    let mut selections = Vec::new();
    if let Some(t) = item_type {
        selections.push(repo.find_by_type(t.as_str()));
    }
    if let Some(s) = status {
        selections.push(repo.find_by_status(s.as_str()));
    }
    if unassigned {
        selections.push(repo.find_by_assignee(None));
    } else if let Some(a) = assignee {
        selections.push(repo.find_by_assignee(Some(a)));
    }

    let mut items = match selections.pop() {
        None => repo.find_all(),
        Some(mut items) => {
            for other in selections {
                let ids: HashSet<ItemId> = other.iter().map(|i| i.id).collect();
                items.retain(|i| ids.contains(&i.id));
            }
            items
        }
    };
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let mut text = vec![
        format!("Work items ({}):", items.len()),
        format!(
            "{:<36}  {:<8}  {:<12}  {:<8}  {:<12}  {}",
            "ID", "TYPE", "STATUS", "PRIORITY", "ASSIGNEE", "TITLE"
        ),
        "-".repeat(100),
    ];
    for item in &items {
        text.push(format!(
            "{:<36}  {:<8}  {:<12}  {:<8}  {:<12}  {}",
            item.id,
            item.item_type,
            item.status,
            item.priority,
            item.assignee.as_deref().unwrap_or("-"),
            item.title
        ));
    }

    let mut data = Map::new();
    data.insert("count".into(), json!(items.len()));
    data.insert("items".into(), json!(items));
    Ok(Success { data, text })
}

fn show(repo: &dyn ItemRepository, id: &str) -> Result<Success, Failure> {
    let item = find(repo, id)?;
    Ok(Success {
        data: item_data(&item)?,
        text: item_lines(&item),
    })
}

fn assign(repo: &dyn ItemRepository, id: &str, assignee: Option<&str>) -> Result<Success, Failure> {
    let mut item = find(repo, id)?;
    item.assign(assignee.map(str::to_string));
    let item = repo.save(item);

    let mut text = vec!["Work item updated:".to_string()];
    text.extend(item_lines(&item));
    Ok(Success {
        data: item_data(&item)?,
        text,
    })
}

fn move_item(repo: &dyn ItemRepository, id: &str, state: &str) -> Result<Success, Failure> {
    let mut item = find(repo, id)?;
    let target = state
        .parse::<WorkflowState>()
        .map_err(|e| Failure::invalid("state", e))?;

    let from = item.status;
    item.transition_to(target).map_err(Failure::rejected)?;
    let item = repo.save(item);
    info!(item_id = %item.id, from = %from, to = %target, "Work item moved");

    let mut data = item_data(&item)?;
    data.insert("from".into(), json!(from));
    let mut text = vec![format!("Work item moved: {from} -> {target}")];
    text.extend(item_lines(&item));
    Ok(Success { data, text })
}

fn delete(repo: &dyn ItemRepository, id: &str) -> Result<Success, Failure> {
    let item = find(repo, id)?;
    repo.delete_by_id(&item.id);

    let mut data = Map::new();
    data.insert("id".into(), json!(item.id));
    Ok(Success {
        data,
        text: vec![format!("Work item deleted: {}", item.id)],
    })
}

fn item_lines(item: &WorkItem) -> Vec<String> {
    let mut lines = vec![
        format!("  ID:         {}", item.id),
        format!("  Title:      {}", item.title),
        format!("  Type:       {}", item.item_type),
        format!("  Status:     {}", item.status),
        format!("  Priority:   {}", item.priority),
        format!("  Assignee:   {}", item.assignee.as_deref().unwrap_or("-")),
        format!("  Created:    {}", item.created_at.format("%Y-%m-%d %H:%M:%S")),
    ];
    if let Some(description) = &item.description {
        lines.push(format!("  Description: {description}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OperationStatus, ReporterConfig};
    use std::sync::{Arc, Mutex};

    struct Fixture {
        repo: InMemoryItemRepository,
        tracker: Arc<InMemoryOperationTracker>,
        errors: Arc<Mutex<Vec<String>>>,
        reporter: ErrorReporter,
    }

    impl Fixture {
        fn new(format: OutputFormat) -> Self {
            let tracker = Arc::new(InMemoryOperationTracker::new());
            let errors = Arc::new(Mutex::new(Vec::new()));
            let sink_errors = Arc::clone(&errors);
            let config = ReporterConfig::default()
                .with_output_format(format)
                .with_sink(Arc::new(move |s: &str| sink_errors.lock().unwrap().push(s.to_string())))
                .with_diagnostics(Arc::new(|_: &str| {}));
            let reporter = ErrorReporter::new(tracker.clone(), config);
            Self {
                repo: InMemoryItemRepository::new(),
                tracker,
                errors,
                reporter,
            }
        }

        fn run(&self, args: &[&str]) -> (i32, String) {
            let mut argv = vec!["worktrack"];
            argv.extend_from_slice(args);
            let cli = Cli::try_parse_from(argv).unwrap();
            let mut out = Vec::new();
            let code = run(&cli.command, &self.repo, &self.tracker, &self.reporter, &mut out);
            (code, String::from_utf8(out).unwrap())
        }

        fn errors(&self) -> Vec<String> {
            self.errors.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_add_creates_item() {
        let f = Fixture::new(OutputFormat::Text);
        let (code, out) =
            f.run(&["add", "--title", "Fix login", "--type", "feature", "-a", "alice"]);

        assert_eq!(code, 0);
        assert!(out.starts_with("Work item created:"));
        assert!(out.contains("FEATURE"));
        let items = f.repo.find_by_assignee(Some("alice"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Fix login");

        let ops = f.tracker.operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].command, "add");
        assert_eq!(ops[0].status, OperationStatus::Completed);
        assert_eq!(ops[0].result.as_ref().unwrap()["success"], true);
    }

    #[test]
    fn test_add_rejects_bad_type_and_priority() {
        let f = Fixture::new(OutputFormat::Text);
        let (code, out) = f.run(&["add", "--title", "x", "--type", "epic", "--priority", "urgent"]);

        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(f.repo.is_empty());
        let errors = f.errors();
        assert!(errors[0].starts_with("Error: Validation errors:"));
        assert!(errors[0].contains(" - type: Invalid input: unknown work item type 'epic'"));
        assert!(errors[0].contains(" - priority: Invalid input: unknown priority 'urgent'"));
    }

    #[test]
    fn test_show_missing_item_reports_error() {
        let f = Fixture::new(OutputFormat::Text);
        let id = ItemId::generate();
        let (code, _) = f.run(&["show", &id.to_string()]);

        assert_eq!(code, 1);
        assert_eq!(f.errors(), vec![format!("ERROR ERROR: Work item not found: {id}")]);
        let op = &f.tracker.operations()[0];
        assert_eq!(op.status, OperationStatus::Failed);
        assert_eq!(op.details["errorSeverity"], "ERROR");
    }

    #[test]
    fn test_bad_id_is_validation_error() {
        let f = Fixture::new(OutputFormat::Text);
        let (code, _) = f.run(&["delete", "nope"]);

        assert_eq!(code, 1);
        assert!(f.errors()[0].contains(" - id: 'nope' is not a valid item id"));
        let op = &f.tracker.operations()[0];
        assert_eq!(op.details["errorSeverity"], "VALIDATION");
        assert!(op.details.contains_key("validationError_id"));
    }

    #[test]
    fn test_move_follows_workflow() {
        let f = Fixture::new(OutputFormat::Text);
        let item = f.repo.create(WorkItemCreateRequest::new("t"));
        let id = item.id.to_string();

        let (code, out) = f.run(&["move", &id, "triaged"]);
        assert_eq!(code, 0);
        assert!(out.starts_with("Work item moved: FOUND -> TRIAGED"));

        let (code, _) = f.run(&["move", &id, "done"]);
        assert_eq!(code, 1);
        assert_eq!(
            f.errors(),
            vec!["ERROR ERROR: Invalid workflow transition: TRIAGED -> DONE"]
        );
        assert_eq!(f.repo.find_by_id(&item.id).unwrap().status, WorkflowState::Triaged);
    }

    #[test]
    fn test_assign_and_unassign() {
        let f = Fixture::new(OutputFormat::Text);
        let item = f.repo.create(WorkItemCreateRequest::new("t"));
        let id = item.id.to_string();

        assert_eq!(f.run(&["assign", &id, "bob"]).0, 0);
        assert_eq!(f.repo.find_by_id(&item.id).unwrap().assignee.as_deref(), Some("bob"));

        assert_eq!(f.run(&["assign", &id]).0, 0);
        assert!(f.repo.find_by_id(&item.id).unwrap().assignee.is_none());
    }

    #[test]
    fn test_list_json_with_filters() {
        let f = Fixture::new(OutputFormat::Json);
        f.repo.create(WorkItemCreateRequest::new("a").with_type(WorkItemType::Bug));
        f.repo.create(
            WorkItemCreateRequest::new("b")
                .with_type(WorkItemType::Bug)
                .with_assignee("eve"),
        );
        f.repo.create(WorkItemCreateRequest::new("c").with_type(WorkItemType::Chore));

        let (code, out) = f.run(&["list", "--type", "bug", "--status", "found", "--unassigned"]);
        assert_eq!(code, 0);

        let v: Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["command"], "list");
        assert_eq!(v["count"], 1);
        assert_eq!(v["items"][0]["title"], "a");

        let (_, out) = f.run(&["list", "--assignee", "eve"]);
        let v: Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["count"], 1);
        assert_eq!(v["items"][0]["title"], "b");
    }

    #[test]
    fn test_list_accepts_loose_state_names() {
        let f = Fixture::new(OutputFormat::Json);
        let mut item = f.repo.create(WorkItemCreateRequest::new("busy"));
        item.transition_to(WorkflowState::Triaged).unwrap();
        item.transition_to(WorkflowState::ToDo).unwrap();
        item.transition_to(WorkflowState::InProgress).unwrap();
        f.repo.save(item);
        f.repo.create(WorkItemCreateRequest::new("idle"));

        let (code, out) = f.run(&["list", "--status", "in-progress"]);
        assert_eq!(code, 0);
        let v: Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["count"], 1);
        assert_eq!(v["items"][0]["title"], "busy");
    }

    #[test]
    fn test_list_rejects_unknown_filter_values() {
        let f = Fixture::new(OutputFormat::Text);
        let (code, out) = f.run(&["list", "--type", "epic", "--status", "closed"]);

        assert_eq!(code, 1);
        assert!(out.is_empty());
        let errors = f.errors();
        assert!(errors[0].contains(" - type: Invalid input: unknown work item type 'epic'"));
        assert!(errors[0].contains(" - status: Invalid input: unknown workflow state 'closed'"));
    }

    #[test]
    fn test_delete_removes_item() {
        let f = Fixture::new(OutputFormat::Text);
        let item = f.repo.create(WorkItemCreateRequest::new("t"));

        let (code, out) = f.run(&["delete", &item.id.to_string()]);
        assert_eq!(code, 0);
        assert_eq!(out.trim(), format!("Work item deleted: {}", item.id));
        assert!(f.repo.is_empty());
    }

    #[test]
    fn test_missing_seed_file_is_unexpected_error() {
        let tracker = Arc::new(InMemoryOperationTracker::new());
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink_errors = Arc::clone(&errors);
        let reporter = ErrorReporter::new(
            tracker.clone(),
            ReporterConfig::default()
                .with_sink(Arc::new(move |s: &str| {
                    sink_errors.lock().unwrap().push(s.to_string())
                })),
        );
        let config = Config {
            seed_path: Some(PathBuf::from("/nonexistent/worktrack-seed.json")),
            ..Config::default()
        };

        let code = open_repository(&config, &tracker, &reporter).unwrap_err();
        assert_eq!(code, 1);
        let errors = errors.lock().unwrap();
        assert!(errors[0].starts_with("SYSTEM ERROR: Unexpected error in load-seed: I/O error:"));
        let op = &tracker.operations()[0];
        assert_eq!(op.command, "load-seed");
        assert!(op.details["unexpectedError"]["error_kind"]
            .as_str()
            .unwrap()
            .ends_with("CliError"));
    }

    #[test]
    fn test_no_seed_gives_empty_repository() {
        let tracker = Arc::new(InMemoryOperationTracker::new());
        let reporter = ErrorReporter::new(tracker.clone(), ReporterConfig::default());
        let repo = open_repository(&Config::default(), &tracker, &reporter).unwrap();
        assert!(repo.is_empty());
        assert!(tracker.operations().is_empty());
    }
}
