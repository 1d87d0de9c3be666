// crates/hierarchy-authz-cli/src/main.rs
// ============================================================================
// Module: Hierarchy Authz CLI Entry Point
// Description: Command dispatcher for role checks, grants, and migration.
// Purpose: Operate a role assignment store from the command line.
// Dependencies: clap, hierarchy-authz-{core,config,store-sqlite,migration}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `hierarchy-authz` binary answers authorization questions against the
//! configured `SQLite` store, edits role assignments, and runs the one-shot
//! directory migration. Results are JSON on stdout; errors go to stderr with a
//! non-zero exit code. `check` exits with 2 when the permission is denied.
//! Security posture: inputs are untrusted and validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use hierarchy_authz_config::AuditSinkKind;
use hierarchy_authz_config::HierarchyAuthzConfig;
use hierarchy_authz_core::AnyPermission;
use hierarchy_authz_core::Authorizer;
use hierarchy_authz_core::HierarchyAddress;
use hierarchy_authz_core::PermissionCheck;
use hierarchy_authz_core::Role;
use hierarchy_authz_core::UserId;
use hierarchy_authz_migration::FileMigrationAuditSink;
use hierarchy_authz_migration::GroupNaming;
use hierarchy_authz_migration::MigrationAuditSink;
use hierarchy_authz_migration::NoopMigrationAuditSink;
use hierarchy_authz_migration::RoleMigration;
use hierarchy_authz_migration::StaticGroupDirectory;
use hierarchy_authz_migration::StaticHierarchyCatalog;
use hierarchy_authz_migration::StderrMigrationAuditSink;
use hierarchy_authz_store_sqlite::SqliteRoleAssignmentStore;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exit code reported by `check` when the permission is denied.
const DENIED_EXIT_CODE: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "hierarchy-authz", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to `HIERARCHY_AUTHZ_CONFIG` or hierarchy-authz.toml).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide whether a user holds a permission on a node.
    Check(CheckCommand),
    /// Print the listing filter for a user and permission.
    Filter(FilterCommand),
    /// Print the user's highest role on a node.
    EffectiveRole(EffectiveRoleCommand),
    /// Grant a role on a node, replacing any role held there.
    Assign(AssignCommand),
    /// Remove the user's role on a node.
    Revoke(RevokeCommand),
    /// Import directory group roles into an empty store.
    Migrate,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Permission selection shared by `check` and `filter`.
#[derive(Args, Debug)]
struct PermissionArgs {
    /// Required permission as `family:name`; repeat for several.
    #[arg(long = "permission", value_name = "PERMISSION", required_unless_present = "role")]
    permissions: Vec<AnyPermission>,
    /// Required role as `family:rank`.
    #[arg(long, value_name = "ROLE", conflicts_with = "permissions")]
    role: Option<Role>,
}

impl PermissionArgs {
    /// Builds the permission check.
    fn check(&self) -> CliResult<PermissionCheck> {
        if let Some(role) = self.role {
            return Ok(PermissionCheck::for_role(role));
        }
        PermissionCheck::for_any(&self.permissions)
            .map_err(|err| CliError::new(format!("invalid permissions: {err}")))
    }
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// User identifier.
    #[arg(long)]
    user: String,
    /// Target node, e.g. `org:1/product:2`.
    #[arg(long)]
    target: HierarchyAddress,
    /// Permission selection.
    #[command(flatten)]
    permission: PermissionArgs,
}

/// Arguments for `filter`.
#[derive(Args, Debug)]
struct FilterCommand {
    /// User identifier.
    #[arg(long)]
    user: String,
    /// Restrict the filter to this subtree.
    #[arg(long, value_name = "ADDRESS")]
    contained_in: Option<HierarchyAddress>,
    /// Permission selection.
    #[command(flatten)]
    permission: PermissionArgs,
}

/// Arguments for `effective-role`.
#[derive(Args, Debug)]
struct EffectiveRoleCommand {
    /// User identifier.
    #[arg(long)]
    user: String,
    /// Target node.
    #[arg(long)]
    target: HierarchyAddress,
}

/// Arguments for `assign`.
#[derive(Args, Debug)]
struct AssignCommand {
    /// User identifier.
    #[arg(long)]
    user: String,
    /// Role as `family:rank`.
    #[arg(long)]
    role: Role,
    /// Node receiving the role; `*` only with `organization:admin`.
    #[arg(long)]
    target: HierarchyAddress,
}

/// Arguments for `revoke`.
#[derive(Args, Debug)]
struct RevokeCommand {
    /// User identifier.
    #[arg(long)]
    user: String,
    /// Node to clear.
    #[arg(long)]
    target: HierarchyAddress,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration file.
    Validate,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// `check` result.
#[derive(Debug, Serialize)]
struct CheckOutput {
    /// Whether the permission is granted.
    allowed: bool,
    /// Whether the user is a superuser.
    superuser: bool,
}

/// `assign` and `revoke` result.
#[derive(Debug, Serialize)]
struct AssignmentOutput<'a> {
    /// User identifier.
    user: &'a str,
    /// Target node in text form.
    target: String,
    /// Role granted, absent for revocations.
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    /// Whether the store changed.
    changed: bool,
}

/// `config validate` result.
#[derive(Debug, Serialize)]
struct ConfigOutput {
    /// Always true when printed.
    valid: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    // Usage errors exit with 1; exit code 2 is reserved for denied checks.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return Ok(if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS });
        }
    };
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Check(command) => command_check(config_path, &command),
        Commands::Filter(command) => command_filter(config_path, &command),
        Commands::EffectiveRole(command) => command_effective_role(config_path, &command),
        Commands::Assign(command) => command_assign(config_path, &command),
        Commands::Revoke(command) => command_revoke(config_path, &command),
        Commands::Migrate => command_migrate(config_path),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate => command_config_validate(config_path),
        },
    }
}

// ============================================================================
// SECTION: Authorization Commands
// ============================================================================

/// Executes `check`.
fn command_check(config_path: Option<&Path>, command: &CheckCommand) -> CliResult<ExitCode> {
    let authorizer = open_authorizer(config_path)?;
    let user = UserId::new(command.user.as_str());
    let permissions = authorizer
        .permissions(&user, command.permission.check()?)
        .map_err(|err| CliError::new(format!("authorization failed: {err}")))?;
    let output = CheckOutput {
        allowed: permissions.has_permission(&command.target),
        superuser: permissions.is_superuser(),
    };
    write_json(&output)?;
    if output.allowed { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::from(DENIED_EXIT_CODE)) }
}

/// Executes `filter`.
fn command_filter(config_path: Option<&Path>, command: &FilterCommand) -> CliResult<ExitCode> {
    let authorizer = open_authorizer(config_path)?;
    let filter = authorizer
        .filter(&UserId::new(command.user.as_str()), command.permission.check()?, command.contained_in.as_ref())
        .map_err(|err| CliError::new(format!("authorization failed: {err}")))?;
    write_json(&filter)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `effective-role`.
fn command_effective_role(
    config_path: Option<&Path>,
    command: &EffectiveRoleCommand,
) -> CliResult<ExitCode> {
    let authorizer = open_authorizer(config_path)?;
    let effective = authorizer
        .effective_role(&UserId::new(command.user.as_str()), &command.target)
        .map_err(|err| CliError::new(format!("authorization failed: {err}")))?;
    write_json(&effective)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Assignment Commands
// ============================================================================

/// Executes `assign`.
fn command_assign(config_path: Option<&Path>, command: &AssignCommand) -> CliResult<ExitCode> {
    let authorizer = open_authorizer(config_path)?;
    authorizer
        .assign_role(&UserId::new(command.user.as_str()), command.role, command.target)
        .map_err(|err| CliError::new(format!("assignment rejected: {err}")))?;
    write_json(&AssignmentOutput {
        user: &command.user,
        target: command.target.to_string(),
        role: Some(command.role.to_string()),
        changed: true,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `revoke`.
fn command_revoke(config_path: Option<&Path>, command: &RevokeCommand) -> CliResult<ExitCode> {
    let authorizer = open_authorizer(config_path)?;
    let changed = authorizer
        .remove_assignment(&UserId::new(command.user.as_str()), &command.target)
        .map_err(|err| CliError::new(format!("revocation failed: {err}")))?;
    write_json(&AssignmentOutput {
        user: &command.user,
        target: command.target.to_string(),
        role: None,
        changed,
    })?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Migration Command
// ============================================================================

/// Executes `migrate`.
fn command_migrate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let directory_path = config.migration.directory_snapshot.as_deref().ok_or_else(|| {
        CliError::new("migration.directory_snapshot is required for migrate".to_string())
    })?;
    let catalog_path = config.migration.catalog_snapshot.as_deref().ok_or_else(|| {
        CliError::new("migration.catalog_snapshot is required for migrate".to_string())
    })?;
    let directory = StaticGroupDirectory::load(directory_path)
        .map_err(|err| CliError::new(format!("failed to load directory snapshot: {err}")))?;
    let catalog = StaticHierarchyCatalog::load(catalog_path)
        .map_err(|err| CliError::new(format!("failed to load catalog snapshot: {err}")))?;
    let store = open_store(&config)?;
    let naming = GroupNaming::new(config.migration.group_prefix.as_str(), config.migration.superuser_group.as_str());

    let outcome = RoleMigration::new(store, directory, catalog)
        .with_naming(naming)
        .with_audit(audit_sink(&config)?)
        .run()
        .map_err(|err| CliError::new(format!("migration failed: {err}")))?;
    write_json(&outcome)?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the configured audit sink.
fn audit_sink(config: &HierarchyAuthzConfig) -> CliResult<Arc<dyn MigrationAuditSink>> {
    match (config.audit.sink, config.audit.path.as_deref()) {
        (AuditSinkKind::File, Some(path)) => {
            let sink = FileMigrationAuditSink::new(path)
                .map_err(|err| CliError::new(format!("failed to open audit log: {err}")))?;
            Ok(Arc::new(sink))
        }
        (AuditSinkKind::File, None) => Err(CliError::new("audit.path is required".to_string())),
        (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrMigrationAuditSink)),
        (AuditSinkKind::None, _) => Ok(Arc::new(NoopMigrationAuditSink)),
    }
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes `config validate`.
fn command_config_validate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    load_config(config_path)?;
    write_json(&ConfigOutput {
        valid: true,
    })?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(config_path: Option<&Path>) -> CliResult<HierarchyAuthzConfig> {
    HierarchyAuthzConfig::load(config_path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Opens the configured `SQLite` store.
fn open_store(config: &HierarchyAuthzConfig) -> CliResult<SqliteRoleAssignmentStore> {
    SqliteRoleAssignmentStore::new(&config.sqlite_config())
        .map_err(|err| CliError::new(format!("failed to open store: {err}")))
}

/// Loads configuration and wraps the store in an authorizer.
fn open_authorizer(config_path: Option<&Path>) -> CliResult<Authorizer<SqliteRoleAssignmentStore>> {
    let config = load_config(config_path)?;
    Ok(Authorizer::new(open_store(&config)?))
}

/// Writes a value as one JSON line on stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let payload = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))?;
    write_stdout_line(&payload).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
