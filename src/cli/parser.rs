use crate::export::{ExportFormat, ExportKind};
use crate::models::status::ReportType;
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for sakip
/// Administration of the SAKIP performance-accountability database
#[derive(Parser)]
#[command(
    name = "sakip",
    version = env!("CARGO_PKG_VERSION"),
    about = "SAKIP performance accountability: master data, performance data, assessments, reports and a JSON API over SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Validate the configuration and report problems")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long, help = "Only the N most recent rows")]
        limit: Option<usize>,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f', help = "Overwrite without asking")]
        force: bool,
    },

    /// Export master data, performance data or a dashboard report
    Export {
        #[arg(long = "type", value_enum, default_value = "performance-data")]
        kind: ExportKind,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE", help = "Absolute output path")]
        file: String,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long = "instansi")]
        instansi_id: Option<i64>,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter performance data by period: YYYY, YYYY-MM or YYYY-MM:YYYY-MM"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Government institutions
    Instansi {
        #[command(subcommand)]
        action: InstansiAction,
    },

    /// Programs of an instansi
    Program {
        #[command(subcommand)]
        action: ProgramAction,
    },

    /// Activities (kegiatan) of a program
    Kegiatan {
        #[command(subcommand)]
        action: KegiatanAction,
    },

    /// Performance indicators
    Indicator {
        #[command(subcommand)]
        action: IndicatorAction,
    },

    /// Yearly indicator targets
    Target {
        #[command(subcommand)]
        action: TargetAction,
    },

    /// Performance data (realisation) and its evidence
    Data {
        #[command(subcommand)]
        action: DataAction,
    },

    /// Assessments of submitted performance data
    Assessment {
        #[command(subcommand)]
        action: AssessmentAction,
    },

    /// Generated reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// Show the performance dashboard
    Dashboard {
        #[arg(long = "instansi")]
        instansi_id: Option<i64>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long, help = "Print the dashboard as JSON")]
        json: bool,
    },

    /// User accounts and API tokens
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Roles and direct permissions
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },

    /// Create missing SAKIP permissions and attach them to users or roles
    AddPermissions {
        #[arg(long, value_name = "ID|EMAIL", help = "Grant the required permissions to one user")]
        user: Option<String>,

        #[arg(long, value_name = "NAME", help = "Grant the required permissions to a role")]
        role: Option<String>,

        #[arg(long = "all-users", help = "Grant dashboard access to every user")]
        all_users: bool,

        #[arg(
            long = "fix-all",
            help = "Give superadmin every permission and every user dashboard access"
        )]
        fix_all: bool,
    },

    /// Remove seeded test and demo accounts
    RemoveTestUsers {
        #[arg(long, short = 'f', help = "Skip the confirmation prompt")]
        force: bool,

        #[arg(long = "dry-run", help = "Only list the matching users")]
        dry_run: bool,
    },

    /// Find Request classes imported from the wrong namespace and missing imports
    CheckMissingClasses {
        #[arg(long, default_value = "app/Http/Controllers", help = "Directory to scan")]
        path: String,

        #[arg(long, help = "Project root the path is relative to")]
        root: Option<String>,

        #[arg(long, help = "Rewrite wrong namespaces in place")]
        fix: bool,
    },

    /// Create the permission catalogue and the default roles
    Seed,

    /// Run the upload policy against a local file
    ValidateUpload {
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Run the JSON API server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

//
// Instansi
//

#[derive(Args, Debug, Clone, Default)]
pub struct InstansiArgs {
    #[arg(long)]
    pub kode: Option<String>,

    #[arg(long)]
    pub nama: Option<String>,

    #[arg(long)]
    pub alamat: Option<String>,

    #[arg(long)]
    pub telepon: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub kepala: Option<String>,

    #[arg(long = "nip")]
    pub nip_kepala: Option<String>,

    #[arg(long, help = "aktif | nonaktif")]
    pub status: Option<String>,
}

#[derive(Subcommand)]
pub enum InstansiAction {
    /// List all instansi
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one instansi
    Show { id: i64 },
    /// Create an instansi (--kode and --nama are required)
    Add {
        #[command(flatten)]
        fields: InstansiArgs,
    },
    /// Update the given fields of an instansi
    Edit {
        id: i64,
        #[command(flatten)]
        fields: InstansiArgs,
    },
    /// Delete an instansi with no dependents
    Del { id: i64 },
}

//
// Program
//

#[derive(Args, Debug, Clone, Default)]
pub struct ProgramArgs {
    #[arg(long = "instansi")]
    pub instansi_id: Option<i64>,

    #[arg(long)]
    pub kode: Option<String>,

    #[arg(long)]
    pub nama: Option<String>,

    #[arg(long)]
    pub deskripsi: Option<String>,

    #[arg(long)]
    pub anggaran: Option<f64>,

    #[arg(long)]
    pub tahun: Option<i32>,

    #[arg(long, help = "draft | aktif | selesai")]
    pub status: Option<String>,
}

#[derive(Subcommand)]
pub enum ProgramAction {
    /// List programs, optionally by instansi and year
    List {
        #[arg(long = "instansi")]
        instansi_id: Option<i64>,
        #[arg(long)]
        tahun: Option<i32>,
    },
    Show {
        id: i64,
    },
    Add {
        #[command(flatten)]
        fields: ProgramArgs,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ProgramArgs,
    },
    Del {
        id: i64,
    },
}

//
// Kegiatan
//

#[derive(Args, Debug, Clone, Default)]
pub struct KegiatanArgs {
    #[arg(long = "program")]
    pub program_id: Option<i64>,

    #[arg(long)]
    pub kode: Option<String>,

    #[arg(long)]
    pub nama: Option<String>,

    #[arg(long)]
    pub deskripsi: Option<String>,

    #[arg(long)]
    pub anggaran: Option<f64>,

    #[arg(long = "mulai", value_name = "YYYY-MM-DD")]
    pub tanggal_mulai: Option<String>,

    #[arg(long = "selesai", value_name = "YYYY-MM-DD")]
    pub tanggal_selesai: Option<String>,

    #[arg(long = "pj")]
    pub penanggung_jawab: Option<String>,

    #[arg(long, help = "draft | berjalan | selesai | tunda")]
    pub status: Option<String>,
}

#[derive(Subcommand)]
pub enum KegiatanAction {
    List {
        #[arg(long = "program")]
        program_id: Option<i64>,
    },
    Show {
        id: i64,
    },
    Add {
        #[command(flatten)]
        fields: KegiatanArgs,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: KegiatanArgs,
    },
    Del {
        id: i64,
    },
}

//
// Indicator
//

#[derive(Args, Debug, Clone, Default)]
pub struct IndicatorArgs {
    #[arg(long = "instansi")]
    pub instansi_id: Option<i64>,

    #[arg(long = "program")]
    pub program_id: Option<i64>,

    #[arg(long = "kegiatan")]
    pub kegiatan_id: Option<i64>,

    #[arg(long)]
    pub code: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long = "unit")]
    pub measurement_unit: Option<String>,

    #[arg(long = "source")]
    pub data_source: Option<String>,

    #[arg(long = "method")]
    pub collection_method: Option<String>,

    #[arg(long, help = "monthly | quarterly | semester | annual")]
    pub frequency: Option<String>,

    #[arg(long, help = "input | output | outcome | impact")]
    pub category: Option<String>,

    #[arg(long)]
    pub weight: Option<f64>,

    #[arg(long)]
    pub mandatory: Option<bool>,
}

#[derive(Subcommand)]
pub enum IndicatorAction {
    List {
        #[arg(long = "instansi")]
        instansi_id: Option<i64>,
        #[arg(long)]
        category: Option<String>,
    },
    Show {
        id: i64,
    },
    Add {
        #[command(flatten)]
        fields: IndicatorArgs,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: IndicatorArgs,
    },
    Del {
        id: i64,
    },
}

//
// Target
//

#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(long = "indicator")]
    pub indicator_id: Option<i64>,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long = "value")]
    pub target_value: Option<f64>,

    #[arg(long = "minimum")]
    pub minimum_value: Option<f64>,

    #[arg(long)]
    pub justification: Option<String>,
}

#[derive(Subcommand)]
pub enum TargetAction {
    List {
        #[arg(long = "indicator")]
        indicator_id: Option<i64>,
        #[arg(long)]
        year: Option<i32>,
    },
    Add {
        #[command(flatten)]
        fields: TargetArgs,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: TargetArgs,
    },
    Approve {
        id: i64,
    },
    Reject {
        id: i64,
    },
    Revise {
        id: i64,
    },
    Del {
        id: i64,
    },
}

//
// Performance data
//

#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    #[arg(long = "indicator")]
    pub indicator_id: Option<i64>,

    #[arg(long = "instansi")]
    pub instansi_id: Option<i64>,

    #[arg(long, value_name = "YYYY-MM")]
    pub period: Option<String>,

    #[arg(long = "value")]
    pub actual_value: Option<f64>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long = "quality", help = "excellent | good | fair | poor")]
    pub data_quality: Option<String>,
}

#[derive(Subcommand)]
pub enum DataAction {
    List {
        #[arg(long = "instansi")]
        instansi_id: Option<i64>,
        #[arg(long = "indicator")]
        indicator_id: Option<i64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, value_name = "YYYY or YYYY-MM")]
        period: Option<String>,
    },
    Show {
        id: i64,
    },
    Add {
        #[command(flatten)]
        fields: DataArgs,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: DataArgs,
    },
    /// draft | rejected → submitted
    Submit {
        id: i64,
    },
    /// submitted → validated
    Validate {
        id: i64,
    },
    /// submitted → rejected
    Reject {
        id: i64,
        #[arg(long)]
        reason: Option<String>,
    },
    Del {
        id: i64,
    },
    /// Attach an evidence file
    Attach {
        id: i64,
        #[arg(long, value_name = "FILE")]
        file: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List evidence files of a data row
    Evidence {
        id: i64,
    },
    /// Run the data-quality checks on a row
    Check {
        id: i64,
        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },
}

//
// Assessment
//

#[derive(Subcommand)]
pub enum AssessmentAction {
    List {
        #[arg(long)]
        status: Option<String>,
    },
    Show {
        id: i64,
    },
    /// Open an assessment on submitted or validated data
    Add {
        #[arg(long = "data")]
        data_id: i64,
        #[arg(long)]
        score: Option<f64>,
        #[arg(long)]
        comments: Option<String>,
        #[arg(long)]
        recommendations: Option<String>,
    },
    /// Score or annotate a pending / in-review assessment
    Edit {
        id: i64,
        #[arg(long)]
        score: Option<f64>,
        #[arg(long)]
        comments: Option<String>,
        #[arg(long)]
        recommendations: Option<String>,
    },
    Complete {
        id: i64,
    },
    Approve {
        id: i64,
    },
}

//
// Report
//

#[derive(Subcommand)]
pub enum ReportAction {
    List {
        #[arg(long = "instansi")]
        instansi_id: Option<i64>,
    },
    Show {
        id: i64,
    },
    /// Generate a report file into the configured report directory
    Generate {
        #[arg(long = "type", value_enum)]
        report_type: ReportType,
        #[arg(long, value_enum, default_value = "pdf")]
        format: ExportFormat,
        #[arg(long, value_name = "YYYY or YYYY-MM")]
        period: Option<String>,
        #[arg(long = "instansi")]
        instansi_id: Option<i64>,
    },
    Submit {
        id: i64,
    },
}

//
// Users and roles
//

#[derive(Subcommand)]
pub enum UserAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long = "instansi")]
        instansi_id: Option<i64>,
        #[arg(long, help = "Role to assign right away")]
        role: Option<String>,
    },
    Activate {
        #[arg(value_name = "ID|EMAIL")]
        user: String,
    },
    Deactivate {
        #[arg(value_name = "ID|EMAIL")]
        user: String,
    },
    Password {
        #[arg(value_name = "ID|EMAIL")]
        user: String,
        #[arg(long)]
        password: String,
    },
    /// Issue an API token (same check as POST /auth/login)
    Token {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "cli")]
        device: String,
    },
}

#[derive(Subcommand)]
pub enum RoleAction {
    /// Roles with their permissions
    List,
    Assign {
        #[arg(value_name = "ID|EMAIL")]
        user: String,
        role: String,
    },
    Remove {
        #[arg(value_name = "ID|EMAIL")]
        user: String,
        role: String,
    },
    /// Grant a direct permission to a user
    Grant {
        #[arg(value_name = "ID|EMAIL")]
        user: String,
        permission: String,
    },
    /// Print whether a user holds a permission
    Check {
        #[arg(value_name = "ID|EMAIL")]
        user: String,
        permission: String,
    },
}
