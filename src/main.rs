use std::path::PathBuf;

use clap::{Parser, Subcommand};
use edu_dashboard_core::app::auth::{login, Boot};
use edu_dashboard_core::app::uploads::partition_uploads;
use edu_dashboard_core::app::student::PROGRESS_NOT_TRACKED;
use edu_dashboard_core::app::TeacherDashboard;
use edu_dashboard_core::config::ClientConfig;
use edu_dashboard_core::error::{Error, Result};
use edu_dashboard_core::interface::{HttpClient, RequestApi};
use edu_dashboard_core::model::dtos::UploadFile;
use edu_dashboard_core::model::structs::HomeworkStatus;
use edu_dashboard_core::NoWasmClient;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Platform API base URL
    #[arg(long, env = "EDU_BASE_URL")]
    base_url: String,

    #[arg(long, env = "EDU_EMAIL")]
    email: String,

    #[arg(long, env = "EDU_PASSWORD", hide_env_values = true)]
    password: String,

    /// Request timeout in seconds.
    #[arg(long, env = "EDU_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Largest file accepted for upload, in MB.
    #[arg(long, env = "EDU_UPLOAD_LIMIT_MB", default_value_t = 100)]
    upload_limit_mb: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the logged-in profile
    Me,
    /// List own courses
    Courses,
    /// List homework submissions matching the filters
    Homeworks {
        #[arg(long)]
        course: Option<i64>,
        #[arg(long)]
        theme: Option<i64>,
        #[arg(long)]
        student: Option<i64>,
        /// pending or graded
        #[arg(long)]
        status: Option<String>,
    },
    /// Grade a submission with a score from 1 to 10
    Grade {
        homework_id: i64,
        score: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Attach files to a theme
    Upload {
        #[arg(long)]
        theme: i64,
        files: Vec<PathBuf>,
    },
    /// Show progress in a course
    Progress { course_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "edu_dashboard_core=info".to_owned());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut config = ClientConfig::new(args.base_url);
    config.timeout = Some(std::time::Duration::from_secs(args.timeout));
    config.upload_limit_bytes = args.upload_limit_mb * 1024 * 1024;
    let client = NoWasmClient::new(config.clone()).await?;

    let landing = login(&client, &args.email, &args.password).await?;
    log::info!("logged in, landing page {}", landing.page());

    match args.command {
        Command::Me => {
            let profile = client.me().await?;
            let role = if profile.is_teacher { "teacher" } else { "student" };
            println!("{} <{}> ({role})", profile.display_name(), profile.email);
        }
        Command::Courses => {
            for course in client.my_courses().await? {
                println!("{:>5}  {}", course.id, course.title());
            }
        }
        Command::Homeworks {
            course,
            theme,
            student,
            status,
        } => {
            let status = status.as_deref().map(str::parse::<HomeworkStatus>).transpose()?;
            let mut dashboard = teacher_dashboard(client, &config).await?;
            dashboard.select_course(course).await?;
            dashboard.select_theme(theme).await?;
            dashboard.set_student_filter(student).await?;
            // The last setter reloads the table with every filter applied.
            dashboard.set_status_filter(status).await;

            for notice in [&dashboard.notices.global, &dashboard.notices.students]
                .into_iter()
                .flatten()
            {
                log::warn!("{}", notice.text);
            }
            if let Some(message) = dashboard.homeworks.message() {
                println!("{message}");
            }
            for row in dashboard.homeworks.rows() {
                println!(
                    "{:>5}  {:<8} {:>3}  {} / {} / {}  {}",
                    row.id,
                    row.status.as_str(),
                    row.score.map(|s| s.to_string()).unwrap_or_default(),
                    row.course_name,
                    row.theme_name,
                    row.student_name,
                    row.title,
                );
            }
        }
        Command::Grade {
            homework_id,
            score,
            comment,
        } => {
            let mut dashboard = teacher_dashboard(client, &config).await?;
            dashboard.open_grading(homework_id)?;
            let grade = dashboard.save_grade(&score, &comment).await?;
            println!("graded #{homework_id} with {}", grade.score);
        }
        Command::Upload { theme, files } => {
            let files = files
                .iter()
                .map(|path| -> Result<UploadFile> {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    Ok(UploadFile::new(name, std::fs::read(path)?))
                })
                .collect::<Result<Vec<_>>>()?;

            let upload_limit = config.upload_limit_bytes;
            let batch = partition_uploads(files, upload_limit);
            for message in batch.messages(upload_limit) {
                println!("{message}");
            }
            if batch.accepted.is_empty() {
                return Ok(());
            }
            for file in client.upload_theme_files(theme, &batch.accepted).await? {
                println!("uploaded {}", file.display_name());
            }
        }
        Command::Progress { course_id } => match client.course_progress(course_id).await {
            Ok(progress) => println!("{}", progress.label()),
            Err(e) => {
                log::debug!("progress unavailable: {e}");
                println!("{PROGRESS_NOT_TRACKED}");
            }
        },
    }

    Ok(())
}

async fn teacher_dashboard(
    client: NoWasmClient,
    config: &ClientConfig,
) -> Result<TeacherDashboard<NoWasmClient>> {
    let mut dashboard = TeacherDashboard::from_config(client, config);
    match dashboard.boot().await {
        Boot::Ready(_) => Ok(dashboard),
        Boot::RedirectToLogin { reason, .. } | Boot::Denied(reason) | Boot::Failed(reason) => {
            Err(Error::validation(reason))
        }
    }
}
