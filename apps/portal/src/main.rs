use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, prepare_api_base_url, ClientSettings},
    controller::{EnrollmentController, ViewKind},
    CourseView, DataGateway, FilterChange, HttpGateway, MasterView, Notice,
    ScheduleViewController, SessionStore, SessionUser, StudentView, TeacherView, ViewPhase,
    ViewSnapshot,
};
use shared::domain::{CourseId, Role, SemesterId, StudentId, TeacherId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "portal", about = "School scheduling portal client")]
struct Cli {
    /// Overrides the configured API base URL.
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    Semesters,
    Schedule {
        #[command(subcommand)]
        view: ScheduleCommand,
    },
    /// Generate the master schedule for a semester that has none.
    Generate {
        #[arg(long)]
        semester: Option<i64>,
    },
    Eligible {
        #[arg(long)]
        student: Option<i64>,
        #[arg(long)]
        semester: Option<i64>,
    },
    Enroll {
        course: i64,
        #[arg(long)]
        student: Option<i64>,
        #[arg(long)]
        semester: Option<i64>,
    },
    Progress {
        #[arg(long)]
        student: Option<i64>,
    },
    Transcript {
        #[arg(long)]
        student: Option<i64>,
    },
    Resources,
}

#[derive(Subcommand, Debug)]
enum ScheduleCommand {
    Master {
        #[arg(long)]
        semester: Option<i64>,
    },
    Course {
        #[arg(long)]
        semester: Option<i64>,
    },
    Teacher {
        #[arg(long)]
        teacher: Option<i64>,
    },
    Student {
        #[arg(long)]
        student: Option<i64>,
        #[arg(long)]
        semester: Option<i64>,
    },
}

struct App {
    gateway: Arc<dyn DataGateway>,
    store: SessionStore,
    settings: ClientSettings,
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(api_base) = cli.api_base {
        settings.api_base_url = api_base;
    }
    settings.api_base_url = prepare_api_base_url(&settings.api_base_url)?;

    let gateway = HttpGateway::from_settings(&settings).context("failed to build HTTP client")?;
    let app = App {
        gateway: Arc::new(gateway),
        store: SessionStore::new(&settings.session_path),
        settings,
        json: cli.json,
    };

    match cli.command {
        Command::Login { username, password } => {
            let user = app
                .gateway
                .login(&username, &password)
                .await
                .context("login failed")?;
            app.store.save(&user)?;
            info!(user_id = user.user_id.0, role = %user.role, "logged in");
            println!("Logged in as {} ({})", display_name(&user), user.role);
        }
        Command::Logout => {
            if app.store.clear()? {
                println!("Logged out.");
            } else {
                println!("No active session.");
            }
        }
        Command::Whoami => match app.store.load()? {
            Some(user) => println!(
                "{} <{}> {} id={} since {}",
                display_name(&user),
                user.email,
                user.role,
                user.user_id,
                user.logged_in_at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => println!("Not logged in."),
        },
        Command::Semesters => {
            let semesters = app.gateway.fetch_semesters().await?;
            if app.json {
                println!("{}", serde_json::to_string_pretty(&semesters)?);
            } else {
                let rows: Vec<Vec<String>> = semesters
                    .iter()
                    .map(|s| vec![s.id.to_string(), s.label.clone()])
                    .collect();
                print!("{}", render::table(&["Id", "Semester"], &rows));
            }
        }
        Command::Schedule { view } => match view {
            ScheduleCommand::Master { semester } => {
                show_schedule::<MasterView>(&app, semester_change(semester)).await?
            }
            ScheduleCommand::Course { semester } => {
                show_schedule::<CourseView>(&app, semester_change(semester)).await?
            }
            ScheduleCommand::Teacher { teacher } => {
                let changes = teacher
                    .map(|id| FilterChange::Teacher(Some(TeacherId(id))))
                    .into_iter()
                    .collect();
                show_schedule::<TeacherView>(&app, changes).await?
            }
            ScheduleCommand::Student { student, semester } => {
                let mut changes: Vec<FilterChange> = student
                    .map(|id| FilterChange::Student(Some(StudentId(id))))
                    .into_iter()
                    .collect();
                changes.extend(semester_change(semester));
                show_schedule::<StudentView>(&app, changes).await?
            }
        },
        Command::Generate { semester } => {
            let controller = open_view::<MasterView>(&app, semester_change(semester)).await?;
            let report = controller.generate().await;
            report_notices(controller.take_notices().await);
            match report {
                Some(report) => println!("Generated {} sections.", report.generated_sections),
                None if controller.schedule_exists().await => {
                    println!("A master schedule already exists for this semester.")
                }
                None => {}
            }
            print_schedule(&app, &controller.snapshot().await)?;
        }
        Command::Eligible { student, semester } => {
            let controller = open_enrollment(&app, student, semester).await?;
            controller.fetch_eligible().await;
            report_notices(controller.take_notices().await);
            print_eligible(&app, &controller).await?;
        }
        Command::Enroll {
            course,
            student,
            semester,
        } => {
            let controller = open_enrollment(&app, student, semester).await?;
            let enrolled = controller.enroll(CourseId(course)).await;
            let notices = controller.take_notices().await;
            let silent = notices.is_empty();
            report_notices(notices);
            if !enrolled {
                if silent {
                    bail!("select a student and semester before enrolling");
                }
                bail!("enrollment in course {course} was not completed");
            }
            print_eligible(&app, &controller).await?;
        }
        Command::Progress { student } => {
            let student_id = resolve_student(&app.store.require()?, student)?;
            let result = app.gateway.fetch_progress(student_id).await?;
            if app.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            if let Some(student) = &result.student {
                println!("{} <{}>", student.name, student.email);
            }
            let p = &result.progress;
            println!(
                "Credits: {:.1} / {:.1} ({:.1} remaining)",
                p.credits_earned, p.credits_required, p.credits_remaining
            );
            println!("Core courses: {} / {}", p.core_passed, p.core_required);
            println!("GPA: {:.2}", p.gpa);
            if let Some(semesters) = p.predicted_semesters_to_graduate {
                println!("Predicted semesters to graduate: {semesters}");
            }
            if !result.remaining_core_courses.is_empty() {
                let rows: Vec<Vec<String>> = result
                    .remaining_core_courses
                    .iter()
                    .map(|c| vec![c.code.clone(), c.name.clone()])
                    .collect();
                println!();
                print!("{}", render::table(&["Code", "Remaining core course"], &rows));
            }
        }
        Command::Transcript { student } => {
            let student_id = resolve_student(&app.store.require()?, student)?;
            let result = app.gateway.fetch_transcript(student_id).await?;
            if app.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                if let Some(student) = &result.student {
                    println!("Transcript for {}", student.name);
                }
                print!("{}", render::transcript(&result.transcript));
            }
        }
        Command::Resources => {
            app.store.require()?;
            let analytics = app.gateway.fetch_resource_analytics().await?;
            if app.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "teacherStats": analytics.teacher_stats,
                        "roomStats": analytics.room_stats,
                    }))?
                );
            } else {
                print!("{}", render::teacher_stats(&analytics.teacher_stats));
                println!();
                print!("{}", render::room_stats(&analytics.room_stats));
            }
        }
    }

    Ok(())
}

fn display_name(user: &SessionUser) -> &str {
    if user.name.is_empty() {
        &user.email
    } else {
        &user.name
    }
}

fn semester_change(semester: Option<i64>) -> Vec<FilterChange> {
    semester
        .map(|id| FilterChange::Semester(Some(SemesterId(id))))
        .into_iter()
        .collect()
}

/// Students may only look up themselves, admins must name a student, and
/// teachers have no access to student records.
fn resolve_student(user: &SessionUser, requested: Option<i64>) -> Result<StudentId> {
    if user.role == Role::Teacher {
        bail!("Not allowed");
    }
    match (user.student_id(), requested) {
        (Some(own), Some(other)) if own.0 != other => {
            bail!("Students can only view their own records.")
        }
        (Some(own), _) => Ok(own),
        (None, Some(id)) => Ok(StudentId(id)),
        (None, None) => bail!("Please enter a student ID (Admin only)"),
    }
}

fn report_notices(notices: Vec<Notice>) {
    for notice in notices {
        if notice.is_failure() {
            eprintln!("error: {notice}");
        } else {
            eprintln!("{notice}");
        }
    }
}

/// Applies explicit selections, falls back to the view's initial load, and
/// finally an explicit load so a missing selection is reported.
async fn open_view<K: ViewKind>(
    app: &App,
    changes: Vec<FilterChange>,
) -> Result<ScheduleViewController<K>> {
    let user = app.store.require()?;
    let controller = ScheduleViewController::<K>::new(Arc::clone(&app.gateway), user)?
        .with_policy(app.settings.stale_response_policy);
    for change in changes {
        controller.select_filter(change).await;
    }
    if controller.snapshot().await.phase == ViewPhase::Idle {
        controller.open().await;
    }
    if controller.snapshot().await.phase == ViewPhase::Idle {
        controller.load().await;
    }
    Ok(controller)
}

async fn show_schedule<K: ViewKind>(app: &App, changes: Vec<FilterChange>) -> Result<()> {
    let controller = open_view::<K>(app, changes).await?;
    report_notices(controller.take_notices().await);
    print_schedule(app, &controller.snapshot().await)
}

fn print_schedule(app: &App, snapshot: &ViewSnapshot) -> Result<()> {
    if snapshot.phase != ViewPhase::Loaded {
        bail!("{} schedule unavailable", snapshot.kind);
    }
    if app.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.sections)?);
        return Ok(());
    }

    let semester = snapshot
        .filter
        .semester_id
        .and_then(|id| snapshot.semesters.iter().find(|s| s.id == id))
        .map(|s| s.label.as_str());
    let heading = snapshot
        .caption
        .as_deref()
        .or(semester)
        .unwrap_or_default();
    match &snapshot.subject {
        Some(subject) => println!("{} schedule: {} {heading}", snapshot.kind, subject.name),
        None => println!("{} schedule {heading}", snapshot.kind),
    }
    if let Some(grade) = snapshot
        .subject
        .as_ref()
        .and_then(|subject| subject.grade_level_label())
    {
        println!("Grade level: {grade}");
    }

    if !snapshot.schedule_exists {
        println!("No schedule found.");
        return Ok(());
    }
    print!("{}", render::weekly_grid(&snapshot.grid));
    println!();
    print!("{}", render::sections(&snapshot.sections));
    Ok(())
}

async fn open_enrollment(
    app: &App,
    student: Option<i64>,
    semester: Option<i64>,
) -> Result<EnrollmentController> {
    let controller = EnrollmentController::new(Arc::clone(&app.gateway), app.store.require()?)?;
    if let Some(id) = student {
        controller
            .select_filter(FilterChange::Student(Some(StudentId(id))))
            .await;
    }
    match semester {
        Some(id) => {
            controller
                .select_filter(FilterChange::Semester(Some(SemesterId(id))))
                .await
        }
        None => controller.open().await,
    }
    Ok(controller)
}

async fn print_eligible(app: &App, controller: &EnrollmentController) -> Result<()> {
    let snapshot = controller.snapshot().await;
    if app.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.sections)?);
        return Ok(());
    }
    if let Some(message) = &snapshot.message {
        println!("{message}");
    }
    if !snapshot.sections.is_empty() {
        print!("{}", render::sections(&snapshot.sections));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
