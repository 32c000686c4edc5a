//! Job management commands.

use crate::prompt;
use crate::App;
use kriya_jobs::{Job, JobDraft, JobMethod};

fn print_job(job: &Job) {
    let status = if job.is_active { "active" } else { "inactive" };
    println!("{}  [{}]  {}", job.id, status, job.name);
    println!("  {}", job.description);
    println!("  schedule: {}", job.cron_expression);
    println!("  callback: {} {}", job.method, job.callback_url);
    match &job.last_executed {
        Some(at) => println!("  last executed: {}", at.to_rfc3339()),
        None => println!("  last executed: never"),
    }
}

/// `kriya job list`
pub async fn list(app: &App) -> anyhow::Result<()> {
    let jobs = app.jobs.list().await?;
    if jobs.is_empty() {
        println!("No jobs yet. Create one with `kriya job create`.");
        return Ok(());
    }
    for job in &jobs {
        print_job(job);
        println!();
    }
    println!(
        "{} jobs, {} active",
        jobs.len(),
        jobs.iter().filter(|j| j.is_active).count()
    );
    Ok(())
}

/// `kriya job show <id>`
pub async fn show(app: &App, id: &str) -> anyhow::Result<()> {
    let job = app.jobs.get(id).await?;
    print_job(&job);
    Ok(())
}

/// `kriya job create`: interactive, with the callback probed before save.
pub async fn create(app: &App) -> anyhow::Result<()> {
    let Some(name) = prompt::required("Job name")? else {
        return Ok(());
    };
    let Some(description) = prompt::required("Description")? else {
        return Ok(());
    };
    let Some(cron_expression) = prompt::required("Cron expression (5 fields)")? else {
        return Ok(());
    };
    let Some(callback_url) = prompt::required("Callback URL")? else {
        return Ok(());
    };
    let method = if prompt::confirm("POST callback (instead of GET)?")? {
        JobMethod::Post
    } else {
        JobMethod::Get
    };
    let body = if method == JobMethod::Post {
        prompt::line("Request body (JSON, optional)")?.filter(|b| !b.is_empty())
    } else {
        None
    };

    let draft = JobDraft {
        name,
        description,
        cron_expression,
        callback_url,
        method,
        body,
        is_active: true,
    };
    draft.validate()?;

    // The callback must answer before the job is allowed to exist.
    let probe = app
        .jobs
        .test_callback(&draft.callback_url, draft.method, draft.body.as_deref())
        .await?;
    if !probe.success {
        println!(
            "{}",
            probe
                .message
                .unwrap_or_else(|| "Callback test failed".to_string())
        );
        return Ok(());
    }
    println!("Callback URL is valid!");

    let job = app.jobs.create(&draft).await?;
    println!("Created job {}", job.id);
    Ok(())
}

/// `kriya job delete <id>`
pub async fn delete(app: &App, id: &str) -> anyhow::Result<()> {
    if !prompt::confirm("Delete this job?")? {
        return Ok(());
    }
    app.jobs.delete(id).await?;
    println!("Job deleted");
    Ok(())
}

/// `kriya job run <id>`
pub async fn run(app: &App, id: &str) -> anyhow::Result<()> {
    app.jobs.execute(id).await?;
    println!("Job triggered");
    Ok(())
}
