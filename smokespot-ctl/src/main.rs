use anyhow::{anyhow, Context};
use smokespot_client::{
    api::{AuthToken, CommentId, PostId, SpotId, ThreadId},
    CommentForm, HttpStore, Row, RowAction, ThreadController,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base URL of the comment store
    #[structopt(short, long, default_value = "http://localhost:8000")]
    host: String,

    #[structopt(subcommand)]
    thread: Thread,
}

#[derive(structopt::StructOpt)]
enum Thread {
    /// Comments of a post
    Post {
        id: i64,

        #[structopt(subcommand)]
        cmd: Command,
    },

    /// Comments of a spot
    Spot {
        id: i64,

        #[structopt(subcommand)]
        cmd: Command,
    },
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the thread
    Show,

    /// Add a top-level comment
    Comment {
        content: String,

        /// Rating from 1 to 5, required on spots
        #[structopt(long)]
        rate: Option<i64>,
    },

    /// Reply to a displayed comment
    Reply { parent: i64, content: String },

    /// Replace the content of a comment
    Edit {
        comment: i64,
        content: String,

        #[structopt(long)]
        rate: Option<i64>,
    },

    /// Delete a comment and its replies
    Delete { comment: i64 },

    Like { comment: i64 },

    Unlike { comment: i64 },
}

fn session_token() -> anyhow::Result<Option<AuthToken>> {
    match std::env::var("SMOKESPOT_TOKEN") {
        Ok(tok) => Ok(Some(AuthToken(tok))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).context("reading SMOKESPOT_TOKEN environment variable"),
    }
}

fn print_rows(rows: &[Row]) {
    let today = chrono::Utc::now().date_naive();
    if rows.is_empty() {
        println!("(no comments)");
    }
    for r in rows {
        let indent = " ".repeat(r.indent_px as usize / 10);
        let mut line = format!(
            "{indent}#{} {} ({}): {}",
            r.id,
            r.author.nickname,
            r.author.tenure_label(today),
            r.content
        );
        if r.actions.iter().any(|a| matches!(a, RowAction::Like(_))) {
            line += &format!("  [likes: {}]", r.like_count);
        }
        if let Some(rate) = r.rate {
            line += &format!("  [rate: {rate}]");
        }
        println!("{line}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let (thread, cmd) = match opt.thread {
        Thread::Post { id, cmd } => (ThreadId::Post(PostId(id)), cmd),
        Thread::Spot { id, cmd } => (ThreadId::Spot(SpotId(id)), cmd),
    };
    tracing::debug!(?thread, host = %opt.host, "opening thread");
    let controller = ThreadController::new(HttpStore::new(opt.host, session_token()?), thread);

    let notice = match cmd {
        Command::Show => {
            controller.refresh().await?;
            None
        }
        Command::Comment { content, rate } => Some(
            controller
                .comment(&CommentForm { content, rate })
                .await?,
        ),
        Command::Reply { parent, content } => {
            // the reply level comes from the parent's row, so refuse parents
            // that are not displayed
            controller.refresh().await?;
            let reply = controller
                .rows()
                .into_iter()
                .find(|r| r.id == CommentId(parent))
                .and_then(|r| {
                    r.actions
                        .into_iter()
                        .find(|a| matches!(a, RowAction::Reply { .. }))
                })
                .ok_or_else(|| anyhow!("comment {parent} is not displayed in this thread"))?;
            Some(
                controller
                    .perform(&reply, &CommentForm::new(content))
                    .await?,
            )
        }
        Command::Edit {
            comment,
            content,
            rate,
        } => {
            // rated spot comments need their rate again, which is known once
            // the thread is loaded
            controller.refresh().await?;
            Some(
                controller
                    .edit(CommentId(comment), &CommentForm { content, rate })
                    .await?,
            )
        }
        Command::Delete { comment } => Some(controller.delete(CommentId(comment)).await?),
        Command::Like { comment } => Some(controller.like(CommentId(comment)).await?),
        Command::Unlike { comment } => Some(controller.unlike(CommentId(comment)).await?),
    };

    if let Some(notice) = notice {
        println!("{notice}");
    }
    print_rows(&controller.rows());
    Ok(())
}
