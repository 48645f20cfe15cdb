use std::{
    collections::HashSet,
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

use blockdown::{
    application::{
        error::AppError,
        render::{PageRenderer, standard_registry},
        source::{ContentSource, PagedSource, RetryPolicy},
    },
    config::{self, Command, DatabaseArgs, FileArgs, PageArgs, Settings},
    domain::page::Page,
    infra::{dump::JsonFileSource, error::InfraError, notion::NotionHttpClient, telemetry},
};
use futures::stream::{self, StreamExt};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = error.chain().join(": ");
    if dispatcher::has_been_set() {
        error!(error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;
    let renderer = PageRenderer::new(standard_registry(), settings.render.options());

    match cli_args.command {
        Command::Page(args) => run_page(&settings, &renderer, args).await,
        Command::Database(args) => run_database(&settings, &renderer, args).await,
        Command::File(args) => run_file(&settings, &renderer, args).await,
    }
}

fn paged_source(settings: &Settings) -> Result<PagedSource<NotionHttpClient>, AppError> {
    let client = NotionHttpClient::new(&settings.source)?;
    let retry = RetryPolicy::new(settings.source.retry_attempts, settings.source.retry_delay);
    Ok(PagedSource::new(client, retry))
}

async fn run_page(
    settings: &Settings,
    renderer: &PageRenderer,
    args: PageArgs,
) -> Result<(), AppError> {
    let source = paged_source(settings)?;
    let page = source.fetch(&args.id).await?;
    let document = renderer
        .render_document(&page, settings.render.front_matter)
        .await?;
    write_output(args.output.output.as_deref(), &document).await
}

async fn run_file(
    settings: &Settings,
    renderer: &PageRenderer,
    args: FileArgs,
) -> Result<(), AppError> {
    let source = JsonFileSource::new(&args.path);
    let page = source.fetch(&source.default_id()).await?;
    let document = renderer
        .render_document(&page, settings.render.front_matter)
        .await?;
    write_output(args.output.output.as_deref(), &document).await
}

async fn run_database(
    settings: &Settings,
    renderer: &PageRenderer,
    args: DatabaseArgs,
) -> Result<(), AppError> {
    let source = paged_source(settings)?;
    let pages = source.collect_database(&args.id).await?;
    tokio::fs::create_dir_all(&args.out_dir)
        .await
        .map_err(InfraError::from)?;

    let front_matter = settings.render.front_matter;
    let rendered: Vec<_> = stream::iter(pages.iter().map(|page| async move {
        let document = renderer.render_document(page, front_matter).await;
        (page, document)
    }))
    .buffered(settings.render.concurrency.get())
    .collect()
    .await;

    let mut taken = HashSet::new();
    for (page, document) in rendered {
        let document = document?;
        let path = args.out_dir.join(page_file_name(page, &mut taken));
        tokio::fs::write(&path, document)
            .await
            .map_err(InfraError::from)?;
        info!(page_id = %page.id, path = %path.display(), "page written");
    }

    info!(
        database_id = %args.id,
        pages = taken.len(),
        out_dir = %args.out_dir.display(),
        "database rendered"
    );
    Ok(())
}

/// Markdown file name for `page`: its slugified title, or its id when the
/// title is blank or already used.
fn page_file_name(page: &Page, taken: &mut HashSet<String>) -> PathBuf {
    let slug = page
        .title()
        .map(slug::slugify)
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| page.id.clone());

    let stem = if taken.contains(&slug) {
        format!("{slug}-{}", page.id)
    } else {
        slug
    };
    taken.insert(stem.clone());
    PathBuf::from(format!("{stem}.md"))
}

async fn write_output(path: Option<&Path>, document: &str) -> Result<(), AppError> {
    match path {
        Some(path) => {
            tokio::fs::write(path, document)
                .await
                .map_err(InfraError::from)?;
            info!(path = %path.display(), "document written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(document.as_bytes())
                .map_err(InfraError::from)?;
            stdout.flush().map_err(InfraError::from)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(id: &str, title: &str) -> Page {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "properties": {
                "Name": {
                    "type": "title",
                    "title": [{ "type": "text", "text": { "content": title }, "plain_text": title }]
                }
            }
        }))
        .expect("page decodes")
    }

    #[test]
    fn file_names_are_slugified_and_unique() {
        let mut taken = HashSet::new();

        assert_eq!(
            page_file_name(&titled("a1", "Hello, World!"), &mut taken),
            PathBuf::from("hello-world.md")
        );
        assert_eq!(
            page_file_name(&titled("b2", "Hello World"), &mut taken),
            PathBuf::from("hello-world-b2.md")
        );
        assert_eq!(
            page_file_name(&titled("c3", "   "), &mut taken),
            PathBuf::from("c3.md")
        );
        assert_eq!(
            page_file_name(&Page::new("d4"), &mut taken),
            PathBuf::from("d4.md")
        );
    }
}
