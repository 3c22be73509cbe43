//! ligatures-limited: scan a file and report ligature decorations

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use ligatures_limited::config::Settings;
use ligatures_limited::decorations::{CollectingSink, DecorationKind};
use ligatures_limited::messages::{DocumentMsg, EditorMsg, Msg};
use ligatures_limited::model::{DocumentId, EditorId, EngineModel, RangeLists, Selection};
use ligatures_limited::runtime::Runtime;
use ligatures_limited::syntax::TreeSitterScopes;

use cli::{CliArgs, ScanRequest};

/// Upper bound on scheduled messages processed for one file
const MAX_SCHEDULED: usize = 100_000;

#[derive(Serialize)]
struct Report<'a> {
    file: String,
    language: &'a str,
    #[serde(flatten)]
    lists: &'a RangeLists,
    notices: Vec<String>,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    ligatures_limited::tracing::init(args.verbose);

    let request = args.into_config().map_err(anyhow::Error::msg)?;
    run(&request)
}

fn run(request: &ScanRequest) -> Result<()> {
    let settings = match &request.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    let text = std::fs::read_to_string(&request.file)
        .with_context(|| format!("Failed to read {}", request.file.display()))?;

    let document = DocumentId(1);
    let editor = EditorId(1);

    let mut model = EngineModel::new(settings, Box::new(TreeSitterScopes::new()));
    if request.debug {
        model.toggles.debug = Some(true);
    }
    model.toggles.selection_mode = request.selection_mode;

    let mut runtime = Runtime::new(model, CollectingSink::new());
    runtime.dispatch(Msg::Initialize);
    runtime.dispatch(Msg::Document(DocumentMsg::Opened {
        id: document,
        language: request.language.clone(),
        text,
    }));
    runtime.dispatch(Msg::Editor(EditorMsg::Shown {
        editor,
        document,
        selections: request
            .cursor
            .map(|(line, column)| vec![Selection::caret(line, column)])
            .unwrap_or_default(),
        visible_range: None,
    }));
    runtime.flush(MAX_SCHEDULED);

    let sink = runtime.sink();
    let lists = sink.lists(editor);
    let notices: Vec<String> = sink.notices.iter().map(|n| n.message()).collect();

    if request.json {
        let report = Report {
            file: request.file.display().to_string(),
            language: &request.language,
            lists: &lists,
            notices,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for notice in &notices {
        eprintln!("{}", notice);
    }
    for kind in DecorationKind::ALL {
        let ranges = lists.get(kind);
        if ranges.is_empty() {
            continue;
        }
        let joined: Vec<String> = ranges.iter().map(|r| r.to_string()).collect();
        println!("{}: {}", kind, joined.join(" "));
    }
    Ok(())
}
