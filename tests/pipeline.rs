use serde_json::json;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use sugarcoat::config::RawConfig;
use sugarcoat::discover::Globber;
use sugarcoat::error::DiscoveryError;
use sugarcoat::log::NullLog;
use sugarcoat::model::{DiagnosticKind, Library, Tag};
use sugarcoat::pipeline::{FileReader, Pipeline};
use sugarcoat::render::Renderer;
use tempfile::TempDir;

const COLORS: &str = "/**\n *\n * @title Primary Colors\n * @description Client-branded color palette\n * @usage Found only in brand-specific UI elements\n *\n */\n:root {\n    --brand-red: #703030; /* Headlines */\n    --brand-grey: #2F343B; /* Links */\n}";

/// Pattern → paths table. Patterns starting with `slow/` yield before
/// answering so completions arrive out of order.
#[derive(Default)]
struct SpyGlobber {
    table: HashMap<String, Vec<PathBuf>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl SpyGlobber {
    fn with(mut self, pattern: &str, paths: &[&str]) -> Self {
        self.table
            .insert(pattern.to_string(), paths.iter().map(PathBuf::from).collect());
        self
    }
}

impl Globber for SpyGlobber {
    async fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
        self.calls.lock().unwrap().push(pattern.to_string());
        if pattern.starts_with("slow/") {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
        }
        match self.table.get(pattern) {
            Some(paths) => Ok(paths.clone()),
            None if pattern.contains('[') => Err(DiscoveryError {
                pattern: pattern.to_string(),
                message: "unclosed character class".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Path → text table; missing paths fail with NotFound.
#[derive(Default)]
struct SpyReader {
    files: HashMap<PathBuf, String>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl SpyReader {
    fn with(mut self, path: &str, text: &str) -> Self {
        self.files.insert(PathBuf::from(path), text.to_string());
        self
    }
}

impl FileReader for SpyReader {
    async fn read(&self, path: &Path) -> io::Result<String> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        if path.starts_with("slow") {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }
}

/// Lists record titles, one per line; counts invocations.
#[derive(Clone, Default)]
struct SpyRenderer {
    calls: Arc<Mutex<usize>>,
}

impl Renderer for SpyRenderer {
    fn render(&self, library: &Library) -> anyhow::Result<String> {
        *self.calls.lock().unwrap() += 1;
        Ok(library
            .records()
            .map(|r| r.title().unwrap_or("?").to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}

/// Always fails, the way a serializer rejecting the model would.
struct BrokenRenderer;

impl Renderer for BrokenRenderer {
    fn render(&self, _: &Library) -> anyhow::Result<String> {
        anyhow::bail!("key must be a string")
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

fn raw(value: serde_json::Value) -> RawConfig {
    serde_json::from_value(value).unwrap()
}

fn titled(title: &str) -> String {
    format!("/**\n * @title {}\n */\n.x {{}}\n", title)
}

// -- configuration gate --

#[tokio::test]
async fn config_violations_do_no_io() {
    let cases = [
        (json!({"sections": [{"title": "A", "files": "a.css"}]}), "ConfigDestMissing"),
        (json!({"dest": "none"}), "ConfigSectionArrayMissing"),
        (json!({"dest": "none", "sections": []}), "ConfigSectionObjectMissing"),
        (json!({"dest": "none", "sections": ["a.css"]}), "ConfigSectionObjectMissing"),
        (json!({"dest": "none", "sections": [{"files": "a.css"}]}), "ConfigSectionTitleMissing"),
        (json!({"dest": "none", "sections": [{"title": "A"}]}), "ConfigSectionFileMissing"),
        (
            json!({"dest": "none", "sections": [{"title": "A", "files": "a.css"}],
                   "template": {"selectorPrefix": ".sg"}}),
            "ConfigPrefixAssetsMissing",
        ),
        (
            json!({"dest": "none", "sections": [{"title": "A", "files": "a.css"}],
                   "template": {"selectorPrefix": ".sg"}, "include": {"css": ["a.css"]}}),
            "ConfigTemplateOptionsMissing",
        ),
    ];

    for (config, kind) in cases {
        let globber = SpyGlobber::default();
        let reader = SpyReader::default();
        let glob_calls = Arc::clone(&globber.calls);
        let read_calls = Arc::clone(&reader.calls);
        let renderer = SpyRenderer::default();
        let render_calls = Arc::clone(&renderer.calls);

        let err = Pipeline::new(globber, reader)
            .with_renderer(renderer)
            .with_log(NullLog)
            .run(raw(config))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), kind);
        assert!(glob_calls.lock().unwrap().is_empty(), "{}", kind);
        assert!(read_calls.lock().unwrap().is_empty(), "{}", kind);
        assert_eq!(*render_calls.lock().unwrap(), 0, "{}", kind);
    }
}

#[tokio::test]
async fn discovery_error_rejects_the_run() {
    let globber = SpyGlobber::default().with("a.css", &["a.css"]);
    let reader = SpyReader::default().with("a.css", &titled("A"));
    let read_calls = Arc::clone(&reader.calls);

    let err = Pipeline::new(globber, reader)
        .with_renderer(SpyRenderer::default())
        .with_log(NullLog)
        .run(raw(json!({
            "dest": "none",
            "sections": [
                {"title": "Ok", "files": "a.css"},
                {"title": "Bad", "files": "css/[*.css"}
            ]
        })))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "DiscoveryError");
    assert!(err.to_string().contains("css/[*.css"));
    assert!(read_calls.lock().unwrap().is_empty());
}

// -- ordering and isolation --

#[tokio::test]
async fn output_follows_config_order_not_completion_order() {
    let globber = SpyGlobber::default()
        .with("slow/a/*.css", &["slow/a1.css", "slow/a2.css"])
        .with("b/*.css", &["b1.css", "b2.css"]);
    let reader = SpyReader::default()
        .with("slow/a1.css", &titled("A1"))
        .with("slow/a2.css", &titled("A2"))
        .with("b1.css", &titled("B1"))
        .with("b2.css", &titled("B2"));

    let library = Pipeline::new(globber, reader)
        .with_renderer(SpyRenderer::default())
        .with_log(NullLog)
        .run(raw(json!({
            "dest": "none",
            "sections": [
                {"title": "A", "files": "slow/a/*.css"},
                {"title": "B", "files": "b/*.css"}
            ]
        })))
        .await
        .unwrap();

    let titles: Vec<_> = library.records().filter_map(|r| r.title()).collect();
    assert_eq!(titles, ["A1", "A2", "B1", "B2"]);
    assert_eq!(library.sections[0].title, "A");
    assert_eq!(library.sections[1].title, "B");
}

#[tokio::test]
async fn unreadable_file_is_isolated() {
    let globber = SpyGlobber::default().with("*.css", &["one.css", "two.css", "three.css"]);
    let reader = SpyReader::default()
        .with("one.css", &titled("One"))
        .with("three.css", &titled("Three"));

    let library = Pipeline::new(globber, reader)
        .with_renderer(SpyRenderer::default())
        .with_log(NullLog)
        .run(raw(json!({
            "dest": "none",
            "sections": [{"title": "S", "files": "*.css"}]
        })))
        .await
        .unwrap();

    let files = &library.sections[0].files;
    assert_eq!(files.len(), 3);
    assert_eq!(files[0].records.len(), 1);
    assert!(files[1].records.is_empty());
    assert_eq!(files[1].diagnostics.len(), 1);
    assert_eq!(files[1].diagnostics[0].kind, DiagnosticKind::Read);
    assert_eq!(files[2].records.len(), 1);
    assert!(library.has_diagnostics());
}

#[tokio::test]
async fn empty_glob_yields_empty_section() {
    let library = Pipeline::new(SpyGlobber::default(), SpyReader::default())
        .with_renderer(SpyRenderer::default())
        .with_log(NullLog)
        .run(raw(json!({
            "dest": "none",
            "sections": [{"title": "Nothing", "files": "none/*.css"}]
        })))
        .await
        .unwrap();

    assert!(library.sections[0].files.is_empty());
    assert_eq!(library.records().count(), 0);
}

// -- rendering --

#[tokio::test]
async fn dest_none_renders_without_writing() {
    let globber = SpyGlobber::default().with("colors.css", &["colors.css"]);
    let reader = SpyReader::default().with("colors.css", COLORS);
    let renderer = SpyRenderer::default();
    let render_calls = Arc::clone(&renderer.calls);

    let library = Pipeline::new(globber, reader)
        .with_renderer(renderer)
        .with_log(NullLog)
        .run(raw(json!({
            "dest": "none",
            "sections": [{"title": "Colors", "files": "colors.css"}]
        })))
        .await
        .unwrap();

    assert_eq!(*render_calls.lock().unwrap(), 1);
    assert!(library.output.is_none());
}

#[tokio::test]
async fn render_failure_rejects_the_run_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("out");
    let globber = SpyGlobber::default().with("colors.css", &["colors.css"]);
    let reader = SpyReader::default().with("colors.css", COLORS);

    let err = Pipeline::new(globber, reader)
        .with_renderer(BrokenRenderer)
        .with_log(NullLog)
        .run(raw(json!({
            "dest": dest,
            "sections": [{"title": "Colors", "files": "colors.css"}]
        })))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "RenderError");
    assert!(err.to_string().contains("key must be a string"));
    assert!(!dest.exists());
}

#[tokio::test]
async fn writes_index_into_dest_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("out");
    let config = json!({
        "dest": dest,
        "sections": [{"title": "Colors", "files": "colors.css"}]
    });

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let globber = SpyGlobber::default().with("colors.css", &["colors.css"]);
        let reader = SpyReader::default().with("colors.css", COLORS);
        let library = Pipeline::new(globber, reader)
            .with_log(NullLog)
            .run(raw(config.clone()))
            .await
            .unwrap();
        assert_eq!(library.output.as_deref(), Some(dest.join("index.html").as_path()));
        outputs.push(std::fs::read(dest.join("index.html")).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn primary_colors_end_to_end() {
    let globber = SpyGlobber::default().with("css/colors.css", &["css/colors.css"]);
    let reader = SpyReader::default().with("css/colors.css", COLORS);

    let library = Pipeline::new(globber, reader)
        .with_renderer(SpyRenderer::default())
        .with_log(NullLog)
        .run(raw(json!({
            "dest": "none",
            "sections": [{"title": "Colors", "files": ["css/colors.css"], "mode": "variable"}]
        })))
        .await
        .unwrap();

    let records: Vec<_> = library.records().collect();
    assert_eq!(records.len(), 1);
    let record = records[0];
    assert_eq!(record.tag(Tag::Title), Some("Primary Colors"));
    assert_eq!(record.tag(Tag::Description), Some("Client-branded color palette"));
    assert_eq!(record.tag(Tag::Usage), Some("Found only in brand-specific UI elements"));
    assert_eq!(record.line, 1);
    assert_eq!(record.source_path, PathBuf::from("css/colors.css"));
    assert_eq!(record.source_extension, "css");
    assert!(record.code.starts_with(":root {"));

    let names: Vec<_> = record.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["--brand-red", "--brand-grey"]);
    assert_eq!(record.variables[0].comment.as_deref(), Some("Headlines"));
}
