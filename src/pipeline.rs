//! The run pipeline: validate → discover → read → parse → render.
//!
//! Each stage gates the next. Discovery and reads fan out as tasks and fan
//! back in by index, so completion order never affects output order.

use crate::config::{Config, RawConfig};
use crate::discover::{self, FsGlobber, Globber};
use crate::error::{Error, Result};
use crate::log::{LogSink, TracingLog};
use crate::model::{Diagnostic, DiagnosticKind, Library, Section, SourceFile};
use crate::parser::annotation::UntaggedBlocks;
use crate::render::{html::HtmlRenderer, Renderer};
use crate::section;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Loads the raw text of one file.
pub trait FileReader: Send + Sync + 'static {
    fn read(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl FileReader for FsReader {
    async fn read(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

/// A configured run with its collaborators.
pub struct Pipeline<G = FsGlobber, R = FsReader> {
    globber: Arc<G>,
    reader: Arc<R>,
    renderer: Box<dyn Renderer>,
    log: Arc<dyn LogSink>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new(FsGlobber::default(), FsReader)
    }
}

/// Run with the filesystem collaborators, the HTML renderer and tracing logs.
pub async fn run(raw: RawConfig) -> Result<Library> {
    Pipeline::<FsGlobber, FsReader>::default().run(raw).await
}

impl<G: Globber, R: FileReader> Pipeline<G, R> {
    pub fn new(globber: G, reader: R) -> Self {
        Self {
            globber: Arc::new(globber),
            reader: Arc::new(reader),
            renderer: Box::new(HtmlRenderer),
            log: Arc::new(TracingLog),
        }
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_boxed_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_log(mut self, log: impl LogSink + 'static) -> Self {
        self.log = Arc::new(log);
        self
    }

    /// Resolve with the populated library, or reject with the first fatal error.
    pub async fn run(&self, raw: RawConfig) -> Result<Library> {
        match self.stages(raw).await {
            Ok(library) => {
                let records = library.records().count();
                let files: usize = library.sections.iter().map(|s| s.files.len()).sum();
                self.log.info(&format!(
                    "Finished! {} pattern(s) from {} file(s) in {} section(s)",
                    records,
                    files,
                    library.sections.len()
                ));
                Ok(library)
            }
            Err(err) => {
                self.log.error(&err);
                Err(err)
            }
        }
    }

    async fn stages(&self, raw: RawConfig) -> Result<Library> {
        let config = raw.validate()?;
        let policy = config.untagged_blocks;

        let discovered = self.discover(&config).await?;
        let mut library = allocate(config, discovered);
        self.read(&mut library).await?;
        self.parse(&mut library, policy);
        self.render(&mut library).await?;

        Ok(library)
    }

    /// Expand every section's patterns concurrently; any failure fails the stage.
    async fn discover(&self, config: &Config) -> Result<Vec<Vec<PathBuf>>> {
        let mut tasks = JoinSet::new();
        for (index, section) in config.sections.iter().enumerate() {
            let globber = Arc::clone(&self.globber);
            let patterns = section.files.clone();
            tasks.spawn(async move { (index, discover::expand_all(&*globber, &patterns).await) });
        }

        let mut slots: Vec<Vec<PathBuf>> = vec![Vec::new(); config.sections.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined?;
            slots[index] = result?;
        }

        tracing::debug!(
            files = slots.iter().map(Vec::len).sum::<usize>(),
            "discovery finished"
        );
        Ok(slots)
    }

    /// Fill every file slot with its text, or a read diagnostic.
    async fn read(&self, library: &mut Library) -> Result<()> {
        let mut tasks = JoinSet::new();
        for (s, section) in library.sections.iter().enumerate() {
            for (f, file) in section.files.iter().enumerate() {
                let reader = Arc::clone(&self.reader);
                let path = file.path.clone();
                tasks.spawn(async move { (s, f, reader.read(&path).await) });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            let (s, f, result) = joined?;
            let file = &mut library.sections[s].files[f];
            match result {
                Ok(text) => file.raw_text = Some(text),
                Err(err) => {
                    self.log
                        .warn(&format!("failed to read {}: {}", file.path.display(), err));
                    file.diagnostics
                        .push(Diagnostic::new(DiagnosticKind::Read, None, err.to_string()));
                }
            }
        }
        Ok(())
    }

    fn parse(&self, library: &mut Library, policy: UntaggedBlocks) {
        for section in &mut library.sections {
            section::process(section, policy);
            for file in &section.files {
                for diag in file
                    .diagnostics
                    .iter()
                    .filter(|d| d.kind != DiagnosticKind::Read)
                {
                    self.log
                        .warn(&format!("{}: {}", file.path.display(), diag));
                }
            }
        }
    }

    /// Render, then write `index.<ext>` unless the destination is `"none"`.
    async fn render(&self, library: &mut Library) -> Result<()> {
        let rendered = self
            .renderer
            .render(library)
            .map_err(|err| Error::Format {
                format: self.renderer.file_extension().to_string(),
                message: format!("{:#}", err),
            })?;

        let Some(dir) = library.destination.dir().map(Path::to_path_buf) else {
            self.log.info("dest is \"none\"; nothing written");
            return Ok(());
        };

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| Error::Render {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(format!("index.{}", self.renderer.file_extension()));
        tokio::fs::write(&path, rendered)
            .await
            .map_err(|source| Error::Render {
                path: path.clone(),
                source,
            })?;

        library.output = Some(path);
        Ok(())
    }
}

/// Lay out the full section → file shape before any read starts.
fn allocate(config: Config, discovered: Vec<Vec<PathBuf>>) -> Library {
    let sections = config
        .sections
        .into_iter()
        .zip(discovered)
        .map(|(section, paths)| Section {
            title: section.title,
            mode: section.mode,
            layout: section.layout,
            files: paths.into_iter().map(SourceFile::new).collect(),
        })
        .collect();

    Library {
        destination: config.destination,
        template: config.template,
        include: config.include,
        sections,
        output: None,
    }
}
