//! Static HTML output: one document per post plus `index.html`.

pub mod convert;

pub use convert::{ConversionOutcome, Converter};

use std::fs;
use std::path::{Path, PathBuf};

use html_escape::encode_text;

use crate::app::{BinderyError, Result};
use crate::corpus::Corpus;
use crate::domain::Post;

pub const INDEX_FILE: &str = "index.html";

/// Files written by [`BookAssembler::assemble`].
#[derive(Debug, Clone)]
pub struct BookManifest {
    pub index: PathBuf,
    /// Post documents in publication order
    pub documents: Vec<PathBuf>,
}

pub struct BookAssembler {
    output_dir: PathBuf,
    title: String,
    protected: Vec<PathBuf>,
}

impl BookAssembler {
    pub fn new<P: AsRef<Path>>(output_dir: P, title: &str) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            title: title.to_string(),
            protected: Vec::new(),
        }
    }

    /// Never clear an output directory that holds `path`.
    pub fn protect<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.protected.push(path.as_ref().to_path_buf());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Start from an empty output directory.
    ///
    /// Refuses to clear the working directory, any of its ancestors, or a
    /// directory holding a protected path. Paths are compared after
    /// resolving `..` and symlinks.
    pub fn prepare(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(self.refuse("it is empty"));
        }
        if self.output_dir.exists() {
            self.check_safe_to_clear()?;
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    fn check_safe_to_clear(&self) -> Result<()> {
        let output = self.output_dir.canonicalize()?;
        let cwd = std::env::current_dir()?.canonicalize()?;
        if cwd.starts_with(&output) {
            return Err(self.refuse("it contains the working directory"));
        }
        for path in &self.protected {
            if !path.exists() {
                continue;
            }
            if path.canonicalize()?.starts_with(&output) {
                return Err(self.refuse(&format!("it contains {}", path.display())));
            }
        }
        Ok(())
    }

    fn refuse(&self, reason: &str) -> BinderyError {
        BinderyError::Other(format!(
            "Refusing to clear output directory {:?}: {}",
            self.output_dir, reason
        ))
    }

    /// Write every post and the table of contents.
    pub fn assemble(&self, corpus: &Corpus) -> Result<BookManifest> {
        fs::create_dir_all(&self.output_dir)?;

        let mut documents = Vec::with_capacity(corpus.len());
        for post in corpus.iter() {
            let path = self.output_dir.join(&post.local_name);
            fs::write(&path, render_post(post))?;
            documents.push(path);
        }

        let index = self.output_dir.join(INDEX_FILE);
        fs::write(&index, self.render_index(corpus))?;

        tracing::info!(
            "Wrote {} posts and {} to {}",
            documents.len(),
            INDEX_FILE,
            self.output_dir.display()
        );

        Ok(BookManifest { index, documents })
    }

    fn render_index(&self, corpus: &Corpus) -> String {
        let mut html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<h1>Table of Contents</h1>\n<p style=\"text-indent:0pt\">\n",
            encode_text(&self.title)
        );
        for post in corpus.iter() {
            html.push_str(&format!(
                "<a href=\"{}\">{}</a><br/>\n",
                post.local_name,
                encode_text(&post.title)
            ));
        }
        html.push_str("</p>\n</body>\n</html>\n");
        html
    }
}

fn render_post(post: &Post) -> String {
    let title = encode_text(&post.title);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n"
    );
    if !post.author.is_empty() {
        html.push_str(&format!("<h2>By {}</h2>\n", encode_text(&post.author)));
    }
    if !post.date.is_empty() {
        html.push_str(&format!("<h2>{}</h2>\n", encode_text(&post.date)));
    }
    html.push_str(&post.body);
    html.push_str("\n</body>\n</html>\n");
    html
}
