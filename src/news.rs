//! Markdown news posts stored as `<id>.md` files with YAML front matter.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use pulldown_cmark::{html, Options, Parser};
use serde::Serialize;
use serde_json::{Map, Value};

pub const DEFAULT_AUTHOR: &str = "default-author";
pub const DEFAULT_COVER: &str = "/news/default-cover.jpg";
const API_EXCERPT_CHARS: usize = 200;
const SUMMARY_EXCERPT_CHARS: usize = 50;

/// Authors with a profile picture; anyone else is shown as `DEFAULT_AUTHOR`.
pub const AUTHORS: &[(&str, &str)] = &[("isevendeuce", "/news/authors/isevendeuce.jpg")];

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("post {0} not found")]
    NotFound(String),
    #[error("failed to read news content: {0}")]
    Io(#[from] io::Error),
}

pub fn author_avatar(author: &str) -> Option<&'static str> {
    AUTHORS
        .iter()
        .find(|(name, _)| *name == author)
        .map(|(_, avatar)| *avatar)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub author: String,
    pub cover: String,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content_html: String,
}

/// A parsed post file.
#[derive(Debug, Clone, Default, PartialEq)]
struct Document {
    front_matter: Map<String, Value>,
    body: String,
}

/// Splits `---` delimited front matter from the body. Text without an
/// opening and closing delimiter is all body.
fn split_front_matter(text: &str) -> (&str, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = text
        .strip_prefix("---")
        .and_then(|r| r.strip_prefix("\r\n").or_else(|| r.strip_prefix('\n')))
    else {
        return ("", text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (&rest[..offset], &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    ("", text)
}

fn parse_document(id: &str, text: &str) -> Document {
    let (yaml, body) = split_front_matter(text);
    let front_matter = if yaml.trim().is_empty() {
        Map::new()
    } else {
        match serde_yaml::from_str::<Value>(yaml) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!("Front matter of post {} is not a mapping", id);
                Map::new()
            }
            Err(e) => {
                warn!("Invalid front matter in post {}: {}", id, e);
                Map::new()
            }
        }
    };
    Document {
        front_matter,
        body: body.to_string(),
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn field(front_matter: &Map<String, Value>, key: &str) -> Option<String> {
    match front_matter.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Ids map directly to file names, so anything that could leave the
/// directory is rejected.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.contains("..")
        && !id.contains(&['/', '\\', '\0'][..])
}

pub fn render_markdown(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, Options::empty()));
    out
}

#[derive(Debug, Clone)]
pub struct NewsStore {
    dir: PathBuf,
}

impl NewsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `(id, document)` for every `*.md` file, ordered by file name.
    fn documents(&self) -> Result<Vec<(String, Document)>, ContentError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping unreadable post {}: {}", path.display(), e);
                    continue;
                }
            };
            let document = parse_document(&id, &text);
            documents.push((id, document));
        }
        Ok(documents)
    }

    fn document(&self, id: &str) -> Result<Document, ContentError> {
        if !is_valid_id(id) {
            return Err(ContentError::NotFound(id.to_string()));
        }
        let path = self.dir.join(format!("{}.md", id));
        match fs::read_to_string(&path) {
            Ok(text) => Ok(parse_document(id, &text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ContentError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// `{id, ...front matter, excerpt}` per post, for the JSON API.
    pub fn list_raw(&self) -> Result<Vec<Value>, ContentError> {
        Ok(self
            .documents()?
            .into_iter()
            .map(|(id, document)| {
                let mut post = Map::new();
                post.insert("id".to_string(), Value::String(id));
                post.extend(document.front_matter);
                post.insert(
                    "excerpt".to_string(),
                    Value::String(format!("{}...", truncate_chars(&document.body, API_EXCERPT_CHARS))),
                );
                Value::Object(post)
            })
            .collect())
    }

    /// `{id, content, ...front matter}` with the unprocessed markdown body.
    pub fn get_raw(&self, id: &str) -> Result<Value, ContentError> {
        let document = self.document(id)?;
        let mut post = Map::new();
        post.insert("id".to_string(), Value::String(id.to_string()));
        post.insert("content".to_string(), Value::String(document.body));
        post.extend(document.front_matter);
        Ok(Value::Object(post))
    }

    fn summary(id: String, document: &Document) -> PostSummary {
        let front_matter = &document.front_matter;
        let author = field(front_matter, "author")
            .filter(|author| author_avatar(author).is_some())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        let body = document.body.as_str();
        let excerpt = if body.chars().count() > SUMMARY_EXCERPT_CHARS {
            format!("{}...", truncate_chars(body, SUMMARY_EXCERPT_CHARS))
        } else {
            body.to_string()
        };

        PostSummary {
            id,
            title: field(front_matter, "title").unwrap_or_default(),
            date: field(front_matter, "date").unwrap_or_default(),
            author,
            cover: field(front_matter, "cover")
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COVER.to_string()),
            excerpt,
        }
    }

    /// All posts, newest first.
    pub fn summaries(&self) -> Result<Vec<PostSummary>, ContentError> {
        let mut summaries: Vec<PostSummary> = self
            .documents()?
            .into_iter()
            .map(|(id, document)| Self::summary(id, &document))
            .collect();
        summaries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(summaries)
    }

    pub fn post(&self, id: &str) -> Result<Post, ContentError> {
        let document = self.document(id)?;
        Ok(Post {
            content_html: render_markdown(&document.body),
            summary: Self::summary(id.to_string(), &document),
        })
    }
}
