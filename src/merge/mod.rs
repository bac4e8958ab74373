//! Structural edits on JSON documents
//!
//! The mutation steps address values inside documents with short path
//! expressions such as `targets.build.options.outputPath` or
//! `overrides[2].files`. This module parses those expressions; the actual
//! edits live in [`json`].

pub mod json;

/// Represents a segment in a path expression for navigating nested structures
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// A named key for accessing object members
    Key(String),
    /// A numeric index for accessing array elements
    Index(usize),
}

/// Parse a path string into segments
///
/// Supports:
/// - Dot notation: `compilerOptions.module`
/// - Array indices: `overrides[0].files`
/// - Quoted keys for names containing dots or brackets: `rules["@nx/dependency-checks"]`
///
/// # Examples
///
/// ```
/// use gvrs_nx::merge::{parse_path, PathSegment};
///
/// let segments = parse_path("overrides[1].rules");
/// assert_eq!(segments[1], PathSegment::Index(1));
/// ```
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.trim().chars().peekable();

    let flush = |current: &mut String, segments: &mut Vec<PathSegment>| {
        if !current.is_empty() {
            segments.push(PathSegment::Key(std::mem::take(current)));
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '.' => flush(&mut current, &mut segments),
            '[' => {
                flush(&mut current, &mut segments);

                if let Some(quote @ ('"' | '\'')) = chars.peek().copied() {
                    chars.next();
                    let key: String = chars.by_ref().take_while(|c| *c != quote).collect();
                    // closing bracket
                    chars.next();
                    segments.push(PathSegment::Key(key));
                    continue;
                }

                let content: String = chars.by_ref().take_while(|c| *c != ']').collect();
                let content = content.trim();
                match content.parse::<usize>() {
                    Ok(idx) => segments.push(PathSegment::Index(idx)),
                    Err(_) if !content.is_empty() => {
                        segments.push(PathSegment::Key(content.to_string()))
                    }
                    Err(_) => {}
                }
            }
            _ => current.push(ch),
        }
    }

    flush(&mut current, &mut segments);
    segments
}

/// Render segments back into a path string, for messages
pub fn render_path(segments: &[PathSegment]) -> String {
    let mut rendered = String::new();
    for segment in segments {
        match segment {
            PathSegment::Key(key) if key.contains(['.', '[', ']']) => {
                rendered.push_str(&format!("[\"{}\"]", key))
            }
            PathSegment::Key(key) => {
                if !rendered.is_empty() {
                    rendered.push('.');
                }
                rendered.push_str(key);
            }
            PathSegment::Index(idx) => rendered.push_str(&format!("[{}]", idx)),
        }
    }
    rendered
}
