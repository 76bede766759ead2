//! Caller identification for records created without an explicit task/action
//!
//! The `caller!` macro captures the enclosing function at compile time, so no
//! stack walking happens at runtime:
//! ```ignore
//! async fn nightly_import(db: &DbConn, ctx: &LogContext) -> Result<()> {
//!     // task = "jobs", action = "nightly_import"
//!     let mut log = ProgressLog::create(db, ctx, NewEntry::default(), &caller!()).await?;
//!     ...
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Module and function that asked for a progress record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub module: String,
    pub function: String,
}

impl Caller {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
        }
    }

    /// Build a caller from a Rust path such as `my_app::jobs::import::{{closure}}`.
    ///
    /// Closure segments are skipped so code inside `async fn` bodies resolves
    /// to the enclosing function. Inside impl blocks the implementing type
    /// stands in for the module: `my_app::<my_app::Nightly as my_app::Job>::run`
    /// and `my_app::Generic<_>::run` give `Nightly`/`Generic`. Returns `None`
    /// when the path has no module part.
    pub fn from_type_path(path: &str) -> Option<Self> {
        let segments: Vec<String> = split_path(path)
            .into_iter()
            .filter(|s| *s != "{{closure}}")
            .filter_map(segment_name)
            .collect();

        match segments.as_slice() {
            [.., module, function] => Some(Self::new(module.as_str(), function.as_str())),
            _ => None,
        }
    }

    /// Name stored as the record's task
    pub fn task(&self) -> &str {
        &self.module
    }

    /// Name stored as the record's action
    pub fn action(&self) -> &str {
        &self.function
    }
}

/// Source of the caller identity used when task or action is omitted.
///
/// `Sync` so a `&dyn CallerSource` can be held across awaits in `Send` futures.
pub trait CallerSource: Sync {
    fn caller(&self) -> Option<Caller>;
}

impl CallerSource for Caller {
    fn caller(&self) -> Option<Caller> {
        Some(self.clone())
    }
}

impl CallerSource for Option<Caller> {
    fn caller(&self) -> Option<Caller> {
        self.clone()
    }
}

/// Caller source for code paths that always name task and action themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCaller;

impl CallerSource for NoCaller {
    fn caller(&self) -> Option<Caller> {
        None
    }
}

/// Split on `::` outside of `<...>` brackets
fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&path[start..]);
    segments
}

/// Plain name for one path segment.
///
/// `<Type as Trait>` resolves to the last segment of `Type`, and generic
/// arguments are dropped.
fn segment_name(segment: &str) -> Option<String> {
    let segment = segment.trim();
    let name = match segment
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
    {
        Some(qualified) => {
            let self_ty = match qualified.strip_prefix("impl ") {
                Some(rest) => rest.rsplit(" for ").next().unwrap_or(rest),
                None => top_level_before_as(qualified),
            };
            let self_ty = self_ty
                .trim_start_matches(['&', '*'])
                .trim_start_matches("mut ")
                .trim_start_matches("const ")
                .trim_start_matches("dyn ");
            let last = split_path(self_ty).pop().unwrap_or_default();
            strip_generics(last)
        }
        None => strip_generics(segment),
    };

    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Part of `Type as Trait` before the top-level ` as `
fn top_level_before_as(qualified: &str) -> &str {
    let mut depth = 0usize;
    for (i, c) in qualified.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ' ' if depth == 0 && qualified[i..].starts_with(" as ") => return &qualified[..i],
            _ => {}
        }
    }
    qualified
}

fn strip_generics(segment: &str) -> &str {
    match segment.find('<') {
        Some(pos) => &segment[..pos],
        None => segment,
    }
}

#[doc(hidden)]
pub fn type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}

/// Capture the enclosing function as an `Option<Caller>`.
#[macro_export]
macro_rules! caller {
    () => {{
        fn __progresslog_marker() {}
        let path = $crate::caller::type_name_of(__progresslog_marker);
        $crate::caller::Caller::from_type_path(
            path.strip_suffix("::__progresslog_marker").unwrap_or(path),
        )
    }};
}
