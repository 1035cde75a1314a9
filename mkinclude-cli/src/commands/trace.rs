//! Dry-run of a build description through the include functions.
//!
//! The `trace` command reads a makefile from disk and follows what make
//! would include: `include`, `-include` and `sinclude` directives and calls
//! to `$(include-once ...)`, `$(include-once-debug ...)`,
//! `$(include-subsystem ...)` and `$(from-here ...)`. The include functions
//! run through the real [`Includer`], so the registry, the context stack and
//! the subsystem set behave exactly as they do inside make.
//!
//! This is not a make parser. Variable references and assignments are
//! understood, with `=` and `?=` values expanded only when referenced, as
//! make does. Other functions expand to nothing, conditionals are not
//! evaluated (every branch is read) and rule recipes are skipped.

use crate::error::CliError;
use crate::utils::{build_includer, path_word, resolve_dir, GlobalOptions};
use clap::{Args, ValueEnum};
use mkinclude::host::{Evaluator, Location, MemoryVariables, VariableStore, MAKEFILE_LIST};
use mkinclude::{CanonicalPath, Error, Includer, Logger, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Nesting at which the trace gives up, assuming an include cycle.
const MAX_DEPTH: usize = 64;

/// Dry-run a build description and print its inclusion tree.
#[derive(Args)]
pub struct TraceCommand {
    /// Top-level build description
    #[arg(value_name = "MAKEFILE")]
    pub makefile: PathBuf,

    /// Directory make would run in (default: CWD)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: TraceFormat,
}

/// Output format for trace.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum TraceFormat {
    /// Indented tree (human-readable)
    Text,
    /// JSON format
    Json,
}

/// A file read during the trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TracedFile {
    /// Canonical path of the file.
    pub path: String,
    /// Include nesting; the top-level makefile is at depth 0.
    pub depth: usize,
}

/// Everything a trace observed.
#[derive(Debug, Default, Serialize)]
pub struct TraceReport {
    /// Files read, in parse order.
    pub files: Vec<TracedFile>,
    /// Optional includes (`-include`, `sinclude`) that did not exist.
    pub missing: Vec<String>,
    /// The include-once registry after the run, sorted.
    pub included_once: Vec<String>,
    /// The subsystem set after the run, sorted.
    pub past_includes: Vec<String>,
}

/// How a line assigns its variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssignOp {
    /// `=`
    Recursive,
    /// `:=` or `::=`
    Simple,
    /// `+=`
    Append,
    /// `?=`
    Conditional,
}

/// A host that reads makefiles from disk.
pub struct TraceHost<'a> {
    includer: &'a Includer,
    logger: Logger,
    cwd: PathBuf,
    depth: usize,
    vars: MemoryVariables,
    /// Variables whose stored value is expanded on each reference.
    recursive: HashSet<String>,
    /// Recursive variables being expanded, innermost last.
    expanding: Vec<String>,
    report: TraceReport,
}

impl<'a> TraceHost<'a> {
    /// A host running in `cwd`.
    pub fn new(includer: &'a Includer, cwd: PathBuf, logger: Logger) -> Self {
        Self {
            includer,
            logger,
            cwd,
            depth: 0,
            vars: MemoryVariables::new(),
            recursive: HashSet::new(),
            expanding: Vec::new(),
            report: TraceReport::default(),
        }
    }

    /// Trace `makefile` as the outermost build description.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or an include function
    /// fails.
    pub fn run(&mut self, makefile: &str) -> Result<TraceReport> {
        let cwd = self.cwd.to_string_lossy().into_owned();
        self.vars.set_variable("CURDIR", &cwd)?;
        self.include_file(makefile, false)?;

        self.report.included_once = self
            .includer
            .registry()
            .paths()
            .into_iter()
            .map(CanonicalPath::into_string)
            .collect();
        self.report.past_includes = self.includer.subsystems().members(&mut self.vars)?;
        Ok(std::mem::take(&mut self.report))
    }

    /// Stored value of a variable after the run, `None` while undefined.
    ///
    /// Recursive variables are returned unexpanded.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name)
    }

    /// Value of a reference to `name`, expanding recursive variables.
    fn value(&mut self, name: &str) -> Result<String> {
        let stored = self.vars.get(name).unwrap_or_default().to_string();
        if !self.recursive.contains(name) {
            return Ok(stored);
        }
        if self.expanding.iter().any(|n| n == name) {
            return Err(Error::HostEvaluation {
                statement: format!("$({name})"),
                reason: "recursive variable references itself".to_string(),
            });
        }

        self.expanding.push(name.to_string());
        let expanded = self.expand_text(&stored);
        self.expanding.pop();
        expanded
    }

    fn include_file(&mut self, word: &str, optional: bool) -> Result<()> {
        let path = self.includer.resolver().resolve(word, &self.cwd)?;
        if optional && !path.as_path().exists() {
            self.logger.info(&format!("optional include not found: {path}"));
            self.report.missing.push(path.into_string());
            return Ok(());
        }

        self.vars.append_word(MAKEFILE_LIST, word);
        self.parse_file(&path)
    }

    fn parse_file(&mut self, path: &CanonicalPath) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::HostEvaluation {
                statement: format!("include {path}"),
                reason: "include nesting too deep".to_string(),
            });
        }

        let contents = fs::read_to_string(path.as_path()).map_err(|e| Error::HostEvaluation {
            statement: format!("include {path}"),
            reason: e.to_string(),
        })?;

        self.logger.debug(&format!("reading {path}"));
        self.report.files.push(TracedFile {
            path: path.as_str().to_string(),
            depth: self.depth,
        });

        self.depth += 1;
        let result = self.parse_lines(&contents);
        self.depth -= 1;
        result
    }

    fn parse_lines(&mut self, contents: &str) -> Result<()> {
        let mut in_define = false;
        for line in logical_lines(contents) {
            let trimmed = line.trim();
            if in_define {
                in_define = trimmed != "endef";
                continue;
            }
            if trimmed == "define" || trimmed.starts_with("define ") {
                in_define = true;
                continue;
            }
            self.parse_line(trimmed)?;
        }
        Ok(())
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some((optional, files)) = include_directive(line) {
            let files = self.expand_text(files)?;
            for word in files.split_whitespace() {
                self.include_file(word, optional)?;
            }
            return Ok(());
        }

        if let Some((name, op, value)) = split_assignment(line) {
            let name = self.expand_text(name)?.trim().to_string();
            if op == AssignOp::Conditional && self.vars.get(&name).is_some() {
                return Ok(());
            }
            let deferred = match op {
                AssignOp::Recursive | AssignOp::Conditional => true,
                AssignOp::Simple => false,
                // Appending keeps the flavor; an undefined variable becomes recursive.
                AssignOp::Append => {
                    self.recursive.contains(&name) || self.vars.get(&name).is_none()
                }
            };
            let value = if deferred {
                self.recursive.insert(name.clone());
                value.trim().to_string()
            } else {
                self.recursive.remove(&name);
                self.expand_text(value)?.trim().to_string()
            };

            if op == AssignOp::Append {
                self.vars.append_word(&name, &value);
            } else {
                self.vars.set_variable(&name, &value)?;
            }
            return Ok(());
        }

        // Anything else is expanded for its side effects.
        self.expand_text(line)?;
        Ok(())
    }

    /// Expand variable references and the include functions in `text`.
    fn expand_text(&mut self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let Some(next) = after.chars().next() else {
                out.push('$');
                rest = after;
                break;
            };

            match next {
                '$' => {
                    out.push('$');
                    rest = &after[1..];
                }
                '(' | '{' => {
                    let close = if next == '(' { ')' } else { '}' };
                    let Some(end) = matching_close(&after[1..], next, close) else {
                        out.push_str(&rest[pos..]);
                        rest = "";
                        break;
                    };
                    let body = &after[1..=end];
                    let expanded = self.expand_reference(body)?;
                    out.push_str(&expanded);
                    rest = &after[end + 2..];
                }
                c => {
                    let value = self.value(&c.to_string())?;
                    out.push_str(&value);
                    rest = &after[c.len_utf8()..];
                }
            }
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Expand the inside of `$(...)`.
    fn expand_reference(&mut self, body: &str) -> Result<String> {
        let includer = self.includer;
        let (name, args) = match body.find(char::is_whitespace) {
            Some(i) => (&body[..i], Some(body[i..].trim_start())),
            None => (body, None),
        };

        match (name, args) {
            ("include-once" | "include-once-debug", Some(args)) => {
                let args = split_arguments(args)
                    .into_iter()
                    .map(|arg| self.expand_text(arg))
                    .collect::<Result<Vec<_>>>()?;
                if name == "include-once" {
                    includer.include_once(self, args.as_slice())?;
                } else {
                    includer.include_once_debug(self, args.as_slice())?;
                }
                Ok(String::new())
            }
            ("include-subsystem", Some(arg)) => {
                let arg = self.expand_text(arg)?;
                includer.include_subsystem(self, &arg)?;
                Ok(String::new())
            }
            ("from-here", Some(list)) => {
                let list = self.expand_text(list)?;
                includer.from_here_text(self, &list)
            }
            (_, Some(_)) => {
                self.logger.info(&format!("not evaluated: $({body})"));
                Ok(String::new())
            }
            (_, None) => {
                let name = self.expand_text(name)?;
                self.value(&name)
            }
        }
    }
}

impl Evaluator for TraceHost<'_> {
    fn expand(&mut self, text: &str) -> Result<String> {
        self.expand_text(text)
    }

    fn evaluate(&mut self, statement: &str, location: &Location) -> Result<()> {
        self.logger.debug(&format!("eval at {location}: {statement}"));
        self.parse_line(statement)
    }

    fn working_dir(&mut self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}

impl VariableStore for TraceHost<'_> {
    fn variable(&mut self, name: &str) -> Result<Option<String>> {
        if self.vars.get(name).is_none() {
            return Ok(None);
        }
        self.value(name).map(Some)
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        self.recursive.remove(name);
        self.vars.set_variable(name, value)
    }
}

/// Join continuation lines, strip comments and drop recipe lines.
fn logical_lines(contents: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for raw in contents.lines() {
        if let Some(head) = raw.strip_suffix('\\') {
            current.push_str(head);
            current.push(' ');
            continue;
        }
        current.push_str(raw);
        let line = std::mem::take(&mut current);

        if line.starts_with('\t') {
            continue;
        }
        let line = match line.find('#') {
            Some(i) => line[..i].to_string(),
            None => line,
        };
        lines.push(line);
    }

    if !current.is_empty() && !current.starts_with('\t') {
        lines.push(current);
    }
    lines
}

/// Recognize `include`, `-include` and `sinclude`.
fn include_directive(line: &str) -> Option<(bool, &str)> {
    for (keyword, optional) in [("include", false), ("-include", true), ("sinclude", true)] {
        if let Some(rest) = line.strip_prefix(keyword) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Some((optional, rest.trim_start()));
            }
        }
    }
    None
}

/// Split `NAME op VALUE`, or `None` if `line` is not an assignment.
fn split_assignment(line: &str) -> Option<(&str, AssignOp, &str)> {
    let mut depth = 0usize;

    for (i, c) in line.char_indices() {
        match c {
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                let tail = &line[i..];
                if !tail.starts_with(":=") && !tail.starts_with("::=") {
                    return None;
                }
            }
            '=' if depth == 0 => {
                let head = &line[..i];
                let (name, op) = if let Some(n) = head.strip_suffix("::") {
                    (n, AssignOp::Simple)
                } else if let Some(n) = head.strip_suffix(':') {
                    (n, AssignOp::Simple)
                } else if let Some(n) = head.strip_suffix('+') {
                    (n, AssignOp::Append)
                } else if let Some(n) = head.strip_suffix('?') {
                    (n, AssignOp::Conditional)
                } else {
                    (head, AssignOp::Recursive)
                };

                let name = name.trim();
                let name = name
                    .strip_prefix("export ")
                    .or_else(|| name.strip_prefix("override "))
                    .unwrap_or(name)
                    .trim();
                if name.is_empty() || name.split_whitespace().count() != 1 {
                    return None;
                }
                return Some((name, op, line[i + 1..].trim_start()));
            }
            _ => {}
        }
    }
    None
}

/// Index of the `close` matching an already consumed `open`.
fn matching_close(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// Split function arguments on top-level commas.
fn split_arguments(text: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(&text[start..]);
    args
}

fn print_text(report: &TraceReport) {
    for file in &report.files {
        println!("{}{}", "  ".repeat(file.depth), file.path);
    }
    for path in &report.missing {
        println!("(missing) {path}");
    }
    println!();
    println!("included once: {}", report.included_once.len());
    for path in &report.included_once {
        println!("  {path}");
    }
    println!("subsystems: {}", report.past_includes.len());
    for path in &report.past_includes {
        println!("  {path}");
    }
}

impl TraceCommand {
    pub fn execute(self, global: &GlobalOptions) -> std::result::Result<(), CliError> {
        let includer = build_includer(global)?;
        let cwd = resolve_dir(self.directory.as_deref())?;
        let makefile = path_word(&self.makefile)?;

        let report = TraceHost::new(&includer, cwd, global.logger).run(makefile)?;

        match self.format {
            TraceFormat::Text => print_text(&report),
            TraceFormat::Json => {
                let json = serde_json::to_string_pretty(&report)
                    .map_err(|e| CliError::SemanticFailure(e.to_string()))?;
                println!("{json}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn trace(dir: &TempDir, makefile: &str) -> Result<TraceReport> {
        let includer = Includer::default();
        let mut host = TraceHost::new(&includer, dir.path().to_path_buf(), Logger::default());
        host.run(makefile)
    }

    fn abs(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_logical_lines() {
        let lines = logical_lines("a := 1 \\\n  2\n# comment\nall:\n\techo $(a)\nb = x # trailing\n");
        assert_eq!(lines, vec!["a := 1    2", "", "all:", "b = x "]);
    }

    #[test]
    fn test_include_directive() {
        assert_eq!(include_directive("include a.mk b.mk"), Some((false, "a.mk b.mk")));
        assert_eq!(include_directive("-include opt.mk"), Some((true, "opt.mk")));
        assert_eq!(include_directive("sinclude opt.mk"), Some((true, "opt.mk")));
        assert_eq!(include_directive("includes := x"), None);
        assert_eq!(include_directive("$(include-once a.mk)"), None);
    }

    #[test]
    fn test_split_assignment() {
        assert_eq!(
            split_assignment("SRC := $(from-here a.c)"),
            Some(("SRC", AssignOp::Simple, "$(from-here a.c)"))
        );
        assert_eq!(split_assignment("X ::= 1"), Some(("X", AssignOp::Simple, "1")));
        assert_eq!(split_assignment("X += 1"), Some(("X", AssignOp::Append, "1")));
        assert_eq!(split_assignment("X ?= 1"), Some(("X", AssignOp::Conditional, "1")));
        assert_eq!(split_assignment("X = a=b"), Some(("X", AssignOp::Recursive, "a=b")));
        assert_eq!(split_assignment("export X = 1"), Some(("X", AssignOp::Recursive, "1")));
        assert_eq!(split_assignment("all: dep"), None);
        assert_eq!(split_assignment("$(include-once a=b.mk)"), None);
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(split_arguments("a.mk,b.mk"), vec!["a.mk", "b.mk"]);
        assert_eq!(split_arguments("$(x a,b),c"), vec!["$(x a,b)", "c"]);
        assert_eq!(split_arguments("single"), vec!["single"]);
    }

    #[test]
    fn test_trace_plain_includes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Makefile", "include common.mk\n-include local.mk\n");
        write(dir.path(), "common.mk", "CFLAGS := -O2\n");

        let report = trace(&dir, "Makefile").unwrap();

        assert_eq!(
            report.files,
            vec![
                TracedFile { path: abs(&dir, "Makefile"), depth: 0 },
                TracedFile { path: abs(&dir, "common.mk"), depth: 1 },
            ]
        );
        assert_eq!(report.missing, vec![abs(&dir, "local.mk")]);
        assert!(report.included_once.is_empty());
    }

    #[test]
    fn test_trace_include_once_deduplicates_spellings() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "Makefile",
            "$(include-once common.mk)\n$(include-once ./lib/../common.mk,common.mk)\n",
        );
        write(dir.path(), "common.mk", "");

        let report = trace(&dir, "Makefile").unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.included_once, vec![abs(&dir, "common.mk")]);
    }

    #[test]
    fn test_trace_subsystems_nest() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "Makefile",
            "$(include-subsystem lib/lib.mk)\n$(include-subsystem lib/lib.mk)\n",
        );
        write(dir.path(), "lib/lib.mk", "$(include-subsystem ../util/util.mk)\n");
        write(dir.path(), "util/util.mk", "");

        let report = trace(&dir, "Makefile").unwrap();

        assert_eq!(
            report.past_includes,
            vec![abs(&dir, "lib/lib.mk"), abs(&dir, "util/util.mk")]
        );
        let depths: Vec<usize> = report.files.iter().map(|f| f.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }

    #[test]
    fn test_trace_from_here_values() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "Makefile",
            "$(include-subsystem lib/lib.mk)\nTOP := $(here)\n",
        );
        write(
            dir.path(),
            "lib/lib.mk",
            "LIB_SRC := $(from-here a.c /abs/b.c)\nLIB_DIR = $(here)\n",
        );

        let includer = Includer::default();
        let mut host = TraceHost::new(&includer, dir.path().to_path_buf(), Logger::default());
        host.run("Makefile").unwrap();

        let expected = format!("{} /abs/b.c", abs(&dir, "lib/a.c"));
        assert_eq!(host.var("LIB_SRC"), Some(expected.as_str()));
        assert_eq!(host.var("TOP"), Some(dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_trace_recursive_variables_expand_when_referenced() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "Makefile",
            "$(include-subsystem lib/lib.mk)
LATER := $(LIB_DIR)
",
        );
        write(
            dir.path(),
            "lib/lib.mk",
            "LIB_DIR = $(here)
NOW := $(LIB_DIR)
EXTRA += $(here)
",
        );

        let includer = Includer::default();
        let mut host = TraceHost::new(&includer, dir.path().to_path_buf(), Logger::default());
        host.run("Makefile").unwrap();

        assert_eq!(host.var("LIB_DIR"), Some("$(here)"));
        assert_eq!(host.var("EXTRA"), Some("$(here)"));
        assert_eq!(host.var("NOW"), Some(abs(&dir, "lib").as_str()));
        assert_eq!(host.var("LATER"), Some(dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_trace_append_keeps_simple_flavor() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "Makefile",
            "SRC := top.c
SRC += $(from-here lib.c)
X = 1
X += $(Y)
Y = 2
XS := $(X)
",
        );

        let includer = Includer::default();
        let mut host = TraceHost::new(&includer, dir.path().to_path_buf(), Logger::default());
        host.run("Makefile").unwrap();

        let expected = format!("top.c {}", abs(&dir, "lib.c"));
        assert_eq!(host.var("SRC"), Some(expected.as_str()));
        assert_eq!(host.var("XS"), Some("1 2"));
    }

    #[test]
    fn test_trace_self_referencing_variable_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Makefile", "X = $(X) more
Y := $(X)
");

        let err = trace(&dir, "Makefile").unwrap_err();
        assert!(err.is_host_evaluation());
        assert!(err.to_string().contains("references itself"));
    }

    #[test]
    fn test_trace_missing_required_include_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Makefile", "include nowhere.mk\n");

        let err = trace(&dir, "Makefile").unwrap_err();
        assert!(err.is_host_evaluation());
    }

    #[test]
    fn test_trace_include_cycle_stops() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Makefile", "include Makefile\n");

        let err = trace(&dir, "Makefile").unwrap_err();
        assert!(err.to_string().contains("too deep"));
    }

    #[test]
    fn test_trace_include_once_cycle_terminates() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.mk", "$(include-once b.mk)\n");
        write(dir.path(), "b.mk", "$(include-once a.mk)\n");

        let report = trace(&dir, "a.mk").unwrap();

        // a.mk is read once as the top level and once through include-once.
        let paths: Vec<&str> = report.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec![abs(&dir, "a.mk"), abs(&dir, "b.mk"), abs(&dir, "a.mk")]);
    }
}
